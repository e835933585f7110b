use std::net::SocketAddr;
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_inline_default::serde_inline_default;
use thiserror::Error as ThisError;

#[serde_inline_default]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde_inline_default("0.0.0.0".to_string())]
    pub host: String,
    #[serde_inline_default(8080)]
    pub port: u16,
    #[serde_inline_default(PathBuf::from("webhooks/data"))]
    pub data_dir: PathBuf,
    #[serde_inline_default("info".to_string())]
    pub rust_log: String,
    #[serde(default)]
    pub node_env: Option<String>,
    /// Shared secret Xendit sends as `x-callback-token`; callbacks are unauthenticated without it.
    #[serde(default)]
    pub xendit_callback_token: Option<String>,
}

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid listen address {addr:?}: {source}")]
    ListenAddr {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("PORT must be a positive integer, got 0")]
    ZeroPort,
}

impl Config {
    /// Builds a config from explicit `(NAME, value)` pairs, the same way the process environment
    /// is read.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(vars)?)
    }

    /// Address to bind; port 0 is refused so a supervised process never lands on a random port.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|source| ConfigError::ListenAddr { addr, source })
    }
}

static CONFIG: OnceCell<Config> = OnceCell::new();

fn load_config() -> Result<Config, ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e.into()),
    }
    Ok(envy::from_env::<Config>()?)
}

/// Loads the config from `.env` and the process environment on first call.
pub fn init() -> Result<&'static Config, ConfigError> {
    CONFIG.get_or_try_init(load_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_unconfigured_process() -> anyhow::Result<()> {
        let cnf = Config::from_vars(vars(&[]))?;
        assert_eq!(cnf.host, "0.0.0.0");
        assert_eq!(cnf.port, 8080);
        assert_eq!(cnf.data_dir, PathBuf::from("webhooks/data"));
        assert_eq!(cnf.rust_log, "info");
        assert!(cnf.node_env.is_none());
        assert!(cnf.xendit_callback_token.is_none());
        Ok(())
    }

    #[test]
    fn reads_supervisor_env() -> anyhow::Result<()> {
        let cnf = Config::from_vars(vars(&[
            ("PORT", "6969"),
            ("NODE_ENV", "staging"),
            ("DATA_DIR", "/var/lib/dumper"),
            ("XENDIT_CALLBACK_TOKEN", "s3cr3t"),
        ]))?;
        assert_eq!(cnf.port, 6969);
        assert_eq!(cnf.node_env.as_deref(), Some("staging"));
        assert_eq!(cnf.data_dir, PathBuf::from("/var/lib/dumper"));
        assert_eq!(cnf.xendit_callback_token.as_deref(), Some("s3cr3t"));
        assert_eq!(cnf.listen_addr()?, "0.0.0.0:6969".parse()?);
        Ok(())
    }

    #[test]
    fn rejects_non_numeric_port() {
        let res = Config::from_vars(vars(&[("PORT", "http")]));
        assert!(matches!(res, Err(ConfigError::Env(_))));
    }

    #[test]
    fn rejects_zero_port() -> anyhow::Result<()> {
        let cnf = Config::from_vars(vars(&[("PORT", "0")]))?;
        assert!(matches!(cnf.listen_addr(), Err(ConfigError::ZeroPort)));
        Ok(())
    }

    #[test]
    fn rejects_bad_host() -> anyhow::Result<()> {
        let cnf = Config::from_vars(vars(&[("HOST", "not a host")]))?;
        assert!(matches!(
            cnf.listen_addr(),
            Err(ConfigError::ListenAddr { .. })
        ));
        Ok(())
    }
}
