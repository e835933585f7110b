//! PM2 ecosystem records for running the dumper under a process supervisor.
//!
//! The dumper is a native binary, so every record sets `interpreter: "none"`. The variants only
//! differ in the port they bind, the `NODE_ENV` they advertise and whether watch mode is on.
//! Watch mode never looks at `webhooks/data`, otherwise every stored webhook would restart the
//! process that stored it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::common::consts;

pub mod memory;

pub use memory::{MemoryThreshold, MemoryThresholdError};

pub const DEFAULT_SCRIPT: &str = "./xendit-webhook-dumper";
pub const DEFAULT_CWD: &str = "/opt/xendit-webhook-dumper";
pub const DATA_DIR_PATTERN: &str = "webhooks/data";
pub const NATIVE_INTERPRETER: &str = "none";
pub const DEFAULT_MAX_MEMORY: MemoryThreshold = MemoryThreshold::megabytes(200);

pub const ENV_PORT: &str = "PORT";
pub const ENV_NODE_ENV: &str = "NODE_ENV";

#[derive(ThisError, Debug)]
pub enum DeployError {
    #[error("ecosystem file has no apps")]
    NoApps,
    #[error("process name is empty")]
    EmptyName,
    #[error("{name}: script path is empty")]
    EmptyScript { name: String },
    #[error("{name}: env.PORT is not set")]
    MissingPort { name: String },
    #[error("{name}: env.PORT {value:?} is not a positive integer port")]
    InvalidPort { name: String, value: String },
    #[error("process name {found:?} differs from {expected:?}")]
    NameMismatch { expected: String, found: String },
    #[error("port {port} is used by both {first} and {second}")]
    DuplicatePort {
        port: u16,
        first: String,
        second: String,
    },
    #[error("failed to render ecosystem file: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deployment {
    Production,
    Staging,
    Development,
}

impl Deployment {
    pub const ALL: [Deployment; 3] = [
        Deployment::Production,
        Deployment::Staging,
        Deployment::Development,
    ];

    pub fn port(self) -> u16 {
        match self {
            Deployment::Production => 8080,
            Deployment::Staging => 6969,
            Deployment::Development => 3000,
        }
    }

    pub fn node_env(self) -> &'static str {
        match self {
            Deployment::Production => "production",
            Deployment::Staging => "staging",
            Deployment::Development => "development",
        }
    }

    fn watch(self) -> bool {
        matches!(self, Deployment::Development)
    }

    fn ignore_watch(self) -> Vec<String> {
        let mut patterns = vec![DATA_DIR_PATTERN.to_string()];
        if self.watch() {
            patterns.extend(["target".to_string(), ".git".to_string()]);
        }
        patterns
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_env())
    }
}

/// One entry of an ecosystem file's `apps` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub watch: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_watch: Vec<String>,
    pub max_memory_restart: MemoryThreshold,
}

impl ProcessSpec {
    pub fn for_deployment(deployment: Deployment, cwd: impl Into<String>) -> Self {
        let env = BTreeMap::from([
            (ENV_NODE_ENV.to_string(), deployment.node_env().to_string()),
            (ENV_PORT.to_string(), deployment.port().to_string()),
        ]);
        Self {
            name: consts::SERVICE_NAME.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            cwd: Some(cwd.into()),
            interpreter: Some(NATIVE_INTERPRETER.to_string()),
            env,
            watch: deployment.watch(),
            ignore_watch: deployment.ignore_watch(),
            max_memory_restart: DEFAULT_MAX_MEMORY,
        }
    }

    pub fn port(&self) -> Result<u16, DeployError> {
        let value = self
            .env
            .get(ENV_PORT)
            .ok_or_else(|| DeployError::MissingPort {
                name: self.name.clone(),
            })?;
        match value.trim().parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(DeployError::InvalidPort {
                name: self.name.clone(),
                value: value.clone(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), DeployError> {
        if self.name.trim().is_empty() {
            return Err(DeployError::EmptyName);
        }
        if self.script.trim().is_empty() {
            return Err(DeployError::EmptyScript {
                name: self.name.clone(),
            });
        }
        self.port()?;
        Ok(())
    }

    fn label(&self) -> String {
        match self.env.get(ENV_NODE_ENV) {
            Some(node_env) => format!("{} ({node_env})", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemFile {
    pub apps: Vec<ProcessSpec>,
}

impl EcosystemFile {
    pub fn for_deployments(deployments: &[Deployment], cwd: &str) -> Self {
        Self {
            apps: deployments
                .iter()
                .map(|d| ProcessSpec::for_deployment(*d, cwd))
                .collect(),
        }
    }

    /// Checks each record, then that the records describe one process on distinct ports.
    pub fn validate(&self) -> Result<(), DeployError> {
        let first = self.apps.first().ok_or(DeployError::NoApps)?;
        let mut seen: HashMap<u16, String> = HashMap::new();
        for app in &self.apps {
            app.validate()?;
            if app.name != first.name {
                return Err(DeployError::NameMismatch {
                    expected: first.name.clone(),
                    found: app.name.clone(),
                });
            }
            let port = app.port()?;
            if let Some(other) = seen.insert(port, app.label()) {
                return Err(DeployError::DuplicatePort {
                    port,
                    first: other,
                    second: app.label(),
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, DeployError> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// `ecosystem.config.js` flavour; JSON is valid JS so the body is the same document.
    pub fn to_js_module(&self) -> Result<String, DeployError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(format!("module.exports = {json};\n"))
    }
}
