use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use webhook_dumper::deploy::{self, Deployment, EcosystemFile};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Js,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    Production,
    Staging,
    Development,
    All,
}

impl Target {
    fn deployments(self) -> Vec<Deployment> {
        match self {
            Target::Production => vec![Deployment::Production],
            Target::Staging => vec![Deployment::Staging],
            Target::Development => vec![Deployment::Development],
            Target::All => Deployment::ALL.to_vec(),
        }
    }
}

/// Prints the PM2 ecosystem file that runs xendit-webhook-dumper.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Target::Production)]
    deployment: Target,

    /// Directory holding the binary; also where `webhooks/data` ends up.
    #[arg(long, default_value = deploy::DEFAULT_CWD)]
    cwd: String,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let eco = EcosystemFile::for_deployments(&args.deployment.deployments(), &args.cwd);
    eco.validate().context("generated ecosystem file is invalid")?;
    let out = match args.format {
        Format::Json => eco.to_json()?,
        Format::Js => eco.to_js_module()?,
    };
    print!("{out}");
    Ok(())
}
