use clap::Parser;
use demo_runner::SandboxConfig;
use demo_runner_server::{create_app, run_server};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    addr: SocketAddr,

    /// TOML file with sandbox settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of concurrent executions
    #[arg(short, long)]
    max_concurrent: Option<usize>,

    /// Wall-clock budget per execution in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// CPU time limit in seconds
    #[arg(long)]
    cpu_time_limit: Option<u64>,

    /// File size limit in bytes
    #[arg(long)]
    file_size_limit: Option<u64>,

    /// Directory for temporary source files
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

impl Args {
    fn sandbox_config(&self) -> anyhow::Result<SandboxConfig> {
        let mut config = match &self.config {
            Some(path) => SandboxConfig::from_file(path)?,
            None => SandboxConfig::default(),
        };

        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent = max_concurrent;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(cpu_time) = self.cpu_time_limit {
            config.limits.cpu_time = cpu_time;
        }
        if let Some(file_size) = self.file_size_limit {
            config.limits.file_size = file_size;
        }
        if let Some(work_dir) = &self.work_dir {
            config.work_dir = Some(work_dir.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.sandbox_config()?;
    tracing::info!(
        timeout = ?config.timeout,
        max_concurrent = config.max_concurrent,
        work_dir = %config.work_dir().display(),
        "Sandbox configured"
    );

    let app = create_app(config).await?;
    run_server(app, args.addr).await?;

    Ok(())
}
