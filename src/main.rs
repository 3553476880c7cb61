use clap::Parser;
use docchat::{cli::Cli, config::Config, utils::init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    let _log_guard = init_logger(config.logging.dir.as_deref());

    docchat::cli::run(cli, config).await
}
