use clap::Parser;
use marketsync::adapter::inbound::cli::command::Cli;
use marketsync::adapter::inbound::cli::output::{self, OutputConfig};
use marketsync::adapter::inbound::cli::dispatch;
use marketsync::infrastructure::config::settings::Config;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let (path, explicit) = cli.config_path();
    let from_file = path.exists();
    let loaded = if explicit {
        Config::load(&path)
    } else {
        Config::load_or_default(&path)
    };
    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            output::error(&format!("Failed to load config {}: {e}", path.display()));
            std::process::exit(1);
        }
    };

    match cli.log_level_override() {
        Some(level) => config.logging.with_level(level).init(),
        None => config.init_logging(),
    }
    debug!(config = %path.display(), from_file, "marketsync starting");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling in-flight work");
            trigger.cancel();
        }
    });

    if let Err(e) = dispatch(&cli.command, &config, &path, from_file, &cancel).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
