//! CLI module graph and command dispatch.

pub mod command;
pub mod config;
pub mod orders;
pub mod output;
pub mod refresh;

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::infrastructure::bootstrap::build_orchestrator;
use crate::infrastructure::config::settings::Config;
use command::{Commands, ConfigCommand};

/// Run one parsed command against a loaded configuration.
///
/// # Errors
///
/// Returns whatever the command handler returns.
pub async fn dispatch(
    command: &Commands,
    config: &Config,
    config_path: &Path,
    from_file: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    match command {
        Commands::Orders(args) => {
            let orchestrator = build_orchestrator(config)?;
            orders::execute(&orchestrator, args, cancel).await
        }
        Commands::Refresh(args) => {
            let orchestrator = build_orchestrator(config)?;
            refresh::execute(&orchestrator, args, cancel).await
        }
        Commands::Config(ConfigCommand::Show) => {
            config::execute_show(config, config_path, from_file)
        }
        Commands::Config(ConfigCommand::Validate) => {
            config::execute_validate(config, config_path, from_file)
        }
    }
}
