//! Command-line interface definitions.
//!
//! Defines the CLI structure for the marketsync application using `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{RegionId, TypeId};

/// Config file read when `--config` is not given; missing means defaults.
pub const DEFAULT_CONFIG_PATH: &str = "marketsync.toml";

/// Rate-limited, cache-first ingestion of regional market orders
#[derive(Parser, Debug)]
#[command(name = "marketsync")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config path to load and whether the user named it explicitly.
    #[must_use]
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }

    /// Log level implied by `--quiet` / `--verbose`, if any.
    #[must_use]
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

/// Top-level subcommands for the marketsync CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a region's orders (cached or stored unless --refresh)
    Orders(OrdersArgs),

    /// Fetch every page of one or more regions and store them
    Refresh(RefreshArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `marketsync orders`.
#[derive(Parser, Debug)]
pub struct OrdersArgs {
    /// Region id (e.g. 10000002 for The Forge)
    pub region: RegionId,

    /// Only show orders for this item type
    #[arg(long = "type-id")]
    pub type_id: Option<TypeId>,

    /// Fetch fresh orders from the remote API first
    #[arg(long)]
    pub refresh: bool,

    /// Refresh, but fall back to stored orders if the refresh fails
    #[arg(long)]
    pub allow_stale: bool,

    /// Maximum rows to print
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for `marketsync refresh`.
#[derive(Parser, Debug)]
pub struct RefreshArgs {
    /// Region ids to refresh, in order
    #[arg(required = true)]
    pub regions: Vec<RegionId>,
}

/// Subcommands for `marketsync config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration file.
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_orders_flags() {
        let cli = Cli::try_parse_from([
            "marketsync",
            "orders",
            "10000002",
            "--type-id",
            "34",
            "--allow-stale",
            "--limit",
            "5",
        ])
        .unwrap();
        let Commands::Orders(args) = cli.command else {
            panic!("expected orders command");
        };
        assert_eq!(args.region, RegionId::new(10000002));
        assert_eq!(args.type_id, Some(TypeId::new(34)));
        assert!(args.allow_stale);
        assert!(!args.refresh);
        assert_eq!(args.limit, 5);
    }

    #[test]
    fn refresh_requires_a_region() {
        assert!(Cli::try_parse_from(["marketsync", "refresh"]).is_err());
        let cli = Cli::try_parse_from(["marketsync", "refresh", "10000002", "10000043"]).unwrap();
        let Commands::Refresh(args) = cli.command else {
            panic!("expected refresh command");
        };
        assert_eq!(args.regions.len(), 2);
    }

    #[test]
    fn rejects_non_numeric_region() {
        assert!(Cli::try_parse_from(["marketsync", "orders", "forge"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["marketsync", "config", "show", "--json", "-c", "x.toml", "-vv"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config_path(), (PathBuf::from("x.toml"), true));
        assert_eq!(cli.log_level_override(), Some("trace"));
    }

    #[test]
    fn default_config_path_is_implicit() {
        let cli = Cli::try_parse_from(["marketsync", "config", "validate"]).unwrap();
        assert_eq!(cli.config_path(), (PathBuf::from(DEFAULT_CONFIG_PATH), false));
        assert_eq!(cli.log_level_override(), None);
    }
}
