//! `platin`: command-line remote for Platin audio hubs.
//!
//! # Usage
//!
//! ```text
//! platin [OPTIONS] <COMMAND>
//!
//! Commands:
//!   power   [on|off|toggle]     Show or change the power state
//!   source  [active|select N]   List, show, or select the input source
//!   volume  [set LEVEL]         Show or set the volume (0-100)
//!   status                      Power, volume, and sources at once
//!
//! Options:
//!   -a, --address <HOST>   Hub hostname or IP [env: PLATIN_ADDRESS]
//!   -q, --quiet            Print bare values only
//!   -c, --config <PATH>    Config file instead of the platform default
//! ```
//!
//! Results go to stdout; failures and logs go to stderr.  The exit status is
//! 1 if any step failed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use platin_client::infrastructure::storage::config::{
    load_config, load_config_from, AppConfig, ConfigError,
};
use platin_client::presentation::{
    failure_hint, format_active_source, format_failure, format_power, format_sources,
    format_volume,
};
use platin_client::{Hub, HubError, TcpTransport};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote control for Platin audio hubs.
#[derive(Debug, Parser)]
#[command(name = "platin", about = "Remote control for Platin audio hubs", version)]
struct Cli {
    /// Hostname or IP address of the hub.
    ///
    /// Overrides `address` in the `[hub]` section of the config file.
    #[arg(short, long, env = "PLATIN_ADDRESS", global = true)]
    address: Option<String>,

    /// Print bare values without labels.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Read settings from this file instead of the platform config directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the power state, or switch it.
    Power {
        #[arg(value_enum)]
        action: Option<PowerAction>,
    },
    /// List the input sources, or show or select the active one.
    Source {
        #[command(subcommand)]
        action: Option<SourceAction>,
    },
    /// Show the volume, or set it.
    Volume {
        #[command(subcommand)]
        action: Option<VolumeAction>,
    },
    /// Show power, volume, and sources.
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PowerAction {
    On,
    Off,
    Toggle,
}

#[derive(Debug, Subcommand)]
enum SourceAction {
    /// Show the active source.
    Active,
    /// Make the named source active.  The name must match exactly.
    Select { name: String },
}

#[derive(Debug, Subcommand)]
enum VolumeAction {
    /// Set the volume level.
    Set {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },
}

impl Cli {
    /// Reads the config file named by `--config`, or the default one.
    ///
    /// A missing default file, or a platform without a config directory,
    /// yields defaults.
    fn load_app_config(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => match load_config() {
                Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
                other => other.context("failed to load config"),
            },
        }
    }
}

// ── Command execution ─────────────────────────────────────────────────────────

/// Prints a failure to stderr and converts the result into an `Option`.
fn report<T>(doing: &str, result: Result<T, HubError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{doing} failed: {e:?}");
            eprintln!("{}", format_failure(doing, &e));
            if let Some(hint) = failure_hint(&e) {
                eprintln!("{hint}");
            }
            None
        }
    }
}

async fn show_power(hub: &Hub<TcpTransport>, quiet: bool) -> bool {
    report("reading power", hub.power().await)
        .map(|on| println!("{}", format_power(on, quiet)))
        .is_some()
}

async fn show_volume(hub: &Hub<TcpTransport>, quiet: bool) -> bool {
    report("reading volume", hub.volume().await)
        .map(|level| println!("{}", format_volume(level, quiet)))
        .is_some()
}

async fn show_sources(hub: &Hub<TcpTransport>, quiet: bool) -> bool {
    report("listing sources", hub.sources().await)
        .map(|sources| println!("{}", format_sources(&sources, quiet)))
        .is_some()
}

async fn show_active_source(hub: &Hub<TcpTransport>, quiet: bool) -> bool {
    report("reading active source", hub.active_source().await)
        .map(|source| println!("{}", format_active_source(&source, quiet)))
        .is_some()
}

/// Runs one command.  Returns `true` if every step succeeded.
async fn execute(hub: &Hub<TcpTransport>, command: Command, quiet: bool) -> bool {
    match command {
        Command::Power { action: None } => show_power(hub, quiet).await,
        Command::Power {
            action: Some(action),
        } => {
            let result = match action {
                PowerAction::On => hub.set_power(true).await,
                PowerAction::Off => hub.set_power(false).await,
                PowerAction::Toggle => hub.toggle_power().await,
            };
            report("setting power", result).is_some() && show_power(hub, quiet).await
        }

        Command::Source { action: None } => show_sources(hub, quiet).await,
        Command::Source {
            action: Some(SourceAction::Active),
        } => show_active_source(hub, quiet).await,
        Command::Source {
            action: Some(SourceAction::Select { name }),
        } => {
            let doing = format!("selecting source {name:?}");
            report(&doing, hub.set_source(&name).await).is_some()
                && show_active_source(hub, quiet).await
        }

        Command::Volume { action: None } => show_volume(hub, quiet).await,
        Command::Volume {
            action: Some(VolumeAction::Set { level }),
        } => {
            report("setting volume", hub.set_volume(level).await).is_some()
                && show_volume(hub, quiet).await
        }

        Command::Status => {
            // Each part is reported on its own; one failure does not hide the rest.
            let power = show_power(hub, quiet).await;
            let volume = show_volume(hub, quiet).await;
            let sources = show_sources(hub, quiet).await;
            power && volume && sources
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let app_config = cli.load_app_config()?;

    // Logs go to stderr so stdout carries only results.  RUST_LOG wins over
    // the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.cli.log_level)),
        )
        .init();

    let address = cli
        .address
        .clone()
        .or_else(|| app_config.hub.address.clone())
        .context("no hub address: pass --address, set PLATIN_ADDRESS, or set address in [hub]")?;
    let quiet = cli.quiet || app_config.cli.quiet;

    let hub_config = app_config.hub.to_hub_config(address);
    debug!("using hub at {}", hub_config.host);
    let hub = Hub::new(hub_config);

    if execute(&hub, cli.command, quiet).await {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("command finished with errors");
        Ok(ExitCode::FAILURE)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_power_without_action_shows_state() {
        // Arrange / Act
        let cli = Cli::parse_from(["platin", "-a", "hub.local", "power"]);

        // Assert
        assert!(matches!(cli.command, Command::Power { action: None }));
        assert_eq!(cli.address.as_deref(), Some("hub.local"));
    }

    #[test]
    fn test_cli_power_toggle_parses() {
        let cli = Cli::parse_from(["platin", "power", "toggle"]);
        assert!(matches!(
            cli.command,
            Command::Power {
                action: Some(PowerAction::Toggle)
            }
        ));
    }

    #[test]
    fn test_cli_global_flags_accepted_after_subcommand() {
        let cli = Cli::parse_from(["platin", "volume", "-q", "--address", "10.0.0.2"]);
        assert!(cli.quiet);
        assert_eq!(cli.address.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_cli_source_select_keeps_exact_name() {
        let cli = Cli::parse_from(["platin", "source", "select", "Living Room TV"]);
        match cli.command {
            Command::Source {
                action: Some(SourceAction::Select { name }),
            } => assert_eq!(name, "Living Room TV"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_volume_set_accepts_bounds() {
        for level in ["0", "100"] {
            let cli = Cli::parse_from(["platin", "volume", "set", level]);
            assert!(matches!(
                cli.command,
                Command::Volume {
                    action: Some(VolumeAction::Set { .. })
                }
            ));
        }
    }

    #[test]
    fn test_cli_volume_set_rejects_out_of_range() {
        assert!(Cli::try_parse_from(["platin", "volume", "set", "101"]).is_err());
        assert!(Cli::try_parse_from(["platin", "volume", "set", "-1"]).is_err());
    }

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["platin"]).is_err());
    }

    #[test]
    fn test_cli_config_path_is_used_when_given() {
        // Arrange: a path that does not exist loads as defaults.
        let path = std::env::temp_dir().join("platin-cli-test-missing.toml");
        let cli = Cli::parse_from(["platin", "-c", path.to_str().unwrap(), "status"]);

        // Act
        let cfg = cli.load_app_config().unwrap();

        // Assert
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_report_passes_success_through() {
        assert_eq!(report("reading power", Ok::<_, HubError>(7)), Some(7));
        assert_eq!(
            report::<u8>("reading power", Err(HubError::SourceNotFound)),
            None
        );
    }
}
