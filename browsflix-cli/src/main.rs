//! Browsflix CLI - Command-line interface
//!
//! Browse and search the movie catalog from a terminal, or run the catalog
//! proxy.

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use browsflix_core::BrowsflixConfig;
use browsflix_core::tracing_setup::{CliLogLevel, init_tracing};
use clap::Parser;

#[derive(Parser)]
#[command(name = "browsflix")]
#[command(about = "Search and browse the movie catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: CliLogLevel,

    /// Directory for the full debug log of this run
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    /// Catalog proxy base URL
    #[arg(long, global = true)]
    proxy_url: Option<String>,

    /// Upstream provider base URL used when the proxy is unreachable
    #[arg(long, global = true)]
    provider_url: Option<String>,

    /// Quiet interval before typed input is searched, in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    fn config(&self) -> BrowsflixConfig {
        let mut config = BrowsflixConfig::from_env();

        if let Some(url) = &self.proxy_url {
            config.catalog.proxy_base_url.clone_from(url);
        }
        if let Some(url) = &self.provider_url {
            config.catalog.provider_base_url.clone_from(url);
        }
        if let Some(millis) = self.debounce_ms {
            config.session.debounce_interval = Duration::from_millis(millis);
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref()) {
        eprintln!("Warning: Failed to initialize logging: {e}");
    }

    let config = cli.config();
    if let Err(e) = config.validate() {
        anyhow::bail!(e.user_message());
    }

    commands::run_command(cli.command, config).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "browsflix",
            "search",
            "heat",
            "--proxy-url",
            "http://localhost:8080",
            "--debounce-ms",
            "250",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.catalog.proxy_base_url, "http://localhost:8080");
        assert_eq!(config.session.debounce_interval, Duration::from_millis(250));
        assert!(matches!(
            cli.command,
            commands::Commands::Search { ref query } if query == "heat"
        ));
    }

    #[test]
    fn test_log_level_parses_value_enum() {
        let cli = Cli::try_parse_from(["browsflix", "--log-level", "debug", "browse"]).unwrap();
        assert_eq!(cli.log_level, CliLogLevel::Debug);
    }
}
