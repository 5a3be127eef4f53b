//! Command-line interface parsing for pokecache
//!
//! This module handles parsing of CLI arguments using clap and converts them
//! into the cache and HTTP client settings used at startup.

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;

use crate::cache::CacheConfig;
use crate::data::{ClientConfig, POKEAPI_BASE_URL};

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// A duration or count flag was zero
    #[error("Invalid value for {0}: must be greater than zero")]
    MustBePositive(&'static str),
}

/// pokecache - Browse the PokeAPI through an in-memory response cache
#[derive(Parser, Debug)]
#[command(name = "pokecache")]
#[command(about = "Browse PokeAPI location areas and Pokémon with an expiring response cache")]
#[command(version)]
pub struct Cli {
    /// How long a cached response lives, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 300, global = true)]
    pub ttl_secs: u64,

    /// Time between cache reaper passes, in seconds (defaults to the TTL)
    #[arg(long, value_name = "SECONDS", global = true)]
    pub reap_interval_secs: Option<u64>,

    /// HTTP request timeout, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 5, global = true)]
    pub timeout_secs: u64,

    /// PokeAPI root URL
    #[arg(long, value_name = "URL", default_value = POKEAPI_BASE_URL, global = true)]
    pub base_url: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List location areas page by page, then walk back through earlier pages
    ///
    /// Pages visited on the way forward are served from the cache on the way back.
    Map {
        /// Number of pages to walk forward
        #[arg(long, default_value_t = 2)]
        pages: u32,
    },
    /// List the Pokémon that can be encountered in a location area
    Explore {
        /// Location area name, e.g. pastoria-city-area
        area: String,
    },
    /// Show height, weight, stats and types of a Pokémon
    Inspect {
        /// Pokémon name, e.g. pikachu
        pokemon: String,
    },
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupConfig {
    /// HTTP client settings
    pub client: ClientConfig,
    /// Response cache settings
    pub cache: CacheConfig,
    /// Number of `-v` flags given
    pub verbosity: u8,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError::MustBePositive)` if a duration or page count is zero
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let ttl = positive_secs(cli.ttl_secs, "--ttl-secs")?;
        let timeout = positive_secs(cli.timeout_secs, "--timeout-secs")?;

        let mut cache = CacheConfig::new(ttl);
        if let Some(secs) = cli.reap_interval_secs {
            cache = cache.with_reap_interval(positive_secs(secs, "--reap-interval-secs")?);
        }

        if let Command::Map { pages: 0 } = cli.command {
            return Err(CliError::MustBePositive("--pages"));
        }

        Ok(StartupConfig {
            client: ClientConfig {
                base_url: cli.base_url.clone(),
                timeout,
            },
            cache,
            verbosity: cli.verbose,
        })
    }
}

fn positive_secs(secs: u64, flag: &'static str) -> Result<Duration, CliError> {
    if secs == 0 {
        return Err(CliError::MustBePositive(flag));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_map_defaults() {
        let cli = Cli::parse_from(["pokecache", "map"]);
        assert_eq!(cli.command, Command::Map { pages: 2 });
        assert_eq!(cli.ttl_secs, 300);
        assert!(cli.reap_interval_secs.is_none());
        assert_eq!(cli.timeout_secs, 5);
        assert_eq!(cli.base_url, POKEAPI_BASE_URL);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parse_explore() {
        let cli = Cli::parse_from(["pokecache", "explore", "pastoria-city-area"]);
        assert_eq!(
            cli.command,
            Command::Explore {
                area: "pastoria-city-area".to_string()
            }
        );
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pokecache", "inspect", "pikachu", "--ttl-secs", "30", "-vv"]);
        assert_eq!(cli.ttl_secs, 30);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["pokecache"]).is_err());
    }

    #[test]
    fn test_startup_config_default() {
        let config = StartupConfig::default();
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
        assert_eq!(config.cache.reap_interval, Duration::from_secs(300));
        assert_eq!(config.client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_startup_config_reap_interval_follows_ttl() {
        let cli = Cli::parse_from(["pokecache", "--ttl-secs", "60", "map"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.reap_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_startup_config_separate_reap_interval() {
        let cli = Cli::parse_from(["pokecache", "--ttl-secs", "60", "--reap-interval-secs", "10", "map"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.reap_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_startup_config_rejects_zero_ttl() {
        let cli = Cli::parse_from(["pokecache", "--ttl-secs", "0", "map"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert_eq!(err, CliError::MustBePositive("--ttl-secs"));
        assert!(err.to_string().contains("--ttl-secs"));
    }

    #[test]
    fn test_startup_config_rejects_zero_reap_interval() {
        let cli = Cli::parse_from(["pokecache", "--reap-interval-secs", "0", "map"]);
        assert_eq!(
            StartupConfig::from_cli(&cli).unwrap_err(),
            CliError::MustBePositive("--reap-interval-secs")
        );
    }

    #[test]
    fn test_startup_config_rejects_zero_pages() {
        let cli = Cli::parse_from(["pokecache", "map", "--pages", "0"]);
        assert_eq!(StartupConfig::from_cli(&cli).unwrap_err(), CliError::MustBePositive("--pages"));
    }
}
