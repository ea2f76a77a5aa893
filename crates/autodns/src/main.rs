// # autodns - AutoDNS command line
//
// Thin integration layer: reads configuration from the environment, builds
// the file stores and the DNS provider, and hands control to autodns-core.
// No reconciliation logic lives here.
//
// ## Commands
//
// - `autodns run`: repoint DNS records whose network address changed
// - `autodns add <network_name> [name]`: pin a network into the cache
//
// ## Configuration
//
// All configuration is done via environment variables, optionally read
// from a `.env` file first (`--env-file`). Variables already set in the
// process environment win over the file.
//
// ### Files
// - `AUTO_DNS_CACHE_FILE`: Cache file path
// - `NETWORK_IP_MAP_FILE`: Network to address map file path
//
// ### DNS Provider (only needed by `run`)
// - `CLOUDFLARE_API_TOKEN`: API token
// - `CLOUDFLARE_ZONE`: Zone name
// - `CLOUDFLARE_ZONE_ID`: Zone ID (optional, skips the zone lookup)
//
// ### Behavior
// - `AUTO_DNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `AUTO_DNS_MODE`: `dry-run` to log record edits without sending them
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
// export CLOUDFLARE_ZONE=example.com
// export AUTO_DNS_CACHE_FILE=/var/lib/autodns/cache.json
// export NETWORK_IP_MAP_FILE=/var/lib/autodns/map.json
//
// autodns add home "Home Router"
// autodns run
// ```

use anyhow::{Context, Result};
use autodns_core::{
    AutoDnsConfig, AutoDnsEngine, Error, FileCacheStore, FileMappingSource, ProviderConfig,
    ReconcileReport, Upsert,
};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the ways a command can end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutoDnsExitCode {
    /// Every entry processed
    Success = 0,
    /// Configuration error, unreadable mapping or corrupt cache
    ConfigError = 1,
    /// The run finished but some entries failed, or `add` named an unknown network
    PartialFailure = 2,
}

impl From<AutoDnsExitCode> for ExitCode {
    fn from(code: AutoDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl AutoDnsExitCode {
    fn for_error(err: &Error) -> Self {
        if err.is_per_entry() || matches!(err, Error::RunFailed { .. }) {
            Self::PartialFailure
        } else {
            Self::ConfigError
        }
    }
}

/// Keep DNS records pointed at networks whose public address changes
#[derive(Debug, Parser)]
#[command(name = "autodns", version, about)]
struct Cli {
    /// dotenv file read before the environment (missing file is fine)
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Repoint records for every cached network whose address changed
    Run,
    /// Add a network to the cache, or refresh it if already present
    Add {
        /// Network name as it appears in the address map
        network_name: String,
        /// Display name for the cache entry (defaults to the network name)
        name: Option<String>,
    },
}

/// Raw settings as read from the environment
struct Config {
    cache_file: String,
    map_file: String,
    api_token: Option<String>,
    zone_name: Option<String>,
    zone_id: Option<String>,
    log_level: String,
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("cache_file", &self.cache_file)
            .field("map_file", &self.map_file)
            .field("api_token", &self.api_token.as_ref().map(|_| "<REDACTED>"))
            .field("zone_name", &self.zone_name)
            .field("zone_id", &self.zone_id)
            .field("log_level", &self.log_level)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, treating empty values as unset
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let cache_file = get("AUTO_DNS_CACHE_FILE").context(
            "AUTO_DNS_CACHE_FILE is required. \
            Set it via: export AUTO_DNS_CACHE_FILE=/var/lib/autodns/cache.json",
        )?;
        let map_file = get("NETWORK_IP_MAP_FILE").context(
            "NETWORK_IP_MAP_FILE is required. \
            Set it via: export NETWORK_IP_MAP_FILE=/var/lib/autodns/map.json",
        )?;

        let dry_run = match get("AUTO_DNS_MODE").as_deref() {
            None | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "AUTO_DNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            cache_file,
            map_file,
            api_token: get("CLOUDFLARE_API_TOKEN"),
            zone_name: get("CLOUDFLARE_ZONE"),
            zone_id: get("CLOUDFLARE_ZONE_ID"),
            log_level: get("AUTO_DNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            dry_run,
        })
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "AUTO_DNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Typed configuration for the core
    fn to_core(&self) -> AutoDnsConfig {
        let config = AutoDnsConfig::new(&self.cache_file, &self.map_file);
        match &self.api_token {
            Some(api_token) => config.with_provider(ProviderConfig::Cloudflare {
                api_token: api_token.clone(),
                zone_name: self.zone_name.clone(),
                zone_id: self.zone_id.clone(),
                dry_run: self.dry_run,
            }),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::from_path(&cli.env_file)
        && !e.not_found()
    {
        eprintln!("Failed to read {}: {}", cli.env_file.display(), e);
        return AutoDnsExitCode::ConfigError.into();
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AutoDnsExitCode::ConfigError.into();
        }
    };

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return AutoDnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AutoDnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AutoDnsExitCode::ConfigError.into();
        }
    };

    let code = rt.block_on(async {
        match cli.command {
            Command::Run => run(&config).await,
            Command::Add { network_name, name } => {
                add(&config, &network_name, name.as_deref()).await
            }
        }
    });

    code.into()
}

fn engine_for(config: &AutoDnsConfig) -> AutoDnsEngine {
    AutoDnsEngine::new(
        Box::new(FileCacheStore::new(&config.cache_path)),
        Box::new(FileMappingSource::new(&config.mapping_path)),
    )
}

/// Reconcile every cached network against the map
async fn run(config: &Config) -> AutoDnsExitCode {
    let core = config.to_core();
    if core.provider.is_none() {
        error!(
            "CLOUDFLARE_API_TOKEN is required for `autodns run`. \
            Set it via: export CLOUDFLARE_API_TOKEN=your_token"
        );
        return AutoDnsExitCode::ConfigError;
    }
    let provider = match core.validate().and_then(|()| core.require_provider()) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Configuration validation error: {}", e);
            return AutoDnsExitCode::ConfigError;
        }
    };

    let remapper = match build_remapper(provider) {
        Ok(remapper) => remapper,
        Err(e) => {
            error!("Failed to create DNS provider: {:#}", e);
            return AutoDnsExitCode::ConfigError;
        }
    };

    info!("Starting AutoDNS run (provider: {})", provider.type_name());
    match engine_for(&core).run(remapper.as_ref()).await {
        Ok(report) => {
            log_summary(&report);
            match report.into_result() {
                Ok(_) => AutoDnsExitCode::Success,
                Err(e) => {
                    error!("{}", e);
                    AutoDnsExitCode::for_error(&e)
                }
            }
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            AutoDnsExitCode::for_error(&e)
        }
    }
}

/// Pin one network into the cache
async fn add(config: &Config, network_name: &str, display_name: Option<&str>) -> AutoDnsExitCode {
    // Provider settings are irrelevant here
    let core = config.to_core();
    if let Err(e) = core.validate_paths() {
        error!("Configuration validation error: {}", e);
        return AutoDnsExitCode::ConfigError;
    }

    match engine_for(&core).add(network_name, display_name).await {
        Ok(Upsert::Inserted) => {
            info!("Added {} to the cache", network_name);
            AutoDnsExitCode::Success
        }
        Ok(Upsert::Updated) => {
            info!("Refreshed {} in the cache", network_name);
            AutoDnsExitCode::Success
        }
        Err(e) => {
            error!("Add failed: {}", e);
            AutoDnsExitCode::for_error(&e)
        }
    }
}

fn log_summary(report: &ReconcileReport) {
    if report.outcomes().is_empty() {
        warn!("Cache is empty; add networks with `autodns add <network_name>`");
        return;
    }
    info!(
        remapped = report.remapped_count(),
        first_seen = report.first_seen_count(),
        unchanged = report.unchanged_count(),
        failed = report.failure_count(),
        "Run finished"
    );
}

#[cfg(feature = "cloudflare")]
fn build_remapper(provider: &ProviderConfig) -> Result<Box<dyn autodns_core::DnsRemap>> {
    info!("Using {} provider", provider.type_name());
    let remapper = autodns_provider_cloudflare::CloudflareRemapper::from_config(provider)?;
    Ok(Box::new(remapper))
}

#[cfg(not(feature = "cloudflare"))]
fn build_remapper(provider: &ProviderConfig) -> Result<Box<dyn autodns_core::DnsRemap>> {
    anyhow::bail!(
        "Provider '{}' is not compiled in. Rebuild with the `cloudflare` feature.",
        provider.type_name()
    )
}
