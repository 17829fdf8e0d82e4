// # ipsyncd - sync daemon
//
// The daemon is a thin integration layer: it reads configuration, sets up
// logging, wires the concrete collaborators (netlink observer, Cloudflare
// provider, file state store) into a SyncEngine and runs the tick loop.
// All sync logic lives in ipsync-core.
//
// ## Configuration
//
// Read from the process environment, with a `.env` file overlaid on every
// load so edits are picked up by the per-tick hot reload:
//
// - `IPSYNC_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
// - `IPSYNC_ZONE_ID`: Cloudflare zone identifier (required)
// - `IPSYNC_API_TOKEN`: Cloudflare API token (required)
// - `IPSYNC_INTERFACE`: network interface to observe (required)
// - `IPSYNC_DOMAINS`: comma-separated domains to keep in sync (required)
// - `IPSYNC_IPV4`: "1" or "true" to sync A records
// - `IPSYNC_IPV6`: "1" or "true" to sync AAAA records
// - `IPSYNC_INTERVAL_SECS`: seconds between ticks (default: 120)
//
// ## Example
//
// ```bash
// export IPSYNC_ZONE_ID=0123456789abcdef
// export IPSYNC_API_TOKEN=your_token
// export IPSYNC_INTERFACE=eth0
// export IPSYNC_DOMAINS=example.com,www.example.com
// export IPSYNC_IPV4=1
//
// ipsyncd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use ipsync_core::config::{DEFAULT_INTERVAL_SECS, SyncConfig, parse_domain_list};
use ipsync_core::{FileStateStore, SyncEngine};
use ipsync_ip_netlink::NetlinkObserver;
use ipsync_provider_cloudflare::CloudflareProvider;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Exit codes following systemd conventions
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration, one snapshot per load
#[derive(Debug, Clone)]
struct Config {
    log_level: String,
    zone_id: String,
    api_token: String,
    interface: String,
    domains: Vec<String>,
    ipv4: bool,
    ipv6: bool,
    interval_secs: u64,
}

impl Config {
    /// Read configuration from `.env` and the process environment
    fn from_env() -> Self {
        // Overlay .env on every load so per-tick reloads see file edits;
        // a missing .env is ordinary.
        dotenvy::dotenv_override().ok();

        Self {
            log_level: env_trimmed("IPSYNC_LOG_LEVEL"),
            zone_id: env_trimmed("IPSYNC_ZONE_ID"),
            api_token: env_trimmed("IPSYNC_API_TOKEN"),
            interface: env_trimmed("IPSYNC_INTERFACE"),
            domains: parse_domain_list(&env_trimmed("IPSYNC_DOMAINS")),
            ipv4: parse_flag(&env_trimmed("IPSYNC_IPV4")),
            ipv6: parse_flag(&env_trimmed("IPSYNC_IPV6")),
            interval_secs: parse_interval(&env_trimmed("IPSYNC_INTERVAL_SECS")),
        }
    }

    /// Validate required settings
    fn validate(&self) -> Result<()> {
        if !self.log_level.is_empty() && Level::from_str(&self.log_level).is_err() {
            anyhow::bail!(
                "IPSYNC_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }
        if self.zone_id.is_empty() {
            anyhow::bail!("IPSYNC_ZONE_ID is required");
        }
        if self.api_token.is_empty() {
            anyhow::bail!("IPSYNC_API_TOKEN is required");
        }
        if self.interface.is_empty() {
            anyhow::bail!("IPSYNC_INTERFACE is required");
        }
        if self.domains.is_empty() {
            anyhow::bail!("IPSYNC_DOMAINS must contain at least one domain");
        }
        Ok(())
    }

    /// Log level, defaulting to INFO on empty or unparseable values
    fn level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            interface: self.interface.clone(),
            domains: self.domains.clone(),
            ipv4: self.ipv4,
            ipv6: self.ipv6,
        }
    }
}

fn env_trimmed(name: &str) -> String {
    env::var(name).unwrap_or_default().trim().to_string()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true")
}

fn parse_interval(value: &str) -> u64 {
    match value.parse::<i64>() {
        Ok(secs) if secs > 0 => secs as u64,
        _ => DEFAULT_INTERVAL_SECS,
    }
}

/// Load and validate a configuration snapshot
fn load_config() -> Result<Config> {
    let config = Config::from_env();
    config.validate()?;
    Ok(config)
}

/// Build a fresh engine from a validated configuration
///
/// Built as a unit so hot reload swaps config, provider and engine together
/// or not at all.
fn build_engine(config: &Config) -> Result<SyncEngine> {
    let provider = CloudflareProvider::new(&config.zone_id, &config.api_token)?;
    let engine = SyncEngine::new(
        Box::new(NetlinkObserver::new()),
        Box::new(provider),
        Box::new(FileStateStore::default()),
        config.sync_config(),
    )?;
    Ok(engine)
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return SyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {e}");
        return SyncExitCode::ConfigError.into();
    }

    info!(
        zone = %config.zone_id,
        interface = %config.interface,
        domains = ?config.domains,
        "configuration loaded"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return SyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => SyncExitCode::CleanShutdown,
            Err(e) => {
                error!("daemon error: {e}");
                SyncExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the tick loop until a shutdown signal arrives
async fn run_daemon(mut config: Config) -> Result<()> {
    let mut engine = build_engine(&config)?;
    let mut shutdown = ShutdownSignal::new()?;

    info!(
        interval_secs = config.interval_secs,
        "starting sync loop"
    );

    // First tick runs immediately; failures here self-heal on later ticks
    if let Err(e) = engine.run_tick().await {
        error!("sync tick failed: {e}");
    }

    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.interval()) => {}
            name = shutdown.recv() => {
                info!("received {name}, shutting down");
                return Ok(());
            }
        }

        // Hot reload between ticks. The swap is all-or-nothing: any failure
        // leaves the previous config, provider and engine in effect.
        match load_config().and_then(|latest| Ok((build_engine(&latest)?, latest))) {
            Ok((rebuilt, latest)) => {
                config = latest;
                engine = rebuilt;
                info!(
                    zone = %config.zone_id,
                    interface = %config.interface,
                    domains = ?config.domains,
                    interval_secs = config.interval_secs,
                    "configuration reloaded"
                );
            }
            Err(e) => {
                warn!("config reload failed, keeping previous configuration: {e}");
            }
        }

        if let Err(e) = engine.run_tick().await {
            error!("sync tick failed: {e}");
        }
    }
}

/// SIGTERM/SIGINT listener held across loop iterations
#[cfg(unix)]
struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    fn new() -> Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// Fallback for non-Unix platforms (CTRL-C only)
#[cfg(not(unix))]
struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        tokio::signal::ctrl_c().await.ok();
        "SIGINT"
    }
}
