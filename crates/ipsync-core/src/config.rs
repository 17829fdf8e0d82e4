//! Configuration types for the sync system
//!
//! The daemon builds a [`SyncConfig`] from its environment; embedders build
//! one directly. Validation lives here so every entry point enforces the
//! same rules.

use serde::{Deserialize, Serialize};

/// Default tick interval when none is configured
pub const DEFAULT_INTERVAL_SECS: u64 = 120;

/// Settings consumed by the sync engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Network interface to observe (e.g. "eth0")
    pub interface: String,

    /// Domains to keep in sync, in configured order
    pub domains: Vec<String>,

    /// Whether IPv4 (A record) sync is enabled
    #[serde(default)]
    pub ipv4: bool,

    /// Whether IPv6 (AAAA record) sync is enabled
    #[serde(default)]
    pub ipv6: bool,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interface.trim().is_empty() {
            return Err(crate::Error::config("interface must not be empty"));
        }
        if self.domains.is_empty() {
            return Err(crate::Error::config(
                "at least one domain must be configured",
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated domain list, trimming entries and dropping empties
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
