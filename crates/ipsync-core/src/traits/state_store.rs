// # State Store Trait
//
// Defines the interface for persisting sync state between ticks, and the
// state model itself.
//
// ## Purpose
//
// The store remembers, per address family, the last IP that was pushed to
// the provider and the set of domains confirmed to point at it. That record
// is what lets a tick decide to do nothing at all, and what lets a partially
// failed tick retry only the domains that failed.
//
// ## Implementations
//
// - File-based (JSON under the system temp dir): default for the daemon
// - In-memory: tests and embedding

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Per-family sync state
///
/// `last_update_domains` is meaningful only relative to `last_ip`: it lists
/// the domains whose provider-side record was last successfully set to
/// `last_ip`. It is a semantic set; the vector form keeps a stable order for
/// readable state files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyState {
    /// Last successfully synced address, `None` before the first sync
    #[serde(with = "ip_string")]
    pub last_ip: Option<IpAddr>,

    /// Domains confirmed to point at `last_ip`
    pub last_update_domains: Vec<String>,
}

impl FamilyState {
    /// Whether `domain` is already reconciled to `last_ip`
    pub fn is_reconciled(&self, domain: &str) -> bool {
        self.last_update_domains.iter().any(|d| d == domain)
    }
}

/// Full sync state, one record per address family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub ipv4: FamilyState,
    pub ipv6: FamilyState,
}

/// Trait for state store implementations
///
/// `load` never fails the caller: a missing, unreadable or corrupt backing
/// store degrades to the all-empty state (the next tick simply re-verifies
/// everything against the provider). `save` reports failures so the tick can
/// log them, but a failed save is not fatal either.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state, or the empty state when none is usable
    async fn load(&self) -> SyncState;

    /// Persist the state
    async fn save(&self, state: &SyncState) -> Result<(), crate::Error>;
}

/// `Option<IpAddr>` as a plain string field, empty string meaning "unknown"
mod ip_string {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::net::IpAddr;

    pub fn serialize<S: Serializer>(ip: &Option<IpAddr>, ser: S) -> Result<S::Ok, S::Error> {
        match ip {
            Some(ip) => ser.serialize_str(&ip.to_string()),
            None => ser.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<IpAddr>, D::Error> {
        let raw = String::deserialize(de)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(de::Error::custom)
    }
}
