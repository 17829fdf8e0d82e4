// # DNS Provider Trait
//
// Defines the primitives the reconciler needs from a DNS provider API:
// look records up by (type, name), create a record, update a record by id.
//
// ## Implementations
//
// - Cloudflare: `ipsync-provider-cloudflare` crate
//
// All three operations are single blocking API attempts. Providers must not
// retry or back off; the reconciler decides what happens on failure (log,
// skip the domain, try again next tick).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// DNS address record type, one per IP family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record type wire name ("A" or "AAAA")
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (the IP address as a string)
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// Each method is a single API attempt with a bounded timeout; errors are
/// propagated to the caller, never retried internally.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up existing records matching (type, name)
    ///
    /// Returns an empty vector when no record matches. Fails with
    /// [`crate::Error::Api`] on a non-success response envelope.
    async fn lookup(
        &self,
        record_type: RecordType,
        domain: &str,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a new record for `domain` pointing at `ip`
    ///
    /// The TTL is fixed by the implementation. Fails with
    /// [`crate::Error::EmptyResult`] when the provider reports success but
    /// returns no usable record identifier.
    async fn create(
        &self,
        record_type: RecordType,
        domain: &str,
        ip: IpAddr,
    ) -> Result<DnsRecord, crate::Error>;

    /// Update the record identified by `record_id` to point at `ip`
    async fn update(
        &self,
        record_type: RecordType,
        domain: &str,
        ip: IpAddr,
        record_id: &str,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
