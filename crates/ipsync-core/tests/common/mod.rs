//! Test doubles and common utilities for the sync contract tests

#![allow(dead_code)]

use async_trait::async_trait;
use ipsync_core::error::{Error, Result};
use ipsync_core::traits::{
    AddressObserver, DnsProvider, DnsRecord, ObservedAddrs, RecordType, StateStore, SyncState,
};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// One recorded provider call, in invocation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Lookup {
        record_type: RecordType,
        domain: String,
    },
    Create {
        record_type: RecordType,
        domain: String,
        ip: IpAddr,
    },
    Update {
        record_type: RecordType,
        domain: String,
        ip: IpAddr,
        record_id: String,
    },
}

impl ProviderCall {
    pub fn domain(&self) -> &str {
        match self {
            ProviderCall::Lookup { domain, .. }
            | ProviderCall::Create { domain, .. }
            | ProviderCall::Update { domain, .. } => domain,
        }
    }
}

/// A scriptable DnsProvider that records every call
///
/// Clones share their interior, so a clone can be boxed into an engine while
/// the test keeps inspecting the original.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    /// Records served by lookup, keyed by domain
    existing: Arc<Mutex<HashMap<String, Vec<DnsRecord>>>>,
    /// Domains whose calls fail with an injected API error
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve an existing record for `domain` on subsequent lookups
    pub fn add_record(&self, record_type: RecordType, domain: &str, id: &str, content: &str) {
        let record = DnsRecord {
            id: id.to_string(),
            record_type: record_type.as_str().to_string(),
            name: domain.to_string(),
            content: content.to_string(),
            ttl: 120,
        };
        self.existing
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(record);
    }

    /// Make every call touching `domain` fail
    pub fn fail_domain(&self, domain: &str) {
        self.failing.lock().unwrap().insert(domain.to_string());
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls whose domain equals `domain`
    pub fn calls_for(&self, domain: &str) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.domain() == domain)
            .collect()
    }

    fn check_failure(&self, domain: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(domain) {
            return Err(Error::api(1000, format!("injected failure for {domain}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn lookup(&self, record_type: RecordType, domain: &str) -> Result<Vec<DnsRecord>> {
        self.calls.lock().unwrap().push(ProviderCall::Lookup {
            record_type,
            domain: domain.to_string(),
        });
        self.check_failure(domain)?;
        Ok(self
            .existing
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, record_type: RecordType, domain: &str, ip: IpAddr) -> Result<DnsRecord> {
        self.calls.lock().unwrap().push(ProviderCall::Create {
            record_type,
            domain: domain.to_string(),
            ip,
        });
        self.check_failure(domain)?;

        let record = DnsRecord {
            id: format!("created-{domain}"),
            record_type: record_type.as_str().to_string(),
            name: domain.to_string(),
            content: ip.to_string(),
            ttl: 120,
        };
        self.existing
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        record_type: RecordType,
        domain: &str,
        ip: IpAddr,
        record_id: &str,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(ProviderCall::Update {
            record_type,
            domain: domain.to_string(),
            ip,
            record_id: record_id.to_string(),
        });
        self.check_failure(domain)?;

        if let Some(records) = self.existing.lock().unwrap().get_mut(domain) {
            if let Some(record) = records.iter_mut().find(|r| r.id == record_id) {
                record.content = ip.to_string();
            }
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An observer that always reports the same addresses
pub struct FixedObserver {
    addrs: ObservedAddrs,
}

impl FixedObserver {
    pub fn new(ipv4: Option<&str>, ipv6: Option<&str>) -> Self {
        Self {
            addrs: ObservedAddrs {
                ipv4: ipv4.map(|s| s.parse().unwrap()),
                ipv6: ipv6.map(|s| s.parse().unwrap()),
            },
        }
    }
}

#[async_trait]
impl AddressObserver for FixedObserver {
    async fn observe(&self, _interface: &str) -> Result<ObservedAddrs> {
        Ok(self.addrs)
    }
}

/// An observer whose enumeration always fails
pub struct FailingObserver;

#[async_trait]
impl AddressObserver for FailingObserver {
    async fn observe(&self, interface: &str) -> Result<ObservedAddrs> {
        Err(Error::observe(format!(
            "injected enumeration failure on {interface}"
        )))
    }
}

/// A store whose save always fails (loads stay empty)
pub struct FailingStateStore;

#[async_trait]
impl StateStore for FailingStateStore {
    async fn load(&self) -> SyncState {
        SyncState::default()
    }

    async fn save(&self, _state: &SyncState) -> Result<()> {
        Err(Error::state_store("injected save failure"))
    }
}

/// Shorthand for building the configured domain list
pub fn domains(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
