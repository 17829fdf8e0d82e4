//! Core sync engine
//!
//! The engine runs one tick at a time:
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────┐      ┌─────────────┐
//! │ AddressObserver  │ ───> │  Reconciler  │ ───> │ DnsProvider │
//! └──────────────────┘      └──────┬───────┘      └─────────────┘
//!                                  │
//!                           ┌──────▼───────┐
//!                           │  StateStore  │
//!                           └──────────────┘
//! ```
//!
//! The [`Reconciler`] holds the decision logic: given the prior per-family
//! state and a freshly observed address, it determines exactly which domains
//! need a provider call and accumulates the new reconciled set from the
//! calls that succeeded. [`SyncEngine::run_tick`] wires it to the observer
//! and the store.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::traits::{AddressObserver, DnsProvider, FamilyState, RecordType, StateStore};
use std::net::IpAddr;
use tracing::{debug, error, info, warn};

/// Per-family reconciliation over a configured domain list
///
/// Borrowed from the engine for the duration of one tick; holds no state of
/// its own.
pub struct Reconciler<'a> {
    provider: &'a dyn DnsProvider,
    domains: &'a [String],
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over `domains`, in configured order
    pub fn new(provider: &'a dyn DnsProvider, domains: &'a [String]) -> Self {
        Self { provider, domains }
    }

    /// Reconcile one address family and return the new reconciled set
    ///
    /// When `observed` equals the prior address, only domains missing from
    /// the prior reconciled set are touched, so a partial failure from the
    /// last tick is retried without re-updating domains that already
    /// succeeded. When the address changed (or nothing was ever synced), the
    /// prior set is stale and every configured domain is attempted against a
    /// fresh, empty result.
    ///
    /// Failures are per-domain: a provider error is logged and the loop
    /// moves on, leaving that domain out of the returned set. The returned
    /// vector is always a fresh allocation, never an alias of `prior`.
    pub async fn reconcile(
        &self,
        prior: &FamilyState,
        observed: IpAddr,
        record_type: RecordType,
    ) -> Vec<String> {
        let unchanged = prior.last_ip == Some(observed);

        let to_update: Vec<&str> = if unchanged {
            self.domains
                .iter()
                .filter(|d| !prior.is_reconciled(d))
                .map(String::as_str)
                .collect()
        } else {
            self.domains.iter().map(String::as_str).collect()
        };

        let mut reconciled = if unchanged {
            prior.last_update_domains.clone()
        } else {
            Vec::new()
        };

        if to_update.is_empty() {
            debug!(%record_type, ip = %observed, "no domains need updating");
            return reconciled;
        }

        for domain in to_update {
            match self.update_domain(domain, record_type, observed).await {
                Ok(()) => {
                    if !reconciled.iter().any(|d| d == domain) {
                        reconciled.push(domain.to_string());
                    }
                }
                Err(e) => {
                    error!(domain, %record_type, "failed to update DNS record: {e}");
                }
            }
        }

        reconciled
    }

    /// Create-or-update one domain's record to point at `ip`
    ///
    /// When more than one record matches the lookup, only the first is
    /// updated; the duplicates are left alone.
    async fn update_domain(&self, domain: &str, record_type: RecordType, ip: IpAddr) -> Result<()> {
        let records = self.provider.lookup(record_type, domain).await?;

        match records.first() {
            None => {
                info!(domain, %record_type, %ip, "record does not exist, creating");
                self.provider.create(record_type, domain, ip).await?;
                Ok(())
            }
            Some(existing) => {
                if records.len() > 1 {
                    debug!(
                        domain,
                        %record_type,
                        count = records.len(),
                        "multiple records match, updating only the first"
                    );
                }
                info!(domain, %record_type, %ip, "record exists, updating");
                self.provider
                    .update(record_type, domain, ip, &existing.id)
                    .await
            }
        }
    }
}

/// One observe → reconcile → persist cycle per call
///
/// The engine owns its collaborators; the daemon rebuilds the whole engine
/// when configuration is hot-reloaded so a reload is all-or-nothing.
pub struct SyncEngine {
    observer: Box<dyn AddressObserver>,
    provider: Box<dyn DnsProvider>,
    store: Box<dyn StateStore>,
    config: SyncConfig,
}

impl SyncEngine {
    /// Create a new engine; fails when the configuration is invalid
    pub fn new(
        observer: Box<dyn AddressObserver>,
        provider: Box<dyn DnsProvider>,
        store: Box<dyn StateStore>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            observer,
            provider,
            store,
            config,
        })
    }

    /// Run one tick
    ///
    /// An observation error aborts the tick with state untouched. A family
    /// that is disabled, or for which no address was observed, keeps its
    /// prior state verbatim. A failed state save is logged and swallowed:
    /// the reconciliation already happened, the result is simply not durable
    /// for this tick.
    pub async fn run_tick(&self) -> Result<()> {
        let observed = self.observer.observe(&self.config.interface).await?;

        info!(
            interface = %self.config.interface,
            ipv4 = %fmt_opt(observed.ipv4),
            ipv6 = %fmt_opt(observed.ipv6),
            "observed interface addresses"
        );

        let prior = self.store.load().await;
        let mut next = prior.clone();

        let reconciler = Reconciler::new(self.provider.as_ref(), &self.config.domains);

        if self.config.ipv4 {
            match observed.ipv4 {
                Some(ip) => {
                    let ip = IpAddr::V4(ip);
                    let domains = reconciler.reconcile(&prior.ipv4, ip, RecordType::A).await;
                    next.ipv4 = FamilyState {
                        last_ip: Some(ip),
                        last_update_domains: domains,
                    };
                }
                None => {
                    warn!(
                        interface = %self.config.interface,
                        "no public IPv4 address observed, skipping A records"
                    );
                }
            }
        }

        if self.config.ipv6 {
            match observed.ipv6 {
                Some(ip) => {
                    let ip = IpAddr::V6(ip);
                    let domains = reconciler
                        .reconcile(&prior.ipv6, ip, RecordType::Aaaa)
                        .await;
                    next.ipv6 = FamilyState {
                        last_ip: Some(ip),
                        last_update_domains: domains,
                    };
                }
                None => {
                    warn!(
                        interface = %self.config.interface,
                        "no public IPv6 address observed, skipping AAAA records"
                    );
                }
            }
        }

        if let Err(e) = self.store.save(&next).await {
            error!("failed to persist sync state: {e}");
        }

        Ok(())
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

fn fmt_opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
