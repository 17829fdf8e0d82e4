//! Core traits for the sync system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressObserver`]: Read the public addresses bound to an interface
//! - [`DnsProvider`]: Look up, create and update DNS records via provider APIs
//! - [`StateStore`]: Persist per-family sync state between ticks

pub mod address_observer;
pub mod dns_provider;
pub mod state_store;

pub use address_observer::{
    AddressObserver, ObservedAddrs, first_global_v4, first_global_v6, is_global_v4, is_global_v6,
};
pub use dns_provider::{DnsProvider, DnsRecord, RecordType};
pub use state_store::{FamilyState, StateStore, SyncState};
