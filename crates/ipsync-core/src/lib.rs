// # ipsync-core
//
// Core library for the interface-to-DNS synchronizer.
//
// ## Architecture Overview
//
// - **AddressObserver**: Trait for reading an interface's public addresses
// - **DnsProvider**: Trait for DNS record lookup/create/update via provider APIs
// - **StateStore**: Trait for persisting per-family sync state between ticks
// - **Reconciler / SyncEngine**: Decide which domains need a provider call
//   and run the observe → reconcile → persist cycle
//
// The engine only issues provider calls when the observed address or the
// configured domain set actually changed since the last successful sync;
// everything else in the tree is I/O plumbing around that decision.

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::SyncConfig;
pub use engine::{Reconciler, SyncEngine};
pub use error::{Error, Result};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{
    AddressObserver, DnsProvider, DnsRecord, FamilyState, ObservedAddrs, RecordType, StateStore,
    SyncState,
};
