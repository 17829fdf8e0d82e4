//! Contract tests: one full tick through the engine
//!
//! Covers the tick lifecycle around the reconciler: what gets persisted,
//! what happens when a family has no address, and how observation and
//! persistence failures are contained.

mod common;

use common::*;
use ipsync_core::traits::{FamilyState, RecordType, StateStore, SyncState};
use ipsync_core::{MemoryStateStore, SyncConfig, SyncEngine};

fn config(ipv4: bool, ipv6: bool, names: &[&str]) -> SyncConfig {
    SyncConfig {
        interface: "eth0".into(),
        domains: domains(names),
        ipv4,
        ipv6,
    }
}

fn engine_with(
    observer: impl ipsync_core::AddressObserver + 'static,
    provider: &MockDnsProvider,
    store: &MemoryStateStore,
    config: SyncConfig,
) -> SyncEngine {
    SyncEngine::new(
        Box::new(observer),
        Box::new(provider.clone()),
        Box::new(store.clone()),
        config,
    )
    .expect("engine construction succeeds")
}

#[tokio::test]
async fn tick_persists_both_families() {
    let provider = MockDnsProvider::new();
    let store = MemoryStateStore::new();
    let engine = engine_with(
        FixedObserver::new(Some("203.0.113.7"), Some("2001:db8::1")),
        &provider,
        &store,
        config(true, true, &["example.com"]),
    );

    engine.run_tick().await.unwrap();

    let state = store.load().await;
    assert_eq!(state.ipv4.last_ip, Some("203.0.113.7".parse().unwrap()));
    assert_eq!(state.ipv4.last_update_domains, vec!["example.com"]);
    assert_eq!(state.ipv6.last_ip, Some("2001:db8::1".parse().unwrap()));
    assert_eq!(state.ipv6.last_update_domains, vec!["example.com"]);
}

#[tokio::test]
async fn second_tick_with_same_address_is_a_provider_noop() {
    let provider = MockDnsProvider::new();
    let store = MemoryStateStore::new();
    let engine = engine_with(
        FixedObserver::new(Some("203.0.113.7"), None),
        &provider,
        &store,
        config(true, false, &["example.com", "www.example.com"]),
    );

    engine.run_tick().await.unwrap();
    let calls_after_first = provider.call_count();
    assert!(calls_after_first > 0);

    engine.run_tick().await.unwrap();
    assert_eq!(provider.call_count(), calls_after_first);
}

#[tokio::test]
async fn family_without_observed_address_keeps_prior_state() {
    let prior_v6 = FamilyState {
        last_ip: Some("2001:db8::5".parse().unwrap()),
        last_update_domains: vec!["example.com".into()],
    };
    let store = MemoryStateStore::with_state(SyncState {
        ipv4: FamilyState::default(),
        ipv6: prior_v6.clone(),
    });

    let provider = MockDnsProvider::new();
    let engine = engine_with(
        // v6 enabled but not observed this tick
        FixedObserver::new(Some("203.0.113.7"), None),
        &provider,
        &store,
        config(true, true, &["example.com"]),
    );

    engine.run_tick().await.unwrap();

    let state = store.load().await;
    assert_eq!(state.ipv6, prior_v6);
    assert_eq!(state.ipv4.last_ip, Some("203.0.113.7".parse().unwrap()));
}

#[tokio::test]
async fn disabled_families_are_never_reconciled() {
    let provider = MockDnsProvider::new();
    let store = MemoryStateStore::new();
    let engine = engine_with(
        FixedObserver::new(Some("203.0.113.7"), Some("2001:db8::1")),
        &provider,
        &store,
        config(false, false, &["example.com"]),
    );

    engine.run_tick().await.unwrap();

    assert_eq!(provider.call_count(), 0);
    assert_eq!(store.load().await, SyncState::default());
}

#[tokio::test]
async fn only_enabled_family_record_type_reaches_the_provider() {
    let provider = MockDnsProvider::new();
    let store = MemoryStateStore::new();
    let engine = engine_with(
        FixedObserver::new(Some("203.0.113.7"), Some("2001:db8::1")),
        &provider,
        &store,
        config(true, false, &["example.com"]),
    );

    engine.run_tick().await.unwrap();

    assert!(provider.call_count() > 0);
    for call in provider.calls() {
        let record_type = match call {
            ProviderCall::Lookup { record_type, .. }
            | ProviderCall::Create { record_type, .. }
            | ProviderCall::Update { record_type, .. } => record_type,
        };
        assert_eq!(record_type, RecordType::A);
    }
}

#[tokio::test]
async fn observation_failure_aborts_the_tick() {
    let provider = MockDnsProvider::new();
    let store = MemoryStateStore::with_state(SyncState {
        ipv4: FamilyState {
            last_ip: Some("1.2.3.4".parse().unwrap()),
            last_update_domains: vec!["example.com".into()],
        },
        ipv6: FamilyState::default(),
    });
    let seeded = store.load().await;

    let engine = engine_with(
        FailingObserver,
        &provider,
        &store,
        config(true, true, &["example.com"]),
    );

    assert!(engine.run_tick().await.is_err());
    assert_eq!(provider.call_count(), 0);
    assert_eq!(store.load().await, seeded);
}

#[tokio::test]
async fn save_failure_does_not_fail_the_tick() {
    let provider = MockDnsProvider::new();
    let engine = SyncEngine::new(
        Box::new(FixedObserver::new(Some("203.0.113.7"), None)),
        Box::new(provider.clone()),
        Box::new(FailingStateStore),
        config(true, false, &["example.com"]),
    )
    .expect("engine construction succeeds");

    engine.run_tick().await.unwrap();
    assert!(provider.call_count() > 0);
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let provider = MockDnsProvider::new();
    let result = SyncEngine::new(
        Box::new(FixedObserver::new(Some("203.0.113.7"), None)),
        Box::new(provider),
        Box::new(MemoryStateStore::new()),
        config(true, false, &[]),
    );
    assert!(result.is_err());
}
