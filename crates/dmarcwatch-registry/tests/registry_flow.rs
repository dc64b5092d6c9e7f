//! End-to-end registry behaviour over in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, TimeZone, Utc};
use dmarcwatch_core::{DmarcStatus, IssueKind};
use dmarcwatch_dns::StaticLookup;
use dmarcwatch_registry::{
    resolve_client_ip, Clock, DomainStore, JsonFileStore, ManualClock, MemoryStore, Registry,
    WatchConfig, UNKNOWN_CLIENT,
};

fn lookup() -> StaticLookup {
    StaticLookup::new()
        .with_dmarc("broken.example", "v=DMARC1; p=reject; rua=mailto:not-an-address")
        .with_dmarc("garbled.example", "v=DMARC1; p=sometimes")
        .with_dmarc("strong.example", "v=DMARC1; p=reject; sp=reject; adkim=s")
        .with_txt("_dmarc.noise.example", ["google-site-verification=abc"])
}

#[tokio::test]
async fn test_registry_orders_by_votes_then_recency() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
    ));
    let registry = Registry::builder(lookup()).clock(clock.clone()).build();

    registry.validate("missing.example").await.unwrap();
    clock.advance(TimeDelta::minutes(5));
    registry.validate("broken.example").await.unwrap();
    clock.advance(TimeDelta::minutes(5));
    registry.validate("garbled.example").await.unwrap();
    clock.advance(TimeDelta::minutes(5));
    registry.validate("noise.example").await.unwrap();
    registry.validate("strong.example").await.unwrap();

    registry.upvote("missing.example", "10.0.0.1").await.unwrap();

    let entries = registry.list().await.unwrap();
    let order: Vec<&str> = entries.iter().map(|e| e.domain.as_str()).collect();
    assert_eq!(
        order,
        ["missing.example", "noise.example", "garbled.example", "broken.example"]
    );

    let statuses: Vec<DmarcStatus> = entries.iter().map(|e| e.dmarc_status).collect();
    assert_eq!(
        statuses,
        [
            DmarcStatus::Missing,
            DmarcStatus::Missing,
            DmarcStatus::Invalid,
            DmarcStatus::Invalid,
        ]
    );
}

#[tokio::test]
async fn test_unrelated_txt_records_count_as_missing() {
    let registry = Registry::builder(lookup()).build();
    let result = registry.validate("noise.example").await.unwrap();
    assert!(result.dmarc_record.is_none());
    assert_eq!(result.issues[0].kind, IssueKind::MissingRecord);
}

#[tokio::test]
async fn test_votes_from_forwarded_clients() {
    let store = Arc::new(MemoryStore::new());
    let registry = Registry::builder(lookup()).store(store.clone()).build();
    registry.validate("missing.example").await.unwrap();

    let behind_proxy = [("X-Forwarded-For", "203.0.113.5, 10.1.1.1")];
    let ip = resolve_client_ip(behind_proxy, None).unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
    assert!(registry.upvote("missing.example", &ip).await.unwrap().success);
    assert!(!registry.upvote("missing.example", &ip).await.unwrap().success);

    let anonymous = resolve_client_ip([], None).unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
    assert_eq!(anonymous, "unknown");
    assert!(registry.upvote("missing.example", &anonymous).await.unwrap().success);

    let stored = store.get_domain("missing.example").await.unwrap().unwrap();
    assert_eq!(stored.upvotes, 2);
}

#[tokio::test]
async fn test_cached_listing_expires_with_config_ttl() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
    ));
    let store = Arc::new(MemoryStore::new());
    let config = WatchConfig::from_toml("cache_ttl_secs = 120").unwrap();
    let registry = Registry::builder(lookup())
        .store(store.clone())
        .clock(clock.clone())
        .config(&config)
        .build();

    registry.validate("missing.example").await.unwrap();
    assert_eq!(registry.list().await.unwrap().len(), 1);

    store
        .create_domain(&dmarcwatch_core::ValidationResult::missing(
            "late.example",
            clock.now(),
        ))
        .await
        .unwrap();
    assert_eq!(registry.list().await.unwrap().len(), 1);

    clock.advance(TimeDelta::from_std(Duration::from_secs(121)).unwrap());
    assert_eq!(registry.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_vote_retried_after_write_failure_counts_once() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("state");
    let store = Arc::new(JsonFileStore::open(dir.join("registry.json")).await.unwrap());
    let registry = Registry::builder(lookup()).store(store).build();
    registry.validate("missing.example").await.unwrap();

    // A plain file where the directory was makes every write fail.
    tokio::fs::remove_dir_all(&dir).await.unwrap();
    tokio::fs::write(&dir, "blocked").await.unwrap();
    assert!(registry.upvote("missing.example", "10.0.0.9").await.is_err());
    assert!(!registry.ledger().has_voted("10.0.0.9", "missing.example"));

    tokio::fs::remove_file(&dir).await.unwrap();
    tokio::fs::create_dir(&dir).await.unwrap();
    let outcome = registry.upvote("missing.example", "10.0.0.9").await.unwrap();
    assert_eq!(outcome.new_upvote_count, Some(1));

    let again = registry.upvote("missing.example", "10.0.0.9").await.unwrap();
    assert!(!again.success);

    let reopened = JsonFileStore::open(dir.join("registry.json")).await.unwrap();
    let stored = reopened.get_domain("missing.example").await.unwrap().unwrap();
    assert_eq!(stored.upvotes, 1);
    assert_eq!(registry.list().await.unwrap()[0].upvotes, 1);
}
