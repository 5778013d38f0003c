//! Contract tests for the three decision policies.
//!
//! These pin observable behavior: decisions, persisted values, and the
//! defaults taken when storage misbehaves.

use std::cell::Cell;

use comic_reader_policy::{
    ad_limiter, classify, trigger, DeviceClass, DeviceLimit, DeviceLimitTable, DeviceTier,
    KeyValueStore, ManualClock, MemoryStore, StoreError, TriggerState, UnavailableStore,
};

/// Reads succeed, writes fail: a full quota.
struct ReadOnlyStore {
    inner: MemoryStore,
    writes: Cell<u32>,
}

impl ReadOnlyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            writes: Cell::new(0),
        }
    }
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        self.writes.set(self.writes.get() + 1);
        Err(StoreError::Rejected {
            key: key.to_owned(),
            reason: "QuotaExceededError".into(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

fn scenario_table() -> DeviceLimitTable {
    DeviceLimitTable::new(vec![
        DeviceTier::new(0, DeviceClass::Mobile, 34),
        DeviceTier::new(768, DeviceClass::Tablet, 32),
        DeviceTier::new(1024, DeviceClass::Desktop, 35),
    ])
    .unwrap()
}

// ─── Device classifier ─────────────────────────────────────────────────

#[test]
fn classify_scenario() {
    let table = scenario_table();
    assert_eq!(classify(500, &table), DeviceLimit { device: DeviceClass::Mobile, limit: 34 });
    assert_eq!(classify(768, &table), DeviceLimit { device: DeviceClass::Tablet, limit: 32 });
    assert_eq!(classify(2000, &table), DeviceLimit { device: DeviceClass::Desktop, limit: 35 });
}

#[test]
fn classify_picks_largest_breakpoint_not_above_width() {
    let table = scenario_table();
    for width in (-100..3000).step_by(7) {
        let got = classify(width, &table);
        let expected = table
            .tiers()
            .iter()
            .filter(|t| i64::from(t.breakpoint) <= width)
            .max_by_key(|t| t.breakpoint)
            .unwrap_or(&table.tiers()[0]);
        assert_eq!(got, DeviceLimit::from(expected), "width {width}");
    }
}

// ─── Alternating display limiter ──────────────────────────────────────

#[test]
fn should_show_alternates_from_empty_store() {
    let store = MemoryStore::new();
    for i in 0..20 {
        assert_eq!(ad_limiter::should_show(&store, "slot"), i % 2 == 0, "call {i}");
    }
}

#[test]
fn should_show_fails_open_when_storage_unavailable() {
    let store = UnavailableStore::new("disabled");
    for _ in 0..4 {
        assert!(ad_limiter::should_show(&store, "slot"));
    }
    assert!(ad_limiter::evaluate(&store, "slot").is_err());
}

#[test]
fn should_show_fails_open_when_writes_rejected() {
    let store = ReadOnlyStore::new();
    store.inner.set("slot", "1").unwrap();
    assert!(ad_limiter::should_show(&store, "slot"));
    assert_eq!(store.writes.get(), 1);
}

// ─── Delay-gated trigger ───────────────────────────────────────────────

#[test]
fn trigger_scenario() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    trigger::initialize(&store, &clock, "aff");

    clock.set(500_000);
    let before = store.get("aff").unwrap();
    assert!(!trigger::try_trigger(&store, &clock, "aff", 900_000, 3_600_000));
    assert_eq!(store.get("aff").unwrap(), before, "closed gate must not write");

    clock.set(900_001);
    assert!(trigger::try_trigger(&store, &clock, "aff", 900_000, 3_600_000));
    assert_eq!(
        trigger::load_state(&store, "aff").unwrap(),
        Some(TriggerState { first_visit_at: 0, last_trigger_at: Some(900_001) })
    );

    clock.set(900_002);
    let before = store.get("aff").unwrap();
    assert!(!trigger::try_trigger(&store, &clock, "aff", 900_000, 3_600_000));
    assert_eq!(store.get("aff").unwrap(), before);

    clock.set(900_001 + 3_600_001);
    assert!(trigger::try_trigger(&store, &clock, "aff", 900_000, 3_600_000));
}

#[test]
fn trigger_state_round_trips() {
    for state in [
        TriggerState::new(1_700_000_000_000),
        TriggerState { first_visit_at: 3, last_trigger_at: Some(1_700_000_000_123) },
    ] {
        let text = state.to_json().unwrap();
        let back = TriggerState::from_json("k", &text).unwrap();
        assert_eq!(back, state);
        assert_eq!(back.to_json().unwrap(), text);
    }
}

#[test]
fn trigger_fails_closed_when_storage_unavailable() {
    let store = UnavailableStore::new("disabled");
    let clock = ManualClock::new(10_000_000);
    trigger::initialize(&store, &clock, "aff");
    assert!(!trigger::try_trigger(&store, &clock, "aff", 0, 0));
}

#[test]
fn trigger_fails_closed_when_writes_rejected() {
    let store = ReadOnlyStore::new();
    store.inner.set("aff", r#"{"firstVisitAt":0}"#).unwrap();
    let clock = ManualClock::new(10_000_000);
    for _ in 0..3 {
        assert!(!trigger::try_trigger(&store, &clock, "aff", 0, 0));
    }
    assert_eq!(store.writes.get(), 3);
}
