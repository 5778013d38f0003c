//! Alternating ad display limiter.
//!
//! Each content view (typically a chapter visit) evaluates a slot key. The
//! slot is shown on even counter values and skipped on odd ones; the counter
//! is bumped on every evaluation whether or not the caller renders.

use crate::error::PolicyError;
use crate::store::KeyValueStore;

/// Storage key of the social bar slot counter.
pub const SOCIAL_BAR_COUNTER_KEY: &str = "adsterra_social_bar_counter";

/// Read the counter under `key`. Absent or non-numeric values count as 0.
pub fn read_counter<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<u64, PolicyError> {
    let raw = store.get(key)?;
    Ok(match raw {
        None => 0,
        Some(text) => text.trim().parse::<u64>().unwrap_or_else(|_| {
            log::warn!("ad counter `{key}` holds non-numeric value {text:?}; treating as 0");
            0
        }),
    })
}

/// Decide and advance the counter, surfacing storage failures.
///
/// Read-modify-write is not atomic: two tabs evaluating the same key can
/// both read the same value and repeat a decision.
pub fn evaluate<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<bool, PolicyError> {
    let counter = read_counter(store, key)?;
    let show = counter % 2 == 0;
    store.set(key, &counter.wrapping_add(1).to_string())?;
    log::debug!("ad slot `{key}`: counter={counter} show={show}");
    Ok(show)
}

/// Whether the slot under `key` should render for this view.
///
/// Fails open: any storage error shows the slot.
pub fn should_show<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> bool {
    evaluate(store, key).unwrap_or_else(|err| {
        log::warn!("ad slot `{key}`: {err}; showing");
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn alternates_starting_with_show() {
        let store = MemoryStore::new();
        let seen: Vec<bool> = (0..6).map(|_| should_show(&store, "slot")).collect();
        assert_eq!(seen, vec![true, false, true, false, true, false]);
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("6"));
    }

    #[test]
    fn keys_are_independent() {
        let store = MemoryStore::new();
        assert!(should_show(&store, "a"));
        assert!(should_show(&store, "b"));
        assert!(!should_show(&store, "a"));
        assert!(!should_show(&store, "b"));
    }

    #[test]
    fn malformed_counter_resets_to_zero() {
        let store = MemoryStore::new();
        store.set("slot", "not-a-number").unwrap();
        assert!(should_show(&store, "slot"));
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn resumes_from_persisted_counter() {
        let store = MemoryStore::new();
        store.set("slot", "41").unwrap();
        assert!(!should_show(&store, "slot"));
        assert!(should_show(&store, "slot"));
    }

    #[test]
    fn counter_wraps_without_breaking_parity() {
        let store = MemoryStore::new();
        store.set("slot", &u64::MAX.to_string()).unwrap();
        assert!(!should_show(&store, "slot"));
        assert!(should_show(&store, "slot"));
    }
}
