//! Delay-gated one-shot trigger (affiliate link opener).
//!
//! The first firing waits `first_delay_ms` after the first visit; every later
//! firing waits `repeat_delay_ms` after the previous one. Evaluation only
//! updates persisted state and returns a decision. Opening the link is the
//! caller's job, after the decision comes back.
//!
//! Storage failures fail closed: a broken store must not open a tab on every
//! navigation.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::PolicyError;
use crate::store::KeyValueStore;

/// Storage key of the affiliate trigger record.
pub const AFFILIATE_TRIGGER_KEY: &str = "affiliate_trigger_state";

/// 15 minutes.
pub const DEFAULT_FIRST_DELAY_MS: i64 = 15 * 60 * 1000;
/// 1 hour.
pub const DEFAULT_REPEAT_DELAY_MS: i64 = 60 * 60 * 1000;

/// Persisted trigger record, JSON `{"firstVisitAt":..,"lastTriggerAt":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerState {
    pub first_visit_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_trigger_at: Option<i64>,
}

impl TriggerState {
    pub fn new(first_visit_at: i64) -> Self {
        Self {
            first_visit_at,
            last_trigger_at: None,
        }
    }

    /// Reference timestamp and required wait for the next firing.
    pub fn pending_wait(&self, delays: TriggerDelays) -> (i64, i64) {
        match self.last_trigger_at {
            None => (self.first_visit_at, delays.first_ms),
            Some(last) => (last, delays.repeat_ms),
        }
    }

    /// Whether the gate is open at `now`. A clock behind the reference
    /// never opens it.
    pub fn is_due(&self, now: i64, delays: TriggerDelays) -> bool {
        let (reference, wait) = self.pending_wait(delays);
        now.saturating_sub(reference) >= wait
    }

    pub fn to_json(&self) -> Result<String, PolicyError> {
        serde_json::to_string(self).map_err(|e| PolicyError::malformed("TriggerState", e))
    }

    pub fn from_json(key: &str, text: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(text).map_err(|e| PolicyError::malformed(key, e))
    }
}

/// Delay pair for a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDelays {
    pub first_ms: i64,
    pub repeat_ms: i64,
}

impl Default for TriggerDelays {
    fn default() -> Self {
        Self {
            first_ms: DEFAULT_FIRST_DELAY_MS,
            repeat_ms: DEFAULT_REPEAT_DELAY_MS,
        }
    }
}

/// Load the record under `key`. `Ok(None)` when absent.
pub fn load_state<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<TriggerState>, PolicyError> {
    match store.get(key)? {
        None => Ok(None),
        Some(text) => TriggerState::from_json(key, &text).map(Some),
    }
}

fn save_state<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    state: &TriggerState,
) -> Result<(), PolicyError> {
    store.set(key, &state.to_json()?)?;
    Ok(())
}

/// Ensure a record exists, stamping `firstVisitAt = now` if there is none.
/// A malformed record is replaced. Returns the record in effect.
pub fn try_initialize<S, C>(store: &S, clock: &C, key: &str) -> Result<TriggerState, PolicyError>
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    match load_state(store, key) {
        Ok(Some(state)) => return Ok(state),
        Ok(None) => {}
        Err(PolicyError::Malformed { reason, .. }) => {
            log::warn!("trigger `{key}`: discarding malformed state ({reason})");
        }
        Err(err) => return Err(err),
    }
    let state = TriggerState::new(clock.now_ms());
    save_state(store, key, &state)?;
    log::debug!("trigger `{key}`: first visit at {}", state.first_visit_at);
    Ok(state)
}

/// Idempotent first-visit initialisation; storage errors are logged and ignored.
pub fn initialize<S, C>(store: &S, clock: &C, key: &str)
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    if let Err(err) = try_initialize(store, clock, key) {
        log::warn!("trigger `{key}`: initialize failed: {err}");
    }
}

/// Evaluate the gate, persisting `lastTriggerAt` when it fires.
///
/// Missing state means `initialize` has not run yet and never fires. When
/// the gate is closed nothing is written.
pub fn evaluate<S, C>(store: &S, clock: &C, key: &str, delays: TriggerDelays) -> Result<bool, PolicyError>
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    let Some(mut state) = load_state(store, key)? else {
        log::debug!("trigger `{key}`: not initialized");
        return Ok(false);
    };
    let now = clock.now_ms();
    if !state.is_due(now, delays) {
        return Ok(false);
    }
    state.last_trigger_at = Some(now);
    save_state(store, key, &state)?;
    log::debug!("trigger `{key}`: fired at {now}");
    Ok(true)
}

/// Whether the gated action should run now. Fails closed.
pub fn try_trigger<S, C>(store: &S, clock: &C, key: &str, first_delay_ms: i64, repeat_delay_ms: i64) -> bool
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    let delays = TriggerDelays {
        first_ms: first_delay_ms,
        repeat_ms: repeat_delay_ms,
    };
    evaluate(store, clock, key, delays).unwrap_or_else(|err| {
        log::warn!("trigger `{key}`: {err}; not firing");
        false
    })
}
