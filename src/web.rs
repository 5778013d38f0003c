//! Browser glue: `localStorage`-backed store and the functions exported to JS.
//!
//! The exports resolve storage and time on every call and then delegate to
//! the pure policy modules. When `localStorage` cannot be opened they run
//! against an [`UnavailableStore`], so each policy applies its own
//! fail-open / fail-closed default.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use web_sys::{Storage, window};

use crate::ad_limiter;
use crate::clock::{Clock, SystemClock};
use crate::config::PolicyConfig;
use crate::device::LayoutMode;
use crate::error::{PolicyError, StoreError};
use crate::history::HistoryEntry;
use crate::scroll::{AutoScroller, ScrollTracker};
use crate::store::{KeyValueStore, UnavailableStore};
use crate::trigger::{self, TriggerDelays};

thread_local! {
    static CONFIG: RefCell<PolicyConfig> = RefCell::new(PolicyConfig::default());
}

fn with_config<R>(f: impl FnOnce(&PolicyConfig) -> R) -> R {
    CONFIG.with(|cfg| f(&cfg.borrow()))
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn to_js(err: PolicyError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// --- Storage -----------------------------------------------------------------

/// `window.localStorage` as a [`KeyValueStore`].
pub struct BrowserStorage {
    storage: Storage,
}

impl BrowserStorage {
    pub fn local() -> Result<Self, StoreError> {
        let win = window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        let storage = win
            .local_storage()
            .map_err(|e| StoreError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(js_message(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Rejected {
                key: key.to_owned(),
                reason: js_message(&e),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(js_message(&e)))
    }
}

/// Run `f` against `localStorage`, or an always-failing store if it is
/// unavailable.
fn with_store<R>(f: impl FnOnce(&dyn KeyValueStore) -> R) -> R {
    match BrowserStorage::local() {
        Ok(store) => f(&store),
        Err(err) => {
            log::warn!("{err}");
            f(&UnavailableStore::new(err.to_string()))
        }
    }
}

// --- Configuration -----------------------------------------------------------

/// Replace the active configuration with `json` merged over the defaults.
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config = PolicyConfig::from_json(json).map_err(to_js)?;
    CONFIG.with(|cfg| *cfg.borrow_mut() = config);
    log::info!("policy config updated");
    Ok(())
}

// --- Pagination --------------------------------------------------------------

/// Page-size limit for `mode` ("home" or "list") at `width` CSS px.
#[wasm_bindgen]
pub fn page_limit(mode: &str, width: f64) -> u32 {
    with_config(|cfg| cfg.table(LayoutMode::parse(mode)).classify_px(width).limit)
}

/// Device tier name ("mobile" / "tablet" / "desktop") at `width`.
#[wasm_bindgen]
pub fn device_class(mode: &str, width: f64) -> String {
    with_config(|cfg| {
        cfg.table(LayoutMode::parse(mode))
            .classify_px(width)
            .device
            .as_str()
            .to_owned()
    })
}

fn viewport_width() -> f64 {
    window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(f64::NAN)
}

/// Page-size limit for the current `window.innerWidth`.
#[wasm_bindgen]
pub fn current_page_limit(mode: &str) -> u32 {
    page_limit(mode, viewport_width())
}

// --- Ads ---------------------------------------------------------------------

/// Alternating ad decision for `key` (configured default slot when omitted).
#[wasm_bindgen]
pub fn should_show_ad(key: Option<String>) -> bool {
    let key = key.unwrap_or_else(|| with_config(|cfg| cfg.ad_counter_key.clone()));
    with_store(|store| ad_limiter::should_show(store, &key))
}

// --- Affiliate trigger -------------------------------------------------------

fn affiliate_settings() -> (String, TriggerDelays) {
    with_config(|cfg| (cfg.affiliate_key.clone(), cfg.affiliate_delays))
}

/// Record the first visit for `key` (configured affiliate key when omitted).
#[wasm_bindgen]
pub fn init_trigger(key: Option<String>) {
    let key = key.unwrap_or_else(|| affiliate_settings().0);
    with_store(|store| trigger::initialize(store, &SystemClock, &key));
}

/// Millisecond delay passed from JS. Missing, NaN, infinite or negative
/// values fall back to `configured` instead of casting to a zero or
/// negative wait.
fn delay_from_js(ms: Option<f64>, configured: i64) -> i64 {
    match ms {
        None => configured,
        Some(ms) if ms.is_finite() && ms >= 0.0 => ms as i64,
        Some(ms) => {
            log::warn!("ignoring invalid trigger delay {ms}; using {configured}ms");
            configured
        }
    }
}

/// Gate decision; omitted arguments use the configured affiliate settings.
#[wasm_bindgen]
pub fn try_trigger(key: Option<String>, first_delay_ms: Option<f64>, repeat_delay_ms: Option<f64>) -> bool {
    let (default_key, delays) = affiliate_settings();
    let key = key.unwrap_or(default_key);
    let first = delay_from_js(first_delay_ms, delays.first_ms);
    let repeat = delay_from_js(repeat_delay_ms, delays.repeat_ms);
    with_store(|store| trigger::try_trigger(store, &SystemClock, &key, first, repeat))
}

/// Evaluate the affiliate gate and, only if it fired, open `url` in a new
/// tab. Returns whether it fired.
#[wasm_bindgen]
pub fn try_open_affiliate(url: &str) -> Result<bool, JsValue> {
    if !try_trigger(None, None, None) {
        return Ok(false);
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    win.open_with_url_and_target(url, "_blank")?;
    Ok(true)
}

// --- Reading history ---------------------------------------------------------

#[wasm_bindgen]
pub fn record_history(
    comic_id: String,
    title: String,
    chapter_id: String,
    chapter_title: Option<String>,
    cover_url: Option<String>,
) -> Result<(), JsValue> {
    let entry = HistoryEntry {
        comic_id,
        title,
        cover_url,
        chapter_id,
        chapter_title,
        read_at: SystemClock.now_ms(),
    };
    let history = with_config(PolicyConfig::history);
    with_store(|store| history.record(store, entry)).map_err(to_js)
}

/// History as a JSON array, most recent first.
#[wasm_bindgen]
pub fn history_json() -> String {
    let history = with_config(PolicyConfig::history);
    let entries = with_store(|store| history.entries(store));
    serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_owned())
}

/// Chapter id to resume `comic_id` from, if it was read before.
#[wasm_bindgen]
pub fn last_read_chapter(comic_id: &str) -> Option<String> {
    let history = with_config(PolicyConfig::history);
    with_store(|store| history.last_read(store, comic_id)).map(|e| e.chapter_id)
}

#[wasm_bindgen]
pub fn remove_history(comic_id: &str) -> Result<bool, JsValue> {
    let history = with_config(PolicyConfig::history);
    with_store(|store| history.remove(store, comic_id)).map_err(to_js)
}

#[wasm_bindgen]
pub fn clear_history() -> Result<(), JsValue> {
    let history = with_config(PolicyConfig::history);
    with_store(|store| history.clear(store)).map_err(to_js)
}

// --- Scroll helpers ----------------------------------------------------------

/// Navbar visibility tracker; feed it `window.scrollY` on every scroll event.
#[wasm_bindgen]
pub struct NavbarWatcher {
    tracker: ScrollTracker,
}

#[wasm_bindgen]
impl NavbarWatcher {
    #[wasm_bindgen(constructor)]
    pub fn new() -> NavbarWatcher {
        NavbarWatcher {
            tracker: ScrollTracker::new(with_config(|cfg| cfg.navbar)),
        }
    }

    pub fn on_scroll(&mut self, offset: f64) -> bool {
        self.tracker.on_scroll(offset)
    }

    pub fn visible(&self) -> bool {
        self.tracker.is_visible()
    }
}

impl Default for NavbarWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader auto-scroll; call `step` from `requestAnimationFrame`.
#[wasm_bindgen]
pub struct AutoScrollHandle {
    scroller: AutoScroller,
}

#[wasm_bindgen]
impl AutoScrollHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> AutoScrollHandle {
        AutoScrollHandle {
            scroller: AutoScroller::new(with_config(|cfg| cfg.auto_scroll)),
        }
    }

    pub fn start(&mut self) {
        self.scroller.start();
    }

    pub fn stop(&mut self) {
        self.scroller.stop();
    }

    pub fn toggle(&mut self) -> bool {
        self.scroller.toggle()
    }

    pub fn is_running(&self) -> bool {
        self.scroller.is_running()
    }

    pub fn set_speed(&mut self, px_per_sec: f64) {
        self.scroller.set_speed(px_per_sec);
    }

    pub fn step(&mut self, elapsed_ms: f64, offset: f64, max_offset: f64) -> Option<f64> {
        self.scroller.step(elapsed_ms, offset, max_offset)
    }
}

impl Default for AutoScrollHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;

    #[test]
    fn delay_from_js_accepts_plain_numbers() {
        assert_eq!(delay_from_js(Some(900_000.0), 1), 900_000);
        assert_eq!(delay_from_js(Some(0.0), 1), 0);
        assert_eq!(delay_from_js(Some(1500.7), 1), 1500);
        assert_eq!(delay_from_js(None, 42), 42);
    }

    #[test]
    fn delay_from_js_rejects_nan_infinite_and_negative() {
        assert_eq!(delay_from_js(Some(f64::NAN), 900_000), 900_000);
        assert_eq!(delay_from_js(Some(f64::INFINITY), 900_000), 900_000);
        assert_eq!(delay_from_js(Some(f64::NEG_INFINITY), 900_000), 900_000);
        assert_eq!(delay_from_js(Some(-1.0), 3_600_000), 3_600_000);
    }

    #[test]
    fn nan_delays_do_not_fire_on_every_navigation() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let delays = TriggerDelays::default();
        trigger::initialize(&store, &clock, "aff");

        let first = delay_from_js(Some(f64::NAN), delays.first_ms);
        let repeat = delay_from_js(Some(f64::NAN), delays.repeat_ms);
        let mut fired = 0;
        for _ in 0..5 {
            clock.advance(1);
            if trigger::try_trigger(&store, &clock, "aff", first, repeat) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0);
    }
}
