//! Comic reader policy core.
//!
//! Decision logic behind the reader UI, compiled to WASM and called from
//! event handlers (resize, chapter navigation, scroll):
//!
//! - [`device`]: viewport width to device tier and page-size limit.
//! - [`ad_limiter`]: show an ad slot on every other chapter view.
//! - [`trigger`]: open the affiliate link only after a delay since the first
//!   visit, then at most once per repeat window.
//! - [`history`]: local "continue reading" list.
//! - [`scroll`]: navbar hide/show on scroll direction and reader auto-scroll.
//!
//! Policies take their storage ([`store::KeyValueStore`]) and time
//! ([`clock::Clock`]) as arguments; [`web`] wires them to `localStorage` and
//! `Date.now()` for the browser.

use wasm_bindgen::prelude::*;

pub mod ad_limiter;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod history;
pub mod scroll;
pub mod store;
pub mod trigger;
pub mod web;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PolicyConfig;
pub use device::{DeviceClass, DeviceLimit, DeviceLimitTable, DeviceTier, LayoutMode, classify};
pub use error::{PolicyError, StoreError};
pub use history::{HistoryEntry, ReadingHistory};
pub use scroll::{AutoScroller, ScrollTracker};
pub use store::{KeyValueStore, MemoryStore, UnavailableStore};
pub use trigger::{TriggerDelays, TriggerState};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        // A second init (hot reload) keeps the existing logger.
        console_log::init_with_level(level).unwrap_or(());
    }
}
