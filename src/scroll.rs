//! Scroll-driven state machines: navbar visibility and reader auto-scroll.

use serde::{Deserialize, Serialize};

// --- Navbar visibility -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavbarConfig {
    /// Offsets at or above the page top within this zone always show the bar.
    pub reveal_at_top_px: f64,
    /// Movement smaller than this (accumulated) leaves the bar as is.
    pub min_delta_px: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            reveal_at_top_px: 80.0,
            min_delta_px: 8.0,
        }
    }
}

/// Hides the navbar while scrolling down, shows it while scrolling up.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    config: NavbarConfig,
    anchor: f64, // offset of the last state-changing evaluation
    visible: bool,
}

impl ScrollTracker {
    pub fn new(config: NavbarConfig) -> Self {
        Self {
            config,
            anchor: 0.0,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Feed the current scroll offset; returns whether the bar is visible.
    pub fn on_scroll(&mut self, offset: f64) -> bool {
        if !offset.is_finite() {
            return self.visible;
        }
        if offset <= self.config.reveal_at_top_px {
            self.visible = true;
            self.anchor = offset;
            return true;
        }
        let delta = offset - self.anchor;
        if delta.abs() < self.config.min_delta_px {
            return self.visible;
        }
        self.visible = delta < 0.0;
        self.anchor = offset;
        self.visible
    }
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(NavbarConfig::default())
    }
}

// --- Auto-scroll --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoScrollConfig {
    pub speed_px_per_sec: f64,
    pub min_speed_px_per_sec: f64,
    pub max_speed_px_per_sec: f64,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            speed_px_per_sec: 60.0,
            min_speed_px_per_sec: 10.0,
            max_speed_px_per_sec: 600.0,
        }
    }
}

/// Frame-stepped auto-scroller for the chapter reader. Stops itself at the
/// bottom of the page.
#[derive(Debug, Clone)]
pub struct AutoScroller {
    config: AutoScrollConfig,
    speed: f64,
    running: bool,
}

impl AutoScroller {
    pub fn new(config: AutoScrollConfig) -> Self {
        let mut scroller = Self {
            config,
            speed: 0.0,
            running: false,
        };
        scroller.set_speed(config.speed_px_per_sec);
        scroller
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Clamped to the configured range; non-finite input is ignored.
    pub fn set_speed(&mut self, px_per_sec: f64) {
        if !px_per_sec.is_finite() {
            return;
        }
        let lo = self.config.min_speed_px_per_sec.min(self.config.max_speed_px_per_sec);
        let hi = self.config.max_speed_px_per_sec.max(lo);
        self.speed = px_per_sec.clamp(lo, hi);
    }

    /// Next offset after `elapsed_ms`, or `None` when idle. Reaching
    /// `max_offset` returns it and stops; a non-finite offset or bound stops
    /// without moving.
    pub fn step(&mut self, elapsed_ms: f64, offset: f64, max_offset: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        if !offset.is_finite() || !max_offset.is_finite() {
            self.running = false;
            log::warn!("auto-scroll stopped: offset {offset} / max {max_offset} not finite");
            return None;
        }
        let elapsed = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };
        let next = offset + self.speed * elapsed / 1000.0;
        if next >= max_offset {
            self.running = false;
            log::debug!("auto-scroll reached bottom at {max_offset}");
            return Some(max_offset);
        }
        Some(next)
    }
}

impl Default for AutoScroller {
    fn default() -> Self {
        Self::new(AutoScrollConfig::default())
    }
}
