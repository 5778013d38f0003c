//! Device classification and responsive page-size limits.
//!
//! A viewport width maps to a device tier (mobile / tablet / desktop) and the
//! number of comics a grid should request for that tier. The UI calls this on
//! mount and on every resize; debouncing is left to the caller.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Device tier derived from viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
        }
    }
}

/// One row of a [`DeviceLimitTable`]: widths `>= breakpoint` use `device` / `limit`
/// until the next row's breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTier {
    pub breakpoint: u32,
    pub device: DeviceClass,
    pub limit: u32,
}

impl DeviceTier {
    pub const fn new(breakpoint: u32, device: DeviceClass, limit: u32) -> Self {
        Self {
            breakpoint,
            device,
            limit,
        }
    }
}

/// Result of classifying a width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceLimit {
    pub device: DeviceClass,
    pub limit: u32,
}

impl From<&DeviceTier> for DeviceLimit {
    fn from(tier: &DeviceTier) -> Self {
        Self {
            device: tier.device,
            limit: tier.limit,
        }
    }
}

pub const TABLET_BREAKPOINT: u32 = 768;
pub const DESKTOP_BREAKPOINT: u32 = 1024;

const HOME_TIERS: [DeviceTier; 3] = [
    DeviceTier::new(0, DeviceClass::Mobile, 34),
    DeviceTier::new(TABLET_BREAKPOINT, DeviceClass::Tablet, 32),
    DeviceTier::new(DESKTOP_BREAKPOINT, DeviceClass::Desktop, 35),
];

const LIST_TIERS: [DeviceTier; 3] = [
    DeviceTier::new(0, DeviceClass::Mobile, 20),
    DeviceTier::new(TABLET_BREAKPOINT, DeviceClass::Tablet, 24),
    DeviceTier::new(DESKTOP_BREAKPOINT, DeviceClass::Desktop, 30),
];

/// Which of the two page layouts is asking for a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutMode {
    /// Landing page grids (latest, popular, banners).
    Home,
    /// Paginated listing pages (genre, search, ranking).
    List,
}

impl LayoutMode {
    /// Parse the mode name passed from JS. Unknown names fall back to `List`.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("home") {
            LayoutMode::Home
        } else {
            LayoutMode::List
        }
    }
}

/// Breakpoint table sorted ascending, first row at breakpoint 0.
///
/// Immutable once built. Deserialization goes through the same validation
/// as [`DeviceLimitTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DeviceTier>", into = "Vec<DeviceTier>")]
pub struct DeviceLimitTable {
    tiers: Vec<DeviceTier>,
}

impl DeviceLimitTable {
    /// Build a table, rejecting empty input, a first row above 0 and
    /// non-ascending breakpoints.
    pub fn new(tiers: Vec<DeviceTier>) -> Result<Self, PolicyError> {
        let first = tiers
            .first()
            .ok_or_else(|| PolicyError::InvalidTable("table has no tiers".into()))?;
        if first.breakpoint != 0 {
            return Err(PolicyError::InvalidTable(format!(
                "first tier starts at {}px, expected 0",
                first.breakpoint
            )));
        }
        if let Some(pair) = tiers.windows(2).find(|w| w[0].breakpoint >= w[1].breakpoint) {
            return Err(PolicyError::InvalidTable(format!(
                "breakpoints not ascending: {} then {}",
                pair[0].breakpoint, pair[1].breakpoint
            )));
        }
        Ok(Self { tiers })
    }

    /// Default table for the home layout.
    pub fn home() -> Self {
        Self {
            tiers: HOME_TIERS.to_vec(),
        }
    }

    /// Default table for listing layouts.
    pub fn list() -> Self {
        Self {
            tiers: LIST_TIERS.to_vec(),
        }
    }

    pub fn tiers(&self) -> &[DeviceTier] {
        &self.tiers
    }

    /// Largest breakpoint `<= width` wins; widths below every breakpoint
    /// (negative) get the first row.
    pub fn classify(&self, width: i64) -> DeviceLimit {
        self.tiers
            .iter()
            .rev()
            .find(|tier| i64::from(tier.breakpoint) <= width)
            .or_else(|| self.tiers.first())
            .map(DeviceLimit::from)
            // `new` guarantees at least one tier.
            .unwrap_or(DeviceLimit {
                device: DeviceClass::Mobile,
                limit: 0,
            })
    }

    /// Classify a raw `window.innerWidth` value. NaN, infinities and
    /// negatives land on the first row; fractions are floored.
    pub fn classify_px(&self, width: f64) -> DeviceLimit {
        if !width.is_finite() || width < 0.0 {
            return self.classify(-1);
        }
        self.classify(width.floor() as i64)
    }
}

impl TryFrom<Vec<DeviceTier>> for DeviceLimitTable {
    type Error = PolicyError;

    fn try_from(tiers: Vec<DeviceTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<DeviceLimitTable> for Vec<DeviceTier> {
    fn from(table: DeviceLimitTable) -> Self {
        table.tiers
    }
}

/// Free-function form of [`DeviceLimitTable::classify`].
pub fn classify(width: i64, table: &DeviceLimitTable) -> DeviceLimit {
    table.classify(width)
}
