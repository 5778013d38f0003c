//! Policy configuration.
//!
//! The host page may pass a JSON object to override any subset of the
//! defaults; missing fields keep their default values.

use serde::{Deserialize, Serialize};

use crate::ad_limiter::SOCIAL_BAR_COUNTER_KEY;
use crate::device::{DeviceLimitTable, LayoutMode};
use crate::error::PolicyError;
use crate::history::{DEFAULT_MAX_ENTRIES, HISTORY_KEY, ReadingHistory};
use crate::scroll::{AutoScrollConfig, NavbarConfig};
use crate::trigger::{AFFILIATE_TRIGGER_KEY, TriggerDelays};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConfig {
    pub home_table: DeviceLimitTable,
    pub list_table: DeviceLimitTable,
    /// Counter key used when JS asks for an ad decision without naming a slot.
    pub ad_counter_key: String,
    pub affiliate_key: String,
    pub affiliate_delays: TriggerDelays,
    pub history_key: String,
    pub history_max_entries: usize,
    pub navbar: NavbarConfig,
    pub auto_scroll: AutoScrollConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            home_table: DeviceLimitTable::home(),
            list_table: DeviceLimitTable::list(),
            ad_counter_key: SOCIAL_BAR_COUNTER_KEY.to_owned(),
            affiliate_key: AFFILIATE_TRIGGER_KEY.to_owned(),
            affiliate_delays: TriggerDelays::default(),
            history_key: HISTORY_KEY.to_owned(),
            history_max_entries: DEFAULT_MAX_ENTRIES,
            navbar: NavbarConfig::default(),
            auto_scroll: AutoScrollConfig::default(),
        }
    }
}

impl PolicyConfig {
    pub fn from_json(text: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn table(&self, mode: LayoutMode) -> &DeviceLimitTable {
        match mode {
            LayoutMode::Home => &self.home_table,
            LayoutMode::List => &self.list_table,
        }
    }

    pub fn history(&self) -> ReadingHistory {
        ReadingHistory::new(self.history_key.clone(), self.history_max_entries)
    }
}
