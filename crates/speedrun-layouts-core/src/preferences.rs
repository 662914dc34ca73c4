//! Player preferences read by the request system.

use serde::{Deserialize, Serialize};
use speedrun_layouts_logic::profiles::VANILLA_PROFILE;
use std::collections::BTreeMap;

/// Preference key of the selected layout profile (0 = no override).
pub const SELECTED_LAYOUT_PROFILE_ID: &str = "selectedLayoutProfile";

/// Read access to integer preferences. Unset keys read as 0.
pub trait PreferenceStore {
    fn get_int(&self, key: &str) -> i32;

    fn selected_layout_profile(&self) -> i32 {
        self.get_int(SELECTED_LAYOUT_PROFILE_ID)
    }
}

/// In-memory preference values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    values: BTreeMap<String, i32>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i32) {
        self.values.insert(key.into(), value);
    }

    pub fn with_selected_layout_profile(mut self, profile_id: i32) -> Self {
        self.set_int(SELECTED_LAYOUT_PROFILE_ID, profile_id);
        self
    }
}

impl PreferenceStore for Preferences {
    fn get_int(&self, key: &str) -> i32 {
        self.values.get(key).copied().unwrap_or(VANILLA_PROFILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_reads_as_vanilla() {
        let prefs = Preferences::new();
        assert_eq!(prefs.selected_layout_profile(), VANILLA_PROFILE);
        assert_eq!(prefs.get_int("anything"), 0);
    }

    #[test]
    fn test_selected_layout_profile() {
        let prefs = Preferences::new().with_selected_layout_profile(557943155);
        assert_eq!(prefs.selected_layout_profile(), 557943155);
    }
}
