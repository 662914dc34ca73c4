//! Which layout profiles each restaurant setting may use, and which settings
//! should be unlocked for play.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Preference value meaning "no layout profile override".
pub const VANILLA_PROFILE: i32 = 0;

/// Layout profiles a player can pick from, in menu order.
pub const SELECTABLE_LAYOUT_PROFILES: [(i32, &str); 7] = [
    (VANILLA_PROFILE, "Vanilla"),
    (-80202533, "Diner (Solo)"),
    (222370461, "Basic (Duo, 10x7)"),
    (-2045800810, "Medium (Duo, 14x6)"),
    (557943155, "Extended (Trio)"),
    (154938708, "Huge (Quad)"),
    (-1207945624, "Lake (Non-Solo)"),
];

/// Well-known data ids of the base game.
pub mod known_ids {
    pub const LAKE_SETTING: i32 = 507410699;
    pub const NORTH_POLE_SETTING: i32 = -851159532;
    pub const NORTH_POLE_LAYOUT: i32 = -791067106;
    pub const WORKSHOP_CRAFT_BUTTON: i32 = -1425710426;
}

/// Display name of a selectable profile.
pub fn profile_name(id: i32) -> Option<&'static str> {
    SELECTABLE_LAYOUT_PROFILES
        .iter()
        .find(|(profile, _)| *profile == id)
        .map(|(_, name)| *name)
}

pub fn is_selectable(id: i32) -> bool {
    profile_name(id).is_some()
}

/// Setting → allowed layout profile ids, plus settings to unlock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutProfileRegistry {
    layouts_by_setting: HashMap<i32, Vec<i32>>,
    settings_to_grant: BTreeSet<i32>,
}

impl LayoutProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `profile_id` for `setting_id`, in insertion order.
    ///
    /// Duplicates are kept unless `no_duplicates` is set.
    pub fn add_setting_layout(&mut self, setting_id: i32, profile_id: i32, no_duplicates: bool) {
        let allowed = self.layouts_by_setting.entry(setting_id).or_default();
        if no_duplicates && allowed.contains(&profile_id) {
            return;
        }
        allowed.push(profile_id);
    }

    pub fn add_setting_layouts(
        &mut self,
        setting_id: i32,
        profile_ids: impl IntoIterator<Item = i32>,
        no_duplicates: bool,
    ) {
        for profile_id in profile_ids {
            self.add_setting_layout(setting_id, profile_id, no_duplicates);
        }
    }

    /// Drop the restriction for `setting_id` entirely.
    pub fn clear_setting_layout(&mut self, setting_id: i32) {
        self.layouts_by_setting.remove(&setting_id);
    }

    /// Allowed profiles for `setting_id`, or `None` when the setting is
    /// unrestricted. A registered but emptied list is still a restriction.
    pub fn try_get_valid_profile_ids(&self, setting_id: i32) -> Option<Vec<i32>> {
        self.layouts_by_setting.get(&setting_id).cloned()
    }

    /// Mark `setting_id` to be unlocked. Id 0 is ignored.
    pub fn grant_custom_setting(&mut self, setting_id: i32) {
        if setting_id != 0 {
            self.settings_to_grant.insert(setting_id);
        }
    }

    pub fn settings_to_grant(&self) -> BTreeSet<i32> {
        self.settings_to_grant.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_is_none() {
        let registry = LayoutProfileRegistry::new();
        assert_eq!(registry.try_get_valid_profile_ids(42), None);
    }

    #[test]
    fn test_add_keeps_insertion_order_and_duplicates() {
        let mut registry = LayoutProfileRegistry::new();
        registry.add_setting_layout(1, 30, false);
        registry.add_setting_layout(1, 10, false);
        registry.add_setting_layout(1, 30, false);
        assert_eq!(registry.try_get_valid_profile_ids(1), Some(vec![30, 10, 30]));

        registry.add_setting_layouts(1, [10, 20], true);
        assert_eq!(
            registry.try_get_valid_profile_ids(1),
            Some(vec![30, 10, 30, 20])
        );
    }

    #[test]
    fn test_clear_setting_layout() {
        let mut registry = LayoutProfileRegistry::new();
        registry.add_setting_layout(5, 1, false);
        registry.clear_setting_layout(5);
        registry.clear_setting_layout(6);
        assert_eq!(registry.try_get_valid_profile_ids(5), None);
    }

    #[test]
    fn test_grant_is_idempotent_and_ignores_zero() {
        let mut registry = LayoutProfileRegistry::new();
        registry.grant_custom_setting(known_ids::LAKE_SETTING);
        registry.grant_custom_setting(known_ids::LAKE_SETTING);
        registry.grant_custom_setting(0);
        let granted = registry.settings_to_grant();
        assert_eq!(granted.len(), 1);
        assert!(granted.contains(&known_ids::LAKE_SETTING));
    }

    #[test]
    fn test_selectable_profiles() {
        assert_eq!(profile_name(VANILLA_PROFILE), Some("Vanilla"));
        assert_eq!(profile_name(154938708), Some("Huge (Quad)"));
        assert!(!is_selectable(12345));
    }
}
