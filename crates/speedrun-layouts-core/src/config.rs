//! Mod configuration loaded from JSON.
//!
//! The configuration seeds the layout profile registry and the player's
//! selected profile before the first layout request:
//!
//! ```
//! use speedrun_layouts_core::config::ModConfig;
//!
//! let config = ModConfig::from_json_str(r#"{
//!     "selected_layout_profile": 557943155,
//!     "setting_layouts": [{ "setting": -851159532, "profiles": [-791067106] }],
//!     "grant_settings": [507410699]
//! }"#).unwrap();
//! assert_eq!(config.setting_layouts.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use speedrun_layouts_logic::profiles::{self, LayoutProfileRegistry};
use std::fmt;

use crate::preferences::{Preferences, SELECTED_LAYOUT_PROFILE_ID};

/// Allowed layout profiles for one restaurant setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingLayoutEntry {
    pub setting: i32,
    pub profiles: Vec<i32>,
    #[serde(default)]
    pub no_duplicates: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModConfig {
    /// Profile forced onto unrestricted settings (0 = vanilla).
    pub selected_layout_profile: i32,
    pub setting_layouts: Vec<SettingLayoutEntry>,
    /// Settings to unlock for play.
    pub grant_settings: Vec<i32>,
}

/// A single problem found by [`validate_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// Setting id 0 in a layout entry or grant list.
    ZeroSetting,
    /// Profile id 0 in a layout entry for this setting.
    ZeroProfile { setting: i32 },
    /// Layout entry with no profiles, which would leave the setting unrestricted.
    EmptyProfiles { setting: i32 },
    /// Selected profile is not one of the selectable profiles.
    UnknownSelectedProfile(i32),
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::ZeroSetting => write!(f, "setting id cannot be 0"),
            ConfigIssue::ZeroProfile { setting } => {
                write!(f, "setting {} lists layout profile 0", setting)
            }
            ConfigIssue::EmptyProfiles { setting } => {
                write!(f, "setting {} lists no layout profiles", setting)
            }
            ConfigIssue::UnknownSelectedProfile(id) => {
                write!(f, "selected layout profile {} is not selectable", id)
            }
        }
    }
}

/// Errors from loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(Vec<ConfigIssue>),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(issues) => {
                write!(f, "Invalid config:")?;
                for issue in issues {
                    write!(f, " {};", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Validate a configuration, returning all issues found.
pub fn validate_config(config: &ModConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    for entry in &config.setting_layouts {
        if entry.setting == 0 {
            issues.push(ConfigIssue::ZeroSetting);
        }
        if entry.profiles.is_empty() {
            issues.push(ConfigIssue::EmptyProfiles {
                setting: entry.setting,
            });
        }
        if entry.profiles.contains(&0) {
            issues.push(ConfigIssue::ZeroProfile {
                setting: entry.setting,
            });
        }
    }
    if config.grant_settings.contains(&0) {
        issues.push(ConfigIssue::ZeroSetting);
    }
    if !profiles::is_selectable(config.selected_layout_profile) {
        issues.push(ConfigIssue::UnknownSelectedProfile(
            config.selected_layout_profile,
        ));
    }

    issues
}

impl ModConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        validate_config(self)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ModConfig = serde_json::from_str(json)?;
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Register setting layouts and grants, and store the selected profile.
    pub fn apply(&self, registry: &mut LayoutProfileRegistry, preferences: &mut Preferences) {
        for entry in &self.setting_layouts {
            registry.add_setting_layouts(
                entry.setting,
                entry.profiles.iter().copied(),
                entry.no_duplicates,
            );
        }
        for setting in &self.grant_settings {
            registry.grant_custom_setting(*setting);
        }
        preferences.set_int(SELECTED_LAYOUT_PROFILE_ID, self.selected_layout_profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceStore;

    #[test]
    fn default_config_is_valid() {
        let errors = validate_config(&ModConfig::default());
        assert!(errors.is_empty(), "default config should be valid: {errors:?}");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = ModConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ModConfig::default());
    }

    #[test]
    fn zero_ids_are_reported() {
        let config = ModConfig {
            setting_layouts: vec![SettingLayoutEntry {
                setting: 0,
                profiles: vec![5, 0],
                no_duplicates: false,
            }],
            grant_settings: vec![0],
            ..Default::default()
        };
        let issues = validate_config(&config);
        assert_eq!(issues.len(), 3);
        assert!(issues.contains(&ConfigIssue::ZeroProfile { setting: 0 }));
    }

    #[test]
    fn empty_profile_list_is_rejected() {
        let err = ModConfig::from_json_str(r#"{ "setting_layouts": [{ "setting": 9, "profiles": [] }] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref issues)
            if issues == &vec![ConfigIssue::EmptyProfiles { setting: 9 }]));
        assert_eq!(
            ConfigIssue::EmptyProfiles { setting: 9 }.to_string(),
            "setting 9 lists no layout profiles"
        );
    }

    #[test]
    fn unknown_selected_profile_is_rejected() {
        let err = ModConfig::from_json_str(r#"{ "selected_layout_profile": 42 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref issues)
            if issues == &vec![ConfigIssue::UnknownSelectedProfile(42)]));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ModConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn apply_fills_registry_and_preferences() {
        let config = ModConfig::from_json_str(
            r#"{
                "selected_layout_profile": 154938708,
                "setting_layouts": [
                    { "setting": 9, "profiles": [1, 1, 2], "no_duplicates": true }
                ],
                "grant_settings": [9]
            }"#,
        )
        .unwrap();

        let mut registry = LayoutProfileRegistry::new();
        let mut preferences = Preferences::new();
        config.apply(&mut registry, &mut preferences);

        assert_eq!(registry.try_get_valid_profile_ids(9), Some(vec![1, 2]));
        assert!(registry.settings_to_grant().contains(&9));
        assert_eq!(preferences.selected_layout_profile(), 154938708);
    }

    #[test]
    fn json_round_trip() {
        let config = ModConfig {
            selected_layout_profile: -80202533,
            grant_settings: vec![1],
            ..Default::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(ModConfig::from_json_str(&json).unwrap(), config);
    }
}
