//! Mod bootstrap hooks.
//!
//! The host calls [`post_activate`] once after loading the mod, builds game
//! data from everything queued, then calls [`pre_inject`] before systems
//! start.

use speedrun_layouts_logic::ids::stable_id;
use speedrun_layouts_logic::localisation::Locale;
use speedrun_layouts_logic::profiles::{known_ids, LayoutProfileRegistry};

use crate::data::{Appliance, ApplianceInfo, ApplianceProperty, GameData};
use crate::registration::{DataRegistry, RegistrationError};

pub const MOD_GUID: &str = "IcedMilo.PlateUp.Speedrun Layouts";
pub const MOD_NAME: &str = "Speedrun Layouts";
pub const MOD_VERSION: &str = "0.1.2";

pub const REFRESH_BUTTON_NAME: &str = "RefreshLayoutsButton";

/// Data id of the refresh layouts button appliance.
pub fn refresh_button_id() -> i32 {
    stable_id(MOD_GUID, REFRESH_BUTTON_NAME)
}

/// Queue the mod's data objects.
pub fn post_activate(registry: &mut DataRegistry) -> Result<i32, RegistrationError> {
    log::info!("{} v{} in use!", MOD_GUID, MOD_VERSION);
    registry.with_window(|registry| {
        registry.add_game_data_object_named::<Appliance>(REFRESH_BUTTON_NAME, |button| {
            button.info.insert(
                Locale::English,
                ApplianceInfo {
                    name: "Refresh Layout Button".to_string(),
                    description: "Why are you looking at this???".to_string(),
                    ..Default::default()
                },
            );
        })
    })
}

/// Changes made by [`pre_inject`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreInjectReport {
    pub granted_settings: Vec<i32>,
    pub restricted_settings: Vec<i32>,
    pub button_activated: bool,
}

/// Unlock the custom settings and wire up the refresh button.
pub fn pre_inject(data: &mut GameData, profiles: &mut LayoutProfileRegistry) -> PreInjectReport {
    let mut report = PreInjectReport::default();

    if data.contains(known_ids::LAKE_SETTING) {
        profiles.grant_custom_setting(known_ids::LAKE_SETTING);
        report.granted_settings.push(known_ids::LAKE_SETTING);
    }

    if data.contains(known_ids::NORTH_POLE_SETTING) && data.contains(known_ids::NORTH_POLE_LAYOUT) {
        profiles.grant_custom_setting(known_ids::NORTH_POLE_SETTING);
        profiles.add_setting_layout(known_ids::NORTH_POLE_SETTING, known_ids::NORTH_POLE_LAYOUT, true);
        report.granted_settings.push(known_ids::NORTH_POLE_SETTING);
        report.restricted_settings.push(known_ids::NORTH_POLE_SETTING);
    }

    if data.contains(known_ids::WORKSHOP_CRAFT_BUTTON) {
        if let Some(button) = data.try_get_mut::<Appliance>(refresh_button_id()) {
            if !button.has_property(ApplianceProperty::RefreshLayoutsActivator) {
                button.properties.push(ApplianceProperty::RefreshLayoutsActivator);
            }
            report.button_activated = true;
        } else {
            log::warn!("Refresh layouts button is not registered");
        }
    }

    report
}
