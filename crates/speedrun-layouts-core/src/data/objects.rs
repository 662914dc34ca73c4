//! Data object types stored in the game data catalog.

use serde::{Deserialize, Serialize};
use speedrun_layouts_logic::localisation::{Locale, LocalisationSet};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A registrable piece of game data with a catalog-wide unique id.
pub trait GameDataObject: Any + Debug {
    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    /// Short type label used in log messages.
    fn kind(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

macro_rules! game_data_object {
    ($($ty:ident),* $(,)?) => {
        $(
            impl GameDataObject for $ty {
                fn id(&self) -> i32 {
                    self.id
                }
                fn set_id(&mut self, id: i32) {
                    self.id = id;
                }
                fn name(&self) -> &str {
                    &self.name
                }
                fn set_name(&mut self, name: String) {
                    self.name = name;
                }
                fn kind(&self) -> &'static str {
                    stringify!($ty)
                }
                fn as_any(&self) -> &dyn Any {
                    self
                }
                fn as_any_mut(&mut self) -> &mut dyn Any {
                    self
                }
            }
        )*
    };
}

game_data_object!(Appliance, RestaurantSetting, LayoutProfile, Dish, GlobalLocalisation);

/// Behavior attached to an appliance when it is instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplianceProperty {
    RefreshLayoutsActivator,
}

/// Localised description of an appliance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplianceInfo {
    pub name: String,
    pub description: String,
    pub sections: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    pub id: i32,
    pub name: String,
    pub info: BTreeMap<Locale, ApplianceInfo>,
    pub properties: Vec<ApplianceProperty>,
}

impl Appliance {
    pub fn has_property(&self, property: ApplianceProperty) -> bool {
        self.properties.contains(&property)
    }
}

/// Game-mode configuration. A fixed dish is stamped onto every map it generates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantSetting {
    pub id: i32,
    pub name: String,
    pub fixed_dish: Option<i32>,
}

/// One floor-plan archetype.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutProfile {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: i32,
    pub name: String,
}

/// The global localisation catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalLocalisation {
    pub id: i32,
    pub name: String,
    pub localisation: LocalisationSet,
}
