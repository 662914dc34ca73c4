//! Layout request components: the request flag, slots, generated maps.

use hecs::Entity;
use serde::{Deserialize, Serialize};

/// One-shot request to (re)generate the layout maps on every slot.
///
/// Set by an interaction, consumed once by the request system, then marked
/// created so it is not processed again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub has_been_created: bool,
}

/// Placement point (a pedestal) that holds one generated layout map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSlot;

/// Item produced by the layout generator.
///
/// The room and feature data lives on the separate `layout` entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMap {
    pub layout: Entity,
    pub seed: i32,
    pub profile_id: i32,
    pub setting_id: i32,
}

/// Kind of a feature placed between two tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Door,
    FrontDoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutFeature {
    pub kind: FeatureKind,
    pub from: (i32, i32),
    pub to: (i32, i32),
}

/// Feature buffer of a layout entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutFeatures(pub Vec<LayoutFeature>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTile {
    pub x: i32,
    pub y: i32,
    pub room: u32,
}

/// Room tile buffer of a layout entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTiles(pub Vec<RoomTile>);

/// Currently selected restaurant setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingSelector {
    pub setting_id: i32,
}

/// Dish forced onto a generated map by its setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDish {
    pub dish_id: i32,
}

/// Layout map to be destroyed by the next layout request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearOnLayoutRequest;

/// Appliance property: interacting with it triggers a layout request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshLayoutsActivator;

/// Ask the host to instantiate the appliance with this data id here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAppliance {
    pub id: i32,
}
