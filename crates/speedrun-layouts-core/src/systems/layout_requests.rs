//! Layout request handling - fills every layout slot with a freshly generated
//! map when a layout request is pending.
//!
//! The allow-list comes from the setting's registered layout profiles, or,
//! for unrestricted settings, from the player's selected profile. While an
//! allow-list is in effect the candidate pool is narrowed to it for the
//! duration of the request.

use hecs::{Entity, World};
use rand::Rng;
use speedrun_layouts_logic::pool::CandidatePool;
use speedrun_layouts_logic::profiles::{LayoutProfileRegistry, VANILLA_PROFILE};
use speedrun_layouts_logic::selection::{LayoutChoice, LayoutSelectionEngine, ProfileResolver};

use crate::components::{
    ClearOnLayoutRequest, HeldBy, ItemHolder, LayoutFeatures, LayoutMap, LayoutRequest,
    LayoutSlot, RoomTiles, SettingDish, SettingSelector,
};
use crate::data::{GameData, RestaurantSetting};
use crate::generator::{LayoutGenerator, LayoutSeed};
use crate::preferences::PreferenceStore;

/// Marks generated maps as belonging to the current request and removes the
/// maps of the previous one.
pub trait ClearMarker {
    fn mark(&self, world: &mut World, map: Entity);

    /// Despawn every marked map. Returns how many were removed.
    fn clear(&self, world: &mut World) -> usize;
}

/// [`ClearMarker`] backed by the [`ClearOnLayoutRequest`] component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearOnLayoutRequestMarker;

impl ClearMarker for ClearOnLayoutRequestMarker {
    fn mark(&self, world: &mut World, map: Entity) {
        let _ = world.insert_one(map, ClearOnLayoutRequest);
    }

    fn clear(&self, world: &mut World) -> usize {
        let marked: Vec<(Entity, Entity, Option<Entity>)> = world
            .query::<(&LayoutMap, &ClearOnLayoutRequest, Option<&HeldBy>)>()
            .iter()
            .map(|(entity, (map, _, held_by))| (entity, map.layout, held_by.map(|h| h.holder)))
            .collect();

        for (map, layout, holder) in &marked {
            if let Some(holder) = holder {
                if let Ok(mut item_holder) = world.get::<&mut ItemHolder>(*holder) {
                    if item_holder.item == Some(*map) {
                        item_holder.item = None;
                    }
                }
            }
            let _ = world.despawn(*layout);
            let _ = world.despawn(*map);
        }
        marked.len()
    }
}

/// Everything the request system reads or writes besides the world.
pub struct LayoutRequestContext<'a, R: Rng> {
    pub data: &'a GameData,
    pub profiles: &'a LayoutProfileRegistry,
    pub pool: &'a mut CandidatePool,
    pub preferences: &'a dyn PreferenceStore,
    pub generator: &'a mut dyn LayoutGenerator,
    pub rng: &'a mut R,
}

/// What happened to one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOutcome {
    pub slot: Entity,
    pub choice: LayoutChoice,
    /// The map now held by the slot, `None` if the slot was skipped.
    pub map: Option<Entity>,
}

/// Summary of one processed layout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub setting_id: i32,
    /// Allow-list in effect at the start of the request.
    pub allow_list: Option<Vec<i32>>,
    pub target: Option<i32>,
    /// Maps of the previous request that were removed.
    pub cleared: usize,
    pub slots: Vec<SlotOutcome>,
}

impl RequestOutcome {
    pub fn linked(&self) -> impl Iterator<Item = &SlotOutcome> {
        self.slots.iter().filter(|slot| slot.map.is_some())
    }
}

/// Id of the currently selected restaurant setting, 0 when there is none.
pub fn active_setting_id(world: &World) -> i32 {
    world
        .query::<&SettingSelector>()
        .iter()
        .map(|(_, selector)| selector.setting_id)
        .next()
        .unwrap_or(0)
}

/// Pending layout request entity, if it has not been processed yet.
pub fn pending_layout_request(world: &World) -> Option<Entity> {
    world
        .query::<&LayoutRequest>()
        .iter()
        .find(|(_, request)| !request.has_been_created)
        .map(|(entity, _)| entity)
}

/// Allow-list and forced target for `setting_id`.
///
/// A registered setting restriction wins and never carries a target. Without
/// one, a non-vanilla selected profile becomes the target; it is also used as
/// a single-entry allow-list unless the pool already admits it.
pub fn resolve_allow_list(
    setting_id: i32,
    profiles: &LayoutProfileRegistry,
    preferences: &dyn PreferenceStore,
    pool: &CandidatePool,
) -> (Option<Vec<i32>>, i32) {
    if let Some(valid) = profiles.try_get_valid_profile_ids(setting_id) {
        return (Some(valid), VANILLA_PROFILE);
    }
    let selected = preferences.selected_layout_profile();
    if selected == VANILLA_PROFILE {
        return (None, VANILLA_PROFILE);
    }
    if pool.contains(selected) {
        (None, selected)
    } else {
        (Some(vec![selected]), selected)
    }
}

/// Adapts a generator plus the pool it should consult to the selection loop.
struct PoolResolver<'a> {
    generator: &'a dyn LayoutGenerator,
    pool: &'a CandidatePool,
}

impl ProfileResolver for PoolResolver<'_> {
    fn resolve(&mut self, seed: i32, allow_list: Option<&[i32]>) -> i32 {
        self.generator.resolve(seed, allow_list, self.pool).layout_id
    }
}

/// The layout request system.
pub struct HandleLayoutRequests {
    clear_marker: Option<Box<dyn ClearMarker>>,
}

impl Default for HandleLayoutRequests {
    fn default() -> Self {
        Self::new(Box::new(ClearOnLayoutRequestMarker))
    }
}

impl HandleLayoutRequests {
    pub fn new(clear_marker: Box<dyn ClearMarker>) -> Self {
        Self {
            clear_marker: Some(clear_marker),
        }
    }

    /// A system with no clear marker registered; it refuses to run.
    pub fn without_clear_marker() -> Self {
        Self { clear_marker: None }
    }

    /// Process the pending layout request, if any.
    ///
    /// Returns `None` when there was nothing to do (no pending request, no
    /// slots) or when the clear marker is missing, in which case the request
    /// is left pending.
    pub fn run<R: Rng>(
        &self,
        world: &mut World,
        ctx: &mut LayoutRequestContext<'_, R>,
    ) -> Option<RequestOutcome> {
        let request = pending_layout_request(world)?;
        let slots: Vec<Entity> = world
            .query::<(&LayoutSlot, &ItemHolder)>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        if slots.is_empty() {
            return None;
        }
        let Some(marker) = self.clear_marker.as_deref() else {
            log::error!("No clear-on-layout-request marker registered, skipping layout request");
            return None;
        };

        let setting_id = active_setting_id(world);
        let (allow_list, target) =
            resolve_allow_list(setting_id, ctx.profiles, ctx.preferences, ctx.pool);
        let fixed_dish = ctx
            .data
            .try_get::<RestaurantSetting>(setting_id)
            .and_then(|setting| setting.fixed_dish);

        let cleared = marker.clear(world);

        let mut filler = SlotFiller {
            world: &mut *world,
            generator: &mut *ctx.generator,
            marker,
            setting_id,
            fixed_dish,
        };
        let mut selection = LayoutSelectionEngine::new(allow_list.clone(), target);
        let narrowed = match &allow_list {
            Some(ids) => match ctx.pool.scoped(ids.clone()) {
                Ok(pool) => Some(filler.fill(&slots, &mut selection, &pool, &mut *ctx.rng)),
                Err(err) => {
                    log::error!("{}, selecting without narrowing the pool", err);
                    None
                }
            },
            None => None,
        };
        let outcomes = match narrowed {
            Some(outcomes) => outcomes,
            None => filler.fill(&slots, &mut selection, ctx.pool, &mut *ctx.rng),
        };

        if let Ok(mut request) = world.get::<&mut LayoutRequest>(request) {
            request.has_been_created = true;
        }

        let outcome = RequestOutcome {
            setting_id,
            allow_list,
            target: (target != VANILLA_PROFILE).then_some(target),
            cleared,
            slots: outcomes,
        };
        log::info!(
            "Layout request for setting {}: {} of {} slots filled, {} old maps cleared",
            setting_id,
            outcome.linked().count(),
            outcome.slots.len(),
            cleared
        );
        Some(outcome)
    }
}

/// Per-request state for generating and linking one map per slot.
struct SlotFiller<'w> {
    world: &'w mut World,
    generator: &'w mut dyn LayoutGenerator,
    marker: &'w dyn ClearMarker,
    setting_id: i32,
    fixed_dish: Option<i32>,
}

impl SlotFiller<'_> {
    fn fill<R: Rng>(
        &mut self,
        slots: &[Entity],
        selection: &mut LayoutSelectionEngine,
        pool: &CandidatePool,
        rng: &mut R,
    ) -> Vec<SlotOutcome> {
        slots
            .iter()
            .map(|&slot| {
                let mut resolver = PoolResolver {
                    generator: &*self.generator,
                    pool,
                };
                let choice = selection.choose(rng, &mut resolver);
                if choice.fallback {
                    log::warn!(
                        "Gave up on layout profile {:?} after {} attempts, using {}",
                        selection.target(),
                        choice.attempts,
                        choice.profile_id
                    );
                }
                let map = self.fill_slot(slot, &choice);
                SlotOutcome { slot, choice, map }
            })
            .collect()
    }

    fn fill_slot(&mut self, slot: Entity, choice: &LayoutChoice) -> Option<Entity> {
        let seed = LayoutSeed {
            seed: choice.seed,
            layout_id: choice.profile_id,
        };
        let map = match self.generator.generate_map(self.world, &seed, self.setting_id) {
            Ok(map) => map,
            Err(err) => {
                log::error!("Failed to generate layout for slot {:?}: {}", slot, err);
                return None;
            }
        };

        if !has_layout_data(self.world, map) {
            log::warn!(
                "Layout {} is missing feature or room tile data, leaving slot {:?} empty",
                choice.profile_id,
                slot
            );
            despawn_map(self.world, map);
            return None;
        }

        self.marker.mark(self.world, map);
        if self
            .world
            .insert_one(slot, ItemHolder::holding(map))
            .and_then(|_| self.world.insert_one(map, HeldBy { holder: slot }))
            .is_err()
        {
            log::error!("Slot {:?} vanished while linking its layout", slot);
            despawn_map(self.world, map);
            return None;
        }
        if let Some(dish_id) = self.fixed_dish {
            let _ = self.world.insert_one(map, SettingDish { dish_id });
        }
        Some(map)
    }
}

fn has_layout_data(world: &World, map: Entity) -> bool {
    let Ok(layout) = world.get::<&LayoutMap>(map).map(|m| m.layout) else {
        return false;
    };
    world.get::<&LayoutFeatures>(layout).is_ok() && world.get::<&RoomTiles>(layout).is_ok()
}

fn despawn_map(world: &mut World, map: Entity) {
    let layout = world.get::<&LayoutMap>(map).map(|m| m.layout).ok();
    if let Some(layout) = layout {
        let _ = world.despawn(layout);
    }
    let _ = world.despawn(map);
}
