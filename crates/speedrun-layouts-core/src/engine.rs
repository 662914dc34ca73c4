//! Layouts engine - owns the world and all mod state, and drives the systems
//! once per frame.

use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;
use speedrun_layouts_logic::pool::CandidatePool;
use speedrun_layouts_logic::profiles::LayoutProfileRegistry;

use crate::components::Vec3;
use crate::config::ModConfig;
use crate::data::GameData;
use crate::generator::LayoutGenerator;
use crate::plugin::{self, PreInjectReport};
use crate::preferences::Preferences;
use crate::registration::{DataRegistry, RegistrationError, RegistrationReport};
use crate::systems::*;

/// Main engine
pub struct LayoutsEngine {
    /// ECS world holding slots, maps and requests
    pub world: World,
    /// Game data catalog
    pub data: GameData,
    pub registry: DataRegistry,
    pub profiles: LayoutProfileRegistry,
    /// Candidate pool the generator draws from when no allow-list applies
    pub pool: CandidatePool,
    pub preferences: Preferences,

    generator: Box<dyn LayoutGenerator>,
    layout_requests: HandleLayoutRequests,
    rng: StdRng,
    office_anchor: Vec3,
    button_created: bool,
    frame: u64,
}

impl LayoutsEngine {
    /// Create an engine around `generator` with an entropy-seeded rng.
    pub fn new(generator: Box<dyn LayoutGenerator>) -> Self {
        Self {
            world: World::new(),
            data: GameData::new(),
            registry: DataRegistry::new(plugin::MOD_GUID),
            profiles: LayoutProfileRegistry::new(),
            pool: CandidatePool::default(),
            preferences: Preferences::new(),
            generator,
            layout_requests: HandleLayoutRequests::default(),
            rng: StdRng::from_entropy(),
            office_anchor: Vec3::ZERO,
            button_created: false,
            frame: 0,
        }
    }

    /// Reseed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_data(mut self, data: GameData) -> Self {
        self.data = data;
        self
    }

    pub fn with_pool(mut self, pool: CandidatePool) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_office_anchor(mut self, anchor: Vec3) -> Self {
        self.office_anchor = anchor;
        self
    }

    pub fn with_layout_requests(mut self, system: HandleLayoutRequests) -> Self {
        self.layout_requests = system;
        self
    }

    pub fn apply_config(&mut self, config: &ModConfig) {
        config.apply(&mut self.profiles, &mut self.preferences);
    }

    /// Run the mod bootstrap: queue data, build it into the catalog, then
    /// pre-inject.
    pub fn activate(&mut self) -> Result<(RegistrationReport, PreInjectReport), RegistrationError> {
        plugin::post_activate(&mut self.registry)?;
        let registration = self.registry.build_game_data(&mut self.data, &mut self.rng);
        let pre_inject = plugin::pre_inject(&mut self.data, &mut self.profiles);
        Ok((registration, pre_inject))
    }

    /// Ask for fresh layouts on the next update.
    pub fn request_layouts(&mut self) {
        trigger_layout_request(&mut self.world);
    }

    /// Route a player interaction. Returns whether it triggered a refresh.
    pub fn interact(&mut self, interaction: Interaction) -> bool {
        interact_refresh_layouts(&mut self.world, interaction)
    }

    /// Advance one frame.
    pub fn update(&mut self) -> Option<RequestOutcome> {
        self.frame += 1;

        // The button appliance only exists once `activate` has run
        if !self.button_created && self.data.contains(plugin::refresh_button_id()) {
            create_refresh_layouts_button(
                &mut self.world,
                self.office_anchor,
                plugin::refresh_button_id(),
            );
            self.button_created = true;
        }
        instantiate_appliances(&mut self.world, &self.data);

        let mut ctx = LayoutRequestContext {
            data: &self.data,
            profiles: &self.profiles,
            pool: &mut self.pool,
            preferences: &self.preferences,
            generator: &mut *self.generator,
            rng: &mut self.rng,
        };
        self.layout_requests.run(&mut self.world, &mut ctx)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;
    use crate::data::{Appliance, GameDataObject};
    use crate::generator::{CatalogueGenerator, ProfileShape};
    use speedrun_layouts_logic::profiles::known_ids;

    fn engine() -> LayoutsEngine {
        let generator = CatalogueGenerator::new()
            .with_profile(1, ProfileShape::new(4, 4))
            .with_profile(2, ProfileShape::new(6, 4));
        LayoutsEngine::new(Box::new(generator))
            .with_seed(7)
            .with_pool(CandidatePool::new(vec![1, 2]))
    }

    #[test]
    fn test_button_created_once() {
        let mut engine = engine();
        engine.activate().unwrap();
        engine.update();
        engine.update();

        let buttons: Vec<_> = engine
            .world
            .query::<&DoNotPersist>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        assert_eq!(buttons.len(), 1);
        assert_eq!(engine.frame(), 2);
    }

    #[test]
    fn test_button_waits_for_activation() {
        let data = GameData::from_objects([Box::new(Appliance {
            id: known_ids::WORKSHOP_CRAFT_BUTTON,
            name: "Workshop Craft Button".into(),
            ..Default::default()
        }) as Box<dyn GameDataObject>])
        .unwrap();
        let mut engine = engine().with_data(data);

        engine.update();
        assert_eq!(engine.world.query::<&DoNotPersist>().iter().count(), 0);

        engine.activate().unwrap();
        engine.update();
        engine.update();
        let buttons: Vec<_> = engine
            .world
            .query::<(&DoNotPersist, &RefreshLayoutsActivator)>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        assert_eq!(buttons.len(), 1);
        assert_eq!(engine.world.query::<&DoNotPersist>().iter().count(), 1);
    }

    #[test]
    fn test_update_without_request() {
        let mut engine = engine();
        engine.world.spawn((LayoutSlot, ItemHolder::default()));
        assert!(engine.update().is_none());
    }

    #[test]
    fn test_request_fills_slots() {
        let mut engine = engine();
        engine.world.spawn((LayoutSlot, ItemHolder::default()));
        engine.world.spawn((LayoutSlot, ItemHolder::default()));
        engine.request_layouts();

        let outcome = engine.update().unwrap();
        assert_eq!(outcome.linked().count(), 2);
        assert!(engine.update().is_none());
    }
}
