//! The refresh layouts button: spawning it, instantiating appliances and
//! turning an interaction with it into a new layout request.

use hecs::{Entity, World};

use crate::components::{
    CreateAppliance, DoNotPersist, ItemHolder, LayoutRequest, Position, RefreshLayoutsActivator,
    Vec3,
};
use crate::data::{Appliance, ApplianceProperty, GameData};

/// Button placement relative to the office anchor.
pub const REFRESH_BUTTON_OFFSET: Vec3 = Vec3 {
    x: -4.0,
    y: 0.0,
    z: -2.0,
};

/// A player interacting with an appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    pub actor: Entity,
    pub target: Entity,
}

/// Set the layout request singleton to a fresh, unprocessed request.
pub fn trigger_layout_request(world: &mut World) -> Entity {
    let existing = world
        .query::<&LayoutRequest>()
        .iter()
        .map(|(entity, _)| entity)
        .next();
    match existing {
        Some(entity) => {
            if let Ok(mut request) = world.get::<&mut LayoutRequest>(entity) {
                *request = LayoutRequest::default();
            }
            entity
        }
        None => world.spawn((LayoutRequest::default(),)),
    }
}

/// Interaction handler for the refresh button.
///
/// Only applies when the target carries [`RefreshLayoutsActivator`]. Returns
/// whether a request was triggered.
pub fn interact_refresh_layouts(world: &mut World, interaction: Interaction) -> bool {
    if world
        .get::<&RefreshLayoutsActivator>(interaction.target)
        .is_err()
    {
        return false;
    }
    trigger_layout_request(world);
    log::debug!(
        "Layout refresh requested by {:?} via {:?}",
        interaction.actor,
        interaction.target
    );
    true
}

/// Spawn the appliance creation request for the refresh button.
pub fn create_refresh_layouts_button(
    world: &mut World,
    office_anchor: Vec3,
    appliance_id: i32,
) -> Entity {
    let position = Position::new(office_anchor + REFRESH_BUTTON_OFFSET).facing(Vec3::X);
    world.spawn((
        CreateAppliance { id: appliance_id },
        position,
        ItemHolder::default(),
        DoNotPersist,
    ))
}

/// Instantiate pending appliance creations, attaching the components their
/// properties call for. Unknown appliance ids are logged and dropped.
pub fn instantiate_appliances(world: &mut World, data: &GameData) -> Vec<Entity> {
    let pending: Vec<(Entity, i32)> = world
        .query::<&CreateAppliance>()
        .iter()
        .map(|(entity, create)| (entity, create.id))
        .collect();

    let mut created = Vec::with_capacity(pending.len());
    for (entity, id) in pending {
        let _ = world.remove_one::<CreateAppliance>(entity);
        let Some(appliance) = data.try_get::<Appliance>(id) else {
            log::warn!("Cannot create unknown appliance {}", id);
            let _ = world.despawn(entity);
            continue;
        };
        if appliance.has_property(ApplianceProperty::RefreshLayoutsActivator) {
            let _ = world.insert_one(entity, RefreshLayoutsActivator);
        }
        created.push(entity);
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameDataObject;

    #[test]
    fn test_trigger_spawns_then_resets() {
        let mut world = World::new();
        let first = trigger_layout_request(&mut world);
        world.get::<&mut LayoutRequest>(first).unwrap().has_been_created = true;

        let second = trigger_layout_request(&mut world);
        assert_eq!(first, second);
        assert!(!world.get::<&LayoutRequest>(first).unwrap().has_been_created);
        assert_eq!(world.query::<&LayoutRequest>().iter().count(), 1);
    }

    #[test]
    fn test_interaction_requires_activator() {
        let mut world = World::new();
        let actor = world.spawn(());
        let plain = world.spawn(());
        let button = world.spawn((RefreshLayoutsActivator,));

        assert!(!interact_refresh_layouts(&mut world, Interaction { actor, target: plain }));
        assert_eq!(world.query::<&LayoutRequest>().iter().count(), 0);

        assert!(interact_refresh_layouts(&mut world, Interaction { actor, target: button }));
        assert_eq!(world.query::<&LayoutRequest>().iter().count(), 1);
    }

    #[test]
    fn test_button_placement() {
        let mut world = World::new();
        let button = create_refresh_layouts_button(&mut world, Vec3::new(10.0, 0.0, 5.0), 1234);

        let position = *world.get::<&Position>(button).unwrap();
        assert_eq!(position.location, Vec3::new(6.0, 0.0, 3.0));
        assert_eq!(position.forward, Vec3::X);
        assert_eq!(world.get::<&CreateAppliance>(button).unwrap().id, 1234);
        assert!(world.get::<&DoNotPersist>(button).is_ok());
        assert!(world.get::<&ItemHolder>(button).is_ok());
    }

    #[test]
    fn test_instantiate_attaches_activator() {
        let mut button = Appliance::default();
        button.set_id(55);
        button.properties.push(ApplianceProperty::RefreshLayoutsActivator);
        let data = GameData::from_objects([Box::new(button) as Box<dyn GameDataObject>]).unwrap();

        let mut world = World::new();
        let entity = create_refresh_layouts_button(&mut world, Vec3::ZERO, 55);
        let unknown = world.spawn((CreateAppliance { id: 99 },));

        let created = instantiate_appliances(&mut world, &data);
        assert_eq!(created, vec![entity]);
        assert!(world.get::<&RefreshLayoutsActivator>(entity).is_ok());
        assert!(world.get::<&CreateAppliance>(entity).is_err());
        assert!(!world.contains(unknown));
    }
}
