//! The layout generator capability.
//!
//! Turning a seed into a profile choice and then into room geometry is the
//! host game's job. The request system only sees it through
//! [`LayoutGenerator`]. [`CatalogueGenerator`] is a small deterministic
//! implementation for tests and the headless harness.

use hecs::{Entity, World};
use speedrun_layouts_logic::pool::CandidatePool;
use std::collections::BTreeMap;
use std::fmt;

use crate::components::{FeatureKind, LayoutFeature, LayoutFeatures, LayoutMap, RoomTile, RoomTiles};

/// A seed together with the layout profile it resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSeed {
    pub seed: i32,
    pub layout_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The resolved profile is not known to the generator.
    UnknownProfile(i32),
    /// Neither the allow-list, the candidate pool nor the generator offered any profile.
    EmptyCandidates,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::UnknownProfile(id) => write!(f, "Unknown layout profile {}", id),
            GenerationError::EmptyCandidates => write!(f, "No layout profile candidates"),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Resolves seeds to layout profiles and materializes layout maps.
pub trait LayoutGenerator {
    /// Profile `seed` produces. `allow_list` restricts the choice when given;
    /// otherwise the generator draws from `pool`.
    fn resolve(&self, seed: i32, allow_list: Option<&[i32]>, pool: &CandidatePool) -> LayoutSeed;

    /// Spawn the layout map item for `seed` in `setting_id`.
    fn generate_map(
        &mut self,
        world: &mut World,
        seed: &LayoutSeed,
        setting_id: i32,
    ) -> Result<Entity, GenerationError>;
}

/// Footprint of a profile known to [`CatalogueGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileShape {
    pub width: i32,
    pub height: i32,
    /// Generate maps without feature data, as a broken profile would.
    pub incomplete: bool,
}

impl ProfileShape {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            incomplete: false,
        }
    }

    pub fn incomplete(mut self) -> Self {
        self.incomplete = true;
        self
    }
}

/// Deterministic generator over a fixed set of profiles.
///
/// A seed picks `candidates[seed mod len]`, where `candidates` is the
/// allow-list if non-empty, else the candidate pool if non-empty, else every
/// known profile in id order.
#[derive(Debug, Clone, Default)]
pub struct CatalogueGenerator {
    profiles: BTreeMap<i32, ProfileShape>,
    maps_generated: usize,
}

impl CatalogueGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, id: i32, shape: ProfileShape) -> Self {
        self.profiles.insert(id, shape);
        self
    }

    pub fn maps_generated(&self) -> usize {
        self.maps_generated
    }

    fn pick(seed: i32, ids: &[i32]) -> Option<i32> {
        if ids.is_empty() {
            return None;
        }
        Some(ids[seed.rem_euclid(ids.len() as i32) as usize])
    }
}

impl LayoutGenerator for CatalogueGenerator {
    fn resolve(&self, seed: i32, allow_list: Option<&[i32]>, pool: &CandidatePool) -> LayoutSeed {
        let known: Vec<i32> = self.profiles.keys().copied().collect();
        let layout_id = allow_list
            .and_then(|ids| Self::pick(seed, ids))
            .or_else(|| Self::pick(seed, pool.ids()))
            .or_else(|| Self::pick(seed, &known))
            .unwrap_or(0);
        LayoutSeed { seed, layout_id }
    }

    fn generate_map(
        &mut self,
        world: &mut World,
        seed: &LayoutSeed,
        setting_id: i32,
    ) -> Result<Entity, GenerationError> {
        if seed.layout_id == 0 {
            return Err(GenerationError::EmptyCandidates);
        }
        let shape = *self
            .profiles
            .get(&seed.layout_id)
            .ok_or(GenerationError::UnknownProfile(seed.layout_id))?;

        let split = shape.width / 2;
        let tiles: Vec<RoomTile> = (0..shape.width)
            .flat_map(|x| (0..shape.height).map(move |y| (x, y)))
            .map(|(x, y)| RoomTile {
                x,
                y,
                room: u32::from(x >= split),
            })
            .collect();

        let layout = if shape.incomplete {
            world.spawn((RoomTiles(tiles),))
        } else {
            // Front door on the bottom edge, one door between the two rooms
            let door_y = seed.seed.rem_euclid(shape.height.max(1));
            let features = vec![
                LayoutFeature {
                    kind: FeatureKind::FrontDoor,
                    from: (0, -1),
                    to: (0, 0),
                },
                LayoutFeature {
                    kind: FeatureKind::Door,
                    from: (split - 1, door_y),
                    to: (split, door_y),
                },
            ];
            world.spawn((RoomTiles(tiles), LayoutFeatures(features)))
        };

        let map = world.spawn((LayoutMap {
            layout,
            seed: seed.seed,
            profile_id: seed.layout_id,
            setting_id,
        },));
        self.maps_generated += 1;
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> CatalogueGenerator {
        CatalogueGenerator::new()
            .with_profile(10, ProfileShape::new(4, 3))
            .with_profile(20, ProfileShape::new(6, 2))
            .with_profile(30, ProfileShape::new(2, 2).incomplete())
    }

    #[test]
    fn test_resolve_prefers_allow_list_then_pool() {
        let catalogue = generator();
        let pool = CandidatePool::new(vec![30]);
        assert_eq!(catalogue.resolve(1, Some(&[20]), &pool).layout_id, 20);
        assert_eq!(catalogue.resolve(1, None, &pool).layout_id, 30);
        assert_eq!(catalogue.resolve(1, Some(&[]), &pool).layout_id, 30);

        let empty = CandidatePool::default();
        assert_eq!(catalogue.resolve(0, None, &empty).layout_id, 10);
        assert_eq!(catalogue.resolve(-1, None, &empty).layout_id, 30);
    }

    #[test]
    fn test_generate_map_spawns_layout_data() {
        let mut catalogue = generator();
        let mut world = World::new();
        let map = catalogue
            .generate_map(&mut world, &LayoutSeed { seed: 5, layout_id: 10 }, 77)
            .unwrap();

        let layout_map = *world.get::<&LayoutMap>(map).unwrap();
        assert_eq!(layout_map.profile_id, 10);
        assert_eq!(layout_map.setting_id, 77);
        assert_eq!(world.get::<&RoomTiles>(layout_map.layout).unwrap().0.len(), 12);
        assert_eq!(world.get::<&LayoutFeatures>(layout_map.layout).unwrap().0.len(), 2);
        assert_eq!(catalogue.maps_generated(), 1);
    }

    #[test]
    fn test_incomplete_profile_has_no_features() {
        let mut catalogue = generator();
        let mut world = World::new();
        let map = catalogue
            .generate_map(&mut world, &LayoutSeed { seed: 1, layout_id: 30 }, 0)
            .unwrap();
        let layout = world.get::<&LayoutMap>(map).unwrap().layout;
        assert!(world.get::<&LayoutFeatures>(layout).is_err());
    }

    #[test]
    fn test_unknown_profile() {
        let mut catalogue = generator();
        let mut world = World::new();
        let seed = LayoutSeed { seed: 1, layout_id: 99 };
        assert_eq!(
            catalogue.generate_map(&mut world, &seed, 0),
            Err(GenerationError::UnknownProfile(99))
        );
        assert_eq!(world.len(), 0);
    }
}
