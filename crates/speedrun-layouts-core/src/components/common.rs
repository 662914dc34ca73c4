//! Common components used across multiple entity types.

use hecs::Entity;
use serde::{Deserialize, Serialize};

/// 3D position vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

/// World placement of an entity: where it stands and which way it faces.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub location: Vec3,
    pub forward: Vec3,
}

impl Position {
    pub fn new(location: Vec3) -> Self {
        Self {
            location,
            forward: Vec3::X,
        }
    }

    pub fn facing(mut self, forward: Vec3) -> Self {
        self.forward = forward;
        self
    }
}

/// Something that can hold one item, e.g. a pedestal holding a layout map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemHolder {
    pub item: Option<Entity>,
}

impl ItemHolder {
    pub fn holding(item: Entity) -> Self {
        Self { item: Some(item) }
    }
}

/// Back-reference from a held item to its holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldBy {
    pub holder: Entity,
}

/// Entity is not written to save files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoNotPersist;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_add() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.0, -2.0);
        assert_eq!(a + b, Vec3::new(-3.0, 2.0, 1.0));
    }

    #[test]
    fn test_position_facing() {
        let pos = Position::new(Vec3::ZERO).facing(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(pos.forward.z, 1.0);
        assert_eq!(Position::new(Vec3::ZERO).forward, Vec3::X);
    }

    #[test]
    fn test_item_holder() {
        let mut world = hecs::World::new();
        let item = world.spawn(());
        assert_eq!(ItemHolder::default().item, None);
        assert_eq!(ItemHolder::holding(item).item, Some(item));
    }
}
