//! Game data catalog - every registered data object, by id and in load order.

mod objects;

pub use objects::*;

use speedrun_layouts_logic::ids::{IdError, IdentifierAllocator};
use std::collections::HashMap;

/// Ordered list of data objects plus an id index.
///
/// Ids are unique for the lifetime of the catalog; objects are only ever
/// appended.
#[derive(Debug, Default)]
pub struct GameData {
    objects: Vec<Box<dyn GameDataObject>>,
    index: HashMap<i32, usize>,
    ids: IdentifierAllocator,
}

impl GameData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from base game data, failing on the first bad id.
    pub fn from_objects(
        objects: impl IntoIterator<Item = Box<dyn GameDataObject>>,
    ) -> Result<Self, IdError> {
        let mut data = Self::new();
        for object in objects {
            data.insert(object)?;
        }
        Ok(data)
    }

    /// Append `object` under its own id.
    pub fn insert(&mut self, object: Box<dyn GameDataObject>) -> Result<i32, IdError> {
        let id = object.id();
        self.ids.reserve(id)?;
        self.push(id, object);
        Ok(id)
    }

    /// Append `object` under the first free id above `seed`, rewriting its id.
    pub fn insert_around(
        &mut self,
        mut object: Box<dyn GameDataObject>,
        seed: i32,
    ) -> Result<i32, IdError> {
        let id = self.ids.allocate_around(seed)?;
        object.set_id(id);
        self.push(id, object);
        Ok(id)
    }

    fn push(&mut self, id: i32, object: Box<dyn GameDataObject>) {
        self.index.insert(id, self.objects.len());
        self.objects.push(object);
    }

    pub fn contains(&self, id: i32) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&dyn GameDataObject> {
        self.index.get(&id).map(|&i| self.objects[i].as_ref())
    }

    /// Look up `id` and downcast it to `T`.
    pub fn try_get<T: GameDataObject>(&self, id: i32) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    pub fn try_get_mut<T: GameDataObject>(&mut self, id: i32) -> Option<&mut T> {
        let i = *self.index.get(&id)?;
        self.objects[i].as_any_mut().downcast_mut::<T>()
    }

    /// First object of type `T` in load order.
    pub fn first_of_type_mut<T: GameDataObject>(&mut self) -> Option<&mut T> {
        self.objects
            .iter_mut()
            .find_map(|object| object.as_any_mut().downcast_mut::<T>())
    }

    /// Objects in load order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn GameDataObject> + '_ {
        self.objects.iter().map(|object| object.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.objects.iter().map(|object| object.id())
    }
}
