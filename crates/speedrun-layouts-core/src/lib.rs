//! Speedrun Layouts Core - layout request handling on an ECS world
//!
//! Fills the franchise screen's layout slots with freshly generated maps
//! whenever a layout request is raised, honoring per-setting layout
//! restrictions and the player's selected layout profile. Also hosts the
//! mod's game data registration.
//!
//! # Architecture
//!
//! The engine uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Layout slots, layout maps, requests, appliances
//! - **Components**: Pure data attached to entities (LayoutSlot, ItemHolder, LayoutMap, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! Map generation itself is supplied by the host through
//! [`generator::LayoutGenerator`].
//!
//! # Example
//!
//! ```rust,no_run
//! use speedrun_layouts_core::prelude::*;
//!
//! let generator = CatalogueGenerator::new().with_profile(222370461, ProfileShape::new(10, 7));
//! let mut engine = LayoutsEngine::new(Box::new(generator));
//! engine.activate().unwrap();
//!
//! engine.world.spawn((LayoutSlot, ItemHolder::default()));
//! engine.request_layouts();
//! loop {
//!     engine.update();
//! }
//! ```

pub mod components;
pub mod config;
pub mod data;
pub mod engine;
pub mod generator;
pub mod plugin;
pub mod preferences;
pub mod registration;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::LayoutsEngine;
    pub use crate::generator::{CatalogueGenerator, LayoutGenerator, ProfileShape};
}
