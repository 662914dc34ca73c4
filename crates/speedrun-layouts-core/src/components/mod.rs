//! Component definitions for the layout world.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod common;
mod layout;

pub use common::*;
pub use layout::*;
