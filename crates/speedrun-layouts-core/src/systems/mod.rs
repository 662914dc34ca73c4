//! Systems - logic that operates on components

mod layout_requests;
mod refresh;

pub use layout_requests::*;
pub use refresh::*;
