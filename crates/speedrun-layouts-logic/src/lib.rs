//! Pure layout selection and data registration logic for Speedrun Layouts.
//!
//! This crate contains everything that does not need an ECS world: identifier
//! allocation, localisation merging, the setting → layout profile mapping,
//! the candidate pool override and the per-slot layout selection loop.
//! Functions take plain data (plus an injected `rand::Rng` where randomness
//! is involved) and return results, so they can be unit-tested with seeded
//! generators and deterministic stub resolvers.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`ids`] | Identifier allocation with collision checks and linear probing |
//! | [`localisation`] | Locales, localisation tables, pending overlays and merging |
//! | [`pool`] | Candidate pool with a single-slot scoped override |
//! | [`profiles`] | Setting → allowed layout profile registry, selectable profiles |
//! | [`selection`] | Bounded rejection sampling and no-repeat pool shrinkage |

pub mod ids;
pub mod localisation;
pub mod pool;
pub mod profiles;
pub mod selection;
