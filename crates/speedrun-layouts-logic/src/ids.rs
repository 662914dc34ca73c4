//! Identifier allocation for data objects.
//!
//! Identifiers are signed 32-bit integers. `0` is reserved to mean "no id"
//! and is never handed out. Caller-declared (persistent) ids are claimed with
//! [`IdentifierAllocator::reserve`]; ids that may move are placed with
//! [`IdentifierAllocator::allocate_around`], which probes upwards from a seed.

use std::collections::HashSet;
use std::fmt;

/// How many consecutive ids `allocate_around` tries before giving up.
pub const MAX_ID_CONFLICT_REATTEMPTS: i32 = 1000;

/// Why an identifier could not be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    /// `0` is never a valid identifier.
    Zero,
    /// The identifier is already taken.
    Collision(i32),
    /// Every probed identifier in `first..=last` was taken.
    Exhausted { first: i32, last: i32 },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Zero => write!(f, "ID cannot be 0"),
            IdError::Collision(id) => write!(f, "ID {} already in use", id),
            IdError::Exhausted { first, last } => {
                write!(f, "ID {} to {} already in use", first, last)
            }
        }
    }
}

impl std::error::Error for IdError {}

/// Set of identifiers already claimed in a catalog.
#[derive(Debug, Clone, Default)]
pub struct IdentifierAllocator {
    taken: HashSet<i32>,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an allocator from ids already present in a catalog.
    ///
    /// Duplicates and zeros in `ids` are ignored.
    pub fn from_ids(ids: impl IntoIterator<Item = i32>) -> Self {
        Self {
            taken: ids.into_iter().filter(|id| *id != 0).collect(),
        }
    }

    pub fn contains(&self, id: i32) -> bool {
        self.taken.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// Claim exactly `id`. No retry on collision.
    pub fn reserve(&mut self, id: i32) -> Result<(), IdError> {
        if id == 0 {
            return Err(IdError::Zero);
        }
        if !self.taken.insert(id) {
            return Err(IdError::Collision(id));
        }
        Ok(())
    }

    /// Claim the first free id in `seed+1 ..= seed+MAX_ID_CONFLICT_REATTEMPTS`.
    ///
    /// Arithmetic wraps at the `i32` boundaries and `0` is skipped as if taken.
    pub fn allocate_around(&mut self, seed: i32) -> Result<i32, IdError> {
        let mut candidate = seed;
        for _ in 0..MAX_ID_CONFLICT_REATTEMPTS {
            candidate = candidate.wrapping_add(1);
            if candidate != 0 && self.taken.insert(candidate) {
                return Ok(candidate);
            }
        }
        Err(IdError::Exhausted {
            first: seed.wrapping_add(1),
            last: candidate,
        })
    }
}

/// Derive a stable identifier from a mod guid and an object name.
///
/// Takes the first four bytes of the BLAKE3 digest of `"{guid}:{name}"` as a
/// little-endian `i32`. The result is stable across runs and platforms.
pub fn stable_id(guid: &str, name: &str) -> i32 {
    hash_id(&format!("{}:{}", guid, name))
}

/// Stable identifier for an arbitrary key.
pub fn hash_id(key: &str) -> i32 {
    let digest = blake3::hash(key.as_bytes());
    let bytes = digest.as_bytes();
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
