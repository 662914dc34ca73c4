//! The candidate pool consulted by the layout generator.
//!
//! The generator restricts its profile choice to the ids in the pool. A
//! request can temporarily narrow the pool; at most one override may be
//! active at a time and the original contents are always put back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Errors from overriding the candidate pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A snapshot is already held; nested overrides are not supported.
    OverrideActive { saved: Vec<i32> },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::OverrideActive { saved } => write!(
                f,
                "Candidate pool is already overridden (saved pool has {} entries)",
                saved.len()
            ),
        }
    }
}

impl std::error::Error for PoolError {}

/// Ordered list of layout profile ids the generator may pick from, plus a
/// single-slot snapshot of the contents before the active override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePool {
    ids: Vec<i32>,
    #[serde(skip)]
    saved: Option<Vec<i32>>,
}

impl CandidatePool {
    pub fn new(ids: Vec<i32>) -> Self {
        Self { ids, saved: None }
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn contains(&self, id: i32) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_overridden(&self) -> bool {
        self.saved.is_some()
    }

    /// Overwrite the pool with `ids`.
    ///
    /// With `cache`, the current contents are saved first so `restore` can put
    /// them back. A cached replace while a snapshot is already held fails and
    /// changes nothing. Without `cache`, any held snapshot is kept.
    pub fn replace(&mut self, ids: Vec<i32>, cache: bool) -> Result<(), PoolError> {
        if cache {
            if let Some(saved) = &self.saved {
                return Err(PoolError::OverrideActive {
                    saved: saved.clone(),
                });
            }
            self.saved = Some(std::mem::replace(&mut self.ids, ids));
        } else {
            self.ids = ids;
        }
        Ok(())
    }

    /// Write the saved snapshot back. No-op if there is none.
    pub fn restore(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.ids = saved;
        }
    }

    /// Override the pool for as long as the returned guard lives.
    ///
    /// The guard borrows the pool exclusively, so a second override cannot be
    /// taken through it, and restores the saved contents on drop.
    pub fn scoped(&mut self, ids: Vec<i32>) -> Result<PoolOverride<'_>, PoolError> {
        self.replace(ids, true)?;
        Ok(PoolOverride { pool: self })
    }
}

/// Active override of a [`CandidatePool`]. Restores the pool when dropped.
#[derive(Debug)]
pub struct PoolOverride<'a> {
    pool: &'a mut CandidatePool,
}

impl Deref for PoolOverride<'_> {
    type Target = CandidatePool;

    fn deref(&self) -> &CandidatePool {
        self.pool
    }
}

impl Drop for PoolOverride<'_> {
    fn drop(&mut self) {
        self.pool.restore();
    }
}
