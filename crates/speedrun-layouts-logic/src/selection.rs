//! Per-slot layout selection.
//!
//! For every slot a random seed is drawn and handed to an opaque resolver
//! that turns `(seed, allow_list)` into a layout profile id. When a forced
//! target profile is set, seeds are redrawn until the resolver lands on it or
//! [`MAX_TARGET_ATTEMPTS`] draws have been made; after that the last draw is
//! accepted as is. Chosen profiles are removed from the allow-list for the
//! following slots as long as more than one candidate remains.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::profiles::VANILLA_PROFILE;

/// Upper bound on seed draws per slot while chasing a forced target.
pub const MAX_TARGET_ATTEMPTS: u32 = 1000;

/// Resolves a seed to a concrete layout profile id.
///
/// The mapping is opaque: nothing guarantees that a given member of
/// `allow_list` is reachable from any particular seed.
pub trait ProfileResolver {
    fn resolve(&mut self, seed: i32, allow_list: Option<&[i32]>) -> i32;
}

impl<F> ProfileResolver for F
where
    F: FnMut(i32, Option<&[i32]>) -> i32,
{
    fn resolve(&mut self, seed: i32, allow_list: Option<&[i32]>) -> i32 {
        self(seed, allow_list)
    }
}

/// Outcome of selecting a layout for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutChoice {
    /// Seed the generator should materialize.
    pub seed: i32,
    /// Profile the resolver mapped `seed` to.
    pub profile_id: i32,
    /// Seeds drawn for this slot, at least 1.
    pub attempts: u32,
    /// A forced target was set and the retry budget ran out without hitting it.
    pub fallback: bool,
}

/// Selection state shared by all slots of one layout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSelectionEngine {
    remaining: Option<Vec<i32>>,
    target: Option<i32>,
}

impl LayoutSelectionEngine {
    /// `target` of [`VANILLA_PROFILE`] means no forced target.
    pub fn new(allow_list: Option<Vec<i32>>, target: i32) -> Self {
        Self {
            remaining: allow_list,
            target: (target != VANILLA_PROFILE).then_some(target),
        }
    }

    pub fn unrestricted() -> Self {
        Self::new(None, VANILLA_PROFILE)
    }

    /// Allow-list the next slot will be resolved against.
    pub fn allow_list(&self) -> Option<&[i32]> {
        self.remaining.as_deref()
    }

    pub fn target(&self) -> Option<i32> {
        self.target
    }

    /// Pick a layout for the next slot.
    pub fn choose<R, P>(&mut self, rng: &mut R, resolver: &mut P) -> LayoutChoice
    where
        R: Rng,
        P: ProfileResolver + ?Sized,
    {
        let mut attempts = 0;
        let (seed, profile_id) = loop {
            attempts += 1;
            let seed: i32 = rng.gen();
            let profile_id = resolver.resolve(seed, self.remaining.as_deref());
            match self.target {
                Some(target) if profile_id != target && attempts < MAX_TARGET_ATTEMPTS => continue,
                _ => break (seed, profile_id),
            }
        };

        if let Some(remaining) = self.remaining.as_mut() {
            if remaining.len() > 1 {
                remaining.retain(|id| *id != profile_id);
            }
        }

        LayoutChoice {
            seed,
            profile_id,
            attempts,
            fallback: self.target.is_some_and(|target| target != profile_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Picks from the allow-list by seed, falling back to `default`.
    fn by_seed(default: i32) -> impl FnMut(i32, Option<&[i32]>) -> i32 {
        move |seed, allow_list| match allow_list {
            Some(ids) if !ids.is_empty() => ids[seed.rem_euclid(ids.len() as i32) as usize],
            _ => default,
        }
    }

    #[test]
    fn test_three_slots_use_each_profile_once() {
        for rng_seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(rng_seed);
            let mut engine = LayoutSelectionEngine::new(Some(vec![10, 20, 30]), VANILLA_PROFILE);
            let mut resolver = by_seed(0);

            let mut chosen: Vec<i32> = (0..3)
                .map(|_| engine.choose(&mut rng, &mut resolver).profile_id)
                .collect();
            chosen.sort();
            assert_eq!(chosen, vec![10, 20, 30]);
            assert_eq!(engine.allow_list().map(|ids| ids.len()), Some(1));
        }
    }

    #[test]
    fn test_repeats_only_once_one_candidate_remains() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut engine = LayoutSelectionEngine::new(Some(vec![10, 20, 30]), VANILLA_PROFILE);
        let mut resolver = by_seed(0);

        let first = engine.choose(&mut rng, &mut resolver);
        let second = engine.choose(&mut rng, &mut resolver);
        assert_ne!(first.profile_id, second.profile_id);

        let third = engine.choose(&mut rng, &mut resolver);
        // The last candidate is never removed, so every later slot reuses it
        let fourth = engine.choose(&mut rng, &mut resolver);
        let fifth = engine.choose(&mut rng, &mut resolver);
        assert_eq!(fourth.profile_id, third.profile_id);
        assert_eq!(fifth.profile_id, third.profile_id);
        assert_eq!(engine.allow_list(), Some(&[third.profile_id][..]));
    }

    #[test]
    fn test_two_candidates_three_slots() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut engine = LayoutSelectionEngine::new(Some(vec![1, 2]), VANILLA_PROFILE);
        let mut resolver = by_seed(0);

        let a = engine.choose(&mut rng, &mut resolver).profile_id;
        let b = engine.choose(&mut rng, &mut resolver).profile_id;
        let c = engine.choose(&mut rng, &mut resolver).profile_id;
        assert_ne!(a, b);
        assert_eq!(c, b);
    }

    #[test]
    fn test_unrestricted_never_shrinks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut engine = LayoutSelectionEngine::unrestricted();
        let mut resolver = by_seed(99);
        for _ in 0..4 {
            let choice = engine.choose(&mut rng, &mut resolver);
            assert_eq!(choice.profile_id, 99);
            assert_eq!(choice.attempts, 1);
            assert!(!choice.fallback);
        }
        assert_eq!(engine.allow_list(), None);
    }

    #[test]
    fn test_unreachable_target_gives_up_after_budget() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut engine = LayoutSelectionEngine::new(Some(vec![10, 20]), 777);
        let mut calls = 0u32;
        let mut resolver = |seed: i32, allow_list: Option<&[i32]>| {
            calls += 1;
            let ids = allow_list.unwrap_or(&[]);
            ids[seed.rem_euclid(ids.len() as i32) as usize]
        };

        let choice = engine.choose(&mut rng, &mut resolver);
        assert_eq!(choice.attempts, MAX_TARGET_ATTEMPTS);
        assert!(choice.fallback);
        assert!(choice.profile_id == 10 || choice.profile_id == 20);
        assert_eq!(calls, MAX_TARGET_ATTEMPTS);
    }

    #[test]
    fn test_reachable_target_stops_early() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut engine = LayoutSelectionEngine::new(None, 3);
        // Resolver only hits the target on even seeds
        let mut resolver = |seed: i32, _: Option<&[i32]>| if seed % 2 == 0 { 3 } else { 4 };

        let choice = engine.choose(&mut rng, &mut resolver);
        assert_eq!(choice.profile_id, 3);
        assert_eq!(choice.seed % 2, 0);
        assert!(choice.attempts < MAX_TARGET_ATTEMPTS);
        assert!(!choice.fallback);
    }

    #[test]
    fn test_vanilla_target_is_no_target() {
        let engine = LayoutSelectionEngine::new(Some(vec![1]), VANILLA_PROFILE);
        assert_eq!(engine.target(), None);
        assert_eq!(LayoutSelectionEngine::new(None, 5).target(), Some(5));
    }
}
