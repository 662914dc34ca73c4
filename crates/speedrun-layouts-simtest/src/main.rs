//! Speedrun Layouts Headless Harness
//!
//! Validates layout selection, data registration and the request flow
//! without a host game. Map generation uses the deterministic catalogue
//! generator.
//!
//! Usage:
//!   cargo run -p speedrun-layouts-simtest
//!   cargo run -p speedrun-layouts-simtest -- --verbose
//!   cargo run -p speedrun-layouts-simtest -- --json

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use speedrun_layouts_core::config::ModConfig;
use speedrun_layouts_core::data::{
    Dish, GameData, GameDataObject, GlobalLocalisation, RestaurantSetting,
};
use speedrun_layouts_core::plugin::{self, MOD_GUID};
use speedrun_layouts_core::prelude::*;
use speedrun_layouts_core::registration::DataRegistry;
use speedrun_layouts_core::systems::Interaction;
use speedrun_layouts_logic::ids::{IdError, IdentifierAllocator, MAX_ID_CONFLICT_REATTEMPTS};
use speedrun_layouts_logic::localisation::{Locale, LocalisationSet};
use speedrun_layouts_logic::pool::CandidatePool;
use speedrun_layouts_logic::profiles::{self, known_ids, LayoutProfileRegistry};
use speedrun_layouts_logic::selection::{LayoutSelectionEngine, MAX_TARGET_ATTEMPTS};

// ── Shipped mod configuration ───────────────────────────────────────────
const CONFIG_JSON: &str = include_str!("../../../data/speedrun_layouts.json");

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    if !json {
        println!("=== Speedrun Layouts Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Shipped configuration
    results.extend(validate_config(verbose));

    // 2. Identifier allocation
    results.extend(validate_identifiers(verbose));

    // 3. Data registration and localisation
    results.extend(validate_registration(verbose));

    // 4. Layout selection
    results.extend(validate_selection(verbose));

    // 5. Full request flow
    results.extend(validate_request_flow(verbose));

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(report) => println!("{}", report),
            Err(e) => eprintln!("Failed to serialize report: {}", e),
        }
    } else {
        // ── Summary ──
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }

        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed, total, failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn section(title: &str) {
    if !std::env::args().any(|a| a == "--json") {
        println!("--- {} ---", title);
    }
}

const DINER: i32 = -80202533;
const BASIC: i32 = 222370461;
const MEDIUM: i32 = -2045800810;
const EXTENDED: i32 = 557943155;
const HUGE: i32 = 154938708;

fn catalogue() -> CatalogueGenerator {
    CatalogueGenerator::new()
        .with_profile(DINER, ProfileShape::new(6, 4))
        .with_profile(BASIC, ProfileShape::new(10, 7))
        .with_profile(MEDIUM, ProfileShape::new(14, 6))
        .with_profile(EXTENDED, ProfileShape::new(16, 8))
        .with_profile(HUGE, ProfileShape::new(20, 10))
        .with_profile(known_ids::NORTH_POLE_LAYOUT, ProfileShape::new(8, 8))
}

fn pool_resolver(pool: &CandidatePool) -> impl FnMut(i32, Option<&[i32]>) -> i32 + '_ {
    move |seed: i32, allow_list: Option<&[i32]>| {
        let ids = match allow_list {
            Some(ids) if !ids.is_empty() => ids,
            _ => pool.ids(),
        };
        if ids.is_empty() {
            return 0;
        }
        ids[seed.rem_euclid(ids.len() as i32) as usize]
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(verbose: bool) -> Vec<TestResult> {
    section("Configuration");
    let mut results = Vec::new();

    let config = match ModConfig::from_json_str(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "config_parse".into(),
        passed: true,
        detail: format!("{} setting layouts", config.setting_layouts.len()),
    });

    let mut registry = LayoutProfileRegistry::new();
    let mut preferences = speedrun_layouts_core::preferences::Preferences::new();
    config.apply(&mut registry, &mut preferences);
    let north_pole = registry.try_get_valid_profile_ids(known_ids::NORTH_POLE_SETTING);
    results.push(TestResult {
        name: "config_north_pole_restricted".into(),
        passed: north_pole == Some(vec![known_ids::NORTH_POLE_LAYOUT]),
        detail: format!("north pole allow-list {:?}", north_pole),
    });

    let selectable = profiles::SELECTABLE_LAYOUT_PROFILES
        .iter()
        .all(|(id, _)| ModConfig {
            selected_layout_profile: *id,
            ..Default::default()
        }
        .validate()
        .is_empty());
    results.push(TestResult {
        name: "config_selectable_profiles_valid".into(),
        passed: selectable,
        detail: format!(
            "{} selectable profiles",
            profiles::SELECTABLE_LAYOUT_PROFILES.len()
        ),
    });

    if verbose {
        println!("  Selectable layout profiles:");
        for (id, name) in profiles::SELECTABLE_LAYOUT_PROFILES {
            println!("    {:>12}: {}", id, name);
        }
    }

    results
}

// ── 2. Identifiers ──────────────────────────────────────────────────────

fn validate_identifiers(_verbose: bool) -> Vec<TestResult> {
    section("Identifiers");
    let mut results = Vec::new();

    let mut ids = IdentifierAllocator::new();
    results.push(TestResult {
        name: "ids_zero_rejected".into(),
        passed: ids.reserve(0) == Err(IdError::Zero),
        detail: "id 0 can never be reserved".into(),
    });

    // Probing across the wrap skips 0
    let mut wrap = IdentifierAllocator::from_ids([-1]);
    let next = wrap.allocate_around(-2);
    results.push(TestResult {
        name: "ids_probe_skips_zero".into(),
        passed: next == Ok(1),
        detail: format!("allocate_around(-2) with -1 taken → {:?}", next),
    });

    let mut full = IdentifierAllocator::from_ids(1..=MAX_ID_CONFLICT_REATTEMPTS);
    let exhausted = full.allocate_around(0);
    results.push(TestResult {
        name: "ids_exhaustion_reported".into(),
        passed: matches!(exhausted, Err(IdError::Exhausted { .. })),
        detail: format!("{:?}", exhausted),
    });

    let button = plugin::refresh_button_id();
    results.push(TestResult {
        name: "ids_button_id_stable".into(),
        passed: button != 0 && button == plugin::refresh_button_id(),
        detail: format!("refresh button id {}", button),
    });

    results
}

// ── 3. Registration ─────────────────────────────────────────────────────

fn validate_registration(verbose: bool) -> Vec<TestResult> {
    section("Registration");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(3);

    let mut data = match GameData::from_objects([
        Box::new(GlobalLocalisation {
            id: 1,
            name: "Global".into(),
            localisation: LocalisationSet::with_locales(&[Locale::English, Locale::French]),
        }) as Box<dyn GameDataObject>,
        Box::new(Dish {
            id: 100,
            name: "Burgers".into(),
        }),
    ]) {
        Ok(d) => d,
        Err(e) => {
            results.push(TestResult {
                name: "registration_base_data".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let mut registry = DataRegistry::new(MOD_GUID);
    let outside = registry.add_game_data_object(Dish {
        id: 5,
        name: "Late".into(),
    });
    results.push(TestResult {
        name: "registration_window_enforced".into(),
        passed: outside.is_err() && registry.pending_objects() == 0,
        detail: "registration outside the window is rejected".into(),
    });

    registry.with_window(|registry| {
        let _ = registry.add_game_data_object(Dish {
            id: 100,
            name: "Clash".into(),
        });
        let _ = registry.add_game_data_object_transient(RestaurantSetting {
            id: 100,
            name: "Moved".into(),
            fixed_dish: None,
        });
        let _ = registry.add_text_localisation(
            "speedrun.refresh",
            [
                (Locale::English, "Refresh".to_string()),
                (Locale::German, "Neu".to_string()),
            ],
        );
    });
    let report = registry.build_game_data(&mut data, &mut rng);

    results.push(TestResult {
        name: "registration_persistent_collision_rejected".into(),
        passed: report.rejected.len() == 1
            && data.try_get::<Dish>(100).map(|d| d.name.as_str()) == Some("Burgers"),
        detail: format!("{} rejected", report.rejected.len()),
    });

    let moved = report.registered.iter().find(|r| r.name == "Moved");
    results.push(TestResult {
        name: "registration_transient_relocated".into(),
        passed: moved.is_some_and(|r| r.id != 100 && data.contains(r.id)),
        detail: format!("transient setting landed at {:?}", moved.map(|r| r.id)),
    });

    // English bucket gets the text, French has no translation, German is not a locale
    results.push(TestResult {
        name: "registration_localisation_merged".into(),
        passed: report.localisations.text == 1,
        detail: format!("{} translations merged", report.localisations.total()),
    });

    if verbose {
        for r in &report.registered {
            println!("  Added {} {} ({}) → {}", r.kind, r.name, r.requested_id, r.id);
        }
    }

    results
}

// ── 4. Selection ────────────────────────────────────────────────────────

fn validate_selection(verbose: bool) -> Vec<TestResult> {
    section("Layout Selection");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(11);
    let pool = CandidatePool::new(vec![DINER, BASIC, MEDIUM, EXTENDED, HUGE]);

    // Restricted: no repeats while candidates remain
    let mut engine = LayoutSelectionEngine::new(Some(vec![BASIC, MEDIUM, EXTENDED]), 0);
    let mut resolver = pool_resolver(&pool);
    let mut chosen: Vec<i32> = (0..3)
        .map(|_| engine.choose(&mut rng, &mut resolver).profile_id)
        .collect();
    chosen.sort();
    results.push(TestResult {
        name: "selection_no_repeats".into(),
        passed: chosen == vec![MEDIUM, BASIC, EXTENDED],
        detail: format!("chosen {:?}", chosen),
    });

    // Forced target reachable through the pool
    let mut engine = LayoutSelectionEngine::new(None, HUGE);
    let mut attempts = Vec::new();
    let all_hit = (0..10).all(|_| {
        let choice = engine.choose(&mut rng, &mut resolver);
        attempts.push(choice.attempts);
        choice.profile_id == HUGE
    });
    results.push(TestResult {
        name: "selection_forced_target".into(),
        passed: all_hit,
        detail: format!("attempts per slot {:?}", attempts),
    });

    // Unreachable target falls back after the budget
    let mut engine = LayoutSelectionEngine::new(None, known_ids::NORTH_POLE_LAYOUT);
    let choice = engine.choose(&mut rng, &mut resolver);
    results.push(TestResult {
        name: "selection_bounded_retries".into(),
        passed: choice.fallback && choice.attempts == MAX_TARGET_ATTEMPTS,
        detail: format!("{} attempts, fallback {}", choice.attempts, choice.profile_id),
    });

    if verbose {
        for (id, name) in profiles::SELECTABLE_LAYOUT_PROFILES {
            if pool.contains(id) {
                println!("  In pool: {}", name);
            }
        }
    }

    results
}

// ── 5. Request Flow ─────────────────────────────────────────────────────

fn validate_request_flow(verbose: bool) -> Vec<TestResult> {
    section("Request Flow");
    let mut results = Vec::new();

    let base = GameData::from_objects([
        Box::new(RestaurantSetting {
            id: known_ids::NORTH_POLE_SETTING,
            name: "North Pole".into(),
            fixed_dish: Some(100),
        }) as Box<dyn GameDataObject>,
        Box::new(speedrun_layouts_core::data::LayoutProfile {
            id: known_ids::NORTH_POLE_LAYOUT,
            name: "North Pole".into(),
        }),
        Box::new(speedrun_layouts_core::data::Appliance {
            id: known_ids::WORKSHOP_CRAFT_BUTTON,
            name: "Workshop Craft Button".into(),
            ..Default::default()
        }),
    ]);
    let base = match base {
        Ok(b) => b,
        Err(e) => {
            results.push(TestResult {
                name: "flow_base_data".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let mut engine = LayoutsEngine::new(Box::new(catalogue()))
        .with_seed(99)
        .with_data(base)
        .with_pool(CandidatePool::new(vec![DINER, BASIC, MEDIUM]));
    let activated = engine.activate();
    results.push(TestResult {
        name: "flow_activation".into(),
        passed: activated
            .as_ref()
            .is_ok_and(|(reg, pre)| reg.rejected.is_empty() && pre.button_activated),
        detail: format!("{:?}", activated.as_ref().map(|(_, pre)| pre)),
    });

    let slots: Vec<_> = (0..4)
        .map(|_| engine.world.spawn((LayoutSlot, ItemHolder::default())))
        .collect();
    engine.world.spawn((SettingSelector {
        setting_id: known_ids::NORTH_POLE_SETTING,
    },));
    engine.update();

    let button = engine
        .world
        .query::<&RefreshLayoutsActivator>()
        .iter()
        .map(|(e, _)| e)
        .next();
    let actor = engine.world.spawn(());
    let pressed = button.is_some_and(|target| engine.interact(Interaction { actor, target }));
    results.push(TestResult {
        name: "flow_button_triggers_request".into(),
        passed: pressed,
        detail: format!("button {:?}", button),
    });

    let outcome = engine.update();
    let linked = outcome.as_ref().map_or(0, |o| o.linked().count());
    results.push(TestResult {
        name: "flow_all_slots_filled".into(),
        passed: linked == slots.len(),
        detail: format!("{}/{} slots linked", linked, slots.len()),
    });

    let dishes = engine.world.query::<&SettingDish>().iter().count();
    let maps_ok = outcome.as_ref().is_some_and(|o| {
        o.linked()
            .all(|s| s.choice.profile_id == known_ids::NORTH_POLE_LAYOUT)
    });
    results.push(TestResult {
        name: "flow_setting_layout_and_dish".into(),
        passed: maps_ok && dishes == slots.len(),
        detail: format!("{} maps carry the fixed dish", dishes),
    });

    results.push(TestResult {
        name: "flow_request_consumed".into(),
        passed: engine.update().is_none(),
        detail: "a processed request is not handled twice".into(),
    });

    if verbose {
        if let Some(outcome) = &outcome {
            for slot in &outcome.slots {
                println!(
                    "  Slot {:?}: profile {} seed {} ({} attempts)",
                    slot.slot, slot.choice.profile_id, slot.choice.seed, slot.choice.attempts
                );
            }
        }
    }

    results
}
