//! Registration of mod-defined data objects and localisation.
//!
//! Objects and translations are queued while the registration window is open
//! (the plugin's post-activate hook) and written into the catalog by
//! [`DataRegistry::build_game_data`], which runs once before the catalog is
//! finalized.
//!
//! Object registration runs in two phases. Persistent-id objects go first
//! and are rejected outright when their id is 0 or already taken. Transient-id
//! objects go second; on a collision they are moved to the first free id
//! above a freshly drawn random seed.

use rand::Rng;
use serde::Serialize;
use speedrun_layouts_logic::ids::{stable_id, IdError};
use speedrun_layouts_logic::localisation::{
    GenericLocalisation, Locale, LocalisationMerger, MergeCount, PopupDetails, PopupType,
    StartDayWarning,
};
use std::fmt;

use crate::data::{GameData, GameDataObject, GlobalLocalisation};

/// Errors returned by the queueing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Called outside the registration window; nothing was queued.
    WindowClosed { what: &'static str },
    /// A translation set for this key is already queued in this domain.
    DuplicateLocalisationKey { domain: &'static str, key: String },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::WindowClosed { what } => {
                write!(f, "{} can only be added while post-activating", what)
            }
            RegistrationError::DuplicateLocalisationKey { domain, key } => {
                write!(f, "{} localisation for {} is already queued", domain, key)
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

#[derive(Debug)]
struct PendingDataObject {
    object: Box<dyn GameDataObject>,
    transient_id: bool,
}

/// A queued object that made it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    pub kind: &'static str,
    pub name: String,
    /// Id the object was queued with.
    pub requested_id: i32,
    /// Id it was registered under.
    pub id: i32,
}

/// A queued object that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: &'static str,
    pub name: String,
    pub requested_id: i32,
    pub error: IdError,
}

/// What one `build_game_data` pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Registered objects in registration order.
    pub registered: Vec<Registered>,
    pub rejected: Vec<Rejection>,
    pub localisations: MergeCount,
}

/// Queue of data objects and translations awaiting registration.
#[derive(Debug)]
pub struct DataRegistry {
    mod_guid: String,
    window_open: bool,
    pending: Vec<PendingDataObject>,
    localisations: LocalisationMerger,
}

impl DataRegistry {
    pub fn new(mod_guid: impl Into<String>) -> Self {
        Self {
            mod_guid: mod_guid.into(),
            window_open: false,
            pending: Vec::new(),
            localisations: LocalisationMerger::new(),
        }
    }

    pub fn mod_guid(&self) -> &str {
        &self.mod_guid
    }

    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    /// Run `f` with the registration window open.
    pub fn with_window<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.window_open = true;
        let result = f(self);
        self.window_open = false;
        result
    }

    pub fn pending_objects(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_localisations(&self) -> &LocalisationMerger {
        &self.localisations
    }

    fn check_window(&self, what: &'static str) -> Result<(), RegistrationError> {
        if self.window_open {
            return Ok(());
        }
        let err = RegistrationError::WindowClosed { what };
        log::error!("{}!", err);
        Err(err)
    }

    /// Queue `object` under its caller-assigned, persistent id.
    pub fn add_game_data_object<T: GameDataObject>(
        &mut self,
        object: T,
    ) -> Result<i32, RegistrationError> {
        self.queue(Box::new(object), false)
    }

    /// Queue `object`; its id may be reassigned if it collides.
    pub fn add_game_data_object_transient<T: GameDataObject>(
        &mut self,
        object: T,
    ) -> Result<i32, RegistrationError> {
        self.queue(Box::new(object), true)
    }

    /// Queue a new `T` named `name`, with an id derived from the mod guid and
    /// `name`. `configure` fills in the rest of the object before it is queued.
    pub fn add_game_data_object_named<T: GameDataObject + Default>(
        &mut self,
        name: &str,
        configure: impl FnOnce(&mut T),
    ) -> Result<i32, RegistrationError> {
        self.check_window("Game data objects")?;
        let mut object = T::default();
        object.set_id(stable_id(&self.mod_guid, name));
        object.set_name(format!("{} - {}", self.mod_guid, name));
        configure(&mut object);
        self.queue(Box::new(object), false)
    }

    fn queue(
        &mut self,
        object: Box<dyn GameDataObject>,
        transient_id: bool,
    ) -> Result<i32, RegistrationError> {
        self.check_window("Game data objects")?;
        let id = object.id();
        self.pending.push(PendingDataObject {
            object,
            transient_id,
        });
        Ok(id)
    }

    pub fn add_text_localisation(
        &mut self,
        key: &str,
        translations: impl IntoIterator<Item = (Locale, String)>,
    ) -> Result<(), RegistrationError> {
        self.check_window("Global localisation")?;
        if !self.localisations.text.add(key.to_string(), translations) {
            return Err(duplicate("Text", key));
        }
        Ok(())
    }

    pub fn add_popup_text_localisation(
        &mut self,
        key: PopupType,
        translations: impl IntoIterator<Item = (Locale, PopupDetails)>,
    ) -> Result<(), RegistrationError> {
        self.check_window("Popup text localisation")?;
        if !self.localisations.popups.add(key, translations) {
            return Err(duplicate("Popup text", key.0));
        }
        Ok(())
    }

    pub fn add_start_day_warning_localisation(
        &mut self,
        key: StartDayWarning,
        translations: impl IntoIterator<Item = (Locale, GenericLocalisation)>,
    ) -> Result<(), RegistrationError> {
        self.check_window("Start day warning localisation")?;
        if !self.localisations.start_day_warnings.add(key, translations) {
            return Err(duplicate("Start day warning", key.0));
        }
        Ok(())
    }

    /// Write everything queued into `data`.
    ///
    /// Translations are merged into the first [`GlobalLocalisation`] in the
    /// catalog (skipped when there is none), then objects are registered in
    /// two phases. The queues are empty afterwards.
    pub fn build_game_data(&mut self, data: &mut GameData, rng: &mut impl Rng) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        if !self.localisations.is_empty() {
            match data.first_of_type_mut::<GlobalLocalisation>() {
                Some(global) => {
                    report.localisations = self.localisations.merge_into(&mut global.localisation);
                }
                None => log::warn!("No global localisation found, skipping localisation"),
            }
            self.localisations.clear();
        }

        let (persistent, transient): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|item| !item.transient_id);

        for item in persistent {
            register_persistent(data, item.object, &mut report);
        }
        for item in transient {
            register_transient(data, item.object, rng, &mut report);
        }

        log::info!(
            "Registered {} game data objects ({} rejected), merged {} translations",
            report.registered.len(),
            report.rejected.len(),
            report.localisations.total()
        );
        report
    }
}

fn duplicate(domain: &'static str, key: impl fmt::Display) -> RegistrationError {
    let err = RegistrationError::DuplicateLocalisationKey {
        domain,
        key: key.to_string(),
    };
    log::warn!("{}", err);
    err
}

fn register_persistent(
    data: &mut GameData,
    object: Box<dyn GameDataObject>,
    report: &mut RegistrationReport,
) {
    let (kind, name, requested_id) = (object.kind(), object.name().to_string(), object.id());
    let result = data.insert(object);
    record(report, kind, name, requested_id, result);
}

fn register_transient(
    data: &mut GameData,
    object: Box<dyn GameDataObject>,
    rng: &mut impl Rng,
    report: &mut RegistrationReport,
) {
    let (kind, name, requested_id) = (object.kind(), object.name().to_string(), object.id());
    let result = if requested_id == 0 {
        Err(IdError::Zero)
    } else if data.contains(requested_id) {
        data.insert_around(object, rng.gen())
    } else {
        data.insert(object)
    };
    record(report, kind, name, requested_id, result);
}

fn record(
    report: &mut RegistrationReport,
    kind: &'static str,
    name: String,
    requested_id: i32,
    result: Result<i32, IdError>,
) {
    match result {
        Ok(id) => {
            log::info!("Added GDO {} ({})", id, kind);
            report.registered.push(Registered {
                kind,
                name,
                requested_id,
                id,
            });
        }
        Err(error) => {
            log::error!("Failed to register {}! {}.", kind, error);
            report.rejected.push(Rejection {
                kind,
                name,
                requested_id,
                error,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dish, LayoutProfile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use speedrun_layouts_logic::localisation::LocalisationSet;

    const GUID: &str = "Test.Mod";

    fn dish(id: i32) -> Dish {
        Dish {
            id,
            name: format!("Dish {}", id),
        }
    }

    fn base_data() -> GameData {
        GameData::from_objects([
            Box::new(dish(100)) as Box<dyn GameDataObject>,
            Box::new(GlobalLocalisation {
                id: 1,
                name: "Global".into(),
                localisation: LocalisationSet::with_locales(&[Locale::English, Locale::French]),
            }),
        ])
        .unwrap()
    }

    #[test]
    fn test_outside_window_is_rejected() {
        let mut registry = DataRegistry::new(GUID);
        assert!(matches!(
            registry.add_game_data_object(dish(5)),
            Err(RegistrationError::WindowClosed { .. })
        ));
        assert!(registry
            .add_text_localisation("KEY", [(Locale::English, "x".to_string())])
            .is_err());
        assert_eq!(registry.pending_objects(), 0);
        assert!(registry.pending_localisations().is_empty());
    }

    #[test]
    fn test_window_closes_after_hook() {
        let mut registry = DataRegistry::new(GUID);
        let queued = registry.with_window(|registry| registry.add_game_data_object(dish(5)));
        assert_eq!(queued, Ok(5));
        assert!(!registry.is_window_open());
        assert!(registry.add_game_data_object(dish(6)).is_err());
    }

    #[test]
    fn test_zero_id_is_rejected() {
        let mut registry = DataRegistry::new(GUID);
        let mut data = base_data();
        registry.with_window(|registry| registry.add_game_data_object(dish(0)).unwrap());

        let report = registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(0));
        assert!(report.registered.is_empty());
        assert_eq!(report.rejected[0].error, IdError::Zero);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_persistent_collision_leaves_catalog_unchanged() {
        let mut registry = DataRegistry::new(GUID);
        let mut data = base_data();
        registry.with_window(|registry| registry.add_game_data_object(dish(100)).unwrap());

        let report = registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(0));
        assert_eq!(report.rejected[0].error, IdError::Collision(100));
        assert_eq!(data.len(), 2);
        assert_eq!(data.try_get::<Dish>(100).unwrap().name, "Dish 100");
    }

    #[test]
    fn test_persistent_ids_win_over_transient() {
        let mut registry = DataRegistry::new(GUID);
        let mut data = base_data();
        registry.with_window(|registry| {
            // Queued first, but registered after the persistent object below
            registry.add_game_data_object_transient(dish(200)).unwrap();
            registry.add_game_data_object(dish(200)).unwrap();
        });

        let report = registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(9));
        assert!(report.rejected.is_empty());
        assert_eq!(report.registered[0].id, 200);
        assert_eq!(report.registered[0].requested_id, 200);

        let moved = &report.registered[1];
        assert_eq!(moved.requested_id, 200);
        assert_ne!(moved.id, 200);
        assert_ne!(moved.id, 100);
        assert_eq!(data.try_get::<Dish>(moved.id).unwrap().id, moved.id);
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn test_transient_without_collision_keeps_id() {
        let mut registry = DataRegistry::new(GUID);
        let mut data = base_data();
        registry.with_window(|registry| registry.add_game_data_object_transient(dish(300)).unwrap());

        let report = registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(1));
        assert_eq!(report.registered[0].id, 300);
    }

    #[test]
    fn test_named_object_gets_stable_id() {
        let mut registry = DataRegistry::new(GUID);
        let mut data = base_data();
        let id = registry
            .with_window(|registry| {
                registry.add_game_data_object_named::<LayoutProfile>("Tiny", |profile| {
                    profile.name.push_str(" (custom)");
                })
            })
            .unwrap();
        assert_eq!(id, stable_id(GUID, "Tiny"));

        registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(1));
        let profile = data.try_get::<LayoutProfile>(id).unwrap();
        assert_eq!(profile.name, "Test.Mod - Tiny (custom)");
    }

    #[test]
    fn test_localisation_merge_and_duplicates() {
        let mut registry = DataRegistry::new(GUID);
        let mut data = base_data();
        registry.with_window(|registry| {
            registry
                .add_text_localisation(
                    "BUTTON",
                    [
                        (Locale::English, "Refresh".to_string()),
                        (Locale::German, "Neu laden".to_string()),
                    ],
                )
                .unwrap();
            assert!(matches!(
                registry.add_text_localisation("BUTTON", [(Locale::English, "Other".to_string())]),
                Err(RegistrationError::DuplicateLocalisationKey { .. })
            ));
            registry
                .add_popup_text_localisation(PopupType(7), [(Locale::French, PopupDetails::default())])
                .unwrap();
            registry
                .add_start_day_warning_localisation(
                    StartDayWarning(3),
                    [(Locale::English, GenericLocalisation::default())],
                )
                .unwrap();
        });

        let report = registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(1));
        assert_eq!(
            report.localisations,
            MergeCount {
                text: 1,
                popups: 1,
                start_day_warnings: 1
            }
        );
        let global = data.try_get::<GlobalLocalisation>(1).unwrap();
        let text = global.localisation.text.as_ref().unwrap();
        assert_eq!(
            text.get(Locale::English, &"BUTTON".to_string()),
            Some(&"Refresh".to_string())
        );
        assert!(registry.pending_localisations().is_empty());
    }

    #[test]
    fn test_build_drains_queue() {
        let mut registry = DataRegistry::new(GUID);
        let mut data = base_data();
        registry.with_window(|registry| registry.add_game_data_object(dish(400)).unwrap());

        registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(1));
        assert_eq!(registry.pending_objects(), 0);
        let second = registry.build_game_data(&mut data, &mut StdRng::seed_from_u64(1));
        assert!(second.registered.is_empty());
        assert_eq!(data.len(), 3);
    }
}
