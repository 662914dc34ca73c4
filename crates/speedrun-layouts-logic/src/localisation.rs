//! Localisation tables and the merge of pending per-locale text into them.
//!
//! A [`LocalisationTable`] is the catalog side: for every known locale it may
//! or may not carry a text bucket. A [`LocalisationOverlay`] is the pending
//! side: per key, the translations a caller supplied. Merging never
//! overwrites a translation that is already present and never falls back to
//! another locale when one is missing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Game locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Locale {
    English,
    French,
    German,
    Spanish,
    Polish,
    Russian,
    PortugueseBrazil,
    Japanese,
    ChineseSimplified,
    ChineseTraditional,
    Korean,
    Turkish,
}

impl Locale {
    pub const ALL: [Locale; 12] = [
        Locale::English,
        Locale::French,
        Locale::German,
        Locale::Spanish,
        Locale::Polish,
        Locale::Russian,
        Locale::PortugueseBrazil,
        Locale::Japanese,
        Locale::ChineseSimplified,
        Locale::ChineseTraditional,
        Locale::Korean,
        Locale::Turkish,
    ];
}

/// Key of a popup text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PopupType(pub i32);

/// Key of a day-start warning entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StartDayWarning(pub i32);

/// Title and body shown in a popup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopupDetails {
    pub title: String,
    pub text: String,
}

/// Title and description pair used by warnings and similar short texts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenericLocalisation {
    pub title: String,
    pub description: String,
}

/// Per-locale text buckets of one localisation domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalisationTable<K: Ord, V> {
    locales: BTreeMap<Locale, Option<BTreeMap<K, V>>>,
}

impl<K: Ord, V> Default for LocalisationTable<K, V> {
    fn default() -> Self {
        Self {
            locales: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> LocalisationTable<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with an empty text bucket for each given locale.
    pub fn with_locales(locales: impl IntoIterator<Item = Locale>) -> Self {
        let mut table = Self::new();
        for locale in locales {
            table.add_locale(locale);
        }
        table
    }

    /// Make `locale` known with an empty text bucket. Existing buckets are kept.
    pub fn add_locale(&mut self, locale: Locale) {
        let bucket = self.locales.entry(locale).or_insert(None);
        if bucket.is_none() {
            *bucket = Some(BTreeMap::new());
        }
    }

    /// Make `locale` known without a text bucket.
    pub fn add_locale_without_text(&mut self, locale: Locale) {
        self.locales.entry(locale).or_insert(None);
    }

    pub fn locales(&self) -> impl Iterator<Item = Locale> + '_ {
        self.locales.keys().copied()
    }

    pub fn text(&self, locale: Locale) -> Option<&BTreeMap<K, V>> {
        self.locales.get(&locale).and_then(|bucket| bucket.as_ref())
    }

    pub fn text_mut(&mut self, locale: Locale) -> Option<&mut BTreeMap<K, V>> {
        self.locales.get_mut(&locale).and_then(|bucket| bucket.as_mut())
    }

    pub fn get(&self, locale: Locale, key: &K) -> Option<&V> {
        self.text(locale).and_then(|text| text.get(key))
    }

    /// Insert a translation, replacing any previous one.
    ///
    /// Returns false when the locale has no text bucket.
    pub fn insert(&mut self, locale: Locale, key: K, value: V) -> bool {
        match self.text_mut(locale) {
            Some(text) => {
                text.insert(key, value);
                true
            }
            None => false,
        }
    }
}

/// Pending translations for one localisation domain, keyed by entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalisationOverlay<K: Ord, V> {
    entries: BTreeMap<K, BTreeMap<Locale, V>>,
}

impl<K: Ord, V> Default for LocalisationOverlay<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> LocalisationOverlay<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue translations for `key`. The first registration of a key wins;
    /// later ones return false and are dropped.
    pub fn add(&mut self, key: K, translations: impl IntoIterator<Item = (Locale, V)>) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, translations.into_iter().collect());
        true
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy pending translations into `table`.
    ///
    /// For each key and each locale known to the table, the translation is
    /// written only if the locale has a text bucket, the key is not already
    /// present there, and a translation for exactly that locale was supplied.
    /// Returns how many translations were written.
    pub fn merge_into(&self, table: &mut LocalisationTable<K, V>) -> usize {
        let mut merged = 0;
        for (key, translations) in &self.entries {
            for (locale, bucket) in table.locales.iter_mut() {
                let Some(text) = bucket.as_mut() else {
                    continue;
                };
                if text.contains_key(key) {
                    continue;
                }
                let Some(value) = translations.get(locale) else {
                    continue;
                };
                text.insert(key.clone(), value.clone());
                merged += 1;
            }
        }
        merged
    }
}

/// The three localisation domains of the global localisation catalog.
///
/// A domain may be missing entirely, in which case nothing is merged into it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalisationSet {
    pub text: Option<LocalisationTable<String, String>>,
    pub popups: Option<LocalisationTable<PopupType, PopupDetails>>,
    pub start_day_warnings: Option<LocalisationTable<StartDayWarning, GenericLocalisation>>,
}

impl LocalisationSet {
    /// All three domains present with empty buckets for `locales`.
    pub fn with_locales(locales: &[Locale]) -> Self {
        Self {
            text: Some(LocalisationTable::with_locales(locales.iter().copied())),
            popups: Some(LocalisationTable::with_locales(locales.iter().copied())),
            start_day_warnings: Some(LocalisationTable::with_locales(locales.iter().copied())),
        }
    }
}

/// Counts of translations written per domain by one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeCount {
    pub text: usize,
    pub popups: usize,
    pub start_day_warnings: usize,
}

impl MergeCount {
    pub fn total(&self) -> usize {
        self.text + self.popups + self.start_day_warnings
    }
}

/// Pending translations for all three domains.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalisationMerger {
    pub text: LocalisationOverlay<String, String>,
    pub popups: LocalisationOverlay<PopupType, PopupDetails>,
    pub start_day_warnings: LocalisationOverlay<StartDayWarning, GenericLocalisation>,
}

impl LocalisationMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.popups.is_empty() && self.start_day_warnings.is_empty()
    }

    /// Merge every domain into its counterpart in `target`, skipping absent domains.
    pub fn merge_into(&self, target: &mut LocalisationSet) -> MergeCount {
        MergeCount {
            text: target
                .text
                .as_mut()
                .map_or(0, |table| self.text.merge_into(table)),
            popups: target
                .popups
                .as_mut()
                .map_or(0, |table| self.popups.merge_into(table)),
            start_day_warnings: target
                .start_day_warnings
                .as_mut()
                .map_or(0, |table| self.start_day_warnings.merge_into(table)),
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.popups.clear();
        self.start_day_warnings.clear();
    }
}
