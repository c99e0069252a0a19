//! The definition aggregate: the flat table, layered value resolution, and
//! usage tracking.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::defaults::DefaultTable;
use crate::error::Error;
use crate::key;

/// A parsed simulation definition: a flat map of dotted keys to string
/// values, plus the default table consulted when a key is missing.
///
/// Values are opaque strings; interpretation is the caller's business. The
/// struct tracks which keys have been read and which defaults were consumed,
/// so a driver can report likely typos after a run (see [`crate::report`]).
///
/// Not thread-safe: the usage trackers use interior mutability so that
/// [`get_value`](Definition::get_value) works on a shared reference.
#[derive(Debug)]
pub struct Definition {
    pub(super) table: BTreeMap<String, String>,
    pub(super) defaults: Arc<DefaultTable>,
    pub(super) file_name: String,
    pub(super) sampling: bool,
    pub(super) rng: StdRng,
    unaccessed: RefCell<BTreeSet<String>>,
    defaults_used: RefCell<BTreeSet<String>>,
}

impl Definition {
    pub(super) fn from_parts(
        table: BTreeMap<String, String>,
        defaults: Arc<DefaultTable>,
        file_name: String,
        sampling: bool,
    ) -> Self {
        let unaccessed = table.keys().cloned().collect();
        Self {
            table,
            defaults,
            file_name,
            sampling,
            rng: StdRng::seed_from_u64(0),
            unaccessed: RefCell::new(unaccessed),
            defaults_used: RefCell::new(BTreeSet::new()),
        }
    }

    pub(super) fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub(crate) fn into_table(self) -> BTreeMap<String, String> {
        self.table
    }

    /// Untracked lookup in the instance table.
    pub(crate) fn peek(&self, key: &str) -> Option<&str> {
        self.table.get(key).map(String::as_str)
    }

    pub(crate) fn default_table(&self) -> &DefaultTable {
        &self.defaults
    }

    /// Resolves a key to its value.
    ///
    /// Resolution order: the instance table, then the exact key in the
    /// default table, then a class-based default. Class-based resolution
    /// walks the key's ancestors from most to least specific, looking for an
    /// `<ancestor>.class` entry; the first one found decides the outcome by
    /// substituting its value for the ancestor prefix and looking that key up
    /// in the default table.
    ///
    /// ```text
    /// key:       Rocket.Sustainer.Canards.TrailingEdge.shape
    /// instance:  Rocket.Sustainer.Canards.class = FinSet
    /// lookup:    FinSet.TrailingEdge.shape      (in the default table)
    /// ```
    pub fn get_value(&self, key: &str) -> Result<&str, Error> {
        let key = key.trim();

        if let Some(value) = self.table.get(key) {
            self.unaccessed.borrow_mut().remove(key);
            return Ok(value);
        }

        if let Some(value) = self.defaults.get(key) {
            self.defaults_used.borrow_mut().insert(key.to_string());
            return Ok(value);
        }

        if let Some(value) = self.class_based_default(key) {
            return Ok(value);
        }

        Err(Error::KeyNotFound {
            file: self.file_name.clone(),
            key: key.to_string(),
        })
    }

    fn class_based_default(&self, key: &str) -> Option<&str> {
        let mut split_level = key::level(key);

        while split_level >= 0 {
            let (prefix, suffix) = key::split_at_level(key, split_level);
            let class_key = format!("{prefix}.class");

            if let Some(class_name) = self.table.get(&class_key) {
                // The first .class hit ends the search, found or not.
                let default_key = format!("{class_name}.{suffix}");
                let value = self.defaults.get(&default_key)?;
                self.defaults_used.borrow_mut().insert(default_key);
                self.unaccessed.borrow_mut().remove(&class_key);
                return Some(value);
            }

            split_level -= 1;
        }

        None
    }

    /// Inserts or overwrites a key unconditionally.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        self.table.insert(key.trim().to_string(), value.into());
    }

    /// Inserts only if the key is not already present.
    pub fn set_if_absent(&mut self, key: &str, value: impl Into<String>) {
        let key = key.trim();
        if !self.table.contains_key(key) {
            self.table.insert(key.to_string(), value.into());
        }
    }

    /// Deletes a key, returning its value. A missing key is not an error;
    /// it logs a warning and returns `None`.
    pub fn remove_key(&mut self, key: &str) -> Option<String> {
        match self.table.remove(key) {
            Some(value) => {
                self.unaccessed.borrow_mut().remove(key);
                Some(value)
            }
            None => {
                warn!(key, file = %self.file_name, "key not found, nothing to remove");
                None
            }
        }
    }

    /// Returns all keys that contain every one of the given substrings.
    pub fn find_keys_containing<S: AsRef<str>>(&self, substrings: &[S]) -> Vec<String> {
        self.table
            .keys()
            .filter(|key| substrings.iter().all(|s| key.contains(s.as_ref())))
            .cloned()
            .collect()
    }

    /// Returns every key below `key`, at any depth. The empty key returns
    /// all keys.
    pub fn sub_keys(&self, key: &str) -> Vec<String> {
        let key = key.trim();
        if key.is_empty() {
            return self.table.keys().cloned().collect();
        }
        // '/' is the successor of '.' in byte order, so this range covers
        // exactly the keys starting with `key.`.
        let start = format!("{key}.");
        let end = format!("{key}/");
        self.table.range(start..end).map(|(k, _)| k.clone()).collect()
    }

    /// Returns the keys exactly one level below `key` that hold values
    /// (sub-dictionary names are excluded; see
    /// [`immediate_sub_dicts`](Definition::immediate_sub_dicts)).
    pub fn immediate_sub_keys(&self, key: &str) -> Vec<String> {
        let key = key.trim();
        let mut results = BTreeSet::new();
        for child in self.sub_keys(key) {
            if let Some(immediate) = key::immediate_sub_key(key, &child) {
                if self.table.contains_key(immediate) {
                    results.insert(immediate.to_string());
                }
            }
        }
        results.into_iter().collect()
    }

    /// Returns the names of the sub-dictionaries exactly one level below
    /// `key`.
    pub fn immediate_sub_dicts(&self, key: &str) -> Vec<String> {
        let key = key.trim();
        let parent_level = key::level(key);
        let mut dicts = BTreeSet::new();
        for child in self.sub_keys(key) {
            // A value key sits one level down; anything deeper means the
            // segment one level down names a dictionary.
            if key::level(&child) - parent_level > 1 {
                dicts.insert(key::parent_at_level(&child, parent_level + 1).to_string());
            }
        }
        dicts.into_iter().collect()
    }

    /// Instance keys that have never been read, sorted.
    pub fn unused_keys(&self) -> Vec<String> {
        self.unaccessed.borrow().iter().cloned().collect()
    }

    /// Default-table keys consumed by lookups so far, sorted.
    pub fn used_defaults(&self) -> Vec<String> {
        self.defaults_used.borrow().iter().cloned().collect()
    }

    /// Whether the key was parsed into this definition. Ignores defaults and
    /// does not affect usage tracking.
    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key.trim())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The path this definition was parsed from, or `<in-memory>`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.file_name)?;
        for (key, value) in &self.table {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

/// Compares the instance tables only; file names, defaults, and tracker
/// state are ignored.
impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultTable;
    use std::collections::BTreeMap;

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn definition(entries: &[(&str, &str)], defaults: &[(&str, &str)]) -> Definition {
        Definition::builder()
            .with_defaults(defaults.iter().copied().collect::<DefaultTable>())
            .with_sampling(false)
            .from_table(table(entries))
            .unwrap()
    }

    #[test]
    fn test_get_value_instance_first() {
        let def = definition(&[("Rocket.name", "Falcon")], &[("Rocket.name", "Rocket")]);
        assert_eq!(def.get_value("Rocket.name").unwrap(), "Falcon");
        assert_eq!(def.get_value(" Rocket.name ").unwrap(), "Falcon");
        assert!(def.used_defaults().is_empty());
    }

    #[test]
    fn test_get_value_falls_back_to_defaults() {
        let def = definition(&[], &[("SimControl.timeStep", "0.01")]);
        assert_eq!(def.get_value("SimControl.timeStep").unwrap(), "0.01");
        assert_eq!(def.used_defaults(), vec!["SimControl.timeStep"]);
    }

    #[test]
    fn test_class_based_default() {
        let def = definition(
            &[("Rocket.Fin1.class", "FinSet")],
            &[("FinSet.shape", "tapered")],
        );
        assert_eq!(def.get_value("Rocket.Fin1.shape").unwrap(), "tapered");
        assert_eq!(def.used_defaults(), vec!["FinSet.shape"]);
        // The .class key that made the lookup work counts as accessed.
        assert!(def.unused_keys().is_empty());
    }

    #[test]
    fn test_class_based_default_uses_most_specific_class() {
        let def = definition(
            &[
                ("Rocket.class", "Craft"),
                ("Rocket.Fin1.class", "FinSet"),
            ],
            &[("FinSet.shape", "tapered"), ("Craft.Fin1.shape", "wrong")],
        );
        assert_eq!(def.get_value("Rocket.Fin1.shape").unwrap(), "tapered");
    }

    #[test]
    fn test_class_hit_without_default_stops_the_search() {
        // Rocket.Fin1.class resolves, but FinSet.mass is not a default; the
        // shallower Rocket.class must not be consulted.
        let def = definition(
            &[
                ("Rocket.class", "Craft"),
                ("Rocket.Fin1.class", "FinSet"),
            ],
            &[("Craft.Fin1.mass", "5")],
        );
        let err = def.get_value("Rocket.Fin1.mass").unwrap_err();
        assert!(
            matches!(err, Error::KeyNotFound { ref key, .. } if key == "Rocket.Fin1.mass"),
            "{err}"
        );
    }

    #[test]
    fn test_key_not_found() {
        let def = definition(&[("Rocket.Fin1.class", "FinSet")], &[("FinSet.shape", "tapered")]);
        assert!(matches!(
            def.get_value("Rocket.Fin1.mass"),
            Err(Error::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_mutation() {
        let mut def = definition(&[("a", "1")], &[]);
        def.set_value("b", "2");
        def.set_value("a", "overwritten");
        def.set_if_absent("a", "ignored");
        def.set_if_absent("c", "3");
        assert_eq!(def.get_value("a").unwrap(), "overwritten");
        assert_eq!(def.get_value("b").unwrap(), "2");
        assert_eq!(def.get_value("c").unwrap(), "3");

        assert_eq!(def.remove_key("b"), Some("2".to_string()));
        assert_eq!(def.remove_key("b"), None);
        assert_eq!(def.len(), 2);
    }

    #[test]
    fn test_usage_tracking() {
        let def = definition(&[("a.x", "1"), ("a.y", "2")], &[("d.z", "3")]);
        assert_eq!(def.unused_keys(), vec!["a.x", "a.y"]);

        def.get_value("a.x").unwrap();
        def.get_value("d.z").unwrap();
        assert_eq!(def.unused_keys(), vec!["a.y"]);
        assert_eq!(def.used_defaults(), vec!["d.z"]);
    }

    #[test]
    fn test_removed_keys_leave_unused_list() {
        let mut def = definition(&[("a.x", "1")], &[]);
        def.remove_key("a.x");
        assert!(def.unused_keys().is_empty());
    }

    #[test]
    fn test_find_keys_containing() {
        let def = definition(
            &[
                ("Rocket.class", "Rocket"),
                ("Rocket.Fin1.class", "FinSet"),
                ("Rocket.Fin1.mass", "1"),
            ],
            &[],
        );
        assert_eq!(
            def.find_keys_containing(&["class"]),
            vec!["Rocket.Fin1.class", "Rocket.class"]
        );
        assert_eq!(
            def.find_keys_containing(&["Fin1", "class"]),
            vec!["Rocket.Fin1.class"]
        );
        assert!(def.find_keys_containing(&["nope"]).is_empty());
    }

    #[test]
    fn test_sub_key_introspection() {
        let def = definition(
            &[
                ("Rocket.StageOne.mass", "1"),
                ("Rocket.StageTwo.mass", "2"),
                ("Rocket.name", "R"),
                ("RocketScience.x", "y"),
            ],
            &[],
        );

        assert_eq!(
            def.sub_keys("Rocket"),
            vec!["Rocket.StageOne.mass", "Rocket.StageTwo.mass", "Rocket.name"]
        );
        assert_eq!(def.immediate_sub_keys("Rocket"), vec!["Rocket.name"]);
        assert_eq!(
            def.immediate_sub_dicts("Rocket"),
            vec!["Rocket.StageOne", "Rocket.StageTwo"]
        );
        assert_eq!(def.sub_keys("").len(), 4);
    }

    #[test]
    fn test_display_and_eq() {
        let a = definition(&[("k", "v")], &[]);
        let b = definition(&[("k", "v")], &[("unrelated", "default")]);
        let c = definition(&[("k", "other")], &[]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "File: <in-memory>\nk: v\n");
    }
}
