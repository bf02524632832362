//! Shared controlled-vocabulary ("list of values") registry.
//!
//! A [`SharedLov`] holds named enumeration classes: sets of valid keys with
//! human-readable descriptions, shared by every host object that carries a
//! clone of the handle. Assignment helpers validate candidate values
//! against a class and then write through a target's [`AttrRegistry`], so
//! an attribute can only ever hold a registered key.
//!
//! The registry is the one piece of shared mutable state in the engine:
//! an `Arc<RwLock<_>>` serializes `register`/`clear` writers against
//! lookup and validation readers. Nothing here blocks on I/O.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::attrs::{AttrRegistry, AttrValue};
use crate::error::LovError;

/// Source of "choose one of N" decisions for [`SharedLov::random`].
///
/// The production implementation is [`ShufflePicker`]; tests substitute a
/// deterministic picker so randomized assignment becomes reproducible.
pub trait Picker: Send + Sync {
    /// Return an index in `0..n`. `n` is always at least 1.
    fn pick(&self, n: usize) -> usize;
}

/// Entropy-seeded [`Picker`] drawing uniformly via shuffle-then-take-first.
///
/// The generator is seeded once at construction and never reseeded.
pub struct ShufflePicker {
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for ShufflePicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShufflePicker").finish_non_exhaustive()
    }
}

impl Default for ShufflePicker {
    fn default() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl ShufflePicker {
    /// Create a picker seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Picker for ShufflePicker {
    fn pick(&self, n: usize) -> usize {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        indices.shuffle(&mut *rng);
        indices.first().copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct LovStore {
    classes: BTreeMap<String, BTreeMap<String, String>>,
}

/// Handle to the process-wide enumeration registry.
///
/// Cloning shares the underlying storage; independent registries (for
/// tests) are created with [`SharedLov::new`]. At the application
/// boundary a single instance is created once at startup and torn down
/// only by test fixtures.
#[derive(Clone)]
pub struct SharedLov {
    store: Arc<RwLock<LovStore>>,
    picker: Arc<dyn Picker>,
}

impl std::fmt::Debug for SharedLov {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLov")
            .field("store", &self.store)
            .field("picker", &"<dyn Picker>")
            .finish()
    }
}

impl Default for SharedLov {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedLov {
    /// Create an empty registry with the entropy-seeded [`ShufflePicker`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_picker(Arc::new(ShufflePicker::new()))
    }

    /// Create an empty registry with an explicit picker (deterministic in
    /// tests).
    #[must_use]
    pub fn with_picker(picker: Arc<dyn Picker>) -> Self {
        Self {
            store: Arc::new(RwLock::new(LovStore::default())),
            picker,
        }
    }

    /// Register (or extend) an enumeration class.
    ///
    /// The first registration of a class stores `entries` verbatim; later
    /// registrations merge by key union, with the **last registration
    /// winning** for overlapping keys. Returns the resulting entry count.
    pub fn register(&self, class: &str, entries: &[(&str, &str)]) -> usize {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let map = store.classes.entry(class.to_string()).or_default();
        for (key, desc) in entries {
            map.insert((*key).to_string(), (*desc).to_string());
        }
        map.len()
    }

    /// Delete a class entirely.
    ///
    /// Returns the entry count immediately prior to deletion, or 0 if the
    /// class was never registered. A cleared class is indistinguishable
    /// from one that never existed.
    pub fn clear(&self, class: &str) -> usize {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.classes.remove(class).map_or(0, |map| map.len())
    }

    /// Sorted list of the keys registered under `class`.
    ///
    /// # Errors
    ///
    /// Returns [`LovError::UnknownClass`] if the class has never been
    /// registered or was cleared.
    pub fn keys(&self, class: &str) -> Result<Vec<String>, LovError> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .classes
            .get(class)
            .map(|map| map.keys().cloned().collect())
            .ok_or_else(|| LovError::UnknownClass(class.to_string()))
    }

    /// Description registered for `key` under `class`.
    ///
    /// # Errors
    ///
    /// Returns [`LovError::UnknownClass`] for an unregistered class, or
    /// [`LovError::UnknownKey`] if the key is not a member.
    pub fn lookup(&self, class: &str, key: &str) -> Result<String, LovError> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let map = store
            .classes
            .get(class)
            .ok_or_else(|| LovError::UnknownClass(class.to_string()))?;
        map.get(key)
            .cloned()
            .ok_or_else(|| unknown_key(class, key, map))
    }

    /// Validate that `key` is currently a member of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`LovError::UnknownClass`] or [`LovError::UnknownKey`],
    /// the latter carrying the current member list for diagnostics.
    pub fn validate(&self, class: &str, key: &str) -> Result<(), LovError> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let map = store
            .classes
            .get(class)
            .ok_or_else(|| LovError::UnknownClass(class.to_string()))?;
        if map.contains_key(key) {
            Ok(())
        } else {
            Err(unknown_key(class, key, map))
        }
    }

    /// Draw one key of `class` uniformly at random and assign it to
    /// `attr` on `target` via a validated set. Returns the chosen key.
    ///
    /// # Errors
    ///
    /// Returns [`LovError::UnknownClass`] for an unregistered class,
    /// [`LovError::EmptyClass`] for a registered class with no members,
    /// or a wrapped [`AttrError`](crate::error::AttrError) if the target
    /// set fails (unknown or read-only attribute).
    pub fn random(
        &self,
        class: &str,
        target: &mut AttrRegistry,
        attr: &str,
    ) -> Result<String, LovError> {
        let keys = self.keys(class)?;
        if keys.is_empty() {
            return Err(LovError::EmptyClass(class.to_string()));
        }
        let index = self.picker.pick(keys.len());
        let chosen = keys
            .get(index)
            .or_else(|| keys.first())
            .ok_or_else(|| LovError::EmptyClass(class.to_string()))?
            .clone();
        self.validate(class, &chosen)?;
        target.set(attr, AttrValue::Str(chosen.clone()), None)?;
        Ok(chosen)
    }

    /// Assign `key` to `attr` on `target` only if the attribute currently
    /// has no value. Returns the attribute's value afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LovError::UnknownKey`] if `key` is not a member of
    /// `class` (checked before the target is touched), or a wrapped
    /// attribute error from the target registry.
    pub fn conditional_default(
        &self,
        class: &str,
        target: &mut AttrRegistry,
        attr: &str,
        key: &str,
    ) -> Result<AttrValue, LovError> {
        self.validate(class, key)?;
        match target.get(attr)? {
            Some(current) => Ok(current),
            None => Ok(target.set(attr, AttrValue::Str(key.to_string()), None)?),
        }
    }

    /// Assign `key` to `attr` on `target` unconditionally, after
    /// membership validation. Returns the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`LovError::UnknownKey`] if `key` is not a member of
    /// `class`, or a wrapped attribute error from the target registry.
    pub fn force_set(
        &self,
        class: &str,
        target: &mut AttrRegistry,
        attr: &str,
        key: &str,
    ) -> Result<AttrValue, LovError> {
        self.validate(class, key)?;
        Ok(target.set(attr, AttrValue::Str(key.to_string()), None)?)
    }
}

fn unknown_key(class: &str, key: &str, map: &BTreeMap<String, String>) -> LovError {
    LovError::UnknownKey {
        value: key.to_string(),
        class: class.to_string(),
        members: map.keys().cloned().collect::<Vec<_>>().join(", "),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::attrs::AttrKind;
    use crate::logging::RecordingLog;
    use std::collections::HashSet;

    /// Deterministic picker that always selects a fixed index.
    struct FixedPicker(usize);

    impl Picker for FixedPicker {
        fn pick(&self, n: usize) -> usize {
            self.0.min(n.saturating_sub(1))
        }
    }

    fn target() -> AttrRegistry {
        let mut reg = AttrRegistry::new("Batch", Arc::new(RecordingLog::new()));
        reg.define("state", AttrKind::Any, None, None).unwrap();
        reg
    }

    #[test]
    fn register_keys_and_lookup() {
        let lov = SharedLov::new();
        let count = lov.register("color", &[("red", "desc r"), ("blue", "desc b")]);
        assert_eq!(count, 2);
        assert_eq!(lov.keys("color").unwrap(), vec!["blue", "red"]);
        assert_eq!(lov.lookup("color", "red").unwrap(), "desc r");
        assert!(matches!(
            lov.lookup("color", "missing"),
            Err(LovError::UnknownKey { .. })
        ));
    }

    #[test]
    fn register_merges_by_key_union() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "desc r"), ("blue", "desc b")]);
        let count = lov.register("color", &[("red", "r2"), ("green", "desc g")]);
        assert_eq!(count, 3);
        assert_eq!(lov.keys("color").unwrap(), vec!["blue", "green", "red"]);
    }

    #[test]
    fn merge_conflict_last_registration_wins() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "first")]);
        lov.register("color", &[("red", "second")]);
        assert_eq!(lov.lookup("color", "red").unwrap(), "second");
    }

    #[test]
    fn clear_returns_prior_count_and_forgets_class() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "r"), ("blue", "b"), ("green", "g")]);
        assert_eq!(lov.clear("color"), 3);
        assert!(matches!(
            lov.keys("color"),
            Err(LovError::UnknownClass(_))
        ));
        assert_eq!(lov.clear("color"), 0);
        assert_eq!(lov.clear("never"), 0);
    }

    #[test]
    fn unknown_key_reports_member_list() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "r"), ("blue", "b")]);
        let err = lov.validate("color", "purple").unwrap_err();
        assert!(err.to_string().contains("blue, red"));
    }

    #[test]
    fn clones_share_storage() {
        let lov = SharedLov::new();
        let other = lov.clone();
        other.register("os", &[("linux", "Linux")]);
        assert_eq!(lov.keys("os").unwrap(), vec!["linux"]);
    }

    #[test]
    fn random_with_fixed_picker_is_deterministic() {
        let lov = SharedLov::with_picker(Arc::new(FixedPicker(1)));
        lov.register("color", &[("blue", "b"), ("green", "g"), ("red", "r")]);
        let mut reg = target();
        let chosen = lov.random("color", &mut reg, "state").unwrap();
        assert_eq!(chosen, "green");
        assert_eq!(
            reg.get("state").unwrap(),
            Some(AttrValue::from("green"))
        );
    }

    #[test]
    fn random_always_returns_a_member() {
        let lov = SharedLov::new();
        lov.register("suit", &[("club", ""), ("diamond", ""), ("heart", ""), ("spade", "")]);
        let keys: HashSet<String> = lov.keys("suit").unwrap().into_iter().collect();
        let mut seen = HashSet::new();
        let mut reg = target();
        for _ in 0..1000 {
            let chosen = lov.random("suit", &mut reg, "state").unwrap();
            assert!(keys.contains(&chosen));
            seen.insert(chosen);
        }
        // Statistical: with 4 keys and 1000 uniform draws, missing one is
        // astronomically unlikely.
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn random_on_unknown_class_fails() {
        let lov = SharedLov::new();
        let mut reg = target();
        assert!(matches!(
            lov.random("nope", &mut reg, "state"),
            Err(LovError::UnknownClass(_))
        ));
    }

    #[test]
    fn random_on_empty_class_reports_no_members() {
        let lov = SharedLov::new();
        assert_eq!(lov.register("bare", &[]), 0);
        // The class exists; it just has nothing to draw from.
        assert_eq!(lov.keys("bare").unwrap(), Vec::<String>::new());
        let mut reg = target();
        assert!(matches!(
            lov.random("bare", &mut reg, "state"),
            Err(LovError::EmptyClass(_))
        ));
        assert_eq!(reg.get("state").unwrap(), None);
    }

    #[test]
    fn conditional_default_only_fills_unset() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "r"), ("blue", "b")]);
        let mut reg = target();
        let first = lov
            .conditional_default("color", &mut reg, "state", "blue")
            .unwrap();
        assert_eq!(first, AttrValue::from("blue"));
        let second = lov
            .conditional_default("color", &mut reg, "state", "red")
            .unwrap();
        assert_eq!(second, AttrValue::from("blue"));
        assert_eq!(reg.get("state").unwrap(), Some(AttrValue::from("blue")));
    }

    #[test]
    fn conditional_default_rejects_non_member_before_touching_target() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "r")]);
        let mut reg = target();
        assert!(matches!(
            lov.conditional_default("color", &mut reg, "state", "purple"),
            Err(LovError::UnknownKey { .. })
        ));
        assert_eq!(reg.get("state").unwrap(), None);
    }

    #[test]
    fn force_set_overwrites_existing_value() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "r"), ("blue", "b")]);
        let mut reg = target();
        lov.force_set("color", &mut reg, "state", "blue").unwrap();
        lov.force_set("color", &mut reg, "state", "red").unwrap();
        assert_eq!(reg.get("state").unwrap(), Some(AttrValue::from("red")));
    }

    #[test]
    fn helpers_propagate_attr_errors() {
        let lov = SharedLov::new();
        lov.register("color", &[("red", "r")]);
        let mut reg = target();
        reg.ro(&["state"]).unwrap();
        assert!(matches!(
            lov.force_set("color", &mut reg, "state", "red"),
            Err(LovError::Attr(_))
        ));
        let mut bare = AttrRegistry::new("Batch", Arc::new(RecordingLog::new()));
        assert!(matches!(
            lov.force_set("color", &mut bare, "missing", "red"),
            Err(LovError::Attr(_))
        ));
    }

    #[test]
    fn shuffle_picker_stays_in_range() {
        let picker = ShufflePicker::new();
        for n in 1..=8 {
            for _ in 0..50 {
                assert!(picker.pick(n) < n);
            }
        }
    }
}
