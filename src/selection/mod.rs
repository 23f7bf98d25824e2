use serde_json::{Map, Value};
use thiserror::Error;

use crate::overlay::{Category, Selection};
use crate::settings::{SettingsError, SettingsStore, UserId};

/// Settings key holding the serialized category -> package document.
pub const THEME_OVERLAY_PACKAGES_KEY: &str = "theme_customization_overlay_packages";

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("failed to parse theme overlay selection document")]
    Parse(#[source] serde_json::Error),
    #[error("theme overlay selection document is not an object")]
    NotAnObject,
    #[error("failed to serialize theme overlay selection document")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl SelectionError {
    /// Whether the stored document itself is unusable, as opposed to the
    /// store being unreachable.
    pub fn is_corrupt_document(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::NotAnObject)
    }
}

pub type SelectionResult<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The stored document didn't parse; it was left untouched.
    SkippedCorrupt,
}

/// Flat JSON object mapping category keys to package names.
///
/// Entries this crate doesn't know about, including non-string values, are
/// carried through unchanged so a write for one category never drops another.
/// Key order is kept as stored; new categories are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionDocument {
    entries: Map<String, Value>,
}

impl SelectionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A missing or empty value is an empty document.
    pub fn parse(raw: Option<&str>) -> SelectionResult<Self> {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Ok(Self::new());
        };
        match serde_json::from_str::<Value>(raw).map_err(SelectionError::Parse)? {
            Value::Object(entries) => Ok(Self { entries }),
            _ => Err(SelectionError::NotAnObject),
        }
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.entries.get(category).and_then(Value::as_str)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }

    pub fn set(&mut self, category: &str, package: &str) {
        self.entries
            .insert(category.to_string(), Value::String(package.to_string()));
    }

    pub fn remove(&mut self, category: &str) -> bool {
        self.entries.shift_remove(category).is_some()
    }

    pub fn apply(&mut self, category: Category, selection: &Selection) {
        match selection {
            Selection::Default => {
                self.remove(category.key());
            }
            Selection::Overlay(package) => self.set(category.key(), package),
        }
    }

    /// String-valued entries in document order.
    pub fn selections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|package| (key.as_str(), package)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_string(&self) -> SelectionResult<String> {
        serde_json::to_string(&self.entries).map_err(SelectionError::Serialize)
    }
}

pub fn read_selection(store: &dyn SettingsStore, user: UserId) -> SelectionResult<SelectionDocument> {
    let raw = store.get_string(THEME_OVERLAY_PACKAGES_KEY, user)?;
    SelectionDocument::parse(raw.as_deref())
}

/// Read-modify-write of a single category entry.
///
/// There is no compare-and-swap: a concurrent writer that lands between the
/// read and the write loses its update. A corrupt stored document is logged
/// and left in place.
pub fn write_selection(
    store: &dyn SettingsStore,
    user: UserId,
    category: Category,
    selection: &Selection,
) -> SelectionResult<WriteOutcome> {
    let mut document = match read_selection(store, user) {
        Ok(document) => document,
        Err(err) if err.is_corrupt_document() => {
            tracing::error!(%category, %user, %err, "skipping write to corrupt selection document");
            return Ok(WriteOutcome::SkippedCorrupt);
        }
        Err(err) => return Err(err),
    };

    document.apply(category, selection);
    store.put_string(THEME_OVERLAY_PACKAGES_KEY, &document.to_json_string()?, user)?;
    tracing::debug!(%category, %user, package = ?selection.package(), "selection document updated");
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MemorySettings, SettingsResult};
    use std::sync::Mutex;

    const RED: &str = "com.ex.red";
    const SERIF: &str = "com.ex.serif";

    fn stored(store: &MemorySettings) -> Option<String> {
        store
            .get_string(THEME_OVERLAY_PACKAGES_KEY, UserId::SYSTEM)
            .unwrap()
    }

    fn seeded(raw: &str) -> MemorySettings {
        let store = MemorySettings::new();
        store
            .put_string(THEME_OVERLAY_PACKAGES_KEY, raw, UserId::SYSTEM)
            .unwrap();
        store
    }

    #[test]
    fn write_to_empty_store_creates_document() {
        let store = MemorySettings::new();
        let outcome = write_selection(
            &store,
            UserId::SYSTEM,
            Category::Accent,
            &Selection::Overlay(RED.to_string()),
        )
        .unwrap();

        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(
            stored(&store).as_deref(),
            Some(r#"{"android.theme.customization.accent_color":"com.ex.red"}"#)
        );
    }

    #[test]
    fn empty_stored_string_is_treated_as_empty_document() {
        let store = seeded("");
        write_selection(
            &store,
            UserId::SYSTEM,
            Category::Font,
            &Selection::Overlay(SERIF.to_string()),
        )
        .unwrap();

        let document = read_selection(&store, UserId::SYSTEM).unwrap();
        assert_eq!(document.len(), 1);
        assert_eq!(document.get(Category::Font.key()), Some(SERIF));
    }

    #[test]
    fn clearing_a_category_removes_only_its_key() {
        let store = seeded(
            r#"{"android.theme.customization.font":"com.ex.serif","android.theme.customization.accent_color":"com.ex.red"}"#,
        );
        write_selection(&store, UserId::SYSTEM, Category::Accent, &Selection::Default).unwrap();

        assert_eq!(
            stored(&store).as_deref(),
            Some(r#"{"android.theme.customization.font":"com.ex.serif"}"#)
        );
    }

    #[test]
    fn writes_keep_stored_key_order() {
        let store = seeded(
            r#"{"android.theme.customization.theme_style":"com.ex.dark","android.theme.customization.font":"com.ex.serif","android.theme.customization.accent_color":"com.ex.red"}"#,
        );
        write_selection(&store, UserId::SYSTEM, Category::Font, &Selection::Default).unwrap();
        write_selection(
            &store,
            UserId::SYSTEM,
            Category::Navbar,
            &Selection::Overlay("com.ex.pill".to_string()),
        )
        .unwrap();

        assert_eq!(
            stored(&store).as_deref(),
            Some(
                r#"{"android.theme.customization.theme_style":"com.ex.dark","android.theme.customization.accent_color":"com.ex.red","android.theme.customization.navbar":"com.ex.pill"}"#
            )
        );
    }

    #[test]
    fn clearing_an_absent_category_still_writes_document() {
        let store = seeded(r#"{"android.theme.customization.font":"com.ex.serif"}"#);
        let outcome =
            write_selection(&store, UserId::SYSTEM, Category::Navbar, &Selection::Default)
                .unwrap();

        assert_eq!(outcome, WriteOutcome::Written);
        let document = read_selection(&store, UserId::SYSTEM).unwrap();
        assert!(!document.contains(Category::Navbar.key()));
        assert_eq!(document.get(Category::Font.key()), Some(SERIF));
    }

    #[test]
    fn unrelated_entries_survive_updates() {
        let store = seeded(
            r#"{"android.theme.customization.font":"com.ex.serif","_applied_timestamp":1700000000,"android.theme.customization.color_source":"home_wallpaper"}"#,
        );
        write_selection(
            &store,
            UserId::SYSTEM,
            Category::Accent,
            &Selection::Overlay(RED.to_string()),
        )
        .unwrap();

        let raw = stored(&store).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["_applied_timestamp"], Value::from(1_700_000_000));
        assert_eq!(
            value["android.theme.customization.color_source"],
            Value::from("home_wallpaper")
        );
        assert_eq!(value[Category::Font.key()], Value::from(SERIF));
        assert_eq!(value[Category::Accent.key()], Value::from(RED));
    }

    #[test]
    fn corrupt_document_is_left_untouched() {
        let store = seeded("{not json");
        let outcome = write_selection(
            &store,
            UserId::SYSTEM,
            Category::Accent,
            &Selection::Overlay(RED.to_string()),
        )
        .unwrap();

        assert_eq!(outcome, WriteOutcome::SkippedCorrupt);
        assert_eq!(stored(&store).as_deref(), Some("{not json"));
    }

    #[test]
    fn non_object_document_counts_as_corrupt() {
        let store = seeded(r#"["android.theme.customization.font"]"#);
        let outcome =
            write_selection(&store, UserId::SYSTEM, Category::Font, &Selection::Default).unwrap();

        assert_eq!(outcome, WriteOutcome::SkippedCorrupt);
        assert_eq!(
            stored(&store).as_deref(),
            Some(r#"["android.theme.customization.font"]"#)
        );
        assert!(matches!(
            read_selection(&store, UserId::SYSTEM),
            Err(SelectionError::NotAnObject)
        ));
    }

    #[test]
    fn unchanged_document_round_trips_by_mapping() {
        let raw = r#"{ "android.theme.customization.font" : "com.ex.serif",
                       "android.theme.customization.navbar": "com.ex.pill" }"#;
        let document = SelectionDocument::parse(Some(raw)).unwrap();
        let reparsed = SelectionDocument::parse(Some(&document.to_json_string().unwrap())).unwrap();

        assert_eq!(reparsed, document);
        assert_eq!(
            reparsed.selections().collect::<Vec<_>>(),
            vec![
                ("android.theme.customization.font", "com.ex.serif"),
                ("android.theme.customization.navbar", "com.ex.pill"),
            ]
        );
    }

    #[test]
    fn writes_are_scoped_to_user() {
        let store = MemorySettings::new();
        write_selection(
            &store,
            UserId(10),
            Category::Accent,
            &Selection::Overlay(RED.to_string()),
        )
        .unwrap();

        assert!(read_selection(&store, UserId::SYSTEM).unwrap().is_empty());
        assert_eq!(
            read_selection(&store, UserId(10))
                .unwrap()
                .get(Category::Accent.key()),
            Some(RED)
        );
    }

    /// Store that lets another writer land between a read and the following
    /// write of the same key, once.
    struct InterleavingStore {
        inner: MemorySettings,
        interleaved: Mutex<Option<String>>,
    }

    impl SettingsStore for InterleavingStore {
        fn get_string(&self, key: &str, user: UserId) -> SettingsResult<Option<String>> {
            let value = self.inner.get_string(key, user)?;
            if let Some(raw) = self.interleaved.lock().unwrap().take() {
                self.inner.put_string(key, &raw, user)?;
            }
            Ok(value)
        }

        fn put_string(&self, key: &str, value: &str, user: UserId) -> SettingsResult<()> {
            self.inner.put_string(key, value, user)
        }
    }

    #[test]
    fn concurrent_writer_between_read_and_write_loses_its_update() {
        let store = InterleavingStore {
            inner: MemorySettings::new(),
            interleaved: Mutex::new(Some(
                r#"{"android.theme.customization.font":"com.ex.serif"}"#.to_string(),
            )),
        };

        write_selection(
            &store,
            UserId::SYSTEM,
            Category::Accent,
            &Selection::Overlay(RED.to_string()),
        )
        .unwrap();

        // Last writer wins: the font entry written mid-cycle is gone.
        let document = read_selection(&store, UserId::SYSTEM).unwrap();
        assert_eq!(document.get(Category::Accent.key()), Some(RED));
        assert!(!document.contains(Category::Font.key()));
    }

    #[test]
    fn concurrent_writers_never_corrupt_the_document() {
        let store = std::sync::Arc::new(MemorySettings::new());
        let handles: Vec<_> = [
            (Category::Accent, RED),
            (Category::Font, SERIF),
            (Category::Navbar, "com.ex.pill"),
        ]
        .into_iter()
        .map(|(category, package)| {
            let store = store.clone();
            std::thread::spawn(move || {
                write_selection(
                    &*store,
                    UserId::SYSTEM,
                    category,
                    &Selection::Overlay(package.to_string()),
                )
                .unwrap()
            })
        })
        .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), WriteOutcome::Written);
        }

        // Racing writers may drop each other's entries, but the winner's
        // entry is always intact and the document always parses.
        let document = read_selection(&*store, UserId::SYSTEM).unwrap();
        assert!(!document.is_empty());
        for (category, package) in document.selections() {
            let category: Category = category.parse().unwrap();
            let expected = match category {
                Category::Accent => RED,
                Category::Font => SERIF,
                _ => "com.ex.pill",
            };
            assert_eq!(package, expected);
        }
    }
}
