//! File-backed preference store.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use arbor_core::logging::targets;
use arbor_core::Signal;
use parking_lot::RwLock;

use super::{
    PreferenceFormat, PreferenceStore, PreferenceStoreConfig, PreferenceValue, preference_key,
};
use crate::component::Component;
use crate::error::{PreferenceError, PreferenceResult};

/// Preferences of one component, by property name.
type Node = BTreeMap<String, PreferenceValue>;

/// A [`PreferenceStore`] holding preferences in memory and persisting them
/// to a JSON or TOML file.
///
/// The data is a two-level map: component keys (see
/// [`preference_key`](super::preference_key)) to property names to values.
/// Files are written atomically through a temporary file in the target
/// directory.
///
/// # Example
///
/// ```
/// use arbor::preferences::{PreferenceStoreConfig, PreferenceValue, SettingsPreferenceStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("prefs.toml");
///
/// let store = SettingsPreferenceStore::new(PreferenceStoreConfig::new().path(&path));
/// store.set("window", "width", PreferenceValue::from(800));
/// store.save().unwrap();
///
/// let reopened = SettingsPreferenceStore::open(PreferenceStoreConfig::new().path(&path)).unwrap();
/// assert_eq!(reopened.get("window", "width"), Some(PreferenceValue::Integer(800)));
/// ```
pub struct SettingsPreferenceStore {
    config: PreferenceStoreConfig,
    data: RwLock<BTreeMap<String, Node>>,
    /// Emitted with the component key whenever a node changes.
    pub changed: Signal<String>,
}

impl SettingsPreferenceStore {
    /// Create an empty store. Nothing is read from disk.
    pub fn new(config: PreferenceStoreConfig) -> Self {
        Self {
            config,
            data: RwLock::new(BTreeMap::new()),
            changed: Signal::new(),
        }
    }

    /// Create an empty store that is never persisted.
    pub fn in_memory() -> Self {
        Self::new(PreferenceStoreConfig::new())
    }

    /// Create a store and read its file, if the file exists.
    pub fn open(config: PreferenceStoreConfig) -> PreferenceResult<Self> {
        let store = Self::new(config);
        if store.config.path.as_deref().is_some_and(Path::exists) {
            store.load()?;
        }
        Ok(store)
    }

    /// The store's configuration.
    pub fn config(&self) -> &PreferenceStoreConfig {
        &self.config
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Get a single stored value.
    pub fn get(&self, node: &str, key: &str) -> Option<PreferenceValue> {
        self.data.read().get(node)?.get(key).cloned()
    }

    /// Store a single value.
    pub fn set(&self, node: &str, key: &str, value: impl Into<PreferenceValue>) {
        let value = value.into();
        let changed = {
            let mut data = self.data.write();
            let entry = data.entry(node.to_string()).or_default();
            entry.insert(key.to_string(), value.clone()) != Some(value)
        };
        if changed {
            self.changed.emit(node.to_string());
        }
    }

    /// All values stored for a component key.
    pub fn node(&self, node: &str) -> Option<BTreeMap<String, PreferenceValue>> {
        self.data.read().get(node).cloned()
    }

    /// Forget everything stored for a component key.
    pub fn remove_node(&self, node: &str) -> Option<BTreeMap<String, PreferenceValue>> {
        let removed = self.data.write().remove(node);
        if removed.is_some() {
            self.changed.emit(node.to_string());
        }
        removed
    }

    /// The component keys that have stored values, in order.
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replace the in-memory data with the contents of the configured file.
    ///
    /// Does nothing for an in-memory store.
    pub fn load(&self) -> PreferenceResult<()> {
        let Some(path) = self.config.path.as_deref() else {
            return Ok(());
        };
        let text = std::fs::read_to_string(path).map_err(|err| PreferenceError::io(path, err))?;
        let data: BTreeMap<String, Node> = match self.config.format {
            PreferenceFormat::Json => serde_json::from_str(&text)?,
            PreferenceFormat::Toml => toml::from_str(&text)?,
        };
        tracing::debug!(
            target: targets::PREFERENCES,
            path = %path.display(),
            nodes = data.len(),
            "loaded preferences"
        );
        *self.data.write() = data;
        Ok(())
    }

    /// Write the in-memory data to the configured file.
    ///
    /// Does nothing for an in-memory store.
    pub fn save(&self) -> PreferenceResult<()> {
        let Some(path) = self.config.path.as_deref() else {
            return Ok(());
        };
        let text = {
            let data = self.data.read();
            match self.config.format {
                PreferenceFormat::Json => serde_json::to_string_pretty(&*data)?,
                PreferenceFormat::Toml => toml::to_string_pretty(&without_nulls(&data))?,
            }
        };
        write_atomic(path, text.as_bytes())?;
        tracing::debug!(target: targets::PREFERENCES, path = %path.display(), "saved preferences");
        Ok(())
    }

    fn try_auto_save(&self) -> PreferenceResult<()> {
        if self.config.auto_save {
            self.save()
        } else {
            Ok(())
        }
    }
}

impl PreferenceStore for SettingsPreferenceStore {
    fn load_preferences(&self, component: &dyn Component) -> PreferenceResult<()> {
        let key = preference_key(component)?;
        if let Some(values) = self.node(&key) {
            tracing::trace!(target: targets::PREFERENCES, key, "importing preferences");
            component.import_preferences(&values);
        }
        Ok(())
    }

    fn save_preferences(&self, component: &dyn Component) -> PreferenceResult<()> {
        let key = preference_key(component)?;
        let values = component.export_preferences();
        if values.is_empty() {
            return Ok(());
        }
        let changed = self.data.write().insert(key.clone(), values.clone()) != Some(values);
        if changed {
            self.changed.emit(key);
            self.try_auto_save()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SettingsPreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsPreferenceStore")
            .field("config", &self.config)
            .field("nodes", &self.data.read().len())
            .finish()
    }
}

/// TOML has no null; drop null entries and array elements.
fn without_nulls(data: &BTreeMap<String, Node>) -> BTreeMap<String, Node> {
    fn strip(value: &PreferenceValue) -> Option<PreferenceValue> {
        match value {
            PreferenceValue::Null => None,
            PreferenceValue::Array(values) => {
                Some(PreferenceValue::Array(values.iter().filter_map(strip).collect()))
            }
            other => Some(other.clone()),
        }
    }

    data.iter()
        .map(|(node, values)| {
            let values = values
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), strip(value)?)))
                .collect();
            (node.clone(), values)
        })
        .collect()
}

fn write_atomic(path: &Path, contents: &[u8]) -> PreferenceResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| PreferenceError::io(dir, err))?;

    let mut file =
        tempfile::NamedTempFile::new_in(dir).map_err(|err| PreferenceError::io(dir, err))?;
    file.write_all(contents)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| PreferenceError::io(file.path(), err))?;
    file.persist(path)
        .map_err(|err| PreferenceError::io(path, err.error))?;
    Ok(())
}

static_assertions::assert_impl_all!(SettingsPreferenceStore: Send, Sync);
