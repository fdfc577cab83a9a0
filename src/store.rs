//! Small key-value persistence for settings such as the default target.
//!
//! Nothing is shared implicitly: a manager only persists through a store it
//! was given. [`SharedStore`] is the opt-in process-wide store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, error};
use once_cell::sync::Lazy;

use crate::error::Error;

/// Key under which the default target is stored
pub const DEFAULT_TARGET_KEY: &str = "default_chat_id";

pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// Store kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a `key=value` properties file.
///
/// The file is re-read on every access and rewritten on every update;
/// `#` and `!` lines are comments.
#[derive(Debug, Clone)]
pub struct PropertiesStore {
    path: PathBuf,
}

impl PropertiesStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        PropertiesStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<(String, String)>, Error> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                error!("Failed to read settings file {}: {}", self.path.display(), e);
                return Err(e.into());
            }
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
            .filter_map(|line| {
                line.split_once('=')
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            })
            .collect())
    }

    /// Reject what would not read back unchanged: lines are split on line
    /// breaks and `=`, and both sides are trimmed.
    fn check_storable(key: &str, value: &str) -> Result<(), Error> {
        let breaks_line = |s: &str| s.contains('\n') || s.contains('\r');
        let padded = |s: &str| s.trim() != s;

        if key.is_empty()
            || key.contains('=')
            || key.starts_with(['#', '!'])
            || breaks_line(key)
            || padded(key)
        {
            return Err(Error::invalid_argument(format!(
                "'{}' cannot be stored as a settings key",
                key
            )));
        }
        if breaks_line(value) || padded(value) {
            return Err(Error::invalid_argument(format!(
                "value for '{}' contains line breaks or surrounding whitespace",
                key
            )));
        }
        Ok(())
    }
}

impl SettingsStore for PropertiesStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self
            .load()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        Self::check_storable(key, value)?;
        let mut entries = self.load()?;
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }

        let mut content = String::new();
        for (k, v) in &entries {
            content.push_str(k);
            content.push('=');
            content.push_str(v);
            content.push('\n');
        }
        fs::write(&self.path, content)?;
        debug!("Saved '{}' to {}", key, self.path.display());
        Ok(())
    }
}

static SHARED: Lazy<Mutex<MemoryStore>> = Lazy::new(|| Mutex::new(MemoryStore::new()));

/// Handle to the process-wide store. Every handle sees the same values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedStore;

impl SettingsStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let store = SHARED
            .lock()
            .map_err(|_| Error::configuration("shared settings store is poisoned"))?;
        store.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let mut store = SHARED
            .lock()
            .map_err(|_| Error::configuration("shared settings store is poisoned"))?;
        store.set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_properties_store_round_trip() {
        let path = std::env::temp_dir().join(format!("tgcore-store-{}.properties", std::process::id()));
        let _ = fs::remove_file(&path);
        fs::write(&path, "# settings\ntoken_label = main\n").unwrap();

        let mut store = PropertiesStore::new(&path);
        assert_eq!(store.get("token_label").unwrap().as_deref(), Some("main"));
        assert_eq!(store.get(DEFAULT_TARGET_KEY).unwrap(), None);

        store.set(DEFAULT_TARGET_KEY, "-100500").unwrap();
        store.set(DEFAULT_TARGET_KEY, "@news").unwrap();

        let reopened = PropertiesStore::new(&path);
        assert_eq!(reopened.get(DEFAULT_TARGET_KEY).unwrap().as_deref(), Some("@news"));
        assert_eq!(reopened.get("token_label").unwrap().as_deref(), Some("main"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_properties_store_rejects_values_that_would_not_read_back() {
        let path = std::env::temp_dir().join(format!("tgcore-store-reject-{}.properties", std::process::id()));
        let _ = fs::remove_file(&path);
        let mut store = PropertiesStore::new(&path);

        for value in [" @news", "@news ", "@news\nextra=1", "a\rb"] {
            assert!(matches!(
                store.set(DEFAULT_TARGET_KEY, value),
                Err(Error::InvalidArgument(_))
            ));
        }
        for key in ["", "a=b", " key", "#key", "two\nlines"] {
            assert!(matches!(store.set(key, "1"), Err(Error::InvalidArgument(_))));
        }
        assert!(!path.exists());

        store.set(DEFAULT_TARGET_KEY, "a=b c").unwrap();
        assert_eq!(store.get(DEFAULT_TARGET_KEY).unwrap().as_deref(), Some("a=b c"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_properties_file_is_empty() {
        let store = PropertiesStore::new("/nonexistent/dir/settings.properties");
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_shared_store_is_visible_across_handles() {
        let mut writer = SharedStore;
        writer.set("shared_test_key", "value").unwrap();
        assert_eq!(SharedStore.get("shared_test_key").unwrap().as_deref(), Some("value"));
    }
}
