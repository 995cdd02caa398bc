use log::warn;
use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;

/// Favorites are capped; newest entries displace the oldest.
pub const FAVORITES_LIMIT: usize = 12;

/// Storage collaborator for the favorites list. Injected into the app state
/// so nothing in the pipeline touches the filesystem directly.
pub trait FavoritesStore: Send + Debug {
    /// Missing or unreadable state degrades to an empty list.
    fn load(&self) -> Vec<String>;

    /// Full overwrite. Failures are logged and otherwise ignored; losing a
    /// favorite must never take the dashboard down.
    fn save(&self, favorites: &[String]);
}

/// JSON-array-on-disk store, one location string per entry.
#[derive(Debug)]
pub struct JsonFavoritesStore {
    path: PathBuf,
}

impl JsonFavoritesStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the platform data directory.
    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(Config::favorites_file_path()?))
    }
}

impl FavoritesStore for JsonFavoritesStore {
    fn load(&self) -> Vec<String> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    fn save(&self, favorites: &[String]) {
        if let Some(parent) = self.path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            warn!("could not create favorites directory {}: {err}", parent.display());
            return;
        }

        let json = match serde_json::to_string_pretty(favorites) {
            Ok(json) => json,
            Err(err) => {
                warn!("could not serialize favorites: {err}");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, json) {
            warn!("could not write favorites to {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonFavoritesStore {
        let path = std::env::temp_dir()
            .join(format!("skydeck-favorites-{}-{name}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        JsonFavoritesStore::new(path)
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let store = temp_store("missing");
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let store = temp_store("corrupt");
        fs::write(&store.path, "not json at all").expect("write");
        assert!(store.load().is_empty());
        let _ = fs::remove_file(&store.path);
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store("roundtrip");
        store.save(&["Paris,FR".to_string(), "Kyiv,UA".to_string()]);
        assert_eq!(store.load(), vec!["Paris,FR".to_string(), "Kyiv,UA".to_string()]);
        let _ = fs::remove_file(&store.path);
    }

    #[test]
    fn save_to_unwritable_path_is_silent() {
        let store = JsonFavoritesStore::new(PathBuf::from("/dev/null/nope/favorites.json"));
        store.save(&["Paris,FR".to_string()]);
        assert!(store.load().is_empty());
    }
}
