//! Favourite stations, persisted through an injected store.
//!
//! Favourites are station display names, kept in the order they were added.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors reading or writing favourites.
#[derive(Debug, thiserror::Error)]
pub enum FavouritesError {
    #[error("favourites I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("favourites file is not a JSON list of names: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable storage for the favourites list.
pub trait FavouritesStore: Send + Sync + 'static {
    /// The saved list; empty when nothing has been saved yet.
    fn load(&self) -> Result<Vec<String>, FavouritesError>;

    /// Replace the saved list.
    fn save(&self, names: &[String]) -> Result<(), FavouritesError>;
}

/// Toggle `name` in `names`: remove it if present, else append it.
///
/// Returns whether `name` is a favourite afterwards.
pub fn toggle(names: &mut Vec<String>, name: &str) -> bool {
    match names.iter().position(|n| n == name) {
        Some(idx) => {
            names.remove(idx);
            false
        }
        None => {
            names.push(name.to_string());
            true
        }
    }
}

/// Favourites that last as long as the process.
#[derive(Debug, Default)]
pub struct MemoryFavourites {
    names: Mutex<Vec<String>>,
}

impl MemoryFavourites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with these names already saved.
    pub fn with_names(names: Vec<String>) -> Self {
        Self {
            names: Mutex::new(names),
        }
    }
}

impl FavouritesStore for MemoryFavourites {
    fn load(&self) -> Result<Vec<String>, FavouritesError> {
        Ok(self
            .names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, names: &[String]) -> Result<(), FavouritesError> {
        *self
            .names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = names.to_vec();
        Ok(())
    }
}

/// Favourites kept as a JSON array of names in a file.
#[derive(Debug, Clone)]
pub struct JsonFileFavourites {
    path: PathBuf,
}

impl JsonFileFavourites {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the favourites file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> FavouritesError {
        FavouritesError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for JsonFileFavourites {
    fn default() -> Self {
        Self::new("favourites.json")
    }
}

impl FavouritesStore for JsonFileFavourites {
    fn load(&self) -> Result<Vec<String>, FavouritesError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Creates parent directories if they don't exist.
    fn save(&self, names: &[String]) -> Result<(), FavouritesError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(names)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut list = names(&["Bray"]);
        assert!(toggle(&mut list, "Howth"));
        assert_eq!(list, names(&["Bray", "Howth"]));

        assert!(!toggle(&mut list, "Bray"));
        assert_eq!(list, names(&["Howth"]));
    }

    #[test]
    fn toggle_keeps_insertion_order() {
        let mut list = Vec::new();
        toggle(&mut list, "Malahide");
        toggle(&mut list, "Bray");
        toggle(&mut list, "Athlone");
        toggle(&mut list, "Bray");
        toggle(&mut list, "Bray");
        assert_eq!(list, names(&["Malahide", "Athlone", "Bray"]));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryFavourites::new();
        assert!(store.load().unwrap().is_empty());

        store.save(&names(&["Bray"])).unwrap();
        assert_eq!(store.load().unwrap(), names(&["Bray"]));

        let seeded = MemoryFavourites::with_names(names(&["Howth"]));
        assert_eq!(seeded.load().unwrap(), names(&["Howth"]));
    }

    #[test]
    fn file_store_save_and_load() {
        let dir = tempdir().unwrap();
        let store = JsonFileFavourites::new(dir.path().join("favourites.json"));

        store.save(&names(&["Bray", "Dun Laoghaire"])).unwrap();
        assert_eq!(store.load().unwrap(), names(&["Bray", "Dun Laoghaire"]));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileFavourites::new(dir.path().join("none.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("favourites.json");
        let store = JsonFileFavourites::new(&path);

        store.save(&names(&["Bray"])).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("favourites.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileFavourites::new(&path);
        assert!(matches!(store.load(), Err(FavouritesError::Json(_))));
    }
}
