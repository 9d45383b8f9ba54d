//! Saved questions, persisted as JSON in the stockask home.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::UtcDateTime;

pub const FAVOURITES_FILE: &str = "favourites.json";

#[derive(Debug, Error)]
pub enum FavouritesError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("favourites file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no favourite at index {index} ({len} saved)")]
    OutOfRange { index: usize, len: usize },

    #[error("favourite text cannot be empty")]
    EmptyText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    pub text: String,
    pub saved_at: UtcDateTime,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FavouritesFile {
    #[serde(default)]
    favourites: Vec<Favourite>,
}

/// Ordered list of favourites backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FavouriteStore {
    path: PathBuf,
    favourites: Vec<Favourite>,
}

impl FavouriteStore {
    pub fn in_home(home: &Path) -> Result<Self, FavouritesError> {
        Self::load(home.join(FAVOURITES_FILE))
    }

    /// Reads `path`; a missing file is an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FavouritesError> {
        let path = path.into();
        let favourites = match fs::read_to_string(&path) {
            Ok(raw) => {
                let file: FavouritesFile =
                    serde_json::from_str(&raw).map_err(|source| FavouritesError::Malformed {
                        path: path.clone(),
                        source,
                    })?;
                file.favourites
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(FavouritesError::Io { path, source }),
        };

        debug!(path = %path.display(), count = favourites.len(), "favourites loaded");
        Ok(Self { path, favourites })
    }

    pub fn list(&self) -> &[Favourite] {
        &self.favourites
    }

    pub fn len(&self) -> usize {
        self.favourites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favourites.is_empty()
    }

    /// Appends `text` unless an identical entry exists. Returns its index.
    pub fn add(&mut self, text: &str) -> Result<usize, FavouritesError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FavouritesError::EmptyText);
        }

        if let Some(index) = self.favourites.iter().position(|fav| fav.text == text) {
            return Ok(index);
        }

        self.favourites.push(Favourite {
            text: text.to_owned(),
            saved_at: UtcDateTime::now(),
        });
        Ok(self.favourites.len() - 1)
    }

    pub fn get(&self, index: usize) -> Result<&Favourite, FavouritesError> {
        self.favourites.get(index).ok_or(FavouritesError::OutOfRange {
            index,
            len: self.favourites.len(),
        })
    }

    pub fn remove(&mut self, index: usize) -> Result<Favourite, FavouritesError> {
        if index >= self.favourites.len() {
            return Err(FavouritesError::OutOfRange {
                index,
                len: self.favourites.len(),
            });
        }
        Ok(self.favourites.remove(index))
    }

    /// Writes the list, creating parent directories as needed.
    pub fn save(&self) -> Result<(), FavouritesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| FavouritesError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let body = serde_json::to_string_pretty(&FavouritesFile {
            favourites: self.favourites.clone(),
        })
        .map_err(|source| FavouritesError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        fs::write(&self.path, body).map_err(|source| FavouritesError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FavouriteStore::in_home(temp.path()).expect("load");
        assert!(store.is_empty());
    }

    #[test]
    fn add_ignores_duplicates_and_save_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join(FAVOURITES_FILE);

        let mut store = FavouriteStore::load(&path).expect("load");
        assert_eq!(store.add("max of AAPL in 2015").expect("add"), 0);
        assert_eq!(store.add("max of MSFT in 2016").expect("add"), 1);
        assert_eq!(store.add("  max of AAPL in 2015 ").expect("add"), 0);
        store.save().expect("save");

        let reloaded = FavouriteStore::load(&path).expect("reload");
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(1).expect("second").text, "max of MSFT in 2016");
    }

    #[test]
    fn remove_and_get_check_bounds() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut store = FavouriteStore::in_home(temp.path()).expect("load");
        store.add("one").expect("add");

        assert!(matches!(
            store.get(3),
            Err(FavouritesError::OutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(store.remove(0).expect("remove").text, "one");
        assert!(matches!(store.remove(0), Err(FavouritesError::OutOfRange { .. })));
    }

    #[test]
    fn malformed_file_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(FAVOURITES_FILE);
        fs::write(&path, "not json").expect("write");
        assert!(matches!(
            FavouriteStore::load(&path),
            Err(FavouritesError::Malformed { .. })
        ));
    }
}
