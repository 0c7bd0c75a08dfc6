//! Persistence of the post collection.
//!
//! The collection is always read and written as a whole. [`JsonFileStore`]
//! keeps it in a single pretty-printed JSON array; [`MemoryStore`] keeps it in
//! memory for tests and embedding.

use crate::errors::PersistenceError;
use crate::types::Post;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use tracing::debug;

pub trait PostStore {
    /// Load every post. A store that has never been written is empty.
    fn load(&self) -> Result<Vec<Post>, PersistenceError>;

    /// Replace the stored collection with `posts`.
    fn save(&self, posts: &[Post]) -> Result<(), PersistenceError>;
}

/// Shapes accepted when reading the posts file. Some writers serialize the
/// collection as an object keyed by position instead of an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPosts {
    List(Vec<Post>),
    Keyed(BTreeMap<String, Post>),
}

impl StoredPosts {
    fn into_posts(self) -> Vec<Post> {
        match self {
            StoredPosts::List(posts) => posts,
            StoredPosts::Keyed(posts) => posts.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileStore {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Take the advisory writer lock. It is released when the returned file
    /// is dropped.
    fn lock(&self) -> Result<File, PersistenceError> {
        let lock_path = self.lock_path();
        let lock_err = |source| PersistenceError::Lock {
            path: lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(lock_err)?;
        file.lock().map_err(lock_err)?;
        Ok(file)
    }
}

impl PostStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Post>, PersistenceError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        let stored: StoredPosts =
            serde_json::from_str(&json).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(stored.into_posts())
    }

    fn save(&self, posts: &[Post]) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(posts).map_err(PersistenceError::Serialize)?;

        fs::create_dir_all(self.dir()).map_err(write_err)?;
        let _lock = self.lock()?;
        // Readers only ever see the old or the new file, never a partial one.
        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), count = posts.len(), "saved posts");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: RwLock<Vec<Post>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> MemoryStore {
        MemoryStore {
            posts: RwLock::new(posts),
        }
    }
}

impl PostStore for MemoryStore {
    fn load(&self) -> Result<Vec<Post>, PersistenceError> {
        Ok(self
            .posts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, posts: &[Post]) -> Result<(), PersistenceError> {
        *self
            .posts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = posts.to_vec();
        Ok(())
    }
}

impl<S: PostStore + ?Sized> PostStore for &S {
    fn load(&self) -> Result<Vec<Post>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, posts: &[Post]) -> Result<(), PersistenceError> {
        (**self).save(posts)
    }
}
