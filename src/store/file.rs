//! JSON-file persistence.
//!
//! The whole store is one JSON object of string to string.  Another process
//! (a `configure` run while `watch` is open) may write the same file, so every
//! mutation re-reads the file, changes the one key and replaces the file
//! through a rename.  Reads are served from the copy taken at [`open`] or the
//! last [`reload`](KeyValueStore::reload).
//!
//! ```text
//! ~/.local/share/feedcount/store.json
//! ```
//!
//! [`open`]: FileStore::open

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{KeyValueStore, StoreError};

/// On-disk layout: a flat object of named values.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Document {
    values: BTreeMap<String, String>,
}

/// A [`KeyValueStore`] persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    document: Document,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store and is created on the first write.
    /// A file that exists but does not parse is logged and replaced on the
    /// next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let document = read_or_empty(&path);
        Ok(Self { path, document })
    }

    /// Where this store lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, apply `change`, and write the result back.
    fn update(&mut self, change: impl FnOnce(&mut Document) -> bool) -> Result<(), StoreError> {
        self.document = read_or_empty(&self.path);
        if change(&mut self.document) {
            self.save()?;
        }
        Ok(())
    }

    /// Write to a sibling file, then rename it over the store so readers see
    /// either the old or the new document, never half of one.
    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.document)?;
        let staging = self.staging_path();
        fs::write(&staging, json)?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".into());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", process::id()))
    }
}

/// The document at `path`, or an empty one if it is missing or unreadable.
fn read_or_empty(path: &Path) -> Document {
    if !path.exists() {
        return Document::default();
    }
    load(path).unwrap_or_else(|e| {
        warn!("ignoring unreadable store {}: {e:#}", path.display());
        Document::default()
    })
}

fn load(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read store file: {}", path.display()))?;
    let document = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse store file: {}", path.display()))?;
    Ok(document)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.document.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.values.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.update(|doc| doc.values.remove(key).is_some())
    }

    fn reload(&mut self) {
        self.document = read_or_empty(&self.path);
    }
}
