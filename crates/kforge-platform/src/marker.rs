//! Build markers.
//!
//! A marker named `last-<platform>` in the working directory records that
//! `<platform>` was the last platform entered into pre-build. Its existence is
//! the flag; the body is a small JSON record kept for inspection. Markers
//! created by other tools (an empty file from `touch`) are still honoured.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};
use crate::mode::BuildMode;
use crate::platform::remove_if_exists;

/// File name prefix of every marker.
pub const MARKER_PREFIX: &str = "last-";

/// Contents of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub platform: String,
    /// Build mode of the invocation that wrote the marker, if known.
    #[serde(default)]
    pub mode: Option<BuildMode>,
}

impl MarkerRecord {
    pub fn new(platform: impl Into<String>, mode: BuildMode) -> Self {
        Self {
            platform: platform.into(),
            mode: Some(mode),
        }
    }

    fn unknown(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            mode: None,
        }
    }
}

/// Presence/absence store for markers, keyed by platform name.
pub trait MarkerStore {
    fn contains(&self, platform: &str) -> Result<bool>;

    /// All platforms that have a marker, sorted by name.
    fn names(&self) -> Result<Vec<String>>;

    fn get(&self, platform: &str) -> Result<Option<MarkerRecord>>;

    fn insert(&self, record: &MarkerRecord) -> Result<()>;

    /// Remove a marker. Removing a missing marker is not an error.
    fn remove(&self, platform: &str) -> Result<()>;
}

/// Markers as `last-<platform>` files in a directory.
#[derive(Debug, Clone)]
pub struct FsMarkerStore {
    dir: PathBuf,
}

impl FsMarkerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, platform: &str) -> PathBuf {
        self.dir.join(format!("{MARKER_PREFIX}{platform}"))
    }
}

impl MarkerStore for FsMarkerStore {
    fn contains(&self, platform: &str) -> Result<bool> {
        Ok(self.path(platform).is_file())
    }

    fn names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| PlatformError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PlatformError::io(&self.dir, e))?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str().and_then(|n| n.strip_prefix(MARKER_PREFIX)) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn get(&self, platform: &str) -> Result<Option<MarkerRecord>> {
        let path = self.path(platform);
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PlatformError::io(&path, e)),
        };
        let record = match serde_json::from_str::<MarkerRecord>(&body) {
            Ok(record) if record.platform == platform => record,
            _ => MarkerRecord::unknown(platform),
        };
        Ok(Some(record))
    }

    fn insert(&self, record: &MarkerRecord) -> Result<()> {
        let path = self.path(&record.platform);
        let body = serde_json::to_string_pretty(record).map_err(|source| PlatformError::Marker {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, body).map_err(|e| PlatformError::io(&path, e))
    }

    fn remove(&self, platform: &str) -> Result<()> {
        remove_if_exists(&self.path(platform)).map(|_| ())
    }
}

/// In-memory marker store.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    records: RefCell<BTreeMap<String, MarkerRecord>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with markers for `platforms`.
    pub fn with_markers<'a>(platforms: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        for platform in platforms {
            store
                .records
                .borrow_mut()
                .insert(platform.to_string(), MarkerRecord::unknown(platform));
        }
        store
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn contains(&self, platform: &str) -> Result<bool> {
        Ok(self.records.borrow().contains_key(platform))
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.records.borrow().keys().cloned().collect())
    }

    fn get(&self, platform: &str) -> Result<Option<MarkerRecord>> {
        Ok(self.records.borrow().get(platform).cloned())
    }

    fn insert(&self, record: &MarkerRecord) -> Result<()> {
        self.records
            .borrow_mut()
            .insert(record.platform.clone(), record.clone());
        Ok(())
    }

    fn remove(&self, platform: &str) -> Result<()> {
        self.records.borrow_mut().remove(platform);
        Ok(())
    }
}
