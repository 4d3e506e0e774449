// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key-value persistence of per-day planning state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use venuemap_core::VenueMap;
use venuemap_detection::HallSet;
use venuemap_route::{GroupKey, SubOrders, VisitOrder};

use crate::error::{Error, Result};

/// Identifies one day of one event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    pub event_id: String,
    pub day: u32,
}

impl DayKey {
    pub fn new(event_id: impl Into<String>, day: u32) -> Self {
        Self {
            event_id: event_id.into(),
            day,
        }
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/day{}", self.event_id, self.day)
    }
}

/// Everything persisted for one day. Derived data (hall membership, item
/// resolution, the route) is recomputed on load and never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayState {
    #[serde(default)]
    pub map: Option<VenueMap>,
    #[serde(default)]
    pub halls: HallSet,
    #[serde(default)]
    pub visit_order: VisitOrder,
    #[serde(default)]
    pub group_order: Vec<GroupKey>,
    #[serde(default)]
    pub sub_orders: SubOrders,
}

pub trait DayStore {
    /// `Ok(None)` when nothing was saved under `key`.
    fn load(&self, key: &DayKey) -> Result<Option<DayState>>;
    fn save(&mut self, key: &DayKey, state: &DayState) -> Result<()>;
}

/// In-process store. States are kept serialized so a load always yields an
/// independent copy.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: FxHashMap<DayKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DayStore for MemoryStore {
    fn load(&self, key: &DayKey) -> Result<Option<DayState>> {
        self.entries
            .get(key)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(Error::from)
    }

    fn save(&mut self, key: &DayKey, state: &DayState) -> Result<()> {
        self.entries.insert(key.clone(), serde_json::to_string(state)?);
        Ok(())
    }
}

/// One JSON file per day in a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| Error::Store {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name derived from a hash of the event id, so any id is safe on disk.
    pub fn path_for(&self, key: &DayKey) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.event_id.as_bytes());
        let digest = hex::encode(hasher.finalize());
        self.dir.join(format!("{}-day{}.json", &digest[..16], key.day))
    }
}

impl DayStore for JsonDirStore {
    fn load(&self, key: &DayKey) -> Result<Option<DayState>> {
        let path = self.path_for(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(Error::Store { path, source }),
        };
        let state = serde_json::from_slice(&data)?;
        debug!(%key, path = %path.display(), size = data.len(), "day state loaded");
        Ok(Some(state))
    }

    fn save(&mut self, key: &DayKey, state: &DayState) -> Result<()> {
        let path = self.path_for(key);
        let data = serde_json::to_vec(state)?;

        // Atomic replace
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &data).map_err(|source| Error::Store {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| Error::Store {
            path: path.clone(),
            source,
        })?;

        debug!(%key, path = %path.display(), size = data.len(), "day state saved");
        Ok(())
    }
}
