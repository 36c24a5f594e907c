use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::pool::{IndexFormatSnafu, IndexReadSnafu, IndexWriteSnafu, PoolResult};

/// A lightweight pointer to a stored ballot.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
struct IndexState {
    /// Ballots created on this device.
    #[serde(default)]
    mine: Vec<IndexEntry>,
    /// Ballots viewed via a link but not owned here.
    #[serde(default)]
    shared: Vec<IndexEntry>,
}

/// The local ballot index: which ballot ids belong to "my ballots" and
/// which were "shared with me". Persisted as one JSON file and explicitly
/// loaded/saved; an id never appears in both lists.
///
/// Deleting from "mine" is paired with a remote record delete by the
/// caller; removing from "shared" is a local-only operation.
pub struct LocalIndex {
    path: PathBuf,
    state: IndexState,
}

impl LocalIndex {
    /// Loads the index from `path`. A missing file is an empty index.
    pub fn load(path: &Path) -> PoolResult<LocalIndex> {
        let state = read_state(path)?;
        debug!(
            "index: loaded {} mine, {} shared from {}",
            state.mine.len(),
            state.shared.len(),
            path.display()
        );
        Ok(LocalIndex {
            path: path.to_path_buf(),
            state,
        })
    }

    fn save(&self) -> PoolResult<()> {
        let path = self.path.display().to_string();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(IndexWriteSnafu { path: path.clone() })?;
        }
        let contents =
            serde_json::to_string_pretty(&self.state).context(IndexFormatSnafu { path: path.clone() })?;
        fs::write(&self.path, contents).context(IndexWriteSnafu { path })
    }

    pub fn mine(&self) -> &[IndexEntry] {
        &self.state.mine
    }

    pub fn shared(&self) -> &[IndexEntry] {
        &self.state.shared
    }

    pub fn is_mine(&self, id: &str) -> bool {
        self.state.mine.iter().any(|e| e.id == id)
    }

    /// The union of both lists, "mine" first. Feeds the scoreboard.
    pub fn ballot_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.mine.iter().map(|e| e.id.clone()).collect();
        for e in self.state.shared.iter() {
            if !ids.contains(&e.id) {
                ids.push(e.id.clone());
            }
        }
        ids
    }

    /// Registers a ballot I created. Re-adding an existing id replaces
    /// its entry (name and timestamp) instead of duplicating it, and
    /// drops any stale "shared" entry for the same id.
    pub fn add_mine(&mut self, id: &str, name: &str) -> PoolResult<()> {
        self.state.mine.retain(|e| e.id != id);
        self.state.shared.retain(|e| e.id != id);
        self.state.mine.push(IndexEntry {
            id: id.to_string(),
            name: name.to_string(),
            saved_at: Utc::now(),
        });
        self.save()
    }

    /// Registers a ballot shared with me. No-op when the id is one of my
    /// own ballots; that check goes through the file on disk rather than
    /// the in-memory copy, so a save that happened elsewhere in the flow
    /// is never missed. Returns whether the entry was added.
    pub fn add_shared(&mut self, id: &str, name: &str) -> PoolResult<bool> {
        let persisted = read_state(&self.path)?;
        if persisted.mine.iter().any(|e| e.id == id) {
            debug!("index: {} is one of my ballots, not adding to shared", id);
            return Ok(false);
        }
        self.state.shared.retain(|e| e.id != id);
        self.state.shared.push(IndexEntry {
            id: id.to_string(),
            name: name.to_string(),
            saved_at: Utc::now(),
        });
        self.save()?;
        Ok(true)
    }

    /// Drops a ballot from "mine". The caller also deletes the stored
    /// record; this only updates the index. Returns whether it was there.
    pub fn remove_mine(&mut self, id: &str) -> PoolResult<bool> {
        let before = self.state.mine.len();
        self.state.mine.retain(|e| e.id != id);
        let removed = self.state.mine.len() < before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Drops a ballot from "shared". Local-only; the stored record is
    /// untouched.
    pub fn remove_shared(&mut self, id: &str) -> PoolResult<bool> {
        let before = self.state.shared.len();
        self.state.shared.retain(|e| e.id != id);
        let removed = self.state.shared.len() < before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }
}

fn read_state(path: &Path) -> PoolResult<IndexState> {
    if !path.exists() {
        return Ok(IndexState::default());
    }
    let contents = fs::read_to_string(path).context(IndexReadSnafu {
        path: path.display().to_string(),
    })?;
    serde_json::from_str(&contents).context(IndexFormatSnafu {
        path: path.display().to_string(),
    })
}
