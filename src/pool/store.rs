use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use snafu::prelude::*;

use award_ballot::BallotRecord;

use crate::pool::wire::StoredBallot;
use crate::pool::{
    NotFoundSnafu, PoolResult, StoreFormatSnafu, StoreReadSnafu, StoreWriteSnafu,
};

/// The keyed-record store holding one record per ballot, keyed by the
/// ballot id.
///
/// This is the boundary to the remote persistence service. Every call is
/// a single attempt: no retry, no timeout beyond the underlying I/O, no
/// cancellation. Concurrent writers to the same key resolve by last
/// write wins.
pub trait RecordStore {
    /// Creates or fully overwrites the record with `record.id`.
    fn upsert(&mut self, record: &BallotRecord) -> PoolResult<()>;

    /// Fetches one record by id.
    fn fetch(&self, id: &str) -> PoolResult<Option<BallotRecord>>;

    /// Fetches every record whose id is in `ids`. Unknown ids are
    /// silently absent from the result.
    fn fetch_many(&self, ids: &[String]) -> PoolResult<Vec<BallotRecord>>;

    /// Partial update: replaces only the winners field of one record.
    fn update_winners(
        &mut self,
        id: &str,
        winners: &BTreeMap<String, String>,
    ) -> PoolResult<()>;

    /// Deletes the record with this id. Deleting an unknown id succeeds.
    fn delete(&mut self, id: &str) -> PoolResult<()>;
}

/// A record store backed by a single JSON document on disk, mapping
/// ballot id to record. Stands in for the remote service: point the path
/// at a shared or synced file and every link holder reads and writes the
/// same records.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: &Path) -> JsonFileStore {
        JsonFileStore {
            path: path.to_path_buf(),
        }
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn read_all(&self) -> PoolResult<BTreeMap<String, StoredBallot>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).context(StoreReadSnafu {
            path: self.path_str(),
        })?;
        serde_json::from_str(&contents).context(StoreFormatSnafu {
            path: self.path_str(),
        })
    }

    fn write_all(&self, records: &BTreeMap<String, StoredBallot>) -> PoolResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(StoreWriteSnafu {
                path: self.path_str(),
            })?;
        }
        let contents = serde_json::to_string_pretty(records).context(StoreFormatSnafu {
            path: self.path_str(),
        })?;
        fs::write(&self.path, contents).context(StoreWriteSnafu {
            path: self.path_str(),
        })
    }
}

impl RecordStore for JsonFileStore {
    fn upsert(&mut self, record: &BallotRecord) -> PoolResult<()> {
        let mut records = self.read_all()?;
        debug!("upsert: writing ballot {} to {}", record.id, self.path_str());
        records.insert(record.id.clone(), StoredBallot::from_model(record));
        self.write_all(&records)
    }

    fn fetch(&self, id: &str) -> PoolResult<Option<BallotRecord>> {
        let records = self.read_all()?;
        Ok(records.get(id).map(|s| s.to_model()))
    }

    fn fetch_many(&self, ids: &[String]) -> PoolResult<Vec<BallotRecord>> {
        let wanted: HashSet<&String> = ids.iter().collect();
        let records = self.read_all()?;
        Ok(records
            .values()
            .filter(|s| wanted.contains(&s.id))
            .map(|s| s.to_model())
            .collect())
    }

    fn update_winners(
        &mut self,
        id: &str,
        winners: &BTreeMap<String, String>,
    ) -> PoolResult<()> {
        let mut records = self.read_all()?;
        let record = records.get_mut(id).context(NotFoundSnafu { id })?;
        record.winners = winners.clone();
        self.write_all(&records)
    }

    fn delete(&mut self, id: &str) -> PoolResult<()> {
        let mut records = self.read_all()?;
        if records.remove(id).is_some() {
            self.write_all(&records)?;
        }
        Ok(())
    }
}

/// In-memory store used by the test battery. `fail_writes` makes every
/// mutation fail, to exercise the optimistic-write paths.
#[derive(Default)]
pub struct MemoryStore {
    pub records: BTreeMap<String, BallotRecord>,
    pub fail_writes: bool,
}

impl MemoryStore {
    fn check_writable(&self) -> PoolResult<()> {
        if self.fail_writes {
            whatever!("memory store is refusing writes");
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn upsert(&mut self, record: &BallotRecord) -> PoolResult<()> {
        self.check_writable()?;
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn fetch(&self, id: &str) -> PoolResult<Option<BallotRecord>> {
        Ok(self.records.get(id).cloned())
    }

    fn fetch_many(&self, ids: &[String]) -> PoolResult<Vec<BallotRecord>> {
        let wanted: HashSet<&String> = ids.iter().collect();
        Ok(self
            .records
            .values()
            .filter(|r| wanted.contains(&r.id))
            .cloned()
            .collect())
    }

    fn update_winners(
        &mut self,
        id: &str,
        winners: &BTreeMap<String, String>,
    ) -> PoolResult<()> {
        self.check_writable()?;
        let record = self.records.get_mut(id).context(NotFoundSnafu { id })?;
        record.winners = winners.clone();
        Ok(())
    }

    fn delete(&mut self, id: &str) -> PoolResult<()> {
        self.check_writable()?;
        self.records.remove(id);
        Ok(())
    }
}
