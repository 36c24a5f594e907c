use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use log::debug;

use crate::catalog;
use crate::model::{BallotError, BallotRecord, Pick, PickSlot};

/// A ballot being authored or edited.
///
/// The draft owns the per-category picks and enforces the catalog
/// invariants: a slot is always either absent or one of that category's
/// nominee labels, and selecting a value replaces (never accumulates)
/// the previous one.
///
/// ```
/// use award_ballot::{BallotDraft, PickSlot};
///
/// let mut draft = BallotDraft::new("Ada");
/// draft.set_pick("Best Picture", PickSlot::WillWin, Some("Sinners"))?;
///
/// // Toggling the same nominee again clears the slot.
/// draft.toggle_pick("Best Picture", PickSlot::WillWin, "Sinners")?;
/// assert!(draft.picks().is_empty());
/// # Ok::<(), award_ballot::BallotError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotDraft {
    voter_name: String,
    picks: BTreeMap<String, Pick>,
    dirty: bool,
}

impl BallotDraft {
    pub fn new(voter_name: &str) -> BallotDraft {
        BallotDraft {
            voter_name: voter_name.to_string(),
            picks: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Reopens a stored ballot for editing. The winners map is not part
    /// of the draft; it lives on the record and is mutated separately.
    pub fn from_record(record: &BallotRecord) -> BallotDraft {
        BallotDraft {
            voter_name: record.voter_name.clone(),
            picks: record.picks.clone(),
            dirty: false,
        }
    }

    pub fn voter_name(&self) -> &str {
        &self.voter_name
    }

    pub fn set_voter_name(&mut self, name: &str) {
        self.voter_name = name.to_string();
        self.dirty = true;
    }

    pub fn picks(&self) -> &BTreeMap<String, Pick> {
        &self.picks
    }

    /// True once any mutation happened since the draft was created or
    /// loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces the slot's value. `None` clears it. At most one value
    /// per slot ever exists.
    pub fn set_pick(
        &mut self,
        category: &str,
        slot: PickSlot,
        nominee: Option<&str>,
    ) -> Result<(), BallotError> {
        if let Some(n) = nominee {
            catalog::require_nominee(category, n)?;
        } else if catalog::find_category(category).is_none() {
            return Err(BallotError::UnknownCategory(category.to_string()));
        }
        debug!("set_pick: {:?} {:?} -> {:?}", category, slot, nominee);
        let pick = self.picks.entry(category.to_string()).or_default();
        match slot {
            PickSlot::WillWin => pick.will_win = nominee.map(|s| s.to_string()),
            PickSlot::WantWin => pick.want_win = nominee.map(|s| s.to_string()),
        }
        if pick.is_empty() {
            self.picks.remove(category);
        }
        self.dirty = true;
        Ok(())
    }

    /// Selects `nominee` for the slot, or clears the slot when it
    /// already holds that nominee. Returns whether the slot is set
    /// afterwards.
    pub fn toggle_pick(
        &mut self,
        category: &str,
        slot: PickSlot,
        nominee: &str,
    ) -> Result<bool, BallotError> {
        let current = self
            .picks
            .get(category)
            .and_then(|p| p.slot(slot))
            .map(|s| s.to_string());
        if current.as_deref() == Some(nominee) {
            self.set_pick(category, slot, None)?;
            Ok(false)
        } else {
            self.set_pick(category, slot, Some(nominee))?;
            Ok(true)
        }
    }

    /// The categories still lacking a `will_win` pick, in catalog order.
    pub fn missing_will_win(&self) -> Vec<String> {
        catalog::category_names()
            .filter(|cat| {
                self.picks
                    .get(*cat)
                    .and_then(|p| p.will_win.as_ref())
                    .is_none()
            })
            .map(|cat| cat.to_string())
            .collect()
    }

    /// The number of categories with a `will_win` pick.
    pub fn completed_count(&self) -> usize {
        catalog::CATEGORY_COUNT - self.missing_will_win().len()
    }

    /// Freezes the draft into a storable record.
    ///
    /// The voter name must be non-blank; completeness is the caller's
    /// decision (an incomplete ballot may be force-saved).
    pub fn into_record(
        self,
        id: String,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<BallotRecord, BallotError> {
        if self.voter_name.trim().is_empty() {
            return Err(BallotError::EmptyVoterName);
        }
        Ok(BallotRecord {
            id,
            voter_name: self.voter_name,
            picks: self.picks,
            winners: BTreeMap::new(),
            created_at,
        })
    }
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a short sharing key: 8 lowercase alphanumeric characters.
///
/// Random in this context means hard to guess in advance, not
/// cryptographically bound to anything: the token is derived by hashing
/// the current time, a process-local counter and the seed string.
pub fn generate_ballot_id(seed: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let digest = sha256::digest(format!("{:032}{:08}{}", nanos, n, seed));
    digest[..8].to_string()
}
