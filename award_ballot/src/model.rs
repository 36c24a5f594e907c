// ********* Ballot data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use chrono::{DateTime, Utc};

/// The two slots of a per-category pick.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum PickSlot {
    /// The nominee the voter predicts will win.
    WillWin,
    /// The nominee the voter wishes would win.
    WantWin,
}

/// A per-category choice. Both slots are optional and independent: they
/// may be equal, differ, or each be absent.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Pick {
    pub will_win: Option<String>,
    pub want_win: Option<String>,
}

impl Pick {
    pub fn is_empty(&self) -> bool {
        self.will_win.is_none() && self.want_win.is_none()
    }

    pub fn slot(&self, slot: PickSlot) -> Option<&str> {
        match slot {
            PickSlot::WillWin => self.will_win.as_deref(),
            PickSlot::WantWin => self.want_win.as_deref(),
        }
    }
}

/// One ballot as stored in the record store.
///
/// The winners map is private to this ballot: every record carries its
/// own, possibly contradictory, view of the announced winners. There is
/// no global winners source; reconciling disagreement between records is
/// the scoreboard's job.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotRecord {
    /// Opaque sharing key, generated at first save and immutable after.
    pub id: String,
    pub voter_name: String,
    /// Category name to pick. Sparse: categories with no pick are absent.
    pub picks: BTreeMap<String, Pick>,
    /// Category name to announced winner. Sparse: absent = unannounced.
    pub winners: BTreeMap<String, String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl BallotRecord {
    pub fn winner_count(&self) -> usize {
        self.winners.len()
    }
}

/// A single ballot's score against some winners map. Derived, never
/// stored.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct Score {
    /// Categories where the `will_win` pick matched the winner.
    pub correct: u32,
    /// Categories where the `want_win` pick matched the winner.
    pub heart_correct: u32,
    /// The number of announced categories in the winners map scored
    /// against. Not the fixed category count.
    pub total: u32,
}

/// One leaderboard row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoreboardEntry {
    pub id: String,
    pub name: String,
    pub score: Score,
}

/// A category where another ballot's declared winner disagrees with the
/// source ballot's. A data-quality signal, never auto-resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Mismatch {
    pub category: String,
    pub source_winner: String,
    pub other_ballot_name: String,
    pub other_winner: String,
    pub other_ballot_id: String,
}

/// The ballot whose winners map was chosen as the scoreboard's source of
/// truth.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoreboardSource {
    pub ballot_id: String,
    pub name: String,
    pub winner_count: usize,
}

/// The cross-ballot leaderboard and winner-disagreement report.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Scoreboard {
    /// Absent when no fetched ballot has any winner marked.
    pub source: Option<ScoreboardSource>,
    pub entries: Vec<ScoreboardEntry>,
    pub mismatches: Vec<Mismatch>,
}

impl Scoreboard {
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }
}

/// Errors raised by the ballot model and picks engine.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotError {
    UnknownCategory(String),
    UnknownNominee { category: String, nominee: String },
    EmptyVoterName,
    /// The categories still lacking a `will_win` pick, in catalog order.
    IncompleteBallot(Vec<String>),
}

impl Error for BallotError {}

impl Display for BallotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotError::UnknownCategory(c) => {
                write!(f, "category {:?} is not part of this contest", c)
            }
            BallotError::UnknownNominee { category, nominee } => {
                write!(f, "{:?} is not nominated for {:?}", nominee, category)
            }
            BallotError::EmptyVoterName => write!(f, "the ballot has no voter name"),
            BallotError::IncompleteBallot(missing) => write!(
                f,
                "{} categories have no \"will win\" pick: {}",
                missing.len(),
                missing.join(", ")
            ),
        }
    }
}
