use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use snafu::{prelude::*, Snafu};

use chrono::Utc;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use award_ballot::{
    build_scoreboard, find_category, require_nominee, score_ballot, BallotDraft, BallotError,
    BallotRecord, PickSlot, Scoreboard, CATALOG, CATEGORY_COUNT,
};

use crate::args::{Args, Command};
use crate::pool::index::LocalIndex;
use crate::pool::store::{JsonFileStore, RecordStore};
use crate::pool::wire::StoredPick;

pub mod index;
pub mod store;

/// Base used for share links when no --base-url is given.
pub const DEFAULT_BASE_URL: &str = "https://oscarpool.app/";

#[derive(Debug, Snafu)]
pub enum PoolError {
    #[snafu(display("ballot {id} was not found in the store"))]
    NotFound { id: String },

    #[snafu(display("please enter your name before saving"))]
    MissingName {},

    #[snafu(display(
        "{} categories have no \"will win\" pick: {}. Complete the ballot or re-run with --force",
        missing.len(),
        missing.join(", ")
    ))]
    IncompleteBallot { missing: Vec<String> },

    #[snafu(display("invalid ballot: {source}"))]
    InvalidBallot { source: BallotError },

    #[snafu(display("could not read the ballot store at {path}"))]
    StoreRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("could not write the ballot store at {path}"))]
    StoreWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("the ballot store at {path} is not valid JSON"))]
    StoreFormat {
        source: serde_json::Error,
        path: String,
    },

    #[snafu(display("could not read the local ballot index at {path}"))]
    IndexRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("could not write the local ballot index at {path}"))]
    IndexWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("the local ballot index at {path} is not valid JSON"))]
    IndexFormat {
        source: serde_json::Error,
        path: String,
    },

    #[snafu(display("could not open the picks file {path}"))]
    OpeningPicks {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("could not parse the picks file {path}"))]
    ParsingPicks {
        source: serde_json::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PoolResult<T> = Result<T, PoolError>;

pub mod wire {
    //! The stored shape of a ballot record, mirroring the library model.
    //! Pick slots keep their historical camelCase keys; record columns are
    //! snake_case.

    use std::collections::BTreeMap;

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    use award_ballot::{BallotRecord, Pick};

    #[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
    pub struct StoredPick {
        #[serde(rename = "willWin", default, skip_serializing_if = "Option::is_none")]
        pub will_win: Option<String>,
        #[serde(rename = "wantWin", default, skip_serializing_if = "Option::is_none")]
        pub want_win: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct StoredBallot {
        pub id: String,
        pub voter_name: String,
        #[serde(default)]
        pub picks: BTreeMap<String, StoredPick>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        pub winners: BTreeMap<String, String>,
        #[serde(default)]
        pub created_at: Option<DateTime<Utc>>,
    }

    impl StoredBallot {
        pub fn from_model(record: &BallotRecord) -> StoredBallot {
            StoredBallot {
                id: record.id.clone(),
                voter_name: record.voter_name.clone(),
                picks: record
                    .picks
                    .iter()
                    .map(|(c, p)| {
                        (
                            c.clone(),
                            StoredPick {
                                will_win: p.will_win.clone(),
                                want_win: p.want_win.clone(),
                            },
                        )
                    })
                    .collect(),
                winners: record.winners.clone(),
                created_at: record.created_at,
            }
        }

        pub fn to_model(&self) -> BallotRecord {
            BallotRecord {
                id: self.id.clone(),
                voter_name: self.voter_name.clone(),
                picks: self
                    .picks
                    .iter()
                    .map(|(c, p)| {
                        (
                            c.clone(),
                            Pick {
                                will_win: p.will_win.clone(),
                                want_win: p.want_win.clone(),
                            },
                        )
                    })
                    .collect(),
                winners: self.winners.clone(),
                created_at: self.created_at,
            }
        }
    }
}

// **** Share links ****

pub fn ballot_link(base: &str, id: &str) -> String {
    format!("{}?ballot={}", base.trim_end_matches('?'), id)
}

/// Accepts either a bare ballot id or a share link carrying a
/// `ballot=<id>` query parameter.
pub fn parse_ballot_ref(input: &str) -> String {
    if let Some(pos) = input.find("ballot=") {
        let rest = &input[pos + "ballot=".len()..];
        rest.split('&').next().unwrap_or("").to_string()
    } else {
        input.trim().to_string()
    }
}

// **** Flows ****

fn draft_from_picks(
    name: &str,
    picks: &BTreeMap<String, StoredPick>,
) -> PoolResult<BallotDraft> {
    let mut draft = BallotDraft::new(name);
    for (category, p) in picks.iter() {
        if let Some(n) = &p.will_win {
            draft
                .set_pick(category, PickSlot::WillWin, Some(n))
                .context(InvalidBallotSnafu)?;
        }
        if let Some(n) = &p.want_win {
            draft
                .set_pick(category, PickSlot::WantWin, Some(n))
                .context(InvalidBallotSnafu)?;
        }
    }
    Ok(draft)
}

/// Saves a ballot: validates the name locally, refuses an incomplete
/// ballot unless forced, generates the sharing id on first save, upserts
/// the record and only then registers the id in the "mine" list.
///
/// A failure of the remote write is surfaced to the caller; the local
/// index is left untouched in that case.
pub fn save_ballot(
    store: &mut dyn RecordStore,
    index: &mut LocalIndex,
    name: &str,
    picks: &BTreeMap<String, StoredPick>,
    existing_id: Option<String>,
    force: bool,
) -> PoolResult<BallotRecord> {
    ensure!(!name.trim().is_empty(), MissingNameSnafu);
    let draft = draft_from_picks(name, picks)?;
    let missing = draft.missing_will_win();
    if !missing.is_empty() && !force {
        info!(
            "save_ballot: refusing incomplete ballot, {} categories missing",
            missing.len()
        );
        return IncompleteBallotSnafu { missing }.fail();
    }
    let id = existing_id.unwrap_or_else(|| award_ballot::generate_ballot_id(name));
    let mut record = draft
        .into_record(id.clone(), Some(Utc::now()))
        .context(InvalidBallotSnafu)?;
    // Re-saving an edited ballot must not wipe winners already marked on
    // the stored record.
    if let Some(previous) = store.fetch(&id)? {
        record.winners = previous.winners;
    }
    store.upsert(&record)?;
    index.add_mine(&id, name)?;
    info!("save_ballot: saved ballot {} for {}", id, name);
    Ok(record)
}

/// Fetches a ballot by id or share link. An unknown id is not an error:
/// the caller falls back to the home view. A fetched ballot that is not
/// one of mine is registered under "shared".
pub fn load_ballot(
    store: &dyn RecordStore,
    index: &mut LocalIndex,
    ballot_ref: &str,
) -> PoolResult<Option<BallotRecord>> {
    let id = parse_ballot_ref(ballot_ref);
    let record = match store.fetch(&id)? {
        Some(r) => r,
        None => {
            warn!("load_ballot: no record for {}", id);
            return Ok(None);
        }
    };
    if !index.is_mine(&id) {
        index.add_shared(&id, &record.voter_name)?;
    }
    Ok(Some(record))
}

/// Marks the announced winner of one category on a ballot: the local
/// copy is updated first, then a partial update of just the winners
/// field is attempted. A failed remote write is logged and swallowed;
/// the returned record keeps the local state as the visible truth, and a
/// later fetch reconciles to whatever the store last accepted.
pub fn mark_winner(
    store: &mut dyn RecordStore,
    ballot_ref: &str,
    category: &str,
    nominee: &str,
) -> PoolResult<BallotRecord> {
    let id = parse_ballot_ref(ballot_ref);
    require_nominee(category, nominee).context(InvalidBallotSnafu)?;
    let mut record = store.fetch(&id)?.context(NotFoundSnafu { id: id.clone() })?;
    record
        .winners
        .insert(category.to_string(), nominee.to_string());
    if let Err(e) = store.update_winners(&id, &record.winners) {
        warn!(
            "mark_winner: remote update failed for {}, keeping local state: {}",
            id, e
        );
    }
    Ok(record)
}

/// Clears the announced winner of one category, reverting it to
/// unannounced. Same optimistic-write discipline as [mark_winner].
pub fn unmark_winner(
    store: &mut dyn RecordStore,
    ballot_ref: &str,
    category: &str,
) -> PoolResult<BallotRecord> {
    let id = parse_ballot_ref(ballot_ref);
    find_category(category)
        .ok_or_else(|| BallotError::UnknownCategory(category.to_string()))
        .context(InvalidBallotSnafu)?;
    let mut record = store.fetch(&id)?.context(NotFoundSnafu { id: id.clone() })?;
    record.winners.remove(category);
    if let Err(e) = store.update_winners(&id, &record.winners) {
        warn!(
            "unmark_winner: remote update failed for {}, keeping local state: {}",
            id, e
        );
    }
    Ok(record)
}

/// Deletes one of my ballots: drops it from the "mine" list and then
/// deletes the stored record. A failed remote delete is logged and
/// swallowed.
pub fn delete_ballot(
    store: &mut dyn RecordStore,
    index: &mut LocalIndex,
    id: &str,
) -> PoolResult<bool> {
    if !index.remove_mine(id)? {
        warn!("delete_ballot: {} is not one of my ballots", id);
        return Ok(false);
    }
    if let Err(e) = store.delete(id) {
        warn!("delete_ballot: remote delete failed for {}: {}", id, e);
    }
    Ok(true)
}

/// Builds the scoreboard over every ballot this device knows about. An
/// empty index yields an empty scoreboard without touching the store.
pub fn load_scoreboard(store: &dyn RecordStore, index: &LocalIndex) -> PoolResult<Scoreboard> {
    let ids = index.ballot_ids();
    if ids.is_empty() {
        debug!("load_scoreboard: no known ballots, skipping the fetch");
        return Ok(Scoreboard::default());
    }
    let records = store.fetch_many(&ids)?;
    Ok(build_scoreboard(&records))
}

// **** Blank template ****

/// The full catalog as a fillable JSON document: every category with its
/// nominee slate and empty willWin/wantWin slots.
pub fn blank_template_js() -> JSValue {
    let mut categories = JSMap::new();
    for c in CATALOG.iter() {
        categories.insert(
            c.name.to_string(),
            json!({
                "nominees": c.nominees,
                "willWin": JSValue::Null,
                "wantWin": JSValue::Null,
            }),
        );
    }
    JSValue::Object(categories)
}

fn read_picks_file(path: &str) -> PoolResult<BTreeMap<String, StoredPick>> {
    let contents = fs::read_to_string(path).context(OpeningPicksSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingPicksSnafu { path })
}

// **** CLI wiring ****

fn resolve_data_dir(args: &Args) -> PathBuf {
    if let Some(dir) = &args.data_dir {
        return PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("OSCARPOOL_DATA") {
        return PathBuf::from(dir);
    }
    match std::env::var("HOME") {
        Ok(home) => Path::new(&home).join(".oscarpool"),
        Err(_) => PathBuf::from(".oscarpool"),
    }
}

pub fn run(args: &Args) -> PoolResult<()> {
    let data_dir = resolve_data_dir(args);
    let index_path = data_dir.join("index.json");
    let store_path = args
        .store
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("ballots.json"));
    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    debug!(
        "run: index at {}, store at {}",
        index_path.display(),
        store_path.display()
    );
    let mut index = LocalIndex::load(&index_path)?;
    let mut store = JsonFileStore::new(&store_path);

    match &args.command {
        Command::Blank { out } => {
            let template = serde_json::to_string_pretty(&blank_template_js())
                .whatever_context("could not render the blank template")?;
            match out {
                Some(path) => {
                    fs::write(path, template)
                        .whatever_context(format!("could not write the template to {}", path))?;
                    println!("Blank ballot written to {}", path);
                }
                None => println!("{}", template),
            }
        }
        Command::Save {
            name,
            picks,
            id,
            force,
        } => {
            let picks_map = read_picks_file(picks)?;
            let record = save_ballot(&mut store, &mut index, name, &picks_map, id.clone(), *force)?;
            let picked = record
                .picks
                .values()
                .filter(|p| p.will_win.is_some())
                .count();
            println!("Ballot saved! ({}/{} categories picked)", picked, CATEGORY_COUNT);
            println!("Share link: {}", ballot_link(&base_url, &record.id));
        }
        Command::View { ballot } => match load_ballot(&store, &mut index, ballot)? {
            Some(record) => print_ballot(&record),
            None => {
                println!("Ballot not found.");
                print_home(&index);
            }
        },
        Command::Mark {
            ballot,
            category,
            nominee,
        } => {
            let record = mark_winner(&mut store, ballot, category, nominee)?;
            println!("{}: winner is {}", category, nominee);
            print_score_line(&record);
        }
        Command::Unmark { ballot, category } => {
            let record = unmark_winner(&mut store, ballot, category)?;
            println!("{}: winner cleared", category);
            print_score_line(&record);
        }
        Command::List => print_home(&index),
        Command::Delete { id } => {
            if delete_ballot(&mut store, &mut index, id)? {
                println!("Deleted ballot {}", id);
            } else {
                println!("{} is not one of my ballots, nothing deleted", id);
            }
        }
        Command::Remove { id } => {
            if index.remove_shared(id)? {
                println!("Removed {} from the shared list", id);
            } else {
                println!("{} is not in the shared list", id);
            }
        }
        Command::Scoreboard => {
            let scoreboard = load_scoreboard(&store, &index)?;
            print_scoreboard(&scoreboard);
        }
    }
    Ok(())
}

// **** Rendering ****

fn print_score_line(record: &BallotRecord) {
    let score = score_ballot(&record.picks, &record.winners);
    if score.total > 0 {
        let hearts = if score.heart_correct > 0 {
            format!(", {} heart picks won", score.heart_correct)
        } else {
            String::new()
        };
        println!(
            "{}'s score: {}/{}{}",
            record.voter_name, score.correct, score.total, hearts
        );
    }
}

fn print_ballot(record: &BallotRecord) {
    println!("{}'s Ballot ({})", record.voter_name, record.id);
    print_score_line(record);
    println!();
    for (idx, category) in award_ballot::category_names().enumerate() {
        println!("{:2}. {}", idx + 1, category);
        let pick = record.picks.get(category);
        let will = pick.and_then(|p| p.will_win.as_deref());
        let want = pick.and_then(|p| p.want_win.as_deref());
        let winner = record.winners.get(category).map(|s| s.as_str());
        if let Some(n) = will {
            let marker = match winner {
                Some(w) if w == n => " [correct]",
                Some(_) if want == winner => " [wrong, but the heart was right]",
                Some(_) => " [wrong]",
                None => "",
            };
            println!("      will win: {}{}", n, marker);
        }
        if let Some(n) = want {
            if Some(n) != will {
                println!("      want win: {}", n);
            }
        }
        if let Some(w) = winner {
            println!("      winner:   {}", w);
        }
    }
}

fn print_home(index: &LocalIndex) {
    if index.mine().is_empty() && index.shared().is_empty() {
        println!("No ballots yet. Make your picks, share with friends, score as you watch!");
        return;
    }
    if !index.mine().is_empty() {
        println!("My ballots:");
        for e in index.mine() {
            println!("  {}  {}'s ballot", e.id, e.name);
        }
    }
    if !index.shared().is_empty() {
        println!("Shared with me:");
        for e in index.shared() {
            println!("  {}  {}'s ballot", e.id, e.name);
        }
    }
}

fn print_scoreboard(scoreboard: &Scoreboard) {
    let source = match &scoreboard.source {
        Some(s) => s,
        None => {
            println!("No winners have been marked yet. View a ballot and start marking winners!");
            return;
        }
    };
    println!(
        "Scoreboard: {}/{} announced, winners from {}'s ballot",
        source.winner_count, CATEGORY_COUNT, source.name
    );
    println!();
    for (idx, entry) in scoreboard.entries.iter().enumerate() {
        println!(
            "{:2}. {:<24} {:>2}/{}  hearts {}/{}",
            idx + 1,
            entry.name,
            entry.score.correct,
            entry.score.total,
            entry.score.heart_correct,
            entry.score.total
        );
    }
    if !scoreboard.mismatches.is_empty() {
        println!();
        println!("Winner mismatches:");
        for m in scoreboard.mismatches.iter() {
            println!(
                "  {}: {:?} vs {}'s {:?}",
                m.category, m.source_winner, m.other_ballot_name, m.other_winner
            );
        }
        println!("To fix: update the winner on the mismatched ballot.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::store::MemoryStore;
    use crate::pool::wire::StoredBallot;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(test: &str, file: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("oscarpool-test-{}-{}", test, nanos))
            .join(file)
    }

    fn full_picks() -> BTreeMap<String, StoredPick> {
        CATALOG
            .iter()
            .map(|c| {
                (
                    c.name.to_string(),
                    StoredPick {
                        will_win: Some(c.nominees[0].to_string()),
                        want_win: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn parse_ballot_ref_accepts_ids_and_links() {
        assert_eq!(parse_ballot_ref("a1b2c3d4"), "a1b2c3d4");
        assert_eq!(parse_ballot_ref("  a1b2c3d4 "), "a1b2c3d4");
        assert_eq!(
            parse_ballot_ref("https://oscarpool.app/?ballot=a1b2c3d4"),
            "a1b2c3d4"
        );
        assert_eq!(
            parse_ballot_ref("https://oscarpool.app/?x=1&ballot=a1b2c3d4&y=2"),
            "a1b2c3d4"
        );
    }

    #[test]
    fn links_round_trip() {
        let link = ballot_link(DEFAULT_BASE_URL, "deadbeef");
        assert_eq!(parse_ballot_ref(&link), "deadbeef");
    }

    #[test]
    fn stored_ballot_reads_the_historical_format() {
        let raw = r#"{
            "id": "a1b2c3d4",
            "voter_name": "Ada",
            "picks": {
                "Best Picture": { "willWin": "Sinners", "wantWin": "Hamnet" },
                "Best Sound": { "willWin": "F1" }
            },
            "winners": { "Best Picture": "Sinners" },
            "created_at": "2026-03-15T18:00:00Z"
        }"#;
        let stored: StoredBallot = serde_json::from_str(raw).unwrap();
        let record = stored.to_model();
        assert_eq!(record.voter_name, "Ada");
        assert_eq!(
            record.picks.get("Best Picture").unwrap().will_win.as_deref(),
            Some("Sinners")
        );
        assert_eq!(record.picks.get("Best Sound").unwrap().want_win, None);
        assert_eq!(record.winners.get("Best Picture").unwrap(), "Sinners");
        assert!(record.created_at.is_some());
    }

    #[test]
    fn save_requires_a_name_before_any_store_call() {
        let mut store = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        let mut index = LocalIndex::load(&temp_path("save-name", "index.json")).unwrap();
        let err = save_ballot(&mut store, &mut index, "  ", &full_picks(), None, false)
            .unwrap_err();
        // A failing store would have produced a different error if it had
        // been touched.
        assert!(matches!(err, PoolError::MissingName {}));
    }

    #[test]
    fn save_refuses_an_incomplete_ballot_unless_forced() {
        let mut store = MemoryStore::default();
        let mut index = LocalIndex::load(&temp_path("save-incomplete", "index.json")).unwrap();
        let mut picks = BTreeMap::new();
        picks.insert(
            "Best Picture".to_string(),
            StoredPick {
                will_win: Some("Sinners".to_string()),
                want_win: None,
            },
        );
        let err =
            save_ballot(&mut store, &mut index, "Ada", &picks, None, false).unwrap_err();
        match err {
            PoolError::IncompleteBallot { missing } => {
                assert_eq!(missing.len(), 19);
                assert_eq!(missing[0], "Best Director");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(store.records.is_empty());
        assert!(index.mine().is_empty());

        let record =
            save_ballot(&mut store, &mut index, "Ada", &picks, None, true).unwrap();
        assert_eq!(record.id.len(), 8);
        assert!(store.records.contains_key(&record.id));
        assert!(index.is_mine(&record.id));
    }

    #[test]
    fn save_registers_mine_only_after_the_write_succeeded() {
        let mut store = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        let mut index = LocalIndex::load(&temp_path("save-gated", "index.json")).unwrap();
        let err =
            save_ballot(&mut store, &mut index, "Ada", &full_picks(), None, false).unwrap_err();
        assert!(matches!(err, PoolError::Whatever { .. }));
        assert!(index.mine().is_empty());
    }

    #[test]
    fn resave_keeps_the_id_and_the_marked_winners() {
        let mut store = MemoryStore::default();
        let mut index = LocalIndex::load(&temp_path("resave", "index.json")).unwrap();
        let record =
            save_ballot(&mut store, &mut index, "Ada", &full_picks(), None, false).unwrap();
        let id = record.id.clone();
        mark_winner(&mut store, &id, "Best Picture", "Sinners").unwrap();

        let mut picks = full_picks();
        picks.get_mut("Best Picture").unwrap().will_win = Some("Hamnet".to_string());
        let updated = save_ballot(
            &mut store,
            &mut index,
            "Ada",
            &picks,
            Some(id.clone()),
            false,
        )
        .unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.winners.get("Best Picture").unwrap(), "Sinners");
        assert_eq!(index.mine().len(), 1);
    }

    #[test]
    fn mark_winner_keeps_local_state_when_the_remote_write_fails() {
        let mut store = MemoryStore::default();
        let record = BallotRecord {
            id: "a1b2c3d4".to_string(),
            voter_name: "Ada".to_string(),
            picks: BTreeMap::new(),
            winners: BTreeMap::new(),
            created_at: None,
        };
        store.records.insert(record.id.clone(), record);
        store.fail_writes = true;

        let local = mark_winner(&mut store, "a1b2c3d4", "Best Picture", "Sinners").unwrap();
        assert_eq!(local.winners.get("Best Picture").unwrap(), "Sinners");
        // The store never saw the write; a refresh would reconcile to it.
        assert!(store.records.get("a1b2c3d4").unwrap().winners.is_empty());
    }

    #[test]
    fn unmark_winner_reverts_a_category_to_unannounced() {
        let mut store = MemoryStore::default();
        let mut winners = BTreeMap::new();
        winners.insert("Best Picture".to_string(), "Sinners".to_string());
        let record = BallotRecord {
            id: "a1b2c3d4".to_string(),
            voter_name: "Ada".to_string(),
            picks: BTreeMap::new(),
            winners,
            created_at: None,
        };
        store.records.insert(record.id.clone(), record);

        let local = unmark_winner(&mut store, "a1b2c3d4", "Best Picture").unwrap();
        assert!(local.winners.is_empty());
        assert!(store.records.get("a1b2c3d4").unwrap().winners.is_empty());
    }

    #[test]
    fn mark_winner_validates_the_nominee() {
        let mut store = MemoryStore::default();
        let err =
            mark_winner(&mut store, "a1b2c3d4", "Best Picture", "Paddington 4").unwrap_err();
        assert!(matches!(err, PoolError::InvalidBallot { .. }));
    }

    #[test]
    fn loading_a_shared_ballot_registers_it_once() {
        let mut store = MemoryStore::default();
        let record = BallotRecord {
            id: "a1b2c3d4".to_string(),
            voter_name: "Bea".to_string(),
            picks: BTreeMap::new(),
            winners: BTreeMap::new(),
            created_at: None,
        };
        store.records.insert(record.id.clone(), record);
        let mut index = LocalIndex::load(&temp_path("load-shared", "index.json")).unwrap();

        let link = ballot_link(DEFAULT_BASE_URL, "a1b2c3d4");
        let loaded = load_ballot(&store, &mut index, &link).unwrap().unwrap();
        assert_eq!(loaded.voter_name, "Bea");
        assert_eq!(index.shared().len(), 1);

        // Loading again replaces the entry instead of duplicating it.
        load_ballot(&store, &mut index, "a1b2c3d4").unwrap().unwrap();
        assert_eq!(index.shared().len(), 1);
    }

    #[test]
    fn loading_an_unknown_id_falls_back_without_an_error() {
        let store = MemoryStore::default();
        let mut index = LocalIndex::load(&temp_path("load-missing", "index.json")).unwrap();
        assert!(load_ballot(&store, &mut index, "nosuchid").unwrap().is_none());
        assert!(index.shared().is_empty());
    }

    #[test]
    fn add_shared_is_a_noop_for_my_own_ballots() {
        let path = temp_path("shared-noop", "index.json");
        let mut index = LocalIndex::load(&path).unwrap();
        index.add_mine("a1b2c3d4", "Ada").unwrap();
        assert!(!index.add_shared("a1b2c3d4", "Ada").unwrap());
        assert!(index.shared().is_empty());
        // The check reads the persisted file, so a fresh load agrees.
        let mut reloaded = LocalIndex::load(&path).unwrap();
        assert!(!reloaded.add_shared("a1b2c3d4", "Ada").unwrap());
        assert!(reloaded.shared().is_empty());
    }

    #[test]
    fn delete_removes_the_record_and_the_index_entry() {
        let mut store = MemoryStore::default();
        let mut index = LocalIndex::load(&temp_path("delete", "index.json")).unwrap();
        let record =
            save_ballot(&mut store, &mut index, "Ada", &full_picks(), None, false).unwrap();
        assert!(delete_ballot(&mut store, &mut index, &record.id).unwrap());
        assert!(store.records.is_empty());
        assert!(index.mine().is_empty());
        // Deleting a ballot that is not mine does nothing.
        assert!(!delete_ballot(&mut store, &mut index, "nosuchid").unwrap());
    }

    #[test]
    fn remove_shared_is_local_only() {
        let mut store = MemoryStore::default();
        let record = BallotRecord {
            id: "a1b2c3d4".to_string(),
            voter_name: "Bea".to_string(),
            picks: BTreeMap::new(),
            winners: BTreeMap::new(),
            created_at: None,
        };
        store.records.insert(record.id.clone(), record);
        let mut index = LocalIndex::load(&temp_path("remove-shared", "index.json")).unwrap();
        index.add_shared("a1b2c3d4", "Bea").unwrap();
        assert!(index.remove_shared("a1b2c3d4").unwrap());
        assert!(index.shared().is_empty());
        assert!(store.records.contains_key("a1b2c3d4"));
    }

    #[test]
    fn scoreboard_with_no_known_ballots_skips_the_store() {
        // A store that fails every read would error if it were touched.
        struct ExplodingStore;
        impl RecordStore for ExplodingStore {
            fn upsert(&mut self, _: &BallotRecord) -> PoolResult<()> {
                whatever!("not expected")
            }
            fn fetch(&self, _: &str) -> PoolResult<Option<BallotRecord>> {
                whatever!("not expected")
            }
            fn fetch_many(&self, _: &[String]) -> PoolResult<Vec<BallotRecord>> {
                whatever!("not expected")
            }
            fn update_winners(
                &mut self,
                _: &str,
                _: &BTreeMap<String, String>,
            ) -> PoolResult<()> {
                whatever!("not expected")
            }
            fn delete(&mut self, _: &str) -> PoolResult<()> {
                whatever!("not expected")
            }
        }
        let index = LocalIndex::load(&temp_path("sb-empty", "index.json")).unwrap();
        let scoreboard = load_scoreboard(&ExplodingStore, &index).unwrap();
        assert!(scoreboard.is_empty());
    }

    #[test]
    fn scoreboard_spans_mine_and_shared() {
        let mut store = MemoryStore::default();
        let mut index = LocalIndex::load(&temp_path("sb-union", "index.json")).unwrap();
        let mine =
            save_ballot(&mut store, &mut index, "Ada", &full_picks(), None, false).unwrap();
        let other = BallotRecord {
            id: "their123".to_string(),
            voter_name: "Bea".to_string(),
            picks: BTreeMap::new(),
            winners: BTreeMap::new(),
            created_at: None,
        };
        store.records.insert(other.id.clone(), other);
        index.add_shared("their123", "Bea").unwrap();

        mark_winner(&mut store, &mine.id, "Best Picture", "Bugonia").unwrap();
        let scoreboard = load_scoreboard(&store, &index).unwrap();
        let source = scoreboard.source.as_ref().unwrap();
        assert_eq!(source.ballot_id, mine.id);
        assert_eq!(scoreboard.entries.len(), 2);
        // Ada picked the first nominee of every category, so her source
        // winner is also her pick.
        assert_eq!(scoreboard.entries[0].name, "Ada");
        assert_eq!(scoreboard.entries[0].score.correct, 1);
        assert_eq!(scoreboard.entries[1].score.total, 1);
    }

    #[test]
    fn json_file_store_round_trips_records() {
        let path = temp_path("file-store", "ballots.json");
        let mut store = JsonFileStore::new(&path);
        let record = BallotRecord {
            id: "a1b2c3d4".to_string(),
            voter_name: "Ada".to_string(),
            picks: BTreeMap::new(),
            winners: BTreeMap::new(),
            created_at: Some(Utc::now()),
        };
        store.upsert(&record).unwrap();

        let fetched = store.fetch("a1b2c3d4").unwrap().unwrap();
        assert_eq!(fetched.voter_name, "Ada");
        assert!(store.fetch("nosuchid").unwrap().is_none());

        let mut winners = BTreeMap::new();
        winners.insert("Best Picture".to_string(), "Sinners".to_string());
        store.update_winners("a1b2c3d4", &winners).unwrap();
        let fetched = store.fetch("a1b2c3d4").unwrap().unwrap();
        assert_eq!(fetched.winners.get("Best Picture").unwrap(), "Sinners");

        let many = store
            .fetch_many(&["a1b2c3d4".to_string(), "nosuchid".to_string()])
            .unwrap();
        assert_eq!(many.len(), 1);

        let err = store.update_winners("nosuchid", &winners).unwrap_err();
        assert!(matches!(err, PoolError::NotFound { .. }));

        store.delete("a1b2c3d4").unwrap();
        assert!(store.fetch("a1b2c3d4").unwrap().is_none());
        // Deleting an unknown id succeeds.
        store.delete("a1b2c3d4").unwrap();
    }

    #[test]
    fn index_survives_a_restart() {
        let path = temp_path("index-restart", "index.json");
        {
            let mut index = LocalIndex::load(&path).unwrap();
            index.add_mine("mine0001", "Ada").unwrap();
            index.add_shared("shared01", "Bea").unwrap();
        }
        let index = LocalIndex::load(&path).unwrap();
        assert!(index.is_mine("mine0001"));
        assert_eq!(index.shared().len(), 1);
        assert_eq!(
            index.ballot_ids(),
            vec!["mine0001".to_string(), "shared01".to_string()]
        );
    }

    #[test]
    fn blank_template_lists_every_category() {
        let template = blank_template_js();
        let obj = template.as_object().unwrap();
        assert_eq!(obj.len(), CATEGORY_COUNT);
        let picture = obj.get("Best Picture").unwrap();
        assert_eq!(picture["nominees"].as_array().unwrap().len(), 10);
        assert!(picture["willWin"].is_null());
        // The template itself parses back as a picks file.
        let parsed: BTreeMap<String, StoredPick> =
            serde_json::from_value(template).unwrap();
        assert_eq!(parsed.len(), CATEGORY_COUNT);
        assert!(parsed.values().all(|p| p.will_win.is_none()));
    }
}
