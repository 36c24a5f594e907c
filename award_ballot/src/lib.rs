mod catalog;
mod draft;
mod model;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::{debug, info};

pub use crate::catalog::*;
pub use crate::draft::*;
pub use crate::model::*;

/// Scores one ballot's picks against a winners map.
///
/// Pure: the same inputs always produce the same score. Equality is
/// exact string match on the nominee label. `total` is the number of
/// announced categories in `winners`, never the fixed category count.
pub fn score_ballot(picks: &BTreeMap<String, Pick>, winners: &BTreeMap<String, String>) -> Score {
    let mut score = Score {
        correct: 0,
        heart_correct: 0,
        total: winners.len() as u32,
    };
    for (category, winner) in winners.iter() {
        let pick = picks.get(category);
        if pick.and_then(|p| p.will_win.as_deref()) == Some(winner.as_str()) {
            score.correct += 1;
        }
        // Tracked independently of will_win: a heart pick counts whether
        // or not the prediction was also right.
        if pick.and_then(|p| p.want_win.as_deref()) == Some(winner.as_str()) {
            score.heart_correct += 1;
        }
    }
    score
}

// Source selection order: more winners first, then earliest creation,
// then smallest id. Records without a creation timestamp sort last.
fn cmp_source_preference(a: &BallotRecord, b: &BallotRecord) -> Ordering {
    b.winner_count()
        .cmp(&a.winner_count())
        .then_with(|| match (&a.created_at, &b.created_at) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Builds the cross-ballot leaderboard and mismatch report.
///
/// The winners map of the record with the most announced winners becomes
/// the source of truth; every record (the source included) is scored
/// against it. When no record has any winner marked the scoreboard is
/// empty.
pub fn build_scoreboard(records: &[BallotRecord]) -> Scoreboard {
    info!("build_scoreboard: aggregating {} ballots", records.len());

    let source_record = records
        .iter()
        .filter(|r| r.winner_count() > 0)
        .min_by(|a, b| cmp_source_preference(a, b));

    let source_record = match source_record {
        Some(r) => r,
        None => {
            debug!("build_scoreboard: no ballot has winners marked");
            return Scoreboard::default();
        }
    };
    let source_winners = &source_record.winners;
    info!(
        "build_scoreboard: source ballot {} ({}) with {} winners",
        source_record.id,
        source_record.voter_name,
        source_winners.len()
    );

    let mut entries: Vec<ScoreboardEntry> = records
        .iter()
        .map(|r| ScoreboardEntry {
            id: r.id.clone(),
            name: r.voter_name.clone(),
            score: score_ballot(&r.picks, source_winners),
        })
        .collect();
    // Best predictions first; hearts break ties, names make the residual
    // order deterministic.
    entries.sort_by(|a, b| {
        b.score
            .correct
            .cmp(&a.score.correct)
            .then_with(|| b.score.heart_correct.cmp(&a.score.heart_correct))
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut mismatches: Vec<Mismatch> = Vec::new();
    for (category, winner) in source_winners.iter() {
        for r in records.iter() {
            if r.id == source_record.id {
                continue;
            }
            if let Some(theirs) = r.winners.get(category) {
                if theirs != winner {
                    debug!(
                        "build_scoreboard: {} disagrees on {:?}: {:?} vs {:?}",
                        r.voter_name, category, theirs, winner
                    );
                    mismatches.push(Mismatch {
                        category: category.clone(),
                        source_winner: winner.clone(),
                        other_ballot_name: r.voter_name.clone(),
                        other_winner: theirs.clone(),
                        other_ballot_id: r.id.clone(),
                    });
                }
            }
        }
    }

    Scoreboard {
        source: Some(ScoreboardSource {
            ballot_id: source_record.id.clone(),
            name: source_record.voter_name.clone(),
            winner_count: source_winners.len(),
        }),
        entries,
        mismatches,
    }
}
