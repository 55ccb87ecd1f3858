//! Standings: ranking order, progress and the results summary.

use crate::models::{Track, Tournament};
use serde::Serialize;
use std::cmp::Ordering;

/// Ranking comparator: score, then wins, then battles, all descending.
pub fn compare_standing(a: &Track, b: &Track) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| b.wins().cmp(&a.wins()))
        .then_with(|| b.battles().cmp(&a.battles()))
}

/// All tracks ordered by [`compare_standing`].
///
/// Tracks that tie on every key keep no guaranteed relative order.
pub fn rankings(tournament: &Tournament) -> Vec<Track> {
    let mut ranked = tournament.tracks.clone();
    ranked.sort_by(compare_standing);
    ranked
}

/// How far through the round robin a tournament is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Progress {
    pub played: usize,
    pub total: usize,
    pub remaining: usize,
    /// Rounded percentage of `total` played (0 when there is nothing to play).
    pub percent: u32,
}

pub fn progress(tournament: &Tournament) -> Progress {
    let played = tournament.battles.len();
    let total = tournament.pair_count();
    let percent = if total == 0 {
        0
    } else {
        (played as f64 / total as f64 * 100.0).round() as u32
    };
    Progress {
        played,
        total,
        remaining: total.saturating_sub(played),
        percent,
    }
}

/// One row of the standings table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedTrack {
    /// 1-based position.
    pub rank: usize,
    pub win_percentage: u32,
    pub track: Track,
}

/// Results summary shown after (or during) a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standings {
    pub tournament_id: crate::models::TournamentId,
    pub name: String,
    pub is_complete: bool,
    pub total_tracks: usize,
    pub battles_fought: usize,
    pub percent_complete: u32,
    /// Top-ranked track; None only for an empty tournament.
    pub champion: Option<Track>,
    pub rankings: Vec<RankedTrack>,
}

pub fn standings(tournament: &Tournament) -> Standings {
    let ranked = rankings(tournament);
    Standings {
        tournament_id: tournament.id,
        name: tournament.name.clone(),
        is_complete: tournament.is_complete,
        total_tracks: tournament.tracks.len(),
        battles_fought: tournament.battles.len(),
        percent_complete: progress(tournament).percent,
        champion: ranked.first().cloned(),
        rankings: ranked
            .into_iter()
            .enumerate()
            .map(|(i, track)| RankedTrack {
                rank: i + 1,
                win_percentage: track.win_percentage(),
                track,
            })
            .collect(),
    }
}

/// Plain-text ranking, one `"{rank}. {name} - {artist}"` line per track.
pub fn shareable_list(tournament: &Tournament) -> String {
    rankings(tournament)
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {} - {}", i + 1, t.name, t.artist))
        .collect::<Vec<_>>()
        .join("\n")
}
