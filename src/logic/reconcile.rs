//! Reconciliation: adapt a tournament's history to an edited track set.

use crate::models::{
    ensure_unique_ids, normalize_name, Battle, Track, TrackId, TrackStats, Tournament,
    TournamentError,
};
use std::collections::{HashMap, HashSet};

/// Win/loss counts per track id, derived purely from a battle log.
///
/// Only ids in `track_ids` are counted; battles without a winner are skipped.
pub fn replay_stats<'a>(
    track_ids: impl IntoIterator<Item = &'a str>,
    battles: &[Battle],
) -> HashMap<TrackId, TrackStats> {
    let mut counts: HashMap<TrackId, (u32, u32)> = track_ids
        .into_iter()
        .map(|id| (id.to_string(), (0, 0)))
        .collect();
    for battle in battles {
        let (Some(winner), Some(loser)) = (battle.winner.as_ref(), battle.loser()) else {
            continue;
        };
        if let Some((wins, _)) = counts.get_mut(winner) {
            *wins += 1;
        }
        if let Some((_, losses)) = counts.get_mut(loser) {
            *losses += 1;
        }
    }
    counts
        .into_iter()
        .map(|(id, (wins, losses))| (id, TrackStats::from_counts(wins, losses)))
        .collect()
}

/// Replace the track set of `tournament` with `new_tracks`, keeping every
/// battle whose two sides both survive.
///
/// Statistics are rebuilt by replaying the surviving battles, so they are
/// consistent no matter how many edits have accumulated. New entrants start
/// at zero. Fewer than two tracks is accepted; such a tournament simply has
/// nothing to battle. Duplicate ids in `new_tracks` are rejected.
pub fn reconcile(tournament: &Tournament, new_tracks: &[Track]) -> Result<Tournament, TournamentError> {
    ensure_unique_ids(new_tracks)?;

    // Merge: known ids carry their stats, new ids start clean.
    let existing: HashMap<&str, &Track> = tournament
        .tracks
        .iter()
        .map(|t| (t.id.as_str(), t))
        .collect();
    let merged: Vec<Track> = new_tracks
        .iter()
        .map(|t| match existing.get(t.id.as_str()) {
            Some(old) => t.with_stats(old.stats),
            None => t.cleared(),
        })
        .collect();

    // Filter: drop battles that reference a removed track.
    let ids: HashSet<&str> = new_tracks.iter().map(|t| t.id.as_str()).collect();
    let battles: Vec<Battle> = tournament
        .battles
        .iter()
        .filter(|b| ids.contains(b.track_a.id.as_str()) && ids.contains(b.track_b.id.as_str()))
        .cloned()
        .collect();
    let dropped = tournament.battles.len() - battles.len();

    // Recompute: replayed counts override whatever was carried over.
    let replayed = replay_stats(ids.iter().copied(), &battles);
    let tracks: Vec<Track> = merged
        .iter()
        .map(|t| t.with_stats(replayed.get(&t.id).copied().unwrap_or_default()))
        .collect();

    let added = tracks
        .iter()
        .filter(|t| !existing.contains_key(t.id.as_str()))
        .count();
    log::info!(
        "Tournament {}: reconciled to {} track(s) ({} new), kept {} battle(s), dropped {}",
        tournament.id,
        tracks.len(),
        added,
        battles.len(),
        dropped
    );

    let mut next = tournament.clone();
    next.tracks = tracks;
    next.battles = battles;
    next.touch();
    Ok(next)
}

/// Rename and re-track a tournament in one step, preserving battle history.
pub fn edit_tournament(
    tournament: &Tournament,
    name: &str,
    new_tracks: &[Track],
) -> Result<Tournament, TournamentError> {
    let name = normalize_name(name)?;
    let mut next = reconcile(tournament, new_tracks)?;
    next.name = name;
    Ok(next)
}

/// Clear all battles and zero every track's statistics. Tracks, name and id are kept.
pub fn reset_battles(tournament: &Tournament) -> Tournament {
    let mut next = tournament.clone();
    next.tracks = tournament.tracks.iter().map(Track::cleared).collect();
    next.battles.clear();
    next.touch();
    log::info!("Tournament {}: battles reset", next.id);
    next
}
