//! Outcome recording: apply a battle's winner to the tournament.

use crate::models::{Battle, Tournament, TournamentError};
use chrono::Utc;

/// Record `winner_id` as the winner of `battle` and return the next tournament.
///
/// Both tracks' statistics are updated from their current entries in
/// `tournament.tracks` (not the battle's snapshots), the completed battle is
/// appended and completion is recomputed. On error nothing is produced and
/// the caller keeps its current tournament.
pub fn complete_battle(
    tournament: &Tournament,
    battle: &Battle,
    winner_id: &str,
) -> Result<Tournament, TournamentError> {
    if battle.track_a.id == battle.track_b.id {
        return Err(TournamentError::SameTrack(battle.track_a.id.clone()));
    }
    if battle.is_completed() {
        return Err(TournamentError::BattleAlreadyCompleted);
    }
    let loser_id = if battle.track_a.id == winner_id {
        &battle.track_b.id
    } else if battle.track_b.id == winner_id {
        &battle.track_a.id
    } else {
        return Err(TournamentError::InvalidWinner(winner_id.to_string()));
    };
    if tournament.has_battled(winner_id, loser_id) {
        return Err(TournamentError::BattleAlreadyCompleted);
    }

    let mut winner = tournament
        .track(winner_id)
        .ok_or_else(|| TournamentError::TrackNotFound(winner_id.to_string()))?
        .clone();
    let mut loser = tournament
        .track(loser_id)
        .ok_or_else(|| TournamentError::TrackNotFound(loser_id.clone()))?
        .clone();
    winner.stats.record_win();
    loser.stats.record_loss();

    let completed = Battle {
        winner: Some(winner.id.clone()),
        timestamp: Utc::now(),
        ..battle.clone()
    };

    let mut next = tournament.clone();
    for t in &mut next.tracks {
        if t.id == winner.id {
            *t = winner.clone();
        } else if t.id == loser.id {
            *t = loser.clone();
        }
    }
    next.battles.push(completed);
    next.touch();

    log::debug!(
        "Tournament {}: {} beat {} ({} of {} battles)",
        next.id,
        winner.id,
        loser.id,
        next.battles.len(),
        next.pair_count()
    );
    if next.is_complete {
        log::info!("Tournament {} complete after {} battles", next.id, next.battles.len());
    }
    Ok(next)
}
