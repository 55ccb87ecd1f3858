//! Pair generation: pick the next unplayed matchup at random.

use crate::logic::reconcile::reset_battles;
use crate::models::{Battle, Track, Tournament};
use rand::seq::SliceRandom;
use rand::Rng;

/// All unordered track pairs that have no decided battle yet, in index order.
pub fn available_pairs(tournament: &Tournament) -> Vec<(&Track, &Track)> {
    let tracks = &tournament.tracks;
    let mut pairs = Vec::new();
    for (i, a) in tracks.iter().enumerate() {
        for b in &tracks[i + 1..] {
            if !tournament.has_battled(&a.id, &b.id) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// Draw the next battle using the thread RNG. None when every pair has
/// battled or there are fewer than two tracks.
pub fn next_battle(tournament: &Tournament) -> Option<Battle> {
    next_battle_with_rng(tournament, &mut rand::thread_rng())
}

/// Draw the next battle uniformly among all available pairs.
///
/// Does not touch `tournament`; the returned battle only becomes part of the
/// history once it is passed to [`crate::complete_battle`].
pub fn next_battle_with_rng<R: Rng + ?Sized>(tournament: &Tournament, rng: &mut R) -> Option<Battle> {
    let pairs = available_pairs(tournament);
    let &(a, b) = pairs.choose(rng)?;
    log::debug!(
        "Tournament {}: drew {} vs {} from {} open pair(s)",
        tournament.id,
        a.id,
        b.id,
        pairs.len()
    );
    Some(Battle::new(a.clone(), b.clone()))
}

/// Continue battling: a finished tournament is reset first so a fresh run
/// starts, then the next battle is drawn.
pub fn resume(tournament: &Tournament) -> (Tournament, Option<Battle>) {
    resume_with_rng(tournament, &mut rand::thread_rng())
}

pub fn resume_with_rng<R: Rng + ?Sized>(tournament: &Tournament, rng: &mut R) -> (Tournament, Option<Battle>) {
    let next = if tournament.is_complete {
        log::info!("Tournament {} was complete; starting a fresh run", tournament.id);
        reset_battles(tournament)
    } else {
        tournament.clone()
    };
    let battle = next_battle_with_rng(&next, rng);
    (next, battle)
}
