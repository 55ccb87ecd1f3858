//! Data structures for the track duel: tracks, battles, tournament state.

mod battle;
mod tournament;
mod track;

pub use battle::{Battle, BattleId};
pub use tournament::{
    ensure_unique_ids, normalize_name, pair_count, Tournament, TournamentError, TournamentId,
    MIN_TRACKS,
};
pub use track::{Track, TrackId, TrackStats};
