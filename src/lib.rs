//! Track duel: rank tracks through a round robin of pairwise battles.
//! Library with models, the tournament engine and import/export.

pub mod export;
pub mod logic;
pub mod models;

pub use export::{
    export_tournament, export_tournaments, import_tournaments, rankings_csv, validate_history,
    ImportError, EXPORT_VERSION,
};
pub use logic::{
    available_pairs, compare_standing, complete_battle, edit_tournament, next_battle,
    next_battle_with_rng, progress, rankings, reconcile, replay_stats, reset_battles, resume,
    resume_with_rng, shareable_list, standings, Progress, RankedTrack, Standings,
};
pub use models::{
    pair_count, Battle, BattleId, Tournament, TournamentError, TournamentId, Track, TrackId,
    TrackStats, MIN_TRACKS,
};
