//! Tournament engine: pair generation, outcome recording, ranking and reconciliation.

mod outcome;
mod pairing;
mod ranking;
mod reconcile;

pub use outcome::complete_battle;
pub use pairing::{available_pairs, next_battle, next_battle_with_rng, resume, resume_with_rng};
pub use ranking::{
    compare_standing, progress, rankings, shareable_list, standings, Progress, RankedTrack,
    Standings,
};
pub use reconcile::{edit_tournament, reconcile, replay_stats, reset_battles};
