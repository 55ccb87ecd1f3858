//! Tournament aggregate and TournamentError.

use crate::models::battle::Battle;
use crate::models::track::{Track, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Fewest tracks a new tournament may start with.
pub const MIN_TRACKS: usize = 2;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Declared winner is neither side of the battle.
    InvalidWinner(TrackId),
    /// Both sides of a battle are the same track.
    SameTrack(TrackId),
    /// The battle passed to the outcome recorder already has a winner.
    BattleAlreadyCompleted,
    /// Same track id appears more than once in a track list.
    DuplicateTrackId(TrackId),
    /// Not enough tracks to create a tournament.
    NotEnoughTracks { required: usize, found: usize },
    /// Tournament name is blank.
    EmptyName,
    /// A battle side is not a track of this tournament.
    TrackNotFound(TrackId),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidWinner(id) => {
                write!(f, "Winner {} is not part of this battle", id)
            }
            TournamentError::SameTrack(id) => write!(f, "Track {} cannot battle itself", id),
            TournamentError::BattleAlreadyCompleted => write!(f, "Battle already has a winner"),
            TournamentError::DuplicateTrackId(id) => write!(f, "Track {} appears more than once", id),
            TournamentError::NotEnoughTracks { required, found } => {
                write!(f, "Need at least {} tracks to battle (got {})", required, found)
            }
            TournamentError::EmptyName => write!(f, "Tournament name must not be empty"),
            TournamentError::TrackNotFound(id) => write!(f, "Track {} is not in this tournament", id),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Number of unordered pairs among `n` tracks.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Fail with `DuplicateTrackId` on the first id seen twice.
pub fn ensure_unique_ids(tracks: &[Track]) -> Result<(), TournamentError> {
    let mut seen = HashSet::with_capacity(tracks.len());
    for t in tracks {
        if !seen.insert(t.id.as_str()) {
            return Err(TournamentError::DuplicateTrackId(t.id.clone()));
        }
    }
    Ok(())
}

/// Trimmed tournament name, or `EmptyName`.
pub fn normalize_name(name: &str) -> Result<String, TournamentError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// A set of tracks and their battle history (a "playlist").
///
/// Transitions in [`crate::logic`] never mutate a tournament in place: they
/// take the current value by reference and return the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Display order only; see [`crate::rankings`] for standings.
    pub tracks: Vec<Track>,
    /// Completed battles, in the order they were decided.
    pub battles: Vec<Battle>,
    /// Recomputed by [`Tournament::touch`] after every change to either list.
    #[serde(default)]
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a tournament with an empty history. Incoming statistics are zeroed.
    pub fn new(name: &str, tracks: Vec<Track>) -> Result<Self, TournamentError> {
        let name = normalize_name(name)?;
        if tracks.len() < MIN_TRACKS {
            return Err(TournamentError::NotEnoughTracks {
                required: MIN_TRACKS,
                found: tracks.len(),
            });
        }
        ensure_unique_ids(&tracks)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            tracks: tracks.iter().map(Track::cleared).collect(),
            battles: Vec::new(),
            is_complete: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Number of battles a full round robin over the current tracks needs.
    pub fn pair_count(&self) -> usize {
        pair_count(self.tracks.len())
    }

    /// Battles still to be fought (0 once complete).
    pub fn remaining_battles(&self) -> usize {
        self.pair_count().saturating_sub(self.battles.len())
    }

    /// Completion as derived from the two lists. A tournament with fewer
    /// than two tracks can never complete.
    pub fn derive_complete(&self) -> bool {
        self.tracks.len() >= MIN_TRACKS && self.battles.len() >= self.pair_count()
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Whether a decided battle already covers this pair.
    pub fn has_battled(&self, a: &str, b: &str) -> bool {
        self.battles.iter().any(|battle| battle.same_pair(a, b))
    }

    /// Recompute `is_complete` and bump `updated_at`.
    pub fn touch(&mut self) {
        self.is_complete = self.derive_complete();
        self.updated_at = Utc::now();
    }
}
