//! A single pairwise comparison between two tracks.

use crate::models::track::{Track, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a battle.
pub type BattleId = Uuid;

/// Two track snapshots and, once decided, the winner's id.
///
/// A battle with a winner is never edited again; it can only be dropped when
/// the tournament's track set is reconciled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    pub id: BattleId,
    #[serde(rename = "track1")]
    pub track_a: Track,
    #[serde(rename = "track2")]
    pub track_b: Track,
    /// None while in flight.
    #[serde(default)]
    pub winner: Option<TrackId>,
    pub timestamp: DateTime<Utc>,
}

impl Battle {
    /// New in-flight battle between two snapshots.
    pub fn new(track_a: Track, track_b: Track) -> Self {
        Self {
            id: Uuid::new_v4(),
            track_a,
            track_b,
            winner: None,
            timestamp: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether either side is the given track.
    pub fn involves(&self, id: &str) -> bool {
        self.track_a.id == id || self.track_b.id == id
    }

    /// Whether this battle is between `a` and `b`, in either order.
    pub fn same_pair(&self, a: &str, b: &str) -> bool {
        (self.track_a.id == a && self.track_b.id == b)
            || (self.track_a.id == b && self.track_b.id == a)
    }

    /// The side with the given id, if any.
    pub fn side(&self, id: &str) -> Option<&Track> {
        if self.track_a.id == id {
            Some(&self.track_a)
        } else if self.track_b.id == id {
            Some(&self.track_b)
        } else {
            None
        }
    }

    /// The id of the side that did not win (None while in flight).
    pub fn loser(&self) -> Option<&TrackId> {
        let winner = self.winner.as_deref()?;
        if self.track_a.id == winner {
            Some(&self.track_b.id)
        } else {
            Some(&self.track_a.id)
        }
    }
}
