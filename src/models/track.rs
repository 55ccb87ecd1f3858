//! Track and its battle statistics.

use serde::{Deserialize, Serialize};

/// Caller-assigned identifier for a track (e.g. a catalog track id).
pub type TrackId = String;

/// Cumulative battle record of a track.
///
/// `battles` is always `wins + losses` and `score` is the cached win rate;
/// both are only ever written through [`TrackStats::record_win`],
/// [`TrackStats::record_loss`] or [`TrackStats::from_counts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackStats {
    pub wins: u32,
    pub losses: u32,
    pub battles: u32,
    pub score: f64,
}

impl TrackStats {
    /// Stats derived from raw win/loss counts.
    pub fn from_counts(wins: u32, losses: u32) -> Self {
        let battles = wins + losses;
        let score = if battles > 0 {
            f64::from(wins) / f64::from(battles)
        } else {
            0.0
        };
        Self {
            wins,
            losses,
            battles,
            score,
        }
    }

    pub fn record_win(&mut self) {
        *self = Self::from_counts(self.wins + 1, self.losses);
    }

    pub fn record_loss(&mut self) {
        *self = Self::from_counts(self.wins, self.losses + 1);
    }

    /// True when `battles` and `score` agree with `wins`/`losses`.
    pub fn is_consistent(&self) -> bool {
        *self == Self::from_counts(self.wins, self.losses)
    }
}

/// A track in a tournament. Display metadata is opaque to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Artwork reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Audio preview reference.
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Duration in milliseconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(flatten)]
    pub stats: TrackStats,
}

impl Track {
    /// Create a track with zeroed statistics.
    pub fn new(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: artist.into(),
            album: album.into(),
            image_url: None,
            preview_url: None,
            duration: 0,
            stats: TrackStats::default(),
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_preview_url(mut self, url: impl Into<String>) -> Self {
        self.preview_url = Some(url.into());
        self
    }

    pub fn with_duration(mut self, millis: u64) -> Self {
        self.duration = millis;
        self
    }

    /// Same track with the given statistics (metadata untouched).
    pub fn with_stats(&self, stats: TrackStats) -> Self {
        Self {
            stats,
            ..self.clone()
        }
    }

    /// Same track with zeroed statistics.
    pub fn cleared(&self) -> Self {
        self.with_stats(TrackStats::default())
    }

    pub fn wins(&self) -> u32 {
        self.stats.wins
    }

    pub fn losses(&self) -> u32 {
        self.stats.losses
    }

    pub fn battles(&self) -> u32 {
        self.stats.battles
    }

    pub fn score(&self) -> f64 {
        self.stats.score
    }

    /// Win rate as a whole percentage (0 when the track has not battled).
    pub fn win_percentage(&self) -> u32 {
        if self.stats.battles == 0 {
            return 0;
        }
        // score is in [0, 1] so the rounded value always fits.
        (self.stats.score * 100.0).round() as u32
    }
}
