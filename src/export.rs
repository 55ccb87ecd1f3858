//! Versioned JSON export/import of tournaments, plus CSV rankings.

use crate::logic::{rankings, replay_stats};
use crate::models::{
    ensure_unique_ids, Battle, Tournament, TournamentError, Track, TrackId, TrackStats,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Envelope version written by this crate and the only one accepted on import.
pub const EXPORT_VERSION: &str = "1.0";

/// Stored scores pass validation within this distance of the replayed win rate.
const SCORE_TOLERANCE: f64 = 1e-9;

/// Errors from reading an export file.
#[derive(Debug)]
pub enum ImportError {
    Json(serde_json::Error),
    /// The document has no `version` field.
    MissingVersion,
    UnsupportedVersion(String),
    /// Neither `playlist` nor `playlists` is present.
    NoPlaylistData,
    Invalid(TournamentError),
    /// A battle references a track that is not in the tournament.
    DanglingBattle(TrackId),
    /// Two battles cover the same pair of tracks.
    RepeatedPair(TrackId, TrackId),
    /// A stored battle has no winner, or a winner that is neither side.
    UnfinishedBattle(Uuid),
    /// Stored statistics disagree with a replay of the battle log.
    StatsMismatch(TrackId),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Json(e) => write!(f, "Invalid JSON: {}", e),
            ImportError::MissingVersion => write!(f, "Invalid file format: missing version"),
            ImportError::UnsupportedVersion(v) => write!(f, "Unsupported export version {}", v),
            ImportError::NoPlaylistData => write!(f, "No playlist data found in file"),
            ImportError::Invalid(e) => write!(f, "{}", e),
            ImportError::DanglingBattle(id) => {
                write!(f, "A battle references unknown track {}", id)
            }
            ImportError::RepeatedPair(a, b) => write!(f, "Tracks {} and {} battled twice", a, b),
            ImportError::UnfinishedBattle(id) => write!(f, "Battle {} has no valid winner", id),
            ImportError::StatsMismatch(id) => {
                write!(f, "Statistics for track {} do not match its battles", id)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Json(e) => Some(e),
            ImportError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::Json(e)
    }
}

impl From<TournamentError> for ImportError {
    fn from(e: TournamentError) -> Self {
        ImportError::Invalid(e)
    }
}

/// Export document. Exactly one of `playlist` / `playlists` is written.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportFile<'a> {
    version: &'a str,
    exported_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    playlist: Option<&'a Tournament>,
    #[serde(skip_serializing_if = "Option::is_none")]
    playlists: Option<&'a [Tournament]>,
}

/// Export document as read back. Ids and the winner shape vary between
/// writers, so everything the engine rederives is read leniently.
#[derive(Debug, Deserialize)]
struct ImportFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    playlist: Option<ImportedPlaylist>,
    #[serde(default)]
    playlists: Option<Vec<ImportedPlaylist>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedPlaylist {
    name: String,
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    battles: Vec<ImportedBattle>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ImportedBattle {
    /// A uuid is kept; any other id (e.g. `battle-<millis>-<random>`) is replaced.
    #[serde(default)]
    id: Option<serde_json::Value>,
    track1: Track,
    track2: Track,
    #[serde(default)]
    winner: Option<ImportedWinner>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Winner stored either as a bare track id or as a full track object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportedWinner {
    Id(TrackId),
    Track { id: TrackId },
}

impl ImportedWinner {
    fn into_id(self) -> TrackId {
        match self {
            ImportedWinner::Id(id) | ImportedWinner::Track { id } => id,
        }
    }
}

impl ImportedBattle {
    fn into_battle(self) -> Battle {
        let id = self
            .id
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);
        Battle {
            id,
            track_a: self.track1,
            track_b: self.track2,
            winner: self.winner.map(ImportedWinner::into_id),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

impl ImportedPlaylist {
    /// Tournament with a fresh id; stored ids and `isComplete` are ignored.
    fn into_tournament(self) -> Tournament {
        let now = Utc::now();
        Tournament {
            id: Uuid::new_v4(),
            name: self.name,
            tracks: self.tracks,
            battles: self.battles.into_iter().map(ImportedBattle::into_battle).collect(),
            is_complete: false,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

/// Pretty JSON export of one tournament.
pub fn export_tournament(tournament: &Tournament) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportFile {
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        playlist: Some(tournament),
        playlists: None,
    })
}

/// Pretty JSON export of many tournaments.
pub fn export_tournaments(tournaments: &[Tournament]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportFile {
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        playlist: None,
        playlists: Some(tournaments),
    })
}

/// Parse an export document (single or multi) into validated tournaments.
///
/// Accepts this crate's exports as well as older playlist files that use
/// timestamp string ids and store the winner as a full track object. Every
/// imported tournament gets a fresh id and `updated_at`; `created_at` is
/// kept. Any inconsistency in the stored history rejects the whole file.
/// Scores are recomputed from the validated counts and `is_complete` is
/// rederived, never taken from the file.
pub fn import_tournaments(json: &str) -> Result<Vec<Tournament>, ImportError> {
    let file: ImportFile = serde_json::from_str(json)?;
    match file.version.as_deref() {
        None => return Err(ImportError::MissingVersion),
        Some(EXPORT_VERSION) => {}
        Some(other) => return Err(ImportError::UnsupportedVersion(other.to_string())),
    }
    let stored = match (file.playlist, file.playlists) {
        (Some(one), _) => vec![one],
        (None, Some(many)) => many,
        (None, None) => return Err(ImportError::NoPlaylistData),
    };
    let imported = stored
        .into_iter()
        .map(|stored| -> Result<Tournament, ImportError> {
            let mut t = stored.into_tournament();
            validate_history(&t)?;
            t.tracks = t
                .tracks
                .iter()
                .map(|track| track.with_stats(TrackStats::from_counts(track.wins(), track.losses())))
                .collect();
            t.touch();
            Ok(t)
        })
        .collect::<Result<Vec<_>, ImportError>>()?;
    log::info!("Imported {} tournament(s)", imported.len());
    Ok(imported)
}

/// Check that a deserialized tournament satisfies the engine's invariants.
pub fn validate_history(tournament: &Tournament) -> Result<(), ImportError> {
    ensure_unique_ids(&tournament.tracks)?;
    let ids: HashSet<&str> = tournament.tracks.iter().map(|t| t.id.as_str()).collect();
    let mut pairs: HashSet<(&str, &str)> = HashSet::new();
    for battle in &tournament.battles {
        for side in [&battle.track_a.id, &battle.track_b.id] {
            if !ids.contains(side.as_str()) {
                return Err(ImportError::DanglingBattle(side.clone()));
            }
        }
        match battle.winner.as_deref() {
            Some(w) if battle.involves(w) => {}
            _ => return Err(ImportError::UnfinishedBattle(battle.id)),
        }
        let (a, b) = (battle.track_a.id.as_str(), battle.track_b.id.as_str());
        let key = if a <= b { (a, b) } else { (b, a) };
        if a == b || !pairs.insert(key) {
            return Err(ImportError::RepeatedPair(a.to_string(), b.to_string()));
        }
    }
    let replayed = replay_stats(ids.iter().copied(), &tournament.battles);
    for track in &tournament.tracks {
        let expected = replayed.get(&track.id).copied().unwrap_or_default();
        let counts = (track.wins(), track.losses(), track.battles());
        let drifted = (track.score() - expected.score).abs() > SCORE_TOLERANCE;
        if counts != (expected.wins, expected.losses, expected.battles) || drifted {
            log::warn!(
                "Rejecting import: track {} stored {:?}, replay gives {:?}",
                track.id,
                track.stats,
                expected
            );
            return Err(ImportError::StatsMismatch(track.id.clone()));
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RankingRow<'a> {
    rank: usize,
    id: &'a str,
    name: &'a str,
    artist: &'a str,
    album: &'a str,
    wins: u32,
    losses: u32,
    battles: u32,
    win_percentage: u32,
}

/// Current standings as CSV with a header row.
pub fn rankings_csv(tournament: &Tournament) -> Result<String, csv::Error> {
    let ranked = rankings(tournament);
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (i, t) in ranked.iter().enumerate() {
        writer.serialize(RankingRow {
            rank: i + 1,
            id: &t.id,
            name: &t.name,
            artist: &t.artist,
            album: &t.album,
            wins: t.wins(),
            losses: t.losses(),
            battles: t.battles(),
            win_percentage: t.win_percentage(),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
