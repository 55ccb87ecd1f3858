//! Integration tests for recording battle outcomes.

use track_duel::{complete_battle, Battle, Tournament, TournamentError, Track};

fn tournament_with_tracks(ids: &[&str]) -> Tournament {
    let tracks: Vec<Track> = ids
        .iter()
        .map(|id| Track::new(*id, format!("Song {id}"), "Artist", "Album"))
        .collect();
    Tournament::new("Test", tracks).unwrap()
}

fn battle_between(t: &Tournament, a: &str, b: &str) -> Battle {
    Battle::new(t.track(a).unwrap().clone(), t.track(b).unwrap().clone())
}

#[test]
fn winner_and_loser_stats_are_updated() {
    let t = tournament_with_tracks(&["A", "B", "C"]);
    let battle = battle_between(&t, "A", "B");
    let next = complete_battle(&t, &battle, "A").unwrap();

    let a = next.track("A").unwrap();
    assert_eq!((a.wins(), a.losses(), a.battles()), (1, 0, 1));
    assert_eq!(a.score(), 1.0);
    let b = next.track("B").unwrap();
    assert_eq!((b.wins(), b.losses(), b.battles()), (0, 1, 1));
    assert_eq!(b.score(), 0.0);
    let c = next.track("C").unwrap();
    assert_eq!(c.battles(), 0);

    assert_eq!(next.battles.len(), 1);
    let recorded = &next.battles[0];
    assert_eq!(recorded.id, battle.id);
    assert_eq!(recorded.winner.as_deref(), Some("A"));
    assert_eq!(recorded.loser().map(String::as_str), Some("B"));
    assert!(recorded.timestamp >= battle.timestamp);
    assert!(!next.is_complete);
}

#[test]
fn input_tournament_is_left_untouched() {
    let t = tournament_with_tracks(&["A", "B"]);
    let before = t.clone();
    let battle = battle_between(&t, "A", "B");
    let _ = complete_battle(&t, &battle, "B").unwrap();
    assert_eq!(t, before);
}

#[test]
fn invalid_winner_is_rejected() {
    let t = tournament_with_tracks(&["A", "B", "C"]);
    let battle = battle_between(&t, "A", "B");
    assert_eq!(
        complete_battle(&t, &battle, "C"),
        Err(TournamentError::InvalidWinner("C".to_string()))
    );
}

#[test]
fn completed_battle_cannot_be_recorded_again() {
    let t = tournament_with_tracks(&["A", "B", "C"]);
    let battle = battle_between(&t, "A", "B");
    let t = complete_battle(&t, &battle, "A").unwrap();

    // The stored copy already has a winner.
    let stored = t.battles[0].clone();
    assert_eq!(
        complete_battle(&t, &stored, "A"),
        Err(TournamentError::BattleAlreadyCompleted)
    );
    // A fresh draw of the same pair is a rematch.
    let rematch = battle_between(&t, "B", "A");
    assert_eq!(
        complete_battle(&t, &rematch, "B"),
        Err(TournamentError::BattleAlreadyCompleted)
    );
}

#[test]
fn battle_with_foreign_track_is_rejected() {
    let t = tournament_with_tracks(&["A", "B"]);
    let stranger = Track::new("Z", "Song Z", "Artist", "Album");
    let battle = Battle::new(t.track("A").unwrap().clone(), stranger);
    assert_eq!(
        complete_battle(&t, &battle, "Z"),
        Err(TournamentError::TrackNotFound("Z".to_string()))
    );
}

#[test]
fn stats_come_from_current_tracks_not_stale_snapshots() {
    let t = tournament_with_tracks(&["A", "B", "C"]);
    // Both drawn before either is decided: the second snapshot of A is stale.
    let ab = battle_between(&t, "A", "B");
    let ac = battle_between(&t, "A", "C");
    let t = complete_battle(&t, &ab, "A").unwrap();
    let t = complete_battle(&t, &ac, "A").unwrap();

    let a = t.track("A").unwrap();
    assert_eq!((a.wins(), a.battles()), (2, 2));
}

#[test]
fn scenario_three_tracks_full_round() {
    let t = tournament_with_tracks(&["A", "B", "C"]);
    let t = complete_battle(&t, &battle_between(&t, "A", "B"), "A").unwrap();
    let t = complete_battle(&t, &battle_between(&t, "A", "C"), "A").unwrap();
    let t = complete_battle(&t, &battle_between(&t, "C", "B"), "C").unwrap();

    assert!(t.is_complete);
    assert_eq!(t.remaining_battles(), 0);
    let c = t.track("C").unwrap();
    assert_eq!((c.wins(), c.losses(), c.score()), (1, 1, 0.5));
}

#[test]
fn battle_against_itself_is_rejected() {
    let t = tournament_with_tracks(&["A", "B"]);
    let a = t.track("A").unwrap().clone();
    let battle = Battle::new(a.clone(), a);
    assert_eq!(
        complete_battle(&t, &battle, "A"),
        Err(TournamentError::SameTrack("A".to_string()))
    );
    // The tournament is still waiting for its only real pair.
    assert!(!t.is_complete);
    assert!(t.tracks.iter().all(|tr| tr.battles() == 0));
}
