//! Integration tests for reconciling edited track sets, reset and edit.

use track_duel::{
    complete_battle, edit_tournament, next_battle, reconcile, reset_battles, Battle, Tournament,
    TournamentError, Track,
};

fn track(id: &str) -> Track {
    Track::new(id, format!("Song {id}"), "Artist", "Album")
}

fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

fn play(t: &Tournament, a: &str, b: &str, winner: &str) -> Tournament {
    let battle = Battle::new(t.track(a).unwrap().clone(), t.track(b).unwrap().clone());
    complete_battle(t, &battle, winner).unwrap()
}

/// A beats B, A beats C, C beats B.
fn completed_three() -> Tournament {
    let t = Tournament::new("Test", tracks(&["A", "B", "C"])).unwrap();
    let t = play(&t, "A", "B", "A");
    let t = play(&t, "A", "C", "A");
    play(&t, "C", "B", "C")
}

fn stats(t: &Tournament, id: &str) -> (u32, u32, u32, f64) {
    let tr = t.track(id).unwrap();
    (tr.wins(), tr.losses(), tr.battles(), tr.score())
}

#[test]
fn removing_a_track_drops_its_battles_and_replays_stats() {
    let t = completed_three();
    let next = reconcile(&t, &tracks(&["A", "B"])).unwrap();

    assert_eq!(next.battles.len(), 1);
    assert!(next.battles[0].same_pair("A", "B"));
    assert_eq!(stats(&next, "A"), (1, 0, 1, 1.0));
    assert_eq!(stats(&next, "B"), (0, 1, 1, 0.0));
    assert!(next.is_complete);
    assert_eq!(next.id, t.id);
}

#[test]
fn adding_a_track_keeps_history_and_reopens_tournament() {
    let t = completed_three();
    let next = reconcile(&t, &tracks(&["A", "B", "C", "D"])).unwrap();

    assert_eq!(next.battles, t.battles);
    assert_eq!(stats(&next, "D"), (0, 0, 0, 0.0));
    assert_eq!(stats(&next, "A"), stats(&t, "A"));
    assert!(!next.is_complete);
    assert_eq!(next.remaining_battles(), 3);

    let battle = next_battle(&next).unwrap();
    assert!(battle.involves("D"));
}

#[test]
fn reconcile_with_same_tracks_is_lossless() {
    let t = completed_three();
    let next = reconcile(&t, &t.tracks).unwrap();
    assert_eq!(next.battles, t.battles);
    assert_eq!(next.tracks, t.tracks);
    assert_eq!(next.is_complete, t.is_complete);
}

#[test]
fn new_entrant_stats_are_zeroed() {
    let t = completed_three();
    let mut d = track("D");
    d.stats = track_duel::TrackStats::from_counts(9, 1);
    let next = reconcile(&t, &[track("A"), track("B"), track("C"), d]).unwrap();
    assert_eq!(stats(&next, "D"), (0, 0, 0, 0.0));
}

#[test]
fn metadata_edits_are_taken_from_new_tracks() {
    let t = completed_three();
    let mut renamed = tracks(&["A", "B", "C"]);
    renamed[0].name = "Renamed".to_string();
    let next = reconcile(&t, &renamed).unwrap();
    let a = next.track("A").unwrap();
    assert_eq!(a.name, "Renamed");
    assert_eq!(a.wins(), 2);
}

#[test]
fn fewer_than_two_tracks_is_allowed_but_never_complete() {
    let t = completed_three();
    let next = reconcile(&t, &tracks(&["A"])).unwrap();
    assert!(next.battles.is_empty());
    assert!(!next.is_complete);
    assert_eq!(stats(&next, "A"), (0, 0, 0, 0.0));
    assert!(next_battle(&next).is_none());

    let empty = reconcile(&t, &[]).unwrap();
    assert!(empty.tracks.is_empty());
    assert!(!empty.is_complete);
}

#[test]
fn duplicate_ids_are_rejected() {
    let t = completed_three();
    assert_eq!(
        reconcile(&t, &tracks(&["A", "B", "A"])),
        Err(TournamentError::DuplicateTrackId("A".to_string()))
    );
}

#[test]
fn repeated_edits_stay_consistent() {
    let t = completed_three();
    let t = reconcile(&t, &tracks(&["A", "B", "C", "D"])).unwrap();
    let t = play(&t, "D", "A", "D");
    let t = reconcile(&t, &tracks(&["A", "C", "D"])).unwrap();

    // Surviving: A-C (A), D-A (D).
    assert_eq!(t.battles.len(), 2);
    assert_eq!(stats(&t, "A"), (1, 1, 2, 0.5));
    assert_eq!(stats(&t, "C"), (0, 1, 1, 0.0));
    assert_eq!(stats(&t, "D"), (1, 0, 1, 1.0));
    for tr in &t.tracks {
        let referencing = t.battles.iter().filter(|b| b.involves(&tr.id)).count();
        assert_eq!(tr.battles() as usize, referencing);
    }
}

#[test]
fn reset_clears_history_but_keeps_identity() {
    let t = completed_three();
    let fresh = reset_battles(&t);
    assert_eq!(fresh.id, t.id);
    assert_eq!(fresh.name, t.name);
    assert!(fresh.battles.is_empty());
    assert!(!fresh.is_complete);
    let ids: Vec<_> = fresh.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert!(fresh.tracks.iter().all(|t| t.battles() == 0 && t.score() == 0.0));
}

#[test]
fn edit_renames_and_reconciles() {
    let t = completed_three();
    let next = edit_tournament(&t, "  Road trip  ", &tracks(&["A", "B"])).unwrap();
    assert_eq!(next.name, "Road trip");
    assert_eq!(next.battles.len(), 1);

    assert_eq!(
        edit_tournament(&t, "   ", &tracks(&["A", "B"])),
        Err(TournamentError::EmptyName)
    );
}

#[test]
fn construction_validates_input() {
    assert_eq!(
        Tournament::new("Solo", tracks(&["A"])),
        Err(TournamentError::NotEnoughTracks {
            required: 2,
            found: 1
        })
    );
    assert_eq!(
        Tournament::new("Dupes", tracks(&["A", "A"])),
        Err(TournamentError::DuplicateTrackId("A".to_string()))
    );
    assert_eq!(
        Tournament::new("", tracks(&["A", "B"])),
        Err(TournamentError::EmptyName)
    );
}
