//! Single binary web server hosting track duel tournaments in memory, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, INACTIVITY_TIMEOUT_HOURS.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use track_duel::{
    complete_battle, edit_tournament, export_tournament, export_tournaments, import_tournaments,
    progress, rankings_csv, reset_battles, resume, shareable_list, standings, Battle, Progress,
    Tournament, TournamentId, Track,
};

/// Per-tournament entry: tournament data, the battle on screen, last activity (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    /// Drawn but not yet decided. Never part of `tournament.battles`.
    current_battle: Option<Battle>,
    last_activity: Instant,
}

impl TournamentEntry {
    fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            current_battle: None,
            last_activity: Instant::now(),
        }
    }
}

/// In-memory state: many tournaments by ID. Idle entries are evicted by a background task.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Tournament plus what the battle screen needs.
#[derive(Serialize)]
struct TournamentView<'a> {
    tournament: &'a Tournament,
    current_battle: Option<&'a Battle>,
    progress: Progress,
}

impl<'a> TournamentView<'a> {
    fn of(entry: &'a TournamentEntry) -> Self {
        Self {
            tournament: &entry.tournament,
            current_battle: entry.current_battle.as_ref(),
            progress: progress(&entry.tournament),
        }
    }
}

/// Row in the tournament list.
#[derive(Serialize)]
struct TournamentSummary {
    id: TournamentId,
    name: String,
    tracks: usize,
    battles: usize,
    is_complete: bool,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    tracks: Vec<Track>,
}

#[derive(Deserialize)]
struct EditTournamentBody {
    name: String,
    tracks: Vec<Track>,
}

#[derive(Deserialize)]
struct CompleteBattleBody {
    winner_id: String,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

fn bad_request(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "track-duel-web",
    })
}

/// List all tournaments.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mut list: Vec<TournamentSummary> = g
        .values()
        .map(|e| TournamentSummary {
            id: e.tournament.id,
            name: e.tournament.name.clone(),
            tracks: e.tournament.tracks.len(),
            battles: e.tournament.battles.len(),
            is_complete: e.tournament.is_complete,
        })
        .collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    HttpResponse::Ok().json(list)
}

/// Create a tournament from a name and at least two tracks.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let tournament = match Tournament::new(&body.name, body.tracks) {
        Ok(t) => t,
        Err(e) => return bad_request(e),
    };
    log::info!(
        "Created tournament {} \"{}\" with {} tracks",
        tournament.id,
        tournament.name,
        tournament.tracks.len()
    );
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = g
        .entry(tournament.id)
        .or_insert_with(|| TournamentEntry::new(tournament));
    HttpResponse::Ok().json(TournamentView::of(entry))
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(TournamentView::of(entry))
        }
        None => not_found(),
    }
}

/// Rename and/or change the track list; battle history is reconciled.
#[put("/api/tournaments/{id}")]
async fn api_edit_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<EditTournamentBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match edit_tournament(&entry.tournament, &body.name, &body.tracks) {
        Ok(next) => {
            entry.tournament = next;
            // The drawn pair may reference a removed track.
            entry.current_battle = None;
            HttpResponse::Ok().json(TournamentView::of(entry))
        }
        Err(e) => bad_request(e),
    }
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove(&path.id) {
        Some(_) => {
            log::info!("Deleted tournament {}", path.id);
            HttpResponse::NoContent().finish()
        }
        None => not_found(),
    }
}

/// Clear all battles and statistics, keeping the tracks.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    entry.tournament = reset_battles(&entry.tournament);
    entry.current_battle = None;
    HttpResponse::Ok().json(TournamentView::of(entry))
}

/// Return the battle on screen, or draw the next one. A finished tournament starts over.
#[post("/api/tournaments/{id}/battles/next")]
async fn api_next_battle(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    if entry.current_battle.is_none() {
        let (next, battle) = resume(&entry.tournament);
        entry.tournament = next;
        entry.current_battle = battle;
    }
    HttpResponse::Ok().json(TournamentView::of(entry))
}

/// Decide the battle on screen.
#[post("/api/tournaments/{id}/battles/complete")]
async fn api_complete_battle(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CompleteBattleBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let battle = match entry.current_battle.as_ref() {
        Some(b) => b,
        None => return bad_request("No battle in progress"),
    };
    match complete_battle(&entry.tournament, battle, &body.winner_id) {
        Ok(next) => {
            entry.tournament = next;
            entry.current_battle = None;
            HttpResponse::Ok().json(TournamentView::of(entry))
        }
        Err(e) => bad_request(e),
    }
}

/// Discard the battle on screen without recording it.
#[delete("/api/tournaments/{id}/battles/current")]
async fn api_cancel_battle(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    entry.current_battle = None;
    HttpResponse::Ok().json(TournamentView::of(entry))
}

/// Current standings with summary figures.
#[get("/api/tournaments/{id}/rankings")]
async fn api_rankings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(standings(&entry.tournament)),
        None => not_found(),
    }
}

/// Rankings as a numbered plain-text list for sharing.
#[get("/api/tournaments/{id}/rankings/text")]
async fn api_rankings_text(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(shareable_list(&entry.tournament)),
        None => not_found(),
    }
}

#[get("/api/tournaments/{id}/rankings/csv")]
async fn api_rankings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    match rankings_csv(&entry.tournament) {
        Ok(body) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(body),
        Err(e) => {
            log::error!("CSV export of {} failed: {}", path.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// Export one tournament as a versioned JSON document.
#[get("/api/tournaments/{id}/export")]
async fn api_export_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    match export_tournament(&entry.tournament) {
        Ok(body) => HttpResponse::Ok().content_type("application/json").body(body),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Export every tournament held by the server.
#[get("/api/export")]
async fn api_export_all(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let all: Vec<Tournament> = g.values().map(|e| e.tournament.clone()).collect();
    match export_tournaments(&all) {
        Ok(body) => HttpResponse::Ok().content_type("application/json").body(body),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Import an export document (single or multiple tournaments). Rejected as a whole if invalid.
#[post("/api/import")]
async fn api_import(state: AppState, body: String) -> HttpResponse {
    let imported = match import_tournaments(&body) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Import rejected: {}", e);
            return bad_request(e);
        }
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let ids: Vec<TournamentId> = imported.iter().map(|t| t.id).collect();
    for t in imported {
        g.insert(t.id, TournamentEntry::new(t));
    }
    HttpResponse::Ok().json(serde_json::json!({ "imported": ids }))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_inactivity_hours() -> u64 {
    12
}

/// Idle time after which a tournament is evicted. Huge values clamp instead of overflowing.
fn inactivity_timeout(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let inactivity_hours: u64 = std::env::var("INACTIVITY_TIMEOUT_HOURS")
        .ok()
        .and_then(|h| h.parse().ok())
        .unwrap_or_else(default_inactivity_hours);
    let idle_timeout = inactivity_timeout(inactivity_hours);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments idle past the timeout
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < idle_timeout);
            let removed = before - g.len();
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive tournament(s) (no activity for {}h)",
                    removed,
                    inactivity_hours
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_edit_tournament)
            .service(api_delete_tournament)
            .service(api_reset_tournament)
            .service(api_next_battle)
            .service(api_complete_battle)
            .service(api_cancel_battle)
            .service(api_rankings)
            .service(api_rankings_text)
            .service(api_rankings_csv)
            .service(api_export_tournament)
            .service(api_export_all)
            .service(api_import)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactivity_timeout_converts_hours() {
        assert_eq!(inactivity_timeout(12), Duration::from_secs(12 * 3600));
    }

    #[test]
    fn inactivity_timeout_saturates_on_huge_values() {
        assert_eq!(inactivity_timeout(u64::MAX), Duration::from_secs(u64::MAX));
    }
}
