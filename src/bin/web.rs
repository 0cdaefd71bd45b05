//! Single binary web server: JSON API over in-memory doubles sessions.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080). Log level via RUST_LOG.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use doubles_round_robin::{
    draw_next_round, edit_match, finalize_session, parse_roster, recalibrate_match,
    restart_session, set_match_score, standings_to_csv, start_session, validate_roster, Score,
    SessionConfig, SessionError, SessionId, SessionState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-session entry: session data, its random source, and last activity time (for auto-cleanup).
struct SessionEntry {
    session: SessionState,
    rng: StdRng,
    last_activity: Instant,
}

/// In-memory state: many sessions by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<SessionId, SessionEntry>>>;

/// Inactivity threshold: sessions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateSessionBody {
    /// Player names, in order.
    #[serde(default)]
    players: Vec<String>,
    /// Alternative to `players`: one name per line.
    #[serde(default)]
    roster_text: Option<String>,
    #[serde(default)]
    config: SessionConfig,
    /// Fixed seed for reproducible draws.
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct EditMatchBody {
    players: Vec<String>,
}

/// Either score missing means "not yet played".
#[derive(Deserialize)]
struct SetScoreBody {
    team_1: Option<u32>,
    team_2: Option<u32>,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// Path segments: session id and match id (e.g. /api/sessions/{id}/matches/{match_id})
#[derive(Deserialize)]
struct SessionMatchPath {
    id: SessionId,
    match_id: Uuid,
}

fn bad_request(e: SessionError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn no_session() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "doubles-round-robin",
    })
}

/// Create a session and draw every round (returns it with id; client stores id for subsequent requests).
#[post("/api/sessions")]
async fn api_create_session(state: AppState, body: Json<CreateSessionBody>) -> HttpResponse {
    let body = body.into_inner();
    let roster = match body.roster_text {
        Some(text) => parse_roster(&text),
        None => validate_roster(body.players),
    };
    let roster = match roster {
        Ok(r) => r,
        Err(e) => return bad_request(e),
    };
    let mut rng = match body.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let session = match start_session(roster, body.config, &mut rng) {
        Ok(s) => s,
        Err(e) => return bad_request(e),
    };
    let id = session.id;
    let response = HttpResponse::Ok().json(&session);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        SessionEntry {
            session,
            rng,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a session by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/sessions/{id}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.session)
        }
        None => no_session(),
    }
}

/// Draw one more round (only while the session duration has rounds left).
#[post("/api/sessions/{id}/rounds")]
async fn api_draw_round(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    match draw_next_round(&mut entry.session, &mut entry.rng) {
        Ok(round) => HttpResponse::Ok().json(round),
        Err(e) => bad_request(e),
    }
}

/// Redraw one match from current load.
#[post("/api/sessions/{id}/matches/{match_id}/recalibrate")]
async fn api_recalibrate_match(state: AppState, path: Path<SessionMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    match recalibrate_match(&mut entry.session, path.match_id, &mut entry.rng) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => bad_request(e),
    }
}

/// Overwrite one match with four named players (team 1 = first two).
#[put("/api/sessions/{id}/matches/{match_id}")]
async fn api_edit_match(
    state: AppState,
    path: Path<SessionMatchPath>,
    body: Json<EditMatchBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    match edit_match(&mut entry.session, path.match_id, body.into_inner().players) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => bad_request(e),
    }
}

/// Enter (both scores) or clear (either missing) a match score.
#[put("/api/sessions/{id}/matches/{match_id}/score")]
async fn api_set_score(
    state: AppState,
    path: Path<SessionMatchPath>,
    body: Json<SetScoreBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    let score = match (body.team_1, body.team_2) {
        (Some(t1), Some(t2)) => Some(Score::new(t1, t2)),
        _ => None,
    };
    match set_match_score(&mut entry.session, path.match_id, score) {
        Ok(()) => HttpResponse::Ok().json(&entry.session),
        Err(e) => bad_request(e),
    }
}

/// Final standings (400 if no match has a score yet).
#[get("/api/sessions/{id}/standings")]
async fn api_standings(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    match finalize_session(&entry.session) {
        Ok(standings) => HttpResponse::Ok().json(standings),
        Err(e) => bad_request(e),
    }
}

/// Final standings as a CSV download.
#[get("/api/sessions/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    match finalize_session(&entry.session).and_then(|s| standings_to_csv(&s)) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => bad_request(e),
    }
}

/// Restart: clear all rounds and counts, keep roster and settings.
#[post("/api/sessions/{id}/restart")]
async fn api_restart_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    restart_session(&mut entry.session);
    HttpResponse::Ok().json(&entry.session)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<SessionId, SessionEntry>::new()));

    // Background task: every 30 minutes, remove sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_session)
            .service(api_get_session)
            .service(api_draw_round)
            .service(api_recalibrate_match)
            .service(api_edit_match)
            .service(api_set_score)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_restart_session)
    })
    .bind(bind)?
    .run()
    .await
}
