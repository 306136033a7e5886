use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::mock::generate_mock_events;
use crate::parser::load_events;
use crate::staffing::board::{BoardError, EventBoard};
use crate::staffing::status::event_status;
use crate::staffing::types::{Event, EventStatus, StaffRef};

// In-memory storage for the event collection (in production, use a
// database). Every mutation runs under the one Mutex; the move workflow
// touches several events at once and must not interleave with other writes.
pub struct AppState {
    pub board: Mutex<EventBoard>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct MockRequest {
    seed: Option<u64>,
    base_date: Option<String>,
}

#[derive(Deserialize)]
pub struct EventFilter {
    date: Option<String>,
    company: Option<String>,
    event_type: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    from: String,
    to: String,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    revision: u64,
    role: String,
    staff_ids: Vec<u32>,
}

#[derive(Deserialize)]
pub struct ConfirmMoveRequest {
    revision: u64,
    staff_ids: Vec<u32>,
}

#[derive(Deserialize)]
pub struct UnassignRequest {
    revision: u64,
    staff_id: u32,
}

#[derive(Deserialize)]
pub struct RoleCountRequest {
    revision: u64,
    role: String,
    count: u32,
}

#[derive(Deserialize)]
pub struct RoleRequest {
    revision: u64,
    role: String,
}

#[derive(Deserialize)]
pub struct DeleteRoleRequest {
    revision: u64,
    role: String,
    #[serde(default)]
    confirmed: bool,
}

/// An event plus its derived status, the shape every listing returns.
#[derive(Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub status: EventStatus,
}

#[derive(Serialize)]
struct EventsResponse {
    revision: u64,
    events: Vec<EventView>,
}

#[derive(Serialize)]
struct DayResponse {
    date: NaiveDate,
    revision: u64,
    clusters: Vec<Vec<EventView>>,
    non_conflicting: Vec<EventView>,
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn status_name(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Complete => "complete",
        EventStatus::Incomplete => "incomplete",
        EventStatus::Conflict => "conflict",
    }
}

fn is_admin(session: &Session) -> bool {
    session
        .get::<bool>("admin")
        .unwrap_or(None)
        .unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"error": "Admin login required"}))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"error": message}))
}

fn board_error_response(err: &BoardError) -> HttpResponse {
    let body = serde_json::json!({"error": err.to_string()});
    match err {
        BoardError::UnknownEvent(_)
        | BoardError::UnknownRole { .. }
        | BoardError::UnknownStaff { .. } => HttpResponse::NotFound().json(body),
        BoardError::StaleRevision { current, .. } => HttpResponse::Conflict().json(
            serde_json::json!({"error": err.to_string(), "stale": true, "current_revision": current}),
        ),
        BoardError::ConfirmationRequired => HttpResponse::Conflict().json(
            serde_json::json!({"error": err.to_string(), "confirmation_required": true}),
        ),
        _ => HttpResponse::BadRequest().json(body),
    }
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn admin_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/admin.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        session.insert("admin", true)?;
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Admin CSV upload endpoint: replaces the whole collection
async fn admin_upload(
    body: web::Bytes,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }

    let csv_path = "uploaded_events.csv";
    std::fs::write(csv_path, &body)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to save file: {}", e)))?;

    match load_events(csv_path) {
        Ok(events) => {
            let count = events.len();
            let mut board = state.board.lock().unwrap();
            board.replace(events);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "events": count,
                "revision": board.revision(),
            })))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

// Admin mock regeneration endpoint
async fn admin_mock(
    req: web::Json<MockRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }

    let base_date = match &req.base_date {
        Some(value) => match parse_date(value) {
            Some(date) => date,
            None => return Ok(bad_request("base_date must be YYYY-MM-DD")),
        },
        None => chrono::Local::now().date_naive(),
    };
    let seed = req.seed.unwrap_or_else(rand::random);

    let events = generate_mock_events(base_date, seed);
    let count = events.len();
    let mut board = state.board.lock().unwrap();
    board.replace(events);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "events": count,
        "seed": seed,
        "revision": board.revision(),
    })))
}

// Filtered event listing
async fn get_events(
    query: web::Query<EventFilter>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let board = state.board.lock().unwrap();
    let events = board.events();

    let date_filter = match &query.date {
        Some(value) => match parse_date(value) {
            Some(date) => Some(date),
            None => return Ok(bad_request("date must be YYYY-MM-DD")),
        },
        None => None,
    };

    let views: Vec<EventView> = events
        .iter()
        .filter(|e| date_filter.map(|d| e.date == d).unwrap_or(true))
        .filter(|e| {
            query
                .company
                .as_ref()
                .map(|c| e.company == *c)
                .unwrap_or(true)
        })
        .filter(|e| {
            query
                .event_type
                .as_ref()
                .map(|t| e.event_type == *t)
                .unwrap_or(true)
        })
        .map(|e| EventView {
            status: event_status(e, events),
            event: e.clone(),
        })
        .filter(|view| {
            query
                .status
                .as_ref()
                .map(|s| status_name(view.status) == s)
                .unwrap_or(true)
        })
        .collect();

    Ok(HttpResponse::Ok().json(EventsResponse {
        revision: board.revision(),
        events: views,
    }))
}

// One day's events grouped into conflict clusters
async fn get_day(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let date = match parse_date(&path) {
        Some(date) => date,
        None => return Ok(bad_request("date must be YYYY-MM-DD")),
    };

    let board = state.board.lock().unwrap();
    let all = board.events();
    let result = board.day_clusters(date);

    let to_views = |events: Vec<Event>| -> Vec<EventView> {
        events
            .into_iter()
            .map(|e| EventView {
                status: event_status(&e, all),
                event: e,
            })
            .collect()
    };

    Ok(HttpResponse::Ok().json(DayResponse {
        date,
        revision: board.revision(),
        clusters: result
            .clustered
            .into_iter()
            .map(|cluster| to_views(cluster))
            .collect(),
        non_conflicting: to_views(result.non_conflicting),
    }))
}

// Per-day status counts for a date range
async fn get_overview(
    query: web::Query<RangeQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (from, to) = match (parse_date(&query.from), parse_date(&query.to)) {
        (Some(from), Some(to)) => (from, to),
        _ => return Ok(bad_request("from and to must be YYYY-MM-DD")),
    };

    let board = state.board.lock().unwrap();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "revision": board.revision(),
        "days": board.day_overview(from, to),
    })))
}

async fn get_staff(state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board.lock().unwrap();
    Ok(HttpResponse::Ok().json(board.all_staff()))
}

async fn get_meta(state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board.lock().unwrap();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "companies": board.companies(),
        "event_types": board.event_types(),
    })))
}

async fn get_availability(
    path: web::Path<u32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let board = state.board.lock().unwrap();
    match board.availability_for(*path) {
        Ok(profiles) => Ok(HttpResponse::Ok().json(profiles)),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn get_conflicts(path: web::Path<u32>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board.lock().unwrap();
    match board.conflicts_of(*path) {
        Ok(conflicts) => Ok(HttpResponse::Ok().json(conflicts)),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn post_assign(
    path: web::Path<u32>,
    req: web::Json<AssignRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }

    let mut board = state.board.lock().unwrap();

    // Candidates come in as ids; names are resolved from the roster.
    let roster = board.all_staff();
    let mut candidates: Vec<StaffRef> = Vec::new();
    for id in &req.staff_ids {
        match roster.iter().find(|s| s.id == *id) {
            Some(staff) => candidates.push(staff.clone()),
            None => {
                return Ok(bad_request(&format!("unknown staff id {}", id)));
            }
        }
    }

    match board.assign(req.revision, *path, &req.role, candidates) {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn post_confirm_move(
    req: web::Json<ConfirmMoveRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut board = state.board.lock().unwrap();
    match board.confirm_move(req.revision, &req.staff_ids) {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn post_cancel_move(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut board = state.board.lock().unwrap();
    let cancelled = board.cancel_move();
    Ok(HttpResponse::Ok().json(serde_json::json!({"cancelled": cancelled})))
}

async fn post_unassign(
    path: web::Path<u32>,
    req: web::Json<UnassignRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut board = state.board.lock().unwrap();
    match board.unassign(req.revision, *path, req.staff_id) {
        Ok(updated) => Ok(updated_response(updated, board.revision())),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn post_add_role(
    path: web::Path<u32>,
    req: web::Json<RoleCountRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut board = state.board.lock().unwrap();
    match board.add_role(req.revision, *path, &req.role, req.count) {
        Ok(updated) => Ok(updated_response(updated, board.revision())),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn post_resize_role(
    path: web::Path<u32>,
    req: web::Json<RoleCountRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut board = state.board.lock().unwrap();
    match board.resize_role(req.revision, *path, &req.role, req.count) {
        Ok(updated) => Ok(updated_response(updated, board.revision())),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn post_clear_role(
    path: web::Path<u32>,
    req: web::Json<RoleRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut board = state.board.lock().unwrap();
    match board.clear_role(req.revision, *path, &req.role) {
        Ok(updated) => Ok(updated_response(updated, board.revision())),
        Err(err) => Ok(board_error_response(&err)),
    }
}

async fn post_delete_role(
    path: web::Path<u32>,
    req: web::Json<DeleteRoleRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut board = state.board.lock().unwrap();
    match board.delete_role(req.revision, *path, &req.role, req.confirmed) {
        Ok(updated) => Ok(updated_response(updated, board.revision())),
        Err(err) => Ok(board_error_response(&err)),
    }
}

fn updated_response(updated: Vec<Event>, revision: u64) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "updated": updated,
        "revision": revision,
    }))
}

pub async fn start_server(
    port: u16,
    admin_password: String,
    events: Vec<Event>,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        board: Mutex::new(EventBoard::new(events)),
        admin_password,
    });
    let session_key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/admin", web::get().to(admin_page))
            .route("/api/login", web::post().to(admin_login))
            .route("/api/upload", web::post().to(admin_upload))
            .route("/api/mock", web::post().to(admin_mock))
            .route("/api/events", web::get().to(get_events))
            .route("/api/day/{date}", web::get().to(get_day))
            .route("/api/overview", web::get().to(get_overview))
            .route("/api/staff", web::get().to(get_staff))
            .route("/api/meta", web::get().to(get_meta))
            .route("/api/move/confirm", web::post().to(post_confirm_move))
            .route("/api/move/cancel", web::post().to(post_cancel_move))
            .service(
                web::resource("/api/events/{id}/availability")
                    .route(web::get().to(get_availability)),
            )
            .service(web::resource("/api/events/{id}/conflicts").route(web::get().to(get_conflicts)))
            .service(web::resource("/api/events/{id}/assign").route(web::post().to(post_assign)))
            .service(web::resource("/api/events/{id}/unassign").route(web::post().to(post_unassign)))
            .service(web::resource("/api/events/{id}/roles/add").route(web::post().to(post_add_role)))
            .service(
                web::resource("/api/events/{id}/roles/resize")
                    .route(web::post().to(post_resize_role)),
            )
            .service(
                web::resource("/api/events/{id}/roles/clear").route(web::post().to(post_clear_role)),
            )
            .service(
                web::resource("/api/events/{id}/roles/delete")
                    .route(web::post().to(post_delete_role)),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
