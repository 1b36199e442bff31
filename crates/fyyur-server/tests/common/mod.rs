// Shared test utilities for integration tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request as HttpRequest, Response, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use fyyur_db::entities::{artist, show, venue};
use fyyur_db::{AppState, Clock};
use fyyur_migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, Set};
use std::sync::Arc;
use tower::ServiceExt;

/// Fixed reference time every test state runs at.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap()
}

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}

/// In-memory SQLite with the schema migrated and the clock pinned to `now`.
pub async fn test_state(now: DateTime<Utc>) -> Arc<AppState> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    db.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .expect("enable foreign keys");
    Migrator::up(&db, None).await.expect("run migrations");

    let clock: Clock = Arc::new(move || now);
    Arc::new(AppState {
        db,
        clock,
        secure_cookies: false,
    })
}

pub async fn send(state: &Arc<AppState>, req: HttpRequest<Body>) -> Response<Body> {
    fyyur_server::app(state.clone()).oneshot(req).await.unwrap()
}

pub fn get(uri: &str) -> HttpRequest<Body> {
    HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> HttpRequest<Body> {
    HttpRequest::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// URL-encode `fields` as a form body. Repeated keys become multi-value fields.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn form_post(uri: &str, fields: &[(&str, &str)]) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encode_form(fields)))
        .unwrap()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a 303 and return its target.
pub fn redirect_target(resp: &Response<Body>) -> String {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    resp.headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// The `name=value` pair of the flash cookie set by a response, if any.
pub fn flash_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with(fyyur_server::flash::FLASH_COOKIE))
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .next()
}

// ─── Seed data ──────────────────────────────────────────────────────

pub async fn seed_venue(state: &AppState, name: &str, city: &str, st: &str) -> venue::Model {
    venue::ActiveModel {
        name: Set(name.to_string()),
        city: Set(city.to_string()),
        state: Set(st.to_string()),
        address: Set("1015 Folsom Street".to_string()),
        phone: Set(None),
        image_link: Set(None),
        facebook_link: Set(None),
        website_link: Set(None),
        genres: Set(r#"["Jazz"]"#.to_string()),
        seeking_talent: Set(false),
        seeking_description: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .unwrap()
}

pub async fn seed_artist(state: &AppState, name: &str) -> artist::Model {
    artist::ActiveModel {
        name: Set(name.to_string()),
        city: Set("San Francisco".to_string()),
        state: Set("CA".to_string()),
        phone: Set(None),
        image_link: Set(Some("https://img.example.com/artist.jpg".to_string())),
        facebook_link: Set(None),
        website_link: Set(None),
        genres: Set(r#"["Rock n Roll"]"#.to_string()),
        seeking_venue: Set(false),
        seeking_description: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .unwrap()
}

pub async fn seed_show(
    state: &AppState,
    venue_id: i32,
    artist_id: i32,
    start_time: DateTime<Utc>,
) -> show::Model {
    show::ActiveModel {
        venue_id: Set(venue_id),
        artist_id: Set(artist_id),
        start_time: Set(start_time.fixed_offset()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .unwrap()
}
