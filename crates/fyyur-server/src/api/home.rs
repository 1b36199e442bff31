use axum::{extract::State, http::StatusCode, response::Response, Json};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use std::sync::Arc;

use super::{render, Page};
use crate::error::{error_page, AppError};
use fyyur_db::entities::{artist, venue};
use fyyur_db::{queries, AppState};

const RECENT_LIMIT: u64 = 10;

#[derive(Debug, Serialize)]
pub struct Listed {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
}

impl From<venue::Model> for Listed {
    fn from(v: venue::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            city: v.city,
            state: v.state,
        }
    }
}

impl From<artist::Model> for Listed {
    fn from(a: artist::Model) -> Self {
        Self {
            id: a.id,
            name: a.name,
            city: a.city,
            state: a.state,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub recent_venues: Vec<Listed>,
    pub recent_artists: Vec<Listed>,
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<HomePage>>), AppError> {
    let recent_venues = queries::recent_venues(&state.db, RECENT_LIMIT).await?;
    let recent_artists = queries::recent_artists(&state.db, RECENT_LIMIT).await?;

    Ok(render(
        jar,
        HomePage {
            recent_venues: recent_venues.into_iter().map(Listed::from).collect(),
            recent_artists: recent_artists.into_iter().map(Listed::from).collect(),
        },
    ))
}

#[derive(Serialize)]
pub struct ApiStatus {
    status: &'static str,
    version: &'static str,
}

/// GET /healthz
pub async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    error_page(StatusCode::NOT_FOUND, "page not found")
}
