//! HTTP surface of the Fyyur directory: venues, artists and the shows
//! booking them together.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use fyyur_db::AppState;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;
pub mod flash;
pub mod forms;

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    let venues = Router::new()
        .route("/", get(api::venues::list_venues))
        .route("/search", post(api::venues::search_venues))
        .route(
            "/create",
            get(api::venues::create_venue_form).post(api::venues::create_venue),
        )
        .route("/{id}", get(api::venues::get_venue))
        .route(
            "/{id}/edit",
            get(api::venues::edit_venue_form).post(api::venues::edit_venue),
        )
        .route("/{id}/delete", post(api::venues::delete_venue));

    let artists = Router::new()
        .route("/", get(api::artists::list_artists))
        .route("/search", post(api::artists::search_artists))
        .route(
            "/create",
            get(api::artists::create_artist_form).post(api::artists::create_artist),
        )
        .route("/{id}", get(api::artists::get_artist))
        .route(
            "/{id}/edit",
            get(api::artists::edit_artist_form).post(api::artists::edit_artist),
        );

    let shows = Router::new()
        .route("/", get(api::shows::list_shows))
        .route(
            "/create",
            get(api::shows::create_show_form).post(api::shows::create_show),
        );

    Router::new()
        .route("/", get(api::home::index))
        .route("/healthz", get(api::home::healthz))
        .nest("/venues", venues)
        .nest("/artists", artists)
        .nest("/shows", shows)
        .fallback(api::home::not_found)
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}
