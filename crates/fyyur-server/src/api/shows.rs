use axum::{extract::State, response::Response, Json};
use axum_extra::extract::{CookieJar, Form};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;

use super::{invalid_form, redirect_with, render, FormPage, Page};
use crate::error::AppError;
use crate::flash::Flash;
use crate::forms::{FormErrors, ShowForm, ShowRecord};
use fyyur_db::aggregation::{format_start_time, DateFormat};
use fyyur_db::entities::{artist, show, venue};
use fyyur_db::queries::{self, ShowFilter, ShowListing};
use fyyur_db::AppState;

#[derive(Debug, Serialize)]
pub struct ShowEntry {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
    pub start_time_display: String,
}

impl From<ShowListing> for ShowEntry {
    fn from(s: ShowListing) -> Self {
        Self {
            venue_id: s.venue_id,
            venue_name: s.venue_name,
            artist_id: s.artist_id,
            artist_name: s.artist_name,
            artist_image_link: s.artist_image_link,
            start_time: format_start_time(&s.start_time, DateFormat::Raw),
            start_time_display: format_start_time(&s.start_time, DateFormat::Full),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShowsPage {
    pub shows: Vec<ShowEntry>,
}

enum Booking {
    Listed(show::Model),
    /// The referenced artist or venue does not exist.
    Dangling(FormErrors),
}

async fn insert_show<C>(db: &C, record: ShowRecord) -> Result<Booking, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let mut errors = FormErrors::default();
    if artist::Entity::find_by_id(record.artist_id)
        .one(&txn)
        .await?
        .is_none()
    {
        errors.push("artist_id", "No artist with this id.");
    }
    if venue::Entity::find_by_id(record.venue_id)
        .one(&txn)
        .await?
        .is_none()
    {
        errors.push("venue_id", "No venue with this id.");
    }
    if !errors.is_empty() {
        return Ok(Booking::Dangling(errors));
    }

    let model = show::ActiveModel {
        venue_id: Set(record.venue_id),
        artist_id: Set(record.artist_id),
        start_time: Set(record.start_time.fixed_offset()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    Ok(Booking::Listed(model))
}

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<ShowsPage>>), AppError> {
    let shows = queries::show_listings(&state.db, ShowFilter::All)
        .await?
        .into_iter()
        .map(ShowEntry::from)
        .collect();
    Ok(render(jar, ShowsPage { shows }))
}

/// GET /shows/create
pub async fn create_show_form(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<Page<FormPage<ShowForm>>>) {
    render(jar, FormPage::new(None, ShowForm::starting_at(state.now())))
}

/// POST /shows/create
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ShowForm>,
) -> Response {
    let record = match form.validate() {
        Ok(record) => record,
        Err(errors) => return invalid_form(jar, None, form, errors),
    };

    match insert_show(&state.db, record).await {
        Ok(Booking::Listed(show)) => {
            tracing::info!(
                show_id = show.id,
                venue_id = show.venue_id,
                artist_id = show.artist_id,
                "show listed"
            );
            redirect_with(
                &state,
                jar,
                "/shows",
                Flash::success("Show was successfully listed!"),
            )
        }
        Ok(Booking::Dangling(errors)) => invalid_form(jar, None, form, errors),
        Err(e) => {
            tracing::error!(error = %e, "failed to list show");
            redirect_with(
                &state,
                jar,
                "/",
                Flash::error("An error occurred. Show could not be listed."),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_show_entry_uses_long_display() {
        let start = Utc.with_ymd_and_hms(2019, 5, 21, 21, 30, 0).unwrap();
        let entry = ShowEntry::from(ShowListing {
            id: 1,
            start_time: start.fixed_offset(),
            venue_id: 1,
            venue_name: "The Musical Hop".into(),
            venue_image_link: None,
            artist_id: 4,
            artist_name: "Guns N Petals".into(),
            artist_image_link: None,
        });
        assert_eq!(entry.start_time, "2019-05-21 21:30:00");
        assert_eq!(entry.start_time_display, "Tuesday May, 21, 2019 at 9:30PM");
    }
}
