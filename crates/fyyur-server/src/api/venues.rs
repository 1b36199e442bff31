use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::{CookieJar, Form};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;

use super::{invalid_form, redirect_with, render, EntityId, FormPage, Page, SearchForm, SearchPage};
use crate::error::AppError;
use crate::flash::Flash;
use crate::forms::{VenueForm, VenueRecord};
use fyyur_db::aggregation::{format_start_time, DateFormat, LocationGroup, Timeline};
use fyyur_db::entities::{show, venue};
use fyyur_db::queries::{self, ShowListing, Summary};
use fyyur_db::{genres, AppState};

// ─── Page models ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VenuesPage {
    pub areas: Vec<LocationGroup<Summary>>,
}

/// A show as listed on a venue page: the artist side of the booking.
#[derive(Debug, Serialize)]
pub struct VenueShow {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
    pub start_time_display: String,
}

impl From<ShowListing> for VenueShow {
    fn from(s: ShowListing) -> Self {
        Self {
            artist_id: s.artist_id,
            artist_name: s.artist_name,
            artist_image_link: s.artist_image_link,
            start_time: format_start_time(&s.start_time, DateFormat::Raw),
            start_time_display: format_start_time(&s.start_time, DateFormat::Medium),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<VenueShow>,
    pub upcoming_shows: Vec<VenueShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl VenueDetail {
    pub fn new(v: venue::Model, timeline: Timeline<ShowListing>) -> Self {
        let genres = v.genre_list();
        let past_shows_count = timeline.past_count();
        let upcoming_shows_count = timeline.upcoming_count();
        let timeline = timeline.map(VenueShow::from);
        Self {
            id: v.id,
            name: v.name,
            genres,
            address: v.address,
            city: v.city,
            state: v.state,
            phone: v.phone,
            website: v.website_link,
            facebook_link: v.facebook_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
            image_link: v.image_link,
            past_shows: timeline.past,
            upcoming_shows: timeline.upcoming,
            past_shows_count,
            upcoming_shows_count,
        }
    }
}

// ─── Persistence ────────────────────────────────────────────────────

fn apply(active: &mut venue::ActiveModel, record: VenueRecord) {
    active.name = Set(record.name);
    active.city = Set(record.city);
    active.state = Set(record.state);
    active.address = Set(record.address);
    active.phone = Set(record.phone);
    active.image_link = Set(record.image_link);
    active.facebook_link = Set(record.facebook_link);
    active.website_link = Set(record.website_link);
    active.genres = Set(genres::encode(&record.genres));
    active.seeking_talent = Set(record.seeking_talent);
    active.seeking_description = Set(record.seeking_description);
}

async fn insert_venue<C>(db: &C, record: VenueRecord) -> Result<venue::Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let mut active = venue::ActiveModel {
        ..Default::default()
    };
    apply(&mut active, record);
    let model = active.insert(&txn).await?;
    txn.commit().await?;
    Ok(model)
}

/// Replace every mutable field. `None` when the venue does not exist.
async fn replace_venue<C>(
    db: &C,
    id: i32,
    record: VenueRecord,
) -> Result<Option<venue::Model>, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let Some(existing) = venue::Entity::find_by_id(id).one(&txn).await? else {
        return Ok(None);
    };
    let mut active: venue::ActiveModel = existing.into();
    apply(&mut active, record);
    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok(Some(model))
}

/// Delete a venue together with its shows. Returns the venue name, or
/// `None` when there was nothing to delete.
async fn remove_venue<C>(db: &C, id: i32) -> Result<Option<String>, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let Some(existing) = venue::Entity::find_by_id(id).one(&txn).await? else {
        return Ok(None);
    };
    let shows = show::Entity::delete_many()
        .filter(show::Column::VenueId.eq(id))
        .exec(&txn)
        .await?;
    venue::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id = id, shows_removed = shows.rows_affected, "venue deleted");
    Ok(Some(existing.name))
}

// ─── Handlers ───────────────────────────────────────────────────────

/// GET /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<VenuesPage>>), AppError> {
    let areas = queries::venues_by_location(&state.db, state.now()).await?;
    Ok(render(jar, VenuesPage { areas }))
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> Result<(CookieJar, Json<Page<SearchPage>>), AppError> {
    let results = queries::search_venues(&state.db, &form.search_term, state.now()).await?;
    tracing::debug!(term = %form.search_term, count = results.count, "venue search");
    Ok(render(
        jar,
        SearchPage {
            search_term: form.search_term,
            results,
        },
    ))
}

/// GET /venues/{id}
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let Some(venue) = venue::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(Redirect::to("/venues").into_response());
    };
    let timeline = queries::venue_timeline(&state.db, id, state.now()).await?;
    Ok(render(jar, VenueDetail::new(venue, timeline)).into_response())
}

/// GET /venues/create
pub async fn create_venue_form(jar: CookieJar) -> (CookieJar, Json<Page<FormPage<VenueForm>>>) {
    render(jar, FormPage::new(None, VenueForm::default()))
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<VenueForm>,
) -> Response {
    let record = match form.validate() {
        Ok(record) => record,
        Err(errors) => return invalid_form(jar, None, form, errors),
    };
    let name = record.name.clone();

    match insert_venue(&state.db, record).await {
        Ok(venue) => {
            tracing::info!(venue_id = venue.id, name = %venue.name, "venue listed");
            redirect_with(
                &state,
                jar,
                &format!("/venues/{}", venue.id),
                Flash::success(format!("Venue {name} was successfully listed!")),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, name = %name, "failed to list venue");
            redirect_with(
                &state,
                jar,
                "/",
                Flash::error(format!("An error occurred. Venue {name} could not be listed.")),
            )
        }
    }
}

/// GET /venues/{id}/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let Some(venue) = venue::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(Redirect::to("/venues").into_response());
    };
    let page = FormPage::new(Some(id), VenueForm::from(&venue));
    Ok(render(jar, page).into_response())
}

/// POST /venues/{id}/edit
pub async fn edit_venue(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(id): EntityId,
    Form(form): Form<VenueForm>,
) -> Response {
    let record = match form.validate() {
        Ok(record) => record,
        Err(errors) => return invalid_form(jar, Some(id), form, errors),
    };
    let name = record.name.clone();
    let failed = || Flash::error(format!("An error occurred. Venue {name} could not be updated."));

    match replace_venue(&state.db, id, record).await {
        Ok(Some(venue)) => {
            tracing::info!(venue_id = venue.id, "venue updated");
            redirect_with(
                &state,
                jar,
                &format!("/venues/{id}"),
                Flash::success(format!("Venue {name} was successfully updated!")),
            )
        }
        Ok(None) => {
            tracing::warn!(venue_id = id, "edit submitted for missing venue");
            redirect_with(&state, jar, "/venues", failed())
        }
        Err(e) => {
            tracing::error!(error = %e, venue_id = id, "failed to update venue");
            redirect_with(&state, jar, "/", failed())
        }
    }
}

/// POST /venues/{id}/delete
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(id): EntityId,
) -> Response {
    let failed = || Flash::error("An error occurred. Cannot delete venue!");

    match remove_venue(&state.db, id).await {
        Ok(Some(name)) => redirect_with(
            &state,
            jar,
            "/venues",
            Flash::success(format!("Venue {name} was successfully deleted!")),
        ),
        Ok(None) => {
            tracing::warn!(venue_id = id, "delete submitted for missing venue");
            redirect_with(&state, jar, "/venues", failed())
        }
        Err(e) => {
            tracing::error!(error = %e, venue_id = id, "failed to delete venue");
            redirect_with(&state, jar, "/", failed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn listing(id: i32, start: chrono::DateTime<Utc>) -> ShowListing {
        ShowListing {
            id,
            start_time: start.fixed_offset(),
            venue_id: 1,
            venue_name: "The Musical Hop".into(),
            venue_image_link: None,
            artist_id: 4,
            artist_name: "Guns N Petals".into(),
            artist_image_link: Some("https://img.example.com/gnp.jpg".into()),
        }
    }

    fn model() -> venue::Model {
        venue::Model {
            id: 1,
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: Some("123-123-1234".into()),
            image_link: None,
            facebook_link: None,
            website_link: Some("https://www.themusicalhop.com".into()),
            genres: r#"["Jazz","Reggae"]"#.into(),
            seeking_talent: true,
            seeking_description: None,
        }
    }

    #[test]
    fn test_venue_show_formats_start_time() {
        let start = Utc.with_ymd_and_hms(2019, 5, 21, 21, 30, 0).unwrap();
        let show = VenueShow::from(listing(1, start));
        assert_eq!(show.artist_id, 4);
        assert_eq!(show.start_time, "2019-05-21 21:30:00");
        assert_eq!(show.start_time_display, "Tue 05, 21, 2019 9:30PM");
    }

    #[test]
    fn test_detail_counts_and_website_key() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let shows = vec![
            listing(1, now - chrono::Duration::days(3)),
            listing(2, now),
            listing(3, now + chrono::Duration::days(1)),
        ];
        let timeline = Timeline::partition(shows, now, |s| s.start_time);
        let detail = VenueDetail::new(model(), timeline);

        assert_eq!(detail.past_shows_count, 2);
        assert_eq!(detail.upcoming_shows_count, 1);
        assert_eq!(detail.genres, vec!["Jazz".to_string(), "Reggae".to_string()]);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["website"], "https://www.themusicalhop.com");
        assert!(json.get("website_link").is_none());
        assert_eq!(json["upcoming_shows"].as_array().unwrap().len(), 1);
    }
}
