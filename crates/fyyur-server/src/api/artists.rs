use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::{CookieJar, Form};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;

use super::{invalid_form, redirect_with, render, EntityId, FormPage, Page, SearchForm, SearchPage};
use crate::error::AppError;
use crate::flash::Flash;
use crate::forms::{ArtistForm, ArtistRecord};
use fyyur_db::aggregation::{format_start_time, DateFormat, Timeline};
use fyyur_db::entities::artist;
use fyyur_db::queries::{self, ShowListing};
use fyyur_db::{genres, AppState};

#[derive(Debug, Serialize)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistsPage {
    pub artists: Vec<ArtistSummary>,
}

/// A show as listed on an artist page: the venue side of the booking.
#[derive(Debug, Serialize)]
pub struct ArtistShow {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
    pub start_time_display: String,
}

impl From<ShowListing> for ArtistShow {
    fn from(s: ShowListing) -> Self {
        Self {
            venue_id: s.venue_id,
            venue_name: s.venue_name,
            venue_image_link: s.venue_image_link,
            start_time: format_start_time(&s.start_time, DateFormat::Raw),
            start_time_display: format_start_time(&s.start_time, DateFormat::Medium),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ArtistShow>,
    pub upcoming_shows: Vec<ArtistShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl ArtistDetail {
    pub fn new(a: artist::Model, timeline: Timeline<ShowListing>) -> Self {
        let genres = a.genre_list();
        let past_shows_count = timeline.past_count();
        let upcoming_shows_count = timeline.upcoming_count();
        let timeline = timeline.map(ArtistShow::from);
        Self {
            id: a.id,
            name: a.name,
            genres,
            city: a.city,
            state: a.state,
            phone: a.phone,
            website: a.website_link,
            facebook_link: a.facebook_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
            image_link: a.image_link,
            past_shows: timeline.past,
            upcoming_shows: timeline.upcoming,
            past_shows_count,
            upcoming_shows_count,
        }
    }
}

fn apply(active: &mut artist::ActiveModel, record: ArtistRecord) {
    active.name = Set(record.name);
    active.city = Set(record.city);
    active.state = Set(record.state);
    active.phone = Set(record.phone);
    active.image_link = Set(record.image_link);
    active.facebook_link = Set(record.facebook_link);
    active.website_link = Set(record.website_link);
    active.genres = Set(genres::encode(&record.genres));
    active.seeking_venue = Set(record.seeking_venue);
    active.seeking_description = Set(record.seeking_description);
}

async fn insert_artist<C>(db: &C, record: ArtistRecord) -> Result<artist::Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let mut active = artist::ActiveModel {
        ..Default::default()
    };
    apply(&mut active, record);
    let model = active.insert(&txn).await?;
    txn.commit().await?;
    Ok(model)
}

async fn replace_artist<C>(
    db: &C,
    id: i32,
    record: ArtistRecord,
) -> Result<Option<artist::Model>, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let Some(existing) = artist::Entity::find_by_id(id).one(&txn).await? else {
        return Ok(None);
    };
    let mut active: artist::ActiveModel = existing.into();
    apply(&mut active, record);
    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok(Some(model))
}

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<ArtistsPage>>), AppError> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| ArtistSummary {
            id: a.id,
            name: a.name,
        })
        .collect();
    Ok(render(jar, ArtistsPage { artists }))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> Result<(CookieJar, Json<Page<SearchPage>>), AppError> {
    let results = queries::search_artists(&state.db, &form.search_term, state.now()).await?;
    Ok(render(
        jar,
        SearchPage {
            search_term: form.search_term,
            results,
        },
    ))
}

/// GET /artists/{id}
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let Some(artist) = artist::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(Redirect::to("/artists").into_response());
    };
    let timeline = queries::artist_timeline(&state.db, id, state.now()).await?;
    Ok(render(jar, ArtistDetail::new(artist, timeline)).into_response())
}

/// GET /artists/create
pub async fn create_artist_form(
    jar: CookieJar,
) -> (CookieJar, Json<Page<FormPage<ArtistForm>>>) {
    render(jar, FormPage::new(None, ArtistForm::default()))
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ArtistForm>,
) -> Response {
    let record = match form.validate() {
        Ok(record) => record,
        Err(errors) => return invalid_form(jar, None, form, errors),
    };
    let name = record.name.clone();

    match insert_artist(&state.db, record).await {
        Ok(artist) => {
            tracing::info!(artist_id = artist.id, name = %artist.name, "artist listed");
            redirect_with(
                &state,
                jar,
                &format!("/artists/{}", artist.id),
                Flash::success(format!("Artist {name} was successfully listed!")),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, name = %name, "failed to list artist");
            redirect_with(
                &state,
                jar,
                "/",
                Flash::error(format!("An error occurred. Artist {name} could not be listed.")),
            )
        }
    }
}

/// GET /artists/{id}/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let Some(artist) = artist::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(Redirect::to("/artists").into_response());
    };
    let page = FormPage::new(Some(id), ArtistForm::from(&artist));
    Ok(render(jar, page).into_response())
}

/// POST /artists/{id}/edit
pub async fn edit_artist(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(id): EntityId,
    Form(form): Form<ArtistForm>,
) -> Response {
    let record = match form.validate() {
        Ok(record) => record,
        Err(errors) => return invalid_form(jar, Some(id), form, errors),
    };
    let name = record.name.clone();
    let failed = || Flash::error(format!("An error occurred. Artist {name} could not be updated."));

    match replace_artist(&state.db, id, record).await {
        Ok(Some(_)) => {
            tracing::info!(artist_id = id, "artist updated");
            redirect_with(
                &state,
                jar,
                &format!("/artists/{id}"),
                Flash::success(format!("Artist {name} was successfully updated!")),
            )
        }
        Ok(None) => {
            tracing::warn!(artist_id = id, "edit submitted for missing artist");
            redirect_with(&state, jar, "/artists", failed())
        }
        Err(e) => {
            tracing::error!(error = %e, artist_id = id, "failed to update artist");
            redirect_with(&state, jar, "/", failed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_artist_show_carries_venue_side() {
        let start = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap();
        let show = ArtistShow::from(ShowListing {
            id: 7,
            start_time: start.fixed_offset(),
            venue_id: 3,
            venue_name: "Park Square Live Music & Coffee".into(),
            venue_image_link: None,
            artist_id: 6,
            artist_name: "The Wild Sax Band".into(),
            artist_image_link: None,
        });
        assert_eq!(show.venue_id, 3);
        assert_eq!(show.venue_name, "Park Square Live Music & Coffee");
        assert_eq!(show.start_time, "2035-04-01 20:00:00");
    }

    #[test]
    fn test_detail_without_shows() {
        let model = artist::Model {
            id: 5,
            name: "Matt Quevedo".into(),
            city: "New York".into(),
            state: "NY".into(),
            phone: None,
            image_link: None,
            facebook_link: None,
            website_link: None,
            genres: String::new(),
            seeking_venue: false,
            seeking_description: None,
        };
        let detail = ArtistDetail::new(model, Timeline::default());
        assert!(detail.genres.is_empty());
        assert_eq!(detail.past_shows_count, 0);
        assert_eq!(detail.upcoming_shows_count, 0);
    }
}
