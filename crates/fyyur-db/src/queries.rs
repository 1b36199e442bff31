//! Read-side queries backing the directory pages.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use serde::Serialize;

use crate::aggregation::{group_by_location, LocationGroup, Timeline};
use crate::entities::{artist, show, venue};

/// A show joined with the display fields of its venue and artist.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ShowListing {
    pub id: i32,
    pub start_time: sea_orm::prelude::DateTimeWithTimeZone,
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFilter {
    All,
    Venue(i32),
    Artist(i32),
}

/// A venue or artist name with its live upcoming-show count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<Summary>,
}

#[derive(Debug, FromQueryResult)]
struct UpcomingCount {
    owner_id: i32,
    upcoming: i64,
}

/// Shows joined with venue and artist, earliest first.
pub async fn show_listings<C: ConnectionTrait>(
    db: &C,
    filter: ShowFilter,
) -> Result<Vec<ShowListing>, DbErr> {
    let mut query = show::Entity::find()
        .select_only()
        .column(show::Column::Id)
        .column(show::Column::StartTime)
        .column(show::Column::VenueId)
        .column(show::Column::ArtistId)
        .column_as(venue::Column::Name, "venue_name")
        .column_as(venue::Column::ImageLink, "venue_image_link")
        .column_as(artist::Column::Name, "artist_name")
        .column_as(artist::Column::ImageLink, "artist_image_link")
        .join(JoinType::InnerJoin, show::Relation::Venue.def())
        .join(JoinType::InnerJoin, show::Relation::Artist.def());

    query = match filter {
        ShowFilter::All => query,
        ShowFilter::Venue(id) => query.filter(show::Column::VenueId.eq(id)),
        ShowFilter::Artist(id) => query.filter(show::Column::ArtistId.eq(id)),
    };

    query
        .order_by_asc(show::Column::StartTime)
        .order_by_asc(show::Column::Id)
        .into_model::<ShowListing>()
        .all(db)
        .await
}

/// Past and upcoming shows of one venue relative to `now`.
pub async fn venue_timeline<C: ConnectionTrait>(
    db: &C,
    venue_id: i32,
    now: DateTime<Utc>,
) -> Result<Timeline<ShowListing>, DbErr> {
    let shows = show_listings(db, ShowFilter::Venue(venue_id)).await?;
    Ok(Timeline::partition(shows, now, |s| s.start_time))
}

/// Past and upcoming shows of one artist relative to `now`.
pub async fn artist_timeline<C: ConnectionTrait>(
    db: &C,
    artist_id: i32,
    now: DateTime<Utc>,
) -> Result<Timeline<ShowListing>, DbErr> {
    let shows = show_listings(db, ShowFilter::Artist(artist_id)).await?;
    Ok(Timeline::partition(shows, now, |s| s.start_time))
}

/// Count shows starting strictly after `now`, keyed by the given owner column.
async fn upcoming_counts<C: ConnectionTrait>(
    db: &C,
    owner: show::Column,
    now: DateTime<Utc>,
) -> Result<HashMap<i32, u64>, DbErr> {
    let rows = show::Entity::find()
        .select_only()
        .column_as(owner, "owner_id")
        .column_as(Expr::col(show::Column::Id).count(), "upcoming")
        .filter(show::Column::StartTime.gt(now.fixed_offset()))
        .group_by(owner)
        .into_model::<UpcomingCount>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.owner_id, r.upcoming.max(0) as u64))
        .collect())
}

pub async fn upcoming_counts_by_venue<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<HashMap<i32, u64>, DbErr> {
    upcoming_counts(db, show::Column::VenueId, now).await
}

pub async fn upcoming_counts_by_artist<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<HashMap<i32, u64>, DbErr> {
    upcoming_counts(db, show::Column::ArtistId, now).await
}

/// All venues grouped by exact (city, state), each with its upcoming-show count.
pub async fn venues_by_location<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<Vec<LocationGroup<Summary>>, DbErr> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::Id)
        .all(db)
        .await?;
    let counts = upcoming_counts_by_venue(db, now).await?;

    let groups = group_by_location(venues, |v| (v.city.as_str(), v.state.as_str()));
    Ok(groups
        .into_iter()
        .map(|g| LocationGroup {
            city: g.city,
            state: g.state,
            venues: g
                .venues
                .into_iter()
                .map(|v| Summary {
                    num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
                    id: v.id,
                    name: v.name,
                })
                .collect(),
        })
        .collect())
}

const LIKE_ESCAPE: char = '!';

/// Build a LIKE pattern matching `term` as a substring.
/// Wildcards in the term are matched literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `LOWER(name) LIKE LOWER(pattern)`. Both sides are folded by the database
/// so a name always matches its own text, whatever `LOWER` covers.
fn name_contains(name: SimpleExpr, term: &str) -> SimpleExpr {
    Expr::cust_with_exprs(
        format!("LOWER($1) LIKE LOWER($2) ESCAPE '{LIKE_ESCAPE}'"),
        [name, Expr::val(like_pattern(term)).into()],
    )
}

/// Case-insensitive substring search over venue names.
pub async fn search_venues<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: DateTime<Utc>,
) -> Result<SearchResults, DbErr> {
    let venues = venue::Entity::find()
        .filter(name_contains(
            Expr::col((venue::Entity, venue::Column::Name)).into(),
            term,
        ))
        .order_by_asc(venue::Column::Id)
        .all(db)
        .await?;
    let counts = upcoming_counts_by_venue(db, now).await?;

    let data: Vec<Summary> = venues
        .into_iter()
        .map(|v| Summary {
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            id: v.id,
            name: v.name,
        })
        .collect();
    Ok(SearchResults {
        count: data.len(),
        data,
    })
}

/// Case-insensitive substring search over artist names.
pub async fn search_artists<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: DateTime<Utc>,
) -> Result<SearchResults, DbErr> {
    let artists = artist::Entity::find()
        .filter(name_contains(
            Expr::col((artist::Entity, artist::Column::Name)).into(),
            term,
        ))
        .order_by_asc(artist::Column::Id)
        .all(db)
        .await?;
    let counts = upcoming_counts_by_artist(db, now).await?;

    let data: Vec<Summary> = artists
        .into_iter()
        .map(|a| Summary {
            num_upcoming_shows: counts.get(&a.id).copied().unwrap_or(0),
            id: a.id,
            name: a.name,
        })
        .collect();
    Ok(SearchResults {
        count: data.len(),
        data,
    })
}

/// Most recently listed venues, newest first.
pub async fn recent_venues<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> Result<Vec<venue::Model>, DbErr> {
    venue::Entity::find()
        .order_by_desc(venue::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Most recently listed artists, newest first.
pub async fn recent_artists<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> Result<Vec<artist::Model>, DbErr> {
    artist::Entity::find()
        .order_by_desc(artist::Column::Id)
        .limit(limit)
        .all(db)
        .await
}
