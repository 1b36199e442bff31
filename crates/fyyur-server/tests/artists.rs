mod common;

use axum::http::StatusCode;
use common::*;
use fyyur_db::entities::artist;
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn test_create_artist_persists_one_row() {
    let state = test_state(test_now()).await;

    let resp = send(
        &state,
        form_post(
            "/artists/create",
            &[
                ("name", "Guns N Petals"),
                ("city", "San Francisco"),
                ("state", "CA"),
                ("phone", "326-123-5000"),
                ("genres", "Rock n Roll"),
                ("seeking_venue", "y"),
            ],
        ),
    )
    .await;
    let target = redirect_target(&resp);
    assert_eq!(artist::Entity::find().count(&state.db).await.unwrap(), 1);

    let id: i32 = target.trim_start_matches("/artists/").parse().unwrap();
    let stored = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .unwrap()
        .expect("artist retrievable by returned id");
    assert_eq!(stored.name, "Guns N Petals");
    assert!(stored.seeking_venue);

    let cookie = flash_cookie(&resp).unwrap();
    let json = body_json(send(&state, get_with_cookie(&target, &cookie)).await).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["flash"]["message"], "Artist Guns N Petals was successfully listed!");
}

#[tokio::test]
async fn test_create_artist_missing_name_persists_nothing() {
    let state = test_state(test_now()).await;

    let resp = send(
        &state,
        form_post(
            "/artists/create",
            &[("city", "San Francisco"), ("state", "CA"), ("genres", "Jazz")],
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(flash_cookie(&resp).is_none());
    let json = body_json(resp).await;
    assert_eq!(json["errors"][0]["field"], "name");
    assert_eq!(json["errors"].as_array().unwrap().len(), 1);

    assert_eq!(artist::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_artists() {
    let state = test_state(test_now()).await;
    seed_artist(&state, "Guns N Petals").await;
    seed_artist(&state, "Matt Quevedo").await;

    let json = body_json(send(&state, get("/artists")).await).await;
    let artists = json["artists"].as_array().unwrap();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[1]["name"], "Matt Quevedo");
    assert!(json.get("flash").is_none());
}

#[tokio::test]
async fn test_search_artists_counts_upcoming() {
    let now = test_now();
    let state = test_state(now).await;
    let venue = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;
    let gnp = seed_artist(&state, "Guns N Petals").await;
    seed_artist(&state, "Matt Quevedo").await;
    seed_artist(&state, "The Wild Sax Band").await;
    seed_show(&state, venue.id, gnp.id, now + hours(24)).await;
    seed_show(&state, venue.id, gnp.id, now - hours(24)).await;

    let json = body_json(send(&state, form_post("/artists/search", &[("search_term", "A")])).await).await;
    assert_eq!(json["results"]["count"], 3);
    assert_eq!(json["results"]["data"][0]["num_upcoming_shows"], 1);
    assert_eq!(json["results"]["data"][1]["num_upcoming_shows"], 0);

    let json = body_json(send(&state, form_post("/artists/search", &[("search_term", "band")])).await).await;
    assert_eq!(json["results"]["count"], 1);
    assert_eq!(json["results"]["data"][0]["name"], "The Wild Sax Band");
}

#[tokio::test]
async fn test_artist_detail_lists_venues() {
    let now = test_now();
    let state = test_state(now).await;
    let venue = seed_venue(&state, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
    let artist = seed_artist(&state, "The Wild Sax Band").await;
    seed_show(&state, venue.id, artist.id, now + hours(3)).await;

    let json = body_json(send(&state, get(&format!("/artists/{}", artist.id))).await).await;
    assert_eq!(json["past_shows_count"], 0);
    assert_eq!(json["upcoming_shows_count"], 1);
    assert_eq!(json["upcoming_shows"][0]["venue_name"], "Park Square Live Music & Coffee");
    assert_eq!(json["upcoming_shows"][0]["venue_id"], venue.id);
}

#[tokio::test]
async fn test_unknown_artist_redirects() {
    let state = test_state(test_now()).await;

    let resp = send(&state, get("/artists/404")).await;
    assert_eq!(redirect_target(&resp), "/artists");

    let resp = send(
        &state,
        form_post(
            "/artists/404/edit",
            &[
                ("name", "Nobody"),
                ("city", "Nowhere"),
                ("state", "CA"),
                ("genres", "Jazz"),
            ],
        ),
    )
    .await;
    assert_eq!(redirect_target(&resp), "/artists");
    assert!(flash_cookie(&resp).is_some());
}

#[tokio::test]
async fn test_edit_artist() {
    let state = test_state(test_now()).await;
    let artist = seed_artist(&state, "Matt Quevedo").await;

    let json = body_json(send(&state, get(&format!("/artists/{}/edit", artist.id))).await).await;
    assert_eq!(json["form"]["name"], "Matt Quevedo");

    let resp = send(
        &state,
        form_post(
            &format!("/artists/{}/edit", artist.id),
            &[
                ("name", "Matt Quevedo"),
                ("city", "New York"),
                ("state", "NY"),
                ("genres", "Jazz"),
                ("seeking_venue", "on"),
            ],
        ),
    )
    .await;
    assert_eq!(redirect_target(&resp), format!("/artists/{}", artist.id));

    let updated = artist::Entity::find_by_id(artist.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.city, "New York");
    assert_eq!(updated.genre_list(), vec!["Jazz".to_string()]);
    assert!(updated.seeking_venue);
    assert_eq!(artist::Entity::find().count(&state.db).await.unwrap(), 1);
}
