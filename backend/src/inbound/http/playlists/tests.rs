//! Handler tests for the playlist endpoints against mocked ports.

use super::*;
use crate::domain::UserId;
use crate::inbound::http::test_utils::{MockPorts, caller, handler_app};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::Utc;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_playlists)
        .service(create_playlist)
        .service(get_playlist)
        .service(update_playlist)
        .service(delete_playlist);
}

fn anime(n: u128) -> AnimeId {
    AnimeId::from_uuid(Uuid::from_u128(n))
}

fn playlist(owner: UserId, title: &str, ids: Vec<AnimeId>) -> Playlist {
    Playlist::new(
        PlaylistId::from_uuid(Uuid::from_u128(500)),
        owner,
        PlaylistTitle::new(title).expect("title"),
        ids,
        Utc::now(),
    )
}

async fn send(ports: MockPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(handler_app(ports.into_state(), routes)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[actix_web::test]
async fn list_wraps_playlists() {
    let mut ports = MockPorts::default();
    ports
        .playlists_query
        .expect_list_playlists()
        .withf(|owner| *owner == caller())
        .return_once(|owner| Ok(vec![playlist(*owner, "Mix", vec![anime(1)])]));

    let (status, body) =
        send(ports, actix_test::TestRequest::get().uri("/api/v1/playlists")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.pointer("/playlists/0/title").and_then(Value::as_str),
        Some("Mix")
    );
    assert_eq!(
        body.pointer("/playlists/0/animeIds/0").and_then(Value::as_str),
        Some(anime(1).to_string().as_str())
    );
}

#[actix_web::test]
async fn create_parses_ids_and_returns_created() {
    let mut ports = MockPorts::default();
    ports
        .playlists
        .expect_create_playlist()
        .withf(|owner, new| {
            *owner == caller()
                && new.title.as_ref() == "Weekend"
                && new.anime_ids == vec![anime(2), anime(1)]
        })
        .times(1)
        .return_once(|owner, new| Ok(playlist(*owner, new.title.as_ref(), new.anime_ids)));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/playlists")
            .set_json(json!({
                "title": " Weekend ",
                "animeIds": [anime(2).to_string(), anime(1).to_string()],
            })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("title").and_then(Value::as_str), Some("Weekend"));
}

#[rstest]
#[case(json!({"title": ""}), "title", "empty_value")]
#[case(json!({"title": "Mix", "animeIds": ["nope"]}), "animeIds", "invalid_uuid")]
#[actix_web::test]
async fn create_rejects_invalid_payloads(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let (status, body) = send(
        MockPorts::default(),
        actix_test::TestRequest::post()
            .uri("/api/v1/playlists")
            .set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    assert_eq!(body.pointer("/details/code").and_then(Value::as_str), Some(code));
}

#[actix_web::test]
async fn get_of_foreign_playlist_is_not_found() {
    let mut ports = MockPorts::default();
    ports
        .playlists_query
        .expect_get_playlist()
        .return_once(|_, _| Err(Error::not_found("playlist not found")));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/playlists/{}", Uuid::nil())),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.get("code").and_then(Value::as_str), Some("not_found"));
}

#[actix_web::test]
async fn update_passes_only_supplied_fields() {
    let mut ports = MockPorts::default();
    ports
        .playlists
        .expect_update_playlist()
        .withf(|owner, _, changes| {
            *owner == caller()
                && changes.title.as_ref().map(AsRef::as_ref) == Some("Renamed")
                && changes.anime_ids.is_none()
        })
        .times(1)
        .return_once(|owner, _, changes| {
            let title = changes.title.expect("title supplied");
            Ok(playlist(*owner, title.as_ref(), Vec::new()))
        });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/playlists/{}", Uuid::from_u128(500)))
            .set_json(json!({"title": "Renamed"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("title").and_then(Value::as_str), Some("Renamed"));
}

#[actix_web::test]
async fn delete_acknowledges() {
    let target = PlaylistId::from_uuid(Uuid::from_u128(500));
    let mut ports = MockPorts::default();
    ports
        .playlists
        .expect_delete_playlist()
        .withf(move |owner, id| *owner == caller() && *id == target)
        .return_once(|_, _| Ok(()));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::delete().uri(&format!("/api/v1/playlists/{target}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Playlist deleted"}));
}

#[actix_web::test]
async fn malformed_ids_are_rejected() {
    let (status, _) = send(
        MockPorts::default(),
        actix_test::TestRequest::delete().uri("/api/v1/playlists/42"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
