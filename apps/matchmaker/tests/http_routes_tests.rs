//! Front-door tests: routes, status codes and problem+json bodies.

mod common;
mod support;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::assert_problem_details;
use matchmaker::{routes, RequestTrace};
use serde_json::{json, Value};
use support::{seed_players, test_state};

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestTrace)
                .app_data(web::Data::new($state))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn create_then_close_round_trip() {
    let state = test_state(100).await;
    seed_players(&state, 3).await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/games/create").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key("x-trace-id"));
    let game_id: String = test::read_body_json(resp).await;

    let view: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/games/{game_id}")).to_request(),
    )
    .await;
    assert_eq!(view["gameUUID"], game_id);
    assert_eq!(view["players"].as_array().unwrap().len(), 3);
    assert!(view["winner"].is_null());
    assert!(view["finished"].is_null());

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/games/close")
            .set_json(json!({ "gameUUID": game_id }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let winner: String = test::read_body_json(resp).await;
    assert!(view["players"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p == &Value::String(winner.clone())));

    let view: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/games/{game_id}")).to_request(),
    )
    .await;
    assert_eq!(view["winner"], winner);
    assert!(view["finished"].is_string());
}

#[actix_web::test]
async fn closing_twice_is_409() {
    let state = test_state(100).await;
    seed_players(&state, 2).await;
    let game_id = state.matchmaking.create_game().await.unwrap();
    state.matchmaking.close_game(&game_id).await.unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/games/close")
            .set_json(json!({ "gameUUID": game_id }))
            .to_request(),
    )
    .await;
    assert_problem_details(resp, 409, "GAME_ALREADY_CLOSED").await;
}

#[actix_web::test]
async fn closing_unknown_game_is_404() {
    let state = test_state(100).await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/games/close")
            .set_json(json!({ "gameUUID": "nonexistent" }))
            .to_request(),
    )
    .await;
    assert_problem_details(resp, 404, "GAME_NOT_FOUND").await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/games/nonexistent").to_request()).await;
    assert_problem_details(resp, 404, "GAME_NOT_FOUND").await;
}

#[actix_web::test]
async fn closing_empty_game_is_409_empty_roster() {
    let state = test_state(100).await;
    let game_id = state.matchmaking.create_game().await.unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/games/close")
            .set_json(json!({ "gameUUID": game_id }))
            .to_request(),
    )
    .await;
    assert_problem_details(resp, 409, "EMPTY_ROSTER").await;
}

#[actix_web::test]
async fn malformed_close_body_is_400() {
    let state = test_state(100).await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/games/close")
            .set_json(json!({ "game": "x" }))
            .to_request(),
    )
    .await;
    assert_problem_details(resp, 400, "BAD_REQUEST").await;
}

#[actix_web::test]
async fn player_profile_endpoints() {
    let state = test_state(100).await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/players")
            .set_json(json!({ "player_name": "Ada", "email": "ada@example.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let player_id: String = test::read_body_json(resp).await;

    let ids: Vec<String> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/players").to_request()).await;
    assert_eq!(ids, vec![player_id.clone()]);

    let view: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/players/{player_id}")).to_request(),
    )
    .await;
    assert_eq!(view["playerUUID"], player_id);
    assert_eq!(view["player_name"], "Ada");
    assert_eq!(view["stats"]["games_played"], 0);
    assert!(view["current_game"].is_null());

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/players")
            .set_json(json!({ "player_name": "Ada 2", "email": "ada@example.com" }))
            .to_request(),
    )
    .await;
    assert_problem_details(resp, 409, "EMAIL_TAKEN").await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/players")
            .set_json(json!({ "player_name": "Bob", "email": "bob" }))
            .to_request(),
    )
    .await;
    assert_problem_details(resp, 400, "INVALID_EMAIL").await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/players/nobody").to_request()).await;
    assert_problem_details(resp, 404, "PLAYER_NOT_FOUND").await;
}

#[actix_web::test]
async fn health_reports_db_and_migration() {
    let state = test_state(100).await;
    let app = app!(state);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert_eq!(body["migrations"], "m20261015_000001_init");
    assert!(body.get("db_error").is_none());
}
