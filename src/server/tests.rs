//! Handler tests against an in-memory store and a fixed token table

use super::auth::StaticTokenVerifier;
use super::*;
use crate::storage::{NewTeam, PlayerUpdate};
use crate::{FantasyError, Position, TeamId};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

const ALICE: &str = "token-alice";
const BOB: &str = "token-bob";
const ADMIN: &str = "token-admin";

fn config(extra: &[(&str, &str)]) -> AppConfig {
    let mut vars = vec![
        (crate::DB_PATH_ENV_VAR, ":memory:"),
        (crate::ADMIN_USER_IDS_ENV_VAR, "admin-id"),
        (crate::CRON_SECRET_ENV_VAR, "s3cret"),
        (crate::FPL_BASE_URL_ENV_VAR, "http://127.0.0.1:9"),
    ];
    vars.extend_from_slice(extra);
    AppConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap()
}

fn seeded_db() -> Database {
    let mut db = Database::new_in_memory().unwrap();
    let team = db
        .insert_team(&NewTeam {
            name: "Arsenal".to_string(),
            short_name: "ARS".to_string(),
            color: Some("#EF0107".to_string()),
            logo_url: None,
        })
        .unwrap();
    for (name, position) in [("David Raya", Position::GK), ("Bukayo Saka", Position::MID)] {
        db.insert_player(&PlayerUpdate {
            name: name.to_string(),
            position,
            team_id: Some(team),
            price: 6.0,
            goals: 0,
            assists: 0,
            total_points: 0,
        })
        .unwrap();
    }
    db
}

fn state_with(config: AppConfig) -> web::Data<AppState> {
    let verifier = StaticTokenVerifier::new()
        .with_user(ALICE, "alice-id", Some("alice@example.test"))
        .with_user(BOB, "bob-id", Some("bob@example.test"))
        .with_user(ADMIN, "admin-id", None);
    web::Data::new(AppState::new(
        config,
        seeded_db(),
        reqwest::Client::new(),
        Arc::new(verifier),
    ))
}

fn state() -> web::Data<AppState> {
    state_with(config(&[]))
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[actix_web::test]
async fn test_public_catalogue() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/teams").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["short_name"], "ARS");

    let req = test::TestRequest::get()
        .uri("/api/players?position=GK")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "David Raya");

    let req = test::TestRequest::get()
        .uri("/api/players?position=QB")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/fixtures?gameweek=39")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_player_points_needs_gameweek() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/players/1/points")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/players/1/points?gameweek=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 0);

    let req = test::TestRequest::get()
        .uri("/api/players/404/points?gameweek=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_rooms_require_authentication() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/rooms").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .insert_header(bearer("forged"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_room_lifecycle() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/rooms")
        .insert_header(bearer(ALICE))
        .set_json(json!({"name": "Sunday League", "capacity": 4}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    let room_id = body["data"]["id"].as_i64().unwrap();
    let code = body["data"]["code"].as_str().unwrap().to_string();

    // Bob is not a member yet
    let req = test::TestRequest::get()
        .uri(&format!("/api/rooms/{}", room_id))
        .insert_header(bearer(BOB))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/rooms/join")
        .insert_header(bearer(BOB))
        .set_json(json!({"code": code.to_lowercase()}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/rooms/join")
        .insert_header(bearer(BOB))
        .set_json(json!({"code": code}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/rooms/{}/leaderboard", room_id))
        .insert_header(bearer(BOB))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // no points yet: join order decides
    assert_eq!(entries[0]["user_id"], "alice-id");
    assert_eq!(entries[0]["email"], "alice@example.test");

    let req = test::TestRequest::post()
        .uri(&format!("/api/rooms/{}/leave", room_id))
        .insert_header(bearer(ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/rooms/{}/leave", room_id))
        .insert_header(bearer(BOB))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .insert_header(bearer(BOB))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_lineup_endpoints_validate() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/rooms")
        .insert_header(bearer(ALICE))
        .set_json(json!({"name": "Lineup Room"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let room_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/rooms/{}/lineups", room_id))
        .insert_header(bearer(ALICE))
        .set_json(json!({
            "formation": "4-4-2",
            "players": [{"player_id": 1, "is_starter": true, "is_captain": true}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("15 players"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/rooms/{}/lineups/me?gameweek=1", room_id))
        .insert_header(bearer(ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/api/rooms/{}/lineups", room_id))
        .insert_header(bearer(ALICE))
        .set_json(json!({"formation": 442}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_admin_routes_check_allow_list() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/diagnostics")
        .insert_header(bearer(ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/admin/diagnostics")
        .insert_header(bearer(ADMIN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["teams"], 1);
    assert_eq!(body["data"]["players"], 2);

    let req = test::TestRequest::post()
        .uri("/api/admin/mappings/teams")
        .insert_header(bearer(ADMIN))
        .set_json(json!({"provider": "football-data", "external_id": "57", "team_id": 1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/admin/settle?gameweek=1")
        .insert_header(bearer(ADMIN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // no fixtures synced, so the gameweek is not finished
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/admin/settle?gameweek=1&force=true")
        .insert_header(bearer(ADMIN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["forced"], true);

    let req = test::TestRequest::post()
        .uri("/api/admin/recalculate-totals")
        .insert_header(bearer(ADMIN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/admin/sync/fixtures?gameweek=1&source=football-data")
        .insert_header(bearer(ADMIN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // no Football-Data key configured
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[::core::prelude::v1::test]
fn test_football_data_client_needs_key() {
    let err = state_with(config(&[])).football_data().unwrap_err();
    assert!(matches!(
        err,
        FantasyError::MissingConfig { ref env_var } if env_var == crate::FOOTBALL_DATA_API_KEY_ENV_VAR
    ));

    let keyed = state_with(config(&[(crate::FOOTBALL_DATA_API_KEY_ENV_VAR, "fd-key")]));
    assert!(keyed.football_data().is_ok());
}

#[actix_web::test]
async fn test_team_mapping_is_stored() {
    let state = state();
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/mappings/teams")
        .insert_header(bearer(ADMIN))
        .set_json(json!({"provider": "fpl", "external_id": "1", "team_id": 1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let mapped = state
        .with_db(|db| db.team_mapping("fpl", "1"))
        .unwrap();
    assert_eq!(mapped, Some(TeamId::new(1)));
}

#[actix_web::test]
async fn test_cron_secret() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::post().uri("/api/cron/settle").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/cron/settle")
        .insert_header(bearer("wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/cron/settle")
        .insert_header(bearer("s3cret"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_cron_open_in_development() {
    let state = state_with(config(&[(crate::APP_ENV_ENV_VAR, "development")]));
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let req = test::TestRequest::post().uri("/api/cron/settle").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
