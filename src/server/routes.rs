//! HTTP handlers and route table.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::auth::{AdminUser, AuthUser, CronCaller};
use super::response::ok;
use super::state::AppState;
use crate::{
    commands::{
        admin::{set_team_mapping, TeamMappingRequest},
        lineups::{my_lineup, submit_lineup, SubmitLineupRequest},
        points::player_points,
        rooms::{
            create_room, join_room, leave_room, list_rooms, room_detail, room_leaderboard,
            CreateRoomRequest, JoinRoomRequest,
        },
        settle::{auto_settle, recalculate_totals, settle_gameweek},
        sync::{
            apply_bootstrap, apply_football_data_matches, apply_fpl_fixtures, apply_player_stats,
            fetch_player_stats, stats_targets, FixtureSource,
        },
    },
    providers::cache::{bootstrap_cache_path, load_or_fetch_bootstrap},
    reconcile::BatchConfig,
    FantasyError, Gameweek, PlayerId, Position, Result, RoomId, TeamId,
};

type Data = web::Data<AppState>;

#[derive(Debug, Deserialize)]
pub struct GameweekQuery {
    pub gameweek: Option<i64>,
}

impl GameweekQuery {
    fn gameweek(&self) -> Result<Option<Gameweek>> {
        self.gameweek.map(Gameweek::checked).transpose()
    }

    fn required(&self) -> Result<Gameweek> {
        self.gameweek()?
            .ok_or_else(|| FantasyError::validation("gameweek is required"))
    }
}

#[derive(Debug, Deserialize)]
pub struct PlayersQuery {
    pub position: Option<String>,
    pub team_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureSyncQuery {
    pub gameweek: Option<i64>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettleQuery {
    pub gameweek: Option<i64>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

// ---------- public ----------

async fn health() -> HttpResponse {
    ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_teams(state: Data) -> Result<HttpResponse> {
    let teams = state.with_db(|db| db.list_teams())?;
    Ok(ok(teams))
}

async fn list_players(state: Data, query: web::Query<PlayersQuery>) -> Result<HttpResponse> {
    let position = query
        .position
        .as_deref()
        .map(str::parse::<Position>)
        .transpose()?;
    let team_id = query.team_id.map(TeamId::new);

    let players = state.with_db(|db| db.list_players(position, team_id))?;
    Ok(ok(players))
}

async fn list_fixtures(state: Data, query: web::Query<GameweekQuery>) -> Result<HttpResponse> {
    let gameweek = query.gameweek()?;
    let fixtures = state.with_db(|db| db.list_fixtures(gameweek))?;
    Ok(ok(fixtures))
}

async fn get_player_points(
    state: Data,
    path: web::Path<i64>,
    query: web::Query<GameweekQuery>,
) -> Result<HttpResponse> {
    let gameweek = query.required()?;
    let player_id = PlayerId::new(path.into_inner());
    let points = state.with_db(|db| player_points(db, player_id, gameweek))?;
    Ok(ok(points))
}

// ---------- rooms ----------

async fn get_rooms(state: Data, user: AuthUser) -> Result<HttpResponse> {
    let rooms = state.with_db(|db| list_rooms(db, &user.id))?;
    Ok(ok(rooms))
}

async fn post_room(
    state: Data,
    user: AuthUser,
    body: web::Json<CreateRoomRequest>,
) -> Result<HttpResponse> {
    let room = state.with_db(|db| create_room(db, &user.id, &body))?;
    Ok(ok(room))
}

async fn post_join(
    state: Data,
    user: AuthUser,
    body: web::Json<JoinRoomRequest>,
) -> Result<HttpResponse> {
    let room = state.with_db(|db| join_room(db, &user.id, &body.code))?;
    Ok(ok(room))
}

async fn get_room(state: Data, user: AuthUser, path: web::Path<i64>) -> Result<HttpResponse> {
    let room_id = RoomId::new(path.into_inner());
    let detail = state.with_db(|db| room_detail(db, &user.id, room_id))?;
    Ok(ok(detail))
}

async fn post_leave(state: Data, user: AuthUser, path: web::Path<i64>) -> Result<HttpResponse> {
    let room_id = RoomId::new(path.into_inner());
    state.with_db(|db| leave_room(db, &user.id, room_id))?;
    Ok(ok(serde_json::json!({ "left": room_id })))
}

async fn get_leaderboard(
    state: Data,
    user: AuthUser,
    path: web::Path<i64>,
    query: web::Query<GameweekQuery>,
) -> Result<HttpResponse> {
    let room_id = RoomId::new(path.into_inner());
    let gameweek = query.gameweek()?;
    let entries = state.with_db(|db| room_leaderboard(db, &user.id, room_id, gameweek))?;
    Ok(ok(entries))
}

// ---------- lineups ----------

async fn post_lineup(
    state: Data,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<SubmitLineupRequest>,
) -> Result<HttpResponse> {
    let room_id = RoomId::new(path.into_inner());
    let view = state.with_db(|db| submit_lineup(db, &user.id, room_id, &body, Utc::now()))?;
    Ok(ok(view))
}

async fn get_my_lineup(
    state: Data,
    user: AuthUser,
    path: web::Path<i64>,
    query: web::Query<GameweekQuery>,
) -> Result<HttpResponse> {
    let room_id = RoomId::new(path.into_inner());
    let gameweek = query.gameweek()?;
    let view = state.with_db(|db| my_lineup(db, &user.id, room_id, gameweek))?;
    Ok(ok(view))
}

// ---------- admin ----------

async fn sync_bootstrap(
    state: Data,
    _admin: AdminUser,
    query: web::Query<BootstrapQuery>,
) -> Result<HttpResponse> {
    let bootstrap =
        load_or_fetch_bootstrap(&state.fpl, &bootstrap_cache_path(), query.refresh).await?;
    let report = state.with_db(|db| apply_bootstrap(db, &bootstrap))?;
    Ok(ok(report))
}

async fn sync_fixtures(
    state: Data,
    _admin: AdminUser,
    query: web::Query<FixtureSyncQuery>,
) -> Result<HttpResponse> {
    let gameweek = query
        .gameweek
        .map(Gameweek::checked)
        .transpose()?
        .ok_or_else(|| FantasyError::validation("gameweek is required"))?;
    let source = match query.source.as_deref() {
        Some(source) => source.parse()?,
        None => FixtureSource::default(),
    };

    let report = match source {
        FixtureSource::Fpl => {
            let fixtures = state.fpl.fixtures(gameweek).await?;
            state.with_db(|db| apply_fpl_fixtures(db, gameweek, &fixtures))?
        }
        FixtureSource::FootballData => {
            let matches = state.football_data()?.matches(gameweek).await?;
            state.with_db(|db| apply_football_data_matches(db, gameweek, &matches))?
        }
    };
    Ok(ok(report))
}

async fn sync_player_stats(
    state: Data,
    _admin: AdminUser,
    query: web::Query<GameweekQuery>,
) -> Result<HttpResponse> {
    let gameweek = query.required()?;

    let targets = state.with_db(|db| stats_targets(db))?;
    let ids: Vec<u32> = targets.iter().map(|(_, id)| *id).collect();
    let summaries = fetch_player_stats(&state.fpl, &ids, BatchConfig::default()).await;

    let report = state.with_db(|db| apply_player_stats(db, gameweek, &targets, &summaries))?;
    Ok(ok(report))
}

async fn settle(
    state: Data,
    _admin: AdminUser,
    query: web::Query<SettleQuery>,
) -> Result<HttpResponse> {
    let gameweek = query
        .gameweek
        .map(Gameweek::checked)
        .transpose()?
        .ok_or_else(|| FantasyError::validation("gameweek is required"))?;
    let report = state.with_db(|db| settle_gameweek(db, gameweek, query.force))?;
    Ok(ok(report))
}

async fn recalculate(state: Data, _admin: AdminUser) -> Result<HttpResponse> {
    let report = state.with_db(recalculate_totals)?;
    Ok(ok(report))
}

async fn post_team_mapping(
    state: Data,
    _admin: AdminUser,
    body: web::Json<TeamMappingRequest>,
) -> Result<HttpResponse> {
    state.with_db(|db| set_team_mapping(db, &body))?;
    Ok(ok(body.into_inner()))
}

async fn diagnostics(state: Data, _admin: AdminUser) -> Result<HttpResponse> {
    let diagnostics = state.with_db(|db| db.diagnostics())?;
    Ok(ok(diagnostics))
}

// ---------- cron ----------

async fn cron_settle(state: Data, _cron: CronCaller) -> Result<HttpResponse> {
    let reports = state.with_db(auto_settle)?;
    Ok(ok(reports))
}

/// Register every route. Malformed query strings and bodies answer with the
/// standard envelope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _| {
        FantasyError::validation(err.to_string()).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _| {
        FantasyError::validation(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _| {
        FantasyError::validation(err.to_string()).into()
    }))
    .route("/health", web::get().to(health))
    .service(
        web::scope("/api")
            .route("/teams", web::get().to(list_teams))
            .route("/players", web::get().to(list_players))
            .route("/players/{id}/points", web::get().to(get_player_points))
            .route("/fixtures", web::get().to(list_fixtures))
            .route("/rooms", web::get().to(get_rooms))
            .route("/rooms", web::post().to(post_room))
            .route("/rooms/join", web::post().to(post_join))
            .route("/rooms/{id}", web::get().to(get_room))
            .route("/rooms/{id}/leave", web::post().to(post_leave))
            .route("/rooms/{id}/leaderboard", web::get().to(get_leaderboard))
            .route("/rooms/{id}/lineups", web::post().to(post_lineup))
            .route("/rooms/{id}/lineups/me", web::get().to(get_my_lineup))
            .service(
                web::scope("/admin")
                    .route("/sync/bootstrap", web::post().to(sync_bootstrap))
                    .route("/sync/fixtures", web::post().to(sync_fixtures))
                    .route("/sync/player-stats", web::post().to(sync_player_stats))
                    .route("/settle", web::post().to(settle))
                    .route("/recalculate-totals", web::post().to(recalculate))
                    .route("/mappings/teams", web::post().to(post_team_mapping))
                    .route("/diagnostics", web::get().to(diagnostics)),
            )
            .route("/cron/settle", web::post().to(cron_settle)),
    );
}
