//! On-disk storage: data survives reopening and the schema is re-entrant

use fantasy_rooms::{
    commands::rooms::{create_room, CreateRoomRequest},
    storage::{Database, FixtureResult, NewTeam, UpsertOutcome},
    AppConfig, Gameweek, UserId,
};
use tempfile::tempdir;

fn add_team(db: &mut Database, name: &str, short: &str) -> fantasy_rooms::TeamId {
    db.insert_team(&NewTeam {
        name: name.to_string(),
        short_name: short.to_string(),
        color: None,
        logo_url: None,
    })
    .unwrap()
}

#[test]
fn test_database_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("fantasy.db");

    let code = {
        let mut db = Database::open(&path).unwrap();
        let home = add_team(&mut db, "Brighton & Hove Albion", "BHA");
        let away = add_team(&mut db, "Crystal Palace", "CRY");
        db.set_team_mapping("fpl", "5", home).unwrap();

        let outcome = db
            .upsert_fixture_result(&FixtureResult {
                provider_id: Some(55),
                gameweek: Gameweek::new(2),
                home_team_id: home,
                away_team_id: away,
                home_score: Some(0),
                away_score: Some(0),
                finished: true,
                minutes: 90,
                kickoff_time: None,
            })
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let owner = UserId::new("owner");
        db.upsert_user(&owner, Some("owner@example.test")).unwrap();
        create_room(
            &mut db,
            &owner,
            &CreateRoomRequest {
                name: "Seagulls".to_string(),
                capacity: None,
                budget_limit: None,
                active_gameweek: None,
            },
        )
        .unwrap()
        .code
    };

    let db = Database::open(&path).unwrap();
    assert_eq!(db.list_teams().unwrap().len(), 2);
    assert!(db.team_mapping("fpl", "5").unwrap().is_some());
    assert!(db.gameweek_finished(Gameweek::new(2)).unwrap());

    let room = db.get_room_by_code(&code).unwrap().unwrap();
    assert_eq!(room.name, "Seagulls");
    assert_eq!(room.capacity, 10);
    assert_eq!(db.count_active_members(room.id).unwrap(), 1);
}

#[test]
fn test_config_db_path_is_honoured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let configured = path.to_string_lossy().to_string();

    let config = AppConfig::from_lookup(|key| {
        (key == fantasy_rooms::DB_PATH_ENV_VAR).then(|| configured.clone())
    })
    .unwrap();
    assert_eq!(config.db_path, path);

    Database::open(&config.db_path).unwrap();
    assert!(path.exists());

    let overridden = config.with_db_path(Some(dir.path().join("cli.db")));
    assert_eq!(overridden.db_path, dir.path().join("cli.db"));
}
