//! Integration tests for the SQLite repositories through the public API:
//! config, pool creation, schema bootstrap and trait objects.

use chrono::{Duration, Utc};
use database::{
    create_schema, DatabaseConfig, DeckRepository, MatchRepository, RecordRepository,
    SqliteDeckRepository, SqliteMatchRepository, SqliteRecordRepository,
};
use types::{Deck, DeckCode, Game, IdGenerator, Match, Record};

async fn setup_pool() -> sqlx::SqlitePool {
    let config = DatabaseConfig::from_cli_or_env_or_yaml(Some("sqlite::memory:".to_string()), None);
    let pool = config.create_pool().await.expect("Failed to connect");
    create_schema(&pool).await.expect("Failed to create schema");
    pool
}

/// Schema bootstrap can run more than once against the same database
#[tokio::test]
async fn test_schema_is_idempotent() {
    let pool = setup_pool().await;

    create_schema(&pool)
        .await
        .expect("Second schema run should succeed");
}

/// A fresh database is usable right after connecting, without a separate
/// schema step
#[tokio::test]
async fn test_connect_bootstraps_schema() {
    let config = DatabaseConfig::from_cli_or_env_or_yaml(Some("sqlite::memory:".to_string()), None);
    let pool = config.connect().await.expect("Failed to connect");
    let records = SqliteRecordRepository::new(pool);

    let found = records
        .find_by_user_id("user-1", 10, 0)
        .await
        .expect("Schema should exist after connect");
    assert!(found.is_empty());
}

/// Repositories work behind trait objects
#[tokio::test]
async fn test_repositories_as_trait_objects() {
    let pool = setup_pool().await;
    let ids = IdGenerator::new();
    let now = Utc::now();

    let records: Box<dyn RecordRepository> = Box::new(SqliteRecordRepository::new(pool.clone()));
    let matches: Box<dyn MatchRepository> = Box::new(SqliteMatchRepository::new(pool));

    let record = Record {
        id: ids.generate(now).unwrap(),
        created_at: now,
        official_event_id: None,
        tonamel_event_id: "tonamel-1".to_string(),
        friend_id: String::new(),
        user_id: "user-1".to_string(),
        deck_id: None,
        deck_code_id: None,
        private_flg: true,
        tcg_meister_url: String::new(),
        memo: String::new(),
    };
    records.save(&record).await.expect("Failed to save record");

    let match_id = ids.generate(now).unwrap();
    let match_ = Match {
        id: match_id,
        created_at: now,
        record_id: record.id,
        deck_id: None,
        user_id: "user-1".to_string(),
        opponents_user_id: String::new(),
        bo3_flg: false,
        qualifying_round_flg: false,
        final_tournament_flg: true,
        default_victory_flg: false,
        default_defeat_flg: false,
        victory_flg: true,
        opponents_deck_info: "Gardevoir ex".to_string(),
        memo: String::new(),
        games: vec![Game {
            id: ids.generate(now).unwrap(),
            created_at: now,
            match_id,
            user_id: "user-1".to_string(),
            go_first: true,
            winning_flg: true,
            your_prize_cards: 6,
            opponents_prize_cards: 4,
            memo: "turn two Iono".to_string(),
        }],
    };
    matches.save(&match_).await.expect("Failed to save match");

    let found = matches
        .find_by_record_id(record.id)
        .await
        .expect("Failed to load matches");
    assert_eq!(found, vec![match_]);
}

/// A deck saved with its first code resolves that code as the latest one
#[tokio::test]
async fn test_deck_saved_with_initial_code() {
    let pool = setup_pool().await;
    let ids = IdGenerator::new();
    let now = Utc::now();
    let decks = SqliteDeckRepository::new(pool);

    let deck_id = ids.generate(now).unwrap();
    let deck = Deck {
        id: deck_id,
        created_at: now,
        archived_at: None,
        user_id: "user-1".to_string(),
        name: "Miraidon".to_string(),
        private_flg: false,
        latest_deck_code: Some(DeckCode {
            id: ids.generate(now + Duration::milliseconds(1)).unwrap(),
            created_at: now + Duration::milliseconds(1),
            user_id: "user-1".to_string(),
            deck_id,
            code: "xY4cc8-abc123-Def456".to_string(),
            private_code_flg: true,
            memo: String::new(),
        }),
    };
    decks.save(&deck).await.expect("Failed to save deck");

    let found = decks.find_by_id(deck_id).await.expect("Failed to find deck");
    assert_eq!(found, deck);
}
