use sqlx::SqlitePool;

use crate::DatabaseError;

/// Tables backing every repository in this crate. Idempotent.
pub const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS records (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        deleted_at TEXT,
        official_event_id INTEGER,
        tonamel_event_id TEXT NOT NULL DEFAULT '',
        friend_id TEXT NOT NULL DEFAULT '',
        user_id TEXT NOT NULL,
        deck_id TEXT,
        deck_code_id TEXT,
        private_flg BOOLEAN NOT NULL DEFAULT FALSE,
        tcg_meister_url TEXT NOT NULL DEFAULT '',
        memo TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS records_user_id_created_at ON records (user_id, created_at);

    CREATE TABLE IF NOT EXISTS matches (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        record_id TEXT NOT NULL REFERENCES records(id),
        deck_id TEXT,
        user_id TEXT NOT NULL,
        opponents_user_id TEXT NOT NULL DEFAULT '',
        bo3_flg BOOLEAN NOT NULL DEFAULT FALSE,
        qualifying_round_flg BOOLEAN NOT NULL DEFAULT FALSE,
        final_tournament_flg BOOLEAN NOT NULL DEFAULT FALSE,
        default_victory_flg BOOLEAN NOT NULL DEFAULT FALSE,
        default_defeat_flg BOOLEAN NOT NULL DEFAULT FALSE,
        victory_flg BOOLEAN NOT NULL DEFAULT FALSE,
        opponents_deck_info TEXT NOT NULL DEFAULT '',
        memo TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS matches_record_id ON matches (record_id, created_at);

    CREATE TABLE IF NOT EXISTS games (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        match_id TEXT NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL,
        go_first BOOLEAN NOT NULL DEFAULT FALSE,
        winning_flg BOOLEAN NOT NULL DEFAULT FALSE,
        your_prize_cards INTEGER NOT NULL DEFAULT 0 CHECK (your_prize_cards >= 0),
        opponents_prize_cards INTEGER NOT NULL DEFAULT 0 CHECK (opponents_prize_cards >= 0),
        memo TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS games_match_id ON games (match_id, created_at);

    CREATE TABLE IF NOT EXISTS decks (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        archived_at TEXT,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        private_flg BOOLEAN NOT NULL DEFAULT FALSE
    );

    CREATE TABLE IF NOT EXISTS deck_codes (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        user_id TEXT NOT NULL,
        deck_id TEXT NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
        code TEXT NOT NULL,
        private_code_flg BOOLEAN NOT NULL DEFAULT FALSE,
        memo TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS deck_codes_deck_id ON deck_codes (deck_id, created_at);

    CREATE TABLE IF NOT EXISTS cityleague_schedules (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        from_date TEXT NOT NULL,
        to_date TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cityleague_results (
        official_event_id INTEGER PRIMARY KEY,
        cityleague_schedule_id TEXT NOT NULL REFERENCES cityleague_schedules(id),
        league_type TEXT NOT NULL,
        event_date TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS event_results (
        official_event_id INTEGER NOT NULL
            REFERENCES cityleague_results(official_event_id) ON DELETE CASCADE,
        player_id TEXT NOT NULL,
        player_name TEXT NOT NULL,
        rank INTEGER NOT NULL CHECK (rank >= 0),
        point INTEGER NOT NULL CHECK (point >= 0),
        deck_code TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (official_event_id, player_id)
    );
"#;

pub async fn create_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
    tracing::info!("Database schema is in place");
    Ok(())
}
