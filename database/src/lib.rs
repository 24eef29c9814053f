pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod retry;
pub mod schema;


pub use config::{DatabaseConfig, DatabaseSettings};
pub use error::DatabaseError;
pub use repositories::{
    CityleagueRepository, DeckCodeRepository, DeckRepository, MatchRepository, RecordRepository,
    SqliteCityleagueRepository, SqliteDeckCodeRepository, SqliteDeckRepository,
    SqliteMatchRepository, SqliteRecordRepository,
};
pub use retry::retry_with_backoff;
pub use schema::create_schema;
