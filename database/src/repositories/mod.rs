pub mod cityleague_repository;
pub mod deck_code_repository;
pub mod deck_repository;
pub mod match_repository;
pub mod record_repository;
pub mod traits;

pub use cityleague_repository::SqliteCityleagueRepository;
pub use deck_code_repository::SqliteDeckCodeRepository;
pub use deck_repository::SqliteDeckRepository;
pub use match_repository::SqliteMatchRepository;
pub use record_repository::SqliteRecordRepository;
pub use traits::{
    CityleagueRepository, DeckCodeRepository, DeckRepository, MatchRepository, RecordRepository,
};
