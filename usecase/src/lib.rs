pub mod cityleague_usecase;
pub mod deck_code_usecase;
pub mod deck_usecase;
pub mod error;
pub mod match_usecase;
pub mod reconcile;
pub mod record_usecase;

pub use cityleague_usecase::CityleagueUsecase;
pub use deck_code_usecase::DeckCodeUsecase;
pub use deck_usecase::DeckUsecase;
pub use error::UsecaseError;
pub use match_usecase::MatchUsecase;
pub use reconcile::{reconcile_games, reconcile_match};
pub use record_usecase::{RecordUsecase, MAX_PAGE_SIZE};
