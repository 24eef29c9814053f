pub mod cityleague;
pub mod deck;
pub mod game;
pub mod grouping;
pub mod id;
pub mod matches;
pub mod record;

pub use cityleague::{CityleagueResult, CityleagueSchedule, EventResult, LeagueType};
pub use deck::{Deck, DeckCode, DeckCodeValues, DeckValues};
pub use game::{Game, GameValues};
pub use grouping::{group_rows, Group, GroupingError};
pub use id::{IdError, IdGenerator, Identifier};
pub use matches::{Match, MatchValues};
pub use record::{Record, RecordValues, RecordWithMatches};
