use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use types::{
    CityleagueResult, CityleagueSchedule, Deck, DeckCode, Identifier, LeagueType, Match, Record,
    RecordWithMatches,
};

use crate::DatabaseError;

#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Match with its games in creation order, or `NotFound`. Matches of a
    /// soft-deleted record read as absent.
    async fn find_by_id(&self, id: Identifier) -> Result<Match, DatabaseError>;
    async fn find_by_record_id(&self, record_id: Identifier) -> Result<Vec<Match>, DatabaseError>;
    /// Writes the match row and replaces its whole game set in one transaction.
    async fn save(&self, match_: &Match) -> Result<(), DatabaseError>;
    async fn delete(&self, id: Identifier) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn find_by_id(&self, id: Identifier) -> Result<Record, DatabaseError>;
    async fn find_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Record>, DatabaseError>;
    async fn find_with_matches_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RecordWithMatches>, DatabaseError>;
    async fn save(&self, record: &Record) -> Result<(), DatabaseError>;
    async fn delete(&self, id: Identifier, now: DateTime<Utc>) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait DeckRepository: Send + Sync {
    async fn find_by_id(&self, id: Identifier) -> Result<Deck, DatabaseError>;
    async fn find_by_user_id(
        &self,
        user_id: &str,
        archived: Option<bool>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Deck>, DatabaseError>;
    /// Writes the deck row, plus `latest_deck_code` when it is not stored yet.
    async fn save(&self, deck: &Deck) -> Result<(), DatabaseError>;
    async fn set_archived_at(
        &self,
        id: Identifier,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError>;
    async fn delete(&self, id: Identifier) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait DeckCodeRepository: Send + Sync {
    async fn find_by_id(&self, id: Identifier) -> Result<DeckCode, DatabaseError>;
    async fn find_by_deck_id(&self, deck_id: Identifier) -> Result<Vec<DeckCode>, DatabaseError>;
    async fn save(&self, deck_code: &DeckCode) -> Result<(), DatabaseError>;
    async fn delete(&self, id: Identifier) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait CityleagueRepository: Send + Sync {
    async fn find_schedules(&self) -> Result<Vec<CityleagueSchedule>, DatabaseError>;
    async fn find_schedule_by_id(&self, id: &str) -> Result<CityleagueSchedule, DatabaseError>;
    async fn save_schedule(&self, schedule: &CityleagueSchedule) -> Result<(), DatabaseError>;
    async fn find_results_by_schedule_id(
        &self,
        schedule_id: &str,
        league_type: Option<LeagueType>,
    ) -> Result<Vec<CityleagueResult>, DatabaseError>;
    async fn find_results_by_date(
        &self,
        date: NaiveDate,
        league_type: Option<LeagueType>,
    ) -> Result<Vec<CityleagueResult>, DatabaseError>;
    /// Writes the event row and replaces its placements in one transaction.
    async fn save_result(&self, result: &CityleagueResult) -> Result<(), DatabaseError>;
}
