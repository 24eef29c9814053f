use std::sync::Arc;

use chrono::{DateTime, Utc};
use database::{MatchRepository, RecordRepository};
use types::{Game, IdGenerator, Identifier, Match, MatchValues};

use crate::{error::UsecaseError, reconcile::reconcile_match};

pub struct MatchUsecase<R, Q> {
    repository: R,
    records: Q,
    ids: Arc<IdGenerator>,
}

fn validate(values: &MatchValues) -> Result<(), UsecaseError> {
    if values.default_victory_flg && values.default_defeat_flg {
        return Err(UsecaseError::Validation(
            "a match cannot be both a default victory and a default defeat".to_string(),
        ));
    }
    let max_games = if values.bo3_flg { 3 } else { 1 };
    if values.games.len() > max_games {
        return Err(UsecaseError::Validation(format!(
            "a {} match holds at most {max_games} games, got {}",
            if values.bo3_flg { "best-of-three" } else { "best-of-one" },
            values.games.len()
        )));
    }
    Ok(())
}

impl<R: MatchRepository, Q: RecordRepository> MatchUsecase<R, Q> {
    pub fn new(repository: R, records: Q, ids: Arc<IdGenerator>) -> Self {
        Self {
            repository,
            records,
            ids,
        }
    }

    pub async fn find_by_id(&self, id: Identifier) -> Result<Match, UsecaseError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn find_by_record_id(&self, record_id: Identifier) -> Result<Vec<Match>, UsecaseError> {
        Ok(self.repository.find_by_record_id(record_id).await?)
    }

    pub async fn create(&self, values: MatchValues, now: DateTime<Utc>) -> Result<Match, UsecaseError> {
        validate(&values)?;
        self.records.find_by_id(values.record_id).await?;

        let id = self.ids.generate(now)?;
        let games = values
            .games
            .iter()
            .map(|game_values| -> Result<Game, UsecaseError> {
                Ok(Game::with_values(
                    self.ids.generate(now)?,
                    now,
                    id,
                    values.user_id.clone(),
                    game_values.clone(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let match_ = Match::from_values(id, now, values, games);

        self.repository.save(&match_).await?;
        log::info!("Created match {} with {} games", match_.id, match_.games.len());
        Ok(match_)
    }

    /// Loads the stored match, reconciles its games with `values.games` by
    /// position and saves parent and games in one transaction.
    pub async fn update(
        &self,
        id: Identifier,
        values: MatchValues,
        now: DateTime<Utc>,
    ) -> Result<Match, UsecaseError> {
        let existing = self.repository.find_by_id(id).await?;
        validate(&values)?;
        if values.record_id != existing.record_id {
            self.records.find_by_id(values.record_id).await?;
        }

        let updated = reconcile_match(&existing, values, now, &self.ids)?;

        self.repository.save(&updated).await?;
        log::info!("Updated match {} ({} games)", updated.id, updated.games.len());
        Ok(updated)
    }

    pub async fn delete(&self, id: Identifier) -> Result<(), UsecaseError> {
        self.repository.delete(id).await?;
        log::info!("Deleted match {id}");
        Ok(())
    }
}
