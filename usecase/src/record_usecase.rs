use std::sync::Arc;

use chrono::{DateTime, Utc};
use database::RecordRepository;
use types::{IdGenerator, Identifier, Record, RecordValues, RecordWithMatches};

use crate::error::UsecaseError;

pub const MAX_PAGE_SIZE: u32 = 100;

pub(crate) fn validate_page(limit: u32) -> Result<(), UsecaseError> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(UsecaseError::Validation(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
        )));
    }
    Ok(())
}

fn validate(values: &RecordValues) -> Result<(), UsecaseError> {
    if values.user_id.is_empty() {
        return Err(UsecaseError::Validation("record needs a user".to_string()));
    }
    if values.deck_code_id.is_some() && values.deck_id.is_none() {
        return Err(UsecaseError::Validation(
            "a deck code can only be attached together with its deck".to_string(),
        ));
    }
    Ok(())
}

pub struct RecordUsecase<R> {
    repository: R,
    ids: Arc<IdGenerator>,
}

impl<R: RecordRepository> RecordUsecase<R> {
    pub fn new(repository: R, ids: Arc<IdGenerator>) -> Self {
        Self { repository, ids }
    }

    pub async fn find_by_id(&self, id: Identifier) -> Result<Record, UsecaseError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn find_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Record>, UsecaseError> {
        validate_page(limit)?;
        Ok(self.repository.find_by_user_id(user_id, limit, offset).await?)
    }

    pub async fn find_with_matches_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RecordWithMatches>, UsecaseError> {
        validate_page(limit)?;
        Ok(self
            .repository
            .find_with_matches_by_user_id(user_id, limit, offset)
            .await?)
    }

    pub async fn create(&self, values: RecordValues, now: DateTime<Utc>) -> Result<Record, UsecaseError> {
        validate(&values)?;
        let record = Record::from_values(self.ids.generate(now)?, now, values);
        self.repository.save(&record).await?;
        log::info!("Created record {}", record.id);
        Ok(record)
    }

    pub async fn update(&self, id: Identifier, values: RecordValues) -> Result<Record, UsecaseError> {
        let existing = self.repository.find_by_id(id).await?;
        validate(&values)?;
        let record = Record::from_values(existing.id, existing.created_at, values);
        self.repository.save(&record).await?;
        log::info!("Updated record {}", record.id);
        Ok(record)
    }

    pub async fn delete(&self, id: Identifier, now: DateTime<Utc>) -> Result<(), UsecaseError> {
        self.repository.delete(id, now).await?;
        log::info!("Deleted record {id}");
        Ok(())
    }
}
