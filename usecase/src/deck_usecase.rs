use std::sync::Arc;

use chrono::{DateTime, Utc};
use database::DeckRepository;
use types::{Deck, DeckCode, DeckCodeValues, DeckValues, IdGenerator, Identifier};

use crate::{error::UsecaseError, record_usecase::validate_page};

fn validate(values: &DeckValues) -> Result<(), UsecaseError> {
    if values.name.trim().is_empty() {
        return Err(UsecaseError::Validation("deck name is empty".to_string()));
    }
    Ok(())
}

pub struct DeckUsecase<R> {
    repository: R,
    ids: Arc<IdGenerator>,
}

impl<R: DeckRepository> DeckUsecase<R> {
    pub fn new(repository: R, ids: Arc<IdGenerator>) -> Self {
        Self { repository, ids }
    }

    pub async fn find_by_id(&self, id: Identifier) -> Result<Deck, UsecaseError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn find_by_user_id(
        &self,
        user_id: &str,
        archived: Option<bool>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Deck>, UsecaseError> {
        validate_page(limit)?;
        Ok(self
            .repository
            .find_by_user_id(user_id, archived, limit, offset)
            .await?)
    }

    /// Creates the deck and, when given, its first code in one transaction.
    pub async fn create(
        &self,
        values: DeckValues,
        initial_code: Option<DeckCodeValues>,
        now: DateTime<Utc>,
    ) -> Result<Deck, UsecaseError> {
        validate(&values)?;

        let id = self.ids.generate(now)?;
        let latest_deck_code = match initial_code {
            Some(code_values) => Some(DeckCode::from_values(
                self.ids.generate(now)?,
                now,
                id,
                code_values,
            )),
            None => None,
        };
        let deck = Deck {
            id,
            created_at: now,
            archived_at: None,
            user_id: values.user_id,
            name: values.name,
            private_flg: values.private_flg,
            latest_deck_code,
        };

        self.repository.save(&deck).await?;
        log::info!("Created deck {} ({})", deck.id, deck.name);
        Ok(deck)
    }

    pub async fn update(&self, id: Identifier, values: DeckValues) -> Result<Deck, UsecaseError> {
        let existing = self.repository.find_by_id(id).await?;
        validate(&values)?;

        let deck = Deck {
            user_id: values.user_id,
            name: values.name,
            private_flg: values.private_flg,
            ..existing
        };
        self.repository.save(&deck).await?;
        log::info!("Updated deck {}", deck.id);
        Ok(deck)
    }

    pub async fn archive(&self, id: Identifier, now: DateTime<Utc>) -> Result<Deck, UsecaseError> {
        self.repository.set_archived_at(id, Some(now)).await?;
        log::info!("Archived deck {id}");
        self.find_by_id(id).await
    }

    pub async fn unarchive(&self, id: Identifier) -> Result<Deck, UsecaseError> {
        self.repository.set_archived_at(id, None).await?;
        log::info!("Unarchived deck {id}");
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: Identifier) -> Result<(), UsecaseError> {
        self.repository.delete(id).await?;
        log::info!("Deleted deck {id}");
        Ok(())
    }
}
