use std::sync::Arc;

use chrono::{DateTime, Utc};
use database::{DeckCodeRepository, DeckRepository};
use types::{DeckCode, DeckCodeValues, IdGenerator, Identifier};

use crate::error::UsecaseError;

pub struct DeckCodeUsecase<C, D> {
    repository: C,
    decks: D,
    ids: Arc<IdGenerator>,
}

impl<C: DeckCodeRepository, D: DeckRepository> DeckCodeUsecase<C, D> {
    pub fn new(repository: C, decks: D, ids: Arc<IdGenerator>) -> Self {
        Self {
            repository,
            decks,
            ids,
        }
    }

    pub async fn find_by_deck_id(&self, deck_id: Identifier) -> Result<Vec<DeckCode>, UsecaseError> {
        Ok(self.repository.find_by_deck_id(deck_id).await?)
    }

    /// Appends a new snapshot to the deck's history. It becomes the deck's
    /// latest code on the next read.
    pub async fn create(
        &self,
        deck_id: Identifier,
        values: DeckCodeValues,
        now: DateTime<Utc>,
    ) -> Result<DeckCode, UsecaseError> {
        self.decks.find_by_id(deck_id).await?;
        if values.code.trim().is_empty() {
            return Err(UsecaseError::Validation("deck code is empty".to_string()));
        }

        let deck_code = DeckCode::from_values(self.ids.generate(now)?, now, deck_id, values);
        self.repository.save(&deck_code).await?;
        log::info!("Added deck code {} to deck {deck_id}", deck_code.id);
        Ok(deck_code)
    }

    /// Only the visibility flag and memo of a stored code may change.
    pub async fn update(&self, id: Identifier, values: DeckCodeValues) -> Result<DeckCode, UsecaseError> {
        let existing = self.repository.find_by_id(id).await?;
        if values.code != existing.code {
            return Err(UsecaseError::Validation(format!(
                "deck code {id} is immutable: cannot change {} to {}",
                existing.code, values.code
            )));
        }

        let deck_code = DeckCode {
            private_code_flg: values.private_code_flg,
            memo: values.memo,
            ..existing
        };
        self.repository.save(&deck_code).await?;
        Ok(deck_code)
    }

    pub async fn delete(&self, id: Identifier) -> Result<(), UsecaseError> {
        self.repository.delete(id).await?;
        log::info!("Deleted deck code {id}");
        Ok(())
    }
}
