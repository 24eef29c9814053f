use super::DeckCodeRepository;
use crate::models::DeckCodeRow;
use crate::DatabaseError;
use sqlx::SqlitePool;
use types::{DeckCode, Identifier};

pub struct SqliteDeckCodeRepository {
    pool: SqlitePool,
}

impl SqliteDeckCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DeckCodeRepository for SqliteDeckCodeRepository {
    async fn find_by_id(&self, id: Identifier) -> Result<DeckCode, DatabaseError> {
        let row: Option<DeckCodeRow> = sqlx::query_as(
            "SELECT id, created_at, user_id, deck_id, code, private_code_flg, memo FROM deck_codes WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        match row {
            Some(row) => Ok(row.to_deck_code()?),
            None => Err(DatabaseError::not_found("DeckCode", id)),
        }
    }

    async fn find_by_deck_id(&self, deck_id: Identifier) -> Result<Vec<DeckCode>, DatabaseError> {
        let rows: Vec<DeckCodeRow> = sqlx::query_as(
            "SELECT id, created_at, user_id, deck_id, code, private_code_flg, memo
             FROM deck_codes
             WHERE deck_id = ?
             ORDER BY created_at, id",
        )
        .bind(deck_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows
            .iter()
            .map(DeckCodeRow::to_deck_code)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn save(&self, deck_code: &DeckCode) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO deck_codes (id, created_at, user_id, deck_id, code, private_code_flg, memo)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 private_code_flg = excluded.private_code_flg,
                 memo = excluded.memo",
        )
        .bind(deck_code.id.to_string())
        .bind(deck_code.created_at)
        .bind(&deck_code.user_id)
        .bind(deck_code.deck_id.to_string())
        .bind(&deck_code.code)
        .bind(deck_code.private_code_flg)
        .bind(&deck_code.memo)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        tracing::debug!("Saved deck code {} of deck {}", deck_code.id, deck_code.deck_id);
        Ok(())
    }

    async fn delete(&self, id: Identifier) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM deck_codes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("DeckCode", id));
        }
        Ok(())
    }
}
