use super::DeckRepository;
use crate::models::{assemble_decks, DeckLatestCodeRow, DECK_LATEST_CODE_COLUMNS};
use crate::DatabaseError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use types::{Deck, Identifier};

/// Joins every deck with the single code row holding its greatest
/// `created_at`, ties broken by the later identifier.
const LATEST_CODE_JOIN: &str = r#"
    decks AS d
        LEFT OUTER JOIN deck_codes AS c ON c.id = (
            SELECT latest.id
            FROM deck_codes AS latest
            WHERE latest.deck_id = d.id
            ORDER BY latest.created_at DESC, latest.id DESC
            LIMIT 1
        )
"#;

pub struct SqliteDeckRepository {
    pool: SqlitePool,
}

impl SqliteDeckRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DeckRepository for SqliteDeckRepository {
    async fn find_by_id(&self, id: Identifier) -> Result<Deck, DatabaseError> {
        let rows: Vec<DeckLatestCodeRow> = sqlx::query_as(&format!(
            "SELECT {DECK_LATEST_CODE_COLUMNS} FROM {LATEST_CODE_JOIN} WHERE d.id = ?"
        ))
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        assemble_decks(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::not_found("Deck", id))
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        archived: Option<bool>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Deck>, DatabaseError> {
        let rows: Vec<DeckLatestCodeRow> = sqlx::query_as(&format!(
            "SELECT {DECK_LATEST_CODE_COLUMNS}
             FROM {LATEST_CODE_JOIN}
             WHERE d.user_id = ?
                 AND (? IS NULL OR (d.archived_at IS NOT NULL) = ?)
             ORDER BY d.created_at DESC, d.id DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(archived)
        .bind(archived)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(assemble_decks(rows)?)
    }

    async fn save(&self, deck: &Deck) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        sqlx::query(
            "INSERT INTO decks (id, created_at, archived_at, user_id, name, private_flg)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 archived_at = excluded.archived_at,
                 user_id = excluded.user_id,
                 name = excluded.name,
                 private_flg = excluded.private_flg",
        )
        .bind(deck.id.to_string())
        .bind(deck.created_at)
        .bind(deck.archived_at)
        .bind(&deck.user_id)
        .bind(&deck.name)
        .bind(deck.private_flg)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if let Some(code) = &deck.latest_deck_code {
            sqlx::query(
                "INSERT INTO deck_codes (id, created_at, user_id, deck_id, code, private_code_flg, memo)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(code.id.to_string())
            .bind(code.created_at)
            .bind(&code.user_id)
            .bind(deck.id.to_string())
            .bind(&code.code)
            .bind(code.private_code_flg)
            .bind(&code.memo)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        tracing::debug!("Saved deck {}", deck.id);
        Ok(())
    }

    async fn set_archived_at(
        &self,
        id: Identifier,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE decks SET archived_at = ? WHERE id = ?")
            .bind(archived_at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Deck", id));
        }
        Ok(())
    }

    async fn delete(&self, id: Identifier) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        sqlx::query("DELETE FROM deck_codes WHERE deck_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let result = sqlx::query("DELETE FROM decks WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Deck", id));
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        tracing::debug!("Deleted deck {id}");
        Ok(())
    }
}
