use super::RecordRepository;
use crate::models::{
    assemble_records_with_matches, RecordMatchGameRow, RecordRow, RECORD_COLUMNS,
    RECORD_MATCH_GAME_COLUMNS,
};
use crate::DatabaseError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use types::{Identifier, Record, RecordWithMatches};

pub struct SqliteRecordRepository {
    pool: SqlitePool,
}

impl SqliteRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecordRepository for SqliteRecordRepository {
    async fn find_by_id(&self, id: Identifier) -> Result<Record, DatabaseError> {
        let row: Option<RecordRow> = sqlx::query_as(&format!(
            "SELECT {RECORD_COLUMNS} FROM records AS r WHERE r.id = ? AND r.deleted_at IS NULL"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        match row {
            Some(row) => Ok(row.to_record()?),
            None => Err(DatabaseError::not_found("Record", id)),
        }
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Record>, DatabaseError> {
        let rows: Vec<RecordRow> = sqlx::query_as(&format!(
            "SELECT {RECORD_COLUMNS}
             FROM records AS r
             WHERE r.user_id = ? AND r.deleted_at IS NULL
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows
            .iter()
            .map(RecordRow::to_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_with_matches_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RecordWithMatches>, DatabaseError> {
        // The page is cut on records first so that LIMIT counts records, not joined rows.
        let rows: Vec<RecordMatchGameRow> = sqlx::query_as(&format!(
            "SELECT {RECORD_COLUMNS}, {RECORD_MATCH_GAME_COLUMNS}
             FROM (
                 SELECT *
                 FROM records
                 WHERE user_id = ? AND deleted_at IS NULL
                 ORDER BY created_at DESC, id DESC
                 LIMIT ? OFFSET ?
             ) AS r
                 LEFT OUTER JOIN matches AS m ON m.record_id = r.id
                 LEFT OUTER JOIN games AS g ON g.match_id = m.id
             ORDER BY r.created_at DESC, r.id DESC, m.created_at, m.id, g.created_at, g.id"
        ))
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(assemble_records_with_matches(rows)?)
    }

    async fn save(&self, record: &Record) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO records (id, created_at, official_event_id, tonamel_event_id, friend_id, user_id, deck_id, deck_code_id, private_flg, tcg_meister_url, memo)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 official_event_id = excluded.official_event_id,
                 tonamel_event_id = excluded.tonamel_event_id,
                 friend_id = excluded.friend_id,
                 user_id = excluded.user_id,
                 deck_id = excluded.deck_id,
                 deck_code_id = excluded.deck_code_id,
                 private_flg = excluded.private_flg,
                 tcg_meister_url = excluded.tcg_meister_url,
                 memo = excluded.memo",
        )
        .bind(record.id.to_string())
        .bind(record.created_at)
        .bind(record.official_event_id.map(i64::from))
        .bind(&record.tonamel_event_id)
        .bind(&record.friend_id)
        .bind(&record.user_id)
        .bind(record.deck_id.map(|id| id.to_string()))
        .bind(record.deck_code_id.map(|id| id.to_string()))
        .bind(record.private_flg)
        .bind(&record.tcg_meister_url)
        .bind(&record.memo)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        tracing::debug!("Saved record {}", record.id);
        Ok(())
    }

    async fn delete(&self, id: Identifier, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        let result =
            sqlx::query("UPDATE records SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(now)
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Record", id));
        }

        tracing::debug!("Soft deleted record {id}");
        Ok(())
    }
}
