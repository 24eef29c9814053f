use super::CityleagueRepository;
use crate::models::{assemble_cityleague_results, CityleagueEventRow, CityleagueScheduleRow};
use crate::DatabaseError;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use types::{CityleagueResult, CityleagueSchedule, LeagueType};

const EVENT_RESULT_COLUMNS: &str = r#"
    r.official_event_id,
    r.cityleague_schedule_id,
    r.league_type,
    r.event_date,
    er.player_id,
    er.player_name,
    er.rank,
    er.point,
    er.deck_code
"#;

pub struct SqliteCityleagueRepository {
    pool: SqlitePool,
}

impl SqliteCityleagueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CityleagueRepository for SqliteCityleagueRepository {
    async fn find_schedules(&self) -> Result<Vec<CityleagueSchedule>, DatabaseError> {
        let rows: Vec<CityleagueScheduleRow> = sqlx::query_as(
            "SELECT id, title, from_date, to_date FROM cityleague_schedules ORDER BY from_date, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(CityleagueSchedule::from).collect())
    }

    async fn find_schedule_by_id(&self, id: &str) -> Result<CityleagueSchedule, DatabaseError> {
        let row: Option<CityleagueScheduleRow> = sqlx::query_as(
            "SELECT id, title, from_date, to_date FROM cityleague_schedules WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        row.map(CityleagueSchedule::from)
            .ok_or_else(|| DatabaseError::not_found("CityleagueSchedule", id))
    }

    async fn save_schedule(&self, schedule: &CityleagueSchedule) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO cityleague_schedules (id, title, from_date, to_date)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 title = excluded.title,
                 from_date = excluded.from_date,
                 to_date = excluded.to_date",
        )
        .bind(&schedule.id)
        .bind(&schedule.title)
        .bind(schedule.from_date)
        .bind(schedule.to_date)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    async fn find_results_by_schedule_id(
        &self,
        schedule_id: &str,
        league_type: Option<LeagueType>,
    ) -> Result<Vec<CityleagueResult>, DatabaseError> {
        let league_type = league_type.map(|league_type| league_type.to_string());
        let rows: Vec<CityleagueEventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_RESULT_COLUMNS}
             FROM cityleague_results AS r
                 JOIN event_results AS er ON er.official_event_id = r.official_event_id
             WHERE r.cityleague_schedule_id = ?
                 AND (? IS NULL OR r.league_type = ?)
             ORDER BY r.event_date, r.official_event_id, er.rank, er.player_id"
        ))
        .bind(schedule_id)
        .bind(&league_type)
        .bind(&league_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(assemble_cityleague_results(rows)?)
    }

    async fn find_results_by_date(
        &self,
        date: NaiveDate,
        league_type: Option<LeagueType>,
    ) -> Result<Vec<CityleagueResult>, DatabaseError> {
        let league_type = league_type.map(|league_type| league_type.to_string());
        let rows: Vec<CityleagueEventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_RESULT_COLUMNS}
             FROM cityleague_results AS r
                 JOIN event_results AS er ON er.official_event_id = r.official_event_id
             WHERE r.event_date = ?
                 AND (? IS NULL OR r.league_type = ?)
             ORDER BY r.official_event_id, er.rank, er.player_id"
        ))
        .bind(date)
        .bind(&league_type)
        .bind(&league_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(assemble_cityleague_results(rows)?)
    }

    async fn save_result(&self, result: &CityleagueResult) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        sqlx::query(
            "INSERT INTO cityleague_results (official_event_id, cityleague_schedule_id, league_type, event_date)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (official_event_id) DO UPDATE SET
                 cityleague_schedule_id = excluded.cityleague_schedule_id,
                 league_type = excluded.league_type,
                 event_date = excluded.event_date",
        )
        .bind(i64::from(result.official_event_id))
        .bind(&result.cityleague_schedule_id)
        .bind(result.league_type.to_string())
        .bind(result.event_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM event_results WHERE official_event_id = ?")
            .bind(i64::from(result.official_event_id))
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        for event_result in &result.results {
            sqlx::query(
                "INSERT INTO event_results (official_event_id, player_id, player_name, rank, point, deck_code) VALUES (?, ?, ?, ?, ?, ?)"
            )
            .bind(i64::from(result.official_event_id))
            .bind(&event_result.player_id)
            .bind(&event_result.player_name)
            .bind(i64::from(event_result.rank))
            .bind(i64::from(event_result.point))
            .bind(&event_result.deck_code)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        tracing::debug!(
            "Saved {} results of official event {}",
            result.results.len(),
            result.official_event_id
        );
        Ok(())
    }
}
