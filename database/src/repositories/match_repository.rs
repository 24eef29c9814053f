use super::MatchRepository;
use crate::models::{assemble_matches, MatchGameRow, MATCH_GAME_COLUMNS};
use crate::DatabaseError;
use sqlx::SqlitePool;
use types::{Identifier, Match};

pub struct SqliteMatchRepository {
    pool: SqlitePool,
}

impl SqliteMatchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl MatchRepository for SqliteMatchRepository {
    async fn find_by_id(&self, id: Identifier) -> Result<Match, DatabaseError> {
        let rows: Vec<MatchGameRow> = sqlx::query_as(&format!(
            "SELECT {MATCH_GAME_COLUMNS}
             FROM matches AS m
                 JOIN records AS r ON r.id = m.record_id AND r.deleted_at IS NULL
                 LEFT OUTER JOIN games AS g ON g.match_id = m.id
             WHERE m.id = ?
             ORDER BY g.created_at, g.id"
        ))
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        assemble_matches(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::not_found("Match", id))
    }

    async fn find_by_record_id(&self, record_id: Identifier) -> Result<Vec<Match>, DatabaseError> {
        let rows: Vec<MatchGameRow> = sqlx::query_as(&format!(
            "SELECT {MATCH_GAME_COLUMNS}
             FROM matches AS m
                 JOIN records AS r ON r.id = m.record_id AND r.deleted_at IS NULL
                 LEFT OUTER JOIN games AS g ON g.match_id = m.id
             WHERE m.record_id = ?
             ORDER BY m.created_at, m.id, g.created_at, g.id"
        ))
        .bind(record_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(assemble_matches(rows)?)
    }

    async fn save(&self, match_: &Match) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        sqlx::query(
            "INSERT INTO matches (id, created_at, record_id, deck_id, user_id, opponents_user_id, bo3_flg, qualifying_round_flg, final_tournament_flg, default_victory_flg, default_defeat_flg, victory_flg, opponents_deck_info, memo)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 record_id = excluded.record_id,
                 deck_id = excluded.deck_id,
                 user_id = excluded.user_id,
                 opponents_user_id = excluded.opponents_user_id,
                 bo3_flg = excluded.bo3_flg,
                 qualifying_round_flg = excluded.qualifying_round_flg,
                 final_tournament_flg = excluded.final_tournament_flg,
                 default_victory_flg = excluded.default_victory_flg,
                 default_defeat_flg = excluded.default_defeat_flg,
                 victory_flg = excluded.victory_flg,
                 opponents_deck_info = excluded.opponents_deck_info,
                 memo = excluded.memo",
        )
        .bind(match_.id.to_string())
        .bind(match_.created_at)
        .bind(match_.record_id.to_string())
        .bind(match_.deck_id.map(|id| id.to_string()))
        .bind(&match_.user_id)
        .bind(&match_.opponents_user_id)
        .bind(match_.bo3_flg)
        .bind(match_.qualifying_round_flg)
        .bind(match_.final_tournament_flg)
        .bind(match_.default_victory_flg)
        .bind(match_.default_defeat_flg)
        .bind(match_.victory_flg)
        .bind(&match_.opponents_deck_info)
        .bind(&match_.memo)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM games WHERE match_id = ?")
            .bind(match_.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        for game in &match_.games {
            sqlx::query(
                "INSERT INTO games (id, created_at, match_id, user_id, go_first, winning_flg, your_prize_cards, opponents_prize_cards, memo) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(game.id.to_string())
            .bind(game.created_at)
            .bind(match_.id.to_string())
            .bind(&game.user_id)
            .bind(game.go_first)
            .bind(game.winning_flg)
            .bind(i64::from(game.your_prize_cards))
            .bind(i64::from(game.opponents_prize_cards))
            .bind(&game.memo)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        tracing::debug!("Saved match {} with {} games", match_.id, match_.games.len());
        Ok(())
    }

    async fn delete(&self, id: Identifier) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        sqlx::query("DELETE FROM games WHERE match_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let result = sqlx::query("DELETE FROM matches WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Match", id));
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        tracing::debug!("Deleted match {id}");
        Ok(())
    }
}
