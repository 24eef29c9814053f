//! Flat rows as returned by the join queries, and their reassembly into
//! nested entities through [`types::group_rows`].

use chrono::{DateTime, NaiveDate, Utc};
use types::{
    grouping::require, group_rows, CityleagueResult, CityleagueSchedule, Deck, DeckCode,
    EventResult, Game, GroupingError, Identifier, LeagueType, Match, Record, RecordWithMatches,
};

pub(crate) fn parse_id(value: &str, column: &'static str) -> Result<Identifier, GroupingError> {
    value.parse().map_err(|_| GroupingError::InvalidColumn {
        column,
        value: value.to_string(),
    })
}

fn parse_optional_id(
    value: Option<&str>,
    column: &'static str,
) -> Result<Option<Identifier>, GroupingError> {
    value.map(|value| parse_id(value, column)).transpose()
}

fn to_u32(value: i64, column: &'static str) -> Result<u32, GroupingError> {
    u32::try_from(value).map_err(|_| GroupingError::InvalidColumn {
        column,
        value: value.to_string(),
    })
}

/// One row of `matches LEFT OUTER JOIN games`. The `game_*` columns are
/// null for a match without games.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchGameRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub record_id: String,
    pub deck_id: Option<String>,
    pub user_id: String,
    pub opponents_user_id: String,
    pub bo3_flg: bool,
    pub qualifying_round_flg: bool,
    pub final_tournament_flg: bool,
    pub default_victory_flg: bool,
    pub default_defeat_flg: bool,
    pub victory_flg: bool,
    pub opponents_deck_info: String,
    pub memo: String,
    pub game_id: Option<String>,
    pub game_created_at: Option<DateTime<Utc>>,
    pub game_user_id: Option<String>,
    pub game_go_first: Option<bool>,
    pub game_winning_flg: Option<bool>,
    pub game_your_prize_cards: Option<i64>,
    pub game_opponents_prize_cards: Option<i64>,
    pub game_memo: Option<String>,
}

pub(crate) const MATCH_GAME_COLUMNS: &str = r#"
    m.id,
    m.created_at,
    m.record_id,
    m.deck_id,
    m.user_id,
    m.opponents_user_id,
    m.bo3_flg,
    m.qualifying_round_flg,
    m.final_tournament_flg,
    m.default_victory_flg,
    m.default_defeat_flg,
    m.victory_flg,
    m.opponents_deck_info,
    m.memo,
    g.id AS game_id,
    g.created_at AS game_created_at,
    g.user_id AS game_user_id,
    g.go_first AS game_go_first,
    g.winning_flg AS game_winning_flg,
    g.your_prize_cards AS game_your_prize_cards,
    g.opponents_prize_cards AS game_opponents_prize_cards,
    g.memo AS game_memo
"#;

impl MatchGameRow {
    pub fn key(&self) -> Result<Identifier, GroupingError> {
        parse_id(&self.id, "matches.id")
    }

    pub fn to_match(&self) -> Result<Match, GroupingError> {
        Ok(Match {
            id: self.key()?,
            created_at: self.created_at,
            record_id: parse_id(&self.record_id, "matches.record_id")?,
            deck_id: parse_optional_id(self.deck_id.as_deref(), "matches.deck_id")?,
            user_id: self.user_id.clone(),
            opponents_user_id: self.opponents_user_id.clone(),
            bo3_flg: self.bo3_flg,
            qualifying_round_flg: self.qualifying_round_flg,
            final_tournament_flg: self.final_tournament_flg,
            default_victory_flg: self.default_victory_flg,
            default_defeat_flg: self.default_defeat_flg,
            victory_flg: self.victory_flg,
            opponents_deck_info: self.opponents_deck_info.clone(),
            memo: self.memo.clone(),
            games: Vec::new(),
        })
    }

    pub fn to_game(&self) -> Result<Option<Game>, GroupingError> {
        let Some(game_id) = self.game_id.as_deref() else {
            return Ok(None);
        };

        Ok(Some(Game {
            id: parse_id(game_id, "games.id")?,
            created_at: require(self.game_created_at, "games.created_at")?,
            match_id: self.key()?,
            user_id: require(self.game_user_id.clone(), "games.user_id")?,
            go_first: require(self.game_go_first, "games.go_first")?,
            winning_flg: require(self.game_winning_flg, "games.winning_flg")?,
            your_prize_cards: to_u32(
                require(self.game_your_prize_cards, "games.your_prize_cards")?,
                "games.your_prize_cards",
            )?,
            opponents_prize_cards: to_u32(
                require(self.game_opponents_prize_cards, "games.opponents_prize_cards")?,
                "games.opponents_prize_cards",
            )?,
            memo: require(self.game_memo.clone(), "games.memo")?,
        }))
    }
}

/// Rows must be ordered by match, then by game creation time.
pub fn assemble_matches(rows: Vec<MatchGameRow>) -> Result<Vec<Match>, GroupingError> {
    Ok(group_rows(
        rows,
        MatchGameRow::key,
        MatchGameRow::to_match,
        MatchGameRow::to_game,
    )?
    .into_iter()
    .map(|group| Match {
        games: group.children,
        ..group.parent
    })
    .collect())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub official_event_id: Option<i64>,
    pub tonamel_event_id: String,
    pub friend_id: String,
    pub user_id: String,
    pub deck_id: Option<String>,
    pub deck_code_id: Option<String>,
    pub private_flg: bool,
    pub tcg_meister_url: String,
    pub memo: String,
}

pub(crate) const RECORD_COLUMNS: &str = r#"
    r.id,
    r.created_at,
    r.official_event_id,
    r.tonamel_event_id,
    r.friend_id,
    r.user_id,
    r.deck_id,
    r.deck_code_id,
    r.private_flg,
    r.tcg_meister_url,
    r.memo
"#;

impl RecordRow {
    pub fn to_record(&self) -> Result<Record, GroupingError> {
        Ok(Record {
            id: parse_id(&self.id, "records.id")?,
            created_at: self.created_at,
            official_event_id: self
                .official_event_id
                .map(|id| to_u32(id, "records.official_event_id"))
                .transpose()?,
            tonamel_event_id: self.tonamel_event_id.clone(),
            friend_id: self.friend_id.clone(),
            user_id: self.user_id.clone(),
            deck_id: parse_optional_id(self.deck_id.as_deref(), "records.deck_id")?,
            deck_code_id: parse_optional_id(self.deck_code_id.as_deref(), "records.deck_code_id")?,
            private_flg: self.private_flg,
            tcg_meister_url: self.tcg_meister_url.clone(),
            memo: self.memo.clone(),
        })
    }
}

/// One row of `records LEFT OUTER JOIN matches LEFT OUTER JOIN games`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordMatchGameRow {
    #[sqlx(flatten)]
    pub record: RecordRow,
    pub match_id: Option<String>,
    pub match_created_at: Option<DateTime<Utc>>,
    pub match_record_id: Option<String>,
    pub match_deck_id: Option<String>,
    pub match_user_id: Option<String>,
    pub match_opponents_user_id: Option<String>,
    pub match_bo3_flg: Option<bool>,
    pub match_qualifying_round_flg: Option<bool>,
    pub match_final_tournament_flg: Option<bool>,
    pub match_default_victory_flg: Option<bool>,
    pub match_default_defeat_flg: Option<bool>,
    pub match_victory_flg: Option<bool>,
    pub match_opponents_deck_info: Option<String>,
    pub match_memo: Option<String>,
    pub game_id: Option<String>,
    pub game_created_at: Option<DateTime<Utc>>,
    pub game_user_id: Option<String>,
    pub game_go_first: Option<bool>,
    pub game_winning_flg: Option<bool>,
    pub game_your_prize_cards: Option<i64>,
    pub game_opponents_prize_cards: Option<i64>,
    pub game_memo: Option<String>,
}

pub(crate) const RECORD_MATCH_GAME_COLUMNS: &str = r#"
    m.id AS match_id,
    m.created_at AS match_created_at,
    m.record_id AS match_record_id,
    m.deck_id AS match_deck_id,
    m.user_id AS match_user_id,
    m.opponents_user_id AS match_opponents_user_id,
    m.bo3_flg AS match_bo3_flg,
    m.qualifying_round_flg AS match_qualifying_round_flg,
    m.final_tournament_flg AS match_final_tournament_flg,
    m.default_victory_flg AS match_default_victory_flg,
    m.default_defeat_flg AS match_default_defeat_flg,
    m.victory_flg AS match_victory_flg,
    m.opponents_deck_info AS match_opponents_deck_info,
    m.memo AS match_memo,
    g.id AS game_id,
    g.created_at AS game_created_at,
    g.user_id AS game_user_id,
    g.go_first AS game_go_first,
    g.winning_flg AS game_winning_flg,
    g.your_prize_cards AS game_your_prize_cards,
    g.opponents_prize_cards AS game_opponents_prize_cards,
    g.memo AS game_memo
"#;

impl RecordMatchGameRow {
    pub fn key(&self) -> Result<Identifier, GroupingError> {
        parse_id(&self.record.id, "records.id")
    }

    pub fn to_record(&self) -> Result<Record, GroupingError> {
        self.record.to_record()
    }

    /// The match half of this row, shaped for the inner grouping level.
    pub fn to_match_row(&self) -> Result<Option<MatchGameRow>, GroupingError> {
        let Some(match_id) = self.match_id.clone() else {
            return Ok(None);
        };

        Ok(Some(MatchGameRow {
            id: match_id,
            created_at: require(self.match_created_at, "matches.created_at")?,
            record_id: require(self.match_record_id.clone(), "matches.record_id")?,
            deck_id: self.match_deck_id.clone(),
            user_id: require(self.match_user_id.clone(), "matches.user_id")?,
            opponents_user_id: require(
                self.match_opponents_user_id.clone(),
                "matches.opponents_user_id",
            )?,
            bo3_flg: require(self.match_bo3_flg, "matches.bo3_flg")?,
            qualifying_round_flg: require(
                self.match_qualifying_round_flg,
                "matches.qualifying_round_flg",
            )?,
            final_tournament_flg: require(
                self.match_final_tournament_flg,
                "matches.final_tournament_flg",
            )?,
            default_victory_flg: require(
                self.match_default_victory_flg,
                "matches.default_victory_flg",
            )?,
            default_defeat_flg: require(
                self.match_default_defeat_flg,
                "matches.default_defeat_flg",
            )?,
            victory_flg: require(self.match_victory_flg, "matches.victory_flg")?,
            opponents_deck_info: require(
                self.match_opponents_deck_info.clone(),
                "matches.opponents_deck_info",
            )?,
            memo: require(self.match_memo.clone(), "matches.memo")?,
            game_id: self.game_id.clone(),
            game_created_at: self.game_created_at,
            game_user_id: self.game_user_id.clone(),
            game_go_first: self.game_go_first,
            game_winning_flg: self.game_winning_flg,
            game_your_prize_cards: self.game_your_prize_cards,
            game_opponents_prize_cards: self.game_opponents_prize_cards,
            game_memo: self.game_memo.clone(),
        }))
    }
}

/// Two grouping passes: records by record key, then each record's rows by
/// match key. Rows must be ordered by record, match, game.
pub fn assemble_records_with_matches(
    rows: Vec<RecordMatchGameRow>,
) -> Result<Vec<RecordWithMatches>, GroupingError> {
    group_rows(
        rows,
        RecordMatchGameRow::key,
        RecordMatchGameRow::to_record,
        RecordMatchGameRow::to_match_row,
    )?
    .into_iter()
    .map(|group| {
        Ok(RecordWithMatches {
            record: group.parent,
            matches: assemble_matches(group.children)?,
        })
    })
    .collect()
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeckCodeRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub deck_id: String,
    pub code: String,
    pub private_code_flg: bool,
    pub memo: String,
}

impl DeckCodeRow {
    pub fn to_deck_code(&self) -> Result<DeckCode, GroupingError> {
        Ok(DeckCode {
            id: parse_id(&self.id, "deck_codes.id")?,
            created_at: self.created_at,
            user_id: self.user_id.clone(),
            deck_id: parse_id(&self.deck_id, "deck_codes.deck_id")?,
            code: self.code.clone(),
            private_code_flg: self.private_code_flg,
            memo: self.memo.clone(),
        })
    }
}

/// One row of `decks LEFT OUTER JOIN` the deck's newest code.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeckLatestCodeRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub name: String,
    pub private_flg: bool,
    pub code_id: Option<String>,
    pub code_created_at: Option<DateTime<Utc>>,
    pub code_user_id: Option<String>,
    pub code_code: Option<String>,
    pub code_private_code_flg: Option<bool>,
    pub code_memo: Option<String>,
}

pub(crate) const DECK_LATEST_CODE_COLUMNS: &str = r#"
    d.id,
    d.created_at,
    d.archived_at,
    d.user_id,
    d.name,
    d.private_flg,
    c.id AS code_id,
    c.created_at AS code_created_at,
    c.user_id AS code_user_id,
    c.code AS code_code,
    c.private_code_flg AS code_private_code_flg,
    c.memo AS code_memo
"#;

impl DeckLatestCodeRow {
    pub fn key(&self) -> Result<Identifier, GroupingError> {
        parse_id(&self.id, "decks.id")
    }

    pub fn to_deck(&self) -> Result<Deck, GroupingError> {
        Ok(Deck {
            id: self.key()?,
            created_at: self.created_at,
            archived_at: self.archived_at,
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            private_flg: self.private_flg,
            latest_deck_code: None,
        })
    }

    pub fn to_deck_code(&self) -> Result<Option<DeckCode>, GroupingError> {
        let Some(code_id) = self.code_id.as_deref() else {
            return Ok(None);
        };

        Ok(Some(DeckCode {
            id: parse_id(code_id, "deck_codes.id")?,
            created_at: require(self.code_created_at, "deck_codes.created_at")?,
            user_id: require(self.code_user_id.clone(), "deck_codes.user_id")?,
            deck_id: self.key()?,
            code: require(self.code_code.clone(), "deck_codes.code")?,
            private_code_flg: require(self.code_private_code_flg, "deck_codes.private_code_flg")?,
            memo: require(self.code_memo.clone(), "deck_codes.memo")?,
        }))
    }
}

/// The query already keeps at most one code per deck, so each group holds
/// zero or one child.
pub fn assemble_decks(rows: Vec<DeckLatestCodeRow>) -> Result<Vec<Deck>, GroupingError> {
    Ok(group_rows(
        rows,
        DeckLatestCodeRow::key,
        DeckLatestCodeRow::to_deck,
        DeckLatestCodeRow::to_deck_code,
    )?
    .into_iter()
    .map(|group| Deck {
        latest_deck_code: group.children.into_iter().next(),
        ..group.parent
    })
    .collect())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CityleagueScheduleRow {
    pub id: String,
    pub title: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl From<CityleagueScheduleRow> for CityleagueSchedule {
    fn from(row: CityleagueScheduleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            from_date: row.from_date,
            to_date: row.to_date,
        }
    }
}

/// One row of `cityleague_results JOIN event_results`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CityleagueEventRow {
    pub official_event_id: i64,
    pub cityleague_schedule_id: String,
    pub league_type: String,
    pub event_date: NaiveDate,
    pub player_id: String,
    pub player_name: String,
    pub rank: i64,
    pub point: i64,
    pub deck_code: String,
}

impl CityleagueEventRow {
    pub fn key(&self) -> Result<u32, GroupingError> {
        to_u32(self.official_event_id, "cityleague_results.official_event_id")
    }

    pub fn to_result(&self) -> Result<CityleagueResult, GroupingError> {
        Ok(CityleagueResult {
            cityleague_schedule_id: self.cityleague_schedule_id.clone(),
            official_event_id: self.key()?,
            league_type: self.league_type.parse::<LeagueType>().map_err(|_| {
                GroupingError::InvalidColumn {
                    column: "cityleague_results.league_type",
                    value: self.league_type.clone(),
                }
            })?,
            event_date: self.event_date,
            results: Vec::new(),
        })
    }

    pub fn to_event_result(&self) -> Result<Option<EventResult>, GroupingError> {
        Ok(Some(EventResult {
            official_event_id: self.key()?,
            player_id: self.player_id.clone(),
            player_name: self.player_name.clone(),
            rank: to_u32(self.rank, "event_results.rank")?,
            point: to_u32(self.point, "event_results.point")?,
            deck_code: self.deck_code.clone(),
        }))
    }
}

pub fn assemble_cityleague_results(
    rows: Vec<CityleagueEventRow>,
) -> Result<Vec<CityleagueResult>, GroupingError> {
    Ok(group_rows(
        rows,
        CityleagueEventRow::key,
        CityleagueEventRow::to_result,
        CityleagueEventRow::to_event_result,
    )?
    .into_iter()
    .map(|group| CityleagueResult {
        results: group.children,
        ..group.parent
    })
    .collect())
}
