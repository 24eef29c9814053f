use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::Identifier;

/// One game of a match, as persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: Identifier,
    pub created_at: DateTime<Utc>,
    pub match_id: Identifier,
    pub user_id: String,
    pub go_first: bool,
    pub winning_flg: bool,
    pub your_prize_cards: u32,
    pub opponents_prize_cards: u32,
    pub memo: String,
}

/// Caller supplied field values of a game. Carries no identity; position in
/// the submitted list is the only correlation with already stored games.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameValues {
    pub go_first: bool,
    pub winning_flg: bool,
    pub your_prize_cards: u32,
    pub opponents_prize_cards: u32,
    pub memo: String,
}

impl Game {
    pub fn values(&self) -> GameValues {
        GameValues {
            go_first: self.go_first,
            winning_flg: self.winning_flg,
            your_prize_cards: self.your_prize_cards,
            opponents_prize_cards: self.opponents_prize_cards,
            memo: self.memo.clone(),
        }
    }

    pub fn with_values(
        id: Identifier,
        created_at: DateTime<Utc>,
        match_id: Identifier,
        user_id: String,
        values: GameValues,
    ) -> Self {
        Self {
            id,
            created_at,
            match_id,
            user_id,
            go_first: values.go_first,
            winning_flg: values.winning_flg,
            your_prize_cards: values.your_prize_cards,
            opponents_prize_cards: values.opponents_prize_cards,
            memo: values.memo,
        }
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) prizes {}-{}",
            if self.winning_flg { "Win" } else { "Loss" },
            if self.go_first { "first" } else { "second" },
            self.your_prize_cards,
            self.opponents_prize_cards
        )
    }
}
