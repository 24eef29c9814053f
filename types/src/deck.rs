use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::Identifier;

/// Immutable snapshot of a deck list. Only the visibility flag and memo may
/// change after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCode {
    pub id: Identifier,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub deck_id: Identifier,
    pub code: String,
    pub private_code_flg: bool,
    pub memo: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckCodeValues {
    pub user_id: String,
    pub code: String,
    pub private_code_flg: bool,
    pub memo: String,
}

/// A deck and, when it has any history, the code with the greatest
/// creation time. `latest_deck_code` is resolved at read time and never
/// stored on the deck row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: Identifier,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub name: String,
    pub private_flg: bool,
    pub latest_deck_code: Option<DeckCode>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckValues {
    pub user_id: String,
    pub name: String,
    pub private_flg: bool,
}

impl DeckCode {
    pub fn from_values(
        id: Identifier,
        created_at: DateTime<Utc>,
        deck_id: Identifier,
        values: DeckCodeValues,
    ) -> Self {
        Self {
            id,
            created_at,
            user_id: values.user_id,
            deck_id,
            code: values.code,
            private_code_flg: values.private_code_flg,
            memo: values.memo,
        }
    }
}

impl Deck {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

impl Display for Deck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]",
            self.name,
            self.latest_deck_code
                .as_ref()
                .map_or("no code", |code| code.code.as_str())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;

    #[test]
    fn test_display_shows_latest_code() {
        let ids = IdGenerator::new();
        let now = Utc::now();
        let id = ids.generate(now).unwrap();
        let mut deck = Deck {
            id,
            created_at: now,
            archived_at: None,
            user_id: "user-1".to_string(),
            name: "Gholdengo".to_string(),
            private_flg: false,
            latest_deck_code: None,
        };
        assert_eq!(deck.to_string(), "Gholdengo [no code]");

        deck.latest_deck_code = Some(DeckCode::from_values(
            ids.generate(now).unwrap(),
            now,
            id,
            DeckCodeValues {
                code: "kKvVkv-abc123-vVkK1v".to_string(),
                ..DeckCodeValues::default()
            },
        ));
        assert_eq!(deck.to_string(), "Gholdengo [kKvVkv-abc123-vVkK1v]");
    }
}
