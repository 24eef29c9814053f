use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{id::Identifier, matches::Match};

/// One appearance at an event. Groups the matches played there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Identifier,
    pub created_at: DateTime<Utc>,
    pub official_event_id: Option<u32>,
    pub tonamel_event_id: String,
    pub friend_id: String,
    pub user_id: String,
    pub deck_id: Option<Identifier>,
    pub deck_code_id: Option<Identifier>,
    pub private_flg: bool,
    pub tcg_meister_url: String,
    pub memo: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordValues {
    pub official_event_id: Option<u32>,
    pub tonamel_event_id: String,
    pub friend_id: String,
    pub user_id: String,
    pub deck_id: Option<Identifier>,
    pub deck_code_id: Option<Identifier>,
    pub private_flg: bool,
    pub tcg_meister_url: String,
    pub memo: String,
}

impl Record {
    pub fn from_values(id: Identifier, created_at: DateTime<Utc>, values: RecordValues) -> Self {
        Self {
            id,
            created_at,
            official_event_id: values.official_event_id,
            tonamel_event_id: values.tonamel_event_id,
            friend_id: values.friend_id,
            user_id: values.user_id,
            deck_id: values.deck_id,
            deck_code_id: values.deck_code_id,
            private_flg: values.private_flg,
            tcg_meister_url: values.tcg_meister_url,
            memo: values.memo,
        }
    }
}

/// A record together with its matches (each carrying its games), assembled
/// from a single two-level join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWithMatches {
    pub record: Record,
    pub matches: Vec<Match>,
}
