use std::fmt::Display;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    game::{Game, GameValues},
    id::Identifier,
};

/// A match and the games it owns. `games` is ordered by creation time,
/// which is also the order the games were played in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Identifier,
    pub created_at: DateTime<Utc>,
    pub record_id: Identifier,
    pub deck_id: Option<Identifier>,
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
    pub games: Vec<Game>,
}

/// Everything a caller may set on a match when creating or updating it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchValues {
    pub record_id: Identifier,
    #[serde(default)]
    pub deck_id: Option<Identifier>,
    pub user_id: String,
    #[serde(default)]
    pub opponents_user_id: String,
    #[serde(default)]
    pub bo3_flg: bool,
    #[serde(default)]
    pub qualifying_round_flg: bool,
    #[serde(default)]
    pub final_tournament_flg: bool,
    #[serde(default)]
    pub default_victory_flg: bool,
    #[serde(default)]
    pub default_defeat_flg: bool,
    #[serde(default)]
    pub victory_flg: bool,
    #[serde(default)]
    pub opponents_deck_info: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub games: Vec<GameValues>,
}

impl Match {
    /// Builds a match from caller values, keeping the given identity and
    /// creation time. The games are taken as already reconciled.
    pub fn from_values(
        id: Identifier,
        created_at: DateTime<Utc>,
        values: MatchValues,
        games: Vec<Game>,
    ) -> Self {
        Self {
            id,
            created_at,
            record_id: values.record_id,
            deck_id: values.deck_id,
            user_id: values.user_id,
            opponents_user_id: values.opponents_user_id,
            bo3_flg: values.bo3_flg,
            qualifying_round_flg: values.qualifying_round_flg,
            final_tournament_flg: values.final_tournament_flg,
            default_victory_flg: values.default_victory_flg,
            default_defeat_flg: values.default_defeat_flg,
            victory_flg: values.victory_flg,
            opponents_deck_info: values.opponents_deck_info,
            memo: values.memo,
            games,
        }
    }

    pub fn values(&self) -> MatchValues {
        MatchValues {
            record_id: self.record_id,
            deck_id: self.deck_id,
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
            games: self.games.iter().map(Game::values).collect(),
        }
    }

    pub fn games_won(&self) -> usize {
        self.games.iter().filter(|game| game.winning_flg).count()
    }
}

impl Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match (self.default_victory_flg, self.default_defeat_flg) {
            (true, _) => "Default victory".to_string(),
            (_, true) => "Default defeat".to_string(),
            _ => format!(
                "{} {}-{}",
                if self.victory_flg { "Victory" } else { "Defeat" },
                self.games_won(),
                self.games.len() - self.games_won()
            ),
        };
        write!(
            f,
            "{} vs {}: {}\n{}",
            self.id,
            self.opponents_deck_info,
            result,
            self.games.iter().join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;
    use chrono::TimeZone;

    fn played(results: &[(bool, bool)], values: impl FnOnce(MatchValues) -> MatchValues) -> Match {
        let ids = IdGenerator::new();
        let now = Utc.with_ymd_and_hms(2024, 5, 18, 10, 0, 0).unwrap();
        let id = ids.generate(now).unwrap();
        let games = results
            .iter()
            .map(|&(go_first, winning_flg)| {
                Game::with_values(
                    ids.generate(now).unwrap(),
                    now,
                    id,
                    "user-1".to_string(),
                    GameValues {
                        go_first,
                        winning_flg,
                        your_prize_cards: if winning_flg { 6 } else { 3 },
                        opponents_prize_cards: if winning_flg { 2 } else { 6 },
                        memo: String::new(),
                    },
                )
            })
            .collect_vec();
        let values = values(MatchValues {
            record_id: ids.generate(now).unwrap(),
            deck_id: None,
            user_id: "user-1".to_string(),
            opponents_user_id: String::new(),
            bo3_flg: true,
            qualifying_round_flg: false,
            final_tournament_flg: true,
            default_victory_flg: false,
            default_defeat_flg: false,
            victory_flg: true,
            opponents_deck_info: "Raging Bolt ex".to_string(),
            memo: String::new(),
            games: Vec::new(),
        });
        Match::from_values(id, now, values, games)
    }

    #[test]
    fn test_games_won_counts_winning_games() {
        let match_ = played(&[(true, true), (false, false), (true, true)], |v| v);
        assert_eq!(match_.games_won(), 2);
    }

    #[test]
    fn test_display_lists_score_and_games() {
        let match_ = played(&[(true, true), (false, false), (true, true)], |v| v);
        let text = match_.to_string();

        assert_eq!(
            text.lines().collect_vec(),
            vec![
                format!("{} vs Raging Bolt ex: Victory 2-1", match_.id).as_str(),
                "Win (first) prizes 6-2",
                "Loss (second) prizes 3-6",
                "Win (first) prizes 6-2",
            ]
        );
    }

    #[test]
    fn test_display_default_result() {
        let match_ = played(&[], |v| MatchValues {
            default_defeat_flg: true,
            victory_flg: false,
            ..v
        });
        assert!(match_.to_string().contains(": Default defeat"));
    }
}
