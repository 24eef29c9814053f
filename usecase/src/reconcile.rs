//! Positional reconciliation of a match's games across an update.
//!
//! Submitted games carry no identity, so the only correlation with stored
//! games is their index. Position `i` of the submission reuses the id and
//! creation time of stored game `i` when there is one; anything past the
//! stored length becomes a new game, anything past the submitted length is
//! dropped. Reordering games therefore reads as editing them.
//!
//! A new game is created at `now` unless that would sort it before the game
//! in front of it, in which case it takes a later timestamp so that
//! creation order stays play order.

use chrono::{DateTime, Duration, Utc};
use types::{Game, GameValues, IdError, IdGenerator, Identifier, Match, MatchValues};

pub fn reconcile_games(
    existing: &[Game],
    proposed: &[GameValues],
    match_id: Identifier,
    user_id: &str,
    now: DateTime<Utc>,
    ids: &IdGenerator,
) -> Result<Vec<Game>, IdError> {
    let mut games: Vec<Game> = Vec::with_capacity(proposed.len());
    for (position, values) in proposed.iter().enumerate() {
        let (id, created_at) = match existing.get(position) {
            Some(kept) => (kept.id, kept.created_at),
            None => {
                // Stored ids may come from another generator, so only a
                // later timestamp orders a new game after a kept one.
                let created_at = match games.last() {
                    Some(kept) if position == existing.len() && kept.created_at >= now => {
                        kept.created_at + Duration::milliseconds(1)
                    }
                    Some(previous) => now.max(previous.created_at),
                    None => now,
                };
                (ids.generate(created_at)?, created_at)
            }
        };
        games.push(Game::with_values(
            id,
            created_at,
            match_id,
            user_id.to_string(),
            values.clone(),
        ));
    }
    Ok(games)
}

/// The match that replaces `existing`: same id and creation time, every
/// other field from `proposed`, games reconciled positionally.
pub fn reconcile_match(
    existing: &Match,
    proposed: MatchValues,
    now: DateTime<Utc>,
    ids: &IdGenerator,
) -> Result<Match, IdError> {
    let games = reconcile_games(
        &existing.games,
        &proposed.games,
        existing.id,
        &proposed.user_id,
        now,
        ids,
    )?;
    let kept = games.len().min(existing.games.len());
    log::debug!(
        "Reconciled match {}: kept {kept} games, added {}, dropped {}",
        existing.id,
        games.len() - kept,
        existing.games.len() - kept
    );
    Ok(Match::from_values(existing.id, existing.created_at, proposed, games))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use itertools::Itertools;

    fn t1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 13, 0, 0).unwrap()
    }

    fn values(go_first: bool, win: bool) -> GameValues {
        GameValues {
            go_first,
            winning_flg: win,
            your_prize_cards: if win { 6 } else { 1 },
            opponents_prize_cards: if win { 3 } else { 6 },
            memo: String::new(),
        }
    }

    fn existing_match(ids: &IdGenerator, game_values: &[GameValues]) -> Match {
        let id = ids.generate(t1()).unwrap();
        let games = game_values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let created_at = t1() + Duration::minutes(i as i64 * 25);
                Game::with_values(
                    ids.generate(created_at).unwrap(),
                    created_at,
                    id,
                    "user-1".to_string(),
                    v.clone(),
                )
            })
            .collect();
        Match {
            id,
            created_at: t1(),
            record_id: ids.generate(t1()).unwrap(),
            deck_id: None,
            user_id: "user-1".to_string(),
            opponents_user_id: String::new(),
            bo3_flg: true,
            qualifying_round_flg: true,
            final_tournament_flg: false,
            default_victory_flg: false,
            default_defeat_flg: false,
            victory_flg: false,
            opponents_deck_info: "Lugia VSTAR".to_string(),
            memo: String::new(),
            games,
        }
    }

    fn proposal(existing: &Match, games: Vec<GameValues>) -> MatchValues {
        MatchValues {
            games,
            memo: "updated".to_string(),
            ..existing.values()
        }
    }

    #[test]
    fn test_shrink_keeps_leading_identity() {
        let ids = IdGenerator::new();
        let existing = existing_match(
            &ids,
            &[values(true, true), values(false, false), values(true, true)],
        );
        let p0 = values(false, false);

        let result = reconcile_match(
            &existing,
            proposal(&existing, vec![p0.clone()]),
            t1() + Duration::hours(2),
            &ids,
        )
        .unwrap();

        assert_eq!(result.games.len(), 1);
        assert_eq!(result.games[0].id, existing.games[0].id);
        assert_eq!(result.games[0].created_at, existing.games[0].created_at);
        assert_eq!(result.games[0].values(), p0);
    }

    #[test]
    fn test_grow_mints_new_identity_for_appended_games() {
        let ids = IdGenerator::new();
        let existing = existing_match(&ids, &[values(true, true)]);
        let now = t1() + Duration::hours(1);

        let result = reconcile_match(
            &existing,
            proposal(&existing, vec![values(true, true), values(false, true)]),
            now,
            &ids,
        )
        .unwrap();

        assert_eq!(result.games.len(), 2);
        assert_eq!(result.games[0].id, existing.games[0].id);
        assert_ne!(result.games[1].id, existing.games[0].id);
        assert_ne!(result.games[1].created_at, existing.games[0].created_at);
        assert_eq!(result.games[1].created_at, now);
        assert_eq!(result.games[1].match_id, existing.id);
    }

    #[test]
    fn test_same_length_only_changes_values() {
        let ids = IdGenerator::new();
        let existing = existing_match(&ids, &[values(true, true), values(false, false)]);
        let proposed = vec![values(false, false), values(true, true)];

        let result = reconcile_match(
            &existing,
            proposal(&existing, proposed.clone()),
            t1() + Duration::hours(1),
            &ids,
        )
        .unwrap();

        assert_eq!(
            result.games.iter().map(|g| (g.id, g.created_at)).collect_vec(),
            existing.games.iter().map(|g| (g.id, g.created_at)).collect_vec()
        );
        assert_eq!(result.games.iter().map(Game::values).collect_vec(), proposed);
    }

    #[test]
    fn test_empty_proposal_wipes_games() {
        let ids = IdGenerator::new();
        let existing = existing_match(&ids, &[values(true, true), values(false, false)]);

        let result = reconcile_match(
            &existing,
            proposal(&existing, vec![]),
            t1() + Duration::hours(1),
            &ids,
        )
        .unwrap();

        assert!(result.games.is_empty());
    }

    #[test]
    fn test_match_identity_kept_and_scalars_replaced() {
        let ids = IdGenerator::new();
        let existing = existing_match(&ids, &[values(true, true)]);
        let new_record = ids.generate(t1()).unwrap();

        let result = reconcile_match(
            &existing,
            MatchValues {
                record_id: new_record,
                victory_flg: true,
                opponents_deck_info: "Chien-Pao ex".to_string(),
                ..proposal(&existing, vec![values(true, true)])
            },
            t1() + Duration::hours(1),
            &ids,
        )
        .unwrap();

        assert_eq!(result.id, existing.id);
        assert_eq!(result.created_at, existing.created_at);
        assert_eq!(result.record_id, new_record);
        assert!(result.victory_flg);
        assert_eq!(result.opponents_deck_info, "Chien-Pao ex");
        assert_eq!(result.memo, "updated");
    }

    #[test]
    fn test_reconciling_twice_is_idempotent() {
        let ids = IdGenerator::new();
        let existing = existing_match(&ids, &[values(true, true)]);
        let proposed = proposal(
            &existing,
            vec![values(true, false), values(false, true), values(true, true)],
        );

        let once =
            reconcile_match(&existing, proposed.clone(), t1() + Duration::hours(1), &ids).unwrap();
        let twice = reconcile_match(&once, proposed, t1() + Duration::hours(2), &ids).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_appended_games_follow_kept_games_when_clock_is_behind() {
        let ids = IdGenerator::new();
        let existing = existing_match(&ids, &[values(true, true)]);

        let result = reconcile_match(
            &existing,
            proposal(
                &existing,
                vec![values(true, true), values(false, false), values(true, true)],
            ),
            t1() - Duration::seconds(5),
            &ids,
        )
        .unwrap();

        assert_eq!(result.games[0].created_at, t1());
        assert_eq!(result.games[1].created_at, t1() + Duration::milliseconds(1));
        assert_eq!(result.games[2].created_at, t1() + Duration::milliseconds(1));
        assert!(result.games.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    #[test]
    fn test_scenario_edit_first_game_and_append_second() {
        let ids = IdGenerator::new();
        let existing = existing_match(&ids, &[values(true, true)]);
        let now = t1() + Duration::minutes(40);

        let result = reconcile_match(
            &existing,
            proposal(&existing, vec![values(true, false), values(false, true)]),
            now,
            &ids,
        )
        .unwrap();

        let first = &result.games[0];
        assert_eq!((first.id, first.created_at), (existing.games[0].id, t1()));
        assert!(first.go_first);
        assert!(!first.winning_flg);

        let second = &result.games[1];
        assert!(second.id > existing.games[0].id);
        assert_eq!(second.created_at, now);
        assert!(!second.go_first);
        assert!(second.winning_flg);
    }
}
