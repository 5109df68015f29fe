use super::key::AnswerKey;
use super::rules::{flag_score, grouping_score};
use super::types::{Combination, ResultDetail, ScoreBreakdown, ScoreResult};
use super::validation::{validate_submission, ScoreError};

/// Score one submission against the answer key.
///
/// Every combination is judged on its own: two combinations naming the same
/// canonical group both count towards `perfect_groups`. Pure and
/// deterministic; the only failure is malformed input.
pub fn score(
    nickname: &str,
    submission: &[Combination],
    key: &AnswerKey,
) -> Result<ScoreResult, ScoreError> {
    validate_submission(submission)?;

    let mut perfect_groups = 0u32;
    let mut hits = 0u32;
    let mut false_positives = 0u32;
    let mut results = Vec::with_capacity(submission.len());

    for combination in submission {
        let is_grouping_correct = is_grouping_correct(combination, key);
        if is_grouping_correct {
            perfect_groups += 1;
        }

        // Flags are judged against the synthetic set, not the combination
        if let Some(flagged) = combination.flag() {
            if key.is_synthetic(flagged) {
                hits += 1;
            } else {
                false_positives += 1;
            }
        }

        results.push(ResultDetail {
            user_combination: combination.clone(),
            is_grouping_correct,
            is_flag_correct: is_flag_correct(combination, key),
        });
    }

    let breakdown = ScoreBreakdown {
        perfect_groups,
        grouping_score: grouping_score(perfect_groups),
        hits,
        false_positives,
        flag_score: flag_score(hits, false_positives),
    };

    Ok(ScoreResult {
        nickname: nickname.to_string(),
        total_score: breakdown.grouping_score + breakdown.flag_score,
        results,
        breakdown,
    })
}

fn is_grouping_correct(combination: &Combination, key: &AnswerKey) -> bool {
    let ids: Vec<&str> = combination.card_ids().collect();
    key.matching_group(ids.iter().copied()).is_some()
}

/// A flag is correct only when the combination holds exactly one synthetic
/// card and the flag names it. No flag is never correct.
fn is_flag_correct(combination: &Combination, key: &AnswerKey) -> bool {
    let Some(flagged) = combination.flag() else {
        return false;
    };
    let mut synthetic = combination.card_ids().filter(|id| key.is_synthetic(id));
    match (synthetic.next(), synthetic.next()) {
        (Some(only), None) => only == flagged,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::CardRef;

    fn canonical_submission(flag: impl Fn(&[&str]) -> Option<String>) -> Vec<Combination> {
        AnswerKey::standard()
            .groups()
            .iter()
            .map(|g| {
                let ids: Vec<&str> = g.ids().collect();
                Combination {
                    cards: ids.iter().map(|id| CardRef::from(*id)).collect(),
                    flagged_id: flag(&ids),
                }
            })
            .collect()
    }

    fn synthetic_in(ids: &[&str]) -> Option<String> {
        ids.iter()
            .find(|id| AnswerKey::standard().is_synthetic(id))
            .map(|id| id.to_string())
    }

    #[test]
    fn test_perfect_game_scores_100() {
        let submission = canonical_submission(synthetic_in);
        let result = score("ace", &submission, AnswerKey::standard()).unwrap();

        assert_eq!(result.breakdown.perfect_groups, 9);
        assert_eq!(result.breakdown.grouping_score, 70.0);
        assert_eq!(result.breakdown.hits, 4);
        assert_eq!(result.breakdown.false_positives, 0);
        assert_eq!(result.breakdown.flag_score, 30.0);
        assert_eq!(result.total_score, 100.0);
        assert_eq!(result.nickname, "ace");

        let flag_correct = result.results.iter().filter(|r| r.is_flag_correct).count();
        assert_eq!(flag_correct, 4);
        assert!(result.results.iter().all(|r| r.is_grouping_correct));
    }

    #[test]
    fn test_all_wrong_flags_scores_70() {
        let submission = canonical_submission(|ids| {
            ids.iter()
                .find(|id| !AnswerKey::standard().is_synthetic(id))
                .map(|id| id.to_string())
        });
        let result = score("p", &submission, AnswerKey::standard()).unwrap();

        assert_eq!(result.breakdown.hits, 0);
        assert_eq!(result.breakdown.false_positives, 9);
        assert_eq!(result.breakdown.flag_score, 0.0);
        assert_eq!(result.total_score, 70.0);
        assert!(result.results.iter().all(|r| !r.is_flag_correct));
    }

    #[test]
    fn test_canonical_groups_any_order_no_flags() {
        let mut submission = canonical_submission(|_| None);
        submission.reverse();
        for combination in &mut submission {
            combination.cards.rotate_left(1);
        }
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(result.breakdown.grouping_score, 70.0);
        assert_eq!(result.total_score, 70.0);
    }

    #[test]
    fn test_partial_grouping_is_linear() {
        let full = canonical_submission(|_| None);
        for k in 0..9 {
            let mut submission: Vec<Combination> = full[..k].to_vec();
            submission.push(Combination::new(["900", "901", "902"], None));
            let result = score("p", &submission, AnswerKey::standard()).unwrap();
            assert_eq!(result.breakdown.perfect_groups, k as u32);
            assert_eq!(result.total_score, 8.0 * k as f64);
        }
    }

    #[test]
    fn test_single_unmatched_combination() {
        let submission = vec![Combination::new(["662", "663", "664"], None)];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.results.len(), 1);
        assert!(!result.results[0].is_grouping_correct);
        assert!(!result.results[0].is_flag_correct);
    }

    #[test]
    fn test_wrong_groups_no_flags_score_zero() {
        let submission = vec![
            Combination::new(["662", "663", "664"], None),
            Combination::new(["665", "666", "667"], None),
            Combination::new(["683", "686", "684"], None),
        ];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(result.total_score, 0.0);
    }

    #[test]
    fn test_flag_on_human_card_in_synthetic_group() {
        // 683 is the synthetic card of this group, 664 is not
        let submission = vec![Combination::new(["664", "678", "683"], Some("664"))];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert!(result.results[0].is_grouping_correct);
        assert!(!result.results[0].is_flag_correct);
        assert_eq!(result.breakdown.false_positives, 1);
        assert_eq!(result.total_score, 8.0);
    }

    #[test]
    fn test_missing_flag_is_not_correct() {
        let submission = vec![Combination::new(["664", "678", "683"], None)];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert!(!result.results[0].is_flag_correct);
        assert_eq!(result.breakdown.hits, 0);
        assert_eq!(result.breakdown.false_positives, 0);
    }

    #[test]
    fn test_blank_flag_is_no_flag() {
        let json = r#"[
            { "cards": ["664", "678", "683"], "flaggedId": "683" },
            { "cards": ["662", "676", "687"], "flaggedId": "" }
        ]"#;
        let submission: Vec<Combination> = serde_json::from_str(json).unwrap();
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(result.breakdown.hits, 1);
        assert_eq!(result.breakdown.false_positives, 0);
        assert_eq!(result.breakdown.flag_score, 7.5);
        assert!(!result.results[1].is_flag_correct);

        // Built in code rather than parsed
        let blank = vec![Combination::new(["662", "676", "687"], Some(" "))];
        let result = score("p", &blank, AnswerKey::standard()).unwrap();
        assert_eq!(result.breakdown.false_positives, 0);
        assert_eq!(result.total_score, 8.0);
    }

    #[test]
    fn test_flag_correct_in_wrong_group() {
        // Not a canonical trio, but exactly one synthetic card flagged correctly
        let submission = vec![Combination::new(["662", "663", "683"], Some("683"))];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert!(!result.results[0].is_grouping_correct);
        assert!(result.results[0].is_flag_correct);
        assert_eq!(result.total_score, 7.5);
    }

    #[test]
    fn test_two_synthetic_cards_never_flag_correct() {
        let submission = vec![Combination::new(["683", "686", "662"], Some("683"))];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert!(!result.results[0].is_flag_correct);
        // Still a hit for the flag pass
        assert_eq!(result.breakdown.hits, 1);
    }

    #[test]
    fn test_flag_outside_combination_counts_but_is_not_correct() {
        let submission = vec![Combination::new(["662", "676", "687"], Some("680"))];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(result.breakdown.hits, 1);
        assert!(!result.results[0].is_flag_correct);
        assert_eq!(result.total_score, 8.0 + 7.5);
    }

    #[test]
    fn test_duplicate_group_matches_count_twice() {
        let submission = vec![
            Combination::new(["662", "676", "687"], None),
            Combination::new(["687", "676", "662"], None),
        ];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(result.breakdown.perfect_groups, 2);
        assert_eq!(result.total_score, 16.0);
    }

    #[test]
    fn test_false_positives_floor() {
        let submission = vec![
            Combination::new(["662", "663", "664"], Some("662")),
            Combination::new(["665", "666", "667"], Some("665")),
            Combination::new(["668", "669", "670"], Some("668")),
            Combination::new(["671", "672", "673"], Some("671")),
            Combination::new(["674", "675", "676"], Some("674")),
        ];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(result.breakdown.false_positives, 5);
        assert_eq!(result.breakdown.flag_score, 0.0);
        assert_eq!(result.total_score, 0.0);
    }

    #[test]
    fn test_results_preserve_input_order() {
        let submission = vec![
            Combination::new(["670", "675", "680"], Some("680")),
            Combination::new(["900", "901", "902"], None),
            Combination::new(["662", "676", "687"], None),
        ];
        let result = score("p", &submission, AnswerKey::standard()).unwrap();
        let echoed: Vec<&Combination> =
            result.results.iter().map(|r| &r.user_combination).collect();
        assert_eq!(echoed, submission.iter().collect::<Vec<_>>());
        let grouping: Vec<bool> = result.results.iter().map(|r| r.is_grouping_correct).collect();
        assert_eq!(grouping, vec![true, false, true]);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let submission = canonical_submission(synthetic_in);
        let first = score("p", &submission, AnswerKey::standard()).unwrap();
        let second = score("p", &submission, AnswerKey::standard()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_shapes_fail() {
        assert!(score("p", &[], AnswerKey::standard()).is_err());

        let short = Combination {
            cards: vec![CardRef::from("662"), CardRef::from("676")],
            flagged_id: None,
        };
        let err = score("p", &[short], AnswerKey::standard()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidInput(_)));
    }
}
