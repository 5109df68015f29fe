//! Scoring constants.
//!
//! A perfect board earns a flat [`PERFECT_GROUPS_BONUS`], which is lower than
//! `TOTAL_GROUPS * SINGLE_GROUP_SCORE`. Keep both values exactly as they are.

/// Number of canonical groups in the answer key.
pub const TOTAL_GROUPS: usize = 9;

/// Number of cards in every group.
pub const CARDS_PER_GROUP: usize = 3;

/// Size of the closed card universe.
pub const TOTAL_CARDS: usize = TOTAL_GROUPS * CARDS_PER_GROUP;

/// Grouping score when every canonical group was matched.
pub const PERFECT_GROUPS_BONUS: f64 = 70.0;

/// Grouping score per matched group below a perfect board.
pub const SINGLE_GROUP_SCORE: f64 = 8.0;

/// Reward for flagging a synthetic card.
pub const AI_HIT_SCORE: f64 = 7.5;

/// Penalty for flagging a card that is not synthetic.
pub const AI_FALSE_POSITIVE_PENALTY: f64 = 3.0;

/// Floor applied to the flag score.
pub const MIN_FLAG_SCORE: f64 = 0.0;

/// Grouping score for a number of perfectly matched groups.
pub fn grouping_score(perfect_groups: u32) -> f64 {
    if perfect_groups as usize == TOTAL_GROUPS {
        PERFECT_GROUPS_BONUS
    } else {
        perfect_groups as f64 * SINGLE_GROUP_SCORE
    }
}

/// Flag score for hit and false-positive counts, never below zero.
pub fn flag_score(hits: u32, false_positives: u32) -> f64 {
    let raw = hits as f64 * AI_HIT_SCORE - false_positives as f64 * AI_FALSE_POSITIVE_PENALTY;
    raw.max(MIN_FLAG_SCORE)
}
