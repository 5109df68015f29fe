use std::cmp::Ordering;
use std::collections::HashSet;

use super::types::{GameStats, LeaderboardEntry, LeaderboardPage, SessionRecord};
use crate::scoring::rules::TOTAL_GROUPS;

/// Rank completed sessions and cut one page out of the ranking.
///
/// Order: score descending, then earlier completion first, then submission id.
/// Ties share a rank (competition ranking: 1, 2, 2, 4).
pub fn leaderboard(sessions: &[SessionRecord], limit: usize, offset: usize) -> LeaderboardPage {
    let mut completed: Vec<_> = sessions
        .iter()
        .filter_map(|s| s.summary.as_ref().map(|summary| (s, summary)))
        .collect();

    completed.sort_by(|a, b| {
        let score_cmp = b
            .1
            .total_score
            .partial_cmp(&a.1.total_score)
            .unwrap_or(Ordering::Equal);
        if score_cmp != Ordering::Equal {
            return score_cmp;
        }
        a.1.completed_at
            .cmp(&b.1.completed_at)
            .then_with(|| a.0.submission_id.cmp(&b.0.submission_id))
    });

    let mut entries = Vec::with_capacity(completed.len());
    let mut rank = 0;
    let mut previous_score = None;
    for (position, (session, summary)) in completed.iter().enumerate() {
        if previous_score != Some(summary.total_score) {
            rank = position + 1;
            previous_score = Some(summary.total_score);
        }
        entries.push(LeaderboardEntry {
            rank,
            nickname: session.nickname.clone(),
            score: summary.total_score,
            completed_at: summary.completed_at,
            combinations: summary.combinations_count,
        });
    }

    let total = entries.len();
    let entries = entries.into_iter().skip(offset).take(limit).collect();

    LeaderboardPage {
        entries,
        total,
        limit,
        offset,
    }
}

/// Aggregate statistics over completed sessions.
pub fn stats(sessions: &[SessionRecord]) -> GameStats {
    let completed: Vec<_> = sessions
        .iter()
        .filter_map(|s| s.summary.as_ref().map(|summary| (s, summary)))
        .collect();

    if completed.is_empty() {
        return GameStats::default();
    }

    let players: HashSet<&str> = completed.iter().map(|(s, _)| s.nickname.as_str()).collect();
    let total_sessions = completed.len();
    let score_sum: f64 = completed.iter().map(|(_, summary)| summary.total_score).sum();
    let highest_score = completed
        .iter()
        .map(|(_, summary)| summary.total_score)
        .fold(0.0, f64::max);
    let full_boards = completed
        .iter()
        .filter(|(_, summary)| summary.combinations_count == TOTAL_GROUPS)
        .count();

    let mut flagged = 0usize;
    let mut flagged_correct = 0usize;
    for (session, _) in &completed {
        for record in session.combinations.iter().filter(|c| c.flagged_id.is_some()) {
            flagged += 1;
            if record.is_flag_correct {
                flagged_correct += 1;
            }
        }
    }

    GameStats {
        total_players: players.len(),
        total_sessions,
        average_score: score_sum / total_sessions as f64,
        highest_score,
        completion_rate: full_boards as f64 / total_sessions as f64,
        ai_detection_accuracy: if flagged == 0 {
            0.0
        } else {
            flagged_correct as f64 / flagged as f64
        },
    }
}
