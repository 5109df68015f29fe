use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{ResultDetail, ScoreResult};

/// One submitted trio as it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationRecord {
    pub card_ids: Vec<String>,
    pub flagged_id: Option<String>,
    pub is_grouping_correct: bool,
    pub is_flag_correct: bool,
}

impl From<&ResultDetail> for CombinationRecord {
    fn from(detail: &ResultDetail) -> Self {
        Self {
            card_ids: detail
                .user_combination
                .card_ids()
                .map(str::to_string)
                .collect(),
            flagged_id: detail.user_combination.flag().map(str::to_string),
            is_grouping_correct: detail.is_grouping_correct,
            is_flag_correct: detail.is_flag_correct,
        }
    }
}

/// Final numbers of a scored session. Its presence makes the session visible
/// to leaderboard and stats reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_score: f64,
    pub combinations_count: usize,
    pub completed_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn from_result(result: &ScoreResult, completed_at: DateTime<Utc>) -> Self {
        Self {
            total_score: result.total_score,
            combinations_count: result.results.len(),
            completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub submission_id: String,
    pub nickname: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub combinations: Vec<CombinationRecord>,
    #[serde(default)]
    pub summary: Option<SessionSummary>,
}

impl SessionRecord {
    pub fn is_completed(&self) -> bool {
        self.summary.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub nickname: String,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
    pub combinations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub total_players: usize,
    pub total_sessions: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub completion_rate: f64,
    pub ai_detection_accuracy: f64,
}
