//! Persistence for scored sessions.
//!
//! A submission is written in two steps: its combination records, then its
//! summary. Only sessions with a summary show up in leaderboard and stats
//! reads, so a half-written submission is never ranked. Both steps are
//! keyed by submission id and overwrite earlier attempts, which makes retries
//! safe.

pub mod file;
pub mod memory;
pub mod projection;
pub mod types;

pub use file::{get_store_path, FileStore};
pub use memory::MemoryStore;
pub use types::{
    CombinationRecord, GameStats, LeaderboardEntry, LeaderboardPage, SessionRecord,
    SessionSummary,
};

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;

pub trait ScoreStore: Send + Sync {
    /// Upsert the combination records of one submission.
    fn save_combinations(
        &self,
        submission_id: &str,
        nickname: &str,
        records: &[CombinationRecord],
    ) -> Result<()>;

    /// Write the summary of a submission whose records are already stored.
    fn complete_session(&self, submission_id: &str, summary: &SessionSummary) -> Result<()>;

    /// Snapshot of every stored session.
    fn sessions(&self) -> Result<Vec<SessionRecord>>;

    fn leaderboard(&self, limit: usize, offset: usize) -> Result<LeaderboardPage> {
        Ok(projection::leaderboard(&self.sessions()?, limit, offset))
    }

    fn stats(&self) -> Result<GameStats> {
        Ok(projection::stats(&self.sessions()?))
    }
}

/// Apply a combination upsert to a session map. Shared by every backend.
pub(crate) fn upsert_combinations(
    sessions: &mut BTreeMap<String, SessionRecord>,
    submission_id: &str,
    nickname: &str,
    records: &[CombinationRecord],
) {
    let session = sessions
        .entry(submission_id.to_string())
        .or_insert_with(|| SessionRecord {
            submission_id: submission_id.to_string(),
            nickname: nickname.to_string(),
            started_at: Utc::now(),
            combinations: Vec::new(),
            summary: None,
        });
    session.nickname = nickname.to_string();
    session.combinations = records.to_vec();
    // New records invalidate any earlier summary until it is written again
    session.summary = None;
}

/// Attach a summary to a session map entry. Shared by every backend.
pub(crate) fn attach_summary(
    sessions: &mut BTreeMap<String, SessionRecord>,
    submission_id: &str,
    summary: &SessionSummary,
) -> Result<()> {
    let Some(session) = sessions.get_mut(submission_id) else {
        anyhow::bail!(
            "No combination records stored for submission {}",
            submission_id
        );
    };
    if session.combinations.len() != summary.combinations_count {
        anyhow::bail!(
            "Submission {} has {} stored combinations, summary expects {}",
            submission_id,
            session.combinations.len(),
            summary.combinations_count
        );
    }
    session.summary = Some(summary.clone());
    Ok(())
}
