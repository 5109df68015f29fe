use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use super::types::{CombinationRecord, SessionRecord, SessionSummary};
use super::{attach_summary, upsert_combinations, ScoreStore};

/// Process-local store; sessions are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<BTreeMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn save_combinations(
        &self,
        submission_id: &str,
        nickname: &str,
        records: &[CombinationRecord],
    ) -> Result<()> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| anyhow!("Session store lock poisoned"))?;
        upsert_combinations(&mut sessions, submission_id, nickname, records);
        Ok(())
    }

    fn complete_session(&self, submission_id: &str, summary: &SessionSummary) -> Result<()> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| anyhow!("Session store lock poisoned"))?;
        attach_summary(&mut sessions, submission_id, summary)
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| anyhow!("Session store lock poisoned"))?;
        Ok(sessions.values().cloned().collect())
    }
}
