use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::scoring::{score, AnswerKey, Combination, ScoreError, ScoreResult};
use crate::store::{CombinationRecord, ScoreStore, SessionSummary};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    InvalidInput(#[from] ScoreError),

    /// The submission was scored but could not be stored. Retrying with the
    /// same submission id is safe.
    #[error("submission {submission_id} was scored but not saved: {source:#}")]
    Persistence {
        submission_id: String,
        result: Box<ScoreResult>,
        source: anyhow::Error,
    },
}

/// How store writes are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub first_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self {
            attempts: storage.retry_attempts.max(1),
            first_delay: storage.retry_delay().unwrap_or(Duration::from_millis(50)),
        }
    }

    /// Delays of `first_delay`, then doubling, for the attempts after the first.
    fn strategy(&self) -> impl Iterator<Item = Duration> {
        let half = (self.first_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(half)
            .max_delay(MAX_RETRY_DELAY)
            .map(jitter)
            .take(self.attempts.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

/// Score a submission and persist it: combination records first, then the
/// session summary.
///
/// Invalid input is rejected before anything is written. A store failure
/// that outlives the retry budget is returned together with the computed
/// result.
pub async fn submit_and_record(
    store: Arc<dyn ScoreStore>,
    retry: RetryPolicy,
    submission_id: &str,
    nickname: &str,
    submission: &[Combination],
) -> Result<ScoreResult, SubmitError> {
    let result = score(nickname, submission, AnswerKey::standard())?;
    debug!(
        submission_id,
        nickname,
        perfect_groups = result.breakdown.perfect_groups,
        hits = result.breakdown.hits,
        false_positives = result.breakdown.false_positives,
        "scored submission"
    );

    let records: Arc<Vec<CombinationRecord>> =
        Arc::new(result.results.iter().map(CombinationRecord::from).collect());
    let summary = SessionSummary::from_result(&result, Utc::now());

    if let Err(source) = persist(store, retry, submission_id, nickname, records, summary).await {
        warn!(submission_id, error = %format!("{:#}", source), "failed to save submission");
        return Err(SubmitError::Persistence {
            submission_id: submission_id.to_string(),
            result: Box::new(result),
            source,
        });
    }

    info!(
        submission_id,
        nickname,
        combinations = submission.len(),
        score = result.total_score,
        "submission recorded"
    );
    Ok(result)
}

async fn persist(
    store: Arc<dyn ScoreStore>,
    retry: RetryPolicy,
    submission_id: &str,
    nickname: &str,
    records: Arc<Vec<CombinationRecord>>,
    summary: SessionSummary,
) -> anyhow::Result<()> {
    let submission_id: Arc<str> = Arc::from(submission_id);
    let nickname: Arc<str> = Arc::from(nickname);

    Retry::spawn(retry.strategy(), || {
        let store = Arc::clone(&store);
        let submission_id = Arc::clone(&submission_id);
        let nickname = Arc::clone(&nickname);
        let records = Arc::clone(&records);
        run_blocking(move || store.save_combinations(&submission_id, &nickname, &records))
    })
    .await?;

    Retry::spawn(retry.strategy(), || {
        let store = Arc::clone(&store);
        let submission_id = Arc::clone(&submission_id);
        let summary = summary.clone();
        run_blocking(move || store.complete_session(&submission_id, &summary))
    })
    .await?;

    Ok(())
}

/// Run a store call on the blocking pool.
async fn run_blocking<F>(f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(f).await;
    match outcome {
        Ok(result) => {
            if let Err(ref e) = result {
                debug!(error = %format!("{:#}", e), "store call failed");
            }
            result
        }
        Err(join_error) => Err(anyhow::anyhow!("Store task failed: {}", join_error)),
    }
}
