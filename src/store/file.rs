use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{CombinationRecord, SessionRecord, SessionSummary};
use super::{attach_summary, upsert_combinations, ScoreStore};

const STORE_VERSION: u32 = 1;

/// Get the default session store path (~/.local/share/card-trio/sessions.json)
pub fn get_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("card-trio"))
        .unwrap_or_else(crate::config::get_config_dir)
        .join("sessions.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    sessions: BTreeMap<String, SessionRecord>,
}

impl StoreDocument {
    fn new() -> Self {
        Self {
            version: STORE_VERSION,
            sessions: BTreeMap::new(),
        }
    }
}

/// JSON-file store. Every write replaces the whole document atomically, so
/// readers never see a partially written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl FileStore {
    /// Open a store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = load_document(&path)?;
        debug!(
            path = %path.display(),
            sessions = document.sessions.len(),
            "opened session store"
        );
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the document, persist it, and only then
    /// make it the current state.
    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, SessionRecord>) -> Result<()>,
    {
        let mut current = self
            .document
            .lock()
            .map_err(|_| anyhow!("Session store lock poisoned"))?;
        let mut next = current.clone();
        change(&mut next.sessions)?;
        save_document(&self.path, &next)?;
        *current = next;
        Ok(())
    }
}

impl ScoreStore for FileStore {
    fn save_combinations(
        &self,
        submission_id: &str,
        nickname: &str,
        records: &[CombinationRecord],
    ) -> Result<()> {
        self.update(|sessions| {
            upsert_combinations(sessions, submission_id, nickname, records);
            Ok(())
        })
    }

    fn complete_session(&self, submission_id: &str, summary: &SessionSummary) -> Result<()> {
        self.update(|sessions| attach_summary(sessions, submission_id, summary))
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>> {
        let document = self
            .document
            .lock()
            .map_err(|_| anyhow!("Session store lock poisoned"))?;
        Ok(document.sessions.values().cloned().collect())
    }
}

/// Load the store document from a JSON file
///
/// If the file doesn't exist, returns a new empty document.
/// If the file exists but has an unsupported version, returns an error.
fn load_document(path: &Path) -> Result<StoreDocument> {
    if !path.exists() {
        return Ok(StoreDocument::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open session store at {}", path.display()))?;

    let document: StoreDocument =
        serde_json::from_reader(file).context("Failed to load session store")?;

    if document.version != STORE_VERSION {
        anyhow::bail!("Unsupported session store version: {}", document.version);
    }

    Ok(document)
}

/// Save the store document atomically, creating the parent directory.
fn save_document(path: &Path, document: &StoreDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, document)
        .context("Failed to serialize session store")?;

    file.commit().context("Failed to save session store")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn records() -> Vec<CombinationRecord> {
        vec![CombinationRecord {
            card_ids: vec!["670".into(), "675".into(), "680".into()],
            flagged_id: Some("680".into()),
            is_grouping_correct: true,
            is_flag_correct: true,
        }]
    }

    fn summary() -> SessionSummary {
        SessionSummary {
            total_score: 15.5,
            combinations_count: 1,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("sessions.json")).unwrap();
        assert!(store.sessions().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reopen_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.json");

        let store = FileStore::open(&path).unwrap();
        store.save_combinations("s1", "ben", &records()).unwrap();
        store.complete_session("s1", &summary()).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        let sessions = reopened.sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].nickname, "ben");
        assert_eq!(sessions[0].combinations, records());
        assert_eq!(reopened.leaderboard(10, 0).unwrap().entries[0].score, 15.5);
    }

    #[test]
    fn test_failed_change_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let store = FileStore::open(&path).unwrap();

        assert!(store.complete_session("ghost", &summary()).is_err());
        assert!(store.sessions().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, r#"{ "version": 2, "sessions": {} }"#).unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported session store version"));
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
