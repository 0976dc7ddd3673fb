//! # Metrics Sources
//!
//! The input boundary. The relational data service that owns creator rows
//! is external; this module only describes what the rest of the crate
//! needs from it.
//!
//! ## Implementations
//!
//! - [`Snapshot`]: all tables held in memory (tests, embedding).
//! - [`SnapshotFile`]: a JSON export on disk, re-read on every call so a
//!   refresh always sees the current file.
//!
//! Only active creators are visible through a source.

use crate::earnings::{BonusRecord, ContestRecord};
use crate::learning::{ChallengeProgress, EducationProgress, Video};
use crate::primitives::MAX_SNAPSHOT_FILE_SIZE;
use crate::schedule::BattleRecord;
use crate::{CreatorHandle, CreatorId, CreatorRecord, TierlineError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// SOURCE TRAIT
// =============================================================================

/// Read-only access to the creator program tables.
///
/// Object safe, so callers can hold a `&dyn MetricsSource` or an
/// `Arc<dyn MetricsSource>`.
pub trait MetricsSource: Send + Sync {
    /// The active creator with this handle.
    ///
    /// Returns `TierlineError::CreatorNotFound` for unknown or inactive
    /// handles. Rows with an invalid stored handle never match.
    fn creator(&self, handle: &CreatorHandle) -> Result<CreatorRecord, TierlineError>;

    /// All active creators, including rows whose handle is invalid.
    fn creators(&self) -> Result<Vec<CreatorRecord>, TierlineError>;

    /// Bonus rows of one creator.
    fn bonuses(&self, creator: &CreatorId) -> Result<Vec<BonusRecord>, TierlineError>;

    /// Every contest, regardless of region or date.
    fn contests(&self) -> Result<Vec<ContestRecord>, TierlineError>;

    /// Every scheduled battle.
    fn battles(&self) -> Result<Vec<BattleRecord>, TierlineError>;

    /// Challenge rows of one creator.
    fn challenge_progress(
        &self,
        creator: &CreatorId,
    ) -> Result<Vec<ChallengeProgress>, TierlineError>;

    /// Education rows of one creator.
    fn education_progress(
        &self,
        creator: &CreatorId,
    ) -> Result<Vec<EducationProgress>, TierlineError>;

    /// The video catalog.
    fn videos(&self) -> Result<Vec<Video>, TierlineError>;
}

// =============================================================================
// IN-MEMORY SNAPSHOT
// =============================================================================

/// Every table of the creator program, held in memory.
///
/// Deserializes from a JSON object with one array per table; missing
/// tables are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub creators: Vec<CreatorRecord>,
    #[serde(default)]
    pub bonuses: Vec<BonusRecord>,
    #[serde(default)]
    pub contests: Vec<ContestRecord>,
    #[serde(default)]
    pub battles: Vec<BattleRecord>,
    #[serde(default)]
    pub challenge_progress: Vec<ChallengeProgress>,
    #[serde(default)]
    pub education_progress: Vec<EducationProgress>,
    #[serde(default)]
    pub videos: Vec<Video>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self, TierlineError> {
        serde_json::from_str(json).map_err(|e| TierlineError::DeserializationError(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, TierlineError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TierlineError::DeserializationError(e.to_string()))
    }
}

impl MetricsSource for Snapshot {
    fn creator(&self, handle: &CreatorHandle) -> Result<CreatorRecord, TierlineError> {
        self.creators
            .iter()
            .find(|c| c.is_active && c.handle().is_ok_and(|h| &h == handle))
            .cloned()
            .ok_or_else(|| TierlineError::CreatorNotFound(handle.to_string()))
    }

    fn creators(&self) -> Result<Vec<CreatorRecord>, TierlineError> {
        Ok(self.creators.iter().filter(|c| c.is_active).cloned().collect())
    }

    fn bonuses(&self, creator: &CreatorId) -> Result<Vec<BonusRecord>, TierlineError> {
        Ok(self
            .bonuses
            .iter()
            .filter(|b| &b.creator_id == creator)
            .cloned()
            .collect())
    }

    fn contests(&self) -> Result<Vec<ContestRecord>, TierlineError> {
        Ok(self.contests.clone())
    }

    fn battles(&self) -> Result<Vec<BattleRecord>, TierlineError> {
        Ok(self.battles.clone())
    }

    fn challenge_progress(
        &self,
        creator: &CreatorId,
    ) -> Result<Vec<ChallengeProgress>, TierlineError> {
        Ok(self
            .challenge_progress
            .iter()
            .filter(|p| &p.creator_id == creator)
            .cloned()
            .collect())
    }

    fn education_progress(
        &self,
        creator: &CreatorId,
    ) -> Result<Vec<EducationProgress>, TierlineError> {
        Ok(self
            .education_progress
            .iter()
            .filter(|p| &p.creator_id == creator)
            .cloned()
            .collect())
    }

    fn videos(&self) -> Result<Vec<Video>, TierlineError> {
        Ok(self.videos.clone())
    }
}

// =============================================================================
// SNAPSHOT FILE
// =============================================================================

/// A JSON snapshot on disk.
///
/// Holds only the path; every call reads and parses the file again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Point at a snapshot file. The file is not touched until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the current contents of the file.
    ///
    /// Files larger than `MAX_SNAPSHOT_FILE_SIZE` are rejected before reading.
    pub fn load(&self) -> Result<Snapshot, TierlineError> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| {
            TierlineError::IoError(format!(
                "Cannot read snapshot '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        if !metadata.is_file() {
            return Err(TierlineError::IoError(format!(
                "Snapshot '{}' is not a regular file",
                self.path.display()
            )));
        }
        if metadata.len() > MAX_SNAPSHOT_FILE_SIZE {
            return Err(TierlineError::IoError(format!(
                "Snapshot size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_SNAPSHOT_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| TierlineError::IoError(format!("Read failed: {}", e)))?;
        Snapshot::from_json(&text)
    }
}

impl MetricsSource for SnapshotFile {
    fn creator(&self, handle: &CreatorHandle) -> Result<CreatorRecord, TierlineError> {
        self.load()?.creator(handle)
    }

    fn creators(&self) -> Result<Vec<CreatorRecord>, TierlineError> {
        self.load()?.creators()
    }

    fn bonuses(&self, creator: &CreatorId) -> Result<Vec<BonusRecord>, TierlineError> {
        self.load()?.bonuses(creator)
    }

    fn contests(&self) -> Result<Vec<ContestRecord>, TierlineError> {
        Ok(self.load()?.contests)
    }

    fn battles(&self) -> Result<Vec<BattleRecord>, TierlineError> {
        Ok(self.load()?.battles)
    }

    fn challenge_progress(
        &self,
        creator: &CreatorId,
    ) -> Result<Vec<ChallengeProgress>, TierlineError> {
        self.load()?.challenge_progress(creator)
    }

    fn education_progress(
        &self,
        creator: &CreatorId,
    ) -> Result<Vec<EducationProgress>, TierlineError> {
        self.load()?.education_progress(creator)
    }

    fn videos(&self) -> Result<Vec<Video>, TierlineError> {
        Ok(self.load()?.videos)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn handle(h: &str) -> CreatorHandle {
        CreatorHandle::parse(h).expect("handle")
    }

    fn snapshot() -> Snapshot {
        let mut active = CreatorRecord::new(CreatorId::new("c-1"), handle("lumi"));
        active.total_diamonds = Some(10);
        let mut inactive = CreatorRecord::new(CreatorId::new("c-2"), handle("gone"));
        inactive.is_active = false;

        Snapshot {
            creators: vec![active, inactive],
            ..Snapshot::new()
        }
    }

    #[test]
    fn finds_active_creator() {
        let record = snapshot().creator(&handle("@lumi")).expect("creator");
        assert_eq!(record.id.as_str(), "c-1");
    }

    #[test]
    fn inactive_creator_is_not_found() {
        let result = snapshot().creator(&handle("gone"));
        assert!(matches!(result, Err(TierlineError::CreatorNotFound(_))));
        assert_eq!(snapshot().creators().expect("creators").len(), 1);
    }

    #[test]
    fn empty_json_object_is_empty_snapshot() {
        let snapshot = Snapshot::from_json("{}").expect("parse");
        assert_eq!(snapshot, Snapshot::new());
    }

    #[test]
    fn bad_handle_row_does_not_hide_others() {
        let json = r#"{"creators": [
            {"id": "c-1", "creator_handle": "lumi"},
            {"id": "c-2", "creator_handle": "two words"}
        ]}"#;
        let snapshot = Snapshot::from_json(json).expect("parse");

        assert_eq!(snapshot.creators().expect("creators").len(), 2);
        assert!(snapshot.creator(&handle("lumi")).is_ok());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Snapshot::from_json("{\"creators\": 4}"),
            Err(TierlineError::DeserializationError(_))
        ));
    }

    #[test]
    fn file_is_reread_on_every_call() {
        let mut file = tempfile::NamedTempFile::new().expect("temp");
        write!(file, "{}", snapshot().to_json().expect("json")).expect("write");
        let source = SnapshotFile::new(file.path());

        let before = source.creator(&handle("lumi")).expect("creator");
        assert_eq!(before.total_diamonds, Some(10));

        let mut updated = snapshot();
        updated.creators[0].total_diamonds = Some(99);
        std::fs::write(file.path(), updated.to_json().expect("json")).expect("rewrite");

        let after = source.creator(&handle("lumi")).expect("creator");
        assert_eq!(after.total_diamonds, Some(99));
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = SnapshotFile::new("/definitely/not/here.json");
        assert!(matches!(source.load(), Err(TierlineError::IoError(_))));
    }
}
