//! # Session Module
//!
//! A `Session` is the viewing context of one creator: who is looking, and
//! which source their data comes from. It is built explicitly at the edge
//! (a CLI command, an HTTP handler) and passed to whatever needs it; there
//! is no process-wide "current session".
//!
//! Every operation fetches from the source again. Nothing is cached on the
//! session, so a refresh is simply another call.

use crate::earnings::{BonusSummary, ContestRecord, open_contests};
use crate::graduation::{GraduationAssessor, ProgressReport};
use crate::learning::{ChallengeBoard, EducationTrack, QuizOutcome};
use crate::schedule::{UpcomingBattle, upcoming_battles};
use crate::source::MetricsSource;
use crate::stats::CreatorStats;
use crate::{CreatorHandle, CreatorMetrics, CreatorRecord, TierlineError};
use chrono::{DateTime, Utc};

/// The data view of one creator.
pub struct Session<'a> {
    viewer: CreatorHandle,
    source: &'a dyn MetricsSource,
    assessor: GraduationAssessor,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("viewer", &self.viewer)
            .field("assessor", &self.assessor)
            .finish()
    }
}

impl<'a> Session<'a> {
    /// Create a session with the program default targets.
    #[must_use]
    pub fn new(source: &'a dyn MetricsSource, viewer: CreatorHandle) -> Self {
        Self {
            viewer,
            source,
            assessor: GraduationAssessor::new(),
        }
    }

    /// Replace the assessor (custom default targets).
    #[must_use]
    pub fn with_assessor(mut self, assessor: GraduationAssessor) -> Self {
        self.assessor = assessor;
        self
    }

    #[must_use]
    pub fn viewer(&self) -> &CreatorHandle {
        &self.viewer
    }

    /// Fetch the viewer's creator row.
    pub fn creator(&self) -> Result<CreatorRecord, TierlineError> {
        self.source.creator(&self.viewer)
    }

    /// Fetch and normalize the viewer's metrics.
    pub fn metrics(&self) -> Result<CreatorMetrics, TierlineError> {
        CreatorMetrics::from_record(&self.creator()?)
    }

    /// Graduation progress of the viewer.
    pub fn progress(&self) -> Result<ProgressReport, TierlineError> {
        self.assessor.assess(&self.metrics()?)
    }

    /// Dashboard stats of the viewer.
    pub fn stats(&self) -> Result<CreatorStats, TierlineError> {
        CreatorStats::compute(&self.assessor, &self.metrics()?)
    }

    /// Bonus summary as of `now`.
    pub fn bonus_summary(&self, now: DateTime<Utc>) -> Result<BonusSummary, TierlineError> {
        let creator = self.creator()?;
        let bonuses = self.source.bonuses(&creator.id)?;
        Ok(BonusSummary::compute(&bonuses, now))
    }

    /// Contests open to the viewer's region as of `now`.
    pub fn open_contests(&self, now: DateTime<Utc>) -> Result<Vec<ContestRecord>, TierlineError> {
        let creator = self.creator()?;
        let contests = self.source.contests()?;
        Ok(open_contests(&contests, creator.region.as_deref(), now))
    }

    /// The viewer's battles from `now`'s date onward.
    pub fn upcoming_battles(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<UpcomingBattle>, TierlineError> {
        let creator = self.creator()?;
        let battles = self.source.battles()?;
        Ok(upcoming_battles(&battles, &creator.id, now.date_naive()))
    }

    /// The viewer's challenge board.
    pub fn challenge_board(&self) -> Result<ChallengeBoard, TierlineError> {
        let creator = self.creator()?;
        Ok(ChallengeBoard::from_records(
            self.source.challenge_progress(&creator.id)?,
        ))
    }

    /// The viewer's education track.
    pub fn education_track(&self) -> Result<EducationTrack, TierlineError> {
        let creator = self.creator()?;
        let catalog = self.source.videos()?;
        let records = self.source.education_progress(&creator.id)?;
        Ok(EducationTrack::new(creator.id, catalog, records))
    }

    /// Grade a quiz attempt against the viewer's stored progress.
    ///
    /// With `watched`, that watch percentage is recorded first, so a video
    /// watched in the same visit can be quizzed right away. Nothing is
    /// written back; the outcome carries the rows to store.
    pub fn grade_quiz(
        &self,
        video_number: u32,
        answers: &[usize],
        watched: Option<u8>,
    ) -> Result<QuizOutcome, TierlineError> {
        let mut track = self.education_track()?;
        if let Some(percent) = watched {
            if let Some(row) = track.record_watch(video_number, percent)? {
                track.apply(row);
            }
        }
        track.submit_quiz(video_number, answers)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graduation::Tier;
    use crate::source::Snapshot;
    use crate::{CreatorId, earnings::BonusRecord, earnings::BonusStatus};
    use chrono::{NaiveDate, TimeZone};

    fn handle(h: &str) -> CreatorHandle {
        CreatorHandle::parse(h).expect("handle")
    }

    fn snapshot() -> Snapshot {
        let mut record = CreatorRecord::new(CreatorId::new("c-1"), handle("lumi"));
        record.total_diamonds = Some(350_000);
        record.silver_target = Some(200_000);
        record.gold_target = Some(500_000);
        record.region = Some("US".to_string());

        let bonus = BonusRecord {
            id: "b-1".to_string(),
            creator_id: CreatorId::new("c-1"),
            bonus_cents: 2_500,
            status: BonusStatus::Approved,
            period_start: NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
            period_end: NaiveDate::from_ymd_opt(2024, 5, 31).expect("date"),
            paid_at: None,
            diamonds: 0,
        };

        Snapshot {
            creators: vec![record],
            bonuses: vec![bonus],
            ..Snapshot::new()
        }
    }

    #[test]
    fn progress_for_viewer() {
        let source = snapshot();
        let session = Session::new(&source, handle("lumi"));
        let report = session.progress().expect("progress");
        assert_eq!(report.current_tier, Tier::Silver);
        assert_eq!(report.basis_points, 5_000);
        assert_eq!(report.remaining, 150_000);
    }

    #[test]
    fn unknown_viewer_is_not_found() {
        let source = snapshot();
        let session = Session::new(&source, handle("nobody"));
        assert!(matches!(
            session.stats(),
            Err(TierlineError::CreatorNotFound(_))
        ));
    }

    #[test]
    fn bonus_summary_uses_viewer_rows() {
        let source = snapshot();
        let session = Session::new(&source, handle("lumi"));
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).single().expect("time");
        let summary = session.bonus_summary(now).expect("summary");
        assert_eq!(summary.pending_cents, 2_500);
    }

    #[test]
    fn custom_assessor_changes_defaults_only() {
        let mut source = snapshot();
        source.creators[0].silver_target = None;
        source.creators[0].gold_target = None;

        let assessor = GraduationAssessor::with_default_targets(100_000, 400_000).expect("assessor");
        let session = Session::new(&source, handle("lumi")).with_assessor(assessor);
        let report = session.progress().expect("progress");
        assert_eq!(report.next_threshold, 400_000);
        assert_eq!(report.basis_points, 8_333);
    }

    #[test]
    fn grade_quiz_after_watching() {
        let mut source = snapshot();
        source.videos = vec![crate::learning::Video {
            number: 1,
            title: "Going live".to_string(),
            duration: "5:00".to_string(),
            video_url: None,
            quiz: vec![crate::learning::QuizQuestion {
                question: "Best time to go live?".to_string(),
                options: vec!["Never".to_string(), "Evenings".to_string()],
                correct_answer: 1,
            }],
        }];
        let session = Session::new(&source, handle("lumi"));

        assert!(matches!(
            session.grade_quiz(1, &[1], None),
            Err(TierlineError::QuizLocked(1))
        ));
        let outcome = session.grade_quiz(1, &[1], Some(95)).expect("grade");
        assert!(outcome.passed);
        assert!(outcome.progress.video_completed);
        assert_eq!(outcome.progress.watched_percentage, 95);
    }

    #[test]
    fn fresh_viewer_has_default_tracks() {
        let source = snapshot();
        let session = Session::new(&source, handle("lumi"));
        assert_eq!(session.challenge_board().expect("board").completed_days(), 0);
        assert_eq!(session.education_track().expect("track").passed_videos(), 0);
    }
}
