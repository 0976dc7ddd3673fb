//! # Learning Hub
//!
//! Progression rules for the two learning tracks:
//!
//! - **Challenge**: `CHALLENGE_DAYS` sequential days. Day 1 is open; each
//!   later day opens once the previous day is completed.
//! - **Education**: an ordered video catalog. Watching `WATCH_UNLOCK_PERCENT`
//!   of a video opens its quiz; scoring `QUIZ_PASS_PERCENT` or more passes it
//!   and unlocks the next video.
//!
//! Nothing here writes anywhere. Operations return the updated rows and the
//! caller decides whether and where to store them.

use crate::primitives::{CHALLENGE_DAYS, QUIZ_PASS_PERCENT, WATCH_UNLOCK_PERCENT};
use crate::{CreatorId, TierlineError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// CHALLENGE
// =============================================================================

/// One day of the challenge for one creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub creator_id: CreatorId,
    pub day_number: u32,
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Lock state of a single challenge day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    pub day: u32,
    pub unlocked: bool,
    pub completed: bool,
}

/// The challenge state of one creator.
#[derive(Debug, Clone, Default)]
pub struct ChallengeBoard {
    days: BTreeMap<u32, ChallengeProgress>,
}

impl ChallengeBoard {
    /// Build a board from stored rows. Rows outside the program are ignored.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ChallengeProgress>) -> Self {
        let days = records
            .into_iter()
            .filter(|r| (1..=CHALLENGE_DAYS).contains(&r.day_number))
            .map(|r| (r.day_number, r))
            .collect();
        Self { days }
    }

    #[must_use]
    pub fn is_day_completed(&self, day: u32) -> bool {
        self.days.get(&day).is_some_and(|p| p.is_completed)
    }

    #[must_use]
    pub fn is_day_unlocked(&self, day: u32) -> bool {
        match day {
            1 => true,
            d if d > CHALLENGE_DAYS || d == 0 => false,
            d => self.is_day_completed(d - 1),
        }
    }

    #[must_use]
    pub fn completed_days(&self) -> usize {
        self.days.values().filter(|p| p.is_completed).count()
    }

    /// First unlocked day that is not completed yet.
    #[must_use]
    pub fn next_open_day(&self) -> Option<u32> {
        (1..=CHALLENGE_DAYS).find(|&d| self.is_day_unlocked(d) && !self.is_day_completed(d))
    }

    /// Status of every day, in order.
    #[must_use]
    pub fn days(&self) -> Vec<DayStatus> {
        (1..=CHALLENGE_DAYS)
            .map(|day| DayStatus {
                day,
                unlocked: self.is_day_unlocked(day),
                completed: self.is_day_completed(day),
            })
            .collect()
    }

    /// Row recording `day` as completed at `now`.
    ///
    /// Completing an already completed day is allowed and keeps the original
    /// completion time.
    pub fn complete_day(
        &self,
        creator_id: &CreatorId,
        day: u32,
        now: DateTime<Utc>,
    ) -> Result<ChallengeProgress, TierlineError> {
        if !(1..=CHALLENGE_DAYS).contains(&day) {
            return Err(TierlineError::DayOutOfRange(day));
        }
        if !self.is_day_unlocked(day) {
            return Err(TierlineError::DayLocked(day));
        }

        let completed_at = self
            .days
            .get(&day)
            .and_then(|p| p.completed_at)
            .unwrap_or(now);

        Ok(ChallengeProgress {
            creator_id: creator_id.clone(),
            day_number: day,
            is_completed: true,
            completed_at: Some(completed_at),
        })
    }
}

// =============================================================================
// EDUCATION CATALOG
// =============================================================================

/// A multiple-choice question; `correct_answer` indexes `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

/// A catalog video and its quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
}

/// Stored progress of one creator on one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationProgress {
    pub creator_id: CreatorId,
    pub video_number: u32,
    #[serde(default)]
    pub watched_percentage: u8,
    #[serde(default)]
    pub video_completed: bool,
    #[serde(default)]
    pub quiz_passed: bool,
    #[serde(default)]
    pub quiz_attempts: u32,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub quiz_score: Option<u8>,
}

impl EducationProgress {
    /// Progress for a video nobody has touched; only the first video is open.
    #[must_use]
    pub fn fresh(creator_id: CreatorId, video_number: u32, first: bool) -> Self {
        Self {
            creator_id,
            video_number,
            watched_percentage: 0,
            video_completed: false,
            quiz_passed: false,
            quiz_attempts: 0,
            unlocked: first,
            quiz_score: None,
        }
    }

    /// The quiz can be taken once the video is completed.
    #[must_use]
    pub fn quiz_open(&self) -> bool {
        self.unlocked && self.video_completed
    }
}

/// Result of grading one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub video_number: u32,
    pub correct: usize,
    pub total: usize,
    /// `floor(correct * 100 / total)`.
    pub score_percent: u8,
    pub passed: bool,
    /// Updated row for the graded video.
    pub progress: EducationProgress,
    /// Row unlocking the following video, when this attempt passed.
    pub unlocked_next: Option<EducationProgress>,
}

// =============================================================================
// EDUCATION TRACK
// =============================================================================

/// The education state of one creator across the whole catalog.
#[derive(Debug, Clone)]
pub struct EducationTrack {
    creator_id: CreatorId,
    catalog: Vec<Video>,
    progress: BTreeMap<u32, EducationProgress>,
}

impl EducationTrack {
    /// Merge stored rows with the catalog.
    ///
    /// Catalog videos without a row get a fresh one; rows for videos that are
    /// no longer in the catalog are dropped.
    #[must_use]
    pub fn new(
        creator_id: CreatorId,
        mut catalog: Vec<Video>,
        records: impl IntoIterator<Item = EducationProgress>,
    ) -> Self {
        catalog.sort_by_key(|v| v.number);
        catalog.dedup_by_key(|v| v.number);

        let mut stored: BTreeMap<u32, EducationProgress> = records
            .into_iter()
            .map(|r| (r.video_number, r))
            .collect();

        let first = catalog.first().map(|v| v.number);
        let progress = catalog
            .iter()
            .map(|video| {
                let row = stored.remove(&video.number).unwrap_or_else(|| {
                    EducationProgress::fresh(
                        creator_id.clone(),
                        video.number,
                        Some(video.number) == first,
                    )
                });
                (video.number, row)
            })
            .collect();

        Self {
            creator_id,
            catalog,
            progress,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &[Video] {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self, video_number: u32) -> Option<&EducationProgress> {
        self.progress.get(&video_number)
    }

    /// Progress rows in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &EducationProgress> {
        self.progress.values()
    }

    #[must_use]
    pub fn passed_videos(&self) -> usize {
        self.progress.values().filter(|p| p.quiz_passed).count()
    }

    /// Replace the row of a catalog video, e.g. with one returned by
    /// `record_watch`. Rows for videos outside the catalog are ignored.
    pub fn apply(&mut self, row: EducationProgress) {
        if let Some(slot) = self.progress.get_mut(&row.video_number) {
            *slot = row;
        }
    }

    fn video(&self, number: u32) -> Result<(&Video, &EducationProgress), TierlineError> {
        let video = self
            .catalog
            .iter()
            .find(|v| v.number == number)
            .ok_or(TierlineError::VideoNotFound(number))?;
        let progress = self
            .progress
            .get(&number)
            .ok_or(TierlineError::VideoNotFound(number))?;
        Ok((video, progress))
    }

    /// Record watching `percent` of a video.
    ///
    /// Returns the updated row when this watch completes the video, `None`
    /// when nothing changes (below the threshold or already completed).
    pub fn record_watch(
        &self,
        video_number: u32,
        percent: u8,
    ) -> Result<Option<EducationProgress>, TierlineError> {
        let (_, progress) = self.video(video_number)?;
        if !progress.unlocked {
            return Err(TierlineError::VideoLocked(video_number));
        }

        let percent = percent.min(100);
        if percent < WATCH_UNLOCK_PERCENT || progress.video_completed {
            return Ok(None);
        }

        let mut updated = progress.clone();
        updated.watched_percentage = percent;
        updated.video_completed = true;
        Ok(Some(updated))
    }

    /// Grade a quiz attempt. `answers[i]` is the chosen option of question `i`.
    ///
    /// A pass is sticky: a later failed attempt never clears `quiz_passed`.
    pub fn submit_quiz(
        &self,
        video_number: u32,
        answers: &[usize],
    ) -> Result<QuizOutcome, TierlineError> {
        let (video, progress) = self.video(video_number)?;
        if !progress.unlocked {
            return Err(TierlineError::VideoLocked(video_number));
        }
        if !progress.quiz_open() {
            return Err(TierlineError::QuizLocked(video_number));
        }
        if answers.len() != video.quiz.len() {
            return Err(TierlineError::AnswerCountMismatch {
                expected: video.quiz.len(),
                got: answers.len(),
            });
        }

        let total = video.quiz.len();
        let correct = video
            .quiz
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.correct_answer == **a)
            .count();
        // An empty quiz has nothing to get wrong.
        let score_percent = if total == 0 {
            100
        } else {
            (correct * 100 / total) as u8
        };
        let passed = score_percent >= QUIZ_PASS_PERCENT;

        let mut updated = progress.clone();
        updated.quiz_attempts = updated.quiz_attempts.saturating_add(1);
        updated.quiz_passed = updated.quiz_passed || passed;
        updated.quiz_score = Some(score_percent);

        let unlocked_next = if passed {
            self.catalog
                .iter()
                .find(|v| v.number > video_number)
                .and_then(|next| self.progress.get(&next.number))
                .map(|next| {
                    let mut row = next.clone();
                    row.unlocked = true;
                    row
                })
        } else {
            None
        };

        Ok(QuizOutcome {
            video_number,
            correct,
            total,
            score_percent,
            passed,
            progress: updated,
            unlocked_next,
        })
    }

    #[must_use]
    pub fn creator_id(&self) -> &CreatorId {
        &self.creator_id
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn creator() -> CreatorId {
        CreatorId::new("c-1")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).single().expect("time")
    }

    fn day(n: u32, completed: bool) -> ChallengeProgress {
        ChallengeProgress {
            creator_id: creator(),
            day_number: n,
            is_completed: completed,
            completed_at: None,
        }
    }

    #[test]
    fn first_day_always_unlocked() {
        let board = ChallengeBoard::default();
        assert!(board.is_day_unlocked(1));
        assert!(!board.is_day_unlocked(2));
        assert_eq!(board.next_open_day(), Some(1));
    }

    #[test]
    fn completing_a_day_unlocks_the_next() {
        let board = ChallengeBoard::from_records(vec![day(1, true), day(2, false)]);
        assert!(board.is_day_unlocked(2));
        assert!(!board.is_day_unlocked(3));
        assert_eq!(board.completed_days(), 1);
        assert_eq!(board.next_open_day(), Some(2));
    }

    #[test]
    fn complete_locked_day_fails() {
        let board = ChallengeBoard::default();
        let result = board.complete_day(&creator(), 3, now());
        assert!(matches!(result, Err(TierlineError::DayLocked(3))));
    }

    #[test]
    fn complete_out_of_range_fails() {
        let board = ChallengeBoard::default();
        assert!(matches!(
            board.complete_day(&creator(), 0, now()),
            Err(TierlineError::DayOutOfRange(0))
        ));
        assert!(matches!(
            board.complete_day(&creator(), CHALLENGE_DAYS + 1, now()),
            Err(TierlineError::DayOutOfRange(_))
        ));
    }

    #[test]
    fn complete_day_stamps_time() {
        let board = ChallengeBoard::default();
        let row = board.complete_day(&creator(), 1, now()).expect("complete");
        assert!(row.is_completed);
        assert_eq!(row.completed_at, Some(now()));
    }

    #[test]
    fn days_lists_whole_program() {
        let board = ChallengeBoard::from_records(vec![day(1, true), day(40, true)]);
        let days = board.days();
        assert_eq!(days.len(), CHALLENGE_DAYS as usize);
        assert!(days[0].completed);
        assert!(days[1].unlocked);
        assert_eq!(board.completed_days(), 1);
    }

    fn catalog() -> Vec<Video> {
        let question = |correct| QuizQuestion {
            question: "q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answer: correct,
        };
        vec![
            Video {
                number: 2,
                title: "Second".to_string(),
                duration: "6:00".to_string(),
                video_url: None,
                quiz: vec![question(0)],
            },
            Video {
                number: 1,
                title: "First".to_string(),
                duration: "8:30".to_string(),
                video_url: None,
                quiz: vec![question(1), question(2), question(0)],
            },
        ]
    }

    fn watched_first() -> EducationProgress {
        let mut row = EducationProgress::fresh(creator(), 1, true);
        row.video_completed = true;
        row.watched_percentage = 95;
        row
    }

    #[test]
    fn missing_rows_default_with_first_unlocked() {
        let track = EducationTrack::new(creator(), catalog(), vec![]);
        assert!(track.progress(1).expect("row").unlocked);
        assert!(!track.progress(2).expect("row").unlocked);
        assert_eq!(track.catalog()[0].number, 1);
    }

    #[test]
    fn watch_below_threshold_changes_nothing() {
        let track = EducationTrack::new(creator(), catalog(), vec![]);
        assert_eq!(track.record_watch(1, 89).expect("watch"), None);
    }

    #[test]
    fn watch_completes_video() {
        let track = EducationTrack::new(creator(), catalog(), vec![]);
        let row = track.record_watch(1, 90).expect("watch").expect("updated");
        assert!(row.video_completed);
        assert!(row.quiz_open());
    }

    #[test]
    fn applied_watch_opens_quiz() {
        let mut track = EducationTrack::new(creator(), catalog(), vec![]);
        let row = track.record_watch(1, 100).expect("watch").expect("updated");
        track.apply(row);

        assert!(track.progress(1).expect("row").quiz_open());
        assert!(track.submit_quiz(1, &[1, 2, 0]).is_ok());
    }

    #[test]
    fn watch_locked_video_fails() {
        let track = EducationTrack::new(creator(), catalog(), vec![]);
        assert!(matches!(
            track.record_watch(2, 100),
            Err(TierlineError::VideoLocked(2))
        ));
    }

    #[test]
    fn quiz_requires_watching() {
        let track = EducationTrack::new(creator(), catalog(), vec![]);
        assert!(matches!(
            track.submit_quiz(1, &[1, 2, 0]),
            Err(TierlineError::QuizLocked(1))
        ));
    }

    #[test]
    fn quiz_requires_every_answer() {
        let track = EducationTrack::new(creator(), catalog(), vec![watched_first()]);
        assert!(matches!(
            track.submit_quiz(1, &[1]),
            Err(TierlineError::AnswerCountMismatch {
                expected: 3,
                got: 1
            })
        ));
    }

    #[test]
    fn passing_quiz_unlocks_next_video() {
        let track = EducationTrack::new(creator(), catalog(), vec![watched_first()]);
        let outcome = track.submit_quiz(1, &[1, 2, 0]).expect("grade");

        assert_eq!(outcome.score_percent, 100);
        assert!(outcome.passed);
        assert_eq!(outcome.progress.quiz_attempts, 1);
        let next = outcome.unlocked_next.expect("next");
        assert_eq!(next.video_number, 2);
        assert!(next.unlocked);
    }

    #[test]
    fn two_of_three_fails() {
        // 66% is below the 70% pass mark.
        let track = EducationTrack::new(creator(), catalog(), vec![watched_first()]);
        let outcome = track.submit_quiz(1, &[1, 2, 2]).expect("grade");

        assert_eq!(outcome.score_percent, 66);
        assert!(!outcome.passed);
        assert!(outcome.unlocked_next.is_none());
        assert_eq!(outcome.progress.quiz_score, Some(66));
    }

    #[test]
    fn failed_retake_keeps_pass() {
        let mut row = watched_first();
        row.quiz_passed = true;
        row.quiz_attempts = 1;
        let track = EducationTrack::new(creator(), catalog(), vec![row]);

        let outcome = track.submit_quiz(1, &[0, 0, 1]).expect("grade");
        assert!(!outcome.passed);
        assert!(outcome.progress.quiz_passed);
        assert_eq!(outcome.progress.quiz_attempts, 2);
        assert_eq!(track.passed_videos(), 1);
    }

    #[test]
    fn last_video_pass_unlocks_nothing() {
        let mut second = EducationProgress::fresh(creator(), 2, false);
        second.unlocked = true;
        second.video_completed = true;
        let track = EducationTrack::new(creator(), catalog(), vec![watched_first(), second]);

        let outcome = track.submit_quiz(2, &[0]).expect("grade");
        assert!(outcome.passed);
        assert!(outcome.unlocked_next.is_none());
    }

    #[test]
    fn unknown_video_fails() {
        let track = EducationTrack::new(creator(), catalog(), vec![]);
        assert!(matches!(
            track.submit_quiz(9, &[]),
            Err(TierlineError::VideoNotFound(9))
        ));
    }
}
