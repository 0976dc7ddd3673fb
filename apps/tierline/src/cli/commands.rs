//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! `--json-mode` prints the same structures the HTTP API returns.

use crate::api::{
    self, AppState, BattlesResponse, BonusesResponse, ContestsResponse, LearningResponse,
    ProgressResponse, QuizResponse, StatsResponse,
};
use crate::config::AppConfig;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tierline_core::{
    CreatorHandle, CreatorMetrics, MetricsSource, Session, SnapshotFile, TierlineError,
    format_cents,
};

// =============================================================================
// COMMAND CONTEXT
// =============================================================================

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: AppConfig,
    /// `--snapshot`, overriding `[source] snapshot`.
    pub snapshot: Option<PathBuf>,
    pub json_mode: bool,
    pub verbose: bool,
}

impl CommandContext {
    /// The configured snapshot file, validated.
    pub fn source(&self) -> Result<SnapshotFile, TierlineError> {
        let path = self.config.snapshot_path(self.snapshot.as_deref())?;
        let validated = validate_file_path(&path)?;
        tracing::debug!("Using snapshot {}", validated.display());
        Ok(SnapshotFile::new(validated))
    }

    /// A session for `handle` over `source`, with the configured targets.
    pub fn session<'a>(
        &self,
        source: &'a dyn MetricsSource,
        handle: CreatorHandle,
    ) -> Result<Session<'a>, TierlineError> {
        Ok(Session::new(source, handle).with_assessor(self.config.assessor()?))
    }
}

/// Validate file path for security.
///
/// Canonicalizes the path (resolving ".." and symlinks) and ensures it is
/// an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, TierlineError> {
    let canonical = path.canonicalize().map_err(|e| {
        TierlineError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(TierlineError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn print_json(value: &impl Serialize) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    ctx: &CommandContext,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let assessor = ctx.config.assessor()?;
    let host = host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = port.unwrap_or(ctx.config.server.port);
    let defaults = assessor.defaults();

    println!("Tierline Creator Progress Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Snapshot: {}", source.path().display());
    println!(
        "  Targets:  silver {} / gold {}",
        defaults.silver(),
        defaults.gold()
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health                      - Health check");
    println!("  GET  /creators/{{handle}}/progress  - Graduation progress");
    println!("  GET  /creators/{{handle}}/stats     - Dashboard stats");
    println!("  GET  /creators/{{handle}}/bonuses   - Bonus summary");
    println!("  GET  /creators/{{handle}}/contests  - Open contests");
    println!("  GET  /creators/{{handle}}/battles   - Upcoming battles");
    println!("  GET  /creators/{{handle}}/learning  - Learning progress");
    println!("  POST /creators/{{handle}}/quiz      - Grade a quiz");
    println!("  POST /progress                    - Progress from numbers");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, AppState::new(Arc::new(source), assessor)).await
}

// =============================================================================
// PROGRESS COMMAND
// =============================================================================

/// Show graduation progress.
pub fn cmd_progress(ctx: &CommandContext, handle: CreatorHandle) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let session = ctx.session(&source, handle)?;
    let report = session.progress()?;

    if ctx.json_mode {
        print_json(&ProgressResponse::from_report(
            Some(session.viewer()),
            &report,
        ));
        return Ok(());
    }

    println!("Graduation Progress for {}", session.viewer());
    println!("==============================");
    println!();
    println!("Status:    {}", report.display_label());
    println!("Next Tier: {}", report.next_tier);
    println!("Progress:  {}%", report.percent_display());
    println!(
        "Remaining: {} diamonds to {}",
        report.remaining, report.next_threshold
    );

    if ctx.verbose {
        let metrics = session.metrics()?;
        let thresholds = ctx.config.assessor()?.thresholds(&metrics)?;
        println!();
        println!("Details:");
        println!("  Lifetime Diamonds: {}", report.total_diamonds);
        println!("  Silver Target:     {}", thresholds.silver());
        println!("  Gold Target:       {}", thresholds.gold());
        println!("  Current Tier:      {}", report.current_tier);
    }

    Ok(())
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show dashboard stats.
pub fn cmd_stats(ctx: &CommandContext, handle: CreatorHandle) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let session = ctx.session(&source, handle)?;
    let creator = session.creator()?;
    let stats = session.stats()?;

    if ctx.json_mode {
        print_json(&StatsResponse::new(session.viewer(), &creator, &stats));
        return Ok(());
    }

    println!("{} ({})", creator.display_name(), session.viewer());
    println!("==============================");
    println!();
    println!("Monthly Diamonds: {}", stats.monthly_diamonds);
    println!("30-Day Diamonds:  {}", stats.diamonds_30d);
    println!("Total Diamonds:   {}", stats.total_diamonds);
    println!("Live Days:        {}", stats.live_days);
    println!("Live Hours:       {}", stats.live_hours);
    println!("Streak:           {} days", stats.streak);
    println!();
    println!(
        "Status: {} ({}% to {})",
        stats.status_label(),
        stats.graduation.percent_display(),
        stats.graduation.next_tier
    );

    Ok(())
}

// =============================================================================
// EARNINGS COMMANDS
// =============================================================================

/// Show bonus summary.
pub fn cmd_bonuses(ctx: &CommandContext, handle: CreatorHandle) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let session = ctx.session(&source, handle)?;
    let summary = session.bonus_summary(Utc::now())?;

    if ctx.json_mode {
        print_json(&BonusesResponse::new(session.viewer(), &summary));
        return Ok(());
    }

    println!("Bonuses for {}", session.viewer());
    println!("==============================");
    println!();
    println!(
        "Earned This Month: {}",
        format_cents(summary.earned_this_month_cents)
    );
    println!("Pending:           {}", format_cents(summary.pending_cents));
    println!("Last Payout:       {}", summary.last_payout_display());
    if ctx.verbose {
        println!("Bonuses Counted:   {}", summary.counted);
    }

    Ok(())
}

/// List open contests.
pub fn cmd_contests(ctx: &CommandContext, handle: CreatorHandle) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let session = ctx.session(&source, handle)?;
    let creator = session.creator()?;
    let contests = session.open_contests(Utc::now())?;

    if ctx.json_mode {
        print_json(&ContestsResponse {
            handle: session.viewer().to_string(),
            region: creator.region,
            contests,
        });
        return Ok(());
    }

    println!(
        "Open Contests for {} (region: {})",
        session.viewer(),
        creator.region.as_deref().unwrap_or("none")
    );
    println!("==============================");
    if contests.is_empty() {
        println!("No open contests");
    }
    for contest in &contests {
        println!();
        println!("{}", contest.title);
        println!(
            "  {} to {}",
            contest.start_at.date_naive(),
            contest.end_at.date_naive()
        );
        if contest.prize_cents > 0 {
            println!("  Prize: {}", format_cents(contest.prize_cents));
        }
        if ctx.verbose && !contest.description.is_empty() {
            println!("  {}", contest.description);
        }
    }

    Ok(())
}

// =============================================================================
// SCHEDULE COMMAND
// =============================================================================

/// List upcoming battles.
pub fn cmd_battles(ctx: &CommandContext, handle: CreatorHandle) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let session = ctx.session(&source, handle)?;
    let battles = session.upcoming_battles(Utc::now())?;

    if ctx.json_mode {
        print_json(&BattlesResponse {
            handle: session.viewer().to_string(),
            battles,
        });
        return Ok(());
    }

    println!("Upcoming Battles for {}", session.viewer());
    println!("==============================");
    if battles.is_empty() {
        println!("No upcoming battles");
    }
    for battle in &battles {
        println!(
            "{}  {:>5}  vs @{}",
            battle.battle_date, battle.display_time, battle.opponent_handle
        );
    }

    Ok(())
}

// =============================================================================
// LEARNING COMMANDS
// =============================================================================

/// Show challenge and education progress.
pub fn cmd_learning(ctx: &CommandContext, handle: CreatorHandle) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let session = ctx.session(&source, handle)?;
    let board = session.challenge_board()?;
    let track = session.education_track()?;
    let response = LearningResponse::new(session.viewer(), &board, &track);

    if ctx.json_mode {
        print_json(&response);
        return Ok(());
    }

    let challenge = &response.challenge;
    println!("Learning Hub for {}", session.viewer());
    println!("==============================");
    println!();
    println!(
        "Challenge: {} / {} days completed",
        challenge.completed_days, challenge.total_days
    );
    match challenge.next_open_day {
        Some(day) => println!("Next Day:  {}", day),
        None => println!("Challenge complete"),
    }

    let education = &response.education;
    println!();
    println!(
        "Education: {} / {} quizzes passed",
        education.passed_videos, education.total_videos
    );
    for video in &education.videos {
        let state = if video.quiz_passed {
            "passed"
        } else if video.quiz_open {
            "quiz open"
        } else if video.unlocked {
            "unlocked"
        } else {
            "locked"
        };
        println!("  {:>2}. {} [{}]", video.number, video.title, state);
        if ctx.verbose {
            println!(
                "      watched {}%, {} attempts, duration {}",
                video.watched_percentage, video.quiz_attempts, video.duration
            );
        }
    }

    Ok(())
}

/// Grade a quiz attempt. Nothing is stored.
pub fn cmd_quiz(
    ctx: &CommandContext,
    handle: CreatorHandle,
    video: u32,
    answers: &[usize],
    watched: Option<u8>,
) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let session = ctx.session(&source, handle)?;
    let outcome = session.grade_quiz(video, answers, watched)?;

    if ctx.json_mode {
        print_json(&QuizResponse {
            handle: session.viewer().to_string(),
            outcome,
        });
        return Ok(());
    }

    println!("Quiz for video {}", outcome.video_number);
    println!("==============================");
    println!(
        "Score: {} / {} ({}%)",
        outcome.correct, outcome.total, outcome.score_percent
    );
    println!("Result: {}", if outcome.passed { "PASSED" } else { "FAILED" });
    println!("Attempts: {}", outcome.progress.quiz_attempts);
    if let Some(next) = &outcome.unlocked_next {
        println!("Unlocked video {}", next.video_number);
    }

    Ok(())
}

// =============================================================================
// CALC COMMAND
// =============================================================================

/// Compute progress from raw numbers; no snapshot needed.
///
/// Inputs follow the stored-row rules: a missing or negative total is zero.
pub fn cmd_calc(
    ctx: &CommandContext,
    total: Option<i64>,
    silver: Option<i64>,
    gold: Option<i64>,
    label: Option<String>,
) -> Result<(), TierlineError> {
    let mut metrics = CreatorMetrics::from_raw(total, silver, gold)?;
    if let Some(label) = label {
        metrics = metrics.label(label);
    }
    let report = ctx.config.assessor()?.assess(&metrics)?;

    if ctx.json_mode {
        print_json(&ProgressResponse::from_report(None, &report));
        return Ok(());
    }

    println!("Status:    {}", report.display_label());
    println!("Next Tier: {}", report.next_tier);
    println!("Progress:  {}%", report.percent_display());
    println!(
        "Remaining: {} diamonds to {}",
        report.remaining, report.next_threshold
    );

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate every active creator in the snapshot.
///
/// Fails when any creator's progress cannot be computed; duplicate handles
/// are reported as warnings.
pub fn cmd_check(ctx: &CommandContext) -> Result<(), TierlineError> {
    let source = ctx.source()?;
    let assessor = ctx.config.assessor()?;
    let creators = source.creators()?;

    let mut failures: Vec<(String, String)> = Vec::new();
    let mut handles: BTreeMap<String, usize> = BTreeMap::new();
    for creator in &creators {
        let result = creator.handle().and_then(|handle| {
            *handles.entry(handle.as_str().to_string()).or_insert(0) += 1;
            let metrics = CreatorMetrics::from_record(creator)?;
            Ok((handle, assessor.assess(&metrics)?))
        });
        match result {
            Ok((handle, report)) => {
                if ctx.verbose && !ctx.json_mode {
                    println!(
                        "  ok   {} {} {}%",
                        handle,
                        report.current_tier,
                        report.percent_display()
                    );
                }
            }
            Err(e) => {
                let label = format!("{} ({})", creator.creator_handle.trim(), creator.id);
                tracing::warn!("Creator {} failed validation: {}", label, e);
                failures.push((label, e.to_string()));
            }
        }
    }

    let duplicates: Vec<&str> = handles
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(handle, _)| handle.as_str())
        .collect();
    for handle in &duplicates {
        tracing::warn!("Handle @{} is shared by more than one active creator", handle);
    }

    if ctx.json_mode {
        let output = serde_json::json!({
            "snapshot": source.path().to_string_lossy(),
            "checked": creators.len(),
            "failed": failures.len(),
            "failures": failures
                .iter()
                .map(|(handle, error)| serde_json::json!({ "handle": handle, "error": error }))
                .collect::<Vec<_>>(),
            "duplicate_handles": duplicates,
        });
        print_json(&output);
    } else {
        println!("Tierline Snapshot Check");
        println!("=======================");
        println!("Snapshot:  {}", source.path().display());
        println!("Checked:   {} active creators", creators.len());
        println!("Failed:    {}", failures.len());
        for (handle, error) in &failures {
            println!("  FAIL {}: {}", handle, error);
        }
        if !duplicates.is_empty() {
            println!("Duplicate handles: {}", duplicates.join(", "));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(TierlineError::CheckFailed {
            failed: failures.len(),
            checked: creators.len(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
