//! Progress store - SQLite-backed local persistence
//!
//! Durable replacement for the original client's browser storage: current
//! week, user settings, the append-only completed-workout key list, the
//! last-workout snapshot, the setup flag and the pending-sync queue. The
//! store is an explicit object passed to whoever needs it; state is loaded
//! on open and every mutation is flushed immediately.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::catalog::{DayType, TOTAL_WEEKS, WORKOUTS_PER_WEEK};
use crate::models::{MAX_WEEK, NewSessionRecord, SyncPayload, UserSettings};
use crate::session::WorkoutSummary;

const STATE_CURRENT_WEEK: &str = "current-week";
const STATE_SETTINGS: &str = "settings";
const STATE_LAST_WORKOUT: &str = "last-workout";
const STATE_LAST_WORKOUT_DATE: &str = "last-workout-date";
const STATE_SETUP_COMPLETE: &str = "setup-complete";

/// Completion count for the current program week.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyProgress {
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Local persistence wrapper.
pub struct ProgressStore {
    conn: Connection,
    user_id: String,
}

impl ProgressStore {
    /// Open or create the store at `path`.
    pub fn open(path: &str, user_id: &str) -> Result<Self> {
        Self::from_connection(Connection::open(path)?, user_id)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory(user_id: &str) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, user_id)
    }

    fn from_connection(conn: Connection, user_id: &str) -> Result<Self> {
        let store = Self {
            conn,
            user_id: user_id.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS completions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                completion_key TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                summary TEXT NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS pending_sync (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payload TEXT NOT NULL,
                queued_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn get_state(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_state(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn clear_state(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM app_state WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // --- Program week ---

    /// Current program week. Defaults to 1 when nothing is stored.
    pub fn current_week(&self) -> Result<u32> {
        Ok(self
            .get_state(STATE_CURRENT_WEEK)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(1))
    }

    /// Wholesale overwrite of the current week, clamped to `[1, MAX_WEEK]`.
    /// The settings surface allows stepping past the default 7-week program.
    pub fn set_week(&self, week: u32) -> Result<u32> {
        let week = week.clamp(1, MAX_WEEK);
        self.set_state(STATE_CURRENT_WEEK, &week.to_string())?;
        debug!(week, "current week updated");
        Ok(week)
    }

    // --- Settings ---

    /// Stored settings, or first-load defaults.
    pub fn settings(&self) -> Result<UserSettings> {
        match self.get_state(STATE_SETTINGS)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(UserSettings::default_for(&self.user_id)),
        }
    }

    /// Wholesale overwrite, flushed immediately.
    pub fn update_settings(&self, settings: &UserSettings) -> Result<()> {
        self.set_state(STATE_SETTINGS, &serde_json::to_string(settings)?)?;
        debug!("settings updated");
        Ok(())
    }

    pub fn mark_setup_complete(&self) -> Result<()> {
        self.set_state(STATE_SETUP_COMPLETE, "true")
    }

    pub fn is_setup_complete(&self) -> Result<bool> {
        Ok(self.get_state(STATE_SETUP_COMPLETE)?.as_deref() == Some("true"))
    }

    // --- Completion log ---

    /// Append-only completion key list, oldest first.
    pub fn completion_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT completion_key FROM completions ORDER BY id")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    pub fn total_workouts(&self) -> Result<u32> {
        let count: u32 =
            self.conn
                .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn last_workout(&self) -> Result<Option<WorkoutSummary>> {
        match self.get_state(STATE_LAST_WORKOUT)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Record a finished workout: append the completion key, refresh the
    /// last-workout snapshot and queue the session for sync.
    pub fn record_completion(&self, summary: &WorkoutSummary) -> Result<String> {
        let key = summary.completion_key();
        let date = summary.completed_at.with_timezone(&Local).date_naive();
        self.conn.execute(
            "INSERT INTO completions (completion_key, recorded_at, summary) VALUES (?1, ?2, ?3)",
            params![
                key,
                summary.completed_at.to_rfc3339(),
                serde_json::to_string(summary)?,
            ],
        )?;
        self.set_state(STATE_LAST_WORKOUT, &serde_json::to_string(summary)?)?;
        self.set_state(STATE_LAST_WORKOUT_DATE, &date.to_string())?;
        self.queue_pending(&sync_payload_for(summary))?;
        info!(%key, duration = summary.duration, "workout recorded");
        Ok(key)
    }

    // --- Derived progress metrics ---

    /// Completed / 3 for the current week, with a rounded percentage.
    pub fn weekly_progress(&self) -> Result<WeeklyProgress> {
        let week = self.current_week()?;
        let prefix = format!("{week}-");
        let completed = self
            .completion_keys()?
            .iter()
            .filter(|k| k.starts_with(&prefix))
            .count() as u32;
        Ok(WeeklyProgress {
            completed,
            total: WORKOUTS_PER_WEEK,
            percentage: ((completed as f64 / WORKOUTS_PER_WEEK as f64) * 100.0).round() as u32,
        })
    }

    /// True iff any completion key starts with `"{week}-{day}"`.
    /// `week = None` means the current week.
    pub fn is_completed(&self, day: DayType, week: Option<u32>) -> Result<bool> {
        let week = match week {
            Some(w) => w,
            None => self.current_week()?,
        };
        let prefix = format!("{week}-{day}");
        Ok(self.completion_keys()?.iter().any(|k| k.starts_with(&prefix)))
    }

    /// Consecutive-workout-day streak ending at or near today.
    ///
    /// Distinct completion dates are walked newest-first: day-adjacent dates
    /// extend the streak and a single 2-day gap (one rest day) is tolerated
    /// without breaking it. A stale newest date (more than 1 day old) or any
    /// larger gap ends the streak. The rest-day tolerance is a deliberate
    /// policy, not an off-by-one.
    pub fn streak(&self) -> Result<u32> {
        let dates = self.completion_dates()?;
        Ok(streak_from_dates(&dates, Local::now().date_naive()))
    }

    /// Distinct workout dates parsed from completion keys, newest first.
    fn completion_dates(&self) -> Result<Vec<NaiveDate>> {
        let distinct: BTreeSet<NaiveDate> = self
            .completion_keys()?
            .iter()
            .filter_map(|key| key.splitn(3, '-').nth(2)?.parse().ok())
            .collect();
        Ok(distinct.into_iter().rev().collect())
    }

    /// Advance the program week once the weekly quota is met and at least a
    /// day has passed since the last workout. Returns whether progression
    /// happened. Invoked by callers after a completion, never by polling.
    pub fn auto_progress(&self) -> Result<bool> {
        if !self.settings()?.auto_progression {
            return Ok(false);
        }
        let week = self.current_week()?;
        if self.weekly_progress()?.completed < WORKOUTS_PER_WEEK || week >= TOTAL_WEEKS {
            return Ok(false);
        }
        let last = self
            .get_state(STATE_LAST_WORKOUT_DATE)?
            .and_then(|v| v.parse::<NaiveDate>().ok());
        let Some(last) = last else {
            return Ok(false);
        };
        if (Local::now().date_naive() - last).num_days() < 1 {
            return Ok(false);
        }
        self.set_week(week + 1)?;
        info!(from = week, to = week + 1, "auto-progressed to next week");
        Ok(true)
    }

    // --- Reset / export ---

    /// Clear the completion log and snapshot, week back to 1.
    /// Settings survive a reset.
    pub fn reset_progress(&self) -> Result<()> {
        self.conn.execute("DELETE FROM completions", [])?;
        self.clear_state(STATE_LAST_WORKOUT)?;
        self.clear_state(STATE_LAST_WORKOUT_DATE)?;
        self.set_week(1)?;
        info!("progress reset");
        Ok(())
    }

    /// JSON bundle of everything the user owns, for backup.
    pub fn export_data(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "currentWeek": self.current_week()?,
            "settings": self.settings()?,
            "completedWorkouts": self.completion_keys()?,
            "lastWorkout": self.last_workout()?,
            "exportedAt": chrono::Utc::now().to_rfc3339(),
        }))
    }

    // --- Pending sync queue ---

    pub fn queue_pending(&self, payload: &SyncPayload) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        self.conn.execute(
            "INSERT INTO pending_sync (payload, queued_at) VALUES (?1, ?2)",
            params![
                serde_json::to_string(payload)?,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Drain the queue into one merged payload. On sync failure the caller
    /// requeues it verbatim - no backoff, no deduplication.
    pub fn take_pending(&self) -> Result<Option<SyncPayload>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM pending_sync ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        if rows.is_empty() {
            return Ok(None);
        }

        let mut merged = SyncPayload::default();
        for json in &rows {
            let payload: SyncPayload = serde_json::from_str(json)?;
            merged.sessions.extend(payload.sessions);
            merged.completions.extend(payload.completions);
        }
        self.conn.execute("DELETE FROM pending_sync", [])?;
        Ok(Some(merged))
    }

    pub fn pending_count(&self) -> Result<u32> {
        let count: u32 =
            self.conn
                .query_row("SELECT COUNT(*) FROM pending_sync", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Build the offline sync payload for one finished workout, addressed at the
/// seeded default program and day records.
fn sync_payload_for(summary: &WorkoutSummary) -> SyncPayload {
    let day = match summary.day_type {
        DayType::A => "day-a",
        DayType::B => "day-b",
        DayType::C => "day-c",
    };
    SyncPayload {
        sessions: vec![NewSessionRecord {
            program_id: "default-program".to_string(),
            training_day_id: day.to_string(),
            week_number: summary.week,
            start_time: summary.completed_at
                - chrono::Duration::seconds(summary.duration as i64),
            total_exercises: summary.total_exercises as u32,
            end_time: Some(summary.completed_at),
            completed: Some(true),
            exercises_completed: Some(summary.exercises_completed as u32),
        }],
        completions: Vec::new(),
    }
}

/// Streak walk over distinct dates sorted newest-first.
fn streak_from_dates(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(newest) = dates.first() else {
        return 0;
    };
    if (today - *newest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut rest_day_used = false;
    for pair in dates.windows(2) {
        let gap = (pair[0] - pair[1]).num_days();
        if gap <= 1 {
            streak += 1;
        } else if gap == 2 && !rest_day_used {
            rest_day_used = true;
        } else {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use chrono::{Duration, Utc};

    fn summary(day: DayType, week: u32, days_ago: i64) -> WorkoutSummary {
        WorkoutSummary {
            duration: 1800,
            exercises_completed: catalog::workout_for_day(day).unwrap().total_exercises(),
            total_exercises: catalog::workout_for_day(day).unwrap().total_exercises(),
            calories_burned: 240,
            day_type: day,
            week,
            completed_at: Utc::now() - Duration::days(days_ago),
        }
    }

    fn store() -> ProgressStore {
        ProgressStore::open_in_memory("default-user").unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let store = store();
        assert_eq!(store.current_week().unwrap(), 1);
        assert_eq!(store.total_workouts().unwrap(), 0);
        assert!(store.last_workout().unwrap().is_none());
        assert!(!store.is_setup_complete().unwrap());
        assert_eq!(store.settings().unwrap().goal, "general_fitness");
        assert_eq!(store.streak().unwrap(), 0);
    }

    #[test]
    fn test_set_week_clamps() {
        let store = store();
        assert_eq!(store.set_week(5).unwrap(), 5);
        assert_eq!(store.current_week().unwrap(), 5);
        assert_eq!(store.set_week(0).unwrap(), 1);
        assert_eq!(store.set_week(99).unwrap(), MAX_WEEK);
    }

    #[test]
    fn test_weekly_progress_two_of_three() {
        let store = store();
        store.set_week(2).unwrap();
        store.record_completion(&summary(DayType::A, 2, 0)).unwrap();
        store.record_completion(&summary(DayType::B, 2, 0)).unwrap();

        let progress = store.weekly_progress().unwrap();
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percentage, 67);
    }

    #[test]
    fn test_weekly_progress_ignores_other_weeks() {
        let store = store();
        store.record_completion(&summary(DayType::A, 2, 0)).unwrap();
        // current week is 1, the week-2 record must not count
        assert_eq!(store.weekly_progress().unwrap().completed, 0);
    }

    #[test]
    fn test_week_prefix_does_not_match_week_twelve() {
        let store = store();
        store.record_completion(&summary(DayType::A, 12, 0)).unwrap();
        assert_eq!(store.weekly_progress().unwrap().completed, 0);
        assert!(!store.is_completed(DayType::A, Some(1)).unwrap());
        assert!(store.is_completed(DayType::A, Some(12)).unwrap());
    }

    #[test]
    fn test_is_completed_per_week_and_day() {
        let store = store();
        store.record_completion(&summary(DayType::B, 3, 0)).unwrap();

        assert!(store.is_completed(DayType::B, Some(3)).unwrap());
        assert!(!store.is_completed(DayType::B, Some(4)).unwrap());
        assert!(!store.is_completed(DayType::A, Some(3)).unwrap());

        // week defaults to the current week
        store.set_week(3).unwrap();
        assert!(store.is_completed(DayType::B, None).unwrap());
    }

    #[test]
    fn test_streak_today_yesterday_and_rest_gap() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 3)).unwrap();
        store.record_completion(&summary(DayType::B, 1, 1)).unwrap();
        store.record_completion(&summary(DayType::C, 1, 0)).unwrap();
        // today + yesterday chain, then a 2-day rest gap: streak of 2
        assert_eq!(store.streak().unwrap(), 2);
    }

    #[test]
    fn test_streak_zero_when_stale() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 2)).unwrap();
        assert_eq!(store.streak().unwrap(), 0);
    }

    #[test]
    fn test_streak_walk() {
        let today = Local::now().date_naive();
        let d = |n: i64| today - Duration::days(n);

        assert_eq!(streak_from_dates(&[], today), 0);
        assert_eq!(streak_from_dates(&[d(0)], today), 1);
        assert_eq!(streak_from_dates(&[d(0), d(1), d(2)], today), 3);
        assert_eq!(streak_from_dates(&[d(0), d(1), d(3)], today), 2);
        // second rest gap breaks the walk
        assert_eq!(streak_from_dates(&[d(0), d(2), d(4), d(5)], today), 1);
        // larger gap always breaks
        assert_eq!(streak_from_dates(&[d(0), d(1), d(5)], today), 2);
    }

    #[test]
    fn test_streak_collapses_same_day_completions() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 0)).unwrap();
        store.record_completion(&summary(DayType::B, 1, 0)).unwrap();
        assert_eq!(store.streak().unwrap(), 1);
        // both records still appended
        assert_eq!(store.total_workouts().unwrap(), 2);
    }

    #[test]
    fn test_auto_progress_after_full_week() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 1)).unwrap();
        store.record_completion(&summary(DayType::B, 1, 1)).unwrap();
        store.record_completion(&summary(DayType::C, 1, 1)).unwrap();

        assert!(store.auto_progress().unwrap());
        assert_eq!(store.current_week().unwrap(), 2);

        // nothing completed in week 2 yet
        assert!(!store.auto_progress().unwrap());
    }

    #[test]
    fn test_auto_progress_requires_rest_day() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 0)).unwrap();
        store.record_completion(&summary(DayType::B, 1, 0)).unwrap();
        store.record_completion(&summary(DayType::C, 1, 0)).unwrap();
        // last workout was today - no progression yet
        assert!(!store.auto_progress().unwrap());
        assert_eq!(store.current_week().unwrap(), 1);
    }

    #[test]
    fn test_auto_progress_respects_setting() {
        let store = store();
        let mut settings = store.settings().unwrap();
        settings.auto_progression = false;
        store.update_settings(&settings).unwrap();

        store.record_completion(&summary(DayType::A, 1, 1)).unwrap();
        store.record_completion(&summary(DayType::B, 1, 1)).unwrap();
        store.record_completion(&summary(DayType::C, 1, 1)).unwrap();
        assert!(!store.auto_progress().unwrap());
    }

    #[test]
    fn test_auto_progress_stops_at_final_week() {
        let store = store();
        store.set_week(TOTAL_WEEKS).unwrap();
        store
            .record_completion(&summary(DayType::A, TOTAL_WEEKS, 1))
            .unwrap();
        store
            .record_completion(&summary(DayType::B, TOTAL_WEEKS, 1))
            .unwrap();
        store
            .record_completion(&summary(DayType::C, TOTAL_WEEKS, 1))
            .unwrap();
        assert!(!store.auto_progress().unwrap());
        assert_eq!(store.current_week().unwrap(), TOTAL_WEEKS);
    }

    #[test]
    fn test_record_completion_queues_sync_payload() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 0)).unwrap();
        assert_eq!(store.pending_count().unwrap(), 1);

        let payload = store.take_pending().unwrap().unwrap();
        assert_eq!(payload.sessions.len(), 1);
        let session = &payload.sessions[0];
        assert_eq!(session.training_day_id, "day-a");
        assert_eq!(session.completed, Some(true));
        assert_eq!(session.week_number, 1);

        // queue drained
        assert!(store.take_pending().unwrap().is_none());
    }

    #[test]
    fn test_requeued_payload_survives() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 0)).unwrap();
        store.record_completion(&summary(DayType::B, 1, 0)).unwrap();

        let payload = store.take_pending().unwrap().unwrap();
        assert_eq!(payload.sessions.len(), 2);

        // simulated sync failure: requeue verbatim
        store.queue_pending(&payload).unwrap();
        let again = store.take_pending().unwrap().unwrap();
        assert_eq!(again.sessions.len(), 2);
    }

    #[test]
    fn test_reset_clears_progress_keeps_settings() {
        let store = store();
        let mut settings = store.settings().unwrap();
        settings.goal = "strength".to_string();
        store.update_settings(&settings).unwrap();
        store.set_week(4).unwrap();
        store.record_completion(&summary(DayType::A, 4, 0)).unwrap();
        store.mark_setup_complete().unwrap();

        store.reset_progress().unwrap();
        assert_eq!(store.current_week().unwrap(), 1);
        assert_eq!(store.total_workouts().unwrap(), 0);
        assert!(store.last_workout().unwrap().is_none());
        assert_eq!(store.settings().unwrap().goal, "strength");
        assert!(store.is_setup_complete().unwrap());
    }

    #[test]
    fn test_export_bundle() {
        let store = store();
        store.record_completion(&summary(DayType::A, 1, 0)).unwrap();
        let bundle = store.export_data().unwrap();
        assert_eq!(bundle["currentWeek"], 1);
        assert_eq!(bundle["completedWorkouts"].as_array().unwrap().len(), 1);
        assert!(bundle["exportedAt"].is_string());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitflow.db");
        let path = path.to_str().unwrap();

        {
            let store = ProgressStore::open(path, "default-user").unwrap();
            store.set_week(3).unwrap();
            store.record_completion(&summary(DayType::A, 3, 0)).unwrap();
        }

        let store = ProgressStore::open(path, "default-user").unwrap();
        assert_eq!(store.current_week().unwrap(), 3);
        assert_eq!(store.total_workouts().unwrap(), 1);
        assert!(store.is_completed(DayType::A, Some(3)).unwrap());
    }
}
