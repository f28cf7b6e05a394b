//! Repository abstraction for the CRUD service
//!
//! The [`Storage`] trait mirrors the operation table of the HTTP API so a
//! real database can be swapped in behind the same interface. [`MemStorage`]
//! is the in-memory backing used for tests and local serving, seeded with
//! the default program and its three training days.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::ApiError;
use crate::catalog;
use crate::models::{
    ExerciseCompletion, NewExerciseCompletion, NewSessionRecord, NewTrainingProgram,
    SessionPatch, SessionRecord, SettingsPatch, SyncPayload, TrainingDayRecord,
    TrainingProgram, UserSettings, UserStats,
};

/// Persistence contract behind the HTTP API.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn all_programs(&self) -> Result<Vec<TrainingProgram>, ApiError>;
    async fn create_program(&self, new: NewTrainingProgram) -> Result<TrainingProgram, ApiError>;
    async fn create_session(&self, new: NewSessionRecord) -> Result<SessionRecord, ApiError>;
    async fn update_session(&self, id: &str, patch: SessionPatch)
    -> Result<SessionRecord, ApiError>;
    async fn create_completion(
        &self,
        new: NewExerciseCompletion,
    ) -> Result<ExerciseCompletion, ApiError>;
    async fn settings(&self, user_id: &str) -> Result<UserSettings, ApiError>;
    async fn update_settings(
        &self,
        user_id: &str,
        patch: SettingsPatch,
    ) -> Result<UserSettings, ApiError>;
    async fn stats(&self, user_id: &str) -> Result<UserStats, ApiError>;
    async fn sync_offline(&self, payload: SyncPayload) -> Result<(), ApiError>;
}

#[derive(Default)]
struct Inner {
    programs: HashMap<String, TrainingProgram>,
    training_days: HashMap<String, TrainingDayRecord>,
    sessions: HashMap<String, SessionRecord>,
    completions: HashMap<String, ExerciseCompletion>,
    settings: HashMap<String, UserSettings>,
}

/// In-memory repository keyed by id.
pub struct MemStorage {
    inner: RwLock<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        let mut inner = Inner::default();
        seed_default_data(&mut inner);
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Default program plus its A/B/C day records, mirroring the catalog.
fn seed_default_data(inner: &mut Inner) {
    let program = TrainingProgram {
        id: "default-program".to_string(),
        user_id: "default-user".to_string(),
        name: "Progressive Training Program".to_string(),
        total_weeks: catalog::TOTAL_WEEKS,
        current_week: 1,
        start_date: Utc::now(),
        auto_progression: true,
        created_at: Utc::now(),
    };
    inner.programs.insert(program.id.clone(), program);

    for day in catalog::training_days() {
        let record = TrainingDayRecord {
            id: format!("day-{}", day.day_type.to_string().to_lowercase()),
            program_id: "default-program".to_string(),
            day_type: day.day_type.to_string(),
            name: day.name.to_string(),
            description: Some(day.focus.to_string()),
            estimated_duration: Some(day.estimated_minutes),
        };
        inner.training_days.insert(record.id.clone(), record);
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn session_duration_secs(session: &SessionRecord) -> u64 {
    match session.end_time {
        Some(end) => (end - session.start_time).num_seconds().max(0) as u64,
        None => 0,
    }
}

/// Consecutive-day streak over completed sessions, newest first.
/// Gaps of up to two days count as rest days and keep the chain alive.
fn streak_for(sessions: &[&SessionRecord]) -> u32 {
    let mut ended: Vec<_> = sessions.iter().filter(|s| s.end_time.is_some()).collect();
    if ended.is_empty() {
        return 0;
    }
    ended.sort_by_key(|s| std::cmp::Reverse(s.end_time));

    let mut streak = 1;
    for pair in ended.windows(2) {
        let previous = pair[0].end_time.unwrap_or_default();
        let current = pair[1].end_time.unwrap_or_default();
        let gap = (previous.date_naive() - current.date_naive()).num_days();
        if gap <= 2 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

#[async_trait]
impl Storage for MemStorage {
    async fn all_programs(&self) -> Result<Vec<TrainingProgram>, ApiError> {
        let inner = self.inner.read().await;
        Ok(inner.programs.values().cloned().collect())
    }

    async fn create_program(&self, new: NewTrainingProgram) -> Result<TrainingProgram, ApiError> {
        new.validate()?;
        let program = TrainingProgram {
            id: new_id(),
            user_id: new.user_id,
            name: new.name,
            total_weeks: new.total_weeks.unwrap_or(catalog::TOTAL_WEEKS),
            current_week: new.current_week.unwrap_or(1),
            start_date: new.start_date,
            auto_progression: new.auto_progression.unwrap_or(true),
            created_at: Utc::now(),
        };
        let mut inner = self.inner.write().await;
        inner.programs.insert(program.id.clone(), program.clone());
        Ok(program)
    }

    async fn create_session(&self, new: NewSessionRecord) -> Result<SessionRecord, ApiError> {
        new.validate()?;
        let session = SessionRecord {
            id: new_id(),
            program_id: new.program_id,
            training_day_id: new.training_day_id,
            week_number: new.week_number,
            start_time: new.start_time,
            end_time: new.end_time,
            completed: new.completed.unwrap_or(false),
            exercises_completed: new.exercises_completed.unwrap_or(0),
            total_exercises: new.total_exercises,
        };
        let mut inner = self.inner.write().await;
        inner.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn update_session(
        &self,
        id: &str,
        patch: SessionPatch,
    ) -> Result<SessionRecord, ApiError> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;
        if let Some(end_time) = patch.end_time {
            session.end_time = Some(end_time);
        }
        if let Some(completed) = patch.completed {
            session.completed = completed;
        }
        if let Some(count) = patch.exercises_completed {
            session.exercises_completed = count;
        }
        if let Some(week) = patch.week_number {
            session.week_number = week;
        }
        Ok(session.clone())
    }

    async fn create_completion(
        &self,
        new: NewExerciseCompletion,
    ) -> Result<ExerciseCompletion, ApiError> {
        new.validate()?;
        let completion = ExerciseCompletion {
            id: new_id(),
            session_id: new.session_id,
            exercise_id: new.exercise_id,
            completed: new.completed.unwrap_or(false),
            sets: new.sets,
            reps: new.reps,
            weight: new.weight,
            notes: new.notes,
        };
        let mut inner = self.inner.write().await;
        inner
            .completions
            .insert(completion.id.clone(), completion.clone());
        Ok(completion)
    }

    async fn settings(&self, user_id: &str) -> Result<UserSettings, ApiError> {
        let inner = self.inner.read().await;
        Ok(inner
            .settings
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserSettings::default_for(user_id)))
    }

    async fn update_settings(
        &self,
        user_id: &str,
        patch: SettingsPatch,
    ) -> Result<UserSettings, ApiError> {
        let mut inner = self.inner.write().await;
        let mut settings = inner
            .settings
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserSettings::default_for(user_id));
        settings.apply(&patch);
        inner
            .settings
            .insert(user_id.to_string(), settings.clone());
        Ok(settings)
    }

    async fn stats(&self, user_id: &str) -> Result<UserStats, ApiError> {
        let inner = self.inner.read().await;
        let user_sessions: Vec<&SessionRecord> = inner
            .sessions
            .values()
            .filter(|s| {
                inner
                    .programs
                    .get(&s.program_id)
                    .is_some_and(|p| p.user_id == user_id)
            })
            .collect();
        let completed: Vec<&SessionRecord> = user_sessions
            .iter()
            .filter(|s| s.completed)
            .copied()
            .collect();

        let total_workouts = completed.len() as u32;
        let total_duration: u64 = completed.iter().map(|s| session_duration_secs(s)).sum();
        let average_duration = if total_workouts > 0 {
            total_duration as f64 / f64::from(total_workouts)
        } else {
            0.0
        };

        Ok(UserStats {
            total_workouts,
            total_duration,
            streak: streak_for(&completed),
            average_duration,
        })
    }

    /// Ingest offline data. The whole payload is validated before anything
    /// is inserted, so a bad batch never corrupts stored state.
    async fn sync_offline(&self, payload: SyncPayload) -> Result<(), ApiError> {
        for session in &payload.sessions {
            session.validate()?;
        }
        for completion in &payload.completions {
            completion.validate()?;
        }
        for session in payload.sessions {
            self.create_session(session).await?;
        }
        for completion in payload.completions {
            self.create_completion(completion).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_session(week: u32) -> NewSessionRecord {
        NewSessionRecord {
            program_id: "default-program".to_string(),
            training_day_id: "day-a".to_string(),
            week_number: week,
            start_time: Utc::now(),
            total_exercises: 13,
            end_time: None,
            completed: None,
            exercises_completed: None,
        }
    }

    fn completed_session(days_ago: i64, duration_secs: i64) -> NewSessionRecord {
        let end = Utc::now() - Duration::days(days_ago);
        NewSessionRecord {
            end_time: Some(end),
            start_time: end - Duration::seconds(duration_secs),
            completed: Some(true),
            exercises_completed: Some(13),
            ..new_session(1)
        }
    }

    #[tokio::test]
    async fn test_seeded_default_program() {
        let storage = MemStorage::new();
        let programs = storage.all_programs().await.unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].id, "default-program");
        assert_eq!(programs[0].total_weeks, 7);
    }

    #[tokio::test]
    async fn test_create_program_assigns_id_and_defaults() {
        let storage = MemStorage::new();
        let program = storage
            .create_program(NewTrainingProgram {
                user_id: "u1".into(),
                name: "Custom Block".into(),
                start_date: Utc::now(),
                total_weeks: None,
                current_week: None,
                auto_progression: None,
            })
            .await
            .unwrap();
        assert!(!program.id.is_empty());
        assert_eq!(program.total_weeks, 7);
        assert_eq!(program.current_week, 1);
        assert!(program.auto_progression);
        assert_eq!(storage.all_programs().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_program_rejects_invalid() {
        let storage = MemStorage::new();
        let err = storage
            .create_program(NewTrainingProgram {
                user_id: "u1".into(),
                name: "".into(),
                start_date: Utc::now(),
                total_weeks: None,
                current_week: None,
                auto_progression: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        // rejected payload must not have touched stored state
        assert_eq!(storage.all_programs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_session_patches_fields() {
        let storage = MemStorage::new();
        let session = storage.create_session(new_session(2)).await.unwrap();
        assert!(!session.completed);

        let end = Utc::now();
        let updated = storage
            .update_session(
                &session.id,
                SessionPatch {
                    end_time: Some(end),
                    completed: Some(true),
                    exercises_completed: Some(13),
                    week_number: None,
                },
            )
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.end_time, Some(end));
        assert_eq!(updated.exercises_completed, 13);
        assert_eq!(updated.week_number, 2, "unpatched field untouched");
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_not_found() {
        let storage = MemStorage::new();
        let err = storage
            .update_session("missing", SessionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_settings_default_then_merge() {
        let storage = MemStorage::new();
        let settings = storage.settings("someone").await.unwrap();
        assert!(settings.workout_reminders);

        let updated = storage
            .update_settings(
                "someone",
                SettingsPatch {
                    rest_day_alerts: Some(true),
                    ..SettingsPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.rest_day_alerts);
        assert!(updated.workout_reminders);

        // persisted across reads
        assert!(storage.settings("someone").await.unwrap().rest_day_alerts);
    }

    #[tokio::test]
    async fn test_stats_totals_and_average() {
        let storage = MemStorage::new();
        storage
            .create_session(completed_session(0, 600))
            .await
            .unwrap();
        storage
            .create_session(completed_session(1, 1200))
            .await
            .unwrap();
        // incomplete session is ignored
        storage.create_session(new_session(1)).await.unwrap();

        let stats = storage.stats("default-user").await.unwrap();
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.total_duration, 1800);
        assert!((stats.average_duration - 900.0).abs() < f64::EPSILON);
        assert_eq!(stats.streak, 2);
    }

    #[tokio::test]
    async fn test_stats_streak_breaks_on_large_gap() {
        let storage = MemStorage::new();
        storage
            .create_session(completed_session(0, 600))
            .await
            .unwrap();
        storage
            .create_session(completed_session(5, 600))
            .await
            .unwrap();
        let stats = storage.stats("default-user").await.unwrap();
        assert_eq!(stats.streak, 1);
    }

    #[tokio::test]
    async fn test_stats_for_unknown_user_are_zero() {
        let storage = MemStorage::new();
        let stats = storage.stats("nobody").await.unwrap();
        assert_eq!(stats.total_workouts, 0);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.average_duration, 0.0);
    }

    #[tokio::test]
    async fn test_sync_ingests_sessions_and_completions() {
        let storage = MemStorage::new();
        let payload = SyncPayload {
            sessions: vec![completed_session(0, 600)],
            completions: vec![NewExerciseCompletion {
                session_id: "s1".into(),
                exercise_id: "pushups".into(),
                completed: Some(true),
                sets: Some(3),
                reps: Some("10".into()),
                weight: None,
                notes: None,
            }],
        };
        storage.sync_offline(payload).await.unwrap();
        let stats = storage.stats("default-user").await.unwrap();
        assert_eq!(stats.total_workouts, 1);
    }

    #[tokio::test]
    async fn test_sync_rejects_bad_batch_without_partial_writes() {
        let storage = MemStorage::new();
        let payload = SyncPayload {
            sessions: vec![completed_session(0, 600)],
            completions: vec![NewExerciseCompletion {
                session_id: "".into(),
                exercise_id: "pushups".into(),
                completed: None,
                sets: None,
                reps: None,
                weight: None,
                notes: None,
            }],
        };
        let err = storage.sync_offline(payload).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        // the valid session in the same batch was not inserted either
        let stats = storage.stats("default-user").await.unwrap();
        assert_eq!(stats.total_workouts, 0);
    }
}
