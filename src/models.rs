//! Wire and persisted entity types for the CRUD API
//!
//! Field names serialize in camelCase to stay compatible with the JSON the
//! mobile client already produces. Create/update payloads are validated at
//! the persistence boundary and rejected with a typed failure instead of
//! propagating loose objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Week ceiling the settings surface allows, above the default 7-week program.
pub const MAX_WEEK: u32 = 12;

/// Malformed create/update payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgram {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_weeks: u32,
    pub current_week: u32,
    pub start_date: DateTime<Utc>,
    pub auto_progression: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrainingProgram {
    pub user_id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub total_weeks: Option<u32>,
    #[serde(default)]
    pub current_week: Option<u32>,
    #[serde(default)]
    pub auto_progression: Option<bool>,
}

impl NewTrainingProgram {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("userId", &self.user_id)?;
        require("name", &self.name)?;
        let total = self.total_weeks.unwrap_or(7);
        if total == 0 || total > MAX_WEEK {
            return Err(ValidationError(format!(
                "totalWeeks must be within 1..={MAX_WEEK}"
            )));
        }
        let current = self.current_week.unwrap_or(1);
        if current == 0 || current > total {
            return Err(ValidationError(
                "currentWeek must be within 1..=totalWeeks".into(),
            ));
        }
        Ok(())
    }
}

/// Partial program update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total_weeks: Option<u32>,
    #[serde(default)]
    pub current_week: Option<u32>,
    #[serde(default)]
    pub auto_progression: Option<bool>,
}

/// Server-side training-day record (seeded, read-only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDayRecord {
    pub id: String,
    pub program_id: String,
    pub day_type: String,
    pub name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub program_id: String,
    pub training_day_id: String,
    pub week_number: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed: bool,
    pub exercises_completed: u32,
    pub total_exercises: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionRecord {
    pub program_id: String,
    pub training_day_id: String,
    pub week_number: u32,
    pub start_time: DateTime<Utc>,
    pub total_exercises: u32,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub exercises_completed: Option<u32>,
}

impl NewSessionRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("programId", &self.program_id)?;
        require("trainingDayId", &self.training_day_id)?;
        if self.week_number == 0 {
            return Err(ValidationError("weekNumber must be at least 1".into()));
        }
        Ok(())
    }
}

/// Partial session update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub exercises_completed: Option<u32>,
    #[serde(default)]
    pub week_number: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseCompletion {
    pub id: String,
    pub session_id: String,
    pub exercise_id: String,
    pub completed: bool,
    pub sets: Option<u32>,
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExerciseCompletion {
    pub session_id: String,
    pub exercise_id: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExerciseCompletion {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("sessionId", &self.session_id)?;
        require("exerciseId", &self.exercise_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub id: String,
    pub user_id: String,
    pub goal: String,
    pub experience_level: String,
    pub equipment: Vec<String>,
    pub auto_progression: bool,
    pub workout_reminders: bool,
    pub rest_day_alerts: bool,
}

impl UserSettings {
    /// First-load defaults.
    pub fn default_for(user_id: &str) -> Self {
        Self {
            id: user_id.to_string(),
            user_id: user_id.to_string(),
            goal: "general_fitness".to_string(),
            experience_level: "beginner".to_string(),
            equipment: vec!["bodyweight".to_string(), "dumbbells".to_string()],
            auto_progression: true,
            workout_reminders: true,
            rest_day_alerts: false,
        }
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(goal) = &patch.goal {
            self.goal = goal.clone();
        }
        if let Some(level) = &patch.experience_level {
            self.experience_level = level.clone();
        }
        if let Some(equipment) = &patch.equipment {
            self.equipment = equipment.clone();
        }
        if let Some(v) = patch.auto_progression {
            self.auto_progression = v;
        }
        if let Some(v) = patch.workout_reminders {
            self.workout_reminders = v;
        }
        if let Some(v) = patch.rest_day_alerts {
            self.rest_day_alerts = v;
        }
    }
}

/// Partial settings update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub equipment: Option<Vec<String>>,
    #[serde(default)]
    pub auto_progression: Option<bool>,
    #[serde(default)]
    pub workout_reminders: Option<bool>,
    #[serde(default)]
    pub rest_day_alerts: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_workouts: u32,
    /// Seconds across all completed sessions.
    pub total_duration: u64,
    pub streak: u32,
    pub average_duration: f64,
}

/// Offline data pushed by the client in one shot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    #[serde(default)]
    pub sessions: Vec<NewSessionRecord>,
    #[serde(default)]
    pub completions: Vec<NewExerciseCompletion>,
}

impl SyncPayload {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.completions.is_empty()
    }
}
