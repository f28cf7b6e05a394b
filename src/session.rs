//! Workout session state machine
//!
//! Drives one workout attempt through the three phases in order
//! (warm-up, main, cool-down), tracks pause state and finalizes into a
//! completion summary. Mirrors the phase/exercise progression of the
//! mobile client.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, DayType, Exercise, Phase, Workout};
use crate::timer::SessionTimer;

/// Fixed metabolic constant used for the calorie estimate.
pub const CALORIES_PER_MINUTE: u64 = 8;

/// Calorie estimate: floor(minutes × 8).
pub fn calories_for(duration_secs: u64) -> u32 {
    (duration_secs * CALORIES_PER_MINUTE / 60) as u32
}

/// Session lifecycle. `Completed` and `Empty` are terminal; `Empty` means
/// the catalog had no exercise data for the day (no timer, no record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress {
        phase_index: usize,
        exercise_index: usize,
        paused: bool,
    },
    Completed,
    Empty,
}

/// Finalized workout stats, persisted as the last-workout snapshot and
/// appended to the completion log.
///
/// `exercises_completed` is deliberately the total exercise count even when
/// the user skipped exercises; the original client records it that way and
/// this is preserved as a contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    /// Elapsed seconds.
    pub duration: u64,
    pub exercises_completed: usize,
    pub total_exercises: usize,
    pub calories_burned: u32,
    pub day_type: DayType,
    pub week: u32,
    pub completed_at: DateTime<Utc>,
}

impl WorkoutSummary {
    /// Membership key: `"{week}-{dayType}-{YYYY-MM-DD}"`, day granularity.
    /// Multiple completions of the same day/type/week collapse to one key.
    pub fn completion_key(&self) -> String {
        let date = self.completed_at.with_timezone(&Local).date_naive();
        format!("{}-{}-{}", self.week, self.day_type, date)
    }
}

/// One workout attempt over a catalog [`Workout`].
pub struct WorkoutSession {
    day_type: DayType,
    week: u32,
    workout: Option<Workout>,
    timer: SessionTimer,
    state: SessionState,
}

impl WorkoutSession {
    /// Create a session for a day, looking the workout up in the catalog.
    pub fn new(day_type: DayType, week: u32) -> Self {
        Self::with_workout(day_type, week, catalog::workout_for_day(day_type))
    }

    /// Create a session over an explicit workout (`None` = missing catalog
    /// data, which lands directly in the `Empty` state).
    pub fn with_workout(day_type: DayType, week: u32, workout: Option<Workout>) -> Self {
        let empty = workout
            .as_ref()
            .map(|w| w.total_exercises() == 0)
            .unwrap_or(true);
        Self {
            day_type,
            week,
            workout,
            timer: SessionTimer::new(),
            state: if empty {
                SessionState::Empty
            } else {
                SessionState::NotStarted
            },
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn day_type(&self) -> DayType {
        self.day_type
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, SessionState::InProgress { paused: true, .. })
    }

    /// Begin the workout at the first warm-up exercise and start the timer.
    pub fn start(&mut self) {
        if self.state == SessionState::NotStarted {
            self.state = SessionState::InProgress {
                phase_index: 0,
                exercise_index: 0,
                paused: false,
            };
            self.timer.start();
        }
    }

    /// Move to the next exercise ("complete set" or "skip"). Advancing past
    /// the last cool-down exercise completes the workout and returns the
    /// finalized summary.
    pub fn advance(&mut self) -> Option<WorkoutSummary> {
        let SessionState::InProgress {
            phase_index,
            exercise_index,
            paused,
        } = self.state
        else {
            return None;
        };
        let workout = self.workout.as_ref()?;

        if exercise_index + 1 < workout.phase_exercises(phase_index).len() {
            self.state = SessionState::InProgress {
                phase_index,
                exercise_index: exercise_index + 1,
                paused,
            };
            None
        } else if phase_index + 1 < Phase::all().len() {
            self.state = SessionState::InProgress {
                phase_index: phase_index + 1,
                exercise_index: 0,
                paused,
            };
            None
        } else {
            Some(self.complete())
        }
    }

    /// Move back one exercise. No-op at the very first warm-up exercise.
    pub fn retreat(&mut self) {
        let SessionState::InProgress {
            phase_index,
            exercise_index,
            paused,
        } = self.state
        else {
            return;
        };
        let Some(workout) = self.workout.as_ref() else {
            return;
        };

        if exercise_index > 0 {
            self.state = SessionState::InProgress {
                phase_index,
                exercise_index: exercise_index - 1,
                paused,
            };
        } else if phase_index > 0 {
            let prev = phase_index - 1;
            self.state = SessionState::InProgress {
                phase_index: prev,
                exercise_index: workout.phase_exercises(prev).len() - 1,
                paused,
            };
        }
    }

    /// Flip pause state; position is unchanged.
    pub fn toggle_pause(&mut self) {
        if let SessionState::InProgress {
            phase_index,
            exercise_index,
            paused,
        } = self.state
        {
            if paused {
                self.timer.start();
            } else {
                self.timer.pause();
            }
            self.state = SessionState::InProgress {
                phase_index,
                exercise_index,
                paused: !paused,
            };
        }
    }

    /// Navigate away: pause the timer and discard in-progress state.
    /// Nothing is recorded.
    pub fn abandon(&mut self) {
        self.timer.pause();
        if matches!(self.state, SessionState::InProgress { .. }) {
            self.state = SessionState::NotStarted;
        }
    }

    fn complete(&mut self) -> WorkoutSummary {
        self.timer.pause();
        self.state = SessionState::Completed;
        let total = self.total_exercises();
        let duration = self.timer.elapsed_secs();
        WorkoutSummary {
            duration,
            // Generous accounting: the full exercise count, skips included.
            exercises_completed: total,
            total_exercises: total,
            calories_burned: calories_for(duration),
            day_type: self.day_type,
            week: self.week,
            completed_at: Utc::now(),
        }
    }

    pub fn current_phase(&self) -> Option<Phase> {
        match self.state {
            SessionState::InProgress { phase_index, .. } => Some(Phase::all()[phase_index]),
            _ => None,
        }
    }

    pub fn current_exercise(&self) -> Option<&'static Exercise> {
        let SessionState::InProgress {
            phase_index,
            exercise_index,
            ..
        } = self.state
        else {
            return None;
        };
        self.workout
            .as_ref()?
            .phase_exercises(phase_index)
            .get(exercise_index)
    }

    /// Prescription for the current exercise at this session's week.
    pub fn current_formula(&self) -> Option<&'static str> {
        self.current_exercise()
            .map(|e| catalog::formula_for(e, self.week))
    }

    pub fn total_exercises(&self) -> usize {
        self.workout
            .as_ref()
            .map(|w| w.total_exercises())
            .unwrap_or(0)
    }

    /// Zero-based position across all phases.
    pub fn overall_index(&self) -> usize {
        let SessionState::InProgress {
            phase_index,
            exercise_index,
            ..
        } = self.state
        else {
            return 0;
        };
        let Some(workout) = self.workout.as_ref() else {
            return 0;
        };
        let before: usize = (0..phase_index)
            .map(|i| workout.phase_exercises(i).len())
            .sum();
        before + exercise_index
    }

    /// Overall progress, 0-100.
    pub fn progress_percent(&self) -> u32 {
        let total = self.total_exercises();
        if total == 0 {
            return 0;
        }
        (((self.overall_index() + 1) as f64 / total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> WorkoutSession {
        let mut s = WorkoutSession::new(DayType::A, 1);
        s.start();
        s
    }

    #[test]
    fn test_start_enters_first_warmup_exercise() {
        let s = session();
        assert_eq!(
            s.state(),
            SessionState::InProgress {
                phase_index: 0,
                exercise_index: 0,
                paused: false
            }
        );
        assert_eq!(s.current_phase(), Some(Phase::WarmUp));
        assert_eq!(s.overall_index(), 0);
    }

    #[test]
    fn test_advance_reaches_completed_in_exactly_total_calls() {
        let mut s = session();
        let total = s.total_exercises();

        for _ in 0..total - 1 {
            assert!(s.advance().is_none());
        }
        let summary = s.advance().expect("last advance completes the workout");
        assert_eq!(s.state(), SessionState::Completed);
        assert_eq!(summary.total_exercises, total);
        assert_eq!(summary.exercises_completed, total);
    }

    #[test]
    fn test_advance_crosses_phase_boundaries() {
        let mut s = session();
        let warm_up_len = catalog::WARM_UP_EXERCISES.len();
        for _ in 0..warm_up_len {
            s.advance();
        }
        assert_eq!(s.current_phase(), Some(Phase::Main));
        assert_eq!(s.overall_index(), warm_up_len);
    }

    #[test]
    fn test_retreat_reverses_each_advance() {
        let mut s = session();
        let total = s.total_exercises();

        let mut states = vec![s.state()];
        for _ in 0..total - 1 {
            s.advance();
            states.push(s.state());
        }
        for expected in states.iter().rev().skip(1) {
            s.retreat();
            assert_eq!(s.state(), *expected);
        }
    }

    #[test]
    fn test_retreat_at_first_exercise_is_noop() {
        let mut s = session();
        let before = s.state();
        s.retreat();
        assert_eq!(s.state(), before);
    }

    #[test]
    fn test_toggle_pause_keeps_position() {
        let mut s = session();
        s.advance();
        let index = s.overall_index();
        s.toggle_pause();
        assert!(s.is_paused());
        assert_eq!(s.overall_index(), index);
        s.toggle_pause();
        assert!(!s.is_paused());
        assert_eq!(s.overall_index(), index);
    }

    #[test]
    fn test_abandon_discards_in_progress_state() {
        let mut s = session();
        s.advance();
        s.abandon();
        assert_eq!(s.state(), SessionState::NotStarted);
    }

    #[test]
    fn test_empty_workout_is_terminal_empty_state() {
        let s = WorkoutSession::with_workout(DayType::B, 1, None);
        assert_eq!(s.state(), SessionState::Empty);

        let mut s = WorkoutSession::with_workout(DayType::B, 1, None);
        s.start();
        assert_eq!(s.state(), SessionState::Empty, "empty state cannot start");
        assert!(s.advance().is_none());
        assert_eq!(s.elapsed_secs(), 0);
    }

    #[test]
    fn test_calorie_estimate() {
        assert_eq!(calories_for(300), 40); // 5 min × 8 kcal
        assert_eq!(calories_for(0), 0);
        assert_eq!(calories_for(90), 12); // floor(1.5 × 8)
        assert_eq!(calories_for(59), 7); // floor(0.983 × 8)
    }

    #[test]
    fn test_completion_key_format() {
        let summary = WorkoutSummary {
            duration: 300,
            exercises_completed: 13,
            total_exercises: 13,
            calories_burned: 40,
            day_type: DayType::B,
            week: 3,
            completed_at: Utc::now(),
        };
        let date = Utc::now().with_timezone(&Local).date_naive();
        assert_eq!(summary.completion_key(), format!("3-B-{date}"));
        assert!(summary.completion_key().starts_with("3-B"));
    }

    #[test]
    fn test_current_formula_uses_session_week() {
        let mut s = WorkoutSession::new(DayType::A, 2);
        s.start();
        // first warm-up exercise has no week-2 entry, falls back to table
        assert_eq!(s.current_formula(), Some("3 sets × 10 reps @ RPE 6"));
    }

    #[test]
    fn test_progress_percent() {
        let mut s = session();
        let total = s.total_exercises();
        assert_eq!(s.progress_percent(), (100.0 / total as f64).round() as u32);
        for _ in 0..total - 1 {
            s.advance();
        }
        assert_eq!(s.progress_percent(), 100);
    }
}
