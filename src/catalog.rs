//! Workout catalog - static program data
//!
//! Seven-week progressive program, three training days (A/B/C), each day
//! built from a shared warm-up block, a day-specific main block and a
//! shared cool-down block.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of weeks in the default program.
pub const TOTAL_WEEKS: u32 = 7;

/// Workouts expected per week (days A, B, C).
pub const WORKOUTS_PER_WEEK: u32 = 3;

/// Last-resort formula when neither the exercise nor the default table
/// has an entry for the requested week.
pub const DEFAULT_FORMULA: &str = "3 sets × 10 reps";

/// Per-week fallback formulas, indexed by week 1..=7.
pub const DEFAULT_WEEK_FORMULAS: &[(u32, &str)] = &[
    (1, "2 sets × 10 reps @ RPE 5-6"),
    (2, "3 sets × 10 reps @ RPE 6"),
    (3, "3 sets × 12 reps @ RPE 6-7"),
    (4, "4 sets × 10 reps @ RPE 7"),
    (5, "4 sets × 12 reps @ RPE 7"),
    (6, "4 sets × 12-15 reps @ RPE 7-8"),
    (7, "5 sets × 12 reps @ RPE 8"),
];

/// Workout phase, always traversed in this order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    WarmUp,
    Main,
    CoolDown,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::WarmUp => "Warm-up",
            Phase::Main => "Main Training",
            Phase::CoolDown => "Cool-down",
        }
    }

    /// Phase order for a session: warm-up, main, cool-down.
    pub fn all() -> &'static [Phase] {
        &[Phase::WarmUp, Phase::Main, Phase::CoolDown]
    }
}

/// Training day identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DayType {
    A,
    B,
    C,
}

impl DayType {
    pub fn all() -> &'static [DayType] {
        &[DayType::A, DayType::B, DayType::C]
    }

    /// Next day in the A → B → C → A rotation.
    pub fn next(&self) -> DayType {
        match self {
            DayType::A => DayType::B,
            DayType::B => DayType::C,
            DayType::C => DayType::A,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayType::A => write!(f, "A"),
            DayType::B => write!(f, "B"),
            DayType::C => write!(f, "C"),
        }
    }
}

impl FromStr for DayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(DayType::A),
            "B" => Ok(DayType::B),
            "C" => Ok(DayType::C),
            other => Err(format!("unknown day type: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub phase: Phase,
    pub instructions: &'static [&'static str],
    pub media_url: Option<&'static str>,
    /// Explicit per-week prescriptions; absent weeks fall back to
    /// `DEFAULT_WEEK_FORMULAS`, then `DEFAULT_FORMULA`.
    pub week_formulas: &'static [(u32, &'static str)],
}

/// Catalog entry describing one training day.
#[derive(Debug, Clone)]
pub struct TrainingDay {
    pub day_type: DayType,
    pub name: &'static str,
    pub focus: &'static str,
    pub exercise_count: usize,
    pub estimated_minutes: u32,
}

pub const TRAINING_DAYS: &[TrainingDay] = &[
    TrainingDay {
        day_type: DayType::A,
        name: "Day A - Upper Body",
        focus: "Upper body focused workout",
        exercise_count: 13,
        estimated_minutes: 60,
    },
    TrainingDay {
        day_type: DayType::B,
        name: "Day B - Lower Body",
        focus: "Lower body focused workout",
        exercise_count: 13,
        estimated_minutes: 65,
    },
    TrainingDay {
        day_type: DayType::C,
        name: "Day C - Full Body",
        focus: "Full body workout",
        exercise_count: 12,
        estimated_minutes: 70,
    },
];

/// Warm-up block shared by all three days.
pub const WARM_UP_EXERCISES: &[Exercise] = &[
    Exercise {
        id: "jumping_jacks",
        name: "Jumping Jacks",
        phase: Phase::WarmUp,
        instructions: &[
            "Stand upright with feet together, arms at your sides",
            "Jump while spreading legs and raising arms overhead",
            "Return to the start position and repeat at a steady pace",
        ],
        media_url: Some("https://media.fitflow.app/warmup/jumping-jacks.mp4"),
        week_formulas: &[(1, "30 seconds"), (4, "45 seconds"), (6, "60 seconds")],
    },
    Exercise {
        id: "arm_circles",
        name: "Arm Circles",
        phase: Phase::WarmUp,
        instructions: &[
            "Extend arms straight out to the sides",
            "Make small forward circles, gradually increasing the radius",
            "Reverse direction halfway through",
        ],
        media_url: None,
        week_formulas: &[(1, "2 × 15 each direction")],
    },
    Exercise {
        id: "leg_swings",
        name: "Leg Swings",
        phase: Phase::WarmUp,
        instructions: &[
            "Hold a wall for balance",
            "Swing one leg forward and back in a controlled arc",
            "Switch legs after the prescribed count",
        ],
        media_url: None,
        week_formulas: &[(1, "10 each leg"), (4, "15 each leg")],
    },
    Exercise {
        id: "cat_cow",
        name: "Cat-Cow",
        phase: Phase::WarmUp,
        instructions: &[
            "Start on all fours, hands under shoulders",
            "Alternate between arching and rounding the spine",
            "Move with your breath",
        ],
        media_url: None,
        week_formulas: &[(1, "8 slow cycles")],
    },
];

/// Day A main block - upper body.
pub const DAY_A_EXERCISES: &[Exercise] = &[
    Exercise {
        id: "pushups",
        name: "Push-ups",
        phase: Phase::Main,
        instructions: &[
            "Place hands slightly wider than shoulders",
            "Lower your chest until elbows reach 90 degrees",
            "Press back up keeping the body in one line",
        ],
        media_url: Some("https://media.fitflow.app/main/pushups.mp4"),
        week_formulas: &[
            (1, "3 sets × 8-10 reps @ RPE 6-7"),
            (2, "3 sets × 10-12 reps @ RPE 7"),
            (3, "4 sets × 10 reps @ RPE 7"),
            (5, "4 sets × 12-15 reps @ RPE 8"),
            (7, "5 sets × 12 reps @ RPE 8-9"),
        ],
    },
    Exercise {
        id: "db_rows",
        name: "Dumbbell Rows",
        phase: Phase::Main,
        instructions: &[
            "Hinge forward with a flat back, dumbbell in one hand",
            "Pull the weight to your hip, elbow close to the body",
            "Lower under control; switch sides each set",
        ],
        media_url: Some("https://media.fitflow.app/main/db-rows.mp4"),
        week_formulas: &[
            (1, "3 sets × 10 reps @ RPE 6"),
            (3, "3 sets × 12 reps @ RPE 7"),
            (5, "4 sets × 10-12 reps @ RPE 7-8"),
        ],
    },
    Exercise {
        id: "shoulder_press",
        name: "Shoulder Press",
        phase: Phase::Main,
        instructions: &[
            "Hold dumbbells at shoulder height, palms forward",
            "Press overhead without arching the lower back",
            "Lower slowly to the start position",
        ],
        media_url: None,
        week_formulas: &[(1, "3 sets × 8 reps @ RPE 6"), (4, "4 sets × 8-10 reps @ RPE 7")],
    },
    Exercise {
        id: "bicep_curls",
        name: "Bicep Curls",
        phase: Phase::Main,
        instructions: &[
            "Stand tall, elbows pinned to your sides",
            "Curl the dumbbells without swinging",
            "Lower on a slow three-count",
        ],
        media_url: None,
        week_formulas: &[],
    },
    Exercise {
        id: "tricep_dips",
        name: "Tricep Dips",
        phase: Phase::Main,
        instructions: &[
            "Hands on a bench or chair behind you, legs extended",
            "Bend elbows to lower the hips toward the floor",
            "Press back up until arms are straight",
        ],
        media_url: None,
        week_formulas: &[(2, "3 sets × 8-12 reps")],
    },
    Exercise {
        id: "plank",
        name: "Plank",
        phase: Phase::Main,
        instructions: &[
            "Forearms on the floor, body in a straight line",
            "Brace the core and hold",
        ],
        media_url: None,
        week_formulas: &[
            (1, "3 × 30 seconds"),
            (3, "3 × 45 seconds"),
            (5, "3 × 60 seconds"),
            (7, "3 × 90 seconds"),
        ],
    },
];

/// Day B main block - lower body.
pub const DAY_B_EXERCISES: &[Exercise] = &[
    Exercise {
        id: "squats",
        name: "Squats",
        phase: Phase::Main,
        instructions: &[
            "Feet shoulder-width apart, toes slightly out",
            "Sit back and down until thighs are parallel",
            "Drive through the heels to stand",
        ],
        media_url: Some("https://media.fitflow.app/main/squats.mp4"),
        week_formulas: &[
            (1, "3 sets × 10 reps @ RPE 6"),
            (2, "3 sets × 12 reps @ RPE 6-7"),
            (4, "4 sets × 10-12 reps @ RPE 7"),
            (6, "4 sets × 15 reps @ RPE 8"),
        ],
    },
    Exercise {
        id: "lunges",
        name: "Lunges",
        phase: Phase::Main,
        instructions: &[
            "Step forward into a long stance",
            "Lower the back knee toward the floor",
            "Push off the front foot to return; alternate legs",
        ],
        media_url: None,
        week_formulas: &[(1, "3 sets × 8 each leg"), (4, "3 sets × 12 each leg")],
    },
    Exercise {
        id: "romanian_deadlift",
        name: "Romanian Deadlift",
        phase: Phase::Main,
        instructions: &[
            "Hold dumbbells in front of the thighs",
            "Hinge at the hips with a flat back until you feel the hamstrings",
            "Squeeze the glutes to stand tall",
        ],
        media_url: Some("https://media.fitflow.app/main/rdl.mp4"),
        week_formulas: &[(1, "3 sets × 10 reps @ RPE 6"), (5, "4 sets × 10 reps @ RPE 7-8")],
    },
    Exercise {
        id: "glute_bridge",
        name: "Glute Bridge",
        phase: Phase::Main,
        instructions: &[
            "Lie on your back, knees bent, feet flat",
            "Drive the hips up until the body forms a line",
            "Pause at the top, lower slowly",
        ],
        media_url: None,
        week_formulas: &[],
    },
    Exercise {
        id: "calf_raises",
        name: "Calf Raises",
        phase: Phase::Main,
        instructions: &[
            "Stand on the edge of a step with heels hanging off",
            "Rise onto the toes, then lower below step level",
        ],
        media_url: None,
        week_formulas: &[(1, "3 sets × 15 reps"), (5, "4 sets × 15-20 reps")],
    },
    Exercise {
        id: "wall_sit",
        name: "Wall Sit",
        phase: Phase::Main,
        instructions: &[
            "Back flat against a wall, thighs parallel to the floor",
            "Hold the position without resting hands on the legs",
        ],
        media_url: None,
        week_formulas: &[(1, "3 × 30 seconds"), (4, "3 × 45 seconds"), (7, "3 × 75 seconds")],
    },
];

/// Day C main block - full body.
pub const DAY_C_EXERCISES: &[Exercise] = &[
    Exercise {
        id: "burpees",
        name: "Burpees",
        phase: Phase::Main,
        instructions: &[
            "Squat down and place hands on the floor",
            "Kick back to a plank, perform a push-up",
            "Jump the feet in and leap upward",
        ],
        media_url: Some("https://media.fitflow.app/main/burpees.mp4"),
        week_formulas: &[
            (1, "3 sets × 6 reps @ RPE 7"),
            (3, "3 sets × 8 reps @ RPE 7-8"),
            (5, "4 sets × 8-10 reps @ RPE 8"),
        ],
    },
    Exercise {
        id: "mountain_climbers",
        name: "Mountain Climbers",
        phase: Phase::Main,
        instructions: &[
            "Start in a high plank",
            "Drive the knees toward the chest in alternation",
            "Keep the hips level throughout",
        ],
        media_url: None,
        week_formulas: &[(1, "3 × 20 seconds"), (4, "3 × 30 seconds")],
    },
    Exercise {
        id: "db_thrusters",
        name: "Dumbbell Thrusters",
        phase: Phase::Main,
        instructions: &[
            "Hold dumbbells at the shoulders in a front-rack position",
            "Squat down, then drive up and press overhead in one motion",
        ],
        media_url: None,
        week_formulas: &[(2, "3 sets × 8 reps @ RPE 7")],
    },
    Exercise {
        id: "renegade_rows",
        name: "Renegade Rows",
        phase: Phase::Main,
        instructions: &[
            "Plank position with hands on dumbbells",
            "Row one dumbbell to the hip while bracing against rotation",
            "Alternate sides",
        ],
        media_url: None,
        week_formulas: &[],
    },
    Exercise {
        id: "russian_twists",
        name: "Russian Twists",
        phase: Phase::Main,
        instructions: &[
            "Sit with knees bent, lean back slightly",
            "Rotate the torso side to side, touching the floor each rep",
        ],
        media_url: None,
        week_formulas: &[(1, "3 sets × 12 each side"), (5, "3 sets × 20 each side")],
    },
];

/// Cool-down block shared by all three days.
pub const COOL_DOWN_EXERCISES: &[Exercise] = &[
    Exercise {
        id: "hamstring_stretch",
        name: "Hamstring Stretch",
        phase: Phase::CoolDown,
        instructions: &[
            "Sit with one leg extended, the other bent",
            "Reach toward the extended foot and hold",
            "Switch legs",
        ],
        media_url: None,
        week_formulas: &[(1, "30 seconds each leg")],
    },
    Exercise {
        id: "quad_stretch",
        name: "Quad Stretch",
        phase: Phase::CoolDown,
        instructions: &[
            "Stand on one leg, pull the other heel to the glutes",
            "Keep knees together and hips forward",
        ],
        media_url: None,
        week_formulas: &[(1, "30 seconds each leg")],
    },
    Exercise {
        id: "childs_pose",
        name: "Child's Pose",
        phase: Phase::CoolDown,
        instructions: &[
            "Kneel and sit back on your heels",
            "Stretch the arms forward and relax the spine",
        ],
        media_url: None,
        week_formulas: &[(1, "60 seconds")],
    },
];

/// One day's workout: shared warm-up, day-specific main block, shared cool-down.
#[derive(Debug, Clone)]
pub struct Workout {
    pub day_type: DayType,
    pub name: &'static str,
    pub warm_up: &'static [Exercise],
    pub main: &'static [Exercise],
    pub cool_down: &'static [Exercise],
}

impl Workout {
    /// Exercise blocks in phase order.
    pub fn phases(&self) -> [&'static [Exercise]; 3] {
        [self.warm_up, self.main, self.cool_down]
    }

    pub fn phase_exercises(&self, phase_index: usize) -> &'static [Exercise] {
        self.phases()[phase_index]
    }

    pub fn total_exercises(&self) -> usize {
        self.warm_up.len() + self.main.len() + self.cool_down.len()
    }
}

/// Assemble the workout for a day. Returns `None` when the catalog has no
/// main exercises for the day - callers surface this as an empty state.
pub fn workout_for_day(day: DayType) -> Option<Workout> {
    let (name, main) = match day {
        DayType::A => ("Day A - Upper Body", DAY_A_EXERCISES),
        DayType::B => ("Day B - Lower Body", DAY_B_EXERCISES),
        DayType::C => ("Day C - Full Body", DAY_C_EXERCISES),
    };

    if main.is_empty() {
        return None;
    }

    Some(Workout {
        day_type: day,
        name,
        warm_up: WARM_UP_EXERCISES,
        main,
        cool_down: COOL_DOWN_EXERCISES,
    })
}

pub fn training_days() -> &'static [TrainingDay] {
    TRAINING_DAYS
}

pub fn training_day(day: DayType) -> &'static TrainingDay {
    TRAINING_DAYS
        .iter()
        .find(|d| d.day_type == day)
        .unwrap_or(&TRAINING_DAYS[0])
}

pub fn find_exercise(id: &str) -> Option<&'static Exercise> {
    WARM_UP_EXERCISES
        .iter()
        .chain(DAY_A_EXERCISES.iter())
        .chain(DAY_B_EXERCISES.iter())
        .chain(DAY_C_EXERCISES.iter())
        .chain(COOL_DOWN_EXERCISES.iter())
        .find(|e| e.id == id)
}

/// Resolve the prescription for an exercise at a given program week.
///
/// Fallback chain: the exercise's own week table, then the per-week default
/// table, then `DEFAULT_FORMULA`.
pub fn formula_for(exercise: &Exercise, week: u32) -> &'static str {
    if let Some((_, f)) = exercise.week_formulas.iter().find(|(w, _)| *w == week) {
        return f;
    }
    if let Some((_, f)) = DEFAULT_WEEK_FORMULAS.iter().find(|(w, _)| *w == week) {
        return f;
    }
    DEFAULT_FORMULA
}
