//! Default catalog of exercises and workout plans.
//!
//! This module provides the built-in exercises and plan templates for the
//! system. The catalog is an immutable value: engine operations take a
//! reference to it, never a mutable handle.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in exercises and plans
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn exercise(id: &str, name: &str, exercise_type: &str, base_exp: u32) -> (String, Exercise) {
    (
        id.into(),
        Exercise {
            id: id.into(),
            name: name.into(),
            exercise_type: exercise_type.into(),
            base_exp,
        },
    )
}

fn entry(exercise_id: &str, sets: u32, target_reps: u32) -> PlanEntry {
    PlanEntry {
        exercise_id: exercise_id.into(),
        sets,
        target_reps,
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let exercises: HashMap<String, Exercise> = [
        exercise("bench_press", "Barbell Bench Press", "strength", 15),
        exercise("overhead_press", "Overhead Press", "strength", 15),
        exercise("back_squat", "Barbell Back Squat", "strength", 20),
        exercise("deadlift", "Conventional Deadlift", "compound", 25),
        exercise("pull_up", "Pull-up", "strength", 15),
        exercise("barbell_row", "Barbell Row", "compound", 15),
        exercise("lunge", "Walking Lunge", "functional", 10),
        exercise("plank", "Plank Hold", "balance", 10),
        exercise("treadmill_run", "Treadmill Run", "cardio", 15),
        exercise("rowing_erg", "Rowing Ergometer", "endurance", 15),
        exercise("box_jump", "Box Jump", "agility", 12),
        exercise("battle_ropes", "Battle Ropes", "hiit", 12),
        exercise("yoga_flow", "Yoga Flow", "flexibility", 10),
        exercise("burpee", "Burpee", "full-body", 12),
    ]
    .into_iter()
    .collect();

    let plans: HashMap<String, WorkoutPlan> = [
        (
            "push_day".to_string(),
            WorkoutPlan {
                id: "push_day".into(),
                name: "Push Day".into(),
                entries: vec![
                    entry("bench_press", 4, 8),
                    entry("overhead_press", 3, 10),
                    entry("plank", 3, 1),
                ],
            },
        ),
        (
            "pull_day".to_string(),
            WorkoutPlan {
                id: "pull_day".into(),
                name: "Pull Day".into(),
                entries: vec![
                    entry("deadlift", 3, 5),
                    entry("pull_up", 4, 8),
                    entry("barbell_row", 3, 10),
                ],
            },
        ),
        (
            "leg_day".to_string(),
            WorkoutPlan {
                id: "leg_day".into(),
                name: "Leg Day".into(),
                entries: vec![
                    entry("back_squat", 4, 8),
                    entry("lunge", 3, 12),
                    entry("box_jump", 3, 10),
                ],
            },
        ),
        (
            "conditioning".to_string(),
            WorkoutPlan {
                id: "conditioning".into(),
                name: "Conditioning Circuit".into(),
                entries: vec![
                    entry("treadmill_run", 1, 1),
                    entry("rowing_erg", 2, 1),
                    entry("battle_ropes", 3, 20),
                    entry("burpee", 3, 10),
                ],
            },
        ),
        (
            "recovery".to_string(),
            WorkoutPlan {
                id: "recovery".into(),
                name: "Active Recovery".into(),
                entries: vec![entry("yoga_flow", 2, 1), entry("plank", 3, 1)],
            },
        ),
    ]
    .into_iter()
    .collect();

    Catalog { exercises, plans }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, ex) in &self.exercises {
            if id.is_empty() || ex.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &ex.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, ex.id
                ));
            }
            if ex.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if ex.base_exp == 0 {
                errors.push(format!("Exercise '{}' awards no experience", id));
            }
        }

        for (id, plan) in &self.plans {
            if id.is_empty() || plan.id.is_empty() {
                errors.push("Plan has empty ID".to_string());
            }
            if id != &plan.id {
                errors.push(format!(
                    "Plan key '{}' doesn't match plan.id '{}'",
                    id, plan.id
                ));
            }
            if plan.entries.is_empty() {
                errors.push(format!("Plan '{}' has no entries", id));
            }

            for entry in &plan.entries {
                if !self.exercises.contains_key(&entry.exercise_id) {
                    errors.push(format!(
                        "Plan '{}' references non-existent exercise '{}'",
                        id, entry.exercise_id
                    ));
                }
                if entry.sets == 0 {
                    errors.push(format!(
                        "Plan '{}': entry '{}' requires zero sets",
                        id, entry.exercise_id
                    ));
                }
            }
        }

        errors
    }
}
