//! Achievement evaluator and the built-in achievement catalog.
//!
//! The catalog is an immutable configuration value passed into `evaluate`,
//! never a global, so tests can run against synthetic catalogs. Evaluation
//! is pure and idempotent: entries already unlocked are skipped, and a
//! re-run with an unchanged snapshot yields nothing new. Recording unlocks
//! and awarding the experience reward is the engine's job.

use crate::Rank;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Closed set of stat categories an achievement can gate on
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Level,
    Attendance,
    Streak,
    Workouts,
    /// Requirement is a rank ordinal (E = 0 .. SS = 6)
    Rank,
    Sets,
    Reps,
    ClassChosen,
}

/// One catalog entry; seeded once, immutable at runtime
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub requirement: u64,
    pub exp_reward: u32,
}

/// Stats snapshot the evaluator compares against catalog requirements
#[derive(Clone, Debug, Default)]
pub struct StatsSnapshot {
    pub level: u32,
    pub attendance_days: u64,
    pub current_streak: u32,
    pub workout_days: u64,
    pub rank: Rank,
    pub total_sets: u64,
    pub total_reps: u64,
    pub has_class: bool,
}

impl StatsSnapshot {
    /// Current value of the stat an achievement category gates on
    pub fn value_for(&self, category: AchievementCategory) -> u64 {
        match category {
            AchievementCategory::Level => self.level as u64,
            AchievementCategory::Attendance => self.attendance_days,
            AchievementCategory::Streak => self.current_streak as u64,
            AchievementCategory::Workouts => self.workout_days,
            AchievementCategory::Rank => self.rank.ordinal() as u64,
            AchievementCategory::Sets => self.total_sets,
            AchievementCategory::Reps => self.total_reps,
            AchievementCategory::ClassChosen => u64::from(self.has_class),
        }
    }
}

/// Determine which catalog entries are newly satisfied.
///
/// Entries named in `already_unlocked` are skipped. Evaluation order
/// across entries carries no meaning.
pub fn evaluate<'a>(
    snapshot: &StatsSnapshot,
    catalog: &'a [Achievement],
    already_unlocked: &BTreeSet<String>,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| !already_unlocked.contains(&a.name))
        .filter(|a| snapshot.value_for(a.category) >= a.requirement)
        .collect()
}

/// Cached built-in achievement catalog
static DEFAULT_CATALOG: Lazy<Vec<Achievement>> = Lazy::new(build_default_achievements);

/// Get a reference to the cached built-in achievement catalog
pub fn default_achievements() -> &'static [Achievement] {
    &DEFAULT_CATALOG
}

fn entry(
    name: &str,
    description: &str,
    category: AchievementCategory,
    requirement: u64,
    exp_reward: u32,
) -> Achievement {
    Achievement {
        name: name.into(),
        description: description.into(),
        category,
        requirement,
        exp_reward,
    }
}

/// Builds the built-in achievement catalog
///
/// Retained for testing and custom catalog creation; production callers
/// should prefer `default_achievements()`.
pub fn build_default_achievements() -> Vec<Achievement> {
    use AchievementCategory::*;
    vec![
        // Level milestones
        entry("First Steps", "Reach level 5", Level, 5, 100),
        entry("Rising Star", "Reach level 10", Level, 10, 250),
        entry("Veteran", "Reach level 15", Level, 15, 500),
        entry("Master", "Reach level 20", Level, 20, 1000),
        entry("Ascendant", "Reach level 30", Level, 30, 1500),
        entry("Peak Performer", "Reach level 50", Level, 50, 3000),
        entry("Limit Breaker", "Reach level 75", Level, 75, 5000),
        entry("True Legend", "Reach level 100", Level, 100, 10000),
        // Attendance
        entry("Consistency is Key", "Check in 10 times", Attendance, 10, 150),
        entry("Gym Regular", "Check in 30 times", Attendance, 30, 300),
        entry("Iron Dedication", "Check in 100 times", Attendance, 100, 1000),
        entry("Never Miss a Day", "Check in 250 times", Attendance, 250, 2000),
        entry("Lifetime Member", "Check in 500 times", Attendance, 500, 5000),
        // Streaks
        entry("On Fire!", "Maintain a 7-day streak", Streak, 7, 200),
        entry("Unstoppable", "Maintain a 30-day streak", Streak, 30, 500),
        entry("Legend", "Maintain a 100-day streak", Streak, 100, 2000),
        entry("365 Grind", "Train every day for a full year", Streak, 365, 7500),
        // Workout days
        entry("First Workout", "Complete your first workout", Workouts, 1, 50),
        entry("Getting Strong", "Complete 50 workouts", Workouts, 50, 400),
        entry("Fitness Warrior", "Complete 100 workouts", Workouts, 100, 800),
        entry("Gym Veteran", "Complete 250 workouts", Workouts, 250, 1500),
        entry("Titan of Training", "Complete 500 workouts", Workouts, 500, 3000),
        // Ranks (requirement is the rank ordinal)
        entry("D-Rank Fighter", "Achieve D rank", Rank, crate::Rank::D.ordinal() as u64, 100),
        entry("C-Rank Athlete", "Achieve C rank", Rank, crate::Rank::C.ordinal() as u64, 200),
        entry("B-Rank Champion", "Achieve B rank", Rank, crate::Rank::B.ordinal() as u64, 300),
        entry("A-Rank Elite", "Achieve A rank", Rank, crate::Rank::A.ordinal() as u64, 500),
        entry("S-Rank Legend", "Achieve S rank", Rank, crate::Rank::S.ordinal() as u64, 750),
        entry("SS-Rank Master", "Achieve SS rank", Rank, crate::Rank::Ss.ordinal() as u64, 1500),
        // Volume
        entry("Hundred Club", "Complete 100 total sets", Sets, 100, 200),
        entry("Volume Master", "Complete 500 total sets", Sets, 500, 600),
        entry("Set Machine", "Complete 1000 total sets", Sets, 1000, 1200),
        entry("Reps for Days", "Complete 1000 total reps", Reps, 1000, 300),
        entry("Rep Monster", "Complete 5000 total reps", Reps, 5000, 1200),
        entry("Endurance Machine", "Complete 10,000 total reps", Reps, 10000, 3000),
        // Class
        entry("Class Chosen", "Choose a specialized class", ClassChosen, 1, 150),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StatsSnapshot {
        StatsSnapshot {
            level: 12,
            attendance_days: 31,
            current_streak: 7,
            workout_days: 3,
            rank: Rank::C,
            total_sets: 120,
            total_reps: 900,
            has_class: false,
        }
    }

    #[test]
    fn test_default_catalog_has_unique_names() {
        let catalog = default_achievements();
        let names: BTreeSet<_> = catalog.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_evaluate_matches_with_gte() {
        let catalog = vec![
            entry("L10", "level 10", AchievementCategory::Level, 10, 10),
            entry("L12", "level 12", AchievementCategory::Level, 12, 10),
            entry("L13", "level 13", AchievementCategory::Level, 13, 10),
        ];
        let unlocked = evaluate(&snapshot(), &catalog, &BTreeSet::new());
        let names: Vec<_> = unlocked.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["L10", "L12"]);
    }

    #[test]
    fn test_rank_uses_ordinal_comparison() {
        let catalog = vec![
            entry("D", "", AchievementCategory::Rank, Rank::D.ordinal() as u64, 10),
            entry("C", "", AchievementCategory::Rank, Rank::C.ordinal() as u64, 10),
            entry("B", "", AchievementCategory::Rank, Rank::B.ordinal() as u64, 10),
        ];
        // Rank C satisfies D and C but not B
        let unlocked = evaluate(&snapshot(), &catalog, &BTreeSet::new());
        assert_eq!(unlocked.len(), 2);
    }

    #[test]
    fn test_already_unlocked_are_skipped() {
        let catalog = default_achievements();
        let first = evaluate(&snapshot(), catalog, &BTreeSet::new());
        assert!(!first.is_empty());

        let unlocked_names: BTreeSet<String> =
            first.iter().map(|a| a.name.clone()).collect();

        // Re-running with an unchanged snapshot yields nothing new
        let second = evaluate(&snapshot(), catalog, &unlocked_names);
        assert!(second.is_empty());
    }

    #[test]
    fn test_class_chosen_category() {
        let catalog = vec![entry(
            "Class Chosen",
            "",
            AchievementCategory::ClassChosen,
            1,
            150,
        )];
        let mut snap = snapshot();
        assert!(evaluate(&snap, &catalog, &BTreeSet::new()).is_empty());

        snap.has_class = true;
        assert_eq!(evaluate(&snap, &catalog, &BTreeSet::new()).len(), 1);
    }
}
