//! Workout session state machine.
//!
//! One session exists per (member, plan, calendar date). It moves forward
//! only: `in_progress` -> `completed`, never back. Set recording is an
//! idempotent upsert keyed by (exercise, set number), so duplicate
//! submissions overwrite instead of double-counting toward completion.
//!
//! Substitutions are a per-session overlay on the shared plan template:
//! they change the exercise identity used for set keys and progress math
//! without touching the plan definition.

use crate::{Error, Result, WorkoutPlan};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Session lifecycle status; `completed` is terminal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// One recorded set within a session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedSet {
    pub exercise_id: String,
    pub set_number: u32,
    pub reps: u32,
    pub load: Option<f64>,
    pub completed_at: DateTime<Utc>,
}

/// A single attempt at a workout plan on a specific date
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub plan_id: String,
    pub date: NaiveDate,
    pub status: SessionStatus,
    pub total_exp: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub sets: Vec<RecordedSet>,
    /// Session-local overlay: original exercise id -> replacement id
    #[serde(default)]
    pub substitutions: HashMap<String, String>,
}

/// Outcome of `start_or_resume` for presentation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// A fresh session was created
    New,
    /// An in-progress session exists; `recorded_sets` carries the
    /// (exercise, set number) keys already submitted so the client can
    /// resume from where it left off
    Resumed { recorded_sets: Vec<(String, u32)> },
    /// Blocks re-entry so the same plan cannot earn duplicate same-day credit
    AlreadyCompleted { total_exp: u64 },
}

/// Aggregate progress against the (substituted) plan
#[derive(Clone, Debug, PartialEq)]
pub struct SessionProgress {
    pub completed_sets: u32,
    pub total_sets: u32,
    pub percentage: f64,
}

/// Next-set load suggestion derived from the last set of the same exercise
#[derive(Clone, Debug, PartialEq)]
pub struct LoadSuggestion {
    pub recommended: f64,
    pub direction: LoadDirection,
    pub target_reps: u32,
    pub performed_reps: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadDirection {
    Increase,
    Decrease,
    Maintain,
}

impl WorkoutSession {
    /// Create a fresh in-progress session
    pub fn start(plan_id: impl Into<String>, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            plan_id: plan_id.into(),
            date,
            status: SessionStatus::InProgress,
            total_exp: 0,
            started_at: now,
            completed_at: None,
            sets: Vec::new(),
            substitutions: HashMap::new(),
        }
    }

    /// Exercise identity effective for this session after substitutions
    pub fn effective_exercise<'a>(&'a self, original: &'a str) -> &'a str {
        self.substitutions
            .get(original)
            .map(String::as_str)
            .unwrap_or(original)
    }

    /// Record (or overwrite) a set completion.
    ///
    /// Returns true when the (exercise, set) key was newly inserted, false
    /// when an earlier submission was overwritten.
    pub fn record_set(
        &mut self,
        exercise_id: &str,
        set_number: u32,
        reps: u32,
        load: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if self.status == SessionStatus::Completed {
            return Err(Error::InvalidState(format!(
                "session for plan '{}' on {} is already completed",
                self.plan_id, self.date
            )));
        }

        let recorded = RecordedSet {
            exercise_id: exercise_id.to_string(),
            set_number,
            reps,
            load,
            completed_at: now,
        };

        if let Some(existing) = self
            .sets
            .iter_mut()
            .find(|s| s.exercise_id == exercise_id && s.set_number == set_number)
        {
            *existing = recorded;
            tracing::debug!("Overwrote set {}#{}", exercise_id, set_number);
            Ok(false)
        } else {
            self.sets.push(recorded);
            Ok(true)
        }
    }

    /// Add experience to the session's running total
    pub fn accrue_exp(&mut self, amount: u64) {
        self.total_exp += amount;
    }

    /// Replace an exercise for this session only
    pub fn substitute(&mut self, original: &str, replacement: &str) -> Result<()> {
        if self.status == SessionStatus::Completed {
            return Err(Error::InvalidState(
                "cannot substitute exercises in a completed session".into(),
            ));
        }
        self.substitutions
            .insert(original.to_string(), replacement.to_string());
        Ok(())
    }

    /// Progress against the plan with this session's substitutions applied
    pub fn progress(&self, plan: &WorkoutPlan) -> SessionProgress {
        let total_sets = plan.total_sets();
        let completed_sets = self.sets.len() as u32;
        let percentage = if total_sets > 0 {
            100.0 * completed_sets as f64 / total_sets as f64
        } else {
            0.0
        };
        SessionProgress {
            completed_sets,
            total_sets,
            percentage,
        }
    }

    /// Transition to `completed` when every required set is recorded.
    ///
    /// This is the only path to the terminal state; callers invoke it after
    /// every recorded set. Returns true when the transition happened.
    pub fn maybe_complete(&mut self, plan: &WorkoutPlan, now: DateTime<Utc>) -> bool {
        if self.status == SessionStatus::Completed {
            return false;
        }
        if self.progress(plan).percentage >= 100.0 {
            self.status = SessionStatus::Completed;
            self.completed_at = Some(now);
            tracing::info!(
                "Session for plan '{}' on {} completed ({} exp)",
                self.plan_id,
                self.date,
                self.total_exp
            );
            true
        } else {
            false
        }
    }

    /// Suggest a load for the next set of an exercise.
    ///
    /// Compares the last recorded set's reps against the plan's target
    /// (±3 band): above the band raises the load 10%, below lowers it 10%,
    /// inside holds. Returns None when no loaded set exists yet.
    pub fn recommend_load(&self, plan: &WorkoutPlan, exercise_id: &str) -> Option<LoadSuggestion> {
        let last = self
            .sets
            .iter()
            .filter(|s| s.exercise_id == exercise_id && s.load.is_some())
            .max_by_key(|s| s.set_number)?;
        let last_load = last.load?;

        let target_reps = plan
            .entries
            .iter()
            .find(|e| self.effective_exercise(&e.exercise_id) == exercise_id)
            .map(|e| e.target_reps)
            .unwrap_or(10);

        let (recommended, direction) = if last.reps > target_reps + 3 {
            (last_load * 1.1, LoadDirection::Increase)
        } else if last.reps + 3 < target_reps {
            (last_load * 0.9, LoadDirection::Decrease)
        } else {
            (last_load, LoadDirection::Maintain)
        };

        Some(LoadSuggestion {
            recommended: (recommended * 10.0).round() / 10.0,
            direction,
            target_reps,
            performed_reps: last.reps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanEntry;

    fn plan() -> WorkoutPlan {
        WorkoutPlan {
            id: "push_day".into(),
            name: "Push Day".into(),
            entries: vec![
                PlanEntry {
                    exercise_id: "bench_press".into(),
                    sets: 2,
                    target_reps: 10,
                },
                PlanEntry {
                    exercise_id: "overhead_press".into(),
                    sets: 1,
                    target_reps: 8,
                },
            ],
        }
    }

    fn session() -> WorkoutSession {
        WorkoutSession::start(
            "push_day",
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_session_starts_in_progress() {
        let s = session();
        assert_eq!(s.status, SessionStatus::InProgress);
        assert_eq!(s.total_exp, 0);
        assert!(s.completed_at.is_none());
    }

    #[test]
    fn test_record_set_overwrites_not_duplicates() {
        let mut s = session();
        let plan = plan();

        assert!(s.record_set("bench_press", 1, 10, Some(60.0), Utc::now()).unwrap());
        let before = s.progress(&plan).completed_sets;

        // Resubmission with a different measurement overwrites
        let inserted = s.record_set("bench_press", 1, 8, Some(62.5), Utc::now()).unwrap();
        assert!(!inserted);
        assert_eq!(s.progress(&plan).completed_sets, before);
        assert_eq!(s.sets[0].reps, 8);
    }

    #[test]
    fn test_percentage_reaches_100_exactly_when_all_sets_recorded() {
        let mut s = session();
        let plan = plan();
        let now = Utc::now();

        s.record_set("bench_press", 1, 10, Some(60.0), now).unwrap();
        s.record_set("bench_press", 2, 9, Some(60.0), now).unwrap();
        assert!(!s.maybe_complete(&plan, now));
        assert!(s.progress(&plan).percentage < 100.0);

        s.record_set("overhead_press", 1, 8, Some(40.0), now).unwrap();
        let p = s.progress(&plan);
        assert_eq!(p.completed_sets, 3);
        assert_eq!(p.total_sets, 3);
        assert!((p.percentage - 100.0).abs() < 1e-9);
        assert!(s.maybe_complete(&plan, now));
        assert_eq!(s.status, SessionStatus::Completed);
        assert!(s.completed_at.is_some());
    }

    #[test]
    fn test_completed_session_rejects_writes() {
        let mut s = session();
        let plan = plan();
        let now = Utc::now();
        s.record_set("bench_press", 1, 10, None, now).unwrap();
        s.record_set("bench_press", 2, 10, None, now).unwrap();
        s.record_set("overhead_press", 1, 8, None, now).unwrap();
        assert!(s.maybe_complete(&plan, now));

        assert!(matches!(
            s.record_set("bench_press", 1, 12, None, now),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            s.substitute("bench_press", "dumbbell_press"),
            Err(Error::InvalidState(_))
        ));
        // Completion does not fire twice
        assert!(!s.maybe_complete(&plan, now));
    }

    #[test]
    fn test_empty_plan_progress_is_zero() {
        let s = session();
        let empty = WorkoutPlan {
            id: "empty".into(),
            name: "Empty".into(),
            entries: vec![],
        };
        let p = s.progress(&empty);
        assert_eq!(p.total_sets, 0);
        assert_eq!(p.percentage, 0.0);
    }

    #[test]
    fn test_substitution_changes_effective_identity_only() {
        let mut s = session();
        s.substitute("bench_press", "dumbbell_press").unwrap();
        assert_eq!(s.effective_exercise("bench_press"), "dumbbell_press");
        assert_eq!(s.effective_exercise("overhead_press"), "overhead_press");

        // Total set count is unaffected by a substitution
        let plan = plan();
        assert_eq!(s.progress(&plan).total_sets, 3);
    }

    #[test]
    fn test_load_recommendation_bands() {
        let mut s = session();
        let plan = plan();
        let now = Utc::now();

        // Target 10, performed 15 -> increase 10%
        s.record_set("bench_press", 1, 15, Some(60.0), now).unwrap();
        let rec = s.recommend_load(&plan, "bench_press").unwrap();
        assert_eq!(rec.direction, LoadDirection::Increase);
        assert!((rec.recommended - 66.0).abs() < 1e-9);

        // Performed 5 -> decrease 10%
        s.record_set("bench_press", 2, 5, Some(66.0), now).unwrap();
        let rec = s.recommend_load(&plan, "bench_press").unwrap();
        assert_eq!(rec.direction, LoadDirection::Decrease);
        assert!((rec.recommended - 59.4).abs() < 1e-9);

        // No loaded sets yet for this exercise
        assert!(s.recommend_load(&plan, "overhead_press").is_none());
    }

    #[test]
    fn test_load_recommendation_maintains_inside_band() {
        let mut s = session();
        let plan = plan();
        s.record_set("bench_press", 1, 11, Some(80.0), Utc::now()).unwrap();
        let rec = s.recommend_load(&plan, "bench_press").unwrap();
        assert_eq!(rec.direction, LoadDirection::Maintain);
        assert!((rec.recommended - 80.0).abs() < 1e-9);
    }
}
