//! Engine facade tying the ledger, streak, rank, session and achievement
//! pieces to the persisted roster.
//!
//! Every mutating operation follows the same shape: load the roster under
//! lock, apply the pure domain functions, persist atomically and append an
//! activity record to the journal. Operations take the current instant as
//! an argument, so callers (and tests) control the clock.

use crate::{
    achievements::{self, Achievement, StatsSnapshot},
    catalog,
    journal::{self, ActivityEvent, ActivityRecord, EventSink, JsonlSink},
    ledger, multiplier,
    rank::{self, Assessment},
    session::{LoadSuggestion, SessionProgress, SessionStatus, StartOutcome},
    store::{GymState, MemberRecord, Visit},
    streak, Catalog, ClassKind, Config, Discipline, Error, Rank, Result, WorkoutSession,
};
use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::str::FromStr;

/// Orchestrates all member-facing operations against one data directory
pub struct Engine {
    state_path: PathBuf,
    journal_path: PathBuf,
    catalog: Catalog,
    achievements: Vec<Achievement>,
    config: Config,
}

/// Result of a check-in
#[derive(Clone, Debug)]
pub struct CheckInOutcome {
    pub date: NaiveDate,
    /// True when the member had already checked in today; nothing changed
    pub already_checked_in: bool,
    pub streak: u32,
    pub multiplier: f64,
    pub unlocked: Vec<String>,
}

/// Result of a check-out
#[derive(Clone, Debug)]
pub struct CheckOutOutcome {
    pub duration_minutes: i64,
    pub bonus_exp: u64,
    pub level: u32,
}

/// Result of logging a standalone set
#[derive(Clone, Debug)]
pub struct LogSetOutcome {
    pub exp_awarded: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub unlocked: Vec<String>,
}

/// Result of recording a set inside a session
#[derive(Clone, Debug)]
pub struct RecordSetOutcome {
    /// False when an earlier submission of the same set was overwritten
    pub inserted: bool,
    pub exp_awarded: u64,
    pub session_completed: bool,
    pub progress: SessionProgress,
    pub unlocked: Vec<String>,
}

/// Result of submitting a full physical assessment
#[derive(Clone, Debug)]
pub struct AssessmentOutcome {
    pub assessment: Assessment,
    pub rank_before: Rank,
    pub exp_awarded: u64,
    pub unlocked: Vec<String>,
}

/// Result of an explicit session-completion request
#[derive(Clone, Debug)]
pub struct CompleteOutcome {
    /// False when the session had already reached the terminal state
    pub completed_now: bool,
    pub total_exp: u64,
    pub progress: SessionProgress,
}

/// Metric a leaderboard ranks members by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaderboardMetric {
    TotalExp,
    TotalReps,
    Streak,
}

impl FromStr for LeaderboardMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "exp" | "total-exp" => Ok(LeaderboardMetric::TotalExp),
            "reps" | "total-reps" => Ok(LeaderboardMetric::TotalReps),
            "streak" => Ok(LeaderboardMetric::Streak),
            other => Err(Error::InvalidState(format!(
                "unknown leaderboard metric '{}' (expected exp, reps or streak)",
                other
            ))),
        }
    }
}

/// One leaderboard row
#[derive(Clone, Debug)]
pub struct LeaderboardEntry {
    pub member_id: String,
    pub display_name: String,
    pub value: u64,
}

/// Read-only snapshot of a member's standing
#[derive(Clone, Debug)]
pub struct ProgressReport {
    pub display_name: String,
    pub level: u32,
    pub current_exp: u64,
    /// Experience still needed for the next level; None at the level cap
    pub exp_to_next: Option<u64>,
    pub total_exp: u64,
    pub rank: Rank,
    pub class: Option<ClassKind>,
    /// True when the member has reached the unlock level and has no class yet
    pub can_choose_class: bool,
    pub streak: u32,
    pub longest_streak: u32,
    pub multiplier: f64,
    pub attendance_days: u64,
    pub workout_days: u64,
    pub total_sets: u64,
    pub total_reps: u64,
    pub achievements_unlocked: usize,
}

impl Engine {
    /// Engine over the default catalog and achievement set
    pub fn new(config: Config) -> Self {
        Self {
            state_path: config.state_path(),
            journal_path: config.journal_path(),
            catalog: catalog::get_default_catalog().clone(),
            achievements: achievements::default_achievements().to_vec(),
            config,
        }
    }

    /// Replace the exercise/plan catalog
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the achievement catalog
    pub fn with_achievements(mut self, achievements: Vec<Achievement>) -> Self {
        self.achievements = achievements;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Enroll a new member
    pub fn enroll(&self, member_id: &str, display_name: &str) -> Result<()> {
        GymState::update(&self.state_path, |state| {
            if state.members.contains_key(member_id) {
                return Err(Error::InvalidState(format!(
                    "member '{}' is already enrolled",
                    member_id
                )));
            }
            state
                .members
                .insert(member_id.to_string(), MemberRecord::new(display_name));
            tracing::info!("Enrolled member '{}' ({})", member_id, display_name);
            Ok(())
        })
    }

    /// Read-only progress report for one member
    pub fn progress(&self, member_id: &str) -> Result<ProgressReport> {
        let state = GymState::load(&self.state_path)?;
        let member = state.member(member_id)?;
        let p = &member.progression;
        Ok(ProgressReport {
            display_name: member.display_name.clone(),
            level: p.level,
            current_exp: p.current_exp,
            exp_to_next: ledger::delta_to_next(p.level).map(|d| d - p.current_exp),
            total_exp: p.total_exp,
            rank: p.rank,
            class: p.class,
            can_choose_class: p.class.is_none()
                && p.level >= self.config.progression.class_unlock_level,
            streak: member.streak.current,
            longest_streak: member.streak.longest,
            multiplier: member.streak.multiplier,
            attendance_days: member.totals.attendance_days.len() as u64,
            workout_days: member.totals.workout_days.len() as u64,
            total_sets: member.totals.total_sets,
            total_reps: member.totals.total_reps,
            achievements_unlocked: member.unlocked.len(),
        })
    }

    /// Declare the weekdays a member plans to train.
    ///
    /// The remaining weekdays become rest days for streak forgiveness.
    pub fn set_training_days(&self, member_id: &str, days: HashSet<Weekday>) -> Result<()> {
        if days.is_empty() {
            return Err(Error::InvalidState(
                "training days cannot be empty; a streak needs at least one training day".into(),
            ));
        }
        GymState::update(&self.state_path, |state| {
            state.member_mut(member_id)?.training_days = days.clone();
            Ok(())
        })
    }

    /// Choose a specialization class, once, past the unlock level
    pub fn choose_class(
        &self,
        member_id: &str,
        class: ClassKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let unlock_level = self.config.progression.class_unlock_level;
        let mut sink = JsonlSink::new(&self.journal_path);
        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            if member.progression.level < unlock_level {
                return Err(Error::InvalidState(format!(
                    "classes unlock at level {}, member is level {}",
                    unlock_level, member.progression.level
                )));
            }
            if let Some(existing) = member.progression.class {
                return Err(Error::InvalidState(format!(
                    "class already chosen ({})",
                    existing
                )));
            }
            member.progression.class = Some(class);
            member.progression.class_unlocked_at_level = Some(member.progression.level);
            sink.append(&ActivityRecord::new(
                member_id,
                now,
                ActivityEvent::ClassChosen {
                    class: class.to_string(),
                },
            ))?;
            self.unlock_achievements(member_id, member, now, &mut sink)
        })
    }

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------

    /// Check a member in for the day.
    ///
    /// Advances the streak, records attendance and evaluates achievements.
    /// Check-ins award no experience themselves; the multiplier the streak
    /// builds pays out on the training that follows. A second check-in on
    /// the same day is a no-op.
    pub fn check_in(&self, member_id: &str, now: DateTime<Utc>) -> Result<CheckInOutcome> {
        let date = now.date_naive();
        let mut sink = JsonlSink::new(&self.journal_path);

        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;

            if member.visits.contains_key(&date) {
                tracing::debug!("Member '{}' already checked in on {}", member_id, date);
                return Ok(CheckInOutcome {
                    date,
                    already_checked_in: true,
                    streak: member.streak.current,
                    multiplier: member.streak.multiplier,
                    unlocked: Vec::new(),
                });
            }

            member.streak = streak::advance(&member.streak, date, &member.rest_days());
            member.totals.attendance_days.insert(date);
            member.visits.insert(
                date,
                Visit {
                    check_in: now,
                    check_out: None,
                    exp_earned: 0,
                },
            );

            sink.append(&ActivityRecord::new(
                member_id,
                now,
                ActivityEvent::CheckIn {
                    streak: member.streak.current,
                },
            ))?;

            let unlocked = self.unlock_achievements(member_id, member, now, &mut sink)?;

            Ok(CheckInOutcome {
                date,
                already_checked_in: false,
                streak: member.streak.current,
                multiplier: member.streak.multiplier,
                unlocked,
            })
        })
    }

    /// Check a member out, crediting the long-visit bonus when earned
    pub fn check_out(&self, member_id: &str, now: DateTime<Utc>) -> Result<CheckOutOutcome> {
        let date = now.date_naive();
        let threshold = Duration::minutes(self.config.progression.long_visit_minutes);
        let bonus = self.config.progression.long_visit_bonus_exp;
        let mut sink = JsonlSink::new(&self.journal_path);

        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            let visit = member.visits.get_mut(&date).ok_or_else(|| {
                Error::InvalidState(format!("no check-in recorded for {}", date))
            })?;
            if visit.check_out.is_some() {
                return Err(Error::InvalidState(format!(
                    "already checked out on {}",
                    date
                )));
            }

            let duration = now - visit.check_in;
            visit.check_out = Some(now);

            let bonus_exp = if duration >= threshold { bonus } else { 0 };
            if bonus_exp > 0 {
                visit.exp_earned += bonus_exp;
                // Flat bonus, no multipliers
                let award = ledger::apply_experience(&member.progression, bonus_exp as i64)?;
                member.progression = award.state;
            }

            sink.append(&ActivityRecord::new(
                member_id,
                now,
                ActivityEvent::CheckOut {
                    duration_minutes: duration.num_minutes(),
                    bonus_exp,
                },
            ))?;

            Ok(CheckOutOutcome {
                duration_minutes: duration.num_minutes(),
                bonus_exp,
                level: member.progression.level,
            })
        })
    }

    // ------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------

    /// Log a standalone set outside any session
    pub fn log_set(
        &self,
        member_id: &str,
        exercise_id: &str,
        reps: u32,
        now: DateTime<Utc>,
    ) -> Result<LogSetOutcome> {
        let exercise = self
            .catalog
            .exercises
            .get(exercise_id)
            .ok_or_else(|| Error::not_found(format!("exercise '{}'", exercise_id)))?;
        let mut sink = JsonlSink::new(&self.journal_path);

        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            let award = Self::award(member, exercise.base_exp, Some(&exercise.exercise_type))?;

            member.totals.total_sets += 1;
            member.totals.total_reps += reps as u64;
            member.totals.workout_days.insert(now.date_naive());

            sink.append(&ActivityRecord::new(
                member_id,
                now,
                ActivityEvent::SetLogged {
                    exercise_id: exercise_id.to_string(),
                    reps,
                    exp_awarded: award.gained,
                },
            ))?;

            let unlocked = self.unlock_achievements(member_id, member, now, &mut sink)?;

            Ok(LogSetOutcome {
                exp_awarded: award.gained,
                level: member.progression.level,
                leveled_up: award.leveled_up,
                unlocked,
            })
        })
    }

    /// Start a session for a plan today, or resume one already in progress
    pub fn start_session(
        &self,
        member_id: &str,
        plan_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome> {
        let date = now.date_naive();
        if !self.catalog.plans.contains_key(plan_id) {
            return Err(Error::not_found(format!("plan '{}'", plan_id)));
        }

        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            if let Some(existing) = member.session_for(plan_id, date) {
                return Ok(match existing.status {
                    SessionStatus::Completed => StartOutcome::AlreadyCompleted {
                        total_exp: existing.total_exp,
                    },
                    SessionStatus::InProgress => StartOutcome::Resumed {
                        recorded_sets: existing
                            .sets
                            .iter()
                            .map(|s| (s.exercise_id.clone(), s.set_number))
                            .collect(),
                    },
                });
            }
            member
                .sessions
                .push(WorkoutSession::start(plan_id, date, now));
            tracing::info!("Started session '{}' for '{}' on {}", plan_id, member_id, date);
            Ok(StartOutcome::New)
        })
    }

    /// Record a set within today's session for a plan.
    ///
    /// Experience is credited only the first time a (exercise, set) key is
    /// recorded; an overwrite corrects the rep totals without re-awarding.
    pub fn record_session_set(
        &self,
        member_id: &str,
        plan_id: &str,
        exercise_id: &str,
        set_number: u32,
        reps: u32,
        load: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<RecordSetOutcome> {
        let date = now.date_naive();
        let plan = self
            .catalog
            .plans
            .get(plan_id)
            .ok_or_else(|| Error::not_found(format!("plan '{}'", plan_id)))?;
        let exercise = self
            .catalog
            .exercises
            .get(exercise_id)
            .ok_or_else(|| Error::not_found(format!("exercise '{}'", exercise_id)))?;
        let mut sink = JsonlSink::new(&self.journal_path);

        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            let streak_multiplier = member.streak.multiplier;
            let class = member.progression.class;

            let session = member
                .session_for_mut(plan_id, date)
                .ok_or_else(|| Error::not_found(format!("session for plan '{}' on {}", plan_id, date)))?;

            let prev_reps = session
                .sets
                .iter()
                .find(|s| s.exercise_id == exercise_id && s.set_number == set_number)
                .map(|s| s.reps);

            let inserted = session.record_set(exercise_id, set_number, reps, load, now)?;

            let exp_awarded = if inserted {
                let total =
                    multiplier::resolve(streak_multiplier, class, Some(&exercise.exercise_type));
                let gained = multiplier::award_exp(exercise.base_exp, total) as u64;
                session.accrue_exp(gained);
                gained
            } else {
                0
            };

            let session_completed = session.maybe_complete(plan, now);
            let progress = session.progress(plan);
            let session_exp = session.total_exp;

            if inserted {
                member.totals.total_sets += 1;
                member.totals.total_reps += reps as u64;
                let award = ledger::apply_experience(&member.progression, exp_awarded as i64)?;
                member.progression = award.state;
            } else if let Some(prev) = prev_reps {
                // Correction: keep rep totals in line with the overwrite
                member.totals.total_reps =
                    member.totals.total_reps - prev as u64 + reps as u64;
            }

            sink.append(&ActivityRecord::new(
                member_id,
                now,
                ActivityEvent::SetLogged {
                    exercise_id: exercise_id.to_string(),
                    reps,
                    exp_awarded,
                },
            ))?;

            if session_completed {
                member.totals.workout_days.insert(date);
                sink.append(&ActivityRecord::new(
                    member_id,
                    now,
                    ActivityEvent::SessionCompleted {
                        plan_id: plan_id.to_string(),
                        total_exp: session_exp,
                    },
                ))?;
            }

            let unlocked = self.unlock_achievements(member_id, member, now, &mut sink)?;

            Ok(RecordSetOutcome {
                inserted,
                exp_awarded,
                session_completed,
                progress,
                unlocked,
            })
        })
    }

    /// Swap an exercise inside today's session only
    pub fn substitute_exercise(
        &self,
        member_id: &str,
        plan_id: &str,
        original: &str,
        replacement: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let date = now.date_naive();
        if !self.catalog.exercises.contains_key(replacement) {
            return Err(Error::not_found(format!("exercise '{}'", replacement)));
        }
        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            let session = member
                .session_for_mut(plan_id, date)
                .ok_or_else(|| Error::not_found(format!("session for plan '{}' on {}", plan_id, date)))?;
            session.substitute(original, replacement)
        })
    }

    /// Explicitly close out today's session for a plan.
    ///
    /// Sessions complete themselves when the last required set is recorded;
    /// this reports that state, and fails while required sets are missing.
    pub fn complete_session(
        &self,
        member_id: &str,
        plan_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CompleteOutcome> {
        let date = now.date_naive();
        let plan = self
            .catalog
            .plans
            .get(plan_id)
            .ok_or_else(|| Error::not_found(format!("plan '{}'", plan_id)))?;
        let mut sink = JsonlSink::new(&self.journal_path);

        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            let session = member
                .session_for_mut(plan_id, date)
                .ok_or_else(|| Error::not_found(format!("session for plan '{}' on {}", plan_id, date)))?;

            if session.status == SessionStatus::Completed {
                return Ok(CompleteOutcome {
                    completed_now: false,
                    total_exp: session.total_exp,
                    progress: session.progress(plan),
                });
            }

            let completed = session.maybe_complete(plan, now);
            let progress = session.progress(plan);
            let total_exp = session.total_exp;
            if !completed {
                return Err(Error::InvalidState(format!(
                    "session for plan '{}' has {} of {} sets recorded",
                    plan_id, progress.completed_sets, progress.total_sets
                )));
            }

            member.totals.workout_days.insert(date);
            sink.append(&ActivityRecord::new(
                member_id,
                now,
                ActivityEvent::SessionCompleted {
                    plan_id: plan_id.to_string(),
                    total_exp,
                },
            ))?;

            Ok(CompleteOutcome {
                completed_now: true,
                total_exp,
                progress,
            })
        })
    }

    /// Progress of today's session for a plan
    pub fn session_progress(
        &self,
        member_id: &str,
        plan_id: &str,
        date: NaiveDate,
    ) -> Result<SessionProgress> {
        let plan = self
            .catalog
            .plans
            .get(plan_id)
            .ok_or_else(|| Error::not_found(format!("plan '{}'", plan_id)))?;
        let state = GymState::load(&self.state_path)?;
        let member = state.member(member_id)?;
        let session = member
            .session_for(plan_id, date)
            .ok_or_else(|| Error::not_found(format!("session for plan '{}' on {}", plan_id, date)))?;
        Ok(session.progress(plan))
    }

    /// Load suggestion for the next set of an exercise in today's session
    pub fn recommend_load(
        &self,
        member_id: &str,
        plan_id: &str,
        exercise_id: &str,
        date: NaiveDate,
    ) -> Result<Option<LoadSuggestion>> {
        let plan = self
            .catalog
            .plans
            .get(plan_id)
            .ok_or_else(|| Error::not_found(format!("plan '{}'", plan_id)))?;
        let state = GymState::load(&self.state_path)?;
        let member = state.member(member_id)?;
        let session = member
            .session_for(plan_id, date)
            .ok_or_else(|| Error::not_found(format!("session for plan '{}' on {}", plan_id, date)))?;
        Ok(session.recommend_load(plan, exercise_id))
    }

    // ------------------------------------------------------------------
    // Assessment and achievements
    // ------------------------------------------------------------------

    /// Submit a full physical assessment.
    ///
    /// The overall rank replaces the stored rank unconditionally. Each
    /// discipline result is credited as its own experience award (its rank's
    /// points under the streak multiplier), floored per discipline.
    pub fn submit_assessment(
        &self,
        member_id: &str,
        scores: &[(Discipline, f64)],
        now: DateTime<Utc>,
    ) -> Result<AssessmentOutcome> {
        if scores.is_empty() {
            return Err(Error::InvalidState(
                "an assessment needs at least one discipline score".into(),
            ));
        }
        let assessment = rank::assess(scores);
        let mut sink = JsonlSink::new(&self.journal_path);

        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            let rank_before = member.progression.rank;
            member.progression.rank = assessment.overall;

            let mut exp_awarded = 0u64;
            for result in &assessment.results {
                let award = Self::award(member, result.points, None)?;
                exp_awarded += award.gained;
            }

            sink.append(&ActivityRecord::new(
                member_id,
                now,
                ActivityEvent::AssessmentRecorded {
                    total_points: assessment.total_points,
                    overall: assessment.overall,
                },
            ))?;

            let unlocked = self.unlock_achievements(member_id, member, now, &mut sink)?;

            Ok(AssessmentOutcome {
                assessment: assessment.clone(),
                rank_before,
                exp_awarded,
                unlocked,
            })
        })
    }

    /// Evaluate achievements outside any other operation
    pub fn evaluate_achievements(
        &self,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let mut sink = JsonlSink::new(&self.journal_path);
        GymState::update(&self.state_path, |state| {
            let member = state.member_mut(member_id)?;
            self.unlock_achievements(member_id, member, now, &mut sink)
        })
    }

    /// Names of achievements a member has unlocked, with unlock instants
    pub fn unlocked_achievements(
        &self,
        member_id: &str,
    ) -> Result<Vec<(String, DateTime<Utc>)>> {
        let state = GymState::load(&self.state_path)?;
        let member = state.member(member_id)?;
        Ok(member
            .unlocked
            .iter()
            .map(|(name, at)| (name.clone(), *at))
            .collect())
    }

    /// A member's journal history, oldest first
    pub fn history(&self, member_id: &str) -> Result<Vec<ActivityRecord>> {
        let state = GymState::load(&self.state_path)?;
        state.member(member_id)?;
        journal::read_member_events(&self.journal_path, member_id)
    }

    /// Top members by a metric, best first; a read-only roster fold
    pub fn leaderboard(
        &self,
        metric: LeaderboardMetric,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>> {
        let state = GymState::load(&self.state_path)?;
        let mut entries: Vec<LeaderboardEntry> = state
            .members
            .iter()
            .map(|(id, member)| LeaderboardEntry {
                member_id: id.clone(),
                display_name: member.display_name.clone(),
                value: match metric {
                    LeaderboardMetric::TotalExp => member.progression.total_exp,
                    LeaderboardMetric::TotalReps => member.totals.total_reps,
                    LeaderboardMetric::Streak => member.streak.current as u64,
                },
            })
            .collect();
        // Ties break on member id so the ordering is stable across runs
        entries.sort_by(|a, b| {
            b.value
                .cmp(&a.value)
                .then_with(|| a.member_id.cmp(&b.member_id))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Award base experience under the streak and class multipliers
    fn award(
        member: &mut MemberRecord,
        base: u32,
        activity_tag: Option<&str>,
    ) -> Result<ledger::ExperienceAward> {
        let total = multiplier::resolve(
            member.streak.multiplier,
            member.progression.class,
            activity_tag,
        );
        let gained = multiplier::award_exp(base, total);
        let award = ledger::apply_experience(&member.progression, gained)?;
        member.progression = award.state.clone();
        Ok(award)
    }

    fn snapshot(&self, member: &MemberRecord) -> StatsSnapshot {
        StatsSnapshot {
            level: member.progression.level,
            attendance_days: member.totals.attendance_days.len() as u64,
            current_streak: member.streak.current,
            workout_days: member.totals.workout_days.len() as u64,
            rank: member.progression.rank,
            total_sets: member.totals.total_sets,
            total_reps: member.totals.total_reps,
            has_class: member.progression.class.is_some(),
        }
    }

    /// Unlock every newly satisfied achievement, crediting rewards.
    ///
    /// Reward experience can raise the level and satisfy further entries,
    /// so evaluation repeats until a pass unlocks nothing.
    fn unlock_achievements(
        &self,
        member_id: &str,
        member: &mut MemberRecord,
        now: DateTime<Utc>,
        sink: &mut JsonlSink,
    ) -> Result<Vec<String>> {
        let mut all = Vec::new();
        loop {
            let snapshot = self.snapshot(member);
            let already: BTreeSet<String> = member.unlocked.keys().cloned().collect();
            let newly: Vec<(String, u32)> =
                achievements::evaluate(&snapshot, &self.achievements, &already)
                    .into_iter()
                    .map(|a| (a.name.clone(), a.exp_reward))
                    .collect();
            if newly.is_empty() {
                break;
            }
            for (name, reward) in newly {
                member.unlocked.insert(name.clone(), now);
                // Rewards are flat; multipliers apply to training, not trophies
                let award = ledger::apply_experience(&member.progression, reward as i64)?;
                member.progression = award.state;
                sink.append(&ActivityRecord::new(
                    member_id,
                    now,
                    ActivityEvent::AchievementUnlocked {
                        name: name.clone(),
                        exp_reward: reward,
                    },
                ))?;
                tracing::info!("Member '{}' unlocked '{}'", member_id, name);
                all.push(name);
            }
        }
        Ok(all)
    }
}
