#![forbid(unsafe_code)]

//! Core domain model and business logic for the GymForge progression system.
//!
//! This crate provides:
//! - Domain types (ranks, classes, disciplines, exercises, plans)
//! - Experience ledger and multiplier stacking
//! - Rank engine, streak engine and achievement evaluator
//! - Workout session state machine
//! - Persistence (roster state, activity journal) and configuration

pub mod types;
pub mod error;
pub mod ledger;
pub mod multiplier;
pub mod rank;
pub mod streak;
pub mod achievements;
pub mod session;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod journal;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use achievements::{Achievement, AchievementCategory, StatsSnapshot};
pub use catalog::build_default_catalog;
pub use config::Config;
pub use engine::{CompleteOutcome, Engine, LeaderboardEntry, LeaderboardMetric, ProgressReport};
pub use journal::{ActivityEvent, ActivityRecord, EventSink, JsonlSink};
pub use ledger::{apply_experience, ExperienceAward, MAX_LEVEL};
pub use rank::{assess, Assessment};
pub use session::{
    LoadSuggestion, RecordedSet, SessionProgress, SessionStatus, StartOutcome, WorkoutSession,
};
pub use store::{GymState, MemberRecord};
pub use streak::advance as advance_streak;
