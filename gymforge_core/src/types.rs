//! Core domain types for the GymForge progression system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Ranks, classes and test disciplines
//! - Per-member progression and streak state
//! - Exercises and workout plan definitions

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Rank
// ============================================================================

/// Letter rank derived from physical-test scores, lowest to highest
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Rank {
    #[default]
    E,
    D,
    C,
    B,
    A,
    S,
    #[serde(rename = "SS")]
    Ss,
}

impl Rank {
    /// All ranks in ascending order
    pub const ALL: [Rank; 7] = [
        Rank::E,
        Rank::D,
        Rank::C,
        Rank::B,
        Rank::A,
        Rank::S,
        Rank::Ss,
    ];

    /// Position in the fixed rank ordering (E = 0 .. SS = 6)
    pub fn ordinal(self) -> u32 {
        match self {
            Rank::E => 0,
            Rank::D => 1,
            Rank::C => 2,
            Rank::B => 3,
            Rank::A => 4,
            Rank::S => 5,
            Rank::Ss => 6,
        }
    }

    /// Points a discipline result at this rank contributes to the overall score
    pub fn points(self) -> u32 {
        match self {
            Rank::E => 0,
            Rank::D => 20,
            Rank::C => 40,
            Rank::B => 70,
            Rank::A => 100,
            Rank::S => 150,
            Rank::Ss => 200,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
            Rank::Ss => "SS",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Optional specialization chosen once past the class-unlock level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Warrior,
    Ranger,
    Tank,
    Assassin,
    Mage,
}

impl ClassKind {
    pub const ALL: [ClassKind; 5] = [
        ClassKind::Warrior,
        ClassKind::Ranger,
        ClassKind::Tank,
        ClassKind::Assassin,
        ClassKind::Mage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassKind::Warrior => "warrior",
            ClassKind::Ranger => "ranger",
            ClassKind::Tank => "tank",
            ClassKind::Assassin => "assassin",
            ClassKind::Mage => "mage",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ClassKind::Warrior => "Strength and power focused",
            ClassKind::Ranger => "Endurance and cardio specialist",
            ClassKind::Tank => "High resistance and stamina",
            ClassKind::Assassin => "Speed and agility master",
            ClassKind::Mage => "Balance and technique expert",
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "warrior" => Ok(ClassKind::Warrior),
            "ranger" => Ok(ClassKind::Ranger),
            "tank" => Ok(ClassKind::Tank),
            "assassin" => Ok(ClassKind::Assassin),
            "mage" => Ok(ClassKind::Mage),
            other => Err(Error::InvalidState(format!("unknown class '{}'", other))),
        }
    }
}

// ============================================================================
// Test Disciplines
// ============================================================================

/// Physical-test discipline with a fixed ranking table
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    PushUps,
    Squats,
    SitUps,
    HighJump,
    Sprint,
}

impl Discipline {
    pub const ALL: [Discipline; 5] = [
        Discipline::PushUps,
        Discipline::Squats,
        Discipline::SitUps,
        Discipline::HighJump,
        Discipline::Sprint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Discipline::PushUps => "push-ups",
            Discipline::Squats => "squats",
            Discipline::SitUps => "sit-ups",
            Discipline::HighJump => "high-jump",
            Discipline::Sprint => "sprint",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Discipline {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "push-ups" | "pushups" => Ok(Discipline::PushUps),
            "squats" => Ok(Discipline::Squats),
            "sit-ups" | "situps" => Ok(Discipline::SitUps),
            "high-jump" | "highjump" => Ok(Discipline::HighJump),
            "sprint" => Ok(Discipline::Sprint),
            other => Err(Error::InvalidState(format!(
                "unknown discipline '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Progression and Streak State
// ============================================================================

/// Per-member leveling state, mutated by the ledger and rank engine only
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionState {
    /// Current level, 1..=100
    pub level: u32,
    /// Experience accumulated within the current level
    pub current_exp: u64,
    /// Lifetime experience, monotonic non-decreasing
    pub total_exp: u64,
    pub rank: Rank,
    pub class: Option<ClassKind>,
    pub class_unlocked_at_level: Option<u32>,
}

impl ProgressionState {
    /// Fresh state for a newly enrolled member
    pub fn new() -> Self {
        Self {
            level: 1,
            current_exp: 0,
            total_exp: 0,
            rank: Rank::E,
            class: None,
            class_unlocked_at_level: None,
        }
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Attendance streak state, mutated by the streak engine on each check-in
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StreakState {
    pub current: u32,
    /// Never decreases
    pub longest: u32,
    pub last_activity: Option<NaiveDate>,
    /// Derived from `current`, 1.0..=2.0
    pub multiplier: f64,
}

impl Default for StreakState {
    fn default() -> Self {
        Self {
            current: 0,
            longest: 0,
            last_activity: None,
            multiplier: 1.0,
        }
    }
}

// ============================================================================
// Exercises and Plans
// ============================================================================

/// An exercise definition (e.g., "Barbell Back Squat")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Free-form activity tag matched against class affinity keywords
    pub exercise_type: String,
    /// Experience awarded per logged set, before multipliers
    pub base_exp: u32,
}

/// One exercise slot within a workout plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanEntry {
    pub exercise_id: String,
    pub sets: u32,
    pub target_reps: u32,
}

/// A shared workout plan template; never mutated by sessions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub entries: Vec<PlanEntry>,
}

impl WorkoutPlan {
    /// Total number of sets required to complete the plan
    pub fn total_sets(&self) -> u32 {
        self.entries.iter().map(|e| e.sets).sum()
    }
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of exercises and workout plans
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
    pub plans: HashMap<String, WorkoutPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering_matches_ordinal() {
        for pair in Rank::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
    }

    #[test]
    fn test_rank_serializes_as_letter() {
        let json = serde_json::to_string(&Rank::Ss).unwrap();
        assert_eq!(json, "\"SS\"");
        let back: Rank = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rank::Ss);
    }

    #[test]
    fn test_discipline_parsing() {
        assert_eq!(
            "Push-Ups".parse::<Discipline>().unwrap(),
            Discipline::PushUps
        );
        assert_eq!("sprint".parse::<Discipline>().unwrap(), Discipline::Sprint);
        assert!("marathon".parse::<Discipline>().is_err());
    }

    #[test]
    fn test_class_parsing() {
        assert_eq!("Warrior".parse::<ClassKind>().unwrap(), ClassKind::Warrior);
        assert!("paladin".parse::<ClassKind>().is_err());
    }

    #[test]
    fn test_new_progression_state() {
        let state = ProgressionState::new();
        assert_eq!(state.level, 1);
        assert_eq!(state.current_exp, 0);
        assert_eq!(state.rank, Rank::E);
        assert!(state.class.is_none());
    }
}
