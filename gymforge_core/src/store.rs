//! Gym state persistence with file locking.
//!
//! The full membership roster is one JSON document on disk. Saves are
//! atomic (temp file + rename) and writers take an exclusive lock, so two
//! concurrent commands cannot interleave partial writes.
//!
//! Unlike ephemeral caches, a corrupt state file here is member data loss,
//! so `load` surfaces parse failures as errors instead of silently
//! starting over.

use crate::{Error, ProgressionState, Result, StreakState, WorkoutSession};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// One check-in/check-out pair for a calendar day
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Visit {
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    /// Bonus experience credited at check-out, if the visit qualified
    pub exp_earned: u64,
}

/// Lifetime counters backing achievement evaluation.
///
/// Attendance and workout history are day sets, not integers, so replayed
/// or duplicated events cannot inflate the counts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LifetimeTotals {
    pub attendance_days: BTreeSet<NaiveDate>,
    pub workout_days: BTreeSet<NaiveDate>,
    pub total_sets: u64,
    pub total_reps: u64,
}

/// Everything the system knows about one member
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemberRecord {
    pub display_name: String,
    pub progression: ProgressionState,
    pub streak: StreakState,
    /// Weekdays the member plans to train; the complement are rest days
    pub training_days: HashSet<Weekday>,
    /// Achievement name -> unlock instant
    #[serde(default)]
    pub unlocked: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub totals: LifetimeTotals,
    #[serde(default)]
    pub sessions: Vec<WorkoutSession>,
    #[serde(default)]
    pub visits: BTreeMap<NaiveDate, Visit>,
}

impl MemberRecord {
    /// Fresh record for a newly enrolled member.
    ///
    /// Training days default to the full week: a new member has declared no
    /// rest days, so every gap larger than one day breaks the streak.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            progression: ProgressionState::new(),
            streak: StreakState::default(),
            training_days: all_weekdays(),
            unlocked: BTreeMap::new(),
            totals: LifetimeTotals::default(),
            sessions: Vec::new(),
            visits: BTreeMap::new(),
        }
    }

    /// Rest weekdays: the complement of the declared training days
    pub fn rest_days(&self) -> HashSet<Weekday> {
        all_weekdays()
            .into_iter()
            .filter(|d| !self.training_days.contains(d))
            .collect()
    }

    /// The session for a plan on a date, if one was started
    pub fn session_for(&self, plan_id: &str, date: NaiveDate) -> Option<&WorkoutSession> {
        self.sessions
            .iter()
            .find(|s| s.plan_id == plan_id && s.date == date)
    }

    pub fn session_for_mut(
        &mut self,
        plan_id: &str,
        date: NaiveDate,
    ) -> Option<&mut WorkoutSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.plan_id == plan_id && s.date == date)
    }
}

fn all_weekdays() -> HashSet<Weekday> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .collect()
}

/// The full on-disk roster
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GymState {
    pub members: HashMap<String, MemberRecord>,
}

impl GymState {
    /// Look up a member or fail with a typed not-found error
    pub fn member(&self, member_id: &str) -> Result<&MemberRecord> {
        self.members
            .get(member_id)
            .ok_or_else(|| Error::not_found(format!("member '{}'", member_id)))
    }

    pub fn member_mut(&mut self, member_id: &str) -> Result<&mut MemberRecord> {
        self.members
            .get_mut(member_id)
            .ok_or_else(|| Error::not_found(format!("member '{}'", member_id)))
    }

    /// Load gym state from a file with shared locking
    ///
    /// Returns default state if the file doesn't exist. A file that exists
    /// but cannot be read or parsed is an error, never silently replaced.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No state file found, starting with an empty roster");
            return Ok(Self::default());
        }

        let file = File::open(path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        let state: GymState = serde_json::from_str(&contents).map_err(|e| {
            Error::State(format!("state file {:?} is corrupt: {}", path, e))
        })?;
        tracing::debug!("Loaded {} members from {:?}", state.members.len(), path);
        Ok(state)
    }

    /// Save gym state to a file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old state file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} members to {:?}", self.members.len(), path);
        Ok(())
    }

    /// Load state, modify it, and save it back atomically
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut GymState) -> Result<T>,
    {
        let mut state = Self::load(path)?;
        let out = f(&mut state)?;
        state.save(path)?;
        Ok(out)
    }
}
