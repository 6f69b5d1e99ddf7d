//! Append-only activity journal.
//!
//! Every engine operation that changes member state appends one record to
//! a JSONL file with file locking for safe concurrent access. The journal
//! is an audit trail, not the source of truth; the roster in `store` is.

use crate::{Rank, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What happened, tagged for self-describing JSONL lines
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityEvent {
    CheckIn {
        streak: u32,
    },
    CheckOut {
        duration_minutes: i64,
        bonus_exp: u64,
    },
    SetLogged {
        exercise_id: String,
        reps: u32,
        exp_awarded: u64,
    },
    SessionCompleted {
        plan_id: String,
        total_exp: u64,
    },
    AssessmentRecorded {
        total_points: u32,
        overall: Rank,
    },
    AchievementUnlocked {
        name: String,
        exp_reward: u32,
    },
    ClassChosen {
        class: String,
    },
}

/// One journal line
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub member_id: String,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: ActivityEvent,
}

impl ActivityRecord {
    pub fn new(member_id: impl Into<String>, at: DateTime<Utc>, event: ActivityEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id: member_id.into(),
            at,
            event,
        }
    }
}

/// Event sink trait for persisting activity records
pub trait EventSink {
    fn append(&mut self, record: &ActivityRecord) -> Result<()>;
}

/// JSONL-based event sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl EventSink for JsonlSink {
    fn append(&mut self, record: &ActivityRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended activity {} to journal", record.id);
        Ok(())
    }
}

/// Read all activity records from a journal file
///
/// Malformed lines are logged and skipped so one bad line never hides the
/// rest of the history.
pub fn read_events(path: &Path) -> Result<Vec<ActivityRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ActivityRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse activity at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} activities from journal", records.len());
    Ok(records)
}

/// Read a member's activity records, most recent last
pub fn read_member_events(path: &Path, member_id: &str) -> Result<Vec<ActivityRecord>> {
    Ok(read_events(path)?
        .into_iter()
        .filter(|r| r.member_id == member_id)
        .collect())
}
