use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::program::Difficulty;
use crate::strategy::ExerciseType;
use crate::summary::RunSummary;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MilestoneType {
    ExercisesCompleted,
}

impl MilestoneType {
    /// Per-difficulty counter bumped alongside the overall exercise count
    pub fn difficulty_counter(&self, difficulty: Difficulty) -> &'static str {
        match self {
            MilestoneType::ExercisesCompleted => match difficulty {
                Difficulty::Beginner => "beginner_exercises_completed",
                Difficulty::Intermediate => "intermediate_exercises_completed",
                Difficulty::Advanced => "advanced_exercises_completed",
            },
        }
    }
}

/// Receives the single "exercise finished" notification of a drill
pub trait MilestoneRecorder: Send {
    fn record(&mut self, milestone: MilestoneType, difficulty: Difficulty) -> Result<()>;
}

/// Recorder that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl MilestoneRecorder for NoopRecorder {
    fn record(&mut self, _milestone: MilestoneType, _difficulty: Difficulty) -> Result<()> {
        Ok(())
    }
}

/// Recorder that keeps notifications in memory; clones share the log
#[derive(Debug, Default, Clone)]
pub struct MemoryRecorder {
    calls: Arc<Mutex<Vec<(MilestoneType, Difficulty)>>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(MilestoneType, Difficulty)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl MilestoneRecorder for MemoryRecorder {
    fn record(&mut self, milestone: MilestoneType, difficulty: Difficulty) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((milestone, difficulty));
        }
        Ok(())
    }
}

/// Milestone counters as shown on a progress screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MilestoneProgress {
    pub exercises_completed: i64,
    pub beginner_exercises_completed: i64,
    pub intermediate_exercises_completed: i64,
    pub advanced_exercises_completed: i64,
}

/// A finished drill as stored in the completion log
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    pub exercise_type: ExerciseType,
    pub difficulty: Difficulty,
    pub reps: u32,
    pub seconds: u32,
    pub completed_at: DateTime<Local>,
}

/// SQLite-backed milestone counters and completion log
#[derive(Debug)]
pub struct MilestoneDb {
    conn: Connection,
}

impl MilestoneDb {
    /// Open the database in the default state directory
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().ok_or(Error::NoDataDir)?;
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS milestones (
                milestone TEXT PRIMARY KEY,
                count INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exercise_type TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                reps INTEGER NOT NULL,
                seconds INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_completions_completed_at
                ON completions(completed_at);
            "#,
        )?;

        Ok(Self { conn })
    }

    /// Increment a milestone counter and its per-difficulty counter
    pub fn increment(&mut self, milestone: MilestoneType, difficulty: Difficulty) -> Result<()> {
        let now = Local::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        bump(&tx, &milestone.to_string(), &now)?;
        bump(&tx, milestone.difficulty_counter(difficulty), &now)?;
        tx.commit()?;
        Ok(())
    }

    pub fn count(&self, counter: &str) -> Result<i64> {
        let count = self
            .conn
            .query_row(
                "SELECT count FROM milestones WHERE milestone = ?1",
                [counter],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0))
    }

    pub fn progress(&self) -> Result<MilestoneProgress> {
        Ok(MilestoneProgress {
            exercises_completed: self.count("exercises_completed")?,
            beginner_exercises_completed: self.count("beginner_exercises_completed")?,
            intermediate_exercises_completed: self.count("intermediate_exercises_completed")?,
            advanced_exercises_completed: self.count("advanced_exercises_completed")?,
        })
    }

    /// Append a finished drill to the completion log
    pub fn log_completion(&self, exercise_type: ExerciseType, summary: &RunSummary) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO completions (exercise_type, difficulty, reps, seconds, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                exercise_type.to_string(),
                summary.difficulty.to_string(),
                summary.total_reps,
                summary.total_secs,
                Local::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent completions first
    pub fn recent_completions(&self, limit: usize) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT exercise_type, difficulty, reps, seconds, completed_at
            FROM completions
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let records = stmt.query_map([limit as i64], |row| {
            let exercise_type: String = row.get(0)?;
            let difficulty: String = row.get(1)?;
            let completed_at: String = row.get(4)?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        4,
                        "completed_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(CompletionRecord {
                exercise_type: ExerciseType::from_tag(&exercise_type),
                difficulty: parse_difficulty(&difficulty),
                reps: row.get(2)?,
                seconds: row.get(3)?,
                completed_at,
            })
        })?;

        let mut out = Vec::new();
        for record in records {
            out.push(record?);
        }
        Ok(out)
    }
}

/// Store handle shared between the engine and the host
pub type SharedMilestoneDb = Arc<Mutex<MilestoneDb>>;

impl MilestoneRecorder for SharedMilestoneDb {
    fn record(&mut self, milestone: MilestoneType, difficulty: Difficulty) -> Result<()> {
        let mut db = self.lock().map_err(|_| Error::StorePoisoned)?;
        db.increment(milestone, difficulty)
    }
}

fn bump(conn: &Connection, counter: &str, now: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO milestones (milestone, count, updated_at) VALUES (?1, 1, ?2)
        ON CONFLICT(milestone) DO UPDATE SET
            count = count + 1,
            updated_at = excluded.updated_at
        "#,
        params![counter, now],
    )?;
    Ok(())
}

fn parse_difficulty(s: &str) -> Difficulty {
    <Difficulty as clap::ValueEnum>::from_str(s, true).unwrap_or_default()
}

impl MilestoneRecorder for MilestoneDb {
    fn record(&mut self, milestone: MilestoneType, difficulty: Difficulty) -> Result<()> {
        self.increment(milestone, difficulty)
    }
}
