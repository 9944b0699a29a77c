use crate::error::Result;
use crate::program::Difficulty;
use itertools::Itertools;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One line of the post-drill occurrence table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRow {
    pub label: String,
    pub count: u32,
}

/// What a drill produced, for the summary screen and the completion log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Sum of every occurrence counter
    pub total_reps: u32,
    pub total_secs: u32,
    /// Number of cycles that actually showed something
    pub emitted: u32,
    pub headers: [&'static str; 2],
    pub rows: Vec<ProgressRow>,
    pub difficulty: Difficulty,
    pub stopped_early: bool,
}

impl RunSummary {
    /// Rows ordered by count, most frequent first; ties keep table order
    pub fn rows_by_count(&self) -> Vec<&ProgressRow> {
        self.rows
            .iter()
            .sorted_by(|a, b| b.count.cmp(&a.count))
            .collect()
    }

    /// `mm:ss` rendering of the elapsed time
    pub fn elapsed_label(&self) -> String {
        format!("{:02}:{:02}", self.total_secs / 60, self.total_secs % 60)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.headers)?;
        for row in &self.rows {
            let count = row.count.to_string();
            csv.write_record([row.label.as_str(), count.as_str()])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the table into `dir` under a timestamped file name
    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let name = format!(
            "drill-{}.csv",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        let path = dir.join(name);
        self.write_csv(File::create(&path)?)?;
        Ok(path)
    }
}
