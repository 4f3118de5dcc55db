use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ratlp_solver::OracleStatus;
use serde::Serialize;

use crate::config::PivotRule;
use crate::error::HarnessError;

/// One line of the stats log
#[derive(Debug, Clone, Serialize)]
pub struct TrialRecord {
    pub instance: String,
    pub pivot_rule: PivotRule,
    pub pivots: Option<u64>,
    pub elapsed_secs: f64,
    pub expected: OracleStatus,
    /// `pass`, `inconclusive` or `fail`
    pub verdict: &'static str,
}

/// Append-only JSON Lines sink shared by the trial workers.
#[derive(Debug)]
pub struct StatsLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl StatsLog {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| HarnessError::Log {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, record: &TrialRecord) -> Result<(), HarnessError> {
        let line = serde_json::to_string(record)?;
        // a panicking writer leaves at worst a partial line behind
        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(writer, "{}", line).map_err(|source| self.io_error(source))
    }

    pub fn finish(self) -> Result<(), HarnessError> {
        let path = self.path;
        let mut writer = self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.flush().map_err(|source| HarnessError::Log { path, source })
    }

    fn io_error(&self, source: std::io::Error) -> HarnessError {
        HarnessError::Log {
            path: self.path.clone(),
            source,
        }
    }
}
