// Decision log - append-only JSONL audit trail, one routing decision per line

use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Lines, Write};
use std::path::{Path, PathBuf};

use crate::errors::EscalationError;
use crate::router::RoutingDecision;

/// Append-only decision log
#[derive(Debug, Clone)]
pub struct DecisionLog {
    path: PathBuf,
}

impl DecisionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one decision.
    ///
    /// The whole line goes out in a single `write_all` on an append-mode
    /// handle, so concurrent writers never interleave partial lines.
    pub fn append(&self, decision: &RoutingDecision) -> Result<(), EscalationError> {
        let io_err = |source: std::io::Error| EscalationError::LogWrite {
            path: self.path.clone(),
            source,
        };

        let mut line = serde_json::to_string(decision).map_err(|e| io_err(e.into()))?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).map_err(io_err)?;
        file.sync_data().map_err(io_err)?;

        Ok(())
    }

    /// Lazily read every valid decision, oldest first.
    ///
    /// Malformed lines are skipped with a warning. A missing log reads as empty.
    pub fn read_all(&self) -> Result<DecisionIter, EscalationError> {
        let lines = match File::open(&self.path) {
            Ok(file) => Some(BufReader::new(file).lines()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(EscalationError::LogRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        Ok(DecisionIter {
            path: self.path.clone(),
            lines,
            line_no: 0,
            skipped: 0,
        })
    }

    /// Decisions at or after `since`, oldest first
    pub fn read_recent(&self, since: DateTime<Utc>) -> Result<Vec<RoutingDecision>, EscalationError> {
        Ok(self
            .read_all()?
            .filter(|decision| decision.timestamp >= since)
            .collect())
    }
}

/// Iterator over the decisions in a log file. Single pass.
pub struct DecisionIter {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
    skipped: usize,
}

impl DecisionIter {
    /// Number of malformed lines skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for DecisionIter {
    type Item = RoutingDecision;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;

        loop {
            let next = lines.next()?;
            self.line_no += 1;
            let line = match next {
                Ok(line) => line,
                // Not UTF-8; the reader has already moved past it
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.skipped += 1;
                    tracing::warn!(
                        "Skipping malformed line {} in {}: {}",
                        self.line_no,
                        self.path.display(),
                        e
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Stopped reading {}: {}", self.path.display(), e);
                    self.lines = None;
                    return None;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let parsed = serde_json::from_str::<RoutingDecision>(&line)
                .map_err(|e| e.to_string())
                .and_then(|d| d.validate().map(|_| d).map_err(|e| e.to_string()));

            match parsed {
                Ok(decision) => return Some(decision),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(
                        "Skipping malformed line {} in {}: {}",
                        self.line_no,
                        self.path.display(),
                        e
                    );
                }
            }
        }
    }
}
