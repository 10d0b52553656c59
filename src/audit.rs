//! Anonymous audit logging.
//!
//! Queries and feedback are never written verbatim: only a sha256 digest,
//! a timestamp, and the text length reach disk.
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};

/// Short non-reversible identifier for a piece of text.
#[must_use]
pub fn digest(text: &str) -> String {
    let hash = hex::encode(Sha256::digest(text.as_bytes()));
    hash[..16].to_string()
}

pub struct AuditLog {
    query_log: PathBuf,
    feedback_log: PathBuf,
}

impl AuditLog {
    pub fn new(query_log: PathBuf, feedback_log: PathBuf) -> Self {
        Self {
            query_log,
            feedback_log,
        }
    }

    /// Append an anonymized entry for a processed query.
    pub fn record_query(&self, query: &str) -> Result<()> {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!(
            "[{timestamp}] query {} length {} chars\n",
            digest(query),
            query.chars().count()
        );
        append(&self.query_log, &entry)
    }

    /// Append an anonymized entry for submitted feedback and return its id.
    pub fn record_feedback(&self, feedback: &str) -> Result<String> {
        let id = digest(feedback);
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!(
            "[{timestamp}] Feedback ID: {id}\nLength: {} chars\n{}\n\n",
            feedback.chars().count(),
            "-".repeat(20)
        );
        append(&self.feedback_log, &entry)?;
        Ok(id)
    }
}

fn append(path: &PathBuf, entry: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("failed to write log file {}", path.display()))?;
    Ok(())
}
