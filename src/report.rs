//! Run report
//!
//! Collects one outcome per manifest entry into succeeded, failed and skipped
//! buckets, and renders the human-readable summary printed after a run.

use crate::models::{AssetKind, UploadOutcome};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub file: String,
    pub public_id: String,
    pub kind: AssetKind,
    pub outcome: UploadOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub succeeded: Vec<ItemReport>,
    pub failed: Vec<ItemReport>,
    pub skipped: Vec<ItemReport>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, item: ItemReport) {
        match item.outcome {
            UploadOutcome::Success { .. } => self.succeeded.push(item),
            UploadOutcome::Failure { .. } => self.failed.push(item),
            UploadOutcome::Skipped { .. } => self.skipped.push(item),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    pub fn succeeded_ids(&self) -> Vec<&str> {
        self.succeeded
            .iter()
            .map(|item| item.public_id.as_str())
            .collect()
    }

    pub fn render_summary(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "UPLOAD SUMMARY");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Succeeded: {}", self.succeeded.len());
        let _ = writeln!(out, "Failed:    {}", self.failed.len());
        let _ = writeln!(out, "Skipped:   {}", self.skipped.len());

        if !self.succeeded.is_empty() {
            let _ = writeln!(out, "\nUploaded files:");
            for item in &self.succeeded {
                let _ = writeln!(out, "   {} → {}", item.file, item.public_id);
            }
        }

        if !self.failed.is_empty() {
            let _ = writeln!(out, "\nFailed files:");
            for item in &self.failed {
                if let UploadOutcome::Failure { message } = &item.outcome {
                    let _ = writeln!(out, "   {}: {}", item.file, message);
                }
            }
        }

        if !self.skipped.is_empty() {
            let _ = writeln!(out, "\nSkipped files:");
            for item in &self.skipped {
                if let UploadOutcome::Skipped { reason } = &item.outcome {
                    let _ = writeln!(out, "   {} ({})", item.file, reason);
                }
            }
        }

        let _ = write!(out, "{}", rule);
        out
    }
}
