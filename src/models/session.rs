//! Enrichment session state
//!
//! One session per uploaded ISBN list, held in memory only; nothing
//! persists across runs. The finished workbook bytes live on the session
//! until downloaded; the merged row set itself is dropped as soon as
//! export completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// Pipeline running
    Processing,
    /// All ISBNs processed, workbook ready for download
    Completed,
    /// Export failed
    Failed,
}

/// Progress tracking for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichProgress {
    /// ISBNs processed so far
    pub completed: usize,
    /// Total ISBNs in the upload
    pub total: usize,
    /// Fraction complete in [0, 1]
    pub fraction: f64,
    /// Human-readable "Processed X/Y ISBNs"
    pub message: String,
}

/// Enrichment session (in-memory state)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSession {
    pub session_id: Uuid,
    pub state: SessionState,
    pub progress: EnrichProgress,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Exported spreadsheet, present once the session completes.
    #[serde(skip)]
    pub workbook: Option<Vec<u8>>,
}

impl EnrichmentSession {
    pub fn new(total_isbns: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Processing,
            progress: EnrichProgress {
                completed: 0,
                total: total_isbns,
                fraction: 0.0,
                message: format!("Processed 0/{} ISBNs", total_isbns),
            },
            started_at: Utc::now(),
            ended_at: None,
            workbook: None,
        }
    }

    /// Record another completed ISBN; counts only move forward.
    pub fn update_progress(&mut self, completed: usize) {
        self.progress.completed = completed;
        self.progress.fraction = if self.progress.total == 0 {
            0.0
        } else {
            completed as f64 / self.progress.total as f64
        };
        self.progress.message = format!("Processed {}/{} ISBNs", completed, self.progress.total);
    }

    /// Mark the session complete and attach the exported workbook.
    pub fn complete(&mut self, workbook: Vec<u8>) {
        self.state = SessionState::Completed;
        self.workbook = Some(workbook);
        self.ended_at = Some(Utc::now());
    }

    /// Mark the session failed.
    pub fn fail(&mut self) {
        self.state = SessionState::Failed;
        self.ended_at = Some(Utc::now());
    }
}
