//! Section dossier domain model.
//!
//! A dossier tracks one template section across its whole lifetime: the
//! pipeline runs executed for it, the clarifications supplied by the user,
//! and every accepted version of its generated text.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a section dossier.
///
/// Transitions are driven exclusively by pipeline outcomes and inbound user
/// messages: `Todo → Running → {Valid, WaitingFeedback, Error}`, and
/// `WaitingFeedback → Running` again on resumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Todo,
    Running,
    WaitingFeedback,
    Valid,
    Error,
}

impl SectionStatus {
    /// Returns the snake_case wire name, for log lines and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Running => "running",
            Self::WaitingFeedback => "waiting_feedback",
            Self::Valid => "valid",
            Self::Error => "error",
        }
    }

    /// A status that ends a pipeline run (the dossier itself persists).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Valid | Self::Error)
    }
}

impl std::fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-section record tracking pipeline status and generated output history.
///
/// Invariant: `generated_versions` is non-empty iff the status has reached
/// `Valid` at least once. The latest entry is the authoritative text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDossier {
    /// Section title, unique key within a session
    pub title: String,
    /// Section brief; user clarifications are appended, never replace it
    pub description: String,
    /// Current lifecycle status
    pub status: SectionStatus,
    /// Opaque correlation token, stable across resumptions of this section
    pub run_id: String,
    /// Append-only history of accepted texts, latest authoritative
    pub generated_versions: Vec<String>,
    /// Question raised by the writer, set only in `WaitingFeedback`
    pub pending_question: Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last transition timestamp (RFC 3339)
    pub updated_at: String,
}

impl SectionDossier {
    /// Creates a dossier in `Todo` with a fresh run correlation token.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            title: title.into(),
            description: description.into(),
            status: SectionStatus::Todo,
            run_id: Uuid::new_v4().to_string(),
            generated_versions: Vec::new(),
            pending_question: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Marks the dossier as running and clears any pending question.
    ///
    /// The run correlation token is left untouched so that a resumed run is
    /// logically a continuation of the previous one.
    pub fn begin_run(&mut self) {
        self.status = SectionStatus::Running;
        self.pending_question = None;
        self.touch();
    }

    /// Accepts a generated text: appends a version and transitions to `Valid`.
    pub fn accept_version(&mut self, text: impl Into<String>) {
        self.generated_versions.push(text.into());
        self.status = SectionStatus::Valid;
        self.pending_question = None;
        self.touch();
    }

    /// Pauses the dossier on a clarifying question from the writer.
    pub fn await_feedback(&mut self, question: impl Into<String>) {
        self.status = SectionStatus::WaitingFeedback;
        self.pending_question = Some(question.into());
        self.touch();
    }

    /// Transitions to `Error` after an unrecoverable run failure.
    pub fn fail(&mut self) {
        self.status = SectionStatus::Error;
        self.pending_question = None;
        self.touch();
    }

    /// Appends a user clarification to the section brief.
    ///
    /// Context accumulates across rounds; the original brief is never lost.
    pub fn append_clarification(&mut self, message: &str) {
        self.description
            .push_str(&format!("\n\nUser clarification: {}", message));
        self.touch();
    }

    /// Returns the latest accepted text, if any version was ever accepted.
    pub fn latest_version(&self) -> Option<&str> {
        self.generated_versions.last().map(String::as_str)
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
