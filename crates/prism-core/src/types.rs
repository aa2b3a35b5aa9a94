//! Core data types: per-entry generation state, results, and the events the
//! orchestrator emits while a job runs.

use serde::{Deserialize, Serialize};

/// Placeholder shown while generating when the service has sent no log line.
pub const GENERATING_PLACEHOLDER: &str = "Generating...";

/// Progress of one prompt entry's generation job.
///
/// `Idle → Starting → Processing → Generating* → {Complete, Error}`.
/// A fresh generation resets the entry to `Starting`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum GenerationState {
    #[default]
    Idle,
    Starting,
    Processing,
    Generating(String),
    Complete,
    Error(String),
}

impl GenerationState {
    /// `Complete` and `Error` are terminal: nothing moves an entry out of
    /// them except a fresh generation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Complete | GenerationState::Error(_))
    }

    /// User-visible status line for this state.
    pub fn message(&self) -> &str {
        match self {
            GenerationState::Idle => "",
            GenerationState::Starting => "Initializing generation...",
            GenerationState::Processing => "Processing prompt...",
            GenerationState::Generating(message) => message,
            GenerationState::Complete => "Generation complete!",
            GenerationState::Error(message) => message,
        }
    }
}

/// A finished image, stamped with the selections in effect at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_url: String,
    pub prompt_text: String,
    pub model_id: String,
    pub image_size_id: String,
}

/// Immutable snapshot of one entry taken when its job is submitted.
///
/// Later edits to the entry's model or size do not reach a running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Position of the entry in its prompt set
    pub index: usize,
    pub prompt: String,
    pub model_id: String,
    pub image_size_id: String,
}

/// A single change to one prompt entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryUpdate {
    /// The entry's job started (`true`) or settled (`false`)
    InFlight(bool),
    State(GenerationState),
    Result(GenerationResult),
}

/// An update addressed to the entry at `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationEvent {
    pub index: usize,
    pub update: EntryUpdate,
}

impl GenerationEvent {
    pub fn state(index: usize, state: GenerationState) -> Self {
        Self {
            index,
            update: EntryUpdate::State(state),
        }
    }

    pub fn in_flight(index: usize, in_flight: bool) -> Self {
        Self {
            index,
            update: EntryUpdate::InFlight(in_flight),
        }
    }
}

/// Per-entry outcome of a batch run.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub index: usize,
    pub result: Result<GenerationResult, crate::error::GenerationError>,
}

impl EntryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary counts over a batch of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn from_outcomes(outcomes: &[EntryOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            submitted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}
