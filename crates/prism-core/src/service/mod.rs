//! Generation service abstraction.
//!
//! A service is an asynchronous job system: a job is submitted, then moves
//! through queued → in progress → completed (or fails), optionally emitting
//! log lines along the way. [`fal::FalClient`] talks to the fal.ai queue API;
//! tests plug in scripted implementations.

pub(crate) mod classify;
pub mod fal;

pub use classify::{classify, truncate_message};
pub use fal::FalClient;

use crate::catalog;
use crate::config::GenerationConfig;
use crate::credential::Credential;
use crate::error::ServiceError;
use crate::types::JobSpec;
use async_trait::async_trait;
use serde::Serialize;

/// Input for one generation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequest {
    /// Model endpoint the job is submitted to (not part of the body)
    #[serde(skip)]
    pub model_id: String,
    pub prompt: String,
    pub num_images: u32,
    pub image_size: String,
    pub num_inference_steps: u32,
    pub safety_tolerance: String,
}

impl JobRequest {
    /// Build the request for a job snapshot.
    ///
    /// Always asks for exactly one image. Few-step models use their own
    /// step count from the catalog.
    pub fn for_job(spec: &JobSpec, config: &GenerationConfig) -> Self {
        let steps = catalog::find_model(&spec.model_id)
            .and_then(|m| m.inference_steps)
            .unwrap_or(config.inference_steps);
        Self {
            model_id: spec.model_id.clone(),
            prompt: spec.prompt.clone(),
            num_images: 1,
            image_size: spec.image_size_id.clone(),
            num_inference_steps: steps,
            safety_tolerance: config.safety_tolerance.clone(),
        }
    }
}

/// Identifies a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub request_id: String,
    pub status_url: String,
    pub response_url: String,
}

/// Progress of a submitted job, with the log lines seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    InQueue {
        position: Option<u32>,
        logs: Vec<String>,
    },
    InProgress {
        logs: Vec<String>,
    },
    Completed {
        logs: Vec<String>,
    },
}

impl JobStatus {
    pub fn logs(&self) -> &[String] {
        match self {
            JobStatus::InQueue { logs, .. }
            | JobStatus::InProgress { logs }
            | JobStatus::Completed { logs } => logs,
        }
    }

    /// Most recent non-blank log line, if any.
    pub fn latest_log(&self) -> Option<&str> {
        self.logs()
            .iter()
            .rev()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed { .. })
    }
}

/// Terminal payload of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobOutput {
    pub image_urls: Vec<String>,
}

/// Trait that all generation backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the orchestrator holds an `Arc<dyn GenerationService>`).
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Service name for logging (e.g., "fal").
    fn name(&self) -> &str;

    /// Submit one job and return its handle.
    async fn submit(
        &self,
        credential: &Credential,
        request: &JobRequest,
    ) -> Result<JobHandle, ServiceError>;

    /// Fetch the current status of a submitted job.
    async fn status(
        &self,
        credential: &Credential,
        handle: &JobHandle,
    ) -> Result<JobStatus, ServiceError>;

    /// Fetch the payload of a completed job.
    async fn result(
        &self,
        credential: &Credential,
        handle: &JobHandle,
    ) -> Result<JobOutput, ServiceError>;
}
