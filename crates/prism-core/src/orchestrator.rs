//! Generation orchestrator: runs prompt entries' jobs against a
//! [`GenerationService`] and reports progress as a stream of events.
//!
//! Every run emits, per entry, `InFlight(true)`, the state transitions
//! (`Starting → Processing → Generating* → Complete | Error`), the result on
//! success, and finally `InFlight(false)`. The last event is sent from a drop
//! guard, so it also fires when the job's future is dropped or panics.
//!
//! Batches are polled concurrently inside the caller's task; nothing is
//! spawned. One entry's failure never cancels or delays another.

use crate::config::{Config, GenerationConfig};
use crate::credential::Credential;
use crate::error::{CatalogError, GenerationError, ServiceError};
use crate::prompts::PromptSet;
use crate::service::{self, FalClient, GenerationService, JobRequest, JobStatus};
use crate::types::{
    EntryOutcome, EntryUpdate, GenerationEvent, GenerationResult, GenerationState, JobSpec,
    GENERATING_PLACEHOLDER,
};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Sending half of an orchestrator event stream.
pub type EventSender = mpsc::UnboundedSender<GenerationEvent>;

/// Runs generation jobs for prompt entries.
pub struct Orchestrator {
    service: Arc<dyn GenerationService>,
    config: GenerationConfig,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn GenerationService>, config: GenerationConfig) -> Self {
        Self { service, config }
    }

    /// Build an orchestrator talking to the configured fal endpoint.
    pub fn from_config(config: &Config) -> Self {
        let client = FalClient::new(&config.service.endpoint);
        Self::new(Arc::new(client), config.generation.clone())
    }

    /// Run one entry's job end-to-end.
    ///
    /// Without a credential this fails with
    /// [`GenerationError::MissingCredential`] before awaiting anything and the
    /// service is never contacted. The result is stamped from `spec`, the
    /// snapshot taken at submission.
    pub async fn generate_one(
        &self,
        spec: &JobSpec,
        credential: Option<&Credential>,
        events: &EventSender,
    ) -> Result<GenerationResult, GenerationError> {
        let index = spec.index;
        let _settle = InFlightGuard::start(index, events);

        let Some(credential) = credential else {
            tracing::warn!("Prompt {}: no API key configured", index + 1);
            let err = GenerationError::MissingCredential;
            emit(events, index, GenerationState::Error(err.to_string()));
            return Err(err);
        };

        emit(events, index, GenerationState::Starting);

        let timeout_ms = self.config.timeout_ms;
        let outcome = match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.run_job(spec, credential, events),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(GenerationError::Failed {
                message: format!("Timed out after {timeout_ms}ms"),
            }),
        };

        match &outcome {
            Ok(result) => {
                tracing::info!("Prompt {}: image ready at {}", index + 1, result.image_url);
                let _ = events.send(GenerationEvent {
                    index,
                    update: EntryUpdate::Result(result.clone()),
                });
                emit(events, index, GenerationState::Complete);
            }
            Err(e) => {
                tracing::error!("Prompt {}: generation failed: {e}", index + 1);
                emit(events, index, GenerationState::Error(e.to_string()));
            }
        }

        outcome
    }

    /// Submit, poll until completed, and fetch the first image.
    async fn run_job(
        &self,
        spec: &JobSpec,
        credential: &Credential,
        events: &EventSender,
    ) -> Result<GenerationResult, GenerationError> {
        let index = spec.index;
        let request = JobRequest::for_job(spec, &self.config);

        emit(events, index, GenerationState::Processing);

        let handle = self
            .service
            .submit(credential, &request)
            .await
            .map_err(|e| self.classify(index, &e))?;
        tracing::debug!(
            "Prompt {}: submitted to {} as {} ({})",
            index + 1,
            self.service.name(),
            handle.request_id,
            spec.model_id
        );

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut last_message: Option<String> = None;
        loop {
            let status = self
                .service
                .status(credential, &handle)
                .await
                .map_err(|e| self.classify(index, &e))?;

            // Queued jobs only report once they log something; running jobs
            // always show a message.
            let message = match &status {
                JobStatus::Completed { .. } => break,
                JobStatus::InQueue { position, .. } => {
                    tracing::trace!("Prompt {}: queued at {:?}", index + 1, position);
                    status.latest_log()
                }
                JobStatus::InProgress { .. } => {
                    Some(status.latest_log().unwrap_or(GENERATING_PLACEHOLDER))
                }
            };
            if let Some(message) = message {
                if last_message.as_deref() != Some(message) {
                    last_message = Some(message.to_string());
                    emit(events, index, GenerationState::Generating(message.to_string()));
                }
            }

            tokio::time::sleep(poll_interval).await;
        }

        let output = self
            .service
            .result(credential, &handle)
            .await
            .map_err(|e| self.classify(index, &e))?;

        let image_url =
            output
                .image_urls
                .into_iter()
                .next()
                .ok_or_else(|| GenerationError::Failed {
                    message: "Service returned no images".to_string(),
                })?;

        Ok(GenerationResult {
            image_url,
            prompt_text: spec.prompt.clone(),
            model_id: spec.model_id.clone(),
            image_size_id: spec.image_size_id.clone(),
        })
    }

    fn classify(&self, index: usize, error: &ServiceError) -> GenerationError {
        tracing::debug!(
            "Prompt {}: {} error (status {:?}): {}",
            index + 1,
            self.service.name(),
            error.status_code,
            error.message
        );
        service::classify(error)
    }

    /// Run every non-blank job concurrently, at most `parallel` at a time.
    ///
    /// Blank prompts are skipped and produce no events. Outcomes are
    /// returned in entry order.
    pub async fn generate_all(
        &self,
        jobs: Vec<JobSpec>,
        credential: Option<&Credential>,
        events: &EventSender,
    ) -> Vec<EntryOutcome> {
        let jobs: Vec<JobSpec> = jobs
            .into_iter()
            .filter(|spec| !spec.prompt.trim().is_empty())
            .collect();
        tracing::info!("Generating {} image(s)", jobs.len());

        let mut outcomes: Vec<EntryOutcome> = stream::iter(jobs)
            .map(|spec| async move {
                let result = self.generate_one(&spec, credential, events).await;
                EntryOutcome {
                    index: spec.index,
                    result,
                }
            })
            .buffer_unordered(self.config.parallel.max(1))
            .collect()
            .await;

        outcomes.sort_by_key(|o| o.index);
        outcomes
    }

    /// Generate one entry of `set`, applying its events to the set as they
    /// arrive. `on_event` sees each event after it was applied.
    pub async fn generate_entry<F>(
        &self,
        set: &mut PromptSet,
        index: usize,
        credential: Option<&Credential>,
        on_event: F,
    ) -> Result<EntryOutcome, CatalogError>
    where
        F: FnMut(&GenerationEvent, &PromptSet),
    {
        let spec = set.job_spec(index)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let run = async move {
            let result = self.generate_one(&spec, credential, &tx).await;
            EntryOutcome { index, result }
        };

        let (outcome, ()) = tokio::join!(run, apply_events(set, rx, on_event));
        Ok(outcome)
    }

    /// Generate every non-blank entry of `set` concurrently.
    pub async fn generate_set<F>(
        &self,
        set: &mut PromptSet,
        credential: Option<&Credential>,
        on_event: F,
    ) -> Vec<EntryOutcome>
    where
        F: FnMut(&GenerationEvent, &PromptSet),
    {
        let jobs = set.pending_jobs();
        let (tx, rx) = mpsc::unbounded_channel();

        let run = async move { self.generate_all(jobs, credential, &tx).await };

        let (outcomes, ()) = tokio::join!(run, apply_events(set, rx, on_event));
        outcomes
    }
}

/// Single consumer: applies events to `set` in arrival order until every
/// sender is gone.
async fn apply_events<F>(
    set: &mut PromptSet,
    mut rx: mpsc::UnboundedReceiver<GenerationEvent>,
    mut on_event: F,
) where
    F: FnMut(&GenerationEvent, &PromptSet),
{
    while let Some(event) = rx.recv().await {
        set.apply(event.clone());
        on_event(&event, set);
    }
}

fn emit(events: &EventSender, index: usize, state: GenerationState) {
    // A closed receiver means nobody is watching; the job still runs.
    let _ = events.send(GenerationEvent::state(index, state));
}

/// Marks an entry in flight for as long as it lives.
struct InFlightGuard<'a> {
    index: usize,
    events: &'a EventSender,
}

impl<'a> InFlightGuard<'a> {
    fn start(index: usize, events: &'a EventSender) -> Self {
        let _ = events.send(GenerationEvent::in_flight(index, true));
        Self { index, events }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let _ = self
            .events
            .send(GenerationEvent::in_flight(self.index, false));
    }
}
