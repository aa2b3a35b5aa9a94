//! Ordered collection of prompt entries.
//!
//! Every structural edit (resize, remove, import) replaces or removes whole
//! [`PromptEntry`] records, so text, selections, state, and result can never
//! drift out of alignment.

use crate::catalog;
use crate::error::CatalogError;
use crate::types::{EntryUpdate, GenerationEvent, GenerationResult, GenerationState, JobSpec};
use serde::Serialize;

/// One unit of work: text, model/size selection, progress, and result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptEntry {
    pub text: String,
    pub model_id: String,
    pub image_size_id: String,
    pub state: GenerationState,
    pub result: Option<GenerationResult>,
    /// A job for this entry is running
    pub in_flight: bool,
}

impl PromptEntry {
    fn blank(model_id: &str, image_size_id: &str) -> Self {
        Self::with_text(String::new(), model_id, image_size_id)
    }

    fn with_text(text: String, model_id: &str, image_size_id: &str) -> Self {
        Self {
            text,
            model_id: model_id.to_string(),
            image_size_id: image_size_id.to_string(),
            state: GenerationState::Idle,
            result: None,
            in_flight: false,
        }
    }

    /// Entries whose trimmed text is empty are never submitted.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The prompt list plus the global model/size applied to new entries.
#[derive(Debug, Clone, Serialize)]
pub struct PromptSet {
    entries: Vec<PromptEntry>,
    global_model: String,
    global_size: String,
}

impl PromptSet {
    /// Create a set holding one blank entry.
    pub fn new(global_model: &str, global_size: &str) -> Result<Self, CatalogError> {
        catalog::model_by_id(global_model)?;
        catalog::size_by_id(global_size)?;
        Ok(Self {
            entries: vec![PromptEntry::blank(global_model, global_size)],
            global_model: global_model.to_string(),
            global_size: global_size.to_string(),
        })
    }

    /// Create a set with the catalog defaults.
    pub fn with_defaults() -> Self {
        Self {
            entries: vec![PromptEntry::blank(
                catalog::DEFAULT_MODEL,
                catalog::DEFAULT_SIZE,
            )],
            global_model: catalog::DEFAULT_MODEL.to_string(),
            global_size: catalog::DEFAULT_SIZE.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PromptEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[PromptEntry] {
        &self.entries
    }

    pub fn global_model(&self) -> &str {
        &self.global_model
    }

    pub fn global_size(&self) -> &str {
        &self.global_size
    }

    // ── Structural edits ────────────────────────────────────────────

    /// Replace the collection with `count` blank entries.
    ///
    /// Changing the prompt count starts over: existing text, state, and
    /// results are discarded.
    pub fn resize(&mut self, count: usize) {
        self.entries = (0..count)
            .map(|_| PromptEntry::blank(&self.global_model, &self.global_size))
            .collect();
    }

    /// Replace the collection with one entry per non-blank prompt.
    ///
    /// Returns the number of entries loaded.
    pub fn load_prompts<I, S>(&mut self, prompts: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries = prompts
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .map(|p| PromptEntry::with_text(p, &self.global_model, &self.global_size))
            .collect();
        self.entries.len()
    }

    /// Remove one entry; later entries shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<PromptEntry, CatalogError> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    // ── Per-entry edits ─────────────────────────────────────────────

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), CatalogError> {
        self.entry_mut(index)?.text = text.into();
        Ok(())
    }

    pub fn set_model(&mut self, index: usize, model_id: &str) -> Result<(), CatalogError> {
        catalog::model_by_id(model_id)?;
        self.entry_mut(index)?.model_id = model_id.to_string();
        Ok(())
    }

    pub fn set_size(&mut self, index: usize, image_size_id: &str) -> Result<(), CatalogError> {
        catalog::size_by_id(image_size_id)?;
        self.entry_mut(index)?.image_size_id = image_size_id.to_string();
        Ok(())
    }

    /// Change the global model and apply it to every entry.
    pub fn set_global_model(&mut self, model_id: &str) -> Result<(), CatalogError> {
        catalog::model_by_id(model_id)?;
        self.global_model = model_id.to_string();
        for entry in &mut self.entries {
            entry.model_id = model_id.to_string();
        }
        Ok(())
    }

    /// Change the global size preset and apply it to every entry.
    pub fn set_global_size(&mut self, image_size_id: &str) -> Result<(), CatalogError> {
        catalog::size_by_id(image_size_id)?;
        self.global_size = image_size_id.to_string();
        for entry in &mut self.entries {
            entry.image_size_id = image_size_id.to_string();
        }
        Ok(())
    }

    // ── Generation plumbing ─────────────────────────────────────────

    /// Snapshot the entry at `index` for submission.
    pub fn job_spec(&self, index: usize) -> Result<JobSpec, CatalogError> {
        self.check_index(index)?;
        let entry = &self.entries[index];
        Ok(JobSpec {
            index,
            prompt: entry.text.clone(),
            model_id: entry.model_id.clone(),
            image_size_id: entry.image_size_id.clone(),
        })
    }

    /// Snapshots of every non-blank entry, in order.
    pub fn pending_jobs(&self) -> Vec<JobSpec> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_blank())
            .map(|(index, e)| JobSpec {
                index,
                prompt: e.text.clone(),
                model_id: e.model_id.clone(),
                image_size_id: e.image_size_id.clone(),
            })
            .collect()
    }

    /// Apply an orchestrator event to the entry it addresses.
    ///
    /// Returns `false` if the entry no longer exists.
    pub fn apply(&mut self, event: GenerationEvent) -> bool {
        let Some(entry) = self.entries.get_mut(event.index) else {
            tracing::debug!("Dropping event for removed entry {}", event.index);
            return false;
        };
        match event.update {
            EntryUpdate::InFlight(in_flight) => entry.in_flight = in_flight,
            EntryUpdate::State(state) => entry.state = state,
            EntryUpdate::Result(result) => entry.result = Some(result),
        }
        true
    }

    pub fn any_in_flight(&self) -> bool {
        self.entries.iter().any(|e| e.in_flight)
    }

    /// Finished results with their entry positions.
    pub fn results(&self) -> impl Iterator<Item = (usize, &GenerationResult)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.result.as_ref().map(|r| (i, r)))
    }

    // ── Per-field projections ───────────────────────────────────────

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn model_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.model_id.as_str()).collect()
    }

    pub fn size_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.image_size_id.as_str())
            .collect()
    }

    pub fn states(&self) -> Vec<&GenerationState> {
        self.entries.iter().map(|e| &e.state).collect()
    }

    pub fn result_slots(&self) -> Vec<Option<&GenerationResult>> {
        self.entries.iter().map(|e| e.result.as_ref()).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), CatalogError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(CatalogError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut PromptEntry, CatalogError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(CatalogError::IndexOutOfRange { index, len })
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}
