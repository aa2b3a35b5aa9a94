//! Prism Core - Batch text-to-image generation library.
//!
//! Prism manages a set of prompt entries, each with its own model and output
//! size, and fans out one generation job per entry to a queue-based image
//! service. Every entry tracks its own lifecycle and result independently.
//!
//! # Architecture
//!
//! ```text
//! PromptSet → JobSpec snapshots → Orchestrator → GenerationService (fal)
//!     ↑                                 │
//!     └──────── GenerationEvent ────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use prism_core::{Config, Credential, Orchestrator, PromptSet};
//!
//! #[tokio::main]
//! async fn main() -> prism_core::Result<()> {
//!     let config = Config::load()?;
//!     let orchestrator = Orchestrator::from_config(&config);
//!     let credential = Credential::from_config(&config.service);
//!
//!     let mut set = PromptSet::with_defaults();
//!     set.load_prompts(["a lighthouse at dusk", "a fox in snow"]);
//!
//!     let outcomes = orchestrator
//!         .generate_set(&mut set, credential.as_ref(), |_, _| {})
//!         .await;
//!     for (index, result) in set.results() {
//!         println!("{}: {}", index + 1, result.image_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod credential;
pub mod error;
pub mod export;
pub mod import;
pub mod orchestrator;
pub mod output;
pub mod prompts;
pub mod service;
pub mod types;

pub use config::Config;
pub use credential::{Credential, CredentialStore, MemoryCredentialStore};
pub use error::{
    CatalogError, ConfigError, ExportError, GenerationError, ImportError, PrismError, Result,
    ServiceError,
};
pub use export::ImageExporter;
pub use orchestrator::{EventSender, Orchestrator};
pub use output::{OutputFormat, OutputWriter, ResultRecord};
pub use prompts::{PromptEntry, PromptSet};
pub use service::{FalClient, GenerationService};
pub use types::{
    BatchStats, EntryOutcome, EntryUpdate, GenerationEvent, GenerationResult, GenerationState,
    JobSpec,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
