//! Section-generation orchestration engine.
//!
//! Ties the layers together: prompt construction, the five-stage pipeline
//! runner, the per-session orchestrator and event channel, the session store,
//! and the `GenerationService` entry points consumed by the request and
//! streaming layers.

pub mod orchestrator;
pub mod prompts;
pub mod run_state;
pub mod runner;
pub mod service;
pub mod session;

pub use orchestrator::SectionOrchestrator;
pub use run_state::{DraftOutcome, PipelineRunState, PriorArtStrategy, ReferenceStrategy};
pub use runner::PipelineRunner;
pub use service::{GenerationService, ResumeOutcome, StartRequest};
pub use session::{SessionEventBus, SessionRegistry};
