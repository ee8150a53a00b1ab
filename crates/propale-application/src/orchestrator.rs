//! Section orchestrator: one instance per generation session.
//!
//! Owns the dossier map for one request, drives pipeline executions, and
//! publishes lifecycle events. The initial pass processes sections strictly
//! in template order on one worker; each accepted resumption runs on its own
//! worker and may overlap with anything else in flight, so every dossier
//! access goes through the per-session mutex. The lock is never held across a
//! model or retrieval call.

use indexmap::IndexMap;

use tokio::sync::Mutex;

use propale_core::{
    ProposalTemplate, SearchTaxonomies, SectionDossier, SectionStatus, SessionEvent,
};

use crate::run_state::{DraftOutcome, PipelineRunState};
use crate::runner::PipelineRunner;
use crate::session::SessionEventBus;

/// Owns and drives all section dossiers of one generation request.
pub struct SectionOrchestrator {
    session_id: String,
    owner: String,
    taxonomies: SearchTaxonomies,
    /// Insertion order = template order; guarded by the per-session mutex
    dossiers: Mutex<IndexMap<String, SectionDossier>>,
    runner: PipelineRunner,
    bus: SessionEventBus,
}

impl SectionOrchestrator {
    /// Creates the session with one `Todo` dossier per named template section.
    pub fn new(
        session_id: impl Into<String>,
        owner: impl Into<String>,
        template: &ProposalTemplate,
        taxonomies: SearchTaxonomies,
        runner: PipelineRunner,
        bus: SessionEventBus,
    ) -> Self {
        let mut dossiers = IndexMap::new();
        for section in template.named_sections() {
            dossiers.insert(
                section.name.clone(),
                SectionDossier::new(section.name.clone(), section.content.clone()),
            );
        }

        let session_id = session_id.into();
        let owner = owner.into();
        tracing::info!(
            session = %session_id,
            owner = %owner,
            sections = dossiers.len(),
            "session initialized"
        );

        Self {
            session_id,
            owner,
            taxonomies,
            dossiers: Mutex::new(dossiers),
            runner,
            bus,
        }
    }

    /// Returns the session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the requester identity this session is scoped to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the session's event channel.
    pub fn event_bus(&self) -> &SessionEventBus {
        &self.bus
    }

    /// Runs every pending section to completion, in template order.
    ///
    /// Sections are deliberately not parallelized: one section's model and
    /// retrieval calls are in flight at a time during this pass. A section
    /// failure is absorbed into its dossier; the pass always continues and
    /// finishes with exactly one `generation_complete` event. A section left
    /// in `WaitingFeedback` counts as settled for the pass; it resumes later
    /// through [`Self::try_begin_resumption`].
    pub async fn run_initial_pass(&self) {
        self.bus.publish(SessionEvent::GenerationStatus {
            message: "Starting generation...".to_string(),
        });

        let titles: Vec<String> = {
            let dossiers = self.dossiers.lock().await;
            dossiers.keys().cloned().collect()
        };

        for title in titles {
            let pending = {
                let dossiers = self.dossiers.lock().await;
                dossiers
                    .get(&title)
                    .map(|d| d.status == SectionStatus::Todo)
                    .unwrap_or(false)
            };
            if pending {
                self.execute_section(&title).await;
            }
        }

        tracing::info!(session = %self.session_id, "initial pass finished");
        self.bus.publish(SessionEvent::GenerationComplete {
            message: "Generation pass finished.".to_string(),
        });
    }

    /// Validates and books a resumption for a section awaiting feedback.
    ///
    /// Returns `false` (a logged no-op, not an error) when the section is
    /// unknown or not in `WaitingFeedback` — which also rejects a second
    /// resumption racing an in-flight one, since the first moved the dossier
    /// to `Running`. On success the clarification is appended to the section
    /// brief exactly once and the dossier is marked `Running` under the lock;
    /// the caller then schedules [`Self::execute_section`].
    pub async fn try_begin_resumption(&self, section_title: &str, message: &str) -> bool {
        {
            let mut dossiers = self.dossiers.lock().await;
            let Some(dossier) = dossiers.get_mut(section_title) else {
                tracing::warn!(
                    session = %self.session_id,
                    section = section_title,
                    "message received for an unknown section"
                );
                return false;
            };
            if dossier.status != SectionStatus::WaitingFeedback {
                tracing::warn!(
                    session = %self.session_id,
                    section = section_title,
                    status = %dossier.status,
                    "message received for a section that is not awaiting feedback"
                );
                return false;
            }

            dossier.append_clarification(message);
            dossier.begin_run();
        }

        self.bus.publish(SessionEvent::GenerationStatus {
            message: format!("Thanks. Resuming drafting for '{}'...", section_title),
        });
        true
    }

    /// Runs the whole five-stage pipeline for one section and applies the
    /// terminal outcome to its dossier.
    ///
    /// Resumptions re-enter here from stage 1 with the enriched description;
    /// there is no partial-stage resume.
    pub async fn execute_section(&self, title: &str) {
        let state = {
            let mut dossiers = self.dossiers.lock().await;
            let Some(dossier) = dossiers.get_mut(title) else {
                tracing::warn!(session = %self.session_id, section = title, "unknown section");
                return;
            };
            dossier.begin_run();
            PipelineRunState::new(
                dossier.title.clone(),
                dossier.description.clone(),
                &self.taxonomies,
            )
        };

        tracing::info!(session = %self.session_id, section = title, "pipeline run starting");

        match self.runner.run(state).await {
            Ok(state) => self.settle_section(title, state.outcome).await,
            Err(err) => {
                tracing::error!(
                    session = %self.session_id,
                    section = title,
                    error = %err,
                    "pipeline run failed"
                );
                self.fail_section(title, err.to_string()).await;
            }
        }
    }

    /// Applies a finished run's outcome and publishes the matching event.
    async fn settle_section(&self, title: &str, outcome: Option<DraftOutcome>) {
        let mut dossiers = self.dossiers.lock().await;
        let Some(dossier) = dossiers.get_mut(title) else {
            return;
        };

        match outcome {
            Some(DraftOutcome::Completed { text }) => {
                dossier.accept_version(text.clone());
                tracing::info!(session = %self.session_id, section = title, "section accepted");
                self.bus.publish(SessionEvent::SectionVersion {
                    title: title.to_string(),
                    content: text,
                });
            }
            Some(DraftOutcome::NeedsClarification { question }) => {
                dossier.await_feedback(question.clone());
                tracing::info!(
                    session = %self.session_id,
                    section = title,
                    "section paused awaiting feedback"
                );
                self.bus.publish(SessionEvent::AwaitingFeedback {
                    title: title.to_string(),
                    question,
                });
            }
            None => {
                dossier.fail();
                self.bus.publish(SessionEvent::SectionError {
                    title: title.to_string(),
                    message: "pipeline finished without a terminal outcome".to_string(),
                });
            }
        }
    }

    async fn fail_section(&self, title: &str, message: String) {
        let mut dossiers = self.dossiers.lock().await;
        if let Some(dossier) = dossiers.get_mut(title) {
            dossier.fail();
        }
        self.bus.publish(SessionEvent::SectionError {
            title: title.to_string(),
            message,
        });
    }

    /// Snapshot of every dossier, in template order, for inspection.
    pub async fn snapshot(&self) -> Vec<SectionDossier> {
        let dossiers = self.dossiers.lock().await;
        dossiers.values().cloned().collect()
    }

    /// Latest accepted text per validated section, in template order.
    ///
    /// This is the knowledge base handed to the downstream conversation
    /// layer once generation settles.
    pub async fn final_contents(&self) -> IndexMap<String, String> {
        let dossiers = self.dossiers.lock().await;
        dossiers
            .values()
            .filter(|d| d.status == SectionStatus::Valid)
            .filter_map(|d| {
                d.latest_version()
                    .map(|text| (d.title.clone(), text.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
