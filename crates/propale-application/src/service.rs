//! Generation service: the entry points consumed by the request layer.
//!
//! `start_generation` and `handle_user_message` both return synchronously
//! after validation and schedule the actual pipeline work on fire-and-forget
//! workers; every later outcome is observable only through the session's
//! event stream.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use propale_core::{
    GenerationSettings, PropaleError, ProposalTemplate, Result, SearchTaxonomies, SessionEvent,
};
use propale_interaction::build_text_agent;
use propale_retrieval::{
    PRIOR_ART_SUFFIX, PriorArtIndex, REFERENCE_SUFFIX, ReferenceExampleIndex, SimilaritySearch,
    collection_name_for_owner,
};

use crate::orchestrator::SectionOrchestrator;
use crate::runner::PipelineRunner;
use crate::session::{SessionEventBus, SessionRegistry};

/// Outcome of a resumption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The section was awaiting feedback; a worker was scheduled.
    Accepted,
    /// The section exists in no resumable state; nothing was scheduled.
    Rejected,
}

/// Everything needed to start one generation session.
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Session id minted by the request layer; generated when absent
    pub session_id: Option<String>,
    /// Requester identity; scopes the search collections
    pub owner_email: String,
    pub template: ProposalTemplate,
    pub taxonomies: SearchTaxonomies,
    pub settings: GenerationSettings,
}

/// Front door of the generation engine.
pub struct GenerationService {
    registry: SessionRegistry,
    search: Arc<dyn SimilaritySearch>,
}

impl GenerationService {
    /// Creates the service over the shared search collaborator.
    pub fn new(search: Arc<dyn SimilaritySearch>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            search,
        }
    }

    /// Returns the session store (for embedding layers and reapers).
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Starts a generation session and returns its id.
    ///
    /// Settings and owner identity are validated here, synchronously; the
    /// sequential initial pass then runs on a background worker.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the settings or the owner identity are
    /// unusable. No session is registered in that case.
    pub async fn start_generation(&self, request: StartRequest) -> Result<String> {
        request.settings.validate()?;
        let agent = build_text_agent(&request.settings)?;

        let doc_collection = collection_name_for_owner(&request.owner_email, PRIOR_ART_SUFFIX)?;
        let prop_collection = collection_name_for_owner(&request.owner_email, REFERENCE_SUFFIX)?;

        let runner = PipelineRunner::new(
            agent,
            Arc::new(PriorArtIndex::new(self.search.clone(), doc_collection)),
            Arc::new(ReferenceExampleIndex::new(
                self.search.clone(),
                prop_collection,
            )),
        );

        let session_id = request
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let orchestrator = Arc::new(SectionOrchestrator::new(
            session_id.clone(),
            request.owner_email,
            &request.template,
            request.taxonomies,
            runner,
            SessionEventBus::new(),
        ));
        self.registry.insert(orchestrator.clone()).await;

        tracing::info!(session = %session_id, "starting generation worker");
        tokio::spawn(async move {
            orchestrator.run_initial_pass().await;
        });

        Ok(session_id)
    }

    /// Feeds a user clarification to a section awaiting feedback.
    ///
    /// Accepted resumptions run on their own worker and may overlap with any
    /// other in-flight activity for the session.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown session. A known session with a
    /// non-resumable section is `Rejected`, not an error.
    pub async fn handle_user_message(
        &self,
        session_id: &str,
        section_title: &str,
        message: &str,
    ) -> Result<ResumeOutcome> {
        let orchestrator = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| PropaleError::not_found("session", session_id))?;

        if !orchestrator
            .try_begin_resumption(section_title, message)
            .await
        {
            return Ok(ResumeOutcome::Rejected);
        }

        let title = section_title.to_string();
        tokio::spawn(async move {
            orchestrator.execute_section(&title).await;
        });
        Ok(ResumeOutcome::Accepted)
    }

    /// Attaches the (single) event consumer for a session.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown session and `Internal` when a
    /// consumer is already attached.
    pub async fn subscribe(&self, session_id: &str) -> Result<UnboundedReceiver<SessionEvent>> {
        let orchestrator = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| PropaleError::not_found("session", session_id))?;

        orchestrator
            .event_bus()
            .take_stream()
            .await
            .ok_or_else(|| PropaleError::internal("event stream already attached"))
    }

    /// Drops a session from the store (external reaper hook).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the session does not exist.
    pub async fn remove_session(&self, session_id: &str) -> Result<()> {
        if self.registry.remove(session_id).await {
            tracing::info!(session = %session_id, "session removed");
            Ok(())
        } else {
            Err(PropaleError::not_found("session", session_id))
        }
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
