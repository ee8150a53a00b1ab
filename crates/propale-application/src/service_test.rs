#[cfg(test)]
mod tests {
    use crate::service::{GenerationService, ResumeOutcome, StartRequest};
    use async_trait::async_trait;
    use propale_core::{
        GenerationSettings, Platform, ProposalTemplate, Result, SearchTaxonomies, SessionEvent,
    };
    use propale_retrieval::{SearchHit, SearchRequest, SimilaritySearch};
    use std::sync::Arc;

    /// Collaborator stub; none of these tests reach the index.
    struct IdleSearch;

    #[async_trait]
    impl SimilaritySearch for IdleSearch {
        async fn query(&self, _request: &SearchRequest) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
    }

    fn service() -> GenerationService {
        GenerationService::new(Arc::new(IdleSearch))
    }

    fn empty_request() -> StartRequest {
        StartRequest {
            session_id: None,
            owner_email: "john.doe@example.com".to_string(),
            template: ProposalTemplate::default(),
            taxonomies: SearchTaxonomies::default_catalog(),
            settings: GenerationSettings::new(Platform::Google, "test-key"),
        }
    }

    #[tokio::test]
    async fn test_start_rejects_missing_api_key_before_any_work() {
        let service = service();
        let mut request = empty_request();
        request.settings.api_key = String::new();

        let err = service.start_generation(request).await.unwrap_err();
        assert!(err.is_config());
        assert!(service.registry().session_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_rejects_unusable_owner_identity() {
        let service = service();
        let mut request = empty_request();
        request.owner_email = "@@@".to_string();

        let err = service.start_generation(request).await.unwrap_err();
        assert!(err.is_config());
        assert!(service.registry().session_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_template_completes_immediately() {
        let service = service();
        let session_id = service.start_generation(empty_request()).await.unwrap();

        let mut stream = service.subscribe(&session_id).await.unwrap();
        assert_eq!(stream.recv().await.unwrap().kind(), "statut_generation");
        let complete = stream.recv().await.unwrap();
        assert!(matches!(complete, SessionEvent::GenerationComplete { .. }));
    }

    #[tokio::test]
    async fn test_caller_supplied_session_id_is_honored() {
        let service = service();
        let mut request = empty_request();
        request.session_id = Some("session-from-http-layer".to_string());

        let session_id = service.start_generation(request).await.unwrap();
        assert_eq!(session_id, "session-from-http-layer");
        assert!(service.registry().get(&session_id).await.is_some());
    }

    #[tokio::test]
    async fn test_subscribe_is_single_consumer() {
        let service = service();
        let session_id = service.start_generation(empty_request()).await.unwrap();

        let _stream = service.subscribe(&session_id).await.unwrap();
        let err = service.subscribe(&session_id).await.unwrap_err();
        assert!(matches!(err, propale_core::PropaleError::Internal(_)));
    }

    #[tokio::test]
    async fn test_message_for_unknown_session_is_not_found() {
        let service = service();
        let err = service
            .handle_user_message("no-such-session", "Scope", "hello")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_message_for_unknown_section_is_rejected() {
        let service = service();
        let session_id = service.start_generation(empty_request()).await.unwrap();

        let outcome = service
            .handle_user_message(&session_id, "Ghost", "hello")
            .await
            .unwrap();
        assert_eq!(outcome, ResumeOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_remove_session_is_idempotent_at_the_error_level() {
        let service = service();
        let session_id = service.start_generation(empty_request()).await.unwrap();

        service.remove_session(&session_id).await.unwrap();
        let err = service.remove_session(&session_id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(service.registry().get(&session_id).await.is_none());
    }
}
