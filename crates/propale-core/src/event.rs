//! Session lifecycle events published to the streaming consumer.

use serde::{Deserialize, Serialize};

/// High-level events published to a session's event channel.
///
/// The serialized form is adjacently tagged as `{event, payload}` so a relay
/// can forward it verbatim as a server-sent event. The wire names (event kinds
/// and payload keys) are a frozen contract with the existing frontend, hence
/// the French renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum SessionEvent {
    /// A section reached `Valid`; carries the newly accepted text.
    #[serde(rename = "nouvelle_version_section")]
    SectionVersion {
        #[serde(rename = "titre")]
        title: String,
        #[serde(rename = "contenu")]
        content: String,
    },
    /// A section paused on a clarifying question for the user.
    #[serde(rename = "attente_feedback_utilisateur")]
    AwaitingFeedback {
        #[serde(rename = "titre")]
        title: String,
        question: String,
    },
    /// A section's run failed terminally.
    #[serde(rename = "error")]
    SectionError {
        #[serde(rename = "titre")]
        title: String,
        message: String,
    },
    /// Coarse progress notice.
    #[serde(rename = "statut_generation")]
    GenerationStatus { message: String },
    /// Published exactly once, when the initial pass is over.
    #[serde(rename = "generation_complete")]
    GenerationComplete { message: String },
}

impl SessionEvent {
    /// Returns the wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SectionVersion { .. } => "nouvelle_version_section",
            Self::AwaitingFeedback { .. } => "attente_feedback_utilisateur",
            Self::SectionError { .. } => "error",
            Self::GenerationStatus { .. } => "statut_generation",
            Self::GenerationComplete { .. } => "generation_complete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_of_section_version() {
        let event = SessionEvent::SectionVersion {
            title: "Scope".to_string(),
            content: "<p>Scope text</p>".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "nouvelle_version_section");
        assert_eq!(value["payload"]["titre"], "Scope");
        assert_eq!(value["payload"]["contenu"], "<p>Scope text</p>");
    }

    #[test]
    fn test_wire_shape_of_awaiting_feedback() {
        let event = SessionEvent::AwaitingFeedback {
            title: "Budget".to_string(),
            question: "What is the budget ceiling?".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "attente_feedback_utilisateur");
        assert_eq!(value["payload"]["titre"], "Budget");
        assert_eq!(value["payload"]["question"], "What is the budget ceiling?");
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        let events = [
            SessionEvent::GenerationStatus {
                message: "starting".to_string(),
            },
            SessionEvent::GenerationComplete {
                message: String::new(),
            },
            SessionEvent::SectionError {
                title: "Scope".to_string(),
                message: "boom".to_string(),
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.kind());
        }
    }

    #[test]
    fn test_round_trip() {
        let event = SessionEvent::GenerationComplete {
            message: "Generation pass finished.".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
