//! Proposal template domain model.

use serde::{Deserialize, Serialize};

/// One section of a proposal template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSection {
    /// Section title, used as the dossier key
    pub name: String,
    /// Section brief handed to the pipeline as the initial description
    #[serde(default)]
    pub content: String,
}

/// A proposal template: the ordered list of sections to generate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<TemplateSection>,
}

impl ProposalTemplate {
    /// Returns the sections that carry a usable (non-empty) title.
    pub fn named_sections(&self) -> impl Iterator<Item = &TemplateSection> {
        self.sections.iter().filter(|s| !s.name.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_sections_skips_blank_titles() {
        let template = ProposalTemplate {
            name: "RFP response".to_string(),
            description: String::new(),
            sections: vec![
                TemplateSection {
                    name: "Scope".to_string(),
                    content: "Project scope".to_string(),
                },
                TemplateSection {
                    name: "  ".to_string(),
                    content: "unnamed".to_string(),
                },
            ],
        };
        let names: Vec<_> = template.named_sections().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Scope"]);
    }

    #[test]
    fn test_deserialize_with_missing_content() {
        let template: ProposalTemplate = serde_json::from_str(
            r#"{"name":"Doc","sections":[{"name":"Scope"}]}"#,
        )
        .unwrap();
        assert_eq!(template.sections[0].content, "");
    }
}
