//! Prompt construction for the three model-facing pipeline stages.
//!
//! The JSON keys requested from the model (`sous_classes_selectionnees`,
//! `requete_texte`, `texte_genere`, ...) are a frozen contract shared with the
//! ingestion side of the index; do not rename them here.

use indexmap::IndexMap;
use serde_json::Value;

use propale_core::{Excerpt, ScoredExcerpt};

fn to_json_string<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

fn to_pretty_json_string<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Prompt for stage 1: select prior-art sub-labels and reformulate the query.
pub fn prior_art_strategist_prompt(
    section_title: &str,
    section_description: &str,
    labels: &IndexMap<String, Vec<String>>,
) -> String {
    format!(
        r#"You are an expert in semantic search. Your mission is to build the best possible JSON search strategy from the data below.
--- MANDATORY RULES ---
1.  ANALYSE the intent of the "Query" and of the "Section description", not just their words.
2.  TARGET the 1 or 2 most relevant sub-labels. Be very selective.
3.  REFORMULATE the query as one natural, semantically rich sentence. Do not simply list keywords.
4.  RETURN the JSON only, with no text before or after.
--- REQUIRED OUTPUT FORMAT ---
{{
  "sous_classes_selectionnees": ["string", "..."],
  "requete_texte_reformulee": "string"
}}
--- INPUT DATA ---
Query: "{section_title}"
Section description: "{section_description}"
Available labels:
{labels_json}
"#,
        labels_json = to_pretty_json_string(labels),
    )
}

/// Prompt for stage 3: build the reference-example query and class filter.
pub fn reference_strategist_prompt(
    section_title: &str,
    section_description: &str,
    prior_art_context: &[Excerpt],
    available_classes: &[String],
) -> String {
    format!(
        r#"You are an expert Solutions Architect. Your mission is to produce a search query and filters to find the most relevant past proposals.
Answer ONLY with valid JSON, no text before/after.

--- MANDATORY RULES ---
1.  ANALYSE the client need distilled from the tender context.
2.  FORMULATE a detailed, semantic `requete_texte` that captures what we should look for in our past proposals.
3.  CHOOSE the most relevant class(es) FROM THE EXACT LIST given in `classes_disponibles`. Never alter or invent class names.
4.  The returned JSON must be perfectly valid and follow the schema.

--- REQUIRED OUTPUT SCHEMA ---
{{
  "filtres": {{ "classes": ["string", "..."] }},
  "requete_texte": "string"
}}

--- INPUT DATA ---
- Title of the section to write: "{section_title}"
- Section description: "{section_description}"
- Client need (distilled tender context): {context_json}
- Classes available for the proposal search: {classes_json}

Return the JSON now.
"#,
        context_json = to_json_string(&prior_art_context),
        classes_json = to_json_string(&available_classes),
    )
}

/// Prompt for stage 5: write the section or raise one clarifying question.
pub fn writer_validator_prompt(
    section_title: &str,
    section_description: &str,
    prior_art_context: &[Excerpt],
    reference_examples: &[ScoredExcerpt],
) -> String {
    format!(
        r#"You are a senior writer, expert at crafting winning business proposals. Your style is clear, persuasive and focused on client benefits.
Answer ONLY with valid JSON, no text before/after.

Schema:
{{
  "status": "OK" | "CLARIFICATION_NEEDED",
  "texte_genere": string | null,
  "question": string | null,
  "manques": ["string", "..."]
}}

Writing brief:
- Section title: "{section_title}"
- Section description: "{section_description}"
- Client context (from the tender): {context_json}
- Solution examples (from our past proposals): {examples_json}

MANDATORY rules:
1.  **NEVER COPY THE CONTEXT**: SYNTHESIZE the information. Use the client context to understand the need and the solution examples as PROOF of our know-how. Turn these facts into an original, convincing argument.
2.  **ABSOLUTE FOCUS ON THE SECTION**: Write only the content for the section "{section_title}". Do not touch topics that belong to another section. Be direct and concise.
3.  **PROFESSIONAL FORMAT**: The generated text MUST be HTML. You may use sub-headings (h3-h6), paragraphs and tables where needed, with inline CSS for better presentation, without changing the substance of the text.
4.  **HANDLING GAPS**: If a critical piece of information is missing for this section, and ONLY in that case, set the status to "CLARIFICATION_NEEDED" and ask ONE precise, concise question.
5.  **FINAL GOAL**: The text must be ready to share with the client. Every sentence should reinforce that we are the best partner for this project.
"#,
        context_json = to_json_string(&prior_art_context),
        examples_json = to_json_string(&reference_examples),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use propale_core::SearchTaxonomies;

    #[test]
    fn test_prior_art_prompt_embeds_inputs() {
        let taxonomies = SearchTaxonomies::default_catalog();
        let prompt = prior_art_strategist_prompt(
            "Scope",
            "Describe the project scope.",
            &taxonomies.prior_art_labels,
        );
        assert!(prompt.contains("\"Scope\""));
        assert!(prompt.contains("sous_classes_selectionnees"));
        assert!(prompt.contains("objet_perimetre"));
    }

    #[test]
    fn test_reference_prompt_embeds_context_and_classes() {
        let context = vec![Excerpt {
            source: "Tender 42".to_string(),
            content: "needs a CRM".to_string(),
            class: "exigences_techniques".to_string(),
        }];
        let classes = vec!["solution_proposee".to_string()];
        let prompt = reference_strategist_prompt("Solution", "brief", &context, &classes);
        assert!(prompt.contains("needs a CRM"));
        assert!(prompt.contains("solution_proposee"));
        assert!(prompt.contains("requete_texte"));
    }

    #[test]
    fn test_writer_prompt_requests_the_status_key() {
        let prompt = writer_validator_prompt("Scope", "brief", &[], &[]);
        assert!(prompt.contains("\"status\""));
        assert!(prompt.contains("CLARIFICATION_NEEDED"));
        assert!(prompt.contains("texte_genere"));
    }
}
