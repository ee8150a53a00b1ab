//! Retrieval-selection vocabularies.
//!
//! Two disjoint taxonomies drive the search strategies: a category → sub-label
//! map for prior-art (tender document) retrieval, and a flat class list for
//! reference-proposal retrieval.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The label vocabularies a session searches with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTaxonomies {
    /// Prior-art categories and their sub-labels, in presentation order
    pub prior_art_labels: IndexMap<String, Vec<String>>,
    /// Allowed classes for reference-example retrieval
    pub reference_classes: Vec<String>,
}

impl SearchTaxonomies {
    /// The deployment's standard tender/proposal catalog.
    pub fn default_catalog() -> Self {
        let mut prior_art_labels = IndexMap::new();
        prior_art_labels.insert(
            "Administratif & Processus".to_string(),
            vec![
                "avis_appel_offres",
                "definitions_abreviations",
                "calendrier_planning",
                "eligibilite_conditions",
                "clarifications_visite",
                "soumission_instructions",
                "ouverture_plis",
                "validite_offre",
                "criteres_evaluation",
                "attribution_resultats",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        prior_art_labels.insert(
            "Technique & Périmètre".to_string(),
            vec![
                "objet_perimetre",
                "exigences_techniques",
                "livrables_prestations",
                "delais_execution",
                "sla_qualite",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        prior_art_labels.insert(
            "Financier & Commercial".to_string(),
            vec![
                "bordereau_prix_bpu",
                "decomposition_prix",
                "paiement_conditions",
                "revision_variation_prix",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        prior_art_labels.insert(
            "Juridique & Contractuel".to_string(),
            vec![
                "garanties_cautions",
                "assurances",
                "penalites_sanctions",
                "propriete_confidentialite",
                "resiliation_litiges",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        prior_art_labels.insert(
            "Annexes".to_string(),
            vec![
                "formulaires_modeles",
                "attestations_certificats",
                "plans_schemas_annexes",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        prior_art_labels.insert(
            "Présentation & Contact".to_string(),
            vec![
                "presentation_entreprise",
                "references_projets",
                "contact_coordonnees",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        let reference_classes = vec![
            "entreprise_et_references",
            "besoin_client",
            "solution_proposee",
            "offre_financiere",
            "cadre_contractuel",
            "synthese",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            prior_art_labels,
            reference_classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_shape() {
        let taxonomies = SearchTaxonomies::default_catalog();
        assert_eq!(taxonomies.prior_art_labels.len(), 6);
        assert_eq!(taxonomies.reference_classes.len(), 6);
        // Insertion order is part of the contract (prompt rendering stability)
        let first = taxonomies.prior_art_labels.keys().next().unwrap();
        assert_eq!(first, "Administratif & Processus");
    }
}
