//! Per-owner collection naming.
//!
//! Every requester owns two collections in the search index, derived from
//! their identity: `<SanitizedIdentity>Doc` for prior-art documents and
//! `<SanitizedIdentity>Prop` for past proposals.

use propale_core::{PropaleError, Result};

/// Suffix of the prior-art (tender document) collection.
pub const PRIOR_ART_SUFFIX: &str = "Doc";
/// Suffix of the reference-example (past proposal) collection.
pub const REFERENCE_SUFFIX: &str = "Prop";

/// Derives a collection name from an owner identity (email) and a suffix.
///
/// Non-alphanumeric characters are stripped; the remainder is capitalized the
/// way the index expects collection names to start.
///
/// # Errors
///
/// Returns a `Config` error when nothing usable remains after sanitizing.
pub fn collection_name_for_owner(identity: &str, suffix: &str) -> Result<String> {
    let sanitized: String = identity.chars().filter(char::is_ascii_alphanumeric).collect();
    if sanitized.is_empty() {
        return Err(PropaleError::config(
            "the owner identity contains no usable characters",
        ));
    }

    let mut chars = sanitized.chars();
    let first = chars.next().map(|c| c.to_ascii_uppercase());
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();

    let mut name = String::with_capacity(sanitized.len() + suffix.len());
    if let Some(first) = first {
        name.push(first);
    }
    name.push_str(&rest);
    name.push_str(suffix);
    Ok(name)
}
