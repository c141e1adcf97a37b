//! Merchant resolution from statement descriptions

use regex::Regex;

use crate::types::*;

/// Resolve a statement description to a merchant using naming rules
///
/// Walks the catalog in storage order and returns the id of the first
/// merchant whose naming rule matches the description (substring search,
/// not a full match). Merchants without a naming rule never match.
///
/// An invalid pattern stored against a merchant is a configuration error
/// and is surfaced immediately rather than skipped.
pub fn resolve(description: &str, catalog: &[Merchant]) -> ReconcileResult<Option<String>> {
    for merchant in catalog {
        let Some(rule) = &merchant.naming_rule else {
            continue;
        };

        let pattern = Regex::new(rule).map_err(|source| ReconcileError::InvalidNamingRule {
            merchant: merchant.name.clone(),
            source,
        })?;

        if pattern.is_match(description) {
            return Ok(Some(merchant.id.clone()));
        }
    }

    Ok(None)
}
