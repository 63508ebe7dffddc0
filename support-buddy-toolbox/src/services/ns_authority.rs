//! Name server authority check: are the servers a client was told to use
//! the ones the domain actually publishes?

use log::debug;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::NsAuthorityReport;

use super::dns;
use super::validate::validate_domain;

/// Compare the live NS set of `domain` against `expected`.
///
/// `domain` must already be validated.
pub async fn ns_authority_check(
    domain: &str,
    expected: &[String],
) -> ToolboxResult<NsAuthorityReport> {
    let expected = normalize_expected(expected)?;
    let live = dns::name_servers(domain).await?;
    debug!(
        "[NS] {domain}: {} expected, {} live",
        expected.len(),
        live.len()
    );
    Ok(compare(domain, expected, live))
}

/// Validate and deduplicate the expected name servers, keeping their order.
fn normalize_expected(expected: &[String]) -> ToolboxResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(expected.len());
    for server in expected.iter().filter(|s| !s.trim().is_empty()) {
        let server = validate_domain(server)?;
        if !normalized.contains(&server) {
            normalized.push(server);
        }
    }

    if normalized.is_empty() {
        return Err(ToolboxError::ValidationError(
            "At least one expected name server is required".to_string(),
        ));
    }
    Ok(normalized)
}

fn compare(domain: &str, expected: Vec<String>, live: Vec<String>) -> NsAuthorityReport {
    let missing: Vec<String> = expected
        .iter()
        .filter(|ns| !live.contains(ns))
        .cloned()
        .collect();
    let unexpected: Vec<String> = live
        .iter()
        .filter(|ns| !expected.contains(ns))
        .cloned()
        .collect();

    NsAuthorityReport {
        domain: domain.to_string(),
        all_match: missing.is_empty(),
        expected,
        live,
        missing,
        unexpected,
    }
}
