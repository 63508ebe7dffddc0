//! Input validators shared by every network tool.

use std::net::Ipv4Addr;

use regex::Regex;

use crate::error::{ToolboxError, ToolboxResult};

const MAX_DOMAIN_LEN: usize = 253;

/// Normalise a domain typed or pasted by an agent.
///
/// Accepts bare names as well as URLs: the scheme, any path, query or port
/// and a trailing dot are dropped, and the result is lower-cased. The name
/// must consist of valid labels and end in an alphabetic TLD of two or more
/// letters.
pub fn validate_domain(input: &str) -> ToolboxResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ToolboxError::ValidationError(
            "Domain name is required".to_string(),
        ));
    }

    let lowered = trimmed.to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    let host = host.trim_end_matches('.');

    if host.len() > MAX_DOMAIN_LEN {
        return Err(ToolboxError::ValidationError(format!(
            "Domain name exceeds maximum length of {MAX_DOMAIN_LEN} characters (got {})",
            host.len()
        )));
    }

    let re = Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
        .map_err(|e| ToolboxError::ValidationError(e.to_string()))?;
    if !re.is_match(host) {
        return Err(ToolboxError::ValidationError(format!(
            "Invalid domain name: {trimmed}"
        )));
    }

    Ok(host.to_string())
}

/// Strict dotted-quad IPv4 address.
pub fn validate_ip(input: &str) -> ToolboxResult<Ipv4Addr> {
    let trimmed = input.trim();
    trimmed
        .parse::<Ipv4Addr>()
        .map_err(|_| ToolboxError::ValidationError(format!("Invalid IPv4 address: {trimmed}")))
}

/// Basic `local@domain.tld` shape check. Returns the trimmed address.
pub fn validate_email(input: &str) -> ToolboxResult<String> {
    let trimmed = input.trim();
    let re = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .map_err(|e| ToolboxError::ValidationError(e.to_string()))?;
    if re.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ToolboxError::ValidationError(format!(
            "Invalid email address: {trimmed}"
        )))
    }
}
