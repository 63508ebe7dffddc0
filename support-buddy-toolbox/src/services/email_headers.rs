//! Raw email header parser for delivery troubleshooting.

use crate::types::{EmailHeader, EmailHeaderReport};

/// Headers surfaced first, in display order.
pub const KEY_HEADERS: [&str; 5] = ["From", "To", "Subject", "Date", "Message-ID"];

/// Parse a pasted header block.
///
/// Lines starting with whitespace, and lines without a colon, continue the
/// previous header. Anything before the first header is skipped.
pub fn parse_email_headers(raw: &str) -> EmailHeaderReport {
    let mut headers: Vec<EmailHeader> = Vec::new();

    for line in raw.lines() {
        let is_continuation = line.starts_with([' ', '\t']);
        if !is_continuation && let Some((name, value)) = line.split_once(':') {
            headers.push(EmailHeader {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
            });
        } else if let Some(current) = headers.last_mut()
            && !line.trim().is_empty()
        {
            if !current.value.is_empty() {
                current.value.push('\n');
            }
            current.value.push_str(line.trim());
        }
    }

    let key_headers = KEY_HEADERS
        .iter()
        .filter_map(|key| {
            headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(key))
                .cloned()
        })
        .collect();

    let received_hops = headers
        .iter()
        .filter(|h| h.name.eq_ignore_ascii_case("Received"))
        .count();

    EmailHeaderReport {
        headers,
        key_headers,
        received_hops,
    }
}
