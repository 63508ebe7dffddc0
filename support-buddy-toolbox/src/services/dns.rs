//! DNS look-ups over Google's DNS-over-HTTPS JSON API.

use std::sync::LazyLock;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{DnsAnswer, DnsLookupResult, DnssecStatus};

const DOH_URL: &str = "https://dns.google/resolve";
const REQUEST_TIMEOUT_SECS: u64 = 5;

const NS_TYPE: u16 = 2;
const TXT_TYPE: u16 = 16;

/// Record types accepted by [`dns_lookup`].
pub const SUPPORTED_RECORD_TYPES: [&str; 10] = [
    "A", "AAAA", "CNAME", "MX", "NS", "TXT", "SOA", "SRV", "CAA", "DS",
];

/// Shared HTTP client for DoH queries.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
});

/// Google DoH JSON response.
#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    name: String,
    #[serde(rename = "type")]
    record_type: u16,
    #[serde(rename = "TTL", default)]
    ttl: u32,
    data: String,
}

impl From<DohAnswer> for DnsAnswer {
    fn from(answer: DohAnswer) -> Self {
        Self {
            name: answer.name.trim_end_matches('.').to_string(),
            record_type: answer.record_type,
            ttl: answer.ttl,
            data: answer.data,
        }
    }
}

async fn query(domain: &str, record_type: &str) -> ToolboxResult<DohResponse> {
    debug!("[DoH] {record_type} {domain}");

    let body = HTTP_CLIENT
        .get(DOH_URL)
        .query(&[("name", domain), ("type", record_type)])
        .send()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("DNS query failed: {e}")))?
        .text()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("Failed to read DNS response: {e}")))?;

    parse_response(&body)
}

fn parse_response(body: &str) -> ToolboxResult<DohResponse> {
    serde_json::from_str(body)
        .map_err(|e| ToolboxError::ParseError(format!("Invalid DNS response: {e}")))
}

/// Resolve records of one type.
pub async fn dns_lookup(domain: &str, record_type: &str) -> ToolboxResult<DnsLookupResult> {
    let record_type = record_type.trim().to_uppercase();
    if !SUPPORTED_RECORD_TYPES.contains(&record_type.as_str()) {
        return Err(ToolboxError::ValidationError(format!(
            "Unsupported record type: {record_type}"
        )));
    }

    let response = query(domain, &record_type).await?;

    Ok(DnsLookupResult {
        domain: domain.to_string(),
        record_type,
        status: response.status,
        records: response.answer.into_iter().map(DnsAnswer::from).collect(),
    })
}

/// Name servers currently published for the domain, lower-cased without
/// the trailing dot.
pub async fn name_servers(domain: &str) -> ToolboxResult<Vec<String>> {
    query(domain, "NS").await.map(name_servers_from)
}

/// Name servers currently published for the domain.
///
/// Never fails: an unreachable resolver yields an empty list.
pub async fn live_name_servers(domain: &str) -> Vec<String> {
    match name_servers(domain).await {
        Ok(servers) => servers,
        Err(e) => {
            warn!("[DoH] NS lookup for {domain} failed: {e}");
            Vec::new()
        }
    }
}

fn name_servers_from(response: DohResponse) -> Vec<String> {
    if response.status != 0 {
        return Vec::new();
    }
    response
        .answer
        .into_iter()
        .filter(|a| a.record_type == NS_TYPE)
        .map(|a| a.data.trim_end_matches('.').to_lowercase())
        .collect()
}

/// TXT strings published at `name`, quoted segments joined.
pub async fn txt_records(name: &str) -> ToolboxResult<Vec<String>> {
    query(name, "TXT").await.map(txt_from)
}

fn txt_from(response: DohResponse) -> Vec<String> {
    if response.status != 0 {
        return Vec::new();
    }
    response
        .answer
        .into_iter()
        .filter(|a| a.record_type == TXT_TYPE)
        .map(|a| unquote_txt(&a.data))
        .collect()
}

/// `"v=spf1 include:a" " ~all"` becomes `v=spf1 include:a ~all`. Unquoted
/// data is only trimmed.
fn unquote_txt(data: &str) -> String {
    let data = data.trim();
    if !data.starts_with('"') {
        return data.to_string();
    }
    data.split('"')
        .skip(1)
        .step_by(2)
        .collect::<String>()
}

/// DNSSEC status from a DS query. Never fails.
pub async fn dnssec_status(domain: &str) -> DnssecStatus {
    match query(domain, "DS").await {
        Ok(response) => dnssec_from(&response),
        Err(e) => {
            warn!("[DoH] DS lookup for {domain} failed: {e}");
            DnssecStatus::Unknown
        }
    }
}

fn dnssec_from(response: &DohResponse) -> DnssecStatus {
    if response.answer.is_empty() {
        DnssecStatus::Unsigned
    } else {
        DnssecStatus::Signed
    }
}
