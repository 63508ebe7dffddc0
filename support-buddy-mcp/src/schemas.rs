//! MCP tool parameter schemas
//!
//! Defines the input parameter structures for all MCP tools.
//! All structs derive `Debug`, `Deserialize`, and `JsonSchema` as required by rmcp.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for tools that take a single domain name.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DomainParams {
    /// Domain name; a pasted URL is accepted and reduced to its host.
    #[schemars(description = "Domain name, e.g. example.com.ng (a URL is reduced to its host)")]
    pub domain: String,
}

/// Parameters for tools that take a single URL.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UrlParams {
    /// Absolute http(s) URL.
    #[schemars(description = "Absolute URL including protocol, e.g. https://example.com")]
    pub url: String,
}

/// Parameters for tools that take free text.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TextParams {
    #[schemars(description = "Text to process")]
    pub text: String,
}

/// Parameters for `extract_registrar_sections` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractSectionsParams {
    /// Raw HTML of a registrar look-up page.
    #[schemars(description = "Raw HTML of a registrar look-up page")]
    pub html: String,
}

/// Parameters for `classify_ticket` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassifyTicketParams {
    /// Ticket content as pasted by the agent.
    #[schemars(description = "Support ticket text, including any 'IP Address:' or 'Domain:' lines")]
    pub ticket: String,
}

/// Parameters for `analyze_ticket` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeTicketParams {
    /// Ticket content as pasted by the agent.
    #[schemars(description = "Support ticket text, including any 'IP Address:' or 'Domain:' lines")]
    pub ticket: String,

    /// Optional base64-encoded screenshot.
    #[schemars(description = "Optional base64-encoded screenshot attached to the ticket")]
    pub screenshot_base64: Option<String>,

    /// MIME type of the screenshot (default: image/png).
    #[schemars(description = "MIME type of the screenshot (default: image/png)")]
    pub screenshot_mime_type: Option<String>,
}

/// Parameters for `search_kb` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchKbParams {
    #[schemars(description = "Search terms, e.g. 'email setup', 'dns', 'ssl'")]
    pub query: String,
}

/// Parameters for `dns_lookup` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DnsLookupParams {
    /// The domain name to query.
    #[schemars(description = "The domain name to query")]
    pub domain: String,

    /// DNS record type.
    #[schemars(description = "DNS record type (A, AAAA, CNAME, MX, NS, TXT, SOA, SRV, CAA, DS)")]
    pub record_type: String,
}

/// Parameters for `ssl_check` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SslCheckParams {
    /// Domain whose certificate is inspected.
    #[schemars(description = "Domain name to inspect, e.g. example.com.ng")]
    pub domain: String,

    /// TLS port (default: 443).
    #[schemars(description = "TLS port (default: 443)")]
    pub port: Option<u16>,
}

/// Parameters for `ns_authority_check` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NsAuthorityParams {
    /// The domain to check.
    #[schemars(description = "Domain name whose published name servers are checked")]
    pub domain: String,

    /// Name servers the domain should be using.
    #[schemars(
        description = "Name servers the client was told to use, e.g. [\"ns1.host.ng\", \"ns2.host.ng\"]"
    )]
    pub expected_name_servers: Vec<String>,
}

/// Parameters for `ip_lookup` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IpLookupParams {
    /// IPv4 address to geolocate.
    #[schemars(description = "IPv4 address to geolocate, e.g. 41.203.14.2")]
    pub ip: String,
}

/// Parameters for `password_strength` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PasswordParams {
    #[schemars(description = "Password to score; it is checked locally and never sent anywhere")]
    pub password: String,
}

/// Parameters for `generate_password` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GeneratePasswordParams {
    /// Length between 8 and 32 (default: 16).
    #[schemars(description = "Password length between 8 and 32 (default: 16)")]
    pub length: Option<usize>,

    /// Include punctuation (default: true).
    #[schemars(description = "Include special characters (default: true)")]
    pub include_special: Option<bool>,
}

/// Parameters for `file_permissions` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilePermissionsParams {
    /// Numeric (`644`) or symbolic (`rw-r--r--`) mode.
    #[schemars(description = "Numeric (644) or symbolic (rw-r--r--) permission mode")]
    pub mode: String,
}

/// Parameters for `email_headers` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EmailHeadersParams {
    #[schemars(description = "Raw email headers as copied from the mail client")]
    pub headers: String,
}

/// Parameters for `validate_email` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EmailAddressParams {
    #[schemars(description = "Email address to check")]
    pub email: String,
}

/// Parameters for `convert_storage` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StorageParams {
    /// Size value.
    #[schemars(description = "Size value, e.g. 1024")]
    pub value: f64,

    /// Unit of `value`.
    #[schemars(description = "Unit of the value: Bytes, KB, MB, GB or TB (1024 based)")]
    pub unit: String,
}
