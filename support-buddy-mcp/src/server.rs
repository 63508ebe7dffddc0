//! MCP Server implementation for Support Buddy.
//!
//! Exposes the ticket triage core, the registrar tools and the agent
//! utilities as MCP tools.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::time::{Duration, timeout};
use tracing::{error, warn};

use support_buddy_toolbox::{
    DEFAULT_AI_TIMEOUT_SECS, DnsLookupResult, DnssecStatus, EmailAuthReport, GeminiTicketAnalyzer,
    HttpStatusResult, HttpsRedirectResult, IpGeoInfo, MixedContentReport, NgWhoisReport,
    NsAuthorityReport, RedirectChainResult, RegistrationSections, Screenshot,
    SlidingWindowLimiter, SslCheckResult, StorageUnit, TicketAnalyzer, TicketRequest,
    ToolboxError, ToolboxResult, ToolboxService, WhoisRecord, case_variants, classify_ticket,
    convert_storage, extract_sections, generate_password, line_tools, parse_email_headers,
    password_strength, permissions_from_numeric, permissions_from_symbolic, search_kb, text_stats,
    validate_email,
};

use crate::config::{AppConfig, Capabilities};
use crate::schemas::{
    AnalyzeTicketParams, ClassifyTicketParams, DnsLookupParams, DomainParams, EmailAddressParams,
    EmailHeadersParams, ExtractSectionsParams, FilePermissionsParams, GeneratePasswordParams,
    IpLookupParams, NsAuthorityParams, PasswordParams, SearchKbParams, SslCheckParams,
    StorageParams, TextParams, UrlParams,
};

// Timeout constants for external service calls
const REGISTRAR_LOOKUP_TIMEOUT_SECS: u64 = 20;
const REPORT_TIMEOUT_SECS: u64 = 30;
const DNS_TIMEOUT_SECS: u64 = 15;
const IP_LOOKUP_TIMEOUT_SECS: u64 = 15;
const HTTP_CHECK_TIMEOUT_SECS: u64 = 45;
const SSL_CHECK_TIMEOUT_SECS: u64 = 30;
const WHOIS_TIMEOUT_SECS: u64 = 20;
/// Headroom over the AI backend's own timeout so the backend reports first.
const ANALYZE_TICKET_GRACE_SECS: u64 = 5;

const DEFAULT_PASSWORD_LENGTH: usize = 16;
const DEFAULT_SCREENSHOT_MIME: &str = "image/png";

#[derive(Clone, Copy)]
struct ToolTimeouts {
    registrar_lookup: Duration,
    report: Duration,
    dns: Duration,
    ip_lookup: Duration,
    http_check: Duration,
    ssl_check: Duration,
    whois: Duration,
    analyze_ticket: Duration,
}

impl Default for ToolTimeouts {
    fn default() -> Self {
        Self {
            registrar_lookup: Duration::from_secs(REGISTRAR_LOOKUP_TIMEOUT_SECS),
            report: Duration::from_secs(REPORT_TIMEOUT_SECS),
            dns: Duration::from_secs(DNS_TIMEOUT_SECS),
            ip_lookup: Duration::from_secs(IP_LOOKUP_TIMEOUT_SECS),
            http_check: Duration::from_secs(HTTP_CHECK_TIMEOUT_SECS),
            ssl_check: Duration::from_secs(SSL_CHECK_TIMEOUT_SECS),
            whois: Duration::from_secs(WHOIS_TIMEOUT_SECS),
            analyze_ticket: Duration::from_secs(
                DEFAULT_AI_TIMEOUT_SECS + ANALYZE_TICKET_GRACE_SECS,
            ),
        }
    }
}

impl ToolTimeouts {
    /// Defaults with the ticket analysis budget following the AI timeout.
    fn for_ai_timeout(ai_timeout: Duration) -> Self {
        Self {
            analyze_ticket: ai_timeout + Duration::from_secs(ANALYZE_TICKET_GRACE_SECS),
            ..Self::default()
        }
    }
}

#[async_trait]
trait ToolboxGateway: Send + Sync {
    async fn registrar_lookup(&self, domain: &str) -> ToolboxResult<RegistrationSections>;

    async fn ng_registration_report(&self, domain: &str) -> ToolboxResult<NgWhoisReport>;

    async fn dns_lookup(&self, domain: &str, record_type: &str) -> ToolboxResult<DnsLookupResult>;

    async fn live_name_servers(&self, domain: &str) -> ToolboxResult<Vec<String>>;

    async fn dnssec_status(&self, domain: &str) -> ToolboxResult<DnssecStatus>;

    async fn ip_lookup(&self, ip: &str) -> ToolboxResult<IpGeoInfo>;

    async fn http_status(&self, url: &str) -> ToolboxResult<HttpStatusResult>;

    async fn redirect_chain(&self, url: &str) -> ToolboxResult<RedirectChainResult>;

    async fn https_redirect(&self, domain: &str) -> ToolboxResult<HttpsRedirectResult>;

    async fn mixed_content(&self, url: &str) -> ToolboxResult<MixedContentReport>;

    async fn ssl_check(&self, domain: &str, port: Option<u16>) -> ToolboxResult<SslCheckResult>;

    async fn whois_lookup(&self, domain: &str) -> ToolboxResult<WhoisRecord>;

    async fn ns_authority_check(
        &self,
        domain: &str,
        expected: &[String],
    ) -> ToolboxResult<NsAuthorityReport>;

    async fn email_auth_check(&self, domain: &str) -> ToolboxResult<EmailAuthReport>;
}

#[derive(Default)]
struct DefaultToolboxGateway;

#[async_trait]
impl ToolboxGateway for DefaultToolboxGateway {
    async fn registrar_lookup(&self, domain: &str) -> ToolboxResult<RegistrationSections> {
        ToolboxService::registrar_lookup(domain).await
    }

    async fn ng_registration_report(&self, domain: &str) -> ToolboxResult<NgWhoisReport> {
        ToolboxService::ng_registration_report(domain).await
    }

    async fn dns_lookup(&self, domain: &str, record_type: &str) -> ToolboxResult<DnsLookupResult> {
        ToolboxService::dns_lookup(domain, record_type).await
    }

    async fn live_name_servers(&self, domain: &str) -> ToolboxResult<Vec<String>> {
        ToolboxService::live_name_servers(domain).await
    }

    async fn dnssec_status(&self, domain: &str) -> ToolboxResult<DnssecStatus> {
        ToolboxService::dnssec_status(domain).await
    }

    async fn ip_lookup(&self, ip: &str) -> ToolboxResult<IpGeoInfo> {
        ToolboxService::ip_lookup(ip).await
    }

    async fn http_status(&self, url: &str) -> ToolboxResult<HttpStatusResult> {
        ToolboxService::http_status(url).await
    }

    async fn redirect_chain(&self, url: &str) -> ToolboxResult<RedirectChainResult> {
        ToolboxService::redirect_chain(url).await
    }

    async fn https_redirect(&self, domain: &str) -> ToolboxResult<HttpsRedirectResult> {
        ToolboxService::https_redirect(domain).await
    }

    async fn mixed_content(&self, url: &str) -> ToolboxResult<MixedContentReport> {
        ToolboxService::mixed_content(url).await
    }

    async fn ssl_check(&self, domain: &str, port: Option<u16>) -> ToolboxResult<SslCheckResult> {
        ToolboxService::ssl_check(domain, port).await
    }

    async fn whois_lookup(&self, domain: &str) -> ToolboxResult<WhoisRecord> {
        ToolboxService::whois_lookup(domain).await
    }

    async fn ns_authority_check(
        &self,
        domain: &str,
        expected: &[String],
    ) -> ToolboxResult<NsAuthorityReport> {
        ToolboxService::ns_authority_check(domain, expected).await
    }

    async fn email_auth_check(&self, domain: &str) -> ToolboxResult<EmailAuthReport> {
        ToolboxService::email_auth_check(domain).await
    }
}

/// Sanitize error messages to prevent sensitive information leakage.
///
/// Logs the full error to stderr but returns a generic message to the client.
fn sanitize_internal_error(error: impl std::fmt::Display, context: &str) -> McpError {
    error!("{context} error: {error}");
    McpError::internal_error(
        format!("{context} failed - check server logs for details"),
        None,
    )
}

fn map_toolbox_error(context: &str, error: &ToolboxError) -> McpError {
    warn!("{context} error: {error}");
    McpError::internal_error(error.to_string(), None)
}

fn json_result<T: Serialize>(value: &T, tool_name: &str) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| sanitize_internal_error(e, &format!("Serialize {tool_name} result")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Execute a toolbox operation with timeout, error mapping, and JSON serialization.
async fn run_toolbox_tool<T: Serialize>(
    duration: Duration,
    future: impl std::future::Future<Output = ToolboxResult<T>>,
    tool_name: &str,
) -> Result<CallToolResult, McpError> {
    let result = timeout(duration, future)
        .await
        .map_err(|_| McpError::internal_error(format!("{tool_name} timeout"), None))?
        .map_err(|e| map_toolbox_error(tool_name, &e))?;

    json_result(&result, tool_name)
}

fn decode_screenshot(
    data: Option<&str>,
    mime_type: Option<&str>,
) -> Result<Option<Screenshot>, McpError> {
    let Some(data) = data.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };

    let bytes = BASE64.decode(data).map_err(|e| {
        McpError::invalid_params(format!("screenshot_base64 is not valid base64: {e}"), None)
    })?;

    let mime_type = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_SCREENSHOT_MIME)
        .to_string();

    Ok(Some(Screenshot {
        mime_type,
        data: bytes,
    }))
}

/// MCP Server for Support Buddy.
///
/// Provides AI agents with ticket triage, registrar look-ups and the
/// support desk utilities through the Model Context Protocol.
#[derive(Clone)]
pub struct SupportBuddyMcp {
    /// Toolbox gateway for network utilities.
    toolbox: Arc<dyn ToolboxGateway>,
    /// AI backend, present only when an API key is configured.
    analyzer: Option<Arc<dyn TicketAnalyzer>>,
    /// Shared limiter for AI calls.
    limiter: Arc<SlidingWindowLimiter>,
    capabilities: Capabilities,
    /// Timeout configuration for toolbox calls.
    timeouts: ToolTimeouts,
    /// Tool router generated by macro.
    tool_router: ToolRouter<Self>,
}

impl SupportBuddyMcp {
    /// Build the server from loaded configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let analyzer: Option<Arc<dyn TicketAnalyzer>> = match config.api_key() {
            Some(key) => Some(Arc::new(
                GeminiTicketAnalyzer::new(key, config.gemini_model.as_str())
                    .with_http_client(config.http_client()?),
            )),
            None => None,
        };

        Ok(Self::with_parts(
            Arc::new(DefaultToolboxGateway),
            analyzer,
            config.rate_limiter(),
            ToolTimeouts::for_ai_timeout(config.ai_timeout()),
        ))
    }

    fn with_parts(
        toolbox: Arc<dyn ToolboxGateway>,
        analyzer: Option<Arc<dyn TicketAnalyzer>>,
        limiter: SlidingWindowLimiter,
        timeouts: ToolTimeouts,
    ) -> Self {
        Self {
            capabilities: Capabilities {
                ai_enabled: analyzer.is_some(),
            },
            toolbox,
            analyzer,
            limiter: Arc::new(limiter),
            timeouts,
            tool_router: Self::tool_router(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

#[tool_router]
impl SupportBuddyMcp {
    /// Extract registration sections from registrar page HTML.
    #[tool(
        description = "Extract the 'Domain Information' and 'Registrar Information' sections from registrar look-up page HTML"
    )]
    async fn extract_registrar_sections(
        &self,
        Parameters(params): Parameters<ExtractSectionsParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&extract_sections(&params.html), "Extract registrar sections")
    }

    /// Fetch and extract the registrar page for a domain.
    #[tool(
        description = "Fetch the .ng registrar look-up page for a domain and return its Domain and Registrar Information"
    )]
    async fn registrar_lookup(
        &self,
        Parameters(params): Parameters<DomainParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.registrar_lookup,
            self.toolbox.registrar_lookup(&params.domain),
            "Registrar lookup",
        )
        .await
    }

    #[tool(
        description = "Full .ng registration report: registrar sections, DNSSEC status and live name servers"
    )]
    async fn ng_registration_report(
        &self,
        Parameters(params): Parameters<DomainParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.report,
            self.toolbox.ng_registration_report(&params.domain),
            "Registration report",
        )
        .await
    }

    /// Perform DNS lookup.
    #[tool(
        description = "Resolve DNS records over HTTPS (A, AAAA, CNAME, MX, NS, TXT, SOA, SRV, CAA, DS)"
    )]
    async fn dns_lookup(
        &self,
        Parameters(params): Parameters<DnsLookupParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.dns,
            self.toolbox.dns_lookup(&params.domain, &params.record_type),
            "DNS lookup",
        )
        .await
    }

    #[tool(description = "List the name servers currently published for a domain")]
    async fn live_name_servers(
        &self,
        Parameters(params): Parameters<DomainParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.dns,
            self.toolbox.live_name_servers(&params.domain),
            "Name server lookup",
        )
        .await
    }

    #[tool(description = "Report whether a domain is DNSSEC signed (Signed, Unsigned or Unknown)")]
    async fn dnssec_status(
        &self,
        Parameters(params): Parameters<DomainParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.dns,
            self.toolbox.dnssec_status(&params.domain),
            "DNSSEC status",
        )
        .await
    }

    /// Perform IP geolocation lookup.
    #[tool(
        description = "Look up geolocation data for an IPv4 address (country, region, city, ISP, timezone)"
    )]
    async fn ip_lookup(
        &self,
        Parameters(params): Parameters<IpLookupParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.ip_lookup,
            self.toolbox.ip_lookup(&params.ip),
            "IP lookup",
        )
        .await
    }

    #[tool(description = "Fetch the HTTP status code and status class of a URL")]
    async fn http_status(
        &self,
        Parameters(params): Parameters<UrlParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.http_check,
            self.toolbox.http_status(&params.url),
            "HTTP status",
        )
        .await
    }

    #[tool(description = "Follow every redirect from a URL (up to 10 hops) and list each hop")]
    async fn redirect_chain(
        &self,
        Parameters(params): Parameters<UrlParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.http_check,
            self.toolbox.redirect_chain(&params.url),
            "Redirect chain",
        )
        .await
    }

    #[tool(
        description = "Check whether http://domain redirects to HTTPS; includes an .htaccess fix when it does not"
    )]
    async fn https_redirect(
        &self,
        Parameters(params): Parameters<DomainParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.http_check,
            self.toolbox.https_redirect(&params.domain),
            "HTTPS redirect check",
        )
        .await
    }

    #[tool(description = "Scan a page for insecure http:// images, scripts, stylesheets, frames and links")]
    async fn mixed_content(
        &self,
        Parameters(params): Parameters<UrlParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.http_check,
            self.toolbox.mixed_content(&params.url),
            "Mixed content scan",
        )
        .await
    }

    #[tool(
        description = "Inspect the TLS certificate on a domain: issuer, validity dates, days remaining, hostname match, SANs and chain"
    )]
    async fn ssl_check(
        &self,
        Parameters(params): Parameters<SslCheckParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.ssl_check,
            self.toolbox.ssl_check(&params.domain, params.port),
            "SSL check",
        )
        .await
    }

    #[tool(
        description = "Port-43 WHOIS lookup: registrar, creation and expiry dates, days until expiry, name servers and status"
    )]
    async fn whois_lookup(
        &self,
        Parameters(params): Parameters<DomainParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.whois,
            self.toolbox.whois_lookup(&params.domain),
            "WHOIS lookup",
        )
        .await
    }

    #[tool(
        description = "Compare the name servers a domain publishes with the ones it should use; lists missing and unexpected servers"
    )]
    async fn ns_authority_check(
        &self,
        Parameters(params): Parameters<NsAuthorityParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.dns,
            self.toolbox
                .ns_authority_check(&params.domain, &params.expected_name_servers),
            "Name server authority check",
        )
        .await
    }

    #[tool(
        description = "Check a domain's SPF and DMARC records and warn about missing, duplicate or permissive ones"
    )]
    async fn email_auth_check(
        &self,
        Parameters(params): Parameters<DomainParams>,
    ) -> Result<CallToolResult, McpError> {
        run_toolbox_tool(
            self.timeouts.dns,
            self.toolbox.email_auth_check(&params.domain),
            "Email authentication check",
        )
        .await
    }

    /// Classify a ticket with the offline keyword rules.
    #[tool(
        description = "Classify a support ticket with the offline keyword rules: issue type, checks, actions, reply template and KB articles"
    )]
    async fn classify_ticket(
        &self,
        Parameters(params): Parameters<ClassifyTicketParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&classify_ticket(&params.ticket), "Classify ticket")
    }

    /// Analyse a ticket with AI when available, keyword rules otherwise.
    #[tool(
        description = "Analyse a support ticket (optionally with a screenshot) using AI when configured; falls back to the keyword rules"
    )]
    async fn analyze_ticket(
        &self,
        Parameters(params): Parameters<AnalyzeTicketParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = TicketRequest {
            screenshot: decode_screenshot(
                params.screenshot_base64.as_deref(),
                params.screenshot_mime_type.as_deref(),
            )?,
            text: params.ticket,
        };

        let analysis = timeout(
            self.timeouts.analyze_ticket,
            support_buddy_toolbox::analyze_ticket(
                self.analyzer.as_deref(),
                Some(&self.limiter),
                &request,
            ),
        )
        .await
        .unwrap_or_else(|_| {
            warn!("Ticket analysis timed out, using keyword rules");
            classify_ticket(&request.text)
        });

        json_result(&analysis, "Analyze ticket")
    }

    #[tool(description = "Search the knowledge base by title and keywords (up to 10 articles)")]
    async fn search_kb(
        &self,
        Parameters(params): Parameters<SearchKbParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&search_kb(&params.query), "Knowledge base search")
    }

    #[tool(description = "Score a password (0-6) and list what would make it stronger")]
    async fn password_strength(
        &self,
        Parameters(params): Parameters<PasswordParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&password_strength(&params.password), "Password strength")
    }

    #[tool(description = "Generate a random password of 8 to 32 characters")]
    async fn generate_password(
        &self,
        Parameters(params): Parameters<GeneratePasswordParams>,
    ) -> Result<CallToolResult, McpError> {
        let length = params.length.unwrap_or(DEFAULT_PASSWORD_LENGTH);
        let password = generate_password(length, params.include_special.unwrap_or(true))
            .map_err(|e| map_toolbox_error("Generate password", &e))?;

        json_result(
            &json!({ "password": password, "length": length }),
            "Generate password",
        )
    }

    #[tool(description = "Convert text to UPPER, lower, Title and Sentence case")]
    async fn convert_case(
        &self,
        Parameters(params): Parameters<TextParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&case_variants(&params.text), "Convert case")
    }

    #[tool(description = "Trim lines, drop blanks, remove duplicates and sort")]
    async fn line_tools(
        &self,
        Parameters(params): Parameters<TextParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&line_tools(&params.text), "Line tools")
    }

    #[tool(description = "Count characters, words, lines, spaces, alphanumerics and special characters")]
    async fn text_stats(
        &self,
        Parameters(params): Parameters<TextParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&text_stats(&params.text), "Text statistics")
    }

    #[tool(
        description = "Explain a Unix permission mode given as numeric (644) or symbolic (rw-r--r--), with a security assessment"
    )]
    async fn file_permissions(
        &self,
        Parameters(params): Parameters<FilePermissionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let mode = params.mode.trim();
        let result = if mode.chars().all(|c| c.is_ascii_digit()) {
            permissions_from_numeric(mode)
        } else {
            permissions_from_symbolic(mode)
        }
        .map_err(|e| map_toolbox_error("File permissions", &e))?;

        json_result(&result, "File permissions")
    }

    #[tool(description = "Parse raw email headers and pull out From, To, Subject, Date and Message-ID")]
    async fn email_headers(
        &self,
        Parameters(params): Parameters<EmailHeadersParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&parse_email_headers(&params.headers), "Email headers")
    }

    #[tool(description = "Check whether an email address is well formed")]
    async fn validate_email(
        &self,
        Parameters(params): Parameters<EmailAddressParams>,
    ) -> Result<CallToolResult, McpError> {
        let report = match validate_email(&params.email) {
            Ok(email) => json!({ "email": email, "valid": true }),
            Err(e) => json!({ "email": params.email, "valid": false, "reason": e.to_string() }),
        };

        json_result(&report, "Validate email")
    }

    #[tool(
        description = "Convert a storage size between Bytes, KB, MB, GB and TB and classify it as a database size"
    )]
    async fn convert_storage(
        &self,
        Parameters(params): Parameters<StorageParams>,
    ) -> Result<CallToolResult, McpError> {
        let unit: StorageUnit = params
            .unit
            .parse()
            .map_err(|e: String| McpError::invalid_params(e, None))?;
        let size = convert_storage(params.value, unit)
            .map_err(|e| map_toolbox_error("Convert storage", &e))?;

        json_result(&size, "Convert storage")
    }
}

#[tool_handler]
impl ServerHandler for SupportBuddyMcp {
    fn get_info(&self) -> ServerInfo {
        let ai_note = if self.capabilities.ai_enabled {
            "analyze_ticket uses AI and falls back to the keyword rules when the AI is unavailable or rate limited."
        } else {
            "AI is not configured; analyze_ticket uses the keyword rules."
        };

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "Support Buddy MCP Server - triage web hosting support tickets and look up .ng domains. \
                 Use classify_ticket or analyze_ticket for a category, checks, actions and a reply draft, \
                 ng_registration_report or registrar_lookup for .ng registration data, \
                 whois_lookup for other TLDs, ssl_check for certificates, \
                 ns_authority_check and email_auth_check for DNS hand-over and mail delivery problems, \
                 and the DNS, HTTP, text and password tools for diagnostics. {ai_note}"
            )),
        }
    }
}

#[cfg(test)]
#[path = "test_mocks.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod test_mocks;

#[cfg(test)]
#[path = "server_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;

#[cfg(test)]
#[path = "client_integration_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod client_integration_tests;
