//! Stateless service facade over the network-backed toolbox operations.
//!
//! Pure helpers (classification, extraction, text utilities) are plain
//! functions re-exported from the crate root; everything here validates its
//! input and talks to an upstream service.

pub(crate) mod ai;
mod dns;
mod email_auth;
pub(crate) mod email_headers;
mod http_checks;
mod ip;
pub(crate) mod knowledge_base;
mod ns_authority;
pub(crate) mod password;
pub(crate) mod permissions;
pub(crate) mod rate_limit;
pub(crate) mod registrar_page;
mod ssl;
pub(crate) mod storage;
pub(crate) mod text;
pub(crate) mod ticket;
pub(crate) mod validate;
mod whois;

pub use dns::SUPPORTED_RECORD_TYPES;
pub use http_checks::{HTACCESS_HTTPS_REDIRECT, MAX_REDIRECTS, scan_mixed_content};
pub use ssl::DEFAULT_TLS_PORT;

use log::debug;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{
    DnsLookupResult, DnssecStatus, EmailAuthReport, HttpStatusResult, HttpsRedirectResult,
    IpGeoInfo, MixedContentReport, NgWhoisReport, NsAuthorityReport, RedirectChainResult,
    RegistrationSections, SslCheckResult, WhoisRecord,
};
use validate::{validate_domain, validate_ip};

/// Entry point for all network diagnostic operations.
///
/// All methods are stateless associated functions; call them directly on the type.
///
/// ```rust,no_run
/// use support_buddy_toolbox::ToolboxService;
/// # async fn demo() -> support_buddy_toolbox::ToolboxResult<()> {
/// let report = ToolboxService::ng_registration_report("example.com.ng").await?;
/// println!("{}", report.dnssec);
/// # Ok(())
/// # }
/// ```
pub struct ToolboxService;

impl ToolboxService {
    /// Fetch the registrar look-up page and extract its sections.
    pub async fn registrar_lookup(domain: &str) -> ToolboxResult<RegistrationSections> {
        let domain = validate_domain(domain)?;
        let html = registrar_page::fetch_registrar_page(&domain).await?;
        Ok(registrar_page::extract_sections(&html))
    }

    /// Registrar page, DNSSEC status and live name servers, fetched concurrently.
    ///
    /// Only the registrar page is required; the DNS half degrades to
    /// `DNSSEC Unknown` and an empty name server list.
    pub async fn ng_registration_report(domain: &str) -> ToolboxResult<NgWhoisReport> {
        let domain = validate_domain(domain)?;
        debug!("[Report] Building registration report for {domain}");

        let (page, dnssec, name_servers) = futures::join!(
            registrar_page::fetch_registrar_page(&domain),
            dns::dnssec_status(&domain),
            dns::live_name_servers(&domain),
        );

        Ok(NgWhoisReport {
            registration: registrar_page::extract_sections(&page?),
            domain,
            dnssec,
            name_servers,
        })
    }

    /// Resolve DNS records over HTTPS.
    ///
    /// `record_type` is one of [`SUPPORTED_RECORD_TYPES`], case-insensitive.
    pub async fn dns_lookup(domain: &str, record_type: &str) -> ToolboxResult<DnsLookupResult> {
        let domain = validate_domain(domain)?;
        dns::dns_lookup(&domain, record_type).await
    }

    /// Name servers currently published for a domain.
    pub async fn live_name_servers(domain: &str) -> ToolboxResult<Vec<String>> {
        let domain = validate_domain(domain)?;
        Ok(dns::live_name_servers(&domain).await)
    }

    /// DNSSEC signing status from a DS query.
    pub async fn dnssec_status(domain: &str) -> ToolboxResult<DnssecStatus> {
        let domain = validate_domain(domain)?;
        Ok(dns::dnssec_status(&domain).await)
    }

    /// Whether the published name servers include every expected one.
    pub async fn ns_authority_check(
        domain: &str,
        expected: &[String],
    ) -> ToolboxResult<NsAuthorityReport> {
        let domain = validate_domain(domain)?;
        ns_authority::ns_authority_check(&domain, expected).await
    }

    /// SPF and DMARC records with the problems they show.
    pub async fn email_auth_check(domain: &str) -> ToolboxResult<EmailAuthReport> {
        let domain = validate_domain(domain)?;
        email_auth::email_auth_check(&domain).await
    }

    /// Port-43 WHOIS record for any domain the server map covers.
    pub async fn whois_lookup(domain: &str) -> ToolboxResult<WhoisRecord> {
        let domain = validate_domain(domain)?;
        whois::whois_lookup(&domain).await
    }

    /// Certificate presented on `port` (default [`DEFAULT_TLS_PORT`]).
    ///
    /// Only validation can fail; connection and handshake failures are
    /// reported inside the result.
    pub async fn ssl_check(domain: &str, port: Option<u16>) -> ToolboxResult<SslCheckResult> {
        let domain = validate_domain(domain)?;
        let port = match port {
            Some(0) => {
                return Err(ToolboxError::ValidationError(
                    "Port must be between 1 and 65535".to_string(),
                ));
            }
            Some(port) => port,
            None => DEFAULT_TLS_PORT,
        };
        Ok(ssl::ssl_check(&domain, port).await)
    }

    /// Geolocate an IPv4 address.
    pub async fn ip_lookup(ip: &str) -> ToolboxResult<IpGeoInfo> {
        let ip = validate_ip(ip)?;
        ip::ip_lookup(ip).await
    }

    /// Status code and class of a URL.
    pub async fn http_status(url: &str) -> ToolboxResult<HttpStatusResult> {
        http_checks::http_status(url).await
    }

    /// Every redirect between `url` and the page that finally answers.
    pub async fn redirect_chain(url: &str) -> ToolboxResult<RedirectChainResult> {
        http_checks::redirect_chain(url).await
    }

    /// Whether `http://<domain>` is forwarded to HTTPS.
    pub async fn https_redirect(domain: &str) -> ToolboxResult<HttpsRedirectResult> {
        let domain = validate_domain(domain)?;
        http_checks::https_redirect(&domain).await
    }

    /// Insecure `http://` references on a page.
    pub async fn mixed_content(url: &str) -> ToolboxResult<MixedContentReport> {
        http_checks::mixed_content(url).await
    }
}
