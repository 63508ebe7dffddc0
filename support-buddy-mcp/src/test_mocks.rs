use super::*;

use std::collections::BTreeMap;

use support_buddy_toolbox::{
    AnalysisSource, ConnectionStatus, DnsAnswer, HttpStatusClass, IssueType, KbArticleRef,
    RedirectHop, SslCertificate, TicketAnalysis,
};
use tokio::sync::Mutex;

/// Gateway that records every call as `(operation, argument)`.
#[derive(Default)]
pub struct MockToolboxGateway {
    calls: Mutex<Vec<(&'static str, String)>>,
    delay: Mutex<Option<Duration>>,
    error: Mutex<Option<String>>,
}

impl MockToolboxGateway {
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    pub async fn set_error(&self, error: Option<String>) {
        *self.error.lock().await = error;
    }

    pub async fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, operation: &'static str, argument: &str) -> ToolboxResult<()> {
        self.calls
            .lock()
            .await
            .push((operation, argument.to_string()));

        if let Some(delay) = *self.delay.lock().await {
            tokio::time::sleep(delay).await;
        }

        match self.error.lock().await.clone() {
            Some(message) => Err(ToolboxError::NetworkError(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ToolboxGateway for MockToolboxGateway {
    async fn registrar_lookup(&self, domain: &str) -> ToolboxResult<RegistrationSections> {
        self.record("registrar_lookup", domain).await?;
        Ok(registration_sections())
    }

    async fn ng_registration_report(&self, domain: &str) -> ToolboxResult<NgWhoisReport> {
        self.record("ng_registration_report", domain).await?;
        Ok(NgWhoisReport {
            domain: domain.to_string(),
            registration: registration_sections(),
            dnssec: DnssecStatus::Unsigned,
            name_servers: vec!["ns1.mockhost.ng".to_string(), "ns2.mockhost.ng".to_string()],
        })
    }

    async fn dns_lookup(&self, domain: &str, record_type: &str) -> ToolboxResult<DnsLookupResult> {
        self.record("dns_lookup", &format!("{domain} {record_type}"))
            .await?;
        Ok(DnsLookupResult {
            domain: domain.to_string(),
            record_type: record_type.to_uppercase(),
            status: 0,
            records: vec![DnsAnswer {
                name: domain.to_string(),
                record_type: 1,
                ttl: 300,
                data: "192.0.2.10".to_string(),
            }],
        })
    }

    async fn live_name_servers(&self, domain: &str) -> ToolboxResult<Vec<String>> {
        self.record("live_name_servers", domain).await?;
        Ok(vec!["ns1.mockhost.ng".to_string()])
    }

    async fn dnssec_status(&self, domain: &str) -> ToolboxResult<DnssecStatus> {
        self.record("dnssec_status", domain).await?;
        Ok(DnssecStatus::Signed)
    }

    async fn ip_lookup(&self, ip: &str) -> ToolboxResult<IpGeoInfo> {
        self.record("ip_lookup", ip).await?;
        Ok(IpGeoInfo {
            ip: ip.to_string(),
            city: Some("Lagos".to_string()),
            country: Some("Nigeria".to_string()),
            source: "mock".to_string(),
            ..IpGeoInfo::default()
        })
    }

    async fn http_status(&self, url: &str) -> ToolboxResult<HttpStatusResult> {
        self.record("http_status", url).await?;
        Ok(HttpStatusResult {
            url: url.to_string(),
            status_code: 200,
            reason: "OK".to_string(),
            class: HttpStatusClass::Success,
        })
    }

    async fn redirect_chain(&self, url: &str) -> ToolboxResult<RedirectChainResult> {
        self.record("redirect_chain", url).await?;
        Ok(redirect_chain_to(url, "https://www.example.com/"))
    }

    async fn https_redirect(&self, domain: &str) -> ToolboxResult<HttpsRedirectResult> {
        self.record("https_redirect", domain).await?;
        let start = format!("http://{domain}/");
        Ok(HttpsRedirectResult {
            domain: domain.to_string(),
            redirects_to_https: true,
            chain: redirect_chain_to(&start, &format!("https://{domain}/")),
            htaccess_snippet: None,
        })
    }

    async fn mixed_content(&self, url: &str) -> ToolboxResult<MixedContentReport> {
        self.record("mixed_content", url).await?;
        Ok(MixedContentReport {
            url: url.to_string(),
            images: vec!["http://cdn.example.com/logo.png".to_string()],
            https_count: 4,
            total_mixed: 1,
            ..MixedContentReport::default()
        })
    }

    async fn ssl_check(&self, domain: &str, port: Option<u16>) -> ToolboxResult<SslCheckResult> {
        let port = port.unwrap_or(443);
        self.record("ssl_check", &format!("{domain}:{port}")).await?;
        Ok(SslCheckResult {
            domain: domain.to_string(),
            port,
            connection_status: ConnectionStatus::Https,
            certificate: Some(SslCertificate {
                issuer_organization: Some("Let's Encrypt".to_string()),
                issuer: "CN=R11, O=Let's Encrypt, C=US".to_string(),
                common_name: Some(domain.to_string()),
                subject: format!("CN={domain}"),
                valid_from: "2025-01-01T00:00:00Z".to_string(),
                valid_to: "2025-04-01T00:00:00Z".to_string(),
                days_remaining: 42,
                is_expired: false,
                hostname_matches: true,
                san: vec![domain.to_string(), format!("www.{domain}")],
                serial_number: "03:a1".to_string(),
                chain: Vec::new(),
            }),
            error: None,
        })
    }

    async fn whois_lookup(&self, domain: &str) -> ToolboxResult<WhoisRecord> {
        self.record("whois_lookup", domain).await?;
        Ok(WhoisRecord {
            domain: domain.to_string(),
            registrar: Some("Mock Registrar Ltd".to_string()),
            creation_date: Some("2020-01-01".to_string()),
            expiration_date: Some("2030-01-01".to_string()),
            updated_date: None,
            days_until_expiry: Some(1000),
            name_servers: vec!["ns1.mockhost.ng".to_string()],
            status: vec!["ok".to_string()],
            raw: String::new(),
        })
    }

    async fn ns_authority_check(
        &self,
        domain: &str,
        expected: &[String],
    ) -> ToolboxResult<NsAuthorityReport> {
        self.record("ns_authority_check", &format!("{domain} {}", expected.join(",")))
            .await?;
        let live = vec!["ns1.mockhost.ng".to_string()];
        let missing: Vec<String> = expected
            .iter()
            .filter(|ns| !live.contains(ns))
            .cloned()
            .collect();
        Ok(NsAuthorityReport {
            domain: domain.to_string(),
            expected: expected.to_vec(),
            all_match: missing.is_empty(),
            live,
            missing,
            unexpected: Vec::new(),
        })
    }

    async fn email_auth_check(&self, domain: &str) -> ToolboxResult<EmailAuthReport> {
        self.record("email_auth_check", domain).await?;
        Ok(EmailAuthReport {
            domain: domain.to_string(),
            spf: vec!["v=spf1 include:_spf.mockhost.ng ~all".to_string()],
            dmarc: Vec::new(),
            dmarc_policy: None,
            warnings: vec![format!("No DMARC record at _dmarc.{domain}")],
        })
    }
}

pub fn registration_sections() -> RegistrationSections {
    let mut domain = BTreeMap::new();
    domain.insert("Domain Name".to_string(), "example.com.ng".to_string());
    domain.insert("Status".to_string(), "active".to_string());

    let mut sections = BTreeMap::new();
    sections.insert("Domain Information".to_string(), domain);

    RegistrationSections {
        sections,
        raw_registry_data: None,
    }
}

fn redirect_chain_to(start: &str, final_url: &str) -> RedirectChainResult {
    RedirectChainResult {
        start_url: start.to_string(),
        hops: vec![RedirectHop {
            url: start.to_string(),
            status_code: 301,
        }],
        final_url: final_url.to_string(),
        final_status: 200,
    }
}

/// AI backend double with a canned answer.
#[derive(Default)]
pub struct MockTicketAnalyzer {
    requests: Mutex<Vec<TicketRequest>>,
    delay: Mutex<Option<Duration>>,
    error: Mutex<Option<String>>,
}

impl MockTicketAnalyzer {
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    pub async fn set_error(&self, error: Option<String>) {
        *self.error.lock().await = error;
    }

    pub async fn requests(&self) -> Vec<TicketRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl TicketAnalyzer for MockTicketAnalyzer {
    async fn analyze(&self, request: &TicketRequest) -> ToolboxResult<TicketAnalysis> {
        self.requests.lock().await.push(request.clone());

        if let Some(delay) = *self.delay.lock().await {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.error.lock().await.clone() {
            return Err(ToolboxError::AiError(message));
        }

        Ok(ai_analysis())
    }
}

pub fn ai_analysis() -> TicketAnalysis {
    TicketAnalysis {
        issue_type: IssueType::Website,
        checks: vec!["Check the PHP error log".to_string()],
        actions: vec!["Disable the failing plugin".to_string()],
        response_template: "Dear [Client], we are looking into your site.".to_string(),
        kb_articles: vec![KbArticleRef {
            title: "WordPress Troubleshooting".to_string(),
            url: "https://kb.example.com/wordpress".to_string(),
        }],
        screenshot_analysis: None,
        source: AnalysisSource::Ai,
    }
}

pub fn build_server(
    toolbox: Arc<dyn ToolboxGateway>,
    analyzer: Option<Arc<dyn TicketAnalyzer>>,
    limiter: SlidingWindowLimiter,
    timeouts: ToolTimeouts,
) -> SupportBuddyMcp {
    SupportBuddyMcp::with_parts(toolbox, analyzer, limiter, timeouts)
}

/// Server with mock gateway, no AI and default limits.
pub fn offline_server() -> SupportBuddyMcp {
    build_server(
        Arc::new(MockToolboxGateway::default()),
        None,
        SlidingWindowLimiter::default(),
        ToolTimeouts::default(),
    )
}

pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

pub fn result_json(result: &CallToolResult) -> serde_json::Value {
    serde_json::from_str(&result_text(result)).unwrap()
}
