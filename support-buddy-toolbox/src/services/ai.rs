//! Generative-AI ticket analysis with deterministic fallback.
//!
//! The model is asked for a JSON object matching [`AiTicketPayload`]. Any
//! failure on that path (no backend, rate limit, transport error, malformed
//! or incomplete JSON) falls back to [`classify_ticket`] on the same text, so
//! callers always receive a [`TicketAnalysis`].

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::knowledge_base::articles_for_terms;
use super::rate_limit::{RateLimitResult, SlidingWindowLimiter};
use super::ticket::{TicketFields, classify_ticket, rule_for};
use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{AnalysisSource, IssueType, TicketAnalysis};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default per-request timeout for the Gemini backend. Screenshot analyses
/// regularly take tens of seconds.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

/// Shared HTTP client for AI requests.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
});

const ANALYSIS_PROMPT: &str = r#"You are a technical support analyst for a web hosting company.
Analyse the support ticket below (and the screenshot, if one is attached) and answer with a single JSON object, no prose, using exactly these keys:

{
  "issue_type": one of "cPanel Access Issue", "Email Issue", "Domain & DNS Issue", "Website Issue", "SSL Certificate Issue", "General Support",
  "checks": [short diagnostic steps, most important first],
  "actions": [short recommended actions, most important first],
  "response_template": "a professional reply to the client; write [Client] where the client name is unknown",
  "kb_topics": [short topic keywords such as "email", "dns", "ssl", "cpanel", "wordpress"],
  "screenshot_analysis": "what the screenshot shows, or omit this key when there is no screenshot"
}"#;

/// An image attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Input for a ticket analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketRequest {
    /// Free-text ticket content.
    pub text: String,
    /// Optional screenshot.
    pub screenshot: Option<Screenshot>,
}

impl TicketRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            screenshot: None,
        }
    }
}

/// JSON object the model is asked to return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiTicketPayload {
    pub issue_type: String,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub response_template: String,
    #[serde(default)]
    pub kb_topics: Vec<String>,
    #[serde(default)]
    pub screenshot_analysis: Option<String>,
}

/// A backend able to analyse tickets.
#[async_trait]
pub trait TicketAnalyzer: Send + Sync {
    /// Analyse a ticket. Errors trigger the keyword fallback.
    async fn analyze(&self, request: &TicketRequest) -> ToolboxResult<TicketAnalysis>;
}

/// Analyse a ticket with the AI backend when available and permitted,
/// otherwise with the keyword classifier.
pub async fn analyze_ticket(
    analyzer: Option<&dyn TicketAnalyzer>,
    limiter: Option<&SlidingWindowLimiter>,
    request: &TicketRequest,
) -> TicketAnalysis {
    let Some(analyzer) = analyzer else {
        debug!("[AI] No analyzer configured, using keyword rules");
        return classify_ticket(&request.text);
    };

    if let Some(limiter) = limiter
        && let RateLimitResult::Limited { retry_after } = limiter.try_acquire()
    {
        warn!(
            "[AI] Rate limit reached, retry in {}s; using keyword rules",
            retry_after.as_secs()
        );
        return classify_ticket(&request.text);
    }

    match analyzer.analyze(request).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("[AI] Analysis failed, using keyword rules: {e}");
            classify_ticket(&request.text)
        }
    }
}

/// Turn raw model output into a [`TicketAnalysis`].
///
/// Accepts a bare JSON object or one wrapped in Markdown code fences or
/// surrounding prose. Placeholders in the reply are resolved against
/// `ticket_text` the same way the keyword templates are.
pub fn parse_ai_response(raw: &str, ticket_text: &str) -> ToolboxResult<TicketAnalysis> {
    let json = json_object_slice(raw)
        .ok_or_else(|| ToolboxError::AiError("Model response contains no JSON object".into()))?;

    let payload: AiTicketPayload = serde_json::from_str(json)
        .map_err(|e| ToolboxError::AiError(format!("Malformed model JSON: {e}")))?;

    payload_to_analysis(payload, ticket_text)
}

fn payload_to_analysis(payload: AiTicketPayload, ticket_text: &str) -> ToolboxResult<TicketAnalysis> {
    let checks = clean_list(payload.checks);
    let actions = clean_list(payload.actions);
    if checks.is_empty() || actions.is_empty() {
        return Err(ToolboxError::AiError(
            "Model response is missing checks or actions".into(),
        ));
    }

    let issue_type = payload.issue_type.parse::<IssueType>().unwrap_or_else(|_| {
        debug!("[AI] Unknown issue type {:?}", payload.issue_type);
        IssueType::GeneralSupport
    });

    let fields = TicketFields::extract(ticket_text);
    let template = payload.response_template.trim();
    let response_template = if template.is_empty() {
        fields.render(rule_for(issue_type).template)
    } else {
        fields.render(template)
    };

    let topics: Vec<&str> = payload.kb_topics.iter().map(|t| t.trim()).collect();

    Ok(TicketAnalysis {
        issue_type,
        checks,
        actions,
        response_template,
        kb_articles: articles_for_terms(&topics),
        screenshot_analysis: payload
            .screenshot_analysis
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        source: AnalysisSource::Ai,
    })
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Slice from the first `{` to the last `}`.
fn json_object_slice(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Gemini `generateContent` backend.
pub struct GeminiTicketAnalyzer {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiTicketAnalyzer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            client: HTTP_CLIENT.clone(),
        }
    }

    /// Use a caller-configured client (timeouts, user agent, proxy).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Point the analyzer at another endpoint (proxies, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(request: &TicketRequest) -> serde_json::Value {
        let mut parts = vec![json!({
            "text": format!("{ANALYSIS_PROMPT}\n\nTicket Content:\n{}", request.text)
        })];

        if let Some(screenshot) = &request.screenshot {
            parts.push(json!({
                "inline_data": {
                    "mime_type": screenshot.mime_type,
                    "data": BASE64.encode(&screenshot.data),
                }
            }));
        }

        json!({
            "contents": [{ "parts": parts }],
            "generationConfig": { "responseMimeType": "application/json" }
        })
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl TicketAnalyzer for GeminiTicketAnalyzer {
    async fn analyze(&self, request: &TicketRequest) -> ToolboxResult<TicketAnalysis> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        debug!("[AI] Sending ticket to {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| ToolboxError::AiError(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolboxError::AiError(format!(
                "Model endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ToolboxError::AiError(format!("Failed to decode response: {e}")))?;

        let text = body
            .text()
            .ok_or_else(|| ToolboxError::AiError("Model returned no text".into()))?;

        parse_ai_response(&text, &request.text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    const GOOD_RESPONSE: &str = r#"```json
{
  "issue_type": "Email Issue",
  "checks": ["Check MX records", "  "],
  "actions": ["Fix SPF"],
  "response_template": "Dear [Client], we fixed mail for {domain}.",
  "kb_topics": ["email"],
  "screenshot_analysis": "  "
}
```"#;

    struct StubAnalyzer {
        raw: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubAnalyzer {
        fn returning(raw: &'static str) -> Self {
            Self {
                raw: Some(raw),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                raw: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TicketAnalyzer for StubAnalyzer {
        async fn analyze(&self, request: &TicketRequest) -> ToolboxResult<TicketAnalysis> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.raw {
                Some(raw) => parse_ai_response(raw, &request.text),
                None => Err(ToolboxError::AiError("backend down".into())),
            }
        }
    }

    #[test]
    fn test_parse_fenced_response() {
        let analysis = parse_ai_response(GOOD_RESPONSE, "Domain: shop.example.com").unwrap();

        assert_eq!(analysis.issue_type, IssueType::Email);
        assert_eq!(analysis.checks, vec!["Check MX records"]);
        assert_eq!(analysis.actions, vec!["Fix SPF"]);
        assert_eq!(
            analysis.response_template,
            "Dear [Client], we fixed mail for shop.example.com."
        );
        assert_eq!(analysis.kb_articles.len(), 2);
        assert!(analysis.screenshot_analysis.is_none());
        assert_eq!(analysis.source, AnalysisSource::Ai);
    }

    #[test]
    fn test_parse_unknown_issue_type_maps_to_general() {
        let raw = r#"{"issue_type":"Billing","checks":["a"],"actions":["b"],"response_template":"x"}"#;
        let analysis = parse_ai_response(raw, "").unwrap();
        assert_eq!(analysis.issue_type, IssueType::GeneralSupport);
        assert!(analysis.kb_articles.is_empty());
    }

    #[test]
    fn test_parse_empty_template_uses_category_template() {
        let raw = r#"{"issue_type":"SSL","checks":["a"],"actions":["b"]}"#;
        let analysis = parse_ai_response(raw, "").unwrap();
        assert_eq!(analysis.issue_type, IssueType::SslCertificate);
        assert!(analysis.response_template.contains("[Domain]"));
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        assert!(parse_ai_response("I think this is an email problem.", "").is_err());
        assert!(parse_ai_response("{not json}", "").is_err());
        assert!(parse_ai_response("} {", "").is_err());
        assert!(parse_ai_response(r#"{"checks":["a"],"actions":["b"]}"#, "").is_err());
        assert!(matches!(
            parse_ai_response(r#"{"issue_type":"Email Issue","checks":[],"actions":["b"]}"#, ""),
            Err(ToolboxError::AiError(_))
        ));
    }

    #[test]
    fn test_request_body_includes_screenshot() {
        let request = TicketRequest {
            text: "help".into(),
            screenshot: Some(Screenshot {
                mime_type: "image/png".into(),
                data: vec![1, 2, 3],
            }),
        };
        let body = GeminiTicketAnalyzer::request_body(&request);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[0]["text"].as_str().unwrap().ends_with("help"));
        assert_eq!(parts[1]["inline_data"]["data"], "AQID");
    }

    #[test]
    fn test_generate_content_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
    }

    #[tokio::test]
    async fn test_no_analyzer_uses_fallback() {
        let request = TicketRequest::text("cpanel login fails. IP Address: 10.0.0.1");
        let analysis = analyze_ticket(None, None, &request).await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
        assert_eq!(analysis.issue_type, IssueType::CpanelAccess);
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_with_same_text() {
        let stub = StubAnalyzer::failing();
        let request = TicketRequest::text("Customer cannot log into cPanel. IP Address: 41.203.14.2");

        let analysis = analyze_ticket(Some(&stub), None, &request).await;

        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analysis, classify_ticket(&request.text));
        assert!(analysis.response_template.contains("41.203.14.2"));
    }

    #[tokio::test]
    async fn test_malformed_payload_falls_back() {
        let stub = StubAnalyzer::returning("Sure! Here is my analysis: it's DNS.");
        let request = TicketRequest::text("nameservers not updating");

        let analysis = analyze_ticket(Some(&stub), None, &request).await;

        assert_eq!(analysis.source, AnalysisSource::Fallback);
        assert_eq!(analysis.issue_type, IssueType::DomainDns);
    }

    #[tokio::test]
    async fn test_successful_ai_result_is_returned() {
        let stub = StubAnalyzer::returning(GOOD_RESPONSE);
        let analysis = analyze_ticket(Some(&stub), None, &TicketRequest::text("x")).await;
        assert_eq!(analysis.source, AnalysisSource::Ai);
        assert_eq!(analysis.issue_type, IssueType::Email);
    }

    #[tokio::test]
    async fn test_rate_limited_call_skips_backend() {
        let stub = StubAnalyzer::returning(GOOD_RESPONSE);
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let request = TicketRequest::text("website down");

        let first = analyze_ticket(Some(&stub), Some(&limiter), &request).await;
        let second = analyze_ticket(Some(&stub), Some(&limiter), &request).await;

        assert_eq!(first.source, AnalysisSource::Ai);
        assert_eq!(second.source, AnalysisSource::Fallback);
        assert_eq!(second.issue_type, IssueType::Website);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    #[ignore = "requires network access and GEMINI_API_KEY"]
    async fn test_gemini_real() {
        let key = std::env::var("GEMINI_API_KEY").unwrap();
        let analyzer = GeminiTicketAnalyzer::new(key, DEFAULT_GEMINI_MODEL);
        let analysis = analyzer
            .analyze(&TicketRequest::text("My emails bounce with 550 user unknown"))
            .await
            .unwrap();
        assert!(!analysis.checks.is_empty());
    }
}
