//! Website diagnostics: status codes, redirect chains, HTTPS redirect and
//! mixed content.

use std::sync::LazyLock;
use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode, header::LOCATION, redirect::Policy};
use scraper::{Html, Selector};
use tokio::time::timeout;
use url::Url;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{
    HttpStatusClass, HttpStatusResult, HttpsRedirectResult, MixedContentReport, RedirectChainResult,
    RedirectHop,
};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const OVERALL_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 SupportBuddy/1.0";

/// Maximum redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Suggested Apache rules for sites that do not force HTTPS.
pub const HTACCESS_HTTPS_REDIRECT: &str = "RewriteEngine On\n\
    RewriteCond %{HTTPS} off\n\
    RewriteRule ^(.*)$ https://%{HTTP_HOST}%{REQUEST_URI} [L,R=301]";

/// Follows redirects like a browser would.
static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
});

/// Never follows redirects; used to record each hop.
static NO_REDIRECT_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .redirect(Policy::none())
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
});

/// Require an absolute `http://` or `https://` URL.
pub fn parse_http_url(raw: &str) -> ToolboxResult<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .map_err(|e| ToolboxError::ValidationError(format!("Invalid URL {raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ToolboxError::ValidationError(
            "URL must include protocol (http:// or https://) and a host".to_string(),
        )),
    }
}

/// Status code of a `HEAD` request, after redirects.
pub async fn http_status(url: &str) -> ToolboxResult<HttpStatusResult> {
    let url = parse_http_url(url)?;
    debug!("[HTTP] HEAD {url}");

    let response = HTTP_CLIENT
        .head(url.as_str())
        .send()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("HTTP request failed: {e}")))?;

    Ok(status_result(url.as_str(), response.status()))
}

fn status_result(url: &str, status: StatusCode) -> HttpStatusResult {
    HttpStatusResult {
        url: url.to_string(),
        status_code: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        class: HttpStatusClass::from_code(status.as_u16()),
    }
}

/// Follow redirects one hop at a time and record each of them.
pub async fn redirect_chain(url: &str) -> ToolboxResult<RedirectChainResult> {
    let start = parse_http_url(url)?;
    timeout(
        Duration::from_secs(OVERALL_TIMEOUT_SECS),
        redirect_chain_inner(start),
    )
    .await
    .map_err(|_| {
        ToolboxError::NetworkError(format!(
            "Redirect check timed out ({OVERALL_TIMEOUT_SECS}s)"
        ))
    })?
}

async fn redirect_chain_inner(start: Url) -> ToolboxResult<RedirectChainResult> {
    let mut hops = Vec::new();
    let mut current = start.clone();

    loop {
        debug!("[HTTP] GET {current} (hop {})", hops.len());
        let response = NO_REDIRECT_CLIENT
            .get(current.as_str())
            .send()
            .await
            .map_err(|e| ToolboxError::NetworkError(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let next = match location {
            Some(location) if status.is_redirection() => next_hop(&current, &location)?,
            _ => {
                return Ok(RedirectChainResult {
                    start_url: start.to_string(),
                    hops,
                    final_url: current.to_string(),
                    final_status: status.as_u16(),
                });
            }
        };

        hops.push(RedirectHop {
            url: current.to_string(),
            status_code: status.as_u16(),
        });
        if hops.len() >= MAX_REDIRECTS {
            return Err(ToolboxError::NetworkError(format!(
                "Too many redirects (more than {MAX_REDIRECTS})"
            )));
        }
        current = next;
    }
}

/// Resolve a `Location` header against the URL that returned it.
fn next_hop(current: &Url, location: &str) -> ToolboxResult<Url> {
    current.join(location).map_err(|e| {
        ToolboxError::ParseError(format!("Invalid redirect location {location:?}: {e}"))
    })
}

/// Check that `http://<domain>` ends up on HTTPS.
pub async fn https_redirect(domain: &str) -> ToolboxResult<HttpsRedirectResult> {
    let chain = redirect_chain(&format!("http://{domain}")).await?;
    Ok(https_verdict(domain, chain))
}

fn https_verdict(domain: &str, chain: RedirectChainResult) -> HttpsRedirectResult {
    let redirects_to_https = chain.final_url.starts_with("https://");
    HttpsRedirectResult {
        domain: domain.to_string(),
        redirects_to_https,
        chain,
        htaccess_snippet: (!redirects_to_https).then(|| HTACCESS_HTTPS_REDIRECT.to_string()),
    }
}

/// Fetch a page and list its insecure references.
pub async fn mixed_content(url: &str) -> ToolboxResult<MixedContentReport> {
    let url = parse_http_url(url)?;
    debug!("[HTTP] Scanning {url} for mixed content");

    let html = HTTP_CLIENT
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("HTTP request failed: {e}")))?
        .text()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("Failed to read page: {e}")))?;

    Ok(scan_mixed_content(url.as_str(), &html))
}

/// Scan an HTML document for `http://` resource references.
pub fn scan_mixed_content(url: &str, html: &str) -> MixedContentReport {
    let document = Html::parse_document(html);
    let collect = |selector: &str, attr: &str| -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|value| value.starts_with("http://"))
            .map(str::to_string)
            .collect()
    };

    let images = collect("img[src]", "src");
    let scripts = collect("script[src]", "src");
    let stylesheets = collect("link[rel~=stylesheet][href]", "href");
    let iframes = collect("iframe[src]", "src");
    let links = collect("a[href]", "href");

    let total_mixed =
        images.len() + scripts.len() + stylesheets.len() + iframes.len() + links.len();

    MixedContentReport {
        url: url.to_string(),
        images,
        scripts,
        stylesheets,
        iframes,
        links,
        https_count: html.matches("https://").count(),
        total_mixed,
        secure: total_mixed == 0,
    }
}
