//! TLS certificate inspection.
//!
//! The handshake verifies against the webpki roots, so a certificate that does
//! not chain to a public root ends the check with the handshake error rather
//! than certificate details. When the handshake fails the port is tried for
//! plain HTTP, which is the usual cause on shared hosting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, trace, warn};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::{CertificateDer, ServerName};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::*;

use crate::types::{CertChainItem, ConnectionStatus, SslCertificate, SslCheckResult};

/// Port used when the caller does not name one.
pub const DEFAULT_TLS_PORT: u16 = 443;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const TLS_TIMEOUT: Duration = Duration::from_secs(10);
const PLAIN_HTTP_TIMEOUT: Duration = Duration::from_secs(3);

/// Install the ring provider once; `Err` only means one is already installed.
fn ensure_crypto_provider() {
    let _ = CryptoProvider::install_default(rustls::crypto::ring::default_provider());
}

fn tls_connector() -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

enum HandshakeError {
    /// TCP never connected or the name is unusable.
    Connect(String),
    /// TCP connected but TLS did not complete.
    Tls(String),
}

async fn fetch_chain(
    domain: &str,
    port: u16,
) -> Result<Vec<CertificateDer<'static>>, HandshakeError> {
    let stream = match timeout(CONNECT_TIMEOUT, TcpStream::connect((domain, port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(HandshakeError::Connect(format!("Connection failed: {e}"))),
        Err(_) => return Err(HandshakeError::Connect("Connection timed out".to_string())),
    };
    trace!("[SSL] TCP connected to {domain}:{port}");

    let server_name = ServerName::try_from(domain.to_string())
        .map_err(|_| HandshakeError::Connect("Invalid domain name".to_string()))?;

    let tls = match timeout(TLS_TIMEOUT, tls_connector().connect(server_name, stream)).await {
        Ok(Ok(tls)) => tls,
        Ok(Err(e)) => return Err(HandshakeError::Tls(format!("TLS handshake failed: {e}"))),
        Err(_) => return Err(HandshakeError::Tls("TLS handshake timed out".to_string())),
    };

    let (_, connection) = tls.get_ref();
    Ok(connection
        .peer_certificates()
        .map(<[_]>::to_vec)
        .unwrap_or_default())
}

/// `true` when the port answers a plain `HEAD /` with an HTTP status line.
async fn speaks_http(domain: &str, port: u16) -> bool {
    let exchange = async {
        let mut stream = TcpStream::connect((domain, port)).await.ok()?;
        let request = format!("HEAD / HTTP/1.1\r\nHost: {domain}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.ok()?;

        let mut head = [0u8; 16];
        let read = stream.read(&mut head).await.ok()?;
        Some(head[..read].starts_with(b"HTTP/"))
    };

    timeout(PLAIN_HTTP_TIMEOUT, exchange)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// Connect to `domain:port` and describe the certificate it presents.
///
/// Never fails: connection and handshake problems are reported through
/// [`SslCheckResult::connection_status`] and [`SslCheckResult::error`].
pub async fn ssl_check(domain: &str, port: u16) -> SslCheckResult {
    ensure_crypto_provider();
    debug!("[SSL] Checking {domain}:{port}");
    let started = Instant::now();

    let result = |connection_status, certificate, error| SslCheckResult {
        domain: domain.to_string(),
        port,
        connection_status,
        certificate,
        error,
    };

    match fetch_chain(domain, port).await {
        Ok(chain) => {
            let certificate = describe_chain(domain, &chain, Utc::now());
            debug!(
                "[SSL] {domain}:{port} answered with {} certificate(s) in {:?}",
                chain.len(),
                started.elapsed()
            );
            let error = certificate
                .is_none()
                .then(|| "No readable certificate presented".to_string());
            result(ConnectionStatus::Https, certificate, error)
        }
        Err(HandshakeError::Tls(message)) => {
            warn!("[SSL] {domain}:{port}: {message}");
            let status = if speaks_http(domain, port).await {
                ConnectionStatus::Http
            } else {
                ConnectionStatus::Failed
            };
            result(status, None, Some(message))
        }
        Err(HandshakeError::Connect(message)) => {
            warn!("[SSL] {domain}:{port}: {message}");
            result(ConnectionStatus::Failed, None, Some(message))
        }
    }
}

fn describe_chain(
    domain: &str,
    chain: &[CertificateDer<'_>],
    now: DateTime<Utc>,
) -> Option<SslCertificate> {
    let leaf = chain.first()?;
    let cert = match X509Certificate::from_der(leaf.as_ref()) {
        Ok((_, cert)) => cert,
        Err(e) => {
            warn!("[SSL] Leaf certificate for {domain} could not be parsed: {e}");
            return None;
        }
    };

    let mut certificate = summarize(domain, CertFacts::from_x509(&cert), now);
    certificate.chain = chain
        .iter()
        .filter_map(|der| X509Certificate::from_der(der.as_ref()).ok())
        .map(|(_, parsed)| CertChainItem {
            subject: parsed.subject().to_string(),
            issuer: parsed.issuer().to_string(),
            is_ca: parsed.is_ca(),
        })
        .collect();

    Some(certificate)
}

/// Plain values lifted from a parsed leaf certificate.
#[derive(Debug)]
struct CertFacts {
    issuer: String,
    issuer_organization: Option<String>,
    subject: String,
    common_name: Option<String>,
    /// Unix seconds.
    not_before: i64,
    /// Unix seconds.
    not_after: i64,
    san: Vec<String>,
    serial_number: String,
}

impl CertFacts {
    fn from_x509(cert: &X509Certificate<'_>) -> Self {
        let san = cert
            .subject_alternative_name()
            .ok()
            .flatten()
            .map(|ext| {
                ext.value
                    .general_names
                    .iter()
                    .filter_map(|name| match name {
                        GeneralName::DNSName(dns) => Some((*dns).to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            issuer: cert.issuer().to_string(),
            issuer_organization: cert
                .issuer()
                .iter_organization()
                .next()
                .and_then(|attr| attr.as_str().ok())
                .map(String::from),
            subject: cert.subject().to_string(),
            common_name: cert
                .subject()
                .iter_common_name()
                .next()
                .and_then(|attr| attr.as_str().ok())
                .map(String::from),
            not_before: cert.validity().not_before.timestamp(),
            not_after: cert.validity().not_after.timestamp(),
            san,
            serial_number: cert.serial.to_str_radix(16).to_uppercase(),
        }
    }
}

fn summarize(domain: &str, facts: CertFacts, now: DateTime<Utc>) -> SslCertificate {
    let not_before = DateTime::from_timestamp(facts.not_before, 0).unwrap_or(now);
    let not_after = DateTime::from_timestamp(facts.not_after, 0).unwrap_or(now);

    let hostname_matches = facts
        .common_name
        .iter()
        .chain(&facts.san)
        .any(|name| covers(name, domain));

    SslCertificate {
        issuer_organization: facts.issuer_organization,
        issuer: facts.issuer,
        common_name: facts.common_name,
        subject: facts.subject,
        valid_from: not_before.to_rfc3339_opts(SecondsFormat::Secs, true),
        valid_to: not_after.to_rfc3339_opts(SecondsFormat::Secs, true),
        days_remaining: (not_after - now).num_days(),
        is_expired: not_after < now,
        hostname_matches,
        san: facts.san,
        serial_number: facts.serial_number,
        chain: Vec::new(),
    }
}

/// Whether a certificate name covers `host`. A leading `*.` stands for
/// exactly one label.
fn covers(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(parent) => host
            .split_once('.')
            .is_some_and(|(label, rest)| !label.is_empty() && rest == parent),
        None => pattern == host,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW, 0).unwrap()
    }

    fn facts(not_after: i64) -> CertFacts {
        CertFacts {
            issuer: "C=US, O=Let's Encrypt, CN=R11".to_string(),
            issuer_organization: Some("Let's Encrypt".to_string()),
            subject: "CN=shop.example.ng".to_string(),
            common_name: Some("shop.example.ng".to_string()),
            not_before: NOW - 60 * 86_400,
            not_after,
            san: vec!["shop.example.ng".to_string(), "*.shop.example.ng".to_string()],
            serial_number: "4A2F".to_string(),
        }
    }

    #[test]
    fn test_covers_exact_and_case_insensitive() {
        assert!(covers("example.com", "example.com"));
        assert!(covers("Example.COM", "example.com"));
        assert!(covers("example.com.", "example.com"));
        assert!(!covers("example.com", "notexample.com"));
    }

    #[test]
    fn test_covers_wildcard_single_label() {
        assert!(covers("*.example.com", "www.example.com"));
        assert!(!covers("*.example.com", "example.com"));
        assert!(!covers("*.example.com", "a.b.example.com"));
    }

    #[test]
    fn test_summarize_valid_certificate() {
        let cert = summarize("www.shop.example.ng", facts(NOW + 30 * 86_400 + 5), now());

        assert_eq!(cert.days_remaining, 30);
        assert!(!cert.is_expired);
        assert!(cert.hostname_matches);
        assert_eq!(cert.issuer_organization.as_deref(), Some("Let's Encrypt"));
        assert!(cert.valid_to.ends_with('Z'));
        assert!(cert.chain.is_empty());
    }

    #[test]
    fn test_summarize_expired_certificate() {
        let cert = summarize("shop.example.ng", facts(NOW - 2 * 86_400), now());
        assert!(cert.is_expired);
        assert_eq!(cert.days_remaining, -2);
    }

    #[test]
    fn test_summarize_expired_earlier_today() {
        let cert = summarize("shop.example.ng", facts(NOW - 60), now());
        assert!(cert.is_expired);
        assert_eq!(cert.days_remaining, 0);
    }

    #[test]
    fn test_summarize_hostname_mismatch() {
        let cert = summarize("mail.other.ng", facts(NOW + 86_400), now());
        assert!(!cert.hostname_matches);
    }

    #[test]
    fn test_summarize_formats_dates_as_rfc3339() {
        let cert = summarize("shop.example.ng", facts(0), now());
        assert_eq!(cert.valid_to, "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_describe_chain_without_certificates() {
        assert!(describe_chain("example.com", &[], now()).is_none());
    }

    #[test]
    fn test_describe_chain_with_unparseable_leaf() {
        let garbage = CertificateDer::from(vec![0x30, 0x03, 0x01, 0x01, 0xff]);
        assert!(describe_chain("example.com", &[garbage], now()).is_none());
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_ssl_check_real() {
        let check = ssl_check("google.com", DEFAULT_TLS_PORT).await;
        if check.connection_status == ConnectionStatus::Https {
            let cert = check
                .certificate
                .unwrap_or_else(|| panic!("no certificate: {:?}", check.error));
            assert!(!cert.is_expired);
            assert!(cert.hostname_matches);
            assert!(!cert.chain.is_empty());
        }
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_ssl_check_unresolvable_host_real() {
        let check = ssl_check("this-domain-does-not-exist-12345.com", DEFAULT_TLS_PORT).await;
        assert_eq!(check.connection_status, ConnectionStatus::Failed);
        assert!(check.error.is_some());
    }
}
