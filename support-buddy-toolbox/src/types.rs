//! Public types returned by toolbox operations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ==================== Registrar page ====================

/// Header text of the registration card.
pub const DOMAIN_INFORMATION: &str = "Domain Information";

/// Header text of the registrar card.
pub const REGISTRAR_INFORMATION: &str = "Registrar Information";

/// Card headers picked up by the registrar page extractor. Everything else is ignored.
pub const RECOGNIZED_SECTIONS: [&str; 2] = [DOMAIN_INFORMATION, REGISTRAR_INFORMATION];

/// Reserved key for the `<pre>` capture. Never one of [`RECOGNIZED_SECTIONS`].
pub const RAW_REGISTRY_DATA_KEY: &str = "Raw Registry Data";

/// Field label to field value within one card.
pub type SectionFields = BTreeMap<String, String>;

/// Sections scraped from a registrar look-up page.
///
/// A missing key means "unknown", never "empty": sections that are not on the
/// page have no entry at all. Serialised with the section names as top-level
/// keys next to the reserved [`RAW_REGISTRY_DATA_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSections {
    /// Recognised section name to its label/value pairs.
    #[serde(flatten)]
    pub sections: BTreeMap<String, SectionFields>,
    /// Trimmed text of the first non-empty `<pre>` block, if any.
    #[serde(
        rename = "Raw Registry Data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_registry_data: Option<String>,
}

impl RegistrationSections {
    /// Fields of a section, or `None` if the page did not carry it.
    pub fn section(&self, name: &str) -> Option<&SectionFields> {
        self.sections.get(name)
    }

    /// Shorthand for a single field lookup.
    pub fn field(&self, section: &str, label: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|fields| fields.get(label))
            .map(String::as_str)
    }

    /// `true` when no recognised section was found.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// DNSSEC signing status derived from a DS query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DnssecStatus {
    /// DS records present.
    #[serde(rename = "DNSSEC Signed")]
    Signed,
    /// Query answered without DS records.
    #[serde(rename = "DNSSEC Unsigned")]
    Unsigned,
    /// Query failed.
    #[serde(rename = "DNSSEC Unknown")]
    Unknown,
}

impl fmt::Display for DnssecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed => write!(f, "DNSSEC Signed"),
            Self::Unsigned => write!(f, "DNSSEC Unsigned"),
            Self::Unknown => write!(f, "DNSSEC Unknown"),
        }
    }
}

/// Registration health report for a `.ng` domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgWhoisReport {
    /// The queried domain name.
    pub domain: String,
    /// Sections scraped from the registrar page.
    pub registration: RegistrationSections,
    /// DNSSEC status from a DS lookup.
    pub dnssec: DnssecStatus,
    /// Live name servers, lower-cased without trailing dot.
    pub name_servers: Vec<String>,
}

// ==================== Ticket analysis ====================

/// Support ticket category.
///
/// Classification is total: [`IssueType::GeneralSupport`] exists so that
/// every ticket lands somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    /// Login, password and captcha problems with the control panel.
    #[serde(rename = "cPanel Access Issue")]
    CpanelAccess,
    /// Mailbox, delivery and mail client problems.
    #[serde(rename = "Email Issue")]
    Email,
    /// Registration, name server and DNS record problems.
    #[serde(rename = "Domain & DNS Issue")]
    DomainDns,
    /// Site errors and downtime.
    #[serde(rename = "Website Issue")]
    Website,
    /// Certificate and HTTPS problems.
    #[serde(rename = "SSL Certificate Issue")]
    SslCertificate,
    /// Anything the rules do not recognise.
    #[serde(rename = "General Support")]
    GeneralSupport,
}

impl IssueType {
    /// Every category, in display order.
    pub const ALL: [Self; 6] = [
        Self::CpanelAccess,
        Self::Email,
        Self::DomainDns,
        Self::Website,
        Self::SslCertificate,
        Self::GeneralSupport,
    ];

    /// Human readable label, identical to the serialised form.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CpanelAccess => "cPanel Access Issue",
            Self::Email => "Email Issue",
            Self::DomainDns => "Domain & DNS Issue",
            Self::Website => "Website Issue",
            Self::SslCertificate => "SSL Certificate Issue",
            Self::GeneralSupport => "General Support",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IssueType {
    type Err = String;

    /// Accepts the exact labels plus the short category names a model tends
    /// to answer with ("Email", "DNS", "SSL", ...), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if let Some(exact) = Self::ALL
            .iter()
            .find(|t| t.label().to_lowercase() == normalized)
        {
            return Ok(*exact);
        }
        match normalized.as_str() {
            "cpanel" | "cpanel access" | "login" | "access" => Ok(Self::CpanelAccess),
            "email" | "mail" => Ok(Self::Email),
            "domain" | "dns" | "domain & dns" | "domain/dns" => Ok(Self::DomainDns),
            "website" | "web" | "hosting" => Ok(Self::Website),
            "ssl" | "ssl certificate" | "https" | "certificate" => Ok(Self::SslCertificate),
            "general" | "general support" | "other" => Ok(Self::GeneralSupport),
            _ => Err(format!("Unknown issue type: {s}")),
        }
    }
}

/// A knowledge-base reference attached to an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbArticleRef {
    /// Article title.
    pub title: String,
    /// Article URL.
    pub url: String,
}

/// Which path produced a [`TicketAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Generative-AI backend.
    Ai,
    /// Offline keyword classifier.
    Fallback,
}

/// Triage result for a support ticket. Both the AI path and the keyword
/// classifier produce this exact shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketAnalysis {
    /// Detected category.
    pub issue_type: IssueType,
    /// Diagnostic steps, in order.
    pub checks: Vec<String>,
    /// Recommended actions, in order.
    pub actions: Vec<String>,
    /// Reply draft with every placeholder resolved or bracketed.
    pub response_template: String,
    /// At most three related knowledge-base articles.
    pub kb_articles: Vec<KbArticleRef>,
    /// Model commentary on an attached screenshot (AI path only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_analysis: Option<String>,
    /// Producer of this result.
    pub source: AnalysisSource,
}

/// Knowledge-base search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbSearchHit {
    /// Article title.
    pub title: String,
    /// Article URL.
    pub url: String,
    /// Knowledge-base category the article belongs to.
    pub category: String,
    /// 2 for a title match, 1 for a keyword match.
    pub relevance: u8,
}

// ==================== DNS-over-HTTPS ====================

/// A single answer record from a DNS-over-HTTPS query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsAnswer {
    /// Owner name, trailing dot removed.
    pub name: String,
    /// Numeric record type (1 = A, 2 = NS, ...).
    pub record_type: u16,
    /// Time-to-live in seconds.
    pub ttl: u32,
    /// Record data as returned by the resolver.
    pub data: String,
}

/// DNS lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsLookupResult {
    /// The queried domain name.
    pub domain: String,
    /// Requested record type (e.g. `"MX"`).
    pub record_type: String,
    /// DNS response code (0 = NOERROR, 3 = NXDOMAIN).
    pub status: u32,
    /// Answer records.
    pub records: Vec<DnsAnswer>,
}

// ==================== IP geolocation ====================

/// Geolocation for a single IPv4 address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpGeoInfo {
    /// The IP address.
    pub ip: String,
    /// City.
    pub city: Option<String>,
    /// Region / state.
    pub region: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Postal code.
    pub postal: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// ISP or organisation.
    pub org: Option<String>,
    /// IANA time zone.
    pub timezone: Option<String>,
    /// Autonomous system.
    pub asn: Option<String>,
    /// Upstream that answered (`"ipapi.co"` or `"ip-api.com"`).
    pub source: String,
}

// ==================== HTTP checks ====================

/// Coarse classification of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatusClass {
    /// 1xx.
    Informational,
    /// 2xx.
    Success,
    /// 3xx.
    Redirect,
    /// 4xx.
    ClientError,
    /// 5xx and anything out of range.
    ServerError,
}

impl HttpStatusClass {
    /// Classify a status code.
    pub const fn from_code(code: u16) -> Self {
        match code {
            100..=199 => Self::Informational,
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }
}

/// HTTP status check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpStatusResult {
    /// The checked URL.
    pub url: String,
    /// Status code of the final response.
    pub status_code: u16,
    /// Canonical reason phrase.
    pub reason: String,
    /// Status class.
    pub class: HttpStatusClass,
}

/// One hop of a redirect chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectHop {
    /// URL requested at this hop.
    pub url: String,
    /// Redirect status returned by that URL.
    pub status_code: u16,
}

/// Redirect chain from a starting URL to its final destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectChainResult {
    /// URL the check started from.
    pub start_url: String,
    /// Redirecting responses, in order.
    pub hops: Vec<RedirectHop>,
    /// URL that finally answered without redirecting.
    pub final_url: String,
    /// Status of the final response.
    pub final_status: u16,
}

/// Whether plain HTTP is forwarded to HTTPS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpsRedirectResult {
    /// The checked domain.
    pub domain: String,
    /// `true` when the chain ends on an `https://` URL.
    pub redirects_to_https: bool,
    /// Redirect chain starting at `http://<domain>`.
    pub chain: RedirectChainResult,
    /// Apache rewrite rules to suggest when the redirect is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub htaccess_snippet: Option<String>,
}

/// Insecure `http://` references found on a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedContentReport {
    /// Scanned URL.
    pub url: String,
    /// `img[src]`.
    pub images: Vec<String>,
    /// `script[src]`.
    pub scripts: Vec<String>,
    /// `link[rel=stylesheet][href]`.
    pub stylesheets: Vec<String>,
    /// `iframe[src]`.
    pub iframes: Vec<String>,
    /// `a[href]`.
    pub links: Vec<String>,
    /// Number of `https://` occurrences in the raw document.
    pub https_count: usize,
    /// Sum of every insecure list.
    pub total_mixed: usize,
    /// `true` when nothing insecure was found.
    pub secure: bool,
}

// ==================== WHOIS ====================

/// Registration data parsed from a port-43 WHOIS answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoisRecord {
    /// The queried domain name.
    pub domain: String,
    /// Sponsoring registrar.
    pub registrar: Option<String>,
    /// Registration date as written by the registry.
    pub creation_date: Option<String>,
    /// Expiry date as written by the registry.
    pub expiration_date: Option<String>,
    /// Last update as written by the registry.
    pub updated_date: Option<String>,
    /// Whole days until expiry, negative once expired. `None` when the
    /// expiry date is missing or in a format that cannot be read.
    pub days_until_expiry: Option<i64>,
    /// Delegated name servers, lower-cased without trailing dot.
    pub name_servers: Vec<String>,
    /// EPP status codes.
    pub status: Vec<String>,
    /// Raw WHOIS answer.
    pub raw: String,
}

// ==================== Name server authority ====================

/// Expected name servers compared against the live delegation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsAuthorityReport {
    /// The checked domain.
    pub domain: String,
    /// Expected name servers, normalised.
    pub expected: Vec<String>,
    /// Name servers currently published.
    pub live: Vec<String>,
    /// Expected but not published.
    pub missing: Vec<String>,
    /// Published but not expected.
    pub unexpected: Vec<String>,
    /// `true` when nothing expected is missing.
    pub all_match: bool,
}

// ==================== Email authentication ====================

/// SPF and DMARC records published for a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAuthReport {
    /// The checked domain.
    pub domain: String,
    /// `v=spf1` TXT records on the domain.
    pub spf: Vec<String>,
    /// `v=DMARC1` TXT records on `_dmarc.<domain>`.
    pub dmarc: Vec<String>,
    /// DMARC `p=` policy of the first record.
    pub dmarc_policy: Option<String>,
    /// Problems a support agent should raise with the client.
    pub warnings: Vec<String>,
}

// ==================== SSL ====================

/// How the host answered on the TLS port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// TLS handshake completed.
    Https,
    /// Handshake failed but the port speaks plain HTTP.
    Http,
    /// Nothing usable answered.
    Failed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Https => write!(f, "https"),
            Self::Http => write!(f, "http"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One certificate of the presented chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertChainItem {
    /// Subject distinguished name.
    pub subject: String,
    /// Issuer distinguished name.
    pub issuer: String,
    /// Whether the certificate is a CA.
    pub is_ca: bool,
}

/// Leaf certificate details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificate {
    /// Issuer organisation, e.g. `"Let's Encrypt"`.
    pub issuer_organization: Option<String>,
    /// Full issuer distinguished name.
    pub issuer: String,
    /// Subject common name.
    pub common_name: Option<String>,
    /// Full subject distinguished name.
    pub subject: String,
    /// Not-before, RFC 3339 UTC.
    pub valid_from: String,
    /// Not-after, RFC 3339 UTC.
    pub valid_to: String,
    /// Whole days until expiry, negative once expired.
    pub days_remaining: i64,
    /// Not-after is in the past.
    pub is_expired: bool,
    /// The queried host is covered by the common name or a SAN.
    pub hostname_matches: bool,
    /// DNS subject alternative names.
    pub san: Vec<String>,
    /// Serial number, upper-case hex.
    pub serial_number: String,
    /// Presented chain from leaf upwards.
    pub chain: Vec<CertChainItem>,
}

/// SSL certificate inspection result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCheckResult {
    /// Queried host.
    pub domain: String,
    /// Port that was checked.
    pub port: u16,
    /// Connection outcome.
    pub connection_status: ConnectionStatus,
    /// Present only after a completed handshake.
    pub certificate: Option<SslCertificate>,
    /// Why no certificate could be read.
    pub error: Option<String>,
}

// ==================== Utilities ====================

/// Password strength verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLevel {
    /// Score 0 to 2.
    Weak,
    /// Score 3 to 4.
    Moderate,
    /// Score 5 to 6.
    Strong,
}

/// Password strength report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStrength {
    /// Verdict.
    pub strength: StrengthLevel,
    /// Points earned.
    pub score: u8,
    /// Maximum achievable points.
    pub max_score: u8,
    /// Character count.
    pub length: usize,
    /// Contains `[a-z]`.
    pub has_lowercase: bool,
    /// Contains `[A-Z]`.
    pub has_uppercase: bool,
    /// Contains a digit.
    pub has_digit: bool,
    /// Contains a special character.
    pub has_special: bool,
    /// Improvement hints, empty for a perfect score.
    pub feedback: Vec<String>,
}

/// Case variants of a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseVariants {
    /// UPPERCASE.
    pub upper: String,
    /// lowercase.
    pub lower: String,
    /// Title Case.
    pub title: String,
    /// Sentence case.
    pub sentence: String,
}

/// Line-oriented clean-up of pasted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTools {
    /// Trimmed, non-blank lines in input order.
    pub lines: Vec<String>,
    /// Duplicates removed, first occurrence kept.
    pub unique: Vec<String>,
    /// Lexicographically sorted.
    pub sorted: Vec<String>,
}

/// Character statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    /// Unicode scalar values.
    pub characters: usize,
    /// Whitespace separated words.
    pub words: usize,
    /// `\n` separated lines (an empty string counts as one line).
    pub lines: usize,
    /// ASCII spaces.
    pub spaces: usize,
    /// Alphanumeric characters.
    pub alphanumeric: usize,
    /// Neither alphanumeric nor whitespace.
    pub special: usize,
}

/// Security verdict for a permission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionAssessment {
    /// 777.
    Dangerous,
    /// 666.
    Insecure,
    /// 644 or 755.
    Recommended,
    /// 600 or 700.
    Secure,
    /// Anything else.
    Custom,
}

/// A Unix permission mode in every useful notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionMode {
    /// Three octal digits, e.g. `"644"`.
    pub numeric: String,
    /// Nine characters, e.g. `"rw-r--r--"`.
    pub symbolic: String,
    /// Owner triplet.
    pub owner: String,
    /// Group triplet.
    pub group: String,
    /// Other triplet.
    pub other: String,
    /// Security verdict.
    pub assessment: PermissionAssessment,
    /// `chmod <mode> filename`.
    pub chmod: String,
}

/// A single parsed email header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailHeader {
    /// Header name as written.
    pub name: String,
    /// Value with continuation lines joined by `\n`.
    pub value: String,
}

/// Parsed email header block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailHeaderReport {
    /// Every header, in order. Repeated names are kept.
    pub headers: Vec<EmailHeader>,
    /// `From`, `To`, `Subject`, `Date` and `Message-ID` when present.
    pub key_headers: Vec<EmailHeader>,
    /// Number of `Received` hops.
    pub received_hops: usize,
}

/// Storage unit, 1024 based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageUnit {
    /// Bytes.
    #[serde(alias = "B", alias = "bytes")]
    Bytes,
    /// Kibibytes.
    #[serde(alias = "kb")]
    KB,
    /// Mebibytes.
    #[serde(alias = "mb")]
    MB,
    /// Gibibytes.
    #[serde(alias = "gb")]
    GB,
    /// Tebibytes.
    #[serde(alias = "tb")]
    TB,
}

impl StorageUnit {
    /// Size of one unit in bytes.
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Bytes => 1.0,
            Self::KB => 1024.0,
            Self::MB => 1_048_576.0,
            Self::GB => 1_073_741_824.0,
            Self::TB => 1_099_511_627_776.0,
        }
    }
}

impl FromStr for StorageUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b" | "byte" | "bytes" => Ok(Self::Bytes),
            "kb" | "kib" => Ok(Self::KB),
            "mb" | "mib" => Ok(Self::MB),
            "gb" | "gib" => Ok(Self::GB),
            "tb" | "tib" => Ok(Self::TB),
            _ => Err(format!("Unknown storage unit: {s}")),
        }
    }
}

/// Rough database size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseSizeClass {
    /// Under 100 MB.
    Small,
    /// 100 MB to 10 GB.
    Medium,
    /// Over 10 GB.
    Large,
}

/// A size expressed in every unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSize {
    /// Bytes.
    pub bytes: f64,
    /// Kibibytes.
    pub kb: f64,
    /// Mebibytes.
    pub mb: f64,
    /// Gibibytes.
    pub gb: f64,
    /// Tebibytes.
    pub tb: f64,
    /// Database size bucket.
    pub class: DatabaseSizeClass,
}
