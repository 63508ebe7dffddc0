//! Offline ticket triage.
//!
//! Keyword rules are evaluated in table order and the first rule with any
//! keyword contained in the lower-cased ticket wins. Tickets no rule
//! recognises fall through to [`GENERAL_SUPPORT`], so classification never
//! fails.

use std::net::Ipv4Addr;

use regex::Regex;

use super::knowledge_base::articles_for_terms;
use crate::types::{AnalysisSource, IssueType, TicketAnalysis};

/// Placeholder used when no client name is found in the ticket.
pub const CLIENT_PLACEHOLDER: &str = "[Client]";
/// Placeholder used when no `IP Address:` line is found in the ticket.
pub const CLIENT_IP_PLACEHOLDER: &str = "[Client IP]";
/// Placeholder used when no domain is found in the ticket.
pub const DOMAIN_PLACEHOLDER: &str = "[Domain]";

/// One triage rule.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub issue_type: IssueType,
    /// Lower-case substrings that select this rule.
    pub keywords: &'static [&'static str],
    pub checks: &'static [&'static str],
    pub actions: &'static [&'static str],
    /// Reply draft; may reference `{client}`, `{client_ip}` and `{domain}`.
    pub template: &'static str,
}

/// Rules in priority order. Domain & DNS sits after SSL.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        issue_type: IssueType::CpanelAccess,
        keywords: &[
            "cpanel",
            "whm",
            "directadmin",
            "control panel",
            "recaptcha",
            "captcha",
            "cphulk",
            "locked out",
            "log into",
            "login",
            "log in",
            "brute force",
        ],
        checks: &[
            "Check whether the client IP is blocked in the server firewall (CSF/cPHulk)",
            "Confirm the cPanel account is active and not suspended",
            "Verify the username matches the account on record",
            "Review recent failed login attempts for the account",
        ],
        actions: &[
            "Unblock the client IP in the firewall if listed",
            "Whitelist the IP temporarily if reCAPTCHA keeps triggering",
            "Send a password reset link to the registered email address",
            "Ask the client to clear browser cache and cookies before retrying",
        ],
        template: "Dear {client},\n\n\
            Thank you for contacting support regarding access to your control panel.\n\n\
            We have checked the server firewall for your IP address ({client_ip}) and removed \
            any block caused by repeated failed login attempts or reCAPTCHA challenges. \
            Please clear your browser cache and cookies, then try logging in again.\n\n\
            If you no longer have your password, you can reset it from the client area. \
            Should the problem persist, reply to this ticket and we will investigate further.\n\n\
            Kind regards,\nSupport Team",
    },
    CategoryRule {
        issue_type: IssueType::Email,
        keywords: &[
            "email",
            "e-mail",
            "mailbox",
            "inbox",
            "outlook",
            "thunderbird",
            "smtp",
            "imap",
            "pop3",
            "bounce",
            "spam",
            "mail",
        ],
        checks: &[
            "Verify MX records point to the correct mail server",
            "Check SPF, DKIM and DMARC records for the domain",
            "Confirm the mailbox exists and is not over quota",
            "Review the mail delivery logs for bounces or rejections",
        ],
        actions: &[
            "Correct MX or SPF records if misconfigured",
            "Increase the mailbox quota or ask the client to archive old mail",
            "Share the correct IMAP/SMTP settings and ports",
            "Request the full bounce message or email headers if delivery still fails",
        ],
        template: "Dear {client},\n\n\
            Thank you for reaching out about the email service for {domain}.\n\n\
            We have reviewed the mail records and delivery logs for your domain. \
            Please confirm your mail client uses the recommended IMAP/SMTP settings with SSL enabled, \
            and let us know if you are still unable to send or receive messages.\n\n\
            If you received a bounce message, kindly forward the full error so we can trace it.\n\n\
            Kind regards,\nSupport Team",
    },
    CategoryRule {
        issue_type: IssueType::Website,
        keywords: &[
            "website",
            "web site",
            "wordpress",
            "500",
            "internal server error",
            "403",
            "forbidden",
            "404",
            "not found",
            "site down",
            "not loading",
            "blank page",
            "database connection",
            "slow",
        ],
        checks: &[
            "Load the site and note the HTTP status code",
            "Review the Apache/PHP error logs for the account",
            "Check file and folder permissions (644 files, 755 folders)",
            "Check the account's resource usage (CPU, memory, inodes)",
        ],
        actions: &[
            "Fix permissions or .htaccess rules causing the error",
            "Disable faulty plugins or themes if the site runs WordPress",
            "Restore from backup if recent changes broke the site",
            "Escalate to the server team if the issue is server-wide",
        ],
        template: "Dear {client},\n\n\
            Thank you for letting us know about the problem with {domain}.\n\n\
            We have reviewed the error logs and configuration of your hosting account \
            and will share our findings shortly. If you made any recent changes \
            (plugins, themes, .htaccess rules), please let us know as it will help us resolve \
            the issue faster.\n\n\
            Kind regards,\nSupport Team",
    },
    CategoryRule {
        issue_type: IssueType::SslCertificate,
        keywords: &[
            "ssl",
            "https",
            "certificate",
            "not secure",
            "tls",
            "padlock",
            "mixed content",
            "autossl",
            "let's encrypt",
        ],
        checks: &[
            "Check the certificate issuer, validity dates and covered names",
            "Verify the domain resolves to this server so validation can succeed",
            "Test whether HTTP redirects to HTTPS",
            "Scan the site for mixed content",
        ],
        actions: &[
            "Run AutoSSL or reissue the certificate",
            "Add an HTTPS redirect rule to .htaccess",
            "Replace http:// resource links with https://",
            "Advise the client to clear the browser cache after reissue",
        ],
        template: "Dear {client},\n\n\
            Thank you for contacting us about the SSL certificate for {domain}.\n\n\
            We have checked the certificate installed on the server and re-run the issuance \
            where needed. Please allow a few minutes, then clear your browser cache and reload \
            the site. If the browser still shows the site as not secure, the page may contain \
            mixed content, which we are happy to help identify.\n\n\
            Kind regards,\nSupport Team",
    },
    CategoryRule {
        issue_type: IssueType::DomainDns,
        keywords: &[
            "dns",
            "nameserver",
            "name server",
            "propagat",
            "whois",
            "epp code",
            "auth code",
            "domain transfer",
            "transfer my domain",
            "a record",
            "cname",
            "domain expired",
            "domain has expired",
            "renew domain",
            "renew my domain",
            "domain renewal",
        ],
        checks: &[
            "Check the domain registration status and expiry date",
            "Verify the nameservers at the registry",
            "Look up the A, CNAME and MX records",
            "Check DNSSEC status for a broken chain of trust",
        ],
        actions: &[
            "Update nameservers or DNS records as required",
            "Renew the domain if it has expired",
            "Advise the client that DNS changes can take up to 24-48 hours to propagate",
            "Provide the EPP code if a transfer was requested",
        ],
        template: "Dear {client},\n\n\
            Thank you for contacting us about {domain}.\n\n\
            We have checked the registration status and DNS configuration of the domain. \
            Any changes we made may take up to 24-48 hours to propagate across the internet. \
            During this period some visitors may still see the previous records.\n\n\
            We will keep this ticket open until the changes are visible everywhere.\n\n\
            Kind regards,\nSupport Team",
    },
];

/// Catch-all rule.
pub const GENERAL_SUPPORT: CategoryRule = CategoryRule {
    issue_type: IssueType::GeneralSupport,
    keywords: &[],
    checks: &[
        "Verify the client's identity (PIN or account check)",
        "Identify the affected domain or service",
        "Collect error messages and screenshots",
        "Check for recent changes on the account",
    ],
    actions: &[
        "Ask the client for any missing details",
        "Reproduce the issue if possible",
        "Escalate to the relevant team if it cannot be resolved at first line",
    ],
    template: "Dear {client},\n\n\
        Thank you for contacting support.\n\n\
        We are looking into your request and will update you as soon as possible. \
        To help us assist you faster, please share any error messages, screenshots \
        and the domain or service affected.\n\n\
        Kind regards,\nSupport Team",
};

/// Pick the first matching rule for a ticket.
pub fn match_rule(ticket_text: &str) -> &'static CategoryRule {
    let lowered = ticket_text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .unwrap_or(&GENERAL_SUPPORT)
}

/// Rule for a category, used when an external analysis names the category
/// but leaves fields empty.
pub fn rule_for(issue_type: IssueType) -> &'static CategoryRule {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.issue_type == issue_type)
        .unwrap_or(&GENERAL_SUPPORT)
}

/// Classify a ticket with the offline keyword rules.
pub fn classify_ticket(ticket_text: &str) -> TicketAnalysis {
    let rule = match_rule(ticket_text);
    let fields = TicketFields::extract(ticket_text);

    TicketAnalysis {
        issue_type: rule.issue_type,
        checks: to_owned(rule.checks),
        actions: to_owned(rule.actions),
        response_template: fields.render(rule.template),
        kb_articles: articles_for_terms(rule.keywords),
        screenshot_analysis: None,
        source: AnalysisSource::Fallback,
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Values lifted from the ticket body for template substitution.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TicketFields {
    pub client: Option<String>,
    pub client_ip: Option<Ipv4Addr>,
    pub domain: Option<String>,
}

impl TicketFields {
    /// Best-effort extraction; every field is optional.
    pub fn extract(text: &str) -> Self {
        Self {
            client: extract_client(text),
            client_ip: extract_client_ip(text),
            domain: extract_domain(text),
        }
    }

    /// Substitute `{client}`, `{client_ip}` and `{domain}` in one pass.
    ///
    /// Missing values become bracketed placeholders. Unknown `{...}` tokens
    /// are copied through untouched.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + 32);
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            match self.value_for(&after[..end]) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..=start + end + 1]),
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }

    fn value_for(&self, key: &str) -> Option<String> {
        let value = match key {
            "client" => self
                .client
                .clone()
                .unwrap_or_else(|| CLIENT_PLACEHOLDER.to_string()),
            "client_ip" => self
                .client_ip
                .map_or_else(|| CLIENT_IP_PLACEHOLDER.to_string(), |ip| ip.to_string()),
            "domain" => self
                .domain
                .clone()
                .unwrap_or_else(|| DOMAIN_PLACEHOLDER.to_string()),
            _ => return None,
        };
        Some(value)
    }
}

/// First `IP Address: a.b.c.d` whose quad is a valid IPv4 address.
fn extract_client_ip(text: &str) -> Option<Ipv4Addr> {
    let re = Regex::new(r"(?i)IP\s*Address\s*:\s*(\d{1,3}(?:\.\d{1,3}){3})\b").ok()?;
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| m.as_str().parse::<Ipv4Addr>().ok())
}

fn extract_client(text: &str) -> Option<String> {
    let re = Regex::new(r"(?im)^[ \t]*(?:client|customer)(?:[ \t]+name)?[ \t]*:[ \t]*(.+)$").ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| sanitize(m.as_str()))
        .filter(|name| !name.is_empty())
}

/// Last labels that mark a filename rather than a host.
const FILE_EXTENSIONS: &[&str] = &[
    "php", "js", "css", "html", "htm", "txt", "log", "ini", "json", "xml", "conf", "sql", "zip",
    "gz", "png", "jpg", "jpeg", "gif", "pdf",
];

/// Domain from a `Domain:` label, then a URL host, then any bare domain-shaped
/// token that is not a filename.
fn extract_domain(text: &str) -> Option<String> {
    let labelled = [
        r"(?i)domain(?:\s*name)?\s*:\s*(?:https?://)?((?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,})",
        r"(?i)https?://((?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,})",
    ];

    for pattern in labelled {
        if let Ok(re) = Regex::new(pattern)
            && let Some(m) = re.captures(text).and_then(|caps| caps.get(1))
        {
            return Some(m.as_str().to_lowercase());
        }
    }

    let bare =
        Regex::new(r"(?i)\b((?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,})\b").ok()?;
    bare.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .find(|token| !is_filename(token))
}

fn is_filename(token: &str) -> bool {
    token
        .rsplit('.')
        .next()
        .is_some_and(|last| FILE_EXTENSIONS.contains(&last))
}

/// Strip template braces so that substituted values can never read as tokens.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect::<String>()
        .trim()
        .to_string()
}
