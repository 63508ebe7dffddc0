//! Static help-centre article table.

use crate::types::{KbArticleRef, KbSearchHit};

/// Maximum number of articles attached to a ticket analysis.
pub const MAX_TICKET_ARTICLES: usize = 3;

/// Maximum number of hits returned by [`search_kb`].
pub const MAX_SEARCH_RESULTS: usize = 10;

/// A help-centre article.
#[derive(Debug, Clone, Copy)]
pub struct KbArticle {
    pub title: &'static str,
    pub url: &'static str,
    pub keywords: &'static [&'static str],
}

impl KbArticle {
    fn to_ref(self) -> KbArticleRef {
        KbArticleRef {
            title: self.title.to_string(),
            url: self.url.to_string(),
        }
    }

    /// `true` when one of the article keywords and `term` contain each other,
    /// ignoring case.
    fn overlaps(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        if term.is_empty() {
            return false;
        }
        self.keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            keyword.contains(&term) || term.contains(&keyword)
        })
    }
}

/// Category name to its articles, in table order.
pub const KNOWLEDGE_BASE: &[(&str, &[KbArticle])] = &[
    (
        "email",
        &[
            KbArticle {
                title: "DirectAdmin and cPanel Email",
                url: "https://help.hostafrica.com/category/control-panel-and-emails",
                keywords: &[
                    "email", "setup", "imap", "smtp", "outlook", "thunderbird", "mail",
                    "configure", "client",
                ],
            },
            KbArticle {
                title: "HMail and Workspace",
                url: "https://help.hostafrica.com/category/professional-email-and-workspace",
                keywords: &[
                    "Hmail", "Professional Mail", "email", "setup", "imap", "smtp", "outlook",
                    "thunderbird", "mail", "configure", "client",
                ],
            },
        ],
    ),
    (
        "domain",
        &[
            KbArticle {
                title: "How to Point Your Domain to HostAfrica",
                url: "https://help.hostafrica.com/category/domains",
                keywords: &["domain", "nameservers", "dns", "pointing", "ns1", "ns2", "setup"],
            },
            KbArticle {
                title: "Understanding DNS Records (A, CNAME, MX, TXT)",
                url: "https://help.hostafrica.com/category/dns-and-nameservers",
                keywords: &[
                    "dns", "records", "a record", "cname", "mx", "txt", "zone", "propagation",
                ],
            },
            KbArticle {
                title: "Domain Transfer Guide",
                url: "https://help.hostafrica.com/category/domains",
                keywords: &["domain", "transfer", "epp", "auth code", "registrar", "migrate"],
            },
        ],
    ),
    (
        "cpanel",
        &[
            KbArticle {
                title: "cPanel Getting Started Guide",
                url: "https://help.hostafrica.com/category/control-panel-and-emails/cpanel",
                keywords: &[
                    "cpanel", "getting started", "basics", "login", "dashboard", "control panel",
                ],
            },
            KbArticle {
                title: "DirectAdmin Getting Started Guide",
                url: "https://help.hostafrica.com/category/control-panel-and-emails/directadmin",
                keywords: &["DirectAdmin", "getting started", "basics", "login", "dashboard"],
            },
        ],
    ),
    (
        "ssl",
        &[KbArticle {
            title: "SSL Certificate",
            url: "https://help.hostafrica.com/category/ssl-certificates",
            keywords: &["ssl", "https", "certificate", "secure"],
        }],
    ),
    (
        "wordpress",
        &[
            KbArticle {
                title: "WordPress",
                url: "https://help.hostafrica.com/category/wordpress",
                keywords: &["wordpress", "install", "softaculous", "one click", "wp", "setup"],
            },
            KbArticle {
                title: "Softaculous",
                url: "https://help.hostafrica.com/category/softaculous",
                keywords: &["softaculous", "one click"],
            },
        ],
    ),
];

fn all_articles() -> impl Iterator<Item = (&'static str, &'static KbArticle)> {
    KNOWLEDGE_BASE
        .iter()
        .flat_map(|(category, articles)| articles.iter().map(move |a| (*category, a)))
}

/// Articles sharing a keyword with any of `terms`, in table order, at most
/// [`MAX_TICKET_ARTICLES`].
pub fn articles_for_terms(terms: &[&str]) -> Vec<KbArticleRef> {
    all_articles()
        .filter(|(_, article)| terms.iter().any(|term| article.overlaps(term)))
        .take(MAX_TICKET_ARTICLES)
        .map(|(_, article)| article.to_ref())
        .collect()
}

/// Free-text knowledge-base search.
///
/// Title matches rank above keyword matches; ties keep table order.
pub fn search_kb(query: &str) -> Vec<KbSearchHit> {
    search_articles(all_articles(), query)
}

fn search_articles<'a>(
    articles: impl Iterator<Item = (&'a str, &'a KbArticle)>,
    query: &str,
) -> Vec<KbSearchHit> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<KbSearchHit> = articles
        .filter_map(|(category, article)| {
            let relevance = if article.title.to_lowercase().contains(&query) {
                2
            } else if article
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&query))
            {
                1
            } else {
                return None;
            };
            Some(KbSearchHit {
                title: article.title.to_string(),
                url: article.url.to_string(),
                category: category.to_string(),
                relevance,
            })
        })
        .collect();

    // stable sort keeps table order within a relevance band
    hits.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    hits.truncate(MAX_SEARCH_RESULTS);
    hits
}
