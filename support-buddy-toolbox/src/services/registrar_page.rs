//! Registrar look-up page scraper.
//!
//! The `.ng` registry has no port-43 WHOIS service worth using, so the only
//! source of registration data is the HTML page served by its web look-up.
//! The page is a stack of Bootstrap cards, each with a `.card-header` and a
//! two-column table. Only the domain and registrar cards are kept.

use std::sync::LazyLock;
use std::time::Duration;

use log::debug;
use scraper::{ElementRef, Html, Selector};

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{RECOGNIZED_SECTIONS, RegistrationSections, SectionFields};

const LOOKUP_URL: &str = "https://whois.net.ng/whois/";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Mozilla/5.0 SupportBuddy/1.0";

/// Shared HTTP client for registrar page requests.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
});

struct Selectors {
    card: Selector,
    header: Selector,
    table: Selector,
    row: Selector,
    pre: Selector,
}

impl Selectors {
    fn build() -> Option<Self> {
        Some(Self {
            card: Selector::parse("div.card").ok()?,
            header: Selector::parse(".card-header").ok()?,
            table: Selector::parse("table").ok()?,
            row: Selector::parse("tr").ok()?,
            pre: Selector::parse("pre").ok()?,
        })
    }
}

/// Compiled once; `None` only if a selector literal above is malformed.
static SELECTORS: LazyLock<Option<Selectors>> = LazyLock::new(Selectors::build);

/// Fetch the raw look-up page for a domain.
pub async fn fetch_registrar_page(domain: &str) -> ToolboxResult<String> {
    debug!("[Registrar] Fetching look-up page for {domain}");

    HTTP_CLIENT
        .get(LOOKUP_URL)
        .query(&[("domain", domain)])
        .send()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("Registrar page request failed: {e}")))?
        .text()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("Failed to read registrar page: {e}")))
}

/// Extract the recognised sections from a registrar look-up page.
///
/// Never fails: malformed or unrelated input simply yields fewer (or no)
/// sections. Rows whose cell count is not exactly two are dropped.
pub fn extract_sections(html: &str) -> RegistrationSections {
    let mut result = RegistrationSections::default();
    let Some(selectors) = SELECTORS.as_ref() else {
        return result;
    };

    let document = Html::parse_document(html);

    for card in document.select(&selectors.card) {
        let Some(header) = card.select(&selectors.header).next() else {
            continue;
        };
        let Some(table) = card.select(&selectors.table).next() else {
            continue;
        };

        let section_name = collapse_whitespace(&element_text(header));
        if !RECOGNIZED_SECTIONS.contains(&section_name.as_str()) {
            debug!("[Registrar] Ignoring card {section_name:?}");
            continue;
        }

        let fields = result.sections.entry(section_name.clone()).or_default();
        read_rows(table, &selectors.row, &section_name, fields);
    }

    result.raw_registry_data = document
        .select(&selectors.pre)
        .map(|pre| element_text(pre).trim().to_string())
        .find(|text| !text.is_empty());

    result
}

fn read_rows(table: ElementRef<'_>, row: &Selector, section: &str, fields: &mut SectionFields) {
    for tr in table.select(row) {
        let cells: Vec<ElementRef<'_>> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();

        let [label_cell, value_cell] = cells.as_slice() else {
            debug!(
                "[Registrar] Dropped row with {} cell(s) in {section:?}",
                cells.len()
            );
            continue;
        };

        let label = element_text(*label_cell);
        let label = label.trim();
        let label = label.strip_suffix(':').unwrap_or(label).trim_end();

        let value = value_cell.text().collect::<Vec<_>>().join(" ");

        fields.insert(label.to_string(), collapse_whitespace(&value));
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{DOMAIN_INFORMATION, RAW_REGISTRY_DATA_KEY, REGISTRAR_INFORMATION};

    fn card(header: &str, rows: &[&[&str]]) -> String {
        let rows: String = rows
            .iter()
            .map(|cells| {
                let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        format!(
            r#"<div class="card mb-4"><h5 class="card-header whois_bg">{header}</h5>
            <div class="card-body"><table class="table">{rows}</table></div></div>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body>{}</body></html>", cards.concat())
    }

    #[test]
    fn test_extract_single_domain_card() {
        let html = page(&[card(DOMAIN_INFORMATION, &[&["Status", "OK Registered"]])]);
        let result = extract_sections(&html);

        assert_eq!(result.sections.len(), 1);
        assert_eq!(
            result.field(DOMAIN_INFORMATION, "Status"),
            Some("OK Registered")
        );
        assert!(result.raw_registry_data.is_none());
    }

    #[test]
    fn test_single_card_json_has_section_at_top_level() {
        let html = page(&[card(DOMAIN_INFORMATION, &[&["Status", "OK Registered"]])]);
        let json = serde_json::to_value(extract_sections(&html)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Domain Information": {"Status": "OK Registered"}})
        );
    }

    #[test]
    fn test_extract_both_sections() {
        let html = page(&[
            card(
                DOMAIN_INFORMATION,
                &[&["Domain:", "example.com.ng"], &["Expiry Date:", "2026-01-01"]],
            ),
            card(REGISTRAR_INFORMATION, &[&["Registrar:", "Web4Africa Ltd"]]),
        ]);
        let result = extract_sections(&html);

        assert_eq!(
            result.field(DOMAIN_INFORMATION, "Domain"),
            Some("example.com.ng")
        );
        assert_eq!(
            result.field(DOMAIN_INFORMATION, "Expiry Date"),
            Some("2026-01-01")
        );
        assert_eq!(
            result.field(REGISTRAR_INFORMATION, "Registrar"),
            Some("Web4Africa Ltd")
        );
    }

    #[test]
    fn test_unrecognized_card_is_ignored() {
        let html = page(&[
            card("Contact Information", &[&["Email", "owner@example.com"]]),
            card(DOMAIN_INFORMATION, &[&["Status", "Active"]]),
        ]);
        let result = extract_sections(&html);

        assert!(result.section("Contact Information").is_none());
        assert_eq!(result.sections.len(), 1);
    }

    #[test]
    fn test_rows_with_wrong_cell_count_are_skipped() {
        let html = page(&[card(
            DOMAIN_INFORMATION,
            &[
                &["Lonely"],
                &["Status", "Active"],
                &["A", "B", "C"],
                &["Created", "2020-02-02"],
            ],
        )]);
        let fields = extract_sections(&html)
            .section(DOMAIN_INFORMATION)
            .cloned()
            .unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("Status").unwrap(), "Active");
        assert_eq!(fields.get("Created").unwrap(), "2020-02-02");
    }

    #[test]
    fn test_multiline_value_joined_with_single_spaces() {
        let html = page(&[card(
            DOMAIN_INFORMATION,
            &[&["Name Servers :", "ns1.host.ng<br>\n   ns2.host.ng"]],
        )]);
        let result = extract_sections(&html);

        assert_eq!(
            result.field(DOMAIN_INFORMATION, "Name Servers"),
            Some("ns1.host.ng ns2.host.ng")
        );
    }

    #[test]
    fn test_only_one_trailing_colon_stripped() {
        let html = page(&[card(DOMAIN_INFORMATION, &[&["Odd::", "x"]])]);
        let result = extract_sections(&html);
        assert_eq!(result.field(DOMAIN_INFORMATION, "Odd:"), Some("x"));
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        let html = page(&[card("\n   Registrar Information \n", &[&["IANA ID", "1234"]])]);
        let result = extract_sections(&html);
        assert_eq!(result.field(REGISTRAR_INFORMATION, "IANA ID"), Some("1234"));
    }

    #[test]
    fn test_card_without_table_contributes_nothing() {
        let html = r#"<div class="card mb-4"><h5 class="card-header">Domain Information</h5>
            <p>Nothing to see</p></div>"#;
        assert!(extract_sections(html).is_empty());
    }

    #[test]
    fn test_raw_pre_block_captured_separately() {
        let html = format!(
            "{}<pre>\n  Domain Name: example.ng\n  Status: ok\n</pre>",
            card(DOMAIN_INFORMATION, &[&["Status", "ok"]])
        );
        let result = extract_sections(&html);

        assert_eq!(
            result.raw_registry_data.as_deref(),
            Some("Domain Name: example.ng\n  Status: ok")
        );
        assert!(result.section(RAW_REGISTRY_DATA_KEY).is_none());
        assert_eq!(result.sections.len(), 1);
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(extract_sections("").is_empty());
        assert!(extract_sections("Error: connection reset").is_empty());
        assert!(extract_sections("<div class=\"card\"><table><tr><td>").is_empty());
        assert!(extract_sections("\u{0}\u{fffd}<<<>>>").is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = page(&[
            card(DOMAIN_INFORMATION, &[&["Status", "OK Registered"], &["x"]]),
            card(REGISTRAR_INFORMATION, &[&["Registrar", "Some Registrar"]]),
        ]);
        assert_eq!(extract_sections(&html), extract_sections(&html));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_fetch_registrar_page_real() {
        let html = fetch_registrar_page("nic.ng").await.unwrap();
        assert!(!html.is_empty());
    }
}
