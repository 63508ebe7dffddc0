//! Support desk toolbox.
//!
//! Two pure cores sit at the centre: [`extract_sections`] turns a registrar
//! look-up page into structured sections, and [`classify_ticket`] turns a
//! support ticket into a category, checklists, knowledge-base links and a
//! reply draft. Around them are the optional AI analyzer with its keyword
//! fallback and a set of network and text diagnostics used while answering
//! tickets, including WHOIS, TLS certificate, name server and SPF/DMARC checks.

mod error;
mod services;
mod types;

pub use error::{ToolboxError, ToolboxResult};
pub use services::ai::{
    AiTicketPayload, DEFAULT_AI_TIMEOUT_SECS, DEFAULT_GEMINI_MODEL, GeminiTicketAnalyzer,
    Screenshot, TicketAnalyzer, TicketRequest, analyze_ticket, parse_ai_response,
};
pub use services::email_headers::{KEY_HEADERS, parse_email_headers};
pub use services::knowledge_base::{
    KNOWLEDGE_BASE, KbArticle, MAX_SEARCH_RESULTS, MAX_TICKET_ARTICLES, articles_for_terms,
    search_kb,
};
pub use services::password::{GENERATED_LENGTH, generate_password, password_strength};
pub use services::permissions::{permissions_from_numeric, permissions_from_symbolic};
pub use services::rate_limit::{
    DEFAULT_MAX_CALLS, DEFAULT_WINDOW, RateLimitResult, SlidingWindowLimiter,
};
pub use services::registrar_page::{extract_sections, fetch_registrar_page};
pub use services::storage::convert_storage;
pub use services::text::{case_variants, line_tools, text_stats};
pub use services::ticket::{
    CATEGORY_RULES, CLIENT_IP_PLACEHOLDER, CLIENT_PLACEHOLDER, CategoryRule, DOMAIN_PLACEHOLDER,
    GENERAL_SUPPORT, TicketFields, classify_ticket, match_rule, rule_for,
};
pub use services::validate::{validate_domain, validate_email, validate_ip};
pub use services::{
    DEFAULT_TLS_PORT, HTACCESS_HTTPS_REDIRECT, MAX_REDIRECTS, SUPPORTED_RECORD_TYPES,
    ToolboxService, scan_mixed_content,
};
pub use types::*;
