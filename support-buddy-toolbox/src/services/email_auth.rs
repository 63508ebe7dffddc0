//! SPF and DMARC check.

use log::debug;

use crate::error::ToolboxResult;
use crate::types::EmailAuthReport;

use super::dns;

/// Read SPF from the domain apex and DMARC from `_dmarc.<domain>`.
///
/// `domain` must already be validated. Either look-up failing fails the check.
pub async fn email_auth_check(domain: &str) -> ToolboxResult<EmailAuthReport> {
    let dmarc_name = format!("_dmarc.{domain}");
    let (root_txt, dmarc_txt) = futures::join!(
        dns::txt_records(domain),
        dns::txt_records(&dmarc_name)
    );
    let report = assess(domain, &root_txt?, &dmarc_txt?);
    debug!(
        "[EmailAuth] {domain}: {} SPF, {} DMARC, {} warning(s)",
        report.spf.len(),
        report.dmarc.len(),
        report.warnings.len()
    );
    Ok(report)
}

fn assess(domain: &str, root_txt: &[String], dmarc_txt: &[String]) -> EmailAuthReport {
    let spf: Vec<String> = root_txt
        .iter()
        .filter(|txt| is_tagged(txt, "v=spf1"))
        .cloned()
        .collect();
    let dmarc: Vec<String> = dmarc_txt
        .iter()
        .filter(|txt| is_tagged(txt, "v=dmarc1"))
        .cloned()
        .collect();
    let dmarc_policy = dmarc.first().and_then(|record| dmarc_tag(record, "p"));

    let mut warnings = Vec::new();
    match spf.as_slice() {
        [] => warnings.push(format!(
            "No SPF record on {domain}; mail from this domain is likely to be marked as spam"
        )),
        [record] => {
            if record.to_lowercase().contains("+all") {
                warnings.push("SPF ends in +all, which lets any server send as this domain".to_string());
            }
        }
        _ => warnings.push(format!(
            "{} SPF records found; receivers treat more than one as a permanent error",
            spf.len()
        )),
    }

    if dmarc.is_empty() {
        warnings.push(format!("No DMARC record at _dmarc.{domain}"));
    } else if dmarc_policy.as_deref() == Some("none") {
        warnings.push("DMARC policy is p=none; failing mail is only reported".to_string());
    }

    EmailAuthReport {
        domain: domain.to_string(),
        spf,
        dmarc,
        dmarc_policy,
        warnings,
    }
}

/// `txt` starts with the version tag, ignoring case.
fn is_tagged(txt: &str, version: &str) -> bool {
    txt.trim_start()
        .get(..version.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(version))
}

/// Value of `tag` in a `k=v; k=v` DMARC record, lower-cased.
fn dmarc_tag(record: &str, tag: &str) -> Option<String> {
    record
        .split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(tag))
        .map(|(_, value)| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
}
