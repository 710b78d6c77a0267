// Control loop: query every CVE in order, keep the bodies that carry
// documents, and stop at the first 401 after handing control to the
// re-authentication hook.

use crate::api::{CveLookup, Endpoint};
use crate::error::{Result, VulnCheckError};
use serde_json::Value;
use tracing::{debug, info, warn};

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Retained response bodies, in processing order.
    pub results: Vec<Value>,
    /// Number of identifiers supplied, including ones never attempted.
    pub total: usize,
    /// Number of identifiers actually queried.
    pub attempted: usize,
    /// Identifier whose request came back 401, if the run was cut short.
    pub unauthorized: Option<String>,
}

impl Aggregate {
    pub fn retained(&self) -> usize {
        self.results.len()
    }

    /// Identifiers that were never queried because of an early stop.
    pub fn skipped(&self) -> usize {
        self.total - self.attempted
    }

    /// Operator-facing count line.
    pub fn summary(&self) -> String {
        format!(
            "{} out of {} provided CVEs returned a response",
            self.retained(),
            self.total
        )
    }
}

/// False only when `_meta.total_documents` is present and equal to zero.
/// `false` counts as zero; strings and other shapes never do.
pub fn has_documents(body: &Value) -> bool {
    match body.pointer("/_meta/total_documents") {
        Some(Value::Number(n)) => n.as_f64().map_or(true, |n| n != 0.0),
        Some(Value::Bool(b)) => *b,
        _ => true,
    }
}

/// Query each id in `cves` against `endpoint`.
///
/// On a 401 the loop calls `reauth` with the offending id, takes the
/// lookup it returns as the current one, and stops. The current lookup is
/// handed back together with the aggregate so the caller keeps the
/// refreshed client.
///
/// Transport errors and non-JSON bodies abort the whole run.
pub fn run<L, F>(
    mut lookup: L,
    cves: &[String],
    endpoint: Endpoint,
    mut reauth: F,
) -> Result<(Aggregate, L)>
where
    L: CveLookup,
    F: FnMut(&str) -> Result<L>,
{
    let mut agg = Aggregate {
        total: cves.len(),
        ..Aggregate::default()
    };

    for cve in cves {
        agg.attempted += 1;
        let response = lookup.lookup(cve, endpoint)?;

        if response.is_unauthorized() {
            warn!(cve = cve.as_str(), "unauthorized; stopping after re-authentication");
            agg.unauthorized = Some(cve.clone());
            lookup = reauth(cve)?;
            break;
        }
        if !response.status.is_success() {
            warn!(cve = cve.as_str(), status = %response.status, "non-success status");
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|source| {
            VulnCheckError::MalformedResponse {
                cve: cve.clone(),
                source,
            }
        })?;

        if has_documents(&body) {
            agg.results.push(body);
        } else {
            debug!(cve = cve.as_str(), "no documents");
        }
    }

    info!(
        retained = agg.retained(),
        attempted = agg.attempted,
        total = agg.total,
        "run finished"
    );
    Ok((agg, lookup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_count_is_empty() {
        assert!(!has_documents(&json!({"_meta": {"total_documents": 0}, "data": []})));
        assert!(!has_documents(&json!({"_meta": {"total_documents": 0.0}})));
        assert!(!has_documents(&json!({"_meta": {"total_documents": false}})));
    }

    #[test]
    fn missing_or_non_zero_count_has_documents() {
        assert!(has_documents(&json!({"_meta": {"total_documents": 3}})));
        assert!(has_documents(&json!({"_meta": {}})));
        assert!(has_documents(&json!({"data": []})));
        assert!(has_documents(&json!({"_meta": {"total_documents": "0"}})));
        assert!(has_documents(&json!([1, 2])));
        assert!(has_documents(&json!({"_meta": {"total_documents": true}})));
        assert!(has_documents(&json!({"_meta": {"total_documents": null}})));
    }

    #[test]
    fn summary_uses_full_total() {
        let agg = Aggregate {
            results: vec![json!({})],
            total: 5,
            attempted: 2,
            unauthorized: Some("CVE-2".into()),
        };
        assert_eq!(agg.summary(), "1 out of 5 provided CVEs returned a response");
        assert_eq!(agg.skipped(), 3);
    }
}
