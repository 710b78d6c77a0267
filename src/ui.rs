// UI layer: drives one run from the terminal. Prompts (via `dialoguer`)
// fill in whatever the command line left out, an `indicatif` bar shows
// progress while the CVEs are queried, and the results are reported at
// the end.

use crate::aggregate::{self, Aggregate};
use crate::api::{ApiClient, ApiResponse, ClientConfig, CveLookup, Endpoint};
use crate::cli::Cli;
use crate::credentials;
use crate::error;
use crate::input;
use crate::output;
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Per-run choices, either from flags or from the prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub input: String,
    pub endpoint: Endpoint,
    pub count_only: bool,
}

/// Run the whole flow: credential, input, queries, report.
pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.client_config();

    let credential = credentials::resolve().context("Failed to obtain API key")?;
    let client = ApiClient::new(&credential, &config).context("Failed to build HTTP client")?;

    let session = collect_session(cli)?;
    let cves = input::read_cve_ids(&session.input, &cli.column)
        .with_context(|| format!("Failed to read CVE ids from '{}'", session.input))?;
    info!(count = cves.len(), endpoint = %session.endpoint, "starting run");

    let bar = progress_bar(cves.len())?;
    let tracked = Tracked {
        inner: client,
        bar: &bar,
    };
    let (agg, _client) = aggregate::run(tracked, &cves, session.endpoint, |cve| {
        reauthenticate(cve, &config, &bar)
    })?;
    bar.finish_and_clear();

    report(&mut io::stdout().lock(), &agg, session.count_only, &cli.output)
}

/// Take the session from the command line when an input was given there,
/// otherwise ask for it.
fn collect_session(cli: &Cli) -> Result<Session> {
    if let Some(input) = &cli.input {
        return Ok(Session {
            input: input.clone(),
            endpoint: cli.endpoint().unwrap_or_default(),
            count_only: cli.count_only,
        });
    }

    let input: String = Input::new()
        .with_prompt("CSV file or comma-separated CVE list")
        .allow_empty(true)
        .interact_text()?;

    let endpoint = match cli.endpoint() {
        Some(endpoint) => endpoint,
        None => {
            let labels: Vec<&str> = Endpoint::ALL.iter().map(|e| e.path()).collect();
            // `Select` is keyboard-driven: arrow keys and Enter.
            let choice = Select::new()
                .with_prompt("Endpoint")
                .items(&labels)
                .default(0)
                .interact()?;
            Endpoint::ALL[choice]
        }
    };

    let count_only = cli.count_only
        || Confirm::new()
            .with_prompt("Show counts only?")
            .default(false)
            .interact()?;

    Ok(Session {
        input,
        endpoint,
        count_only,
    })
}

/// Called on a 401: tell the operator, forget the rejected key and build a
/// client from a freshly entered one.
fn reauthenticate<'a>(
    cve: &str,
    config: &ClientConfig,
    bar: &'a ProgressBar,
) -> error::Result<Tracked<'a, ApiClient>> {
    bar.suspend(|| {
        println!("{}", unauthorized_notice(cve).red());
        credentials::discard();
        let credential = credentials::resolve()?;
        Ok(Tracked {
            inner: ApiClient::new(&credential, config)?,
            bar,
        })
    })
}

fn unauthorized_notice(cve: &str) -> String {
    format!("Unauthorized access for CVE {cve}. Please enter a valid API key.")
}

/// Count line, optional body echo, then the output file and its notice.
fn report<W: Write>(
    out: &mut W,
    agg: &Aggregate,
    count_only: bool,
    out_path: &Path,
) -> Result<()> {
    writeln!(out, "{}", agg.summary())?;
    if agg.unauthorized.is_some() && agg.skipped() > 0 {
        writeln!(
            out,
            "{} CVEs were not queried. Re-run to process them with the new key.",
            agg.skipped()
        )?;
    }

    if !count_only {
        output::print_results(out, &agg.results)?;
    }

    let written = output::write_results(out_path, &agg.results)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    if written {
        writeln!(
            out,
            "{}",
            format!("Combined JSON data has been saved to {}", out_path.display()).green()
        )?;
    }
    Ok(())
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")?);
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

/// Lookup wrapper that advances the progress bar around every request.
struct Tracked<'a, L> {
    inner: L,
    bar: &'a ProgressBar,
}

impl<L: CveLookup> CveLookup for Tracked<'_, L> {
    fn lookup(&self, cve: &str, endpoint: Endpoint) -> error::Result<ApiResponse> {
        self.bar.set_message(format!("Querying {cve}..."));
        let response = self.inner.lookup(cve, endpoint);
        self.bar.inc(1);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn aggregate(results: Vec<serde_json::Value>, total: usize) -> Aggregate {
        Aggregate {
            attempted: total,
            results,
            total,
            unauthorized: None,
        }
    }

    fn run_report(agg: &Aggregate, count_only: bool) -> (String, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        report(&mut out, agg, count_only, &dir.path().join("output.json")).unwrap();
        (String::from_utf8(out).unwrap(), dir)
    }

    #[test]
    fn notice_names_the_rejected_cve() {
        assert_eq!(
            unauthorized_notice("CVE-2021-2345"),
            "Unauthorized access for CVE CVE-2021-2345. Please enter a valid API key."
        );
    }

    #[test]
    fn full_report_prints_summary_then_bodies_then_saved_line() {
        let agg = aggregate(vec![json!({"id": "first"}), json!({"id": "second"})], 2);
        let (text, dir) = run_report(&agg, false);

        let summary = text.find("2 out of 2 provided CVEs returned a response").unwrap();
        let first = text.find("\"first\"").unwrap();
        let second = text.find("\"second\"").unwrap();
        let saved = text.find("Combined JSON data has been saved to").unwrap();
        assert!(summary < first && first < second && second < saved);
        assert!(text.contains("{\n    \"id\": \"first\"\n}"));
        assert!(dir.path().join("output.json").exists());
    }

    #[test]
    fn count_only_hides_bodies_but_still_writes_file() {
        let agg = aggregate(vec![json!({"id": "first"})], 3);
        let (text, dir) = run_report(&agg, true);

        assert!(text.starts_with("1 out of 3 provided CVEs returned a response\n"));
        assert!(!text.contains("\"first\""));
        assert!(text.contains("Combined JSON data has been saved to"));
        let written: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(dir.path().join("output.json")).unwrap())
                .unwrap();
        assert_eq!(written, agg.results);
    }

    #[test]
    fn empty_results_report_no_saved_line() {
        let agg = aggregate(vec![], 2);
        let (text, dir) = run_report(&agg, false);

        assert_eq!(text, "0 out of 2 provided CVEs returned a response\n");
        assert!(!dir.path().join("output.json").exists());
    }

    #[test]
    fn skipped_cves_are_mentioned_after_unauthorized() {
        let agg = Aggregate {
            results: vec![json!({"id": "first"})],
            total: 3,
            attempted: 2,
            unauthorized: Some("CVE-2".into()),
        };
        let (text, _dir) = run_report(&agg, true);

        assert!(text.contains("1 out of 3 provided CVEs returned a response"));
        assert!(text.contains("1 CVEs were not queried."));
    }
}
