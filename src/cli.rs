// Command-line surface. Everything here is optional: whatever is missing
// (input source, endpoint, count-only mode) is asked for interactively.

use crate::api::{ClientConfig, Endpoint, DEFAULT_BASE_URL};
use crate::input::DEFAULT_COLUMN;
use crate::output::DEFAULT_OUTPUT;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "vulncheck-cli")]
#[command(version, about = "Query the VulnCheck index API for a list of CVEs", long_about = None)]
#[command(after_help = "ENVIRONMENT:
    VULNCHECK_API_KEY   API key (prompted for when unset)

EXAMPLES:
    # Exploit data for two CVEs
    vulncheck-cli -e \"CVE-2021-1234,CVE-2021-2345\"

    # Counts only, ids from the CVE_ID column of a CSV file
    vulncheck-cli -c cves.csv

    # Fully interactive
    vulncheck-cli")]
pub struct Cli {
    /// CSV file (*.csv) or comma-separated list of CVE ids
    pub input: Option<String>,

    /// Query the vulncheck-nvd2 index (default)
    #[arg(short = 'v', long = "vulncheck-nvd2", group = "endpoint_flag")]
    pub nvd2: bool,

    /// Query the exploits index
    #[arg(short = 'e', long, group = "endpoint_flag")]
    pub exploits: bool,

    /// Query the initial-access index
    #[arg(long = "iai", visible_alias = "initial-access", group = "endpoint_flag")]
    pub initial_access: bool,

    /// Index to query, by name
    #[arg(long, value_enum, group = "endpoint_flag")]
    pub endpoint: Option<Endpoint>,

    /// Only print how many CVEs returned data
    #[arg(short, long)]
    pub count_only: bool,

    /// CSV column holding the CVE ids
    #[arg(long, default_value = DEFAULT_COLUMN)]
    pub column: String,

    /// File receiving the combined JSON results
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// API base URL
    #[arg(long, env = "VULNCHECK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Endpoint chosen on the command line, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        if self.nvd2 {
            Some(Endpoint::VulncheckNvd2)
        } else if self.exploits {
            Some(Endpoint::Exploits)
        } else if self.initial_access {
            Some(Endpoint::InitialAccess)
        } else {
            self.endpoint
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}
