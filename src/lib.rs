// Library root
// -----------
// The binary (`main.rs`) parses the command line and hands over to `ui`,
// which wires the other modules together for one run.
//
// Module responsibilities:
// - `credentials`: API key from the environment or a hidden prompt.
// - `input`: CVE ids from a CSV column or a literal comma-separated list.
// - `api`: blocking HTTP client for the VulnCheck index endpoints.
// - `aggregate`: the per-CVE control loop and its result counts.
// - `output`: console echo and the combined JSON file.
// - `cli` / `ui`: argument parsing and the interactive terminal flow.
// - `error`: typed errors shared by the library modules.
//
// The control loop only depends on the `api::CveLookup` trait, so it can be
// exercised without a network (see `tests/`).
pub mod aggregate;
pub mod api;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod input;
pub mod output;
pub mod ui;
