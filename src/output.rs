// Output writer: 4-space indented JSON, both for the console echo and for
// the combined results file.

use crate::error::{Result, VulnCheckError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default name of the combined results file.
pub const DEFAULT_OUTPUT: &str = "output.json";

/// Serialize `value` with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Print every retained body to `out`, one indented document each.
pub fn print_results<W: Write>(out: &mut W, results: &[Value]) -> Result<()> {
    for body in results {
        writeln!(out, "{}", to_pretty_json(body)?)?;
    }
    Ok(())
}

/// Write `results` as a JSON array to `path`, replacing any existing file.
/// Nothing is written when `results` is empty; the return value says
/// whether a file was produced.
pub fn write_results(path: &Path, results: &[Value]) -> Result<bool> {
    if results.is_empty() {
        return Ok(false);
    }
    let json = to_pretty_json(results)?;

    // Write next to the target and rename so a failed run never leaves a
    // half-written file behind.
    let tmp = tmp_path(path);
    fs::write(&tmp, json).map_err(|source| VulnCheckError::Io {
        path: tmp.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(VulnCheckError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(path = %path.display(), count = results.len(), "results written");
    Ok(true)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
