// Credential handling: the API key comes from `VULNCHECK_API_KEY` or, when
// that is unset, from a hidden prompt. It is only ever held in memory.

use crate::error::Result;
use dialoguer::Password;
use std::fmt;
use tracing::debug;

/// Environment variable holding the VulnCheck API key.
pub const API_KEY_ENV: &str = "VULNCHECK_API_KEY";

/// Bearer token for the VulnCheck API. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token, trimming surrounding whitespace. Returns `None`
    /// for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(Credential(token.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Resolve a credential from the environment, prompting the operator if
/// the variable is missing or blank.
pub fn resolve() -> Result<Credential> {
    resolve_with(std::env::var(API_KEY_ENV).ok(), prompt_for_key)
}

/// Core of [`resolve`]: use `env_value` if it holds a token, otherwise keep
/// calling `prompt` until it returns something non-blank.
pub fn resolve_with<F>(env_value: Option<String>, mut prompt: F) -> Result<Credential>
where
    F: FnMut() -> Result<String>,
{
    if let Some(cred) = env_value.as_deref().and_then(Credential::new) {
        debug!("using API key from {}", API_KEY_ENV);
        return Ok(cred);
    }
    loop {
        if let Some(cred) = Credential::new(&prompt()?) {
            return Ok(cred);
        }
    }
}

/// Drop the key from the process environment so the next [`resolve`]
/// falls through to the prompt.
pub fn discard() {
    std::env::remove_var(API_KEY_ENV);
}

fn prompt_for_key() -> Result<String> {
    // `Password` hides the typed key in the terminal.
    let key = Password::new()
        .with_prompt("Enter your API key")
        .interact()?;
    Ok(key)
}
