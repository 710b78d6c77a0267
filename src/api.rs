// API client module: a small blocking HTTP client for the VulnCheck
// index API. One GET per CVE id, bearer authentication, no retries.

use crate::credentials::Credential;
use crate::error::{Result, VulnCheckError};
use clap::ValueEnum;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Public VulnCheck index API.
pub const DEFAULT_BASE_URL: &str = "https://api.vulncheck.com/v3/index";

/// Index queried for every CVE id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Endpoint {
    /// NVD 2.0 records enriched by VulnCheck
    #[default]
    #[value(name = "vulncheck-nvd2")]
    VulncheckNvd2,
    /// Known exploits
    Exploits,
    /// Initial-access intelligence
    InitialAccess,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [
        Endpoint::VulncheckNvd2,
        Endpoint::Exploits,
        Endpoint::InitialAccess,
    ];

    /// Path segment appended to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::VulncheckNvd2 => "vulncheck-nvd2",
            Endpoint::Exploits => "exploits",
            Endpoint::InitialAccess => "initial-access",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Transport settings shared by every client built during a run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Raw result of one lookup: status code plus the unparsed body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

/// Anything that can answer a CVE query. `ApiClient` talks HTTP; tests
/// plug in scripted responses.
pub trait CveLookup {
    fn lookup(&self, cve: &str, endpoint: Endpoint) -> Result<ApiResponse>;
}

/// Blocking client bound to one credential. A new credential means a new
/// client; there is no way to swap the token in place.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client that sends `credential` as a bearer token on every
    /// request.
    pub fn new(credential: &Credential, config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(auth_headers(credential)?)
            .timeout(config.timeout)
            .build()?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `<base>/<endpoint>?CVE=<id>`, with the id URL-encoded.
    pub fn request_url(&self, cve: &str, endpoint: Endpoint) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, endpoint.path());
        Url::parse_with_params(&raw, &[("CVE", cve)]).map_err(|e| {
            VulnCheckError::InvalidBaseUrl {
                url: raw.clone(),
                reason: e.to_string(),
            }
        })
    }
}

impl CveLookup for ApiClient {
    fn lookup(&self, cve: &str, endpoint: Endpoint) -> Result<ApiResponse> {
        let url = self.request_url(cve, endpoint)?;
        debug!(%url, "GET");
        let res = self.client.get(url).send()?;
        let status = res.status();
        let body = res.text()?;
        debug!(cve, %status, bytes = body.len(), "response received");
        Ok(ApiResponse { status, body })
    }
}

/// Authorization and content-type headers for every request. The token
/// header is marked sensitive so it never shows up in debug output.
fn auth_headers(credential: &Credential) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
        .map_err(|_| VulnCheckError::InvalidCredential)?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let cred = Credential::new("token").unwrap();
        let config = ClientConfig {
            base_url: base.into(),
            ..ClientConfig::default()
        };
        ApiClient::new(&cred, &config).unwrap()
    }

    #[test]
    fn url_joins_base_endpoint_and_cve() {
        let url = client(DEFAULT_BASE_URL)
            .request_url("CVE-2021-44228", Endpoint::Exploits)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.vulncheck.com/v3/index/exploits?CVE=CVE-2021-44228"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let url = client("http://localhost:8080/v3/index/")
            .request_url("CVE-1", Endpoint::InitialAccess)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v3/index/initial-access?CVE=CVE-1"
        );
    }

    #[test]
    fn cve_query_value_is_encoded() {
        let url = client(DEFAULT_BASE_URL)
            .request_url("CVE 1&x=2", Endpoint::VulncheckNvd2)
            .unwrap();
        assert_eq!(url.query(), Some("CVE=CVE+1%26x%3D2"));
    }

    #[test]
    fn default_endpoint_is_nvd2() {
        assert_eq!(Endpoint::default().path(), "vulncheck-nvd2");
        assert_eq!(Endpoint::InitialAccess.to_string(), "initial-access");
    }

    #[test]
    fn credential_with_newline_is_rejected() {
        let cred = Credential::new("abc\ndef").unwrap();
        let err = ApiClient::new(&cred, &ClientConfig::default()).err().unwrap();
        assert!(matches!(err, VulnCheckError::InvalidCredential));
    }

    #[test]
    fn unparsable_base_url_is_reported() {
        let err = client("not a url")
            .request_url("CVE-1", Endpoint::Exploits)
            .unwrap_err();
        assert!(matches!(err, VulnCheckError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn only_401_counts_as_unauthorized() {
        let resp = |status| ApiResponse {
            status,
            body: String::new(),
        };
        assert!(resp(StatusCode::UNAUTHORIZED).is_unauthorized());
        assert!(!resp(StatusCode::FORBIDDEN).is_unauthorized());
        assert!(!resp(StatusCode::OK).is_unauthorized());
    }
}
