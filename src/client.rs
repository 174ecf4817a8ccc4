//! Typed client for the query API, spoken through the gateway.
//!
//! This is the caller side of the identity header contract: it attaches the
//! assertion and the four identity headers to every request. Unlike the
//! gateway it does decode responses, so citations get a structure here.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::contract;

/// Default number of chunks requested from the debug endpoint.
pub const DEFAULT_RAW_CHUNKS: u32 = 5;

/// Request timeout of the client built by [`QueryClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors returned by [`QueryClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid header value for {name}")]
    Header { name: &'static str },

    #[error("query failed: {status} {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Identity presented by the caller.
///
/// The defaults mirror what the console offers before a user edits them;
/// the backend decides what they are worth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub api_key: String,
    pub user_email: String,
    pub user_domain: String,
    pub user_clearance: u8,
}

impl Default for CallerIdentity {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            user_email: "dev@example.com".to_string(),
            user_domain: "engineering".to_string(),
            user_clearance: 2,
        }
    }
}

impl CallerIdentity {
    /// Render the identity as contract headers.
    pub fn to_headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        for (name, label, value) in [
            (contract::API_KEY, "X-API-Key", self.api_key.clone()),
            (contract::USER_EMAIL, "X-User-Email", self.user_email.clone()),
            (contract::USER_DOMAIN, "X-User-Domain", self.user_domain.clone()),
            (contract::USER_CLEARANCE, "X-User-Clearance", self.user_clearance.to_string()),
        ] {
            let value =
                HeaderValue::from_str(&value).map_err(|_| ClientError::Header { name: label })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

/// A single value inside a citation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CitationValue {
    Text(String),
    Number(serde_json::Number),
    Null,
}

/// A source reference such as `{source, page}` or `{doc_id, section}`.
/// No field is required.
pub type Citation = BTreeMap<String, CitationValue>;

/// Answer returned by `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Fields the backend adds beyond the answer and citations.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Client for the query API.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    base_url: Url,
    identity: CallerIdentity,
    assertion: Option<String>,
}

impl QueryClient {
    pub fn new(base_url: &str, identity: CallerIdentity) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?,
            base_url: Url::parse(base_url)?,
            identity,
            assertion: None,
        })
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Attach an identity assertion, required when talking to the gateway.
    pub fn with_assertion(mut self, assertion: impl Into<String>) -> Self {
        self.assertion = Some(assertion.into());
        self
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", prefix, path));
        url
    }

    fn headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = self.identity.to_headers()?;
        if let Some(ref assertion) = self.assertion {
            let value = HeaderValue::from_str(assertion).map_err(|_| ClientError::Header {
                name: "CF-Access-Jwt-Assertion",
            })?;
            headers.insert(contract::ASSERTION, value);
        }
        Ok(headers)
    }

    /// Ask a question via `POST /query`.
    pub async fn run_query(&self, query: &str) -> Result<QueryResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/query"))
            .headers(self.headers()?)
            .json(&QueryBody { query })
            .send()
            .await?;

        let text = checked_text(response).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch raw retrieval chunks via `GET /debug/raw_chunks_get`.
    pub async fn fetch_raw_chunks(&self, q: &str, k: u32) -> Result<serde_json::Value, ClientError> {
        let mut url = self.endpoint("/debug/raw_chunks_get");
        url.query_pairs_mut()
            .append_pair("q", q)
            .append_pair("k", &k.to_string());

        let response = self.http.get(url).headers(self.headers()?).send().await?;

        let text = checked_text(response).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

async fn checked_text(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_headers() {
        let identity = CallerIdentity {
            api_key: "123456789".into(),
            ..Default::default()
        };
        let headers = identity.to_headers().unwrap();

        assert_eq!(headers["x-api-key"], "123456789");
        assert_eq!(headers["x-user-email"], "dev@example.com");
        assert_eq!(headers["x-user-domain"], "engineering");
        assert_eq!(headers["x-user-clearance"], "2");
    }

    #[test]
    fn test_invalid_identity_value() {
        let identity = CallerIdentity {
            user_email: "line\nbreak".into(),
            ..Default::default()
        };
        assert!(matches!(
            identity.to_headers(),
            Err(ClientError::Header { name: "X-User-Email" })
        ));
    }

    #[test]
    fn test_citations_are_schema_less() {
        let response: QueryResponse = serde_json::from_str(
            r#"{
                "answer": "Employees are reimbursed...",
                "citations": [
                    {"source": "travel_policy.pdf", "page": 3},
                    {"index": 1, "doc_id": null, "section": "4.2", "distance": 0.12}
                ],
                "domain": "finance",
                "clearance": 2
            }"#,
        )
        .unwrap();

        assert_eq!(response.citations.len(), 2);
        assert_eq!(
            response.citations[0]["source"],
            CitationValue::Text("travel_policy.pdf".into())
        );
        assert_eq!(response.citations[0]["page"], CitationValue::Number(serde_json::Number::from(3u64)));
        assert_eq!(response.citations[1]["doc_id"], CitationValue::Null);
        assert_eq!(response.extra["domain"], "finance");
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let client = QueryClient::new("https://edge.example.com/api/", CallerIdentity::default())
            .unwrap();
        assert_eq!(
            client.endpoint("/query").as_str(),
            "https://edge.example.com/api/query"
        );
    }

    #[test]
    fn test_default_timeout_matches_gateway_request_timeout() {
        assert_eq!(
            DEFAULT_TIMEOUT,
            crate::config::TimeoutConfig::default().request()
        );
        assert!(QueryClient::new("http://localhost:8080", CallerIdentity::default()).is_ok());
    }
}
