//! HTTP transport seam.
//!
//! The refresh routines describe their requests as plain [`Request`] values
//! and hand them to a [`Transport`].  Production uses [`ReqwestTransport`];
//! tests swap in an in-memory fake so the branching on status codes and
//! payloads can be exercised without a network.

use std::future::Future;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Method, StatusCode};

/// Credentials attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Pre-encoded `base64(user:password)`.
    Basic(String),
    Bearer(String),
}

impl Auth {
    pub fn header_value(&self) -> String {
        match self {
            Auth::Basic(encoded) => format!("Basic {encoded}"),
            Auth::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub auth: Option<Auth>,
    /// Sent as `application/x-www-form-urlencoded` when non-empty.
    pub form: Vec<(&'static str, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            auth: None,
            form: Vec::new(),
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(&'static str, String)>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            auth: None,
            form,
        }
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Anything that can perform a [`Request`].
///
/// Errors are network-level failures only; a non-success status is still a
/// successful [`Response`].
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// [`Transport`] backed by an async [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("build reqwest client")?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header(USER_AGENT, concat!("statusdeck/", env!("CARGO_PKG_VERSION")));
        if let Some(auth) = &request.auth {
            builder = builder.header(AUTHORIZATION, auth.header_value());
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let resp = builder
            .send()
            .await
            .with_context(|| format!("{} {}", request.method, request.url))?;
        let status = resp.status();
        let body = resp.bytes().await.context("read response body")?;
        Ok(Response {
            status,
            body: body.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_header_values() {
        assert_eq!(Auth::Basic("abc=".into()).header_value(), "Basic abc=");
        assert_eq!(Auth::Bearer("tok".into()).header_value(), "Bearer tok");
    }

    #[test]
    fn builders_set_method_and_auth() {
        let req = Request::get("https://example.com").with_auth(Auth::Bearer("t".into()));
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.auth, Some(Auth::Bearer("t".into())));
        assert!(req.form.is_empty());

        let req = Request::post_form("https://example.com", vec![("a", "b".into())]);
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.form, vec![("a", "b".to_string())]);
    }

    #[tokio::test]
    async fn fake_routes_by_url_fragment() {
        let fake = fake::FakeTransport::new()
            .route("/ok", 200, "{}")
            .fail("/down", "connection refused");

        let resp = fake.send(Request::get("https://x/ok")).await.unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert!(fake.send(Request::get("https://x/down")).await.is_err());
        assert!(fake.send(Request::get("https://x/other")).await.is_err());
        assert_eq!(fake.urls().len(), 3);
    }
}
