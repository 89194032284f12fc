//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! The seam between request preparation and the network.
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::future::Future;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use crate::error::{ia_error, user_agent, DataApiError};
use crate::params::{to_query_pairs, WireParams};
use crate::response::RawOutcome;
use crate::session::{is_invalid_token, DataApiSession};

/// HTTP method of a [`WireRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// A fully validated and normalized request, ready for a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: Method,
    /// Path segments below the database endpoint, not yet percent-encoded.
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// The per-call timeout, passed through unchanged. `None` means the
    /// transport's own default applies.
    pub timeout: Option<Duration>,
}

impl WireRequest {
    pub(crate) fn new(method: Method, path: &[&str]) -> WireRequest {
        WireRequest {
            method,
            path: path.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub(crate) fn query(mut self, params: &WireParams) -> Self {
        self.query = to_query_pairs(params);
        self
    }

    pub(crate) fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub(crate) fn timeout(mut self, t: Option<Duration>) -> Self {
        self.timeout = t;
        self
    }

    /// The path segments joined with `/`.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    /// Look up a wire parameter by name, in the query string or the JSON body.
    /// Non-string body values are returned as JSON text.
    pub fn param(&self, key: &str) -> Option<String> {
        if let Some((_, v)) = self.query.iter().find(|(k, _)| k == key) {
            return Some(v.clone());
        }
        match self.body.as_ref().and_then(|b| b.get(key)) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }

    /// All wire parameter names, query first, then body members.
    pub fn param_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.query.iter().map(|(k, _)| k.clone()).collect();
        if let Some(Value::Object(m)) = &self.body {
            names.extend(m.keys().cloned());
        }
        names
    }
}

/// Sends a [`WireRequest`] and reports what happened.
///
/// Implementations never fail: network errors and timeouts are reported as
/// [`RawOutcome::Failed`] with a transport error code.
pub trait Transport: Send + Sync {
    fn send(&self, req: &WireRequest) -> impl Future<Output = RawOutcome> + Send;
}

/// The default [`Transport`], using a [`reqwest::Client`] and a Data API session.
///
/// Cloning is cheap and shares the underlying client and session.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    inner: Arc<HttpTransportRef>,
}

#[derive(Debug)]
struct HttpTransportRef {
    client: reqwest::Client,
    endpoint: Url,
    session: DataApiSession,
    timeout: Duration,
}

impl HttpTransport {
    pub(crate) fn new(
        client: reqwest::Client,
        endpoint: Url,
        session: DataApiSession,
        timeout: Duration,
    ) -> HttpTransport {
        HttpTransport {
            inner: Arc::new(HttpTransportRef {
                client,
                endpoint,
                session,
                timeout,
            }),
        }
    }

    /// The database endpoint all request paths are relative to.
    pub fn endpoint(&self) -> &str {
        self.inner.endpoint.as_str()
    }

    /// End the current Data API session, if there is one.
    pub async fn logout(&self) -> Result<(), DataApiError> {
        self.inner.session.logout(&self.inner.client).await
    }

    fn url_for(&self, req: &WireRequest) -> Result<Url, DataApiError> {
        let mut u = self.inner.endpoint.clone();
        u.path_segments_mut()
            .map_err(|_| ia_error!("endpoint {} cannot take a path", self.inner.endpoint))?
            .extend(req.path.iter());
        if !req.query.is_empty() {
            u.query_pairs_mut().extend_pairs(req.query.iter());
        }
        Ok(u)
    }

    async fn send_once(&self, req: &WireRequest, renew: bool) -> Result<(u16, String), DataApiError> {
        let url = self.url_for(req)?;
        let mut headers = HeaderMap::new();
        self.inner
            .session
            .add_required_headers(&self.inner.client, &mut headers, renew)
            .await?;
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent())?);
        let client = &self.inner.client;
        let mut rb = match req.method {
            Method::Get => client.get(url),
            Method::Post => client.post(url),
            Method::Patch => client.patch(url),
            Method::Delete => client.delete(url),
        };
        rb = rb
            .headers(headers)
            .timeout(req.timeout.unwrap_or(self.inner.timeout));
        if let Some(b) = &req.body {
            rb = rb.json(b);
        }
        let resp = rb.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        trace!("{:?} {} -> {}", req.method, req.path_string(), status);
        Ok((status, body))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, req: &WireRequest) -> RawOutcome {
        let mut outcome = self.send_once(req, false).await;
        // An expired token is renewed once; any other answer is final.
        if let Ok((_, body)) = &outcome {
            if is_invalid_token(body) {
                debug!("session token rejected, logging in again");
                outcome = self.send_once(req, true).await;
            }
        }
        match outcome {
            Ok((status, body)) => RawOutcome::Response { status, body },
            Err(e) => RawOutcome::Failed(e),
        }
    }
}
