//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use base64::prelude::{Engine as _, BASE64_STANDARD};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_derive::Deserialize;
use std::fmt;
use std::result::Result;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::error::{ia_error, DataApiError, DataApiErrorCode};

const TOKEN_HEADER: &str = "X-FM-Data-Access-Token";

// The service drops sessions after 15 idle minutes. Log in again a little earlier.
const MAX_IDLE_MILLIS: i64 = 14 * 60 * 1000;

// Data API session, shared by all clones of a transport.
#[derive(Clone, Debug)]
pub(crate) struct DataApiSession {
    inner: Arc<DataApiSessionRef>,
}

pub(crate) struct DataApiSessionRef {
    username: String,
    password: String,
    endpoint: Url,
    // We use a tokio Mutex because the lock is held across the login request
    token: tokio::sync::Mutex<SessionToken>,
}

impl fmt::Debug for DataApiSessionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataApiSessionRef")
            .field("username", &self.username)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Default, Debug)]
struct SessionToken {
    token: String,
    last_used: i64,
}

#[derive(Default, Debug, Deserialize)]
struct LoginReply {
    #[serde(default)]
    response: LoginResponse,
    #[serde(default)]
    messages: Vec<ReplyMessage>,
}

#[derive(Default, Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: String,
}

#[derive(Default, Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl DataApiSession {
    pub(crate) fn new(database_endpoint: &Url, user: &str, pass: &str) -> DataApiSession {
        DataApiSession {
            inner: Arc::new(DataApiSessionRef {
                username: user.to_string(),
                password: pass.to_string(),
                endpoint: database_endpoint.clone(),
                token: tokio::sync::Mutex::new(SessionToken::default()),
            }),
        }
    }

    pub(crate) async fn add_required_headers(
        &self,
        client: &Client,
        headers: &mut HeaderMap,
        renew: bool,
    ) -> Result<(), DataApiError> {
        let mut bearer = self.token(client, renew).await?;
        bearer.insert_str(0, "Bearer ");
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
        Ok(())
    }

    fn url(&self, segments: &[&str]) -> Result<Url, DataApiError> {
        let mut u = self.inner.endpoint.clone();
        u.path_segments_mut()
            .map_err(|_| ia_error!("endpoint {} cannot take a path", self.inner.endpoint))?
            .extend(segments);
        Ok(u)
    }

    async fn token(&self, client: &Client, renew: bool) -> Result<String, DataApiError> {
        let mut tguard = self.inner.token.lock().await;
        let now = Utc::now().timestamp_millis();
        if !renew && !tguard.token.is_empty() && now - tguard.last_used < MAX_IDLE_MILLIS {
            tguard.last_used = now;
            return Ok(tguard.token.clone());
        }

        debug!(
            "logging in to {} as '{}' (renew={})",
            self.inner.endpoint, self.inner.username, renew
        );
        let up = format!("{}:{}", &self.inner.username, &self.inner.password);
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", BASE64_STANDARD.encode(up)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let resp = client
            .post(self.url(&["sessions"])?)
            .headers(headers)
            .body("{}")
            .send()
            .await?;
        let status = resp.status().as_u16();
        let header_token = resp
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await?;
        let token = match token_from_login(status, header_token, &body) {
            Ok(t) => t,
            Err(e) => {
                tguard.token.clear();
                return Err(e);
            }
        };
        tguard.token = token;
        tguard.last_used = now;
        Ok(tguard.token.clone())
    }

    pub(crate) async fn logout(&self, client: &Client) -> Result<(), DataApiError> {
        let mut tguard = self.inner.token.lock().await;
        if tguard.token.is_empty() {
            return Ok(());
        }
        let token = std::mem::take(&mut tguard.token);
        debug!("logging out of {}", self.inner.endpoint);
        let resp = client.delete(self.url(&["sessions", token.as_str()])?).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await?;
        let reply: LoginReply = serde_json::from_str(&body).unwrap_or_default();
        match reply.messages.first() {
            Some(m) => Err(DataApiError::from_wire(&m.code, &m.message)),
            None => Err(DataApiError::new(
                DataApiErrorCode::BadResponse,
                &format!("logout failed with status {}", status),
            )),
        }
    }
}

// Pick the session token out of a login reply. A reply with neither a token nor
// a message code is a bad response from the service (or a proxy in front of it).
fn token_from_login(
    status: u16,
    header_token: Option<String>,
    body: &str,
) -> Result<String, DataApiError> {
    let reply: LoginReply = serde_json::from_str(body).unwrap_or_default();
    let token = match header_token {
        Some(t) if !t.is_empty() => t,
        _ => reply.response.token,
    };
    if !token.is_empty() {
        return Ok(token);
    }
    if let Some(m) = reply.messages.first().filter(|m| !m.code.is_empty()) {
        return Err(DataApiError::from_wire(&m.code, &m.message));
    }
    Err(DataApiError::new(
        DataApiErrorCode::BadResponse,
        &format!("Data API login returned no token (http status {}): {}", status, body),
    ))
}

/// True if the service rejected the request because of an invalid or expired token.
pub(crate) fn is_invalid_token(body: &str) -> bool {
    match serde_json::from_str::<LoginReply>(body) {
        Ok(reply) => reply
            .messages
            .first()
            .map(|m| m.code == (DataApiErrorCode::InvalidToken as i32).to_string())
            .unwrap_or(false),
        Err(_) => false,
    }
}
