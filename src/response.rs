//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Shaping of raw transport outcomes into [`ApiResult`].
use serde_json::{Map, Value};
use std::result::Result;
use tracing::debug;

use crate::error::{DataApiError, DataApiErrorCode};
use crate::script::ScriptResponse;
use crate::types::{DataInfo, RecordData};

/// What the transport observed for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutcome {
    /// The service answered, with any http status.
    Response { status: u16, body: String },
    /// The request did not complete. The error carries a transport code
    /// ([`RequestTimeout`](DataApiErrorCode::RequestTimeout) or
    /// [`TransportError`](DataApiErrorCode::TransportError)).
    Failed(DataApiError),
}

/// Records returned by a get or list operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordsResponse {
    pub data: Vec<RecordData>,
    pub data_info: DataInfo,
    /// Results of any scripts attached to the request; empty when none ran.
    pub scripts: ScriptResponse,
}

/// Identifiers returned by a create, edit or delete operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifiedResponse {
    pub record_id: Option<String>,
    pub mod_id: Option<String>,
    pub scripts: ScriptResponse,
}

/// The outcome of every operation.
///
/// Exactly one variant is populated. Validation failures, rejections by the
/// service and transport failures are all reported as [`ApiResult::Failure`].
/// A script that ran but reported its own error is still an [`ApiResult::Script`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    Records(RecordsResponse),
    Modified(ModifiedResponse),
    Script(ScriptResponse),
    Failure(DataApiError),
}

impl ApiResult {
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ApiResult::Failure(_))
    }

    pub fn records(&self) -> Option<&RecordsResponse> {
        match self {
            ApiResult::Records(r) => Some(r),
            _ => None,
        }
    }

    pub fn modified(&self) -> Option<&ModifiedResponse> {
        match self {
            ApiResult::Modified(m) => Some(m),
            _ => None,
        }
    }

    pub fn script(&self) -> Option<&ScriptResponse> {
        match self {
            ApiResult::Script(s) => Some(s),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&DataApiError> {
        match self {
            ApiResult::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// Convert into a `Result`, so `?` can be used on the failure variant.
    pub fn into_result(self) -> Result<ApiResult, DataApiError> {
        match self {
            ApiResult::Failure(e) => Err(e),
            other => Ok(other),
        }
    }

    /// The JSON envelope for this result:
    ///
    /// - records: `{"data": [...], "dataInfo": {...}}` plus any `scriptResult*` members
    /// - modified: `{"recordId": ..., "modId": ...}` with absent members omitted
    /// - script: `{"scriptResult": ...}` / `{"scriptResult.<phase>": ...}`
    /// - failure: `{"code": ..., "message": ...}`
    pub fn to_value(&self) -> Value {
        let mut m = Map::new();
        match self {
            ApiResult::Records(r) => {
                let data = r
                    .data
                    .iter()
                    .map(|d| serde_json::to_value(d).unwrap_or(Value::Null))
                    .collect();
                m.insert("data".to_string(), Value::Array(data));
                m.insert(
                    "dataInfo".to_string(),
                    serde_json::to_value(&r.data_info).unwrap_or(Value::Null),
                );
                extend_with_scripts(&mut m, &r.scripts);
            }
            ApiResult::Modified(md) => {
                if let Some(id) = &md.record_id {
                    m.insert("recordId".to_string(), Value::String(id.clone()));
                }
                if let Some(mid) = &md.mod_id {
                    m.insert("modId".to_string(), Value::String(mid.clone()));
                }
                extend_with_scripts(&mut m, &md.scripts);
            }
            ApiResult::Script(s) => {
                extend_with_scripts(&mut m, s);
            }
            ApiResult::Failure(e) => {
                m.insert("code".to_string(), Value::String(e.code.clone()));
                m.insert("message".to_string(), Value::String(e.message.clone()));
            }
        }
        Value::Object(m)
    }
}

fn extend_with_scripts(m: &mut Map<String, Value>, s: &ScriptResponse) {
    for (k, v) in s.results() {
        m.insert(k.clone(), v.clone());
    }
}

impl From<DataApiError> for ApiResult {
    fn from(e: DataApiError) -> Self {
        ApiResult::Failure(e)
    }
}

fn bad_response(msg: String) -> DataApiError {
    DataApiError::new(DataApiErrorCode::BadResponse, &msg)
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Open the `{response, messages}` envelope, turning any non-zero message code
/// into an error.
fn open_envelope(outcome: RawOutcome) -> Result<Map<String, Value>, DataApiError> {
    let (status, body) = match outcome {
        RawOutcome::Failed(e) => {
            debug!("transport failure: {}", e);
            return Err(e);
        }
        RawOutcome::Response { status, body } => (status, body),
    };
    let success = (200..300).contains(&status);
    let mut v: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return Err(bad_response(format!(
                "http status {}: unparseable response ({}): {}",
                status, e, body
            )));
        }
    };
    if let Some(msg) = v
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
    {
        let code = msg.get("code").map(text).unwrap_or_default();
        if !code.is_empty() && code != "0" {
            let message = msg.get("message").map(text).unwrap_or_default();
            debug!("request rejected: code={} message={}", code, message);
            return Err(DataApiError::from_wire(&code, &message));
        }
    }
    if !success {
        return Err(bad_response(format!(
            "unexpected http status {}: {}",
            status, body
        )));
    }
    match v.get_mut("response").map(Value::take) {
        Some(Value::Object(m)) => Ok(m),
        _ => Ok(Map::new()),
    }
}

fn take_member<T: serde::de::DeserializeOwned + Default>(
    m: &mut Map<String, Value>,
    key: &str,
) -> Result<T, DataApiError> {
    match m.remove(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => serde_json::from_value(v)
            .map_err(|e| bad_response(format!("invalid '{}' in response: {}", key, e))),
    }
}

/// Shape a get/list reply. Portal data is passed through untouched.
pub(crate) fn shape_records(outcome: RawOutcome) -> ApiResult {
    let shaped = open_envelope(outcome).and_then(|mut m| {
        let scripts = ScriptResponse::decode(&m);
        let data: Vec<RecordData> = take_member(&mut m, "data")?;
        let data_info: DataInfo = take_member(&mut m, "dataInfo")?;
        Ok(RecordsResponse {
            data,
            data_info,
            scripts,
        })
    });
    match shaped {
        Ok(r) => ApiResult::Records(r),
        Err(e) => ApiResult::Failure(e),
    }
}

/// Shape a create/edit/delete reply.
pub(crate) fn shape_modified(outcome: RawOutcome) -> ApiResult {
    match open_envelope(outcome) {
        Ok(m) => ApiResult::Modified(ModifiedResponse {
            record_id: m.get("recordId").map(text),
            mod_id: m.get("modId").map(text),
            scripts: ScriptResponse::decode(&m),
        }),
        Err(e) => ApiResult::Failure(e),
    }
}

/// Shape a script run reply: only the script results are kept.
pub(crate) fn shape_script(outcome: RawOutcome) -> ApiResult {
    match open_envelope(outcome) {
        Ok(m) => ApiResult::Script(ScriptResponse::decode(&m)),
        Err(e) => ApiResult::Failure(e),
    }
}
