//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Types used to build requests and read results.
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::result::Result;
use std::time::Duration;

use crate::error::{ia_err, DataApiError};
use crate::script::ScriptInvocation;
use crate::validate::coerce_bound;

/// Per-call options for record and script operations.
///
/// This is an insertion-ordered mapping from option name to value, mirroring the
/// loosely typed option objects accepted by other Data API clients. Both the
/// reserved wire spellings (`_limit`, `_offset`, `_sort`, `_limit.<portal>`, ...) and
/// the ergonomic spellings (`limit`, `offset`, `sort`, `limit.<portal>`, ...) are
/// accepted; they are reconciled when the request is built. Keys that the target
/// operation does not recognize are dropped and never sent.
///
/// Setting a key that is already present replaces its value in place, keeping
/// its original position.
///
/// ```
/// use fms_data_api_rust_sdk::types::{PortalDirective, RequestOptions};
/// let opts = RequestOptions::new()
///     .limit(2)
///     .offset(2)
///     .portal(["planets"])
///     .portal_directive(PortalDirective::new("planets").limit(1));
/// assert_eq!(opts.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub(crate) entries: Vec<(String, Value)>,
    pub(crate) scripts: Option<ScriptInvocation>,
    pub(crate) timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> RequestOptions {
        RequestOptions {
            ..Default::default()
        }
    }

    /// Create options from a JSON object.
    ///
    /// Every member becomes an option entry, in document order, except `request`,
    /// which holds per-call transport settings. Currently only `request.timeout`
    /// (milliseconds, a positive integer or its decimal text) is read from it.
    pub fn from_value(v: Value) -> Result<RequestOptions, DataApiError> {
        let obj = match v {
            Value::Object(o) => o,
            Value::Null => return Ok(RequestOptions::new()),
            other => {
                return ia_err!("request options must be a JSON object, got: {}", other);
            }
        };
        let mut opts = RequestOptions::new();
        for (k, v) in obj {
            if k == "request" {
                if let Some(t) = v.get("timeout").filter(|t| !t.is_null()) {
                    let ms = coerce_bound("request.timeout", t)?;
                    if ms == 0 {
                        return ia_err!("'request.timeout' must be greater than zero");
                    }
                    opts.timeout = Some(Duration::from_millis(ms));
                }
                continue;
            }
            opts.put(&k, v);
        }
        Ok(opts)
    }

    /// Set an option, replacing any existing value for the same key.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    /// Set an option in place, replacing any existing value for the same key.
    pub fn put(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
            return;
        }
        self.entries.push((key.to_string(), value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Remove an option, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterate over the option entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of records to return (`limit`).
    pub fn limit(self, limit: u64) -> Self {
        self.set("limit", limit)
    }

    /// Number of records to skip (`offset`).
    pub fn offset(self, offset: u64) -> Self {
        self.set("offset", offset)
    }

    /// Sort specification (`sort`), typically an array of
    /// `{"fieldName": ..., "sortOrder": ...}` objects.
    pub fn sort(self, sort: Value) -> Self {
        self.set("sort", sort)
    }

    /// Names of the portals to include in the response (`portal`).
    pub fn portal<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<Value> = names.into_iter().map(|n| Value::String(n.into())).collect();
        self.set("portal", Value::Array(names))
    }

    /// Limit the number of related records returned for one portal (`limit.<name>`).
    pub fn portal_limit(self, name: &str, limit: u64) -> Self {
        self.set(&format!("limit.{}", name), limit)
    }

    /// Skip related records for one portal (`offset.<name>`).
    pub fn portal_offset(self, name: &str, offset: u64) -> Self {
        self.set(&format!("offset.{}", name), offset)
    }

    /// Append a directive to the `portals` list.
    pub fn portal_directive(mut self, directive: PortalDirective) -> Self {
        let dv = directive.to_value();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == "portals") {
            match &mut slot.1 {
                Value::Array(arr) => arr.push(dv),
                other => *other = Value::Array(vec![dv]),
            }
            return self;
        }
        self.entries.push(("portals".to_string(), Value::Array(vec![dv])));
        self
    }

    /// Attach one or more scripts to the request.
    ///
    /// Scripts given here are encoded after all other options, so they replace
    /// any raw `script*` entries that name the same slot.
    pub fn script(mut self, scripts: impl Into<ScriptInvocation>) -> Self {
        self.scripts = Some(scripts.into());
        self
    }

    /// Specify the timeout value for the request.
    ///
    /// This is never sent as a wire parameter; it is handed to the transport as-is.
    /// If not set, the default timeout value configured for the [`Handle`](crate::HandleBuilder::timeout()) is used.
    pub fn timeout(mut self, t: Duration) -> Self {
        self.timeout = Some(t);
        self
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Limit and offset for the related records of one portal.
///
/// When supplied as JSON (for example inside a `portals` option array), members
/// other than `name`, `limit` and `offset` are discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalDirective {
    pub name: String,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PortalDirective {
    pub fn new(name: &str) -> PortalDirective {
        PortalDirective {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut m = Map::new();
        m.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(l) = self.limit {
            m.insert("limit".to_string(), Value::from(l));
        }
        if let Some(o) = self.offset {
            m.insert("offset".to_string(), Value::from(o));
        }
        Value::Object(m)
    }
}

/// A single record as returned by the Data API.
///
/// `portal_data` and `portal_data_info` are kept exactly as the service returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordData {
    #[serde(default)]
    pub field_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_data_info: Option<Value>,
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub mod_id: String,
}

impl RecordData {
    /// Related records returned for the named portal, if any.
    pub fn portal(&self, name: &str) -> Option<&Vec<Value>> {
        self.portal_data
            .as_ref()
            .and_then(|p| p.get(name))
            .and_then(Value::as_array)
    }

    /// Metadata for the named portal, read from `portal_data_info`.
    ///
    /// Both shapes the service uses are understood: a list of entries (matched on
    /// `portalObjectName`, then `table`) and a mapping keyed by portal name.
    /// Returns `None` when nothing matches or the entry cannot be read.
    pub fn portal_info(&self, name: &str) -> Option<PortalDataInfo> {
        let entry = match self.portal_data_info.as_ref()? {
            Value::Array(items) => items
                .iter()
                .find(|i| i.get("portalObjectName").and_then(Value::as_str) == Some(name))
                .or_else(|| {
                    items
                        .iter()
                        .find(|i| i.get("table").and_then(Value::as_str) == Some(name))
                })?,
            Value::Object(m) => m.get(name)?,
            _ => return None,
        };
        serde_json::from_value(entry.clone()).ok()
    }
}

/// Metadata describing the records in a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataInfo {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub total_record_count: u64,
    #[serde(default)]
    pub found_count: u64,
    #[serde(default)]
    pub returned_count: u64,
}

/// Metadata describing the related records returned for one portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalDataInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_object_name: Option<String>,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub found_count: u64,
    #[serde(default)]
    pub returned_count: u64,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_replaces_in_place() {
        let opts = RequestOptions::new()
            .set("limit", 2)
            .set("portal", json!(["planets"]))
            .set("limit", "5");
        let keys: Vec<&str> = opts.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["limit", "portal"]);
        assert_eq!(opts.get("limit"), Some(&json!("5")));
    }

    #[test]
    fn test_from_value() {
        let opts = RequestOptions::from_value(json!({
            "limit": 2,
            "offset": "3",
            "request": {"timeout": 10}
        }))
        .unwrap();
        assert_eq!(opts.len(), 2);
        assert_eq!(opts.get("request"), None);
        assert_eq!(opts.get_timeout(), Some(Duration::from_millis(10)));

        let err = RequestOptions::from_value(json!(["limit"])).unwrap_err();
        assert_eq!(err.kind(), crate::DataApiErrorCode::IllegalArgument);
        assert!(RequestOptions::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_portal_directives_accumulate() {
        let opts = RequestOptions::new()
            .portal_directive(PortalDirective::new("planets").limit(1).offset(1))
            .portal_directive(PortalDirective::new("moons").limit(3));
        assert_eq!(
            opts.get("portals"),
            Some(&json!([
                {"name": "planets", "limit": 1, "offset": 1},
                {"name": "moons", "limit": 3}
            ]))
        );
    }

    #[test]
    fn test_record_data_deserialize() {
        let rec: RecordData = serde_json::from_value(json!({
            "fieldData": {"name": "Obi-Wan"},
            "portalData": {"planets": [{"recordId": "1", "modId": "0", "planets::name": "Tatooine"}]},
            "portalDataInfo": [{"portalObjectName": "planets", "database": "db", "table": "planets", "foundCount": 3, "returnedCount": 1}],
            "recordId": "7",
            "modId": "2"
        }))
        .unwrap();
        assert_eq!(rec.record_id, "7");
        assert_eq!(rec.portal("planets").map(|p| p.len()), Some(1));
        assert_eq!(rec.portal_info("planets").unwrap().found_count, 3);
        assert!(rec.portal_info("moons").is_none());
        // round trip back to the wire shape keeps camelCase keys
        let v = serde_json::to_value(&rec).unwrap();
        assert!(v.get("fieldData").is_some());
        assert!(v.get("portalDataInfo").is_some());
    }

    #[test]
    fn test_portal_data_kept_as_returned() {
        let raw = json!({
            "fieldData": {"name": "Leia"},
            "portalData": {
                "vehicles": [{"recordId": "3", "vehicles::name": "Speeder", "vehicles::extra": 1}],
                "planets": [{"recordId": "1", "planets::name": "Alderaan"}]
            },
            "portalDataInfo": {
                "planets": {"database": "db", "table": "planets", "foundCount": 1, "returnedCount": 1, "custom": true}
            },
            "recordId": "2",
            "modId": "0"
        });
        let rec: RecordData = serde_json::from_value(raw.clone()).unwrap();
        let names: Vec<&String> = rec.portal_data.as_ref().unwrap().keys().collect();
        assert_eq!(names, vec!["vehicles", "planets"]);
        assert_eq!(rec.portal_info("planets").unwrap().returned_count, 1);
        assert_eq!(serde_json::to_value(&rec).unwrap(), raw);
    }

    #[test]
    fn test_request_timeout() {
        let opts = RequestOptions::from_value(json!({"request": {"timeout": "250"}})).unwrap();
        assert_eq!(opts.get_timeout(), Some(Duration::from_millis(250)));
        let opts = RequestOptions::from_value(json!({"request": {"timeout": null}})).unwrap();
        assert_eq!(opts.get_timeout(), None);
        for bad in [json!(10.5), json!(-1), json!(0), json!("soon")] {
            let err = RequestOptions::from_value(json!({"request": {"timeout": bad}})).unwrap_err();
            assert_eq!(err.kind(), crate::DataApiErrorCode::IllegalArgument, "{}", bad);
        }
    }
}
