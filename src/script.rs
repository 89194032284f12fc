//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Script invocations: encoding them into request slots and decoding their results.
//!
//! Each invocation occupies one slot, named by its phase:
//!
//! | invocation | name key | parameter key | result key | error key |
//! | ---------- | -------- | ------------- | ---------- | --------- |
//! | no phase | `script` | `script.param` | `scriptResult` | `scriptError` |
//! | phase `p` | `script.p` | `script.p.param` | `scriptResult.p` | `scriptError.p` |
//!
//! The service accepts a single string parameter per slot, so numbers are sent as
//! their decimal text and objects/arrays as JSON text.
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::result::Result;
use tracing::trace;

use crate::error::{ia_err, DataApiError};
use crate::params::WireParams;

pub(crate) const SCRIPT: &str = "script";
const PARAM_SUFFIX: &str = ".param";
const RESULT: &str = "scriptResult";
const ERROR: &str = "scriptError";

/// The parameter handed to a script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptParam {
    /// Sent as-is.
    Text(String),
    /// Sent as its decimal text.
    Number(Number),
    /// An object or array, sent as JSON text.
    Structured(Value),
}

impl ScriptParam {
    /// Build a parameter from any serializable value.
    ///
    /// Strings and numbers become [`Text`](ScriptParam::Text) and
    /// [`Number`](ScriptParam::Number); maps, structs and sequences become
    /// [`Structured`](ScriptParam::Structured). Values that cannot be serialized
    /// to JSON, and booleans or nulls, are rejected.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<ScriptParam, DataApiError> {
        let v = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => return ia_err!("script parameter is not serializable: {}", e),
        };
        match ScriptParam::from_value(v)? {
            Some(p) => Ok(p),
            None => ia_err!("script parameter must not be null"),
        }
    }

    // null means "no parameter"
    pub(crate) fn from_value(v: Value) -> Result<Option<ScriptParam>, DataApiError> {
        match v {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(ScriptParam::Text(s))),
            Value::Number(n) => Ok(Some(ScriptParam::Number(n))),
            Value::Object(_) | Value::Array(_) => Ok(Some(ScriptParam::Structured(v))),
            Value::Bool(b) => ia_err!(
                "script parameter must be a string, number, object or array, got {}",
                b
            ),
        }
    }

    pub(crate) fn to_wire(&self) -> Result<String, DataApiError> {
        match self {
            ScriptParam::Text(s) => Ok(s.clone()),
            ScriptParam::Number(n) => Ok(n.to_string()),
            ScriptParam::Structured(v) => Ok(serde_json::to_string(v)?),
        }
    }
}

impl From<&str> for ScriptParam {
    fn from(s: &str) -> Self {
        ScriptParam::Text(s.to_string())
    }
}

impl From<String> for ScriptParam {
    fn from(s: String) -> Self {
        ScriptParam::Text(s)
    }
}

impl From<i64> for ScriptParam {
    fn from(i: i64) -> Self {
        ScriptParam::Number(Number::from(i))
    }
}

impl From<i32> for ScriptParam {
    fn from(i: i32) -> Self {
        ScriptParam::Number(Number::from(i))
    }
}

impl From<u64> for ScriptParam {
    fn from(u: u64) -> Self {
        ScriptParam::Number(Number::from(u))
    }
}

impl From<Map<String, Value>> for ScriptParam {
    fn from(m: Map<String, Value>) -> Self {
        ScriptParam::Structured(Value::Object(m))
    }
}

impl From<Vec<Value>> for ScriptParam {
    fn from(a: Vec<Value>) -> Self {
        ScriptParam::Structured(Value::Array(a))
    }
}

/// One script to run as part of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub name: String,
    /// Opaque phase label (for example `prerequest` or `presort`). The service
    /// decides which labels are valid.
    pub phase: Option<String>,
    pub param: Option<ScriptParam>,
}

impl Script {
    pub fn new(name: &str) -> Script {
        Script {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn phase(mut self, phase: &str) -> Self {
        self.phase = Some(phase.to_string());
        self
    }

    pub fn param(mut self, param: impl Into<ScriptParam>) -> Self {
        self.param = Some(param.into());
        self
    }

    fn from_value(v: Value) -> Result<Script, DataApiError> {
        match v {
            Value::String(name) => Ok(Script::new(&name)),
            Value::Object(mut m) => {
                let name = match m.remove("name") {
                    Some(Value::String(s)) => s,
                    Some(other) => return ia_err!("script name must be a string, got {}", other),
                    None => return ia_err!("script object is missing a 'name'"),
                };
                let phase = match m.remove("phase") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s),
                    Some(other) => return ia_err!("script phase must be a string, got {}", other),
                };
                let param = match m.remove("param") {
                    None => None,
                    Some(p) => ScriptParam::from_value(p)?,
                };
                Ok(Script { name, phase, param })
            }
            other => ia_err!("a script must be a name or an object, got {}", other),
        }
    }

    // empty phase labels name the default slot
    fn slot(&self) -> String {
        match self.phase.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => format!("{}.{}", SCRIPT, p),
            _ => SCRIPT.to_string(),
        }
    }
}

/// The scripts attached to a request: a single script or an ordered list of them.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptInvocation {
    Single(Script),
    Multiple(Vec<Script>),
}

impl ScriptInvocation {
    pub fn scripts(&self) -> &[Script] {
        match self {
            ScriptInvocation::Single(s) => std::slice::from_ref(s),
            ScriptInvocation::Multiple(v) => v.as_slice(),
        }
    }

    // Fill in the parameter of a lone script that has none.
    pub(crate) fn with_default_param(self, param: Option<ScriptParam>) -> ScriptInvocation {
        match (self, param) {
            (ScriptInvocation::Single(mut s), Some(p)) if s.param.is_none() => {
                s.param = Some(p);
                ScriptInvocation::Single(s)
            }
            (inv, _) => inv,
        }
    }
}

impl From<&str> for ScriptInvocation {
    fn from(name: &str) -> Self {
        ScriptInvocation::Single(Script::new(name))
    }
}

impl From<String> for ScriptInvocation {
    fn from(name: String) -> Self {
        ScriptInvocation::Single(Script::new(&name))
    }
}

impl From<Script> for ScriptInvocation {
    fn from(s: Script) -> Self {
        ScriptInvocation::Single(s)
    }
}

impl From<Vec<Script>> for ScriptInvocation {
    fn from(v: Vec<Script>) -> Self {
        ScriptInvocation::Multiple(v)
    }
}

impl TryFrom<Value> for ScriptInvocation {
    type Error = DataApiError;

    /// Accepts a script name, a `{name, phase?, param?}` object, or an array of either.
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Array(items) => {
                let mut scripts = Vec::with_capacity(items.len());
                for item in items {
                    scripts.push(Script::from_value(item)?);
                }
                Ok(ScriptInvocation::Multiple(scripts))
            }
            other => Ok(ScriptInvocation::Single(Script::from_value(other)?)),
        }
    }
}

/// Write the slots for every script in `inv` into `out`.
///
/// Each script in `inv` must have its own slot; two scripts for the same phase
/// (or two unphased scripts) are rejected. A slot already present in `out`, for
/// example from a raw `script*` option, is replaced including its parameter.
/// Nothing is written unless every script is valid.
pub(crate) fn encode(inv: &ScriptInvocation, out: &mut WireParams) -> Result<(), DataApiError> {
    let mut slots = BTreeSet::new();
    for s in inv.scripts() {
        if s.name.trim().is_empty() {
            return ia_err!("script name must be non-empty");
        }
        let slot = s.slot();
        if !slots.insert(slot.clone()) {
            return ia_err!(
                "more than one script given for slot '{}'; each phase runs one script",
                slot
            );
        }
    }
    for s in inv.scripts() {
        let slot = s.slot();
        let param_key = format!("{}{}", slot, PARAM_SUFFIX);
        if out.contains_key(&slot) {
            trace!("script slot '{}' replaces a raw option", slot);
        }
        out.insert(slot, Value::String(s.name.clone()));
        match &s.param {
            Some(p) => {
                out.insert(param_key, Value::String(p.to_wire()?));
            }
            None => {
                out.remove(&param_key);
            }
        }
    }
    Ok(())
}

/// True for `script` and every key beginning with `script.`.
pub(crate) fn is_script_key(key: &str) -> bool {
    key == SCRIPT || key.starts_with("script.")
}

/// Encode one raw `script*` option entry.
pub(crate) fn encode_raw(key: &str, value: &Value, out: &mut WireParams) -> Result<(), DataApiError> {
    if key.ends_with(PARAM_SUFFIX) {
        match ScriptParam::from_value(value.clone())? {
            Some(p) => {
                out.insert(key.to_string(), Value::String(p.to_wire()?));
            }
            None => {
                out.remove(key);
            }
        }
        return Ok(());
    }
    match value {
        Value::String(s) if !s.trim().is_empty() => {
            out.insert(key.to_string(), Value::String(s.clone()));
            Ok(())
        }
        other => ia_err!("'{}' must be a non-empty script name, got {}", key, other),
    }
}

/// Parse a raw script result: JSON text becomes the parsed value, anything else
/// is returned unchanged. Never fails.
pub(crate) fn decode_result(raw: &Value) -> Value {
    match raw {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) => v,
            Err(_) => raw.clone(),
        },
        other => other.clone(),
    }
}

/// Decoded script results of one response.
///
/// Results are keyed by their wire name (`scriptResult`, `scriptResult.presort`, ...).
/// A script that ran but reported its own failure still produces a normal entry;
/// its error indicator is available from [`ScriptResponse::error()`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptResponse {
    pub(crate) results: BTreeMap<String, Value>,
    pub(crate) errors: BTreeMap<String, String>,
}

impl ScriptResponse {
    /// Collect every `scriptResult*` and `scriptError*` member of a response object.
    pub(crate) fn decode(response: &Map<String, Value>) -> ScriptResponse {
        let mut res = ScriptResponse::default();
        for (k, v) in response {
            if k == RESULT || k.starts_with("scriptResult.") {
                res.results.insert(k.clone(), decode_result(v));
            } else if k == ERROR || k.starts_with("scriptError.") {
                let code = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                res.errors.insert(k.clone(), code);
            }
        }
        res
    }

    fn key(base: &str, phase: Option<&str>) -> String {
        match phase.map(str::trim) {
            Some(p) if !p.is_empty() => format!("{}.{}", base, p),
            _ => base.to_string(),
        }
    }

    /// All results, keyed by wire name.
    pub fn results(&self) -> &BTreeMap<String, Value> {
        &self.results
    }

    /// The result of the unphased script (`scriptResult`).
    pub fn result(&self) -> Option<&Value> {
        self.results.get(RESULT)
    }

    /// The result of the script in the given phase (`scriptResult.<phase>`).
    pub fn result_for(&self, phase: &str) -> Option<&Value> {
        self.results.get(&Self::key(RESULT, Some(phase)))
    }

    /// The error indicator the service reported for a slot, if any.
    /// `"0"` means the script finished without error.
    pub fn error(&self, phase: Option<&str>) -> Option<&str> {
        self.errors.get(&Self::key(ERROR, phase)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.errors.is_empty()
    }

    /// The results as a JSON object keyed by wire name.
    pub fn to_value(&self) -> Value {
        let m: Map<String, Value> = self
            .results
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Object(m)
    }
}
