//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Translation of [`RequestOptions`] into wire parameters.
//!
//! | option | wire key | operations |
//! | ------ | -------- | ---------- |
//! | `limit` / `_limit` | `_limit` | list |
//! | `offset` / `_offset` | `_offset` | list |
//! | `sort` / `_sort` | `_sort` | list |
//! | `portal` | `portal` | list, get |
//! | `portals[]`, `limit.<p>` / `_limit.<p>`, `offset.<p>` / `_offset.<p>` | `_limit.<p>` / `_offset.<p>` | list, get |
//! | `layout.response` | `layout.response` | list, get |
//! | `modId` | `modId` | edit |
//! | `script`, `script.*` | unchanged | all |
//!
//! When both spellings of a global key are given the reserved (underscore) spelling
//! wins. Every other key is dropped. Limits and offsets are validated even where
//! they are dropped.
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::result::Result;
use tracing::trace;

use crate::error::DataApiError;
use crate::portal_scope::{is_dotted_key, PortalScope};
use crate::script;
use crate::types::RequestOptions;
use crate::validate::coerce_bound;

/// Normalized wire parameters. Keys are unique, so a reserved name can never be
/// sent twice.
pub(crate) type WireParams = BTreeMap<String, Value>;

const LIMIT: &str = "_limit";
const OFFSET: &str = "_offset";
const SORT: &str = "_sort";
const PORTAL: &str = "portal";
const PORTALS: &str = "portals";
const LAYOUT_RESPONSE: &str = "layout.response";
const MOD_ID: &str = "modId";

/// The kind of request being normalized; each has its own allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    List,
    Get,
    Create,
    Edit,
    Delete,
}

impl Operation {
    fn allows_paging(&self) -> bool {
        *self == Operation::List
    }

    fn allows_portals(&self) -> bool {
        matches!(self, Operation::List | Operation::Get)
    }
}

// (wire key, given in reserved spelling)
fn global_key(key: &str) -> Option<(&'static str, bool)> {
    match key {
        "_limit" => Some((LIMIT, true)),
        "limit" => Some((LIMIT, false)),
        "_offset" => Some((OFFSET, true)),
        "offset" => Some((OFFSET, false)),
        "_sort" => Some((SORT, true)),
        "sort" => Some((SORT, false)),
        _ => None,
    }
}

/// Normalize `options` for the given operation.
///
/// Bounds are coerced and checked here for every operation, including those that
/// drop them, so a negative or non-numeric limit fails before anything is sent.
pub(crate) fn normalize(op: Operation, options: &RequestOptions) -> Result<WireParams, DataApiError> {
    let mut out = WireParams::new();
    let mut globals: BTreeMap<&'static str, (Value, bool)> = BTreeMap::new();
    let mut scope = PortalScope::new();

    for (key, value) in options.iter() {
        if let Some((wire, reserved)) = global_key(key) {
            let v = if wire == SORT {
                value.clone()
            } else {
                Value::from(coerce_bound(key, value)?)
            };
            if !op.allows_paging() {
                trace!("dropping option '{}': not used by {:?}", key, op);
                continue;
            }
            if let Some((_, true)) = globals.get(wire) {
                if !reserved {
                    trace!("ignoring '{}': '{}' already given", key, wire);
                    continue;
                }
            }
            globals.insert(wire, (v, reserved));
            continue;
        }
        match key {
            PORTAL if op.allows_portals() => {
                out.insert(PORTAL.to_string(), value.clone());
            }
            PORTALS => {
                if op.allows_portals() {
                    scope.apply_directives(value)?;
                } else {
                    PortalScope::new().apply_directives(value)?;
                    trace!("dropping option '{}': not used by {:?}", key, op);
                }
            }
            LAYOUT_RESPONSE if op.allows_portals() => {
                out.insert(LAYOUT_RESPONSE.to_string(), value.clone());
            }
            MOD_ID if op == Operation::Edit => {
                out.insert(MOD_ID.to_string(), value.clone());
            }
            _ if is_dotted_key(key) => {
                if op.allows_portals() {
                    scope.apply_dotted(key, value)?;
                } else {
                    coerce_bound(key, value)?;
                    trace!("dropping option '{}': not used by {:?}", key, op);
                }
            }
            _ if script::is_script_key(key) => {
                script::encode_raw(key, value, &mut out)?;
            }
            _ => {
                trace!("dropping unrecognized option '{}'", key);
            }
        }
    }

    for (wire, (v, _)) in globals {
        out.insert(wire.to_string(), v);
    }
    scope.write_to(&mut out);
    if let Some(s) = &options.scripts {
        script::encode(s, &mut out)?;
    }
    Ok(out)
}

fn wire_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render parameters as URL query pairs. Strings are sent raw, everything else as
/// JSON text (so `portal: ["planets"]` becomes `portal=["planets"]`).
pub(crate) fn to_query_pairs(params: &WireParams) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), wire_text(v)))
        .collect()
}

/// Merge parameters into a JSON request body.
pub(crate) fn merge_into_body(params: WireParams, body: &mut Map<String, Value>) {
    for (k, v) in params {
        body.insert(k, v);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::script::Script;
    use crate::types::PortalDirective;
    use crate::DataApiErrorCode::IllegalArgument;
    use serde_json::json;

    fn list(v: Value) -> Result<WireParams, DataApiError> {
        normalize(Operation::List, &RequestOptions::from_value(v)?)
    }

    #[test]
    fn test_reserved_and_bare_are_equivalent() {
        for n in [0u64, 2, 17] {
            let a = list(json!({"limit": n, "offset": n})).unwrap();
            let b = list(json!({"_limit": n, "_offset": n})).unwrap();
            let c = list(json!({"limit": n.to_string(), "_offset": n.to_string()})).unwrap();
            assert_eq!(a, b);
            assert_eq!(a, c);
            assert_eq!(a.get("_limit"), Some(&json!(n)));
            assert!(a.get("limit").is_none());
        }
    }

    #[test]
    fn test_reserved_spelling_wins() {
        let out = list(json!({"_limit": 5, "limit": 2})).unwrap();
        assert_eq!(out.get("_limit"), Some(&json!(5)));
        let out = list(json!({"limit": 2, "_limit": 5})).unwrap();
        assert_eq!(out.get("_limit"), Some(&json!(5)));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let out = list(json!({"error": "fail", "limit": 2, "offset": 2})).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.get("error").is_none());
    }

    #[test]
    fn test_negative_bounds_rejected() {
        let e = list(json!({"error": "fail", "limit": -2, "offset": 2})).unwrap_err();
        assert_eq!(e.kind(), IllegalArgument);
        let e = list(json!({"offset": "-1"})).unwrap_err();
        assert_eq!(e.kind(), IllegalArgument);
        let e = list(json!({"portal": ["planets"], "limit.planets": -2})).unwrap_err();
        assert_eq!(e.kind(), IllegalArgument);
    }

    #[test]
    fn test_negative_bounds_rejected_for_every_operation() {
        for op in [
            Operation::Get,
            Operation::Create,
            Operation::Edit,
            Operation::Delete,
        ] {
            for bad in [
                json!({"limit": -2}),
                json!({"offset": "-5"}),
                json!({"_limit": "ten"}),
                json!({"limit.planets": -2}),
                json!({"_offset.planets": "-1"}),
                json!({"portals": [{"name": "planets", "limit": -1}]}),
            ] {
                let opts = RequestOptions::from_value(bad.clone()).unwrap();
                let e = normalize(op, &opts).unwrap_err();
                assert_eq!(e.kind(), IllegalArgument, "{:?} {}", op, bad);
            }
            let opts = RequestOptions::from_value(json!({"limit": 2, "limit.planets": 1})).unwrap();
            let out = normalize(op, &opts).unwrap();
            assert!(out.get("_limit").is_none());
        }
    }

    #[test]
    fn test_portals_merged() {
        let out = list(json!({
            "portal": ["planets"],
            "limit.planets": 2,
            "limit": 2
        }))
        .unwrap();
        assert_eq!(out.get("portal"), Some(&json!(["planets"])));
        assert_eq!(out.get("_limit.planets"), Some(&json!(2)));
        assert_eq!(out.get("_limit"), Some(&json!(2)));

        let opts = RequestOptions::new()
            .limit(2)
            .portal_directive(PortalDirective::new("planets").limit(1).offset(1));
        let out = normalize(Operation::List, &opts).unwrap();
        assert_eq!(out.get("_limit.planets"), Some(&json!(1)));
        assert_eq!(out.get("_offset.planets"), Some(&json!(1)));
    }

    #[test]
    fn test_get_allow_list() {
        let opts = RequestOptions::from_value(json!({
            "limit": 2,
            "sort": [{"fieldName": "name"}],
            "portal": ["planets"],
            "_limit.planets": 2,
            "layout.response": "Heroes Detail",
            "han": "solo"
        }))
        .unwrap();
        let out = normalize(Operation::Get, &opts).unwrap();
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["_limit.planets", "layout.response", "portal"]);
    }

    #[test]
    fn test_write_allow_list() {
        let opts = RequestOptions::from_value(json!({
            "limit": 2,
            "portal": ["planets"],
            "modId": "3",
            "script": "After Create",
            "script.param": {"id": 1}
        }))
        .unwrap();
        let out = normalize(Operation::Create, &opts).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.get("script.param"), Some(&json!("{\"id\":1}")));

        let out = normalize(Operation::Edit, &opts).unwrap();
        assert_eq!(out.get("modId"), Some(&json!("3")));
        assert_eq!(out.len(), 3);

        let out = normalize(Operation::Delete, &opts).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_typed_scripts_replace_raw_slots() {
        let opts = RequestOptions::new()
            .set("script.presort", "Raw")
            .set("script.presort.param", "old")
            .script(Script::new("Typed").phase("presort"));
        let out = normalize(Operation::List, &opts).unwrap();
        assert_eq!(out.get("script.presort"), Some(&json!("Typed")));
        assert!(out.get("script.presort.param").is_none());
    }

    #[test]
    fn test_query_rendering() {
        let out = list(json!({
            "limit": "2",
            "portal": ["planets"],
            "sort": [{"fieldName": "name", "sortOrder": "ascend"}],
            "script": "S"
        }))
        .unwrap();
        let pairs = to_query_pairs(&out);
        assert!(pairs.contains(&("_limit".to_string(), "2".to_string())));
        assert!(pairs.contains(&("portal".to_string(), "[\"planets\"]".to_string())));
        assert!(pairs.contains(&(
            "_sort".to_string(),
            "[{\"fieldName\":\"name\",\"sortOrder\":\"ascend\"}]".to_string()
        )));
        assert!(pairs.contains(&("script".to_string(), "S".to_string())));
    }
}
