//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Per-portal limit and offset directives.
//!
//! Directives arrive either as `portals: [{name, limit?, offset?}]` or as dotted
//! option keys (`limit.<name>`, `_limit.<name>`, `offset.<name>`, `_offset.<name>`).
//! All of them end up as the reserved wire keys `_limit.<name>` / `_offset.<name>`.
//!
//! When a bound is given more than once the value processed last wins, with one
//! exception: a bare dotted key (`limit.<name>`) never replaces a reserved dotted
//! key (`_limit.<name>`), matching the rule for global keys. A `portals[]`
//! directive always replaces what came before it. Portal names are not checked
//! against the `portal` list; the service ignores directives for portals that
//! were not requested.
use serde_json::Value;
use std::collections::BTreeMap;
use std::result::Result;
use tracing::trace;

use crate::error::{ia_err, DataApiError};
use crate::params::WireParams;
use crate::types::PortalDirective;
use crate::validate::coerce_bound;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bound {
    Limit,
    Offset,
}

impl Bound {
    fn wire_prefix(&self) -> &'static str {
        match self {
            Bound::Limit => "_limit",
            Bound::Offset => "_offset",
        }
    }
}

/// Where a bound came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Directive,
    Dotted,
    ReservedDotted,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: u64,
    source: Source,
}

/// Accumulates portal bounds in processing order.
#[derive(Debug, Default)]
pub(crate) struct PortalScope {
    entries: BTreeMap<(String, Bound), Entry>,
}

impl PortalScope {
    pub(crate) fn new() -> PortalScope {
        PortalScope::default()
    }

    fn record(&mut self, name: &str, bound: Bound, value: u64, source: Source) {
        let key = (name.to_string(), bound);
        if let Some(existing) = self.entries.get(&key) {
            if existing.source == Source::ReservedDotted && source == Source::Dotted {
                trace!(
                    "ignoring {}.{}={}: reserved spelling already given",
                    bound.wire_prefix(),
                    name,
                    value
                );
                return;
            }
            trace!(
                "overwriting {}.{}: {} -> {}",
                bound.wire_prefix(),
                name,
                existing.value,
                value
            );
        }
        self.entries.insert(key, Entry { value, source });
    }

    pub(crate) fn apply_directive(&mut self, d: &PortalDirective) {
        if let Some(l) = d.limit {
            self.record(&d.name, Bound::Limit, l, Source::Directive);
        }
        if let Some(o) = d.offset {
            self.record(&d.name, Bound::Offset, o, Source::Directive);
        }
    }

    /// Apply every directive in a `portals` option value.
    pub(crate) fn apply_directives(&mut self, v: &Value) -> Result<(), DataApiError> {
        let items = match v {
            Value::Array(items) => items,
            other => return ia_err!("'portals' must be an array of portal directives, got {}", other),
        };
        for item in items {
            let d = directive_from_value(item)?;
            self.apply_directive(&d);
        }
        Ok(())
    }

    /// Apply a dotted option key. Returns `Ok(false)` if `key` is not a
    /// per-portal key, leaving the scope untouched.
    pub(crate) fn apply_dotted(&mut self, key: &str, v: &Value) -> Result<bool, DataApiError> {
        let (bound, reserved, name) = match parse_dotted(key) {
            Some(p) => p,
            None => return Ok(false),
        };
        let value = coerce_bound(key, v)?;
        let source = if reserved {
            Source::ReservedDotted
        } else {
            Source::Dotted
        };
        self.record(name, bound, value, source);
        Ok(true)
    }

    /// Write the accumulated bounds as `_limit.<name>` / `_offset.<name>`.
    pub(crate) fn write_to(self, out: &mut WireParams) {
        for ((name, bound), entry) in self.entries {
            out.insert(
                format!("{}.{}", bound.wire_prefix(), name),
                Value::from(entry.value),
            );
        }
    }
}

/// True if `key` is a per-portal limit/offset key in either spelling.
pub(crate) fn is_dotted_key(key: &str) -> bool {
    parse_dotted(key).is_some()
}

fn parse_dotted(key: &str) -> Option<(Bound, bool, &str)> {
    let (head, name) = key.split_once('.')?;
    if name.is_empty() {
        return None;
    }
    match head {
        "limit" => Some((Bound::Limit, false, name)),
        "_limit" => Some((Bound::Limit, true, name)),
        "offset" => Some((Bound::Offset, false, name)),
        "_offset" => Some((Bound::Offset, true, name)),
        _ => None,
    }
}

/// Read a directive from JSON, keeping only `name`, `limit` and `offset`.
pub(crate) fn directive_from_value(v: &Value) -> Result<PortalDirective, DataApiError> {
    let obj = match v {
        Value::Object(o) => o,
        other => return ia_err!("a portal directive must be an object, got {}", other),
    };
    let name = match obj.get("name") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return ia_err!("a portal directive needs a non-empty 'name'"),
    };
    let mut d = PortalDirective::new(&name);
    if let Some(l) = obj.get("limit").filter(|v| !v.is_null()) {
        d.limit = Some(coerce_bound(&format!("limit.{}", name), l)?);
    }
    if let Some(o) = obj.get("offset").filter(|v| !v.is_null()) {
        d.offset = Some(coerce_bound(&format!("offset.{}", name), o)?);
    }
    Ok(d)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::DataApiErrorCode::IllegalArgument;
    use serde_json::json;

    fn resolve(steps: &[(&str, Value)]) -> Result<WireParams, DataApiError> {
        let mut scope = PortalScope::new();
        for (k, v) in steps {
            if *k == "portals" {
                scope.apply_directives(v)?;
            } else {
                assert!(scope.apply_dotted(k, v)?, "{} is not a dotted key", k);
            }
        }
        let mut out = WireParams::new();
        scope.write_to(&mut out);
        Ok(out)
    }

    #[test]
    fn test_directive_fields_are_sanitized() {
        let out = resolve(&[(
            "portals",
            json!([{"name": "planets", "limit": 1, "offset": "1", "han": "solo"}]),
        )])
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.get("_limit.planets"), Some(&json!(1)));
        assert_eq!(out.get("_offset.planets"), Some(&json!(1)));
        assert!(!out.keys().any(|k| k.contains("han")));
    }

    #[test]
    fn test_only_defined_fields_contribute() {
        let out = resolve(&[("portals", json!([{"name": "planets", "limit": 2}]))]).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out.get("_offset.planets").is_none());
    }

    #[test]
    fn test_dotted_spellings() {
        let bare = resolve(&[("limit.planets", json!(2))]).unwrap();
        let reserved = resolve(&[("_limit.planets", json!("2"))]).unwrap();
        assert_eq!(bare, reserved);
        assert_eq!(bare.get("_limit.planets"), Some(&json!(2)));
    }

    #[test]
    fn test_reserved_dotted_beats_bare_dotted() {
        let out = resolve(&[("_limit.planets", json!(5)), ("limit.planets", json!(2))]).unwrap();
        assert_eq!(out.get("_limit.planets"), Some(&json!(5)));
        let out = resolve(&[("limit.planets", json!(2)), ("_limit.planets", json!(5))]).unwrap();
        assert_eq!(out.get("_limit.planets"), Some(&json!(5)));
    }

    #[test]
    fn test_later_directive_overwrites_dotted() {
        let out = resolve(&[
            ("_limit.planets", json!(5)),
            ("limit.planets", json!(2)),
            ("portals", json!([{"name": "planets", "limit": 3}])),
        ])
        .unwrap();
        assert_eq!(out.get("_limit.planets"), Some(&json!(3)));

        let out = resolve(&[
            ("portals", json!([{"name": "planets", "offset": 3}])),
            ("_offset.planets", json!(1)),
        ])
        .unwrap();
        assert_eq!(out.get("_offset.planets"), Some(&json!(1)));
    }

    #[test]
    fn test_last_write_wins() {
        let out = resolve(&[
            ("portals", json!([{"name": "planets", "limit": 1}, {"name": "planets", "limit": 4}])),
            ("offset.planets", json!(1)),
            ("portals", json!([{"name": "planets", "offset": 3}])),
        ])
        .unwrap();
        assert_eq!(out.get("_limit.planets"), Some(&json!(4)));
        assert_eq!(out.get("_offset.planets"), Some(&json!(3)));

        let out = resolve(&[
            ("portals", json!([{"name": "planets", "limit": 1}])),
            ("limit.planets", json!(9)),
        ])
        .unwrap();
        assert_eq!(out.get("_limit.planets"), Some(&json!(9)));
    }

    #[test]
    fn test_invalid_directives() {
        for bad in [
            ("portals", json!({"name": "planets"})),
            ("portals", json!(["planets"])),
            ("portals", json!([{"limit": 1}])),
            ("portals", json!([{"name": "planets", "limit": -1}])),
            ("portals", json!([{"name": "planets", "offset": "x"}])),
            ("_offset.planets", json!(-3)),
        ] {
            let e = resolve(&[(bad.0, bad.1.clone())]).unwrap_err();
            assert_eq!(e.kind(), IllegalArgument, "{:?}", bad);
        }
    }

    #[test]
    fn test_not_dotted() {
        assert!(is_dotted_key("limit.planets"));
        assert!(is_dotted_key("_offset.moons"));
        assert!(!is_dotted_key("limit"));
        assert!(!is_dotted_key("limit."));
        assert!(!is_dotted_key("script.presort"));
        let mut scope = PortalScope::new();
        assert!(!scope.apply_dotted("sort.planets", &json!(1)).unwrap());
    }
}
