//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Checks applied to every request before anything is sent.
//!
//! All failures here are [`IllegalArgument`](crate::DataApiErrorCode::IllegalArgument)
//! errors, which are returned to callers in exactly the same shape as a rejection
//! from the service.
use serde_json::Value;
use std::result::Result;

use crate::error::{ia_err, DataApiError};

pub(crate) fn check_layout(layout: &str) -> Result<(), DataApiError> {
    if layout.trim().is_empty() {
        return ia_err!("layout name must be non-empty");
    }
    Ok(())
}

/// A record id is a non-empty run of ASCII digits with a value of at least 1.
pub(crate) fn check_record_id(record_id: &str) -> Result<(), DataApiError> {
    if record_id.is_empty() || !record_id.bytes().all(|b| b.is_ascii_digit()) {
        return ia_err!("invalid record id '{}': must be a positive integer", record_id);
    }
    match record_id.parse::<u64>() {
        Ok(n) if n >= 1 => Ok(()),
        _ => ia_err!("invalid record id '{}': must be a positive integer", record_id),
    }
}

/// Coerce a limit or offset value to a non-negative integer.
///
/// Numbers and numeric strings (surrounding whitespace allowed) are accepted.
/// Anything else, including negative or fractional values, is rejected.
pub(crate) fn coerce_bound(key: &str, v: &Value) -> Result<u64, DataApiError> {
    match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return Ok(u);
            }
            if let Some(f) = n.as_f64() {
                if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
                    return Ok(f as u64);
                }
            }
            ia_err!("'{}' must be a non-negative integer, got {}", key, n)
        }
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) if i >= 0 => Ok(i as u64),
            Ok(i) => ia_err!("'{}' must be a non-negative integer, got {}", key, i),
            Err(_) => match s.trim().parse::<u64>() {
                Ok(u) => Ok(u),
                Err(_) => ia_err!("'{}' must be a non-negative integer, got \"{}\"", key, s),
            },
        },
        other => ia_err!("'{}' must be a non-negative integer, got {}", key, other),
    }
}
