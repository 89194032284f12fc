//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::DataApiError;
use crate::handle::Handle;
use crate::params::{normalize, Operation};
use crate::response::{shape_records, ApiResult};
use crate::script::ScriptInvocation;
use crate::transport::{Method, Transport, WireRequest};
use crate::types::RequestOptions;
use crate::validate::{check_layout, check_record_id};
use std::result::Result;
use std::time::Duration;

/// Struct used for getting a single record from a layout.
///
/// Only portal options (`portal`, `portals`, per-portal limits and offsets),
/// `layout.response` and scripts are sent; global `limit`, `offset` and `sort`
/// do not apply to a single record and are dropped.
#[derive(Default, Debug, Clone)]
pub struct GetRecordRequest {
    pub(crate) layout: String,
    pub(crate) record_id: String,
    pub(crate) options: RequestOptions,
}

impl GetRecordRequest {
    /// Create a new `GetRecordRequest`.
    ///
    /// `layout` must be non-empty and `record_id` must be a positive integer
    /// in string form, otherwise [`execute()`](GetRecordRequest::execute()) fails without
    /// contacting the service.
    pub fn new(layout: &str, record_id: &str) -> GetRecordRequest {
        GetRecordRequest {
            layout: layout.to_string(),
            record_id: record_id.to_string(),
            ..Default::default()
        }
    }

    /// Replace all options of the request.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Request related records from the named portals.
    pub fn portal<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.portal(names);
        self
    }

    /// Limit the number of related records returned for one portal.
    pub fn portal_limit(mut self, name: &str, limit: u64) -> Self {
        self.options = self.options.portal_limit(name, limit);
        self
    }

    /// Skip related records of one portal.
    pub fn portal_offset(mut self, name: &str, offset: u64) -> Self {
        self.options = self.options.portal_offset(name, offset);
        self
    }

    /// Run scripts as part of the request.
    pub fn script(mut self, scripts: impl Into<ScriptInvocation>) -> Self {
        self.options = self.options.script(scripts);
        self
    }

    /// Specify the timeout value for the request.
    ///
    /// If not set, the default timeout value configured for the [`Handle`](crate::HandleBuilder::timeout()) is used.
    pub fn timeout(mut self, t: Duration) -> Self {
        self.options = self.options.timeout(t);
        self
    }

    /// Validate and normalize the request without sending it.
    pub fn wire_request(&self) -> Result<WireRequest, DataApiError> {
        check_layout(&self.layout)?;
        check_record_id(&self.record_id)?;
        let params = normalize(Operation::Get, &self.options)?;
        Ok(WireRequest::new(
            Method::Get,
            &["layouts", self.layout.as_str(), "records", self.record_id.as_str()],
        )
        .query(&params)
        .timeout(self.options.get_timeout()))
    }

    /// Execute the request, returning [`ApiResult::Records`] with exactly one record on success.
    pub async fn execute<T: Transport>(&self, h: &Handle<T>) -> ApiResult {
        let req = match self.wire_request() {
            Ok(r) => r,
            Err(e) => return ApiResult::Failure(e),
        };
        shape_records(h.send(&req).await)
    }
}
