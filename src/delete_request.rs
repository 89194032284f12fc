//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::DataApiError;
use crate::handle::Handle;
use crate::params::{normalize, Operation};
use crate::response::{shape_modified, ApiResult};
use crate::script::ScriptInvocation;
use crate::transport::{Method, Transport, WireRequest};
use crate::types::RequestOptions;
use crate::validate::{check_layout, check_record_id};
use std::result::Result;
use std::time::Duration;

/// Struct used for deleting a single record.
#[derive(Default, Debug, Clone)]
pub struct DeleteRecordRequest {
    pub(crate) layout: String,
    pub(crate) record_id: String,
    pub(crate) options: RequestOptions,
}

impl DeleteRecordRequest {
    /// Create a new `DeleteRecordRequest`.
    pub fn new(layout: &str, record_id: &str) -> DeleteRecordRequest {
        DeleteRecordRequest {
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

    /// Run scripts as part of the request.
    pub fn script(mut self, scripts: impl Into<ScriptInvocation>) -> Self {
        self.options = self.options.script(scripts);
        self
    }

    /// Specify the timeout value for the request.
    pub fn timeout(mut self, t: Duration) -> Self {
        self.options = self.options.timeout(t);
        self
    }

    /// Validate and normalize the request without sending it.
    pub fn wire_request(&self) -> Result<WireRequest, DataApiError> {
        check_layout(&self.layout)?;
        check_record_id(&self.record_id)?;
        let params = normalize(Operation::Delete, &self.options)?;
        Ok(WireRequest::new(
            Method::Delete,
            &["layouts", self.layout.as_str(), "records", self.record_id.as_str()],
        )
        .query(&params)
        .timeout(self.options.get_timeout()))
    }

    /// Execute the request, returning an empty [`ApiResult::Modified`] on success.
    pub async fn execute<T: Transport>(&self, h: &Handle<T>) -> ApiResult {
        let req = match self.wire_request() {
            Ok(r) => r,
            Err(e) => return ApiResult::Failure(e),
        };
        shape_modified(h.send(&req).await)
    }
}
