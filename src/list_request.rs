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
use crate::types::{PortalDirective, RequestOptions};
use crate::validate::check_layout;
use serde_json::Value;
use std::result::Result;
use std::time::Duration;

/// Struct used for listing the records of a layout, one page at a time.
///
/// Example:
/// ```no_run
/// use fms_data_api_rust_sdk::{Handle, ListRecordsRequest};
/// use fms_data_api_rust_sdk::types::PortalDirective;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = Handle::builder().from_environment()?.build()?;
/// let res = ListRecordsRequest::new("Heroes")
///     .limit(2)
///     .portal(["planets"])
///     .portal_directive(PortalDirective::new("planets").limit(1))
///     .execute(&handle)
///     .await
///     .into_result()?;
/// for rec in &res.records().unwrap().data {
///     println!("{}: {:?}", rec.record_id, rec.field_data);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone)]
pub struct ListRecordsRequest {
    pub(crate) layout: String,
    pub(crate) options: RequestOptions,
}

impl ListRecordsRequest {
    /// Create a new `ListRecordsRequest`. `layout` must be non-empty.
    pub fn new(layout: &str) -> ListRecordsRequest {
        ListRecordsRequest {
            layout: layout.to_string(),
            ..Default::default()
        }
    }

    /// Replace all options of the request.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Return at most `limit` records.
    pub fn limit(mut self, limit: u64) -> Self {
        self.options = self.options.limit(limit);
        self
    }

    /// Skip records before returning any.
    pub fn offset(mut self, offset: u64) -> Self {
        self.options = self.options.offset(offset);
        self
    }

    /// Sort order, as an array of `{fieldName, sortOrder}` objects.
    pub fn sort(mut self, sort: Value) -> Self {
        self.options = self.options.sort(sort);
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

    /// Add a limit/offset directive for one portal.
    pub fn portal_directive(mut self, directive: PortalDirective) -> Self {
        self.options = self.options.portal_directive(directive);
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
        let params = normalize(Operation::List, &self.options)?;
        Ok(WireRequest::new(Method::Get, &["layouts", self.layout.as_str(), "records"])
            .query(&params)
            .timeout(self.options.get_timeout()))
    }

    /// Execute the request, returning [`ApiResult::Records`] on success.
    pub async fn execute<T: Transport>(&self, h: &Handle<T>) -> ApiResult {
        let req = match self.wire_request() {
            Ok(r) => r,
            Err(e) => return ApiResult::Failure(e),
        };
        shape_records(h.send(&req).await)
    }
}
