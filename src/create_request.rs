//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::DataApiError;
use crate::handle::Handle;
use crate::params::{merge_into_body, normalize, Operation};
use crate::response::{shape_modified, ApiResult};
use crate::script::ScriptInvocation;
use crate::transport::{Method, Transport, WireRequest};
use crate::types::RequestOptions;
use crate::validate::check_layout;
use serde_json::{Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for creating a new record on a layout.
///
/// The field data is sent as the `fieldData` member of the request body, with any
/// script slots alongside it. Other options do not apply to a create and are dropped.
#[derive(Default, Debug, Clone)]
pub struct CreateRecordRequest {
    pub(crate) layout: String,
    pub(crate) field_data: Map<String, Value>,
    pub(crate) portal_data: Option<Map<String, Value>>,
    pub(crate) options: RequestOptions,
}

impl CreateRecordRequest {
    /// Create a new `CreateRecordRequest`. `layout` must be non-empty.
    pub fn new(layout: &str) -> CreateRecordRequest {
        CreateRecordRequest {
            layout: layout.to_string(),
            ..Default::default()
        }
    }

    /// Replace all field data of the new record.
    pub fn field_data(mut self, field_data: Map<String, Value>) -> Self {
        self.field_data = field_data;
        self
    }

    /// Set a single field of the new record.
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.field_data.insert(name.to_string(), value.into());
        self
    }

    /// Related records to create with the record, keyed by portal name.
    pub fn portal_data(mut self, portal_data: Map<String, Value>) -> Self {
        self.portal_data = Some(portal_data);
        self
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
        let params = normalize(Operation::Create, &self.options)?;
        let mut body = Map::new();
        body.insert(
            "fieldData".to_string(),
            Value::Object(self.field_data.clone()),
        );
        if let Some(p) = &self.portal_data {
            body.insert("portalData".to_string(), Value::Object(p.clone()));
        }
        merge_into_body(params, &mut body);
        Ok(WireRequest::new(Method::Post, &["layouts", self.layout.as_str(), "records"])
            .body(Value::Object(body))
            .timeout(self.options.get_timeout()))
    }

    /// Execute the request, returning [`ApiResult::Modified`] with the new record id on success.
    pub async fn execute<T: Transport>(&self, h: &Handle<T>) -> ApiResult {
        let req = match self.wire_request() {
            Ok(r) => r,
            Err(e) => return ApiResult::Failure(e),
        };
        shape_modified(h.send(&req).await)
    }
}
