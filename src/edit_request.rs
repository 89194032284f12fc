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
use crate::validate::{check_layout, check_record_id};
use serde_json::{Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for modifying fields of an existing record.
#[derive(Default, Debug, Clone)]
pub struct EditRecordRequest {
    pub(crate) layout: String,
    pub(crate) record_id: String,
    pub(crate) field_data: Map<String, Value>,
    pub(crate) options: RequestOptions,
}

impl EditRecordRequest {
    /// Create a new `EditRecordRequest`.
    pub fn new(layout: &str, record_id: &str) -> EditRecordRequest {
        EditRecordRequest {
            layout: layout.to_string(),
            record_id: record_id.to_string(),
            ..Default::default()
        }
    }

    /// Replace all field data to write.
    pub fn field_data(mut self, field_data: Map<String, Value>) -> Self {
        self.field_data = field_data;
        self
    }

    /// Set a single field to write.
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.field_data.insert(name.to_string(), value.into());
        self
    }

    /// Only apply the edit if the record is still at this modification id.
    pub fn mod_id(mut self, mod_id: &str) -> Self {
        self.options.put("modId", mod_id);
        self
    }

    /// Replace all options of the request.
    ///
    /// A previously given [`mod_id()`](EditRecordRequest::mod_id()) is replaced too.
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
        let params = normalize(Operation::Edit, &self.options)?;
        let mut body = Map::new();
        body.insert(
            "fieldData".to_string(),
            Value::Object(self.field_data.clone()),
        );
        merge_into_body(params, &mut body);
        Ok(WireRequest::new(
            Method::Patch,
            &["layouts", self.layout.as_str(), "records", self.record_id.as_str()],
        )
        .body(Value::Object(body))
        .timeout(self.options.get_timeout()))
    }

    /// Execute the request, returning [`ApiResult::Modified`] with the new modification id on success.
    pub async fn execute<T: Transport>(&self, h: &Handle<T>) -> ApiResult {
        let req = match self.wire_request() {
            Ok(r) => r,
            Err(e) => return ApiResult::Failure(e),
        };
        shape_modified(h.send(&req).await)
    }
}
