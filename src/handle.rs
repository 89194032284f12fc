//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use serde_json::{Map, Value};
use std::result::Result;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::create_request::CreateRecordRequest;
use crate::delete_request::DeleteRecordRequest;
use crate::edit_request::EditRecordRequest;
use crate::error::DataApiError;
use crate::get_request::GetRecordRequest;
use crate::handle_builder::HandleBuilder;
use crate::list_request::ListRecordsRequest;
use crate::response::{ApiResult, RawOutcome};
use crate::run_request::RunScriptRequest;
use crate::script::ScriptInvocation;
use crate::transport::{HttpTransport, Transport, WireRequest};
use crate::types::RequestOptions;

/// **The main Data API handle**.
///
/// This should be created once and used
/// throughout the application lifetime, across all threads.
///
/// Note: there is no need to enclose this struct in an `Rc` or [`Arc`], as it uses an
/// [`Arc`] internally, so calling `.clone()` on this struct will always return the
/// same underlying handle.
///
/// The handle does no I/O itself: it validates and normalizes each request, hands the
/// result to its [`Transport`], and shapes whatever comes back into an [`ApiResult`].
/// Every operation resolves; failures are reported as [`ApiResult::Failure`].
#[derive(Debug)]
pub struct Handle<T: Transport = HttpTransport> {
    // Use an inner Arc so cloning keeps the same contents
    pub(crate) inner: Arc<HandleRef<T>>,
}

#[derive(Debug)]
pub(crate) struct HandleRef<T> {
    pub(crate) transport: T,
}

impl<T: Transport> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle {
            inner: self.inner.clone(),
        }
    }
}

impl Handle<HttpTransport> {
    /// Create a new [`HandleBuilder`].
    pub fn builder() -> HandleBuilder {
        HandleBuilder::new()
    }

    /// End the Data API session held by this handle.
    ///
    /// The next request will log in again.
    pub async fn logout(&self) -> Result<(), DataApiError> {
        self.inner.transport.logout().await
    }
}

impl<T: Transport> Handle<T> {
    /// Create a handle over any [`Transport`], for example an in-process fake.
    pub fn with_transport(transport: T) -> Handle<T> {
        debug!("Creating new Handle over {}", std::any::type_name::<T>());
        Handle {
            inner: Arc::new(HandleRef { transport }),
        }
    }

    /// The transport this handle sends requests through.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub(crate) async fn send(&self, req: &WireRequest) -> RawOutcome {
        debug!("{:?} {}", req.method, req.path_string());
        trace!("query={:?} body={:?}", req.query, req.body);
        let outcome = self.inner.transport.send(req).await;
        if let RawOutcome::Failed(e) = &outcome {
            debug!("{:?} {} failed: {}", req.method, req.path_string(), e);
        }
        outcome
    }

    /// Fetch a single record by id.
    ///
    /// This is a convenience wrapper around [`GetRecordRequest`].
    pub async fn get(&self, layout: &str, record_id: &str, options: RequestOptions) -> ApiResult {
        GetRecordRequest::new(layout, record_id)
            .options(options)
            .execute(self)
            .await
    }

    /// List records on a layout.
    ///
    /// This is a convenience wrapper around [`ListRecordsRequest`].
    pub async fn list(&self, layout: &str, options: RequestOptions) -> ApiResult {
        ListRecordsRequest::new(layout)
            .options(options)
            .execute(self)
            .await
    }

    /// Create a record from field data.
    pub async fn create(&self, layout: &str, field_data: Map<String, Value>) -> ApiResult {
        CreateRecordRequest::new(layout)
            .field_data(field_data)
            .execute(self)
            .await
    }

    /// Modify fields of an existing record.
    pub async fn edit(
        &self,
        layout: &str,
        record_id: &str,
        field_data: Map<String, Value>,
        options: RequestOptions,
    ) -> ApiResult {
        EditRecordRequest::new(layout, record_id)
            .field_data(field_data)
            .options(options)
            .execute(self)
            .await
    }

    /// Delete a record.
    pub async fn delete(&self, layout: &str, record_id: &str, options: RequestOptions) -> ApiResult {
        DeleteRecordRequest::new(layout, record_id)
            .options(options)
            .execute(self)
            .await
    }

    /// Run one or more scripts in the context of a layout.
    ///
    /// Only the script results are returned, see [`RunScriptRequest`].
    pub async fn run(
        &self,
        layout: &str,
        scripts: impl Into<ScriptInvocation>,
        options: RequestOptions,
    ) -> ApiResult {
        RunScriptRequest::new(layout, scripts)
            .options(options)
            .execute(self)
            .await
    }
}
