//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, DataApiError};
use crate::handle::Handle;
use crate::params::{normalize, Operation};
use crate::response::{shape_script, ApiResult};
use crate::script::{ScriptInvocation, ScriptParam};
use crate::transport::{Method, Transport, WireRequest};
use crate::types::RequestOptions;
use crate::validate::check_layout;
use serde_json::Value;
use std::result::Result;
use std::time::Duration;

/// Struct used for running scripts in the context of a layout.
///
/// The scripts ride on a list of the layout limited to a single record; only
/// their results are returned, as [`ApiResult::Script`]. A script that runs but
/// reports an error of its own is still a success; see
/// [`ScriptResponse::error()`](crate::ScriptResponse::error()).
///
/// ```no_run
/// use fms_data_api_rust_sdk::{Handle, RunScriptRequest, Script};
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = Handle::builder().from_environment()?.build()?;
/// let res = RunScriptRequest::new("Heroes", "FMS Triggered Script")
///     .param("string-here")
///     .execute(&handle)
///     .await;
/// if let Some(s) = res.script() {
///     println!("{:?}", s.result());
/// }
///
/// let res = RunScriptRequest::new(
///     "Heroes",
///     vec![
///         Script::new("FMS Triggered Script").phase("presort").param("a"),
///         Script::new("FMS Triggered Script").param("b"),
///     ],
/// )
/// .execute(&handle)
/// .await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RunScriptRequest {
    pub(crate) layout: String,
    pub(crate) scripts: ScriptInvocation,
    pub(crate) param: Option<ScriptParam>,
    pub(crate) options: RequestOptions,
}

impl RunScriptRequest {
    /// Create a new `RunScriptRequest`.
    pub fn new(layout: &str, scripts: impl Into<ScriptInvocation>) -> RunScriptRequest {
        RunScriptRequest {
            layout: layout.to_string(),
            scripts: scripts.into(),
            param: None,
            options: RequestOptions::new(),
        }
    }

    /// Parameter for a single script that was given without one.
    ///
    /// Structured values are sent as JSON text and decoded again in the result.
    pub fn param(mut self, param: impl Into<ScriptParam>) -> Self {
        self.param = Some(param.into());
        self
    }

    /// Replace all options of the request.
    ///
    /// Any scripts in `options` are replaced by the ones this request runs.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
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
        let inv = self.scripts.clone().with_default_param(self.param.clone());
        if inv.scripts().is_empty() {
            return ia_err!("no script to run");
        }
        if inv.scripts().iter().any(|s| s.name.trim().is_empty()) {
            return ia_err!("script name must be non-empty");
        }
        let opts = self.options.clone().script(inv);
        let mut params = normalize(Operation::List, &opts)?;
        params.insert("_limit".to_string(), Value::from(1));
        Ok(WireRequest::new(Method::Get, &["layouts", self.layout.as_str(), "records"])
            .query(&params)
            .timeout(self.options.get_timeout()))
    }

    /// Execute the request, returning [`ApiResult::Script`] on success.
    pub async fn execute<T: Transport>(&self, h: &Handle<T>) -> ApiResult {
        let req = match self.wire_request() {
            Ok(r) => r,
            Err(e) => return ApiResult::Failure(e),
        };
        shape_script(h.send(&req).await)
    }
}
