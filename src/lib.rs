//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! FileMaker Data API Rust SDK
//!
//! This is a Rust client for the FileMaker Data API. It turns record and script
//! requests expressed with ergonomic options into the exact parameters the Data API
//! expects, and turns the service's replies back into typed results.
//!
//! This SDK supplies and uses Rust `async` methods throughout, using the [tokio](https://crates.io/crates/tokio) runtime. There is currently no blocking support.
//!
//! The general flow for an application using the Data API is:
//! - Create a [`HandleBuilder`] with all needed parameters
//! - Create a [`Handle`] from the [`HandleBuilder`] that will be used throughout the application, across all threads
//! - Interact with the database using the [`Handle`] and Request structs such as [`GetRecordRequest`], [`ListRecordsRequest`], [`RunScriptRequest`], etc.
//!
//! Every operation resolves to an [`ApiResult`]. Invalid arguments, rejections by the
//! service and network failures are all reported as [`ApiResult::Failure`] carrying a
//! [`DataApiError`]; nothing is sent to the service when an argument is invalid.
//!
//! ## Simple Example
//! The following code creates a [`Handle`] from values in the current environment and then reads a single record from a layout.
//! ```no_run
//! use fms_data_api_rust_sdk::{Handle, GetRecordRequest};
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let handle = Handle::builder()
//!         .from_environment()?
//!         .build()?;
//!     let res = GetRecordRequest::new("Heroes", "1")
//!         .portal(["planets"])
//!         .portal_limit("planets", 2)
//!         .execute(&handle)
//!         .await
//!         .into_result()?;
//!     println!("GetResult={:?}", res.records());
//!     Ok(())
//! }
//! ```
//!
//! ## Request options
//!
//! Options are given as a [`RequestOptions`](types::RequestOptions), either through its typed
//! helpers or from a JSON object with [`RequestOptions::from_value()`](types::RequestOptions::from_value()).
//! Paging keys may be given in their ergonomic form (`limit`, `offset`, `sort`) or in the
//! reserved form the service uses (`_limit`, `_offset`, `_sort`); when both are given the
//! reserved form wins. Per-portal limits and offsets may be given as `portals` directives,
//! as `limit.<portal>` / `offset.<portal>`, or as `_limit.<portal>` / `_offset.<portal>`.
//! Keys an operation does not use are dropped before the request is sent.
//!
//! ```no_run
//! # use fms_data_api_rust_sdk::Handle;
//! # use fms_data_api_rust_sdk::types::RequestOptions;
//! # use serde_json::json;
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! # let handle = Handle::builder().from_environment()?.build()?;
//! let options = RequestOptions::from_value(json!({
//!     "limit": 2,
//!     "portal": ["planets"],
//!     "portals": [{"name": "planets", "limit": 1, "offset": 1}],
//!     "request": {"timeout": 5000}
//! }))?;
//! let res = handle.list("Heroes", options).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Scripts
//!
//! Scripts can be attached to any request, or run on their own with [`RunScriptRequest`]
//! (or [`Handle::run()`]). Each [`Script`] may name a phase (such as `prerequest` or
//! `presort`) and carry a parameter. Structured parameters are sent as JSON text, and
//! script results that are JSON text are decoded again in the [`ScriptResponse`].
//!
//! ## Configuring the SDK
//!
//! A handle needs a server, a database and an account:
//!
//! ```no_run
//! # use fms_data_api_rust_sdk::Handle;
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = Handle::builder()
//!         .server("https://fms.example.com")?
//!         .database("Heroes")?
//!         .credentials("admin", "admin")?
//!         .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! The same values can come from the environment (see [`HandleBuilder::from_environment()`])
//! or from an INI credentials file (see [`HandleBuilder::auth_from_file()`]).
//! If the server uses a certificate that is self-signed or is not trusted by the default system CA,
//! specify [`HandleBuilder::danger_accept_invalid_certs()`] to skip verifying it, or
//! [`HandleBuilder::add_cert_from_pemfile()`] to trust it explicitly.
//!
//! The Data API session is opened by the first request, kept alive while in use and
//! renewed when the service reports it expired. Call [`Handle::logout()`] to close it.
//!
//! ## Custom transports
//!
//! A [`Handle`] sends its requests through a [`Transport`]. The default is
//! [`HttpTransport`]; any other implementation (for example an in-process fake used in
//! tests) can be supplied with [`Handle::with_transport()`].
//!
//! ## Logging
//!
//! The SDK emits [`tracing`](https://crates.io/crates/tracing) events at `debug` and
//! `trace` level. Install a subscriber, such as `tracing_subscriber`, to see them.
//!
//! ## License
//!
//! Copyright (C) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//!
//! This SDK is licensed under the Universal Permissive License 1.0.
//!

pub(crate) mod handle_builder;
pub use crate::handle_builder::HandleBuilder;

pub(crate) mod handle;
pub use crate::handle::Handle;

pub(crate) mod create_request;
pub use crate::create_request::CreateRecordRequest;

pub(crate) mod delete_request;
pub use crate::delete_request::DeleteRecordRequest;

pub(crate) mod edit_request;
pub use crate::edit_request::EditRecordRequest;

pub(crate) mod error;
pub use crate::error::{DataApiError, DataApiErrorCode};

pub(crate) mod file_utils;
pub(crate) mod get_request;
pub use crate::get_request::GetRecordRequest;

pub(crate) mod list_request;
pub use crate::list_request::ListRecordsRequest;

pub(crate) mod params;
pub(crate) mod portal_scope;

#[cfg(test)]
pub(crate) mod request_tests;
pub(crate) mod response;
pub use crate::response::{ApiResult, ModifiedResponse, RawOutcome, RecordsResponse};

pub(crate) mod run_request;
pub use crate::run_request::RunScriptRequest;

pub(crate) mod script;
pub use crate::script::{Script, ScriptInvocation, ScriptParam, ScriptResponse};

pub(crate) mod session;
pub(crate) mod transport;
pub use crate::transport::{HttpTransport, Method, Transport, WireRequest};

pub mod types;
pub(crate) mod validate;
