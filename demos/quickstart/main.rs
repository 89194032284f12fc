//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//

// This is an example program showing the basic record and script operations
// against a FileMaker database. It creates a record, reads it back with a
// limited portal, lists a page of records, runs a script in a phase and
// finally deletes the record and logs out.
//
// The layout used must have a `name` field and a portal named `planets`, and
// the database must contain a script named "FMS Triggered Script" that returns
// its parameter.

// To run this example:
//    FMS_SERVER=https://fms.example.com FMS_DATABASE=Heroes \
//    FMS_USERNAME=admin FMS_PASSWORD=admin cargo run --example quickstart
//
// for extra output:
//    RUST_LOG=debug cargo run --example quickstart
//
// or, for a LOT of tracing output:
//    RUST_LOG=trace cargo run --example quickstart

use fms_data_api_rust_sdk::types::{PortalDirective, RequestOptions};
use fms_data_api_rust_sdk::{
    CreateRecordRequest, DataApiError, GetRecordRequest, Handle, HttpTransport, ListRecordsRequest,
    RunScriptRequest, Script, ScriptParam,
};
use serde_json::json;
use std::error::Error;
use std::time::Duration;
use tracing::info;

// This method shows various ways to configure a Data API Handle.
fn get_handle() -> Result<Handle<HttpTransport>, DataApiError> {
    // Note: later methods called on this builder will override earlier methods.
    // This allows for setting desired defaults that can be overridden by, for example,
    // .from_environment().
    Handle::builder()
        .server("localhost")?
        .database("Heroes")?
        //
        // Optional INI file with server, database and login credentials
        // .auth_from_file("~/.fms/credentials")?
        // Optional path to x509 certificate in PEM format
        // .add_cert_from_pemfile("/path/to/certificate.pem")?
        // For local testing against a self-signed certificate
        // .danger_accept_invalid_certs(true)?
        //
        .timeout(Duration::from_secs(15))?
        // this will override any settings above
        .from_environment()?
        .build()
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn Error>> {
    // Set up a tracing subscriber to see output based on RUST_LOG environment setting
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .init();

    let handle = get_handle()?;
    let layout = std::env::var("FMS_LAYOUT").unwrap_or_else(|_| "Heroes".to_string());

    // Create a record
    let res = CreateRecordRequest::new(&layout)
        .field("name", "Obi-Wan Kenobi")
        .execute(&handle)
        .await
        .into_result()?;
    let record_id = match res.modified().and_then(|m| m.record_id.clone()) {
        Some(id) => id,
        None => return Err("create returned no record id".into()),
    };
    info!("Created record {}", record_id);

    // Read it back, with at most two related planets
    let res = GetRecordRequest::new(&layout, &record_id)
        .portal(["planets"])
        .portal_limit("planets", 2)
        .execute(&handle)
        .await
        .into_result()?;
    if let Some(recs) = res.records() {
        for rec in &recs.data {
            info!("Record {}: {:?}", rec.record_id, rec.field_data);
        }
    }

    // List the second page of two records, each with one planet
    let res = ListRecordsRequest::new(&layout)
        .limit(2)
        .offset(3)
        .sort(json!([{"fieldName": "name", "sortOrder": "ascend"}]))
        .portal(["planets"])
        .portal_directive(PortalDirective::new("planets").limit(1))
        .execute(&handle)
        .await
        .into_result()?;
    info!("List result: {}", res.to_value());

    // The same, from JSON options
    let options = RequestOptions::from_value(json!({
        "limit": 2,
        "offset": 3,
        "portal": ["planets"],
        "limit.planets": 1,
        "request": {"timeout": 5000}
    }))?;
    let res = handle.list(&layout, options).await;
    info!("List result from options: success={}", res.is_success());

    // Run a script in the presort phase, with a structured parameter
    let res = RunScriptRequest::new(
        &layout,
        Script::new("FMS Triggered Script")
            .phase("presort")
            .param(ScriptParam::structured(&json!({"hero": record_id}))?),
    )
    .execute(&handle)
    .await;
    match res.script() {
        Some(s) => info!(
            "Script result: {:?} (error {:?})",
            s.result_for("presort"),
            s.error(Some("presort"))
        ),
        None => info!("Script failed: {:?}", res.failure()),
    }

    // Clean up
    handle
        .delete(&layout, &record_id, RequestOptions::new())
        .await
        .into_result()?;
    info!("Deleted record {}", record_id);
    handle.logout().await?;
    Ok(())
}
