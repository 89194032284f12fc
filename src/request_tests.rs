//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
// Request structs driven against a transport that records what it is sent.
use serde_json::{json, Map, Value};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::DataApiErrorCode::{IllegalArgument, RecordMissing, RequestTimeout};
use crate::error::{DataApiError, DataApiErrorCode};
use crate::response::RawOutcome;
use crate::script::{Script, ScriptParam};
use crate::transport::{Method, Transport, WireRequest};
use crate::types::{PortalDirective, RequestOptions};
use crate::{
    ApiResult, CreateRecordRequest, DeleteRecordRequest, EditRecordRequest, GetRecordRequest,
    Handle, ListRecordsRequest, RunScriptRequest,
};

struct Recorder {
    sent: Mutex<Vec<WireRequest>>,
    reply: RawOutcome,
}

impl Recorder {
    fn replying(body: Value) -> Recorder {
        Recorder {
            sent: Mutex::new(Vec::new()),
            reply: RawOutcome::Response {
                status: 200,
                body: body.to_string(),
            },
        }
    }

    fn failing(e: DataApiError) -> Recorder {
        Recorder {
            sent: Mutex::new(Vec::new()),
            reply: RawOutcome::Failed(e),
        }
    }

    fn sent(&self) -> Vec<WireRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for Recorder {
    async fn send(&self, req: &WireRequest) -> RawOutcome {
        self.sent.lock().unwrap().push(req.clone());
        self.reply.clone()
    }
}

fn ok(response: Value) -> Value {
    json!({"response": response, "messages": [{"code": "0", "message": "OK"}]})
}

fn one_record() -> Value {
    ok(json!({
        "data": [{
            "fieldData": {"name": "Luke Skywalker"},
            "portalData": {"planets": [{"recordId": "7", "planets::name": "Tatooine"}]},
            "recordId": "1",
            "modId": "3"
        }],
        "dataInfo": {"database": "Heroes", "layout": "Heroes", "table": "Heroes",
                     "totalRecordCount": 3, "foundCount": 3, "returnedCount": 1}
    }))
}

#[tokio::test]
async fn test_get_sends_portal_options_only() {
    let h = Handle::with_transport(Recorder::replying(one_record()));
    let res = GetRecordRequest::new("Heroes", "1")
        .options(
            RequestOptions::new()
                .limit(5)
                .offset(2)
                .set("han", "solo")
                .portal(["planets"]),
        )
        .portal_limit("planets", 1)
        .execute(&h)
        .await;
    let recs = res.records().unwrap();
    assert_eq!(recs.data.len(), 1);
    assert_eq!(recs.data[0].record_id, "1");
    assert_eq!(recs.data[0].portal("planets").unwrap().len(), 1);

    let sent = h.transport().sent();
    assert_eq!(sent.len(), 1);
    let req = &sent[0];
    assert_eq!(req.method, Method::Get);
    assert_eq!(req.path_string(), "layouts/Heroes/records/1");
    assert_eq!(req.param("portal").as_deref(), Some("[\"planets\"]"));
    assert_eq!(req.param("_limit.planets").as_deref(), Some("1"));
    assert!(req.param("_limit").is_none());
    assert!(req.param("_offset").is_none());
    assert!(req.param("han").is_none());
    assert!(req.body.is_none());
}

#[tokio::test]
async fn test_invalid_requests_never_reach_transport() {
    let h = Handle::with_transport(Recorder::replying(one_record()));
    let results = vec![
        GetRecordRequest::new("Heroes", "-2").execute(&h).await,
        GetRecordRequest::new("Heroes", "0").execute(&h).await,
        GetRecordRequest::new("Heroes", "abc").execute(&h).await,
        GetRecordRequest::new("", "1").execute(&h).await,
        ListRecordsRequest::new("Heroes")
            .options(RequestOptions::from_value(json!({"error": "fail", "limit": -2})).unwrap())
            .execute(&h)
            .await,
        EditRecordRequest::new("Heroes", "").execute(&h).await,
        DeleteRecordRequest::new("Heroes", "1.5").execute(&h).await,
        RunScriptRequest::new("Heroes", Vec::<Script>::new())
            .execute(&h)
            .await,
        RunScriptRequest::new("Heroes", "").execute(&h).await,
    ];
    for r in results {
        assert_eq!(r.failure().map(|e| e.kind()), Some(IllegalArgument), "{:?}", r);
    }
    assert!(h.transport().sent().is_empty());
}

#[tokio::test]
async fn test_list_paging_and_sort() {
    let h = Handle::with_transport(Recorder::replying(one_record()));
    let res = ListRecordsRequest::new("Heroes")
        .limit(2)
        .offset(1)
        .sort(json!([{"fieldName": "name", "sortOrder": "descend"}]))
        .portal_directive(PortalDirective::new("planets").limit(1).offset(1))
        .timeout(Duration::from_millis(1500))
        .execute(&h)
        .await;
    assert!(res.is_success());
    let sent = h.transport().sent();
    let req = &sent[0];
    assert_eq!(req.path_string(), "layouts/Heroes/records");
    assert_eq!(req.param("_limit").as_deref(), Some("2"));
    assert_eq!(req.param("_offset").as_deref(), Some("1"));
    assert_eq!(
        req.param("_sort").as_deref(),
        Some("[{\"fieldName\":\"name\",\"sortOrder\":\"descend\"}]")
    );
    assert_eq!(req.param("_limit.planets").as_deref(), Some("1"));
    assert_eq!(req.param("_offset.planets").as_deref(), Some("1"));
    assert_eq!(req.timeout, Some(Duration::from_millis(1500)));
}

#[tokio::test]
async fn test_reserved_names_unique_on_wire() {
    let h = Handle::with_transport(Recorder::replying(one_record()));
    let opts = RequestOptions::from_value(json!({
        "limit": 1,
        "_limit": 3,
        "limit.planets": 1,
        "_limit.planets": 2,
        "portals": [{"name": "planets", "limit": 4}]
    }))
    .unwrap();
    h.list("Heroes", opts).await;
    let sent = h.transport().sent();
    let req = &sent[0];
    let names = req.param_names();
    assert_eq!(names.iter().filter(|n| *n == "_limit").count(), 1);
    assert_eq!(names.iter().filter(|n| *n == "_limit.planets").count(), 1);
    assert_eq!(req.param("_limit").as_deref(), Some("3"));
    // the directive is processed after both dotted spellings
    assert_eq!(req.param("_limit.planets").as_deref(), Some("4"));
}

#[tokio::test]
async fn test_create_body() {
    let h = Handle::with_transport(Recorder::replying(ok(json!({"recordId": "12", "modId": "0"}))));
    let res = CreateRecordRequest::new("Heroes")
        .field("name", "Han Solo")
        .field("number", 3)
        .script(Script::new("After Create").param(ScriptParam::structured(&json!({"id": 1})).unwrap()))
        .execute(&h)
        .await;
    let m = res.modified().unwrap();
    assert_eq!(m.record_id.as_deref(), Some("12"));
    assert_eq!(m.mod_id.as_deref(), Some("0"));

    let sent = h.transport().sent();
    let req = &sent[0];
    assert_eq!(req.method, Method::Post);
    assert!(req.query.is_empty());
    assert_eq!(
        req.body,
        Some(json!({
            "fieldData": {"name": "Han Solo", "number": 3},
            "script": "After Create",
            "script.param": "{\"id\":1}"
        }))
    );
}

#[tokio::test]
async fn test_handle_create_matches_request() {
    let h = Handle::with_transport(Recorder::replying(ok(json!({"recordId": "12", "modId": "0"}))));
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!("Han Solo"));
    let res = h.create("Heroes", fields.clone()).await;
    assert!(res.is_success());
    CreateRecordRequest::new("Heroes")
        .field_data(fields)
        .execute(&h)
        .await;
    let sent = h.transport().sent();
    assert_eq!(sent[0], sent[1]);
}

#[tokio::test]
async fn test_edit_and_delete() {
    let h = Handle::with_transport(Recorder::replying(ok(json!({"modId": "4"}))));
    let res = EditRecordRequest::new("Heroes", "1")
        .field("name", "Luke")
        .mod_id("3")
        .execute(&h)
        .await;
    assert_eq!(res.modified().unwrap().mod_id.as_deref(), Some("4"));
    let res = DeleteRecordRequest::new("Heroes", "1")
        .script(Script::new("Cleanup").phase("prerequest"))
        .execute(&h)
        .await;
    assert!(res.is_success());

    let sent = h.transport().sent();
    assert_eq!(sent[0].method, Method::Patch);
    assert_eq!(sent[0].path_string(), "layouts/Heroes/records/1");
    assert_eq!(
        sent[0].body,
        Some(json!({"fieldData": {"name": "Luke"}, "modId": "3"}))
    );
    assert_eq!(sent[1].method, Method::Delete);
    assert_eq!(sent[1].param("script.prerequest").as_deref(), Some("Cleanup"));
    assert!(sent[1].body.is_none());
}

#[tokio::test]
async fn test_run_wire_shape() {
    let h = Handle::with_transport(Recorder::replying(ok(json!({
        "data": [{"fieldData": {}, "recordId": "1", "modId": "0"}],
        "scriptResult": "{\"answer\":42}",
        "scriptError": "0",
        "scriptResult.presort": "done",
        "scriptError.presort": "0"
    }))));
    let res = RunScriptRequest::new(
        "Heroes",
        vec![
            Script::new("FMS Triggered Script").phase("presort").param("p"),
            Script::new("FMS Triggered Script").param(ScriptParam::structured(&json!({"a": 1})).unwrap()),
        ],
    )
    .options(RequestOptions::new().limit(10))
    .execute(&h)
    .await;
    let s = res.script().unwrap();
    assert_eq!(s.result(), Some(&json!({"answer": 42})));
    assert_eq!(s.result_for("presort"), Some(&json!("done")));
    assert!(res.records().is_none());

    let sent = h.transport().sent();
    let req = &sent[0];
    assert_eq!(req.path_string(), "layouts/Heroes/records");
    assert_eq!(req.param("_limit").as_deref(), Some("1"));
    assert_eq!(req.param("script").as_deref(), Some("FMS Triggered Script"));
    assert_eq!(req.param("script.param").as_deref(), Some("{\"a\":1}"));
    assert_eq!(req.param("script.presort").as_deref(), Some("FMS Triggered Script"));
    assert_eq!(req.param("script.presort.param").as_deref(), Some("p"));
}

#[tokio::test]
async fn test_run_default_param() {
    let h = Handle::with_transport(Recorder::replying(ok(json!({"scriptResult": "string-here"}))));
    let res = RunScriptRequest::new("Heroes", "FMS Triggered Script")
        .param("string-here")
        .execute(&h)
        .await;
    assert_eq!(res.script().unwrap().result(), Some(&json!("string-here")));
    let sent = h.transport().sent();
    let req = &sent[0];
    assert_eq!(req.param("script.param").as_deref(), Some("string-here"));

    // an explicit parameter is not replaced
    RunScriptRequest::new("Heroes", Script::new("FMS Triggered Script").param(7))
        .param("ignored")
        .execute(&h)
        .await;
    let sent = h.transport().sent();
    let req = &sent[1];
    assert_eq!(req.param("script.param").as_deref(), Some("7"));
}

#[tokio::test]
async fn test_run_rejects_two_scripts_in_one_slot() {
    let h = Handle::with_transport(Recorder::replying(ok(json!({}))));
    let res = h
        .run(
            "Heroes",
            vec![Script::new("A").param("1"), Script::new("B").param("2")],
            RequestOptions::new(),
        )
        .await;
    assert_eq!(res.failure().unwrap().kind(), IllegalArgument);
    assert!(h.transport().sent().is_empty());
}

#[tokio::test]
async fn test_remote_rejection_and_transport_failure() {
    let h = Handle::with_transport(Recorder::replying(json!({
        "response": {},
        "messages": [{"code": "101", "message": "Record is missing"}]
    })));
    let res = h.get("Heroes", "99", RequestOptions::new()).await;
    let e = res.failure().unwrap();
    assert_eq!(e.kind(), RecordMissing);
    assert_eq!(e.code, "101");
    assert_eq!(res.to_value(), json!({"code": "101", "message": "Record is missing"}));

    let h = Handle::with_transport(Recorder::failing(DataApiError::new(
        RequestTimeout,
        "operation timed out",
    )));
    let res = h
        .list("Heroes", RequestOptions::new().timeout(Duration::from_millis(1)))
        .await;
    assert_eq!(res.failure().unwrap().kind(), RequestTimeout);
    assert!(res.failure().unwrap().is_transport());
    assert_eq!(h.transport().sent()[0].timeout, Some(Duration::from_millis(1)));
}

#[tokio::test]
async fn test_script_error_is_not_failure() {
    let h = Handle::with_transport(Recorder::replying(ok(json!({
        "scriptResult": "oops",
        "scriptError": "3"
    }))));
    let res = h
        .run("Heroes", "Error Script", RequestOptions::new())
        .await;
    assert!(res.is_success());
    let s = res.script().unwrap();
    assert_eq!(s.error(None), Some("3"));
    assert_eq!(s.result(), Some(&json!("oops")));
    assert!(res.into_result().is_ok());
}

#[test]
fn test_error_code_mapping() {
    let e = DataApiError::from_wire("104", "Script is missing");
    assert_eq!(e.kind(), DataApiErrorCode::ScriptMissing);
    assert!(matches!(ApiResult::from(e), ApiResult::Failure(_)));
}
