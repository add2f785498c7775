//! HTTP behaviour of the default resolver against a mock server.
//!
//! The resolver uses a blocking client, so every check runs inside
//! `spawn_blocking` while the mock server keeps serving on the runtime.

use std::sync::Mutex;
use std::time::Duration;

use envspec_core::{ErrorCode, FileDescriptor, Md5Digest};
use envspec_integrity::{
    DefaultResolver, IntegrityChecker, IntegrityOutcome, NoProgress, ProgressEvent,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &[u8] = b"#!/bin/sh\necho openMalaria\n";

fn descriptor(sources: Vec<String>) -> FileDescriptor {
    FileDescriptor {
        component_name: "software".to_string(),
        file_name: "openMalaria".to_string(),
        id: "om-32".to_string(),
        sources,
        format: "plain".to_string(),
        checksum: Md5Digest::of(BODY).to_hex(),
        declared_size: BODY.len() as u64,
        mount_point: Some("/software/openMalaria".to_string()),
    }
}

async fn check(sources: Vec<String>) -> (IntegrityOutcome, Vec<i8>) {
    tokio::task::spawn_blocking(move || {
        let resolver = DefaultResolver::new(Duration::from_secs(5), "envspec-test").unwrap();
        let events = Mutex::new(Vec::new());
        let observer = |e: &ProgressEvent<'_>| events.lock().unwrap().push(e.percent);
        let outcome = IntegrityChecker::new(&resolver).check(&descriptor(sources), &observer);
        (outcome, events.into_inner().unwrap())
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn matching_download_is_intact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/om.sh"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let (outcome, events) = check(vec![format!("{}/om.sh", server.uri())]).await;
    assert!(outcome.is_intact(), "{outcome:?}");
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(events.last().copied(), Some(100));
    assert_eq!(events.iter().filter(|p| **p == 100).count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn not_found_is_temporary_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.sh"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing.sh", server.uri());
    let (outcome, events) = check(vec![url.clone()]).await;
    assert_eq!(outcome.errors.len(), 1);
    let err = &outcome.errors[0];
    assert_eq!(err.code, ErrorCode::BadUrl);
    assert!(err.may_be_temporary);
    assert_eq!(err.url.as_deref(), Some(url.as_str()));
    assert_eq!(err.description, "Http error \"HTTP Error 404: Not Found\"");
    assert!(events.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn changed_content_is_wrong_md5() {
    let server = MockServer::start().await;
    let tampered: Vec<u8> = BODY.iter().map(|b| b.to_ascii_uppercase()).collect();
    Mock::given(method("GET"))
        .and(path("/om.sh"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(tampered))
        .mount(&server)
        .await;

    let (outcome, _) = check(vec![format!("{}/om.sh", server.uri())]).await;
    let codes: Vec<_> = outcome.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, [ErrorCode::WrongMd5]);
    assert!(!outcome.errors[0].may_be_temporary);
}

#[tokio::test(flavor = "multi_thread")]
async fn dead_mirror_does_not_stop_next_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dead/om.sh"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/live/om.sh"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let dead = format!("{}/dead/om.sh", server.uri());
    let live = format!("{}/live/om.sh", server.uri());
    let (outcome, _) = check(vec![dead.clone(), live]).await;

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].code, ErrorCode::BadUrl);
    assert_eq!(outcome.errors[0].url.as_deref(), Some(dead.as_str()));
    assert!(outcome.errors[0].may_be_temporary);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_host_is_temporary_url_error() {
    let (outcome, _) = check(vec!["http://127.0.0.1:1/om.sh".to_string()]).await;
    assert_eq!(outcome.errors.len(), 1);
    let err = &outcome.errors[0];
    assert_eq!(err.code, ErrorCode::BadUrl);
    assert!(err.may_be_temporary);
    assert!(err.description.starts_with("Url error \""), "{}", err.description);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_length_mismatch_warns_but_streamed_bytes_decide() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/om.sh"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY))
        .mount(&server)
        .await;

    let url = format!("{}/om.sh", server.uri());
    let (outcome, _) = tokio::task::spawn_blocking(move || {
        let resolver = DefaultResolver::new(Duration::from_secs(5), "envspec-test").unwrap();
        let mut desc = descriptor(vec![url]);
        desc.declared_size += 1;
        let outcome = IntegrityChecker::new(&resolver).check(&desc, &NoProgress);
        (outcome, ())
    })
    .await
    .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    let codes: Vec<_> = outcome.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, [ErrorCode::WrongFileSize]);
}
