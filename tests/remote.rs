mod common;

use std::{
    fs,
    time::{Duration, Instant},
};

use llama_rng::{remote::RemoteProvider, ErrorKind, Provider};

#[test]
fn returns_the_served_value() {
    let url = common::serve("200 OK", r#"{"random": 0.73}"#);
    let mut provider = RemoteProvider::new(&url).unwrap();

    let value = provider.generate().unwrap();
    assert_eq!(value.value(), 0.73);
    assert_eq!(value.source(), "remote-http");
}

#[test]
fn reuses_one_provider_across_calls() {
    let url = common::serve("200 OK", r#"{"random": 0.25}"#);
    let mut provider = RemoteProvider::new(&url).unwrap();

    for _ in 0..5 {
        assert_eq!(provider.generate().unwrap().value(), 0.25);
    }
}

#[test]
fn clamps_out_of_range_values() {
    let url = common::serve("200 OK", r#"{"random": 1.5}"#);
    assert_eq!(RemoteProvider::new(&url).unwrap().generate().unwrap().value(), 1.0);

    let url = common::serve("200 OK", r#"{"random": -0.3}"#);
    assert_eq!(RemoteProvider::new(&url).unwrap().generate().unwrap().value(), 0.0);
}

#[test]
fn non_json_body_is_a_protocol_error() {
    let url = common::serve("200 OK", "not json");
    let err = RemoteProvider::new(&url).unwrap().generate().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Protocol);
}

#[test]
fn missing_field_is_a_protocol_error() {
    let url = common::serve("200 OK", r#"{"value": 0.5}"#);
    let err = RemoteProvider::new(&url).unwrap().generate().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Protocol);
}

#[test]
fn non_numeric_field_is_a_protocol_error() {
    let url = common::serve("200 OK", r#"{"random": "0.5"}"#);
    let err = RemoteProvider::new(&url).unwrap().generate().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Protocol);
}

#[test]
fn error_status_is_a_protocol_error() {
    let url = common::serve("500 Internal Server Error", r#"{"random": 0.5}"#);
    let err = RemoteProvider::new(&url).unwrap().generate().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Protocol);
}

#[test]
fn silent_endpoint_times_out() {
    let url = common::stall();
    let timeout = Duration::from_millis(300);
    let mut provider = RemoteProvider::with_timeout(&url, timeout).unwrap();

    let start = Instant::now();
    let err = provider.generate().unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(elapsed >= Duration::from_millis(250), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");
}

#[test]
fn refused_connection_is_a_connectivity_error() {
    let url = common::refused();
    let err = RemoteProvider::new(&url).unwrap().generate().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Connectivity);
}

#[test]
fn logs_only_successful_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.txt");

    let url = common::serve("200 OK", r#"{"random": 0.5}"#);
    let mut provider = RemoteProvider::new(&url).unwrap();
    provider.set_log_sink(&path).unwrap();
    for _ in 0..3 {
        provider.generate().unwrap();
    }

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "# remote-http");
    assert!(lines[1..].iter().all(|line| line.ends_with(",0.500000")));
}

#[test]
fn clone_fetches_from_the_same_endpoint() {
    let url = common::serve("200 OK", r#"{"random": 0.375}"#);
    let provider = RemoteProvider::new(&url).unwrap();
    let mut copy = provider.try_clone().unwrap();
    drop(provider);

    assert_eq!(copy.generate().unwrap().value(), 0.375);
}
