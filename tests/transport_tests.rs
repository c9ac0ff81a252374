//! Transport tests: deadline enforcement and the two read modes.

mod common;

use std::time::{Duration, Instant};

use adde::network::exchange;
use adde::protocol::{Request, ServiceTag};
use adde::{AddeError, Endpoint};
use common::{image_response, Behavior, FakeServer};

fn endpoint(server: &FakeServer) -> Endpoint {
    Endpoint::builder("127.0.0.1")
        .port(server.addr.port())
        .build()
        .unwrap()
}

fn request() -> Request {
    Request::new(ServiceTag::AreaGet, "GROUP DESCR 0 BAND=ALL")
}

#[test]
fn chunked_read_collects_a_multi_chunk_response() {
    // larger than one read chunk, so the loop has to iterate
    let payload = vec![0xA5u8; 256 * 1024];
    let response = image_response(&payload);
    let server = FakeServer::spawn(vec![Behavior::Reply(response.clone())]);

    let body = exchange(
        &endpoint(&server),
        &request(),
        Duration::from_secs(5),
        true,
    )
    .unwrap();
    assert_eq!(&body[..], &response[..]);
    server.join();
}

#[test]
fn chunked_read_times_out_on_a_stalled_server() {
    let server = FakeServer::spawn(vec![Behavior::Stall(Duration::from_secs(2))]);

    let err = exchange(
        &endpoint(&server),
        &request(),
        Duration::from_millis(150),
        true,
    )
    .unwrap_err();
    match err {
        AddeError::Timeout { service, host } => {
            assert_eq!(service, "aget");
            assert_eq!(host, "127.0.0.1");
        }
        other => panic!("expected Timeout error, got {other:?}"),
    }
    server.join();
}

#[test]
fn bulk_read_deadline_is_overall_not_per_byte() {
    // a server dripping bytes faster than any idle timeout must still fail
    // the exchange when the overall deadline passes
    let server = FakeServer::spawn(vec![Behavior::Drip(
        b"slow response".to_vec(),
        Duration::from_millis(50),
    )]);

    let started = Instant::now();
    let err = exchange(
        &endpoint(&server),
        &request(),
        Duration::from_millis(150),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, AddeError::Timeout { .. }), "{err:?}");
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "exchange outlived its deadline: {:?}",
        started.elapsed()
    );
    server.join();
}

#[test]
fn bulk_read_returns_a_slowly_delivered_response_within_deadline() {
    let server = FakeServer::spawn(vec![Behavior::Drip(
        b"ok".to_vec(),
        Duration::from_millis(20),
    )]);

    let body = exchange(
        &endpoint(&server),
        &request(),
        Duration::from_secs(5),
        false,
    )
    .unwrap();
    assert_eq!(&body[..], b"ok");
    server.join();
}
