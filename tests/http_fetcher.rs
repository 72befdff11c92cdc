mod common;

use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;

use common::*;
use kex_relay::domains::{Direction, KeyId};
use kex_relay::error::KexError;
use kex_relay::interfaces::transport::{ChannelFetcher, FetchRequest};
use kex_relay::services::transport::HttpChannelFetcher;

fn fetcher(server: &MockServer, token: &str) -> HttpChannelFetcher {
    HttpChannelFetcher::new(server.base_url(), token.to_string(), Duration::from_secs(3)).unwrap()
}

fn request(low: u64) -> FetchRequest {
    FetchRequest {
        weak_id: secret().weak_id(),
        direction: Direction::YtoX,
        low,
        poll: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn fetch_sends_channel_query_and_session() {
    let server = MockServer::start_async().await;
    let record = signed(3, hello_body());
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/kex/receive")
                .query_param("w", secret().weak_id().to_hex())
                .query_param("dir", "1")
                .query_param("low", "3")
                .query_param("poll", "1")
                .header("authorization", "Bearer session-token");
            then.status(200).json_body(json!({
                "status": {"code": 0, "name": "OK"},
                "msgs": [record.0]
            }));
        })
        .await;

    let records = fetcher(&server, "session-token")
        .fetch(&request(3))
        .await
        .unwrap();
    mock.assert_hits(1);
    assert_eq!(records, vec![signed(3, hello_body())]);
}

#[tokio::test]
async fn missing_msgs_is_an_empty_poll() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/kex/receive");
            then.status(200)
                .json_body(json!({"status": {"code": 0, "name": "OK"}, "msgs": null}));
        })
        .await;

    let records = fetcher(&server, "").fetch(&request(1)).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn api_status_error_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/kex/receive");
            then.status(200)
                .json_body(json!({"status": {"code": 201, "name": "BADSESSION"}}));
        })
        .await;

    let err = fetcher(&server, "").fetch(&request(1)).await.unwrap_err();
    assert!(matches!(err, KexError::Api { code: 201, ref name } if name == "BADSESSION"));
}

#[tokio::test]
async fn http_failure_is_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/kex/receive");
            then.status(502);
        })
        .await;

    let err = fetcher(&server, "").fetch(&request(1)).await.unwrap_err();
    assert!(matches!(err, KexError::Http(_)));
}

#[tokio::test]
async fn receiver_over_http_drops_forged_and_dispatches_hello() {
    let server = MockServer::start_async().await;
    let forged_record = forged(1, please_sign_body());
    let hello_record = signed(2, hello_body());
    server
        .mock_async(|when, then| {
            when.method(GET).path("/kex/receive").query_param("low", "1");
            then.status(200).json_body(json!({
                "status": {"code": 0, "name": "OK"},
                "msgs": [forged_record.0, hello_record.0]
            }));
        })
        .await;

    let handler = Arc::new(RecordingHandler::new());
    let mut receiver = receiver(handler.clone(), Arc::new(fetcher(&server, "")))
        .with_poll(Duration::from_secs(1));
    receiver.receive(&mut meta()).await.unwrap();

    assert_eq!(receiver.cursor(), 2);
    assert_eq!(
        handler.calls().await,
        vec![Call::Hello(DEVICE_Y, KeyId::new("0120d3458bbecdfc"))]
    );
}
