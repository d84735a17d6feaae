use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use std::time::Duration;
use tokio::task::JoinHandle;
use willow_relay::config::CrmConfig;
use willow_relay::{FubClient, Priority, TagPublisher, TagUpdate};

/// Serves exactly one HTTP request with the given status line and hands
/// back the raw request text.
async fn one_shot_server(status: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_complete(&buf) {
                break;
            }
        }
        let response = format!("HTTP/1.1 {}\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{{}}", status);
        sock.write_all(response.as_bytes()).await.unwrap();
        let _ = sock.shutdown().await;
        String::from_utf8_lossy(&buf).into_owned()
    });
    (format!("http://{}/v1", addr), handle)
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(split) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..split]
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    buf.len() >= split + 4 + content_length
}

fn client(base_url: &str) -> FubClient {
    FubClient::new(&CrmConfig {
        base_url: base_url.into(),
        api_token: "fka_test".into(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn accepted_update_reports_tags() {
    let (base, server) = one_shot_server("200 OK").await;
    let update = TagUpdate::for_score(55, Priority::Warm);
    let res = client(&base).publish_tags("123", &update).await;

    assert!(res.success);
    assert_eq!(res.tags_updated, Some(update.tags.clone()));
    assert_eq!(res.error, None);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/people/123/tags HTTP/1.1"), "{request}");
    // base64("fka_test:")
    assert!(request.to_ascii_lowercase().contains("authorization: basic zmthx3rlc3q6"), "{request}");
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "tags": ["WILLOW_SCORE_55", "PRIORITY_WARM", "FELLO_TRACKED"] })
    );
}

#[tokio::test]
async fn non_success_status_is_captured() {
    let (base, server) = one_shot_server("500 Internal Server Error").await;
    let res = client(&base)
        .publish_tags("9", &TagUpdate::for_score(10, Priority::New))
        .await;

    assert!(!res.success);
    assert_eq!(res.tags_updated, None);
    assert_eq!(res.error.as_deref(), Some("CRM API error: 500 Internal Server Error"));
    server.await.unwrap();
}

#[tokio::test]
async fn transport_error_is_captured() {
    // Bind then drop to get a port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let res = client(&format!("http://{}", addr))
        .publish_tags("9", &TagUpdate::for_score(10, Priority::New))
        .await;
    assert!(!res.success);
    assert!(res.error.is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn unresponsive_crm_times_out() {
    // Accepts the connection, then never answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (_sock, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let fub = FubClient::new(&CrmConfig {
        base_url: format!("http://{}", addr),
        api_token: "fka_test".into(),
        timeout_secs: 1,
    })
    .unwrap();
    let res = tokio::time::timeout(
        Duration::from_secs(5),
        fub.publish_tags("9", &TagUpdate::for_score(10, Priority::New)),
    )
    .await
    .expect("CRM call should be bounded by the client timeout");

    assert!(!res.success);
    assert_eq!(res.tags_updated, None);
    assert!(res.error.is_some_and(|e| !e.is_empty()));
    server.abort();
}
