//! HttpAuthority against a throwaway HTTP responder on loopback.
//!
//! Each test starts a listener that answers scripted responses in order and
//! records the request line and body it received.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use roster_state::{
    AuthorityError, ClientConfig, HttpAuthority, RecordAuthority, RecordDraft, RecordId,
    RegisteredAt,
};

#[derive(Debug, Clone)]
struct Seen {
    request_line: String,
    body: String,
}

struct Responder {
    base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

/// Serve `responses` (status, body) one per connection.
async fn responder(responses: Vec<(u16, &'static str)>) -> Responder {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            log.lock().unwrap().push(request);
            let reply = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {len}\r\nconnection: close\r\n\r\n{body}",
                reason = if status < 300 { "OK" } else { "Error" },
                len = body.len(),
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    Responder {
        base_url: format!("http://{addr}"),
        seen,
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Seen {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Seen {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    }
}

fn authority(base_url: &str) -> HttpAuthority {
    HttpAuthority::new(ClientConfig::new(base_url)).unwrap()
}

#[tokio::test]
async fn list_decodes_records_in_authority_order() {
    let server = responder(vec![(
        200,
        r#"[{"id":2,"nombre":"Luis","correo":"l@x.com","fecha_registro":"Tue, 02 Jan 2024 09:00:00 GMT"},
            {"id":1,"nombre":"Ana","correo":"a@x.com","fecha_registro":"2024-01-01"}]"#,
    )])
    .await;

    let records = authority(&server.base_url).list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, RecordId(2));
    assert_eq!(records[1].name, "Ana");

    let seen = server.seen.lock().unwrap().clone();
    assert_eq!(seen[0].request_line, "GET /api/usuarios HTTP/1.1");
}

#[tokio::test]
async fn list_keeps_records_with_odd_registration_values() {
    let server = responder(vec![(
        200,
        r#"[{"id":1,"nombre":"Ana","correo":"a@x.com","fecha_registro":"2024-01-01T10:00:00.123456"},
            {"id":2,"nombre":"Luis","correo":"l@x.com","fecha_registro":null}]"#,
    )])
    .await;

    let records = authority(&server.base_url).list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].registered_at.timestamp().is_some());
    assert_eq!(records[1].registered_at, RegisteredAt::Missing);
}

#[tokio::test]
async fn list_malformed_body_is_decode_error() {
    let server = responder(vec![(200, r#"{"error":"not a list"}"#)]).await;
    let err = authority(&server.base_url).list().await.unwrap_err();
    assert!(matches!(err, AuthorityError::Decode(_)));
}

#[tokio::test]
async fn list_non_2xx_is_status_error() {
    let server = responder(vec![(500, r#"{"error":"db down"}"#)]).await;
    let err = authority(&server.base_url).list().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn create_posts_spanish_body() {
    let server = responder(vec![(201, r#"{"mensaje":"ok"}"#)]).await;
    authority(&server.base_url)
        .create(&RecordDraft::new("Ana", "a@x.com"))
        .await
        .unwrap();

    let seen = server.seen.lock().unwrap().clone();
    assert_eq!(seen[0].request_line, "POST /api/usuarios HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"nombre": "Ana", "correo": "a@x.com"}));
}

#[tokio::test]
async fn update_and_delete_address_the_record() {
    let server = responder(vec![(200, "{}"), (200, "{}")]).await;
    let client = authority(&server.base_url);
    client
        .update(RecordId(7), &RecordDraft::new("Ana", "b@x.com"))
        .await
        .unwrap();
    client.delete(RecordId(7)).await.unwrap();

    let seen = server.seen.lock().unwrap().clone();
    assert_eq!(seen[0].request_line, "PUT /api/usuarios/7 HTTP/1.1");
    assert!(seen[0].body.contains(r#""correo":"b@x.com""#));
    assert_eq!(seen[1].request_line, "DELETE /api/usuarios/7 HTTP/1.1");
}

#[tokio::test]
async fn rejected_mutation_carries_status_and_body() {
    let server = responder(vec![(404, r#"{"error":"no existe"}"#)]).await;
    let err = authority(&server.base_url)
        .delete(RecordId(99))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthorityError::Status {
            status: 404,
            body: r#"{"error":"no existe"}"#.to_string(),
        }
    );
}
