//! HttpClient against a local tiny_http server standing in for the backend

use std::io::Read;
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use tiny_http::{Header, Response, Server};

use placaview_client::{HttpClient, RecordsApi};
use placaview_types::{Error, PlateUpdate, UploadPayload};

/// What the fake backend saw for one request
#[derive(Debug)]
struct Seen {
    method: String,
    url: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Serve the scripted `(status, body)` replies in order, then stop.
fn fake_backend(replies: Vec<(u16, &'static str)>) -> Option<(String, JoinHandle<Vec<Seen>>)> {
    // skip test if we can't bind to a local port
    if TcpListener::bind("127.0.0.1:0").is_err() {
        eprintln!("skipping test: cannot bind local port");
        return None;
    }

    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let mut req = server.recv().unwrap();
            let mut buf = Vec::new();
            req.as_reader().read_to_end(&mut buf).unwrap();
            seen.push(Seen {
                method: req.method().to_string(),
                url: req.url().to_string(),
                content_type: req
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.to_string()),
                body: buf,
            });
            let json = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let _ = req.respond(
                Response::from_string(body)
                    .with_status_code(status)
                    .with_header(json),
            );
        }
        seen
    });

    Some((format!("http://127.0.0.1:{port}"), handle))
}

const RECORD: &str = r#"{"_id":"abc123","placa":"ABC1D23","filename":"carro.jpg","image_base64":"aGVsbG8=","hora_entrada":"2024-05-01 08:30:00","hora_saida":null}"#;

#[test]
fn list_sends_limit_and_parses_records() {
    let Some((url, server)) = fake_backend(vec![(200, "[]"), (200, concat!("[", r#"{"_id":"1","placa":"AAA1111","image_base64":"","hora_entrada":"x"}"#, "]"))]) else {
        return;
    };
    let client = HttpClient::new(&url).unwrap();

    assert!(client.list(100).unwrap().is_empty());
    let records = client.list(5).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id(), "1");

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].url, "/api/placas/?limit=100");
    assert_eq!(seen[1].url, "/api/placas/?limit=5");
}

#[test]
fn get_and_delete_use_record_path() {
    let Some((url, server)) =
        fake_backend(vec![(200, RECORD), (200, r#"{"message":"Registro excluído com sucesso"}"#)])
    else {
        return;
    };
    let client = HttpClient::new(&url).unwrap();

    let record = client.get("abc123").unwrap();
    assert_eq!(record.plate, "ABC1D23");
    assert!(record.is_present());

    let deleted = client.delete("abc123").unwrap();
    assert_eq!(deleted.message, "Registro excluído com sucesso");

    let seen = server.join().unwrap();
    assert_eq!((seen[0].method.as_str(), seen[0].url.as_str()), ("GET", "/api/placas/abc123"));
    assert_eq!((seen[1].method.as_str(), seen[1].url.as_str()), ("DELETE", "/api/placas/abc123"));
}

#[test]
fn search_posts_plate_and_maps_404_to_not_found() {
    let Some((url, server)) = fake_backend(vec![(
        404,
        r#"{"detail":"A placa ZZZ9999 não foi encontrada no sistema"}"#,
    )]) else {
        return;
    };
    let client = HttpClient::new(&url).unwrap();

    let err = client.search("ZZZ9999").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.detail(), Some("A placa ZZZ9999 não foi encontrada no sistema"));

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/api/placas/search");
    let body: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(body, serde_json::json!({ "placa": "ZZZ9999" }));
}

#[test]
fn update_sends_only_present_fields() {
    let Some((url, server)) = fake_backend(vec![(200, RECORD)]) else {
        return;
    };
    let client = HttpClient::new(&url).unwrap();

    let update = PlateUpdate {
        plate: Some("ABC1D23".to_string()),
        entry_time: Some("2024-05-01 08:30:00".to_string()),
        exit_time: None,
    };
    client.update("abc123", &update).unwrap();

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "PUT");
    let body: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "placa": "ABC1D23", "hora_entrada": "2024-05-01 08:30:00" })
    );
}

#[test]
fn upload_frame_is_multipart_text_field() {
    let Some((url, server)) = fake_backend(vec![(
        200,
        r#"{"_id":"n1","placa":"BRA2E19","image_base64":"aGVsbG8=","success":true,"message":"Placa reconhecida com sucesso"}"#,
    )]) else {
        return;
    };
    let client = HttpClient::new(&url).unwrap();

    let payload = UploadPayload::Frame {
        data_url: "data:image/png;base64,AAAA".to_string(),
    };
    let response = client.upload(&payload).unwrap();
    assert_eq!(response.plate, "BRA2E19");
    assert_eq!(response.id.as_deref(), Some("n1"));

    let seen = server.join().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].url, "/api/placas/upload");
    let content_type = seen[0].content_type.clone().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let body = String::from_utf8(seen[0].body.clone()).unwrap();
    assert!(body.contains("name=\"image_base64\"\r\n\r\ndata:image/png;base64,AAAA\r\n"));
}

#[test]
fn upload_failure_carries_backend_detail() {
    let Some((url, server)) = fake_backend(vec![(
        400,
        r#"{"detail":"Não foi possível reconhecer uma placa na imagem"}"#,
    )]) else {
        return;
    };
    let client = HttpClient::new(&url).unwrap();

    let payload = UploadPayload::File {
        filename: "carro.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![1, 2, 3],
    };
    match client.upload(&payload) {
        Err(Error::Api { status, detail }) => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Não foi possível reconhecer uma placa na imagem");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let seen = server.join().unwrap();
    let body = String::from_utf8_lossy(&seen[0].body).to_string();
    assert!(body.contains("name=\"image\"; filename=\"carro.png\"\r\nContent-Type: image/png"));
}

#[test]
fn supplementary_endpoints() {
    let Some((url, server)) = fake_backend(vec![
        (200, r#"{"message":"Saída registrada com sucesso","_id":"abc123"}"#),
        (200, r#"{"status":"healthy","message":"API funcionando corretamente"}"#),
        (200, r#"{"message":"Limpeza concluída. 2 registro(s) inválido(s) removido(s).","deleted_count":2}"#),
    ]) else {
        return;
    };
    let client = HttpClient::new(&url).unwrap();

    assert_eq!(client.register_exit("abc123").unwrap().id.as_deref(), Some("abc123"));
    assert_eq!(client.health().unwrap().status, "healthy");
    assert_eq!(client.clean_invalid().unwrap().deleted_count, 2);

    let seen = server.join().unwrap();
    assert_eq!((seen[0].method.as_str(), seen[0].url.as_str()), ("POST", "/api/placas/clear/abc123"));
    assert_eq!(seen[1].url, "/health");
    assert_eq!(seen[2].url, "/api/placas/admin/clean");
}

#[test]
fn unreachable_backend_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let Ok(listener) = TcpListener::bind("127.0.0.1:0") else {
        return;
    };
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = HttpClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
    let err = client.list(10).unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
}
