use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::{Arc, Mutex};

use digit_pad::config::ServiceConfig;
use digit_pad::recognition::{RecognitionClient, RecognitionError};

#[derive(Debug, Clone)]
struct CapturedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

type Captures = Arc<Mutex<Vec<CapturedField>>>;

#[derive(Clone)]
enum Reply {
    Json(StatusCode, serde_json::Value),
    Text(StatusCode, &'static str),
}

async fn analize(
    State((reply, captures)): State<(Reply, Captures)>,
    mut multipart: Multipart,
) -> Response {
    while let Some(field) = multipart.next_field().await.expect("bad multipart body") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.expect("field bytes").to_vec();
        captures.lock().expect("captures lock").push(CapturedField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }

    match reply {
        Reply::Json(status, body) => (status, Json(body)).into_response(),
        Reply::Text(status, body) => (status, body).into_response(),
    }
}

async fn spawn_service(reply: Reply) -> (RecognitionClient, Captures) {
    let captures: Captures = Arc::default();
    let app = Router::new()
        .route("/NumbersNeuralNetwork/Analize", post(analize))
        .with_state((reply, captures.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake service");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake service crashed");
    });

    let config = ServiceConfig::new(&format!("http://{addr}")).expect("config");
    let client = RecognitionClient::new(&config).expect("client");
    (client, captures)
}

fn success(value: &str, image: &[u8]) -> Reply {
    Reply::Json(
        StatusCode::OK,
        serde_json::json!({ "value": value, "image": STANDARD.encode(image) }),
    )
}

#[tokio::test]
async fn posts_image_as_value_field_named_image_png() {
    let annotated = b"\x89PNG\r\n\x1a\nannotated-bytes".to_vec();
    let (client, captures) = spawn_service(success("7", &annotated)).await;

    let drawn = b"\x89PNG\r\n\x1a\ndrawn".to_vec();
    let result = client.analyze(drawn.clone()).await.expect("analyze failed");

    assert_eq!(result.value, "7");
    assert_eq!(result.image, annotated);
    assert_eq!(
        result.image.len(),
        STANDARD.decode(STANDARD.encode(&annotated)).unwrap().len()
    );

    let captured = captures.lock().unwrap().clone();
    assert_eq!(captured.len(), 1, "expected a single form field");
    assert_eq!(captured[0].name, "value");
    assert_eq!(captured[0].file_name.as_deref(), Some("image.png"));
    assert_eq!(captured[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(captured[0].bytes, drawn);
}

#[tokio::test]
async fn uploaded_file_is_forwarded_unmodified_whatever_its_format() {
    let (client, captures) = spawn_service(success("42", b"img")).await;

    let jpeg_like = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    let result = client.analyze(jpeg_like.clone()).await.expect("analyze failed");
    assert_eq!(result.value, "42");

    let captured = captures.lock().unwrap().clone();
    assert_eq!(captured[0].file_name.as_deref(), Some("image.png"));
    assert_eq!(captured[0].bytes, jpeg_like);
}

#[tokio::test]
async fn service_error_message_is_surfaced_verbatim() {
    let (client, _) = spawn_service(Reply::Json(
        StatusCode::BAD_REQUEST,
        serde_json::json!({ "message": "bad input" }),
    ))
    .await;

    let err = client.analyze(vec![1, 2, 3]).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Service { status: 400, .. }));
    assert_eq!(err.message(), "bad input");
}

#[tokio::test]
async fn plain_text_failure_uses_the_body() {
    let (client, _) = spawn_service(Reply::Text(StatusCode::INTERNAL_SERVER_ERROR, "boom")).await;

    let err = client.analyze(vec![1]).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Service { status: 500, .. }));
    assert_eq!(err.message(), "boom");
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let (client, _) = spawn_service(Reply::Json(
        StatusCode::OK,
        serde_json::json!({ "value": "3" }),
    ))
    .await;

    let err = client.analyze(vec![1]).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Decode(_)));
    assert!(!err.message().is_empty());
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ServiceConfig::new(&format!("http://{addr}")).unwrap();
    let client = RecognitionClient::new(&config).unwrap();

    let err = client.analyze(vec![1]).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Transport(_)));
    assert!(!err.message().is_empty());
}

#[test]
fn client_targets_the_analyze_path() {
    let config = ServiceConfig::new("http://127.0.0.1:7258/").unwrap();
    let client = RecognitionClient::new(&config).unwrap();
    assert_eq!(
        client.endpoint(),
        "http://127.0.0.1:7258/NumbersNeuralNetwork/Analize"
    );
}
