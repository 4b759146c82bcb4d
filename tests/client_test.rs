//! 抽出APIクライアントの結合テスト
//!
//! ローカルに立てた axum サーバーで multipart の形と応答の扱いを検証

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use invoice_extract::client::{ExtractionService, HttpExtractionClient};
use invoice_extract::error::InvoiceExtractError;
use invoice_extract_common::{ExtractionResult, SubmissionRequest, UploadedFile};
use serde_json::{json, Value};
use std::net::SocketAddr;

/// 受け取ったパートをそのまま結果として返す
async fn process(mut multipart: Multipart) -> Json<Value> {
    let mut files = Vec::new();
    let mut fields = Value::Null;

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("files") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap();
                files.push((file_name, content_type, bytes.len()));
            }
            Some("fields") => {
                let text = field.text().await.unwrap();
                fields = serde_json::from_str(&text).unwrap();
            }
            _ => {}
        }
    }

    let results: Vec<Value> = files
        .into_iter()
        .map(|(file_name, content_type, size)| {
            if file_name.starts_with("bad") {
                json!({"fileName": file_name, "error": "could not read document"})
            } else {
                json!({
                    "fileName": file_name,
                    "extractedFields": {"invoice_number": "INV-1"},
                    "rawResponse": {"fields": fields, "content_type": content_type, "size": size},
                    "promptUsed": "Extract the requested fields"
                })
            }
        })
        .collect();

    Json(Value::Array(results))
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn not_array() -> Json<Value> {
    Json(json!({"detail": "unexpected"}))
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/process", post(process))
        .route("/broken", post(broken))
        .route("/not-array", post(not_array));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn request(files: Vec<UploadedFile>) -> SubmissionRequest {
    SubmissionRequest {
        files,
        fields: vec!["invoice_number".into(), "total_amount".into()],
    }
}

#[tokio::test]
async fn test_process_sends_files_and_fields() {
    let addr = serve().await;
    let client = HttpExtractionClient::new(format!("http://{}/process", addr));

    let results = client
        .process(&request(vec![
            UploadedFile::new("a.pdf", "application/pdf", b"%PDF-1.4\n".to_vec()),
            UploadedFile::new("b.png", "image/png", vec![0u8; 32]),
        ]))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].file_name(), "a.pdf");
    assert_eq!(results[1].file_name(), "b.png");

    match &results[1] {
        ExtractionResult::Success { raw_response, prompt_used, .. } => {
            assert_eq!(raw_response["fields"], json!(["invoice_number", "total_amount"]));
            assert_eq!(raw_response["content_type"], "image/png");
            assert_eq!(raw_response["size"], 32);
            assert_eq!(prompt_used.as_deref(), Some("Extract the requested fields"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_process_keeps_per_file_errors() {
    let addr = serve().await;
    let client = HttpExtractionClient::new(format!("http://{}/process", addr));

    let results = client
        .process(&request(vec![
            UploadedFile::new("good.pdf", "application/pdf", b"%PDF".to_vec()),
            UploadedFile::new("bad.pdf", "application/pdf", b"%PDF".to_vec()),
        ]))
        .await
        .unwrap();

    assert!(!results[0].is_error());
    assert!(results[1].is_error());
}

#[tokio::test]
async fn test_server_error_is_total_failure() {
    let addr = serve().await;
    let client = HttpExtractionClient::new(format!("http://{}/broken", addr));

    let err = client
        .process(&request(vec![UploadedFile::new("a.pdf", "application/pdf", b"%PDF".to_vec())]))
        .await
        .unwrap_err();

    assert!(matches!(err, InvoiceExtractError::ApiCall(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_non_array_response_is_parse_error() {
    let addr = serve().await;
    let client = HttpExtractionClient::new(format!("http://{}/not-array", addr));

    let err = client
        .process(&request(vec![UploadedFile::new("a.pdf", "application/pdf", b"%PDF".to_vec())]))
        .await
        .unwrap_err();

    assert!(matches!(err, InvoiceExtractError::ApiParse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_api_error() {
    // 一度バインドして解放したポートは接続拒否になる
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpExtractionClient::new(format!("http://{}/process", addr));
    let err = client
        .process(&request(vec![UploadedFile::new("a.pdf", "application/pdf", b"%PDF".to_vec())]))
        .await
        .unwrap_err();

    assert!(matches!(err, InvoiceExtractError::ApiCall(_)));
}
