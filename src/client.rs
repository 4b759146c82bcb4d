//! 抽出API連携
//!
//! `POST /process` に multipart で送信する:
//! - `files`: ファイルごとに繰り返すバイナリパート
//! - `fields`: 選択フィールドのJSON配列文字列

use crate::error::{InvoiceExtractError, Result};
use invoice_extract_common::{parse_results, ExtractionResult, SubmissionRequest};
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// 抽出サービス
#[allow(async_fn_in_trait)]
pub trait ExtractionService {
    async fn process(&self, request: &SubmissionRequest) -> Result<Vec<ExtractionResult>>;
}

/// HTTP実装
pub struct HttpExtractionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpExtractionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    fn build_form(request: &SubmissionRequest) -> Result<Form> {
        let mut form = Form::new();

        for file in &request.files {
            let part = Part::bytes(file.content.to_vec())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .map_err(|e| InvoiceExtractError::ApiCall(format!("invalid MIME type {}: {}", file.mime_type, e)))?;
            form = form.part("files", part);
        }

        Ok(form.text("fields", request.fields_json()))
    }
}

impl ExtractionService for HttpExtractionClient {
    async fn process(&self, request: &SubmissionRequest) -> Result<Vec<ExtractionResult>> {
        let form = Self::build_form(request)?;
        debug!(
            endpoint = %self.endpoint,
            files = request.files.len(),
            fields = %request.fields_json(),
            "sending extraction request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| InvoiceExtractError::ApiCall(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InvoiceExtractError::ApiCall(format!("Server error ({})", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| InvoiceExtractError::ApiCall(e.to_string()))?;
        debug!(bytes = body.len(), "extraction response received");

        parse_results(&body).map_err(|e| InvoiceExtractError::ApiParse(e.to_string()))
    }
}
