//! 共通の型定義
//!
//! CLIとコアで共有される型:
//! - UploadedFile: 取り込み済みの請求書ファイル
//! - ExtractionResult: 抽出APIのファイル単位の結果
//! - Notification: 一時的なユーザー通知

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 受け付けるMIMEタイプ
pub const VALID_FILE_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg", "image/jpg"];

/// 通知の表示時間
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(5);

/// ファイル種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Png,
    Jpeg,
}

impl FileKind {
    /// MIMEタイプから種別を判定（対象外はNone）
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let mime = mime_type.trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/pdf" => Some(FileKind::Pdf),
            "image/png" => Some(FileKind::Png),
            "image/jpeg" | "image/jpg" => Some(FileKind::Jpeg),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, FileKind::Png | FileKind::Jpeg)
    }
}

/// アップロード対象ファイル
///
/// 内容は `Arc` で共有し、プレビュー生成と送信でコピーしない。
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub content: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        let byte_size = content.len() as u64;
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            byte_size,
            content: content.into(),
        }
    }

    /// 受付可能な種別ならSome
    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_mime(&self.mime_type)
    }
}

/// 抽出結果（1ファイル分）
///
/// ワイヤ形式は `{fileName, extractedFields, rawResponse, promptUsed}` または
/// `{fileName, error}`。`error` が真値ならエラー結果として扱う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireResult", into = "WireResult")]
pub enum ExtractionResult {
    Success {
        file_name: String,
        extracted_fields: Value,
        raw_response: Value,
        prompt_used: Option<String>,
    },
    Failure {
        file_name: String,
        error: String,
        prompt_used: Option<String>,
    },
}

impl ExtractionResult {
    pub fn file_name(&self) -> &str {
        match self {
            ExtractionResult::Success { file_name, .. } => file_name,
            ExtractionResult::Failure { file_name, .. } => file_name,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ExtractionResult::Failure { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    #[serde(default)]
    file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extracted_fields: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt_used: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

/// JSの真偽判定に合わせる（null / false / 0 / "" は偽）
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl From<WireResult> for ExtractionResult {
    fn from(wire: WireResult) -> Self {
        let prompt_used = wire
            .prompt_used
            .filter(|v| !v.is_null())
            .map(value_to_text);

        match wire.error {
            Some(error) if is_truthy(&error) => ExtractionResult::Failure {
                file_name: wire.file_name,
                error: value_to_text(error),
                prompt_used,
            },
            _ => ExtractionResult::Success {
                file_name: wire.file_name,
                extracted_fields: wire.extracted_fields.unwrap_or(Value::Null),
                raw_response: wire.raw_response.unwrap_or(Value::Null),
                prompt_used,
            },
        }
    }
}

impl From<ExtractionResult> for WireResult {
    fn from(result: ExtractionResult) -> Self {
        match result {
            ExtractionResult::Success {
                file_name,
                extracted_fields,
                raw_response,
                prompt_used,
            } => WireResult {
                file_name,
                extracted_fields: Some(extracted_fields),
                raw_response: Some(raw_response),
                prompt_used: prompt_used.map(Value::String),
                error: None,
            },
            ExtractionResult::Failure {
                file_name,
                error,
                prompt_used,
            } => WireResult {
                file_name,
                prompt_used: prompt_used.map(Value::String),
                error: Some(Value::String(error)),
                ..Default::default()
            },
        }
    }
}

/// 通知種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// 一時通知
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
    /// セッション内の通し番号（1始まり、未登録は0）
    pub seq: u64,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            created_at: Instant::now(),
            seq: 0,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= NOTIFICATION_LIFETIME
    }
}
