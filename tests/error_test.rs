//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use invoice_extract::error::InvoiceExtractError;
use invoice_extract::scanner;
use std::path::PathBuf;
use tempfile::tempdir;

/// 存在しないパスを指定した場合
#[test]
fn test_collect_nonexistent_path() {
    let result = scanner::collect_candidates(&[PathBuf::from("/nonexistent/path/12345.pdf")]);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, InvoiceExtractError::FileNotFound(_)));
}

/// 空のフォルダを指定した場合
#[test]
fn test_collect_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::collect_candidates(&[dir.path().to_path_buf()]);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 対象外ファイルも候補としては読み込む（判定は取り込み側）
#[test]
fn test_collect_folder_without_invoices() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let candidates = scanner::collect_candidates(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].mime_type, "text/plain");
    assert!(candidates[0].kind().is_none());
}

/// Display実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        InvoiceExtractError::Config("bad endpoint".to_string()),
        InvoiceExtractError::FileNotFound("a.pdf".to_string()),
        InvoiceExtractError::NoFilesAccepted("invoices/".to_string()),
        InvoiceExtractError::NoFieldsSelected,
        InvoiceExtractError::ApiCall("Server error (500)".to_string()),
        InvoiceExtractError::ApiParse("expected array".to_string()),
        InvoiceExtractError::Timeout(30),
        InvoiceExtractError::Preview("decode failed".to_string()),
        InvoiceExtractError::InvalidDownloadName("../a_extracted.json".to_string()),
        InvoiceExtractError::Clipboard("no clipboard".to_string()),
        InvoiceExtractError::CliExecution("not a terminal".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "empty message: {:?}", err);
    }
}

/// タイムアウトは秒数を含む
#[test]
fn test_timeout_message() {
    let err = InvoiceExtractError::Timeout(300);
    assert_eq!(err.to_string(), "request timed out after 300s");
}

/// フィールド未選択のメッセージに指定方法を含める
#[test]
fn test_no_fields_message() {
    let display = InvoiceExtractError::NoFieldsSelected.to_string();
    assert!(display.contains("--field"));
    assert!(display.contains("--all-fields"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: InvoiceExtractError = io_err.into();

    assert!(matches!(err, InvoiceExtractError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: InvoiceExtractError = json_err.into();

    assert!(matches!(err, InvoiceExtractError::JsonParse(_)));
}

/// common::Errorからの変換（透過的）
#[test]
fn test_common_error_conversion() {
    let common_err = invoice_extract_common::Error::Parse("response is not an array".to_string());
    let err: InvoiceExtractError = common_err.into();

    assert!(matches!(err, InvoiceExtractError::Common(_)));
    assert!(err.to_string().contains("response is not an array"));
}
