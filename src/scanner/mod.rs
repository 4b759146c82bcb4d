//! 入力パスから取り込み候補を収集
//!
//! ファイルはそのまま、フォルダは直下のみ走査する。
//! MIMEタイプは拡張子から推定し、対象外の判定は取り込み側に任せる。

use crate::error::{InvoiceExtractError, Result};
use invoice_extract_common::UploadedFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 拡張子からMIMEタイプを推定（不明は application/octet-stream）
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// 1ファイルを読み込んで候補にする
pub fn load_file(path: &Path) -> Result<UploadedFile> {
    if !path.is_file() {
        return Err(InvoiceExtractError::FileNotFound(path.display().to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let content = std::fs::read(path)?;

    Ok(UploadedFile::new(name, guess_mime_type(path), content))
}

/// パス一覧を展開してファイル一覧にする
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = WalkDir::new(path)
                .min_depth(1)
                .max_depth(1) // 直下のみ（再帰しない）
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file())
                .collect();
            // ファイル名でソート
            entries.sort();
            files.extend(entries);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(InvoiceExtractError::FileNotFound(path.display().to_string()));
        }
    }

    Ok(files)
}

/// パス一覧から取り込み候補を読み込む
pub fn collect_candidates(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    expand_paths(paths)?
        .iter()
        .map(|p| load_file(p))
        .collect()
}
