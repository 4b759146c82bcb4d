//! 抽出結果JSONの保存

use crate::error::{InvoiceExtractError, Result};
use invoice_extract_common::Download;
use std::path::{Component, Path, PathBuf};

/// ダウンロード先ディレクトリに書き出し、保存先パスを返す
///
/// ファイル名は単一のパス要素に限る（ディレクトリ外には書かない）。
pub fn save_download(dir: &Path, download: &Download) -> Result<PathBuf> {
    let mut components = Path::new(&download.file_name).components();
    let is_plain_name = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !is_plain_name {
        return Err(InvoiceExtractError::InvalidDownloadName(download.file_name.clone()));
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(&download.file_name);
    std::fs::write(&path, &download.contents)?;
    Ok(path)
}
