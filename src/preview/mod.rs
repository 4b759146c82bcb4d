//! プレビュー生成
//!
//! - 画像: デコードしてPNGで保存（サムネイルは220x160以内）
//! - PDF: ラスタライザで1ページ目を画像化。使えなければアイコン＋外部リンク
//!
//! 失敗はファイル単位の `PreviewOutcome::Failed` として返し、呼び出し側を止めない。
//! セッション用の出力先は一時ディレクトリで、`Previewer` の破棄とともに削除される。

pub mod raster;

pub use raster::{rasterizer_for, NoRasterizer, PdftoppmRasterizer, RasterError, Rasterizer};

use crate::error::{InvoiceExtractError, Result};
use image::{DynamicImage, ImageFormat};
use invoice_extract_common::{FileKind, PreviewOutcome, PreviewTarget, UploadedFile};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, warn};

const THUMBNAIL_WIDTH: u32 = 220;
const THUMBNAIL_HEIGHT: u32 = 160;

pub struct Previewer {
    rasterizer: Arc<dyn Rasterizer>,
    output_dir: PathBuf,
    modal_max_size: u32,
    _session_dir: Option<TempDir>,
}

impl Previewer {
    /// 指定ディレクトリに書き出す（ファイルは残る）
    pub fn new(rasterizer: Arc<dyn Rasterizer>, output_dir: impl Into<PathBuf>, modal_max_size: u32) -> Self {
        Self {
            rasterizer,
            output_dir: output_dir.into(),
            modal_max_size: modal_max_size.max(1),
            _session_dir: None,
        }
    }

    /// `parent` 配下にセッション専用の一時ディレクトリを作って書き出す
    pub fn for_session(
        rasterizer: Arc<dyn Rasterizer>,
        parent: impl AsRef<Path>,
        modal_max_size: u32,
    ) -> Result<Self> {
        std::fs::create_dir_all(parent.as_ref())?;
        let session_dir = tempfile::Builder::new()
            .prefix("session-")
            .tempdir_in(parent.as_ref())?;
        debug!(dir = %session_dir.path().display(), "preview session directory created");

        Ok(Self {
            output_dir: session_dir.path().to_path_buf(),
            _session_dir: Some(session_dir),
            ..Self::new(rasterizer, PathBuf::new(), modal_max_size)
        })
    }

    /// 1ファイル分のプレビューを生成
    pub fn render(&self, file: &UploadedFile, target: PreviewTarget) -> PreviewOutcome {
        let result = match file.kind() {
            Some(FileKind::Pdf) => self.render_document(file, target),
            Some(_) => self.render_image(file, target),
            None => Err(InvoiceExtractError::Preview(format!(
                "unsupported file type: {}",
                file.mime_type
            ))),
        };

        result.unwrap_or_else(|e| PreviewOutcome::Failed(e.to_string()))
    }

    fn render_image(&self, file: &UploadedFile, target: PreviewTarget) -> Result<PreviewOutcome> {
        let image = image::load_from_memory(&file.content)
            .map_err(|e| InvoiceExtractError::Preview(format!("{}: {}", file.name, e)))?;

        let image = match target {
            PreviewTarget::Thumbnail => image.thumbnail(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT),
            PreviewTarget::Modal => self.fit_modal(image),
        };

        self.save(&image, &file.name, target)
    }

    fn render_document(&self, file: &UploadedFile, target: PreviewTarget) -> Result<PreviewOutcome> {
        match self.rasterizer.rasterize_first_page(&file.content, target.scale()) {
            Ok(image) => {
                let image = match target {
                    PreviewTarget::Thumbnail => image,
                    PreviewTarget::Modal => self.fit_modal(image),
                };
                self.save(&image, &file.name, target)
            }
            Err(RasterError::Unavailable(reason)) => {
                debug!(file = %file.name, %reason, "rasterizer unavailable, using fallback");
                self.fallback(file)
            }
            Err(RasterError::Failed(reason)) => {
                warn!(file = %file.name, %reason, "PDF preview error, using fallback");
                self.fallback(file)
            }
        }
    }

    fn fit_modal(&self, image: DynamicImage) -> DynamicImage {
        if image.width() > self.modal_max_size || image.height() > self.modal_max_size {
            image.thumbnail(self.modal_max_size, self.modal_max_size)
        } else {
            image
        }
    }

    fn save(&self, image: &DynamicImage, file_name: &str, target: PreviewTarget) -> Result<PreviewOutcome> {
        let prefix = format!("{}.{}.", sanitize_file_name(file_name), target.as_str());
        let (file, path) = self.create_unique(&prefix, ".png")?;

        let mut writer = BufWriter::new(file);
        image
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|e| InvoiceExtractError::Preview(format!("{}: {}", path.display(), e)))?;
        writer.flush()?;

        Ok(PreviewOutcome::Image {
            path,
            width: image.width(),
            height: image.height(),
        })
    }

    /// 文書のコピーを置き、外部で開くリンクを返す
    fn fallback(&self, file: &UploadedFile) -> Result<PreviewOutcome> {
        let suffix = format!("-{}", sanitize_file_name(&file.name));
        let (mut copy, path) = self.create_unique("doc-", &suffix)?;
        copy.write_all(&file.content)?;

        let absolute = path.canonicalize().unwrap_or(path);
        Ok(PreviewOutcome::Fallback {
            link: format!("file://{}", absolute.display()),
        })
    }

    /// 出力先に重複しない名前でファイルを作る（同時実行でも上書きしない）
    fn create_unique(&self, prefix: &str, suffix: &str) -> Result<(File, PathBuf)> {
        std::fs::create_dir_all(&self.output_dir)?;
        let named = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.output_dir)?;
        named.keep().map_err(|e| InvoiceExtractError::Io(e.error))
    }
}

/// 保存用にファイル名を無害化
fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("invoice 01.pdf"), "invoice_01.pdf");
        assert_eq!(sanitize_file_name("../a.png"), ".._a.png");
        assert_eq!(sanitize_file_name(""), "file");
    }
}
