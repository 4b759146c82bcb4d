//! PDF 1ページ目のラスタライズ
//!
//! 任意の機能として扱い、使えない・失敗した場合は呼び出し側がフォールバックする。

use crate::config::RasterizerKind;
use image::DynamicImage;
use std::process::Command;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("rasterizer unavailable: {0}")]
    Unavailable(String),

    #[error("rasterization failed: {0}")]
    Failed(String),
}

/// 文書の1ページ目を指定倍率で画像化する
pub trait Rasterizer: Send + Sync {
    fn rasterize_first_page(&self, document: &[u8], scale: f32) -> Result<DynamicImage, RasterError>;
}

/// ラスタライズなし（常にフォールバック）
pub struct NoRasterizer;

impl Rasterizer for NoRasterizer {
    fn rasterize_first_page(&self, _document: &[u8], _scale: f32) -> Result<DynamicImage, RasterError> {
        Err(RasterError::Unavailable("rasterization disabled".into()))
    }
}

/// poppler の `pdftoppm` を呼び出す実装
pub struct PdftoppmRasterizer {
    program: String,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::with_program("pdftoppm")
    }
}

impl PdftoppmRasterizer {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize_first_page(&self, document: &[u8], scale: f32) -> Result<DynamicImage, RasterError> {
        let work_dir = tempfile::tempdir().map_err(|e| RasterError::Failed(e.to_string()))?;
        let input = work_dir.path().join("input.pdf");
        std::fs::write(&input, document).map_err(|e| RasterError::Failed(e.to_string()))?;

        // 72dpi = 倍率1.0
        let dpi = ((72.0 * scale).round() as u32).max(1);
        let out_root = work_dir.path().join("page");

        let output = Command::new(&self.program)
            .args(["-f", "1", "-l", "1", "-singlefile", "-png", "-r"])
            .arg(dpi.to_string())
            .arg(&input)
            .arg(&out_root)
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RasterError::Unavailable(format!("{} not found", self.program)));
            }
            Err(e) => return Err(RasterError::Failed(e.to_string())),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RasterError::Failed(format!(
                "{} failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }

        image::open(work_dir.path().join("page.png")).map_err(|e| RasterError::Failed(e.to_string()))
    }
}

/// 設定に応じたラスタライザ
pub fn rasterizer_for(kind: RasterizerKind) -> Arc<dyn Rasterizer> {
    match kind {
        RasterizerKind::Pdftoppm => Arc::new(PdftoppmRasterizer::default()),
        RasterizerKind::None => Arc::new(NoRasterizer),
    }
}
