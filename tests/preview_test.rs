//! プレビュー生成テスト
//!
//! 画像は縮小してPNG保存、PDFはラスタライザの有無でフォールバックを確認

use image::{DynamicImage, ImageFormat, RgbImage};
use invoice_extract::preview::{NoRasterizer, Previewer, RasterError, Rasterizer};
use invoice_extract::scanner;
use invoice_extract_common::{PreviewOutcome, PreviewTarget, UploadedFile};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30])));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

/// 倍率を記録して固定サイズの画像を返す
struct FixedRasterizer {
    scales: Mutex<Vec<f32>>,
}

impl Rasterizer for FixedRasterizer {
    fn rasterize_first_page(&self, _document: &[u8], scale: f32) -> Result<DynamicImage, RasterError> {
        self.scales.lock().unwrap().push(scale);
        let side = (1000.0 * scale) as u32;
        Ok(DynamicImage::ImageRgb8(RgbImage::new(side, side)))
    }
}

struct BrokenRasterizer;

impl Rasterizer for BrokenRasterizer {
    fn rasterize_first_page(&self, _document: &[u8], _scale: f32) -> Result<DynamicImage, RasterError> {
        Err(RasterError::Failed("corrupt xref table".into()))
    }
}

#[test]
fn test_png_thumbnail_is_bounded() {
    let dir = TempDir::new().unwrap();
    let previewer = Previewer::new(Arc::new(NoRasterizer), dir.path(), 1568);
    let file = UploadedFile::new("scan.png", "image/png", encoded(1100, 800, ImageFormat::Png));

    match previewer.render(&file, PreviewTarget::Thumbnail) {
        PreviewOutcome::Image { path, width, height } => {
            assert!(width <= 220 && height <= 160);
            assert!(path.exists());
            assert_eq!(path.extension().unwrap(), "png");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_modal_respects_max_size() {
    let dir = TempDir::new().unwrap();
    let previewer = Previewer::new(Arc::new(NoRasterizer), dir.path(), 400);
    let file = UploadedFile::new("photo.jpg", "image/jpeg", encoded(1200, 600, ImageFormat::Jpeg));

    match previewer.render(&file, PreviewTarget::Modal) {
        PreviewOutcome::Image { width, height, .. } => {
            assert_eq!(width, 400);
            assert_eq!(height, 200);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_small_modal_image_is_not_upscaled() {
    let dir = TempDir::new().unwrap();
    let previewer = Previewer::new(Arc::new(NoRasterizer), dir.path(), 1568);
    let file = UploadedFile::new("tiny.png", "image/png", encoded(40, 30, ImageFormat::Png));

    match previewer.render(&file, PreviewTarget::Modal) {
        PreviewOutcome::Image { width, height, .. } => assert_eq!((width, height), (40, 30)),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_pdf_without_rasterizer_falls_back_to_link() {
    let dir = TempDir::new().unwrap();
    let previewer = Previewer::new(Arc::new(NoRasterizer), dir.path(), 1568);
    let file = UploadedFile::new("invoice.pdf", "application/pdf", b"%PDF-1.4\n".to_vec());

    match previewer.render(&file, PreviewTarget::Thumbnail) {
        PreviewOutcome::Fallback { link } => {
            assert!(link.starts_with("file://"));
            assert!(link.ends_with("invoice.pdf"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_pdf_rasterizer_failure_falls_back() {
    let dir = TempDir::new().unwrap();
    let previewer = Previewer::new(Arc::new(BrokenRasterizer), dir.path(), 1568);
    let file = UploadedFile::new("invoice.pdf", "application/pdf", b"%PDF-1.4\n".to_vec());

    assert!(matches!(
        previewer.render(&file, PreviewTarget::Modal),
        PreviewOutcome::Fallback { .. }
    ));
}

#[test]
fn test_pdf_scale_depends_on_target() {
    let dir = TempDir::new().unwrap();
    let rasterizer = Arc::new(FixedRasterizer { scales: Mutex::new(Vec::new()) });
    let previewer = Previewer::new(Arc::clone(&rasterizer) as Arc<dyn Rasterizer>, dir.path(), 1568);
    let file = UploadedFile::new("invoice.pdf", "application/pdf", b"%PDF-1.4\n".to_vec());

    let thumbnail = previewer.render(&file, PreviewTarget::Thumbnail);
    let modal = previewer.render(&file, PreviewTarget::Modal);

    assert_eq!(*rasterizer.scales.lock().unwrap(), vec![0.5, 1.0]);
    assert!(matches!(thumbnail, PreviewOutcome::Image { width: 500, .. }));
    assert!(matches!(modal, PreviewOutcome::Image { width: 1000, .. }));
}

#[test]
fn test_corrupt_image_fails_in_isolation() {
    let dir = TempDir::new().unwrap();
    let previewer = Previewer::new(Arc::new(NoRasterizer), dir.path(), 1568);
    let broken = UploadedFile::new("broken.png", "image/png", b"not a png".to_vec());
    let good = UploadedFile::new("good.png", "image/png", encoded(10, 10, ImageFormat::Png));

    assert!(matches!(previewer.render(&broken, PreviewTarget::Thumbnail), PreviewOutcome::Failed(_)));
    assert!(matches!(previewer.render(&good, PreviewTarget::Thumbnail), PreviewOutcome::Image { .. }));
}

#[test]
fn test_preview_from_scanned_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("receipt.png");
    std::fs::write(&path, encoded(300, 300, ImageFormat::Png)).unwrap();

    let file = scanner::load_file(&path).unwrap();
    assert_eq!(file.mime_type, "image/png");

    let previewer = Previewer::new(Arc::new(NoRasterizer), dir.path().join("previews"), 1568);
    match previewer.render(&file, PreviewTarget::Thumbnail) {
        PreviewOutcome::Image { path, width, height } => {
            assert_eq!((width, height), (160, 160));
            assert!(path.starts_with(dir.path().join("previews")));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

fn image_path(outcome: PreviewOutcome) -> std::path::PathBuf {
    match outcome {
        PreviewOutcome::Image { path, .. } => path,
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_session_previews_are_removed_on_drop() {
    let parent = TempDir::new().unwrap();
    let first = Previewer::for_session(Arc::new(NoRasterizer), parent.path(), 1568).unwrap();
    let second = Previewer::for_session(Arc::new(NoRasterizer), parent.path(), 1568).unwrap();
    let file = UploadedFile::new("scan.png", "image/png", encoded(50, 50, ImageFormat::Png));

    let a = image_path(first.render(&file, PreviewTarget::Thumbnail));
    let b = image_path(second.render(&file, PreviewTarget::Thumbnail));
    assert_ne!(a, b);
    assert!(a.starts_with(parent.path()) && b.starts_with(parent.path()));

    drop(first);
    assert!(!a.exists());
    assert!(b.exists());

    drop(second);
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}

#[test]
fn test_repeated_renders_do_not_overwrite() {
    let dir = TempDir::new().unwrap();
    let previewer = Previewer::new(Arc::new(NoRasterizer), dir.path(), 1568);
    let file = UploadedFile::new("scan.png", "image/png", encoded(50, 50, ImageFormat::Png));

    let a = image_path(previewer.render(&file, PreviewTarget::Modal));
    let b = image_path(previewer.render(&file, PreviewTarget::Modal));
    assert_ne!(a, b);
    assert!(a.exists() && b.exists());
}

#[test]
fn test_session_fallback_copy_is_removed_on_drop() {
    let parent = TempDir::new().unwrap();
    let previewer = Previewer::for_session(Arc::new(NoRasterizer), parent.path(), 1568).unwrap();
    let file = UploadedFile::new("invoice.pdf", "application/pdf", b"%PDF-1.4\n".to_vec());

    let link = match previewer.render(&file, PreviewTarget::Thumbnail) {
        PreviewOutcome::Fallback { link } => link,
        other => panic!("unexpected outcome: {:?}", other),
    };
    let copy = std::path::PathBuf::from(link.trim_start_matches("file://"));
    assert_eq!(std::fs::read(&copy).unwrap(), b"%PDF-1.4\n");

    drop(previewer);
    assert!(!copy.exists());
}
