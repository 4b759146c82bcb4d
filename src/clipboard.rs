//! クリップボード書き込み
//!
//! 書き込みのたびに `arboard` のコンテキストを開く。
//! X11 では破棄時にクリップボードマネージャへ内容を引き渡す。

use crate::error::{InvoiceExtractError, Result};
use tracing::debug;

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
        clipboard.set_text(text).map_err(clipboard_error)?;
        debug!(bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}

fn clipboard_error(e: arboard::Error) -> InvoiceExtractError {
    InvoiceExtractError::Clipboard(e.to_string())
}
