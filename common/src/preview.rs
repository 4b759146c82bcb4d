//! プレビュー状態
//!
//! サムネイルとモーダルの描画状態を保持する。描画そのものはフロントエンド側。

use crate::types::FileKind;
use std::path::PathBuf;

/// 描画先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTarget {
    Thumbnail,
    Modal,
}

impl PreviewTarget {
    /// PDFラスタライズ倍率
    pub fn scale(&self) -> f32 {
        match self {
            PreviewTarget::Thumbnail => 0.5,
            PreviewTarget::Modal => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewTarget::Thumbnail => "thumbnail",
            PreviewTarget::Modal => "modal",
        }
    }
}

/// 描画結果
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    /// 描画済み画像
    Image { path: PathBuf, width: u32, height: u32 },
    /// アイコン＋外部で開くリンク
    Fallback { link: String },
    /// 描画失敗
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewStatus {
    Pending,
    Ready(PreviewOutcome),
}

/// サムネイル1件
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEntry {
    pub file_name: String,
    pub kind: FileKind,
    pub status: PreviewStatus,
}

impl PreviewEntry {
    pub fn pending(file_name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            status: PreviewStatus::Pending,
        }
    }
}

/// 開いているモーダル
#[derive(Debug, Clone, PartialEq)]
pub struct Modal {
    pub file_name: String,
    pub status: PreviewStatus,
}
