//! ファイル取り込み（Intake）
//!
//! 候補ファイルをMIMEタイプで絞り込み、受付順に蓄積する。
//! 重複は除去しない（ユーザー操作順をそのまま保持）。

use crate::types::UploadedFile;

/// 全候補が対象外だったときの通知文
pub const INVALID_TYPE_MESSAGE: &str = "Please upload only PDF, PNG, or JPG files.";

/// 取り込みモード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeMode {
    /// 既存リストに追加（複数選択・ドロップ）
    #[default]
    Append,
    /// 既存リストを置き換え（単一選択）
    Replace,
}

/// 取り込み結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// 受け付けたファイル数と除外したファイル名
    Accepted { accepted: usize, skipped: Vec<String> },
    /// 候補が1件以上あったが全件対象外。状態は変更しない
    Rejected { skipped: Vec<String> },
}

/// 蓄積済みファイル列
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<UploadedFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 候補を検証して取り込む
    ///
    /// 受け付けたファイルは返り値の件数分だけ末尾に追加される。
    pub fn intake(&mut self, candidates: Vec<UploadedFile>, mode: IntakeMode) -> IntakeOutcome {
        let candidate_count = candidates.len();
        let (valid, invalid): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|f| f.kind().is_some());
        let skipped: Vec<String> = invalid.into_iter().map(|f| f.name).collect();

        if valid.is_empty() && candidate_count > 0 {
            return IntakeOutcome::Rejected { skipped };
        }

        if mode == IntakeMode::Replace {
            self.files.clear();
        }

        let accepted = valid.len();
        self.files.extend(valid);
        IntakeOutcome::Accepted { accepted, skipped }
    }

    /// ファイル名一致のエントリをすべて削除し、削除件数を返す
    pub fn remove(&mut self, file_name: &str) -> usize {
        let before = self.files.len();
        self.files.retain(|f| f.name != file_name);
        before - self.files.len()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn get(&self, file_name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.name == file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.byte_size).sum()
    }

    /// 合計サイズの表示文字列
    pub fn total_size_label(&self) -> String {
        format_total_size(self.total_bytes())
    }

    /// ステータス行
    pub fn status_message(&self) -> String {
        match self.files.len() {
            0 => "No files uploaded yet.".to_string(),
            1 => "1 file ready for processing".to_string(),
            n => format!("{} files ready for processing", n),
        }
    }
}

/// 合計サイズ表示
///
/// KB単位で丸め、1024KB未満は "N KB"、以上は "X.XX MB"。
pub fn format_total_size(total_bytes: u64) -> String {
    let total_kb = (total_bytes as f64 / 1024.0).round();
    if total_kb < 1024.0 {
        format!("{} KB", total_kb as u64)
    } else {
        format!("{:.2} MB", total_kb / 1024.0)
    }
}
