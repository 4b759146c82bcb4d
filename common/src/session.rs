//! セッション状態とディスパッチャ
//!
//! ユーザー操作（および副作用の完了）を `Action` として受け取り、
//! 状態を遷移させ、フロントエンドが実行すべき副作用を `Effect` として返す。
//!
//! - 状態はすべて `Session` が所有する（グローバル状態なし）
//! - 送信は同時に1件のみ。完了時の後始末は成功・失敗を問わず必ず行う
//! - プレビュー失敗はファイル単位で独立し、取り込み・選択を妨げない

use crate::fields::FieldSelector;
use crate::intake::{FileSet, IntakeMode, IntakeOutcome, INVALID_TYPE_MESSAGE};
use crate::preview::{Modal, PreviewEntry, PreviewOutcome, PreviewStatus, PreviewTarget};
use crate::results::{Download, ResultsView, Tab};
use crate::types::{ExtractionResult, Notification, UploadedFile};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

pub const PREVIEW_ERROR_MESSAGE: &str = "Error displaying file preview.";
pub const COPY_ERROR_MESSAGE: &str = "Failed to copy to clipboard";
pub const DOWNLOAD_ERROR_MESSAGE: &str = "Failed to download file";

/// 送信リクエスト（multipartの中身）
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub files: Vec<UploadedFile>,
    pub fields: Vec<String>,
}

impl SubmissionRequest {
    /// `fields` パートに入れるJSON配列文字列
    pub fn fields_json(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_else(|_| "[]".to_string())
    }
}

/// ユーザー操作・副作用完了
#[derive(Debug, Clone)]
pub enum Action {
    AddFiles { candidates: Vec<UploadedFile>, mode: IntakeMode },
    RemoveFile(String),
    SetField { field: String, checked: bool },
    SelectAllFields,
    OpenPreview(String),
    PreviewRendered { file_name: String, target: PreviewTarget, outcome: PreviewOutcome },
    /// モーダル上のクリック。内容領域の外ならモーダルを閉じる
    ModalClick { inside_content: bool },
    ClosePreview,
    Submit,
    SubmissionFinished(Result<Vec<ExtractionResult>, String>),
    SelectTab { card: usize, tab: Tab },
    Copy { card: usize },
    CopyFinished { card: usize, result: Result<(), String> },
    Download { card: usize },
    DownloadFinished(Result<PathBuf, String>),
}

/// フロントエンドが実行する副作用
#[derive(Debug, Clone)]
pub enum Effect {
    RenderPreview { file: UploadedFile, target: PreviewTarget },
    Submit(SubmissionRequest),
    CopyToClipboard { card: usize, text: String },
    SaveDownload(Download),
    /// 結果領域を描画する。カードがあるときだけ `scroll` が立つ
    RenderResults { scroll: bool },
}

/// セッション状態
#[derive(Debug, Default)]
pub struct Session {
    files: FileSet,
    fields: FieldSelector,
    previews: Vec<PreviewEntry>,
    modal: Option<Modal>,
    results: Option<ResultsView>,
    submitting: bool,
    intake_error_visible: bool,
    notifications: Vec<Notification>,
    next_seq: u64,
}

impl Session {
    pub fn new(extra_fields: &[String]) -> Self {
        Self {
            fields: FieldSelector::new(extra_fields),
            ..Default::default()
        }
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn fields(&self) -> &FieldSelector {
        &self.fields
    }

    pub fn previews(&self) -> &[PreviewEntry] {
        &self.previews
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn is_preview_open(&self) -> bool {
        self.modal.is_some()
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn intake_error_visible(&self) -> bool {
        self.intake_error_visible
    }

    /// ファイルとフィールドが揃っているか
    pub fn is_ready(&self) -> bool {
        !self.files.is_empty() && self.fields.any_selected()
    }

    /// 送信ボタンの有効状態
    pub fn submit_enabled(&self) -> bool {
        self.is_ready() && !self.submitting
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// 表示期限内の通知（期限切れは破棄）
    pub fn active_notifications(&mut self, now: Instant) -> &[Notification] {
        self.notifications.retain(|n| !n.is_expired(now));
        &self.notifications
    }

    /// 未表示の通知を取り出す
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, mut notification: Notification) {
        self.next_seq += 1;
        notification.seq = self.next_seq;
        debug!(kind = notification.kind.as_str(), message = %notification.message, "notification");
        self.notifications.push(notification);
    }

    /// 操作を適用し、必要な副作用を返す
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::AddFiles { candidates, mode } => self.add_files(candidates, mode),
            Action::RemoveFile(name) => {
                self.remove_file(&name);
                Vec::new()
            }
            Action::SetField { field, checked } => {
                if !self.fields.set(&field, checked) {
                    debug!(field = %field, "ignoring unknown field");
                }
                Vec::new()
            }
            Action::SelectAllFields => {
                self.fields.select_all();
                Vec::new()
            }
            Action::OpenPreview(name) => self.open_preview(&name),
            Action::PreviewRendered { file_name, target, outcome } => {
                self.preview_rendered(&file_name, target, outcome);
                Vec::new()
            }
            Action::ModalClick { inside_content } => {
                if !inside_content {
                    self.modal = None;
                }
                Vec::new()
            }
            Action::ClosePreview => {
                self.modal = None;
                Vec::new()
            }
            Action::Submit => self.submit(),
            Action::SubmissionFinished(result) => self.submission_finished(result),
            Action::SelectTab { card, tab } => {
                if let Some(card) = self.results.as_mut().and_then(|r| r.card_mut(card)) {
                    card.select_tab(tab);
                }
                Vec::new()
            }
            Action::Copy { card } => self
                .results
                .as_ref()
                .and_then(|r| r.card(card))
                .and_then(|c| c.copy_text())
                .map(|text| vec![Effect::CopyToClipboard { card, text: text.to_string() }])
                .unwrap_or_default(),
            Action::CopyFinished { card, result } => {
                match result {
                    Ok(()) => {
                        if let Some(card) = self.results.as_mut().and_then(|r| r.card_mut(card)) {
                            card.mark_copied(Instant::now());
                        }
                    }
                    Err(reason) => {
                        warn!(%reason, "clipboard write failed");
                        self.notify(Notification::error(COPY_ERROR_MESSAGE));
                    }
                }
                Vec::new()
            }
            Action::Download { card } => self
                .results
                .as_ref()
                .and_then(|r| r.card(card))
                .and_then(|c| c.download())
                .map(|d| vec![Effect::SaveDownload(d)])
                .unwrap_or_default(),
            Action::DownloadFinished(result) => {
                match result {
                    Ok(path) => self.notify(Notification::info(format!("Saved {}", path.display()))),
                    Err(reason) => {
                        warn!(%reason, "download failed");
                        self.notify(Notification::error(DOWNLOAD_ERROR_MESSAGE));
                    }
                }
                Vec::new()
            }
        }
    }

    fn add_files(&mut self, candidates: Vec<UploadedFile>, mode: IntakeMode) -> Vec<Effect> {
        let before = self.files.len();
        match self.files.intake(candidates, mode) {
            IntakeOutcome::Rejected { skipped } => {
                warn!(?skipped, "no supported files in selection");
                self.intake_error_visible = true;
                self.notify(Notification::error(INVALID_TYPE_MESSAGE));
                Vec::new()
            }
            IntakeOutcome::Accepted { accepted, skipped } => {
                if !skipped.is_empty() {
                    warn!(?skipped, "skipping unsupported files");
                }
                self.intake_error_visible = false;

                let start = if mode == IntakeMode::Replace {
                    self.previews.clear();
                    0
                } else {
                    before
                };

                let new_files = &self.files.files()[start..start + accepted];
                let mut effects = Vec::with_capacity(new_files.len());
                for file in new_files {
                    if let Some(kind) = file.kind() {
                        self.previews.push(PreviewEntry::pending(&file.name, kind));
                        effects.push(Effect::RenderPreview {
                            file: file.clone(),
                            target: PreviewTarget::Thumbnail,
                        });
                    }
                }
                debug!(accepted, total = self.files.len(), "files accepted");
                effects
            }
        }
    }

    fn remove_file(&mut self, name: &str) {
        let removed = self.files.remove(name);
        if removed == 0 {
            return;
        }
        self.previews.retain(|p| p.file_name != name);
        debug!(file = name, removed, "file removed");
    }

    fn open_preview(&mut self, name: &str) -> Vec<Effect> {
        let Some(file) = self.files.get(name) else {
            debug!(file = name, "preview requested for unknown file");
            return Vec::new();
        };
        let file = file.clone();

        self.modal = Some(Modal {
            file_name: name.to_string(),
            status: PreviewStatus::Pending,
        });
        vec![Effect::RenderPreview { file, target: PreviewTarget::Modal }]
    }

    fn preview_rendered(&mut self, name: &str, target: PreviewTarget, outcome: PreviewOutcome) {
        if let PreviewOutcome::Failed(reason) = &outcome {
            warn!(file = name, target = target.as_str(), %reason, "preview failed");
            self.notify(Notification::error(PREVIEW_ERROR_MESSAGE));
        }

        match target {
            PreviewTarget::Thumbnail => {
                // 削除済みファイルの完了は捨てる
                for entry in self
                    .previews
                    .iter_mut()
                    .filter(|p| p.file_name == name && p.status == PreviewStatus::Pending)
                {
                    entry.status = PreviewStatus::Ready(outcome.clone());
                }
            }
            PreviewTarget::Modal => {
                // 閉じた・差し替えたモーダルの完了は捨てる
                if let Some(modal) = self.modal.as_mut().filter(|m| m.file_name == name) {
                    modal.status = PreviewStatus::Ready(outcome);
                }
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.submitting {
            debug!("submission already in flight");
            return Vec::new();
        }
        if !self.is_ready() {
            debug!(
                files = self.files.len(),
                fields = self.fields.selected_count(),
                "submission not ready"
            );
            return Vec::new();
        }

        self.submitting = true;
        vec![Effect::Submit(SubmissionRequest {
            files: self.files.files().to_vec(),
            fields: self.fields.selected(),
        })]
    }

    fn submission_finished(&mut self, result: Result<Vec<ExtractionResult>, String>) -> Vec<Effect> {
        self.submitting = false;

        match result {
            Ok(results) => {
                let count = results.len();
                let view = ResultsView::from_results(&results);
                let has_cards = !view.is_empty();
                self.results = Some(view);
                self.notify(Notification::success(format!(
                    "{} file(s) processed successfully!",
                    count
                )));
                vec![Effect::RenderResults { scroll: has_cards }]
            }
            Err(reason) => {
                self.notify(Notification::error(format!("Error processing files: {}", reason)));
                Vec::new()
            }
        }
    }
}
