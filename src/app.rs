//! セッションの実行ドライバ
//!
//! `Session::dispatch` が返す副作用を実行し、その完了を再びアクションとして戻す。
//! - プレビュー: ブロッキングタスクで並行生成（ファイル単位で独立）
//! - 送信: タイムアウト付きで1件ずつ。結果に関わらず完了アクションを必ず戻す
//! - コピー・保存: 失敗は通知に変換（クリップボードはブロッキングタスクで書き込む）
//! - 通知: 表示期限内かつ未表示のものだけを出力する

use crate::client::ExtractionService;
use crate::clipboard::Clipboard;
use crate::download::save_download;
use crate::error::InvoiceExtractError;
use crate::preview::Previewer;
use crate::render;
use indicatif::{ProgressBar, ProgressStyle};
use invoice_extract_common::{
    Action, Effect, ExtractionResult, NotificationKind, PreviewTarget, Session, SubmissionRequest,
    Tab, UploadedFile,
};
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// 出力先
enum Output {
    /// 何も出さない（通知はセッションに残る）
    Quiet,
    /// 標準出力・標準エラー（スピナーあり）
    Terminal,
    Writer(Box<dyn Write + Send>),
}

pub struct App<S: ExtractionService> {
    session: Session,
    service: S,
    previewer: Arc<Previewer>,
    clipboard: Arc<dyn Clipboard>,
    download_dir: PathBuf,
    timeout: Duration,
    thumbnails: bool,
    output: Output,
    result_tab: Option<Tab>,
    announced: u64,
}

impl<S: ExtractionService> App<S> {
    pub fn new(
        session: Session,
        service: S,
        previewer: Arc<Previewer>,
        clipboard: Arc<dyn Clipboard>,
        download_dir: PathBuf,
        timeout: Duration,
    ) -> Self {
        Self {
            session,
            service,
            previewer,
            clipboard,
            download_dir,
            timeout,
            thumbnails: true,
            output: Output::Terminal,
            result_tab: None,
            announced: 0,
        }
    }

    /// サムネイル生成の有無
    pub fn with_previews(mut self, enabled: bool) -> Self {
        self.thumbnails = enabled;
        self
    }

    /// 端末出力の有無（無効時は通知をセッションに残す）
    pub fn with_output(mut self, enabled: bool) -> Self {
        self.output = if enabled { Output::Terminal } else { Output::Quiet };
        self
    }

    /// 結果・通知を任意の書き込み先へ出す
    pub fn with_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.output = Output::Writer(writer);
        self
    }

    /// 結果描画の前に全カードをこのタブに切り替える
    pub fn with_result_tab(mut self, tab: Tab) -> Self {
        self.result_tab = Some(tab);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// 操作を適用し、連鎖する副作用をすべて実行する
    pub async fn dispatch(&mut self, action: Action) {
        let mut pending: VecDeque<Effect> = self.session.dispatch(action).into();

        while let Some(effect) = pending.pop_front() {
            let follow_ups = match effect {
                Effect::RenderPreview { file, target } => {
                    // 連続するプレビュー要求はまとめて並行生成
                    let mut jobs = vec![(file, target)];
                    while matches!(pending.front(), Some(Effect::RenderPreview { .. })) {
                        if let Some(Effect::RenderPreview { file, target }) = pending.pop_front() {
                            jobs.push((file, target));
                        }
                    }
                    self.render_previews(jobs).await
                }
                other => self.perform(other).await.into_iter().collect(),
            };

            for action in follow_ups {
                pending.extend(self.session.dispatch(action));
            }
        }

        self.announce_notifications();
    }

    fn emit(&mut self, text: &str, kind: NotificationKind) {
        match &mut self.output {
            Output::Quiet => {}
            Output::Terminal => match kind {
                NotificationKind::Error => eprintln!("{}", text),
                _ => println!("{}", text),
            },
            Output::Writer(writer) => {
                if let Err(e) = writeln!(writer, "{}", text) {
                    warn!(error = %e, "output write failed");
                }
            }
        }
    }

    /// 期限内でまだ出していない通知を出力する
    fn announce_notifications(&mut self) {
        if matches!(self.output, Output::Quiet) {
            return;
        }

        let announced = self.announced;
        let fresh: Vec<(NotificationKind, String, u64)> = self
            .session
            .active_notifications(Instant::now())
            .iter()
            .filter(|n| n.seq > announced)
            .map(|n| (n.kind, render::format_notification(n), n.seq))
            .collect();

        for (kind, text, seq) in fresh {
            self.emit(&text, kind);
            self.announced = seq;
        }
    }

    fn render_results(&mut self, scroll: bool) {
        if let Some(tab) = self.result_tab {
            let count = self.session.results().map_or(0, |r| r.len());
            for card in 0..count {
                self.session.dispatch(Action::SelectTab { card, tab });
            }
        }

        let Some(text) = self
            .session
            .results()
            .map(|results| format!("\n📋 Results\n{}", render::format_results(results, Instant::now())))
        else {
            return;
        };
        debug!(scroll, "rendering results");
        self.emit(&text, NotificationKind::Info);
    }

    async fn render_previews(&self, jobs: Vec<(UploadedFile, PreviewTarget)>) -> Vec<Action> {
        // モーダルは常に生成する
        let jobs: Vec<_> = jobs
            .into_iter()
            .filter(|(_, target)| self.thumbnails || *target == PreviewTarget::Modal)
            .collect();

        let mut set = JoinSet::new();
        for (file, target) in jobs {
            let previewer = Arc::clone(&self.previewer);
            set.spawn_blocking(move || {
                let outcome = previewer.render(&file, target);
                Action::PreviewRendered {
                    file_name: file.name.clone(),
                    target,
                    outcome,
                }
            });
        }

        let mut actions = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(action) => actions.push(action),
                Err(e) => error!(error = %e, "preview task failed"),
            }
        }
        actions
    }

    async fn perform(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::RenderPreview { .. } => None,
            Effect::Submit(request) => Some(Action::SubmissionFinished(self.submit(&request).await)),
            Effect::CopyToClipboard { card, text } => {
                let clipboard = Arc::clone(&self.clipboard);
                let result = match tokio::task::spawn_blocking(move || clipboard.write_text(&text)).await {
                    Ok(written) => written.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                if let Err(e) = &result {
                    error!(error = %e, "Copy failed");
                }
                Some(Action::CopyFinished { card, result })
            }
            Effect::SaveDownload(download) => {
                let result = save_download(&self.download_dir, &download).map_err(|e| {
                    error!(error = %e, file = %download.file_name, "Download failed");
                    e.to_string()
                });
                Some(Action::DownloadFinished(result))
            }
            Effect::RenderResults { scroll } => {
                self.render_results(scroll);
                None
            }
        }
    }

    /// 1回分の送信（タイムアウト付き）
    async fn submit(&self, request: &SubmissionRequest) -> Result<Vec<ExtractionResult>, String> {
        let spinner = if matches!(self.output, Output::Terminal) {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.set_message(format!("Processing {} file(s)...", request.files.len()));
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            ProgressBar::hidden()
        };

        let outcome = tokio::time::timeout(self.timeout, self.service.process(request)).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(Ok(results)) => {
                info!(count = results.len(), "extraction finished");
                Ok(results)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Processing error");
                Err(e.to_string())
            }
            Err(_) => {
                let e = InvoiceExtractError::Timeout(self.timeout.as_secs());
                error!(error = %e, "Processing error");
                Err(e.to_string())
            }
        }
    }
}
