//! 端末への描画
//!
//! セッション状態を読み取って表示するだけで、状態は変更しない。

use invoice_extract_common::fields::is_line_item_option;
use invoice_extract_common::results::NO_RESULTS_MESSAGE;
use invoice_extract_common::{
    field_label, CardBody, FieldSelector, FileSet, Modal, Notification, NotificationKind,
    PreviewEntry, PreviewOutcome, PreviewStatus, ResultCard, ResultsView, Session, Tab,
};
use std::time::Instant;

/// 取り込み状況（件数・合計サイズ・ステータス）
pub fn format_intake(files: &FileSet, intake_error_visible: bool) -> String {
    let mut lines = vec![
        format!("Total files: {}  |  Total size: {}", files.len(), files.total_size_label()),
        files.status_message(),
    ];
    if intake_error_visible {
        lines.push("⚠ Please upload only PDF, PNG, or JPG files.".to_string());
    }
    lines.join("\n")
}

pub fn format_preview_status(status: &PreviewStatus) -> String {
    match status {
        PreviewStatus::Pending => "… rendering".to_string(),
        PreviewStatus::Ready(PreviewOutcome::Image { path, width, height }) => {
            format!("🖼 {}x{} {}", width, height, path.display())
        }
        PreviewStatus::Ready(PreviewOutcome::Fallback { link }) => {
            format!("📄 open externally: {}", link)
        }
        PreviewStatus::Ready(PreviewOutcome::Failed(reason)) => {
            format!("⚠ preview unavailable ({})", reason)
        }
    }
}

pub fn format_previews(previews: &[PreviewEntry]) -> String {
    previews
        .iter()
        .enumerate()
        .map(|(i, p)| format!("  {}) {}  {}", i + 1, p.file_name, format_preview_status(&p.status)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_modal(modal: &Modal) -> String {
    format!("── Preview: {} ──\n{}", modal.file_name, format_preview_status(&modal.status))
}

/// フィールド一覧（明細サブオプションは表示中のみ）
pub fn format_fields(selector: &FieldSelector) -> String {
    selector
        .visible()
        .into_iter()
        .map(|field| {
            let mark = if selector.is_checked(field) { "[x]" } else { "[ ]" };
            let indent = if is_line_item_option(field) { "    " } else { "  " };
            format!("{}{} {} ({})", indent, mark, field_label(field), field)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_card(index: usize, card: &ResultCard, now: Instant) -> String {
    let mut lines = Vec::new();

    match &card.body {
        CardBody::Error(error) => {
            lines.push(format!("┌ #{} {}  [Error]", index + 1, card.file_name));
            lines.push(format!("│ {}", error));
        }
        CardBody::Success(success) => {
            lines.push(format!(
                "┌ #{} {}  [{}] [Download]",
                index + 1,
                card.file_name,
                card.copy_label(now)
            ));
            let tabs = Tab::ALL
                .iter()
                .map(|tab| {
                    if *tab == success.active_tab() {
                        format!("[{}]", tab.label())
                    } else {
                        format!(" {} ", tab.label())
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("│ {}", tabs));
            for line in success.text(success.active_tab()).lines() {
                lines.push(format!("│ {}", line));
            }
        }
    }

    lines.push("└".to_string());
    lines.join("\n")
}

pub fn format_results(view: &ResultsView, now: Instant) -> String {
    if view.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }
    view.cards()
        .iter()
        .enumerate()
        .map(|(i, card)| format_card(i, card, now))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_notification(notification: &Notification) -> String {
    let icon = match notification.kind {
        NotificationKind::Info => "ℹ",
        NotificationKind::Success => "✔",
        NotificationKind::Error => "✖",
    };
    format!("{} {}", icon, notification.message)
}

pub fn print_results(view: &ResultsView) {
    println!("\n📋 Results\n{}", format_results(view, Instant::now()));
}

/// セッション全体のサマリ
pub fn format_session(session: &Session) -> String {
    let mut lines = vec![format_intake(session.files(), session.intake_error_visible())];
    if !session.previews().is_empty() {
        lines.push(format_previews(session.previews()));
    }
    lines.push("Fields:".to_string());
    lines.push(format_fields(session.fields()));
    lines.push(format!(
        "Extract Fields: {}",
        if session.submit_enabled() { "enabled" } else { "disabled" }
    ));
    lines.join("\n")
}

pub fn print_session(session: &Session) {
    println!("{}", format_session(session));
}
