//! 抽出結果の表示モデル
//!
//! APIレスポンスをファイル単位のカードに変換する。
//! 成功カードは Structured / Raw / Prompt の3タブを持ち、同時に1つだけ有効。

use crate::error::{Error, Result};
use crate::types::ExtractionResult;
use serde_json::Value;
use std::time::{Duration, Instant};

pub const NO_RESULTS_MESSAGE: &str = "No results to display";
pub const PROMPT_PLACEHOLDER: &str = "N/A";
pub const COPY_LABEL: &str = "Copy JSON";
pub const COPIED_LABEL: &str = "Copied!";

/// 「Copied!」表示の持続時間
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);

/// レスポンス本文をパース（JSON配列のみ受け付ける）
pub fn parse_results(body: &str) -> Result<Vec<ExtractionResult>> {
    let value: Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Err(Error::Parse("expected a JSON array of results".into()));
    }
    Ok(serde_json::from_value(value)?)
}

/// 2スペースインデントで整形
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// 語幹が空のときのダウンロード名
pub const FALLBACK_DOWNLOAD_STEM: &str = "invoice";

/// ダウンロードファイル名（最後のパス要素の最初の`.`より前 + `_extracted.json`）
///
/// ファイル名はサーバー応答由来なので、ディレクトリ部分は区切りが `/` でも `\` でも捨てる。
pub fn download_file_name(source_name: &str) -> String {
    let leaf = source_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = leaf.split('.').next().unwrap_or_default().trim();
    let stem = if stem.is_empty() { FALLBACK_DOWNLOAD_STEM } else { stem };
    format!("{}_extracted.json", stem)
}

/// 結果タブ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Structured,
    Raw,
    Prompt,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Structured, Tab::Raw, Tab::Prompt];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Structured => "Structured",
            Tab::Raw => "Raw",
            Tab::Prompt => "Prompt",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structured" | "s" => Ok(Tab::Structured),
            "raw" | "r" => Ok(Tab::Raw),
            "prompt" | "p" => Ok(Tab::Prompt),
            _ => Err(format!("Unknown tab: {}. Use structured, raw, or prompt", s)),
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// ダウンロード内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub contents: String,
}

/// 成功カードの中身
#[derive(Debug, Clone)]
pub struct SuccessCard {
    pub structured: String,
    pub raw: String,
    pub prompt: String,
    active_tab: Tab,
    copied_at: Option<Instant>,
}

impl SuccessCard {
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn text(&self, tab: Tab) -> &str {
        match tab {
            Tab::Structured => &self.structured,
            Tab::Raw => &self.raw,
            Tab::Prompt => &self.prompt,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CardBody {
    Error(String),
    Success(SuccessCard),
}

/// 結果カード（1ファイル分）
#[derive(Debug, Clone)]
pub struct ResultCard {
    pub file_name: String,
    pub body: CardBody,
}

impl ResultCard {
    pub fn from_result(result: &ExtractionResult) -> Self {
        match result {
            ExtractionResult::Failure { file_name, error, .. } => Self {
                file_name: file_name.clone(),
                body: CardBody::Error(error.clone()),
            },
            ExtractionResult::Success {
                file_name,
                extracted_fields,
                raw_response,
                prompt_used,
            } => Self {
                file_name: file_name.clone(),
                body: CardBody::Success(SuccessCard {
                    structured: pretty_json(extracted_fields),
                    raw: pretty_json(raw_response),
                    prompt: prompt_used
                        .as_deref()
                        .filter(|p| !p.is_empty())
                        .unwrap_or(PROMPT_PLACEHOLDER)
                        .to_string(),
                    active_tab: Tab::Structured,
                    copied_at: None,
                }),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, CardBody::Error(_))
    }

    /// 有効タブ（エラーカードはNone）
    pub fn active_tab(&self) -> Option<Tab> {
        match &self.body {
            CardBody::Success(card) => Some(card.active_tab),
            CardBody::Error(_) => None,
        }
    }

    /// タブ切替。エラーカードではfalse
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        match &mut self.body {
            CardBody::Success(card) => {
                card.active_tab = tab;
                true
            }
            CardBody::Error(_) => false,
        }
    }

    /// コピー対象（Structuredタブの本文）
    pub fn copy_text(&self) -> Option<&str> {
        match &self.body {
            CardBody::Success(card) => Some(&card.structured),
            CardBody::Error(_) => None,
        }
    }

    pub fn download(&self) -> Option<Download> {
        match &self.body {
            CardBody::Success(card) => Some(Download {
                file_name: download_file_name(&self.file_name),
                contents: card.structured.clone(),
            }),
            CardBody::Error(_) => None,
        }
    }

    pub fn mark_copied(&mut self, now: Instant) {
        if let CardBody::Success(card) = &mut self.body {
            card.copied_at = Some(now);
        }
    }

    /// コピーボタンの表示（コピー後2秒間は "Copied!"）
    pub fn copy_label(&self, now: Instant) -> &'static str {
        match &self.body {
            CardBody::Success(SuccessCard { copied_at: Some(at), .. })
                if now.saturating_duration_since(*at) < COPY_CONFIRMATION =>
            {
                COPIED_LABEL
            }
            _ => COPY_LABEL,
        }
    }
}

/// 結果エリア
#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    cards: Vec<ResultCard>,
}

impl ResultsView {
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        Self {
            cards: results.iter().map(ResultCard::from_result).collect(),
        }
    }

    pub fn cards(&self) -> &[ResultCard] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&ResultCard> {
        self.cards.get(index)
    }

    pub fn card_mut(&mut self, index: usize) -> Option<&mut ResultCard> {
        self.cards.get_mut(index)
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }
}
