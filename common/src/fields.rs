//! 抽出フィールド選択
//!
//! チェックボックスの集合を表示順で保持する。
//! 「全選択」は既知カタログのフィールドだけをチェックし、それ以外は外す。

use std::collections::HashSet;

/// 既知フィールドのカタログ（表示順）
pub const FIELD_CATALOG: &[&str] = &[
    "vendor_name",
    "invoice_number",
    "invoice_date",
    "due_date",
    "total_amount",
    "tax_amount",
    "line_items",
    "item_description",
    "item_quantity",
    "item_unit_price",
    "item_total",
];

/// 明細サブオプションの表示を切り替える親フィールド
pub const LINE_ITEMS_FIELD: &str = "line_items";

/// 明細サブオプション
pub const LINE_ITEM_OPTIONS: &[&str] = &[
    "item_description",
    "item_quantity",
    "item_unit_price",
    "item_total",
];

/// 表示ラベル（`vendor_name` → `Vendor Name`）
pub fn field_label(field: &str) -> String {
    field
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_catalog_field(field: &str) -> bool {
    FIELD_CATALOG.contains(&field)
}

pub fn is_line_item_option(field: &str) -> bool {
    LINE_ITEM_OPTIONS.contains(&field)
}

/// フィールド選択状態
#[derive(Debug, Clone)]
pub struct FieldSelector {
    available: Vec<String>,
    checked: HashSet<String>,
    line_item_options_visible: bool,
}

impl Default for FieldSelector {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl FieldSelector {
    /// カタログ＋追加フィールドで初期化（全て未チェック）
    pub fn new(extra_fields: &[String]) -> Self {
        let mut available: Vec<String> = FIELD_CATALOG.iter().map(|s| s.to_string()).collect();
        for field in extra_fields {
            let field = field.trim();
            if !field.is_empty() && !available.iter().any(|f| f == field) {
                available.push(field.to_string());
            }
        }

        Self {
            available,
            checked: HashSet::new(),
            line_item_options_visible: false,
        }
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn is_available(&self, field: &str) -> bool {
        self.available.iter().any(|f| f == field)
    }

    pub fn is_checked(&self, field: &str) -> bool {
        self.checked.contains(field)
    }

    /// チェック状態を変更する。未知のフィールドは無視してfalseを返す
    pub fn set(&mut self, field: &str, checked: bool) -> bool {
        if !self.is_available(field) {
            return false;
        }

        if checked {
            self.checked.insert(field.to_string());
        } else {
            self.checked.remove(field);
        }

        if field == LINE_ITEMS_FIELD {
            self.line_item_options_visible = checked;
        }
        true
    }

    /// カタログのフィールドだけをチェックする
    pub fn select_all(&mut self) {
        self.checked = self
            .available
            .iter()
            .filter(|f| is_catalog_field(f))
            .cloned()
            .collect();
        self.line_item_options_visible = self.is_checked(LINE_ITEMS_FIELD);
    }

    /// チェック済みフィールド（表示順）
    pub fn selected(&self) -> Vec<String> {
        self.available
            .iter()
            .filter(|f| self.checked.contains(f.as_str()))
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.checked.len()
    }

    pub fn any_selected(&self) -> bool {
        !self.checked.is_empty()
    }

    pub fn line_item_options_visible(&self) -> bool {
        self.line_item_options_visible
    }

    /// 現在表示されているチェックボックス
    pub fn visible(&self) -> Vec<&str> {
        self.available
            .iter()
            .map(|f| f.as_str())
            .filter(|f| self.line_item_options_visible || !is_line_item_option(f))
            .collect()
    }
}
