//! invoice-extract
//!
//! 請求書ファイル（PDF/PNG/JPG）を取り込み、抽出フィールドを選んで抽出APIへ送り、
//! 結果をカード単位で表示・コピー・保存するクライアント。
//! 状態遷移は `invoice_extract_common::Session` が持ち、このクレートは副作用を担う。

pub mod app;
pub mod cli;
pub mod client;
pub mod clipboard;
pub mod config;
pub mod download;
pub mod error;
pub mod interactive;
pub mod preview;
pub mod render;
pub mod scanner;
