use clap::{Parser, Subcommand};
use invoice_extract_common::Tab;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "invoice-extract")]
#[command(about = "請求書アップロード・フィールド抽出クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ファイルを送信して抽出結果を表示
    Extract {
        /// 請求書ファイルまたはフォルダ (PDF/PNG/JPG)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 抽出フィールド（複数指定可）
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// 既知フィールドをすべて選択
        #[arg(short, long)]
        all_fields: bool,

        /// 抽出APIのURL（省略時は設定値）
        #[arg(long)]
        endpoint: Option<String>,

        /// 表示するタブ (structured/raw/prompt)
        #[arg(short, long, default_value = "structured")]
        tab: Tab,

        /// 抽出結果を <name>_extracted.json として保存
        #[arg(short, long)]
        download: bool,

        /// 保存先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サムネイルを生成しない
        #[arg(long)]
        no_preview: bool,
    },

    /// 対話モード
    Interactive {
        /// 最初に取り込むファイルまたはフォルダ
        paths: Vec<PathBuf>,

        /// 抽出APIのURL（省略時は設定値）
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// 抽出フィールド一覧を表示
    Fields,

    /// 1ファイルのプレビューを生成
    Preview {
        #[arg(required = true)]
        path: PathBuf,

        /// モーダル用の大きいサイズで生成
        #[arg(long)]
        large: bool,
    },

    /// 保存済みのレスポンスJSONを表示
    Render {
        #[arg(required = true)]
        input: PathBuf,

        /// 表示するタブ (structured/raw/prompt)
        #[arg(short, long, default_value = "structured")]
        tab: Tab,
    },

    /// 設定を表示/編集
    Config {
        /// 抽出APIのURLを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
