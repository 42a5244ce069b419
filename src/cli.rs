use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-geo")]
#[command(
    about = "写真のGPS情報から撮影地を調べ、国/州/市のフォルダへ整理してKMLに記録するツール",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力（ジオコーダの生JSONも表示）
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真をスキャンして逆ジオコーディング
    Run {
        /// 写真を探すフォルダ（サブフォルダも対象）
        #[arg(short, long, required = true)]
        source: PathBuf,

        /// 移動先フォルダ（指定時は 国/州/市 に整理）
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// LocationIQ APIキー（省略時は環境変数・設定ファイル）
        #[arg(short, long)]
        key: Option<String>,

        /// KMLファイル（同じ場所に処理済みハッシュの `.db` を作成）
        #[arg(short = 'm', long)]
        kml: Option<PathBuf>,

        /// KMLの説明にファイルの場所を含める
        #[arg(short, long)]
        location: bool,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 処理済みハッシュとKMLの情報を表示
    Ledger {
        /// KMLファイル
        #[arg(short = 'm', long, required = true)]
        kml: PathBuf,
    },
}
