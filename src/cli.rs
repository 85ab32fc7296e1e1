use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "food-photo")]
#[command(about = "料理写真AI解析・食品カタログ照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真（ファイルまたはフォルダ）を解析して照合結果JSONを出力
    Analyze {
        /// 写真ファイルまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// 食品カタログ（JSON/CSV、省略時は設定値）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キャッシュを使用（再検出をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 検出済みリスト（JSON）をカタログと照合
    Reconcile {
        /// 検出結果JSONファイル（[{"food"|"description", "estimated_grams"}]）
        #[arg(required = true)]
        input: PathBuf,

        /// 食品カタログ（JSON/CSV、省略時は設定値）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 料理名1件をカタログと照合
    Match {
        /// 料理の説明
        #[arg(required = true)]
        description: String,

        /// 食品カタログ（JSON/CSV、省略時は設定値）
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// カタログの内容を確認
    Catalog {
        /// 食品カタログ（JSON/CSV、省略時は設定値）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 正規化したJSONを書き出す
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 既定のカタログを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "food-photo", "analyze", "photos", "--catalog", "db.json", "--use-cache", "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze { path, catalog, output, use_cache } => {
                assert_eq!(path, PathBuf::from("photos"));
                assert_eq!(catalog, Some(PathBuf::from("db.json")));
                assert!(output.is_none());
                assert!(use_cache);
            }
            _ => panic!("Expected Analyze"),
        }
    }

    #[test]
    fn test_parse_match() {
        let cli = Cli::parse_from(["food-photo", "match", "cooked rice"]);
        assert!(matches!(cli.command, Commands::Match { description, .. } if description == "cooked rice"));
    }
}
