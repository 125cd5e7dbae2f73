use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medreport")]
#[command(about = "医療レポート画像のAI構造化抽出ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// レポート画像から構造化データを抽出
    Extract {
        /// 画像ファイル（PNG/JPEG/WEBP）
        #[arg(required = true)]
        image: PathBuf,

        /// 患者向けの説明文も生成する（2回目のAI呼び出し）
        #[arg(short, long)]
        explain: bool,

        /// 抽出結果JSONの保存先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 表示形式 (text/json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// 中継サーバ経由で送信（例: http://127.0.0.1:8787/api/generate）
        #[arg(long)]
        via_proxy: Option<String>,
    },

    /// 保存済みの抽出結果JSONを表示
    Render {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// APIキー中継サーバを起動
    Serve {
        /// バインドアドレス（省略時は設定値）
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Webフロントエンドのビルド出力ディレクトリ
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// クロスオリジンで呼び出しを許可するオリジン（複数指定可、省略時は設定値）
        #[arg(long = "allow-origin", value_name = "URL")]
        allow_origins: Vec<String>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_parse_extract_command() {
        let cli = Cli::try_parse_from([
            "medreport",
            "extract",
            "labs.png",
            "--explain",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Extract {
                image,
                explain,
                format,
                via_proxy,
                ..
            } => {
                assert_eq!(image, PathBuf::from("labs.png"));
                assert!(explain);
                assert_eq!(format, OutputFormat::Json);
                assert!(via_proxy.is_none());
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_parse_serve_command() {
        let cli = Cli::try_parse_from(["medreport", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve { bind, static_dir, allow_origins } => {
                assert_eq!(bind, Some("0.0.0.0:9000".parse().unwrap()));
                assert!(static_dir.is_none());
                assert!(allow_origins.is_empty());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_serve_allow_origins() {
        let cli = Cli::try_parse_from([
            "medreport",
            "serve",
            "--allow-origin",
            "http://localhost:8080",
            "--allow-origin",
            "https://reports.example",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { allow_origins, .. } => {
                assert_eq!(allow_origins, vec!["http://localhost:8080", "https://reports.example"]);
            }
            _ => panic!("expected serve"),
        }
    }
}
