use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use medreport_ai::{cli, client, config, error, proxy, report, upload};
use medreport_common::{render_document, render_text, ExtractionResult, Orchestrator, Variant};
use cli::{Cli, Commands, OutputFormat};
use config::Config;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Extract { image, explain, output, format, via_proxy } => {
            eprintln!("🩺 medreport - レポート解析\n");

            let transport = match via_proxy {
                Some(url) => client::ReqwestTransport::via_proxy(&url, config.timeout_seconds)?,
                None => client::ReqwestTransport::direct(&config)?,
            };

            let uploaded = upload::read_image(&image)?;
            eprintln!("✔ {} ({}, {} bytes)", uploaded.file_name, uploaded.mime_type, uploaded.bytes.len());

            let orchestrator = Orchestrator::new(transport, Variant::from_explain_flag(explain));

            let spinner = loading_spinner(if orchestrator.variant().explains() {
                "Analyzing... (extraction + summary)"
            } else {
                "Analyzing..."
            });
            let outcome = orchestrator.run(Some(&uploaded)).await;
            spinner.finish_and_clear();

            let report = outcome.map_err(error::MedReportError::from)?;
            eprintln!("✔ 解析完了\n");

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&report.result)?;
                std::fs::write(&path, json)?;
                eprintln!("✔ 結果を保存: {}\n", path.display());
            }

            match format {
                OutputFormat::Text => println!("{}", report::format_report(&report)),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report::report_json(&report))?)
                }
            }
        }

        Commands::Render { input } => {
            let content = std::fs::read_to_string(&input)?;
            let result: ExtractionResult = serde_json::from_str(&content)?;
            println!("{}", render_text(&render_document(&result)));
        }

        Commands::Serve { bind, static_dir, allow_origins } => {
            let addr = match bind {
                Some(addr) => addr,
                None => config.proxy_bind.parse().map_err(|e| {
                    error::MedReportError::Config(format!("proxy_bind が不正です: {}", e))
                })?,
            };

            let allow_origins = if allow_origins.is_empty() {
                config.allow_origins.clone()
            } else {
                allow_origins
            };

            let state = proxy::ProxyState::from_config(&config)?;
            eprintln!("🚀 medreport - 中継サーバ ({})", config.model);
            proxy::serve(addr, state, static_dir, &allow_origins).await?;
        }

        Commands::Config { set_api_key, set_model, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(model) = set_model {
                config.set_model(model)?;
                println!("✔ モデルを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  APIベースURL: {}", config.api_base);
                println!("  中継サーバ: {}", config.proxy_bind);
                if !config.allow_origins.is_empty() {
                    println!("  許可オリジン: {}", config.allow_origins.join(", "));
                }
                match config.timeout_seconds {
                    Some(secs) => println!("  タイムアウト: {}秒", secs),
                    None => println!("  タイムアウト: 既定"),
                }
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn loading_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
