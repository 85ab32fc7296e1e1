use anyhow::Context;
use clap::Parser;
use food_photo_ai::{analyzer, cli, config, error, logger, matcher, report, scanner};
use food_photo_common::{match_food_with_tier, parse_detection_response, reconcile_detailed};
use cli::{Cli, Commands};
use config::Config;
use report::ImageReport;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);
    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Analyze { path, catalog, output, use_cache } => {
            println!("🍽  food-photo - 料理写真解析\n");

            let catalog_path = config.resolve_catalog_path(catalog)?;
            let catalog = matcher::load_catalog(&catalog_path)?;

            // 1. 画像スキャン
            println!("[1/3] 写真をスキャン中...");
            let images = scanner::scan_path(&path, config.max_upload_bytes)?;
            if images.is_empty() {
                return Err(error::FoodAiError::NoImagesFound(path.display().to_string()).into());
            }
            println!("✔ {}枚の写真を検出\n", images.len());

            // 2. Vision検出
            println!("[2/3] AI解析中...{}", if use_cache { " (キャッシュ有効)" } else { "" });
            let describer = analyzer::OpenAiVision::from_config(&config, &catalog)?;
            let cache_dir = cache_folder(&path);
            let detections = if use_cache {
                let mut cache = analyzer::CacheFile::load(&cache_dir);
                let detections = analyzer::detect_images(&describer, &images, Some(&mut cache), true).await;
                if let Err(e) = cache.save(&cache_dir) {
                    tracing::warn!("キャッシュ保存に失敗: {}", e);
                }
                detections
            } else {
                analyzer::detect_images(&describer, &images, None, true).await
            };
            println!("✔ 解析完了\n");

            // 3. カタログ照合
            println!("[3/3] カタログ照合中...");
            let reports = matcher::reconcile_images(&detections, &catalog);
            let matched: usize = reports.iter().map(|r| r.detected_items.len()).sum();
            println!("✔ {}件がカタログに一致\n", matched);

            report::write_reports(&reports, output.as_deref())?;
            if let Some(output) = &output {
                println!("✔ 結果を保存: {}", output.display());
            }
        }

        Commands::Reconcile { input, catalog, output } => {
            let catalog_path = config.resolve_catalog_path(catalog)?;
            let catalog = matcher::load_catalog(&catalog_path)?;

            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("検出結果の読み込みに失敗: {}", input.display()))?;
            let items = parse_detection_response(&content)?;

            let file_name = input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let report = ImageReport::from_outcomes(&file_name, reconcile_detailed(&items, &catalog));

            report::write_reports(std::slice::from_ref(&report), output.as_deref())?;
        }

        Commands::Match { description, catalog } => {
            let catalog_path = config.resolve_catalog_path(catalog)?;
            let catalog = matcher::load_catalog(&catalog_path)?;

            match match_food_with_tier(&description, &catalog) {
                Some(m) => println!("{} ({})", m.key, m.tier),
                None => println!("該当なし"),
            }
        }

        Commands::Catalog { catalog, export } => {
            let catalog_path = config.resolve_catalog_path(catalog)?;
            let catalog = matcher::load_catalog(&catalog_path)?;

            println!("カタログ: {}", catalog_path.display());
            println!("  件数: {}", catalog.len());
            println!("  先頭: {}", catalog.prompt_hint(5));

            if let Some(export_path) = export {
                let json = serde_json::to_string_pretty(&catalog.to_json())?;
                std::fs::write(&export_path, json)?;
                println!("✔ 書き出し: {}", export_path.display());
            }
        }

        Commands::Config { set_api_key, set_catalog, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(path) = set_catalog {
                config.set_catalog_path(path)?;
                println!("✔ カタログを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  APIエンドポイント: {}", config.api_base_url);
                println!("  最大トークン: {}", config.max_tokens);
                println!("  最大画像サイズ: {} bytes", config.max_upload_bytes);
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = analyzer::CacheFile::cache_path(&target);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = analyzer::CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match analyzer::CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// キャッシュの置き場所（フォルダ指定ならそのフォルダ、ファイル指定なら親フォルダ）
fn cache_folder(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
