use clap::Parser;
use photo_geo_rust::{cli, config, document, error, geocoder, ledger, pipeline};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use photo_geo_common::Quadrant;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "photo_geo_rust=debug"
    } else {
        "photo_geo_rust=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { source, destination, key, kml, location } => {
            println!("🌍 photo-geo - 撮影地の整理\n");
            let config = Config::load()?;

            let api_key = config.get_api_key(key.as_deref())?;
            let client = geocoder::LocationIqClient::from_config(&config, api_key)?;

            let options = pipeline::PipelineOptions {
                source,
                destination,
                document: kml,
                show_file_location: location,
                retry: geocoder::RetryPolicy {
                    delay: config.retry_delay(),
                    max_attempts: config.max_retry_attempts,
                },
            };

            println!("[1/2] 写真を処理中...");
            let summary = pipeline::Pipeline::new(options.clone(), client).run().await?;
            println!("✔ 処理完了\n");

            println!("[2/2] 結果");
            println!("  写真: {}枚", summary.total);
            println!("  処理済みでスキップ: {}", summary.already_processed);
            println!("  GPS情報なし: {}", summary.missing_gps);
            println!("  読み込みエラー: {}", summary.read_errors);
            println!("  座標エラー: {}", summary.invalid_coordinates);
            println!("  想定外のレスポンス: {}", summary.unexpected_responses);
            if summary.rate_limited > 0 {
                println!("  レート制限でスキップ: {}", summary.rate_limited);
            }
            println!("  撮影地を取得: {}", summary.geocoded);
            if options.destination.is_some() {
                println!("  移動: {} (失敗 {})", summary.moved, summary.move_failures);
            }
            if let Some(kml) = &options.document {
                println!(
                    "  KMLに追加: {} (同名あり {})",
                    summary.placemarks_added, summary.placemarks_existing
                );
                println!(
                    "  台帳に追加: {} ({})",
                    summary.ledger_recorded,
                    ledger::ledger_path_for(kml).display()
                );
            }

            println!("\n✅ 完了");
        }

        Commands::Config { set_api_key, show } => {
            let mut config = Config::load_or_default(&Config::config_path()?);

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  エンドポイント: {}", config.endpoint);
                println!("  再試行間隔: {}ms", config.retry_delay_ms);
                match config.max_retry_attempts {
                    Some(max) => println!("  再試行上限: {}回", max),
                    None => println!("  再試行上限: なし"),
                }
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Ledger { kml } => {
            let ledger_path = ledger::ledger_path_for(&kml);

            if ledger_path.exists() {
                let ledger = ledger::Ledger::load(&ledger_path)?;
                println!("台帳:");
                println!("  パス: {}", ledger_path.display());
                println!("  件数: {}", ledger.len());
            } else {
                println!("台帳ファイルが存在しません: {}", ledger_path.display());
            }

            if kml.exists() {
                let document = document::PlacemarkDocument::load(&kml)?;
                println!("KML:");
                println!("  パス: {}", kml.display());
                for quadrant in Quadrant::ALL {
                    println!("  {}: {}件", quadrant.label(), document.placemarks(quadrant).len());
                }
            } else {
                println!("KMLファイルが存在しません: {}", kml.display());
            }
        }
    }

    Ok(())
}
