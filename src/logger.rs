use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI用ロガー初期化（RUST_LOG があればそちらを優先）
pub fn init_cli_logger(verbose: bool) {
    let default_filter = if verbose {
        "food_photo_ai=debug,info"
    } else {
        "food_photo_ai=info,warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // テスト等で二重初期化された場合は無視
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}
