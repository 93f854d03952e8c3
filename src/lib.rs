pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use state::AppState;

/// ログ設定の初期化
///
/// 組み込み側アプリの起動時に一度だけ呼ぶ。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nagare=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
