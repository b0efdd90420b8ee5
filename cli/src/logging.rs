//! Cấu hình `tracing-subscriber` cho CLI. Log luôn ghi ra stderr để stdout chỉ chứa kết quả.

use std::io;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Số lần `-v`: 0 → info, 1 → debug, từ 2 → trace.
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Cài subscriber toàn cục. `RUST_LOG` (nếu có) ghi đè mức lấy từ `-v`.
pub fn init_logging(verbosity: u8) {
    let filter = build_env_filter(level_from_verbosity(verbosity));
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    // Crate ngoài giữ ở mức warn.
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,uti_cli={level},uti_core={level},uti_fhir={level}"
        ))
    })
}
