//! Telemetry setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;

/// Installs the global subscriber. `RUST_LOG` overrides the configured filter.
///
/// When a log directory is configured, events are also written to a daily
/// rolling file; keep the returned guard alive for the life of the process.
pub fn init_telemetry(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "platform-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
            None
        }
    }
}
