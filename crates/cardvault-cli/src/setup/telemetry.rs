use cardvault_core::LogFormat;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "cardvault=info";

/// Initialize console tracing. Output goes to stderr so query results on
/// stdout stay machine-readable.
pub fn init_telemetry(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    match format {
        LogFormat::Compact => {
            let console_fmt = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(
                    Format::default()
                        .compact()
                        .with_target(false)
                        .without_time(),
                );
            tracing_subscriber::registry()
                .with(filter)
                .with(console_fmt)
                .init();
        }
        LogFormat::Json => {
            let console_fmt = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(console_fmt)
                .init();
        }
    }
}
