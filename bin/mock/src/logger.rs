use std::{io::IsTerminal, str::FromStr};

use graphql_mock_config::log::{LogFormat, LoggingConfig};
use tracing_subscriber::{
    filter::ParseError,
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Installs the global subscriber. Everything is written to stderr so command
/// output on stdout stays machine readable.
pub fn configure_logging(config: &LoggingConfig) -> Result<(), ParseError> {
    let filter = EnvFilter::from_str(config.env_filter_str())?;
    let timer = UtcTime::rfc_3339();
    let is_terminal = std::io::stderr().is_terminal();
    let registry = tracing_subscriber::registry();

    match config.format {
        LogFormat::PrettyTree => registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_ansi(is_terminal)
                    .with_bracketed_fields(true)
                    .with_deferred_spans(false)
                    .with_indent_lines(true)
                    .with_timer(tracing_tree::time::Uptime::default())
                    .with_targets(false),
            )
            .with(filter)
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(timer)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init(),
        LogFormat::PrettyCompact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(is_terminal)
                    .with_timer(timer)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init(),
    }

    Ok(())
}
