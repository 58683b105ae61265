use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt::format::FmtSpan};

use crate::config::Config;

/// Filter for a configured log level, falling back to `info` when the value
/// is not a level name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
pub fn level_filter(level: &str) -> EnvFilter {
    let level = level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    EnvFilter::default().add_directive(level.into())
}

/// Install the global tracing subscriber.
///
/// - `RUST_LOG` takes precedence over `MASTRA_LOG_LEVEL`.
/// - With telemetry enabled, span close events carry step and run timings.
pub fn init_tracing(config: &Config) -> eyre::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(&config.log_level));

    let span_events = if config.telemetry_enabled {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .try_init()
        .map_err(|e| eyre::eyre!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filter_uses_configured_level() {
        assert_eq!(level_filter("debug").to_string(), "debug");
        assert_eq!(level_filter("WARN").to_string(), "warn");
        assert_eq!(level_filter(" off ").to_string(), "off");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        for level in ["verbose", "silent", "agentstone=debug", "=x=y"] {
            assert_eq!(level_filter(level).to_string(), "info", "level {level:?}");
        }
    }
}
