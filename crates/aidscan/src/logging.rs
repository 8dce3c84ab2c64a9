//! Process-wide logger setup for the `aidscan` binary and embedders.
//!
//! Without the `tracing` feature records go through `env_logger`; with it
//! `log` records are bridged into a `tracing-subscriber` fmt layer. Both
//! honor `RUST_LOG` and fall back to the caller's level when it is unset.

use log::LevelFilter;

/// Filter directive to install: `RUST_LOG` when set, else `level`.
pub fn resolve_filter(env: Option<&str>, level: LevelFilter) -> String {
    match env.map(str::trim) {
        Some(spec) if !spec.is_empty() => spec.to_string(),
        _ => level.as_str().to_ascii_lowercase(),
    }
}

/// Install the global logger. Fails if one is already installed.
#[cfg(not(feature = "tracing"))]
pub fn init(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let env = std::env::var("RUST_LOG").ok();
    let spec = resolve_filter(env.as_deref(), level);
    env_logger::Builder::new()
        .parse_filters(&spec)
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

/// Install the global subscriber and bridge `log` records into it.
#[cfg(feature = "tracing")]
pub fn init(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let env = std::env::var("RUST_LOG").ok();
    let spec = resolve_filter(env.as_deref(), level);
    tracing_log::LogTracer::init()?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(spec))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_used_without_env_override() {
        assert_eq!(resolve_filter(None, LevelFilter::Warn), "warn");
        assert_eq!(resolve_filter(Some("  "), LevelFilter::Debug), "debug");
    }

    #[test]
    fn env_override_wins_over_level() {
        assert_eq!(
            resolve_filter(Some("aidscan_barcode=trace"), LevelFilter::Error),
            "aidscan_barcode=trace"
        );
    }
}
