//! JSON-lines tracing for hosts built with the `trace` feature.
//!
//! Without the feature, `init_tracing` does nothing and every span and event
//! in the bridge crates is compiled out.

use std::io;
use std::path::Path;

#[cfg(any(feature = "trace", test))]
const TRACED_CRATES: [&str; 3] = ["ime_bridge", "bridge_core", "bridge_session"];

/// Filter used when `RUST_LOG` is unset: debug for the bridge crates only, so
/// a host's own dependencies stay quiet.
#[cfg(any(feature = "trace", test))]
fn default_directives() -> String {
    TRACED_CRATES
        .iter()
        .map(|krate| format!("{krate}=debug"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(feature = "trace")]
static INIT: std::sync::Once = std::sync::Once::new();

/// Append traces to `ime-bridge-trace.jsonl` under `log_dir`, creating the
/// directory if needed. Only the first successful call installs a writer.
/// A host that already set a global subscriber keeps it.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) -> io::Result<()> {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir)?;
    INIT.call_once(|| {
        let appender = tracing_appender::rolling::never(log_dir, "ime-bridge-trace.jsonl");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives()));

        let installed = tracing_subscriber::fmt()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(filter)
            .try_init();
        // The writer thread has to outlive every session in the process.
        if installed.is_ok() {
            std::mem::forget(guard);
        }
    });
    Ok(())
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_bridge_crates() {
        let directives = default_directives();
        for krate in TRACED_CRATES {
            assert!(directives.contains(&format!("{krate}=debug")), "{directives}");
        }
        assert_eq!(directives.split(',').count(), TRACED_CRATES.len());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn test_missing_log_dir_is_created() {
        let dir = std::env::temp_dir()
            .join(format!("ime-bridge-trace-{}", std::process::id()))
            .join("nested");
        init_tracing(&dir).unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[cfg(not(feature = "trace"))]
    #[test]
    fn test_disabled_build_touches_nothing() {
        let dir = std::env::temp_dir().join(format!("ime-bridge-off-{}", std::process::id()));
        init_tracing(&dir).unwrap();
        assert!(!dir.exists());
    }
}
