//! Diagnostic tracing for uidfix.
//!
//! Diagnostics go to stderr; command output on stdout is unaffected.
//! `RUST_LOG` always wins over `--verbose`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const QUIET_DIRECTIVE: &str = "warn";
const VERBOSE_DIRECTIVE: &str = "warn,uidfix=debug";

/// Install the stderr subscriber.
///
/// # Example
/// ```bash
/// RUST_LOG=uidfix=trace uidfix fix tree.json
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_DIRECTIVE
    } else {
        QUIET_DIRECTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_crate_debug() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "warn,uidfix=debug");
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }
}
