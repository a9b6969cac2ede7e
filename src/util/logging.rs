// DevGate - util/logging.rs
//
// Diagnostics for DevGate itself (config warnings, rejected identities,
// swallowed storage failures). This is separate from the gated developer
// output, which goes through `core::sink`.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - Host flag: `debug_flag = true`
//   - Config file: [logging] level = "debug"
//
// Output: stderr.

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber for DevGate diagnostics.
///
/// Priority: RUST_LOG env var > `debug_flag` > config level > default "info".
///
/// Returns false when the host already installed a global subscriber; DevGate
/// then logs through that one.
pub fn init(debug_flag: bool, config_level: Option<&str>) -> bool {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            app = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Logging initialised"
        );
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        let _ = init(false, Some("warn"));
        assert!(!init(true, None));
    }
}
