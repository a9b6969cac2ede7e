// DevGate - util/constants.rs
//
// Single source of truth for all named constants and defaults.

// =============================================================================
// Crate metadata
// =============================================================================

/// Display name used in diagnostics.
pub const APP_NAME: &str = "DevGate";

/// Identifier used for config/data directories.
pub const APP_ID: &str = "DevGate";

/// Current crate version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Identity resolution
// =============================================================================

/// Environment variables consulted for the developer identity, in priority
/// order. The first variable holding a non-empty value wins.
pub const DEFAULT_IDENTITY_ENV_VARS: &[&str] = &[
    "DEV_ID",
    "REACT_APP_DEV_ID",
    "VITE_DEV_ID",
    "NEXT_PUBLIC_DEV_ID",
];

/// Key under which the identity is persisted in the key-value store.
pub const DEFAULT_STORAGE_KEY: &str = "dev-id";

/// Maximum number of identity environment variables accepted from config.
pub const MAX_IDENTITY_ENV_VARS: usize = 32;

// =============================================================================
// Production mode
// =============================================================================

/// Environment variables checked (in order) for the production marker.
pub const PRODUCTION_ENV_VARS: &[&str] = &["DEVGATE_ENV", "NODE_ENV"];

/// Value of a `PRODUCTION_ENV_VARS` entry that switches production mode on.
pub const PRODUCTION_ENV_VALUE: &str = "production";

// =============================================================================
// Output
// =============================================================================

/// Timestamp format used by the timestamped tag (UTC, millisecond precision).
pub const TAG_TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Message printed by `debug` when called without arguments.
pub const DEBUG_EMPTY_MESSAGE: &str = "Paused";

/// Header line preceding the captured stack trace.
pub const DEBUG_TRACE_HEADER: &str = "📍 Debug called from:";

/// Printed in place of a stack trace when capture is unavailable.
pub const NO_STACK_TRACE: &str = "[no stack trace available]";

/// Printed, after the `Level::Info` label, when a breakpoint is requested
/// but cannot be honoured.
pub const DEBUGGER_UNAVAILABLE: &str = "Debugger not available in this environment";

/// Warning written to the output sink when an identity is rejected.
pub const INVALID_IDENTITY_NOTICE: &str = "Ignoring invalid Dev ID";

/// Tracing target under which `TracingSink` emits gated output.
pub const OUTPUT_TRACING_TARGET: &str = "devgate::output";

// =============================================================================
// Files and logging
// =============================================================================

/// Default log level for the crate's own diagnostics when no override is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Name of the configuration file, in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "devgate.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV_VAR: &str = "DEVGATE_CONFIG";

/// Store scope used when the executable name cannot be determined.
pub const FALLBACK_STORE_SCOPE: &str = "default";

/// Name of the persisted key-value store, inside the scope directory under
/// the platform data directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Maximum storage file size read back from disk. Larger files are treated
/// as corrupt and ignored.
pub const MAX_STORAGE_FILE_SIZE: u64 = 64 * 1024; // 64 KB
