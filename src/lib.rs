// DevGate - lib.rs
//
// Developer-identity-gated logging. Many developers share one log call
// site; only the developer whose identity matches the logger's owner sees
// its output.
//
// The free functions and macros below operate on one process-wide gate.
// It is installed explicitly with `init`/`init_with`, or lazily from
// devgate.toml and the process environment on first use.

pub mod core;
pub mod platform;
pub mod util;

pub use crate::core::gate::IdentityGate;
pub use crate::core::logger::{DevLogger, LoggerFactory, OutputOptions};
pub use crate::core::model::{IdentitySource, Level, ResolvedIdentity, SinkKind, TagStyle};
pub use crate::core::resolver::{EnvSource, MapEnv, ProcessEnv};
pub use crate::core::sink::{ConsoleSink, MemorySink, Sink, TracingSink};
pub use crate::platform::config::GateConfig;
pub use crate::platform::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::util::error::{DevGateError, IdentityError, Result};

use std::fmt;
use std::sync::OnceLock;

static FACTORY: OnceLock<LoggerFactory> = OnceLock::new();
static DEFAULT_LOGGER: OnceLock<DevLogger> = OnceLock::new();

/// Install the process-wide gate built from `config`.
///
/// Fails with `AlreadyInitialised` once any API call has created the gate.
pub fn init(config: GateConfig) -> Result<()> {
    init_with(LoggerFactory::from_config(&config))
}

/// Install a caller-built factory as the process-wide gate.
pub fn init_with(factory: LoggerFactory) -> Result<()> {
    FACTORY
        .set(factory)
        .map_err(|_| DevGateError::AlreadyInitialised)?;
    tracing::debug!("DevGate initialised");
    Ok(())
}

/// The process-wide factory, loading configuration on first use.
pub fn factory() -> &'static LoggerFactory {
    FACTORY.get_or_init(|| LoggerFactory::from_config(&GateConfig::load()))
}

/// Set the current developer identity. Invalid values are reported and
/// ignored; in production mode this does nothing.
pub fn set_identity(id: &str) {
    factory().set_identity(id);
}

/// Set the current developer identity, returning why it was rejected.
pub fn try_set_identity(id: &str) -> Result<()> {
    factory().gate().try_set_identity(id)?;
    Ok(())
}

/// Delete the persisted identity; the value set in this process is kept.
pub fn clear_persisted_identity() {
    factory().gate().clear_persisted_identity();
}

/// The current developer identity.
pub fn get_identity() -> Option<String> {
    factory().gate().get_identity()
}

/// The current developer identity and the source it came from.
pub fn identity_source() -> Option<ResolvedIdentity> {
    factory().gate().identity_source()
}

/// Whether output is enabled for `target` (or for anyone, when `None`).
pub fn should_debug(target: Option<&str>) -> bool {
    factory().gate().should_debug(target)
}

/// Create a logger bound to `owner`; `None` follows the current identity.
pub fn create_logger(owner: Option<&str>) -> DevLogger {
    factory().create_logger(owner)
}

/// Switch production mode on for the rest of the process.
pub fn enable_production_mode() {
    factory().gate().enable_production_mode();
}

/// True once production mode is on.
pub fn is_production() -> bool {
    factory().gate().is_production()
}

/// The process-wide unbound logger behind `devlog!` and friends.
pub fn default_logger() -> &'static DevLogger {
    DEFAULT_LOGGER.get_or_init(|| create_logger(None))
}

/// `default_logger().log(..)`
pub fn log(args: fmt::Arguments<'_>) {
    default_logger().log(args);
}

/// `default_logger().warn(..)`
pub fn warn(args: fmt::Arguments<'_>) {
    default_logger().warn(args);
}

/// `default_logger().error(..)`
pub fn error(args: fmt::Arguments<'_>) {
    default_logger().error(args);
}

/// `default_logger().debug(..)`
pub fn debug(args: fmt::Arguments<'_>) {
    default_logger().debug(args);
}

/// Stop in an attached debugger if the current developer is identified.
pub fn trigger_breakpoint() {
    default_logger().trigger_breakpoint();
}

/// Log through the default logger, or through `logger => ...`.
///
/// ```no_run
/// devgate::devlog!("cart total = {}", 42);
/// let mine = devgate::create_logger(Some("alice"));
/// devgate::devlog!(mine => "only alice sees {}", "this");
/// ```
#[macro_export]
macro_rules! devlog {
    ($logger:expr => $($arg:tt)+) => {
        $logger.log(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().log(::std::format_args!($($arg)+))
    };
}

/// Warning-level counterpart of [`devlog!`].
#[macro_export]
macro_rules! devwarn {
    ($logger:expr => $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().warn(::std::format_args!($($arg)+))
    };
}

/// Error-level counterpart of [`devlog!`].
#[macro_export]
macro_rules! deverror {
    ($logger:expr => $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().error(::std::format_args!($($arg)+))
    };
}

/// Debug output with a stack trace. With no arguments prints "Paused".
#[macro_export]
macro_rules! devdebug {
    () => {
        $crate::default_logger().debug(::std::format_args!(""))
    };
    ($logger:expr =>) => {
        $logger.debug(::std::format_args!(""))
    };
    ($logger:expr => $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::default_logger().debug(::std::format_args!($($arg)+))
    };
}
