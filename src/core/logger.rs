// DevGate - core/logger.rs
//
// Logger factory and the `DevLogger` handle.
//
// Every method evaluates the gate first. A closed gate means a complete
// no-op: no timestamp, no formatting, no sink access.

use crate::core::format;
use crate::core::gate::IdentityGate;
use crate::core::model::{Level, TagStyle};
use crate::core::sink::{self, Sink};
use crate::platform::config::GateConfig;
use crate::platform::debugger;
use crate::util::constants::{
    DEBUGGER_UNAVAILABLE, DEBUG_EMPTY_MESSAGE, DEBUG_TRACE_HEADER, INVALID_IDENTITY_NOTICE,
};
use crate::util::error::IdentityError;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Output settings shared by every logger a factory creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub tag_style: TagStyle,
    pub capture_stack: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            tag_style: TagStyle::default(),
            capture_stack: true,
        }
    }
}

impl From<&GateConfig> for OutputOptions {
    fn from(config: &GateConfig) -> Self {
        Self {
            tag_style: config.tag_style,
            capture_stack: config.capture_stack,
        }
    }
}

/// Creates loggers bound to one gate and one sink.
#[derive(Clone)]
pub struct LoggerFactory {
    gate: Arc<IdentityGate>,
    sink: Arc<dyn Sink>,
    options: OutputOptions,
}

impl fmt::Debug for LoggerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerFactory")
            .field("gate", &self.gate)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl LoggerFactory {
    pub fn new(gate: Arc<IdentityGate>, sink: Arc<dyn Sink>, options: OutputOptions) -> Self {
        Self {
            gate,
            sink,
            options,
        }
    }

    /// Factory over the process environment, the platform store and the
    /// sink selected in `config`.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(
            Arc::new(IdentityGate::from_config(config)),
            sink::for_kind(config.sink),
            OutputOptions::from(config),
        )
    }

    /// The gate loggers from this factory consult.
    pub fn gate(&self) -> &Arc<IdentityGate> {
        &self.gate
    }

    /// Set the identity on the gate, writing a warning line to the sink
    /// when the value is rejected.
    pub fn set_identity(&self, id: &str) {
        match self.gate.try_set_identity(id) {
            Ok(()) => {}
            Err(IdentityError::ProductionMode) => {
                tracing::debug!("Ignoring identity change in production mode");
            }
            Err(e) => {
                tracing::warn!(error = %e, "[devgate] Ignoring invalid Dev ID");
                let notice = format::line(
                    Level::Warn.label(),
                    format_args!("{INVALID_IDENTITY_NOTICE}: {e}"),
                );
                self.sink.write(Level::Warn, &notice);
            }
        }
    }

    /// Create a logger bound to `owner`.
    ///
    /// `None` binds to whoever is identified at call time. In production
    /// mode the returned logger is permanently disabled.
    pub fn create_logger(&self, owner: Option<&str>) -> DevLogger {
        if self.gate.is_production() {
            return DevLogger::disabled();
        }
        DevLogger {
            bound: Some(Bound {
                owner: owner.map(str::to_string),
                gate: Arc::clone(&self.gate),
                sink: Arc::clone(&self.sink),
                options: self.options,
            }),
        }
    }
}

#[derive(Clone)]
struct Bound {
    owner: Option<String>,
    gate: Arc<IdentityGate>,
    sink: Arc<dyn Sink>,
    options: OutputOptions,
}

/// Identity-gated logger handle. Cheap to clone.
#[derive(Clone)]
pub struct DevLogger {
    // None: production no-op logger, holds no gate at all.
    bound: Option<Bound>,
}

impl fmt::Debug for DevLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bound {
            Some(bound) => f
                .debug_struct("DevLogger")
                .field("owner", &bound.owner)
                .field("options", &bound.options)
                .finish(),
            None => f.write_str("DevLogger(disabled)"),
        }
    }
}

impl DevLogger {
    /// A logger whose every method is an unconditional no-op.
    pub fn disabled() -> Self {
        Self { bound: None }
    }

    /// True for loggers created in production mode.
    pub fn is_disabled(&self) -> bool {
        self.bound.is_none()
    }

    /// The owner this logger is bound to, `None` when unbound or disabled.
    pub fn owner(&self) -> Option<&str> {
        self.bound.as_ref()?.owner.as_deref()
    }

    /// Evaluate the gate; on success return the owner name for the tag.
    fn open(&self) -> Option<(&Bound, String)> {
        let bound = self.bound.as_ref()?;
        let owner = match &bound.owner {
            Some(owner) => {
                if !bound.gate.should_debug(Some(owner)) {
                    return None;
                }
                owner.clone()
            }
            None => bound.gate.get_identity()?,
        };
        Some((bound, owner))
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let Some((bound, owner)) = self.open() else {
            return;
        };
        let tag = format::tag(bound.options.tag_style, level, &owner, Utc::now());
        bound.sink.write(level, &format::line(&tag, args));
    }

    /// Write to stdout.
    pub fn log(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Log, args);
    }

    /// Write to stderr at warning level.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    /// Write to stderr at error level.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    /// Write the message followed by the caller's stack trace.
    ///
    /// An empty message prints "Paused". When the trace cannot be
    /// captured a placeholder is printed instead.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        let Some((bound, owner)) = self.open() else {
            return;
        };
        let tag = format::tag(bound.options.tag_style, Level::Debug, &owner, Utc::now());
        let message = args.to_string();
        let message = if message.is_empty() {
            DEBUG_EMPTY_MESSAGE
        } else {
            message.as_str()
        };
        bound
            .sink
            .write(Level::Debug, &format::line(&tag, format_args!("{message}")));

        let stack = format::stack_or_placeholder(bound.options.capture_stack);
        bound
            .sink
            .write(Level::Debug, &format!("{DEBUG_TRACE_HEADER}\n{stack}"));
    }

    /// Stop in an attached debugger.
    ///
    /// Without a debugger a notice line is written instead; nothing is
    /// propagated to the caller.
    pub fn trigger_breakpoint(&self) {
        let Some((bound, _owner)) = self.open() else {
            return;
        };
        if let Err(reason) = debugger::break_into_debugger() {
            tracing::debug!(%reason, "Breakpoint skipped");
            let notice = format::line(
                Level::Info.label(),
                format_args!("{DEBUGGER_UNAVAILABLE}"),
            );
            bound.sink.write(Level::Info, &notice);
        }
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::MapEnv;
    use crate::core::sink::MemorySink;
    use crate::platform::storage::MemoryStore;
    use crate::util::constants::NO_STACK_TRACE;

    fn setup(options: OutputOptions) -> (LoggerFactory, Arc<MemorySink>) {
        let gate = IdentityGate::new(
            &GateConfig::default(),
            Box::new(MapEnv::new()),
            Some(Box::new(MemoryStore::new())),
        );
        let sink = Arc::new(MemorySink::new());
        let factory = LoggerFactory::new(Arc::new(gate), sink.clone(), options);
        (factory, sink)
    }

    fn no_stack() -> OutputOptions {
        OutputOptions {
            capture_stack: false,
            ..OutputOptions::default()
        }
    }

    #[test]
    fn test_owner_mismatch_is_silent_and_match_prints() {
        for (owner, current) in [("alice", "bob"), ("bob", "alice"), ("x", "X")] {
            let (factory, sink) = setup(no_stack());
            let logger = factory.create_logger(Some(owner));

            factory.gate().set_identity(current);
            logger.log(format_args!("hidden"));
            logger.warn(format_args!("hidden"));
            logger.error(format_args!("hidden"));
            logger.debug(format_args!("hidden"));
            logger.trigger_breakpoint();
            assert!(sink.is_empty(), "{owner} logger printed for {current}");

            factory.gate().set_identity(owner);
            logger.log(format_args!("shown"));
            assert_eq!(sink.lines().len(), 1);
        }
    }

    #[test]
    fn test_rejected_identity_is_reported_on_the_sink() {
        let (factory, sink) = setup(no_stack());
        factory.set_identity("alice");
        assert!(sink.is_empty());

        factory.set_identity("");
        assert_eq!(
            sink.take(),
            vec![(
                Level::Warn,
                "⚠️ [DEV-WARN] Ignoring invalid Dev ID: Dev ID must be a non-empty string"
                    .to_string()
            )]
        );
        assert_eq!(factory.gate().get_identity().as_deref(), Some("alice"));

        factory.gate().enable_production_mode();
        factory.set_identity("");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_no_identity_means_every_logger_is_silent() {
        let (factory, sink) = setup(no_stack());
        factory.create_logger(None).log(format_args!("x"));
        factory.create_logger(Some("alice")).error(format_args!("x"));
        assert!(sink.is_empty());
    }

    /// An unbound logger tracks the current identity rather than a snapshot
    /// taken at creation.
    #[test]
    fn test_unbound_logger_tracks_current_identity() {
        let (factory, sink) = setup(no_stack());
        factory.gate().set_identity("alice");
        let logger = factory.create_logger(None);

        logger.log(format_args!("hi"));
        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::Log);
        assert!(lines[0].1.starts_with("[alice] ["), "{}", lines[0].1);
        assert!(lines[0].1.ends_with("] hi"), "{}", lines[0].1);

        factory.gate().set_identity("bob");
        logger.log(format_args!("hi again"));
        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.starts_with("[bob] ["), "{}", lines[0].1);
    }

    #[test]
    fn test_bound_logger_stops_when_identity_switches() {
        let (factory, sink) = setup(no_stack());
        factory.gate().set_identity("alice");
        let logger = factory.create_logger(Some("alice"));
        logger.log(format_args!("hi"));
        factory.gate().set_identity("bob");
        logger.log(format_args!("hi"));
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_debug_prints_placeholder_when_capture_unavailable() {
        let (factory, sink) = setup(no_stack());
        factory.gate().set_identity("bob");
        let logger = factory.create_logger(Some("alice"));

        logger.debug(format_args!("state = {}", 42));
        assert!(sink.is_empty());

        factory.gate().set_identity("alice");
        logger.debug(format_args!("state = {}", 42));
        let lines = sink.take();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].1.ends_with("state = 42"), "{}", lines[0].1);
        assert_eq!(lines[1].0, Level::Debug);
        assert!(lines[1].1.starts_with(DEBUG_TRACE_HEADER));
        assert!(lines[1].1.ends_with(NO_STACK_TRACE));
    }

    #[test]
    fn test_debug_without_message_prints_paused() {
        let (factory, sink) = setup(OutputOptions {
            tag_style: TagStyle::Label,
            capture_stack: false,
        });
        factory.gate().set_identity("alice");
        factory.create_logger(None).debug(format_args!(""));
        assert_eq!(sink.lines()[0].1, "🧠 [DEV-DEBUG] Paused");
    }

    #[test]
    fn test_levels_route_to_matching_stream() {
        let (factory, sink) = setup(OutputOptions {
            tag_style: TagStyle::Label,
            capture_stack: false,
        });
        factory.gate().set_identity("alice");
        let logger = factory.create_logger(Some("alice"));
        logger.log(format_args!("a"));
        logger.warn(format_args!("b"));
        logger.error(format_args!("c"));

        let lines = sink.lines();
        assert_eq!(lines[0], (Level::Log, "🪵 [DEV-LOG] a".to_string()));
        assert_eq!(lines[1], (Level::Warn, "⚠️ [DEV-WARN] b".to_string()));
        assert_eq!(lines[2], (Level::Error, "❌ [DEV-ERROR] c".to_string()));
    }

    #[test]
    fn test_breakpoint_without_debugger_reports_notice() {
        if debugger::debugger_attached() {
            return;
        }
        let (factory, sink) = setup(no_stack());
        factory.gate().set_identity("alice");
        factory.create_logger(None).trigger_breakpoint();
        assert_eq!(
            sink.lines(),
            vec![(
                Level::Info,
                "🔧 [DEV-DEBUGGER] Debugger not available in this environment".to_string()
            )]
        );
    }

    #[test]
    fn test_production_factory_returns_disabled_logger() {
        let (factory, sink) = setup(no_stack());
        factory.gate().set_identity("x");
        factory.gate().enable_production_mode();

        let logger = factory.create_logger(Some("x"));
        assert!(logger.is_disabled());
        assert_eq!(logger.owner(), None);
        logger.log(format_args!("y"));
        logger.debug(format_args!("y"));
        logger.trigger_breakpoint();
        assert!(sink.is_empty());
    }

    /// A logger created before production mode was switched on is still
    /// silenced, since its gate now refuses.
    #[test]
    fn test_existing_logger_silenced_by_production() {
        let (factory, sink) = setup(no_stack());
        factory.gate().set_identity("x");
        let logger = factory.create_logger(Some("x"));
        factory.gate().enable_production_mode();
        logger.log(format_args!("y"));
        assert!(sink.is_empty());
    }
}
