// DevGate - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use std::fmt;

// =============================================================================
// Output level
// =============================================================================

/// Output stream a gated line is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

impl Level {
    /// Label-style tag for this level. `Info` is only used for the
    /// breakpoint notice, which always carries this label.
    pub fn label(&self) -> &'static str {
        match self {
            Level::Log => "🪵 [DEV-LOG]",
            Level::Info => "🔧 [DEV-DEBUGGER]",
            Level::Warn => "⚠️ [DEV-WARN]",
            Level::Error => "❌ [DEV-ERROR]",
            Level::Debug => "🧠 [DEV-DEBUG]",
        }
    }

    /// True for levels that go to stderr on the console.
    pub fn is_stderr(&self) -> bool {
        matches!(self, Level::Warn | Level::Error)
    }
}

// =============================================================================
// Configuration choices
// =============================================================================

/// How each output line is prefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagStyle {
    /// `[owner] [HH:MM:SS.mmm]` in UTC.
    #[default]
    Timestamped,
    /// Fixed per-level label, e.g. `🪵 [DEV-LOG]`.
    Label,
}

/// Where gated output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// stdout/stderr.
    #[default]
    Console,
    /// `tracing` events under the `devgate::output` target.
    Tracing,
}

// =============================================================================
// Resolved identity
// =============================================================================

/// Which source produced the current identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// Set explicitly through the setter in this process.
    Override,
    /// Read back from the persisted store.
    Storage,
    /// Read from the named environment variable.
    Env(String),
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Storage => write!(f, "storage"),
            Self::Env(name) => write!(f, "env:{name}"),
        }
    }
}

/// The current identity together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub value: String,
    pub source: IdentitySource,
}
