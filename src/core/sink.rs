// DevGate - core/sink.rs
//
// Destinations for gated output. Sinks are only reached after the gate
// passes; write failures are ignored.

use crate::core::model::{Level, SinkKind};
use crate::util::constants::OUTPUT_TRACING_TARGET;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Receives fully formatted output lines.
pub trait Sink: Send + Sync {
    fn write(&self, level: Level, line: &str);
}

/// Build the sink selected in configuration.
pub fn for_kind(kind: SinkKind) -> Arc<dyn Sink> {
    match kind {
        SinkKind::Console => Arc::new(ConsoleSink),
        SinkKind::Tracing => Arc::new(TracingSink),
    }
}

/// stdout for log/info/debug, stderr for warn/error.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn write(&self, level: Level, line: &str) {
        let _ = if level.is_stderr() {
            writeln!(std::io::stderr().lock(), "{line}")
        } else {
            writeln!(std::io::stdout().lock(), "{line}")
        };
    }
}

/// Forwards lines as `tracing` events under the `devgate::output` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn write(&self, level: Level, line: &str) {
        match level {
            Level::Log | Level::Info => {
                tracing::info!(target: OUTPUT_TRACING_TARGET, "{}", line)
            }
            Level::Warn => tracing::warn!(target: OUTPUT_TRACING_TARGET, "{}", line),
            Level::Error => tracing::error!(target: OUTPUT_TRACING_TARGET, "{}", line),
            Level::Debug => tracing::debug!(target: OUTPUT_TRACING_TARGET, "{}", line),
        }
    }
}

/// Captures lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Remove and return everything written so far.
    pub fn take(&self) -> Vec<(Level, String)> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn is_empty(&self) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

impl Sink for MemorySink {
    fn write(&self, level: Level, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_and_drains() {
        let sink = MemorySink::new();
        sink.write(Level::Warn, "careful");
        sink.write(Level::Log, "hello");
        assert_eq!(sink.lines().len(), 2);

        let taken = sink.take();
        assert_eq!(taken[0], (Level::Warn, "careful".to_string()));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_console_and_tracing_sinks_accept_every_level() {
        for kind in [SinkKind::Console, SinkKind::Tracing] {
            let sink = for_kind(kind);
            for level in [Level::Log, Level::Info, Level::Warn, Level::Error, Level::Debug] {
                sink.write(level, "devgate sink smoke test");
            }
        }
    }
}
