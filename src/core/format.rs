// DevGate - core/format.rs
//
// Line formatting: tag prefixes and stack-trace rendering.
// Only called after the gate has passed.

use crate::core::model::{Level, TagStyle};
use crate::util::constants::{NO_STACK_TRACE, TAG_TIMESTAMP_FORMAT};
use chrono::{DateTime, Utc};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Build the tag for one output line.
///
/// `owner` is the logger's bound owner, or the resolved identity for an
/// unbound logger.
pub fn tag(style: TagStyle, level: Level, owner: &str, now: DateTime<Utc>) -> String {
    match style {
        TagStyle::Timestamped => {
            format!("[{owner}] [{}]", now.format(TAG_TIMESTAMP_FORMAT))
        }
        TagStyle::Label => level.label().to_string(),
    }
}

/// Join a tag and a message into one line.
pub fn line(tag: &str, message: fmt::Arguments<'_>) -> String {
    let message = message.to_string();
    if message.is_empty() {
        tag.to_string()
    } else {
        format!("{tag} {message}")
    }
}

/// Capture the current call stack, or `None` when capture is unsupported
/// on this platform or `enabled` is false.
pub fn capture_stack(enabled: bool) -> Option<String> {
    if !enabled {
        return None;
    }
    let trace = Backtrace::force_capture();
    match trace.status() {
        BacktraceStatus::Captured => {
            let rendered = skip_internal_frames(&trace.to_string());
            if rendered.trim().is_empty() {
                None
            } else {
                Some(rendered)
            }
        }
        _ => None,
    }
}

/// Symbol prefixes of the frames between the caller and the capture.
const INTERNAL_FRAME_PREFIXES: &[&str] = &[
    "std::backtrace",
    "devgate::core::format::",
    "devgate::core::logger::DevLogger::",
];

/// The free `devgate::debug` function.
const FREE_DEBUG_FN: &str = "devgate::debug";

/// Drop the leading capture and logger frames so the rendered trace starts
/// at the caller. Frame numbers are kept as captured.
///
/// A frame is a header line (`  N: symbol`) plus its indented `at` lines.
fn skip_internal_frames(rendered: &str) -> String {
    let mut frames: Vec<Vec<&str>> = Vec::new();
    for line in rendered.lines() {
        if frame_symbol(line).is_some() || frames.is_empty() {
            frames.push(vec![line]);
        } else if let Some(frame) = frames.last_mut() {
            frame.push(line);
        }
    }

    let skip = frames
        .iter()
        .take_while(|frame| {
            frame
                .first()
                .and_then(|header| frame_symbol(header))
                .is_some_and(is_internal_symbol)
        })
        .count();
    // Nothing but our own frames: keep the full trace rather than none.
    let kept = if skip == frames.len() { 0 } else { skip };

    frames[kept..]
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// The symbol of a frame header line, `None` for `at` lines.
fn frame_symbol(line: &str) -> Option<&str> {
    let (index, symbol) = line.trim_start().split_once(": ")?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(symbol.trim())
}

fn is_internal_symbol(symbol: &str) -> bool {
    // Legacy mangling may leave a `::h<16 hex>` suffix.
    let symbol = match symbol.rsplit_once("::h") {
        Some((path, hash)) if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) => {
            path
        }
        _ => symbol,
    };
    symbol == FREE_DEBUG_FN
        || INTERNAL_FRAME_PREFIXES
            .iter()
            .any(|prefix| symbol.starts_with(prefix))
}

/// Stack trace text for `debug`, with the placeholder on failure.
pub fn stack_or_placeholder(enabled: bool) -> String {
    capture_stack(enabled).unwrap_or_else(|| NO_STACK_TRACE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamped_tag_has_owner_and_millis() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
            .unwrap()
            + chrono::Duration::milliseconds(589);
        let tag = tag(TagStyle::Timestamped, Level::Log, "alice", now);
        assert_eq!(tag, "[alice] [09:26:53.589]");
    }

    #[test]
    fn test_label_tag_ignores_owner() {
        let tag = tag(TagStyle::Label, Level::Warn, "alice", Utc::now());
        assert_eq!(tag, "⚠️ [DEV-WARN]");
    }

    #[test]
    fn test_line_joins_tag_and_message() {
        assert_eq!(line("[a]", format_args!("hi {}", 3)), "[a] hi 3");
        assert_eq!(line("[a]", format_args!("")), "[a]");
    }

    #[test]
    fn test_disabled_capture_uses_placeholder() {
        assert_eq!(capture_stack(false), None);
        assert_eq!(stack_or_placeholder(false), NO_STACK_TRACE);
    }

    #[test]
    fn test_internal_frames_are_skipped() {
        let rendered = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/library/std/src/backtrace.rs:312:9
   1: devgate::core::format::capture_stack
             at ./src/core/format.rs:41:17
   2: devgate::core::format::stack_or_placeholder
   3: devgate::core::logger::DevLogger::debug
             at ./src/core/logger.rs:210:21
   4: devgate::debug
   5: shop::checkout
             at ./src/checkout.rs:12:5
   6: shop::main";
        assert_eq!(
            skip_internal_frames(rendered),
            "   5: shop::checkout\n             at ./src/checkout.rs:12:5\n   6: shop::main"
        );
    }

    #[test]
    fn test_hashed_free_debug_symbol_is_internal() {
        assert!(is_internal_symbol("devgate::debug::h0123456789abcdef"));
        assert!(!is_internal_symbol("devgate::debugger_helper"));
        assert!(!is_internal_symbol("shop::handle"));
    }

    #[test]
    fn test_trace_of_only_internal_frames_is_kept_whole() {
        let rendered = "   0: std::backtrace::Backtrace::force_capture\n   1: devgate::debug";
        assert_eq!(skip_internal_frames(rendered), rendered);
    }

    #[test]
    fn test_enabled_capture_never_empty() {
        assert!(!stack_or_placeholder(true).is_empty());
    }
}
