// DevGate - platform/debugger.rs
//
// Debugger detection and breakpoint trap.
//
// Trapping without an attached debugger kills the process with SIGTRAP, so
// the trap is only issued after `debugger_attached` confirms a tracer.
// Platforms without a detection method report "not attached".

use std::fmt;

/// Why a breakpoint request was not honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointUnavailable {
    /// No debugger is attached to this process.
    NotAttached,
    /// The target architecture has no supported trap instruction.
    UnsupportedArch,
}

impl fmt::Display for BreakpointUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttached => write!(f, "no debugger attached"),
            Self::UnsupportedArch => write!(f, "breakpoints unsupported on this architecture"),
        }
    }
}

/// Returns true if a debugger is tracing this process.
///
/// Linux reads `TracerPid` from /proc/self/status. Any read failure counts
/// as "not attached".
pub fn debugger_attached() -> bool {
    #[cfg(target_os = "linux")]
    {
        match std::fs::read_to_string("/proc/self/status") {
            Ok(status) => tracer_pid(&status).is_some_and(|pid| pid != 0),
            Err(e) => {
                tracing::debug!(error = %e, "Cannot read /proc/self/status");
                false
            }
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// Parse the `TracerPid:` field of a /proc status file.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|value| value.trim().parse().ok())
}

/// Stop in the attached debugger.
pub fn break_into_debugger() -> Result<(), BreakpointUnavailable> {
    if !debugger_attached() {
        return Err(BreakpointUnavailable::NotAttached);
    }
    trap()
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn trap() -> Result<(), BreakpointUnavailable> {
    // SAFETY: int3 raises SIGTRAP, which the attached tracer intercepts.
    unsafe { std::arch::asm!("int3") };
    Ok(())
}

#[cfg(target_arch = "aarch64")]
fn trap() -> Result<(), BreakpointUnavailable> {
    // SAFETY: brk raises SIGTRAP, which the attached tracer intercepts.
    unsafe { std::arch::asm!("brk #0xf000") };
    Ok(())
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn trap() -> Result<(), BreakpointUnavailable> {
    Err(BreakpointUnavailable::UnsupportedArch)
}
