use crate::device::DebugMessage;

use super::config::DebugBreakPolicy;

/// Applies `policy` to an error-kind diagnostic.
pub(crate) fn debug_break(policy: DebugBreakPolicy, message: &DebugMessage) {
    match policy {
        DebugBreakPolicy::Trap => trap(message),
        DebugBreakPolicy::Panic => panic!("graphics backend error: {message}"),
        DebugBreakPolicy::LogOnly => {
            log::debug!("debug break skipped (policy: log only), id {}", message.id);
        }
    }
}

#[cfg(all(debug_assertions, any(target_arch = "x86", target_arch = "x86_64")))]
fn trap(_message: &DebugMessage) {
    // SAFETY: int3 only raises SIGTRAP / a breakpoint exception; it touches no memory.
    unsafe { std::arch::asm!("int3") }
}

#[cfg(all(debug_assertions, target_arch = "aarch64"))]
fn trap(_message: &DebugMessage) {
    // SAFETY: brk only raises a breakpoint exception; it touches no memory.
    unsafe { std::arch::asm!("brk #0xf000") }
}

#[cfg(not(all(
    debug_assertions,
    any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")
)))]
fn trap(message: &DebugMessage) {
    log::warn!("breakpoint trap unavailable on this build, id {}", message.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DebugKind, DebugSeverity, DebugSource};

    fn error() -> DebugMessage {
        DebugMessage::new(7, DebugSource::Api, DebugKind::Error, DebugSeverity::High, "bad")
    }

    #[test]
    fn log_only_returns() {
        debug_break(DebugBreakPolicy::LogOnly, &error());
    }

    #[test]
    #[should_panic(expected = "graphics backend error: bad")]
    fn panic_policy_panics_with_text() {
        debug_break(DebugBreakPolicy::Panic, &error());
    }
}
