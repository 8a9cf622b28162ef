//! Shutdown on SIGINT/SIGTERM.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_signal(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to [`shutdown_requested`].
#[cfg(unix)]
pub fn install() {
    let sigint = route(libc::SIGINT, "SIGINT");
    let sigterm = route(libc::SIGTERM, "SIGTERM");
    if sigint && sigterm {
        log::debug!("Installed SIGINT/SIGTERM handlers");
    }
}

/// Install the shutdown handler for `signal`, warning when the OS refuses.
#[cfg(unix)]
fn route(signal: libc::c_int, name: &str) -> bool {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;

    // SAFETY: the handler only stores to an atomic, which is async-signal-safe
    let previous = unsafe { libc::signal(signal, handler) };
    if previous == libc::SIG_ERR {
        log::warn!(
            "Cannot install {name} handler ({}); it will not stop cleanly",
            std::io::Error::last_os_error()
        );
        return false;
    }
    true
}

/// Signals keep their default behavior on this platform.
#[cfg(not(unix))]
pub fn install() {}

/// Whether a shutdown signal has arrived.
pub fn shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_sigterm_requests_shutdown() {
        install();
        assert!(!shutdown_requested());

        // SAFETY: raising a signal whose handler was installed above
        unsafe {
            libc::raise(libc::SIGTERM);
        }
        assert!(shutdown_requested());
    }

    #[test]
    fn test_uncatchable_signal_reported() {
        assert!(!route(libc::SIGKILL, "SIGKILL"));
        assert!(route(libc::SIGUSR1, "SIGUSR1"));
    }
}
