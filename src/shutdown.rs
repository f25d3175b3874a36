//! Cooperative shutdown
//!
//! A [`ShutdownToken`] is a shared flag checked by the poll loop between
//! iterations. Signal handlers and the UI's quit key both set it; nothing
//! interrupts a read in flight.

use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity of [`ShutdownToken::sleep`]
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Cloneable cancellation flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for up to `duration`, waking early once cancelled.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while !self.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
        true
    }
}

#[cfg(unix)]
mod unix {
    use super::ShutdownToken;
    use crate::error::{Error, Result};
    use log::debug;
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use std::ffi::c_int;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};

    static SIGNAL_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

    extern "C" fn on_signal(_: c_int) {
        if let Some(flag) = SIGNAL_FLAG.get() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn install(token: &ShutdownToken) -> Result<()> {
        if SIGNAL_FLAG.set(token.flag.clone()).is_err() {
            return Err(Error::InvalidValue(
                "signal handlers are already bound to another token".to_string(),
            ));
        }

        let action = SigAction::new(
            SigHandler::Handler(on_signal),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );

        for signal in [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP] {
            // SAFETY: the handler only performs an atomic store
            unsafe { sigaction(signal, &action) }.map_err(io::Error::from)?;
            debug!("installed handler for {:?}", signal);
        }

        Ok(())
    }
}

/// Route SIGINT, SIGTERM and SIGHUP to `token`.
///
/// Only one token per process can be bound; a second call fails.
#[cfg(unix)]
pub fn install_signal_handlers(token: &ShutdownToken) -> Result<()> {
    unix::install(token)
}

/// No-op outside Unix; Ctrl+C still reaches the UI as a key press.
#[cfg(not(unix))]
pub fn install_signal_handlers(_token: &ShutdownToken) -> Result<()> {
    log::debug!("signal handlers not supported on this platform");
    Ok(())
}
