use std::io;

use libc::{c_int, sighandler_t, SIGINT, SIGTSTP, SIGTTOU, SIG_DFL, SIG_IGN};

fn set_disposition(sig: c_int, handler: sighandler_t) -> io::Result<()> {
    // SAFETY: only SIG_DFL / SIG_IGN are installed, never a Rust handler.
    if unsafe { libc::signal(sig, handler) } == libc::SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Dispositions the shell runs with between commands.
pub fn setup_shell_dispositions() -> io::Result<()> {
    set_disposition(SIGINT, SIG_DFL)?;
    set_disposition(SIGTSTP, SIG_IGN)?;
    set_disposition(SIGTTOU, SIG_IGN)
}

/// Undo the shell's settings in a freshly forked child.
///
/// Called between fork and exec, so it must stay async-signal-safe: no
/// allocation, no logging.
pub fn reset_for_child() {
    for sig in [SIGINT, SIGTSTP, SIGTTOU] {
        // SAFETY: signal(2) is async-signal-safe and SIG_DFL is always valid.
        unsafe {
            libc::signal(sig, SIG_DFL);
        }
    }
}

/// Keeps the shell from dying on a terminal interrupt while a foreground
/// child runs. Restores the default disposition on drop.
pub struct InterruptShield {
    _private: (),
}

impl InterruptShield {
    pub fn raise() -> Self {
        if let Err(e) = set_disposition(SIGINT, SIG_IGN) {
            tracing::warn!("failed to ignore SIGINT: {}", e);
        }
        Self { _private: () }
    }
}

impl Drop for InterruptShield {
    fn drop(&mut self) {
        if let Err(e) = set_disposition(SIGINT, SIG_DFL) {
            tracing::warn!("failed to restore SIGINT: {}", e);
        }
    }
}
