use std::fmt;
use std::io;
use std::os::unix::io::RawFd;

use libc::pid_t;

use crate::process::signal::InterruptShield;

/// Hand-off of the terminal's foreground process group.
pub trait ForegroundControl {
    fn delegate(&self, child_group: pid_t);
    fn reclaim(&self);
}

/// The shell's hold on its controlling terminal.
///
/// Created once at startup and passed by reference to whatever launches
/// foreground children. When the input is not a terminal every hand-off is a
/// no-op.
pub struct TerminalController {
    fd: RawFd,
    interactive: bool,
    shell_pgid: pid_t,
    saved_modes: Option<libc::termios>,
}

impl TerminalController {
    /// Take the terminal on standard input.
    pub fn init() -> Self {
        Self::init_on(libc::STDIN_FILENO)
    }

    pub fn init_on(fd: RawFd) -> Self {
        // SAFETY: isatty only inspects the descriptor.
        let interactive = unsafe { libc::isatty(fd) } == 1;
        if !interactive {
            tracing::debug!("fd {} is not a terminal, job control disabled", fd);
            return Self::detached_on(fd);
        }

        // Stop ourselves until whoever started us puts us in the foreground.
        loop {
            // SAFETY: plain process/terminal queries.
            let pgid = unsafe { libc::getpgrp() };
            if unsafe { libc::tcgetpgrp(fd) } == pgid {
                break;
            }
            unsafe {
                libc::kill(-pgid, libc::SIGTTIN);
            }
        }

        // SAFETY: getpid cannot fail; setpgid/tcsetpgrp report through errno.
        let shell_pgid = unsafe { libc::getpid() };
        if unsafe { libc::setpgid(shell_pgid, shell_pgid) } < 0 {
            // EPERM for a session leader, which already leads its group.
            tracing::debug!("setpgid on shell: {}", io::Error::last_os_error());
        }
        if unsafe { libc::tcsetpgrp(fd, shell_pgid) } < 0 {
            tracing::warn!(
                "could not take the terminal: {}",
                io::Error::last_os_error()
            );
        }

        let saved_modes = unsafe {
            let mut modes: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut modes) == 0 {
                Some(modes)
            } else {
                tracing::warn!(
                    "could not read terminal modes: {}",
                    io::Error::last_os_error()
                );
                None
            }
        };

        tracing::debug!("shell owns terminal fd {} as group {}", fd, shell_pgid);
        Self {
            fd,
            interactive: true,
            shell_pgid,
            saved_modes,
        }
    }

    /// A controller that never touches the terminal.
    pub fn detached() -> Self {
        Self::detached_on(libc::STDIN_FILENO)
    }

    fn detached_on(fd: RawFd) -> Self {
        Self {
            fd,
            interactive: false,
            // SAFETY: getpgrp cannot fail.
            shell_pgid: unsafe { libc::getpgrp() },
            saved_modes: None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn shell_pgid(&self) -> pid_t {
        self.shell_pgid
    }

    pub fn saved_modes(&self) -> Option<&libc::termios> {
        self.saved_modes.as_ref()
    }

    /// Group the terminal currently delivers keyboard signals to.
    pub fn foreground_group(&self) -> Option<pid_t> {
        if !self.interactive {
            return None;
        }
        // SAFETY: query only.
        let pgid = unsafe { libc::tcgetpgrp(self.fd) };
        (pgid >= 0).then_some(pgid)
    }

    fn set_foreground(&self, pgid: pid_t) {
        // SAFETY: SIGTTOU is ignored by the shell, so this never stops us.
        if unsafe { libc::tcsetpgrp(self.fd, pgid) } < 0 {
            tracing::warn!(
                "tcsetpgrp({}) failed: {}",
                pgid,
                io::Error::last_os_error()
            );
        }
    }
}

impl ForegroundControl for TerminalController {
    fn delegate(&self, child_group: pid_t) {
        if self.interactive {
            tracing::debug!("terminal -> group {}", child_group);
            self.set_foreground(child_group);
        }
    }

    fn reclaim(&self) {
        if self.interactive {
            tracing::debug!("terminal -> shell group {}", self.shell_pgid);
            self.set_foreground(self.shell_pgid);
        }
    }
}

impl fmt::Debug for TerminalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalController")
            .field("fd", &self.fd)
            .field("interactive", &self.interactive)
            .field("shell_pgid", &self.shell_pgid)
            .field("saved_modes", &self.saved_modes.is_some())
            .finish()
    }
}

/// Lends the terminal to a child group for as long as it lives.
///
/// While held, the shell ignores SIGINT so an interrupt reaches only the
/// child. Dropping it takes the terminal back and then restores SIGINT, on
/// every path out of the wait.
pub struct ForegroundGuard<'a> {
    terminal: &'a dyn ForegroundControl,
    shield: Option<InterruptShield>,
}

impl<'a> ForegroundGuard<'a> {
    pub fn acquire(terminal: &'a dyn ForegroundControl, child_group: pid_t) -> Self {
        let shield = InterruptShield::raise();
        terminal.delegate(child_group);
        Self {
            terminal,
            shield: Some(shield),
        }
    }
}

impl Drop for ForegroundGuard<'_> {
    fn drop(&mut self) {
        self.terminal.reclaim();
        drop(self.shield.take());
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Handoff, RecordingTerminal};
    use super::*;
    use std::fs::File;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn test_non_terminal_is_not_interactive() {
        let file = File::open("/dev/null").unwrap();
        let terminal = TerminalController::init_on(file.as_raw_fd());

        assert!(!terminal.is_interactive());
        assert!(terminal.saved_modes().is_none());
        assert_eq!(terminal.foreground_group(), None);
        assert_eq!(terminal.shell_pgid(), unsafe { libc::getpgrp() });
    }

    #[test]
    fn test_detached_handoff_is_noop() {
        let terminal = TerminalController::detached();
        terminal.delegate(1);
        terminal.reclaim();
        assert!(!terminal.is_interactive());
    }

    #[test]
    fn test_guard_reclaims_on_drop() {
        let _guard = crate::test_support::env_lock();
        let terminal = RecordingTerminal::default();
        {
            let _fg = ForegroundGuard::acquire(&terminal, 4242);
            assert_eq!(*terminal.events.borrow(), vec![Handoff::Delegate(4242)]);
        }
        assert_eq!(
            *terminal.events.borrow(),
            vec![Handoff::Delegate(4242), Handoff::Reclaim]
        );
    }

    #[test]
    fn test_guard_reclaims_on_unwind() {
        let _guard = crate::test_support::env_lock();
        let terminal = RecordingTerminal::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _fg = ForegroundGuard::acquire(&terminal, 7);
            panic!("wait blew up");
        }));

        assert!(result.is_err());
        assert_eq!(
            *terminal.events.borrow(),
            vec![Handoff::Delegate(7), Handoff::Reclaim]
        );
    }
}
