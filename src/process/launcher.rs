use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr;

use libc::{c_char, c_int, pid_t};

use super::{signal, ExecError, ExitOutcome, ForkError, PreparedRedirection, ProcessError};
use crate::terminal::{ForegroundControl, ForegroundGuard};

/// Everything needed to run one external program in the foreground.
#[derive(Debug)]
pub struct CommandRequest {
    path: PathBuf,
    argv: Vec<String>,
    redirection: Option<PreparedRedirection>,
}

impl CommandRequest {
    /// `argv[0]` stays the name the user typed, not the resolved path.
    pub fn new(path: PathBuf, argv: Vec<String>) -> Self {
        Self {
            path,
            argv,
            redirection: None,
        }
    }

    pub fn with_redirection(mut self, redirection: Option<PreparedRedirection>) -> Self {
        self.redirection = redirection;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// C-side view of a request, built before fork so the child never allocates.
struct ExecImage {
    path: CString,
    _args: Vec<CString>,
    argv: Vec<*const c_char>,
    exec_failure: Vec<u8>,
    redirect_failure: Vec<u8>,
}

impl ExecImage {
    fn build(request: &CommandRequest) -> Result<Self, ProcessError> {
        let path = CString::new(request.path.as_os_str().as_bytes())
            .map_err(|_| ProcessError::InvalidArgument(request.path.display().to_string()))?;

        let args = request
            .argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes())
                    .map_err(|_| ProcessError::InvalidArgument(arg.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut argv: Vec<*const c_char> = args.iter().map(|a| a.as_ptr()).collect();
        argv.push(ptr::null());

        // The child appends ": os error <errno>" and a newline.
        let exec_failure =
            format!("tsh: {}", ExecError::InvalidExecutable(request.path.clone())).into_bytes();
        let redirect_failure = match &request.redirection {
            Some(r) => format!(
                "tsh: cannot redirect fd {} to {}",
                r.target_fd(),
                r.path().display()
            )
            .into_bytes(),
            None => Vec::new(),
        };

        Ok(Self {
            path,
            _args: args,
            argv,
            exec_failure,
            redirect_failure,
        })
    }
}

enum Spawn {
    Child,
    Parent(pid_t),
}

fn fork() -> Result<Spawn, ForkError> {
    // SAFETY: the child branch only runs async-signal-safe code before exec.
    match unsafe { libc::fork() } {
        -1 => Err(ForkError::ResourceExhausted(io::Error::last_os_error())),
        0 => Ok(Spawn::Child),
        pid => Ok(Spawn::Parent(pid)),
    }
}

/// Runs in the child between fork and exec. Never returns.
fn exec_child(image: &ExecImage, redirection: Option<&PreparedRedirection>) -> ! {
    // SAFETY: every call here is async-signal-safe and all memory was
    // allocated before fork.
    unsafe {
        libc::setpgid(0, 0);
        signal::reset_for_child();

        if let Some(r) = redirection {
            if libc::dup2(r.source_fd(), r.target_fd()) < 0 {
                child_fail(&image.redirect_failure);
            }
        }

        libc::execv(image.path.as_ptr(), image.argv.as_ptr());
        child_fail(&image.exec_failure)
    }
}

/// Reports the errno left by the failed call, then exits. Must be called
/// straight after that call, before anything else can touch errno.
unsafe fn child_fail(message: &[u8]) -> ! {
    let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
    let mut digits = [0u8; 10];
    let digits = decimal(errno.unsigned_abs(), &mut digits);

    for part in [message, &b": os error "[..], digits, &b"\n"[..]] {
        libc::write(
            libc::STDERR_FILENO,
            part.as_ptr() as *const libc::c_void,
            part.len(),
        );
    }
    libc::_exit(libc::EXIT_FAILURE)
}

/// Formats `n` into the tail of `buf` without allocating.
fn decimal(mut n: u32, buf: &mut [u8; 10]) -> &[u8] {
    let mut start = buf.len();
    loop {
        start -= 1;
        buf[start] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[start..]
}

fn wait_for(pid: pid_t) -> io::Result<c_int> {
    let mut status: c_int = 0;
    loop {
        // SAFETY: status points at a live c_int.
        if unsafe { libc::waitpid(pid, &mut status, libc::WUNTRACED) } >= 0 {
            return Ok(status);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// Forks, execs and waits on one foreground program at a time.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Blocks for the whole life of the child. The terminal is back with the
    /// shell by the time this returns, whatever happened to the child.
    pub fn launch(
        &self,
        request: CommandRequest,
        terminal: &dyn ForegroundControl,
    ) -> Result<ExitOutcome, ProcessError> {
        let image = ExecImage::build(&request)?;

        let pid = match fork()? {
            Spawn::Child => exec_child(&image, request.redirection.as_ref()),
            Spawn::Parent(pid) => pid,
        };

        // Also set from here so the group exists before tcsetpgrp, whichever
        // side runs first. EACCES once the child has exec'd is harmless.
        // SAFETY: pid is our own child.
        unsafe {
            libc::setpgid(pid, pid);
        }
        tracing::debug!("spawned {} as pid {}", request.path.display(), pid);

        let status = {
            let _foreground = ForegroundGuard::acquire(terminal, pid);
            wait_for(pid)
        };

        // The redirection target closes here, after the child is done.
        drop(request);

        let status = status.map_err(ProcessError::Wait)?;
        let outcome = ExitOutcome::from_raw(status);
        tracing::debug!("pid {} finished: {}", pid, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Redirection;
    use crate::terminal::testing::{Handoff, RecordingTerminal};
    use std::fs;
    use std::os::unix::process::ExitStatusExt;
    use tempfile::TempDir;

    fn request(path: &str, argv: &[&str]) -> CommandRequest {
        CommandRequest::new(
            PathBuf::from(path),
            argv.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn assert_handed_back(terminal: &RecordingTerminal) {
        let events = terminal.events.borrow();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Handoff::Delegate(pid) if pid > 0));
        assert_eq!(events[1], Handoff::Reclaim);
    }

    #[test]
    fn test_launch_success() {
        let _guard = crate::test_support::env_lock();
        let terminal = RecordingTerminal::default();

        let outcome = ProcessLauncher::new()
            .launch(request("/bin/sh", &["sh", "-c", "exit 0"]), &terminal)
            .unwrap();

        assert!(outcome.success());
        assert_handed_back(&terminal);
    }

    #[test]
    fn test_exit_status_is_passed_through() {
        let _guard = crate::test_support::env_lock();
        let terminal = RecordingTerminal::default();

        let outcome = ProcessLauncher::new()
            .launch(request("/bin/sh", &["sh", "-c", "exit 3"]), &terminal)
            .unwrap();

        assert_eq!(outcome.status().code(), Some(3));
        assert_handed_back(&terminal);
    }

    #[test]
    fn test_crashed_child_still_reclaims() {
        let _guard = crate::test_support::env_lock();
        let terminal = RecordingTerminal::default();

        let outcome = ProcessLauncher::new()
            .launch(request("/bin/sh", &["sh", "-c", "kill -SEGV $$"]), &terminal)
            .unwrap();

        assert_eq!(outcome.status().signal(), Some(libc::SIGSEGV));
        assert_handed_back(&terminal);
    }

    #[test]
    fn test_exec_failure_looks_like_exit_failure() {
        let _guard = crate::test_support::env_lock();
        let dir = TempDir::new().unwrap();
        let not_a_program = dir.path().join("notes.txt");
        fs::write(&not_a_program, "just text").unwrap();
        let terminal = RecordingTerminal::default();

        let outcome = ProcessLauncher::new()
            .launch(
                request(not_a_program.to_str().unwrap(), &["notes.txt"]),
                &terminal,
            )
            .unwrap();

        assert_eq!(outcome.status().code(), Some(libc::EXIT_FAILURE));
        assert_handed_back(&terminal);
    }

    #[test]
    fn test_argv0_is_typed_name() {
        let _guard = crate::test_support::env_lock();
        let terminal = RecordingTerminal::default();

        let outcome = ProcessLauncher::new()
            .launch(
                request("/bin/sh", &["typed-name", "-c", "test \"$0\" = typed-name"]),
                &terminal,
            )
            .unwrap();

        assert!(outcome.success());
    }

    #[test]
    fn test_child_runs_in_own_group() {
        if !Path::new("/proc/self/stat").exists() {
            return;
        }
        let _guard = crate::test_support::env_lock();
        let terminal = RecordingTerminal::default();

        // Field 5 of /proc/<pid>/stat is the process group.
        let script = "set -- $(cut -d' ' -f5 /proc/$$/stat); test \"$1\" = \"$$\"";
        let outcome = ProcessLauncher::new()
            .launch(request("/bin/sh", &["sh", "-c", script]), &terminal)
            .unwrap();

        assert!(outcome.success());
    }

    #[test]
    fn test_output_redirection_binds_child_stdout() {
        let _guard = crate::test_support::env_lock();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        let prepared = Redirection::OutputTo(out.clone()).prepare().unwrap();
        let terminal = RecordingTerminal::default();

        let outcome = ProcessLauncher::new()
            .launch(
                request("/bin/sh", &["sh", "-c", "echo hi"]).with_redirection(prepared),
                &terminal,
            )
            .unwrap();

        assert!(outcome.success());
        assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
    }

    #[test]
    fn test_input_redirection_binds_child_stdin() {
        let _guard = crate::test_support::env_lock();
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.txt");
        fs::write(&input, "hello\n").unwrap();
        let prepared = Redirection::InputFrom(input).prepare().unwrap();
        let terminal = RecordingTerminal::default();

        let outcome = ProcessLauncher::new()
            .launch(
                request("/bin/sh", &["sh", "-c", "read x; test \"$x\" = hello"])
                    .with_redirection(prepared),
                &terminal,
            )
            .unwrap();

        assert!(outcome.success());
    }

    #[test]
    fn test_decimal_without_allocation() {
        let mut buf = [0u8; 10];
        assert_eq!(decimal(0, &mut buf), b"0");
        assert_eq!(decimal(13, &mut buf), b"13");
        assert_eq!(decimal(u32::MAX, &mut buf), b"4294967295");
    }

    #[test]
    fn test_failure_messages_are_prepared() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        let prepared = Redirection::OutputTo(out.clone()).prepare().unwrap();
        let req = request("/no/such/tool", &["tool"]).with_redirection(prepared);

        let image = ExecImage::build(&req).unwrap();

        assert_eq!(image.exec_failure, b"tsh: cannot execute /no/such/tool");
        let redirect = String::from_utf8(image.redirect_failure.clone()).unwrap();
        assert_eq!(
            redirect,
            format!("tsh: cannot redirect fd 1 to {}", out.display())
        );
    }

    #[test]
    fn test_nul_in_argument_rejected_before_fork() {
        let terminal = RecordingTerminal::default();

        let result = ProcessLauncher::new()
            .launch(request("/bin/sh", &["sh", "bad\0arg"]), &terminal);

        assert!(matches!(result, Err(ProcessError::InvalidArgument(_))));
        assert!(terminal.events.borrow().is_empty());
    }
}
