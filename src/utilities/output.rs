//! Call-local standard output capture.
//!
//! Tool results travel over the host's stdout, so anything a wrapped target
//! prints while it runs would corrupt the transport. Targets write through
//! [`stdout()`] (or [`target_println!`](crate::target_println)); while a
//! capture scope is active on the current task those writes land in the
//! scope's buffer instead of the real stream.
//!
//! Scopes are task-local, not process-wide: concurrent calls each see their
//! own buffer, an inner scope shadows an outer one, and leaving a scope (by
//! returning, failing or being dropped) restores the previous destination.
//!
//! Targets that ignore [`stdout()`] and print straight to the process stream
//! are covered by [`suppress`] too. On unix it points file descriptor 1 at
//! the null device for as long as any suppression scope is alive. The
//! diversion is shared: the first scope in saves the real descriptor, the
//! last one out restores it, and the save/restore step is serialized behind
//! a process-wide lock. Everything written in between is discarded, so
//! overlapping calls cannot see each other's output.

use std::fmt;
use std::future::Future;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

tokio::task_local! {
    static CAPTURE: CaptureBuffer;
}

/// Buffer receiving captured writes.
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&self, buf: &[u8]) {
        // A poisoned buffer only means another writer panicked mid-append.
        let mut bytes = match self.bytes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        bytes.extend_from_slice(buf);
    }

    /// Number of bytes captured so far.
    pub fn len(&self) -> usize {
        self.bytes.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captured bytes as (lossy) UTF-8.
    pub fn contents(&self) -> String {
        self.bytes
            .lock()
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("len", &self.len())
            .finish()
    }
}

/// Writer used by targets for their standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetStdout;

/// Handle to the current task's standard output.
pub fn stdout() -> TargetStdout {
    TargetStdout
}

impl Write for TargetStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match CAPTURE.try_with(|capture| capture.append(buf)) {
            Ok(()) => Ok(buf.len()),
            Err(_) => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if is_capturing() {
            Ok(())
        } else {
            io::stdout().flush()
        }
    }
}

/// Whether the current task is inside a capture scope.
pub fn is_capturing() -> bool {
    CAPTURE.try_with(|_| ()).is_ok()
}

/// Write a line to the target's standard output. Write errors are ignored.
pub fn print_line(args: fmt::Arguments<'_>) {
    let mut out = stdout();
    let _ = writeln!(out, "{}", args);
}

/// `println!` for code running inside a wrapped target.
#[macro_export]
macro_rules! target_println {
    () => {
        $crate::utilities::output::print_line(format_args!(""))
    };
    ($($arg:tt)*) => {
        $crate::utilities::output::print_line(format_args!($($arg)*))
    };
}

/// Run `fut` with its standard output captured, returning the output along
/// with the captured text.
pub async fn capture<F>(fut: F) -> (F::Output, String)
where
    F: Future,
{
    let buffer = CaptureBuffer::new();
    let output = CAPTURE.scope(buffer.clone(), fut).await;
    (output, buffer.contents())
}

/// Whether the process's standard output is currently diverted to the null
/// device by a suppression scope.
pub fn is_diverted() -> bool {
    divert::is_active()
}

fn divert_process_stdout() -> Option<divert::Diversion> {
    match divert::Diversion::acquire() {
        Ok(diversion) => Some(diversion),
        Err(err) => {
            log::warn!("could not divert process stdout: {}", err);
            None
        }
    }
}

/// Run `fut` with its standard output captured and discarded.
///
/// Writes through [`stdout()`] go to a throwaway buffer; direct writes to
/// the process stream go to the null device until the scope ends.
pub async fn suppress<F>(fut: F) -> F::Output
where
    F: Future,
{
    let _diversion = divert_process_stdout();
    let buffer = CaptureBuffer::new();
    let output = CAPTURE.scope(buffer.clone(), fut).await;
    if !buffer.is_empty() {
        log::debug!("discarded {} bytes of target stdout", buffer.len());
    }
    output
}

/// Synchronous counterpart of [`suppress`].
pub fn suppress_sync<R>(f: impl FnOnce() -> R) -> R {
    let _diversion = divert_process_stdout();
    let buffer = CaptureBuffer::new();
    let output = CAPTURE.sync_scope(buffer.clone(), f);
    if !buffer.is_empty() {
        log::debug!("discarded {} bytes of target stdout", buffer.len());
    }
    output
}

#[cfg(unix)]
mod divert {
    use std::fs::OpenOptions;
    use std::io::{self, Write};
    use std::os::fd::{AsRawFd, RawFd};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use nix::unistd::{close, dup, dup2};

    struct State {
        holders: usize,
        saved: Option<RawFd>,
    }

    static STATE: Mutex<State> = Mutex::new(State {
        holders: 0,
        saved: None,
    });

    fn state() -> MutexGuard<'static, State> {
        STATE.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn is_active() -> bool {
        state().holders > 0
    }

    /// One holder of the shared diversion. Dropping the last one restores
    /// the saved descriptor.
    #[derive(Debug)]
    pub(super) struct Diversion {
        _held: (),
    }

    impl Diversion {
        pub(super) fn acquire() -> io::Result<Self> {
            let mut state = state();
            if state.holders == 0 {
                let _ = io::stdout().flush();
                let fd = io::stdout().as_raw_fd();
                let null = OpenOptions::new().write(true).open("/dev/null")?;
                let saved = dup(fd)?;
                if let Err(err) = dup2(null.as_raw_fd(), fd) {
                    let _ = close(saved);
                    return Err(err.into());
                }
                state.saved = Some(saved);
            }
            state.holders += 1;
            Ok(Self { _held: () })
        }
    }

    impl Drop for Diversion {
        fn drop(&mut self) {
            let mut state = state();
            state.holders = state.holders.saturating_sub(1);
            if state.holders > 0 {
                return;
            }
            if let Some(saved) = state.saved.take() {
                // Pending bytes belong to the target; send them to the null
                // device before the real stream comes back.
                let _ = io::stdout().flush();
                if let Err(err) = dup2(saved, io::stdout().as_raw_fd()) {
                    log::error!("failed to restore process stdout: {}", err);
                }
                let _ = close(saved);
            }
        }
    }
}

#[cfg(not(unix))]
mod divert {
    use std::io;

    pub(super) fn is_active() -> bool {
        false
    }

    #[derive(Debug)]
    pub(super) struct Diversion;

    impl Diversion {
        pub(super) fn acquire() -> io::Result<Self> {
            Ok(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_collects_target_output() {
        let ((), text) = capture(async {
            crate::target_println!("hello {}", 1);
            crate::target_println!("world");
        })
        .await;
        assert_eq!(text, "hello 1\nworld\n");
    }

    #[tokio::test]
    async fn test_suppressed_output_never_reaches_outer_scope() {
        let (value, outer) = capture(async {
            let inner = suppress(async {
                crate::target_println!("noise");
                7
            })
            .await;
            crate::target_println!("after");
            inner
        })
        .await;
        assert_eq!(value, 7);
        assert_eq!(outer, "after\n");
    }

    #[tokio::test]
    async fn test_concurrent_scopes_do_not_leak() {
        let a = capture(async {
            crate::target_println!("a1");
            tokio::task::yield_now().await;
            crate::target_println!("a2");
        });
        let b = capture(async {
            crate::target_println!("b1");
            tokio::task::yield_now().await;
            crate::target_println!("b2");
        });
        let (((), a_text), ((), b_text)) = tokio::join!(a, b);
        assert_eq!(a_text, "a1\na2\n");
        assert_eq!(b_text, "b1\nb2\n");
    }

    #[tokio::test]
    async fn test_scope_released_when_future_dropped() {
        let pending = suppress(async {
            crate::target_println!("partial");
            futures::future::pending::<()>().await;
        });
        let (_, text) = capture(async move {
            tokio::select! {
                _ = pending => {}
                _ = tokio::task::yield_now() => {}
            }
            crate::target_println!("visible");
        })
        .await;
        assert_eq!(text, "visible\n");
    }

    #[cfg(target_os = "linux")]
    fn stdout_is_null_device() -> bool {
        use std::os::unix::fs::MetadataExt;
        match (std::fs::metadata("/dev/stdout"), std::fs::metadata("/dev/null")) {
            (Ok(out), Ok(null)) => out.rdev() == null.rdev() && out.ino() == null.ino(),
            _ => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_direct_writes_go_to_null_device() {
        let (on_null, diverted) = suppress(async {
            println!("plain println inside a suppressed call");
            let _ = io::stdout().write_all(b"raw bytes\n");
            (stdout_is_null_device(), is_diverted())
        })
        .await;
        assert!(on_null);
        assert!(diverted);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nested_scopes_share_the_diversion() {
        let still_diverted = suppress(async {
            suppress(async { println!("inner") }).await;
            is_diverted()
        })
        .await;
        assert!(still_diverted);
    }

    #[test]
    fn test_suppress_sync_scope() {
        assert!(!is_capturing());
        let inside = suppress_sync(|| {
            crate::target_println!("ignored");
            print!("unterminated");
            is_capturing()
        });
        assert!(inside);
        assert!(!is_capturing());
    }
}
