//! # Signal-Safe Diagnostics
//!
//! The pager logs from inside `SIGSEGV` and `SIGALRM` handlers. Almost nothing
//! in `std::io` is safe to call there: `eprintln!` takes a reentrant lock on
//! stderr and may allocate. This crate routes output straight to `write(2)`
//! on a raw file descriptor, which POSIX lists as async-signal-safe.
//!
//! ## Output Mechanism
//! ```text
//! log::info!() / uvm_trace!()
//!     ↓
//! StderrLogger (log::Log)
//!     ↓
//! LineBuffer (fmt::Write, fixed stack buffer)
//!     ↓
//! write(2) → fd 2
//! ```
//!
//! ## Components
//!
//! * [`StderrLogger`]: a `log::Log` backend with a level threshold, formatted
//!   as `[LEVEL] target: message`. Installed once per process.
//! * [`uvm_trace!`]: unconditional, framework-free output for the few places
//!   that must print regardless of the configured level (final reports,
//!   fatal invariant breaks right before `abort`).
//! * [`sink::FdSink`]: the `fmt::Write` implementation behind both.
//!
//! ## Feature System
//!
//! With the default `enabled` feature the sink writes to the descriptor.
//! Without it, [`uvm_trace!`] and the logger compile to no-ops.
//!
//! ## Usage
//! ```rust,no_run
//! use log::{LevelFilter, info};
//! use uvm_log::StderrLogger;
//!
//! StderrLogger::from_env(LevelFilter::Info)
//!     .init()
//!     .expect("logger initialization");
//! info!("pager ready");
//! ```

#![allow(unsafe_code)]

mod logger;

pub use logger::{LOG_LEVEL_ENV, StderrLogger};

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod sink {
    use core::fmt::{self, Write};

    /// Descriptor for standard error.
    pub const STDERR_FD: libc::c_int = 2;

    /// Bytes collected before a `write(2)` is issued.
    const LINE_CAPACITY: usize = 256;

    /// Unbuffered writer over a raw file descriptor.
    #[derive(Debug, Clone, Copy)]
    pub struct FdSink {
        fd: libc::c_int,
    }

    impl FdSink {
        #[must_use]
        pub const fn new(fd: libc::c_int) -> Self {
            Self { fd }
        }

        #[must_use]
        pub const fn stderr() -> Self {
            Self::new(STDERR_FD)
        }

        /// Writes all of `bytes`, retrying on short writes and `EINTR`.
        pub fn write_bytes(self, mut bytes: &[u8]) -> fmt::Result {
            while !bytes.is_empty() {
                // SAFETY: the pointer/length pair comes from a live slice.
                let n = unsafe { libc::write(self.fd, bytes.as_ptr().cast(), bytes.len()) };
                if n < 0 {
                    if std::io::Error::last_os_error().raw_os_error() == Some(libc::EINTR) {
                        continue;
                    }
                    return Err(fmt::Error);
                }
                let written = usize::try_from(n).map_err(|_| fmt::Error)?;
                bytes = &bytes[written..];
            }
            Ok(())
        }
    }

    impl Write for FdSink {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.write_bytes(s.as_bytes())
        }
    }

    /// Collects formatted output on the stack so that a short line reaches
    /// the descriptor in a single `write(2)`.
    pub struct LineBuffer {
        sink: FdSink,
        buf: [u8; LINE_CAPACITY],
        len: usize,
    }

    impl LineBuffer {
        #[must_use]
        pub const fn new(sink: FdSink) -> Self {
            Self {
                sink,
                buf: [0; LINE_CAPACITY],
                len: 0,
            }
        }

        /// Emits everything buffered so far.
        pub fn flush(&mut self) -> fmt::Result {
            let pending = self.len;
            self.len = 0;
            self.sink.write_bytes(&self.buf[..pending])
        }
    }

    impl Write for LineBuffer {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let bytes = s.as_bytes();
            if self.len + bytes.len() > LINE_CAPACITY {
                self.flush()?;
                if bytes.len() > LINE_CAPACITY {
                    return self.sink.write_bytes(bytes);
                }
            }
            self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
            self.len += bytes.len();
            Ok(())
        }
    }

    /// Formats `args` into `sink` through a line buffer.
    pub fn write_to(sink: FdSink, args: fmt::Arguments) -> fmt::Result {
        let mut line = LineBuffer::new(sink);
        fmt::write(&mut line, args)?;
        line.flush()
    }

    #[doc(hidden)]
    #[inline]
    pub fn trace_write(args: fmt::Arguments) {
        // Best-effort: there is nowhere left to report a failed stderr write.
        let _ = write_to(FdSink::stderr(), args);
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod sink {
    use core::fmt;

    #[doc(hidden)]
    #[inline]
    pub fn trace_write(_: fmt::Arguments) {}
}

/// Writes formatted output to stderr without going through `log`.
///
/// Safe to use inside signal handlers: nothing is allocated and no lock is
/// taken.
#[macro_export]
macro_rules! uvm_trace {
    ($($arg:tt)*) => {{
        $crate::sink::trace_write(core::format_args!($($arg)*));
    }};
}

#[cfg(all(test, feature = "enabled"))]
mod tests {
    use super::sink::{FdSink, write_to};

    fn pipe() -> (libc::c_int, libc::c_int) {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        (fds[0], fds[1])
    }

    fn drain(fd: libc::c_int) -> String {
        let mut buf = vec![0u8; 4096];
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        buf.truncate(usize::try_from(n).unwrap());
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn formatted_line_reaches_descriptor() {
        let (r, w) = pipe();
        write_to(FdSink::new(w), format_args!("page {} evicted\n", 17)).unwrap();
        assert_eq!(drain(r), "page 17 evicted\n");
        unsafe {
            libc::close(r);
            libc::close(w);
        }
    }

    #[test]
    fn overlong_output_is_not_truncated() {
        let (r, w) = pipe();
        let long = "x".repeat(700);
        write_to(FdSink::new(w), format_args!("<{long}>")).unwrap();
        let got = drain(r);
        assert_eq!(got.len(), 702);
        assert!(got.starts_with("<x") && got.ends_with("x>"));
        unsafe {
            libc::close(r);
            libc::close(w);
        }
    }

    #[test]
    fn bad_descriptor_reports_error() {
        assert!(write_to(FdSink::new(-1), format_args!("lost")).is_err());
    }
}
