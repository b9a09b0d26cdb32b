/// Character-stream transport consumed by the shell.
///
/// Input: blocking reads bounded by a timeout, via `embedded_io::Read`.
/// Output: prompt, echo and diagnostics, via `embedded_io::Write`.
use core::fmt;
use core::time::Duration;

/// A byte stream the shell can listen on, e.g. a UART.
///
/// `read` blocks for at most the last timeout passed to
/// [`Transport::set_read_timeout`]. A read that times out may return either
/// `Ok(0)` or an error whose kind is `ErrorKind::TimedOut`; the shell treats
/// both as an idle cycle and reads again without logging. Any other error is
/// logged at warn level and also treated as an empty read.
pub trait Transport: embedded_io::Read + embedded_io::Write {
    fn set_read_timeout(&mut self, timeout: Duration);
}

/// Write raw bytes, ignoring transport errors. Shell output is best effort.
pub fn write_bytes<W: embedded_io::Write>(out: &mut W, bytes: &[u8]) {
    if let Err(e) = out.write_all(bytes) {
        log::trace!("shell write dropped: {:?}", embedded_io::Error::kind(&e));
    }
}

/// Formatted write, ignoring transport errors. Used by [`shell_print!`].
pub fn write_fmt<W: embedded_io::Write>(out: &mut W, args: fmt::Arguments<'_>) {
    let mut adapter = FmtAdapter { out, failed: None };
    let written = fmt::Write::write_fmt(&mut adapter, args);
    if let (Err(_), Some(kind)) = (written, adapter.failed) {
        log::trace!("shell write dropped: {:?}", kind);
    }
}

/// Bridges `core::fmt::Write` onto an `embedded_io::Write`, keeping the
/// kind of the first transport error.
struct FmtAdapter<'a, W> {
    out: &'a mut W,
    failed: Option<embedded_io::ErrorKind>,
}

impl<W: embedded_io::Write> fmt::Write for FmtAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_all(s.as_bytes()).map_err(|e| {
            self.failed.get_or_insert(embedded_io::Error::kind(&e));
            fmt::Error
        })
    }
}

/// Print to a transport.
#[macro_export]
macro_rules! shell_print {
    ($out:expr, $($arg:tt)*) => {
        $crate::transport::write_fmt($out, format_args!($($arg)*))
    };
}

/// Print to a transport with a newline.
#[macro_export]
macro_rules! shell_println {
    ($out:expr) => ($crate::transport::write_bytes($out, b"\n"));
    ($out:expr, $($arg:tt)*) => {
        $crate::shell_print!($out, "{}\n", format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{logged_on_this_thread, Capture};

    #[derive(Debug, thiserror::Error)]
    #[error("transmitter jammed")]
    struct Jammed;

    impl embedded_io::Error for Jammed {
        fn kind(&self) -> embedded_io::ErrorKind {
            embedded_io::ErrorKind::Other
        }
    }

    /// Port whose every write fails.
    struct JammedPort;

    impl embedded_io::ErrorType for JammedPort {
        type Error = Jammed;
    }

    impl embedded_io::Write for JammedPort {
        fn write(&mut self, _buf: &[u8]) -> Result<usize, Jammed> {
            Err(Jammed)
        }

        fn flush(&mut self) -> Result<(), Jammed> {
            Ok(())
        }
    }

    #[test]
    fn dropped_writes_are_traced_on_both_paths() {
        let before = logged_on_this_thread(log::Level::Trace);
        write_bytes(&mut JammedPort, b"ls\n");
        crate::shell_println!(&mut JammedPort, "argc={}", 3);
        assert_eq!(logged_on_this_thread(log::Level::Trace), before + 2);
    }

    #[test]
    fn print_macros_format_into_transport() {
        let mut out = Capture::new();
        crate::shell_print!(&mut out, "{}> ", "shell");
        crate::shell_println!(&mut out, "argc={}", 3);
        crate::shell_println!(&mut out);
        assert_eq!(out.output(), b"shell> argc=3\n\n");
    }
}
