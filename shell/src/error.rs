/// Error and diagnostic types.
///
/// `TableError` and `SpawnError` are returned to the embedding application.
/// `Diagnostic` covers everything that goes wrong inside the loop; those are
/// reported over the transport and never propagated.
use core::fmt;

use thiserror::Error;

/// Reasons a command list cannot become a [`crate::CommandTable`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    #[error("command at index {index} has an empty name")]
    EmptyName { index: usize },

    /// Also reported for duplicates: order must be strictly increasing.
    #[error("command `{name}` at index {index} is not in dictionary order")]
    OutOfOrder { index: usize, name: &'static str },

    #[error("command list has no sentinel entry with an empty name")]
    MissingSentinel,
}

/// Reasons the scheduler could not start the shell task.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    #[error("scheduler could not allocate a task")]
    OutOfResources,

    #[error("scheduler rejected the task: {0}")]
    Rejected(&'static str),
}

/// Non-fatal conditions reported to the user while the loop runs.
///
/// `Display` gives the message text for logging; [`Diagnostic::emit`]
/// writes the exact line the user sees.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    #[error("Command line too long; discarding")]
    LineOverflow,

    /// `last` is the index of the last argument that was kept.
    #[error("Too many arguments; discarding arguments after #{last}")]
    TooManyArguments { last: usize },

    #[error("No such command: {0}")]
    UnknownCommand(Lossy<'a>),
}

impl Diagnostic<'_> {
    /// Write this diagnostic to the user. Tokens are written verbatim.
    pub fn emit<W: embedded_io::Write>(&self, out: &mut W) {
        match self {
            Diagnostic::LineOverflow => {
                crate::shell_print!(out, "\nshell: {}\n", self);
            }
            Diagnostic::TooManyArguments { .. } => {
                crate::shell_print!(out, "{}\n", self);
            }
            Diagnostic::UnknownCommand(Lossy(token)) => {
                crate::transport::write_bytes(out, b"shell: No such command: ");
                crate::transport::write_bytes(out, token);
                crate::transport::write_bytes(out, b"\n");
            }
        }
    }
}

/// Displays bytes as UTF-8, substituting U+FFFD for invalid sequences.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Lossy<'a>(pub &'a [u8]);

impl fmt::Display for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Capture;
    use std::string::ToString;

    #[test]
    fn diagnostic_text() {
        assert_eq!(
            Diagnostic::LineOverflow.to_string(),
            "Command line too long; discarding"
        );
        assert_eq!(
            Diagnostic::TooManyArguments { last: 31 }.to_string(),
            "Too many arguments; discarding arguments after #31"
        );
        assert_eq!(
            Diagnostic::UnknownCommand(Lossy(b"foo")).to_string(),
            "No such command: foo"
        );
    }

    #[test]
    fn emit_writes_protocol_lines() {
        let mut out = Capture::new();
        Diagnostic::LineOverflow.emit(&mut out);
        Diagnostic::TooManyArguments { last: 3 }.emit(&mut out);
        Diagnostic::UnknownCommand(Lossy(b"frob\xff")).emit(&mut out);

        assert_eq!(
            out.output(),
            b"\nshell: Command line too long; discarding\n\
              Too many arguments; discarding arguments after #3\n\
              shell: No such command: frob\xff\n"
        );
    }

    #[test]
    fn lossy_replaces_invalid_utf8() {
        assert_eq!(Lossy(b"ab\xffcd").to_string(), "ab\u{FFFD}cd");
        assert_eq!(Lossy(b"").to_string(), "");
    }

    #[test]
    fn table_error_names_the_entry() {
        let err = TableError::OutOfOrder { index: 2, name: "echo" };
        assert_eq!(
            err.to_string(),
            "command `echo` at index 2 is not in dictionary order"
        );
    }
}
