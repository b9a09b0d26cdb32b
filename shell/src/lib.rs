//! rtshell: an interactive command shell for a serial link.
//!
//! The shell runs as one task inside the host's scheduler. It assembles
//! bytes from a [`Transport`] into lines inside a fixed buffer, splits each
//! line on spaces, and dispatches the first word against a sorted
//! [`CommandTable`]. Nothing here allocates.
//!
//! ```text
//! Transport -> LineAssembler -> tokenize -> CommandTable::dispatch -> handler
//! ```
//!
//! There is no quoting, no line editing and no history. A command is a
//! single line of words separated by single spaces.
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod command;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod line;
pub mod sched;
pub mod shell;
pub mod tokenize;
pub mod transport;

// Host-side doubles: scripted transport + thread-backed scheduler.
#[cfg(any(test, feature = "std"))]
pub mod mock;

pub use command::{Command, CommandTable, Dispatch, Handler};
pub use config::{Config, DEFAULT_ARG_MAX, DEFAULT_LINE_MAX};
pub use error::{Diagnostic, SpawnError, TableError};
pub use lifecycle::{Lifecycle, State};
pub use shell::Shell;
pub use sched::{Scheduler, Task, TaskSpec};
pub use transport::Transport;

/// Byte that ends a command line.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Byte that separates words within a line.
pub const ARG_SEPARATOR: u8 = b' ';
