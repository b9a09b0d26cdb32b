/// Command table and dispatch.
///
/// The embedding application supplies its commands as a `'static` slice,
/// sorted by name. The table is validated once when it is built, then
/// searched by binary search on every line.
use core::fmt;

use crate::error::TableError;

/// Entry point of a command.
///
/// `argv[0]` is the command name; `argv.len()` is the argument count.
/// `io` is the transport the shell is listening on: write output there and
/// read further input from it if needed. The returned status is logged and
/// otherwise ignored.
pub type Handler<T> = fn(argv: &[&[u8]], io: &mut T) -> i32;

/// A named command.
///
/// Any byte other than a space or newline may appear in a name, but
/// non-ASCII names are best avoided on serial terminals.
pub struct Command<T> {
    pub name: &'static str,
    pub handler: Handler<T>,
}

impl<T> Command<T> {
    pub const fn new(name: &'static str, handler: Handler<T>) -> Self {
        Self { name, handler }
    }

    /// The entry that ends a list passed to [`CommandTable::from_sentinel`].
    pub const fn sentinel() -> Self {
        Self { name: "", handler: sentinel_handler::<T> }
    }

    pub const fn is_sentinel(&self) -> bool {
        self.name.is_empty()
    }
}

fn sentinel_handler<T>(_argv: &[&[u8]], _io: &mut T) -> i32 {
    0
}

// Manual impls: a derive would demand `T: Clone`.
impl<T> Clone for Command<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Command<T> {}

impl<T> fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Result of [`CommandTable::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler ran and returned this status.
    Ran(i32),
    /// No command is named `argv[0]`.
    Unknown,
    /// `argv` was empty; nothing ran.
    Empty,
}

/// A fixed, sorted set of commands.
pub struct CommandTable<T: 'static> {
    commands: &'static [Command<T>],
}

impl<T> CommandTable<T> {
    /// Build a table from every entry of `commands`.
    ///
    /// Names must be non-empty and in strictly increasing byte order.
    pub const fn new(commands: &'static [Command<T>]) -> Result<Self, TableError> {
        let mut index = 0;
        while index < commands.len() {
            let name = commands[index].name;
            if name.is_empty() {
                return Err(TableError::EmptyName { index });
            }
            if index > 0 && !precedes(commands[index - 1].name.as_bytes(), name.as_bytes()) {
                return Err(TableError::OutOfOrder { index, name });
            }
            index += 1;
        }
        Ok(Self { commands })
    }

    /// Build a table from the entries before the first sentinel (an entry
    /// with an empty name). Entries after the sentinel are ignored.
    pub const fn from_sentinel(commands: &'static [Command<T>]) -> Result<Self, TableError> {
        let mut count = 0;
        while count < commands.len() {
            if commands[count].is_sentinel() {
                let (listed, _) = commands.split_at(count);
                return Self::new(listed);
            }
            count += 1;
        }
        Err(TableError::MissingSentinel)
    }

    /// Find the command called `name`.
    pub fn lookup(&self, name: &[u8]) -> Option<&Command<T>> {
        self.commands
            .binary_search_by(|command| command.name.as_bytes().cmp(name))
            .ok()
            .map(|index| &self.commands[index])
    }

    /// Run the command named by `argv[0]`.
    pub fn dispatch(&self, argv: &[&[u8]], io: &mut T) -> Dispatch {
        let Some(name) = argv.first() else {
            return Dispatch::Empty;
        };
        match self.lookup(name) {
            Some(command) => Dispatch::Ran((command.handler)(argv, io)),
            None => Dispatch::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in name order, e.g. for a `help` listing.
    pub fn iter(&self) -> core::slice::Iter<'static, Command<T>> {
        self.commands.iter()
    }
}

impl<T> Clone for CommandTable<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CommandTable<T> {}

impl<T> fmt::Debug for CommandTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.commands.iter().map(|c| c.name)).finish()
    }
}

/// Strict byte-wise dictionary order: `a < b`.
const fn precedes(a: &[u8], b: &[u8]) -> bool {
    let mut i = 0;
    while i < a.len() && i < b.len() {
        if a[i] != b[i] {
            return a[i] < b[i];
        }
        i += 1;
    }
    a.len() < b.len()
}
