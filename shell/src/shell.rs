/// The shell: one task that reads lines from a transport and runs commands.
///
/// ```text
/// begin ──spawn──▶ task: prompt ─▶ read ─▶ line? ─▶ echo ─▶ split ─▶ dispatch ─▶ prompt
///                          ▲                                                  │
///                          └──────────────── stop requested? ◀───────────────┘
/// end ──request stop, yield until the task has exited
/// ```
///
/// The stop flag is checked between reads, never during one, so `end` can
/// wait for up to one read timeout.
use embedded_io::ErrorKind;
use spin::Mutex;

use crate::command::{CommandTable, Dispatch};
use crate::config::{Config, DEFAULT_ARG_MAX, DEFAULT_LINE_MAX};
use crate::error::{Diagnostic, Lossy, SpawnError};
use crate::lifecycle::{Lifecycle, State};
use crate::line::{Feed, LineAssembler};
use crate::sched::{Scheduler, Task};
use crate::tokenize::Tokens;
use crate::transport::{write_bytes, Transport};

/// An interactive shell bound to a command table and a scheduler.
///
/// `LINE_MAX` is the line buffer capacity in bytes (terminator included);
/// `ARG_MAX` is the maximum number of words per line. The line buffer lives
/// inside the shell, so a `static` shell keeps it off the task stack.
///
/// ```ignore
/// static SHELL: Shell<Rtos, Uart> = Shell::new(COMMANDS, Rtos, Config::new());
///
/// SHELL.begin(uart)?;
/// // ...
/// let uart = SHELL.end();
/// ```
pub struct Shell<
    S,
    T: 'static,
    const LINE_MAX: usize = DEFAULT_LINE_MAX,
    const ARG_MAX: usize = DEFAULT_ARG_MAX,
> {
    commands: CommandTable<T>,
    scheduler: S,
    config: Config,
    lifecycle: Lifecycle,
    /// Parked transport: set by `begin`, taken by the task as it starts.
    transport: Mutex<Option<T>>,
    /// Transport handed back by an exiting task, collected by `end`.
    returned: Mutex<Option<T>>,
    line: Mutex<LineAssembler<LINE_MAX>>,
}

impl<S, T, const LINE_MAX: usize, const ARG_MAX: usize> Shell<S, T, LINE_MAX, ARG_MAX> {
    const CAPACITY_CHECK: () = {
        assert!(LINE_MAX >= 2, "LINE_MAX must fit one byte and a terminator");
        assert!(ARG_MAX >= 1, "ARG_MAX must fit the command name");
    };

    pub const fn new(commands: CommandTable<T>, scheduler: S, config: Config) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;
        Self {
            commands,
            scheduler,
            config,
            lifecycle: Lifecycle::new(),
            transport: Mutex::new(None),
            returned: Mutex::new(None),
            line: Mutex::new(LineAssembler::new()),
        }
    }

    /// True from `begin` until the task has exited.
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn state(&self) -> State {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn commands(&self) -> &CommandTable<T> {
        &self.commands
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<S, T, const LINE_MAX: usize, const ARG_MAX: usize> Shell<S, T, LINE_MAX, ARG_MAX>
where
    S: Scheduler + Sync + 'static,
    T: Transport + Send + 'static,
{
    /// Start listening on `transport` in a new task.
    ///
    /// Does nothing if the shell is already running; the transport passed
    /// in is dropped. Call [`end`](Self::end) first to switch transports.
    pub fn begin(&'static self, transport: T) -> Result<(), SpawnError> {
        if !self.lifecycle.try_start() {
            log::debug!("shell: already running, begin ignored");
            return Ok(());
        }

        *self.transport.lock() = Some(transport);

        match self.scheduler.spawn(&self.config.task, self) {
            Ok(()) => {
                log::info!(
                    "shell: task '{}' spawned (stack {} bytes, priority {})",
                    self.config.task.name,
                    self.config.task.stack_size,
                    self.config.task.priority
                );
                Ok(())
            }
            Err(e) => {
                self.transport.lock().take();
                self.lifecycle.finish();
                log::warn!("shell: could not start task: {}", e);
                Err(e)
            }
        }
    }

    /// Stop the shell and wait until its task has exited.
    ///
    /// Yields to the scheduler while waiting. Returns the transport the shell
    /// was listening on, or `None` if it was not running. Must not be called
    /// from a command handler: the task would wait for itself.
    ///
    /// A `begin` racing with `end` keeps its own transport: `end` only
    /// collects what the exiting task handed back. Call `begin` and `end`
    /// from one controller so each stop is collected before the next start.
    pub fn end(&self) -> Option<T> {
        if self.lifecycle.request_stop() {
            log::debug!("shell: stop requested, waiting for task to exit");
            while self.lifecycle.is_running() {
                self.scheduler.yield_now();
            }
            log::info!("shell: task stopped");
        }
        self.collect_returned()
    }

    fn collect_returned(&self) -> Option<T> {
        self.returned.lock().take()
    }

    /// Body of the shell task.
    fn main(&self) {
        let Some(mut io) = self.transport.lock().take() else {
            log::error!("shell: task started without a transport");
            self.lifecycle.finish();
            return;
        };

        {
            let mut line = self.line.lock();
            line.clear();
            self.prompt(&mut io);
            while !self.lifecycle.stop_requested() {
                self.step(&mut io, &mut line);
            }
        }

        *self.returned.lock() = Some(io);
        self.lifecycle.finish();
    }
}

impl<S, T, const LINE_MAX: usize, const ARG_MAX: usize> Task for Shell<S, T, LINE_MAX, ARG_MAX>
where
    S: Scheduler + Sync + 'static,
    T: Transport + Send + 'static,
{
    fn run(&'static self) {
        log::debug!("shell: task running");
        self.main();
        self.scheduler.exit_current_task();
    }
}

impl<S, T: Transport, const LINE_MAX: usize, const ARG_MAX: usize> Shell<S, T, LINE_MAX, ARG_MAX> {
    fn prompt(&self, io: &mut T) {
        io.set_read_timeout(self.config.read_timeout);
        write_bytes(io, self.config.prompt.as_bytes());
    }

    /// One cycle: read once (unless a line is already buffered), then run
    /// the completed line if there is one.
    pub(crate) fn step(&self, io: &mut T, line: &mut LineAssembler<LINE_MAX>) {
        if !line.has_line() {
            let count = match io.read(line.spare_mut()) {
                Ok(count) => count,
                Err(e) => match embedded_io::Error::kind(&e) {
                    ErrorKind::TimedOut => 0,
                    kind => {
                        log::warn!("shell: read failed: {:?}", kind);
                        0
                    }
                },
            };
            match line.commit(count) {
                Feed::Pending => return,
                Feed::Overflow => {
                    log::debug!("shell: {}", Diagnostic::LineOverflow);
                    Diagnostic::LineOverflow.emit(io);
                    self.prompt(io);
                    return;
                }
                Feed::Ready => {}
            }
        }

        if let Some(text) = line.line() {
            self.execute(io, text);
        }
        line.finish_line();
        self.prompt(io);
    }

    /// Echo, split and dispatch one line.
    fn execute(&self, io: &mut T, text: &[u8]) {
        write_bytes(io, text);
        write_bytes(io, b"\n");

        let tokens = Tokens::<'_, ARG_MAX>::split(text);
        if tokens.is_truncated() {
            let diagnostic = Diagnostic::TooManyArguments {
                last: Tokens::<'_, ARG_MAX>::last_index(),
            };
            log::debug!("shell: {}", diagnostic);
            diagnostic.emit(io);
        }

        match self.commands.dispatch(tokens.argv(), io) {
            Dispatch::Ran(status) => {
                log::trace!("shell: `{}` returned {}", Lossy(tokens[0]), status);
            }
            Dispatch::Unknown => {
                let diagnostic = Diagnostic::UnknownCommand(Lossy(tokens[0]));
                log::debug!("shell: {}", diagnostic);
                diagnostic.emit(io);
            }
            Dispatch::Empty => {}
        }
    }
}
