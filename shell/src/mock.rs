/// Host-side stand-ins for the shell's collaborators.
///
/// - [`Capture`]: scripted input chunks, captured output. Single-threaded.
/// - [`Link`]: a transport fed from another thread over a channel, with a
///   real read timeout. Pairs with [`LinkHandle`] on the test side.
/// - [`ThreadScheduler`]: runs the shell task on a `std::thread`.
/// - [`logged_on_this_thread`]: per-thread record counts from a counting
///   logger.
///
/// Compiled for tests and with the `std` feature.
use core::cell::RefCell;
use core::convert::Infallible;
use core::time::Duration;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;
use std::vec::Vec;

use crate::error::SpawnError;
use crate::sched::{Scheduler, Task, TaskSpec};
use crate::transport::Transport;

/// Copy as much of `pending` as fits into `buf`, keeping the rest.
fn drain_into(pending: &mut Vec<u8>, buf: &mut [u8]) -> usize {
    let count = pending.len().min(buf.len());
    buf[..count].copy_from_slice(&pending[..count]);
    pending.drain(..count);
    count
}

// ---- Capture ----

/// Transport that replays queued input chunks and records everything
/// written. Each queued chunk is delivered by its own read (split further if
/// the reader's buffer is smaller). With nothing queued, reads return 0.
#[derive(Debug, Default)]
pub struct Capture {
    input: VecDeque<Vec<u8>>,
    output: Vec<u8>,
    timeouts: Vec<Duration>,
    reads: usize,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capture whose reads deliver `chunks` in order.
    pub fn with_input<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut capture = Self::new();
        for chunk in chunks {
            capture.queue(chunk);
        }
        capture
    }

    pub fn queue(&mut self, chunk: &[u8]) {
        self.input.push_back(chunk.to_vec());
    }

    /// True while queued input remains.
    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    /// Append to the output, as a handler writing to the transport would.
    pub fn push(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn output_str(&self) -> &str {
        core::str::from_utf8(&self.output).unwrap_or("<non-utf8 output>")
    }

    /// Every timeout passed to `set_read_timeout`, oldest first.
    pub fn timeouts(&self) -> &[Duration] {
        &self.timeouts
    }

    /// Number of `read` calls made so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl embedded_io::ErrorType for Capture {
    type Error = Infallible;
}

impl embedded_io::Read for Capture {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.reads += 1;
        let Some(chunk) = self.input.front_mut() else {
            return Ok(0);
        };
        let count = drain_into(chunk, buf);
        if chunk.is_empty() {
            self.input.pop_front();
        }
        Ok(count)
    }
}

impl embedded_io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Transport for Capture {
    fn set_read_timeout(&mut self, timeout: Duration) {
        self.timeouts.push(timeout);
    }
}

// ---- Link ----

/// Transport end of a channel-backed serial link.
///
/// `read` blocks for up to the configured timeout waiting for a chunk sent
/// through the [`LinkHandle`], like a UART read with a timeout.
pub struct Link {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    output: Arc<Mutex<Vec<u8>>>,
    timeout: Duration,
    reads: Arc<AtomicUsize>,
}

/// Test side of a [`Link`]: type input, watch output.
#[derive(Clone)]
pub struct LinkHandle {
    tx: Sender<Vec<u8>>,
    output: Arc<Mutex<Vec<u8>>>,
    reads: Arc<AtomicUsize>,
}

impl Link {
    pub fn pair() -> (Link, LinkHandle) {
        let (tx, rx) = mpsc::channel();
        let output = Arc::new(Mutex::new(Vec::new()));
        let reads = Arc::new(AtomicUsize::new(0));
        let link = Link {
            rx,
            pending: Vec::new(),
            output: Arc::clone(&output),
            timeout: Duration::from_millis(20),
            reads: Arc::clone(&reads),
        };
        (link, LinkHandle { tx, output, reads })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl LinkHandle {
    /// Deliver `bytes` to the next read. Ignored once the link is dropped.
    pub fn send(&self, bytes: &[u8]) {
        let _ = self.tx.send(bytes.to_vec());
    }

    pub fn output(&self) -> Vec<u8> {
        self.output.lock().map(|out| out.clone()).unwrap_or_default()
    }

    /// Reads that have returned so far, including timeouts.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Acquire)
    }

    /// Poll the output until it contains `needle` `times` times or
    /// `deadline` passes. Returns whether it got there.
    pub fn wait_for_count(&self, needle: &[u8], times: usize, deadline: Duration) -> bool {
        let start = Instant::now();
        loop {
            if count_occurrences(&self.output(), needle) >= times {
                return true;
            }
            if start.elapsed() > deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn wait_for(&self, needle: &[u8], deadline: Duration) -> bool {
        self.wait_for_count(needle, 1, deadline)
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut at = 0;
    while at + needle.len() <= haystack.len() {
        if &haystack[at..at + needle.len()] == needle {
            count += 1;
            at += needle.len();
        } else {
            at += 1;
        }
    }
    count
}

impl embedded_io::ErrorType for Link {
    type Error = Infallible;
}

impl embedded_io::Read for Link {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(self.timeout) {
                Ok(chunk) => self.pending = chunk,
                Err(RecvTimeoutError::Timeout) => {}
                // Sender gone: behave like an idle line.
                Err(RecvTimeoutError::Disconnected) => thread::sleep(self.timeout),
            }
        }
        let count = drain_into(&mut self.pending, buf);
        self.reads.fetch_add(1, Ordering::AcqRel);
        Ok(count)
    }
}

impl embedded_io::Write for Link {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if let Ok(mut out) = self.output.lock() {
            out.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Transport for Link {
    fn set_read_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

// ---- ThreadScheduler ----

/// Runs each task on its own `std::thread`.
#[derive(Debug, Default)]
pub struct ThreadScheduler {
    spawned: AtomicUsize,
    yields: AtomicUsize,
}

/// Host threads need far more stack than an RTOS task.
const MIN_HOST_STACK: usize = 256 * 1024;

impl ThreadScheduler {
    pub const fn new() -> Self {
        Self {
            spawned: AtomicUsize::new(0),
            yields: AtomicUsize::new(0),
        }
    }

    /// Tasks started so far.
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::Acquire)
    }

    /// Calls to `yield_now` so far.
    pub fn yields(&self) -> usize {
        self.yields.load(Ordering::Acquire)
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn(&self, spec: &TaskSpec, task: &'static dyn Task) -> Result<(), SpawnError> {
        thread::Builder::new()
            .name(spec.name.into())
            .stack_size(spec.stack_size.max(MIN_HOST_STACK))
            .spawn(move || task.run())
            .map_err(|_| SpawnError::OutOfResources)?;
        self.spawned.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn yield_now(&self) {
        self.yields.fetch_add(1, Ordering::Relaxed);
        thread::yield_now();
    }

    // The thread ends when `Task::run` returns.
    fn exit_current_task(&self) {}
}

// ---- Log counting ----

std::thread_local! {
    static LOGGED: RefCell<[usize; 5]> = const { RefCell::new([0; 5]) };
}

/// Logger that counts records per level, separately for each thread, so
/// tests running in parallel do not see each other's records.
struct ThreadLogCounter;

impl log::Log for ThreadLogCounter {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let slot = record.level() as usize - 1;
        LOGGED.with(|counts| counts.borrow_mut()[slot] += 1);
    }

    fn flush(&self) {}
}

static LOG_COUNTER: ThreadLogCounter = ThreadLogCounter;

/// Records logged at `level` on the calling thread so far.
///
/// Installs the counting logger on first use.
pub fn logged_on_this_thread(level: log::Level) -> usize {
    let _ = log::set_logger(&LOG_COUNTER);
    log::set_max_level(log::LevelFilter::Trace);
    LOGGED.with(|counts| counts.borrow()[level as usize - 1])
}
