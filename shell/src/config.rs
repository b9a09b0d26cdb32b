/// Shell configuration.
///
/// Buffer capacities are compile-time const generics on [`crate::Shell`];
/// everything that can change per instance lives in [`Config`].
use core::time::Duration;

use crate::sched::TaskSpec;

/// Default line buffer capacity in bytes, terminator included.
pub const DEFAULT_LINE_MAX: usize = 2048;

/// Default maximum number of words per command line.
pub const DEFAULT_ARG_MAX: usize = 32;

/// Text written whenever the shell is ready for a new line.
pub const DEFAULT_PROMPT: &str = "shell> ";

/// Upper bound on a single blocking read. Also bounds how long `end` waits.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(20);

pub const DEFAULT_TASK_NAME: &str = "shell";
pub const DEFAULT_STACK_SIZE: usize = 4096;
pub const DEFAULT_PRIORITY: u8 = 1;

// A line needs at least one content byte plus its terminator.
static_assertions::const_assert!(DEFAULT_LINE_MAX >= 2);
static_assertions::const_assert!(DEFAULT_ARG_MAX >= 1);
static_assertions::const_assert!(!DEFAULT_PROMPT.is_empty());

/// Per-instance settings for a [`crate::Shell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub prompt: &'static str,
    pub read_timeout: Duration,
    pub task: TaskSpec,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            prompt: DEFAULT_PROMPT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            task: TaskSpec {
                name: DEFAULT_TASK_NAME,
                stack_size: DEFAULT_STACK_SIZE,
                priority: DEFAULT_PRIORITY,
            },
        }
    }

    pub const fn with_prompt(mut self, prompt: &'static str) -> Self {
        self.prompt = prompt;
        self
    }

    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub const fn with_task(mut self, task: TaskSpec) -> Self {
        self.task = task;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
