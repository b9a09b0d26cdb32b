/// Scheduler seam.
///
/// The shell never creates threads itself. The embedding application hands
/// it a [`Scheduler`] that knows how to start a task on the target RTOS
/// (a FreeRTOS `xTaskCreate`, a kernel thread, a host `std::thread`).
use crate::error::SpawnError;

/// Parameters for the task that runs the shell loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    /// Stack size in bytes. The line buffer does not live on this stack.
    pub stack_size: usize,
    pub priority: u8,
}

/// Body of a scheduled task.
///
/// `run` borrows `'static` because the task can outlive the call that
/// spawned it.
pub trait Task: Sync {
    fn run(&'static self);
}

/// The operations the shell consumes from the host scheduler.
pub trait Scheduler {
    /// Start `task` as a new concurrent task. Returns once the task is
    /// scheduled, not once it has run.
    fn spawn(&self, spec: &TaskSpec, task: &'static dyn Task) -> Result<(), SpawnError>;

    /// Give up the remainder of the caller's time slice.
    fn yield_now(&self);

    /// Tear down the calling task's scheduling context.
    ///
    /// Called by the shell task as its last action. On an RTOS this does not
    /// return. Hosts where a task ends by returning from its entry point may
    /// implement it as a no-op.
    fn exit_current_task(&self);
}
