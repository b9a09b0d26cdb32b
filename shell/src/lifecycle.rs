/// Start/stop state shared between the controlling task and the shell task.
///
/// The whole state is one atomic byte holding two flags:
///
/// - `RUNNING`: set by `begin` when it claims the shell, cleared by the shell
///   task as it exits.
/// - `STOP_REQUESTED`: set by `end`, only while `RUNNING` is set. Cleared by
///   the shell task together with `RUNNING`.
///
/// Idle = no flags. Starting/Running = `RUNNING`. Stopping = both.
use core::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct State: u8 {
        const RUNNING = 1 << 0;
        const STOP_REQUESTED = 1 << 1;
    }
}

pub struct Lifecycle {
    bits: AtomicU8,
}

static_assertions::assert_impl_all!(Lifecycle: Send, Sync);

impl Lifecycle {
    pub const fn new() -> Self {
        Self { bits: AtomicU8::new(0) }
    }

    pub fn state(&self) -> State {
        State::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state().contains(State::RUNNING)
    }

    pub fn stop_requested(&self) -> bool {
        self.state().contains(State::STOP_REQUESTED)
    }

    /// Idle -> Starting. Returns false if the shell is not idle.
    pub fn try_start(&self) -> bool {
        self.bits
            .compare_exchange(
                State::empty().bits(),
                State::RUNNING.bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Running -> Stopping. Returns false if the shell was not running, in
    /// which case nothing is recorded.
    pub fn request_stop(&self) -> bool {
        self.bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let state = State::from_bits_truncate(bits);
                state
                    .contains(State::RUNNING)
                    .then(|| (state | State::STOP_REQUESTED).bits())
            })
            .is_ok()
    }

    /// Any state -> Idle. Called by the shell task on its way out, or by
    /// `begin` when the scheduler refused to start the task.
    pub fn finish(&self) {
        self.bits.store(State::empty().bits(), Ordering::Release);
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let lc = Lifecycle::new();
        assert_eq!(lc.state(), State::empty());
        assert!(!lc.is_running());
        assert!(!lc.stop_requested());
    }

    #[test]
    fn start_is_claimed_once() {
        let lc = Lifecycle::new();
        assert!(lc.try_start());
        assert!(!lc.try_start());
        assert!(lc.is_running());
    }

    #[test]
    fn stop_then_finish_returns_to_idle() {
        let lc = Lifecycle::new();
        assert!(lc.try_start());
        assert!(lc.request_stop());
        assert_eq!(lc.state(), State::RUNNING | State::STOP_REQUESTED);

        // Cannot restart while stopping.
        assert!(!lc.try_start());

        lc.finish();
        assert_eq!(lc.state(), State::empty());
        assert!(lc.try_start());
    }

    #[test]
    fn stop_while_idle_leaves_no_trace() {
        let lc = Lifecycle::new();
        assert!(!lc.request_stop());
        assert!(!lc.stop_requested());
        assert!(lc.try_start());
        assert!(!lc.stop_requested());
    }
}
