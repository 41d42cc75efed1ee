//! Drives sub-menu hover grace deadlines on the tokio clock.

use std::sync::Mutex;
use std::time::Instant;

use hinge::Disclosure;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

struct Armed {
    deadline: Instant,
    task: JoinHandle<()>,
}

/// Fires [`Disclosure::poll`] when the earliest pending hover-exit deadline
/// in a disclosure tree comes due.
///
/// At most one task is armed at a time. Re-arming for a different deadline
/// or calling [`GraceTimer::cancel`] aborts the previous task, as does
/// dropping the timer.
#[derive(Default)]
pub struct GraceTimer {
    armed: Mutex<Option<Armed>>,
}

impl GraceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a poll of `root` at its next deadline.
    ///
    /// Cancels any armed task when `root` has nothing pending. Returns true
    /// while a task is armed. Without a tokio runtime nothing is scheduled
    /// and the host has to call [`Disclosure::poll`] itself.
    pub fn arm(&self, root: &Disclosure) -> bool {
        let Some(deadline) = root.next_deadline() else {
            self.cancel();
            return false;
        };

        let Ok(mut armed) = self.armed.lock() else {
            return false;
        };
        if let Some(current) = armed.as_ref()
            && current.deadline == deadline
            && !current.task.is_finished()
        {
            return true;
        }
        if let Some(previous) = armed.take() {
            previous.task.abort();
        }

        let Ok(runtime) = Handle::try_current() else {
            log::warn!(
                "GraceTimer: no tokio runtime, disclosure {} must be polled by the host",
                root.id()
            );
            return false;
        };

        let root = root.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            if root.poll(tokio::time::Instant::now().into_std()) {
                log::debug!("GraceTimer: hover grace elapsed for {}", root.id());
            }
        });
        *armed = Some(Armed { deadline, task });
        true
    }

    /// Abort the armed task. Returns whether one was armed.
    pub fn cancel(&self) -> bool {
        let Ok(mut armed) = self.armed.lock() else {
            return false;
        };
        match armed.take() {
            Some(previous) => {
                previous.task.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a task is armed and has not fired yet.
    pub fn is_armed(&self) -> bool {
        self.armed
            .lock()
            .map(|armed| armed.as_ref().is_some_and(|a| !a.task.is_finished()))
            .unwrap_or(false)
    }

    /// The deadline of the armed task.
    pub fn deadline(&self) -> Option<Instant> {
        self.armed
            .lock()
            .ok()
            .and_then(|armed| armed.as_ref().map(|a| a.deadline))
    }
}

impl Drop for GraceTimer {
    fn drop(&mut self) {
        if let Ok(mut armed) = self.armed.lock()
            && let Some(previous) = armed.take()
        {
            previous.task.abort();
        }
    }
}

impl std::fmt::Debug for GraceTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraceTimer")
            .field("deadline", &self.deadline())
            .finish()
    }
}
