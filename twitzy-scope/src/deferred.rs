use log::trace;
use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
    time::Duration,
};

use crate::runtime::{Effect, Runtime, RuntimeError, TaskHandle, TaskId, TaskOutput, TaskSink};

/// A flag that lowers itself a fixed time after it was last raised, such as
/// the "copied" state of a copy-link button.
#[derive(Default)]
pub struct DeferredFlag {
    raised: Cell<bool>,
    reset: RefCell<Option<TaskHandle>>,
}

impl DeferredFlag {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn is_raised(&self) -> bool {
        self.raised.get()
    }

    /// Marks the flag as mounted for the current render pass.
    pub fn track(self: &Rc<Self>, runtime: &Runtime) {
        runtime.keep_alive(self);
    }

    /// Raises the flag and restarts its reset timer.
    pub fn raise_for(self: &Rc<Self>, runtime: &Runtime, delay: Duration) -> Result<(), RuntimeError> {
        let sink: Weak<dyn TaskSink> = {
            let sink: Rc<dyn TaskSink> = self.clone();
            Rc::downgrade(&sink)
        };
        let reset = runtime.defer(sink, delay)?;
        trace!("Flag raised for {:?}", delay);
        *self.reset.borrow_mut() = Some(reset);
        if !self.raised.replace(true) {
            runtime.invalidate();
        }
        Ok(())
    }
}

impl TaskSink for DeferredFlag {
    fn complete(&self, runtime: &Runtime, task: TaskId, output: TaskOutput) {
        let current = self.reset.borrow().as_ref().map(TaskHandle::id);
        if current != Some(task) || !matches!(output, TaskOutput::Elapsed) {
            return;
        }
        self.reset.borrow_mut().take();
        self.raised.set(false);
        runtime.invalidate();
    }
}

impl Effect for DeferredFlag {
    fn teardown(&self) {
        self.reset.borrow_mut().take();
        self.raised.set(false);
    }
}

impl fmt::Debug for DeferredFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredFlag")
            .field("raised", &self.raised.get())
            .field("reset", &self.reset.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Delivery;

    #[tokio::test(start_paused = true)]
    async fn test_lowers_after_delay() {
        let (runtime, mut queue) = Runtime::new();
        let flag = DeferredFlag::new();

        flag.raise_for(&runtime, Duration::from_secs(5)).unwrap();
        assert!(flag.is_raised());
        assert!(runtime.take_dirty());

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(queue.try_next(), None);
        assert!(flag.is_raised());

        assert!(matches!(queue.next().await, Some(Delivery::Applied(_))));
        assert!(!flag.is_raised());
        assert!(runtime.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_raise_again_restarts_timer() {
        let (runtime, mut queue) = Runtime::new();
        let flag = DeferredFlag::new();

        flag.raise_for(&runtime, Duration::from_secs(5)).unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        flag.raise_for(&runtime, Duration::from_secs(5)).unwrap();
        assert_eq!(runtime.live_tasks(), 1);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(queue.try_next(), None);
        assert!(flag.is_raised());

        queue.drain().await;
        assert!(!flag.is_raised());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_reset() {
        let (runtime, mut queue) = Runtime::new();
        let flag = DeferredFlag::new();

        runtime.begin_pass();
        flag.track(&runtime);
        flag.raise_for(&runtime, Duration::from_secs(5)).unwrap();
        runtime.end_pass();

        runtime.begin_pass();
        runtime.end_pass();

        assert!(!flag.is_raised());
        assert_eq!(runtime.live_tasks(), 0);
        assert_eq!(queue.next().await, None);
    }
}
