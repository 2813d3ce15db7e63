// Task outputs are routed by id. Once a handle is dropped its queued output is stale.

use log::{trace, warn};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    future::Future,
    rc::{Rc, Weak},
    time::Duration,
};
use thiserror::Error as ThisError;
use tokio::{
    runtime::{Handle, TryCurrentError},
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use crate::avatar::{AvatarProbeError, ImageProbe, UnreachableImageProbe};

#[derive(Debug, ThisError)]
pub enum RuntimeError {
    #[error("No tokio executor to spawn task on: {0}")]
    NoExecutor(#[from] TryCurrentError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
pub enum TaskOutput {
    Probe(Result<(), AvatarProbeError>),
    Elapsed,
}

pub trait TaskSink {
    fn complete(&self, runtime: &Runtime, task: TaskId, output: TaskOutput);
}

pub trait Effect {
    fn teardown(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Applied(TaskId),
    Stale(TaskId),
}

type Message = (TaskId, TaskOutput);

struct Tracked {
    effect: Weak<dyn Effect>,
    seen: u64,
}

struct RuntimeInner {
    dirty: Cell<bool>,
    epoch: Cell<u64>,
    next_task: Cell<u64>,
    sinks: RefCell<HashMap<TaskId, Weak<dyn TaskSink>>>,
    effects: RefCell<HashMap<usize, Tracked>>,
    subscribers: RefCell<Vec<Rc<dyn Fn()>>>,
    image_probe: RefCell<Rc<dyn ImageProbe>>,
    sender: UnboundedSender<Message>,
}

#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new() -> (Runtime, UpdateQueue) {
        let (sender, receiver) = unbounded_channel();
        let runtime = Runtime {
            inner: Rc::new(RuntimeInner {
                dirty: Cell::new(false),
                epoch: Cell::new(0),
                next_task: Cell::new(0),
                sinks: RefCell::new(HashMap::new()),
                effects: RefCell::new(HashMap::new()),
                subscribers: RefCell::new(Vec::new()),
                image_probe: RefCell::new(Rc::new(UnreachableImageProbe)),
                sender,
            }),
        };
        let queue = UpdateQueue {
            receiver,
            runtime: runtime.clone(),
        };
        (runtime, queue)
    }

    pub fn set_image_probe(&self, probe: Rc<dyn ImageProbe>) {
        *self.inner.image_probe.borrow_mut() = probe;
    }

    pub fn image_probe(&self) -> Rc<dyn ImageProbe> {
        self.inner.image_probe.borrow().clone()
    }

    // invalidation

    pub fn invalidate(&self) {
        self.inner.dirty.set(true);
        let subscribers = self.inner.subscribers.borrow().clone();
        for subscriber in subscribers {
            subscriber();
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    pub fn take_dirty(&self) -> bool {
        self.inner.dirty.replace(false)
    }

    pub fn subscribe(&self, subscriber: impl Fn() + 'static) {
        self.inner.subscribers.borrow_mut().push(Rc::new(subscriber));
    }

    // render passes and effects

    pub fn begin_pass(&self) -> u64 {
        let epoch = self.inner.epoch.get() + 1;
        self.inner.epoch.set(epoch);
        self.inner.dirty.set(false);
        epoch
    }

    pub fn keep_alive<E: Effect + 'static>(&self, effect: &Rc<E>) {
        let key = Rc::as_ptr(effect) as *const () as usize;
        let epoch = self.inner.epoch.get();
        let mut effects = self.inner.effects.borrow_mut();
        match effects.get_mut(&key) {
            Some(tracked) => tracked.seen = epoch,
            None => {
                let weak: Weak<E> = Rc::downgrade(effect);
                let weak: Weak<dyn Effect> = weak;
                effects.insert(
                    key,
                    Tracked {
                        effect: weak,
                        seen: epoch,
                    },
                );
            }
        }
    }

    /// Tears down every effect that was not kept alive during this pass.
    pub fn end_pass(&self) {
        let epoch = self.inner.epoch.get();
        let unmounted: Vec<Weak<dyn Effect>> = {
            let mut effects = self.inner.effects.borrow_mut();
            let stale: Vec<usize> = effects
                .iter()
                .filter(|(_, tracked)| tracked.seen != epoch)
                .map(|(key, _)| *key)
                .collect();
            stale
                .into_iter()
                .filter_map(|key| effects.remove(&key))
                .map(|tracked| tracked.effect)
                .collect()
        };
        for effect in unmounted {
            if let Some(effect) = effect.upgrade() {
                trace!("Tearing down unmounted effect");
                effect.teardown();
            }
        }
    }

    pub fn teardown_all(&self) {
        let effects: Vec<Tracked> = self.inner.effects.borrow_mut().drain().map(|(_, t)| t).collect();
        for tracked in effects {
            if let Some(effect) = tracked.effect.upgrade() {
                effect.teardown();
            }
        }
    }

    pub fn mounted_effects(&self) -> usize {
        self.inner.effects.borrow().len()
    }

    // tasks

    pub fn spawn<F>(&self, sink: Weak<dyn TaskSink>, future: F) -> Result<TaskHandle, RuntimeError>
    where
        F: Future<Output = TaskOutput> + Send + 'static,
    {
        let handle = Handle::try_current()?;
        let id = TaskId(self.inner.next_task.get());
        self.inner.next_task.set(id.0 + 1);
        self.inner.sinks.borrow_mut().insert(id, sink);

        let sender = self.inner.sender.clone();
        let join = handle.spawn(async move {
            let output = future.await;
            // the queue is gone once the tree has been dropped
            let _ = sender.send((id, output));
        });
        trace!("Spawned task {:?}", id);

        Ok(TaskHandle {
            id,
            join,
            runtime: Rc::downgrade(&self.inner),
        })
    }

    pub fn defer(&self, sink: Weak<dyn TaskSink>, delay: Duration) -> Result<TaskHandle, RuntimeError> {
        self.spawn(sink, async move {
            tokio::time::sleep(delay).await;
            TaskOutput::Elapsed
        })
    }

    pub fn live_tasks(&self) -> usize {
        self.inner.sinks.borrow().len()
    }

    fn deliver(&self, task: TaskId, output: TaskOutput) -> Delivery {
        let sink = self.inner.sinks.borrow_mut().remove(&task);
        match sink.and_then(|sink| sink.upgrade()) {
            Some(sink) => {
                sink.complete(self, task, output);
                Delivery::Applied(task)
            }
            None => {
                trace!("Dropping stale output of task {:?}", task);
                Delivery::Stale(task)
            }
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("dirty", &self.inner.dirty.get())
            .field("epoch", &self.inner.epoch.get())
            .field("live_tasks", &self.live_tasks())
            .field("mounted_effects", &self.mounted_effects())
            .finish()
    }
}

/// Owns a running task. Dropping it cancels the task.
pub struct TaskHandle {
    id: TaskId,
    join: JoinHandle<()>,
    runtime: Weak<RuntimeInner>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.join.abort();
        if let Some(inner) = self.runtime.upgrade() {
            if inner.sinks.borrow_mut().remove(&self.id).is_some() {
                trace!("Cancelled task {:?}", self.id);
            }
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaskHandle").field(&self.id).finish()
    }
}

pub struct UpdateQueue {
    receiver: UnboundedReceiver<Message>,
    runtime: Runtime,
}

impl UpdateQueue {
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Waits for the next task output and routes it. Returns `None` once no
    /// task is live and nothing is queued.
    pub async fn next(&mut self) -> Option<Delivery> {
        let (task, output) = match self.receiver.try_recv() {
            Ok(message) => message,
            Err(_) if self.runtime.live_tasks() == 0 => return None,
            Err(_) => self.receiver.recv().await?,
        };
        Some(self.runtime.deliver(task, output))
    }

    pub fn try_next(&mut self) -> Option<Delivery> {
        match self.receiver.try_recv() {
            Ok((task, output)) => Some(self.runtime.deliver(task, output)),
            Err(_) => None,
        }
    }

    pub async fn drain(&mut self) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        while let Some(delivery) = self.next().await {
            deliveries.push(delivery);
        }
        if !deliveries.is_empty() {
            trace!("Drained {} task outputs", deliveries.len());
        }
        deliveries
    }
}

impl fmt::Debug for UpdateQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("runtime", &self.runtime)
            .finish()
    }
}

pub(crate) fn warn_no_executor(what: &str, err: &RuntimeError) {
    warn!("Could not start {}: {}", what, err);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        outputs: RefCell<Vec<TaskId>>,
    }

    impl TaskSink for Recorder {
        fn complete(&self, runtime: &Runtime, task: TaskId, _output: TaskOutput) {
            self.outputs.borrow_mut().push(task);
            runtime.invalidate();
        }
    }

    struct Mounted {
        torn_down: Cell<bool>,
    }

    impl Effect for Mounted {
        fn teardown(&self) {
            self.torn_down.set(true);
        }
    }

    #[test]
    fn test_invalidate_notifies_subscribers() {
        let (runtime, _queue) = Runtime::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        runtime.subscribe(move || counter.set(counter.get() + 1));

        runtime.invalidate();
        runtime.invalidate();
        assert_eq!(calls.get(), 2);
        assert!(runtime.take_dirty());
        assert!(!runtime.is_dirty());
    }

    #[test]
    fn test_unvisited_effects_are_torn_down() {
        let (runtime, _queue) = Runtime::new();
        let kept = Rc::new(Mounted {
            torn_down: Cell::new(false),
        });
        let dropped = Rc::new(Mounted {
            torn_down: Cell::new(false),
        });

        runtime.begin_pass();
        runtime.keep_alive(&kept);
        runtime.keep_alive(&dropped);
        runtime.end_pass();
        assert_eq!(runtime.mounted_effects(), 2);

        runtime.begin_pass();
        runtime.keep_alive(&kept);
        runtime.end_pass();

        assert!(!kept.torn_down.get());
        assert!(dropped.torn_down.get());
        assert_eq!(runtime.mounted_effects(), 1);

        runtime.teardown_all();
        assert!(kept.torn_down.get());
        assert_eq!(runtime.mounted_effects(), 0);
    }

    #[test]
    fn test_spawn_without_executor() {
        let (runtime, _queue) = Runtime::new();
        let recorder: Rc<Recorder> = Rc::new(Recorder {
            outputs: RefCell::new(Vec::new()),
        });
        let sink: Weak<Recorder> = Rc::downgrade(&recorder);
        let result = runtime.spawn(sink, async { TaskOutput::Elapsed });
        assert!(matches!(result, Err(RuntimeError::NoExecutor(_))));
        assert_eq!(runtime.live_tasks(), 0);
    }

    #[tokio::test]
    async fn test_completion_is_routed_to_sink() {
        let (runtime, mut queue) = Runtime::new();
        let recorder = Rc::new(Recorder {
            outputs: RefCell::new(Vec::new()),
        });
        let sink: Weak<Recorder> = Rc::downgrade(&recorder);
        let handle = runtime.spawn(sink, async { TaskOutput::Elapsed }).unwrap();
        let id = handle.id();

        assert_eq!(queue.next().await, Some(Delivery::Applied(id)));
        assert_eq!(*recorder.outputs.borrow(), vec![id]);
        assert!(runtime.is_dirty());
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn test_dropped_handle_makes_output_stale() {
        let (runtime, mut queue) = Runtime::new();
        let recorder = Rc::new(Recorder {
            outputs: RefCell::new(Vec::new()),
        });
        let sink: Weak<Recorder> = Rc::downgrade(&recorder);
        let handle = runtime.spawn(sink, async { TaskOutput::Elapsed }).unwrap();
        let id = handle.id();

        // let the task finish and queue its output before cancelling it
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        drop(handle);
        assert_eq!(runtime.live_tasks(), 0);

        assert_eq!(queue.try_next(), Some(Delivery::Stale(id)));
        assert!(recorder.outputs.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_defer() {
        let (runtime, mut queue) = Runtime::new();
        let recorder = Rc::new(Recorder {
            outputs: RefCell::new(Vec::new()),
        });
        let sink: Weak<Recorder> = Rc::downgrade(&recorder);
        let handle = runtime.defer(sink, Duration::from_secs(5)).unwrap();

        assert_eq!(queue.next().await, Some(Delivery::Applied(handle.id())));
        assert_eq!(recorder.outputs.borrow().len(), 1);
    }
}
