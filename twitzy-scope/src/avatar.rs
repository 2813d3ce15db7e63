use log::{debug, trace};
use std::{
    cell::{Cell, RefCell},
    fmt,
    future::Future,
    pin::Pin,
    rc::{Rc, Weak},
};
use thiserror::Error as ThisError;

use crate::runtime::{warn_no_executor, Effect, Runtime, TaskHandle, TaskId, TaskOutput, TaskSink};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AvatarLoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

impl AvatarLoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, AvatarLoadStatus::Loaded)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AvatarProbeError {
    #[error("Avatar has no source")]
    MissingSource,
    #[error("Failed to load avatar {src}: {reason}")]
    Failed { src: String, reason: String },
}

pub type ProbeFuture = Pin<Box<dyn Future<Output = Result<(), AvatarProbeError>> + Send>>;

/// Checks whether an image at `src` can be loaded.
pub trait ImageProbe {
    fn probe(&self, src: &str) -> ProbeFuture;
}

/// Default probe when no loader is configured: nothing ever loads, so every
/// avatar shows its fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnreachableImageProbe;

impl ImageProbe for UnreachableImageProbe {
    fn probe(&self, src: &str) -> ProbeFuture {
        let src = src.to_string();
        Box::pin(async move {
            Err(AvatarProbeError::Failed {
                src,
                reason: "no image probe configured".to_string(),
            })
        })
    }
}

/// Status an `Avatar` root keeps across render passes.
#[derive(Clone, Debug, Default)]
pub struct AvatarLoadState {
    status: Rc<Cell<AvatarLoadStatus>>,
}

impl AvatarLoadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AvatarLoadStatus {
        self.status.get()
    }
}

pub type StatusListener = Rc<dyn Fn(AvatarLoadStatus)>;

pub struct AvatarLoadScope {
    status: Rc<Cell<AvatarLoadStatus>>,
    listener: Option<StatusListener>,
    runtime: Runtime,
}

impl AvatarLoadScope {
    pub fn new(runtime: &Runtime, state: &AvatarLoadState, listener: Option<StatusListener>) -> Self {
        Self {
            status: state.status.clone(),
            listener,
            runtime: runtime.clone(),
        }
    }

    pub fn status(&self) -> AvatarLoadStatus {
        self.status.get()
    }

    pub fn report_status(&self, status: AvatarLoadStatus) {
        if self.status.get() == status {
            return;
        }
        trace!("Avatar status {:?} -> {:?}", self.status.get(), status);
        self.status.set(status);
        self.runtime.invalidate();
        if let Some(listener) = &self.listener {
            listener(status);
        }
    }
}

impl fmt::Debug for AvatarLoadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarLoadScope")
            .field("status", &self.status.get())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

/// Derives the load status of one avatar image from its `src`.
///
/// Held by the image component across passes. Each `src` gets at most one
/// probe; changing `src` or unmounting drops the probe's handle, which cancels
/// it and makes any completion already queued stale.
#[derive(Default)]
pub struct AvatarLoader {
    status: Cell<AvatarLoadStatus>,
    src: RefCell<Option<String>>,
    task: RefCell<Option<TaskHandle>>,
    synced: Cell<bool>,
}

impl AvatarLoader {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn status(&self) -> AvatarLoadStatus {
        self.status.get()
    }

    pub fn is_probing(&self) -> bool {
        self.task.borrow().is_some()
    }

    pub fn sync(self: &Rc<Self>, runtime: &Runtime, src: Option<&str>) -> AvatarLoadStatus {
        runtime.keep_alive(self);

        let src = src.filter(|src| !src.is_empty());
        if self.synced.get() && self.src.borrow().as_deref() == src {
            return self.status.get();
        }
        self.synced.set(true);
        *self.src.borrow_mut() = src.map(str::to_string);
        self.task.borrow_mut().take();

        let src = match src {
            Some(src) => src,
            None => {
                debug!("{}", AvatarProbeError::MissingSource);
                self.status.set(AvatarLoadStatus::Error);
                return AvatarLoadStatus::Error;
            }
        };

        let probe = runtime.image_probe().probe(src);
        let sink: Weak<dyn TaskSink> = {
            let sink: Rc<dyn TaskSink> = self.clone();
            Rc::downgrade(&sink)
        };
        match runtime.spawn(sink, async move { TaskOutput::Probe(probe.await) }) {
            Ok(task) => {
                trace!("Probing avatar {}", src);
                *self.task.borrow_mut() = Some(task);
                self.status.set(AvatarLoadStatus::Loading);
            }
            Err(err) => {
                warn_no_executor("avatar probe", &err);
                self.status.set(AvatarLoadStatus::Error);
            }
        }
        self.status.get()
    }
}

impl TaskSink for AvatarLoader {
    fn complete(&self, runtime: &Runtime, task: TaskId, output: TaskOutput) {
        let current = self.task.borrow().as_ref().map(TaskHandle::id);
        if current != Some(task) {
            return;
        }
        self.task.borrow_mut().take();

        let status = match output {
            TaskOutput::Probe(Ok(())) => AvatarLoadStatus::Loaded,
            TaskOutput::Probe(Err(err)) => {
                debug!("{}", err);
                AvatarLoadStatus::Error
            }
            TaskOutput::Elapsed => return,
        };
        self.status.set(status);
        runtime.invalidate();
    }
}

impl Effect for AvatarLoader {
    fn teardown(&self) {
        self.task.borrow_mut().take();
        self.synced.set(false);
        self.src.borrow_mut().take();
        self.status.set(AvatarLoadStatus::Idle);
    }
}

impl fmt::Debug for AvatarLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarLoader")
            .field("status", &self.status.get())
            .field("src", &self.src.borrow())
            .field("task", &self.task.borrow())
            .finish()
    }
}
