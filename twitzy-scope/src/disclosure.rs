//! Open/closed state shared by a thread root and its trigger and tails.

use log::trace;
use std::{cell::Cell, fmt, rc::Rc};

use crate::{membership::ThreadMembershipScope, runtime::Runtime};

#[derive(Clone, Debug, Default)]
pub struct DisclosureState {
    is_open: Rc<Cell<bool>>,
}

impl DisclosureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open.get()
    }
}

pub type OpenChangeHandler = Rc<dyn Fn(bool)>;

/// What the caller passes to a disclosure root.
///
/// With `open` set the root is controlled: the flag is the only source of
/// truth and changes are reported through `on_open_change` for the caller to
/// apply.
#[derive(Clone, Default)]
pub struct DisclosureProps {
    pub open: Option<bool>,
    pub on_open_change: Option<OpenChangeHandler>,
}

impl fmt::Debug for DisclosureProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisclosureProps")
            .field("open", &self.open)
            .field("on_open_change", &self.on_open_change.is_some())
            .finish()
    }
}

enum Source {
    Local(DisclosureState),
    Controlled(bool),
    Membership {
        membership: Rc<ThreadMembershipScope>,
        thread_id: String,
    },
}

pub struct DisclosureScope {
    source: Source,
    on_open_change: Option<OpenChangeHandler>,
    runtime: Runtime,
}

impl DisclosureScope {
    pub fn new(runtime: &Runtime, state: &DisclosureState, props: &DisclosureProps) -> Self {
        let source = match props.open {
            Some(open) => Source::Controlled(open),
            None => Source::Local(state.clone()),
        };
        Self {
            source,
            on_open_change: props.on_open_change.clone(),
            runtime: runtime.clone(),
        }
    }

    /// A disclosure whose state is the thread's membership in `membership`.
    pub fn for_thread(
        runtime: &Runtime,
        membership: Rc<ThreadMembershipScope>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            source: Source::Membership {
                membership,
                thread_id: thread_id.into(),
            },
            on_open_change: None,
            runtime: runtime.clone(),
        }
    }

    pub fn is_open(&self) -> bool {
        match &self.source {
            Source::Local(state) => state.is_open.get(),
            Source::Controlled(open) => *open,
            Source::Membership {
                membership,
                thread_id,
            } => membership.is_open(thread_id),
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.source, Source::Controlled(_))
    }

    pub fn set_open(&self, next: bool) {
        trace!("Disclosure set_open({})", next);
        match &self.source {
            Source::Controlled(_) => {
                if let Some(on_open_change) = &self.on_open_change {
                    on_open_change(next);
                }
            }
            Source::Local(state) => {
                if state.is_open.replace(next) != next {
                    self.runtime.invalidate();
                }
                if let Some(on_open_change) = &self.on_open_change {
                    on_open_change(next);
                }
            }
            Source::Membership {
                membership,
                thread_id,
            } => {
                if membership.is_open(thread_id) != next {
                    membership.toggle(thread_id);
                }
            }
        }
    }

    pub fn open(&self) {
        self.set_open(true)
    }

    pub fn close(&self) {
        self.set_open(false)
    }

    pub fn toggle(&self) {
        self.set_open(!self.is_open())
    }
}

impl fmt::Debug for DisclosureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Local(_) => "local",
            Source::Controlled(_) => "controlled",
            Source::Membership { .. } => "membership",
        };
        f.debug_struct("DisclosureScope")
            .field("source", &source)
            .field("is_open", &self.is_open())
            .finish()
    }
}
