use log::trace;
use std::{
    cell::RefCell,
    collections::{BTreeSet, HashSet},
    fmt,
    rc::Rc,
};

use crate::runtime::Runtime;

/// Ids of the threads currently open inside one `Threads` container.
#[derive(Clone, Debug, Default)]
pub struct ThreadMembershipState {
    opened: Rc<RefCell<HashSet<String>>>,
}

impl ThreadMembershipState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, thread_id: &str) -> bool {
        self.opened.borrow().contains(thread_id)
    }

    /// Open ids in sorted order.
    pub fn opened_thread_ids(&self) -> BTreeSet<String> {
        self.opened.borrow().iter().cloned().collect()
    }
}

pub struct ThreadMembershipScope {
    state: ThreadMembershipState,
    runtime: Runtime,
}

impl ThreadMembershipScope {
    pub fn new(runtime: &Runtime, state: &ThreadMembershipState) -> Self {
        Self {
            state: state.clone(),
            runtime: runtime.clone(),
        }
    }

    /// Opens `thread_id` if closed, closes it if open. Returns whether the
    /// thread is open afterwards.
    pub fn toggle(&self, thread_id: &str) -> bool {
        let is_open = {
            let mut opened = self.state.opened.borrow_mut();
            if opened.remove(thread_id) {
                false
            } else {
                opened.insert(thread_id.to_string());
                true
            }
        };
        trace!("Thread {} is now {}", thread_id, if is_open { "open" } else { "closed" });
        self.runtime.invalidate();
        is_open
    }

    pub fn is_open(&self, thread_id: &str) -> bool {
        self.state.is_open(thread_id)
    }

    pub fn opened_thread_ids(&self) -> BTreeSet<String> {
        self.state.opened_thread_ids()
    }
}

impl fmt::Debug for ThreadMembershipScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadMembershipScope")
            .field("opened", &self.opened_thread_ids())
            .finish()
    }
}

/// The id of the thread a subtree belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadIdentity {
    pub thread_id: String,
}

impl ThreadIdentity {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores() {
        let (runtime, _queue) = Runtime::new();
        let state = ThreadMembershipState::new();
        let scope = ThreadMembershipScope::new(&runtime, &state);

        assert!(!scope.is_open("t1"));
        assert!(scope.toggle("t1"));
        assert!(scope.is_open("t1"));
        assert!(runtime.take_dirty());

        assert!(!scope.toggle("t1"));
        assert!(!scope.is_open("t1"));
        assert!(scope.opened_thread_ids().is_empty());
    }

    #[test]
    fn test_threads_are_independent() {
        let (runtime, _queue) = Runtime::new();
        let state = ThreadMembershipState::new();
        let scope = ThreadMembershipScope::new(&runtime, &state);

        scope.toggle("t2");
        scope.toggle("t1");
        scope.toggle("t2");

        let opened: Vec<String> = scope.opened_thread_ids().into_iter().collect();
        assert_eq!(opened, vec!["t1".to_string()]);
    }

    #[test]
    fn test_scopes_share_state() {
        let (runtime, _queue) = Runtime::new();
        let state = ThreadMembershipState::new();
        let first = ThreadMembershipScope::new(&runtime, &state);
        let second = ThreadMembershipScope::new(&runtime, &state);

        first.toggle("t1");
        assert!(second.is_open("t1"));
    }
}
