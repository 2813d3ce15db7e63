use std::{cell::RefCell, fmt, rc::Rc};
use twitzy_tweet::TweetRecord;

use crate::runtime::Runtime;

#[derive(Clone, Debug, Default)]
pub struct TweetRecordState {
    record: Rc<RefCell<Option<TweetRecord>>>,
}

impl TweetRecordState {
    pub fn new(record: Option<TweetRecord>) -> Self {
        Self {
            record: Rc::new(RefCell::new(record)),
        }
    }
}

/// The tweet a `tweet::Root` subtree renders.
pub struct TweetRecordScope {
    state: TweetRecordState,
    runtime: Runtime,
}

impl TweetRecordScope {
    pub fn new(runtime: &Runtime, state: &TweetRecordState) -> Self {
        Self {
            state: state.clone(),
            runtime: runtime.clone(),
        }
    }

    pub fn record(&self) -> Option<TweetRecord> {
        self.state.record.borrow().clone()
    }

    pub fn with_record<R>(&self, f: impl FnOnce(Option<&TweetRecord>) -> R) -> R {
        f(self.state.record.borrow().as_ref())
    }

    pub fn set_record(&self, record: Option<TweetRecord>) {
        let changed = *self.state.record.borrow() != record;
        if changed {
            *self.state.record.borrow_mut() = record;
            self.runtime.invalidate();
        }
    }
}

impl fmt::Debug for TweetRecordScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweetRecordScope")
            .field("record", &self.state.record.borrow())
            .finish()
    }
}
