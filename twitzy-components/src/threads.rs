//! Several threads on one page, each opened and closed by id.

use twitzy_scope::{
    ThreadIdentity, ThreadMembershipScope, ThreadMembershipState, THREAD_IDENTITY,
    THREAD_MEMBERSHIP,
};

use crate::{
    component::{Component, Cx, Props},
    error::RenderError,
    node::{Element, Node},
};

/// Owns the set of open thread ids for every `Thread` below it.
#[derive(Default)]
pub struct Threads {
    state: ThreadMembershipState,
    props: Props,
}

impl Threads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened_thread_ids(&self) -> Vec<String> {
        self.state.opened_thread_ids().into_iter().collect()
    }
}

impl Component for Threads {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let scope = ThreadMembershipScope::new(cx.runtime(), &self.state);
        let cx = cx.provide(&THREAD_MEMBERSHIP, scope);
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("threads")
            .children(self.props.render_children(&cx)?)
            .into())
    }
}

pub struct Thread {
    id: String,
    props: Props,
}

impl Thread {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            props: Props::default(),
        }
    }
}

impl Component for Thread {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let membership = cx.require(&THREAD_MEMBERSHIP, "Thread")?;
        let is_open = membership.is_open(&self.id);
        let cx = cx.provide(&THREAD_IDENTITY, ThreadIdentity::new(self.id.as_str()));
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("thread")
            .state(is_open)
            .attr("data-thread-id", self.id.as_str())
            .children(self.props.render_children(&cx)?)
            .into())
    }
}

#[derive(Default)]
pub struct ThreadTrigger {
    props: Props,
}

impl ThreadTrigger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for ThreadTrigger {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let membership = cx.require(&THREAD_MEMBERSHIP, "ThreadTrigger")?;
        let identity = cx.require(&THREAD_IDENTITY, "ThreadTrigger")?;
        let is_open = membership.is_open(&identity.thread_id);
        Ok(Element::new("button")
            .attrs(self.props.attrs())
            .part("thread-trigger")
            .state(is_open)
            .on_click(move || {
                membership.toggle(&identity.thread_id);
            })
            .children(self.props.render_children(cx)?)
            .into())
    }
}

#[derive(Default)]
pub struct ThreadFront {
    props: Props,
}

impl ThreadFront {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for ThreadFront {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("thread-front")
            .children(self.props.render_children(cx)?)
            .into())
    }
}

/// Rendered only while its thread is open. A thread may have any number.
#[derive(Default)]
pub struct ThreadTails {
    props: Props,
}

impl ThreadTails {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for ThreadTails {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let membership = cx.require(&THREAD_MEMBERSHIP, "ThreadTails")?;
        let identity = cx.require(&THREAD_IDENTITY, "ThreadTails")?;
        if !membership.is_open(&identity.thread_id) {
            return Ok(Node::Empty);
        }
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("thread-tails")
            .state(true)
            .children(self.props.render_children(cx)?)
            .into())
    }
}

impl_compose!(Threads, Thread, ThreadTrigger, ThreadFront, ThreadTails);
