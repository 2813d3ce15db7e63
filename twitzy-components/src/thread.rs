//! Single-thread disclosure: a head that is always shown and tails that are
//! shown while the thread is open.

use std::rc::Rc;
use twitzy_scope::{
    DisclosureProps, DisclosureScope, DisclosureState, OpenChangeHandler, ThreadIdentity,
    DISCLOSURE, THREAD_IDENTITY, THREAD_MEMBERSHIP,
};

use crate::{
    component::{Component, Cx, Props},
    error::RenderError,
    node::{Element, Node},
};

/// Owns the open/closed state of one thread.
///
/// Uncontrolled by default. `open`/`open_with` make it controlled, in which
/// case clicks are only reported through `on_open_change`. With an `id`
/// inside `threads::Threads`, the state is the thread's membership in the
/// container's open set instead.
#[derive(Default)]
pub struct Root {
    state: DisclosureState,
    open: Option<Rc<dyn Fn() -> bool>>,
    on_open_change: Option<OpenChangeHandler>,
    id: Option<String>,
    props: Props,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(self, open: bool) -> Self {
        self.open_with(move || open)
    }

    /// Reads the controlled open flag on every render.
    pub fn open_with(mut self, open: impl Fn() -> bool + 'static) -> Self {
        self.open = Some(Rc::new(open));
        self
    }

    pub fn on_open_change(mut self, on_open_change: impl Fn(bool) + 'static) -> Self {
        self.on_open_change = Some(Rc::new(on_open_change));
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn state(&self) -> &DisclosureState {
        &self.state
    }
}

impl Component for Root {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let membership = self
            .id
            .as_ref()
            .and_then(|id| cx.get(&THREAD_MEMBERSHIP).map(|membership| (id, membership)));

        let (scope, cx) = match membership {
            Some((id, membership)) => (
                DisclosureScope::for_thread(cx.runtime(), membership, id.as_str()),
                cx.provide(&THREAD_IDENTITY, ThreadIdentity::new(id.as_str())),
            ),
            None => {
                let props = DisclosureProps {
                    open: self.open.as_ref().map(|open| open()),
                    on_open_change: self.on_open_change.clone(),
                };
                (DisclosureScope::new(cx.runtime(), &self.state, &props), cx.clone())
            }
        };
        let is_open = scope.is_open();
        let cx = cx.provide(&DISCLOSURE, scope);

        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("thread-root")
            .state(is_open)
            .children(self.props.render_children(&cx)?)
            .into())
    }
}

#[derive(Default)]
pub struct Trigger {
    props: Props,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Trigger {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let disclosure = cx.require(&DISCLOSURE, "Thread.Trigger")?;
        let is_open = disclosure.is_open();
        Ok(Element::new("button")
            .attrs(self.props.attrs())
            .part("thread-trigger")
            .state(is_open)
            .on_click(move || disclosure.toggle())
            .children(self.props.render_children(cx)?)
            .into())
    }
}

#[derive(Default)]
pub struct Head {
    props: Props,
}

impl Head {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Head {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("thread-head")
            .children(self.props.render_children(cx)?)
            .into())
    }
}

#[derive(Default)]
pub struct Tails {
    props: Props,
}

impl Tails {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Tails {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let disclosure = cx.require(&DISCLOSURE, "Thread.Tails")?;
        if !disclosure.is_open() {
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

impl_compose!(Root, Trigger, Head, Tails);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::App, component::Compose, threads::Threads};
    use std::cell::{Cell, RefCell};

    fn thread(root: Root) -> Root {
        root.child(Head::new().child("head"))
            .child(Tails::new().child("tail"))
            .child(Trigger::new().child("Open thread"))
    }

    #[test]
    fn test_uncontrolled_toggle() {
        let mut app = App::new(thread(Root::new()));
        let output = app.render().unwrap();
        assert!(output.find_part("thread-tails").is_none());
        assert_eq!(output.find_part("thread-root").unwrap().get_attr("data-state"), Some("closed"));

        assert!(app.click_part("thread-trigger").unwrap());
        let output = app.output();
        assert_eq!(output.find_part("thread-root").unwrap().get_attr("data-state"), Some("open"));
        assert_eq!(output.text_content(), "headtailOpen thread");

        app.click_part("thread-trigger").unwrap();
        assert!(app.output().find_part("thread-tails").is_none());
        assert!(!app.root().state().is_open());
    }

    #[test]
    fn test_controlled_open_reports_change() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let recorded = changes.clone();
        let root = Root::new()
            .open(true)
            .on_open_change(move |open: bool| recorded.borrow_mut().push(open));
        let mut app = App::new(thread(root));
        assert!(app.render().unwrap().find_part("thread-tails").is_some());

        app.click_part("thread-trigger").unwrap();
        assert_eq!(*changes.borrow(), vec![false]);
        assert!(app.output().find_part("thread-tails").is_some());
    }

    #[test]
    fn test_controlled_by_caller_state() {
        let open = Rc::new(Cell::new(false));
        let reader = open.clone();
        let writer = open.clone();
        let root = Root::new()
            .open_with(move || reader.get())
            .on_open_change(move |next: bool| writer.set(next));
        let mut app = App::new(thread(root));
        app.render().unwrap();

        // the caller applies the change, then asks for a new render
        app.click_part("thread-trigger").unwrap();
        assert!(open.get());
        app.runtime().invalidate();
        app.render().unwrap();
        assert!(app.output().find_part("thread-tails").is_some());
    }

    #[test]
    fn test_parts_outside_root() {
        let mut app = App::new(Trigger::new());
        match app.render() {
            Err(RenderError::ScopeMissing(err)) => {
                assert_eq!(err.to_string(), "Thread.Trigger must be used within Thread.Root")
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut app = App::new(Tails::new());
        assert!(matches!(app.render(), Err(RenderError::ScopeMissing(_))));

        // head has no state to read
        let mut app = App::new(Head::new().child("head"));
        assert_eq!(app.render().unwrap().text_content(), "head");
    }

    #[test]
    fn test_root_with_id_joins_threads() {
        let threads = Threads::new()
            .child(thread(Root::new().id("t1")))
            .child(thread(Root::new().id("t2")));
        let mut app = App::new(threads);
        assert!(app.render().unwrap().find_part("thread-tails").is_none());

        app.click_part("thread-trigger").unwrap();
        let tails = app.output().find_parts("thread-tails");
        assert_eq!(tails.len(), 1);
        let roots = app.output().find_parts("thread-root");
        assert_eq!(roots[0].get_attr("data-state"), Some("open"));
        assert_eq!(roots[1].get_attr("data-state"), Some("closed"));
        assert_eq!(app.root().opened_thread_ids(), vec!["t1".to_string()]);

        app.click_part("thread-trigger").unwrap();
        assert!(app.output().find_part("thread-tails").is_none());
        assert!(app.root().opened_thread_ids().is_empty());
    }

    #[test]
    fn test_root_with_id_outside_threads_is_local() {
        let mut app = App::new(thread(Root::new().id("t1")));
        app.render().unwrap();
        app.click_part("thread-trigger").unwrap();
        assert!(app.output().find_part("thread-tails").is_some());
    }
}
