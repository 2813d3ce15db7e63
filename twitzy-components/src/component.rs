use std::{fmt, rc::Rc};
use twitzy_scope::{Runtime, ScopeMissingError, ScopedContext, Scopes};

use crate::{config::Config, error::RenderError, node::Node};

/// Built once and rendered on every pass, so owned state lives in fields.
pub trait Component {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError>;
}

impl Component for &'static str {
    fn render(&self, _cx: &Cx) -> Result<Node, RenderError> {
        Ok(Node::text(*self))
    }
}

impl Component for String {
    fn render(&self, _cx: &Cx) -> Result<Node, RenderError> {
        Ok(Node::text(self.as_str()))
    }
}

impl Component for Node {
    fn render(&self, _cx: &Cx) -> Result<Node, RenderError> {
        Ok(self.clone())
    }
}

impl<C: Component + ?Sized> Component for Box<C> {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        (**self).render(cx)
    }
}

impl<C: Component + ?Sized> Component for Rc<C> {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        (**self).render(cx)
    }
}

pub struct FnComponent<F>(F);

impl<F> Component for FnComponent<F>
where
    F: Fn(&Cx) -> Result<Node, RenderError>,
{
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        (self.0)(cx)
    }
}

pub fn from_fn<F>(render: F) -> FnComponent<F>
where
    F: Fn(&Cx) -> Result<Node, RenderError>,
{
    FnComponent(render)
}

#[derive(Clone)]
pub struct Cx {
    scopes: Scopes,
    runtime: Runtime,
    config: Rc<Config>,
}

impl Cx {
    pub fn new(runtime: &Runtime, config: Rc<Config>) -> Self {
        Self {
            scopes: Scopes::new(),
            runtime: runtime.clone(),
            config,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Context for descendants of a provider of `value`.
    pub fn provide<T: 'static>(&self, context: &ScopedContext<T>, value: T) -> Cx {
        self.provide_rc(context, Rc::new(value))
    }

    pub fn provide_rc<T: 'static>(&self, context: &ScopedContext<T>, value: Rc<T>) -> Cx {
        Cx {
            scopes: context.provide_rc(&self.scopes, value),
            runtime: self.runtime.clone(),
            config: self.config.clone(),
        }
    }

    pub fn require<T: 'static>(
        &self,
        context: &ScopedContext<T>,
        component: &'static str,
    ) -> Result<Rc<T>, ScopeMissingError> {
        context.require(&self.scopes, component)
    }

    pub fn get<T: 'static>(&self, context: &ScopedContext<T>) -> Option<Rc<T>> {
        context.get(&self.scopes)
    }
}

impl fmt::Debug for Cx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cx")
            .field("scopes", &self.scopes)
            .field("runtime", &self.runtime)
            .field("config", &self.config)
            .finish()
    }
}

/// Caller attributes and children every part accepts.
#[derive(Default)]
pub struct Props {
    attrs: Vec<(String, String)>,
    children: Vec<Box<dyn Component>>,
}

impl Props {
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn render_children(&self, cx: &Cx) -> Result<Vec<Node>, RenderError> {
        self.children.iter().map(|child| child.render(cx)).collect()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("attrs", &self.attrs)
            .field("children", &self.children.len())
            .finish()
    }
}

pub trait Compose: Sized {
    fn props_mut(&mut self) -> &mut Props;

    fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props_mut().attrs.push((name.into(), value.into()));
        self
    }

    fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    fn child(mut self, child: impl Component + 'static) -> Self {
        self.props_mut().children.push(Box::new(child));
        self
    }

    fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Component + 'static,
    {
        let props = self.props_mut();
        for child in children {
            props.children.push(Box::new(child));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twitzy_scope::ThreadIdentity;

    static IDENTITY: ScopedContext<ThreadIdentity> = ScopedContext::new("Thread");

    #[derive(Default)]
    struct Wrapper {
        props: Props,
    }

    impl Compose for Wrapper {
        fn props_mut(&mut self) -> &mut Props {
            &mut self.props
        }
    }

    impl Component for Wrapper {
        fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
            let cx = cx.provide(&IDENTITY, ThreadIdentity::new("t1"));
            Ok(Node::fragment(self.props.render_children(&cx)?))
        }
    }

    fn cx() -> Cx {
        let (runtime, _queue) = Runtime::new();
        Cx::new(&runtime, Rc::new(Config::default()))
    }

    #[test]
    fn test_children_see_provided_scope() {
        let wrapper = Wrapper::default()
            .child("id: ")
            .child(from_fn(|cx: &Cx| {
                let identity = cx.require(&IDENTITY, "ThreadLabel")?;
                Ok(Node::text(identity.thread_id.clone()))
            }));
        let node = wrapper.render(&cx()).unwrap();
        assert_eq!(node.text_content(), "id: t1");
    }

    #[test]
    fn test_missing_scope_surfaces() {
        let label = from_fn(|cx: &Cx| {
            cx.require(&IDENTITY, "ThreadLabel")?;
            Ok(Node::Empty)
        });
        match label.render(&cx()) {
            Err(RenderError::ScopeMissing(err)) => {
                assert_eq!(err.to_string(), "ThreadLabel must be used within Thread")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
