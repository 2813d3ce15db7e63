use log::{debug, trace, warn};
use std::rc::Rc;
use twitzy_scope::{Delivery, ImageProbe, Runtime, UpdateQueue};

use crate::{
    component::{Component, Cx},
    config::Config,
    error::RenderError,
    node::{Element, Node},
};

/// Passes allowed for one update to settle before the output is kept as is.
pub const MAX_PASSES: usize = 16;

/// Drives a component tree: renders it, applies clicks and task completions
/// one at a time, and re-renders until the tree is clean after each.
pub struct App<C> {
    root: C,
    runtime: Runtime,
    queue: UpdateQueue,
    config: Rc<Config>,
    output: Node,
}

impl<C: Component> App<C> {
    pub fn new(root: C) -> Self {
        Self::with_config(root, Config::default())
    }

    pub fn with_config(root: C, config: Config) -> Self {
        let (runtime, queue) = Runtime::new();
        Self {
            root,
            runtime,
            queue,
            config: Rc::new(config),
            output: Node::Empty,
        }
    }

    pub fn with_image_probe(self, probe: Rc<dyn ImageProbe>) -> Self {
        self.runtime.set_image_probe(probe);
        self
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &C {
        &self.root
    }

    pub fn output(&self) -> &Node {
        &self.output
    }

    pub fn to_html(&self) -> String {
        self.output.to_html()
    }

    fn render_pass(&mut self) -> Result<(), RenderError> {
        let epoch = self.runtime.begin_pass();
        trace!("Render pass {}", epoch);
        let cx = Cx::new(&self.runtime, self.config.clone());
        let output = self.root.render(&cx);
        self.runtime.end_pass();
        self.output = output?;
        Ok(())
    }

    pub fn render(&mut self) -> Result<&Node, RenderError> {
        self.render_pass()?;
        let mut passes = 1;
        while self.runtime.take_dirty() {
            if passes == MAX_PASSES {
                warn!("Tree still dirty after {} render passes", passes);
                break;
            }
            self.render_pass()?;
            passes += 1;
        }
        debug!("Rendered in {} passes", passes);
        Ok(&self.output)
    }

    /// Clicks the first element matching `predicate` and re-renders. Returns
    /// false when no clickable element matches.
    pub fn click(&mut self, predicate: impl Fn(&Element) -> bool) -> Result<bool, RenderError> {
        let handler = self
            .output
            .find(&|element| element.is_clickable() && predicate(element))
            .and_then(Element::click_handler);
        match handler {
            Some(handler) => {
                handler();
                self.render()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn click_part(&mut self, part: &str) -> Result<bool, RenderError> {
        self.click(|element| element.part_name() == Some(part))
    }

    /// Waits for the next task completion and re-renders if it changed state.
    /// Returns `None` once no task is running.
    pub async fn process_next(&mut self) -> Result<Option<Delivery>, RenderError> {
        let delivery = match self.queue.next().await {
            Some(delivery) => delivery,
            None => return Ok(None),
        };
        if self.runtime.is_dirty() {
            self.render()?;
        }
        Ok(Some(delivery))
    }

    pub async fn settle(&mut self) -> Result<usize, RenderError> {
        let mut processed = 0;
        while self.process_next().await?.is_some() {
            processed += 1;
        }
        Ok(processed)
    }

    pub fn unmount(&mut self) {
        self.runtime.teardown_all();
        self.runtime.take_dirty();
        self.output = Node::Empty;
    }
}

impl<C> Drop for App<C> {
    fn drop(&mut self) {
        self.runtime.teardown_all();
    }
}
