use itertools::Itertools;
use pulldown_cmark::escape::escape_html;
use std::{fmt, rc::Rc};

pub type ClickHandler = Rc<dyn Fn()>;

/// Marker attribute naming the component part an element was rendered by.
pub const PART_ATTR: &str = "data-twitzy";
pub const STATE_ATTR: &str = "data-state";

const VOID_TAGS: [&str; 5] = ["br", "hr", "img", "input", "meta"];

#[derive(Clone)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    on_click: Option<ClickHandler>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
            on_click: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(attr) => attr.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn attrs<'a>(self, attrs: impl IntoIterator<Item = &'a (String, String)>) -> Self {
        attrs
            .into_iter()
            .fold(self, |element, (name, value)| element.attr(name.as_str(), value.as_str()))
    }

    pub fn part(self, part: &str) -> Self {
        self.attr(PART_ATTR, part)
    }

    pub fn state(self, is_open: bool) -> Self {
        self.attr(STATE_ATTR, if is_open { "open" } else { "closed" })
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on_click(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn part_name(&self) -> Option<&str> {
        self.get_attr(PART_ATTR)
    }

    pub fn is_clickable(&self) -> bool {
        self.on_click.is_some()
    }

    /// Runs the click handler. Returns false if the element has none.
    pub fn click(&self) -> bool {
        match &self.on_click {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    pub fn click_handler(&self) -> Option<ClickHandler> {
        self.on_click.clone()
    }

    pub fn into_node(self) -> Node {
        Node::Element(self)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("attrs", &self.attrs)
            .field("children", &self.children)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Clone, Debug, Default)]
pub enum Node {
    Element(Element),
    Text(String),
    Raw(String),
    Fragment(Vec<Node>),
    #[default]
    Empty,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn raw(markup: impl Into<String>) -> Self {
        Node::Raw(markup.into())
    }

    pub fn fragment(nodes: impl IntoIterator<Item = Node>) -> Self {
        Node::Fragment(nodes.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Empty => true,
            Node::Fragment(nodes) => nodes.iter().all(Node::is_empty),
            _ => false,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        match self {
            Node::Element(element) => {
                if predicate(element) {
                    return Some(element);
                }
                element.children.iter().find_map(|child| child.find(predicate))
            }
            Node::Fragment(nodes) => nodes.iter().find_map(|node| node.find(predicate)),
            _ => None,
        }
    }

    pub fn find_all(&self, predicate: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(predicate, &mut found);
        found
    }

    fn collect<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool, found: &mut Vec<&'a Element>) {
        match self {
            Node::Element(element) => {
                if predicate(element) {
                    found.push(element);
                }
                for child in &element.children {
                    child.collect(predicate, found);
                }
            }
            Node::Fragment(nodes) => {
                for node in nodes {
                    node.collect(predicate, found);
                }
            }
            _ => {}
        }
    }

    pub fn find_part(&self, part: &str) -> Option<&Element> {
        self.find(&|element| element.part_name() == Some(part))
    }

    pub fn find_parts(&self, part: &str) -> Vec<&Element> {
        self.find_all(&|element| element.part_name() == Some(part))
    }

    /// Concatenated text of the subtree. Raw markup counts as its source.
    pub fn text_content(&self) -> String {
        match self {
            Node::Element(element) => element.children.iter().map(Node::text_content).join(""),
            Node::Text(text) | Node::Raw(text) => text.clone(),
            Node::Fragment(nodes) => nodes.iter().map(Node::text_content).join(""),
            Node::Empty => String::new(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        // writing into a String never fails
        let _ = write_node(&mut html, self);
        html
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Node::Element(self.clone()).to_html())
    }
}

fn escaped(text: &str) -> std::io::Result<String> {
    let mut out = String::with_capacity(text.len());
    escape_html(&mut out, text)?;
    Ok(out)
}

fn write_node(html: &mut String, node: &Node) -> std::io::Result<()> {
    match node {
        Node::Element(element) => {
            let attrs = element
                .attrs
                .iter()
                .map(|(name, value)| escaped(value).map(|value| format!(r#" {}="{}""#, name, value)))
                .collect::<Result<Vec<String>, _>>()?
                .into_iter()
                .join("");
            html.push('<');
            html.push_str(element.tag);
            html.push_str(&attrs);
            html.push('>');
            if VOID_TAGS.contains(&element.tag) {
                return Ok(());
            }
            for child in &element.children {
                write_node(html, child)?;
            }
            html.push_str("</");
            html.push_str(element.tag);
            html.push('>');
        }
        Node::Text(text) => escape_html(&mut *html, text)?,
        Node::Raw(markup) => html.push_str(markup),
        Node::Fragment(nodes) => {
            for node in nodes {
                write_node(html, node)?;
            }
        }
        Node::Empty => {}
    }
    Ok(())
}
