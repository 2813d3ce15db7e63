//! Parts of a single tweet card. `Root` publishes the tweet record, `Avatar`
//! publishes the avatar load status, and every other part reads them.

use log::{debug, warn};
use std::rc::Rc;
use twitzy_content::linkify;
use twitzy_scope::{
    AvatarLoadScope, AvatarLoadState, AvatarLoadStatus, AvatarLoader, DeferredFlag,
    StatusListener, TweetRecordScope, TweetRecordState, AVATAR_LOAD, TWEET_RECORD,
};
use twitzy_tweet::{format_created_at, TweetRecord};

use crate::{
    component::{Component, Cx, Props},
    error::RenderError,
    gradient::generate_gradient,
    node::{Element, Node},
};

const TARGET: &str = "_blank";
const REL: &str = "noopener noreferrer";
const SVG_NS: &str = "http://www.w3.org/2000/svg";

fn container(tag: &'static str, part: &str, props: &Props, cx: &Cx) -> Result<Node, RenderError> {
    Ok(Element::new(tag)
        .attrs(props.attrs())
        .part(part)
        .children(props.render_children(cx)?)
        .into())
}

fn record_field(scope: &TweetRecordScope, field: impl FnOnce(&TweetRecord) -> String) -> Option<String> {
    scope.with_record(|record| record.map(field))
}

#[derive(Default)]
pub struct Root {
    record: TweetRecordState,
    props: Props,
}

impl Root {
    pub fn new(record: Option<TweetRecord>) -> Self {
        Self {
            record: TweetRecordState::new(record),
            props: Props::default(),
        }
    }

    /// The record state this root publishes, for setting it from outside.
    pub fn record_state(&self) -> &TweetRecordState {
        &self.record
    }
}

impl Component for Root {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let scope = TweetRecordScope::new(cx.runtime(), &self.record);
        let cx = cx.provide(&TWEET_RECORD, scope);
        container("div", "tweet-root", &self.props, &cx)
    }
}

#[derive(Default)]
pub struct Avatar {
    state: AvatarLoadState,
    on_status_change: Option<StatusListener>,
    props: Props,
}

impl Avatar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_status_change(mut self, listener: impl Fn(AvatarLoadStatus) + 'static) -> Self {
        self.on_status_change = Some(Rc::new(listener));
        self
    }

    pub fn status(&self) -> AvatarLoadStatus {
        self.state.status()
    }
}

impl Component for Avatar {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let scope = AvatarLoadScope::new(cx.runtime(), &self.state, self.on_status_change.clone());
        let cx = cx.provide(&AVATAR_LOAD, scope);
        container("div", "avatar", &self.props, &cx)
    }
}

/// The avatar `<img>`, shown only once the image has loaded.
pub struct AvatarImage {
    loader: Rc<AvatarLoader>,
    src: Option<String>,
    props: Props,
}

impl AvatarImage {
    pub fn new() -> Self {
        Self {
            loader: AvatarLoader::new(),
            src: None,
            props: Props::default(),
        }
    }

    /// Loads `src` instead of the record's `avatarSrc`.
    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }
}

impl Default for AvatarImage {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AvatarImage {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let avatar = cx.require(&AVATAR_LOAD, "Tweet.AvatarImage")?;
        let record = cx.require(&TWEET_RECORD, "Tweet.AvatarImage")?;

        let src = self
            .src
            .clone()
            .or_else(|| record_field(&record, |record| record.avatar_src.clone()));
        let status = self.loader.sync(cx.runtime(), src.as_deref());
        avatar.report_status(status);

        if !status.is_loaded() {
            return Ok(Node::Empty);
        }
        let id = record_field(&record, |record| record.id.clone()).unwrap_or_default();
        Ok(Element::new("img")
            .attrs(self.props.attrs())
            .part("avatar-image")
            .attr("src", src.unwrap_or_default())
            .attr("alt", format!("{}-avatar", id))
            .into())
    }
}

pub struct AvatarFallback {
    props: Props,
}

impl AvatarFallback {
    pub fn new() -> Self {
        Self {
            props: Props::default(),
        }
    }
}

impl Default for AvatarFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AvatarFallback {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let avatar = cx.require(&AVATAR_LOAD, "Tweet.AvatarFallback")?;
        if avatar.status().is_loaded() {
            return Ok(Node::Empty);
        }
        container("div", "avatar-fallback", &self.props, cx)
    }
}

/// A square SVG filled with a gradient derived from the author's name.
pub struct AvatarGradientFallback {
    size: u32,
    author_name: Option<String>,
    props: Props,
}

impl AvatarGradientFallback {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            author_name: None,
            props: Props::default(),
        }
    }

    /// Seeds the gradient with `author_name` instead of the record's author.
    pub fn author_name(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = Some(author_name.into());
        self
    }
}

impl Component for AvatarGradientFallback {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let avatar = cx.require(&AVATAR_LOAD, "Tweet.AvatarGradientFallback")?;
        let record = cx.require(&TWEET_RECORD, "Tweet.AvatarGradientFallback")?;
        if avatar.status().is_loaded() {
            return Ok(Node::Empty);
        }

        let (id, author) = record
            .with_record(|record| record.map(|record| (record.id.clone(), record.author.clone())))
            .unwrap_or_default();
        let seed = match &self.author_name {
            Some(author_name) => author_name.clone(),
            None if !author.is_empty() => author.clone(),
            None => id.clone(),
        };
        let gradient = generate_gradient(&seed);
        let gradient_id = format!("{}-{}-avatar", id, author);
        let size = self.size.to_string();

        let stops = Element::new("linearGradient")
            .attr("id", gradient_id.as_str())
            .attr("x1", "0")
            .attr("y1", "0")
            .attr("x2", "1")
            .attr("y2", "1")
            .child(
                Element::new("stop")
                    .attr("offset", "0%")
                    .attr("stop-color", gradient.from_color)
                    .into(),
            )
            .child(
                Element::new("stop")
                    .attr("offset", "100%")
                    .attr("stop-color", gradient.to_color)
                    .into(),
            );
        let rect = Element::new("rect")
            .attr("fill", format!("url(#{})", gradient_id))
            .attr("x", "0")
            .attr("y", "0")
            .attr("width", size.as_str())
            .attr("height", size.as_str());

        Ok(Element::new("svg")
            .attr("width", size.as_str())
            .attr("height", size.as_str())
            .attr("viewBox", format!("0 0 {} {}", size, size))
            .attr("version", "1.1")
            .attr("xmlns", SVG_NS)
            .attrs(self.props.attrs())
            .part("avatar-gradient-fallback")
            .child(
                Element::new("g")
                    .child(Element::new("defs").child(stops.into()).into())
                    .child(rect.into())
                    .into(),
            )
            .into())
    }
}

#[derive(Default)]
pub struct TimeStamp {
    props: Props,
}

impl TimeStamp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for TimeStamp {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let record = cx.require(&TWEET_RECORD, "Tweet.TimeStamp")?;
        let created_at = record_field(&record, |record| record.created_at.clone()).unwrap_or_default();
        let text = format_created_at(&created_at, cx.config().time_zone)?;
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("timestamp")
            .child(Node::text(text))
            .into())
    }
}

#[derive(Default)]
pub struct Toolbar {
    props: Props,
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Toolbar {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        container("div", "toolbar", &self.props, cx)
    }
}

fn intent_link(
    cx: &Cx,
    props: &Props,
    component: &'static str,
    part: &str,
    href: impl FnOnce(&TweetRecord) -> String,
) -> Result<Node, RenderError> {
    let record = cx.require(&TWEET_RECORD, component)?;
    let mut link = Element::new("a").attrs(props.attrs()).part(part);
    if let Some(href) = record_field(&record, href) {
        link = link.attr("href", href);
    }
    Ok(link
        .attr("target", TARGET)
        .attr("rel", REL)
        .children(props.render_children(cx)?)
        .into())
}

#[derive(Default)]
pub struct Like {
    props: Props,
}

impl Like {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Like {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        intent_link(cx, &self.props, "Tweet.Like", "like", TweetRecord::like_url)
    }
}

#[derive(Default)]
pub struct Reply {
    props: Props,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Reply {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        intent_link(cx, &self.props, "Tweet.Reply", "reply", TweetRecord::reply_url)
    }
}

#[derive(Default)]
pub struct Retweet {
    props: Props,
}

impl Retweet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Retweet {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        intent_link(cx, &self.props, "Tweet.Retweet", "retweet", TweetRecord::retweet_url)
    }
}

/// Button that copies the tweet's permalink and reports `copied` for a
/// while afterwards. The label is rendered from the `copied` flag.
pub struct CopyLink {
    copied: Rc<DeferredFlag>,
    render: Box<dyn Fn(bool) -> Node>,
    props: Props,
}

impl CopyLink {
    pub fn new(render: impl Fn(bool) -> Node + 'static) -> Self {
        Self {
            copied: DeferredFlag::new(),
            render: Box::new(render),
            props: Props::default(),
        }
    }

    pub fn is_copied(&self) -> bool {
        self.copied.is_raised()
    }
}

impl Component for CopyLink {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let record = cx.require(&TWEET_RECORD, "Tweet.CopyLink")?;
        self.copied.track(cx.runtime());

        let permalink = record_field(&record, TweetRecord::permalink);
        let clipboard = cx.config().clipboard.clone();
        let reset = cx.config().copied_reset;
        let runtime = cx.runtime().clone();
        let copied = self.copied.clone();
        let on_click = move || {
            let permalink = match &permalink {
                Some(permalink) => permalink,
                None => {
                    debug!("Nothing to copy without a tweet");
                    return;
                }
            };
            if let Err(err) = clipboard.write_text(permalink) {
                warn!("Failed to copy {}: {}", permalink, err);
                return;
            }
            if let Err(err) = copied.raise_for(&runtime, reset) {
                warn!("Could not start copied reset timer: {}", err);
            }
        };

        Ok(Element::new("button")
            .attrs(self.props.attrs())
            .part("copy-link")
            .on_click(on_click)
            .child((self.render)(self.copied.is_raised()))
            .children(self.props.render_children(cx)?)
            .into())
    }
}

#[derive(Default)]
pub struct Content {
    props: Props,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Content {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let record = cx.require(&TWEET_RECORD, "Tweet.Content")?;
        let html = record
            .with_record(|record| record.map(|record| linkify(&record.content)))
            .unwrap_or_default();
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("content")
            .child(Node::raw(html))
            .into())
    }
}

#[derive(Default)]
pub struct Author {
    props: Props,
}

impl Author {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Author {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        container("div", "author", &self.props, cx)
    }
}

#[derive(Default)]
pub struct AuthorName {
    props: Props,
}

impl AuthorName {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for AuthorName {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let record = cx.require(&TWEET_RECORD, "Tweet.AuthorName")?;
        let author = record_field(&record, |record| record.author.clone()).unwrap_or_default();
        Ok(Element::new("p")
            .attrs(self.props.attrs())
            .part("author-name")
            .child(Node::text(author))
            .into())
    }
}

#[derive(Default)]
pub struct AuthorProfileLink {
    props: Props,
}

impl AuthorProfileLink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for AuthorProfileLink {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        let record = cx.require(&TWEET_RECORD, "Tweet.AuthorProfileLink")?;
        let mut link = Element::new("a").attrs(self.props.attrs()).part("author-profile-link");
        if let Some(author_url) = record_field(&record, |record| record.author_url.clone()) {
            link = link.attr("href", author_url);
        }
        let author = record_field(&record, |record| record.author.clone()).unwrap_or_default();
        Ok(link
            .attr("target", TARGET)
            .attr("rel", REL)
            .child(Node::text(format!("@{}", author)))
            .into())
    }
}

impl_compose!(
    Root,
    Avatar,
    AvatarImage,
    AvatarFallback,
    AvatarGradientFallback,
    TimeStamp,
    Toolbar,
    Like,
    Reply,
    Retweet,
    CopyLink,
    Content,
    Author,
    AuthorName,
    AuthorProfileLink
);
