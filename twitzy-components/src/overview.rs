//! Presentational grouping for a grid of tweet cards.

use crate::{
    component::{Component, Cx, Props},
    error::RenderError,
    node::{Element, Node},
};

#[derive(Default)]
pub struct Root {
    props: Props,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Root {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("overview-root")
            .children(self.props.render_children(cx)?)
            .into())
    }
}

#[derive(Default)]
pub struct Card {
    props: Props,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Card {
    fn render(&self, cx: &Cx) -> Result<Node, RenderError> {
        Ok(Element::new("div")
            .attrs(self.props.attrs())
            .part("overview-card")
            .children(self.props.render_children(cx)?)
            .into())
    }
}

impl_compose!(Root, Card);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::App, component::Compose};

    #[test]
    fn test_overview() {
        let overview = Root::new()
            .class("grid")
            .child(Card::new().child("one"))
            .child(Card::new().child("two"));
        let mut app = App::new(overview);
        assert_eq!(
            app.render().unwrap().to_html(),
            concat!(
                r#"<div class="grid" data-twitzy="overview-root">"#,
                r#"<div data-twitzy="overview-card">one</div>"#,
                r#"<div data-twitzy="overview-card">two</div>"#,
                r#"</div>"#
            )
        );
    }
}
