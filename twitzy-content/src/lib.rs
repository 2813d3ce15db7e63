use lazy_static::lazy_static;
use log::trace;
use regex::Regex;
use std::ops::Range;
use twitzy_ref::{HashtagRef, MentionRef, UrlRef};

/// A run of tweet text is either plain text, which the link passes may
/// rewrite, or markup (tags and whole anchors), which they must not touch.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Markup(String),
}

/// Turns the first bare url, then every `@mention`, then every `#hashtag`
/// into anchors.
///
/// Each pass only looks at text outside of markup, so a later pass never
/// re-matches the attributes or labels of anchors written by an earlier one,
/// and feeding the output back in returns it unchanged.
pub fn linkify(text: &str) -> String {
    let segments = split_markup(text);

    let mut url_found = segments.iter().any(|segment| match segment {
        Segment::Markup(markup) => url_anchor_regex().is_match(markup),
        Segment::Text(_) => false,
    });
    let segments = replace_text(segments, |text| {
        if url_found {
            return Vec::new();
        }
        match UrlRef::find_first(text) {
            Some((range, url)) => {
                trace!("Linking url {}", url.as_str());
                url_found = true;
                vec![(range, url_anchor(&url))]
            }
            None => Vec::new(),
        }
    });

    let segments = replace_text(segments, |text| {
        MentionRef::find_all(text)
            .into_iter()
            .map(|(range, mention)| (range, mention_anchor(&mention)))
            .collect()
    });

    let segments = replace_text(segments, |text| {
        HashtagRef::find_all(text)
            .into_iter()
            .map(|(range, hashtag)| (range, hashtag_anchor(&hashtag)))
            .collect()
    });

    segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text,
            Segment::Markup(markup) => markup,
        })
        .collect()
}

pub fn url_anchor(url: &UrlRef) -> String {
    format!(
        r#"<a href="{}" target="_blank">{}</a>"#,
        url.as_str(),
        url.display_text()
    )
}

pub fn mention_anchor(mention: &MentionRef) -> String {
    format!(
        r#"<a href="{}" target="_blank">{}</a>"#,
        mention.to_page_url(),
        mention.to_string()
    )
}

pub fn hashtag_anchor(hashtag: &HashtagRef) -> String {
    format!(
        r#"<a href="{}" target="_blank">{}</a>"#,
        hashtag.to_page_url(),
        hashtag.to_string()
    )
}

fn markup_regex() -> &'static Regex {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"(?is)<a\b[^>]*>.*?</a\s*>|<[a-z/!][^<>]*>").unwrap();
    }
    &*RE
}

// an anchor to a web url, as opposed to a mention or hashtag anchor
fn url_anchor_regex() -> &'static Regex {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r#"(?is)^<a\b[^>]*\bhref="https?://[^"]*"[^>]*>\s*[^@#\s<]"#).unwrap();
    }
    &*RE
}

fn split_markup(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last_match_end = 0;
    for mat in markup_regex().find_iter(text) {
        if mat.start() > last_match_end {
            segments.push(Segment::Text(text[last_match_end..mat.start()].to_string()));
        }
        segments.push(Segment::Markup(mat.as_str().to_string()));
        last_match_end = mat.end();
    }
    if last_match_end < text.len() {
        segments.push(Segment::Text(text[last_match_end..].to_string()));
    }
    segments
}

fn replace_text<F>(segments: Vec<Segment>, mut find: F) -> Vec<Segment>
where
    F: FnMut(&str) -> Vec<(Range<usize>, String)>,
{
    let mut replaced = Vec::with_capacity(segments.len());
    for segment in segments {
        let text = match segment {
            Segment::Text(text) => text,
            markup => {
                replaced.push(markup);
                continue;
            }
        };

        let mut last_match_end = 0;
        for (range, anchor) in find(&text) {
            if range.start > last_match_end {
                replaced.push(Segment::Text(text[last_match_end..range.start].to_string()));
            }
            replaced.push(Segment::Markup(anchor));
            last_match_end = range.end;
        }
        if last_match_end < text.len() {
            replaced.push(Segment::Text(text[last_match_end..].to_string()));
        }
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor_count(html: &str) -> usize {
        html.matches("<a ").count()
    }

    #[test]
    fn test_linkify_url_mention_hashtag() {
        let html = linkify("check http://x.co @bob #tag");
        assert_eq!(
            html,
            concat!(
                r#"check <a href="http://x.co" target="_blank">x.co</a> "#,
                r#"<a href="https://twitter.com/bob" target="_blank">@bob</a> "#,
                r#"<a href="https://twitter.com/hashtag/tag" target="_blank">#tag</a>"#
            )
        );
        assert_eq!(anchor_count(&html), 3);
    }

    #[test]
    fn test_linkify_is_idempotent() {
        let once = linkify("check http://x.co @bob #tag");
        let twice = linkify(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_only_first_url() {
        let html = linkify("a http://a.io b http://b.io");
        assert_eq!(anchor_count(&html), 1);
        assert!(html.ends_with(" b http://b.io"));
    }

    #[test]
    fn test_linkify_twice_keeps_second_url_bare() {
        let once = linkify("a http://a.io b http://b.io @bob");
        let twice = linkify(&once);
        assert_eq!(once, twice);
        assert!(twice.contains(" b http://b.io "));
        assert_eq!(anchor_count(&twice), 2);
    }

    #[test]
    fn test_existing_link_counts_as_first_url() {
        let text = r#"<a href="https://x.co" target="_blank">x.co</a> then http://b.io"#;
        assert_eq!(linkify(text), text);
    }

    #[test]
    fn test_angle_brackets_in_text() {
        let html = linkify("1 < 2 @bob #rust > 0");
        assert_eq!(
            html,
            concat!(
                r#"1 < 2 <a href="https://twitter.com/bob" target="_blank">@bob</a> "#,
                r#"<a href="https://twitter.com/hashtag/rust" target="_blank">#rust</a> > 0"#
            )
        );
        assert_eq!(linkify(&html), html);
    }

    #[test]
    fn test_url_parts_not_relinked() {
        let html = linkify("see https://x.co/@bob#top");
        assert_eq!(anchor_count(&html), 1);
        assert_eq!(
            html,
            r#"see <a href="https://x.co/@bob#top" target="_blank">x.co/@bob#top</a>"#
        );
    }

    #[test]
    fn test_markup_kept() {
        let html = linkify("<b>#bold</b> mail@home");
        assert_eq!(
            html,
            r#"<b><a href="https://twitter.com/hashtag/bold" target="_blank">#bold</a></b> mail@home"#
        );
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(linkify(""), "");
        assert_eq!(linkify("nothing to see"), "nothing to see");
    }
}
