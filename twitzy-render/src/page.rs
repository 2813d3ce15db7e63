use twitzy_components::{
    threads::{Thread, ThreadFront, ThreadTails, ThreadTrigger, Threads},
    tweet, Compose, Element, Node,
};
use twitzy_tweet::{TweetRecord, TweetThread};

pub const TRIGGER_LABEL: &str = "Open thread";

const AVATAR_SIZE: u32 = 48;

/// Avatar, author, content, timestamp and toolbar of one tweet.
pub fn tweet_card(record: TweetRecord) -> tweet::Root {
    tweet::Root::new(Some(record))
        .class("tweet")
        .child(
            tweet::Author::new()
                .class("tweet-author")
                .child(
                    tweet::Avatar::new()
                        .child(tweet::AvatarImage::new().class("tweet-avatar"))
                        .child(tweet::AvatarGradientFallback::new(AVATAR_SIZE).class("tweet-avatar")),
                )
                .child(tweet::AuthorName::new())
                .child(tweet::AuthorProfileLink::new()),
        )
        .child(tweet::Content::new().class("tweet-content"))
        .child(tweet::TimeStamp::new().class("tweet-timestamp"))
        .child(
            tweet::Toolbar::new()
                .class("tweet-toolbar")
                .child(tweet::Like::new().child("Like"))
                .child(tweet::Reply::new().child("Reply"))
                .child(tweet::Retweet::new().child("Retweet"))
                .child(tweet::CopyLink::new(|copied| {
                    Node::text(if copied { "Copied" } else { "Copy link" })
                })),
        )
}

pub fn thread_page(thread: TweetThread) -> Threads {
    let TweetThread { head, tails } = thread;
    let thread_id = head.id.clone();

    Threads::new().child(
        Thread::new(thread_id)
            .child(ThreadFront::new().child(tweet_card(head)))
            .children(
                tails
                    .into_iter()
                    .map(|tail| ThreadTails::new().child(tweet_card(tail))),
            )
            .child(ThreadTrigger::new().child(TRIGGER_LABEL)),
    )
}

pub fn document(title: &str, body: &Node) -> String {
    let head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8").into())
        .child(Element::new("title").child(Node::text(title)).into());
    let html = Element::new("html")
        .attr("lang", "en")
        .child(head.into())
        .child(Element::new("body").child(body.clone()).into());
    format!("<!DOCTYPE html>\n{}\n", html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use twitzy_components::App;

    fn record(id: &str, content: &str) -> TweetRecord {
        TweetRecord {
            id: id.to_string(),
            author: "EiffelFly".to_string(),
            author_url: "https://twitter.com/EiffelFly".to_string(),
            content: content.to_string(),
            created_at: "2023-03-20T02:46:14Z".to_string(),
            avatar_src: String::new(),
        }
    }

    #[test]
    fn test_thread_page() {
        let thread = TweetThread::from_tweets(vec![
            record("1", "first"),
            record("2", "second"),
            record("3", "third"),
        ])
        .unwrap();
        let mut app = App::new(thread_page(thread));

        let output = app.render().unwrap();
        assert_eq!(output.find_parts("tweet-root").len(), 1);
        assert_eq!(output.find_parts("avatar-gradient-fallback").len(), 1);

        app.click_part("thread-trigger").unwrap();
        let output = app.output();
        assert_eq!(output.find_parts("thread-tails").len(), 2);
        assert_eq!(output.find_parts("tweet-root").len(), 3);
        assert_eq!(
            output.find_part("thread").unwrap().get_attr("data-thread-id"),
            Some("1")
        );
    }

    #[test]
    fn test_document() {
        let html = document("EiffelFly", &Node::text("body"));
        assert_eq!(
            html,
            concat!(
                "<!DOCTYPE html>\n",
                r#"<html lang="en"><head><meta charset="utf-8"><title>EiffelFly</title></head>"#,
                "<body>body</body></html>\n"
            )
        );
    }
}
