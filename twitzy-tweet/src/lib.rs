use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use twitzy_ref::TweetRef;

pub mod timestamp;
pub use timestamp::{
    format_created_at, format_timestamp, month_abbrev, parse_created_at, InvalidMonthError,
    TimestampError, Zone, TIMESTAMP_PLACEHOLDER,
};

/// One tweet as handed to `tweet::Root`.
///
/// Keys are camelCase on the wire (`authorUrl`, `createdAt`, `avatarSrc`).
/// Missing or null fields deserialize to empty strings, which the leaf
/// renderers treat as "no data yet".
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetRecord {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub id: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub author: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub author_url: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub content: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub created_at: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub avatar_src: String,
}

impl TweetRecord {
    pub fn tweet_ref(&self) -> TweetRef {
        TweetRef::new(self.id.as_str())
    }

    pub fn like_url(&self) -> String {
        self.tweet_ref().to_like_url()
    }

    pub fn reply_url(&self) -> String {
        self.tweet_ref().to_reply_url()
    }

    pub fn retweet_url(&self) -> String {
        self.tweet_ref().to_retweet_url()
    }

    pub fn permalink(&self) -> String {
        self.tweet_ref().to_permalink(self.author.as_str())
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A thread as it is laid out on a page: the head tweet is always shown,
/// the tails only when the thread is open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TweetThread {
    pub head: TweetRecord,
    pub tails: Vec<TweetRecord>,
}

impl TweetThread {
    pub fn from_tweets(tweets: Vec<TweetRecord>) -> Option<Self> {
        let mut tweets = tweets.into_iter();
        let head = tweets.next()?;
        Some(Self {
            head,
            tails: tweets.collect(),
        })
    }

    pub fn thread_id(&self) -> &str {
        self.head.id.as_str()
    }

    /// The head plus every tail.
    pub fn tweet_count(&self) -> usize {
        1 + self.tails.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eiffel(id: &str) -> TweetRecord {
        TweetRecord {
            id: id.to_string(),
            author: "EiffelFly".to_string(),
            author_url: "https://twitter.com/EiffelFly".to_string(),
            content: "hello".to_string(),
            created_at: "2023-03-20T02:46:14Z".to_string(),
            avatar_src: String::new(),
        }
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "author": "EiffelFly",
            "authorUrl": "https://twitter.com/EiffelFly",
            "avatarSrc": null,
            "id": "1639857928508145665",
            "content": "Just like you have roughly four sections of working memory.",
            "createdAt": "2023-03-20T02:46:14Z"
        }"#;
        let tweet = TweetRecord::from_json_str(json).unwrap();
        assert_eq!(tweet.id, "1639857928508145665");
        assert_eq!(tweet.author_url, "https://twitter.com/EiffelFly");
        assert_eq!(tweet.created_at, "2023-03-20T02:46:14Z");
        assert_eq!(tweet.avatar_src, "");
    }

    #[test]
    fn test_missing_fields_default() {
        let tweet = TweetRecord::from_json_str(r#"{"id": "1"}"#).unwrap();
        assert_eq!(tweet.author, "");
        assert_eq!(tweet.content, "");
    }

    #[test]
    fn test_serialize_keeps_wire_names() {
        let value = serde_json::to_value(eiffel("1")).unwrap();
        assert_eq!(value["authorUrl"], "https://twitter.com/EiffelFly");
        assert_eq!(value["createdAt"], "2023-03-20T02:46:14Z");
        assert!(value.get("author_url").is_none());
    }

    #[test]
    fn test_links() {
        let tweet = eiffel("42");
        assert_eq!(tweet.like_url(), "https://twitter.com/intent/like?tweet_id=42");
        assert_eq!(
            tweet.reply_url(),
            "https://twitter.com/intent/tweet?in_reply_to=42"
        );
        assert_eq!(
            tweet.retweet_url(),
            "https://twitter.com/intent/retweet?tweet_id=42"
        );
        assert_eq!(tweet.permalink(), "https://twitter.com/EiffelFly/status/42");
    }

    #[test]
    fn test_thread_from_tweets() {
        assert!(TweetThread::from_tweets(Vec::new()).is_none());

        let thread = TweetThread::from_tweets(vec![eiffel("1"), eiffel("2"), eiffel("3")]).unwrap();
        assert_eq!(thread.thread_id(), "1");
        assert_eq!(thread.tails.len(), 2);
        assert_eq!(thread.tweet_count(), 3);
    }
}
