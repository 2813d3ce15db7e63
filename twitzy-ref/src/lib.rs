use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, ops::Range};
use thiserror::Error as ThisError;

pub const TWITTER_URL: &str = "https://twitter.com";

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefError {
    #[error("Does not match as {ref_type}: {input}")]
    BadFormat {
        ref_type: &'static str,
        input: String,
    },
}

/// Id of a single tweet, as found in `TweetRecord::id`.
///
/// Ids are opaque: anything the data source hands out is accepted and used
/// verbatim in the intent links.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TweetRef(String);

impl TweetRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn to_like_url(&self) -> String {
        format!("{}/intent/like?tweet_id={}", TWITTER_URL, self.0)
    }

    pub fn to_reply_url(&self) -> String {
        format!("{}/intent/tweet?in_reply_to={}", TWITTER_URL, self.0)
    }

    pub fn to_retweet_url(&self) -> String {
        format!("{}/intent/retweet?tweet_id={}", TWITTER_URL, self.0)
    }

    pub fn to_permalink(&self, author: &str) -> String {
        format!("{}/{}/status/{}", TWITTER_URL, author, self.0)
    }
}

impl From<&str> for TweetRef {
    fn from(value: &str) -> Self {
        TweetRef::new(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct MentionRef(String);

impl MentionRef {
    // From string that starts with @
    pub fn from_string(string: String) -> Result<Self, RefError> {
        if !Self::is_match(string.as_str()) {
            Err(RefError::BadFormat {
                ref_type: "Mention",
                input: string,
            })
        } else {
            Ok(Self(string[1..].to_string()))
        }
    }

    pub fn handle(&self) -> &str {
        self.0.as_str()
    }

    pub fn to_string(&self) -> String {
        format!("@{}", self.0)
    }

    pub fn single_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^@[A-Za-z0-9_\-]+$").unwrap();
        }
        &*RE
    }

    pub fn multi_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"@[A-Za-z0-9_\-]+").unwrap();
        }
        &*RE
    }

    pub fn is_match(string: &str) -> bool {
        let regex = Self::single_regex();
        regex.is_match(string)
    }

    pub fn to_page_url(&self) -> String {
        format!("{}/{}", TWITTER_URL, self.0)
    }

    /// All mentions in `text` that do not sit right after a word character,
    /// so `mail@example` is left alone while `(@bob` is a mention.
    pub fn find_all(text: &str) -> Vec<(Range<usize>, MentionRef)> {
        Self::multi_regex()
            .find_iter(text)
            .filter(|mat| !follows_word_char(text, mat.start()))
            .map(|mat| (mat.range(), MentionRef(mat.as_str()[1..].to_string())))
            .collect()
    }
}

impl TryFrom<String> for MentionRef {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MentionRef::from_string(value)
    }
}

impl From<&MentionRef> for String {
    fn from(value: &MentionRef) -> String {
        value.to_string()
    }
}

impl From<MentionRef> for String {
    fn from(value: MentionRef) -> String {
        value.to_string()
    }
}

/// A `#tag` token. Runs of leading `#` are kept in the token; only the first
/// one is dropped when building the hashtag page url.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String")]
pub struct HashtagRef(String);

impl HashtagRef {
    // From string that starts with #
    pub fn from_string(string: String) -> Result<Self, RefError> {
        if !Self::is_match(string.as_str()) {
            Err(RefError::BadFormat {
                ref_type: "Hashtag",
                input: string,
            })
        } else {
            Ok(Self(string))
        }
    }

    pub fn to_string(&self) -> String {
        self.0.clone()
    }

    pub fn tag(&self) -> &str {
        &self.0[1..]
    }

    pub fn single_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^#+[a-zA-Z0-9(_)]+$").unwrap();
        }
        &*RE
    }

    pub fn multi_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"#+[a-zA-Z0-9(_)]+").unwrap();
        }
        &*RE
    }

    pub fn is_match(string: &str) -> bool {
        let regex = Self::single_regex();
        regex.is_match(string)
    }

    pub fn to_page_url(&self) -> String {
        format!("{}/hashtag/{}", TWITTER_URL, self.tag())
    }

    pub fn find_all(text: &str) -> Vec<(Range<usize>, HashtagRef)> {
        Self::multi_regex()
            .find_iter(text)
            .map(|mat| (mat.range(), HashtagRef(mat.as_str().to_string())))
            .collect()
    }
}

impl TryFrom<String> for HashtagRef {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HashtagRef::from_string(value)
    }
}

impl From<&HashtagRef> for String {
    fn from(value: &HashtagRef) -> String {
        value.to_string()
    }
}

/// A bare http, https or ftp url found in tweet text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String")]
pub struct UrlRef(String);

impl UrlRef {
    pub fn from_string(string: String) -> Result<Self, RefError> {
        if !Self::is_match(string.as_str()) {
            Err(RefError::BadFormat {
                ref_type: "Url",
                input: string,
            })
        } else {
            Ok(Self(string))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Url without its `http://` or `https://` prefix.
    pub fn display_text(&self) -> &str {
        match Self::scheme_regex().find(self.0.as_str()) {
            Some(mat) => &self.0[mat.end()..],
            None => self.0.as_str(),
        }
    }

    pub fn single_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(&format!("^{}$", URL_RE_STRING)).unwrap();
        }
        &*RE
    }

    pub fn multi_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(URL_RE_STRING).unwrap();
        }
        &*RE
    }

    pub fn is_match(string: &str) -> bool {
        let regex = Self::single_regex();
        regex.is_match(string)
    }

    pub fn find_first(text: &str) -> Option<(Range<usize>, UrlRef)> {
        Self::multi_regex()
            .find(text)
            .map(|mat| (mat.range(), UrlRef(mat.as_str().to_string())))
    }

    fn scheme_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"(?i)^https?://").unwrap();
        }
        &*RE
    }
}

impl TryFrom<String> for UrlRef {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UrlRef::from_string(value)
    }
}

const URL_RE_STRING: &str = r"(?:http|ftp|https)://[A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)+(?:[A-Za-z0-9_.,@?^=%&;:/~+#\-]*[A-Za-z0-9_@?^=%&;/~+#\-])?";

fn follows_word_char(text: &str, index: usize) -> bool {
    text[..index]
        .chars()
        .next_back()
        .map(|c| c.is_ascii_alphanumeric() || c == '_')
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_intent_urls() {
        let tweet = TweetRef::new("1639857928508145665");
        assert_eq!(
            tweet.to_like_url(),
            "https://twitter.com/intent/like?tweet_id=1639857928508145665"
        );
        assert_eq!(
            tweet.to_reply_url(),
            "https://twitter.com/intent/tweet?in_reply_to=1639857928508145665"
        );
        assert_eq!(
            tweet.to_retweet_url(),
            "https://twitter.com/intent/retweet?tweet_id=1639857928508145665"
        );
        assert_eq!(
            tweet.to_permalink("EiffelFly"),
            "https://twitter.com/EiffelFly/status/1639857928508145665"
        );
    }

    #[test]
    fn test_mention() {
        let mention = MentionRef::from_string("@bob".to_string()).unwrap();
        assert_eq!(mention.handle(), "bob");
        assert_eq!(mention.to_string(), "@bob");
        assert_eq!(mention.to_page_url(), "https://twitter.com/bob");
        assert!(MentionRef::from_string("bob".to_string()).is_err());
    }

    #[test]
    fn test_mention_skips_word_prefix() {
        let found = MentionRef::find_all("mail me@home or ping @bob, (@carol-x)");
        let handles: Vec<&str> = found.iter().map(|(_, m)| m.handle()).collect();
        assert_eq!(handles, vec!["bob", "carol-x"]);
    }

    #[test]
    fn test_hashtag() {
        let hashtag = HashtagRef::from_string("#rust".to_string()).unwrap();
        assert_eq!(hashtag.tag(), "rust");
        assert_eq!(hashtag.to_page_url(), "https://twitter.com/hashtag/rust");

        let doubled = HashtagRef::from_string("##rust".to_string()).unwrap();
        assert_eq!(doubled.to_page_url(), "https://twitter.com/hashtag/#rust");

        assert!(HashtagRef::from_string("#".to_string()).is_err());
    }

    #[test]
    fn test_url() {
        let (range, url) = UrlRef::find_first("see https://x.co/a?b=1. ok").unwrap();
        assert_eq!(range, 4..22);
        assert_eq!(url.as_str(), "https://x.co/a?b=1");
        assert_eq!(url.display_text(), "x.co/a?b=1");

        let ftp = UrlRef::from_string("ftp://files.example.org".to_string()).unwrap();
        assert_eq!(ftp.display_text(), "ftp://files.example.org");

        assert!(UrlRef::find_first("no links here").is_none());
    }
}
