use thiserror::Error as ThisError;
use twitzy_scope::ScopeMissingError;
use twitzy_tweet::TimestampError;

#[derive(Debug, ThisError)]
pub enum RenderError {
    #[error(transparent)]
    ScopeMissing(#[from] ScopeMissingError),
    #[error("Failed to render timestamp: {0}")]
    Timestamp(#[from] TimestampError),
}
