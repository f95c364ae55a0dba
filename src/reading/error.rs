use thiserror::Error;

use crate::gateway::GatewayError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, ReadingError>;

#[derive(Debug, Error)]
pub enum ReadingError {
    /// Unknown id, or a story the caller may not see
    #[error("Story {0} not found")]
    StoryNotFound(i64),

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown action '{0}'")]
    InvalidAction(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
