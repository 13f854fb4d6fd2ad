use thiserror::Error;

/// Domain error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input (bad category, bad username shape, ...).
    #[error("{0}")]
    Validation(String),

    /// The referenced user / friendship / invite does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Visibility or ownership check failed.
    #[error("not allowed")]
    Forbidden,

    /// A friendship row already exists for the pair, in either direction.
    #[error("friend request already exists")]
    AlreadyExists,

    /// Invite or reset token past its expiry.
    #[error("{0} expired")]
    Expired(&'static str),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
