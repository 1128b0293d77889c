use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("already exists")]
    AlreadyExists,

    #[error("session lookup collision")]
    SessionLookupCollision,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid session token format")]
    InvalidSessionToken,
}

pub type Result<T> = std::result::Result<T, Error>;
