use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity service returned {status}: {message}")]
    Identity { status: u16, message: String },
    #[error("session snapshot io: {0}")]
    SnapshotIo(#[from] std::io::Error),
    #[error("session snapshot encoding: {0}")]
    SnapshotEncoding(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
