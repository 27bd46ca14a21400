use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("unknown goal view mode: {0}")]
    UnknownViewMode(String),
}

pub type ParseResult<T> = Result<T, ParseError>;
