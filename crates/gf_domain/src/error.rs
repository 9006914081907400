use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Character {ch:?} cannot be encoded as {encoding}")]
    Unencodable { ch: char, encoding: &'static str },

    #[error("Item has no buffered content")]
    NotBuffered,

    #[error("Item path {0} does not stay below the output directory")]
    OutsideOutputDir(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DomainError>;
