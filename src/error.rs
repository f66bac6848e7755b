//! The closed error taxonomy shared by every module in this crate.

use crate::Timestamp;

/// Everything that can go wrong parsing, mutating, or merging a series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("out of memory")]
    OutOfMemory,

    #[error("timestamp {timestamp} is not after the last timestamp {last}")]
    OutOfOrder { timestamp: Timestamp, last: Timestamp },

    #[error("a record already exists at timestamp {timestamp}")]
    AlreadyExists { timestamp: Timestamp },

    #[error("merge would intermix records between the two series")]
    Intermixing,

    #[error("merge would overwrite an existing record")]
    Overwriting,

    #[error("index {index} out of bounds (length is {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("invalid date: {input:?}")]
    InvalidDate { input: String },

    #[error("invalid floating point value: {input:?}")]
    InvalidFloat { input: String },

    #[error("invalid syntax: {line:?}")]
    InvalidSyntax { line: String },

    #[error("line too long or missing a terminator")]
    LineTooLong,

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
