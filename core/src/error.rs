use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IoError,
};

/// Errors that can occur while packing, unpacking, or round-tripping a tensor.
#[derive(Debug)]
pub enum PackError {
    /// A COO line could not be parsed.
    Parse {
        /// 1-based line number within the input stream.
        line: usize,
        /// What went wrong.
        detail: String,
    },

    /// A 1-based coordinate did not fit in a 32-bit signed integer.
    CoordinateOverflow {
        /// 1-based line number within the input stream.
        line: usize,
        /// The offending coordinate value.
        value: i64,
    },

    /// The format's order didn't match the coordinate stream's order, or a
    /// mode encoding was incompatible with the data it was asked to hold.
    FormatMismatch(String),

    /// A typed index buffer push would lose information under its chosen width.
    Overflow {
        /// The integer width the buffer was constructed with.
        index_type: &'static str,
        /// The value that didn't fit.
        value: i128,
    },

    /// A stream open/read/write failure.
    Io(IoError),

    /// An operation that is explicitly unimplemented in this revision.
    Unsupported(&'static str),
}

impl Display for PackError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Parse { line, detail } => write!(f, "malformed COO line {line}: {detail}"),
            Self::CoordinateOverflow { line, value } => {
                write!(f, "coordinate {value} on line {line} exceeds i32::MAX")
            }
            Self::FormatMismatch(message) => write!(f, "format mismatch: {message}"),
            Self::Overflow { index_type, value } => {
                write!(f, "value {value} does not fit in index type {index_type}")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl Error for PackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IoError> for PackError {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

/// A type alias for a `Result` with a [PackError].
pub type PackResult<T> = Result<T, PackError>;
