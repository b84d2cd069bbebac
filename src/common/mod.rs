pub mod constants;
pub mod utility;

use std::fmt;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors surfaced by the storage engine. These are kinds rather than
/// wrappers: callers match on the variant to decide whether an error is
/// recoverable (e.g. [`Error::PageFull`] during an insert scan) or fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A tuple or operator schema differs from the page/table schema.
    SchemaMismatch(String),
    /// A tuple, table, or column is absent.
    NotFound(String),
    /// No free slot on the page; the caller may try the next page.
    PageFull,
    /// Page number past the end of the backing file.
    BadPageNumber(String),
    /// Disk-level failure.
    Io(String),
    /// Lock acquisition gave up. The holder of the transaction must call
    /// `transaction_complete(tid, false)`.
    Aborted,
    /// Every cached page is dirty; nothing can be evicted.
    CacheFull,
    /// The operation is not defined, e.g. SUM over a text column.
    Unsupported(String),
    /// Malformed input or argument.
    InvalidInput(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SchemaMismatch(msg) => write!(f, "schema mismatch: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::PageFull => write!(f, "page has no free slot"),
            Error::BadPageNumber(msg) => write!(f, "bad page number: {msg}"),
            Error::Io(msg) => write!(f, "io error: {msg}"),
            Error::Aborted => write!(f, "transaction aborted waiting for a page lock"),
            Error::CacheFull => write!(f, "buffer pool is full of dirty pages"),
            Error::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Lets error construction sites write `Result::from(Error::PageFull)` or
/// `return Error::CacheFull.into()` without spelling out `Err(..)`.
impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}

/// Constructs an `Err(Error::InvalidInput)` from a format string.
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => {
        $crate::common::Error::InvalidInput(format!($($args)*)).into()
    };
}
