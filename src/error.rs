use std::io;

use thiserror::Error;

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, CabError>;

/// Errors that can occur while parsing or extracting a cabinet.
///
/// The variants are deliberately coarse so that a wrapper (e.g. a CLI) can
/// map each failure class to a distinct exit status.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CabError {
    /// The cabinet is malformed: bad signature, truncated record, checksum
    /// mismatch, invalid name bytes, or an inconsistent compressed stream.
    /// Unrecoverable for the current archive.
    #[error("corrupt cabinet: {0}")]
    Corrupt(String),

    /// The cabinet is well-formed but uses a feature this crate does not
    /// cover (spanned sets, Quantum compression, newer format versions).
    #[error("unsupported cabinet feature: {0}")]
    Unsupported(String),

    /// An underlying read or write failed; passed through unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The caller misused an API, e.g. seeking the byte source backwards.
    #[error("usage error: {0}")]
    Usage(String),
}

impl CabError {
    /// Maps an I/O error from a record read to `Corrupt`: running out of
    /// input mid-record means the archive is truncated, not that the
    /// source failed.
    pub(crate) fn from_record_read(err: io::Error, record: &str) -> CabError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CabError::Corrupt(format!("EOF reading {record}"))
        } else {
            CabError::Io(err)
        }
    }
}

macro_rules! corrupt {
    ($e:expr) => {
        return Err($crate::error::CabError::Corrupt($e.to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::CabError::Corrupt(format!($fmt, $($arg)+)))
    };
}

macro_rules! unsupported {
    ($e:expr) => {
        return Err($crate::error::CabError::Unsupported($e.to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::CabError::Unsupported(
            format!($fmt, $($arg)+),
        ))
    };
}

macro_rules! usage {
    ($e:expr) => {
        return Err($crate::error::CabError::Usage($e.to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::CabError::Usage(format!($fmt, $($arg)+)))
    };
}
