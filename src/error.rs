//! Error types for the bulk write engine.
//!
//! Per-operation write failures and write concern failures are not errors in this
//! sense; they are reported inside a `BulkResult`. An `Error` means the bulk write
//! could not be built or could not run to completion.
use bson::{self, oid};
use serde_json;

use std::{error, fmt, io, result, sync};

/// A type for results generated by the bulk write engine, where the `Err` type is
/// `mongodb_bulk::Error`.
pub type Result<T> = result::Result<T, Error>;

/// The error type for bulk write operations.
#[derive(Debug)]
pub enum Error {
    /// A submitted operation or option is invalid.
    ArgumentError(String),
    /// A batch bound would be violated by an addition.
    CapacityError(String),
    /// The engine was used incorrectly, e.g. a bulk handle executed twice.
    OperationError(String),
    /// A server reply could not be interpreted.
    ResponseError(String),
    /// A write command was rejected as a whole (`ok: 0`).
    CommandError(i32, String),
    /// A document could not be encoded to BSON.
    EncoderError(bson::EncoderError),
    /// An ObjectId could not be generated.
    OIDError(oid::Error),
    /// A configuration document could not be parsed.
    JsonError(serde_json::Error),
    /// The transport surfaced an I/O failure.
    IoError(io::Error),
    /// A monitoring lock was poisoned.
    LockError,
}

impl From<bson::EncoderError> for Error {
    fn from(err: bson::EncoderError) -> Error {
        Error::EncoderError(err)
    }
}

impl From<oid::Error> for Error {
    fn from(err: oid::Error) -> Error {
        Error::OIDError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::JsonError(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Error {
        Error::LockError
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ArgumentError(ref inner) => inner.fmt(fmt),
            Error::CapacityError(ref inner) => inner.fmt(fmt),
            Error::OperationError(ref inner) => inner.fmt(fmt),
            Error::ResponseError(ref inner) => inner.fmt(fmt),
            Error::CommandError(code, ref message) => {
                write!(fmt, "Write command failed (code {}): {}", code, message)
            }
            Error::EncoderError(ref inner) => inner.fmt(fmt),
            Error::OIDError(ref inner) => inner.fmt(fmt),
            Error::JsonError(ref inner) => inner.fmt(fmt),
            Error::IoError(ref inner) => inner.fmt(fmt),
            Error::LockError => fmt.write_str("Monitoring lock poisoned."),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::EncoderError(ref inner) => Some(inner),
            Error::OIDError(ref inner) => Some(inner),
            Error::JsonError(ref inner) => Some(inner),
            Error::IoError(ref inner) => Some(inner),
            _ => None,
        }
    }
}

impl Error {
    /// Returns true if the error was raised before any remote call could be made,
    /// meaning the submission itself must change rather than be retried.
    pub fn is_validation_error(&self) -> bool {
        match *self {
            Error::ArgumentError(_) | Error::CapacityError(_) | Error::EncoderError(_) => true,
            _ => false,
        }
    }
}
