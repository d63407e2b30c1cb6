//! Write errors and write concern errors reported by bulk writes.
//!
//! Neither is raised as an `Error`: both are collected into the `BulkResult` so
//! that the caller can see which operations failed and which succeeded.
use bson::{self, Bson};
use std::fmt;

use Error::ResponseError;
use Result;

use super::operation::Operation;

/// A failure of a single write operation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteError {
    pub code: i32,
    pub message: String,
}

/// A write that was applied but did not satisfy the requested write concern.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteConcernError {
    pub code: i32,
    pub message: String,
    /// Server-provided details, e.g. `{ wtimeout: true }` for timeouts.
    pub details: Option<bson::Document>,
}

/// A failed operation of a bulk write, identified by its index in the bulk write
/// (or, before aggregation, in its batch).
#[derive(Debug, Clone, PartialEq)]
pub struct BulkWriteError {
    pub index: usize,
    pub code: i32,
    pub message: String,
    pub request: Option<Operation>,
}

impl WriteError {
    /// Returns a new WriteError containing the provided error information.
    pub fn new<T: ToString>(code: i32, message: T) -> WriteError {
        WriteError {
            code: code,
            message: message.to_string(),
        }
    }
}

impl WriteConcernError {
    /// Returns a new WriteConcernError containing the provided error information.
    pub fn new<T: ToString>(code: i32, message: T) -> WriteConcernError {
        WriteConcernError {
            code: code,
            message: message.to_string(),
            details: None,
        }
    }

    /// Returns a WriteConcernError for a replication timeout.
    pub fn timeout<T: ToString>(code: i32, message: T) -> WriteConcernError {
        WriteConcernError {
            code: code,
            message: message.to_string(),
            details: Some(doc! { "wtimeout": true }),
        }
    }

    /// Reports whether replication timed out before the write concern was met.
    pub fn is_timeout(&self) -> bool {
        match self.details {
            Some(ref details) => details.get_bool("wtimeout").unwrap_or(false),
            None => false,
        }
    }

    /// Parses the `writeConcernError` document of a write command reply.
    pub fn parse(error: &bson::Document) -> Result<WriteConcernError> {
        match (error.get("code").and_then(as_code), error.get("errmsg")) {
            (Some(code), Some(&Bson::String(ref message))) => {
                let details = match error.get("errInfo") {
                    Some(&Bson::Document(ref info)) => Some(info.clone()),
                    _ => None,
                };

                Ok(WriteConcernError {
                    code: code,
                    message: message.to_owned(),
                    details: details,
                })
            }
            _ => Err(ResponseError(format!("WriteConcernError document is invalid: {}", error))),
        }
    }
}

impl BulkWriteError {
    /// Returns a new BulkWriteError containing the provided error information.
    pub fn new<T: ToString>(index: usize,
                            code: i32,
                            message: T,
                            request: Option<Operation>)
                            -> BulkWriteError {
        BulkWriteError {
            index: index,
            code: code,
            message: message.to_string(),
            request: request,
        }
    }

    /// Parses an entry of a write command reply's `writeErrors` array. The index
    /// refers to the position of the operation within the command's batch.
    pub fn parse(error: &bson::Document) -> Result<BulkWriteError> {
        let index = error.get("index").and_then(as_code).filter(|&i| i >= 0);

        match (index, error.get("code").and_then(as_code), error.get("errmsg")) {
            (Some(index), Some(code), Some(&Bson::String(ref message))) => {
                Ok(BulkWriteError::new(index as usize, code, message, None))
            }
            _ => Err(ResponseError(format!("WriteError document is invalid: {}", error))),
        }
    }
}

// Servers report codes and indices as either 32- or 64-bit integers. Values
// outside the i32 range are malformed rather than wrapped.
fn as_code(bson: &Bson) -> Option<i32> {
    match *bson {
        Bson::I32(v) => Some(v),
        Bson::I64(v) if v >= i64::from(i32::MIN) && v <= i64::from(i32::MAX) => Some(v as i32),
        Bson::FloatingPoint(v) if v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) => {
            Some(v as i32)
        }
        _ => None,
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "WriteError (code {}): {}", self.code, self.message)
    }
}

impl fmt::Display for WriteConcernError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "WriteConcernError (code {}): {}", self.code, self.message)?;

        if self.is_timeout() {
            fmt.write_str(" (timed out)")?;
        }

        Ok(())
    }
}

impl fmt::Display for BulkWriteError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt,
               "BulkWriteError at index {} (code {}): {}",
               self.index,
               self.code,
               self.message)?;

        match self.request {
            Some(ref request) => write!(fmt, " Failed to execute request {:?}.", request),
            None => fmt.write_str(" No additional error information was received."),
        }
    }
}
