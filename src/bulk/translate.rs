//! Classification of legacy getLastError acknowledgements.
//!
//! Legacy servers acknowledge each write with a getLastError document instead of
//! a write command reply. This module turns such a document into the write error
//! and write concern error a write command would have reported, following the
//! server's own extraction rules for batched legacy writes.
use bson::{self, Bson};

use Error::ResponseError;
use Result;

use super::error::{WriteConcernError, WriteError};

pub const UNKNOWN_ERROR: i32 = 8;
pub const WRITE_CONCERN_FAILED: i32 = 64;
pub const UNKNOWN_REPL_WRITE_CONCERN: i32 = 79;
pub const NOT_MASTER: i32 = 10107;
pub const WRITE_MODE_CHANGED_INVALID: i32 = 14330;
pub const NO_LONGER_PRIMARY: i32 = 19900;
pub const NO_LONGER_PRIMARY_REPLICATED_TO_NUM: i32 = 16805;

/// Codes that mean the write was applied but its durability is unknown.
const WRITE_CONCERN_CODES: [i32; 6] = [NO_LONGER_PRIMARY,
                                       NO_LONGER_PRIMARY_REPLICATED_TO_NUM,
                                       WRITE_MODE_CHANGED_INVALID,
                                       NOT_MASTER,
                                       UNKNOWN_REPL_WRITE_CONCERN,
                                       WRITE_CONCERN_FAILED];

/// The errors extracted from one acknowledgement. At most one is ever set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AckErrors {
    pub write_error: Option<WriteError>,
    pub write_concern_error: Option<WriteConcernError>,
}

impl AckErrors {
    pub fn is_clean(&self) -> bool {
        self.write_error.is_none() && self.write_concern_error.is_none()
    }
}

/// Classifies a getLastError acknowledgement.
///
/// Returns `Err(ResponseError)` when the acknowledgement reports failure (`ok`
/// falsy) without anything that identifies it as a write or write concern error.
pub fn translate(ack: &bson::Document) -> Result<AckErrors> {
    let is_ok = truthy(ack.get("ok"));
    let code = integer(ack.get("code")).unwrap_or(0) as i32;
    let err = string(ack.get("err"));
    let errmsg = string(ack.get("errmsg"));
    let jnote = string(ack.get("jnote"));
    let wnote = string(ack.get("wnote"));
    let timeout = truthy(ack.get("wtimeout"));

    let mut errors = AckErrors::default();

    // Replication is not enforced on this server.
    if err == "norepl" || err == "noreplset" {
        let message = first_nonempty(&[errmsg, wnote, err]);
        errors.write_concern_error = Some(WriteConcernError::new(WRITE_CONCERN_FAILED, message));
        return Ok(errors);
    }

    if timeout {
        let message = first_nonempty(&[errmsg, err]);
        errors.write_concern_error = Some(WriteConcernError::timeout(WRITE_CONCERN_FAILED, message));
        return Ok(errors);
    }

    if WRITE_CONCERN_CODES.contains(&code) {
        errors.write_concern_error = Some(WriteConcernError::new(code, errmsg));
        return Ok(errors);
    }

    if !is_ok {
        return Err(ResponseError(format!("Unexpected error from getLastError: {}", ack)));
    }

    if !err.is_empty() {
        let code = if code == 0 { UNKNOWN_ERROR } else { code };
        errors.write_error = Some(WriteError::new(code, err));
        return Ok(errors);
    }

    if !jnote.is_empty() {
        errors.write_error = Some(WriteError::new(WRITE_CONCERN_FAILED, jnote));
    }

    Ok(errors)
}

fn first_nonempty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates.iter().cloned().find(|s| !s.is_empty()).unwrap_or("")
}

/// Interprets a reply field the way the server's shell would in a boolean context.
pub fn truthy(value: Option<&Bson>) -> bool {
    match value {
        Some(&Bson::Boolean(b)) => b,
        Some(&Bson::I32(v)) => v != 0,
        Some(&Bson::I64(v)) => v != 0,
        Some(&Bson::FloatingPoint(v)) => v != 0.0,
        Some(&Bson::String(ref s)) => !s.is_empty() && s != "0",
        Some(&Bson::Null) | None => false,
        Some(_) => true,
    }
}

/// Reads a numeric reply field, whatever its BSON number type.
pub fn integer(value: Option<&Bson>) -> Option<i64> {
    match value {
        Some(&Bson::I32(v)) => Some(v as i64),
        Some(&Bson::I64(v)) => Some(v),
        Some(&Bson::FloatingPoint(v)) => Some(v as i64),
        _ => None,
    }
}

fn string(value: Option<&Bson>) -> &str {
    match value {
        Some(&Bson::String(ref s)) => s,
        _ => "",
    }
}
