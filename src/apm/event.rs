use std::fmt::{Display, Error, Formatter};

use error::Error as BulkError;
use write_type::WriteType;

/// Published before a batch is sent to the server.
pub struct BatchStarted {
    pub namespace: String,
    /// Zero-based position of the batch in its bulk write.
    pub batch_number: usize,
    pub write_type: WriteType,
    pub executor: &'static str,
    pub operation_count: usize,
    pub size_bytes: usize,
}

impl Display for BatchStarted {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), Error> {
        fmt.write_fmt(format_args!("BATCH.{} {} #{} STARTED: {} operations, {} bytes via {}",
                                   self.write_type,
                                   self.namespace,
                                   self.batch_number,
                                   self.operation_count,
                                   self.size_bytes,
                                   self.executor))
    }
}

/// Published after a batch has been executed or has failed to execute.
pub enum BatchCompleted<'a> {
    Success {
        duration: u64,
        namespace: String,
        batch_number: usize,
        write_type: WriteType,
        /// Operations the batch inserted, matched, upserted or removed.
        affected: i64,
        write_errors: usize,
        write_concern_errors: usize,
    },
    Failure {
        duration: u64,
        namespace: String,
        batch_number: usize,
        write_type: WriteType,
        failure: &'a BulkError,
    },
}

impl<'a> BatchCompleted<'a> {
    pub fn write_type(&self) -> WriteType {
        match *self {
            BatchCompleted::Success { write_type, .. } |
            BatchCompleted::Failure { write_type, .. } => write_type,
        }
    }
}

impl<'a> Display for BatchCompleted<'a> {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), Error> {
        match *self {
            BatchCompleted::Success { duration, ref namespace, batch_number, write_type,
                                      affected, write_errors, write_concern_errors } => {
                fmt.write_fmt(format_args!("BATCH.{} {} #{} COMPLETED: {} affected, {} write \
                                            errors, {} write concern errors ({} ns)",
                                           write_type, namespace, batch_number, affected,
                                           write_errors, write_concern_errors, duration))
            }
            BatchCompleted::Failure { duration, ref namespace, batch_number, write_type,
                                      failure } => {
                fmt.write_fmt(format_args!("BATCH.{} {} #{} FAILURE: {} ({} ns)",
                                           write_type, namespace, batch_number, failure,
                                           duration))
            }
        }
    }
}
