//! Wire protocol backends that run a batch against a collection.
//!
//! The backend is chosen once per bulk write from the server's capabilities and is
//! used for every batch of that bulk write.
mod command;
mod legacy;

pub use self::command::CommandExecutor;
pub use self::legacy::LegacyExecutor;

use coll::Collection;
use common::WriteConcern;
use Result;

use super::batch::Batch;
use super::results::BatchResult;

/// Executes a batch and reports its outcome in batch indices.
pub trait BatchExecutor {
    /// A short name for logs and monitoring events.
    fn name(&self) -> &'static str;

    /// Runs every operation of `batch`. An `ordered` execution stops at the first
    /// write error. `Err` means the batch could not be executed or its reply
    /// could not be understood; write errors are reported in the result.
    fn execute(&self,
               collection: &dyn Collection,
               batch: &Batch,
               ordered: bool,
               write_concern: &WriteConcern)
               -> Result<BatchResult>;
}

/// Returns the write command backend if the server supports write commands, and
/// the legacy backend otherwise.
pub fn for_server(supports_write_commands: bool) -> &'static dyn BatchExecutor {
    if supports_write_commands {
        &CommandExecutor
    } else {
        &LegacyExecutor
    }
}
