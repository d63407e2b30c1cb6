//! The collection handle the bulk write engine executes against.
use bson::{self, Bson};

use bulk::operation::Operation;
use common::WriteConcern;
use topology;
use write_type::WriteType;
use Result;

/// An authenticated, topology-aware handle to a single MongoDB collection.
///
/// The engine calls these methods strictly sequentially and never from more than
/// one thread per bulk write. Transport failures should be surfaced as `Err`; they
/// abort the whole bulk write.
pub trait Collection {
    /// The namespace of this collection, formatted as db_name.coll_name.
    fn namespace(&self) -> String;

    /// Runs the isMaster command against the server that receives writes.
    fn is_master(&self) -> Result<bson::Document>;

    /// Reports whether the server accepts the insert, update and delete write
    /// commands. Queried once per bulk write execution.
    fn supports_write_commands(&self) -> Result<bool> {
        let reply = self.is_master()?;
        Ok(topology::supports_write_commands(&reply))
    }

    /// Sends one write command carrying every operation document of a batch and
    /// returns the server's reply unmodified.
    fn run_write_command(&self,
                         write_type: WriteType,
                         operations: Vec<bson::Document>,
                         ordered: bool,
                         write_concern: &WriteConcern)
                         -> Result<bson::Document>;

    /// Sends a single legacy insert, update or delete with `w: 1` and returns the
    /// getLastError acknowledgement for it.
    fn run_legacy_operation(&self, operation: &Operation) -> Result<bson::Document>;

    /// Resets the connection's last error and runs getLastError with the given write
    /// concern, returning the acknowledgement document.
    fn run_diagnostic_command(&self, write_concern: &WriteConcern) -> Result<bson::Document>;
}

/// Builds the command document a batch is sent as, for example
/// `{ insert: "coll", documents: [...], ordered: true, writeConcern: {...} }`.
pub fn write_command(collection_name: &str,
                     write_type: WriteType,
                     operations: Vec<bson::Document>,
                     ordered: bool,
                     write_concern: &WriteConcern)
                     -> bson::Document {
    let operations: Vec<Bson> = operations.into_iter().map(Bson::Document).collect();

    let mut command = bson::Document::new();
    command.insert(write_type.to_str(), collection_name);
    command.insert(write_type.payload_field(), operations);
    command.insert("ordered", ordered);
    command.insert("writeConcern", write_concern.to_bson());
    command
}
