use bson::{self, Bson};

use coll::Collection;
use common::WriteConcern;
use Error::{OperationError, ResponseError};
use Result;

use bulk::batch::Batch;
use bulk::error::BulkWriteError;
use bulk::operation::Operation;
use bulk::results::{BatchResult, UpsertedId};
use bulk::translate::{self, integer, truthy};
use super::BatchExecutor;

/// Emulates a write command on servers without write commands by sending each
/// operation on its own and checking its acknowledgement.
///
/// Per-operation acknowledgements use `w: 1`, so the requested write concern is
/// only checked once per batch, by a getLastError round trip after the last
/// operation. Modified counts cannot be derived from acknowledgements and are
/// always reported as unknown.
pub struct LegacyExecutor;

impl BatchExecutor for LegacyExecutor {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn execute(&self,
               collection: &dyn Collection,
               batch: &Batch,
               ordered: bool,
               write_concern: &WriteConcern)
               -> Result<BatchResult> {

        if batch.is_empty() {
            return Err(OperationError(String::from("Cannot call execute() for an empty batch.")));
        }

        let mut result = BatchResult::new();
        result.modified_count = None;

        for (index, operation) in batch.operations().iter().enumerate() {
            if ordered && !result.write_errors.is_empty() {
                break;
            }

            let ack = collection.run_legacy_operation(operation)?;
            let errors = translate::translate(&ack)?;

            if let Some(error) = errors.write_error {
                trace!("legacy {} at batch index {} failed: {}",
                       operation.write_type(),
                       index,
                       error);
                result.write_errors.push(BulkWriteError::new(index,
                                                             error.code,
                                                             error.message,
                                                             Some(operation.clone())));
                continue;
            }

            apply_acknowledgement(&mut result, index, operation, &ack)?;
        }

        let failed = result.write_errors.len();

        if failed == 0 || (!ordered && failed < batch.len()) {
            let ack = collection.run_diagnostic_command(write_concern)?;

            if let Some(error) = translate::translate(&ack)?.write_concern_error {
                debug!("getLastError reported a write concern error: {}", error);
                result.write_concern_errors.push(error);
            }
        }

        Ok(result)
    }
}

// Counts a successful operation into the batch result.
fn apply_acknowledgement(result: &mut BatchResult,
                         index: usize,
                         operation: &Operation,
                         ack: &bson::Document)
                         -> Result<()> {
    let n = integer(ack.get("n")).unwrap_or(0);

    match *operation {
        Operation::Insert { .. } => result.inserted_count += 1,
        Operation::Update { upsert, .. } => {
            if upsert && !truthy(ack.get("updatedExisting")) {
                result.upserted_count += 1;
                result.upserted_ids.push(UpsertedId {
                    index: index,
                    id: upserted_id(operation, ack)?,
                });
            } else {
                result.matched_count += n;
            }
        }
        Operation::Delete { .. } => result.removed_count += n,
    }

    Ok(())
}

/// Determines the identifier of an upserted document.
///
/// Older servers only report `upserted` when they generated the identifier
/// themselves, so an identifier supplied by the modifier or the selector has to be
/// recovered from the operation.
fn upserted_id(operation: &Operation, ack: &bson::Document) -> Result<Bson> {
    if let Some(id) = ack.get("upserted") {
        return Ok(id.clone());
    }

    if let Operation::Update { ref selector, ref modifier, .. } = *operation {
        if let Some(id) = modifier.get("_id") {
            return Ok(id.clone());
        }

        if let Some(id) = selector.get("_id") {
            return Ok(id.clone());
        }
    }

    Err(ResponseError(format!("Could not determine upserted identifier from {}", ack)))
}
