//! Write operations queued by a bulk write.
use bson::{self, Bson, oid};

use write_type::WriteType;
use Error::{ArgumentError, CapacityError};
use Result;

use super::batch::MAX_BATCH_BYTES;

/// A single insert, update or delete. Immutable once queued.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert {
        document: bson::Document,
    },
    Update {
        selector: bson::Document,
        modifier: bson::Document,
        multi: bool,
        upsert: bool,
    },
    Delete {
        selector: bson::Document,
        multi: bool,
    },
}

impl Operation {
    pub fn write_type(&self) -> WriteType {
        match *self {
            Operation::Insert { .. } => WriteType::Insert,
            Operation::Update { .. } => WriteType::Update,
            Operation::Delete { .. } => WriteType::Delete,
        }
    }

    /// The delete limit as sent on the wire: 0 removes every match, 1 removes one.
    pub fn limit(&self) -> Option<i32> {
        match *self {
            Operation::Delete { multi, .. } => Some(if multi { 0 } else { 1 }),
            _ => None,
        }
    }

    /// Returns a copy of an insert with a generated `_id` placed first if the
    /// document lacks one. Other operations are returned unchanged.
    pub fn with_generated_id(&self) -> Result<Operation> {
        match *self {
            Operation::Insert { ref document } if !document.contains_key("_id") => {
                let mut identified = bson::Document::new();
                identified.insert("_id", Bson::ObjectId(oid::ObjectId::new()?));
                for (key, value) in document.iter() {
                    identified.insert(key.to_owned(), value.clone());
                }
                Ok(Operation::Insert { document: identified })
            }
            _ => Ok(self.clone()),
        }
    }

    /// The number of bytes this operation occupies in a write command.
    pub fn serialized_size(&self) -> Result<usize> {
        let mut buf = Vec::new();
        bson::encode_document(&mut buf, &bson::Document::from(self.clone()))?;
        Ok(buf.len())
    }
}

impl From<Operation> for bson::Document {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Insert { document } => document,
            Operation::Update { selector, modifier, multi, upsert } => {
                let mut document = bson::Document::new();
                document.insert("q", selector);
                document.insert("u", modifier);
                document.insert("multi", multi);
                document.insert("upsert", upsert);
                document
            }
            Operation::Delete { selector, multi } => {
                let mut document = bson::Document::new();
                document.insert("q", selector);
                document.insert("limit", if multi { 0 } else { 1 });
                document
            }
        }
    }
}

/// An operation waiting in a bulk write queue together with its serialized size.
/// The queue position of an operation is its bulk index.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedOperation {
    pub operation: Operation,
    pub size: usize,
}

impl QueuedOperation {
    /// Measures and queues an operation. Inserts without an `_id` get their
    /// generated ObjectId first, so the measured size is the size sent.
    /// Operations that could never fit into a batch are rejected here, before
    /// anything is sent to the server.
    pub fn new(operation: Operation) -> Result<QueuedOperation> {
        let operation = operation.with_generated_id()?;
        let size = operation.serialized_size()?;

        if size > MAX_BATCH_BYTES {
            return Err(CapacityError(format!(
                "{} operation of {} bytes exceeds the maximum batch size of {} bytes.",
                operation.write_type(),
                size,
                MAX_BATCH_BYTES
            )));
        }

        Ok(QueuedOperation::sized(operation, size))
    }

    /// Queues an operation whose serialized size is already known.
    pub fn sized(operation: Operation, size: usize) -> QueuedOperation {
        QueuedOperation {
            operation: operation,
            size: size,
        }
    }

    pub fn write_type(&self) -> WriteType {
        self.operation.write_type()
    }
}

/// Writes that can be batched together, as accepted by `BulkWrite::add`.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteModel {
    InsertOne { document: bson::Document },
    DeleteOne { filter: bson::Document },
    DeleteMany { filter: bson::Document },
    ReplaceOne {
        filter: bson::Document,
        replacement: bson::Document,
        upsert: Option<bool>,
    },
    UpdateOne {
        filter: bson::Document,
        update: bson::Document,
        upsert: Option<bool>,
    },
    UpdateMany {
        filter: bson::Document,
        update: bson::Document,
        upsert: Option<bool>,
    },
}

impl WriteModel {
    /// Validates the model and converts it into a queueable operation.
    pub fn into_operation(self) -> Result<Operation> {
        match self {
            WriteModel::InsertOne { document } => Ok(Operation::Insert { document: document }),
            WriteModel::DeleteOne { filter } => {
                Ok(Operation::Delete {
                    selector: filter,
                    multi: false,
                })
            }
            WriteModel::DeleteMany { filter } => {
                Ok(Operation::Delete {
                    selector: filter,
                    multi: true,
                })
            }
            WriteModel::ReplaceOne { filter, replacement, upsert } => {
                validate_replace(&replacement)?;
                Ok(Operation::Update {
                    selector: filter,
                    modifier: replacement,
                    multi: false,
                    upsert: upsert.unwrap_or(false),
                })
            }
            WriteModel::UpdateOne { filter, update, upsert } => {
                validate_update(&update)?;
                Ok(Operation::Update {
                    selector: filter,
                    modifier: update,
                    multi: false,
                    upsert: upsert.unwrap_or(false),
                })
            }
            WriteModel::UpdateMany { filter, update, upsert } => {
                validate_update(&update)?;
                Ok(Operation::Update {
                    selector: filter,
                    modifier: update,
                    multi: true,
                    upsert: upsert.unwrap_or(false),
                })
            }
        }
    }
}

pub fn validate_replace(replacement: &bson::Document) -> Result<()> {
    for key in replacement.keys() {
        if key.starts_with('$') {
            return Err(ArgumentError(String::from("Replacement cannot include $ operators.")));
        }
    }
    Ok(())
}

pub fn validate_update(update: &bson::Document) -> Result<()> {
    if update.is_empty() {
        return Err(ArgumentError(String::from("Update document cannot be empty.")));
    }

    for key in update.keys() {
        if !key.starts_with('$') {
            return Err(ArgumentError(String::from("Update only works with $ operators.")));
        }
    }
    Ok(())
}
