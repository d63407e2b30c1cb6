//! Bounded, single-type groups of operations sent to the server together.
use std::collections::BTreeSet;

use write_type::WriteType;
use Error::CapacityError;
use Result;

use super::operation::Operation;

/// The most operations a server accepts in one write batch.
pub const MAX_WRITE_BATCH_SIZE: usize = 1000;

/// The most bytes of operation documents a server accepts in one write batch.
pub const MAX_BATCH_BYTES: usize = 16 * 1024 * 1024;

/// A batch of operations of one type, with a map from each operation's position in
/// the batch to its position in the bulk write that queued it.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    write_type: WriteType,
    operations: Vec<Operation>,
    size_bytes: usize,
    // index_map[batch index] == bulk index
    index_map: Vec<usize>,
    bulk_indices: BTreeSet<usize>,
}

impl Batch {
    pub fn new(write_type: WriteType) -> Batch {
        Batch {
            write_type: write_type,
            operations: Vec::new(),
            size_bytes: 0,
            index_map: Vec::new(),
            bulk_indices: BTreeSet::new(),
        }
    }

    /// Reports whether an operation of `size` bytes can be added without exceeding
    /// either batch bound.
    pub fn fits(&self, size: usize) -> bool {
        self.operations.len() < MAX_WRITE_BATCH_SIZE && self.size_bytes + size <= MAX_BATCH_BYTES
    }

    /// Appends an operation queued at `bulk_index`.
    ///
    /// Fails without modifying the batch if the operation is of a different type,
    /// if `bulk_index` is already mapped, or if either the operation count or the
    /// byte size would exceed the batch bounds. A full batch is final; callers must
    /// start a new one.
    pub fn add(&mut self, operation: Operation, bulk_index: usize, size: usize) -> Result<()> {
        if operation.write_type() != self.write_type {
            return Err(CapacityError(format!("Cannot add {} operation to {} batch.",
                                             operation.write_type(),
                                             self.write_type)));
        }

        if self.bulk_indices.contains(&bulk_index) {
            return Err(CapacityError(format!("Document already exists for bulk index: {}",
                                             bulk_index)));
        }

        if self.operations.len() + 1 > MAX_WRITE_BATCH_SIZE {
            return Err(CapacityError(format!("Batch already holds the maximum of {} operations.",
                                             MAX_WRITE_BATCH_SIZE)));
        }

        if self.size_bytes + size > MAX_BATCH_BYTES {
            return Err(CapacityError(format!(
                "Adding {} bytes to a batch of {} bytes exceeds the maximum of {} bytes.",
                size,
                self.size_bytes,
                MAX_BATCH_BYTES
            )));
        }

        self.bulk_indices.insert(bulk_index);
        self.index_map.push(bulk_index);
        self.operations.push(operation);
        self.size_bytes += size;
        Ok(())
    }

    /// Returns the bulk index of the operation at `batch_index`.
    pub fn bulk_index(&self, batch_index: usize) -> Result<usize> {
        self.index_map.get(batch_index).cloned().ok_or_else(|| {
            CapacityError(format!("No document exists for batch index: {}", batch_index))
        })
    }

    /// The bulk indices of this batch's operations, in batch order.
    pub fn bulk_indices(&self) -> &[usize] {
        &self.index_map
    }

    pub fn write_type(&self) -> WriteType {
        self.write_type
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, batch_index: usize) -> Option<&Operation> {
        self.operations.get(batch_index)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The combined serialized size of the batch's operations.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}
