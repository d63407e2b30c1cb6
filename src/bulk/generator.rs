//! Lazy partitioning of a bulk write queue into executable batches.
//!
//! Both generators walk the queued operations without copying the queue and yield
//! one `Batch` at a time, so a bulk write that aborts early never builds the
//! batches it will not run.
use write_type::WriteType;
use Error::CapacityError;
use Result;

use super::batch::{Batch, MAX_BATCH_BYTES};
use super::operation::QueuedOperation;

/// A source of batches that can be restarted from the first batch.
pub trait BatchGenerator: Iterator<Item = Result<Batch>> {
    /// Resets the generator to its initial state.
    fn rewind(&mut self);
}

fn oversized(queued: &QueuedOperation, bulk_index: usize) -> ::Error {
    CapacityError(format!("{} operation at bulk index {} is {} bytes; batches are limited to {} bytes.",
                          queued.write_type(),
                          bulk_index,
                          queued.size,
                          MAX_BATCH_BYTES))
}

/// Yields batches that execute operations in exactly the order they were queued.
///
/// A new batch begins whenever the operation type changes or the open batch is
/// full, so interleaved types produce one batch per run of equal types.
pub struct OrderedGenerator<'a> {
    operations: &'a [QueuedOperation],
    position: usize,
}

impl<'a> OrderedGenerator<'a> {
    pub fn new(operations: &'a [QueuedOperation]) -> OrderedGenerator<'a> {
        OrderedGenerator {
            operations: operations,
            position: 0,
        }
    }
}

impl<'a> Iterator for OrderedGenerator<'a> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Result<Batch>> {
        let mut batch = match self.operations.get(self.position) {
            Some(queued) => Batch::new(queued.write_type()),
            None => return None,
        };

        while let Some(queued) = self.operations.get(self.position) {
            if queued.write_type() != batch.write_type() || !batch.fits(queued.size) {
                break;
            }

            if let Err(err) = batch.add(queued.operation.clone(), self.position, queued.size) {
                return Some(Err(err));
            }

            self.position += 1;
        }

        if batch.is_empty() {
            let err = oversized(&self.operations[self.position], self.position);
            self.position = self.operations.len();
            return Some(Err(err));
        }

        Some(Ok(batch))
    }
}

impl<'a> BatchGenerator for OrderedGenerator<'a> {
    fn rewind(&mut self) {
        self.position = 0;
    }
}

/// Yields batches grouped by type: every insert, then every update, then every
/// delete. Each group is split only where a batch bound requires it, and types with
/// no queued operations produce no batch.
pub struct UnorderedGenerator<'a> {
    operations: &'a [QueuedOperation],
    type_index: usize,
    position: usize,
}

impl<'a> UnorderedGenerator<'a> {
    pub fn new(operations: &'a [QueuedOperation]) -> UnorderedGenerator<'a> {
        UnorderedGenerator {
            operations: operations,
            type_index: 0,
            position: 0,
        }
    }
}

impl<'a> Iterator for UnorderedGenerator<'a> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Result<Batch>> {
        while self.type_index < WriteType::ALL.len() {
            let write_type = WriteType::ALL[self.type_index];
            let mut batch = Batch::new(write_type);

            while let Some(queued) = self.operations.get(self.position) {
                if queued.write_type() == write_type {
                    if !batch.fits(queued.size) {
                        if batch.is_empty() {
                            let err = oversized(queued, self.position);
                            self.position += 1;
                            return Some(Err(err));
                        }
                        break;
                    }

                    if let Err(err) = batch.add(queued.operation.clone(),
                                                self.position,
                                                queued.size) {
                        return Some(Err(err));
                    }
                }

                self.position += 1;
            }

            // The span for this type is exhausted; move on to the next type.
            if self.position >= self.operations.len() {
                self.type_index += 1;
                self.position = 0;
            }

            if !batch.is_empty() {
                return Some(Ok(batch));
            }
        }

        None
    }
}

impl<'a> BatchGenerator for UnorderedGenerator<'a> {
    fn rewind(&mut self) {
        self.type_index = 0;
        self.position = 0;
    }
}
