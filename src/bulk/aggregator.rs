//! Folds batch results into a single bulk result.
use Result;

use super::batch::Batch;
use super::results::{BatchResult, BulkResult};

/// Accumulates batch results in execution order.
pub struct Aggregator {
    ordered: bool,
    result: BulkResult,
}

impl Aggregator {
    pub fn new(ordered: bool) -> Aggregator {
        Aggregator {
            ordered: ordered,
            result: BulkResult::new(),
        }
    }

    /// Merges the result of `batch` and reports whether further batches may run.
    ///
    /// An ordered bulk write stops at the first batch that produced a write error.
    /// Its write concern errors are dropped at that point, since a write concern
    /// covering the whole bulk write can no longer be satisfied.
    pub fn fold(&mut self, batch: &Batch, batch_result: BatchResult) -> Result<bool> {
        self.result.merge_batch_result(batch, batch_result)?;

        if self.ordered && !self.result.write_errors.is_empty() {
            self.result.write_concern_errors.clear();
            return Ok(false);
        }

        Ok(true)
    }

    pub fn result(&self) -> &BulkResult {
        &self.result
    }

    pub fn finish(self) -> BulkResult {
        self.result
    }
}
