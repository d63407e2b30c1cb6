//! Bulk write queueing and execution.
pub mod aggregator;
pub mod batch;
pub mod error;
pub mod executor;
pub mod generator;
pub mod operation;
pub mod results;
pub mod translate;

use bson;
use time;

use std::sync::Arc;

use apm::{BatchCompleted, BatchStarted, Listener};
use coll::Collection;
use common::WriteConcern;
use Error::OperationError;
use Result;

use self::aggregator::Aggregator;
use self::batch::Batch;
use self::executor::BatchExecutor;
use self::generator::{BatchGenerator, OrderedGenerator, UnorderedGenerator};
use self::operation::{validate_replace, validate_update, Operation, QueuedOperation, WriteModel};
use self::results::{BatchResult, BulkResult};

/// Construction options for a bulk write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOptions {
    /// Execute operations in queue order, stopping at the first write error.
    #[serde(default = "default_ordered")]
    pub ordered: bool,
    /// The write concern used when `execute` is not given one.
    #[serde(rename = "writeConcern", default)]
    pub write_concern: WriteConcern,
}

fn default_ordered() -> bool {
    true
}

impl Default for BulkOptions {
    fn default() -> Self {
        BulkOptions {
            ordered: true,
            write_concern: WriteConcern::new(),
        }
    }
}

impl BulkOptions {
    pub fn new() -> Self {
        Default::default()
    }
}

/// A single-use queue of write operations against one collection.
///
/// Operations are validated and sized as they are queued. `execute` runs the
/// whole queue exactly once; ordered bulk writes run operations in queue order
/// and stop at the first write error, unordered bulk writes group operations by
/// type and run every one of them.
pub struct BulkWrite<'a> {
    collection: &'a dyn Collection,
    ordered: bool,
    write_concern: WriteConcern,
    operations: Vec<QueuedOperation>,
    listener: Option<Arc<Listener>>,
    executed: bool,
}

impl<'a> BulkWrite<'a> {
    /// Creates an ordered bulk write with the default write concern.
    pub fn ordered(collection: &'a dyn Collection) -> BulkWrite<'a> {
        BulkWrite::with_options(collection, BulkOptions::new())
    }

    /// Creates an unordered bulk write with the default write concern.
    pub fn unordered(collection: &'a dyn Collection) -> BulkWrite<'a> {
        let options = BulkOptions { ordered: false, ..BulkOptions::new() };
        BulkWrite::with_options(collection, options)
    }

    pub fn with_options(collection: &'a dyn Collection, options: BulkOptions) -> BulkWrite<'a> {
        BulkWrite {
            collection: collection,
            ordered: options.ordered,
            write_concern: options.write_concern,
            operations: Vec::new(),
            listener: None,
            executed: false,
        }
    }

    /// Registers a listener whose hooks run around every executed batch.
    pub fn set_listener(&mut self, listener: Arc<Listener>) {
        self.listener = Some(listener);
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// The number of queued operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Queues an insert of `document`. A document without `_id` receives a
    /// generated ObjectId when it is queued.
    pub fn insert(&mut self, document: bson::Document) -> Result<()> {
        self.push(Operation::Insert { document: document })
    }

    /// Selects the documents the next update or remove applies to.
    pub fn find<'b>(&'b mut self, selector: bson::Document) -> Find<'b, 'a> {
        Find {
            bulk: self,
            selector: selector,
            upsert: false,
        }
    }

    /// Queues a driver-style write model.
    pub fn add(&mut self, model: WriteModel) -> Result<()> {
        let operation = model.into_operation()?;
        self.push(operation)
    }

    fn push(&mut self, operation: Operation) -> Result<()> {
        if self.executed {
            return Err(OperationError(String::from("Cannot add operations to an executed bulk write.")));
        }

        let queued = QueuedOperation::new(operation)?;
        self.operations.push(queued);
        Ok(())
    }

    /// Executes every queued operation and returns the merged result.
    ///
    /// `write_concern` overrides the bulk write's default write concern for this
    /// execution. Write errors and write concern errors are reported in the
    /// result; `Err` is returned only if the bulk write was already executed or
    /// a batch could not be executed at all. In the latter case batches that were
    /// not yet processed are abandoned.
    pub fn execute(&mut self, write_concern: Option<WriteConcern>) -> Result<BulkResult> {
        if self.executed {
            return Err(OperationError(String::from("Cannot call execute() multiple times.")));
        }

        let write_concern = write_concern.unwrap_or_else(|| self.write_concern.clone());
        let outcome = self.run(&write_concern);
        self.executed = true;
        outcome
    }

    fn run<'s>(&'s self, write_concern: &WriteConcern) -> Result<BulkResult> {
        let executor = executor::for_server(self.collection.supports_write_commands()?);
        let namespace = self.collection.namespace();

        debug!("executing {} {} operations against {} via {} executor",
               self.operations.len(),
               if self.ordered { "ordered" } else { "unordered" },
               namespace,
               executor.name());

        let generator: Box<dyn BatchGenerator + 's> = if self.ordered {
            Box::new(OrderedGenerator::new(&self.operations))
        } else {
            Box::new(UnorderedGenerator::new(&self.operations))
        };

        let mut aggregator = Aggregator::new(self.ordered);

        for (batch_number, batch) in generator.enumerate() {
            let batch = batch?;
            let batch_result = self.run_batch(executor, &namespace, batch_number, &batch,
                                              write_concern)?;

            if !aggregator.fold(&batch, batch_result)? {
                debug!("ordered bulk write stopped after batch #{} with {} write errors",
                       batch_number,
                       aggregator.result().write_errors.len());
                break;
            }
        }

        Ok(aggregator.finish())
    }

    // Executes a single batch, publishing monitoring events around it.
    fn run_batch(&self,
                 executor: &dyn BatchExecutor,
                 namespace: &str,
                 batch_number: usize,
                 batch: &Batch,
                 write_concern: &WriteConcern)
                 -> Result<BatchResult> {

        let started = BatchStarted {
            namespace: namespace.to_owned(),
            batch_number: batch_number,
            write_type: batch.write_type(),
            executor: executor.name(),
            operation_count: batch.len(),
            size_bytes: batch.size_bytes(),
        };

        debug!("{}", started);
        if let Some(ref listener) = self.listener {
            listener.run_start_hooks(&started)?;
        }

        let start_time = time::precise_time_ns();
        let outcome = executor.execute(self.collection, batch, self.ordered, write_concern);
        let duration = time::precise_time_ns() - start_time;

        let completed = match outcome {
            Ok(ref result) => {
                BatchCompleted::Success {
                    duration: duration,
                    namespace: namespace.to_owned(),
                    batch_number: batch_number,
                    write_type: batch.write_type(),
                    affected: result.inserted_count + result.matched_count +
                              result.upserted_count + result.removed_count,
                    write_errors: result.write_errors.len(),
                    write_concern_errors: result.write_concern_errors.len(),
                }
            }
            Err(ref err) => {
                BatchCompleted::Failure {
                    duration: duration,
                    namespace: namespace.to_owned(),
                    batch_number: batch_number,
                    write_type: batch.write_type(),
                    failure: err,
                }
            }
        };

        match completed {
            BatchCompleted::Success { .. } => debug!("{}", completed),
            BatchCompleted::Failure { .. } => warn!("{}", completed),
        }

        if let Some(ref listener) = self.listener {
            listener.run_completion_hooks(&completed)?;
        }

        outcome
    }
}

/// An update or remove under construction, created by `BulkWrite::find`.
pub struct Find<'b, 'a: 'b> {
    bulk: &'b mut BulkWrite<'a>,
    selector: bson::Document,
    upsert: bool,
}

impl<'b, 'a: 'b> Find<'b, 'a> {
    /// Inserts a new document if no document matches the selector.
    pub fn upsert(mut self) -> Self {
        self.upsert = true;
        self
    }

    /// Queues an update of every matching document. With `upsert`, only a single
    /// document is updated.
    pub fn update(self, modifier: bson::Document) -> Result<()> {
        let multi = !self.upsert;
        self.queue_update(modifier, multi)
    }

    /// Queues an update of the first matching document.
    pub fn update_one(self, modifier: bson::Document) -> Result<()> {
        self.queue_update(modifier, false)
    }

    /// Queues a replacement of the first matching document.
    pub fn replace_one(self, replacement: bson::Document) -> Result<()> {
        validate_replace(&replacement)?;
        self.queue_update(replacement, false)
    }

    /// Queues a removal of every matching document.
    pub fn remove(self) -> Result<()> {
        self.queue_remove(true)
    }

    /// Queues a removal of the first matching document.
    pub fn remove_one(self) -> Result<()> {
        self.queue_remove(false)
    }

    fn queue_update(self, modifier: bson::Document, multi: bool) -> Result<()> {
        // Operator updates may apply to many documents; replacements may not.
        if multi {
            validate_update(&modifier)?;
        }

        self.bulk.push(Operation::Update {
            selector: self.selector,
            modifier: modifier,
            multi: multi,
            upsert: self.upsert,
        })
    }

    fn queue_remove(self, multi: bool) -> Result<()> {
        self.bulk.push(Operation::Delete {
            selector: self.selector,
            multi: multi,
        })
    }
}
