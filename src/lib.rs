//! Write-path engine for MongoDB bulk operations.
//!
//! A [`BulkWrite`](bulk/struct.BulkWrite.html) queues inserts, updates and deletes in
//! submission order. On `execute`, the queue is partitioned into batches that respect
//! the server's batch limits, each batch is run either as a single write command or,
//! against servers that predate write commands, as a sequence of legacy operations
//! followed by a `getLastError` round trip. The per-batch replies are folded into one
//! [`BulkResult`](bulk/results/struct.BulkResult.html) whose indices always refer to
//! the caller's original operation order.
//!
//! Transport, authentication and topology discovery are provided by the caller
//! through the [`Collection`](coll/trait.Collection.html) trait.
//!
//! ```ignore
//! let mut bulk = BulkWrite::ordered(&collection);
//! bulk.insert(doc! { "_id": 1, "x": 11 })?;
//! bulk.find(doc! { "_id": 2 }).upsert().update_one(doc! { "$set": { "x": 22 } })?;
//! bulk.find(doc! { "x": 33 }).remove_one()?;
//!
//! let result = bulk.execute(None)?;
//! assert!(result.write_errors.is_empty());
//! ```
#[macro_use(bson, doc)]
extern crate bson;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate time;

pub mod apm;
pub mod bulk;
pub mod coll;
pub mod common;
pub mod error;
pub mod topology;
pub mod write_type;

pub use bulk::{BulkOptions, BulkWrite};
pub use bulk::results::BulkResult;
pub use coll::Collection;
pub use common::WriteConcern;
pub use error::{Error, Result};
pub use write_type::WriteType;
