//! Per-batch and per-bulk write results.
use bson::{self, Bson};

use write_type::WriteType;
use Error::ResponseError;
use Result;

use super::batch::Batch;
use super::error::{BulkWriteError, WriteConcernError};
use super::translate::integer;

/// The identifier of a document created by an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertedId {
    pub index: usize,
    pub id: Bson,
}

/// The outcome of one executed batch. Indices refer to positions in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub inserted_count: i64,
    pub matched_count: i64,
    /// `None` when the server cannot report modifications.
    pub modified_count: Option<i64>,
    pub upserted_count: i64,
    pub removed_count: i64,
    pub upserted_ids: Vec<UpsertedId>,
    pub write_errors: Vec<BulkWriteError>,
    pub write_concern_errors: Vec<WriteConcernError>,
}

/// The merged outcome of every batch a bulk write executed. Indices refer to the
/// order in which operations were queued.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResult {
    pub inserted_count: i64,
    pub matched_count: i64,
    /// `None` when any update batch could not report modifications.
    pub modified_count: Option<i64>,
    pub upserted_count: i64,
    pub removed_count: i64,
    pub upserted_ids: Vec<UpsertedId>,
    pub write_errors: Vec<BulkWriteError>,
    pub write_concern_errors: Vec<WriteConcernError>,
}

impl BatchResult {
    pub fn new() -> BatchResult {
        BatchResult {
            inserted_count: 0,
            matched_count: 0,
            modified_count: Some(0),
            upserted_count: 0,
            removed_count: 0,
            upserted_ids: Vec::new(),
            write_errors: Vec::new(),
            write_concern_errors: Vec::new(),
        }
    }

    /// Extracts a write command reply for `batch` into a result. The caller must
    /// already have rejected replies whose `ok` field is falsy.
    pub fn from_command_reply(batch: &Batch, reply: &bson::Document) -> Result<BatchResult> {
        let mut result = BatchResult::new();
        let n = integer(reply.get("n")).unwrap_or(0);

        match batch.write_type() {
            WriteType::Insert => result.inserted_count = n,
            WriteType::Delete => result.removed_count = n,
            WriteType::Update => {
                result.upserted_ids = parse_upserted_ids(reply.get("upserted"))?;
                result.upserted_count = result.upserted_ids.len() as i64;
                result.matched_count = n - result.upserted_count;
                result.modified_count = integer(reply.get("nModified"));
            }
        }

        if let Some(&Bson::Array(ref errors)) = reply.get("writeErrors") {
            for error in errors {
                match *error {
                    Bson::Document(ref doc) => {
                        let mut write_error = BulkWriteError::parse(doc)?;
                        write_error.request = batch.operation(write_error.index).cloned();
                        result.write_errors.push(write_error);
                    }
                    _ => {
                        return Err(ResponseError(String::from("WriteError provided was not a bson document.")))
                    }
                }
            }
        }

        if let Some(&Bson::Document(ref error)) = reply.get("writeConcernError") {
            result.write_concern_errors.push(WriteConcernError::parse(error)?);
        }

        Ok(result)
    }
}

// Parses the `upserted` array of an update command reply.
fn parse_upserted_ids(upserted: Option<&Bson>) -> Result<Vec<UpsertedId>> {
    let entries = match upserted {
        Some(&Bson::Array(ref entries)) => entries,
        None => return Ok(Vec::new()),
        Some(other) => {
            return Err(ResponseError(format!("Reply field `upserted` is not an array: {}", other)))
        }
    };

    let mut ids = Vec::with_capacity(entries.len());

    for entry in entries {
        let doc = match *entry {
            Bson::Document(ref doc) => doc,
            _ => return Err(ResponseError(format!("Invalid upserted entry: {}", entry))),
        };

        match (integer(doc.get("index")), doc.get("_id")) {
            (Some(index), Some(id)) if index >= 0 => {
                ids.push(UpsertedId {
                    index: index as usize,
                    id: id.clone(),
                })
            }
            _ => return Err(ResponseError(format!("Invalid upserted entry: {}", doc))),
        }
    }

    Ok(ids)
}

impl Default for BatchResult {
    fn default() -> Self {
        BatchResult::new()
    }
}

impl BulkResult {
    pub fn new() -> BulkResult {
        BulkResult {
            inserted_count: 0,
            matched_count: 0,
            modified_count: Some(0),
            upserted_count: 0,
            removed_count: 0,
            upserted_ids: Vec::new(),
            write_errors: Vec::new(),
            write_concern_errors: Vec::new(),
        }
    }

    /// Adds the counters of a batch result to this result and appends its upserts
    /// and errors with their batch indices translated into bulk indices.
    pub fn merge_batch_result(&mut self, batch: &Batch, result: BatchResult) -> Result<()> {
        match batch.write_type() {
            WriteType::Insert => self.inserted_count += result.inserted_count,
            WriteType::Delete => self.removed_count += result.removed_count,
            WriteType::Update => {
                self.matched_count += result.matched_count;
                self.upserted_count += result.upserted_count;

                // A single unknown count makes the total unknown.
                self.modified_count = match (self.modified_count, result.modified_count) {
                    (Some(total), Some(n)) => Some(total + n),
                    _ => None,
                };

                for mut upserted in result.upserted_ids {
                    upserted.index = batch.bulk_index(upserted.index)?;
                    self.upserted_ids.push(upserted);
                }
            }
        }

        for mut write_error in result.write_errors {
            write_error.index = batch.bulk_index(write_error.index)?;
            self.write_errors.push(write_error);
        }

        self.write_concern_errors.extend(result.write_concern_errors);
        Ok(())
    }

    /// Returns true if every operation succeeded and met its write concern.
    pub fn is_ok(&self) -> bool {
        self.write_errors.is_empty() && self.write_concern_errors.is_empty()
    }
}

impl Default for BulkResult {
    fn default() -> Self {
        BulkResult::new()
    }
}

impl From<BulkResult> for bson::Document {
    fn from(result: BulkResult) -> Self {
        let mut document = bson::Document::new();
        document.insert("nInserted", result.inserted_count);
        document.insert("nMatched", result.matched_count);
        document.insert("nModified",
                        result.modified_count.map(Bson::I64).unwrap_or(Bson::Null));
        document.insert("nUpserted", result.upserted_count);
        document.insert("nRemoved", result.removed_count);

        let upserted = result.upserted_ids
            .into_iter()
            .map(|u| Bson::Document(doc! { "index": u.index as i64, "_id": u.id }))
            .collect::<Vec<_>>();
        document.insert("upserted", upserted);

        let write_errors = result.write_errors
            .into_iter()
            .map(|e| {
                let mut error = doc! {
                    "index": e.index as i64,
                    "code": e.code,
                    "errmsg": e.message
                };
                if let Some(request) = e.request {
                    error.insert("op", bson::Document::from(request));
                }
                Bson::Document(error)
            })
            .collect::<Vec<_>>();
        document.insert("writeErrors", write_errors);

        let write_concern_errors = result.write_concern_errors
            .into_iter()
            .map(|e| {
                let mut error = doc! { "code": e.code, "errmsg": e.message };
                if let Some(details) = e.details {
                    error.insert("errInfo", details);
                }
                Bson::Document(error)
            })
            .collect::<Vec<_>>();
        document.insert("writeConcernErrors", write_concern_errors);

        document
    }
}
