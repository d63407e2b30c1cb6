//! Batchable write operation types.
use std::fmt;

/// The kind of write a batch carries. Every batch holds exactly one kind.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum WriteType {
    Insert,
    Update,
    Delete,
}

impl WriteType {
    /// Every write type, in the order unordered bulk writes execute them.
    pub const ALL: [WriteType; 3] = [WriteType::Insert, WriteType::Update, WriteType::Delete];

    /// The write command name.
    pub fn to_str(&self) -> &str {
        match *self {
            WriteType::Insert => "insert",
            WriteType::Update => "update",
            WriteType::Delete => "delete",
        }
    }

    /// The write command field carrying the operation documents.
    pub fn payload_field(&self) -> &str {
        match *self {
            WriteType::Insert => "documents",
            WriteType::Update => "updates",
            WriteType::Delete => "deletes",
        }
    }
}

impl fmt::Display for WriteType {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.to_str())
    }
}
