//! Write controls shared by every batch of a bulk write.
use bson::{self, Bson};
use serde_json;

use Result;

/// The acknowledgement level requested by a write concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Acknowledgment {
    /// Wait for the write to propagate to this many nodes.
    Nodes(i32),
    /// Wait for the write to satisfy a named mode such as "majority".
    Tag(String),
}

impl Default for Acknowledgment {
    fn default() -> Self {
        Acknowledgment::Nodes(1)
    }
}

impl From<Acknowledgment> for Bson {
    fn from(w: Acknowledgment) -> Bson {
        match w {
            Acknowledgment::Nodes(n) => Bson::I32(n),
            Acknowledgment::Tag(tag) => Bson::String(tag),
        }
    }
}

/// Durability requirements for write operations.
///
/// Deserializes from the same shape the server accepts, so `{"w": "majority",
/// "wtimeout": 500}` is a valid configuration. Unknown keys are ignored, which
/// keeps an `ordered` key in a write concern from influencing batch execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteConcern {
    #[serde(default)]
    pub w: Acknowledgment,
    /// Propagation timeout in ms; zero waits indefinitely.
    #[serde(rename = "wtimeout", default)]
    pub w_timeout: i32,
    /// Block until the write has been committed to the journal.
    #[serde(default)]
    pub j: bool,
    /// Block until the server has synced all data files to disk.
    #[serde(default)]
    pub fsync: bool,
}

impl Default for WriteConcern {
    fn default() -> Self {
        WriteConcern::new()
    }
}

impl WriteConcern {
    /// Acknowledged writes against a single node.
    pub fn new() -> WriteConcern {
        WriteConcern {
            w: Acknowledgment::Nodes(1),
            w_timeout: 0,
            j: false,
            fsync: false,
        }
    }

    /// Parses a write concern from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<WriteConcern> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_bson(&self) -> bson::Document {
        let mut bson = bson::Document::new();
        bson.insert("w", Bson::from(self.w.clone()));
        bson.insert("wtimeout", Bson::I32(self.w_timeout));
        bson.insert("j", Bson::Boolean(self.j));

        if self.fsync {
            bson.insert("fsync", Bson::Boolean(true));
        }

        bson
    }
}
