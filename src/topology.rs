//! Server capability detection from isMaster replies.
use bson::{self, Bson};

/// The wire protocol version that introduced the insert, update and delete
/// write commands.
pub const WRITE_COMMANDS_WIRE_VERSION: i64 = 2;

/// The wire protocol versions a server advertises in its isMaster reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireVersionRange {
    pub min_wire_version: i64,
    pub max_wire_version: i64,
}

impl WireVersionRange {
    /// Parses the advertised range. Servers that predate wire versioning omit
    /// both fields and are reported as `-1..-1`.
    pub fn parse(is_master: &bson::Document) -> WireVersionRange {
        WireVersionRange {
            min_wire_version: wire_version(is_master.get("minWireVersion")),
            max_wire_version: wire_version(is_master.get("maxWireVersion")),
        }
    }

    pub fn contains(&self, version: i64) -> bool {
        self.min_wire_version <= version && version <= self.max_wire_version
    }
}

fn wire_version(value: Option<&Bson>) -> i64 {
    match value {
        Some(&Bson::I32(v)) => v as i64,
        Some(&Bson::I64(v)) => v,
        Some(&Bson::FloatingPoint(v)) => v as i64,
        _ => -1,
    }
}

/// Reports whether a server whose isMaster reply is `is_master` accepts write
/// commands.
pub fn supports_write_commands(is_master: &bson::Document) -> bool {
    WireVersionRange::parse(is_master).contains(WRITE_COMMANDS_WIRE_VERSION)
}
