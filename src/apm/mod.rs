//! Batch Monitoring
//!
//! The APM module exposes runtime information about the batches a bulk write sends
//! to the server. Every batch triggers the start and completion hooks registered on
//! the bulk write's listener, which also keeps per write type batch totals. Each
//! event is also written to the `log` facade at debug level (failures at warn level).
mod event;
mod listener;

pub use self::event::{BatchCompleted, BatchStarted};
pub use self::listener::{BatchStats, CompletionHook, Listener, StartHook};
