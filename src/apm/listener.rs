use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use apm::event::{BatchCompleted, BatchStarted};
use error::Result;
use write_type::WriteType;

pub type StartHook = fn(&BatchStarted);
pub type CompletionHook = fn(&BatchCompleted);

/// Running totals for the batches of one write type seen by a listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub started: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub operations: usize,
    pub bytes: usize,
}

// A hook together with the write type it is restricted to, if any.
struct Registered<H> {
    write_type: Option<WriteType>,
    hook: H,
}

impl<H> Registered<H> {
    fn accepts(&self, write_type: WriteType) -> bool {
        self.write_type.map_or(true, |only| only == write_type)
    }
}

/// A registry of hooks run around every executed batch. Hooks may be limited to
/// batches of a single write type. The listener also keeps per write type batch
/// totals, and can be shared by any number of bulk writes.
pub struct Listener {
    start_hooks: RwLock<Vec<Registered<StartHook>>>,
    completion_hooks: RwLock<Vec<Registered<CompletionHook>>>,
    stats: Mutex<HashMap<WriteType, BatchStats>>,
}

impl Default for Listener {
    fn default() -> Self {
        Listener::new()
    }
}

impl Listener {
    pub fn new() -> Listener {
        Listener {
            start_hooks: RwLock::new(Vec::new()),
            completion_hooks: RwLock::new(Vec::new()),
            stats: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `hook` before every batch.
    pub fn add_start_hook(&self, hook: StartHook) -> Result<()> {
        self.register_start(None, hook)
    }

    /// Runs `hook` before every batch of `write_type`.
    pub fn add_start_hook_for(&self, write_type: WriteType, hook: StartHook) -> Result<()> {
        self.register_start(Some(write_type), hook)
    }

    /// Runs `hook` after every batch.
    pub fn add_completion_hook(&self, hook: CompletionHook) -> Result<()> {
        self.register_completion(None, hook)
    }

    /// Runs `hook` after every batch of `write_type`.
    pub fn add_completion_hook_for(&self,
                                   write_type: WriteType,
                                   hook: CompletionHook)
                                   -> Result<()> {
        self.register_completion(Some(write_type), hook)
    }

    fn register_start(&self, write_type: Option<WriteType>, hook: StartHook) -> Result<()> {
        let mut guard = self.start_hooks.write()?;
        guard.push(Registered {
            write_type: write_type,
            hook: hook,
        });
        Ok(())
    }

    fn register_completion(&self,
                           write_type: Option<WriteType>,
                           hook: CompletionHook)
                           -> Result<()> {
        let mut guard = self.completion_hooks.write()?;
        guard.push(Registered {
            write_type: write_type,
            hook: hook,
        });
        Ok(())
    }

    pub fn run_start_hooks(&self, started: &BatchStarted) -> Result<()> {
        {
            let mut stats = self.stats.lock()?;
            let entry = stats.entry(started.write_type).or_insert_with(BatchStats::default);
            entry.started += 1;
            entry.operations += started.operation_count;
            entry.bytes += started.size_bytes;
        }

        let guard = self.start_hooks.read()?;

        for registered in guard.iter().filter(|r| r.accepts(started.write_type)) {
            (registered.hook)(started);
        }

        Ok(())
    }

    pub fn run_completion_hooks(&self, completed: &BatchCompleted) -> Result<()> {
        let write_type = completed.write_type();

        {
            let mut stats = self.stats.lock()?;
            let entry = stats.entry(write_type).or_insert_with(BatchStats::default);
            match *completed {
                BatchCompleted::Success { .. } => entry.succeeded += 1,
                BatchCompleted::Failure { .. } => entry.failed += 1,
            }
        }

        let guard = self.completion_hooks.read()?;

        for registered in guard.iter().filter(|r| r.accepts(write_type)) {
            (registered.hook)(completed);
        }

        Ok(())
    }

    /// Returns the totals for batches of `write_type` observed so far.
    pub fn stats(&self, write_type: WriteType) -> Result<BatchStats> {
        let stats = self.stats.lock()?;
        Ok(stats.get(&write_type).cloned().unwrap_or_default())
    }
}
