// Snapshot management for reverse execution

use crate::interpreter::engine::{Engine, RunStatus};
use crate::interpreter::errors::RuntimeError;
use crate::memory::AddressSpace;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Direction of a console entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKind {
    Input,
    Output,
}

/// One value that crossed the engine boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub kind: ConsoleKind,
    pub value: i64,
    /// Step at which the value was consumed or emitted
    pub step: usize,
}

/// Log of every input consumed and output emitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Console {
    pub entries: Vec<ConsoleEntry>,
}

impl Console {
    pub fn new() -> Self {
        Console {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: ConsoleKind, value: i64, step: usize) {
        self.entries.push(ConsoleEntry { kind, value, step });
    }

    /// Emitted values only, in order
    pub fn outputs(&self) -> Vec<i64> {
        self.entries
            .iter()
            .filter(|e| e.kind == ConsoleKind::Output)
            .map(|e| e.value)
            .collect()
    }

    /// Format entries for display, one line each
    pub fn get_output(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| match e.kind {
                ConsoleKind::Input => format!("<< {}", e.value),
                ConsoleKind::Output => format!(">> {}", e.value),
            })
            .collect()
    }
}

/// Snapshot of execution state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub memory: AddressSpace,
    pub ip: usize,
    pub relative_base: i64,
    pub status: RunStatus,
    pub console: Console,
    pub step: usize, // Index into history
    pub fault: Option<RuntimeError>,
}

impl Snapshot {
    /// Capture the current state of `engine`
    pub fn capture(engine: &Engine, console: &Console, step: usize) -> Self {
        Snapshot {
            memory: engine.memory().clone(),
            ip: engine.ip(),
            relative_base: engine.relative_base(),
            status: engine.status(),
            console: console.clone(),
            step,
            fault: None,
        }
    }

    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        // Console: roughly 32 bytes per entry
        self.memory.estimated_size() + self.console.entries.len() * 32
    }

    /// Addresses whose value differs from `previous`, mapped to (old, new)
    pub fn changed_addresses(&self, previous: &Snapshot) -> FxHashMap<usize, (i64, i64)> {
        let len = self.memory.len().max(previous.memory.len());
        let sparse = self
            .memory
            .sparse_words()
            .into_iter()
            .chain(previous.memory.sparse_words())
            .map(|(address, _)| address);

        let mut changed = FxHashMap::default();
        for address in (0..len).chain(sparse) {
            let old = previous.memory.get(address);
            let new = self.memory.get(address);
            if old != new {
                changed.insert(address, (old, new));
            }
        }
        changed
    }
}

/// Snapshot history failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("snapshot memory limit exceeded: {current} + {requested} > {limit} bytes")]
pub struct SnapshotLimitExceeded {
    pub current: usize,
    pub requested: usize,
    pub limit: usize,
}

/// Manages execution history for reverse execution
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), SnapshotLimitExceeded> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(SnapshotLimitExceeded {
                current: self.current_memory,
                requested: snapshot_size,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Mutable access to the newest snapshot
    pub fn last_mut(&mut self) -> Option<&mut Snapshot> {
        self.snapshots.last_mut()
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}
