//! Time-travel debugging session over a single engine
//!
//! A [`Session`] runs an engine one instruction at a time and records a
//! [`Snapshot`] before the first instruction and after every instruction that
//! executes. The recorded history can then be browsed forward and backward.
//!
//! # Live engine vs. history
//!
//! The engine itself only ever moves forward and always sits at the newest
//! snapshot. Browsing changes `history_position` but never the engine. When the
//! program starves on input, [`Session::provide_input`] feeds the engine and
//! extends history from its end, wherever the viewer currently is.
//!
//! A fatal [`RuntimeError`] stops recording and is attached to the final
//! snapshot, so the faulting state stays inspectable. Running out of snapshot
//! budget also stops recording for good, leaving the engine at the last
//! recorded step.

use crate::interpreter::engine::{Engine, RunStatus, Step};
use crate::interpreter::errors::RuntimeError;
use crate::program::Program;
use crate::snapshot::{Console, ConsoleKind, Snapshot, SnapshotLimitExceeded, SnapshotManager};
use thiserror::Error;
use tracing::{debug, warn};

/// Debug session failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugError {
    #[error(transparent)]
    SnapshotLimit(#[from] SnapshotLimitExceeded),

    #[error("program fault: {0}")]
    Fault(#[from] RuntimeError),

    #[error("already at the beginning of execution")]
    AtStart,

    #[error("no more snapshots available")]
    AtEnd,

    #[error("program is not waiting for input")]
    NotAwaitingInput,
}

/// An engine plus its recorded execution history
pub struct Session {
    engine: Engine,
    console: Console,
    snapshots: SnapshotManager,
    history_position: usize,
    fault: Option<RuntimeError>,
    /// Set once the snapshot budget is spent; recording stops for good
    truncated: Option<SnapshotLimitExceeded>,
}

impl Session {
    /// Create a session and record the initial state
    pub fn new(program: &Program, inputs: &[i64], snapshot_limit: usize) -> Result<Self, DebugError> {
        let mut engine = Engine::new(program);
        for &value in inputs {
            engine.push_input(value);
        }

        let console = Console::new();
        let mut snapshots = SnapshotManager::new(snapshot_limit);
        snapshots.push(Snapshot::capture(&engine, &console, 0))?;

        Ok(Session {
            engine,
            console,
            snapshots,
            history_position: 0,
            fault: None,
            truncated: None,
        })
    }

    /// Bound the live engine; breaching the bound surfaces as a fault
    pub fn set_step_limit(&mut self, limit: Option<u64>) {
        self.engine.set_step_limit(limit);
    }

    /// Execute and record until halt, input starvation, or a fault.
    ///
    /// A step is committed to the live engine only once its snapshot fits the
    /// budget, so the engine never runs ahead of recorded history. Running out
    /// of budget ends recording; later calls fail with the same error.
    pub fn run(&mut self) -> Result<(), DebugError> {
        if let Some(limit) = &self.truncated {
            return Err(DebugError::SnapshotLimit(limit.clone()));
        }
        if let Some(fault) = &self.fault {
            return Err(DebugError::Fault(fault.clone()));
        }

        while !self.engine.is_halted() {
            let index = self.snapshots.len();
            let mut next = self.engine.clone();

            match next.step() {
                Ok(Step::NeedsInput) => {
                    self.engine = next;
                    if let Some(last) = self.snapshots.last_mut() {
                        last.status = RunStatus::AwaitingInput;
                    }
                    debug!(ip = self.engine.ip(), "session waiting for input");
                    break;
                }
                Ok(step) => {
                    let mut console = self.console.clone();
                    match step {
                        Step::Input(value) => console.record(ConsoleKind::Input, value, index),
                        Step::Output(value) => console.record(ConsoleKind::Output, value, index),
                        _ => {}
                    }

                    if let Err(limit) = self
                        .snapshots
                        .push(Snapshot::capture(&next, &console, index))
                    {
                        warn!(error = %limit, steps = index - 1, "recording stopped");
                        self.truncated = Some(limit.clone());
                        self.history_position = self.snapshots.len() - 1;
                        return Err(DebugError::SnapshotLimit(limit));
                    }
                    self.engine = next;
                    self.console = console;
                }
                Err(err) => {
                    warn!(error = %err, "program fault");
                    if let Some(last) = self.snapshots.last_mut() {
                        last.fault = Some(err.clone());
                    }
                    self.fault = Some(err.clone());
                    self.history_position = self.snapshots.len() - 1;
                    return Err(DebugError::Fault(err));
                }
            }
        }

        self.history_position = self.snapshots.len() - 1;
        Ok(())
    }

    /// Feed one value to a starved program and continue recording
    pub fn provide_input(&mut self, value: i64) -> Result<(), DebugError> {
        if let Some(limit) = &self.truncated {
            return Err(DebugError::SnapshotLimit(limit.clone()));
        }
        if self.engine.status() != RunStatus::AwaitingInput || self.fault.is_some() {
            return Err(DebugError::NotAwaitingInput);
        }

        self.engine.push_input(value);
        self.run()
    }

    /// Step backward in history
    pub fn step_backward(&mut self) -> Result<(), DebugError> {
        if self.history_position == 0 {
            return Err(DebugError::AtStart);
        }
        self.history_position -= 1;
        Ok(())
    }

    /// Step forward in history
    pub fn step_forward(&mut self) -> Result<(), DebugError> {
        if self.history_position + 1 >= self.snapshots.len() {
            return Err(DebugError::AtEnd);
        }
        self.history_position += 1;
        Ok(())
    }

    /// Rewind to the beginning of execution history
    pub fn rewind_to_start(&mut self) {
        self.history_position = 0;
    }

    /// Jump to the newest snapshot
    pub fn jump_to_end(&mut self) {
        self.history_position = self.snapshots.len().saturating_sub(1);
    }

    // ========== Getter methods for UI ==========

    /// Snapshot at the current history position
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.history_position)
    }

    /// Snapshot just before the current one
    pub fn previous(&self) -> Option<&Snapshot> {
        self.history_position
            .checked_sub(1)
            .and_then(|i| self.snapshots.get(i))
    }

    pub fn history_position(&self) -> usize {
        self.history_position
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_at_end(&self) -> bool {
        self.history_position + 1 >= self.snapshots.len()
    }

    /// True when the live engine is starved and more input would extend history
    pub fn is_awaiting_input(&self) -> bool {
        self.fault.is_none()
            && self.truncated.is_none()
            && self.engine.status() == RunStatus::AwaitingInput
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_halted()
    }

    pub fn fault(&self) -> Option<&RuntimeError> {
        self.fault.as_ref()
    }

    /// Budget error that ended recording early, if any
    pub fn truncated(&self) -> Option<&SnapshotLimitExceeded> {
        self.truncated.as_ref()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn console(&self) -> &Console {
        &self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 16 * 1024 * 1024;

    fn session(text: &str, inputs: &[i64]) -> Session {
        Session::new(&Program::parse(text).unwrap(), inputs, LIMIT).unwrap()
    }

    #[test]
    fn test_records_one_snapshot_per_instruction() {
        let mut s = session("1,0,0,0,99", &[]);
        s.run().unwrap();
        // initial + add + halt
        assert_eq!(s.total_snapshots(), 3);
        assert!(s.is_finished());
        assert!(s.is_at_end());
        assert_eq!(s.current().unwrap().memory.get(0), 2);
    }

    #[test]
    fn test_browse_history() {
        let mut s = session("1,0,0,0,99", &[]);
        s.run().unwrap();

        s.rewind_to_start();
        assert_eq!(s.current().unwrap().memory.get(0), 1);
        assert_eq!(s.step_backward(), Err(DebugError::AtStart));

        s.step_forward().unwrap();
        assert_eq!(s.current().unwrap().ip, 4);
        let changed = s.current().unwrap().changed_addresses(s.previous().unwrap());
        assert_eq!(changed.get(&0), Some(&(1, 2)));

        s.jump_to_end();
        assert_eq!(s.step_forward(), Err(DebugError::AtEnd));
    }

    #[test]
    fn test_input_resumes_recording() {
        let mut s = session("3,9,8,9,10,9,4,9,99,-1,8", &[]);
        s.run().unwrap();
        assert!(s.is_awaiting_input());
        assert_eq!(s.total_snapshots(), 1);
        assert_eq!(s.current().unwrap().status, RunStatus::AwaitingInput);

        s.rewind_to_start();
        s.provide_input(8).unwrap();
        assert!(s.is_finished());
        assert!(s.is_at_end());
        assert_eq!(s.console().outputs(), vec![1]);
        assert_eq!(s.console().get_output(), vec!["<< 8", ">> 1"]);
    }

    #[test]
    fn test_input_rejected_when_not_starved() {
        let mut s = session("99", &[]);
        s.run().unwrap();
        assert_eq!(s.provide_input(1), Err(DebugError::NotAwaitingInput));
    }

    #[test]
    fn test_fault_attached_to_final_snapshot() {
        let mut s = session("1101,1,1,5,42,0", &[]);
        let err = s.run().unwrap_err();
        assert!(matches!(
            err,
            DebugError::Fault(RuntimeError::IllegalOpcode { opcode: 42, .. })
        ));
        assert_eq!(s.total_snapshots(), 2);
        let last = s.current().unwrap();
        assert_eq!(last.ip, 4);
        assert!(last.fault.is_some());
        assert!(s.fault().is_some());
        assert!(!s.is_awaiting_input());
    }

    #[test]
    fn test_snapshot_limit_stops_recording() {
        let program = Program::parse("1105,1,0").unwrap();
        let mut s = Session::new(&program, &[], 24 * 4).unwrap();
        assert!(matches!(s.run(), Err(DebugError::SnapshotLimit(_))));
        assert_eq!(s.total_snapshots(), 4);
        assert!(s.truncated().is_some());
        assert!(s.is_at_end());
    }

    #[test]
    fn test_engine_stays_in_step_with_history_after_budget_runs_out() {
        let program = Program::parse("1105,1,0").unwrap();
        let mut s = Session::new(&program, &[], 24 * 4).unwrap();

        for _ in 0..3 {
            assert!(matches!(s.run(), Err(DebugError::SnapshotLimit(_))));
            assert_eq!(s.total_snapshots(), 4);
            assert_eq!(s.engine().steps_executed(), 3);
            assert_eq!(s.history_position(), 3);
            assert_eq!(s.current().unwrap().ip, s.engine().ip());
        }
    }

    #[test]
    fn test_input_refused_after_budget_runs_out() {
        // Two adds, then wait for input
        let program = Program::parse("1101,0,0,9,1101,0,0,9,3,9,99,0").unwrap();
        let size = 12 * 8;
        let mut s = Session::new(&program, &[], size * 2).unwrap();
        assert!(matches!(s.run(), Err(DebugError::SnapshotLimit(_))));
        assert_eq!(s.engine().ip(), 4);
        assert!(!s.is_awaiting_input());
        assert!(matches!(
            s.provide_input(1),
            Err(DebugError::SnapshotLimit(_))
        ));
        assert!(s.engine().pending_inputs().is_empty());
    }
}
