//! # Introduction
//!
//! `intcode` executes programs for a small integer stack machine whose code and
//! data share one flat, growable address space. An engine can suspend when it
//! needs input and resume later, which lets several engines be chained into
//! pipelines and feedback rings. Every step can also be recorded and browsed
//! forward and backward through a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Text → Program → Engine ─┬→ Pipeline → terminal output
//!                          └→ Session → Snapshots → TUI
//! ```
//!
//! 1. [`program`]: parses comma-separated integer text into a [`program::Program`].
//! 2. [`memory`]: the [`memory::AddressSpace`] that grows on write and reads
//!    zero past its extent.
//! 3. [`interpreter`]: instruction decoding, disassembly and the suspendable
//!    [`interpreter::Engine`].
//! 4. [`pipeline`]: round-robin orchestration of engines joined by queues,
//!    plus the phase-ordering search built on top of it.
//! 5. [`snapshot`]: recorded engine state with a configurable memory limit and
//!    a [`snapshot::Console`] of consumed and emitted values.
//! 6. [`debugger`]: a recording [`debugger::Session`] with history navigation.
//! 7. [`ui`]: ratatui-based TUI; not part of the stable library API.

pub mod debugger;
pub mod interpreter;
pub mod memory;
pub mod pipeline;
pub mod program;
pub mod snapshot;
pub mod ui;
