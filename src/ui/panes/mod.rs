//! TUI pane rendering modules
//!
//! This module provides the rendering logic for all visual panes in the TUI,
//! organized by responsibility.
//!
//! # Pane Modules
//!
//! - [`listing`]: Disassembly around the instruction pointer
//! - [`registers`]: Instruction pointer, relative base, status, resolved next instruction
//! - [`memory`]: Word grid with changed-cell highlighting
//! - [`console`]: Values consumed and emitted by the program
//! - [`status`]: Status bar with keybindings and execution state
//!
//! Each pane module exports a primary `render_*` function. Panes are stateless
//! apart from the scroll state the caller passes in.

pub mod console;
pub mod listing;
pub mod memory;
pub mod registers;
pub mod status;

// Re-export render functions for convenience
pub use console::render_console_pane;
pub use listing::{render_listing_pane, ListingScrollState};
pub use memory::render_memory_pane;
pub use registers::render_registers_pane;
pub use status::{render_status_bar, StatusRenderData};
