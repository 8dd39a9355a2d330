//! Console shell for lineage: prompts, rendering and the command loop.
//!
//! The binary in `main.rs` wires these to stdin/stdout; tests drive them with
//! in-memory buffers.

pub mod console;
pub mod render;
pub mod shell;
