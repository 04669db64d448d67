//! In-memory session and cursor.
//!
//! A linear scan over stored documents with no planner or indexes. Cursors record every
//! configuration call they receive, which makes them useful for observing what a query sends.

mod cursor;
pub mod eval;
mod session;

pub use cursor::{CursorCall, MemoryCursor};
pub use session::MemorySession;
