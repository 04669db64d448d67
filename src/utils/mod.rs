//! Utility modules: developer logging.
pub mod devlog;
