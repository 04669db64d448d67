//! Fluent query builder for a document object mapper.
//!
//! A [`Query`] accumulates a filter, projection, sort order and cursor options through chained
//! calls, compiles them into a [`CompiledRequest`] and hands that to a [`Session`] to obtain a
//! configured [`Cursor`]. Predicates on a class's identifier field are rewritten to `_id` and
//! their values coerced to the store's identifier type as they are added.

pub mod config;
pub mod errors;
pub mod logger;
pub mod memory;
pub mod metadata;
pub mod query;
pub mod session;
pub mod utils;

pub use errors::OdmError;
pub use metadata::{ClassMetadata, ID_KEY, IdType, IdentifierMapping};
pub use query::{CompiledRequest, FindOptions, Operator, Order, Query};
pub use session::{Cursor, Session};

/// Initializes the logging system from `log4rs.yaml`.
///
/// This function should be called before any other operations when file-based logging is
/// wanted. Use [`logger::configure_logging`] for programmatic setup.
///
/// # Errors
/// Returns `OdmError::Io` when the file is missing or invalid.
pub fn init() -> Result<(), OdmError> {
    logger::init()
}
