//! Boundary traits for the persistence layer the query builder delegates to.

use bson::Document;

use crate::errors::OdmError;
use crate::metadata::ClassMetadata;

/// Resolves class metadata and opens cursors.
pub trait Session {
    type Cursor: Cursor;

    /// # Errors
    /// Returns an error when the class is not mapped.
    fn class_metadata(&self, class_name: &str) -> Result<ClassMetadata, OdmError>;

    /// Opens a cursor over documents of `class_name` matching `filter`.
    /// An empty `fields` slice selects whole documents.
    ///
    /// # Errors
    /// Returns an error when the class is unknown or the store rejects the request.
    fn find(&self, class_name: &str, filter: &Document, fields: &[String]) -> Result<Self::Cursor, OdmError>;
}

/// A not-yet-executed result set.
///
/// Each configuration call overwrites the previous setting of that dimension, except `hint`
/// which accumulates. `snapshot` has no off switch.
pub trait Cursor {
    type Item;

    fn limit(&mut self, limit: Option<i64>) -> Result<(), OdmError>;
    fn skip(&mut self, skip: Option<i64>) -> Result<(), OdmError>;
    fn sort(&mut self, sort: &Document) -> Result<(), OdmError>;
    fn slave_okay(&mut self, ok: bool) -> Result<(), OdmError>;
    fn snapshot(&mut self) -> Result<(), OdmError>;
    fn immortal(&mut self, immortal: bool) -> Result<(), OdmError>;
    fn hint(&mut self, key_pattern: &Document) -> Result<(), OdmError>;

    /// Runs the query and materializes every result in order.
    ///
    /// # Errors
    /// Propagates store failures.
    fn get_results(&mut self) -> Result<Vec<Self::Item>, OdmError>;

    /// # Errors
    /// Propagates store failures.
    fn count(&mut self, include_limit_skip: bool) -> Result<u64, OdmError>;
}
