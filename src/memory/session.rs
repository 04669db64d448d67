use bson::oid::ObjectId;
use bson::{Bson, Document};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::cursor::MemoryCursor;
use super::eval::{matches, validate_filter};
use crate::errors::OdmError;
use crate::metadata::{ClassMetadata, ID_KEY, IdType};
use crate::session::Session;

struct MemoryCollection {
    meta: ClassMetadata,
    docs: Vec<Document>,
}

/// Session over documents held in memory, keyed by class name.
#[derive(Default)]
pub struct MemorySession {
    classes: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a class. Re-registering a class replaces its metadata and keeps its documents.
    pub fn register(&self, meta: ClassMetadata) {
        let mut classes = self.classes.write();
        match classes.get_mut(&meta.name) {
            Some(col) => col.meta = meta,
            None => {
                classes.insert(meta.name.clone(), MemoryCollection { meta, docs: Vec::new() });
            }
        }
    }

    /// Stores `doc` and returns its `_id`, generating an object id when the class uses them and
    /// the document has none.
    ///
    /// # Errors
    /// `NoSuchClass` for an unmapped class; `QueryError` when a native-id document lacks `_id`.
    pub fn insert(&self, class_name: &str, mut doc: Document) -> Result<Bson, OdmError> {
        let mut classes = self.classes.write();
        let col = classes.get_mut(class_name).ok_or_else(|| OdmError::NoSuchClass(class_name.to_string()))?;
        let id = match doc.get(ID_KEY) {
            Some(id) => id.clone(),
            None if col.meta.id_type == IdType::ObjectId => {
                let id = Bson::ObjectId(ObjectId::new());
                doc.insert(ID_KEY, id.clone());
                id
            }
            None => return Err(OdmError::QueryError(format!("{class_name} document requires {ID_KEY}"))),
        };
        col.docs.push(doc);
        Ok(id)
    }

    pub fn len(&self, class_name: &str) -> usize {
        self.classes.read().get(class_name).map_or(0, |c| c.docs.len())
    }
}

impl Session for MemorySession {
    type Cursor = MemoryCursor;

    fn class_metadata(&self, class_name: &str) -> Result<ClassMetadata, OdmError> {
        self.classes
            .read()
            .get(class_name)
            .map(|c| c.meta.clone())
            .ok_or_else(|| OdmError::NoSuchClass(class_name.to_string()))
    }

    fn find(&self, class_name: &str, filter: &Document, fields: &[String]) -> Result<MemoryCursor, OdmError> {
        let classes = self.classes.read();
        let col = classes.get(class_name).ok_or_else(|| OdmError::NoSuchClass(class_name.to_string()))?;
        if let Err(e) = validate_filter(filter) {
            log::warn!("memory session rejected filter for {class_name}: {e}");
            return Err(e);
        }
        let docs: Vec<Document> = col.docs.iter().filter(|d| matches(d, filter)).cloned().collect();
        log::debug!("memory find {class_name}: {} of {} documents matched", docs.len(), col.docs.len());
        Ok(MemoryCursor::new(docs, fields.to_vec()))
    }
}
