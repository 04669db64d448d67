//! Class metadata consumed by the query builder.
//!
//! The builder only needs two things from a mapped class: the name of its identifier field and a
//! way to turn a caller-supplied value into the store's native identifier. Both are exposed
//! through [`IdentifierMapping`] so tests and alternative mappers can inject their own rules.

use bson::Bson;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::errors::OdmError;

/// Reserved key the store uses for document identifiers.
pub const ID_KEY: &str = "_id";

/// How identifier values are represented in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdType {
    /// 12-byte object ids; hex strings are parsed.
    #[default]
    ObjectId,
    /// Values are stored as given.
    Native,
}

/// Resolves the identifier field of a class and coerces values offered as identifiers.
pub trait IdentifierMapping {
    fn identifier_field(&self) -> &str;

    /// # Errors
    /// Returns `OdmError::InvalidIdentifier` when `raw` cannot represent an identifier.
    fn coerce_identifier(&self, raw: Bson) -> Result<Bson, OdmError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    pub name: String,
    pub collection: String,
    pub identifier: String,
    #[serde(default)]
    pub id_type: IdType,
}

impl ClassMetadata {
    /// Metadata with an `id` identifier stored as object ids, in a collection named after the class.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { collection: name.to_ascii_lowercase(), name, identifier: "id".to_string(), id_type: IdType::ObjectId }
    }

    #[must_use]
    pub fn with_identifier(mut self, field: impl Into<String>) -> Self {
        self.identifier = field.into();
        self
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    #[must_use]
    pub const fn with_id_type(mut self, id_type: IdType) -> Self {
        self.id_type = id_type;
        self
    }
}

impl IdentifierMapping for ClassMetadata {
    fn identifier_field(&self) -> &str {
        &self.identifier
    }

    fn coerce_identifier(&self, raw: Bson) -> Result<Bson, OdmError> {
        match self.id_type {
            IdType::Native => Ok(raw),
            IdType::ObjectId => to_object_id(&self.identifier, raw).map(Bson::ObjectId),
        }
    }
}

fn to_object_id(field: &str, raw: Bson) -> Result<ObjectId, OdmError> {
    match raw {
        Bson::ObjectId(oid) => Ok(oid),
        Bson::String(s) => ObjectId::parse_str(&s).map_err(|e| OdmError::InvalidIdentifier {
            field: field.to_string(),
            reason: format!("{s:?} is not an object id: {e}"),
        }),
        other => Err(OdmError::InvalidIdentifier {
            field: field.to_string(),
            reason: format!("unsupported identifier value {other}"),
        }),
    }
}
