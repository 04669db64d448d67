use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::errors::OdmError;
use crate::session::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// `"asc"` in any letter case is ascending; every other token is descending.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("asc") { Self::Asc } else { Self::Desc }
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

impl From<&str> for Order {
    fn from(token: &str) -> Self {
        Self::from_token(token)
    }
}

impl From<String> for Order {
    fn from(token: String) -> Self {
        Self::from_token(&token)
    }
}

impl From<Order> for Bson {
    fn from(order: Order) -> Self {
        Self::Int32(order.as_i32())
    }
}

/// Result-shaping options applied to a cursor after it is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    pub sort: Document,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    #[serde(default)]
    pub hints: Vec<Document>,
    #[serde(default)]
    pub slave_okay: bool,
    #[serde(default)]
    pub snapshot: bool,
    #[serde(default)]
    pub immortal: bool,
}

impl FindOptions {
    /// Configures `cursor` with every option.
    ///
    /// Limit, skip, sort, immortal and slave-okay are always sent so the cursor ends up in a known
    /// state. Snapshot is only sent when enabled because cursors cannot leave snapshot mode.
    /// Hints are sent in the order they were added.
    ///
    /// # Errors
    /// Propagates the first error returned by the cursor.
    pub fn apply_to<C: Cursor + ?Sized>(&self, cursor: &mut C) -> Result<(), OdmError> {
        cursor.limit(self.limit)?;
        cursor.skip(self.skip)?;
        cursor.sort(&self.sort)?;
        cursor.immortal(self.immortal)?;
        cursor.slave_okay(self.slave_okay)?;
        if self.snapshot {
            cursor.snapshot()?;
        }
        for key_pattern in &self.hints {
            cursor.hint(key_pattern)?;
        }
        Ok(())
    }
}

/// Everything needed to open and configure a cursor, captured from a builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRequest {
    pub class_name: String,
    pub filter: Document,
    pub projection: Vec<String>,
    pub options: FindOptions,
}
