use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Operator tokens understood in filter documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    In,
    Nin,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Size,
    Exists,
    Type,
    All,
    Mod,
}

impl Operator {
    pub const ALL: [Self; 13] = [
        Self::Eq,
        Self::In,
        Self::Nin,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Size,
        Self::Exists,
        Self::Type,
        Self::All,
        Self::Mod,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Size => "$size",
            Self::Exists => "$exists",
            Self::Type => "$type",
            Self::All => "$all",
            Self::Mod => "$mod",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    /// Operand is a list of field values (`$in`, `$nin`, `$all`).
    #[must_use]
    pub const fn takes_value_list(self) -> bool {
        matches!(self, Self::In | Self::Nin | Self::All)
    }

    /// Operand is a single field value (`$eq`, `$ne` and the comparisons).
    #[must_use]
    pub const fn takes_value(self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// Single-key operator mapping `{token: operand}`.
    #[must_use]
    pub fn fragment(self, operand: impl Into<Bson>) -> Document {
        let mut doc = Document::new();
        doc.insert(self.token(), operand.into());
        doc
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
