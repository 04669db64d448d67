//! Identifier aliasing for predicates entering the filter.

use bson::{Bson, Document};

use super::filter::is_operator_document;
use super::operator::Operator;
use crate::errors::OdmError;
use crate::metadata::{ID_KEY, IdentifierMapping};

/// Resolves the filter key and value for a predicate on `field`.
///
/// Predicates on the mapped identifier field are rewritten to [`ID_KEY`] and their value is
/// coerced to the native identifier type. For operator mappings only the operands that hold
/// identifier values are coerced. Every other field passes through untouched.
///
/// # Errors
/// Returns `OdmError::InvalidIdentifier` when an identifier value cannot be coerced.
pub fn compile_predicate<M>(mapping: &M, field: &str, value: Bson) -> Result<(String, Bson), OdmError>
where
    M: IdentifierMapping + ?Sized,
{
    if field != mapping.identifier_field() {
        return Ok((field.to_string(), value));
    }
    let value = match value {
        Bson::Document(ops) if is_operator_document(&ops) => Bson::Document(coerce_operands(mapping, ops)?),
        other => mapping.coerce_identifier(other)?,
    };
    Ok((ID_KEY.to_string(), value))
}

fn coerce_operands<M>(mapping: &M, ops: Document) -> Result<Document, OdmError>
where
    M: IdentifierMapping + ?Sized,
{
    let mut out = Document::new();
    for (token, operand) in ops {
        let operand = match Operator::from_token(&token) {
            Some(op) if op.takes_value_list() => match operand {
                Bson::Array(items) => Bson::Array(
                    items.into_iter().map(|v| mapping.coerce_identifier(v)).collect::<Result<_, _>>()?,
                ),
                single => mapping.coerce_identifier(single)?,
            },
            Some(op) if op.takes_value() => mapping.coerce_identifier(operand)?,
            _ => operand,
        };
        out.insert(token, operand);
    }
    Ok(out)
}
