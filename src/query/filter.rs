use bson::{Bson, Document};

/// True for a non-empty document whose keys are all operator tokens (`$`-prefixed).
#[must_use]
pub fn is_operator_document(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
}

/// Writes `value` under `field` in `filter`.
///
/// When the field already holds an operator mapping and `value` is one too, the two mappings are
/// unioned and the incoming operators win on conflict. Any other combination overwrites the
/// entry in place, keeping its position.
pub fn merge_predicate(filter: &mut Document, field: String, value: Bson) {
    if let Bson::Document(incoming) = &value
        && is_operator_document(incoming)
        && let Some(Bson::Document(existing)) = filter.get_mut(&field)
        && is_operator_document(existing)
    {
        for (op, operand) in incoming {
            existing.insert(op.clone(), operand.clone());
        }
        log::trace!("merged operators into `{field}`: {existing}");
        return;
    }
    filter.insert(field, value);
}
