use bson::{Bson, Document};
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::errors::OdmError;
use crate::query::{Operator, is_operator_document};

const MAX_PATH_DEPTH: usize = 32;

/// Rejects filters using operator tokens outside the supported vocabulary.
///
/// # Errors
/// Returns `OdmError::QueryError` naming the first unknown operator.
pub fn validate_filter(filter: &Document) -> Result<(), OdmError> {
    for (field, cond) in filter {
        if field.starts_with('$') {
            return Err(OdmError::QueryError(format!("top-level operator {field} is not supported")));
        }
        if let Bson::Document(ops) = cond
            && ops.keys().any(|k| k.starts_with('$'))
        {
            if let Some(bad) = ops.keys().find(|k| Operator::from_token(k).is_none()) {
                return Err(OdmError::QueryError(format!("unknown operator {bad} on `{field}`")));
            }
            if !is_operator_document(ops) {
                return Err(OdmError::QueryError(format!("`{field}` mixes operators and fields")));
            }
        }
    }
    Ok(())
}

/// True when `doc` satisfies every entry of `filter`. Expects a filter that passed
/// [`validate_filter`].
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(path, cond)| {
        let resolved = get_path(doc, path);
        let value = resolved.as_deref();
        match cond {
            Bson::Document(ops) if is_operator_document(ops) => ops.iter().all(|(token, operand)| {
                Operator::from_token(token).is_some_and(|op| eval_operator(value, op, operand))
            }),
            literal => equals_or_contains(value, literal),
        }
    })
}

fn eval_operator(value: Option<&Bson>, op: Operator, operand: &Bson) -> bool {
    match op {
        Operator::Eq => equals_or_contains(value, operand),
        Operator::Ne => !equals_or_contains(value, operand),
        Operator::Gt => any_cmp(value, operand, |o| o == Ordering::Greater),
        Operator::Gte => any_cmp(value, operand, |o| o != Ordering::Less),
        Operator::Lt => any_cmp(value, operand, |o| o == Ordering::Less),
        Operator::Lte => any_cmp(value, operand, |o| o != Ordering::Greater),
        Operator::In => in_set(value, operand),
        Operator::Nin => !in_set(value, operand),
        Operator::Size => match (value, as_i64(operand)) {
            (Some(Bson::Array(items)), Some(n)) => i64::try_from(items.len()).is_ok_and(|len| len == n),
            _ => false,
        },
        Operator::Exists => value.is_some() == truthy(operand),
        Operator::Type => value.is_some_and(|v| type_matches(v, operand)),
        Operator::All => match (value, operand) {
            (Some(Bson::Array(items)), Bson::Array(wanted)) => {
                !wanted.is_empty() && wanted.iter().all(|w| items.iter().any(|i| values_equal(i, w)))
            }
            _ => false,
        },
        Operator::Mod => match operand {
            Bson::Array(pair) if pair.len() == 2 => match (as_i64(&pair[0]), as_i64(&pair[1])) {
                (Some(divisor), Some(remainder)) if divisor != 0 => value
                    .and_then(as_i64)
                    .is_some_and(|v| v.checked_rem(divisor).is_some_and(|r| r == remainder)),
                _ => false,
            },
            _ => false,
        },
    }
}

/// Equality against a field, where an array field also matches when one element is equal.
/// A missing field equals null.
fn equals_or_contains(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(v) if values_equal(v, expected) => true,
        Some(Bson::Array(items)) => items.iter().any(|i| values_equal(i, expected)),
        Some(_) => false,
    }
}

fn in_set(value: Option<&Bson>, set: &Bson) -> bool {
    match set {
        Bson::Array(candidates) => candidates.iter().any(|c| equals_or_contains(value, c)),
        _ => false,
    }
}

fn any_cmp(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let check = |v: &Bson| comparable(v, operand) && accept(compare_bson(v, operand));
    match value {
        Some(Bson::Array(items)) => items.iter().any(check),
        Some(v) => check(v),
        None => false,
    }
}

/// Range operators only apply to numbers against numbers and to same-typed scalars with a
/// natural order. Documents, arrays and binaries never satisfy `$gt`/`$lt`.
fn comparable(a: &Bson, b: &Bson) -> bool {
    if is_num(a) || is_num(b) {
        return is_num(a) && is_num(b);
    }
    matches!(
        (a, b),
        (Bson::String(_), Bson::String(_))
            | (Bson::Boolean(_), Bson::Boolean(_))
            | (Bson::ObjectId(_), Bson::ObjectId(_))
            | (Bson::DateTime(_), Bson::DateTime(_))
    )
}

fn truthy(v: &Bson) -> bool {
    match v {
        Bson::Boolean(b) => *b,
        Bson::Null | Bson::Undefined => false,
        other => as_f64(other).is_none_or(|n| n != 0.0),
    }
}

fn type_matches(value: &Bson, wanted: &Bson) -> bool {
    match wanted {
        Bson::String(alias) if alias == "number" => is_num(value),
        Bson::String(alias) => type_alias(value) == alias,
        Bson::Array(options) => options.iter().any(|o| type_matches(value, o)),
        code => as_i64(code).is_some_and(|c| c == type_code(value)),
    }
}

/// Resolves a dotted path. Arrays met along the way fan out over their subdocuments and the
/// values found are gathered into one array, so `items.sku` reaches every element's `sku`.
fn get_path<'a>(doc: &'a Document, path: &str) -> Option<Cow<'a, Bson>> {
    if path.is_empty() {
        return None;
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() > MAX_PATH_DEPTH {
        return None;
    }
    lookup(doc, &parts)
}

fn lookup<'a>(doc: &'a Document, parts: &[&str]) -> Option<Cow<'a, Bson>> {
    let (head, rest) = parts.split_first()?;
    let v = doc.get(*head)?;
    if rest.is_empty() {
        return Some(Cow::Borrowed(v));
    }
    match v {
        Bson::Document(d) => lookup(d, rest),
        Bson::Array(items) => {
            let mut found = Vec::new();
            for item in items {
                if let Bson::Document(d) = item
                    && let Some(hit) = lookup(d, rest)
                {
                    match hit.into_owned() {
                        Bson::Array(xs) => found.extend(xs),
                        x => found.push(x),
                    }
                }
            }
            (!found.is_empty()).then(|| Cow::Owned(Bson::Array(found)))
        }
        _ => None,
    }
}

fn set_path(doc: &mut Document, path: &str, val: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, val);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = doc.get_mut(head) {
                set_path(child, rest, val);
            }
        }
    }
}

/// Keeps `_id` plus the listed fields. An empty list keeps the whole document.
pub fn project_fields(doc: &Document, fields: &[String]) -> Document {
    if fields.is_empty() {
        return doc.clone();
    }
    let mut out = Document::new();
    if let Some(id) = doc.get(crate::metadata::ID_KEY) {
        out.insert(crate::metadata::ID_KEY, id.clone());
    }
    for f in fields {
        if let Some(v) = get_path(doc, f) {
            set_path(&mut out, f, v.into_owned());
        }
    }
    out
}

/// Orders documents by a sort spec of `field: 1 | -1` entries.
pub fn compare_docs(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (field, dir) in sort {
        let ord = match (get_path(a, field), get_path(b, field)) {
            (Some(x), Some(y)) => compare_bson(&x, &y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            let ascending = as_f64(dir).is_none_or(|d| d >= 0.0);
            return if ascending { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

/// Exact integer value, for Int32/Int64 only.
fn as_int(x: &Bson) -> Option<i64> {
    match x {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(x: &Bson) -> Option<f64> {
    match x {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => d.to_string().parse::<f64>().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_i64(x: &Bson) -> Option<i64> {
    match x {
        Bson::Double(f) if f.is_finite() => Some(f.trunc() as i64),
        other => as_int(other),
    }
}

/// Integers compare exactly; floating point is used only once a double or decimal is involved.
fn compare_numbers(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_int(a), as_int(b)) {
        return Some(x.cmp(&y));
    }
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => Some(x.total_cmp(&y)),
        _ => None,
    }
}

#[allow(clippy::float_cmp)]
fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (as_int(a), as_int(b)) {
        return x == y;
    }
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if let Some(ord) = compare_numbers(a, b) {
        return ord;
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::DbPointer(_) => 12,
        Bson::JavaScriptCode(_) => 13,
        Bson::JavaScriptCodeWithScope(_) => 14,
        Bson::MaxKey => 255,
    }
}

fn type_code(v: &Bson) -> i64 {
    match v {
        Bson::Double(_) => 1,
        Bson::String(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::Binary(_) => 5,
        Bson::Undefined => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Null => 10,
        Bson::RegularExpression(_) => 11,
        Bson::DbPointer(_) => 12,
        Bson::JavaScriptCode(_) => 13,
        Bson::Symbol(_) => 14,
        Bson::JavaScriptCodeWithScope(_) => 15,
        Bson::Int32(_) => 16,
        Bson::Timestamp(_) => 17,
        Bson::Int64(_) => 18,
        Bson::Decimal128(_) => 19,
        Bson::MinKey => -1,
        Bson::MaxKey => 127,
    }
}

fn type_alias(v: &Bson) -> &'static str {
    match v {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Document(_) => "object",
        Bson::Array(_) => "array",
        Bson::Binary(_) => "binData",
        Bson::Undefined => "undefined",
        Bson::ObjectId(_) => "objectId",
        Bson::Boolean(_) => "bool",
        Bson::DateTime(_) => "date",
        Bson::Null => "null",
        Bson::RegularExpression(_) => "regex",
        Bson::DbPointer(_) => "dbPointer",
        Bson::JavaScriptCode(_) => "javascript",
        Bson::Symbol(_) => "symbol",
        Bson::JavaScriptCodeWithScope(_) => "javascriptWithScope",
        Bson::Int32(_) => "int",
        Bson::Timestamp(_) => "timestamp",
        Bson::Int64(_) => "long",
        Bson::Decimal128(_) => "decimal",
        Bson::MinKey => "minKey",
        Bson::MaxKey => "maxKey",
    }
}
