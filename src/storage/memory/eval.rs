use bson::{Bson, Document};
use std::cmp::Ordering;

use super::filter::{CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH};
use super::text;

/// Evaluates `filter` against one document. `text_fields` are the fields
/// covered by the collection's text index.
#[must_use]
pub fn eval_filter(doc: &Document, filter: &Filter, text_fields: &[String]) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f, text_fields)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f, text_fields)),
        Filter::Exists { path, exists } => get_path(doc, path).is_some() == *exists,
        Filter::In { path, values } => get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Nin { path, values } => !get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Cmp { path, op, value } => {
            let found = get_path(doc, path);
            match op {
                CmpOp::Eq => found.is_some_and(|v| matches_eq(v, value)),
                CmpOp::Ne => !found.is_some_and(|v| matches_eq(v, value)),
                CmpOp::Gt => found.is_some_and(|v| bson_cmp(v, value) == Some(Ordering::Greater)),
                CmpOp::Gte => found.is_some_and(|v| matches!(bson_cmp(v, value), Some(Ordering::Greater | Ordering::Equal))),
                CmpOp::Lt => found.is_some_and(|v| bson_cmp(v, value) == Some(Ordering::Less)),
                CmpOp::Lte => found.is_some_and(|v| matches!(bson_cmp(v, value), Some(Ordering::Less | Ordering::Equal))),
            }
        }
        Filter::Text { search } => text::matches(doc, text_fields, search),
    }
}

/// Equality the way MongoDB applies it: an array field matches when the
/// array itself or any element equals the operand.
fn matches_eq(v: &Bson, value: &Bson) -> bool {
    if bson_equal(v, value) {
        return true;
    }
    match v {
        Bson::Array(items) => items.iter().any(|x| bson_equal(x, value)),
        _ => false,
    }
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().take(MAX_IN_SET).any(|x| matches_eq(v, x))
}

pub(crate) fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut iter = path.split('.');
    let first = iter.next()?;
    let mut depth = 1usize;
    let mut cur: Option<&Bson> = doc.get(first);
    for part in iter {
        depth += 1;
        if depth > MAX_PATH_DEPTH {
            return None;
        }
        match cur {
            Some(Bson::Document(d)) => cur = d.get(part),
            _ => return None,
        }
    }
    cur
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(b: &Bson) -> Option<f64> {
    match b {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

#[allow(clippy::float_cmp)]
fn bson_equal(a: &Bson, b: &Bson) -> bool {
    match (to_f64(a), to_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering within a comparable type bracket; `None` across brackets, so a
/// string never compares greater than a number.
fn bson_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(af), Some(bf)) = (to_f64(a), to_f64(b)) {
        return af.partial_cmp(&bf);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
