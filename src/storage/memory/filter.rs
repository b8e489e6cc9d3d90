use crate::errors::StorageError;
use bson::{Bson, Document};

use super::text::TextSearch;

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Parsed form of a MongoDB-style query document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Exists { path: String, exists: bool },
    In { path: String, values: Vec<Bson> },
    Nin { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
    /// Full-text search; matched against the collection's text index.
    Text { search: TextSearch },
}

impl Filter {
    /// True when any clause needs a text index.
    #[must_use]
    pub fn uses_text(&self) -> bool {
        match self {
            Self::Text { .. } => true,
            Self::And(fs) | Self::Or(fs) => fs.iter().any(Self::uses_text),
            _ => false,
        }
    }
}

/// Parses a query document. `{}` matches everything; multiple top-level keys
/// are an implicit `$and`.
///
/// # Errors
/// Returns `StorageError::QueryError` for unknown operators, malformed operands,
/// or `$text` outside the top level.
pub fn parse_query(query: &Document) -> Result<Filter, StorageError> {
    parse_clauses(query, true)
}

fn parse_clauses(query: &Document, top_level: bool) -> Result<Filter, StorageError> {
    let mut clauses = Vec::with_capacity(query.len());
    for (key, value) in query {
        match key.as_str() {
            "$and" => clauses.push(Filter::And(parse_list(key, value)?)),
            "$or" => clauses.push(Filter::Or(parse_list(key, value)?)),
            "$text" if top_level => clauses.push(parse_text(value)?),
            "$text" => return Err(StorageError::QueryError("$text is only allowed at the top level".into())),
            op if op.starts_with('$') => return Err(StorageError::QueryError(format!("unknown top level operator: {op}"))),
            path => clauses.extend(parse_field(path, value)?),
        }
    }
    Ok(match clauses.len() {
        0 => Filter::True,
        1 => clauses.swap_remove(0),
        _ => Filter::And(clauses),
    })
}

fn parse_list(op: &str, value: &Bson) -> Result<Vec<Filter>, StorageError> {
    let Bson::Array(items) = value else {
        return Err(StorageError::QueryError(format!("{op} must be an array")));
    };
    if items.is_empty() {
        return Err(StorageError::QueryError(format!("{op} must be a nonempty array")));
    }
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => parse_clauses(d, false),
            _ => Err(StorageError::QueryError(format!("{op} entries must be documents"))),
        })
        .collect()
}

fn parse_text(value: &Bson) -> Result<Filter, StorageError> {
    let Bson::Document(ops) = value else {
        return Err(StorageError::QueryError("$text expects a document".into()));
    };
    let mut search = None;
    for (key, v) in ops {
        match (key.as_str(), v) {
            ("$search", Bson::String(s)) => search = Some(s.as_str()),
            ("$search", _) => return Err(StorageError::QueryError("$search must be a string".into())),
            ("$language" | "$caseSensitive" | "$diacriticSensitive", _) => {}
            (other, _) => return Err(StorageError::QueryError(format!("unknown $text option: {other}"))),
        }
    }
    let search = search.ok_or_else(|| StorageError::QueryError("$text requires $search".into()))?;
    Ok(Filter::Text { search: TextSearch::parse(search) })
}

fn is_operator_doc(d: &Document) -> bool {
    d.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn parse_field(path: &str, value: &Bson) -> Result<Vec<Filter>, StorageError> {
    if path.split('.').count() > MAX_PATH_DEPTH {
        return Err(StorageError::QueryError(format!("field path too deep: {path}")));
    }
    let ops = match value {
        Bson::Document(d) if is_operator_doc(d) => d,
        literal => return Ok(vec![Filter::Cmp { path: path.to_string(), op: CmpOp::Eq, value: literal.clone() }]),
    };
    let mut out = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let path = path.to_string();
        if let Some(cmp) = cmp_op(op) {
            out.push(Filter::Cmp { path, op: cmp, value: operand.clone() });
            continue;
        }
        out.push(match op.as_str() {
            "$in" => Filter::In { path, values: set_operand(op, operand)? },
            "$nin" => Filter::Nin { path, values: set_operand(op, operand)? },
            "$exists" => Filter::Exists { path, exists: truthy(operand) },
            other => return Err(StorageError::QueryError(format!("unknown operator: {other}"))),
        });
    }
    Ok(out)
}

fn cmp_op(op: &str) -> Option<CmpOp> {
    Some(match op {
        "$eq" => CmpOp::Eq,
        "$ne" => CmpOp::Ne,
        "$gt" => CmpOp::Gt,
        "$gte" => CmpOp::Gte,
        "$lt" => CmpOp::Lt,
        "$lte" => CmpOp::Lte,
        _ => return None,
    })
}

fn set_operand(op: &str, operand: &Bson) -> Result<Vec<Bson>, StorageError> {
    match operand {
        Bson::Array(values) => Ok(values.iter().take(MAX_IN_SET).cloned().collect()),
        _ => Err(StorageError::QueryError(format!("{op} needs an array"))),
    }
}

fn truthy(v: &Bson) -> bool {
    match v {
        Bson::Boolean(b) => *b,
        Bson::Int32(i) => *i != 0,
        Bson::Int64(i) => *i != 0,
        Bson::Double(f) => *f != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn empty_document_matches_all() {
        assert_eq!(parse_query(&doc! {}).unwrap(), Filter::True);
    }

    #[test]
    fn literal_and_operator_forms() {
        let f = parse_query(&doc! { "rated": "PG" }).unwrap();
        assert_eq!(f, Filter::Cmp { path: "rated".into(), op: CmpOp::Eq, value: "PG".into() });
        let f = parse_query(&doc! { "year": { "$gte": 1990, "$lt": 2000 } }).unwrap();
        assert!(matches!(f, Filter::And(ref v) if v.len() == 2));
    }

    #[test]
    fn text_is_top_level_only() {
        let f = parse_query(&doc! { "$text": { "$search": "The Matrix" } }).unwrap();
        assert_eq!(f, Filter::Text { search: TextSearch::parse("the matrix") });
        assert!(f.uses_text());
        let nested = doc! { "$or": [ { "$text": { "$search": "x" } } ] };
        assert!(parse_query(&nested).is_err());
    }

    #[test]
    fn unknown_operators_rejected() {
        assert!(parse_query(&doc! { "$where": "1" }).is_err());
        assert!(parse_query(&doc! { "rated": { "$regex": "P" } }).is_err());
        assert!(parse_query(&doc! { "rated": { "$in": "PG" } }).is_err());
    }
}
