//! Loading fixture documents into the embedded engine from JSON files.

use crate::errors::StorageError;
use bson::{Bson, Document};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use super::collection::MemoryCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    /// A single JSON array of documents.
    JsonArray,
    /// One JSON document per line.
    Ndjson,
}

/// Picks the format from the extension, falling back to the first non-blank
/// byte (`[` means an array).
///
/// # Errors
/// Propagates read errors from peeking into the reader.
pub fn detect_format<R: BufRead>(reader: &mut R, path: &Path) -> io::Result<SeedFormat> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str())
        && matches!(ext.to_lowercase().as_str(), "jsonl" | "ndjson")
    {
        return Ok(SeedFormat::Ndjson);
    }
    let buf = reader.fill_buf()?;
    let head = String::from_utf8_lossy(&buf[..buf.len().min(256)]);
    if head.trim_start().starts_with('[') {
        return Ok(SeedFormat::JsonArray);
    }
    Ok(SeedFormat::Ndjson)
}

/// Parses documents in the given format. Extended JSON (`{"$oid": ..}`) is
/// honoured.
///
/// # Errors
/// Returns an error on malformed JSON or a non-object entry, naming the line
/// for NDJSON input.
pub fn read_documents<R: Read>(reader: R, format: SeedFormat) -> Result<Vec<Document>, StorageError> {
    match format {
        SeedFormat::JsonArray => {
            let val: serde_json::Value = serde_json::from_reader(reader)?;
            let serde_json::Value::Array(items) = val else {
                return Err(StorageError::InvalidDocument("expected JSON array".into()));
            };
            items.into_iter().enumerate().map(|(i, v)| to_document(v, || format!("entry {i}"))).collect()
        }
        SeedFormat::Ndjson => {
            let mut out = Vec::new();
            for (i, line) in BufReader::new(reader).lines().enumerate() {
                let line = line?;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let v: serde_json::Value = serde_json::from_str(line)?;
                out.push(to_document(v, || format!("line {}", i + 1))?);
            }
            Ok(out)
        }
    }
}

fn to_document(v: serde_json::Value, at: impl Fn() -> String) -> Result<Document, StorageError> {
    match Bson::try_from(v) {
        Ok(Bson::Document(d)) => Ok(d),
        Ok(_) => Err(StorageError::InvalidDocument(format!("{}: not an object", at()))),
        Err(e) => Err(StorageError::InvalidDocument(format!("{}: {e}", at()))),
    }
}

/// Reads `path` and inserts every document into `collection`.
///
/// # Errors
/// Returns an error when the file cannot be opened or parsed. Nothing is
/// inserted on a parse failure.
pub fn seed_from_path(collection: &MemoryCollection, path: &Path) -> Result<usize, StorageError> {
    let mut reader = BufReader::new(File::open(path)?);
    let format = detect_format(&mut reader, path)?;
    let docs = read_documents(reader, format)?;
    let n = collection.insert_many(docs);
    log::info!("seeded {n} documents from {}", path.display());
    Ok(n)
}
