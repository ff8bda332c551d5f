//! Response encoding for stored documents.
//!
//! Stored documents carry database-native values that must not leak through
//! the API: the `_id` ObjectId and BSON date-times. Encoding renames the
//! former to a plain `id` string and renders the latter as RFC 3339 text.
//! Everything else is passed through untouched.

use log::debug;
use mongodb::bson::{Bson, Document};
use serde_json::Value;

use crate::store::{Identifier, NATIVE_ID_FIELD};

/// Public name of the identifier field.
pub const PUBLIC_ID_FIELD: &str = "id";

/// Encodes an optional document; `None` stays `None`.
#[cfg(test)]
pub fn encode(document: Option<Document>) -> Option<Document> {
    document.map(encode_document)
}

/// Never fails: a value that cannot be converted is left as it was.
pub fn encode_document(mut document: Document) -> Document {
    if let Some(Identifier::Native(oid)) = document.get(NATIVE_ID_FIELD).map(Identifier::from_bson) {
        document.remove(NATIVE_ID_FIELD);
        document.insert(PUBLIC_ID_FIELD, oid.to_hex());
    }

    document
        .into_iter()
        .map(|(key, value)| match value {
            Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
                Ok(text) => (key, Bson::String(text)),
                Err(e) => {
                    debug!("Leaving field '{}' unconverted: {}", key, e);
                    (key, Bson::DateTime(dt))
                }
            },
            other => (key, other),
        })
        .collect()
}

/// Renders an encoded document as relaxed Extended JSON.
pub fn to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}
