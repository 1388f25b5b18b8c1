//! Schema inference from sampled documents

use bson::{Bson, Document};
use mongolens_core::FieldInfo;
use std::collections::BTreeMap;

/// Observed type names per dotted field path, in first-seen order
pub type FieldTypes = BTreeMap<String, Vec<String>>;

/// Name of a BSON value's type, as the shell reports it
pub fn bson_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) => "Double",
        Bson::String(_) => "String",
        Bson::Document(_) => "Object",
        Bson::Array(_) => "Array",
        Bson::Binary(_) => "BinData",
        Bson::ObjectId(_) => "ObjectId",
        Bson::Boolean(_) => "Boolean",
        Bson::DateTime(_) => "Date",
        Bson::Null => "Null",
        Bson::RegularExpression(_) => "Regex",
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => "JavaScript",
        Bson::Int32(_) => "Int32",
        Bson::Int64(_) => "Int64",
        Bson::Timestamp(_) => "Timestamp",
        Bson::Decimal128(_) => "Decimal128",
        Bson::MinKey => "MinKey",
        Bson::MaxKey => "MaxKey",
        _ => "Unknown",
    }
}

/// Recursively record the type of every field in `document`
///
/// Nested documents contribute both their own path and their children's
/// dotted paths. Arrays are not descended into.
pub fn collect_field_types(document: &Document, prefix: &str, types: &mut FieldTypes) {
    for (key, value) in document {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let type_name = bson_type_name(value);
        let seen = types.entry(path.clone()).or_default();
        if !seen.iter().any(|t| t == type_name) {
            seen.push(type_name.to_string());
        }

        if let Bson::Document(nested) = value {
            collect_field_types(nested, &path, types);
        }
    }
}

/// Merge the fields of every sample, sorted by path
pub(crate) fn infer_fields<'a>(samples: impl IntoIterator<Item = &'a Document>) -> Vec<FieldInfo> {
    let mut types = FieldTypes::new();
    for document in samples {
        collect_field_types(document, "", &mut types);
    }
    types
        .into_iter()
        .map(|(path, types)| FieldInfo { path, types })
        .collect()
}
