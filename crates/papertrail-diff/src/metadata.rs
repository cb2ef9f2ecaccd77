//! Metadata diff: compare the non-section fields of two documents.
//!
//! Fields are `serde_json::Value`s compared by deep structural equality.
//! Changes come out ordered by field name.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use papertrail_types::Metadata;

/// What happened to a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

/// A single metadata field that differs between the two documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub kind: ChangeKind,
    /// Value in the old document; `None` for an added field.
    pub old: Option<Value>,
    /// Value in the new document; `None` for a removed field.
    pub new: Option<Value>,
}

/// Compute the metadata diff between two documents.
///
/// Fields only in `new` are `Added`, fields only in `old` are `Removed`, and
/// fields in both with different values are `Changed`. Equal fields produce
/// no entry.
pub fn diff_metadata(old: &Metadata, new: &Metadata) -> Vec<FieldChange> {
    diff_metadata_ignoring(old, new, &[])
}

/// Like [`diff_metadata`], skipping the named fields on both sides.
pub fn diff_metadata_ignoring(
    old: &Metadata,
    new: &Metadata,
    ignored: &[String],
) -> Vec<FieldChange> {
    let fields: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    fields
        .into_iter()
        .filter(|field| !ignored.iter().any(|i| i == *field))
        .filter_map(|field| {
            let (kind, old, new) = match (old.get(field), new.get(field)) {
                (Some(o), Some(n)) if o == n => return None,
                (Some(o), Some(n)) => (ChangeKind::Changed, Some(o.clone()), Some(n.clone())),
                (Some(o), None) => (ChangeKind::Removed, Some(o.clone()), None),
                (None, Some(n)) => (ChangeKind::Added, None, Some(n.clone())),
                (None, None) => return None,
            };
            Some(FieldChange {
                field: field.clone(),
                kind,
                old,
                new,
            })
        })
        .collect()
}
