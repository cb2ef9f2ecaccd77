//! The parsed paper: metadata fields plus an ordered list of sections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeResult;
use crate::format::InputFormat;

/// Non-section document fields, keyed by field name.
///
/// Values are arbitrary JSON (strings, author lists, nested objects) and are
/// compared by deep structural equality.
pub type Metadata = BTreeMap<String, Value>;

/// A titled block of text within a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub text: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
        }
    }

    /// The empty section used as the missing side of an insertion or deletion.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if both heading and text are empty.
    pub fn is_empty(&self) -> bool {
        self.heading.is_empty() && self.text.is_empty()
    }
}

/// A parsed paper.
///
/// Section order is meaningful: it is the first signal used when aligning two
/// versions of the same paper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: Metadata,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new(metadata: Metadata, sections: Vec<Section>) -> Self {
        Self { metadata, sections }
    }

    /// Build a document with no metadata.
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self {
            metadata: Metadata::new(),
            sections,
        }
    }

    /// Read a document from a JSON value in the given input format.
    ///
    /// Validation happens here, before any diff work: a malformed document is
    /// rejected as a whole.
    pub fn from_value(value: Value, format: InputFormat) -> TypeResult<Self> {
        format.read(value)
    }

    /// Parse a document from a JSON string in the given input format.
    pub fn from_json_str(json: &str, format: InputFormat) -> TypeResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value, format)
    }

    /// Look up a metadata field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.metadata.get(name)
    }

    /// Concatenate every section as `heading\ntext\n`, in document order.
    pub fn to_text(&self) -> String {
        let len = self
            .sections
            .iter()
            .map(|s| s.heading.len() + s.text.len() + 2)
            .sum();
        let mut text = String::with_capacity(len);
        for section in &self.sections {
            text.push_str(&section.heading);
            text.push('\n');
            text.push_str(&section.text);
            text.push('\n');
        }
        text
    }
}
