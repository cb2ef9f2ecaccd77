//! Input formats: the JSON shapes a [`Document`] can be read from.
//!
//! `Document` is papertrail's own shape. The other two are the output formats
//! offered by a science-parse server, which put metadata fields at the top
//! level next to `sections` and sometimes omit section headings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Document, Metadata, Section};
use crate::error::{TypeError, TypeResult};

/// The JSON shape a document arrives in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    /// `{"metadata": {...}, "sections": [{"heading", "text"}]}`, strictly validated.
    #[default]
    Document,
    /// science-parse `LabeledData` output.
    LabeledData,
    /// science-parse `ExtractedMetadata` output.
    ExtractedMetadata,
}

impl InputFormat {
    /// Read and validate a document from a JSON value.
    pub fn read(self, value: Value) -> TypeResult<Document> {
        let Value::Object(mut root) = value else {
            return Err(TypeError::validation("document must be a JSON object"));
        };

        match self {
            Self::Document => {
                let metadata = match root.remove("metadata") {
                    Some(Value::Object(fields)) => fields.into_iter().collect(),
                    Some(other) => {
                        return Err(TypeError::validation(format!(
                            "`metadata` must be an object, got {}",
                            kind_of(&other)
                        )))
                    }
                    None => return Err(TypeError::validation("missing `metadata`")),
                };
                let sections = read_sections(root.remove("sections"), true)?;
                Ok(Document::new(metadata, sections))
            }
            Self::LabeledData | Self::ExtractedMetadata => {
                let sections = read_sections(root.remove("sections"), false)?;
                let metadata: Metadata = root.into_iter().collect();
                Ok(Document::new(metadata, sections))
            }
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::LabeledData => "labeled-data",
            Self::ExtractedMetadata => "extracted-metadata",
        };
        f.write_str(name)
    }
}

impl FromStr for InputFormat {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Self::Document),
            "labeled-data" | "LabeledData" => Ok(Self::LabeledData),
            "extracted-metadata" | "ExtractedMetadata" => Ok(Self::ExtractedMetadata),
            other => Err(TypeError::validation(format!("unknown input format: {other}"))),
        }
    }
}

fn read_sections(value: Option<Value>, strict_heading: bool) -> TypeResult<Vec<Section>> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(TypeError::validation(format!(
                "`sections` must be an array, got {}",
                kind_of(&other)
            )))
        }
        None => return Err(TypeError::validation("missing `sections`")),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(mut fields) => {
                let heading = match take_string(&mut fields, "heading", index)? {
                    Some(heading) => heading,
                    None if strict_heading => {
                        return Err(TypeError::validation(format!(
                            "section {index} is missing `heading`"
                        )))
                    }
                    None => String::new(),
                };
                let text = take_string(&mut fields, "text", index)?.ok_or_else(|| {
                    TypeError::validation(format!("section {index} is missing `text`"))
                })?;
                Ok(Section { heading, text })
            }
            other => Err(TypeError::validation(format!(
                "section {index} must be an object, got {}",
                kind_of(&other)
            ))),
        })
        .collect()
}

/// Take a string field; `null` reads as absent.
fn take_string(
    fields: &mut Map<String, Value>,
    key: &str,
    index: usize,
) -> TypeResult<Option<String>> {
    match fields.remove(key) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(TypeError::validation(format!(
            "section {index}: `{key}` must be a string, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validation_message(result: TypeResult<Document>) -> String {
        match result {
            Err(TypeError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn reads_document_format() {
        let doc = InputFormat::Document
            .read(json!({
                "metadata": {"title": "A", "year": 2020},
                "sections": [{"heading": "Intro", "text": "Hello"}]
            }))
            .unwrap();
        assert_eq!(doc.metadata.len(), 2);
        assert_eq!(doc.sections, vec![Section::new("Intro", "Hello")]);
    }

    #[test]
    fn document_format_requires_metadata() {
        let msg = validation_message(InputFormat::Document.read(json!({"sections": []})));
        assert!(msg.contains("metadata"));
    }

    #[test]
    fn document_format_requires_sections() {
        let msg = validation_message(InputFormat::Document.read(json!({"metadata": {}})));
        assert!(msg.contains("sections"));
    }

    #[test]
    fn document_format_requires_heading() {
        let msg = validation_message(InputFormat::Document.read(json!({
            "metadata": {},
            "sections": [{"heading": "A", "text": "a"}, {"text": "b"}]
        })));
        assert!(msg.contains("section 1"));
        assert!(msg.contains("heading"));
    }

    #[test]
    fn section_requires_text() {
        let msg = validation_message(InputFormat::LabeledData.read(json!({
            "sections": [{"heading": "A"}]
        })));
        assert!(msg.contains("text"));
    }

    #[test]
    fn rejects_non_string_text() {
        let msg = validation_message(InputFormat::Document.read(json!({
            "metadata": {},
            "sections": [{"heading": "A", "text": 3}]
        })));
        assert!(msg.contains("must be a string"));
    }

    #[test]
    fn rejects_non_object_root() {
        let msg = validation_message(InputFormat::Document.read(json!([1, 2])));
        assert!(msg.contains("JSON object"));
    }

    #[test]
    fn science_parse_fields_become_metadata() {
        let doc = InputFormat::ExtractedMetadata
            .read(json!({
                "title": "A paper",
                "authors": ["X", "Y"],
                "year": 2019,
                "sections": [
                    {"heading": null, "text": "Preamble"},
                    {"text": "No heading either"},
                    {"heading": "1 Introduction", "text": "Body"}
                ]
            }))
            .unwrap();
        assert_eq!(doc.metadata.len(), 3);
        assert_eq!(doc.field("authors"), Some(&json!(["X", "Y"])));
        assert_eq!(doc.sections[0].heading, "");
        assert_eq!(doc.sections[1].heading, "");
        assert_eq!(doc.sections[2].heading, "1 Introduction");
    }

    #[test]
    fn science_parse_requires_sections() {
        let msg = validation_message(
            InputFormat::LabeledData.read(json!({"title": "A", "sections": null})),
        );
        assert!(msg.contains("got null"));

        let msg = validation_message(InputFormat::ExtractedMetadata.read(json!({"title": "A"})));
        assert!(msg.contains("missing `sections`"));
    }

    #[test]
    fn parse_format_names() {
        assert_eq!("document".parse::<InputFormat>().unwrap(), InputFormat::Document);
        assert_eq!("LabeledData".parse::<InputFormat>().unwrap(), InputFormat::LabeledData);
        assert_eq!(
            "extracted-metadata".parse::<InputFormat>().unwrap(),
            InputFormat::ExtractedMetadata
        );
        assert!("pdf".parse::<InputFormat>().is_err());
        assert_eq!(InputFormat::LabeledData.to_string(), "labeled-data");
    }

    #[test]
    fn from_json_str_reports_bad_json() {
        let err = Document::from_json_str("{not json", InputFormat::Document).unwrap_err();
        assert!(matches!(err, TypeError::Json(_)));
    }
}
