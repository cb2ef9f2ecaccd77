//! Diff configuration: strategy, text diff options and aligner thresholds.
//!
//! Every struct deserializes with defaults for missing keys, so a config file
//! only needs the settings it changes.

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, EngineResult};

/// Default similarity a same-position section pair needs to be matched in place.
pub const DEFAULT_POSITIONAL_THRESHOLD: f64 = 0.5;

/// How two documents are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Align sections (by position, heading and content), then diff each pair.
    #[default]
    AlignedSections,
    /// Pair sections strictly by index.
    PositionalSections,
    /// Join every section into one text per document and diff those.
    FlattenedWholeDocument,
}

/// Token size used by the text diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    #[default]
    Char,
    Word,
    Line,
    /// Sentences split on `". "`.
    Sentence,
}

/// Options for the text diff primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDiffOptions {
    pub granularity: Granularity,
    /// Merge trivial fragments into readable chunks.
    pub semantic_cleanup: bool,
}

impl Default for TextDiffOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Char,
            semantic_cleanup: true,
        }
    }
}

/// Thresholds for the section aligner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Minimum similarity for matching a section to the one at the same index
    /// when their headings differ.
    pub positional_threshold: f64,
    /// Minimum similarity for a match found by searching the whole new
    /// document. `0.0` accepts any candidate.
    pub min_global_similarity: f64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            positional_threshold: DEFAULT_POSITIONAL_THRESHOLD,
            min_global_similarity: 0.0,
        }
    }
}

/// Configuration for a document diff.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub strategy: Strategy,
    pub text: TextDiffOptions,
    pub align: AlignConfig,
    /// Metadata fields left out of the comparison.
    pub ignored_fields: Vec<String>,
}

impl DiffConfig {
    /// Default configuration with the given strategy.
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Check that thresholds are within `[0, 1]`.
    pub fn validate(&self) -> EngineResult<()> {
        check_unit("align.positional_threshold", self.align.positional_threshold)?;
        check_unit("align.min_global_similarity", self.align.min_global_similarity)?;
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> EngineResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DiffError::Config(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DiffConfig::default();
        assert_eq!(c.strategy, Strategy::AlignedSections);
        assert_eq!(c.text.granularity, Granularity::Char);
        assert!(c.text.semantic_cleanup);
        assert_eq!(c.align.positional_threshold, 0.5);
        assert_eq!(c.align.min_global_similarity, 0.0);
        assert!(c.ignored_fields.is_empty());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut c = DiffConfig::default();
        c.align.positional_threshold = 1.5;
        assert!(matches!(c.validate(), Err(DiffError::Config(_))));

        let mut c = DiffConfig::default();
        c.align.min_global_similarity = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: DiffConfig = serde_json::from_str(
            r#"{"strategy": "flattened-whole-document", "text": {"granularity": "word"}}"#,
        )
        .unwrap();
        assert_eq!(c.strategy, Strategy::FlattenedWholeDocument);
        assert_eq!(c.text.granularity, Granularity::Word);
        assert!(c.text.semantic_cleanup);
        assert_eq!(c.align, AlignConfig::default());
    }

    #[test]
    fn with_strategy() {
        let c = DiffConfig::with_strategy(Strategy::PositionalSections);
        assert_eq!(c.strategy, Strategy::PositionalSections);
        assert_eq!(c.text, TextDiffOptions::default());
    }
}
