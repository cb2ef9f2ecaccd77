//! Document diff: combine alignment, text diffs and the metadata diff into
//! one result per document pair.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use papertrail_types::{Document, InputFormat, Section};

use crate::align::{Aligner, MatchKind};
use crate::config::{DiffConfig, Strategy, TextDiffOptions};
use crate::error::EngineResult;
use crate::metadata::{diff_metadata_ignoring, FieldChange};
use crate::text_diff::{self, DiffEdit};

/// Where a section diff came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionOrigin {
    /// An old section paired with a new one.
    Matched,
    /// An old section with no counterpart; diffed against an empty section.
    DeletedOld,
    /// A new section nothing claimed; diffed from an empty section.
    InsertedNew,
}

/// Heading and text diff for one section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionDiff {
    pub origin: SectionOrigin,
    pub old_index: Option<usize>,
    pub new_index: Option<usize>,
    /// How the pair was found; `None` for unmatched sections and positional
    /// pairing.
    pub match_kind: Option<MatchKind>,
    pub heading_diff: Vec<DiffEdit>,
    pub text_diff: Vec<DiffEdit>,
}

impl SectionDiff {
    /// Returns `true` if neither heading nor text changed.
    pub fn is_unchanged(&self) -> bool {
        self.edits().all(DiffEdit::is_equal)
    }

    /// Heading edits followed by text edits.
    pub fn edits(&self) -> impl Iterator<Item = &DiffEdit> {
        self.heading_diff.iter().chain(&self.text_diff)
    }

    /// Characters inserted across heading and text.
    pub fn inserted_chars(&self) -> usize {
        text_diff::inserted_chars(&self.heading_diff) + text_diff::inserted_chars(&self.text_diff)
    }

    /// Characters deleted across heading and text.
    pub fn deleted_chars(&self) -> usize {
        text_diff::deleted_chars(&self.heading_diff) + text_diff::deleted_chars(&self.text_diff)
    }
}

/// Section-by-section diff of two documents.
///
/// `section_diffs` follows old-document order, then the inserted sections in
/// new-document order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub metadata_diff: Vec<FieldChange>,
    pub section_diffs: Vec<SectionDiff>,
}

impl DiffResult {
    /// Returns `true` if metadata and every section are unchanged.
    pub fn is_unchanged(&self) -> bool {
        self.metadata_diff.is_empty()
            && self
                .section_diffs
                .iter()
                .all(|s| s.origin == SectionOrigin::Matched && s.is_unchanged())
    }

    /// Number of matched section pairs.
    pub fn matched(&self) -> usize {
        self.count(SectionOrigin::Matched)
    }

    /// Number of old sections without a counterpart.
    pub fn deleted(&self) -> usize {
        self.count(SectionOrigin::DeletedOld)
    }

    /// Number of new sections without a counterpart.
    pub fn inserted(&self) -> usize {
        self.count(SectionOrigin::InsertedNew)
    }

    /// Every non-equal edit across all sections, headings first.
    pub fn changes(&self) -> impl Iterator<Item = &DiffEdit> {
        self.section_diffs
            .iter()
            .flat_map(|s| s.edits())
            .filter(|e| !e.is_equal())
    }

    fn count(&self, origin: SectionOrigin) -> usize {
        self.section_diffs
            .iter()
            .filter(|s| s.origin == origin)
            .count()
    }
}

/// Whole-document diff: every section flattened into one text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlattenedDiff {
    pub metadata_diff: Vec<FieldChange>,
    pub edits: Vec<DiffEdit>,
}

impl FlattenedDiff {
    pub fn is_unchanged(&self) -> bool {
        self.metadata_diff.is_empty() && self.edits.iter().all(DiffEdit::is_equal)
    }
}

/// Result of running the configured strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum DocumentDiff {
    Sections(DiffResult),
    Flattened(FlattenedDiff),
}

impl DocumentDiff {
    pub fn metadata_diff(&self) -> &[FieldChange] {
        match self {
            Self::Sections(r) => &r.metadata_diff,
            Self::Flattened(f) => &f.metadata_diff,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        match self {
            Self::Sections(r) => r.is_unchanged(),
            Self::Flattened(f) => f.is_unchanged(),
        }
    }
}

/// Diff two documents with the default configuration (aligned sections,
/// character diffs with semantic cleanup).
pub fn diff_documents(old: &Document, new: &Document) -> EngineResult<DiffResult> {
    DocumentDiffer::default().diff_sections(old, new)
}

/// Runs document diffs under one configuration.
#[derive(Clone, Debug, Default)]
pub struct DocumentDiffer {
    config: DiffConfig,
}

impl DocumentDiffer {
    /// Create a differ, rejecting an invalid configuration.
    pub fn new(config: DiffConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Diff two documents with the configured strategy.
    pub fn diff(&self, old: &Document, new: &Document) -> EngineResult<DocumentDiff> {
        match self.config.strategy {
            Strategy::AlignedSections => self.diff_sections(old, new).map(DocumentDiff::Sections),
            Strategy::PositionalSections => Ok(DocumentDiff::Sections(self.diff_positional(old, new))),
            Strategy::FlattenedWholeDocument => {
                Ok(DocumentDiff::Flattened(self.diff_flattened(old, new)))
            }
        }
    }

    /// Read both documents from JSON in the given format, then diff them.
    ///
    /// Both inputs are validated before any diff work starts.
    pub fn diff_json(
        &self,
        old: Value,
        new: Value,
        format: InputFormat,
    ) -> EngineResult<DocumentDiff> {
        let old = Document::from_value(old, format)?;
        let new = Document::from_value(new, format)?;
        self.diff(&old, &new)
    }

    /// Align sections, then diff each pair.
    pub fn diff_sections(&self, old: &Document, new: &Document) -> EngineResult<DiffResult> {
        let alignment = Aligner::new(self.config.align).align(&old.sections, &new.sections)?;
        let empty = Section::empty();
        let mut section_diffs = Vec::with_capacity(old.sections.len() + alignment.inserted().len());

        for (i, section) in old.sections.iter().enumerate() {
            let diff = match alignment.get(i) {
                Some(m) => self.section_diff(
                    SectionOrigin::Matched,
                    (Some(i), section),
                    (Some(m.new_index), &new.sections[m.new_index]),
                    Some(m.kind),
                ),
                None => self.section_diff(
                    SectionOrigin::DeletedOld,
                    (Some(i), section),
                    (None, &empty),
                    None,
                ),
            };
            section_diffs.push(diff);
        }
        for &j in alignment.inserted() {
            section_diffs.push(self.section_diff(
                SectionOrigin::InsertedNew,
                (None, &empty),
                (Some(j), &new.sections[j]),
                None,
            ));
        }

        let result = DiffResult {
            metadata_diff: self.metadata(old, new),
            section_diffs,
        };
        debug!(
            matched = result.matched(),
            deleted = result.deleted(),
            inserted = result.inserted(),
            metadata_changes = result.metadata_diff.len(),
            "aligned document diff complete"
        );
        Ok(result)
    }

    /// Pair sections strictly by index; surplus sections on either side are
    /// deleted or inserted.
    pub fn diff_positional(&self, old: &Document, new: &Document) -> DiffResult {
        let empty = Section::empty();
        let len = old.sections.len().max(new.sections.len());

        let section_diffs = (0..len)
            .filter_map(|i| match (old.sections.get(i), new.sections.get(i)) {
                (Some(o), Some(n)) => Some(self.section_diff(
                    SectionOrigin::Matched,
                    (Some(i), o),
                    (Some(i), n),
                    None,
                )),
                (Some(o), None) => Some(self.section_diff(
                    SectionOrigin::DeletedOld,
                    (Some(i), o),
                    (None, &empty),
                    None,
                )),
                (None, Some(n)) => Some(self.section_diff(
                    SectionOrigin::InsertedNew,
                    (None, &empty),
                    (Some(i), n),
                    None,
                )),
                (None, None) => None,
            })
            .collect();

        let result = DiffResult {
            metadata_diff: self.metadata(old, new),
            section_diffs,
        };
        debug!(
            matched = result.matched(),
            deleted = result.deleted(),
            inserted = result.inserted(),
            "positional document diff complete"
        );
        result
    }

    /// Diff the two documents as single texts (`heading\ntext\n` per section).
    pub fn diff_flattened(&self, old: &Document, new: &Document) -> FlattenedDiff {
        let edits = text_diff::diff_with(&old.to_text(), &new.to_text(), &self.config.text);
        debug!(
            edits = edits.len(),
            inserted = text_diff::inserted_chars(&edits),
            deleted = text_diff::deleted_chars(&edits),
            "flattened document diff complete"
        );
        FlattenedDiff {
            metadata_diff: self.metadata(old, new),
            edits,
        }
    }

    fn section_diff(
        &self,
        origin: SectionOrigin,
        (old_index, old): (Option<usize>, &Section),
        (new_index, new): (Option<usize>, &Section),
        match_kind: Option<MatchKind>,
    ) -> SectionDiff {
        let options: &TextDiffOptions = &self.config.text;
        SectionDiff {
            origin,
            old_index,
            new_index,
            match_kind,
            heading_diff: text_diff::diff_with(&old.heading, &new.heading, options),
            text_diff: text_diff::diff_with(&old.text, &new.text, options),
        }
    }

    fn metadata(&self, old: &Document, new: &Document) -> Vec<FieldChange> {
        diff_metadata_ignoring(&old.metadata, &new.metadata, &self.config.ignored_fields)
    }
}
