//! Diff engine for papertrail.
//!
//! Compares two parsed versions of a paper section by section: sections are
//! aligned across the versions, each aligned pair gets a readable text diff,
//! and the metadata fields are compared by value.
//!
//! # Key Types
//!
//! - [`DocumentDiffer`] / [`DiffConfig`] -- Runs a configured [`Strategy`] over two documents
//! - [`DiffResult`] / [`SectionDiff`] -- Per-section heading and text diffs
//! - [`FlattenedDiff`] -- Whole-document text diff
//! - [`Alignment`] / [`Aligner`] -- Old-to-new section correspondence
//! - [`DiffEdit`] -- Equal/Insert/Delete span of a text diff
//! - [`FieldChange`] -- Added/removed/changed metadata field

pub mod align;
mod cleanup;
pub mod config;
pub mod document;
pub mod error;
pub mod metadata;
pub mod similarity;
pub mod text_diff;

pub use align::{align, Aligner, Alignment, MatchKind, SectionMatch};
pub use config::{AlignConfig, DiffConfig, Granularity, Strategy, TextDiffOptions};
pub use document::{
    diff_documents, DiffResult, DocumentDiff, DocumentDiffer, FlattenedDiff, SectionDiff,
    SectionOrigin,
};
pub use error::{DiffError, EngineResult};
pub use metadata::{diff_metadata, diff_metadata_ignoring, ChangeKind, FieldChange};
pub use similarity::similarity;
pub use text_diff::{diff, diff_with, DiffEdit};
