//! Text diff primitive: a tagged edit script between two strings.
//!
//! Uses the `similar` crate (Myers diff algorithm) to find a minimal token
//! alignment, then normalizes and optionally cleans up the result so that
//! changes read as whole words and phrases.

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

use crate::cleanup::{self, Run};
use crate::config::{Granularity, TextDiffOptions};

/// One contiguous span of a text comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "text", rename_all = "lowercase")]
pub enum DiffEdit {
    /// Text present in both old and new.
    Equal(String),
    /// Text only in the new version.
    Insert(String),
    /// Text only in the old version.
    Delete(String),
}

impl DiffEdit {
    /// The span's text, whatever its tag.
    pub fn text(&self) -> &str {
        match self {
            Self::Equal(s) | Self::Insert(s) | Self::Delete(s) => s,
        }
    }

    /// The matching `similar` change tag.
    pub fn tag(&self) -> ChangeTag {
        match self {
            Self::Equal(_) => ChangeTag::Equal,
            Self::Insert(_) => ChangeTag::Insert,
            Self::Delete(_) => ChangeTag::Delete,
        }
    }

    /// Returns `true` for an `Equal` span.
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal(_))
    }

    fn from_run((tag, text): Run) -> Self {
        match tag {
            ChangeTag::Equal => Self::Equal(text),
            ChangeTag::Insert => Self::Insert(text),
            ChangeTag::Delete => Self::Delete(text),
        }
    }
}

/// Diff two strings character by character, with semantic cleanup.
pub fn diff(old: &str, new: &str) -> Vec<DiffEdit> {
    diff_with(old, new, &TextDiffOptions::default())
}

/// Diff two strings with explicit options.
///
/// Two empty strings produce no edits; identical non-empty strings produce a
/// single `Equal` span. Deterministic for identical inputs.
pub fn diff_with(old: &str, new: &str, options: &TextDiffOptions) -> Vec<DiffEdit> {
    if old == new {
        return if old.is_empty() {
            Vec::new()
        } else {
            vec![DiffEdit::Equal(old.to_string())]
        };
    }

    let runs = cleanup::merge(raw_runs(old, new, options.granularity));
    let runs = if options.semantic_cleanup {
        cleanup::semantic(runs)
    } else {
        runs
    };
    runs.into_iter().map(DiffEdit::from_run).collect()
}

fn raw_runs(old: &str, new: &str, granularity: Granularity) -> Vec<Run> {
    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers);

    match granularity {
        Granularity::Char => collect_runs(&config.diff_chars(old, new)),
        Granularity::Word => collect_runs(&config.diff_words(old, new)),
        Granularity::Line => collect_runs(&config.diff_lines(old, new)),
        Granularity::Sentence => {
            let old_tokens: Vec<&str> = sentences(old).collect();
            let new_tokens: Vec<&str> = sentences(new).collect();
            collect_runs(&config.diff_slices(&old_tokens, &new_tokens))
        }
    }
}

/// Split text into sentences, keeping the `". "` separator on each piece so
/// the tokens concatenate back to the input.
pub(crate) fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(". ")
}

fn collect_runs<'a>(diff: &TextDiff<'a, 'a, 'a, str>) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for change in diff.iter_all_changes() {
        let tag = change.tag();
        let value = change.value();
        match runs.last_mut() {
            Some((last, text)) if *last == tag => text.push_str(value),
            _ => runs.push((tag, value.to_string())),
        }
    }
    runs
}

/// Rebuild the old text from an edit script (equal and delete spans).
pub fn old_text(edits: &[DiffEdit]) -> String {
    edits
        .iter()
        .filter(|e| !matches!(e, DiffEdit::Insert(_)))
        .map(DiffEdit::text)
        .collect()
}

/// Rebuild the new text from an edit script (equal and insert spans).
pub fn new_text(edits: &[DiffEdit]) -> String {
    edits
        .iter()
        .filter(|e| !matches!(e, DiffEdit::Delete(_)))
        .map(DiffEdit::text)
        .collect()
}

/// The non-equal spans of an edit script.
pub fn changes(edits: &[DiffEdit]) -> impl Iterator<Item = &DiffEdit> {
    edits.iter().filter(|e| !e.is_equal())
}

/// Number of inserted characters.
pub fn inserted_chars(edits: &[DiffEdit]) -> usize {
    edits
        .iter()
        .filter(|e| matches!(e, DiffEdit::Insert(_)))
        .map(|e| e.text().chars().count())
        .sum()
}

/// Number of deleted characters.
pub fn deleted_chars(edits: &[DiffEdit]) -> usize {
    edits
        .iter()
        .filter(|e| matches!(e, DiffEdit::Delete(_)))
        .map(|e| e.text().chars().count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn eq(s: &str) -> DiffEdit {
        DiffEdit::Equal(s.into())
    }
    fn ins(s: &str) -> DiffEdit {
        DiffEdit::Insert(s.into())
    }
    fn del(s: &str) -> DiffEdit {
        DiffEdit::Delete(s.into())
    }

    fn raw(granularity: Granularity) -> TextDiffOptions {
        TextDiffOptions {
            granularity,
            semantic_cleanup: false,
        }
    }

    #[test]
    fn identical_strings_single_equal() {
        assert_eq!(diff("hello world", "hello world"), vec![eq("hello world")]);
    }

    #[test]
    fn empty_strings_no_edits() {
        assert!(diff("", "").is_empty());
    }

    #[test]
    fn empty_to_content() {
        assert_eq!(diff("", "new text"), vec![ins("new text")]);
    }

    #[test]
    fn content_to_empty() {
        assert_eq!(diff("old text", ""), vec![del("old text")]);
    }

    #[test]
    fn single_word_substitution() {
        assert_eq!(
            diff("A B C", "A B X"),
            vec![eq("A B "), del("C"), ins("X")]
        );
    }

    #[test]
    fn insertion_lands_on_word_boundary() {
        assert_eq!(
            diff("The cat", "The big cat"),
            vec![eq("The "), ins("big "), eq("cat")]
        );
    }

    #[test]
    fn cleanup_merges_scattered_matches() {
        let old = "The quick brown fox";
        let new = "The slow red dog";
        let edits = diff(old, new);
        assert_eq!(old_text(&edits), old);
        assert_eq!(new_text(&edits), new);
        // Without cleanup, letters shared by the two phrases survive as
        // tiny equalities; with cleanup the change is one chunk.
        let raw_edits = diff_with(old, new, &raw(Granularity::Char));
        assert!(raw_edits.len() > edits.len());
        assert_eq!(changes(&edits).count(), 2);
    }

    #[test]
    fn word_granularity() {
        assert_eq!(
            diff_with("the cat sat", "the dog sat", &raw(Granularity::Word)),
            vec![eq("the "), del("cat"), ins("dog"), eq(" sat")]
        );
    }

    #[test]
    fn line_granularity() {
        let edits = diff_with("a\nb\nc\n", "a\nx\nc\n", &raw(Granularity::Line));
        assert_eq!(edits, vec![eq("a\n"), del("b"), ins("x"), eq("\nc\n")]);
    }

    #[test]
    fn every_granularity_rebuilds_both_texts() {
        let old = "One. Two words here.\nA line, é.";
        let new = "One. Three words there.\nA line, e.";
        for granularity in [
            Granularity::Char,
            Granularity::Word,
            Granularity::Line,
            Granularity::Sentence,
        ] {
            for semantic_cleanup in [true, false] {
                let options = TextDiffOptions {
                    granularity,
                    semantic_cleanup,
                };
                let edits = diff_with(old, new, &options);
                assert_eq!(old_text(&edits), old, "{options:?}");
                assert_eq!(new_text(&edits), new, "{options:?}");
                assert!(edits.iter().all(|e| !e.text().is_empty()), "{options:?}");
            }
        }
    }

    #[test]
    fn sentence_granularity() {
        let edits = diff_with("A. B. C.", "A. X. C.", &raw(Granularity::Sentence));
        assert_eq!(edits, vec![eq("A. "), del("B"), ins("X"), eq(". C.")]);
    }

    #[test]
    fn sentence_split_keeps_separator() {
        let parts: Vec<&str> = sentences("One. Two. Three").collect();
        assert_eq!(parts, vec!["One. ", "Two. ", "Three"]);
    }

    #[test]
    fn multibyte_text() {
        let edits = diff("naïve café", "naïve cafés");
        assert_eq!(edits, vec![eq("naïve café"), ins("s")]);
    }

    #[test]
    fn char_counts() {
        let edits = vec![eq("ab"), del("cdé"), ins("x")];
        assert_eq!(deleted_chars(&edits), 3);
        assert_eq!(inserted_chars(&edits), 1);
    }

    #[test]
    fn serialized_shape() {
        let json = serde_json::to_value(vec![eq("a"), ins("b")]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"op": "equal", "text": "a"}, {"op": "insert", "text": "b"}])
        );
    }

    #[test]
    fn deterministic() {
        let a = "Sections are edited incrementally, rarely reordered.";
        let b = "Sections are usually edited in place and rarely moved.";
        assert_eq!(diff(a, b), diff(a, b));
    }

    fn granularity() -> impl Strategy<Value = Granularity> {
        prop_oneof![
            Just(Granularity::Char),
            Just(Granularity::Word),
            Just(Granularity::Line),
            Just(Granularity::Sentence),
        ]
    }

    proptest! {
        #[test]
        fn round_trip(
            a in "[ab. \n]{0,40}",
            b in "[ab. \n]{0,40}",
            granularity in granularity(),
            semantic_cleanup in any::<bool>(),
        ) {
            let options = TextDiffOptions { granularity, semantic_cleanup };
            let edits = diff_with(&a, &b, &options);
            prop_assert_eq!(old_text(&edits), a);
            prop_assert_eq!(new_text(&edits), b);
        }

        #[test]
        fn round_trip_unicode(a in "\\PC{0,30}", b in "\\PC{0,30}") {
            let edits = diff(&a, &b);
            prop_assert_eq!(old_text(&edits), a);
            prop_assert_eq!(new_text(&edits), b);
        }

        #[test]
        fn no_empty_spans(a in "[abc ]{0,30}", b in "[abc ]{0,30}") {
            prop_assert!(diff(&a, &b).iter().all(|e| !e.text().is_empty()));
        }

        #[test]
        fn identity(a in "\\PC{1,40}") {
            prop_assert_eq!(diff(&a, &a), vec![DiffEdit::Equal(a.clone())]);
        }
    }
}
