//! Normalized text similarity, used only for section matching decisions.

use similar::{Algorithm, ChangeTag, TextDiff};

/// Similarity of two texts in `[0, 1]`.
///
/// Both texts are split into whitespace-separated words. With `d` the minimal
/// number of words to delete and insert to turn one into the other, the score
/// is `1 - d / (words(a) + words(b))`: `1.0` for the same wording, `0.0` when
/// no word is shared. Two empty texts are identical; an empty and a non-empty
/// text score `0.0`.
///
/// The score is symmetric.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Canonical argument order keeps the score independent of which text is
    // called old and which new.
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let old_words: Vec<&str> = a.split_whitespace().collect();
    let new_words: Vec<&str> = b.split_whitespace().collect();
    let total = old_words.len() + new_words.len();
    if total == 0 {
        return 1.0;
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&old_words, &new_words);
    let changed = diff
        .iter_all_changes()
        .filter(|c| c.tag() != ChangeTag::Equal)
        .count();

    1.0 - changed as f64 / total as f64
}
