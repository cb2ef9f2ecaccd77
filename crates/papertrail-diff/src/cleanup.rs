//! Post-processing of raw edit runs.
//!
//! A minimal edit script is rarely what a reader wants to see: Myers happily
//! matches a stray `e` in the middle of two unrelated words. The passes here
//! rewrite runs into larger, readable chunks while keeping the round-trip
//! property (equal + delete spans rebuild the old text, equal + insert spans
//! rebuild the new text).

use similar::ChangeTag;

/// One tagged span of text.
pub(crate) type Run = (ChangeTag, String);

/// Normalize runs: merge neighbours with the same tag, order each change
/// region as a single delete followed by a single insert, factor common
/// prefixes and suffixes of such pairs into the surrounding equalities and
/// slide single edits over an adjacent equality when that removes it.
pub(crate) fn merge(mut runs: Vec<Run>) -> Vec<Run> {
    loop {
        runs = coalesce(runs);
        if !shift_single_edits(&mut runs) {
            return runs;
        }
    }
}

/// Full semantic cleanup.
pub(crate) fn semantic(mut runs: Vec<Run>) -> Vec<Run> {
    if eliminate_short_equalities(&mut runs) {
        runs = merge(runs);
    }
    align_to_boundaries(&mut runs);
    extract_overlaps(&mut runs);
    runs.retain(|(_, text)| !text.is_empty());
    runs
}

fn coalesce(runs: Vec<Run>) -> Vec<Run> {
    let mut out = Vec::with_capacity(runs.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    for (tag, text) in runs {
        match tag {
            ChangeTag::Delete => deleted.push_str(&text),
            ChangeTag::Insert => inserted.push_str(&text),
            ChangeTag::Equal => {
                let equal = flush_edits(&mut out, &mut deleted, &mut inserted, text);
                push_equal(&mut out, equal);
            }
        }
    }
    let tail = flush_edits(&mut out, &mut deleted, &mut inserted, String::new());
    push_equal(&mut out, tail);
    out
}

/// Emit the pending change region. Returns the equality that follows it,
/// extended at the front with whatever suffix the delete and insert shared.
fn flush_edits(
    out: &mut Vec<Run>,
    deleted: &mut String,
    inserted: &mut String,
    mut equal: String,
) -> String {
    if !deleted.is_empty() && !inserted.is_empty() {
        let prefix = common_prefix(deleted, inserted);
        if prefix > 0 {
            push_equal(out, inserted[..prefix].to_string());
            deleted.replace_range(..prefix, "");
            inserted.replace_range(..prefix, "");
        }
        let suffix = common_suffix(deleted, inserted);
        if suffix > 0 {
            let shared = inserted.split_off(inserted.len() - suffix);
            deleted.truncate(deleted.len() - suffix);
            equal.insert_str(0, &shared);
        }
    }
    if !deleted.is_empty() {
        out.push((ChangeTag::Delete, std::mem::take(deleted)));
    }
    if !inserted.is_empty() {
        out.push((ChangeTag::Insert, std::mem::take(inserted)));
    }
    equal
}

fn push_equal(out: &mut Vec<Run>, text: String) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some((ChangeTag::Equal, last)) => last.push_str(&text),
        _ => out.push((ChangeTag::Equal, text)),
    }
}

/// `A<ins>BA</ins>C` becomes `<ins>AB</ins>AC`, and the mirror image.
fn shift_single_edits(runs: &mut Vec<Run>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < runs.len() {
        if runs[i - 1].0 == ChangeTag::Equal && runs[i + 1].0 == ChangeTag::Equal {
            let prev = runs[i - 1].1.clone();
            let next = runs[i + 1].1.clone();
            let edit = runs[i].1.as_str();

            if edit.ends_with(prev.as_str()) {
                let shifted = format!("{prev}{}", &edit[..edit.len() - prev.len()]);
                runs[i].1 = shifted;
                runs[i + 1].1 = format!("{prev}{next}");
                runs.remove(i - 1);
                changed = true;
            } else if edit.starts_with(next.as_str()) {
                let shifted = format!("{}{next}", &edit[next.len()..]);
                runs[i - 1].1.push_str(&next);
                runs[i].1 = shifted;
                runs.remove(i + 1);
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

/// Turn equalities that are no longer than the edits on both sides of them
/// into a delete/insert pair. Returns `true` if anything changed.
fn eliminate_short_equalities(runs: &mut Vec<Run>) -> bool {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    // Edit lengths before (1) and after (2) the last equality.
    let (mut inserted_before, mut deleted_before) = (0usize, 0usize);
    let (mut inserted_after, mut deleted_after) = (0usize, 0usize);

    let mut i = 0;
    while i < runs.len() {
        let len = runs[i].1.chars().count();
        match runs[i].0 {
            ChangeTag::Equal => {
                equalities.push(i);
                inserted_before = inserted_after;
                deleted_before = deleted_after;
                inserted_after = 0;
                deleted_after = 0;
                last_equality = Some(len);
            }
            tag => {
                if tag == ChangeTag::Insert {
                    inserted_after += len;
                } else {
                    deleted_after += len;
                }

                if let (Some(eq_len), Some(&at)) = (last_equality, equalities.last()) {
                    if eq_len > 0
                        && eq_len <= inserted_before.max(deleted_before)
                        && eq_len <= inserted_after.max(deleted_after)
                    {
                        let text = runs[at].1.clone();
                        runs.insert(at, (ChangeTag::Delete, text));
                        runs[at + 1].0 = ChangeTag::Insert;

                        // Drop this equality and re-evaluate the one before it.
                        equalities.pop();
                        equalities.pop();
                        inserted_before = 0;
                        deleted_before = 0;
                        inserted_after = 0;
                        deleted_after = 0;
                        last_equality = None;
                        changed = true;

                        i = equalities.last().map_or(0, |&e| e + 1);
                        continue;
                    }
                }
            }
        }
        i += 1;
    }
    changed
}

/// Slide each single edit that sits between two equalities to the position
/// where its edges fall on the most natural boundaries.
fn align_to_boundaries(runs: &mut Vec<Run>) {
    let mut i = 1;
    while i + 1 < runs.len() {
        if runs[i - 1].0 != ChangeTag::Equal || runs[i + 1].0 != ChangeTag::Equal {
            i += 1;
            continue;
        }

        let before: Vec<char> = runs[i - 1].1.chars().collect();
        let edit: Vec<char> = runs[i].1.chars().collect();
        let len = edit.len();
        let chars: Vec<char> = before
            .iter()
            .chain(edit.iter())
            .copied()
            .chain(runs[i + 1].1.chars())
            .collect();

        // Shift as far left as the shared suffix allows, then walk right.
        let mut start = before.len() - common_suffix_chars(&before, &edit);
        let score_at = |start: usize| {
            boundary_score(&chars[..start], &chars[start..start + len])
                + boundary_score(&chars[start..start + len], &chars[start + len..])
        };
        let mut best = start;
        let mut best_score = score_at(start);
        while len > 0 && start + len < chars.len() && chars[start] == chars[start + len] {
            start += 1;
            let score = score_at(start);
            // `>=` favours trailing over leading whitespace in the edit.
            if score >= best_score {
                best_score = score;
                best = start;
            }
        }

        let mut edit_at = i;
        if best != before.len() {
            let new_before: String = chars[..best].iter().collect();
            let new_edit: String = chars[best..best + len].iter().collect();
            let new_after: String = chars[best + len..].iter().collect();

            if new_before.is_empty() {
                runs.remove(i - 1);
                edit_at = i - 1;
            } else {
                runs[i - 1].1 = new_before;
            }
            runs[edit_at].1 = new_edit;
            if new_after.is_empty() {
                runs.remove(edit_at + 1);
            } else {
                runs[edit_at + 1].1 = new_after;
            }
        }
        i = edit_at + 1;
    }
}

/// Score how natural the split between `one` and `two` is: 6 for an edge of
/// the text, 5 for a blank line, 4 for a line break, 3 for the end of a
/// sentence, 2 for whitespace, 1 for punctuation, 0 inside a word.
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();
    let line_break1 = space1 && (c1 == '\r' || c1 == '\n');
    let line_break2 = space2 && (c2 == '\r' || c2 == '\n');
    let blank_line1 = line_break1 && matches!(one, [.., '\n', '\n'] | [.., '\n', '\r', '\n']);
    let blank_line2 = line_break2
        && matches!(
            two,
            ['\n', '\n', ..] | ['\n', '\r', '\n', ..] | ['\r', '\n', '\n', ..] | ['\r', '\n', '\r', '\n', ..]
        );

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alnum1 && !space1 && space2 {
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

/// Where a deletion and the insertion after it overlap by at least half of
/// either, pull the overlap out as an equality.
fn extract_overlaps(runs: &mut Vec<Run>) {
    let mut i = 1;
    while i < runs.len() {
        if runs[i - 1].0 == ChangeTag::Delete && runs[i].0 == ChangeTag::Insert {
            let deletion: Vec<char> = runs[i - 1].1.chars().collect();
            let insertion: Vec<char> = runs[i].1.chars().collect();
            let forward = common_overlap(&deletion, &insertion);
            let backward = common_overlap(&insertion, &deletion);

            if forward >= backward {
                if forward * 2 >= deletion.len() || forward * 2 >= insertion.len() {
                    runs.insert(i, (ChangeTag::Equal, collect(&insertion[..forward])));
                    runs[i - 1].1 = collect(&deletion[..deletion.len() - forward]);
                    runs[i + 1].1 = collect(&insertion[forward..]);
                    i += 1;
                }
            } else if backward * 2 >= deletion.len() || backward * 2 >= insertion.len() {
                runs.insert(i, (ChangeTag::Equal, collect(&deletion[..backward])));
                runs[i - 1] = (
                    ChangeTag::Insert,
                    collect(&insertion[..insertion.len() - backward]),
                );
                runs[i + 1] = (ChangeTag::Delete, collect(&deletion[backward..]));
                i += 1;
            }
            i += 1;
        }
        i += 1;
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Common prefix of two strings, in bytes.
fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or(a.len().min(b.len()), |((at, _), _)| at)
}

/// Common suffix of two strings, in bytes.
fn common_suffix(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum()
}

fn common_suffix_chars(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Length of the longest suffix of `a` that is also a prefix of `b`.
fn common_overlap(a: &[char], b: &[char]) -> usize {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0;
    }
    let a = &a[a.len() - n..];
    let b = &b[..n];
    if a == b {
        return n;
    }

    let mut best = 0;
    let mut length = 1;
    loop {
        let pattern = &a[n - length..];
        let Some(found) = b.windows(pattern.len()).position(|w| w == pattern) else {
            return best;
        };
        length += found;
        if found == 0 || a[n - length..] == b[..length] {
            best = length;
            length += 1;
        }
    }
}
