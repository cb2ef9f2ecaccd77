//! Section alignment: which old section became which new section.
//!
//! Papers are usually edited in place, so position is tried first: a section
//! is matched to the one at the same index when the headings agree, or when
//! the texts are similar enough. Otherwise the section is matched to the most
//! similar text anywhere in the new document, which handles reordering and
//! retitling.
//!
//! Every old section is scored independently against the full new section
//! list. Claims on the same new section are resolved after the scan, so the
//! result does not depend on any mutation order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use papertrail_types::Section;

use crate::config::AlignConfig;
use crate::error::{DiffError, EngineResult};
use crate::similarity::similarity;

/// How a match was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    /// Same index, identical heading.
    Heading,
    /// Same index, text similarity above the positional threshold.
    PositionalText,
    /// Most similar text in the whole new document.
    BestText,
    /// The best text was claimed by a stronger match; this is the most similar
    /// section among those left over.
    Rematch,
}

/// The new section an old section was matched to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionMatch {
    pub new_index: usize,
    pub kind: MatchKind,
    /// Text similarity of the pair. Not computed for heading matches.
    pub score: Option<f64>,
}

/// Correspondence between old and new sections.
///
/// Every old index is either matched or deleted; every new index is either
/// claimed by exactly one old index or listed as inserted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Alignment {
    matches: Vec<Option<SectionMatch>>,
    inserted: Vec<usize>,
    new_len: usize,
}

impl Alignment {
    /// Build an alignment and check that it is total and consistent.
    pub fn new(matches: Vec<Option<SectionMatch>>, new_len: usize) -> EngineResult<Self> {
        let mut claimed_by: Vec<Option<usize>> = vec![None; new_len];
        for (old_index, m) in matches.iter().enumerate() {
            let Some(m) = m else { continue };
            let slot = claimed_by.get_mut(m.new_index).ok_or_else(|| {
                DiffError::invariant(format!(
                    "old section {old_index} matched to new section {} of {new_len}",
                    m.new_index
                ))
            })?;
            if let Some(other) = slot {
                return Err(DiffError::invariant(format!(
                    "new section {} claimed by old sections {other} and {old_index}",
                    m.new_index
                )));
            }
            *slot = Some(old_index);
        }

        let inserted = claimed_by
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(j, _)| j)
            .collect();

        Ok(Self {
            matches,
            inserted,
            new_len,
        })
    }

    /// Number of old sections.
    pub fn old_len(&self) -> usize {
        self.matches.len()
    }

    /// Number of new sections.
    pub fn new_len(&self) -> usize {
        self.new_len
    }

    /// The match for an old section, or `None` if it was deleted.
    pub fn get(&self, old_index: usize) -> Option<&SectionMatch> {
        self.matches.get(old_index).and_then(Option::as_ref)
    }

    /// Per old index: the match, or `None` for a deleted section.
    pub fn matches(&self) -> &[Option<SectionMatch>] {
        &self.matches
    }

    /// `(old_index, new_index)` for every matched pair, in old order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matches
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|m| (i, m.new_index)))
    }

    /// Old indices with no counterpart, ascending.
    pub fn deleted(&self) -> impl Iterator<Item = usize> + '_ {
        self.matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_none())
            .map(|(i, _)| i)
    }

    /// New indices no old section claimed, ascending.
    pub fn inserted(&self) -> &[usize] {
        &self.inserted
    }
}

/// Align two section lists with the default thresholds.
pub fn align(old: &[Section], new: &[Section]) -> EngineResult<Alignment> {
    Aligner::new(AlignConfig::default()).align(old, new)
}

/// Section aligner.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aligner {
    config: AlignConfig,
}

/// What the scan found for one old section.
enum Candidate {
    /// Matched at its own index; such claims never conflict.
    Positional(SectionMatch),
    /// Similarity against every new section, and the best acceptable index.
    Global {
        scores: Vec<f64>,
        best: Option<usize>,
    },
}

impl Aligner {
    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }

    /// Map each old section to at most one new section.
    pub fn align(&self, old: &[Section], new: &[Section]) -> EngineResult<Alignment> {
        let candidates: Vec<Candidate> = old
            .iter()
            .enumerate()
            .map(|(i, section)| self.scan(i, section, new))
            .collect();

        let mut claimed_by: Vec<Option<usize>> = vec![None; new.len()];
        let mut matches: Vec<Option<SectionMatch>> = vec![None; old.len()];

        for (i, candidate) in candidates.iter().enumerate() {
            if let Candidate::Positional(m) = candidate {
                claimed_by[m.new_index] = Some(i);
                matches[i] = Some(*m);
            }
        }

        // Global claims: strongest first, then lowest old index.
        let mut global: Vec<(usize, usize, f64)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, candidate)| match candidate {
                Candidate::Global {
                    scores,
                    best: Some(j),
                } => Some((i, *j, scores[*j])),
                _ => None,
            })
            .collect();
        global.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));

        let mut losers = Vec::new();
        for (i, j, score) in global {
            match claimed_by[j] {
                None => {
                    claimed_by[j] = Some(i);
                    matches[i] = Some(SectionMatch {
                        new_index: j,
                        kind: MatchKind::BestText,
                        score: Some(score),
                    });
                }
                Some(winner) => {
                    debug!(old = i, new = j, winner, "section claim lost; re-matching");
                    losers.push(i);
                }
            }
        }

        losers.sort_unstable();
        for i in losers {
            let Candidate::Global { scores, .. } = &candidates[i] else {
                return Err(DiffError::invariant(format!(
                    "positional match for old section {i} lost its claim"
                )));
            };
            match self.best_index(scores, |j| claimed_by[j].is_none()) {
                Some(j) => {
                    debug!(old = i, new = j, score = scores[j], "section re-matched");
                    claimed_by[j] = Some(i);
                    matches[i] = Some(SectionMatch {
                        new_index: j,
                        kind: MatchKind::Rematch,
                        score: Some(scores[j]),
                    });
                }
                None => debug!(old = i, "no unclaimed section left; marked deleted"),
            }
        }

        Alignment::new(matches, new.len())
    }

    fn scan(&self, i: usize, section: &Section, new: &[Section]) -> Candidate {
        if let Some(candidate) = new.get(i) {
            if candidate.heading == section.heading {
                debug!(old = i, heading = %section.heading, "heading match in place");
                return Candidate::Positional(SectionMatch {
                    new_index: i,
                    kind: MatchKind::Heading,
                    score: None,
                });
            }
            let score = similarity(&section.text, &candidate.text);
            if score >= self.config.positional_threshold {
                debug!(old = i, score, "text match in place");
                return Candidate::Positional(SectionMatch {
                    new_index: i,
                    kind: MatchKind::PositionalText,
                    score: Some(score),
                });
            }
        }

        let scores: Vec<f64> = new
            .iter()
            .map(|candidate| similarity(&section.text, &candidate.text))
            .collect();
        let best = self.best_index(&scores, |_| true);
        debug!(old = i, best = ?best, "best text match");
        Candidate::Global { scores, best }
    }

    /// Index with the strictly highest acceptable score; ties go to the
    /// lowest index.
    fn best_index(&self, scores: &[f64], available: impl Fn(usize) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (j, &score) in scores.iter().enumerate() {
            if !available(j) || score < self.config.min_global_similarity {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((j, score));
            }
        }
        best.map(|(j, _)| j)
    }
}
