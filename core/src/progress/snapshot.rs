//! # Progress Snapshot
//!
//! Immutable-by-default view of one learner's completion record, merged from
//! the remote progress store and the local cache. Both the learned set and the
//! chapter sets only ever grow.
//!
//! Three markers are kept apart because consumers weigh them differently:
//!
//! - `learned`: normalized topic ids (`c_s`, `c_end`) with a passed submission;
//! - `passed_chapters`: chapters whose test this engine recorded as passed;
//! - `completed_chapters`: chapters flagged complete by an external record
//!   (the local cache's completed-chapter list).
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::graph::payload::ProgressPayload;
use crate::ids::{normalize_topic_id, ChapterId, KnowledgeId};

/// Merged completion record of a single learner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    learned: BTreeSet<String>,
    passed_chapters: BTreeSet<ChapterId>,
    completed_chapters: BTreeSet<ChapterId>,
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with the given learned ids (normalized)
    pub fn with_learned<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut snapshot = Self::new();
        for id in ids {
            snapshot.record_learned(id.as_ref());
        }
        snapshot
    }

    /// Add externally flagged completed chapters
    pub fn with_completed_chapters<I>(mut self, chapters: I) -> Self
    where
        I: IntoIterator<Item = ChapterId>,
    {
        self.completed_chapters.extend(chapters);
        self
    }

    /// Add chapters whose test was passed through this engine
    pub fn with_passed_chapters<I>(mut self, chapters: I) -> Self
    where
        I: IntoIterator<Item = ChapterId>,
    {
        self.passed_chapters.extend(chapters);
        self
    }

    pub fn is_learned(&self, id: &str) -> bool {
        match normalize_topic_id(id) {
            Some(id) => self.learned.contains(&id),
            None => false,
        }
    }

    pub fn is_knowledge_learned(&self, id: KnowledgeId) -> bool {
        self.learned.contains(&id.to_string())
    }

    pub fn learned(&self) -> impl Iterator<Item = &str> {
        self.learned.iter().map(String::as_str)
    }

    pub fn learned_count(&self) -> usize {
        self.learned.len()
    }

    pub fn passed_chapters(&self) -> impl Iterator<Item = ChapterId> + '_ {
        self.passed_chapters.iter().copied()
    }

    pub fn completed_chapters(&self) -> impl Iterator<Item = ChapterId> + '_ {
        self.completed_chapters.iter().copied()
    }

    /// Chapter test passed through this engine's own bookkeeping
    pub fn has_passed_chapter(&self, chapter: ChapterId) -> bool {
        self.passed_chapters.contains(&chapter)
    }

    /// Chapter flagged complete by an external record
    pub fn is_chapter_flagged_complete(&self, chapter: ChapterId) -> bool {
        self.completed_chapters.contains(&chapter)
    }

    /// The `<N>_end` milestone: recorded as learned (in either `N_end` or
    /// `chapterN` form) or passed through this engine
    pub fn has_chapter_test_record(&self, chapter: ChapterId) -> bool {
        self.learned.contains(&chapter.test_id()) || self.passed_chapters.contains(&chapter)
    }

    /// Record a passed submission. Returns `false` if already present.
    pub fn record_learned(&mut self, id: &str) -> bool {
        match normalize_topic_id(id) {
            Some(id) => self.learned.insert(id),
            None => false,
        }
    }

    /// Record a passed chapter test. Returns `false` if already present.
    pub fn record_chapter_passed(&mut self, chapter: ChapterId) -> bool {
        self.passed_chapters.insert(chapter)
    }

    /// Record an external completed-chapter flag
    pub fn record_chapter_flag(&mut self, chapter: ChapterId) -> bool {
        self.completed_chapters.insert(chapter)
    }

    /// Fold another snapshot in; nothing is ever removed
    pub fn absorb(&mut self, other: &ProgressSnapshot) {
        self.learned.extend(other.learned.iter().cloned());
        self.passed_chapters.extend(other.passed_chapters.iter().copied());
        self.completed_chapters.extend(other.completed_chapters.iter().copied());
    }

    /// True if every marker in `self` is also in `other`
    pub fn is_subset_of(&self, other: &ProgressSnapshot) -> bool {
        self.learned.is_subset(&other.learned)
            && self.passed_chapters.is_subset(&other.passed_chapters)
            && self.completed_chapters.is_subset(&other.completed_chapters)
    }
}

/// Raw progress inputs before merging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSources {
    /// `completed_topics` from the remote progress record
    #[serde(default)]
    pub remote: Vec<String>,

    /// Locally cached learned ids
    #[serde(default)]
    pub local_learned: Vec<String>,

    /// Locally cached completed-chapter flags (`chapterN`)
    #[serde(default)]
    pub local_completed_chapters: Vec<String>,
}

impl ProgressSources {
    pub fn from_remote(payload: ProgressPayload) -> Self {
        Self {
            remote: payload.completed_topics,
            ..Self::default()
        }
    }

    pub fn merge(&self) -> ProgressSnapshot {
        merge_sources(&self.remote, &self.local_learned, &self.local_completed_chapters)
    }
}

/// Merge the remote record with the local cache.
///
/// Ids are normalized (`chapterN` becomes the `N_end` milestone) and
/// de-duplicated. Local entries only ever add to the remote record. Chapter
/// flags that do not parse as a chapter are dropped.
pub fn merge_sources<R, L, C>(remote: &[R], local_learned: &[L], local_completed_chapters: &[C]) -> ProgressSnapshot
where
    R: AsRef<str>,
    L: AsRef<str>,
    C: AsRef<str>,
{
    let mut snapshot = ProgressSnapshot::new();
    for id in remote.iter().map(AsRef::as_ref).chain(local_learned.iter().map(AsRef::as_ref)) {
        snapshot.record_learned(id);
    }
    for flag in local_completed_chapters {
        if let Some(chapter) = ChapterId::parse(flag.as_ref()) {
            snapshot.record_chapter_flag(chapter);
        }
    }

    debug!(
        "Merged progress: {} remote + {} local entries -> {} learned, {} chapter flags",
        remote.len(),
        local_learned.len(),
        snapshot.learned_count(),
        snapshot.completed_chapters.len()
    );

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_deduplicates_and_normalizes() {
        let snapshot = merge_sources(
            &["1_1", "1_2", "chapter1"],
            &["1_2", "1-3", " 2_1 "],
            &["chapter2", "garbage"],
        );
        let learned: Vec<&str> = snapshot.learned().collect();
        assert_eq!(learned, vec!["1_1", "1_2", "1_3", "1_end", "2_1"]);
        assert!(snapshot.is_learned("chapter1"));
        assert!(snapshot.is_learned("1_end"));
        assert!(snapshot.is_chapter_flagged_complete(ChapterId(2)));
        assert!(!snapshot.is_chapter_flagged_complete(ChapterId(1)));
    }

    #[test]
    fn test_local_cache_guards_against_stale_remote() {
        let remote: [&str; 0] = [];
        let snapshot = merge_sources(&remote, &["1_1", "1_2"], &remote);
        assert!(snapshot.is_learned("1_2"));
    }

    #[test]
    fn test_chapter_test_record_forms() {
        let mut snapshot = ProgressSnapshot::with_learned(["2_end"]);
        assert!(snapshot.has_chapter_test_record(ChapterId(2)));
        assert!(!snapshot.has_chapter_test_record(ChapterId(1)));

        assert!(snapshot.record_chapter_passed(ChapterId(1)));
        assert!(!snapshot.record_chapter_passed(ChapterId(1)));
        assert!(snapshot.has_chapter_test_record(ChapterId(1)));

        // An external flag alone is not a test record
        let flagged = ProgressSnapshot::new().with_completed_chapters([ChapterId(3)]);
        assert!(!flagged.has_chapter_test_record(ChapterId(3)));
    }

    #[test]
    fn test_absorb_is_monotonic() {
        let mut base = ProgressSnapshot::with_learned(["1_1"]);
        let before = base.clone();
        base.absorb(&ProgressSnapshot::with_learned(["1_2"]).with_passed_chapters([ChapterId(1)]));
        assert!(before.is_subset_of(&base));
        assert!(base.is_learned("1_2"));
        assert!(base.has_passed_chapter(ChapterId(1)));
        assert!(!base.record_learned("1_1"));
    }

    #[test]
    fn test_sources_from_remote_payload() {
        let payload = ProgressPayload {
            completed_topics: vec!["1_1".to_string()],
        };
        let mut sources = ProgressSources::from_remote(payload);
        sources.local_learned.push("1_2".to_string());
        let snapshot = sources.merge();
        assert_eq!(snapshot.learned_count(), 2);
    }
}
