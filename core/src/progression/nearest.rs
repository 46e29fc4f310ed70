//! # Nearest Learnable Node
//!
//! Recovery target for a learner stuck on a jumped-to test: the closest node
//! at or before the current one, in linear curriculum order, that is not yet
//! learned and can be opened.
//!
//! The learnability check is looser than
//! [`crate::progression::unlock::UnlockResolver`]: for the first section of a
//! chapter, a completed-chapter flag on the previous chapter is accepted in
//! place of its `<N>_end` record. If nothing qualifies the curriculum's first
//! node is returned.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use log::debug;

use crate::curriculum::CurriculumOrder;
use crate::ids::{KnowledgeId, TopicRef};
use crate::progress::ProgressSnapshot;

/// Reverse scan over the linear curriculum ordering
#[derive(Debug, Clone, Copy)]
pub struct NearestLearnableFinder<'a> {
    curriculum: &'a CurriculumOrder,
    progress: &'a ProgressSnapshot,
}

impl<'a> NearestLearnableFinder<'a> {
    pub fn new(curriculum: &'a CurriculumOrder, progress: &'a ProgressSnapshot) -> Self {
        Self { curriculum, progress }
    }

    pub fn find_nearest_learnable_node(&self, current: &str) -> KnowledgeId {
        let start = self.start_index(current);
        let nodes = self.curriculum.nodes();

        let hit = nodes[..start]
            .iter()
            .rev()
            .copied()
            .filter(|candidate| !self.progress.is_knowledge_learned(*candidate))
            .find(|candidate| self.can_learn_relaxed(*candidate));

        match hit {
            Some(candidate) => {
                debug!("Nearest learnable node from {}: {}", current, candidate);
                candidate
            }
            None => {
                let fallback = self.curriculum.first();
                debug!("No learnable node before {}, falling back to {}", current, fallback);
                fallback
            }
        }
    }

    /// Relaxed unlock check used only for recovery
    pub fn can_learn_relaxed(&self, id: KnowledgeId) -> bool {
        if id.is_first() {
            return true;
        }
        if let Some(previous) = id.previous_in_chapter() {
            return self.progress.is_knowledge_learned(previous);
        }
        match id.chapter_id().previous() {
            Some(previous) => {
                self.progress.is_chapter_flagged_complete(previous)
                    || self.progress.has_chapter_test_record(previous)
            }
            None => true,
        }
    }

    /// Exclusive upper bound of the backward scan.
    ///
    /// A chapter test starts just after its chapter's last section, a
    /// knowledge node just after itself. An id missing from the ordering is
    /// approximated by its predecessor section; anything else scans the whole
    /// curriculum.
    fn start_index(&self, current: &str) -> usize {
        let len = self.curriculum.len();
        let topic = TopicRef::resolve(current);
        let index = match topic {
            Some(TopicRef::ChapterTest(chapter)) => self
                .curriculum
                .last_section(chapter)
                .and_then(|last| self.curriculum.position(last)),
            Some(TopicRef::Knowledge(k)) => self.curriculum.position(k).or_else(|| {
                let approx = KnowledgeId::new(k.chapter, k.section.saturating_sub(1).max(1));
                self.curriculum.position(approx)
            }),
            None => None,
        };
        index.map(|i| i + 1).unwrap_or(len).min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChapterId;
    use crate::progress::merge_sources;

    fn nearest(progress: &ProgressSnapshot, current: &str) -> String {
        let curriculum = CurriculumOrder::default();
        NearestLearnableFinder::new(&curriculum, progress)
            .find_nearest_learnable_node(current)
            .to_string()
    }

    #[test]
    fn test_falls_back_to_first_node() {
        // Chapter 1 fully learned but its test never recorded anywhere
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3"]);
        assert_eq!(nearest(&progress, "3_2"), "1_1");
    }

    #[test]
    fn test_current_node_is_a_candidate() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3", "1_end", "2_1"]);
        assert_eq!(nearest(&progress, "2_2"), "2_2");
        assert_eq!(nearest(&progress, "2_3"), "2_2");
    }

    #[test]
    fn test_chapter_test_starts_after_last_section() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3", "1_end", "2_1", "2_2"]);
        assert_eq!(nearest(&progress, "2_end"), "2_3");
        assert_eq!(nearest(&progress, "chapter2"), "2_3");
    }

    #[test]
    fn test_completed_chapter_flag_relaxes_first_section() {
        let progress = merge_sources(&["1_1", "1_2", "1_3"], &["2_1", "2_2", "2_3"], &["chapter2"]);
        // 3_1 needs chapter 2 done: only the local flag says so
        assert_eq!(nearest(&progress, "3_3"), "3_1");

        let strict = merge_sources(&["1_1", "1_2", "1_3"], &["2_1", "2_2", "2_3"], &[] as &[&str]);
        assert_eq!(nearest(&strict, "3_3"), "1_1");
    }

    #[test]
    fn test_passed_chapter_counts_as_test_record() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3"]).with_passed_chapters([ChapterId(1)]);
        assert_eq!(nearest(&progress, "3_2"), "2_1");
    }

    #[test]
    fn test_unknown_current_scans_everything() {
        let progress = ProgressSnapshot::with_learned(["1_1"]);
        assert_eq!(nearest(&progress, "js_events"), "1_2");
        assert_eq!(nearest(&progress, "9_9"), "1_2");
    }

    #[test]
    fn test_missing_section_is_approximated() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3", "1_end", "2_1", "2_2"]);
        // 2_4 is outside the table; scanning starts after 2_3
        assert_eq!(nearest(&progress, "2_4"), "2_3");
    }
}
