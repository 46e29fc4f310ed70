//! # Jump Learning Scenarios
//!
//! A learner who reached a test out of linear order ("jump learning") needs
//! to know what stands between the node they came from and the node they are
//! attempting. Classification is total: every `(from, to)` pair yields exactly
//! one [`JumpScenario`].
//!
//! Cross-chapter jumps are examined before same-chapter jumps, and within a
//! cross-chapter jump the chapter lock is reported before any missing
//! knowledge node.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use serde::{Deserialize, Serialize};

use crate::curriculum::CurriculumOrder;
use crate::ids::{ChapterId, TopicRef};
use crate::progression::unlock::{ReasonCode, UnlockDecision, UnlockResolver};

/// Relationship between the origin and the target of a jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpScenario {
    DirectAccess,
    KnowledgeRequired,
    ChapterLocked,
    NormalProgression,
}

impl JumpScenario {
    pub fn as_str(self) -> &'static str {
        match self {
            JumpScenario::DirectAccess => "direct_access",
            JumpScenario::KnowledgeRequired => "knowledge_required",
            JumpScenario::ChapterLocked => "chapter_locked",
            JumpScenario::NormalProgression => "normal_progression",
        }
    }
}

/// Scenario with the evidence needed to act on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpDecision {
    pub scenario: JumpScenario,

    /// Test the learner must pass first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_test: Option<String>,

    /// Softer alternative route into the target chapter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate_knowledge: Option<String>,

    /// Node the learner may open directly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl JumpDecision {
    fn new(scenario: JumpScenario) -> Self {
        Self {
            scenario,
            required_test: None,
            intermediate_knowledge: None,
            target: None,
        }
    }

    fn normal() -> Self {
        Self::new(JumpScenario::NormalProgression)
    }

    fn direct(target: TopicRef) -> Self {
        Self {
            target: Some(target.canonical()),
            ..Self::new(JumpScenario::DirectAccess)
        }
    }

    fn chapter_locked(required_test: Option<String>) -> Self {
        Self {
            required_test,
            ..Self::new(JumpScenario::ChapterLocked)
        }
    }

    fn knowledge_required(required_test: Option<String>, intermediate: Option<String>) -> Self {
        Self {
            required_test,
            intermediate_knowledge: intermediate,
            ..Self::new(JumpScenario::KnowledgeRequired)
        }
    }
}

/// Classifies jumps between curriculum nodes
#[derive(Debug, Clone, Copy)]
pub struct JumpScenarioResolver<'a> {
    unlock: UnlockResolver<'a>,
    curriculum: &'a CurriculumOrder,
}

impl<'a> JumpScenarioResolver<'a> {
    pub fn new(unlock: UnlockResolver<'a>, curriculum: &'a CurriculumOrder) -> Self {
        Self { unlock, curriculum }
    }

    pub fn classify(&self, from: &str, to: &str) -> JumpDecision {
        let target = match TopicRef::resolve(to) {
            Some(target) => target,
            None => return JumpDecision::chapter_locked(None),
        };
        let origin = match TopicRef::resolve(from) {
            Some(origin) if origin != target => origin,
            _ => return JumpDecision::normal(),
        };

        let to_chapter = target.chapter();
        let from_chapter = origin.chapter();

        if to_chapter > from_chapter {
            if !self.unlock.can_learn_chapter(to_chapter) {
                return JumpDecision::chapter_locked(to_chapter.previous().map(ChapterId::test_id));
            }
            let intermediate = match target {
                TopicRef::Knowledge(k) if k.section == 1 => None,
                _ => Some(self.entry_point(to_chapter)),
            };
            return self.gated_decision(target, intermediate);
        }

        if to_chapter == from_chapter && self.slot(target).saturating_sub(self.slot(origin)) > 1 {
            return self.gated_decision(target, None);
        }

        JumpDecision::normal()
    }

    fn gated_decision(&self, target: TopicRef, intermediate: Option<String>) -> JumpDecision {
        let UnlockDecision {
            can_jump,
            reason,
            requirement,
        } = self.unlock.can_jump_to(target);
        if can_jump {
            return JumpDecision::direct(target);
        }
        let required = requirement.map(|r| r.id);
        match reason {
            ReasonCode::PreviousKnowledgeRequired => JumpDecision::knowledge_required(required, intermediate),
            ReasonCode::PreviousChapterTestRequired => JumpDecision::chapter_locked(required),
            _ => JumpDecision::chapter_locked(target.chapter().previous().map(ChapterId::test_id)),
        }
    }

    fn entry_point(&self, chapter: ChapterId) -> String {
        self.curriculum
            .first_section(chapter)
            .unwrap_or_else(|| chapter.first_section())
            .to_string()
    }

    /// Position within a chapter; the chapter test sits after the last section
    fn slot(&self, topic: TopicRef) -> u32 {
        match topic {
            TopicRef::Knowledge(k) => k.section,
            TopicRef::ChapterTest(chapter) => self
                .curriculum
                .last_section(chapter)
                .map(|k| k.section.saturating_add(1))
                .unwrap_or(u32::MAX - 1),
        }
    }
}

/// Whether an attempt on `current` reached from `origin` is a jump.
///
/// Crossing chapters or skipping more than one section is a jump, except a
/// chapter test opened from a knowledge node of the same chapter.
pub fn is_jump_attempt(current: &str, origin: &str) -> bool {
    let (current, origin) = match (TopicRef::resolve(current), TopicRef::resolve(origin)) {
        (Some(current), Some(origin)) => (current, origin),
        _ => return false,
    };

    let section = |topic: TopicRef| match topic {
        TopicRef::Knowledge(k) => k.section,
        TopicRef::ChapterTest(_) => 0,
    };

    let same_chapter = current.chapter() == origin.chapter();
    if current.is_chapter_test() && same_chapter && !origin.is_chapter_test() {
        return false;
    }
    !same_chapter || section(current).abs_diff(section(origin)) > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::curriculum_payload;
    use crate::graph::{GraphModel, GraphPayload, NodeEnvelope};
    use crate::ids::KnowledgeId;
    use crate::progress::ProgressSnapshot;

    fn classify(progress: &ProgressSnapshot, from: &str, to: &str) -> JumpDecision {
        let graph = GraphModel::build(curriculum_payload(3, 3)).unwrap();
        let curriculum = CurriculumOrder::fixed(3, 3);
        let unlock = UnlockResolver::new(&graph, progress);
        JumpScenarioResolver::new(unlock, &curriculum).classify(from, to)
    }

    #[test]
    fn test_cross_chapter_into_locked_chapter() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2"]);
        let decision = classify(&progress, "1_2", "2_3");
        assert_eq!(decision.scenario, JumpScenario::ChapterLocked);
        assert_eq!(decision.required_test.as_deref(), Some("1_end"));
    }

    #[test]
    fn test_chapter_lock_reported_before_missing_knowledge() {
        // Blocked on both the chapter and 3_1; the chapter wins
        let progress = ProgressSnapshot::with_learned(["1_1"]);
        let decision = classify(&progress, "1_1", "3_2");
        assert_eq!(decision.scenario, JumpScenario::ChapterLocked);
        assert_eq!(decision.required_test.as_deref(), Some("2_end"));
    }

    #[test]
    fn test_cross_chapter_knowledge_required_offers_intermediate() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3", "1_end"]);
        let decision = classify(&progress, "1_3", "2_3");
        assert_eq!(decision.scenario, JumpScenario::KnowledgeRequired);
        assert_eq!(decision.required_test.as_deref(), Some("2_2"));
        assert_eq!(decision.intermediate_knowledge.as_deref(), Some("2_1"));
    }

    #[test]
    fn test_cross_chapter_direct_access() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3", "1_end"]);
        let decision = classify(&progress, "1_2", "2_1");
        assert_eq!(decision.scenario, JumpScenario::DirectAccess);
        assert_eq!(decision.target.as_deref(), Some("2_1"));
    }

    #[test]
    fn test_same_chapter_skip() {
        let progress = ProgressSnapshot::with_learned(["2_1"]).with_completed_chapters([ChapterId(1)]);
        let decision = classify(&progress, "1_end", "1_3");
        assert_eq!(decision.scenario, JumpScenario::NormalProgression);

        let progress = ProgressSnapshot::with_learned(["1_1"]);
        let decision = classify(&progress, "1_1", "1_3");
        assert_eq!(decision.scenario, JumpScenario::KnowledgeRequired);
        assert_eq!(decision.required_test.as_deref(), Some("1_2"));
        assert_eq!(decision.intermediate_knowledge, None);

        let progress = ProgressSnapshot::with_learned(["1_1", "1_2"]);
        assert_eq!(classify(&progress, "1_1", "1_3").scenario, JumpScenario::DirectAccess);
    }

    #[test]
    fn test_adjacent_progression_is_normal() {
        let progress = ProgressSnapshot::new();
        assert_eq!(classify(&progress, "1_1", "1_2").scenario, JumpScenario::NormalProgression);
        assert_eq!(classify(&progress, "1_3", "1_end").scenario, JumpScenario::NormalProgression);
        assert_eq!(classify(&progress, "2_2", "1_1").scenario, JumpScenario::NormalProgression);
    }

    #[test]
    fn test_chapter_test_target_skipping_sections() {
        let progress = ProgressSnapshot::with_learned(["1_1"]);
        let decision = classify(&progress, "1_1", "1_end");
        assert_eq!(decision.scenario, JumpScenario::KnowledgeRequired);
        assert_eq!(decision.required_test.as_deref(), Some("1_2"));
    }

    #[test]
    fn test_unparseable_ids() {
        let progress = ProgressSnapshot::new();
        assert_eq!(classify(&progress, "1_1", "js_events").scenario, JumpScenario::ChapterLocked);
        assert_eq!(classify(&progress, "js_events", "2_1").scenario, JumpScenario::NormalProgression);
    }

    #[test]
    fn test_extreme_section_numbers_are_classified() {
        let progress = ProgressSnapshot::new();
        assert_eq!(
            classify(&progress, "1_4294967295", "1_end").scenario,
            JumpScenario::NormalProgression
        );

        let payload = GraphPayload {
            nodes: vec![
                NodeEnvelope::new("1_1", "first", None),
                NodeEnvelope::new("1_4294967295", "last", None),
            ],
            ..GraphPayload::default()
        };
        let graph = GraphModel::build(payload).unwrap();
        let curriculum = CurriculumOrder::from_graph(&graph);
        let unlock = UnlockResolver::new(&graph, &progress);
        let decision = JumpScenarioResolver::new(unlock, &curriculum).classify("1_1", "1_end");
        assert_ne!(decision.scenario, JumpScenario::DirectAccess);
    }

    #[test]
    fn test_ids_are_normalized_before_classification() {
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3", "1_end"]);
        let plain = classify(&progress, "1_1", "2_2");
        assert_eq!(plain.scenario, JumpScenario::KnowledgeRequired);
        assert_eq!(classify(&progress, "1-1", "2-2"), plain);
        assert_eq!(classify(&progress, "1_1", "/pages/test_page.html?topic=2-2"), plain);
        assert!(is_jump_attempt("2-2", "1-1"));
    }

    #[test]
    fn test_classification_is_total_and_consistent() {
        let graph = GraphModel::build(curriculum_payload(3, 3)).unwrap();
        let curriculum = CurriculumOrder::fixed(3, 3);
        let progress = ProgressSnapshot::with_learned(["1_1", "1_2", "1_3", "1_end", "2_1"]);
        let unlock = UnlockResolver::new(&graph, &progress);
        let resolver = JumpScenarioResolver::new(unlock, &curriculum);

        let mut ids: Vec<String> = curriculum.nodes().iter().map(KnowledgeId::to_string).collect();
        ids.extend((1..=3).map(|c| ChapterId(c).test_id()));

        for from in &ids {
            for to in ids.iter().filter(|to| *to != from) {
                let decision = resolver.classify(from, to);
                if decision.scenario == JumpScenario::DirectAccess {
                    assert!(unlock.is_knowledge_unlocked(to), "{} -> {}", from, to);
                }
                if decision.scenario == JumpScenario::KnowledgeRequired {
                    assert!(!unlock.is_knowledge_unlocked(to), "{} -> {}", from, to);
                }
            }
        }
    }

    #[test]
    fn test_jump_attempt_detection() {
        assert!(is_jump_attempt("3_1", "1_2"));
        assert!(is_jump_attempt("2_3", "2_1"));
        assert!(!is_jump_attempt("2_2", "2_1"));
        assert!(!is_jump_attempt("2_end", "2_1"));
        assert!(is_jump_attempt("2_end", "1_end"));
        assert!(is_jump_attempt("/pages/test_page.html?topic=4-2", "chapter1"));
        assert!(!is_jump_attempt("garbage", "1_1"));
    }

    #[test]
    fn test_scenario_tags() {
        assert_eq!(JumpScenario::KnowledgeRequired.as_str(), "knowledge_required");
        let json = serde_json::to_string(&JumpScenario::DirectAccess).unwrap();
        assert_eq!(json, "\"direct_access\"");
    }
}
