//! # Unlock Resolution
//!
//! Answers "can the learner open this node right now" and, when not, names
//! the single missing requirement. The rules are linear within a chapter and
//! gated by chapter tests between chapters:
//!
//! 1. `1_1` is always open.
//! 2. A node in a chapter whose predecessor chapter is not completed is locked.
//! 3. Section `s > 1` needs section `s - 1` of the same chapter learned.
//! 4. Section 1 of chapter `c > 1` needs the `<c-1>_end` milestone.
//!
//! [`UnlockResolver::is_knowledge_unlocked`] is a projection of
//! [`UnlockResolver::can_jump_to_knowledge`] and never evaluated separately.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::graph::{GraphModel, NodeKind};
use crate::ids::{ChapterId, KnowledgeId, TopicRef};
use crate::progress::ProgressSnapshot;
use crate::progression::chapter_test::ChapterTestEvaluator;

/// Why a node is open or locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    FirstKnowledge,
    Unlocked,
    ChapterLocked,
    PreviousKnowledgeRequired,
    PreviousChapterTestRequired,
    /// The id is neither a knowledge id nor a chapter milestone
    UnknownNode,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::FirstKnowledge => "first_knowledge",
            ReasonCode::Unlocked => "unlocked",
            ReasonCode::ChapterLocked => "chapter_locked",
            ReasonCode::PreviousKnowledgeRequired => "previous_knowledge_required",
            ReasonCode::PreviousChapterTestRequired => "previous_chapter_test_required",
            ReasonCode::UnknownNode => "unknown_node",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The node that must be completed first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub label: String,
}

/// Result of an unlock query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockDecision {
    pub can_jump: bool,
    pub reason: ReasonCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<Requirement>,
}

impl UnlockDecision {
    fn open(reason: ReasonCode) -> Self {
        Self {
            can_jump: true,
            reason,
            requirement: None,
        }
    }

    fn locked(reason: ReasonCode, requirement: Option<Requirement>) -> Self {
        Self {
            can_jump: false,
            reason,
            requirement,
        }
    }
}

/// Display state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Locked,
    Unlocked,
    Learned,
}

/// Unlock queries over a graph and a progress snapshot
#[derive(Debug, Clone, Copy)]
pub struct UnlockResolver<'a> {
    graph: &'a GraphModel,
    progress: &'a ProgressSnapshot,
}

impl<'a> UnlockResolver<'a> {
    pub fn new(graph: &'a GraphModel, progress: &'a ProgressSnapshot) -> Self {
        Self { graph, progress }
    }

    pub fn graph(&self) -> &'a GraphModel {
        self.graph
    }

    pub fn progress(&self) -> &'a ProgressSnapshot {
        self.progress
    }

    pub fn chapter_tests(&self) -> ChapterTestEvaluator<'a> {
        ChapterTestEvaluator::new(self.graph)
    }

    /// Chapter 1 is always learnable; later chapters need the previous one completed
    pub fn can_learn_chapter(&self, chapter: ChapterId) -> bool {
        match chapter.previous() {
            None => true,
            Some(previous) => self.is_chapter_completed(previous),
        }
    }

    pub fn is_chapter_completed(&self, chapter: ChapterId) -> bool {
        self.chapter_tests().is_chapter_completed(self.progress, chapter)
    }

    /// Unlock decision for a raw topic id
    pub fn can_jump_to_knowledge(&self, id: &str) -> UnlockDecision {
        match TopicRef::resolve(id) {
            Some(topic) => self.can_jump_to(topic),
            None => UnlockDecision::locked(ReasonCode::UnknownNode, None),
        }
    }

    pub fn can_jump_to(&self, topic: TopicRef) -> UnlockDecision {
        match topic {
            TopicRef::Knowledge(knowledge) => self.knowledge_decision(knowledge),
            TopicRef::ChapterTest(chapter) => self.chapter_test_decision(chapter),
        }
    }

    pub fn is_knowledge_unlocked(&self, id: &str) -> bool {
        self.can_jump_to_knowledge(id).can_jump
    }

    /// Learned status is trusted before any prerequisite check
    pub fn node_state(&self, id: &str) -> NodeState {
        if self.progress.is_learned(id) {
            NodeState::Learned
        } else if self.is_knowledge_unlocked(id) {
            NodeState::Unlocked
        } else {
            NodeState::Locked
        }
    }

    /// Display state of every knowledge node in the graph
    pub fn status_map(&self) -> BTreeMap<String, NodeState> {
        let ids: Vec<&str> = self
            .graph
            .nodes()
            .iter()
            .filter(|n| n.kind == NodeKind::Knowledge)
            .map(|n| n.id.as_str())
            .collect();
        ids.par_iter()
            .map(|id| (id.to_string(), self.node_state(id)))
            .collect()
    }

    fn knowledge_decision(&self, knowledge: KnowledgeId) -> UnlockDecision {
        if knowledge.is_first() {
            return UnlockDecision::open(ReasonCode::FirstKnowledge);
        }

        let chapter = knowledge.chapter_id();
        if !self.can_learn_chapter(chapter) {
            return UnlockDecision::locked(ReasonCode::ChapterLocked, self.previous_chapter_requirement(chapter));
        }

        if let Some(previous) = knowledge.previous_in_chapter() {
            if !self.progress.is_knowledge_learned(previous) {
                return UnlockDecision::locked(
                    ReasonCode::PreviousKnowledgeRequired,
                    Some(self.knowledge_requirement(&previous.to_string())),
                );
            }
        } else if let Some(previous_chapter) = chapter.previous() {
            if !self.progress.has_chapter_test_record(previous_chapter) {
                return UnlockDecision::locked(
                    ReasonCode::PreviousChapterTestRequired,
                    Some(self.chapter_test_requirement(previous_chapter)),
                );
            }
        }

        UnlockDecision::open(ReasonCode::Unlocked)
    }

    fn chapter_test_decision(&self, chapter: ChapterId) -> UnlockDecision {
        if !self.can_learn_chapter(chapter) {
            return UnlockDecision::locked(ReasonCode::ChapterLocked, self.previous_chapter_requirement(chapter));
        }
        let evaluator = self.chapter_tests();
        if evaluator.is_test_ready(self.progress, chapter) {
            return UnlockDecision::open(ReasonCode::Unlocked);
        }
        let requirement = evaluator
            .first_unlearned(self.progress, chapter)
            .map(|id| self.knowledge_requirement(&id));
        UnlockDecision::locked(ReasonCode::PreviousKnowledgeRequired, requirement)
    }

    fn knowledge_requirement(&self, id: &str) -> Requirement {
        Requirement {
            id: id.to_string(),
            label: self.graph.label_of(id).to_string(),
        }
    }

    fn previous_chapter_requirement(&self, chapter: ChapterId) -> Option<Requirement> {
        chapter.previous().map(|previous| {
            let id = previous.to_string();
            Requirement {
                label: self.graph.label_of(&id).to_string(),
                id,
            }
        })
    }

    fn chapter_test_requirement(&self, chapter: ChapterId) -> Requirement {
        let chapter_id = chapter.to_string();
        Requirement {
            id: chapter.test_id(),
            label: format!("{} test", self.graph.label_of(&chapter_id)),
        }
    }
}
