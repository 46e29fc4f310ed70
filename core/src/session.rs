//! # Progression Session
//!
//! One learner's view of the curriculum: a graph, the linear ordering, a
//! progress store and the snapshot every query reads. Writes go to the store
//! first and then to the snapshot, so a query issued after a write always
//! sees it.
//!
//! ## Computational Characteristics
//! - Queries borrow the session and allocate nothing beyond their result
//! - `status_map` is parallel over knowledge nodes
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::config::CurriculumConfig;
use crate::curriculum::{CurriculumOrder, NextStep};
use crate::error::Result;
use crate::graph::{GraphModel, GraphPayload};
use crate::ids::{ChapterId, TopicRef};
use crate::progress::{ProgressSnapshot, ProgressStore};
use crate::progression::{
    is_jump_attempt, AttemptCounters, ChapterTestEvaluator, JumpDecision, JumpScenarioResolver,
    NearestLearnableFinder, NodeState, RecoveryAction, RecoveryPolicy, UnlockDecision, UnlockResolver,
};

pub struct ProgressionSession<S: ProgressStore> {
    graph: GraphModel,
    curriculum: CurriculumOrder,
    policy: RecoveryPolicy,
    store: S,
    snapshot: ProgressSnapshot,

    /// Chapter the learner is working through; cleared by its chapter test
    current_chapter: Option<ChapterId>,
}

impl<S: ProgressStore> ProgressionSession<S> {
    pub fn new(graph: GraphModel, config: &CurriculumConfig, store: S) -> Result<Self> {
        config.validate()?;
        let curriculum = CurriculumOrder::from_config(config, &graph);
        let snapshot = store.load()?;
        debug!(
            "Session opened: {} nodes, {} ordered sections, {} learned",
            graph.nodes().len(),
            curriculum.len(),
            snapshot.learned_count()
        );
        Ok(Self {
            graph,
            curriculum,
            policy: RecoveryPolicy::new(config.recovery.clone()),
            store,
            snapshot,
            current_chapter: None,
        })
    }

    /// A malformed payload yields an empty graph rather than an error
    pub fn from_payload(payload: GraphPayload, config: &CurriculumConfig, store: S) -> Result<Self> {
        Self::new(GraphModel::build_or_empty(payload), config, store)
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn curriculum(&self) -> &CurriculumOrder {
        &self.curriculum
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_chapter(&self) -> Option<ChapterId> {
        self.current_chapter
    }

    pub fn set_current_chapter(&mut self, chapter: Option<ChapterId>) {
        self.current_chapter = chapter;
    }

    pub fn unlock(&self) -> UnlockResolver<'_> {
        UnlockResolver::new(&self.graph, &self.snapshot)
    }

    pub fn jump(&self) -> JumpScenarioResolver<'_> {
        JumpScenarioResolver::new(self.unlock(), &self.curriculum)
    }

    pub fn nearest(&self) -> NearestLearnableFinder<'_> {
        NearestLearnableFinder::new(&self.curriculum, &self.snapshot)
    }

    pub fn can_jump_to_knowledge(&self, id: &str) -> UnlockDecision {
        self.unlock().can_jump_to_knowledge(id)
    }

    pub fn is_knowledge_unlocked(&self, id: &str) -> bool {
        self.unlock().is_knowledge_unlocked(id)
    }

    /// Unparseable chapter ids are not learnable
    pub fn can_learn_chapter(&self, chapter: &str) -> bool {
        ChapterId::parse(chapter).map_or(false, |c| self.unlock().can_learn_chapter(c))
    }

    pub fn is_chapter_completed(&self, chapter: &str) -> bool {
        ChapterId::parse(chapter).map_or(false, |c| self.unlock().is_chapter_completed(c))
    }

    pub fn classify_jump(&self, from: &str, to: &str) -> JumpDecision {
        self.jump().classify(from, to)
    }

    pub fn status_map(&self) -> BTreeMap<String, NodeState> {
        self.unlock().status_map()
    }

    /// Record a passed knowledge test. Returns `false` if it was already learned.
    pub fn mark_knowledge_learned(&mut self, id: &str) -> Result<bool> {
        let stored = self.store.mark_knowledge_learned(id)?;
        let recorded = self.snapshot.record_learned(id);
        Ok(stored || recorded)
    }

    /// Pass a chapter test if every gated node is learned.
    ///
    /// A refusal writes nothing. On success the current-chapter marker is
    /// cleared when it points at this chapter.
    pub fn pass_chapter_test(&mut self, chapter: &str) -> Result<bool> {
        let Some(chapter) = ChapterId::parse(chapter) else {
            debug!("Ignoring chapter test for unparseable id {}", chapter);
            return Ok(false);
        };
        let evaluator = ChapterTestEvaluator::new(&self.graph);
        if !evaluator.is_test_ready(&self.snapshot, chapter) {
            debug!("Chapter test for {} is not ready", chapter);
            return Ok(false);
        }
        self.store.mark_chapter_passed(chapter)?;
        let passed = evaluator.pass_chapter_test(&mut self.snapshot, chapter);
        if passed && self.current_chapter == Some(chapter) {
            self.current_chapter = None;
        }
        Ok(passed)
    }

    /// Apply a successful test result and return where the learner goes next.
    ///
    /// `None` means nothing was applied: a refused chapter test, or an id
    /// outside the curriculum's numbering (which is still recorded as learned).
    pub fn complete_topic(&mut self, id: &str) -> Result<Option<NextStep>> {
        let topic = TopicRef::resolve(id);
        match topic {
            Some(TopicRef::Knowledge(knowledge)) => {
                self.mark_knowledge_learned(&knowledge.to_string())?;
                self.current_chapter = Some(knowledge.chapter_id());
                Ok(Some(self.curriculum.next_after(TopicRef::Knowledge(knowledge))))
            }
            Some(TopicRef::ChapterTest(chapter)) => {
                if !self.pass_chapter_test(&chapter.to_string())? {
                    return Ok(None);
                }
                let next = self.curriculum.next_after(TopicRef::ChapterTest(chapter));
                info!("Chapter {} completed, next step {:?}", chapter, next);
                Ok(Some(next))
            }
            None => {
                self.mark_knowledge_learned(id)?;
                Ok(None)
            }
        }
    }

    /// Pull newer progress from the store without dropping anything already seen
    pub fn refresh(&mut self) -> Result<()> {
        let loaded = self.store.load()?;
        self.snapshot.absorb(&loaded);
        Ok(())
    }

    /// Recovery after a tutor question or a submission on `current`
    pub fn recovery_after_action(&self, counters: &AttemptCounters, current: &str, origin: &str) -> RecoveryAction {
        let trigger = self.policy.after_action(counters, is_jump_attempt(current, origin));
        RecoveryAction::resolve(trigger, || self.nearest().find_nearest_learnable_node(current))
    }

    /// Recovery after a failed test on `current`
    pub fn recovery_after_failed_test(&self, counters: &AttemptCounters, current: &str, origin: &str) -> RecoveryAction {
        let trigger = self.policy.after_failed_test(counters, is_jump_attempt(current, origin));
        RecoveryAction::resolve(trigger, || self.nearest().find_nearest_learnable_node(current))
    }
}
