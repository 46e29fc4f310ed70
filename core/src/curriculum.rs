//! # Linear Curriculum Ordering
//!
//! The total order over knowledge nodes (`1_1, 1_2, …, 2_1, …`) used for
//! recovery scans and for "what comes next" after a passed test. It is not the
//! prerequisite graph: prerequisites may be sparser than this order implies.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{CurriculumConfig, OrderingSource};
use crate::graph::GraphModel;
use crate::ids::{ChapterId, KnowledgeId, TopicRef};

/// Ordered list of knowledge nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumOrder {
    nodes: Vec<KnowledgeId>,
}

/// Where a learner goes after passing a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextStep {
    /// Next section of the same chapter
    Knowledge { id: KnowledgeId },

    /// Last section passed; the chapter test is next
    ChapterTest { chapter: ChapterId },

    /// Chapter test passed; continue with the next chapter's first section
    NextChapter { completed: ChapterId, first: KnowledgeId },

    /// Nothing left in the curriculum
    CurriculumComplete,
}

impl CurriculumOrder {
    /// `chapters` × `sections` table
    pub fn fixed(chapters: u32, sections: u32) -> Self {
        let nodes = (1..=chapters)
            .flat_map(|c| (1..=sections).map(move |s| KnowledgeId::new(c, s)))
            .collect();
        Self { nodes }
    }

    /// Order derived from the graph's `<chapter>_<section>` knowledge ids
    pub fn from_graph(graph: &GraphModel) -> Self {
        Self {
            nodes: graph.knowledge_ids(),
        }
    }

    /// Order selected by configuration
    pub fn from_config(config: &CurriculumConfig, graph: &GraphModel) -> Self {
        let fixed = || Self::fixed(config.chapter_count, config.sections_per_chapter);
        match config.ordering {
            OrderingSource::Fixed => fixed(),
            OrderingSource::Graph => {
                let derived = Self::from_graph(graph);
                if derived.is_empty() {
                    debug!("Graph carries no knowledge ids, using the fixed curriculum table");
                    fixed()
                } else {
                    derived
                }
            }
        }
    }

    pub fn nodes(&self) -> &[KnowledgeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node, the unconditional fallback target
    pub fn first(&self) -> KnowledgeId {
        self.nodes.first().copied().unwrap_or(KnowledgeId::new(1, 1))
    }

    pub fn position(&self, id: KnowledgeId) -> Option<usize> {
        self.nodes.iter().position(|k| *k == id)
    }

    /// Highest-numbered section of a chapter
    pub fn last_section(&self, chapter: ChapterId) -> Option<KnowledgeId> {
        self.nodes
            .iter()
            .filter(|k| k.chapter_id() == chapter)
            .max()
            .copied()
    }

    /// Lowest-numbered section of a chapter
    pub fn first_section(&self, chapter: ChapterId) -> Option<KnowledgeId> {
        self.nodes
            .iter()
            .filter(|k| k.chapter_id() == chapter)
            .min()
            .copied()
    }

    /// Next step after passing `passed`
    pub fn next_after(&self, passed: TopicRef) -> NextStep {
        match passed {
            TopicRef::Knowledge(id) => {
                if self.last_section(id.chapter_id()) == Some(id) {
                    return NextStep::ChapterTest {
                        chapter: id.chapter_id(),
                    };
                }
                let following = self
                    .position(id)
                    .and_then(|i| self.nodes.get(i + 1))
                    .copied()
                    .filter(|next| next.chapter == id.chapter);
                match following {
                    Some(next) => NextStep::Knowledge { id: next },
                    None if self.position(id).is_none() => NextStep::CurriculumComplete,
                    None => NextStep::ChapterTest {
                        chapter: id.chapter_id(),
                    },
                }
            }
            TopicRef::ChapterTest(chapter) => {
                let next_chapter = self
                    .nodes
                    .iter()
                    .map(|k| k.chapter_id())
                    .filter(|c| *c > chapter)
                    .min();
                match next_chapter.and_then(|c| self.first_section(c)) {
                    Some(first) => NextStep::NextChapter {
                        completed: chapter,
                        first,
                    },
                    None => NextStep::CurriculumComplete,
                }
            }
        }
    }
}

impl Default for CurriculumOrder {
    fn default() -> Self {
        let config = CurriculumConfig::default();
        Self::fixed(config.chapter_count, config.sections_per_chapter)
    }
}
