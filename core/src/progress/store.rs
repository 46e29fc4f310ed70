//! Progress store abstraction.
//!
//! Resolvers never read learner progress from ambient state; a
//! [`ProgressStore`] is injected instead, and every write through it is
//! visible to the next `load`.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::collections::BTreeSet;

use log::trace;

use crate::error::{ProgressionError, Result};
use crate::ids::{normalize_topic_id, ChapterId};
use crate::progress::snapshot::{ProgressSnapshot, ProgressSources};

/// Source of learner progress
pub trait ProgressStore {
    /// Current merged snapshot
    fn load(&self) -> Result<ProgressSnapshot>;

    /// Record a passed submission. Returns `false` if it was already recorded.
    fn mark_knowledge_learned(&mut self, id: &str) -> Result<bool>;

    /// Record a passed chapter test. Returns `false` if it was already recorded.
    fn mark_chapter_passed(&mut self, chapter: ChapterId) -> Result<bool>;
}

/// Store keeping the remote record and local cache side by side in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressStore {
    sources: ProgressSources,
    passed_chapters: BTreeSet<ChapterId>,
}

impl InMemoryProgressStore {
    pub fn new(sources: ProgressSources) -> Self {
        Self {
            sources,
            passed_chapters: BTreeSet::new(),
        }
    }

    pub fn sources(&self) -> &ProgressSources {
        &self.sources
    }

    /// Flag a chapter complete in the local cache
    pub fn flag_chapter_completed(&mut self, chapter: ChapterId) {
        let flag = chapter.to_string();
        if !self.sources.local_completed_chapters.contains(&flag) {
            self.sources.local_completed_chapters.push(flag);
        }
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self) -> Result<ProgressSnapshot> {
        Ok(self
            .sources
            .merge()
            .with_passed_chapters(self.passed_chapters.iter().copied()))
    }

    fn mark_knowledge_learned(&mut self, id: &str) -> Result<bool> {
        let id = normalize_topic_id(id)
            .ok_or_else(|| ProgressionError::Store("cannot record an empty topic id".to_string()))?;
        let known = self
            .sources
            .remote
            .iter()
            .chain(self.sources.local_learned.iter())
            .any(|existing| normalize_topic_id(existing).as_deref() == Some(id.as_str()));
        if known {
            return Ok(false);
        }
        trace!("Caching learned topic {}", id);
        self.sources.local_learned.push(id);
        Ok(true)
    }

    fn mark_chapter_passed(&mut self, chapter: ChapterId) -> Result<bool> {
        Ok(self.passed_chapters.insert(chapter))
    }
}
