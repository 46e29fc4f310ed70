//! PATHWAY progression core
//!
//! Curriculum progression engine for a web-development tutoring platform:
//! given a knowledge graph of chapters and sections and a learner's merged
//! completion record, it decides which nodes are unlocked, when a chapter
//! test may be passed, how an out-of-order ("jump") attempt relates to the
//! learner's position, and where a stuck learner should be sent back to.
//!
//! Every query is a pure function of a [`graph::GraphModel`] and a
//! [`progress::ProgressSnapshot`]. The only writes are marking a node learned
//! and passing a chapter test, both applied through
//! [`session::ProgressionSession`].
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

pub mod config;
pub mod curriculum;
pub mod error;
pub mod graph;
pub mod ids;
pub mod progress;
pub mod progression;
pub mod session;

pub use config::{CurriculumConfig, OrderingSource, RecoveryConfig};
pub use curriculum::{CurriculumOrder, NextStep};
pub use error::{ProgressionError, Result, ValidationError};
pub use graph::{GraphModel, GraphPayload, NodeKind, ProgressPayload};
pub use ids::{normalize_topic_id, ChapterId, ContentTag, KnowledgeId, TopicRef};
pub use progress::{merge_sources, InMemoryProgressStore, ProgressSnapshot, ProgressSources, ProgressStore};
pub use progression::{
    is_jump_attempt, AttemptCounters, ChapterTestEvaluator, JumpDecision, JumpScenario, JumpScenarioResolver,
    NearestLearnableFinder, NodeState, ReasonCode, RecoveryAction, RecoveryPolicy, UnlockDecision, UnlockResolver,
};
pub use session::ProgressionSession;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
