//! Progression decisions over a curriculum graph and a progress snapshot.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

pub mod jump;
pub mod nearest;
pub mod recovery;
pub mod unlock;

pub use self::chapter_test::ChapterTestEvaluator;
pub use self::jump::{is_jump_attempt, JumpDecision, JumpScenario, JumpScenarioResolver};
pub use self::nearest::NearestLearnableFinder;
pub use self::recovery::{AttemptCounters, RecoveryAction, RecoveryPolicy, RecoveryTrigger};
pub use self::unlock::{NodeState, ReasonCode, Requirement, UnlockDecision, UnlockResolver};
