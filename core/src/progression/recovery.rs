//! Test-attempt recovery policy.
//!
//! Counts tutor questions and submissions during one test attempt and decides
//! when the learner should get a hint, see the answer, or be sent back to the
//! nearest learnable node. Jump attempts never reveal the answer; they return
//! the learner instead.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use serde::{Deserialize, Serialize};

use crate::config::RecoveryConfig;
use crate::ids::KnowledgeId;

/// Counters of a single test attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounters {
    pub ai_asks: u32,
    pub submissions: u32,
    pub failed_submissions: u32,

    /// A hint or answer has already been triggered in this attempt
    pub assistance_triggered: bool,
}

impl AttemptCounters {
    pub fn record_ask(&mut self) {
        self.ai_asks = self.ai_asks.saturating_add(1);
    }

    pub fn record_submission(&mut self, passed: bool) {
        self.submissions = self.submissions.saturating_add(1);
        if !passed {
            self.failed_submissions = self.failed_submissions.saturating_add(1);
        }
    }
}

/// What the policy asks for, before a return target is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTrigger {
    None,
    SmartHint,
    RevealAnswer,
    OfferReturn,
    ForceReturn,
}

/// Resolved recovery action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecoveryAction {
    None,
    SmartHint,
    RevealAnswer,
    /// Suggest going back; the learner may keep trying
    OfferReturn { target: KnowledgeId },
    /// Send the learner back
    ForceReturn { target: KnowledgeId },
}

impl RecoveryAction {
    /// Attach a return target to a trigger
    pub fn resolve(trigger: RecoveryTrigger, target: impl FnOnce() -> KnowledgeId) -> Self {
        match trigger {
            RecoveryTrigger::None => RecoveryAction::None,
            RecoveryTrigger::SmartHint => RecoveryAction::SmartHint,
            RecoveryTrigger::RevealAnswer => RecoveryAction::RevealAnswer,
            RecoveryTrigger::OfferReturn => RecoveryAction::OfferReturn { target: target() },
            RecoveryTrigger::ForceReturn => RecoveryAction::ForceReturn { target: target() },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecoveryPolicy {
    config: RecoveryConfig,
}

impl RecoveryPolicy {
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }

    /// Evaluated after a tutor question or a submission.
    ///
    /// Nothing fires before the first submission or after assistance was
    /// already given in this attempt. A zero interval never fires.
    pub fn after_action(&self, counters: &AttemptCounters, jump_attempt: bool) -> RecoveryTrigger {
        let c = &self.config;
        if counters.submissions == 0 || counters.assistance_triggered {
            return RecoveryTrigger::None;
        }
        if counters.ai_asks < c.hint_min_asks || counters.ai_asks.checked_rem(c.hint_ask_interval) != Some(0) {
            return RecoveryTrigger::None;
        }
        if counters.ai_asks < c.answer_min_asks {
            return RecoveryTrigger::SmartHint;
        }
        if counters.failed_submissions >= c.answer_min_failures {
            return if jump_attempt {
                RecoveryTrigger::ForceReturn
            } else {
                RecoveryTrigger::RevealAnswer
            };
        }
        RecoveryTrigger::None
    }

    /// Evaluated after a failed test. Only jump attempts are offered a return.
    pub fn after_failed_test(&self, counters: &AttemptCounters, jump_attempt: bool) -> RecoveryTrigger {
        let interval = self.config.return_offer_interval;
        if jump_attempt
            && counters.failed_submissions > 0
            && counters.failed_submissions.checked_rem(interval) == Some(0)
        {
            RecoveryTrigger::OfferReturn
        } else {
            RecoveryTrigger::None
        }
    }
}
