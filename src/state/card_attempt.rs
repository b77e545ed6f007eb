//! Per-card extraction attempt state machine
//!
//! A `CardAttempt` is created when a worker begins a card and destroyed once
//! the card reaches a terminal state; it is never persisted. A retry is a
//! full restart of the attempt from the clicking step, never a resumption
//! mid-step.

use std::fmt;

/// State of a card attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardState {
    NotStarted,

    /// Resolving the card element and activating it
    Clicking,

    /// Waiting for both detail-view markers
    WaitingForDetail,

    /// Both markers observed; reading the fields
    Extracting,

    /// Terminal: a record was produced
    Completed,

    /// A transient failure occurred; the attempt may restart
    FailedRetryable,

    /// Terminal: retries exhausted, the card is skipped
    FailedTerminal,
}

impl CardState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::FailedTerminal)
    }

    /// Returns true if the state machine allows this move
    pub fn can_transition_to(&self, to: CardState) -> bool {
        use CardState::*;
        matches!(
            (self, to),
            (NotStarted, Clicking)
                | (Clicking, WaitingForDetail)
                | (WaitingForDetail, Extracting)
                | (Extracting, Completed)
                | (Clicking, FailedRetryable)
                | (WaitingForDetail, FailedRetryable)
                | (FailedRetryable, Clicking)
                | (FailedRetryable, FailedTerminal)
        )
    }
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not-started",
            Self::Clicking => "clicking",
            Self::WaitingForDetail => "waiting-for-detail",
            Self::Extracting => "extracting",
            Self::Completed => "completed",
            Self::FailedRetryable => "failed-retryable",
            Self::FailedTerminal => "failed-terminal",
        };
        write!(f, "{}", s)
    }
}

/// One in-flight extraction attempt for a card index
#[derive(Debug, Clone)]
pub struct CardAttempt {
    pub index: usize,
    pub retries: u32,
    state: CardState,
}

impl CardAttempt {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            retries: 0,
            state: CardState::NotStarted,
        }
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    /// Moves the attempt to `to`, rejecting illegal transitions
    pub fn transition(&mut self, to: CardState) -> Result<(), crate::HarvestError> {
        if !self.state.can_transition_to(to) {
            return Err(crate::HarvestError::InvalidCardTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Restarts the attempt from the clicking step, consuming one retry
    pub fn restart(&mut self) -> Result<(), crate::HarvestError> {
        self.transition(CardState::Clicking)?;
        self.retries += 1;
        Ok(())
    }
}
