//! Bounded retry state for classification calls
//!
//! Each attempt ends in an [`AttemptOutcome`]. Successful and refused
//! attempts end the loop directly; everything else is fed to
//! [`RetryState::advance`], which decides whether another attempt is
//! allowed and with what token budget.

use std::time::Duration;

/// Smallest token budget ever requested
pub const MIN_TOKEN_BUDGET: u32 = 512;

/// Why an attempt did not produce hits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Output was cut off by the token limit
    Truncated,
    /// The model returned no text
    Empty,
    /// The text could not be parsed as hits
    Unparseable,
    /// The request itself failed
    Transport,
}

/// Result of advancing a [`RetryState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again with this state
    Retry(RetryState),
    /// No attempts left
    Exhausted,
}

/// Attempt counter and token budget for one classification call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Current attempt, starting at 1
    pub attempt: u32,
    /// Attempts allowed in total
    pub max_attempts: u32,
    /// Completion tokens requested on the current attempt
    pub token_budget: u32,
    /// Ceiling for `token_budget`
    pub max_token_budget: u32,
}

impl RetryState {
    /// Initial state: at least one attempt and at least [`MIN_TOKEN_BUDGET`] tokens
    pub fn new(max_tokens: u32, max_attempts: u32, max_token_budget: u32) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
            token_budget: max_tokens.max(MIN_TOKEN_BUDGET),
            max_token_budget,
        }
    }

    /// Decide what follows a failed attempt.
    ///
    /// Truncation doubles the budget, capped at `max_token_budget` (and never
    /// lowered). Other outcomes keep it.
    pub fn advance(self, outcome: AttemptOutcome) -> RetryDecision {
        if self.attempt >= self.max_attempts {
            return RetryDecision::Exhausted;
        }

        let token_budget = match outcome {
            AttemptOutcome::Truncated => self
                .token_budget
                .saturating_mul(2)
                .min(self.max_token_budget)
                .max(self.token_budget),
            _ => self.token_budget,
        };

        RetryDecision::Retry(Self {
            attempt: self.attempt + 1,
            token_budget,
            ..self
        })
    }

    /// Pause before the next attempt after a transport failure: 1s, 2s, 4s, ...
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(2u64.saturating_pow(self.attempt.saturating_sub(1)).min(30))
    }
}
