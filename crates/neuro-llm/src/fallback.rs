//! The retry/fallback contract as a state machine.
//!
//! ```text
//! TryingPrimary(i, n) --fail, n < max--> TryingPrimary(i, n + 1)
//! TryingPrimary(i, n) --fail, n = max--> TryingPrimary(i + 1, 1) | TryingFallback(0, 1) | Exhausted
//! TryingFallback(j, n) --fail, n < max--> TryingFallback(j, n + 1)
//! TryingFallback(j, n) --fail, n = max--> TryingFallback(j + 1, 1) | Exhausted
//! Trying*(..) --success--> Succeeded
//! ```
//!
//! A failure is either a transport error, a timeout, or output rejected by
//! the quality check; the machine does not distinguish them.

use neuro_core::models::usage::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    TryingPrimary { index: usize, attempt: u32 },
    TryingFallback { index: usize, attempt: u32 },
    Succeeded { tier: Tier, index: usize, attempt: u32 },
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// The attempt a non-terminal state asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'a> {
    pub tier: Tier,
    pub model_id: &'a str,
    pub attempt: u32,
}

/// Available models for one request, primary tier first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPlan {
    primary: Vec<String>,
    fallback: Vec<String>,
    max_retries: u32,
}

impl FallbackPlan {
    /// `max_retries` is the number of attempts per model; at least one.
    pub fn new(primary: Vec<String>, fallback: Vec<String>, max_retries: u32) -> Self {
        Self {
            primary,
            fallback,
            max_retries: max_retries.max(1),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Upper bound on the attempts this plan can make.
    pub fn attempt_budget(&self) -> usize {
        (self.primary.len() + self.fallback.len()) * self.max_retries as usize
    }

    pub fn start(&self) -> AttemptState {
        self.enter(Tier::Primary, 0)
    }

    fn enter(&self, tier: Tier, index: usize) -> AttemptState {
        match tier {
            Tier::Primary if index < self.primary.len() => {
                AttemptState::TryingPrimary { index, attempt: 1 }
            }
            Tier::Primary => self.enter(Tier::Fallback, 0),
            Tier::Fallback if index < self.fallback.len() => {
                AttemptState::TryingFallback { index, attempt: 1 }
            }
            Tier::Fallback => AttemptState::Exhausted,
        }
    }

    /// What to attempt in `state`; `None` once terminal.
    pub fn step(&self, state: &AttemptState) -> Option<Step<'_>> {
        match *state {
            AttemptState::TryingPrimary { index, attempt } => Some(Step {
                tier: Tier::Primary,
                model_id: self.primary.get(index)?.as_str(),
                attempt,
            }),
            AttemptState::TryingFallback { index, attempt } => Some(Step {
                tier: Tier::Fallback,
                model_id: self.fallback.get(index)?.as_str(),
                attempt,
            }),
            AttemptState::Succeeded { .. } | AttemptState::Exhausted => None,
        }
    }

    pub fn advance(&self, state: &AttemptState, outcome: AttemptOutcome) -> AttemptState {
        match (*state, outcome) {
            (AttemptState::TryingPrimary { index, attempt }, AttemptOutcome::Success) => {
                AttemptState::Succeeded {
                    tier: Tier::Primary,
                    index,
                    attempt,
                }
            }
            (AttemptState::TryingFallback { index, attempt }, AttemptOutcome::Success) => {
                AttemptState::Succeeded {
                    tier: Tier::Fallback,
                    index,
                    attempt,
                }
            }
            (AttemptState::TryingPrimary { index, attempt }, AttemptOutcome::Failure) => {
                if attempt < self.max_retries {
                    AttemptState::TryingPrimary {
                        index,
                        attempt: attempt + 1,
                    }
                } else {
                    self.enter(Tier::Primary, index + 1)
                }
            }
            (AttemptState::TryingFallback { index, attempt }, AttemptOutcome::Failure) => {
                if attempt < self.max_retries {
                    AttemptState::TryingFallback {
                        index,
                        attempt: attempt + 1,
                    }
                } else {
                    self.enter(Tier::Fallback, index + 1)
                }
            }
            (terminal, _) => terminal,
        }
    }
}
