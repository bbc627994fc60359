//! Per-conversation state: mode, bounded history, and the guided
//! calculator record.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tensive_core::Message;
use tensive_tools::CalculatorInput;

/// Default number of turns kept, user and assistant counted together.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// What the surrounding UI should present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    General,
    Calculator,
}

/// State owned by one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub mode: Mode,
    history: VecDeque<Message>,
    history_limit: usize,
    pub calculator: CalculatorInput,
}

impl SessionState {
    /// Create an empty state. A zero limit is raised to one.
    pub fn new(history_limit: usize) -> Self {
        Self {
            mode: Mode::General,
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            calculator: CalculatorInput::default(),
        }
    }

    /// Append a turn, evicting the oldest turns past the limit.
    pub fn push(&mut self, message: Message) {
        self.history.push_back(message);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = &Message> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Leave the guided estimator.
    pub fn reset_calculator(&mut self) {
        self.mode = Mode::General;
        self.calculator.reset();
    }

    /// Back to a fresh session. Idempotent.
    pub fn clear(&mut self) {
        self.history.clear();
        self.reset_calculator();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
