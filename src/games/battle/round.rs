//! One question on screen: countdown plus single-delivery answer guard.
//!
//! The countdown runs on the fixed game clock and shows whole seconds, one
//! second per `TICKS_PER_SEC` ticks. Whichever comes first, an answer or the
//! countdown reaching zero, produces the round's only [`AnswerOutcome`].
//! Every later event is ignored, so a timer firing after a click can never
//! apply a second transition.

use super::questions::QuizQuestion;
use super::state::{Difficulty, TICKS_PER_SEC};

/// The event handed to the battle state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerOutcome {
    pub question_id: String,
    pub difficulty: Difficulty,
    pub is_correct: bool,
    /// Whole seconds left when the answer landed (0 on timeout).
    pub time_remaining: u32,
    pub time_limit: u32,
    pub timed_out: bool,
}

#[derive(Clone, Debug)]
pub struct QuestionRound {
    pub question: QuizQuestion,
    elapsed_ticks: u32,
    selected: Option<usize>,
    resolved: bool,
}

impl QuestionRound {
    pub fn new(question: QuizQuestion) -> Self {
        Self {
            question,
            elapsed_ticks: 0,
            selected: None,
            resolved: false,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.question
            .time_limit
            .saturating_sub(self.elapsed_ticks / TICKS_PER_SEC)
    }

    /// Fraction of the time limit still left, for the countdown bar.
    pub fn remaining_ratio(&self) -> f64 {
        self.remaining_secs() as f64 / self.question.time_limit as f64
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// True once resolved with the correct option picked.
    pub fn answered_correctly(&self) -> bool {
        self.selected.is_some_and(|i| self.question.is_correct(i))
    }

    /// Player picks an option. Ignored once resolved or out of range.
    pub fn answer(&mut self, option: usize) -> Option<AnswerOutcome> {
        if self.resolved || option >= self.question.options.len() {
            return None;
        }
        self.resolved = true;
        self.selected = Some(option);
        Some(AnswerOutcome {
            question_id: self.question.id.clone(),
            difficulty: self.question.difficulty,
            is_correct: self.question.is_correct(option),
            time_remaining: self.remaining_secs(),
            time_limit: self.question.time_limit,
            timed_out: false,
        })
    }

    /// Advance the countdown. Yields the timeout outcome on the tick that
    /// reaches zero, and nothing afterwards.
    pub fn tick(&mut self, delta_ticks: u32) -> Option<AnswerOutcome> {
        if self.resolved {
            return None;
        }
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(delta_ticks);
        if self.remaining_secs() > 0 {
            return None;
        }
        self.resolved = true;
        Some(AnswerOutcome {
            question_id: self.question.id.clone(),
            difficulty: self.question.difficulty,
            is_correct: false,
            time_remaining: 0,
            time_limit: self.question.time_limit,
            timed_out: true,
        })
    }
}
