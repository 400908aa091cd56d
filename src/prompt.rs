//! Yes/no confirmation gate.
//!
//! The release pipeline stops at three checkpoints to ask the user a
//! question: accepting a missing manifest, confirming the resolved version,
//! and approving a tag overwrite. The [Confirm] trait keeps those checkpoints
//! testable; [TerminalPrompt] is the real stdin-backed implementation and
//! [ScriptedConfirm] answers from a queue in tests.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::error::Result;

/// Presents a yes/no question and returns the answer.
pub trait Confirm: Send + Sync {
    /// Ask `question`, returning `default` when the user just presses Enter.
    fn ask(&self, question: &str, default: bool) -> Result<bool>;
}

/// Interactive prompt reading the answer from stdin.
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn ask(&self, question: &str, default: bool) -> Result<bool> {
        let suffix = if default { "(Y/n)" } else { "(y/N)" };
        print!("\n{} {}: ", question, suffix);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let response = input.trim().to_lowercase();
        if response.is_empty() {
            return Ok(default);
        }
        Ok(response == "y" || response == "yes")
    }
}

/// Scripted confirmation gate for tests.
///
/// Answers are popped from a queue; once exhausted, `fallback` is returned.
/// Every question asked is recorded for assertions.
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    questions: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    /// Gate answering every question with `answer`
    pub fn always(answer: bool) -> Self {
        ScriptedConfirm {
            answers: Mutex::new(VecDeque::new()),
            fallback: answer,
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Gate answering from `answers` in order, then `fallback`
    pub fn with_answers(answers: Vec<bool>, fallback: bool) -> Self {
        ScriptedConfirm {
            answers: Mutex::new(answers.into()),
            fallback,
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn ask(&self, question: &str, _default: bool) -> Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback))
    }
}
