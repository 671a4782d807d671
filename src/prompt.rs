use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};

/// Source of operator answers.
pub trait Prompter {
    fn input(&mut self, prompt: &str) -> Result<String>;

    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Reads answers from the controlling terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .context("Failed to read operator input")
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Failed to read operator confirmation")
    }
}

/// Strip the quotes a pasted path often carries.
pub fn clean_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().replace('"', ""))
}

/// Text shown for the frame transition point.
pub enum TransitionPoint {
    Frame(i64),
    Raw(String),
}

impl TransitionPoint {
    pub fn text(&self) -> String {
        match self {
            TransitionPoint::Frame(n) => format!("Frame Transition Point = {}", n),
            TransitionPoint::Raw(s) => s.clone(),
        }
    }
}

/// Ask until the operator gives a number or confirms a non-numeric value.
pub fn ask_transition_point(prompter: &mut impl Prompter) -> Result<TransitionPoint> {
    loop {
        let raw = prompter.input("Input a number for the Frame Transition Point")?;
        let value = raw.trim();
        if let Ok(n) = value.parse::<i64>() {
            return Ok(TransitionPoint::Frame(n));
        }
        if prompter.confirm(&format!(
            "You did not input a number. Did you want to add: {}?",
            value
        ))? {
            return Ok(TransitionPoint::Raw(value.to_string()));
        }
    }
}

#[cfg(test)]
pub mod scripted {
    use std::collections::VecDeque;

    use anyhow::{Result, bail};

    use super::Prompter;

    /// Replays canned answers; confirmations accept "yes" or "y".
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                asked: Vec::new(),
            }
        }

        pub fn remaining(&self) -> usize {
            self.answers.len()
        }

        fn next(&mut self, prompt: &str) -> Result<String> {
            self.asked.push(prompt.to_string());
            match self.answers.pop_front() {
                Some(answer) => Ok(answer),
                None => bail!("No scripted answer for prompt: {}", prompt),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn input(&mut self, prompt: &str) -> Result<String> {
            self.next(prompt)
        }

        fn confirm(&mut self, prompt: &str) -> Result<bool> {
            let answer = self.next(prompt)?;
            Ok(matches!(answer.trim(), "yes" | "y"))
        }
    }
}
