//! Screen-level state for the console: menu, orders, tables, dashboard and
//! the navigation bar. Views own their collections and render to plain text.

pub mod dashboard;
pub mod menu;
pub mod menu_modal;
pub mod navbar;
pub mod orders;
pub mod tables;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One-shot message shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "✔ {}", self.message),
            NoticeLevel::Error => write!(f, "✖ {}", self.message),
        }
    }
}

/// Interaction surface used by views for confirmations and notices.
pub trait Prompt {
    /// Ask a yes/no question. `false` aborts the action.
    fn confirm(&mut self, question: &str) -> bool;

    fn notify(&mut self, notice: Notice);
}

#[cfg(test)]
pub(crate) mod test_prompt {
    use super::{Notice, Prompt};

    /// Scripted prompt: answers every confirmation with `answer` and keeps
    /// what it was asked and told.
    pub(crate) struct ScriptedPrompt {
        pub answer: bool,
        pub questions: Vec<String>,
        pub notices: Vec<Notice>,
    }

    impl ScriptedPrompt {
        pub fn answering(answer: bool) -> Self {
            Self {
                answer,
                questions: Vec::new(),
                notices: Vec::new(),
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn confirm(&mut self, question: &str) -> bool {
            self.questions.push(question.to_string());
            self.answer
        }

        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice);
        }
    }
}
