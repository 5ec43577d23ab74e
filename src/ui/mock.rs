//! Mock prompter for testing.
//!
//! `MockPrompter` records every prompt it is asked and answers from
//! pre-configured responses, falling back to the prompt's default.
//!
//! # Example
//!
//! ```
//! use kickstartds::ui::{MockPrompter, Prompt, PromptType, Prompter};
//!
//! let mut prompter = MockPrompter::new();
//! prompter.set_prompt_response("tokenPath", "/a/b");
//!
//! let prompt = Prompt {
//!     key: "tokenPath".to_string(),
//!     question: "Where are your tokens?".to_string(),
//!     prompt_type: PromptType::Input,
//!     default: None,
//! };
//! let answer = prompter.prompt(&prompt).unwrap();
//! assert_eq!(answer.as_string(), "/a/b");
//! assert_eq!(prompter.prompts_shown(), ["tokenPath".to_string()]);
//! ```

use std::collections::HashMap;

use crate::error::Result;

use super::{Prompt, PromptResult, Prompter};

/// Mock prompter for testing.
#[derive(Debug)]
pub struct MockPrompter {
    interactive: bool,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

impl Default for MockPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPrompter {
    /// Create an interactive mock with no configured responses.
    pub fn new() -> Self {
        Self {
            interactive: true,
            prompt_responses: HashMap::new(),
            prompts_shown: Vec::new(),
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Get all prompts that were shown (by key).
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }
}

impl Prompter for MockPrompter {
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let raw = self
            .prompt_responses
            .get(&prompt.key)
            .cloned()
            .or_else(|| prompt.default.clone())
            .unwrap_or_default();

        Ok(prompt.prompt_type.parse_answer(&raw))
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptType;

    fn prompt(key: &str, prompt_type: PromptType, default: Option<&str>) -> Prompt {
        Prompt {
            key: key.to_string(),
            question: "?".to_string(),
            prompt_type,
            default: default.map(String::from),
        }
    }

    #[test]
    fn falls_back_to_default() {
        let mut mock = MockPrompter::new();
        let answer = mock
            .prompt(&prompt("sdPath", PromptType::Input, Some("./sd")))
            .unwrap();
        assert_eq!(answer, PromptResult::String("./sd".into()));
    }

    #[test]
    fn confirm_parses_yes() {
        let mut mock = MockPrompter::new();
        mock.set_prompt_response("overwrite", "yes");
        let answer = mock
            .prompt(&prompt("overwrite", PromptType::Confirm, None))
            .unwrap();
        assert_eq!(answer, PromptResult::Bool(true));
    }

    #[test]
    fn multiselect_splits_on_commas() {
        let mut mock = MockPrompter::new();
        mock.set_prompt_response("components", "button,teaser");
        let answer = mock
            .prompt(&prompt(
                "components",
                PromptType::MultiSelect { options: vec![] },
                None,
            ))
            .unwrap();
        assert_eq!(
            answer,
            PromptResult::Strings(vec!["button".into(), "teaser".into()])
        );
    }
}
