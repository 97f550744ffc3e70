use crate::error::{Result, UnarchiveError};
use crate::scanner::ArchiveFile;
use crate::selection::Confirm;
use console::Term;

/// Asks yes/no questions on the terminal. Anything other than `y` or
/// `yes` counts as no, including an empty answer at end of input.
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub fn ask(&self, question: &str) -> Result<bool> {
        let to_prompt_error = |e: std::io::Error| UnarchiveError::Prompt {
            message: e.to_string(),
        };

        self.term
            .write_str(&format!("{} [y/N] ", question))
            .map_err(to_prompt_error)?;
        let answer = self.term.read_line().map_err(to_prompt_error)?;

        Ok(parse_answer(&answer))
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm for TerminalPrompt {
    fn confirm(&mut self, archive: &ArchiveFile) -> Result<bool> {
        self.ask(&format!("Extract {}?", archive.name))
    }
}

pub fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
