pub mod output;
pub mod progress;
pub mod prompt;

pub use output::{OutputFormatter, OutputMode, ProgressAwareOutput};
pub use progress::ProgressManager;
pub use prompt::TerminalPrompt;
