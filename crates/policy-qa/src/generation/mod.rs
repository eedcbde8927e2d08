//! Answer generation

mod answer;
mod prompt;

pub use answer::Answerer;
pub use prompt::PromptBuilder;
