/// OpenAI chat completions provider
pub mod openai;

pub use openai::OpenAiProvider;
