pub mod classify;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod types;

pub use classify::*;
pub use ollama::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Invalid model name: '{0}'")]
    InvalidModelName(String),
}
