//! "Draw this" prompt game: fetches a one-word subject from a remote model
//! and tracks the banner state shown over the canvas.

pub mod client;
pub mod game;

pub use client::{build_source, ChatCompletionsSource, PromptSource, ProxyPromptSource};
pub use game::{GameState, PromptGame};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt request failed: {0}")]
    Request(String),
    #[error("prompt service answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("prompt response was not valid JSON: {0}")]
    Malformed(String),
    #[error("prompt response did not contain a prompt")]
    MissingPrompt,
    #[error("environment variable {0} with the API key is not set")]
    MissingApiKey(String),
}
