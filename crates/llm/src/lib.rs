//! Chat-completions client for OpenAI-compatible providers.
//!
//! [`client::ChatCompletionsClient`] implements the core
//! [`LanguageModel`](microwins_core::generation::LanguageModel) contract, so
//! the generation pipeline can talk to Groq, OpenAI or any server exposing
//! `POST /chat/completions`.

pub mod client;
pub mod config;

pub use client::{ChatCompletionsClient, LlmApiError};
pub use config::LlmConfig;
