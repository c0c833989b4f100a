//! # contract: the LLM provider seam
//!
//! This module defines the single trait ([`LlmProvider`]) through which the
//! pipeline talks to a hosted model, together with the plain request types
//! it takes.
//!
//! ## Interface & Extensibility
//! - Implement [`LlmProvider`] to plug in a new backend (OpenAI-compatible HTTP, local, test double).
//! - The trait is async and returns the raw message content; parsing and validation belong to the invoker.
//! - Providers map every transport/auth/quota failure to a [`ProviderError`].
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers get `MockLlmProvider` under `test` or
//!   the `test-export-mocks` feature.

use async_trait::async_trait;
use serde::Serialize;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::ProviderError;
use crate::prompts::AnalysisTask;

/// A named output schema the provider must enforce strictly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: serde_json::Value,
}

/// One chat-style request: system framing plus user instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Which analysis this request belongs to (for logging by implementors).
    pub task: AnalysisTask,
    pub system: String,
    pub user: String,
    pub temperature: f64,
    /// Present for structured tasks; `None` means free-text output.
    pub schema: Option<ResponseSchema>,
}

/// Trait for sending a completion request to a hosted model.
///
/// The trait is `Send` + `Sync` and intended for async/await usage.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the request and return the message content verbatim.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}
