//! # prism-stream
//!
//! A streaming-first Rust core for orchestrating tool-use conversations
//! against Anthropic's Messages API.
//!
//! ## Overview
//!
//! This crate provides the plumbing underneath an agent built on Anthropic's
//! streaming `/v1/messages` endpoint:
//!
//! - Parses the two-line SSE grammar into typed stream events
//! - Dispatches those events into a unified [`Chunk`] stream (text, thinking,
//!   citations, finish reasons, rate limits)
//! - Detects a `tool_use` hand-off, runs the registered tools, and re-opens
//!   the next streaming hop automatically up to a configurable recursion bound
//! - Exposes lifecycle hooks to intercept or block tool calls and prompts
//!
//! ## Key Features
//!
//! - **Streaming Responses**: Real-time token-by-token streaming via SSE
//! - **Tool Calling**: Define and execute tools with automatic schema generation
//! - **Recursive Tool-Use**: Bounded, automatic multi-step tool chains
//! - **Lifecycle Hooks**: Intercept and control execution at key points
//! - **Interrupts**: Gracefully cancel long-running operations
//! - **Context Management**: Manual token estimation and history truncation
//! - **Retry Logic**: Exponential backoff with jitter, honoring `retry-after`
//!
//! ## Two Interaction Modes
//!
//! ### 1. Simple Query Function (`query()`)
//! For single-turn interactions without conversation state:
//!
//! ```rust,no_run
//! use prism_stream::{query, AgentOptions};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = AgentOptions::builder()
//!         .system_prompt("You are a helpful assistant")
//!         .model("claude-3-5-sonnet-20241022")
//!         .api_key("sk-ant-...")
//!         .build()?;
//!
//!     let mut stream = query("What's the capital of France?", &options).await?;
//!
//!     while let Some(chunk) = stream.next().await {
//!         if let Some(text) = chunk?.text {
//!             print!("{text}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### 2. Client Object (`Client`)
//! For multi-turn conversations with persistent state:
//!
//! ```rust,no_run
//! use prism_stream::{Client, AgentOptions};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = AgentOptions::builder()
//!         .system_prompt("You are a helpful assistant")
//!         .model("claude-3-5-sonnet-20241022")
//!         .api_key("sk-ant-...")
//!         .build()?;
//!
//!     let mut client = Client::new(options)?;
//!
//!     let mut stream = client.send("What's 2+2?").await?;
//!     while let Some(chunk) = stream.next().await {
//!         if let Some(text) = chunk?.text {
//!             print!("{text}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is organized into several modules, each with a specific responsibility:
//!
//! - **client**: Streaming query engine, multi-turn `Client`, and hop/hand-off orchestration
//! - **sse**: Server-Sent Events framing and typed event parsing
//! - **state**: Accumulates one hop's streaming deltas into a coherent message
//! - **dispatcher**: Maps stream events onto the public `Chunk` sequence
//! - **request**: Builds the outbound `/v1/messages` request body
//! - **driver**: Executes tool calls and folds results back into history
//! - **ratelimit**: Parses `anthropic-ratelimit-*` response headers
//! - **types**: Data structures for messages, content blocks, and configuration
//! - **tools**: Tool definition system with automatic JSON schema generation
//! - **hooks**: Lifecycle event system for intercepting execution
//! - **config**: Endpoint/API-key resolution helpers
//! - **error**: Comprehensive error types and conversions
//! - **context**: Token estimation and message truncation utilities
//! - **retry**: Exponential backoff retry logic with jitter

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
// These modules are private (internal implementation details) unless explicitly
// re-exported through `pub use` statements below.

/// Core client implementation providing streaming queries and stateful conversations.
/// Contains the `query()` function for single-turn queries and `Client` struct
/// for multi-turn conversations with automatic tool-use hand-off.
mod client;

/// Endpoint and API-key resolution helpers.
/// Simplifies `ANTHROPIC_BASE_URL`/`ANTHROPIC_API_KEY` resolution with
/// environment-variable-overrides-fallback semantics.
pub mod config;

/// Context window management utilities for token estimation and history truncation.
/// Provides manual control over conversation memory to prevent context overflow.
mod context;

/// Streaming state accumulator: folds one hop's delta events into text,
/// thinking, citations, and in-progress tool call buffers.
mod state;

/// Event Dispatcher: maps `AnthropicStreamEvent`s onto the public `Chunk`
/// sequence and signals tool-use hand-off.
mod dispatcher;

/// Bounded recursive Tool Driver: invokes tool calls accumulated from one
/// hop, running lifecycle hooks around each, and folds results back into
/// history in the order the next request needs them.
mod driver;

/// Request Payload Builder: assembles the `/v1/messages` request body from
/// `AgentOptions` and conversation history.
mod request;

/// Server-Sent Events framing and typed stream-event parsing.
mod sse;

/// Rate-Limit Header Parser: groups `anthropic-ratelimit-*` headers by
/// resource and reads the `retry-after` hint.
mod ratelimit;

/// Error types and conversions for comprehensive error handling throughout the crate.
/// Defines the `Error` enum and `Result<T>` type alias used across all public APIs.
mod error;

/// Lifecycle hooks system for intercepting and controlling execution at key points.
/// Enables security gates, audit logging, input/output modification, and compliance checks.
mod hooks;

/// Tool definition and execution system with automatic JSON schema generation.
/// Allows the model to call Rust functions with type-safe parameter handling.
mod tools;

/// Core type definitions for messages, content blocks, and agent configuration.
/// Includes builder patterns for ergonomic configuration and wire serialization.
mod types;

// ============================================================================
// PUBLIC EXPORTS
// ============================================================================
// These items form the public API of the crate. Everything else is internal.

/// Retry utilities with exponential backoff and jitter.
/// Made public as a module so users can access retry configuration and functions
/// for their own operations that need retry logic.
pub mod retry;

// --- Core Client API ---

pub use client::{Client, ContentStream, query};

// --- Context Management ---

pub use context::{estimate_tokens, is_approaching_limit, truncate_messages};

// --- Error Handling ---

pub use error::{Error, Result};

// --- Lifecycle Hooks ---

pub use hooks::{
    HOOK_POST_TOOL_USE, HOOK_PRE_TOOL_USE, HOOK_USER_PROMPT_SUBMIT, HookDecision, Hooks,
    PostToolUseEvent, PreToolUseEvent, UserPromptSubmitEvent,
};

// --- Tool System ---

pub use tools::{Tool, ToolBuilder, tool};

// --- Core Types ---

pub use types::{
    AdditionalContent, AgentOptions, AgentOptionsBuilder, BaseUrl, Chunk, ChunkKind, ChunkMeta,
    CitationPart, ContentBlock, FinishReason, ImageBlock, ImageDetail, Message, MessageRole,
    ModelName, ProviderRateLimit, TextBlock, Temperature, ThinkingBlock, ThinkingConfig,
    ToolResultBlock, ToolUseBlock,
};

// ============================================================================
// CONVENIENCE PRELUDE
// ============================================================================

/// Convenience module containing the most commonly used types and functions.
/// Import with `use prism_stream::prelude::*;` to get everything you need for typical usage.
///
/// This includes:
/// - Configuration: AgentOptions, AgentOptionsBuilder
/// - Client: Client, query()
/// - Content: ContentBlock, TextBlock, ToolUseBlock, Chunk
/// - Tools: Tool, tool()
/// - Hooks: Hooks, HookDecision, hook event types
/// - Errors: Error, Result
pub mod prelude {
    pub use crate::{
        AgentOptions, AgentOptionsBuilder, Chunk, Client, ContentBlock, Error, HookDecision,
        Hooks, PostToolUseEvent, PreToolUseEvent, Result, TextBlock, Tool, ToolUseBlock,
        UserPromptSubmitEvent, query, tool,
    };
}
