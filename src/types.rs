//! Core type definitions for the streaming tool-use orchestration core.
//!
//! This module is organized into three groups:
//!
//! # Agent configuration
//!
//! - [`AgentOptions`] / [`AgentOptionsBuilder`]: model, endpoint, and
//!   sampling configuration, constructed with validation.
//!
//! # Conversation model
//!
//! - [`Message`] / [`MessageRole`] / [`ContentBlock`] and its variants
//!   (`TextBlock`, `ImageBlock`, `ToolUseBlock`, `ToolResultBlock`,
//!   `ThinkingBlock`), plus [`CitationPart`].
//! - [`Chunk`]: the unified downstream item the streaming pipeline yields.
//!
//! # Anthropic wire format
//!
//! The `wire` submodule holds the request/response JSON shapes exchanged
//! with the Messages API. These are kept separate from the conversation
//! model above so the public API never leaks provider wire details.
//!
//! # Example
//!
//! ```no_run
//! use prism_stream::{AgentOptions, Message};
//!
//! let options = AgentOptions::builder()
//!     .model("claude-3-5-sonnet-20241022")
//!     .api_key("sk-ant-...")
//!     .system_prompt("You are a helpful assistant")
//!     .max_steps(4)
//!     .build()
//!     .expect("valid configuration");
//!
//! let msg = Message::user("Hello, how are you?");
//! ```

use crate::Error;
use crate::hooks::Hooks;
use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// NEWTYPE WRAPPERS FOR COMPILE-TIME TYPE SAFETY
// ============================================================================

/// Validated model name.
///
/// # Example
///
/// ```
/// use prism_stream::ModelName;
///
/// let model = ModelName::new("claude-3-5-sonnet-20241022").unwrap();
/// assert_eq!(model.as_str(), "claude-3-5-sonnet-20241022");
///
/// assert!(ModelName::new("").is_err());
/// assert!(ModelName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName(String);

impl ModelName {
    /// Creates a new `ModelName` after validation.
    pub fn new(name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_input("model name cannot be empty or whitespace"));
        }
        Ok(ModelName(name))
    }

    /// Returns the model name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ModelName` and returns the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated base URL; must start with `http://` or `https://`.
///
/// # Example
///
/// ```
/// use prism_stream::BaseUrl;
///
/// let url = BaseUrl::new("https://api.anthropic.com").unwrap();
/// assert_eq!(url.as_str(), "https://api.anthropic.com");
///
/// assert!(BaseUrl::new("api.anthropic.com").is_err());
/// assert!(BaseUrl::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new `BaseUrl` after validation.
    pub fn new(url: impl Into<String>) -> crate::Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::invalid_input("base_url cannot be empty"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::invalid_input("base_url must start with http:// or https://"));
        }
        Ok(BaseUrl(url))
    }

    /// Returns the base URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `BaseUrl` and returns the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated sampling temperature, 0.0 to 1.0 (Anthropic's accepted range).
///
/// # Example
///
/// ```
/// use prism_stream::Temperature;
///
/// let t = Temperature::new(0.7).unwrap();
/// assert_eq!(t.value(), 0.7);
///
/// assert!(Temperature::new(1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature(f32);

impl Temperature {
    /// Creates a new `Temperature` after validating it falls in `0.0..=1.0`.
    pub fn new(value: f32) -> crate::Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::invalid_input("temperature must be between 0.0 and 1.0"));
        }
        Ok(Temperature(value))
    }

    /// Returns the temperature value.
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// AGENT CONFIGURATION
// ============================================================================

/// Extended thinking configuration.
///
/// `budget_tokens` bounds how many tokens the model may spend in its
/// thinking block before it must produce visible output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinkingConfig {
    pub enabled: bool,
    pub budget_tokens: u32,
}

impl Default for ThinkingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            budget_tokens: 1024,
        }
    }
}

/// Configuration options for a streaming Messages API session.
///
/// Should be constructed via [`AgentOptions::builder()`] rather than
/// direct instantiation, so required fields get validated.
///
/// # Thread Safety
///
/// Tools are wrapped in `Arc<Tool>` for cheap cloning and sharing.
///
/// # Examples
///
/// ```no_run
/// use prism_stream::AgentOptions;
///
/// let options = AgentOptions::builder()
///     .model("claude-3-5-sonnet-20241022")
///     .api_key("sk-ant-...")
///     .system_prompt("You are a helpful coding assistant")
///     .max_steps(4)
///     .temperature(0.7)
///     .build()
///     .expect("valid configuration");
/// ```
#[derive(Clone)]
pub struct AgentOptions {
    system_prompt: String,
    model: String,
    base_url: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    top_p: Option<f32>,
    timeout: u64,
    tools: Vec<Arc<Tool>>,
    max_steps: u32,
    thinking: Option<ThinkingConfig>,
    hooks: Hooks,
}

/// Custom Debug implementation that masks the API key and collapses the
/// tool list to a count, the same rationale as the teacher's `AgentOptions`.
impl std::fmt::Debug for AgentOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentOptions")
            .field("system_prompt", &self.system_prompt)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout", &self.timeout)
            .field("tools", &format!("{} tools", self.tools.len()))
            .field("max_steps", &self.max_steps)
            .field("thinking", &self.thinking)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            // Empty string forces users to explicitly set a model
            model: String::new(),
            base_url: "https://api.anthropic.com".to_string(),
            // Empty string forces users to explicitly set an API key
            api_key: String::new(),
            max_tokens: 4096,
            temperature: 1.0,
            top_p: None,
            timeout: 60,
            tools: Vec::new(),
            // A single hop by default; callers opt into multi-step tool chains
            max_steps: 1,
            thinking: None,
            hooks: Hooks::new(),
        }
    }
}

impl AgentOptions {
    /// Creates a new builder for constructing [`AgentOptions`].
    pub fn builder() -> AgentOptionsBuilder {
        AgentOptionsBuilder::default()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> Option<f32> {
        self.top_p
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn tools(&self) -> &[Arc<Tool>] {
        &self.tools
    }

    /// Maximum recursive tool-call hand-offs the Tool Driver will perform
    /// for a single `query`/`send` call before returning `MaxStepsExceeded`.
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn thinking(&self) -> Option<ThinkingConfig> {
        self.thinking
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }
}

/// Builder for [`AgentOptions`] with validation at `build()`.
///
/// # Required Fields
///
/// - `model`
/// - `api_key`
#[derive(Default)]
pub struct AgentOptionsBuilder {
    system_prompt: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    timeout: Option<u64>,
    tools: Vec<Arc<Tool>>,
    max_steps: Option<u32>,
    thinking: Option<ThinkingConfig>,
    hooks: Hooks,
}

impl std::fmt::Debug for AgentOptionsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentOptionsBuilder")
            .field("system_prompt", &self.system_prompt)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("tools", &format!("{} tools", self.tools.len()))
            .finish()
    }
}

impl AgentOptionsBuilder {
    /// Sets the system prompt sent as the top-level `system` field.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the model identifier (required).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the API base URL. Defaults to `https://api.anthropic.com`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the `x-api-key` value (required).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the maximum tokens to generate. Defaults to 4096.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Sets the sampling temperature, 0.0 to 1.0. Defaults to 1.0.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Sets nucleus sampling `top_p`. Unset by default (provider chooses).
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the HTTP request timeout in seconds. Defaults to 60.
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of recursive tool-call hand-offs the Tool
    /// Driver will perform before returning `MaxStepsExceeded`. Defaults to 1.
    pub fn max_steps(mut self, steps: u32) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Enables extended thinking with the given token budget.
    pub fn thinking(mut self, budget_tokens: u32) -> Self {
        self.thinking = Some(ThinkingConfig {
            enabled: true,
            budget_tokens,
        });
        self
    }

    /// Adds a single tool to the available tool set.
    pub fn tool(mut self, tool: Tool) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Adds multiple tools at once.
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools.extend(tools.into_iter().map(Arc::new));
        self
    }

    /// Sets lifecycle hooks.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Validates configuration and builds the final [`AgentOptions`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `model` or `api_key` is missing, and
    /// `Error::InvalidInput` if a present field fails validation.
    pub fn build(self) -> crate::Result<AgentOptions> {
        let model = self.model.ok_or_else(|| Error::config("model is required"))?;
        let api_key = self.api_key.ok_or_else(|| Error::config("api_key is required"))?;

        if model.trim().is_empty() {
            return Err(Error::invalid_input("model cannot be empty or whitespace"));
        }

        let base_url = self.base_url.unwrap_or_else(|| "https://api.anthropic.com".to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::invalid_input("base_url must start with http:// or https://"));
        }

        let temperature = self.temperature.unwrap_or(1.0);
        if !(0.0..=1.0).contains(&temperature) {
            return Err(Error::invalid_input("temperature must be between 0.0 and 1.0"));
        }

        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(Error::invalid_input("top_p must be between 0.0 and 1.0"));
        }

        let max_tokens = self.max_tokens.unwrap_or(4096);
        if max_tokens == 0 {
            return Err(Error::invalid_input("max_tokens must be greater than 0"));
        }

        let max_steps = self.max_steps.unwrap_or(1);
        if max_steps == 0 {
            return Err(Error::invalid_input("max_steps must be greater than 0"));
        }

        Ok(AgentOptions {
            system_prompt: self.system_prompt.unwrap_or_default(),
            model,
            base_url,
            api_key,
            max_tokens,
            temperature,
            top_p: self.top_p,
            timeout: self.timeout.unwrap_or(60),
            tools: self.tools,
            max_steps,
            thinking: self.thinking,
            hooks: self.hooks,
        })
    }
}

// ============================================================================
// MESSAGE SYSTEM
// ============================================================================

/// Identifies the sender/role of a message in the conversation.
///
/// Serializes to lowercase strings, with `ToolResult` serializing as
/// `"tool_result"` for readability at rest; the request builder maps it
/// onto the wire role `"user"` the way Anthropic's API expects tool
/// results to travel back as user-role content blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    ToolResult,
}

/// Multi-modal content blocks that can appear in a [`Message`].
///
/// Externally tagged with a `"type"` field, e.g.
/// `{"type": "tool_use", "id": "...", "name": "...", "input": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text(TextBlock),
    Image(ImageBlock),
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
    Thinking(ThinkingBlock),
}

/// Plain text content, optionally carrying the citation parts the model
/// attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<CitationPart>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(text: impl Into<String>, citations: Vec<CitationPart>) -> Self {
        Self {
            text: text.into(),
            citations,
        }
    }
}

/// Extended-thinking content the model produced before its visible reply.
///
/// `signature` is an opaque provider-issued token that must be echoed back
/// verbatim if the thinking block is replayed into a later request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingBlock {
    pub text: String,
    pub signature: Option<String>,
}

/// A request from the model to execute a registered tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

impl ToolUseBlock {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// A tool's output, sent back to the model keyed by `tool_use_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResultBlock {
    pub fn new(tool_use_id: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content,
            is_error: false,
        }
    }

    /// Marks this result as a tool execution failure.
    pub fn error(tool_use_id: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content,
            is_error: true,
        }
    }
}

/// Image detail level for vision-capable models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    #[default]
    Auto,
}

impl std::fmt::Display for ImageDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageDetail::Low => write!(f, "low"),
            ImageDetail::High => write!(f, "high"),
            ImageDetail::Auto => write!(f, "auto"),
        }
    }
}

/// Image content, from either a URL or a base64 data URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBlock {
    url: String,
    #[serde(default)]
    detail: ImageDetail,
}

impl ImageBlock {
    /// Creates an image block from an HTTP(S) or `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the URL is empty, uses an
    /// unsupported scheme, or is a malformed `data:` URI.
    pub fn from_url(url: impl Into<String>) -> crate::Result<Self> {
        let url = url.into();

        if url.is_empty() {
            return Err(Error::invalid_input("image URL cannot be empty"));
        }

        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(Self {
                url,
                detail: ImageDetail::default(),
            })
        } else if let Some(mime_part) = url.strip_prefix("data:") {
            if !url.contains(";base64,") {
                return Err(Error::invalid_input(
                    "data URI must be in format: data:image/TYPE;base64,DATA",
                ));
            }
            let Some(semicolon_pos) = mime_part.find(';') else {
                return Err(Error::invalid_input("malformed data URI: missing MIME type"));
            };
            let mime_type = &mime_part[..semicolon_pos];
            if mime_type.is_empty() || !mime_type.starts_with("image/") {
                return Err(Error::invalid_input("data URI MIME type must start with 'image/'"));
            }
            Ok(Self {
                url,
                detail: ImageDetail::default(),
            })
        } else {
            Err(Error::invalid_input("image URL must start with http://, https://, or data:"))
        }
    }

    /// Creates an image block from base64-encoded data and its MIME type.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the data or MIME type is empty, or
    /// the MIME type does not start with `image/`.
    pub fn from_base64(base64_data: impl AsRef<str>, mime_type: impl AsRef<str>) -> crate::Result<Self> {
        let data = base64_data.as_ref();
        let mime = mime_type.as_ref();

        if data.is_empty() {
            return Err(Error::invalid_input("base64 image data cannot be empty"));
        }
        if mime.is_empty() {
            return Err(Error::invalid_input("MIME type cannot be empty"));
        }
        if !mime.starts_with("image/") {
            return Err(Error::invalid_input("MIME type must start with 'image/'"));
        }

        Ok(Self {
            url: format!("data:{mime};base64,{data}"),
            detail: ImageDetail::default(),
        })
    }

    pub fn with_detail(mut self, detail: ImageDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn detail(&self) -> ImageDetail {
        self.detail
    }
}

/// A citation the model attached to a text delta, tagged by its
/// positional signature.
///
/// Any of the three shapes a provider citation can take in practice;
/// `cited_text` and the positional fields are the load-bearing ones,
/// `document_index`/`document_title` are carried through when present
/// but not required for any crate behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CitationPart {
    PageLocation {
        cited_text: String,
        #[serde(default)]
        document_index: Option<u32>,
        #[serde(default)]
        document_title: Option<String>,
        start_page_number: u32,
        end_page_number: u32,
    },
    CharLocation {
        cited_text: String,
        #[serde(default)]
        document_index: Option<u32>,
        #[serde(default)]
        document_title: Option<String>,
        start_char_index: u32,
        end_char_index: u32,
    },
    ContentBlockLocation {
        cited_text: String,
        #[serde(default)]
        document_index: Option<u32>,
        #[serde(default)]
        document_title: Option<String>,
        start_block_index: u32,
        end_block_index: u32,
    },
}

/// A complete message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn new(role: MessageRole, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// Creates a user message with simple text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::Text(TextBlock::new(text))],
        }
    }

    /// Creates an assistant message from the content blocks a completed
    /// turn produced (text, tool use, thinking, in model order).
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
        }
    }

    /// Creates a system message. Note the Request Payload Builder sends
    /// this as the top-level `system` string field, not as a `messages`
    /// entry.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: vec![ContentBlock::Text(TextBlock::new(text))],
        }
    }

    /// Creates a tool-result message from one or more completed tool
    /// results, to be appended after the assistant's tool-use turn.
    pub fn tool_result(results: Vec<ToolResultBlock>) -> Self {
        Self {
            role: MessageRole::ToolResult,
            content: results.into_iter().map(ContentBlock::ToolResult).collect(),
        }
    }

    /// Creates a user message with custom content blocks.
    pub fn user_with_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }

    /// Creates a user message with text and an image from a URL, using
    /// `ImageDetail::Auto`.
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> crate::Result<Self> {
        Self::user_with_image_detail(text, image_url, ImageDetail::Auto)
    }

    /// Creates a user message with text and an image at a given detail level.
    pub fn user_with_image_detail(
        text: impl Into<String>,
        image_url: impl Into<String>,
        detail: ImageDetail,
    ) -> crate::Result<Self> {
        let image = ImageBlock::from_url(image_url)?.with_detail(detail);
        Ok(Self {
            role: MessageRole::User,
            content: vec![ContentBlock::Text(TextBlock::new(text)), ContentBlock::Image(image)],
        })
    }

    /// Creates a user message with text and a base64-encoded image.
    pub fn user_with_base64_image(
        text: impl Into<String>,
        base64_data: impl AsRef<str>,
        mime_type: impl AsRef<str>,
    ) -> crate::Result<Self> {
        let image = ImageBlock::from_base64(base64_data, mime_type)?;
        Ok(Self {
            role: MessageRole::User,
            content: vec![ContentBlock::Text(TextBlock::new(text)), ContentBlock::Image(image)],
        })
    }
}

// ============================================================================
// DOWNSTREAM CHUNK
// ============================================================================

/// Normalized finish reason, mapped from the provider's `stop_reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    Other(String),
}

impl From<&str> for FinishReason {
    fn from(value: &str) -> Self {
        match value {
            "end_turn" | "stop_sequence" => FinishReason::Stop,
            "max_tokens" => FinishReason::Length,
            "tool_use" => FinishReason::ToolCalls,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// A parsed `anthropic-ratelimit-<field>-<resource>` record, plus the
/// `retry-after` hint is carried alongside on `Error::RateLimited` rather
/// than here since it isn't a per-resource field.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRateLimit {
    pub name: String,
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub resets_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Which part of the turn a [`Chunk`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Message,
    Thinking,
    Meta,
}

/// Request/response bookkeeping attached to a `Meta` chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkMeta {
    pub request_id: Option<String>,
    pub model: Option<String>,
    pub rate_limits: Vec<ProviderRateLimit>,
}

/// The catch-all bag for content that doesn't fit `text`/`finish_reason`/
/// `tool_calls`/`tool_results`: thinking signatures and citation parts.
#[derive(Debug, Clone, Default)]
pub struct AdditionalContent {
    pub thinking_signature: Option<String>,
    pub citation: Option<CitationPart>,
}

/// The unified item the streaming pipeline yields to callers.
///
/// Exactly one of `text`/`finish_reason`/`tool_calls`/`tool_results`/`meta`
/// is typically populated per chunk, matching which event produced it; see
/// `dispatcher::Dispatcher` for the mapping from `AnthropicStreamEvent` to
/// `Chunk`.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub kind: Option<ChunkKind>,
    pub text: Option<String>,
    pub finish_reason: Option<FinishReason>,
    pub tool_calls: Option<Vec<ToolUseBlock>>,
    pub tool_results: Option<Vec<ToolResultBlock>>,
    pub meta: Option<ChunkMeta>,
    pub additional_content: Option<AdditionalContent>,
}

pub mod wire;
