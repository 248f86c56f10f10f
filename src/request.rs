//! Request Payload Builder (spec component F): turns an [`AgentOptions`]
//! and a conversation history into the `AnthropicRequest` body POSTed to
//! `/v1/messages`.
//!
//! Grounded on the teacher's request-assembly code in `client.rs` (which
//! built an `OpenAIRequest` from `AgentOptions` + history in the same
//! shape), generalized to Anthropic's `system`-as-top-level-field and
//! `input_schema`-named tool shape.

use crate::types::wire::{AnthropicRequest, WireContentBlock, WireImageSource, WireMessage, WireThinking, WireTool};
use crate::types::{AgentOptions, ContentBlock, Message, MessageRole};

/// Builds the outbound request body for one streaming call.
///
/// System messages are pulled out of `history` into the top-level
/// `system` field (concatenated with `\n\n` if more than one is present,
/// alongside `options.system_prompt()` if set); `ToolResult`-role
/// messages serialize as `user`-role content per Anthropic's convention
/// for returning tool output.
pub fn build_request(options: &AgentOptions, history: &[Message]) -> AnthropicRequest {
    let mut system_parts = Vec::new();
    if !options.system_prompt().is_empty() {
        system_parts.push(options.system_prompt().to_string());
    }

    let mut messages = Vec::with_capacity(history.len());
    for message in history {
        if message.role == MessageRole::System {
            for block in &message.content {
                if let ContentBlock::Text(text) = block {
                    system_parts.push(text.text.clone());
                }
            }
            continue;
        }
        messages.push(WireMessage {
            role: wire_role(&message.role),
            content: message.content.iter().map(wire_content_block).collect(),
        });
    }

    let system = if system_parts.is_empty() { None } else { Some(system_parts.join("\n\n")) };

    let tools = if options.tools().is_empty() {
        None
    } else {
        Some(
            options
                .tools()
                .iter()
                .map(|t| WireTool {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    input_schema: t.input_schema().clone(),
                })
                .collect(),
        )
    };

    let thinking = options.thinking().and_then(|t| {
        t.enabled.then_some(WireThinking {
            kind: "enabled",
            budget_tokens: t.budget_tokens,
        })
    });

    AnthropicRequest {
        model: options.model().to_string(),
        max_tokens: options.max_tokens(),
        messages,
        system,
        temperature: Some(options.temperature()),
        top_p: options.top_p(),
        tools,
        thinking,
        stream: true,
    }
}

fn wire_role(role: &MessageRole) -> &'static str {
    match role {
        MessageRole::User | MessageRole::ToolResult => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "user", // unreachable: system messages are filtered out above
    }
}

fn wire_content_block(block: &ContentBlock) -> WireContentBlock {
    match block {
        ContentBlock::Text(text) => WireContentBlock::Text { text: text.text.clone() },
        ContentBlock::Image(image) => WireContentBlock::Image { source: wire_image_source(image) },
        ContentBlock::ToolUse(tool_use) => WireContentBlock::ToolUse {
            id: tool_use.id.clone(),
            name: tool_use.name.clone(),
            input: tool_use.input.clone(),
        },
        ContentBlock::ToolResult(result) => WireContentBlock::ToolResult {
            tool_use_id: result.tool_use_id.clone(),
            content: stringify_content(&result.content),
            is_error: result.is_error,
        },
        ContentBlock::Thinking(thinking) => WireContentBlock::Thinking {
            thinking: thinking.text.clone(),
            signature: thinking.signature.clone(),
        },
    }
}

fn stringify_content(value: &serde_json::Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

fn wire_image_source(image: &crate::types::ImageBlock) -> WireImageSource {
    let url = image.url();
    if let Some(rest) = url.strip_prefix("data:") {
        if let Some((mime_and_b64, data)) = rest.split_once(',') {
            let media_type = mime_and_b64.trim_end_matches(";base64").to_string();
            return WireImageSource::Base64 {
                media_type,
                data: data.to_string(),
            };
        }
    }
    WireImageSource::Url { url: url.to_string() }
}
