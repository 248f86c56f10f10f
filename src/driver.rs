//! Tool Driver (spec component E): executes the tool calls one streaming
//! hop accumulated, appends the resulting messages to history in the
//! order the next request needs them, and hands control back so the
//! caller can open the next hop.
//!
//! Grounded on the teacher's `Client::auto_execute_loop`/
//! `execute_tool_internal` (sequential invocation, hook dispatch around
//! each call, results folded back into history) in `client.rs`, adapted
//! from OpenAI's flat tool-call list to Anthropic's
//! `AssistantMessage` + `ToolResultMessage` pairing.

use crate::hooks::{PostToolUseEvent, PreToolUseEvent};
use crate::state::StreamState;
use crate::types::{AgentOptions, ContentBlock, Message, TextBlock, ThinkingBlock, ToolResultBlock, ToolUseBlock};
use crate::Error;

/// Invokes every tool call from one hop, in the order the model opened
/// their content blocks, appends the `AssistantMessage` /
/// `ToolResultMessage` pair to `history`, and returns the results so the
/// caller can surface them on a `tool_results` chunk (spec.md §4.E step 6).
///
/// A tool call naming a tool not in `options.tools()`, or whose handler
/// returns `Err`, aborts the whole call immediately — there is no
/// per-tool error recovery, matching spec.md §4.E.
pub async fn run_tool_calls(
    options: &AgentOptions,
    history: &mut Vec<Message>,
    state: &StreamState,
    tool_calls: Vec<ToolUseBlock>,
) -> crate::Result<Vec<ToolResultBlock>> {
    let history_snapshot: Vec<serde_json::Value> = history.iter().map(|m| serde_json::to_value(m).unwrap_or_default()).collect();

    let mut results = Vec::with_capacity(tool_calls.len());
    for call in &tool_calls {
        let mut input = call.input.clone();

        if let Some(decision) = options
            .hooks()
            .execute_pre_tool_use(PreToolUseEvent::new(call.name.clone(), input.clone(), call.id.clone(), history_snapshot.clone()))
            .await
        {
            if let Some(modified) = decision.modified_input {
                input = modified;
            }
            if !decision.continue_execution {
                let reason = decision.reason.unwrap_or_else(|| "blocked by pre_tool_use hook".to_string());
                results.push(ToolResultBlock::error(call.id.clone(), serde_json::json!(reason)));
                continue;
            }
        }

        let tool = options
            .tools()
            .iter()
            .find(|t| t.name() == call.name)
            .ok_or_else(|| Error::tool(format!("no tool registered for name {:?}", call.name)))?;

        let output = tool.execute(input.clone()).await?;

        options
            .hooks()
            .execute_post_tool_use(PostToolUseEvent::new(
                call.name.clone(),
                input,
                call.id.clone(),
                output.clone(),
                history_snapshot.clone(),
            ))
            .await;

        results.push(ToolResultBlock::new(call.id.clone(), output));
    }

    let mut assistant_content = Vec::with_capacity(tool_calls.len() + 2);
    if !state.text.is_empty() {
        assistant_content.push(ContentBlock::Text(TextBlock::with_citations(state.text.clone(), state.citations.clone())));
    }
    if !state.thinking_text.is_empty() || state.thinking_signature.is_some() {
        assistant_content.push(ContentBlock::Thinking(ThinkingBlock {
            text: state.thinking_text.clone(),
            signature: state.thinking_signature.clone(),
        }));
    }
    assistant_content.extend(tool_calls.into_iter().map(ContentBlock::ToolUse));

    history.push(Message::assistant(assistant_content));
    history.push(Message::tool_result(results.clone()));

    Ok(results)
}
