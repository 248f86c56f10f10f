//! Stream State (spec component C): the per-hop accumulators the Event
//! Dispatcher mutates as it walks one streamed response.
//!
//! Grounded on the teacher's `utils::ToolCallAggregator` (index-keyed
//! accumulation of partial tool-call JSON), generalized to the larger
//! field set an Anthropic-style turn needs: thinking text, its
//! signature, citations, and the request/model identifiers carried in
//! `message_start`.

use crate::types::{CitationPart, ToolUseBlock};
use std::collections::BTreeMap;

/// A tool call being assembled from `content_block_start`/`_delta`/`_stop`
/// events, keyed by content-block index so interleaved tool calls don't
/// corrupt one another's argument buffers.
#[derive(Debug, Default, Clone)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
    pub input_buffer: String,
    pub complete: bool,
}

/// Accumulated state for one assistant turn, from `message_start` through
/// `message_stop`.
///
/// Tool calls are stored in a `BTreeMap<u32, _>` keyed by content-block
/// index so finalization can walk them in index order, which (per
/// spec.md §9) is equivalent to the order Anthropic opens content blocks
/// in — content blocks are never reordered mid-stream.
#[derive(Debug, Default, Clone)]
pub struct StreamState {
    pub request_id: Option<String>,
    pub model: Option<String>,
    pub text: String,
    pub thinking_text: String,
    pub thinking_signature: Option<String>,
    pub citations: Vec<CitationPart>,
    pub tool_calls: BTreeMap<u32, PendingToolCall>,
    pub stop_reason: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins tracking a tool call at `index`, called from
    /// `content_block_start`.
    pub fn start_tool_call(&mut self, index: u32, id: String, name: String) {
        self.tool_calls.insert(
            index,
            PendingToolCall {
                id,
                name,
                input_buffer: String::new(),
                complete: false,
            },
        );
    }

    /// Appends a partial-JSON fragment to the tool call at `index`, called
    /// from `content_block_delta`'s `input_json_delta`.
    pub fn append_tool_input(&mut self, index: u32, fragment: &str) {
        if let Some(call) = self.tool_calls.get_mut(&index) {
            call.input_buffer.push_str(fragment);
        }
    }

    /// Marks the tool call at `index` complete, called from
    /// `content_block_stop`.
    pub fn finish_tool_call(&mut self, index: u32) {
        if let Some(call) = self.tool_calls.get_mut(&index) {
            call.complete = true;
        }
    }

    /// Finalizes every accumulated tool call in content-block-index order,
    /// parsing each argument buffer as JSON. Per spec.md §3, a tool call
    /// becomes final "on `content_block_stop` or when the turn ends" —
    /// `complete` only tracks whether `content_block_stop` was seen, and a
    /// call still missing it at finalization time (the §4.D safety net, for
    /// a body that ends without `message_stop`) is finalized anyway rather
    /// than dropped. A call whose buffer fails to parse is still surfaced,
    /// with an empty argument map substituted — degraded but surfaced.
    pub fn finalize_tool_calls(&self) -> Vec<ToolUseBlock> {
        self.tool_calls
            .values()
            .map(|call| {
                let input = if call.input_buffer.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    match serde_json::from_str(&call.input_buffer) {
                        Ok(v) => v,
                        Err(e) => {
                            log::warn!(
                                "tool call {} ({}) had unparseable input JSON, surfacing with empty arguments: {e}",
                                call.id,
                                call.name
                            );
                            serde_json::json!({})
                        }
                    }
                };
                ToolUseBlock::new(call.id.clone(), call.name.clone(), input)
            })
            .collect()
    }

    /// True once at least one tool call has been accumulated, whether or
    /// not it has seen its `content_block_stop` yet — spec.md §4.D's
    /// hand-off condition reads "at least one tool call accumulated," and
    /// the §4.E safety net must be able to fire on a stream truncated
    /// before any `content_block_stop`.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_single_tool_call() {
        let mut state = StreamState::new();
        state.start_tool_call(0, "call_1".to_string(), "search".to_string());
        state.append_tool_input(0, "{\"q\":");
        state.append_tool_input(0, "\"rust\"}");
        state.finish_tool_call(0);

        let calls = state.finalize_tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].input["q"], "rust");
    }

    #[test]
    fn interleaved_tool_calls_stay_independent() {
        let mut state = StreamState::new();
        state.start_tool_call(0, "call_1".to_string(), "search".to_string());
        state.start_tool_call(1, "call_2".to_string(), "calculate".to_string());
        state.append_tool_input(0, "{\"q\":\"a\"}");
        state.append_tool_input(1, "{\"expr\":\"1+1\"}");
        state.finish_tool_call(0);
        state.finish_tool_call(1);

        let calls = state.finalize_tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "search");
        assert_eq!(calls[1].name, "calculate");
    }

    #[test]
    fn incomplete_tool_call_is_still_finalized_for_the_truncated_stream_safety_net() {
        let mut state = StreamState::new();
        state.start_tool_call(0, "call_1".to_string(), "search".to_string());
        state.append_tool_input(0, "{\"q\":\"a\"}");
        // no finish_tool_call: the body ended before content_block_stop.

        assert!(state.has_tool_calls());
        let calls = state.finalize_tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input["q"], "a");
    }

    #[test]
    fn malformed_json_is_surfaced_with_empty_arguments() {
        let mut state = StreamState::new();
        state.start_tool_call(0, "call_1".to_string(), "search".to_string());
        state.append_tool_input(0, "not json");
        state.finish_tool_call(0);
        state.start_tool_call(1, "call_2".to_string(), "calculate".to_string());
        state.append_tool_input(1, "{}");
        state.finish_tool_call(1);

        let calls = state.finalize_tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].input, serde_json::json!({}));
        assert_eq!(calls[1].id, "call_2");
    }

    #[test]
    fn empty_input_buffer_defaults_to_empty_object() {
        let mut state = StreamState::new();
        state.start_tool_call(0, "call_1".to_string(), "noop".to_string());
        state.finish_tool_call(0);

        let calls = state.finalize_tool_calls();
        assert_eq!(calls[0].input, serde_json::json!({}));
    }
}
