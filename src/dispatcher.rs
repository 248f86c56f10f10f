//! Event Dispatcher (spec component D): the state machine that turns one
//! [`AnthropicStreamEvent`] at a time into zero or more [`Chunk`]s,
//! mutating a [`StreamState`] along the way.
//!
//! Structurally grounded on
//! `other_examples/4f602e12_grafbase-nexus...anthropic-output.rs`'s
//! `AnthropicStreamProcessor::process_event` (one match arm per event
//! variant, stateful accumulation, forward-compatible fallthrough for
//! unrecognized sub-kinds); the citation-binding and thinking-delta
//! handling have no teacher precedent and are built directly from
//! spec.md §4.D.

use crate::error;
use crate::state::StreamState;
use crate::types::wire::{AnthropicStreamEvent, WireBlockDelta, WireContentBlockStart};
use crate::types::{AdditionalContent, Chunk, ChunkKind, ChunkMeta, FinishReason, ProviderRateLimit};

/// Drives one [`StreamState`] through a sequence of wire events, yielding
/// the [`Chunk`]s each event produces.
///
/// Callers must check [`Dispatcher::should_handoff`] after every
/// `dispatch` call: per spec.md §4.D, a `tool_use` stop reason with at
/// least one accumulated tool call means the rest of this hop's events
/// (if any remain) are not consumed here — the caller stops pulling
/// from the line reader and invokes the Tool Driver instead.
#[derive(Debug)]
pub struct Dispatcher {
    state: StreamState,
    rate_limits: Vec<ProviderRateLimit>,
    pending_citation: Option<crate::types::CitationPart>,
}

impl Dispatcher {
    /// `rate_limits` is the snapshot parsed from the HTTP response headers
    /// before streaming began (Component G); it rides along on the `Meta`
    /// chunk `message_start` produces and on the final chunk at stream end.
    pub fn new(rate_limits: Vec<ProviderRateLimit>) -> Self {
        Self {
            state: StreamState::new(),
            rate_limits,
            pending_citation: None,
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// True once the turn's stop reason is `tool_use` and at least one
    /// tool call has been accumulated — the hand-off condition spec.md
    /// §4.D names for both `message_delta` and `message_stop`.
    pub fn should_handoff(&self) -> bool {
        self.state.stop_reason.as_deref() == Some("tool_use") && self.state.has_tool_calls()
    }

    /// Processes one event and returns the chunks it produces. Returns
    /// `Err` only for an in-stream `error` event, classified via
    /// `error::classify_stream_error`.
    pub fn dispatch(&mut self, event: AnthropicStreamEvent) -> crate::Result<Vec<Chunk>> {
        match event {
            AnthropicStreamEvent::MessageStart { message } => {
                self.state.request_id = Some(message.id.clone());
                self.state.model = Some(message.model.clone());
                if let Some(usage) = message.usage {
                    self.state.input_tokens = usage.input_tokens;
                }
                Ok(vec![Chunk {
                    kind: Some(ChunkKind::Meta),
                    meta: Some(ChunkMeta {
                        request_id: Some(message.id),
                        model: Some(message.model),
                        rate_limits: self.rate_limits.clone(),
                    }),
                    ..Default::default()
                }])
            }

            AnthropicStreamEvent::ContentBlockStart { index, content_block } => {
                match content_block {
                    WireContentBlockStart::ToolUse { id, name, .. } => {
                        self.state.start_tool_call(index, id, name);
                    }
                    WireContentBlockStart::Text { text } => {
                        if !text.is_empty() {
                            self.state.text.push_str(&text);
                        }
                    }
                    WireContentBlockStart::Thinking { thinking } => {
                        self.state.thinking_text.clear();
                        self.state.thinking_signature = None;
                        if !thinking.is_empty() {
                            self.state.thinking_text.push_str(&thinking);
                        }
                    }
                    WireContentBlockStart::Unknown => {
                        log::warn!("unrecognized content_block_start kind at index {index}");
                    }
                }
                Ok(vec![])
            }

            AnthropicStreamEvent::ContentBlockDelta { index, delta } => self.dispatch_delta(index, delta),

            AnthropicStreamEvent::ContentBlockStop { index } => {
                self.state.finish_tool_call(index);
                // A pending citation not yet paired with a text_delta is
                // discarded at block close, per spec.md §9's citation-binding note.
                self.pending_citation = None;
                Ok(vec![])
            }

            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                if let Some(reason) = delta.stop_reason {
                    self.state.stop_reason = Some(reason);
                }
                if let Some(usage) = usage {
                    self.state.output_tokens = usage.output_tokens;
                }
                // No chunk here: a tool-use hand-off is signaled via
                // `should_handoff` for the caller to act on, and the
                // non-handoff finish reason rides on message_stop's
                // final chunk instead (spec.md §4.D's message_stop case).
                Ok(vec![])
            }

            AnthropicStreamEvent::MessageStop => Ok(self.message_stop_chunks()),

            AnthropicStreamEvent::Ping => Ok(vec![]),

            AnthropicStreamEvent::Error { error } => Err(error::classify_stream_error(&error.error_type, &error.message)),

            AnthropicStreamEvent::Unknown => {
                log::warn!("unrecognized stream event type");
                Ok(vec![])
            }
        }
    }

    fn dispatch_delta(&mut self, index: u32, delta: WireBlockDelta) -> crate::Result<Vec<Chunk>> {
        match delta {
            WireBlockDelta::TextDelta { text } => {
                self.state.text.push_str(&text);
                let additional_content = self.pending_citation.take().map(|citation| {
                    self.state.citations.push(citation.clone());
                    AdditionalContent {
                        thinking_signature: None,
                        citation: Some(citation),
                    }
                });
                Ok(vec![Chunk {
                    kind: Some(ChunkKind::Message),
                    text: Some(text),
                    additional_content,
                    ..Default::default()
                }])
            }
            WireBlockDelta::InputJsonDelta { partial_json } => {
                self.state.append_tool_input(index, &partial_json);
                Ok(vec![])
            }
            WireBlockDelta::ThinkingDelta { thinking } => {
                self.state.thinking_text.push_str(&thinking);
                Ok(vec![Chunk {
                    kind: Some(ChunkKind::Thinking),
                    text: Some(thinking),
                    ..Default::default()
                }])
            }
            WireBlockDelta::SignatureDelta { signature } => {
                self.state.thinking_signature = Some(signature);
                Ok(vec![])
            }
            WireBlockDelta::CitationsDelta { citation } => match serde_json::from_value(citation) {
                Ok(part) => {
                    // Bound to the *next* text_delta, not emitted here — see
                    // spec.md §9's citation-binding design note.
                    self.pending_citation = Some(part);
                    Ok(vec![])
                }
                // No recognized positional signature: fatal, per spec.md §4.D/§7.
                Err(_) => Err(crate::Error::InvalidCitation),
            },
            WireBlockDelta::Unknown => {
                log::warn!("unrecognized content_block_delta kind at index {index}");
                Ok(vec![])
            }
        }
    }

    fn message_stop_chunks(&self) -> Vec<Chunk> {
        if self.should_handoff() {
            // The Tool Driver (component E) is responsible for the
            // tool-calls chunk; nothing to emit from here.
            return vec![];
        }

        vec![Chunk {
            kind: Some(ChunkKind::Meta),
            finish_reason: self.state.stop_reason.as_deref().map(FinishReason::from),
            meta: Some(ChunkMeta {
                request_id: self.state.request_id.clone(),
                model: self.state.model.clone(),
                rate_limits: self.rate_limits.clone(),
            }),
            additional_content: Some(AdditionalContent {
                thinking_signature: self.state.thinking_signature.clone(),
                citation: None,
            }),
            ..Default::default()
        }]
    }
}
