//! Client for streaming queries and multi-turn tool-using conversations.
//!
//! The recursive hop-opening logic (`open_turn`) is the Tool Driver's
//! counterpart in this file: it owns the HTTP request/response lifecycle
//! and hands off to `driver::run_tool_calls` whenever the Event
//! Dispatcher reports [`dispatcher::Dispatcher::should_handoff`].
//! Grounded on the teacher's `Client`/`query` pair in the original
//! `client.rs` (pull-based `receive()`, `Arc<AtomicBool>` interrupt flag,
//! `auto_execute_loop`'s tool-then-recurse shape), adapted from a flat
//! OpenAI-style completion to Anthropic's recursive streaming hand-off.

use crate::dispatcher::Dispatcher;
use crate::driver;
use crate::hooks::UserPromptSubmitEvent;
use crate::types::{AdditionalContent, AgentOptions, Chunk, Message};
use crate::{ratelimit, request, sse};
use crate::{Error, Result};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Stream of chunks from one `send`/`query` call, spanning every
/// recursive tool-use hop that call triggers.
pub type ContentStream = Pin<Box<dyn Stream<Item = Result<Chunk>> + Send>>;

/// Single-turn convenience entry point: sends one user message and
/// streams the response (including any tool-use hops `options` permits).
///
/// # Examples
///
/// ```rust,no_run
/// use prism_stream::{query, AgentOptions};
/// use futures::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let options = AgentOptions::builder()
///         .model("claude-3-5-sonnet-20241022")
///         .api_key("sk-ant-...")
///         .build()?;
///
///     let mut stream = query("What's the capital of France?", &options).await?;
///
///     while let Some(chunk) = stream.next().await {
///         if let Some(text) = chunk?.text {
///             print!("{text}");
///         }
///     }
///
///     Ok(())
/// }
/// ```
pub async fn query(prompt: &str, options: &AgentOptions) -> Result<ContentStream> {
    let http_client = build_http_client(options)?;
    let history = Arc::new(Mutex::new(vec![Message::user(prompt)]));
    open_turn(Arc::new(options.clone()), history, http_client, Arc::new(AtomicBool::new(false)), 0).await
}

fn build_http_client(options: &AgentOptions) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout()))
        .build()
        .map_err(Error::Http)
}

/// Client for multi-turn conversations, keeping history across `send`
/// calls.
pub struct Client {
    options: Arc<AgentOptions>,
    history: Arc<Mutex<Vec<Message>>>,
    http_client: reqwest::Client,
    interrupted: Arc<AtomicBool>,
}

impl Client {
    pub fn new(options: AgentOptions) -> Result<Self> {
        let http_client = build_http_client(&options)?;
        Ok(Self {
            options: Arc::new(options),
            history: Arc::new(Mutex::new(Vec::new())),
            http_client,
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Runs `UserPromptSubmit` hooks, appends the (possibly hook-modified)
    /// prompt to history, and opens the first streaming hop.
    pub async fn send(&mut self, prompt: &str) -> Result<ContentStream> {
        self.interrupted.store(false, Ordering::SeqCst);

        let mut final_prompt = prompt.to_string();
        let history_snapshot: Vec<serde_json::Value> = self
            .history
            .lock()
            .await
            .iter()
            .map(|m| serde_json::to_value(m).unwrap_or_default())
            .collect();

        if let Some(decision) = self
            .options
            .hooks()
            .execute_user_prompt_submit(UserPromptSubmitEvent::new(final_prompt.clone(), history_snapshot))
            .await
        {
            if !decision.continue_execution {
                return Err(Error::other(format!("prompt blocked by hook: {}", decision.reason.unwrap_or_default())));
            }
            if let Some(modified) = decision.modified_prompt {
                final_prompt = modified;
            }
        }

        self.history.lock().await.push(Message::user(final_prompt));

        open_turn(self.options.clone(), self.history.clone(), self.http_client.clone(), self.interrupted.clone(), 0).await
    }

    /// Stops the in-flight stream at its next poll. Idempotent.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }
}

/// Opens one streaming hop and returns a stream that transparently
/// continues into the next hop (and the one after that) whenever the
/// Event Dispatcher reports a tool-use hand-off, until a hop finishes
/// without one.
///
/// `depth` is the 0-indexed hop about to be opened; `depth >=
/// options.max_steps()` is refused before any network call is made, so a
/// `max_steps` of 1 (the default) permits exactly the initial hop and no
/// recursive tool-use continuation.
fn open_turn(
    options: Arc<AgentOptions>,
    history: Arc<Mutex<Vec<Message>>>,
    http_client: reqwest::Client,
    interrupted: Arc<AtomicBool>,
    depth: u32,
) -> Pin<Box<dyn std::future::Future<Output = Result<ContentStream>> + Send>> {
    Box::pin(async move {
        if depth >= options.max_steps() {
            return Err(Error::MaxStepsExceeded);
        }

        let history_snapshot = history.lock().await.clone();
        let body = request::build_request(&options, &history_snapshot);

        let url = format!("{}/v1/messages", options.base_url());
        let response = http_client
            .post(&url)
            .header("x-api-key", options.api_key())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Error::Http)?;

        let (rate_limits, retry_after) = ratelimit::parse_rate_limit_headers(response.headers());

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(crate::error::classify_http_status(status, options.model(), &text, rate_limits, retry_after));
        }

        let frames = sse::frame_stream(response);
        let dispatcher = Dispatcher::new(rate_limits);

        Ok(Box::pin(futures::stream::unfold(
            Phase::InHop { frames, dispatcher, depth },
            move |phase| {
                let options = options.clone();
                let history = history.clone();
                let http_client = http_client.clone();
                let interrupted = interrupted.clone();
                async move { advance(phase, options, history, http_client, interrupted).await }
            },
        )) as ContentStream)
    })
}

enum Phase {
    InHop {
        frames: Pin<Box<dyn Stream<Item = Result<sse::RawFrame>> + Send>>,
        dispatcher: Dispatcher,
        depth: u32,
    },
    InNextHop {
        inner: ContentStream,
    },
}

async fn advance(
    phase: Phase,
    options: Arc<AgentOptions>,
    history: Arc<Mutex<Vec<Message>>>,
    http_client: reqwest::Client,
    interrupted: Arc<AtomicBool>,
) -> Option<(Result<Chunk>, Phase)> {
    if interrupted.load(Ordering::SeqCst) {
        return None;
    }

    match phase {
        Phase::InNextHop { mut inner } => inner.next().await.map(|item| (item, Phase::InNextHop { inner })),

        Phase::InHop { mut frames, mut dispatcher, depth } => loop {
            match frames.next().await {
                None => {
                    // Safety net (spec.md §4.E): the body ended without an
                    // explicit message_stop, but tool calls accumulated.
                    if dispatcher.state().has_tool_calls() {
                        return Some(handle_handoff(&options, &history, &http_client, &interrupted, depth, &dispatcher).await);
                    }
                    return None;
                }
                Some(Err(e)) => return Some((Err(e), Phase::InNextHop { inner: Box::pin(futures::stream::empty::<Result<Chunk>>()) })),
                Some(Ok(frame)) => {
                    let event = match sse::parse_event(&frame) {
                        Ok(Some(event)) => event,
                        Ok(None) => continue,
                        Err(e) => return Some((Err(e), Phase::InNextHop { inner: Box::pin(futures::stream::empty::<Result<Chunk>>()) })),
                    };
                    let is_message_stop = matches!(event, crate::types::wire::AnthropicStreamEvent::MessageStop);

                    let chunks = match dispatcher.dispatch(event) {
                        Ok(chunks) => chunks,
                        Err(e) => return Some((Err(e), Phase::InNextHop { inner: Box::pin(futures::stream::empty::<Result<Chunk>>()) })),
                    };

                    if dispatcher.should_handoff() {
                        return Some(handle_handoff(&options, &history, &http_client, &interrupted, depth, &dispatcher).await);
                    }

                    // The turn ended without a tool-use hand-off: append the
                    // assistant's text/thinking to history so a subsequent
                    // `Client::send` sees it, mirroring what the Tool
                    // Driver does for a tool-use turn (spec.md §3's
                    // append-only conversation invariant).
                    if is_message_stop && !dispatcher.state().text.is_empty() {
                        let state = dispatcher.state();
                        let content = vec![crate::types::ContentBlock::Text(crate::types::TextBlock::with_citations(
                            state.text.clone(),
                            state.citations.clone(),
                        ))];
                        history.lock().await.push(Message::assistant(content));
                    }

                    if let Some(chunk) = chunks.into_iter().next() {
                        return Some((Ok(chunk), Phase::InHop { frames, dispatcher, depth }));
                    }
                    // No chunk from this event (e.g. content_block_start); keep polling.
                }
            }
        },
    }
}

/// Runs the handoff (tool execution + next-hop opening) and folds the
/// result into the shape `advance` needs: the next `Result<Chunk>` to
/// yield, plus the `Phase` to resume from on the following poll.
///
/// On success the stream this returns always yields the tool-calls chunk
/// immediately followed by the tool-results chunk (spec.md §4.E steps 2
/// and 6) before any chunk from the next hop, so `combined.next()` here
/// can never observe `None`.
async fn handle_handoff(
    options: &Arc<AgentOptions>,
    history: &Arc<Mutex<Vec<Message>>>,
    http_client: &reqwest::Client,
    interrupted: &Arc<AtomicBool>,
    depth: u32,
    dispatcher: &Dispatcher,
) -> (Result<Chunk>, Phase) {
    match handoff(options, history, http_client, interrupted, depth, dispatcher).await {
        Ok(mut combined) => match combined.next().await {
            Some(item) => (item, Phase::InNextHop { inner: combined }),
            None => (Ok(Chunk::default()), Phase::InNextHop { inner: combined }),
        },
        Err(e) => (Err(e), Phase::InNextHop { inner: Box::pin(futures::stream::empty::<Result<Chunk>>()) }),
    }
}

/// Executes the tool calls this hop accumulated, opens the next streaming
/// hop, and returns a stream that yields the tool-calls chunk, then the
/// tool-results chunk, then every chunk the next hop produces — spec.md
/// §4.E steps 2, 6, and 7 in that order.
async fn handoff(
    options: &Arc<AgentOptions>,
    history: &Arc<Mutex<Vec<Message>>>,
    http_client: &reqwest::Client,
    interrupted: &Arc<AtomicBool>,
    depth: u32,
    dispatcher: &Dispatcher,
) -> Result<ContentStream> {
    let state = dispatcher.state();
    let tool_calls = state.finalize_tool_calls();
    let additional_content = Some(AdditionalContent {
        thinking_signature: state.thinking_signature.clone(),
        citation: None,
    });

    let results = {
        let mut history_guard = history.lock().await;
        driver::run_tool_calls(options, &mut history_guard, state, tool_calls.clone()).await?
    };

    let calls_chunk = Chunk {
        tool_calls: Some(tool_calls),
        additional_content,
        ..Default::default()
    };
    let results_chunk = Chunk {
        tool_results: Some(results),
        ..Default::default()
    };

    let next = open_turn(options.clone(), history.clone(), http_client.clone(), interrupted.clone(), depth + 1).await?;

    let lead = futures::stream::iter(vec![Ok(calls_chunk), Ok(results_chunk)]);
    Ok(Box::pin(lead.chain(next)) as ContentStream)
}
