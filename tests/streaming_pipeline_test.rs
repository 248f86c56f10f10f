//! End-to-end tests driving the real streaming pipeline (`query`/`Client::send`
//! through `frame_stream -> Dispatcher -> driver::run_tool_calls`) against a
//! mocked HTTP transport, grounded on the `wiremock` crate used for the same
//! purpose across the retrieved example pack's manifests (e.g.
//! `YumchaLabs-siumai`, `erans-lunaroute`).
//!
//! Each fixture is a literal SSE body, written in the two-line `event:`/
//! `data:` grammar `src/sse.rs` parses, served verbatim from a
//! `wiremock::MockServer` so these tests cover the parser, dispatcher, and
//! tool driver together rather than any one in isolation.

use prism_stream::{tool, AgentOptions, Error, FinishReason};
use futures::StreamExt;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves one SSE body per call, in order, falling back to the last body
/// once exhausted (tests bound the number of requests they expect anyway).
struct SequencedSse {
    bodies: Vec<&'static str>,
    next: AtomicUsize,
}

impl SequencedSse {
    fn new(bodies: Vec<&'static str>) -> Self {
        Self {
            bodies,
            next: AtomicUsize::new(0),
        }
    }
}

impl Respond for SequencedSse {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let idx = self.next.fetch_add(1, Ordering::SeqCst);
        let body = self.bodies.get(idx).or_else(|| self.bodies.last()).copied().unwrap_or_default();
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
    }
}

async fn mock_messages_endpoint(server: &MockServer, bodies: Vec<&'static str>) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(SequencedSse::new(bodies))
        .mount(server)
        .await;
}

fn options_for(server: &MockServer, max_steps: u32) -> AgentOptions {
    AgentOptions::builder()
        .model("claude-3-5-sonnet-20241022")
        .api_key("sk-ant-test")
        .base_url(server.uri())
        .max_steps(max_steps)
        .build()
        .unwrap()
}

const TEXT_ONLY_SSE: &str = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-5-sonnet-20241022\",\"usage\":{\"input_tokens\":10,\"output_tokens\":0}}}\n\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello, \"}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"world!\"}}\n\n\
event: content_block_stop\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":5}}\n\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\n";

/// Property 1: a body with only text deltas yields chunks whose concatenated
/// `text` equals the full message, with `Stop` on the final chunk.
#[tokio::test]
async fn property_1_basic_text_streaming() {
    let server = MockServer::start().await;
    mock_messages_endpoint(&server, vec![TEXT_ONLY_SSE]).await;

    let options = options_for(&server, 1);
    let mut stream = prism_stream::query("say hello", &options).await.unwrap();

    let mut text = String::new();
    let mut finish_reason = None;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        if let Some(t) = chunk.text {
            text.push_str(&t);
        }
        if chunk.finish_reason.is_some() {
            finish_reason = chunk.finish_reason;
        }
    }

    assert_eq!(text, "Hello, world!");
    assert_eq!(finish_reason, Some(FinishReason::Stop));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

const SEARCH_TOOL_CALL_SSE: &str = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-5-sonnet-20241022\",\"usage\":{\"input_tokens\":10,\"output_tokens\":0}}}\n\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_1\",\"name\":\"search\",\"input\":{}}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"query\\\":\\\"tigers game\\\"}\"}}\n\n\
event: content_block_stop\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"tool_use\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":10}}\n\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\n";

const FINAL_TEXT_SSE: &str = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_2\",\"model\":\"claude-3-5-sonnet-20241022\",\"usage\":{\"input_tokens\":20,\"output_tokens\":0}}}\n\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"The game is at 3pm.\"}}\n\n\
event: content_block_stop\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":8}}\n\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\n";

/// Property 2: a one-hop tool loop emits exactly one `tool_calls`-bearing
/// chunk, exactly one subsequent `tool_results`-bearing chunk, issues two
/// requests, and the second request's body carries the assistant tool-use
/// turn followed by the user tool-result turn.
#[tokio::test]
async fn property_2_tool_loop_emits_calls_then_results_over_two_requests() {
    let server = MockServer::start().await;
    mock_messages_endpoint(&server, vec![SEARCH_TOOL_CALL_SSE, FINAL_TEXT_SSE]).await;

    let search = tool("search", "search the web").build(|args| async move { Ok(json!({"query": args["query"]})) });
    let options = AgentOptions::builder()
        .model("claude-3-5-sonnet-20241022")
        .api_key("sk-ant-test")
        .base_url(server.uri())
        .max_steps(2)
        .tool(search)
        .build()
        .unwrap();

    let mut stream = prism_stream::query("what time is the tigers game", &options).await.unwrap();

    let mut tool_call_chunks = 0;
    let mut tool_result_chunks = 0;
    let mut saw_results_before_any_final_text = true;
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        if chunk.tool_calls.as_ref().is_some_and(|c| !c.is_empty()) {
            tool_call_chunks += 1;
        }
        if chunk.tool_results.as_ref().is_some_and(|r| !r.is_empty()) {
            tool_result_chunks += 1;
            if !text.is_empty() {
                saw_results_before_any_final_text = false;
            }
        }
        if let Some(t) = chunk.text {
            text.push_str(&t);
        }
    }

    assert_eq!(tool_call_chunks, 1);
    assert_eq!(tool_result_chunks, 1);
    assert!(saw_results_before_any_final_text);
    assert_eq!(text, "The game is at 3pm.");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let second_body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let messages = second_body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"][0]["type"], "tool_use");
    assert_eq!(messages[1]["content"][0]["id"], "toolu_1");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"][0]["type"], "tool_result");
    assert_eq!(messages[2]["content"][0]["tool_use_id"], "toolu_1");
}

const WEATHER_TOOL_CALL_SSE: &str = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_2\",\"model\":\"claude-3-5-sonnet-20241022\",\"usage\":{\"input_tokens\":15,\"output_tokens\":0}}}\n\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_2\",\"name\":\"weather\",\"input\":{}}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"city\\\":\\\"Detroit\\\"}\"}}\n\n\
event: content_block_stop\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"tool_use\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":10}}\n\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\n";

/// Property 3: a two-hop tool loop (search, then weather, then final text)
/// surfaces at least two `tool_calls`-bearing chunks, issues three requests,
/// and the concatenated final text is non-empty.
#[tokio::test]
async fn property_3_multi_hop_tool_loop_issues_three_requests() {
    let server = MockServer::start().await;
    mock_messages_endpoint(&server, vec![SEARCH_TOOL_CALL_SSE, WEATHER_TOOL_CALL_SSE, FINAL_TEXT_SSE]).await;

    let search = tool("search", "search the web").build(|_| async move { Ok(json!({"result": "game at 3pm"})) });
    let weather = tool("weather", "look up weather").build(|_| async move { Ok(json!({"result": "sunny"})) });
    let options = AgentOptions::builder()
        .model("claude-3-5-sonnet-20241022")
        .api_key("sk-ant-test")
        .base_url(server.uri())
        .max_steps(3)
        .tool(search)
        .tool(weather)
        .build()
        .unwrap();

    let mut stream = prism_stream::query("what's the weather at the tigers game", &options).await.unwrap();

    let mut tool_call_chunks = 0;
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        if chunk.tool_calls.as_ref().is_some_and(|c| !c.is_empty()) {
            tool_call_chunks += 1;
        }
        if let Some(t) = chunk.text {
            text.push_str(&t);
        }
    }

    assert!(tool_call_chunks >= 2);
    assert!(!text.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

/// Property 4: with `max_steps = 2`, a fixture requiring a third hop raises
/// `MaxStepsExceeded` when the driver tries to open hop index 2, after
/// exactly two requests have been sent.
#[tokio::test]
async fn property_4_max_steps_exceeded_at_third_hop() {
    let server = MockServer::start().await;
    mock_messages_endpoint(&server, vec![SEARCH_TOOL_CALL_SSE, WEATHER_TOOL_CALL_SSE, FINAL_TEXT_SSE]).await;

    let search = tool("search", "search the web").build(|_| async move { Ok(json!({"result": "game at 3pm"})) });
    let weather = tool("weather", "look up weather").build(|_| async move { Ok(json!({"result": "sunny"})) });
    let options = AgentOptions::builder()
        .model("claude-3-5-sonnet-20241022")
        .api_key("sk-ant-test")
        .base_url(server.uri())
        .max_steps(2)
        .tool(search)
        .tool(weather)
        .build()
        .unwrap();

    let mut stream = prism_stream::query("what's the weather at the tigers game", &options).await.unwrap();

    let mut saw_max_steps_error = false;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(_) => {}
            Err(Error::MaxStepsExceeded) => {
                saw_max_steps_error = true;
                break;
            }
            Err(other) => panic!("expected MaxStepsExceeded, got {other:?}"),
        }
    }

    assert!(saw_max_steps_error);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

/// Property 10: chunks are observed in the order the underlying events
/// occur, and nothing is yielded after `message_stop`.
#[tokio::test]
async fn property_10_chunks_preserve_event_order() {
    let sse = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-5-sonnet-20241022\",\"usage\":{\"input_tokens\":5,\"output_tokens\":0}}}\n\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi \"}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"there\"}}\n\n\
event: content_block_stop\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":2}}\n\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\n";

    let server = MockServer::start().await;
    mock_messages_endpoint(&server, vec![sse]).await;

    let options = options_for(&server, 1);
    let mut stream = prism_stream::query("greet me", &options).await.unwrap();

    let mut observed = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        if let Some(t) = chunk.text {
            observed.push(format!("text:{t}"));
        }
        if chunk.finish_reason.is_some() {
            observed.push("finish".to_string());
        }
    }

    assert_eq!(observed, vec!["text:Hi ", "text:there", "finish"]);
}

/// Sanity check that `Client::send` (not just the `query` convenience
/// function) drives the same pipeline and accumulates history across turns.
#[tokio::test]
async fn client_send_drives_the_same_pipeline_and_records_history() {
    let server = MockServer::start().await;
    mock_messages_endpoint(&server, vec![TEXT_ONLY_SSE]).await;

    let options = options_for(&server, 1);
    let mut client = prism_stream::Client::new(options).unwrap();

    let mut stream = client.send("say hello").await.unwrap();
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        if let Some(t) = chunk.unwrap().text {
            text.push_str(&t);
        }
    }
    assert_eq!(text, "Hello, world!");

    let history = client.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, prism_stream::MessageRole::User);
    assert_eq!(history[1].role, prism_stream::MessageRole::Assistant);
    match history[1].content.first() {
        Some(prism_stream::ContentBlock::Text(t)) => assert_eq!(t.text, "Hello, world!"),
        other => panic!("expected Text content, got {other:?}"),
    }
}
