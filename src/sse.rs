//! Line Reader and SSE Frame Parser (spec components A and B).
//!
//! Transforms a raw `Stream<Item = Result<Bytes, reqwest::Error>>` HTTP
//! body into a `Stream<Item = Result<RawFrame>>` of complete
//! `event:`/`data:` pairs, tolerating chunk boundaries that split a line
//! or a frame at an arbitrary byte position — the same problem the
//! teacher's `utils::parse_sse_stream` solves for the simpler
//! `data:`-only grammar, generalized here to the two-line grammar an
//! Anthropic-style stream actually uses.

use crate::types::wire::AnthropicStreamEvent;
use crate::{Error, Result};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;

/// One complete SSE frame: an optional `event:` name and its `data:`
/// payload (multiple `data:` lines in one frame are joined with `\n`,
/// per the SSE spec; Anthropic never sends more than one, but nothing
/// stops it from doing so in a forward-compatible sense).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    pub event: Option<String>,
    pub data: String,
}

impl RawFrame {
    fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_empty()
    }
}

/// Buffered line-at-a-time reader over a byte stream (Component A).
///
/// HTTP chunk boundaries rarely line up with newlines, so bytes are
/// appended to an internal buffer and complete lines (ending in `\n`,
/// with an optional trailing `\r` stripped) are drained off the front.
struct LineReader<S> {
    inner: S,
    buffer: String,
}

impl<S> LineReader<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Unpin,
{
    fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: String::new(),
        }
    }

    /// Returns the next complete line, pulling more bytes from the
    /// underlying stream as needed. Returns `Ok(None)` at end of stream
    /// with no trailing partial line.
    async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.buffer.find('\n') {
                let mut line: String = self.buffer.drain(..=pos).collect();
                line.pop(); // trailing '\n'
                if line.ends_with('\r') {
                    line.pop();
                }
                return Ok(Some(line));
            }

            match self.inner.next().await {
                Some(Ok(bytes)) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Some(Err(e)) => return Err(Error::Http(e)),
                None => {
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    let line = std::mem::take(&mut self.buffer);
                    return Ok(Some(line));
                }
            }
        }
    }
}

/// Parses a complete HTTP response body into a stream of [`RawFrame`]s.
///
/// Blank lines terminate a frame (the SSE dispatch rule); `event:` and
/// `data:` are the only field names this crate needs, everything else
/// (`id:`, `retry:`, comments starting with `:`) is read and discarded.
pub fn frame_stream(response: reqwest::Response) -> Pin<Box<dyn Stream<Item = Result<RawFrame>> + Send>> {
    Box::pin(async_frame_stream(LineReader::new(response.bytes_stream())))
}

fn async_frame_stream<S>(reader: LineReader<S>) -> impl Stream<Item = Result<RawFrame>> + Send
where
    S: Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Unpin + Send,
{
    futures::stream::unfold(
        (reader, RawFrame::default(), false),
        |(mut reader, mut frame, done)| async move {
            if done {
                return None;
            }
            loop {
                match reader.next_line().await {
                    Ok(Some(line)) => {
                        if line.is_empty() {
                            if frame.is_empty() {
                                continue;
                            }
                            let completed = std::mem::take(&mut frame);
                            return Some((Ok(completed), (reader, frame, false)));
                        }
                        if let Some(event) = line.strip_prefix("event:") {
                            frame.event = Some(event.trim_start().to_string());
                        } else if let Some(data) = line.strip_prefix("data:") {
                            let data = data.strip_prefix(' ').unwrap_or(data);
                            if !frame.data.is_empty() {
                                frame.data.push('\n');
                            }
                            frame.data.push_str(data);
                        }
                        // Other field names (id:, retry:, comments) are ignored.
                    }
                    Ok(None) => {
                        if frame.is_empty() {
                            return None;
                        }
                        let completed = std::mem::take(&mut frame);
                        return Some((Ok(completed), (reader, frame, true)));
                    }
                    Err(e) => return Some((Err(e), (reader, frame, true))),
                }
            }
        },
    )
}

/// Interprets one [`RawFrame`] as a stream event, tolerating the `[DONE]`
/// sentinel some gateways append and bare `ping` keep-alives that carry
/// no JSON body.
///
/// Returns `Ok(None)` for frames that carry no event (comment-only
/// frames, `[DONE]`); returns `Err(Error::ChunkDecode)` for a non-empty
/// `data:` payload that fails to parse as JSON.
pub fn parse_event(frame: &RawFrame) -> Result<Option<AnthropicStreamEvent>> {
    let data = frame.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    serde_json::from_str::<AnthropicStreamEvent>(data)
        .map(Some)
        .map_err(|e| Error::chunk_decode("anthropic", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn body_stream(chunks: Vec<&'static str>) -> Pin<Box<dyn Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send>> {
        Box::pin(stream::iter(
            chunks.into_iter().map(|s| Ok(bytes::Bytes::from(s))),
        ))
    }

    async fn collect_frames(
        chunks: Vec<&'static str>,
    ) -> Vec<RawFrame> {
        let reader = LineReader::new(body_stream(chunks));
        async_frame_stream(reader).map(|r| r.unwrap()).collect().await
    }

    #[tokio::test]
    async fn splits_event_and_data_lines_into_one_frame() {
        let frames = collect_frames(vec!["event: ping\ndata: {}\n\n"]).await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("ping"));
        assert_eq!(frames[0].data, "{}");
    }

    #[tokio::test]
    async fn tolerates_frame_split_across_chunks() {
        let frames = collect_frames(vec!["event: mess", "age_start\ndata: {\"a\":1}", "\n\n"]).await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("message_start"));
        assert_eq!(frames[0].data, "{\"a\":1}");
    }

    #[tokio::test]
    async fn multiple_frames_in_one_chunk() {
        let frames = collect_frames(vec!["data: {\"a\":1}\n\ndata: {\"a\":2}\n\n"]).await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, "{\"a\":1}");
        assert_eq!(frames[1].data, "{\"a\":2}");
    }

    #[tokio::test]
    async fn trailing_frame_without_blank_line_is_still_emitted() {
        let frames = collect_frames(vec!["data: {\"a\":1}\n"]).await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"a\":1}");
    }

    #[test]
    fn parse_event_skips_done_sentinel() {
        let frame = RawFrame {
            event: None,
            data: "[DONE]".to_string(),
        };
        assert!(parse_event(&frame).unwrap().is_none());
    }

    #[test]
    fn parse_event_skips_empty_data() {
        let frame = RawFrame {
            event: Some("ping".to_string()),
            data: String::new(),
        };
        assert!(parse_event(&frame).unwrap().is_none());
    }

    #[test]
    fn parse_event_decodes_message_start() {
        let frame = RawFrame {
            event: Some("message_start".to_string()),
            data: r#"{"type":"message_start","message":{"id":"msg_1","model":"claude-3-5-sonnet-20241022","usage":{"input_tokens":1,"output_tokens":1}}}"#.to_string(),
        };
        let event = parse_event(&frame).unwrap().unwrap();
        assert!(matches!(event, AnthropicStreamEvent::MessageStart { .. }));
    }

    #[test]
    fn parse_event_reports_malformed_json() {
        let frame = RawFrame {
            event: Some("message_start".to_string()),
            data: "{not json".to_string(),
        };
        let err = parse_event(&frame).unwrap_err();
        assert!(matches!(err, Error::ChunkDecode { .. }));
    }
}
