//! Server-Sent Events parser for streamed chat completions
//!
//! ```text
//! data: {"id":"c1","choices":[{"index":0,"delta":{"content":"Hel"}}]}
//!
//! data: {"id":"c1","choices":[{"index":0,"delta":{"content":"lo"}}]}
//!
//! data: [DONE]
//! ```
//!
//! Bytes are buffered until a blank line closes an event, so events and
//! multi-byte characters may be split across network chunks.

use std::pin::Pin;

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;

use crate::llm::core::error::LlmError;

use super::types::{ChatCompletionChunk, SseItem};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send + Sync>>;

pub fn parse_sse_stream(
    byte_stream: ByteStream,
) -> Pin<Box<dyn Stream<Item = Result<SseItem, LlmError>> + Send + Sync>> {
    let mut buffer: Vec<u8> = Vec::new();

    let event_stream = byte_stream.flat_map(move |chunk_result| {
        let chunk = match chunk_result {
            Ok(bytes) => bytes,
            Err(e) => {
                return futures::stream::iter(vec![Err(LlmError::StreamError(e.to_string()))]);
            }
        };

        buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut items = Vec::new();
        while let Some(end) = find_event_end(&buffer) {
            let raw: Vec<u8> = buffer.drain(..end + 2).collect();
            match std::str::from_utf8(&raw[..end]) {
                Ok(event_text) => {
                    if let Some(item) = parse_event(event_text) {
                        items.push(item);
                    }
                }
                Err(e) => items.push(Err(LlmError::StreamError(format!(
                    "Invalid UTF-8 in stream: {}",
                    e
                )))),
            }
        }

        futures::stream::iter(items)
    });

    Box::pin(event_stream)
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Parse one event; comments and events without data are skipped.
fn parse_event(event_text: &str) -> Option<Result<SseItem, LlmError>> {
    let data: Vec<&str> = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect();

    if data.is_empty() {
        return None;
    }
    let data = data.join("\n");
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(SseItem::Done));
    }

    match serde_json::from_str::<ChatCompletionChunk>(&data) {
        Ok(chunk) => Some(Ok(SseItem::Chunk(chunk))),
        Err(e) => Some(Err(LlmError::SerializationError(format!(
            "Failed to parse completion chunk: {}. Data: {}",
            e, data
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn stream_of(chunks: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<Bytes, reqwest::Error>(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        ))
    }

    fn content_of(item: SseItem) -> Option<String> {
        match item {
            SseItem::Chunk(chunk) => chunk.choices.into_iter().next()?.delta.content,
            SseItem::Done => None,
        }
    }

    #[tokio::test]
    async fn test_parse_delta_and_done() {
        let mut sse = parse_sse_stream(stream_of(vec![
            b"data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n\ndata: [DONE]\n\n".as_slice(),
        ]));

        let first = sse.next().await.unwrap().unwrap();
        assert_eq!(content_of(first), Some("Hello".to_string()));
        assert!(matches!(sse.next().await.unwrap().unwrap(), SseItem::Done));
        assert!(sse.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_chunked_event() {
        let mut sse = parse_sse_stream(stream_of(vec![
            b"data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"del".as_slice(),
            b"ta\":{\"content\":\"Hi\"}}]}\n".as_slice(),
            b"\n".as_slice(),
        ]));

        let item = sse.next().await.unwrap().unwrap();
        assert_eq!(content_of(item), Some("Hi".to_string()));
    }

    #[tokio::test]
    async fn test_multibyte_split_across_chunks() {
        // "é" is 0xC3 0xA9
        let mut sse = parse_sse_stream(stream_of(vec![
            b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"caf\xC3".as_slice(),
            b"\xA9\"}}]}\n\n".as_slice(),
        ]));

        let item = sse.next().await.unwrap().unwrap();
        assert_eq!(content_of(item), Some("café".to_string()));
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let mut sse = parse_sse_stream(stream_of(vec![b"data: [DONE]\r\n\r\n".as_slice()]));
        assert!(matches!(sse.next().await.unwrap().unwrap(), SseItem::Done));
    }

    #[tokio::test]
    async fn test_comments_are_skipped() {
        let mut sse = parse_sse_stream(stream_of(vec![b": keep-alive\n\ndata: [DONE]\n\n".as_slice()]));
        assert!(matches!(sse.next().await.unwrap().unwrap(), SseItem::Done));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mut sse = parse_sse_stream(stream_of(vec![b"data: {invalid json}\n\n".as_slice()]));
        assert!(sse.next().await.unwrap().is_err());
    }
}
