//! Server-sent events for streamed chat replies
//!
//! A reply streams as any number of `agent_text` events followed by exactly
//! one terminal event: `done` with the guarded full reply, or `error`.

use std::convert::Infallible;

use futures_util::stream::{self, Stream, StreamExt};
use serde_json::json;
use warp::sse::Event;

use crate::assistant::guardrails::validate_response;
use crate::llm::{EventStream, FinishReason, StreamEvent};

/// One step of a streamed chat reply
#[derive(Debug, Clone, PartialEq)]
pub enum ChatFrame {
    Text(String),
    Done {
        chat_response: String,
        finish_reason: Option<FinishReason>,
    },
    Error(String),
}

/// Create an agent_text SSE event with a text chunk
pub fn create_agent_text_event(chunk: &str) -> Result<Event, Infallible> {
    let payload = json!({ "text": chunk });
    Ok(Event::default()
        .event("agent_text")
        .data(payload.to_string()))
}

/// Create a done SSE event carrying the full reply
pub fn create_done_event(
    chat_response: &str,
    finish_reason: Option<&FinishReason>,
) -> Result<Event, Infallible> {
    let payload = json!({
        "chat_response": chat_response,
        "finish_reason": finish_reason,
    });
    Ok(Event::default().event("done").data(payload.to_string()))
}

pub fn create_error_event(message: &str) -> Result<Event, Infallible> {
    let payload = json!({ "error": message });
    Ok(Event::default().event("error").data(payload.to_string()))
}

impl ChatFrame {
    pub fn into_event(self) -> Result<Event, Infallible> {
        match self {
            ChatFrame::Text(chunk) => create_agent_text_event(&chunk),
            ChatFrame::Done {
                chat_response,
                finish_reason,
            } => create_done_event(&chat_response, finish_reason.as_ref()),
            ChatFrame::Error(message) => create_error_event(&message),
        }
    }
}

/// Fold model events into chat frames, ending with a single terminal frame.
pub fn chat_frames(events: EventStream) -> impl Stream<Item = ChatFrame> + Send + Sync {
    stream::unfold(Some((events, String::new())), |state| async move {
        let (mut events, mut reply) = state?;
        match events.next().await {
            Some(Ok(StreamEvent::TextDelta { text })) => {
                reply.push_str(&text);
                Some((ChatFrame::Text(text), Some((events, reply))))
            }
            Some(Ok(StreamEvent::MessageEnd { finish_reason, .. })) => Some((
                ChatFrame::Done {
                    chat_response: validate_response(&reply),
                    finish_reason: Some(finish_reason),
                },
                None,
            )),
            Some(Ok(StreamEvent::Error { error })) => Some((ChatFrame::Error(error), None)),
            Some(Err(e)) => Some((ChatFrame::Error(e.to_string()), None)),
            // Provider closed without a finish marker
            None => Some((
                ChatFrame::Done {
                    chat_response: validate_response(&reply),
                    finish_reason: None,
                },
                None,
            )),
        }
    })
}

pub fn chat_event_stream(
    events: EventStream,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + Sync {
    chat_frames(events).map(ChatFrame::into_event)
}
