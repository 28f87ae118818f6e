//! Server-sent events decoding for OpenAI-compatible streaming completions.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use brochure_core::error::AppError;
use brochure_core::traits::FragmentStream;
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;

/// Terminal sentinel sent as the last event's data.
const DONE: &str = "[DONE]";

/// Incremental SSE line decoder.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters split across network chunks are decoded intact.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Feed a chunk; returns the data payload of every event it completes.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(event) = self.line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush whatever the body ended with, even without a trailing blank line.
    pub(crate) fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let rest = String::from_utf8_lossy(&rest);
            let rest = rest.strip_suffix('\r').unwrap_or(&rest);
            if let Some(event) = self.line(rest) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data
                .push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        // comments (":...") and other fields carry nothing we use
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.data).join("\n"))
    }
}

// ---- Streaming chunk types ----

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamErrorDetail>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamErrorDetail {
    message: String,
}

enum Event {
    Fragment(String),
    Skip,
    Done,
    Failed(AppError),
}

fn interpret(data: &str) -> Event {
    if data.trim() == DONE {
        return Event::Done;
    }

    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Event::Failed(AppError::StreamError(format!(
                "Malformed stream event: {e}. Raw: {data}"
            )));
        }
    };

    if let Some(error) = chunk.error {
        return Event::Failed(AppError::LlmError {
            message: error.message,
            status_code: 200,
        });
    }

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
    {
        Some(text) if !text.is_empty() => Event::Fragment(text),
        _ => Event::Skip,
    }
}

struct State<S> {
    bytes: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    done: bool,
}

/// Turn a streaming completion body into text fragments.
///
/// Ends at `[DONE]` or end of body. An error event, a malformed event, or a
/// transport error yields one `Err` item and ends the stream.
pub fn fragments<S, B, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = State {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(data) = state.pending.pop_front() {
                match interpret(&data) {
                    Event::Fragment(text) => return Some((Ok(text), state)),
                    Event::Skip => continue,
                    Event::Done => return None,
                    Event::Failed(e) => {
                        state.done = true;
                        state.pending.clear();
                        return Some((Err(e), state));
                    }
                }
            }

            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(chunk.as_ref());
                    state.pending.extend(events);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((
                        Err(AppError::StreamError(format!("Stream interrupted: {e}"))),
                        state,
                    ));
                }
                None => {
                    state.done = true;
                    let tail = state.decoder.finish();
                    state.pending.extend(tail);
                }
            }
        }
    }))
}
