//! Turns an inference response body into display text.
//!
//! Complete bodies are a single JSON document. Streaming bodies are an
//! event-stream: one frame per line, content frames prefixed with `data: `.
//! Streaming frames that cannot be decoded contribute an empty fragment and
//! never end the stream; only a transport failure does.

use super::client::{ByteStream, PendingResponse};
use super::types::{CompletionBody, ResponseMode, StreamChunk, parse_object};
use crate::Result;
use futures::{Stream, StreamExt, TryStreamExt, stream};
use std::{collections::VecDeque, pin::Pin};
use tracing::{debug, trace};

pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

const DATA_MARKER: &str = "data: ";

/// Decoded response, either the whole text or a lazy sequence of fragments.
pub enum Generation {
    Complete(String),
    Streaming(FragmentStream),
}

impl std::fmt::Debug for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

pub async fn decode(pending: PendingResponse) -> Result<Generation> {
    match pending.mode() {
        ResponseMode::Complete => {
            let body: Vec<u8> = pending
                .into_body()
                .try_fold(Vec::new(), |mut acc, chunk| async move {
                    acc.extend_from_slice(&chunk);
                    Ok(acc)
                })
                .await?;
            debug!("Received complete response body ({} bytes)", body.len());
            extract_completion(&body).map(Generation::Complete)
        }
        ResponseMode::Streaming => Ok(Generation::Streaming(fragments(pending.into_body()))),
    }
}

/// `choices[0].message.content` of a complete body. Missing fields give `""`;
/// a body that is not JSON of the expected shape is a response error.
pub fn extract_completion(body: &[u8]) -> Result<String> {
    CompletionBody::parse(body).into_content()
}

/// `choices[0].delta.content` of one event-stream line, or `""`.
pub fn decode_frame(line: &[u8]) -> String {
    let Ok(line) = std::str::from_utf8(line) else {
        trace!("Skipping non UTF-8 frame");
        return String::new();
    };

    let Some(start) = line.find(DATA_MARKER) else {
        trace!("Skipping frame without data marker: {}", line);
        return String::new();
    };

    match parse_object::<StreamChunk>(line[start + DATA_MARKER.len()..].as_bytes()) {
        Ok(chunk) => chunk.first_delta().to_string(),
        Err(_) => {
            trace!("Skipping non JSON frame: {}", line);
            String::new()
        }
    }
}

/// Splits arbitrarily chunked bytes into lines. Blank lines are dropped and
/// a trailing `\r` is stripped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if let Some(line) = non_empty(line) {
                lines.push(line);
            }
        }
        lines
    }

    /// Returns the unterminated remainder once the body has ended.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        non_empty(std::mem::take(&mut self.buffer))
    }
}

fn non_empty(mut line: Vec<u8>) -> Option<Vec<u8>> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    (!line.is_empty()).then_some(line)
}

struct FrameState {
    body: ByteStream,
    splitter: LineSplitter,
    pending: VecDeque<Vec<u8>>,
    finished: bool,
}

/// One fragment per non-blank line, in arrival order. A transport error is
/// yielded once and ends the sequence.
pub fn fragments(body: ByteStream) -> FragmentStream {
    let state = FrameState {
        body,
        splitter: LineSplitter::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(decode_frame(&line)), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.splitter.push(&chunk);
                    state.pending.extend(lines);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.finished = true;
                    if let Some(line) = state.splitter.finish() {
                        state.pending.push_back(line);
                    }
                }
            }
        }
    })
    .boxed()
}

/// Running text built from fragments in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    text: String,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) -> &str {
        self.text.push_str(fragment);
        &self.text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Accumulated text after each fragment.
pub fn accumulate(fragments: FragmentStream) -> impl Stream<Item = Result<String>> + Send {
    fragments.scan(Accumulator::new(), |acc, fragment| {
        let snapshot = fragment.map(|f| acc.push(&f).to_string());
        futures::future::ready(Some(snapshot))
    })
}

/// Drives a fragment sequence to completion and returns the full text.
pub async fn collect_text(fragments: FragmentStream) -> Result<String> {
    fragments
        .try_fold(Accumulator::new(), |mut acc, fragment| async move {
            acc.push(&fragment);
            Ok(acc)
        })
        .await
        .map(Accumulator::into_text)
}
