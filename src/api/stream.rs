use std::collections::VecDeque;

use futures::stream::{self, LocalBoxStream, Stream, StreamExt};

use super::types::{ChatEvent, ChatStreamEvent};
use super::{ApiError, ChatStream};

/// Splits a byte stream into lines, keeping partial lines across chunks.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(line) = clean_line(&line) {
                lines.push(line);
            }
        }
        lines
    }

    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        clean_line(&rest)
    }
}

fn clean_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    // event-stream framing: keep the payload of `data:` lines, drop comments
    let text = text.strip_prefix("data:").map(str::trim).unwrap_or(text);
    if text.is_empty() || text.starts_with(':') {
        None
    } else {
        Some(text.to_string())
    }
}

/// Parses one event line. Event types the client does not know are skipped.
pub fn parse_event_line(line: &str) -> Result<Option<ChatEvent>, ApiError> {
    serde_json::from_str::<ChatStreamEvent>(line)
        .map(ChatStreamEvent::into_event)
        .map_err(|e| ApiError::Decode(format!("bad chat event {:?}: {}", line, e)))
}

struct DecodeState<B, E> {
    inner: LocalBoxStream<'static, Result<B, E>>,
    decoder: LineDecoder,
    ready: VecDeque<String>,
    finished: bool,
}

/// Turns a newline-delimited JSON body into chat events.
pub fn decode_ndjson<S, B, E>(bytes: S) -> ChatStream
where
    S: Stream<Item = Result<B, E>> + 'static,
    B: AsRef<[u8]> + 'static,
    E: Into<ApiError> + 'static,
{
    let state = DecodeState {
        inner: bytes.boxed_local(),
        decoder: LineDecoder::default(),
        ready: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                match parse_event_line(&line) {
                    Ok(Some(event)) => return Some((Ok(event), state)),
                    Ok(None) => continue,
                    Err(e) => return Some((Err(e), state)),
                }
            }
            if state.finished {
                return None;
            }
            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.decoder.push(chunk.as_ref());
                    state.ready.extend(lines);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.finished = true;
                    state.ready.extend(state.decoder.finish());
                }
            }
        }
    })
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_split_across_chunks_are_joined() {
        let mut decoder = LineDecoder::default();

        assert!(decoder.push(br#"{"message_type":"con"#).is_empty());
        let lines = decoder.push(b"tent\",\"content\":\"Hi\"}\n\n{\"message_type\":\"done\"}");

        assert_eq!(lines, vec![r#"{"message_type":"content","content":"Hi"}"#.to_string()]);
        assert_eq!(decoder.finish().as_deref(), Some(r#"{"message_type":"done"}"#));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn event_stream_prefixes_are_stripped() {
        let mut decoder = LineDecoder::default();
        let lines = decoder.push(b": keep-alive\ndata: {\"message_type\":\"done\"}\n");
        assert_eq!(lines, vec![r#"{"message_type":"done"}"#.to_string()]);
    }

    #[tokio::test]
    async fn decodes_events_in_order() {
        let chunks: Vec<Result<Vec<u8>, ApiError>> = vec![
            Ok(b"{\"message_type\":\"content\",\"content\":\"Hel\"}\n{\"message_type\":".to_vec()),
            Ok(b"\"content\",\"content\":\"lo\"}\n{\"message_type\":\"done\"}\n".to_vec()),
        ];
        let events: Vec<_> = decode_ndjson(stream::iter(chunks)).collect().await;

        assert_eq!(
            events.into_iter().map(Result::unwrap).collect::<Vec<_>>(),
            vec![
                ChatEvent::Token("Hel".into()),
                ChatEvent::Token("lo".into()),
                ChatEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn transport_error_ends_the_stream() {
        let chunks: Vec<Result<Vec<u8>, ApiError>> = vec![
            Ok(b"{\"message_type\":\"content\",\"content\":\"partial\"}\n".to_vec()),
            Err(ApiError::Network("connection reset".into())),
            Ok(b"{\"message_type\":\"done\"}\n".to_vec()),
        ];
        let events: Vec<_> = decode_ndjson(stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Err(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn unknown_events_do_not_reach_the_controller() {
        let chunks: Vec<Result<Vec<u8>, ApiError>> = vec![Ok(
            b"{\"message_type\":\"status\",\"content\":\"Searching\"}\n{\"message_type\":\"ping\"}\n{\"message_type\":\"done\"}\n"
                .to_vec(),
        )];
        let events: Vec<_> = decode_ndjson(stream::iter(chunks)).collect().await;

        assert_eq!(
            events.into_iter().map(Result::unwrap).collect::<Vec<_>>(),
            vec![ChatEvent::Status("Searching".into()), ChatEvent::Done]
        );
    }

    #[test]
    fn malformed_line_is_a_decode_error() {
        assert!(matches!(parse_event_line("not json"), Err(ApiError::Decode(_))));
    }
}
