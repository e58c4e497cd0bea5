use super::logging::emit_sse_parse_error;
use crate::types::{GenerateContentResponse, StreamEvent};
use anyhow::{anyhow, Result};

/// Incremental parser for the `alt=sse` stream of `streamGenerateContent`.
///
/// Network chunks may split an event anywhere, including inside a UTF-8
/// sequence, so raw bytes are buffered until a blank line closes the event.
#[derive(Default)]
pub struct StreamParser {
    buffer: Vec<u8>,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>> {
        self.buffer.extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));
        let mut events = Vec::new();
        let mut start = 0;

        while let Some(end) = find_event_end(&self.buffer[start..]) {
            let event_end = start + end + 2;
            let event_text = String::from_utf8_lossy(&self.buffer[start..event_end]).into_owned();
            let parsed = parse_event(&event_text, &mut events);
            start = event_end;
            if let Err(error) = parsed {
                self.buffer.drain(..start);
                return Err(error);
            }
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        Ok(events)
    }

    /// Parses whatever is left once the connection closes without a final
    /// blank line.
    pub fn finish(&mut self) -> Result<Vec<StreamEvent>> {
        let rest = std::mem::take(&mut self.buffer);
        let mut events = Vec::new();
        let text = String::from_utf8_lossy(&rest);
        if !text.trim().is_empty() {
            parse_event(&text, &mut events)?;
        }
        Ok(events)
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == b"\n\n")
}

/// A `data:` payload that is not JSON makes the whole stream malformed.
fn parse_event(event_text: &str, events: &mut Vec<StreamEvent>) -> Result<()> {
    let mut data = String::new();
    for line in event_text.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.trim_start());
        }
    }

    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(());
    }

    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(response) => {
            if let Some(error) = response.error.as_ref() {
                let message = if error.message.trim().is_empty() {
                    "The generation service reported an error".to_string()
                } else {
                    error.message.clone()
                };
                events.push(StreamEvent::Error(message));
                return Ok(());
            }
            let text = response.text();
            if !text.is_empty() {
                events.push(StreamEvent::Text(text));
            }
            if let Some(reason) = response.finish_reason() {
                events.push(StreamEvent::Finished(reason.to_string()));
            }
        }
        Err(error) => {
            emit_sse_parse_error(data, &error);
            return Err(anyhow!("Malformed stream event: {error}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{error_frame, finish_frame, text_frame};

    #[test]
    fn test_text_and_finish_frames_become_events() {
        let mut parser = StreamParser::new();
        let mut input = text_frame("Here:\n");
        input.push_str(&finish_frame());

        let events = parser.process(input.as_bytes()).expect("parse");
        assert_eq!(
            events,
            vec![
                StreamEvent::Text("Here:\n".to_string()),
                StreamEvent::Finished("STOP".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_payload_becomes_error_event() {
        let mut parser = StreamParser::new();
        let events = parser
            .process(error_frame("quota exhausted").as_bytes())
            .expect("parse");
        assert_eq!(
            events,
            vec![StreamEvent::Error("quota exhausted".to_string())]
        );
    }

    #[test]
    fn test_multibyte_text_split_across_chunks() {
        let mut parser = StreamParser::new();
        let frame = text_frame("caf\u{e9} \u{2713}");
        let bytes = frame.as_bytes();
        let split = bytes
            .iter()
            .position(|byte| *byte >= 0x80)
            .expect("multibyte char")
            + 1;

        assert!(parser.process(&bytes[..split]).expect("first").is_empty());
        let events = parser.process(&bytes[split..]).expect("second");
        assert_eq!(
            events,
            vec![StreamEvent::Text("caf\u{e9} \u{2713}".to_string())]
        );
    }

    #[test]
    fn test_finish_parses_unterminated_tail() {
        let mut parser = StreamParser::new();
        let frame = text_frame("tail");
        let unterminated = frame.trim_end();
        assert!(parser.process(unterminated.as_bytes()).expect("parse").is_empty());
        assert_eq!(
            parser.finish().expect("finish"),
            vec![StreamEvent::Text("tail".to_string())]
        );
    }

    #[test]
    fn test_non_json_payload_is_an_error_and_parsing_resumes_after_it() {
        let mut parser = StreamParser::new();
        let mut input = String::from("data: {not json\r\n\r\n");
        input.push_str(&text_frame("after"));

        let error = parser.process(input.as_bytes()).expect_err("malformed event");
        assert!(error.to_string().starts_with("Malformed stream event"));
        assert_eq!(
            parser.process(b"").expect("rest"),
            vec![StreamEvent::Text("after".to_string())]
        );
    }

    #[test]
    fn test_done_marker_and_comments_are_not_errors() {
        let mut parser = StreamParser::new();
        let events = parser
            .process(b": keep-alive\n\ndata: [DONE]\n\n")
            .expect("parse");
        assert!(events.is_empty());
    }
}
