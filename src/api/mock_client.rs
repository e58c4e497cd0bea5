use crate::api::client::{ByteStream, MockStreamProducer, ServiceError};
use crate::types::{GenerateContentRequest, GenerateContentResponse};
use anyhow::Result;
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};

/// Scripted reply for one request.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// SSE frames delivered one network chunk each.
    Frames(Vec<String>),
    /// Frames followed by a transport failure.
    FramesThenError(Vec<String>, String),
    /// The service rejects the request before streaming.
    Rejected { status: u16, message: String },
    /// Unary `generateContent` reply text.
    Text(String),
}

#[derive(Clone)]
pub struct MockApiClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<GenerateContentRequest>>>,
}

impl MockApiClient {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: &GenerateContentRequest) -> Result<MockReply> {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(anyhow::anyhow!(
                "MockApiClient: No more responses configured"
            ));
        }
        Ok(replies.remove(0))
    }
}

impl MockStreamProducer for MockApiClient {
    fn create_mock_stream(&self, request: &GenerateContentRequest) -> Result<ByteStream> {
        let (frames, trailing_error) = match self.next_reply(request)? {
            MockReply::Frames(frames) => (frames, None),
            MockReply::FramesThenError(frames, message) => (frames, Some(message)),
            MockReply::Rejected { status, message } => {
                return Err(ServiceError {
                    status: Some(status),
                    message,
                }
                .into())
            }
            MockReply::Text(text) => (vec![crate::test_support::text_frame(&text)], None),
        };

        let mut chunks: Vec<Result<Bytes>> = frames
            .into_iter()
            .map(|frame| Ok(Bytes::from(frame)))
            .collect();
        if let Some(message) = trailing_error {
            chunks.push(Err(anyhow::anyhow!(message)));
        }

        Ok(Box::pin(stream::iter(chunks)))
    }

    fn create_mock_response(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        match self.next_reply(request)? {
            MockReply::Text(text) => {
                let payload = serde_json::json!({
                    "candidates": [{
                        "content": { "role": "model", "parts": [{ "text": text }] },
                        "finishReason": "STOP"
                    }]
                });
                Ok(serde_json::from_value(payload)?)
            }
            MockReply::Rejected { status, message } => Err(ServiceError {
                status: Some(status),
                message,
            }
            .into()),
            other => Err(anyhow::anyhow!(
                "MockApiClient: streaming reply {other:?} used for a unary request"
            )),
        }
    }
}
