use crate::api::stream::StreamParser;
use crate::api::{ApiClient, ServiceError};
use crate::types::{GenerationRequest, StreamEvent};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;

/// Request-level failure of a generation, with a message fit for a toast.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationError {
    pub message: String,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for GenerationError {
    fn from(error: anyhow::Error) -> Self {
        // Service errors already carry the service's own wording.
        if let Some(service) = error.downcast_ref::<ServiceError>() {
            return Self::new(service.message.clone());
        }
        let message = error.to_string();
        if message.trim().is_empty() {
            Self::new("Failed to generate content")
        } else {
            Self::new(message)
        }
    }
}

/// Opens one streaming generation per request and forwards its increments.
#[derive(Clone)]
pub struct StreamCoordinator {
    client: Arc<ApiClient>,
}

impl StreamCoordinator {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> Arc<ApiClient> {
        Arc::clone(&self.client)
    }

    /// Streams `request`, calling `on_increment` once per text increment in
    /// arrival order. Nothing is buffered here; the caller accumulates.
    pub async fn stream<F>(
        &self,
        request: &GenerationRequest,
        mut on_increment: F,
    ) -> Result<(), GenerationError>
    where
        F: FnMut(&str),
    {
        if request.prompt().trim().is_empty() {
            return Err(GenerationError::new("Prompt must not be empty"));
        }

        let instruction = request.profile().system_instruction();
        let api_request = self
            .client
            .build_request(request.prompt(), Some(instruction.as_str()));
        log::debug!(
            "opening stream profile={} model={}",
            request.profile(),
            self.client.model()
        );

        let mut stream = self.client.create_stream(&api_request).await?;
        let mut parser = StreamParser::new();
        let mut delivered = 0usize;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            for event in parser.process(&chunk)? {
                delivered += deliver(event, &mut on_increment)?;
            }
        }
        for event in parser.finish()? {
            delivered += deliver(event, &mut on_increment)?;
        }

        log::debug!("stream finished increments={delivered}");
        Ok(())
    }
}

fn deliver<F>(event: StreamEvent, on_increment: &mut F) -> Result<usize, GenerationError>
where
    F: FnMut(&str),
{
    match event {
        StreamEvent::Text(text) if !text.is_empty() => {
            on_increment(&text);
            Ok(1)
        }
        StreamEvent::Text(_) => Ok(0),
        StreamEvent::Finished(reason) => {
            log::debug!("candidate finished reason={reason}");
            Ok(0)
        }
        StreamEvent::Error(message) => Err(GenerationError::new(message)),
    }
}
