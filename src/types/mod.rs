pub mod api;
pub mod generation;

pub use api::{
    ApiContent, ApiErrorBody, ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
    StreamEvent,
};
pub use generation::{ContentKind, GenerationRequest, InstructionProfile};
