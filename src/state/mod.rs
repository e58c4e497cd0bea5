pub mod coordinator;
pub mod session;
pub mod toast;

pub use coordinator::{GenerationError, StreamCoordinator};
pub use session::{AccumulatedResponse, GenerationId};
pub use toast::{Toast, ToastKind, ToastQueue};
