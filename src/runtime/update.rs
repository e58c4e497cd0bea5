use crate::state::GenerationId;

/// Messages from the worker task to the UI loop, delivered in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    Increment {
        generation: GenerationId,
        text: String,
    },
    Complete {
        generation: GenerationId,
    },
    Failed {
        generation: GenerationId,
        message: String,
    },
    Cancelled {
        generation: GenerationId,
    },
    Analysis(String),
    AnalysisFailed(String),
}

impl UiUpdate {
    /// The generation an update belongs to, if it is part of a stream.
    pub fn generation(&self) -> Option<GenerationId> {
        match self {
            UiUpdate::Increment { generation, .. }
            | UiUpdate::Complete { generation }
            | UiUpdate::Failed { generation, .. }
            | UiUpdate::Cancelled { generation } => Some(*generation),
            UiUpdate::Analysis(_) | UiUpdate::AnalysisFailed(_) => None,
        }
    }
}
