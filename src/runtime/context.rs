use super::worker::Job;
use crate::clipboard::Clipboard;
use crate::state::GenerationId;
use crate::types::GenerationRequest;
use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Side effects available to a `RuntimeMode`: dispatching jobs to the
/// worker, cancelling the active generation, and the clipboard.
pub struct RuntimeContext {
    job_tx: mpsc::UnboundedSender<Job>,
    next_generation: GenerationId,
    active: Option<(GenerationId, CancellationToken)>,
    clipboard: Box<dyn Clipboard>,
}

impl RuntimeContext {
    pub fn new(job_tx: mpsc::UnboundedSender<Job>, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            job_tx,
            next_generation: 1,
            active: None,
            clipboard,
        }
    }

    /// Starts a generation for `request`. Any active generation is cancelled
    /// first, so at most one stream is ever listened to.
    pub fn start_generation(&mut self, request: GenerationRequest) -> Result<GenerationId> {
        self.cancel_generation();

        let generation = self.next_generation;
        self.next_generation += 1;
        let cancel = CancellationToken::new();

        self.job_tx
            .send(Job::Generate {
                generation,
                request,
                cancel: cancel.clone(),
            })
            .map_err(|_| anyhow!("generation worker is not running"))?;

        log::debug!("generation {generation} started");
        self.active = Some((generation, cancel));
        Ok(generation)
    }

    /// Cancels the active generation, returning its id.
    pub fn cancel_generation(&mut self) -> Option<GenerationId> {
        let (generation, cancel) = self.active.take()?;
        cancel.cancel();
        log::debug!("generation {generation} cancelled by the UI");
        Some(generation)
    }

    /// Marks `generation` as finished if it is still the active one.
    pub fn finish_generation(&mut self, generation: GenerationId) {
        if self.active_generation() == Some(generation) {
            self.active = None;
        }
    }

    pub fn active_generation(&self) -> Option<GenerationId> {
        self.active.as_ref().map(|(generation, _)| *generation)
    }

    pub fn request_analysis(&mut self, code: String) -> Result<()> {
        self.job_tx
            .send(Job::Analyze { code })
            .map_err(|_| anyhow!("generation worker is not running"))
    }

    pub fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        self.clipboard.copy(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::RecordingClipboard;
    use crate::types::InstructionProfile;

    fn context() -> (RuntimeContext, mpsc::UnboundedReceiver<Job>) {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        (
            RuntimeContext::new(job_tx, Box::new(RecordingClipboard::default())),
            job_rx,
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("a card", InstructionProfile::ReactTs)
    }

    #[test]
    fn test_new_generation_cancels_previous_token() {
        let (mut ctx, mut job_rx) = context();
        let first = ctx.start_generation(request()).expect("first");
        let second = ctx.start_generation(request()).expect("second");
        assert_eq!((first, second), (1, 2));
        assert_eq!(ctx.active_generation(), Some(2));

        let Ok(Job::Generate { cancel, .. }) = job_rx.try_recv() else {
            panic!("expected first generate job");
        };
        assert!(cancel.is_cancelled());
        let Ok(Job::Generate { cancel, .. }) = job_rx.try_recv() else {
            panic!("expected second generate job");
        };
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_finish_only_clears_matching_generation() {
        let (mut ctx, _job_rx) = context();
        let generation = ctx.start_generation(request()).expect("start");
        ctx.finish_generation(generation + 1);
        assert_eq!(ctx.active_generation(), Some(generation));
        ctx.finish_generation(generation);
        assert_eq!(ctx.active_generation(), None);
        assert_eq!(ctx.cancel_generation(), None);
    }

    #[test]
    fn test_dispatch_fails_once_worker_is_gone() {
        let (mut ctx, job_rx) = context();
        drop(job_rx);
        assert!(ctx.start_generation(request()).is_err());
        assert!(ctx.request_analysis("x".into()).is_err());
        assert_eq!(ctx.active_generation(), None);
    }
}
