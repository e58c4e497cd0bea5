use super::frontend::UserInputEvent;
use super::{context::RuntimeContext, frontend::FrontendAdapter, mode::RuntimeMode, UiUpdate};
use std::time::Instant;
use tokio::sync::mpsc;

pub struct Runtime<M: RuntimeMode> {
    pub mode: M,
    update_rx: mpsc::UnboundedReceiver<UiUpdate>,
}

impl<M: RuntimeMode> Runtime<M> {
    pub fn new(mode: M, update_rx: mpsc::UnboundedReceiver<UiUpdate>) -> Self {
        Self { mode, update_rx }
    }

    /// Drives the UI until the frontend or the mode asks to quit. The active
    /// generation is cancelled on the way out.
    pub async fn run<F: FrontendAdapter<M>>(&mut self, frontend: &mut F, ctx: &mut RuntimeContext) {
        loop {
            frontend.render(&self.mode);
            if frontend.should_quit() || self.mode.quit_requested() {
                break;
            }

            if let Some(event) = frontend.poll_user_input(&self.mode) {
                self.dispatch(event, ctx);
            }
            self.drain_updates(ctx);
            self.mode.on_tick(Instant::now(), ctx);

            tokio::task::yield_now().await;
        }
        ctx.cancel_generation();
    }

    fn dispatch(&mut self, event: UserInputEvent, ctx: &mut RuntimeContext) {
        match event {
            UserInputEvent::Text(text) => self.mode.on_user_input(text, ctx),
            UserInputEvent::Interrupt => self.mode.on_interrupt(ctx),
            other => self.mode.on_frontend_event(other, ctx),
        }
    }

    /// Applies every queued worker update in arrival order.
    pub fn drain_updates(&mut self, ctx: &mut RuntimeContext) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.update_rx.try_recv() {
            self.mode.on_model_update(update, ctx);
            applied += 1;
        }
        applied
    }
}
