use super::context::RuntimeContext;
use super::frontend::UserInputEvent;
use super::update::UiUpdate;
use std::time::Instant;

pub trait RuntimeMode {
    fn on_user_input(&mut self, input: String, ctx: &mut RuntimeContext);
    fn on_model_update(&mut self, update: UiUpdate, ctx: &mut RuntimeContext);
    /// Called once per loop iteration after pending updates are drained.
    fn on_tick(&mut self, _now: Instant, _ctx: &mut RuntimeContext) {}
    fn on_interrupt(&mut self, _ctx: &mut RuntimeContext) {}
    fn on_frontend_event(&mut self, event: UserInputEvent, ctx: &mut RuntimeContext);
    fn is_generating(&self) -> bool;
    fn quit_requested(&self) -> bool {
        false
    }
}
