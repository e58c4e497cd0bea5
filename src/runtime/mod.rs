pub mod context;
pub mod frontend;
pub mod r#loop;
pub mod mode;
pub mod update;
pub mod worker;

pub use update::UiUpdate;

#[cfg(test)]
mod tests {
    use super::context::RuntimeContext;
    use super::frontend::{FrontendAdapter, UserInputEvent};
    use super::mode::RuntimeMode;
    use super::r#loop::Runtime;
    use super::UiUpdate;
    use crate::clipboard::testing::RecordingClipboard;
    use std::collections::VecDeque;
    use std::time::Instant;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct RecordingMode {
        events: Vec<String>,
        ticks: usize,
    }

    impl RuntimeMode for RecordingMode {
        fn on_user_input(&mut self, input: String, _ctx: &mut RuntimeContext) {
            self.events.push(format!("input:{input}"));
        }

        fn on_model_update(&mut self, update: UiUpdate, _ctx: &mut RuntimeContext) {
            if let UiUpdate::Increment { text, .. } = update {
                self.events.push(format!("update:{text}"));
            }
        }

        fn on_tick(&mut self, _now: Instant, _ctx: &mut RuntimeContext) {
            self.ticks += 1;
        }

        fn on_interrupt(&mut self, _ctx: &mut RuntimeContext) {
            self.events.push("interrupt".to_string());
        }

        fn on_frontend_event(&mut self, _event: UserInputEvent, _ctx: &mut RuntimeContext) {
            self.events.push("frontend".to_string());
        }

        fn is_generating(&self) -> bool {
            false
        }
    }

    struct ScriptedFrontend {
        inputs: VecDeque<UserInputEvent>,
        renders: usize,
    }

    impl FrontendAdapter<RecordingMode> for ScriptedFrontend {
        fn poll_user_input(&mut self, _mode: &RecordingMode) -> Option<UserInputEvent> {
            self.inputs.pop_front()
        }

        fn render(&mut self, _mode: &RecordingMode) {
            self.renders += 1;
        }

        fn should_quit(&self) -> bool {
            self.inputs.is_empty()
        }
    }

    #[tokio::test]
    async fn test_loop_dispatches_input_and_drains_updates_in_order() {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (job_tx, _job_rx) = mpsc::unbounded_channel();
        let mut ctx = RuntimeContext::new(job_tx, Box::new(RecordingClipboard::default()));
        let mut runtime = Runtime::new(RecordingMode::default(), update_rx);

        update_tx
            .send(UiUpdate::Increment { generation: 1, text: "a".into() })
            .unwrap();
        update_tx
            .send(UiUpdate::Increment { generation: 1, text: "b".into() })
            .unwrap();

        let mut frontend = ScriptedFrontend {
            inputs: VecDeque::from(vec![
                UserInputEvent::Text("hello".into()),
                UserInputEvent::Interrupt,
                UserInputEvent::DismissToast,
            ]),
            renders: 0,
        };
        runtime.run(&mut frontend, &mut ctx).await;

        assert_eq!(
            runtime.mode.events,
            vec!["input:hello", "update:a", "update:b", "interrupt", "frontend"]
        );
        assert_eq!(runtime.mode.ticks, 3);
        assert_eq!(frontend.renders, 4);
    }
}
