use crate::api::ApiClient;
use crate::clipboard::{Clipboard, Osc52Clipboard};
use crate::config::Config;
use crate::preview::{Compiler, EsbuildCompiler, RenderPipeline};
use crate::runtime::context::RuntimeContext;
use crate::runtime::frontend::{ScrollAction, ScrollTarget, UserInputEvent};
use crate::runtime::mode::RuntimeMode;
use crate::runtime::r#loop::Runtime;
use crate::runtime::worker::spawn_worker;
use crate::runtime::UiUpdate;
use crate::state::{AccumulatedResponse, StreamCoordinator, ToastKind, ToastQueue};
use crate::types::{GenerationRequest, InstructionProfile};
use crate::ui::layout::ViewMode;
use crate::ui::preview::preview_lines;
use crate::ui::render::{StatusLine, HELP_LINES};
use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

mod headless;

pub use headless::{run_headless, stream_to_writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Analysis(String),
    Help,
}

/// Playground state driven by the runtime loop.
///
/// The loop is the only writer of the accumulated response: every increment
/// is appended and re-extracted before the next one is looked at.
pub struct PlaygroundMode {
    profile: InstructionProfile,
    model: String,
    local_endpoint: bool,
    response: AccumulatedResponse,
    generating: bool,
    analyzing: bool,
    pipeline: RenderPipeline,
    toasts: ToastQueue,
    view: ViewMode,
    overlay: Option<Overlay>,
    code_scroll: usize,
    preview_scroll: usize,
    overlay_scroll: usize,
    quit: bool,
}

impl PlaygroundMode {
    pub fn new(config: &Config, compiler: Box<dyn Compiler>) -> Self {
        Self {
            profile: config.profile,
            model: config.model.clone(),
            local_endpoint: config.is_local_endpoint(),
            response: AccumulatedResponse::new(),
            generating: false,
            analyzing: false,
            pipeline: RenderPipeline::new(
                config.profile.content_kind(),
                compiler,
                config.render_debounce,
            ),
            toasts: ToastQueue::new(),
            view: ViewMode::default(),
            overlay: None,
            code_scroll: 0,
            preview_scroll: 0,
            overlay_scroll: 0,
            quit: false,
        }
    }

    pub fn profile(&self) -> InstructionProfile {
        self.profile
    }

    pub fn response_text(&self) -> &str {
        self.response.text()
    }

    pub fn response(&self) -> &AccumulatedResponse {
        &self.response
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn overlay_scroll(&self) -> usize {
        self.overlay_scroll
    }

    pub fn code_scroll(&self) -> usize {
        self.code_scroll
    }

    pub fn preview_scroll(&self) -> usize {
        self.preview_scroll
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn status_line(&self) -> StatusLine {
        StatusLine {
            generating: self.generating,
            profile: self.profile.to_string(),
            model: self.model.clone(),
            view: self.view,
            environment: if self.local_endpoint { "local" } else { "remote" },
        }
    }

    fn toast(&mut self, kind: ToastKind, message: &str, description: Option<String>) {
        self.toasts.push(kind, message, description, Instant::now());
    }

    fn submit_prompt(&mut self, prompt: String, ctx: &mut RuntimeContext) {
        let request = GenerationRequest::new(prompt, self.profile);
        match ctx.start_generation(request) {
            Ok(generation) => {
                self.response.reset(generation);
                self.pipeline.reset();
                self.pipeline.on_text_changed(self.response.text(), Instant::now());
                self.generating = true;
                self.code_scroll = 0;
                self.preview_scroll = 0;
            }
            Err(e) => {
                log::error!("failed to start generation: {e:#}");
                self.generating = false;
                self.toast(ToastKind::Error, "Generation Failed", Some(e.to_string()));
            }
        }
    }

    fn set_profile(&mut self, profile: InstructionProfile) {
        self.profile = profile;
        self.pipeline.set_kind(profile.content_kind());
        self.pipeline.on_text_changed(self.response.text(), Instant::now());
        self.toast(ToastKind::Info, &format!("Profile: {profile}"), None);
    }

    fn copy_response(&mut self, ctx: &mut RuntimeContext) {
        if self.response.is_empty() {
            self.toast(ToastKind::Warning, "Nothing to copy", None);
            return;
        }
        match ctx.copy_to_clipboard(self.response.text()) {
            Ok(()) => self.toast(ToastKind::Success, "Copied to clipboard", None),
            Err(e) => {
                log::warn!("clipboard copy failed: {e:#}");
                self.toast(
                    ToastKind::Error,
                    "Failed to copy",
                    Some("Could not copy to clipboard".to_string()),
                );
            }
        }
    }

    fn analyze(&mut self, ctx: &mut RuntimeContext) {
        let Some(code) = self
            .pipeline
            .fragment()
            .filter(|fragment| !fragment.trim().is_empty())
            .map(str::to_string)
        else {
            self.toast(ToastKind::Warning, "Nothing to analyze", None);
            return;
        };
        match ctx.request_analysis(code) {
            Ok(()) => {
                self.analyzing = true;
                self.toast(ToastKind::Info, "Analyzing code", None);
            }
            Err(e) => self.toast(ToastKind::Error, "Analysis Failed", Some(e.to_string())),
        }
    }

    fn clear(&mut self, ctx: &mut RuntimeContext) {
        ctx.cancel_generation();
        self.generating = false;
        self.response.clear();
        self.pipeline.clear();
        self.code_scroll = 0;
        self.preview_scroll = 0;
    }

    fn run_command(&mut self, command: &str, ctx: &mut RuntimeContext) {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let argument = parts.next();

        match name {
            "/react" => self.set_profile(InstructionProfile::ReactTs),
            "/react-js" => self.set_profile(InstructionProfile::ReactJs),
            "/react-css" => self.set_profile(InstructionProfile::ReactTsCss),
            "/react-js-css" => self.set_profile(InstructionProfile::ReactJsCss),
            "/html" => self.set_profile(InstructionProfile::HtmlTailwind),
            "/css" => self.set_profile(InstructionProfile::HtmlCss),
            "/view" => match argument {
                None => self.view = self.view.next(),
                Some(value) => match ViewMode::parse(value) {
                    Some(view) => self.view = view,
                    None => self.toast(
                        ToastKind::Warning,
                        "Unknown view",
                        Some("Use /view code, split or live".to_string()),
                    ),
                },
            },
            "/copy" => self.copy_response(ctx),
            "/analyze" => self.analyze(ctx),
            "/clear" => self.clear(ctx),
            "/help" => {
                self.overlay_scroll = 0;
                self.overlay = Some(Overlay::Help);
            }
            "/quit" | "/exit" | "/q" => self.quit = true,
            _ => self.toast(
                ToastKind::Warning,
                "Unknown command",
                Some(format!("{name} is not a command; try /help")),
            ),
        }
    }

    /// Index of the last content line of a scrollable pane. The renderer
    /// further caps offsets to keep a full page in view.
    fn last_scroll_line(&self, target: ScrollTarget) -> usize {
        let lines = match target {
            ScrollTarget::Code => self.response.text().lines().count(),
            ScrollTarget::Preview => preview_lines(&self.pipeline).len(),
            ScrollTarget::Overlay => match &self.overlay {
                // Summary plus the blank line and key hint the modal appends.
                Some(Overlay::Analysis(text)) => text.lines().count() + 2,
                Some(Overlay::Help) => HELP_LINES.len(),
                None => 0,
            },
        };
        lines.saturating_sub(1)
    }

    fn handle_overlay_input(&mut self, input: &str) {
        if matches!(input, "esc" | "q") {
            self.overlay = None;
            self.overlay_scroll = 0;
        }
    }
}

/// Moves `offset` by `action`, never past `last`.
fn apply_scroll(offset: usize, action: ScrollAction, last: usize) -> usize {
    let moved = match action {
        ScrollAction::LineUp => offset.saturating_sub(1),
        ScrollAction::LineDown => offset.saturating_add(1),
        ScrollAction::PageUp(rows) => offset.saturating_sub(rows),
        ScrollAction::PageDown(rows) => offset.saturating_add(rows),
        ScrollAction::Home => 0,
        ScrollAction::End => last,
    };
    moved.min(last)
}

impl RuntimeMode for PlaygroundMode {
    fn on_user_input(&mut self, input: String, ctx: &mut RuntimeContext) {
        if self.overlay.is_some() {
            self.handle_overlay_input(&input);
            return;
        }
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        if input.starts_with('/') {
            self.run_command(input, ctx);
            return;
        }
        self.submit_prompt(input.to_string(), ctx);
    }

    fn on_model_update(&mut self, update: UiUpdate, ctx: &mut RuntimeContext) {
        match update {
            UiUpdate::Increment { generation, text } => {
                if self.response.append(generation, &text) {
                    self.pipeline
                        .on_text_changed(self.response.text(), Instant::now());
                }
            }
            UiUpdate::Complete { generation } => {
                ctx.finish_generation(generation);
                if self.response.is_current(generation) {
                    self.generating = false;
                }
            }
            UiUpdate::Failed {
                generation,
                message,
            } => {
                ctx.finish_generation(generation);
                if self.response.is_current(generation) {
                    self.generating = false;
                    self.toast(ToastKind::Error, "Generation Failed", Some(message));
                }
            }
            UiUpdate::Cancelled { generation } => {
                ctx.finish_generation(generation);
                if self.response.is_current(generation) {
                    self.generating = false;
                }
            }
            UiUpdate::Analysis(summary) => {
                self.analyzing = false;
                self.overlay_scroll = 0;
                self.overlay = Some(Overlay::Analysis(summary));
            }
            UiUpdate::AnalysisFailed(message) => {
                self.analyzing = false;
                self.toast(ToastKind::Error, "Analysis Failed", Some(message));
            }
        }
    }

    fn on_tick(&mut self, now: Instant, _ctx: &mut RuntimeContext) {
        self.toasts.expire(now);
        self.pipeline.poll(now);
    }

    fn on_interrupt(&mut self, ctx: &mut RuntimeContext) {
        if self.overlay.is_some() {
            self.overlay = None;
            return;
        }
        if self.generating {
            ctx.cancel_generation();
            self.generating = false;
            self.toast(ToastKind::Info, "Generation stopped", None);
            return;
        }
        self.quit = true;
    }

    fn on_frontend_event(&mut self, event: UserInputEvent, _ctx: &mut RuntimeContext) {
        match event {
            UserInputEvent::Scroll { target, action } => {
                let last = self.last_scroll_line(target);
                let offset = match target {
                    ScrollTarget::Code => &mut self.code_scroll,
                    ScrollTarget::Preview => &mut self.preview_scroll,
                    ScrollTarget::Overlay => &mut self.overlay_scroll,
                };
                *offset = apply_scroll(*offset, action, last);
            }
            UserInputEvent::DismissToast => {
                self.toasts.dismiss_oldest();
            }
            UserInputEvent::Text(_) | UserInputEvent::Interrupt => {}
        }
    }

    fn is_generating(&self) -> bool {
        self.generating
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// Wires a mode to a worker running `coordinator`. Must be called inside a
/// tokio runtime.
pub fn assemble_runtime(
    coordinator: StreamCoordinator,
    mode: PlaygroundMode,
    clipboard: Box<dyn Clipboard>,
) -> (Runtime<PlaygroundMode>, RuntimeContext) {
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let (job_tx, _worker) = spawn_worker(coordinator, update_tx);
    (
        Runtime::new(mode, update_rx),
        RuntimeContext::new(job_tx, clipboard),
    )
}

pub fn build_runtime(config: Config) -> Result<(Runtime<PlaygroundMode>, RuntimeContext)> {
    let client = ApiClient::new(&config)?;
    let compiler = EsbuildCompiler::new(config.compiler.clone());
    let mode = PlaygroundMode::new(&config, Box::new(compiler));
    Ok(assemble_runtime(
        StreamCoordinator::new(client),
        mode,
        Box::new(Osc52Clipboard::stdout()),
    ))
}

/// How long the UI loop may idle between frames when nothing is pending.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
