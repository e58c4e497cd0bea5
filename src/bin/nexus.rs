use anyhow::{Context as _, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use nexus::api::logging::init_logging;
use nexus::app::{build_runtime, run_headless, Overlay, PlaygroundMode, FRAME_INTERVAL};
use nexus::config::Config;
use nexus::runtime::frontend::{FrontendAdapter, ScrollAction, ScrollTarget, UserInputEvent};
use nexus::runtime::mode::RuntimeMode;
use nexus::terminal::TerminalSession;
use nexus::types::ContentKind;
use nexus::ui::editor::{EditorAction, PromptEditor};
use nexus::ui::layout::split_playground_layout;
use nexus::ui::preview::preview_lines;
use nexus::ui::render::{
    input_visual_rows, render_code_panel, render_input, render_overlay_modal,
    render_preview_panel, render_status_line, render_toasts, OverlayModal,
};
use ratatui::widgets::Clear;
use std::io::{self, IsTerminal, Read};
use std::time::Duration;

const PAGE_ROWS: usize = 10;

struct ManagedTuiFrontend {
    session: TerminalSession,
    editor: PromptEditor,
    quit: bool,
}

impl ManagedTuiFrontend {
    fn new() -> Result<Self> {
        let session = TerminalSession::enter()?;
        Self::drain_startup_events();
        Ok(Self {
            session,
            editor: PromptEditor::new(),
            quit: false,
        })
    }

    fn drain_startup_events() {
        for _ in 0..1024 {
            match event::poll(Duration::ZERO) {
                Ok(true) => {
                    if event::read().is_err() {
                        break;
                    }
                }
                Ok(false) | Err(_) => break,
            }
        }
    }

    fn map_overlay_key(&mut self, key: KeyEvent) -> Option<UserInputEvent> {
        let scroll = |action| {
            Some(UserInputEvent::Scroll {
                target: ScrollTarget::Overlay,
                action,
            })
        };
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(UserInputEvent::Interrupt)
            }
            KeyCode::Esc => Some(UserInputEvent::Text("esc".to_string())),
            KeyCode::Char('q') => Some(UserInputEvent::Text("q".to_string())),
            KeyCode::Up => scroll(ScrollAction::LineUp),
            KeyCode::Down => scroll(ScrollAction::LineDown),
            KeyCode::PageUp => scroll(ScrollAction::PageUp(PAGE_ROWS)),
            KeyCode::PageDown => scroll(ScrollAction::PageDown(PAGE_ROWS)),
            KeyCode::Home => scroll(ScrollAction::Home),
            KeyCode::End => scroll(ScrollAction::End),
            _ => None,
        }
    }

    fn map_regular_key(&mut self, key: KeyEvent) -> Option<UserInputEvent> {
        match self.editor.apply_key(key) {
            EditorAction::Submit(value) => return Some(UserInputEvent::Text(value)),
            EditorAction::Edited => return None,
            EditorAction::Unhandled => {}
        }

        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        let scroll = |target, action| Some(UserInputEvent::Scroll { target, action });
        match key.code {
            KeyCode::Char('c') if control => Some(UserInputEvent::Interrupt),
            KeyCode::Char('d') if control => {
                if self.editor.is_empty() {
                    self.quit = true;
                }
                None
            }
            KeyCode::Esc => Some(UserInputEvent::DismissToast),
            KeyCode::PageUp => scroll(ScrollTarget::Code, ScrollAction::PageUp(PAGE_ROWS)),
            KeyCode::PageDown => scroll(ScrollTarget::Code, ScrollAction::PageDown(PAGE_ROWS)),
            KeyCode::Home if control => scroll(ScrollTarget::Code, ScrollAction::Home),
            KeyCode::End if control => scroll(ScrollTarget::Code, ScrollAction::End),
            KeyCode::Up if control => scroll(ScrollTarget::Preview, ScrollAction::LineUp),
            KeyCode::Down if control => scroll(ScrollTarget::Preview, ScrollAction::LineDown),
            _ => None,
        }
    }
}

fn preview_title(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::StructuredUi => "Preview (component)",
        ContentKind::Markup => "Preview (html)",
        ContentKind::Stylesheet => "Preview (html + css)",
    }
}

impl FrontendAdapter<PlaygroundMode> for ManagedTuiFrontend {
    fn poll_user_input(&mut self, mode: &PlaygroundMode) -> Option<UserInputEvent> {
        if mode.quit_requested() {
            self.quit = true;
            return None;
        }

        let Ok(has_event) = event::poll(FRAME_INTERVAL) else {
            self.quit = true;
            return None;
        };
        if !has_event {
            return None;
        }
        let Ok(ev) = event::read() else {
            self.quit = true;
            return None;
        };

        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if mode.overlay_active() {
                    self.map_overlay_key(key)
                } else {
                    self.map_regular_key(key)
                }
            }
            Event::Paste(text) if !mode.overlay_active() => {
                self.editor.insert_str(&text);
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, mode: &PlaygroundMode) {
        let status = mode.status_line();
        let input = self.editor.buffer();
        let cursor = self.editor.cursor();
        let preview = preview_lines(mode.pipeline());
        let title = preview_title(mode.pipeline().kind());

        let _ = self.session.terminal_mut().draw(|frame| {
            let area = frame.area();
            frame.render_widget(Clear, area);
            let input_width = area.width.saturating_sub(2).max(1) as usize;
            let input_rows = input_visual_rows(input, input_width).max(1) as u16;
            let panes = split_playground_layout(area, input_rows, mode.view());

            render_status_line(frame, panes.header, &status);
            if let Some(code_area) = panes.code {
                render_code_panel(
                    frame,
                    code_area,
                    mode.response_text(),
                    mode.code_scroll(),
                    mode.is_generating(),
                );
            }
            if let Some(preview_area) = panes.preview {
                render_preview_panel(frame, preview_area, title, preview, mode.preview_scroll());
            }
            render_input(frame, panes.input, input, cursor);
            render_toasts(frame, area, mode.toasts().iter());

            match mode.overlay() {
                Some(Overlay::Analysis(text)) => render_overlay_modal(
                    frame,
                    OverlayModal::Analysis {
                        text,
                        scroll_offset: mode.overlay_scroll(),
                    },
                ),
                Some(Overlay::Help) => render_overlay_modal(frame, OverlayModal::Help),
                None => {}
            }
        });
    }

    fn should_quit(&self) -> bool {
        self.quit
    }
}

/// Prompt for a non-interactive run: the arguments, or stdin when there are none.
fn headless_prompt() -> Result<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let mut prompt = String::new();
    io::stdin()
        .read_to_string(&mut prompt)
        .context("Failed to read prompt from stdin")?;
    Ok(prompt)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = Config::load()?;
    config.validate()?;

    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    if !interactive || std::env::args().len() > 1 {
        let prompt = headless_prompt()?;
        if prompt.trim().is_empty() {
            anyhow::bail!("Prompt must not be empty");
        }
        log::info!("headless run with profile {}", config.profile);
        return run_headless(&config, prompt.trim(), &mut io::stdout().lock()).await;
    }

    let (mut runtime, mut ctx) = build_runtime(config)?;
    let mut frontend = ManagedTuiFrontend::new()?;
    runtime.run(&mut frontend, &mut ctx).await;
    Ok(())
}
