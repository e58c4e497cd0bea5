use crate::state::{Toast, ToastKind};
use crate::ui::input_metrics::{
    cursor_row_col, display_width, truncate_to_display_width, wrap_input_lines,
};
use crate::ui::layout::ViewMode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const TOAST_WIDTH: u16 = 40;

pub fn input_visual_rows(input: &str, width: usize) -> usize {
    wrap_input_lines(input, width).len().max(1)
}

pub fn render_input(frame: &mut Frame<'_>, area: Rect, input: &str, cursor_byte: usize) {
    if area.height == 0 || area.width <= 2 {
        return;
    }

    let input_width = area.width.saturating_sub(2).max(1) as usize;
    let lines = wrap_input_lines(input, input_width);
    let (cursor_row, cursor_col) = cursor_row_col(input, cursor_byte, input_width);
    let visible_rows = area.height as usize;
    let window_start = cursor_row.saturating_add(1).saturating_sub(visible_rows);

    let rendered: Vec<Line> = (0..visible_rows)
        .map(|offset| {
            let row_index = window_start + offset;
            let prefix = if row_index == 0 { "> " } else { "  " };
            let line = lines.get(row_index).cloned().unwrap_or_default();
            Line::from(format!("{prefix}{line}"))
        })
        .collect();

    frame.render_widget(
        Paragraph::new(rendered)
            .style(Style::default().fg(Color::Gray).bg(Color::Rgb(24, 24, 24)))
            .wrap(Wrap { trim: false }),
        area,
    );

    let cursor_y = area
        .y
        .saturating_add(cursor_row.saturating_sub(window_start) as u16);
    let cursor_x = area
        .x
        .saturating_add(2 + cursor_col as u16)
        .min(area.x.saturating_add(area.width.saturating_sub(1)));
    frame.set_cursor_position((cursor_x, cursor_y));
}

/// What the header shows about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub generating: bool,
    pub profile: String,
    pub model: String,
    pub view: ViewMode,
    pub environment: &'static str,
}

impl StatusLine {
    pub fn badge(&self) -> &'static str {
        if self.generating {
            " STREAMING "
        } else {
            " IDLE "
        }
    }

    pub fn detail(&self) -> String {
        format!(
            " {} · {} · view:{} · {}",
            self.profile,
            self.model,
            self.view.label(),
            self.environment
        )
    }
}

pub fn render_status_line(frame: &mut Frame<'_>, area: Rect, status: &StatusLine) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let badge_style = if status.generating {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    };
    let badge = status.badge();
    let remaining = (area.width as usize).saturating_sub(display_width(badge));
    let detail = truncate_line(&status.detail(), remaining);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(badge, badge_style),
            Span::styled(detail, Style::default().fg(Color::DarkGray)),
        ])),
        area,
    );
}

pub fn render_code_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    code: &str,
    scroll: usize,
    generating: bool,
) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let title = if generating { " Code (streaming) " } else { " Code " };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::DarkGray));

    let body = if code.is_empty() {
        Text::from(Line::styled(
            "Describe a component and press Enter. /help lists commands.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(code.to_string())
    };

    let scroll = clamp_scroll(&body.lines, block.inner(area), scroll);
    frame.render_widget(
        Paragraph::new(body)
            .block(block)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

pub fn render_preview_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    lines: Vec<Line<'static>>,
    scroll: usize,
) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(Style::default().fg(Color::DarkGray));

    let scroll = clamp_scroll(&lines, block.inner(area), scroll);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

fn toast_style(kind: ToastKind) -> Style {
    let color = match kind {
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
        ToastKind::Info => Color::Blue,
        ToastKind::Warning => Color::Yellow,
    };
    Style::default().fg(color)
}

/// Stacks toasts upward from the bottom-right corner of `area`, newest lowest.
pub fn render_toasts<'a>(frame: &mut Frame<'_>, area: Rect, toasts: impl Iterator<Item = &'a Toast>) {
    let width = TOAST_WIDTH.min(area.width);
    if width < 8 {
        return;
    }
    let mut bottom = area.y.saturating_add(area.height);

    let toasts: Vec<&Toast> = toasts.collect();
    for toast in toasts.iter().rev() {
        let height = if toast.description.is_some() { 4 } else { 3 };
        if bottom < area.y.saturating_add(height) {
            break;
        }
        bottom -= height;
        let rect = Rect::new(area.x + area.width - width, bottom, width, height);
        frame.render_widget(Clear, rect);

        let style = toast_style(toast.kind);
        let inner_width = width.saturating_sub(2) as usize;
        let mut lines = vec![Line::styled(
            truncate_line(&toast.message, inner_width),
            style.add_modifier(Modifier::BOLD),
        )];
        if let Some(description) = &toast.description {
            lines.push(Line::from(truncate_line(description, inner_width)));
        }
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).border_style(style)),
            rect,
        );
    }
}

pub enum OverlayModal<'a> {
    Analysis {
        text: &'a str,
        scroll_offset: usize,
    },
    Help,
}

pub const HELP_LINES: &[&str] = &[
    "/react /react-js /react-css /react-js-css   component profiles",
    "/html /css                                  markup profiles",
    "/view code|split|live                       choose panes",
    "/copy                                       copy the response",
    "/analyze                                    review the current code",
    "/clear                                      reset code and preview",
    "/quit                                       exit",
    "",
    "PageUp/PageDown scroll code, Ctrl+Up/Down scroll preview",
    "Ctrl+C stops a generation, Esc dismisses a toast",
];

pub fn render_overlay_modal(frame: &mut Frame<'_>, modal: OverlayModal<'_>) {
    let size = frame.area();
    let width = size.width.clamp(44, 96).min(size.width);
    let height = size.height.clamp(10, 24).min(size.height);
    let x = size.x + (size.width.saturating_sub(width)) / 2;
    let y = size.y + (size.height.saturating_sub(height)) / 2;
    let area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, area);

    let (title, color, lines, scroll) = match modal {
        OverlayModal::Analysis {
            text,
            scroll_offset,
        } => {
            let mut lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
            lines.push(Line::from(""));
            lines.push(Line::styled(
                "esc/q close   up/down scroll",
                Style::default().fg(Color::DarkGray),
            ));
            ("Code Analysis", Color::Cyan, lines, scroll_offset)
        }
        OverlayModal::Help => {
            let lines = HELP_LINES.iter().map(|l| Line::from(*l)).collect();
            ("Commands", Color::Yellow, lines, 0)
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().fg(color));
    let inner = block.inner(area);
    let scroll = clamp_scroll(&lines, inner, scroll);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        inner,
    );
}

/// Caps `scroll` so the last page of `lines`, wrapped to `area`, stays in view.
fn clamp_scroll(lines: &[Line<'_>], area: Rect, scroll: usize) -> u16 {
    let width = usize::from(area.width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    let max = rows.saturating_sub(usize::from(area.height));
    u16::try_from(scroll.min(max)).unwrap_or(u16::MAX)
}

fn truncate_line(input: &str, width: usize) -> String {
    let width = width.max(1);
    if display_width(input) <= width {
        return input.to_string();
    }
    if width < 4 {
        return truncate_to_display_width(input, width);
    }
    let mut out = truncate_to_display_width(input, width - 3);
    out.push_str("...");
    out
}
