use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Which panes the playground shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    Code,
    #[default]
    Split,
    Live,
}

impl ViewMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "code" => Some(ViewMode::Code),
            "split" => Some(ViewMode::Split),
            "live" | "preview" => Some(ViewMode::Live),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::Code => ViewMode::Split,
            ViewMode::Split => ViewMode::Live,
            ViewMode::Live => ViewMode::Code,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Code => "code",
            ViewMode::Split => "split",
            ViewMode::Live => "live",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaygroundLayout {
    pub header: Rect,
    pub code: Option<Rect>,
    pub preview: Option<Rect>,
    pub input: Rect,
}

pub fn split_playground_layout(area: Rect, input_rows: u16, view: ViewMode) -> PlaygroundLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(input_rows.max(1)),
        ])
        .split(area);
    let body = rows[1];

    let (code, preview) = match view {
        ViewMode::Code => (Some(body), None),
        ViewMode::Live => (None, Some(body)),
        ViewMode::Split => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(body);
            (Some(columns[0]), Some(columns[1]))
        }
    };

    PlaygroundLayout {
        header: rows[0],
        code,
        preview,
        input: rows[2],
    }
}
