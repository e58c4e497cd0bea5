//! Terminal rendering of preview content.
//!
//! Mounted element trees are laid out as text: block tags start new lines,
//! inline tags join the current line, buttons and inputs get bracketed chrome,
//! and inline `style` colours are honoured where the terminal can show them.
//! Markup previews are shown as the raw markup with tags highlighted.

use crate::preview::{ElementNode, RenderPipeline};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use std::sync::OnceLock;

pub const PLACEHOLDER: &str = "Preview will appear here";

const BLOCK_TAGS: &[&str] = &[
    "div", "section", "header", "footer", "main", "nav", "article", "aside", "form", "p", "h1",
    "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "pre", "textarea", "table", "tr", "fragment",
    "blockquote", "hr",
];

/// Preview lines for whatever the pipeline currently shows.
pub fn preview_lines(pipeline: &RenderPipeline) -> Vec<Line<'static>> {
    if pipeline.shows_placeholder() {
        return vec![Line::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )];
    }
    if let Some(markup) = pipeline.markup() {
        return markup_lines(markup);
    }
    match pipeline.mounted_tree() {
        Some(tree) => tree_lines(tree),
        None => Vec::new(),
    }
}

/// Plain-text form of `lines`, one string per line.
pub fn plain_text(lines: &[Line<'_>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
        .collect()
}

pub fn tree_lines(tree: &ElementNode) -> Vec<Line<'static>> {
    let mut writer = TreeWriter::default();
    writer.node(tree, Style::default(), false);
    writer.finish()
}

#[derive(Default)]
struct TreeWriter {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl TreeWriter {
    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn push(&mut self, text: String, style: Style) {
        if !text.is_empty() {
            self.current.push(Span::styled(text, style));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.break_line();
        self.lines
    }

    fn node(&mut self, node: &ElementNode, inherited: Style, preformatted: bool) {
        match node {
            ElementNode::Text(text) => self.text(text, inherited, preformatted),
            ElementNode::Element { tag, children, .. } => {
                let style = element_style(node, inherited);
                match tag.as_str() {
                    "br" => self.break_line(),
                    "hr" => {
                        self.break_line();
                        self.lines.push(Line::styled("─".repeat(24), style.fg(Color::DarkGray)));
                    }
                    "button" => {
                        let label = node.text_content();
                        self.push(format!("[ {} ]", label.trim()), button_style(node, style));
                        self.push(" ".to_string(), inherited);
                    }
                    "input" | "textarea" => {
                        let hint = node
                            .prop("value")
                            .or_else(|| node.prop("placeholder"))
                            .and_then(|v| v.as_str())
                            .unwrap_or("");
                        if tag == "textarea" {
                            self.break_line();
                        }
                        self.push(
                            format!("[ {hint:<16} ]"),
                            style.add_modifier(Modifier::UNDERLINED),
                        );
                        if tag == "textarea" {
                            self.break_line();
                        }
                    }
                    _ if BLOCK_TAGS.contains(&tag.as_str()) => {
                        self.break_line();
                        if tag == "li" {
                            self.push("• ".to_string(), style);
                        }
                        let pre = preformatted || tag == "pre";
                        for child in children {
                            self.node(child, style, pre);
                        }
                        self.break_line();
                    }
                    _ => {
                        for child in children {
                            self.node(child, style, preformatted);
                        }
                    }
                }
            }
        }
    }

    fn text(&mut self, text: &str, style: Style, preformatted: bool) {
        if preformatted {
            let mut parts = text.split('\n').peekable();
            while let Some(part) = parts.next() {
                self.push(part.to_string(), style);
                if parts.peek().is_some() {
                    self.break_line();
                }
            }
            return;
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return;
        }
        let leading = text.starts_with(char::is_whitespace) && !self.current.is_empty();
        let trailing = text.ends_with(char::is_whitespace);
        let mut out = String::new();
        if leading {
            out.push(' ');
        }
        out.push_str(&collapsed);
        if trailing {
            out.push(' ');
        }
        self.push(out, style);
    }
}

fn element_style(node: &ElementNode, inherited: Style) -> Style {
    let mut style = inherited;
    match node.tag() {
        Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "strong" | "b" | "th") => {
            style = style.add_modifier(Modifier::BOLD);
        }
        Some("em" | "i") => style = style.add_modifier(Modifier::ITALIC),
        Some("a") => style = style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        Some("code" | "pre") => style = style.fg(Color::Yellow),
        _ => {}
    }
    if let Some(color) = node.style("color").and_then(parse_css_color) {
        style = style.fg(color);
    }
    style
}

fn button_style(node: &ElementNode, style: Style) -> Style {
    let background = node
        .style("background")
        .or_else(|| node.style("backgroundColor"))
        .and_then(parse_css_color);
    match background {
        Some(color) => style.bg(color).add_modifier(Modifier::BOLD),
        None => style.add_modifier(Modifier::REVERSED),
    }
}

/// Named colours and `#rgb` / `#rrggbb` hex values.
pub fn parse_css_color(value: &str) -> Option<Color> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    let color = match value.as_str() {
        "black" => Color::Black,
        "white" => Color::White,
        "red" => Color::Red,
        "green" => Color::Green,
        "blue" => Color::Blue,
        "yellow" => Color::Yellow,
        "cyan" => Color::Cyan,
        "magenta" | "purple" => Color::Magenta,
        "gray" | "grey" => Color::Gray,
        "orange" => Color::Rgb(255, 165, 0),
        _ => return None,
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Color::Rgb(rgb.next()??, rgb.next()??, rgb.next()??))
        }
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn markup_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("markup tag pattern is valid"))
}

/// Raw markup with tags dimmed in cyan so the content stands out.
pub fn markup_lines(markup: &str) -> Vec<Line<'static>> {
    let tag_style = Style::default().fg(Color::Cyan);
    markup
        .lines()
        .map(|line| {
            let mut spans = Vec::new();
            let mut last = 0;
            for found in markup_tag_pattern().find_iter(line) {
                if found.start() > last {
                    spans.push(Span::raw(line[last..found.start()].to_string()));
                }
                spans.push(Span::styled(found.as_str().to_string(), tag_style));
                last = found.end();
            }
            if last < line.len() {
                spans.push(Span::raw(line[last..].to_string()));
            }
            Line::from(spans)
        })
        .collect()
}
