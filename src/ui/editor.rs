use crate::ui::input_metrics::clamp_to_char_boundary_left;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// The key edited the buffer or moved the cursor.
    Edited,
    Submit(String),
    /// The key is not an editing key; the caller may map it.
    Unhandled,
}

/// Single prompt line with cursor movement and submit history.
#[derive(Debug, Default)]
pub struct PromptEditor {
    buffer: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    stash: Option<String>,
}

impl PromptEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn prev_boundary(&self) -> usize {
        let at = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        self.buffer[..at]
            .char_indices()
            .next_back()
            .map_or(0, |(idx, _)| idx)
    }

    fn next_boundary(&self) -> usize {
        let at = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        self.buffer[at..]
            .chars()
            .next()
            .map_or(self.buffer.len(), |ch| at + ch.len_utf8())
    }

    pub fn insert_str(&mut self, value: &str) {
        self.history_index = None;
        let at = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        self.buffer.insert_str(at, value);
        self.cursor = at + value.len();
    }

    pub fn backspace(&mut self) {
        let end = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        if end == 0 {
            return;
        }
        let start = self.prev_boundary();
        self.buffer.replace_range(start..end, "");
        self.cursor = start;
    }

    pub fn delete(&mut self) {
        let start = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        if start >= self.buffer.len() {
            return;
        }
        let end = self.next_boundary();
        self.buffer.replace_range(start..end, "");
        self.cursor = start;
    }

    /// Takes the trimmed buffer; whitespace-only input is discarded.
    pub fn submit(&mut self) -> Option<String> {
        let value = self.buffer.trim().to_string();
        self.buffer.clear();
        self.cursor = 0;
        self.history_index = None;
        self.stash = None;
        if value.is_empty() {
            return None;
        }
        if self.history.last() != Some(&value) {
            self.history.push(value.clone());
        }
        Some(value)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            Some(idx) => idx.saturating_sub(1),
            None => {
                self.stash = Some(self.buffer.clone());
                self.history.len() - 1
            }
        };
        self.history_index = Some(index);
        self.buffer = self.history[index].clone();
        self.cursor = self.buffer.len();
    }

    pub fn history_next(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };
        if idx + 1 < self.history.len() {
            self.history_index = Some(idx + 1);
            self.buffer = self.history[idx + 1].clone();
        } else {
            self.history_index = None;
            self.buffer = self.stash.take().unwrap_or_default();
        }
        self.cursor = self.buffer.len();
    }

    pub fn apply_key(&mut self, key: KeyEvent) -> EditorAction {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.insert_str("\n")
            }
            KeyCode::Char('j') if control => self.insert_str("\n"),
            KeyCode::Char('u') if control => self.clear(),
            KeyCode::Enter => {
                return match self.submit() {
                    Some(value) => EditorAction::Submit(value),
                    None => EditorAction::Edited,
                }
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Home if !control => self.cursor = 0,
            KeyCode::End if !control => self.cursor = self.buffer.len(),
            KeyCode::Up if !control => self.history_prev(),
            KeyCode::Down if !control => self.history_next(),
            KeyCode::Char(ch) if !control && !alt => self.insert_str(ch.encode_utf8(&mut [0; 4])),
            _ => return EditorAction::Unhandled,
        }
        EditorAction::Edited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(editor: &mut PromptEditor, text: &str) {
        for ch in text.chars() {
            editor.apply_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn editing_respects_char_boundaries() {
        let mut editor = PromptEditor::new();
        type_text(&mut editor, "héllo");
        editor.apply_key(key(KeyCode::Left));
        editor.apply_key(key(KeyCode::Left));
        editor.apply_key(key(KeyCode::Left));
        editor.apply_key(key(KeyCode::Backspace));
        assert_eq!(editor.buffer(), "hllo");
        editor.apply_key(key(KeyCode::Delete));
        assert_eq!(editor.buffer(), "hlo");
        assert_eq!(editor.cursor(), 1);
    }

    #[test]
    fn submit_trims_and_skips_blank_input() {
        let mut editor = PromptEditor::new();
        type_text(&mut editor, "   ");
        assert_eq!(editor.apply_key(key(KeyCode::Enter)), EditorAction::Edited);
        type_text(&mut editor, " a red button ");
        assert_eq!(
            editor.apply_key(key(KeyCode::Enter)),
            EditorAction::Submit("a red button".into())
        );
        assert!(editor.is_empty());
    }

    #[test]
    fn history_recalls_previous_submissions() {
        let mut editor = PromptEditor::new();
        type_text(&mut editor, "one");
        editor.submit();
        type_text(&mut editor, "two");
        editor.submit();
        type_text(&mut editor, "draft");

        editor.history_prev();
        assert_eq!(editor.buffer(), "two");
        editor.history_prev();
        assert_eq!(editor.buffer(), "one");
        editor.history_next();
        editor.history_next();
        assert_eq!(editor.buffer(), "draft");
    }

    #[test]
    fn control_keys_are_left_to_the_caller() {
        let mut editor = PromptEditor::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(editor.apply_key(ctrl_c), EditorAction::Unhandled);
        assert_eq!(editor.apply_key(key(KeyCode::PageUp)), EditorAction::Unhandled);
    }
}
