//! One-line prompt popup

use crate::input::Action;
use crate::theme::Theme;
use crate::widgets::InputBox;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Clear, Widget},
};

/// What a key press did to an open prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// Still editing
    Editing,
    /// Enter pressed with this (trimmed) value
    Accepted(String),
    /// Escape pressed, or Enter with nothing typed
    Cancelled,
}

/// A centered single-line prompt, e.g. for a trip name
#[derive(Debug)]
pub struct Prompt {
    input: InputBox,
}

impl Prompt {
    pub fn new(title: impl Into<String>, placeholder: impl Into<String>) -> Self {
        let mut input = InputBox::new()
            .with_title(title)
            .with_placeholder(placeholder);
        input.set_focused(true);
        Self { input }
    }

    /// Feed a key press to the prompt
    pub fn handle_action(&mut self, action: &Action, width: u16) -> PromptResult {
        match action {
            Action::Submit => {
                let value = self.input.take();
                let value = value.trim();
                if value.is_empty() {
                    PromptResult::Cancelled
                } else {
                    PromptResult::Accepted(value.to_string())
                }
            }
            Action::Escape | Action::Interrupt => PromptResult::Cancelled,
            other => {
                self.input.handle_action(other, width);
                PromptResult::Editing
            }
        }
    }

    /// Render centered in `area`
    pub fn render_centered(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let width = area.width.saturating_sub(4).clamp(20, 60).min(area.width);
        let height = 3u16.min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        Clear.render(popup, buf);
        self.input.render(popup, buf, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_trimmed_value() {
        let mut prompt = Prompt::new("Trip name", "e.g. Dubai long weekend");
        for c in " Dubai ".chars() {
            assert_eq!(prompt.handle_action(&Action::Char(c), 40), PromptResult::Editing);
        }
        assert_eq!(
            prompt.handle_action(&Action::Submit, 40),
            PromptResult::Accepted("Dubai".into())
        );
    }

    #[test]
    fn test_empty_name_cancels() {
        let mut prompt = Prompt::new("Trip name", "");
        prompt.handle_action(&Action::Char(' '), 40);
        assert_eq!(prompt.handle_action(&Action::Submit, 40), PromptResult::Cancelled);
        assert_eq!(prompt.handle_action(&Action::Escape, 40), PromptResult::Cancelled);
    }
}
