//! Message list widget for displaying the conversation

use crate::plain_text;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Who a rendered entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    /// Local status output, never part of the conversation log
    Notice,
}

/// A single entry in the chat view
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    /// Plain-text content; line breaks are the only structure
    pub content: String,
    /// Image URLs shown as numbered links under the content
    pub images: Vec<String>,
    /// Render in the error style
    pub is_error: bool,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            images: vec![],
            is_error: false,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            images,
            is_error: false,
        }
    }

    /// Create a local notice
    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Notice,
            content: content.into(),
            images: vec![],
            is_error: false,
        }
    }

    /// Create a local error notice
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::notice(content)
        }
    }
}

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

/// Screen rows for one message: header, wrapped content, image links, separator
pub fn message_lines(msg: &ChatMessage, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (header, header_style) = match msg.speaker {
        Speaker::User => ("▶ You", theme.accent_bold()),
        Speaker::Assistant => ("◀ Concierge", theme.assistant_bold()),
        Speaker::Notice if msg.is_error => ("● Error", theme.error_style()),
        Speaker::Notice => ("● Notice", theme.dim_style()),
    };
    lines.push(Line::from(Span::styled(header, header_style)));

    let content_style = match msg.speaker {
        _ if msg.is_error => theme.error_style(),
        Speaker::Notice => theme.dim_style(),
        _ => theme.base_style(),
    };
    let content_width = width.saturating_sub(2);
    for row in plain_text::wrap(&msg.content, content_width) {
        lines.push(Line::from(Span::styled(format!("  {}", row), content_style)));
    }

    for (i, url) in msg.images.iter().enumerate() {
        let label = format!("  [{}] ", i + 1);
        let url_width = content_width.saturating_sub(label.chars().count()).max(1);
        let url = plain_text::single_line(url);
        for (j, row) in textwrap::wrap(&url, url_width).into_iter().enumerate() {
            let prefix = if j == 0 {
                label.clone()
            } else {
                " ".repeat(label.chars().count())
            };
            lines.push(Line::from(vec![
                Span::styled(prefix, theme.dim_style()),
                Span::styled(row.into_owned(), theme.link_style()),
            ]));
        }
    }

    // Empty line between messages
    lines.push(Line::from(""));
    lines
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let visible_lines: Vec<Line> = self
            .messages
            .iter()
            .flat_map(|msg| message_lines(msg, self.theme, width))
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible_lines)
            .style(Style::default())
            .render(area, buf);
    }
}

/// Calculate total height of messages
pub fn calculate_message_height(messages: &[ChatMessage], width: usize) -> usize {
    let theme = Theme::dark();
    messages
        .iter()
        .map(|msg| message_lines(msg, &theme, width).len())
        .sum()
}
