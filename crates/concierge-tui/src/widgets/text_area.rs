//! Multi-line text editor widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Multi-line editor used for the itinerary.
///
/// Lines are stored unwrapped; long lines are clipped horizontally.
#[derive(Debug)]
pub struct TextArea {
    lines: Vec<String>,
    /// Cursor row
    row: usize,
    /// Cursor column (character index)
    col: usize,
    /// First visible row
    top: usize,
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            top: 0,
        }
    }
}

fn byte_offset(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

fn char_count(line: &str) -> usize {
    line.chars().count()
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text; the cursor moves to the end
    pub fn set_text(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.lines = normalized.split('\n').map(str::to_string).collect();
        self.row = self.lines.len() - 1;
        self.col = char_count(&self.lines[self.row]);
        self.top = 0;
    }

    /// The full text joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Cursor as (row, column)
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn current(&self) -> &str {
        &self.lines[self.row]
    }

    fn insert_char(&mut self, c: char) {
        let at = byte_offset(self.current(), self.col);
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    fn insert_newline(&mut self) {
        let at = byte_offset(self.current(), self.col);
        let rest = self.lines[self.row].split_off(at);
        self.row += 1;
        self.lines.insert(self.row, rest);
        self.col = 0;
    }

    fn insert_str(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for c in normalized.chars() {
            match c {
                '\n' => self.insert_newline(),
                '\t' => {
                    for _ in 0..4 {
                        self.insert_char(' ');
                    }
                }
                c if c.is_control() => {}
                c => self.insert_char(c),
            }
        }
    }

    fn backspace(&mut self) -> bool {
        if self.col > 0 {
            self.col -= 1;
            let line = &mut self.lines[self.row];
            let start = byte_offset(line, self.col);
            let end = byte_offset(line, self.col + 1);
            line.drain(start..end);
            true
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = char_count(&self.lines[self.row]);
            self.lines[self.row].push_str(&line);
            true
        } else {
            false
        }
    }

    fn delete(&mut self) -> bool {
        let len = char_count(self.current());
        if self.col < len {
            let line = &mut self.lines[self.row];
            let start = byte_offset(line, self.col);
            let end = byte_offset(line, self.col + 1);
            line.drain(start..end);
            true
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
            true
        } else {
            false
        }
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(char_count(self.current()));
    }

    /// Handle an editing action; returns whether it was consumed.
    ///
    /// Enter inserts a line break here; the caller decides how to close the
    /// editor.
    pub fn handle_action(&mut self, action: &Action) -> bool {
        match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Submit | Action::Newline => {
                self.insert_newline();
                true
            }
            Action::Tab => {
                self.insert_str("\t");
                true
            }
            Action::Paste(text) => {
                self.insert_str(text);
                true
            }
            Action::Backspace => self.backspace(),
            Action::Delete => self.delete(),
            Action::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = char_count(self.current());
                }
                true
            }
            Action::Right => {
                if self.col < char_count(self.current()) {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
                true
            }
            Action::Up => {
                self.row = self.row.saturating_sub(1);
                self.clamp_col();
                true
            }
            Action::Down => {
                self.row = (self.row + 1).min(self.lines.len() - 1);
                self.clamp_col();
                true
            }
            Action::PageUp => {
                self.row = self.row.saturating_sub(10);
                self.clamp_col();
                true
            }
            Action::PageDown => {
                self.row = (self.row + 10).min(self.lines.len() - 1);
                self.clamp_col();
                true
            }
            Action::Home => {
                self.col = 0;
                true
            }
            Action::End => {
                self.col = char_count(self.current());
                true
            }
            Action::ClearLine => {
                self.lines[self.row].clear();
                self.col = 0;
                true
            }
            _ => false,
        }
    }

    /// Render as a popup filling most of `area`
    pub fn render_popup(&mut self, title: &str, hint: &str, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let width = area.width.saturating_sub(4).max(10).min(area.width);
        let height = area.height.saturating_sub(2).max(5).min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        Clear.render(popup, buf);

        let block = Block::default()
            .title(format!(" {} ", title))
            .title_style(theme.accent_bold())
            .title_bottom(Line::styled(format!(" {} ", hint), theme.dim_style()))
            .borders(Borders::ALL)
            .border_style(theme.accent_style());
        let inner = block.inner(popup);
        block.render(popup, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let visible_rows = inner.height as usize;
        if self.row < self.top {
            self.top = self.row;
        } else if self.row >= self.top + visible_rows {
            self.top = self.row + 1 - visible_rows;
        }

        // Clip long lines so the cursor column stays on screen
        let cursor_x: usize = self.current().chars().take(self.col).map(|c| c.width().unwrap_or(0)).sum();
        let left = cursor_x.saturating_sub(inner.width.saturating_sub(1) as usize);

        let lines: Vec<Line> = self
            .lines
            .iter()
            .skip(self.top)
            .take(visible_rows)
            .map(|l| Line::styled(clip(l, left, inner.width as usize), theme.base_style()))
            .collect();
        Paragraph::new(lines).render(inner, buf);

        let x = inner.x + (cursor_x - left) as u16;
        let y = inner.y + (self.row - self.top) as u16;
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_style(Style::default().bg(theme.accent));
        }
    }
}

/// Columns `left..left + width` of `line`
fn clip(line: &str, left: usize, width: usize) -> String {
    let mut col = 0;
    let mut out = String::new();
    for c in line.chars() {
        let w = c.width().unwrap_or(0);
        if col >= left && col + w <= left + width {
            out.push(c);
        }
        col += w;
        if col >= left + width {
            break;
        }
    }
    out
}
