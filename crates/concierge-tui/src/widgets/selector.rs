//! Selector popup widget for choosing from a list of options

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Maximum width for selector popups
const MAX_POPUP_WIDTH: u16 = 80;

/// Maximum height for selector popups, borders included
const MAX_POPUP_HEIGHT: u16 = 20;

/// An item in the selector
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorItem {
    /// Display label
    pub label: String,
    /// Optional dimmed text after the label
    pub description: Option<String>,
    /// Whether this item is currently active
    pub is_current: bool,
}

impl SelectorItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            is_current: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn current(mut self, is_current: bool) -> Self {
        self.is_current = is_current;
        self
    }
}

/// A popup selector
pub struct Selector<'a> {
    title: String,
    items: Vec<SelectorItem>,
    selected: usize,
    empty_text: &'a str,
    theme: &'a Theme,
}

impl<'a> Selector<'a> {
    /// Create a new selector; the current item starts selected
    pub fn new(title: impl Into<String>, items: Vec<SelectorItem>, theme: &'a Theme) -> Self {
        let selected = items.iter().position(|item| item.is_current).unwrap_or(0);
        Self {
            title: title.into(),
            items,
            selected,
            empty_text: "Nothing to choose from",
            theme,
        }
    }

    /// Set the selected index
    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected = index.min(self.items.len().saturating_sub(1));
        self
    }

    /// Text shown when there are no items
    pub fn with_empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }

    /// Popup size as (width, height)
    fn popup_size(&self) -> (u16, u16) {
        let widest_item = self
            .items
            .iter()
            .map(|item| {
                item.label.width() + item.description.as_ref().map_or(0, |d| d.width() + 3) + 6
            })
            .max()
            .unwrap_or(self.empty_text.width() + 4);
        let width = widest_item.max(self.title.width() + 4) as u16;
        let rows = self.items.len().max(1) as u16;
        (width.clamp(20, MAX_POPUP_WIDTH), (rows + 2).min(MAX_POPUP_HEIGHT))
    }

    fn list_item(&self, index: usize, item: &SelectorItem) -> ListItem<'static> {
        let prefix = if item.is_current { "● " } else { "  " };
        let style = if index == self.selected {
            Style::default()
                .bg(self.theme.accent)
                .fg(self.theme.bg)
                .add_modifier(Modifier::BOLD)
        } else if item.is_current {
            self.theme.accent_style()
        } else {
            self.theme.base_style()
        };

        let mut spans = vec![Span::styled(format!("{}{}", prefix, item.label), style)];
        if let Some(description) = &item.description {
            spans.push(Span::styled(format!(" · {}", description), self.theme.dim_style()));
        }
        ListItem::new(Line::from(spans))
    }

    /// Render the selector centered in the given area
    pub fn render_centered(&self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.popup_size();
        let width = width.min(area.width);
        let height = height.min(area.height);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - height) / 2;
        let popup_area = Rect::new(x, y, width, height);

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());

        if self.items.is_empty() {
            let inner = block.inner(popup_area);
            block.render(popup_area, buf);
            Line::styled(format!("  {}", self.empty_text), self.theme.dim_style()).render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| self.list_item(i, item))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.selected));
        StatefulWidget::render(list, popup_area, buf, &mut state);
    }
}

/// Selection state for a [`Selector`]; the default selects the first item
#[derive(Debug, Default)]
pub struct SelectorState {
    /// Currently selected index
    pub selected: usize,
}

impl SelectorState {
    /// Move selection up, wrapping to the bottom
    pub fn up(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = item_count - 1;
        }
    }

    /// Move selection down, wrapping to the top
    pub fn down(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        if self.selected < item_count - 1 {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }
}
