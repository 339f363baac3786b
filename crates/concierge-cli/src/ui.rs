//! TUI implementation for the concierge

use std::time::{Duration, Instant};

use concierge_core::{Concierge, ConciergeEvent, Outcome, QuickPrompt, Request, Submission};
use concierge_tui::{
    TerminalSession, Theme,
    input::{Action, next_action},
    plain_text,
    widgets::{
        ChatMessage, InputBox, MessageList, Prompt, PromptResult, Selector, SelectorItem,
        SelectorState, Spinner, TextArea, message_list::calculate_message_height,
    },
};
use crossterm::event::EventStream;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use tokio::sync::{broadcast, mpsc};

use crate::commands::{CommandResult, execute_command};
use crate::utils::{event_notice, open_in_browser, truncate_chars};

/// Shown in the status line while a chat turn is in flight
const THINKING_LABEL: &str = "Trip Concierge is thinking...";

/// Itinerary lines shown above the conversation
const ITINERARY_PREVIEW_LINES: usize = 4;

/// Messages delivered to the UI task from spawned work
#[derive(Debug)]
pub enum UiMessage {
    /// A backend request finished
    Outcome(Outcome),
    /// Send whatever is in the input box (delayed quick prompt)
    SendInput,
}

/// Popup currently capturing input
enum Overlay {
    None,
    Trips(SelectorState),
    Images(SelectorState),
    SaveTrip(Prompt),
    Editor(TextArea),
}

/// TUI application state
pub struct TuiState {
    concierge: Concierge,
    events: broadcast::Receiver<ConciergeEvent>,
    /// Conversation plus local notices, in display order
    messages: Vec<ChatMessage>,
    input: InputBox,
    /// Current scroll position; `usize::MAX` pins to the bottom
    scroll: usize,
    status: String,
    theme: Theme,
    overlay: Overlay,
    /// Label for the message pane border
    backend_label: String,
    show_itinerary: bool,
    /// Id of the trip last loaded into the itinerary
    current_trip: Option<String>,
    /// Non-chat requests in flight
    busy: usize,
    spinner_start: Instant,
    ui_tx: mpsc::UnboundedSender<UiMessage>,
    quit: bool,
}

impl TuiState {
    pub fn new(
        concierge: Concierge,
        theme: Theme,
        backend_label: impl Into<String>,
        ui_tx: mpsc::UnboundedSender<UiMessage>,
    ) -> Self {
        let mut input = InputBox::new().with_placeholder("Ask about your trip...");
        input.set_focused(true);
        let events = concierge.subscribe();

        Self {
            concierge,
            events,
            messages: vec![],
            input,
            scroll: 0,
            status: "Ready".to_string(),
            theme,
            overlay: Overlay::None,
            backend_label: backend_label.into(),
            show_itinerary: true,
            current_trip: None,
            busy: 0,
            spinner_start: Instant::now(),
            ui_tx,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved during render once the content height is known
        self.scroll = usize::MAX;
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::notice(text));
        self.scroll_to_bottom();
    }

    fn error_notice(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::error(text));
        self.scroll_to_bottom();
    }

    /// Run a request on its own task; its outcome comes back as a `UiMessage`
    fn spawn(&mut self, request: Request) {
        if !request.is_chat() {
            self.busy += 1;
            self.spinner_start = Instant::now();
        }
        let backend = self.concierge.backend();
        let tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let outcome = request.execute(backend.as_ref()).await;
            let _ = tx.send(UiMessage::Outcome(outcome));
        });
    }

    pub fn refresh_trips(&mut self) {
        let request = self.concierge.begin_list_trips();
        self.spawn(request);
    }

    pub fn handle_ui_message(&mut self, message: UiMessage) {
        match message {
            UiMessage::Outcome(outcome) => {
                if !matches!(outcome, Outcome::Chat { .. }) {
                    self.busy = self.busy.saturating_sub(1);
                }
                for request in self.concierge.apply(outcome) {
                    self.spawn(request);
                }
            }
            UiMessage::SendInput => self.send_input(),
        }
        self.drain_events();
    }

    /// Fold pending concierge events into the view
    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "UI fell behind concierge events");
                }
                Err(_) => break,
            }
        }
    }

    fn handle_event(&mut self, event: ConciergeEvent) {
        match &event {
            ConciergeEvent::MessageAppended { message } => {
                let entry = if message.is_user() {
                    ChatMessage::user(message.content.clone())
                } else {
                    ChatMessage::assistant(message.content.clone(), message.images.clone())
                };
                self.messages.push(entry);
                self.scroll_to_bottom();
                return;
            }
            ConciergeEvent::TurnStart { .. } => {
                self.spinner_start = Instant::now();
                return;
            }
            ConciergeEvent::TurnEnd { failed, .. } => {
                self.status = if *failed {
                    "Request failed".to_string()
                } else {
                    "Ready".to_string()
                };
                return;
            }
            ConciergeEvent::TurnQueued { position } => {
                self.status = format!("Queued ({} waiting)", position);
                return;
            }
            ConciergeEvent::PlacesDetected { places } => {
                self.status = format!("Places: {}", truncate_chars(&places.join(", "), 60));
                return;
            }
            ConciergeEvent::TripsRefreshed { count } => {
                self.status = format!("{} saved trips", count);
                return;
            }
            ConciergeEvent::TripLoaded { id, .. } => self.current_trip = Some(id.clone()),
            _ => {}
        }

        if let Some(notice) = event_notice(&event) {
            if notice.is_error {
                self.error_notice(notice.text);
            } else {
                self.notice(notice.text);
            }
        }
    }

    /// Submit the input box through the concierge
    fn send_input(&mut self) {
        self.concierge.set_input(self.input.content());
        match self.concierge.submit_input() {
            Submission::Rejected => {}
            Submission::Dispatched(request) => {
                self.input.clear();
                self.spawn(request);
            }
            Submission::Queued { .. } => self.input.clear(),
        }
    }

    /// Fill the input box with a canned prompt and send it shortly after
    fn quick_submit(&mut self, prompt: QuickPrompt) {
        self.input.set_content(prompt.text());
        self.concierge.set_input(prompt.text());
        let delay = self.concierge.config().quick_submit_delay;
        let tx = self.ui_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(UiMessage::SendInput);
        });
    }

    fn load_trip(&mut self, query: &str) {
        // Unknown names are tried as ids
        let id = self
            .concierge
            .find_trip(query)
            .map(|t| t.id.clone())
            .unwrap_or_else(|| query.trim().to_string());
        if let Some(request) = self.concierge.begin_load_trip(&id) {
            self.status = format!("Loading trip {}...", truncate_chars(query, 30));
            self.spawn(request);
        }
    }

    fn save_trip(&mut self, name: &str) {
        if let Some(request) = self.concierge.begin_save_trip(name) {
            self.status = format!("Saving \"{}\"...", truncate_chars(name, 30));
            self.spawn(request);
        }
    }

    fn open_image(&mut self, index: usize) {
        let snapshot = self.concierge.snapshot();
        let Some(url) = snapshot.latest_images().get(index) else {
            self.status = format!("No image {}", index + 1);
            return;
        };
        match open_in_browser(url) {
            Ok(()) => self.status = format!("Opened image {}", index + 1),
            Err(e) => {
                tracing::warn!("failed to open image {}: {}", url, e);
                self.status = format!("Image unavailable: {}", e);
            }
        }
    }

    fn open_trip_selector(&mut self) {
        self.refresh_trips();
        let selected = self
            .concierge
            .trips()
            .iter()
            .position(|t| Some(&t.id) == self.current_trip.as_ref())
            .unwrap_or(0);
        self.overlay = Overlay::Trips(SelectorState { selected });
    }

    fn trip_items(&self) -> Vec<SelectorItem> {
        self.concierge
            .trips()
            .iter()
            .map(|t| {
                SelectorItem::new(t.display_name())
                    .with_description(t.id.clone())
                    .current(Some(&t.id) == self.current_trip.as_ref())
            })
            .collect()
    }

    fn open_image_selector(&mut self) {
        self.overlay = Overlay::Images(SelectorState::default());
    }

    fn open_save_prompt(&mut self) {
        self.overlay = Overlay::SaveTrip(Prompt::new("Trip name", "e.g. Dubai long weekend"));
    }

    fn open_editor(&mut self) {
        let mut editor = TextArea::new();
        editor.set_text(self.concierge.conversation().itinerary());
        self.overlay = Overlay::Editor(editor);
    }

    fn handle_command(&mut self, result: CommandResult) {
        match result {
            CommandResult::Message(text) => self.notice(text),
            CommandResult::ListTrips => self.open_trip_selector(),
            CommandResult::LoadTrip(query) => self.load_trip(&query),
            CommandResult::SaveTrip(Some(name)) => self.save_trip(&name),
            CommandResult::SaveTrip(None) => self.open_save_prompt(),
            CommandResult::ShowItinerary => {
                let itinerary = self.concierge.conversation().itinerary().to_string();
                if itinerary.trim().is_empty() {
                    self.notice("Itinerary is empty. Press Ctrl+E to write one.");
                } else {
                    self.notice(format!("Itinerary:\n{}", itinerary));
                }
            }
            CommandResult::EditItinerary | CommandResult::PasteItinerary => self.open_editor(),
            CommandResult::ClearItinerary => {
                self.concierge.set_itinerary("");
                self.status = "Itinerary cleared".to_string();
            }
            CommandResult::Summary => match self.concierge.begin_summary() {
                Some(request) => {
                    self.status = "Summarizing itinerary...".to_string();
                    self.spawn(request);
                }
                None => self.notice("Itinerary is empty, nothing to summarize."),
            },
            CommandResult::Weather { lat, lon } => match self.concierge.begin_forecast(lat, lon) {
                Some(request) => {
                    self.status = "Fetching weather...".to_string();
                    self.spawn(request);
                }
                None => self.error_notice(format!("Invalid coordinates: {}, {}", lat, lon)),
            },
            CommandResult::ListImages => self.open_image_selector(),
            CommandResult::OpenImage(n) => self.open_image(n - 1),
            CommandResult::Quick(prompt) => self.quick_submit(prompt),
            CommandResult::Exit => self.quit = true,
            CommandResult::Usage(usage) => self.error_notice(format!("Usage: {}", usage)),
            CommandResult::Unknown(command) => {
                self.error_notice(format!("Unknown command: /{}. Type /help for commands.", command))
            }
        }
    }

    /// Route a key press to the open popup; returns false when none is open
    fn handle_overlay_action(&mut self, action: &Action, width: u16) -> bool {
        match &mut self.overlay {
            Overlay::None => return false,
            Overlay::Trips(state) => {
                let count = self.concierge.trips().len();
                match action {
                    Action::Up => state.up(count),
                    Action::Down => state.down(count),
                    Action::Submit => {
                        let id = self.concierge.trips().get(state.selected).map(|t| t.id.clone());
                        self.overlay = Overlay::None;
                        if let Some(id) = id {
                            self.load_trip(&id);
                        }
                    }
                    Action::Escape | Action::Interrupt | Action::TripSelect => {
                        self.overlay = Overlay::None
                    }
                    _ => {}
                }
            }
            Overlay::Images(state) => {
                let count = self.concierge.snapshot().latest_images().len();
                match action {
                    Action::Up => state.up(count),
                    Action::Down => state.down(count),
                    Action::Submit => {
                        let selected = state.selected;
                        self.overlay = Overlay::None;
                        if count > 0 {
                            self.open_image(selected);
                        }
                    }
                    Action::Escape | Action::Interrupt | Action::ImageSelect => {
                        self.overlay = Overlay::None
                    }
                    _ => {}
                }
            }
            Overlay::SaveTrip(prompt) => match prompt.handle_action(action, width) {
                PromptResult::Editing => {}
                PromptResult::Accepted(name) => {
                    self.overlay = Overlay::None;
                    self.save_trip(&name);
                }
                PromptResult::Cancelled => self.overlay = Overlay::None,
            },
            Overlay::Editor(editor) => match action {
                Action::Escape | Action::EditItinerary => {
                    let text = editor.text();
                    self.overlay = Overlay::None;
                    self.concierge.set_itinerary(text);
                    self.status = "Itinerary updated".to_string();
                }
                Action::Interrupt => {
                    self.overlay = Overlay::None;
                    self.status = "Edit discarded".to_string();
                }
                other => {
                    editor.handle_action(other);
                }
            },
        }
        true
    }

    /// Handle a key press or paste
    pub fn handle_action(&mut self, action: Action, width: u16) {
        if !self.handle_overlay_action(&action, width) {
            self.handle_main_action(action, width);
        }
        self.drain_events();
    }

    fn handle_main_action(&mut self, action: Action, width: u16) {
        match action {
            Action::Submit => {
                let content = self.input.content().to_string();
                if let Some(result) = execute_command(&content) {
                    self.input.clear();
                    self.handle_command(result);
                } else {
                    self.send_input();
                }
            }
            Action::Quit | Action::Interrupt | Action::Escape => self.quit = true,
            Action::SaveTrip => self.open_save_prompt(),
            Action::TripSelect => self.open_trip_selector(),
            Action::EditItinerary => self.open_editor(),
            Action::ImageSelect => self.open_image_selector(),
            Action::Quick(index) => {
                if let Some(prompt) = QuickPrompt::ALL.get(index) {
                    self.quick_submit(*prompt);
                }
            }
            Action::Tab => self.show_itinerary = !self.show_itinerary,
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
            }
            other => {
                if self.input.handle_action(&other, width) {
                    self.concierge.set_input(self.input.content());
                }
            }
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let itinerary = self.concierge.conversation().itinerary();
        let preview_height = if self.show_itinerary && !itinerary.trim().is_empty() {
            let lines = plain_text::lines(itinerary).len().min(ITINERARY_PREVIEW_LINES);
            lines as u16 + 2
        } else {
            0
        };

        // Layout: itinerary (optional), messages (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(preview_height),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(size);

        if preview_height > 0 {
            self.render_itinerary(frame, chunks[0]);
        }
        self.render_messages(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
        self.input.render(chunks[3], frame.buffer_mut(), &self.theme);

        match &mut self.overlay {
            Overlay::None => {}
            Overlay::Trips(state) => {
                let selected = state.selected;
                let items = self.trip_items();
                Selector::new("Saved trips", items, &self.theme)
                    .with_selected(selected)
                    .with_empty_text("No saved trips")
                    .render_centered(size, frame.buffer_mut());
            }
            Overlay::Images(state) => {
                let snapshot = self.concierge.snapshot();
                let items = snapshot
                    .latest_images()
                    .iter()
                    .enumerate()
                    .map(|(i, url)| SelectorItem::new(format!("[{}] {}", i + 1, truncate_chars(url, 60))))
                    .collect();
                Selector::new("Open image", items, &self.theme)
                    .with_selected(state.selected)
                    .with_empty_text("No images yet")
                    .render_centered(size, frame.buffer_mut());
            }
            Overlay::SaveTrip(prompt) => {
                prompt.render_centered(size, frame.buffer_mut(), &self.theme);
            }
            Overlay::Editor(editor) => {
                editor.render_popup(
                    "Itinerary",
                    "Esc: done │ Ctrl+C: discard │ Enter: new line",
                    size,
                    frame.buffer_mut(),
                    &self.theme,
                );
            }
        }
    }

    fn render_itinerary(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(" Itinerary │ Tab: hide │ Ctrl+E: edit ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width as usize;
        let lines: Vec<Line> = plain_text::lines(self.concierge.conversation().itinerary())
            .into_iter()
            .take(ITINERARY_PREVIEW_LINES)
            .map(|l| Line::styled(truncate_chars(&l, width.saturating_sub(3)), self.theme.dim_style()))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" Trip Concierge │ {} ", self.backend_label);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || self.messages.is_empty() {
            frame.render_widget(welcome_screen(), inner);
            return;
        }

        let content_height = calculate_message_height(&self.messages, inner.width as usize);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let message_list = MessageList::new(&self.messages, &self.theme).scroll(self.scroll);
        frame.render_widget(message_list, inner);

        // Render scrollbar if content overflows
        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let snapshot_pending = self.concierge.conversation().is_pending();
        if snapshot_pending || self.busy > 0 {
            let label = if snapshot_pending {
                THINKING_LABEL.to_string()
            } else {
                self.status.clone()
            };
            let spinner = Spinner::new(&label, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left_content = self.status.as_str();
        let right_content = "F1-F3: quick │ Ctrl+T: trips │ Ctrl+S: save │ Ctrl+O: images";

        let left_width = left_content.chars().count();
        let right_width = right_content.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(left_content, self.theme.dim_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right_content, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(left_content, self.theme.dim_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

fn key_line(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<10}", key), Style::default().fg(Color::Cyan)),
        Span::styled(text, Style::default().fg(Color::White)),
    ])
}

fn welcome_screen() -> Paragraph<'static> {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "  ✈ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Trip Concierge",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" - travel planning assistant", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Keybindings", Style::default().fg(Color::Yellow))),
        Line::from(""),
        key_line("Enter", "Send message"),
        key_line("Ctrl+E", "Edit itinerary"),
        key_line("Ctrl+S", "Save itinerary as a trip"),
        key_line("Ctrl+T", "Load a saved trip"),
        key_line("Ctrl+O", "Open an image from the latest answer"),
    ];
    for (i, prompt) in QuickPrompt::ALL.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("    F{:<9}", i + 1), Style::default().fg(Color::Cyan)),
            Span::styled(prompt.text(), Style::default().fg(Color::White)),
        ]));
    }
    lines.extend([
        key_line("Tab", "Show/hide itinerary"),
        key_line("PgUp/Dn", "Scroll history"),
        key_line("Esc", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "  Type a question or /help to get started...",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    Paragraph::new(lines)
}

/// Run the TUI application
pub async fn run_tui(
    concierge: Concierge,
    theme: Theme,
    backend_label: &str,
) -> anyhow::Result<()> {
    let mut session = TerminalSession::enter()?;

    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel::<UiMessage>();
    let mut state = TuiState::new(concierge, theme, backend_label, ui_tx);
    state.refresh_trips();

    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    while !state.should_quit() {
        session.draw(|frame| state.render(frame))?;
        let width = session.size()?.width;

        tokio::select! {
            action = next_action(&mut event_stream) => match action {
                Some(Ok(action)) => state.handle_action(action, width),
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(message) = ui_rx.recv() => state.handle_ui_message(message),
            _ = tick_interval.tick() => {}
        }
    }

    session.restore()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_api::{
        Backend, ChatRequest, ChatResponse, Forecast, Metadata, NewTrip, Result, SavedTrip, Trip,
        TripSummary,
    };
    use std::sync::Arc;

    struct FixedBackend;

    #[async_trait::async_trait]
    impl Backend for FixedBackend {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                answer: Some(format!("re: {}", request.question)),
                images: vec!["https://img/1.jpg".into()],
                places: vec![],
            })
        }
        async fn list_trips(&self) -> Result<Vec<TripSummary>> {
            Ok(vec![
                TripSummary {
                    id: "a1".into(),
                    name: Some("Dubai".into()),
                    metadata: Metadata::new(),
                },
                TripSummary {
                    id: "b2".into(),
                    name: Some("Paris".into()),
                    metadata: Metadata::new(),
                },
            ])
        }
        async fn get_trip(&self, id: &str) -> Result<Trip> {
            Ok(Trip {
                itinerary: format!("itinerary {id}"),
                ..Default::default()
            })
        }
        async fn save_trip(&self, _trip: &NewTrip) -> Result<SavedTrip> {
            Ok(SavedTrip::default())
        }
        async fn summarize(&self, _itinerary: &str) -> Result<String> {
            Ok("short".into())
        }
        async fn forecast(&self, _lat: f64, _lon: f64) -> Result<Forecast> {
            Ok(Forecast::default())
        }
    }

    fn make_state() -> (TuiState, mpsc::UnboundedReceiver<UiMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let concierge = Concierge::new(Arc::new(FixedBackend));
        (TuiState::new(concierge, Theme::dark(), "test", tx), rx)
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 80);
        }
    }

    async fn pump(state: &mut TuiState, rx: &mut mpsc::UnboundedReceiver<UiMessage>) {
        let message = rx.recv().await.unwrap();
        state.handle_ui_message(message);
    }

    #[tokio::test]
    async fn test_submit_echoes_then_renders_answer() {
        let (mut state, mut rx) = make_state();
        type_text(&mut state, "Plan my day");
        state.handle_action(Action::Submit, 80);

        assert_eq!(state.messages, vec![ChatMessage::user("Plan my day")]);
        assert!(state.input.is_empty());
        assert!(state.concierge.conversation().is_pending());

        pump(&mut state, &mut rx).await;
        assert_eq!(state.messages.len(), 2);
        assert_eq!(
            state.messages[1],
            ChatMessage::assistant("re: Plan my day", vec!["https://img/1.jpg".into()])
        );
        assert!(!state.concierge.conversation().is_pending());
    }

    #[tokio::test]
    async fn test_commands_are_not_sent_as_chat() {
        let (mut state, _rx) = make_state();
        type_text(&mut state, "/itinerary");
        state.handle_action(Action::Submit, 80);

        assert!(state.concierge.conversation().messages().is_empty());
        assert_eq!(state.messages.len(), 1);
        assert!(state.messages[0].content.starts_with("Itinerary is empty"));
    }

    #[tokio::test]
    async fn test_trip_selector_loads_selected_trip() {
        let (mut state, mut rx) = make_state();
        state.handle_action(Action::TripSelect, 80);
        pump(&mut state, &mut rx).await;
        assert_eq!(state.concierge.trips().len(), 2);

        state.handle_action(Action::Submit, 80);
        assert!(matches!(state.overlay, Overlay::None));
        pump(&mut state, &mut rx).await;
        assert_eq!(state.concierge.conversation().itinerary(), "itinerary a1");
        assert!(state.concierge.conversation().messages().is_empty());
    }

    #[tokio::test]
    async fn test_trip_selector_marks_loaded_trip() {
        let (mut state, mut rx) = make_state();
        state.handle_action(Action::TripSelect, 80);
        pump(&mut state, &mut rx).await;
        state.handle_action(Action::Down, 80);
        state.handle_action(Action::Submit, 80);
        pump(&mut state, &mut rx).await;
        assert_eq!(state.concierge.conversation().itinerary(), "itinerary b2");

        state.handle_action(Action::TripSelect, 80);
        let Overlay::Trips(selector) = &state.overlay else {
            panic!("trip selector should be open");
        };
        assert_eq!(selector.selected, 1);
        let current: Vec<bool> = state.trip_items().iter().map(|i| i.is_current).collect();
        assert_eq!(current, vec![false, true]);
    }

    #[tokio::test]
    async fn test_quick_prompt_fills_input_then_sends() {
        let (mut state, mut rx) = make_state();
        state.handle_action(Action::Quick(0), 80);
        assert_eq!(state.input.content(), "Recommend 3 morning activities");
        assert!(state.concierge.conversation().messages().is_empty());

        // Delayed send, then the chat outcome
        pump(&mut state, &mut rx).await;
        assert!(state.input.is_empty());
        assert!(state.concierge.conversation().is_pending());
        pump(&mut state, &mut rx).await;

        assert_eq!(
            state.messages,
            vec![
                ChatMessage::user("Recommend 3 morning activities"),
                ChatMessage::assistant(
                    "re: Recommend 3 morning activities",
                    vec!["https://img/1.jpg".into()]
                ),
            ]
        );
        assert!(!state.concierge.conversation().is_pending());
    }

    #[tokio::test]
    async fn test_editor_applies_on_escape() {
        let (mut state, _rx) = make_state();
        state.handle_action(Action::EditItinerary, 80);
        state.handle_action(Action::Paste("Day 1\nDay 2".into()), 80);
        state.handle_action(Action::Escape, 80);

        assert!(matches!(state.overlay, Overlay::None));
        assert_eq!(state.concierge.conversation().itinerary(), "Day 1\nDay 2");
        assert!(!state.should_quit());
    }

    #[tokio::test]
    async fn test_empty_save_prompt_is_cancelled() {
        let (mut state, _rx) = make_state();
        state.handle_action(Action::SaveTrip, 80);
        state.handle_action(Action::Submit, 80);
        assert!(matches!(state.overlay, Overlay::None));
        assert_eq!(state.busy, 0);
    }

    #[tokio::test]
    async fn test_escape_quits_from_main_view() {
        let (mut state, _rx) = make_state();
        state.handle_action(Action::Escape, 80);
        assert!(state.should_quit());
    }
}
