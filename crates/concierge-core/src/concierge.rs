//! Conversation state manager and trip store client

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use concierge_api::{Backend, ChatRequest, Message, NewTrip, TripSummary};
use tokio::sync::broadcast;

use crate::{
    conversation::{Conversation, ConversationSnapshot, TurnId},
    events::ConciergeEvent,
    quick::QuickPrompt,
    request::{Outcome, Request},
    trips,
};

/// Content of the assistant message appended when an answer is missing
pub const FALLBACK_ANSWER: &str = "No answer";

/// Content of the assistant message appended when a chat request fails
pub const SERVER_ERROR_TEXT: &str = "Server error.";

/// Concierge configuration
#[derive(Debug, Clone)]
pub struct ConciergeConfig {
    /// Submissions held while a turn is in flight; the oldest is dropped beyond this
    pub max_queued_turns: usize,
    /// Pause between filling the input buffer and sending a quick prompt
    pub quick_submit_delay: Duration,
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            max_queued_turns: 100,
            quick_submit_delay: Duration::from_millis(120),
        }
    }
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Empty or whitespace-only; nothing changed
    Rejected,
    /// The user message was appended and this request must be executed
    Dispatched(Request),
    /// A turn is in flight; the text waits at this 1-based queue position
    Queued { position: usize },
}

/// Owns the conversation log, the input and itinerary buffers, the pending
/// flag and the cached trip list.
///
/// Mutation is synchronous: operations return the [`Request`] to execute and
/// the caller feeds the resulting [`Outcome`] back through [`apply`]. Chat
/// turns are serialized; submissions made while a turn is in flight are
/// queued and dispatched in order as turns resolve.
///
/// [`apply`]: Concierge::apply
pub struct Concierge {
    config: ConciergeConfig,
    conversation: Conversation,
    trips: Vec<TripSummary>,
    queue: VecDeque<String>,
    next_turn: u64,
    backend: Arc<dyn Backend>,
    event_tx: broadcast::Sender<ConciergeEvent>,
}

impl Concierge {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_config(ConciergeConfig::default(), backend)
    }

    pub fn with_config(config: ConciergeConfig, backend: Arc<dyn Backend>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            conversation: Conversation::default(),
            trips: vec![],
            queue: VecDeque::new(),
            next_turn: 0,
            backend,
            event_tx,
        }
    }

    /// Subscribe to concierge events
    pub fn subscribe(&self) -> broadcast::Receiver<ConciergeEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &ConciergeConfig {
        &self.config
    }

    /// Backend the async helpers execute against
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Cached trip summaries
    pub fn trips(&self) -> &[TripSummary] {
        &self.trips
    }

    /// Resolve an id or name against the cached trips
    pub fn find_trip(&self, query: &str) -> Option<&TripSummary> {
        trips::find_trip(&self.trips, query)
    }

    /// Copy the state for rendering
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.conversation.messages().to_vec(),
            input: self.conversation.input().to_string(),
            itinerary: self.conversation.itinerary().to_string(),
            pending: self.conversation.is_pending(),
            in_flight: self.conversation.in_flight(),
            queued: self.queue.iter().cloned().collect(),
            trips: self.trips.clone(),
        }
    }

    /// Replace the pending-input buffer
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.conversation.set_input(input.into());
    }

    /// Replace the itinerary buffer
    pub fn set_itinerary(&mut self, itinerary: impl Into<String>) {
        self.conversation.set_itinerary(itinerary.into());
    }

    /// Submit the pending-input buffer. The buffer is cleared unless rejected.
    pub fn submit_input(&mut self) -> Submission {
        if self.conversation.input().trim().is_empty() {
            return Submission::Rejected;
        }
        let text = self.conversation.input().to_string();
        self.conversation.clear_input();
        self.submit_text(text)
    }

    /// Submit `text` as the next user turn
    pub fn submit_text(&mut self, text: impl Into<String>) -> Submission {
        let text = text.into();
        if text.trim().is_empty() {
            return Submission::Rejected;
        }

        if !self.conversation.is_pending() {
            return Submission::Dispatched(self.dispatch_turn(text));
        }

        if self.config.max_queued_turns == 0 {
            tracing::warn!("Turn queue disabled, dropping submission");
            let _ = self
                .event_tx
                .send(ConciergeEvent::QueuedTurnDropped { text });
            return Submission::Rejected;
        }
        if self.queue.len() >= self.config.max_queued_turns {
            if let Some(dropped) = self.queue.pop_front() {
                tracing::warn!(
                    "Turn queue full ({} submissions), dropping oldest",
                    self.config.max_queued_turns
                );
                let _ = self
                    .event_tx
                    .send(ConciergeEvent::QueuedTurnDropped { text: dropped });
            }
        }

        self.queue.push_back(text);
        let position = self.queue.len();
        tracing::debug!(position, "queued submission behind in-flight turn");
        let _ = self.event_tx.send(ConciergeEvent::TurnQueued { position });
        Submission::Queued { position }
    }

    /// Append the user message and build its chat request.
    fn dispatch_turn(&mut self, text: String) -> Request {
        let turn = TurnId(self.next_turn);
        self.next_turn += 1;

        let message = Message::user(text.clone());
        self.conversation.push(message.clone());
        let _ = self
            .event_tx
            .send(ConciergeEvent::MessageAppended { message });

        // History includes the message just appended
        let request = ChatRequest {
            question: text,
            history: self.conversation.messages().to_vec(),
            itinerary_content: self.conversation.itinerary().to_string(),
        };

        self.conversation.begin_turn(turn);
        tracing::debug!(%turn, history = request.history.len(), "dispatching chat turn");
        let _ = self.event_tx.send(ConciergeEvent::TurnStart { turn });
        Request::Chat { turn, request }
    }

    /// Request a refresh of the cached trip list
    pub fn begin_list_trips(&self) -> Request {
        Request::ListTrips
    }

    /// Request a trip's itinerary; `None` for an empty id
    pub fn begin_load_trip(&self, id: &str) -> Option<Request> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        Some(Request::LoadTrip { id: id.to_string() })
    }

    /// Request saving the itinerary buffer under `name`; `None` for an empty name
    pub fn begin_save_trip(&self, name: &str) -> Option<Request> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Request::SaveTrip {
            trip: NewTrip::new(name, self.conversation.itinerary()),
        })
    }

    /// Request a summary of the itinerary buffer; `None` when it is empty
    pub fn begin_summary(&self) -> Option<Request> {
        let itinerary = self.conversation.itinerary();
        if itinerary.trim().is_empty() {
            return None;
        }
        Some(Request::Summarize {
            itinerary: itinerary.to_string(),
        })
    }

    /// Request a forecast; `None` for coordinates off the globe
    pub fn begin_forecast(&self, lat: f64, lon: f64) -> Option<Request> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Request::Forecast { lat, lon })
    }

    /// Fold a finished request into the state.
    ///
    /// Returns follow-up requests the caller must execute: the next queued
    /// turn once a chat turn resolves, or a trip list refresh after a save.
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Request> {
        match outcome {
            Outcome::Chat { turn, result } => {
                if !self.conversation.finish_turn(turn) {
                    tracing::warn!(%turn, "discarding outcome of a turn that is not in flight");
                    let _ = self.event_tx.send(ConciergeEvent::StaleOutcome { turn });
                    return vec![];
                }

                let failed = result.is_err();
                let message = match result {
                    Ok(response) => {
                        if !response.places.is_empty() {
                            let _ = self.event_tx.send(ConciergeEvent::PlacesDetected {
                                places: response.places,
                            });
                        }
                        let answer = response
                            .answer
                            .filter(|a| !a.is_empty())
                            .unwrap_or_else(|| FALLBACK_ANSWER.to_string());
                        Message::assistant_with_images(answer, response.images)
                    }
                    Err(e) => {
                        tracing::error!(
                            %turn,
                            transport = e.is_transport(),
                            status = ?e.status_code(),
                            "chat request failed: {}",
                            e
                        );
                        Message::assistant(SERVER_ERROR_TEXT)
                    }
                };

                self.conversation.push(message.clone());
                let _ = self
                    .event_tx
                    .send(ConciergeEvent::MessageAppended { message });
                let _ = self.event_tx.send(ConciergeEvent::TurnEnd { turn, failed });

                self.queue
                    .pop_front()
                    .map(|text| self.dispatch_turn(text))
                    .into_iter()
                    .collect()
            }

            Outcome::TripList(result) => {
                match result {
                    Ok(trips) => {
                        tracing::debug!(count = trips.len(), "trip list refreshed");
                        let count = trips.len();
                        self.trips = trips;
                        let _ = self.event_tx.send(ConciergeEvent::TripsRefreshed { count });
                    }
                    Err(e) => {
                        tracing::warn!(
                            transport = e.is_transport(),
                            "failed to fetch trips, keeping cached list: {}",
                            e
                        );
                    }
                }
                vec![]
            }

            Outcome::TripLoaded { id, result } => {
                match result {
                    Ok(trip) => {
                        tracing::info!(%id, "loaded trip");
                        self.conversation.set_itinerary(trip.itinerary);
                        let _ = self.event_tx.send(ConciergeEvent::TripLoaded {
                            id,
                            name: trip.name,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(%id, status = ?e.status_code(), "failed to load trip: {}", e);
                        let _ = self.event_tx.send(ConciergeEvent::TripLoadFailed {
                            id,
                            error: e.to_string(),
                        });
                    }
                }
                vec![]
            }

            Outcome::TripSaved { name, result } => match result {
                Ok(saved) => {
                    tracing::info!(%name, "saved trip");
                    let _ = self
                        .event_tx
                        .send(ConciergeEvent::TripSaved { name, id: saved.id });
                    vec![Request::ListTrips]
                }
                Err(e) => {
                    tracing::warn!(%name, status = ?e.status_code(), "failed to save trip: {}", e);
                    let _ = self.event_tx.send(ConciergeEvent::TripSaveFailed {
                        name,
                        error: e.to_string(),
                    });
                    vec![]
                }
            },

            Outcome::Summary(result) => {
                let event = match result {
                    Ok(summary) => ConciergeEvent::Summary { summary },
                    Err(e) => {
                        tracing::warn!("summary failed: {}", e);
                        ConciergeEvent::SummaryFailed {
                            error: e.to_string(),
                        }
                    }
                };
                let _ = self.event_tx.send(event);
                vec![]
            }

            Outcome::Forecast { lat, lon, result } => {
                let event = match result {
                    Ok(forecast) => ConciergeEvent::Forecast { lat, lon, forecast },
                    Err(e) => {
                        tracing::warn!(lat, lon, "forecast failed: {}", e);
                        ConciergeEvent::ForecastFailed {
                            error: e.to_string(),
                        }
                    }
                };
                let _ = self.event_tx.send(event);
                vec![]
            }
        }
    }

    /// Execute `request` and every follow-up it produces, in order.
    pub async fn run(&mut self, request: Request) {
        let backend = self.backend();
        let mut pending = VecDeque::from([request]);
        while let Some(request) = pending.pop_front() {
            let outcome = request.execute(backend.as_ref()).await;
            pending.extend(self.apply(outcome));
        }
    }

    async fn run_submission(&mut self, submission: Submission) -> Submission {
        if let Submission::Dispatched(request) = &submission {
            self.run(request.clone()).await;
        }
        submission
    }

    /// Submit `text` and wait for its turn to resolve
    pub async fn submit(&mut self, text: &str) -> Submission {
        let submission = self.submit_text(text);
        self.run_submission(submission).await
    }

    /// Submit the pending-input buffer and wait for its turn to resolve
    pub async fn send_input(&mut self) -> Submission {
        let submission = self.submit_input();
        self.run_submission(submission).await
    }

    /// Fill the input buffer with a canned prompt, pause, then send it
    pub async fn quick_submit(&mut self, prompt: QuickPrompt) -> Submission {
        self.set_input(prompt.text());
        tokio::time::sleep(self.config.quick_submit_delay).await;
        self.send_input().await
    }

    /// Refresh the cached trip list
    pub async fn refresh_trips(&mut self) {
        self.run(Request::ListTrips).await;
    }

    /// Load a trip's itinerary into the itinerary buffer
    pub async fn load_trip(&mut self, id: &str) {
        if let Some(request) = self.begin_load_trip(id) {
            self.run(request).await;
        }
    }

    /// Save the itinerary buffer under `name`, then refresh the trip list
    pub async fn save_trip(&mut self, name: &str) {
        if let Some(request) = self.begin_save_trip(name) {
            self.run(request).await;
        }
    }

    /// Summarize the itinerary buffer
    pub async fn summarize_itinerary(&mut self) {
        if let Some(request) = self.begin_summary() {
            self.run(request).await;
        }
    }

    /// Fetch a forecast for a coordinate
    pub async fn forecast(&mut self, lat: f64, lon: f64) {
        if let Some(request) = self.begin_forecast(lat, lon) {
            self.run(request).await;
        }
    }
}
