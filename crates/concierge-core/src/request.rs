//! Backend requests and their outcomes
//!
//! A [`Request`] holds everything needed to talk to the backend, so it can be
//! executed on any task that owns a [`Backend`]. The resulting [`Outcome`] is
//! handed back to [`Concierge::apply`](crate::Concierge::apply) on the task
//! that owns the state.

use concierge_api::{
    Backend, ChatRequest, ChatResponse, Forecast, NewTrip, Result, SavedTrip, Trip, TripSummary,
};

use crate::conversation::TurnId;

/// A single backend round trip
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Ask the assistant; tagged with the turn it answers
    Chat { turn: TurnId, request: ChatRequest },
    /// Refresh the cached trip list
    ListTrips,
    /// Fetch a trip's itinerary
    LoadTrip { id: String },
    /// Persist the itinerary under a name
    SaveTrip { trip: NewTrip },
    /// Summarize an itinerary
    Summarize { itinerary: String },
    /// Fetch a forecast
    Forecast { lat: f64, lon: f64 },
}

/// Result of executing a [`Request`]
#[derive(Debug)]
pub enum Outcome {
    Chat {
        turn: TurnId,
        result: Result<ChatResponse>,
    },
    TripList(Result<Vec<TripSummary>>),
    TripLoaded {
        id: String,
        result: Result<Trip>,
    },
    TripSaved {
        name: String,
        result: Result<SavedTrip>,
    },
    Summary(Result<String>),
    Forecast {
        lat: f64,
        lon: f64,
        result: Result<Forecast>,
    },
}

impl Request {
    /// Whether this is a chat turn
    pub fn is_chat(&self) -> bool {
        matches!(self, Request::Chat { .. })
    }

    /// Short label for status lines and logs
    pub fn label(&self) -> &'static str {
        match self {
            Request::Chat { .. } => "chat",
            Request::ListTrips => "list trips",
            Request::LoadTrip { .. } => "load trip",
            Request::SaveTrip { .. } => "save trip",
            Request::Summarize { .. } => "summary",
            Request::Forecast { .. } => "weather",
        }
    }

    /// Perform the round trip. Never fails; errors travel in the outcome.
    pub async fn execute(self, backend: &dyn Backend) -> Outcome {
        tracing::debug!("executing {} request", self.label());
        match self {
            Request::Chat { turn, request } => Outcome::Chat {
                turn,
                result: backend.chat(&request).await,
            },
            Request::ListTrips => Outcome::TripList(backend.list_trips().await),
            Request::LoadTrip { id } => {
                let result = backend.get_trip(&id).await;
                Outcome::TripLoaded { id, result }
            }
            Request::SaveTrip { trip } => {
                let result = backend.save_trip(&trip).await;
                Outcome::TripSaved {
                    name: trip.name,
                    result,
                }
            }
            Request::Summarize { itinerary } => {
                Outcome::Summary(backend.summarize(&itinerary).await)
            }
            Request::Forecast { lat, lon } => Outcome::Forecast {
                lat,
                lon,
                result: backend.forecast(lat, lon).await,
            },
        }
    }
}
