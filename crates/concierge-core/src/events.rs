//! Concierge event types

use concierge_api::{Forecast, Message};

use crate::conversation::TurnId;

/// Events emitted as the concierge state changes
#[derive(Debug, Clone)]
pub enum ConciergeEvent {
    /// A chat request was issued; the pending flag is now set
    TurnStart { turn: TurnId },

    /// A message was appended to the log
    MessageAppended { message: Message },

    /// The in-flight turn resolved; the pending flag is now clear
    TurnEnd { turn: TurnId, failed: bool },

    /// A submission arrived while pending and waits in the queue
    TurnQueued { position: usize },

    /// The queue was full; its oldest submission was dropped
    QueuedTurnDropped { text: String },

    /// A chat outcome arrived for a turn that is not in flight
    StaleOutcome { turn: TurnId },

    /// Places the backend detected in the latest answer
    PlacesDetected { places: Vec<String> },

    /// The cached trip list was replaced
    TripsRefreshed { count: usize },

    /// A saved trip's itinerary now fills the itinerary buffer
    TripLoaded { id: String, name: Option<String> },

    /// A trip could not be loaded; the itinerary buffer is unchanged
    TripLoadFailed { id: String, error: String },

    /// The current itinerary was saved
    TripSaved { name: String, id: Option<String> },

    /// Saving the current itinerary failed
    TripSaveFailed { name: String, error: String },

    /// Itinerary summary arrived
    Summary { summary: String },

    /// Itinerary summary failed
    SummaryFailed { error: String },

    /// Forecast arrived
    Forecast {
        lat: f64,
        lon: f64,
        forecast: Forecast,
    },

    /// Forecast failed
    ForecastFailed { error: String },
}
