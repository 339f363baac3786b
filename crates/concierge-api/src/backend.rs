//! The backend contract consumed by the client

use async_trait::async_trait;

use crate::{
    ChatRequest, ChatResponse, Forecast, NewTrip, Result, SavedTrip, Trip, TripSummary,
};

/// Request/response operations offered by the concierge backend.
///
/// Every call is a single round trip with no retries. Implementations report
/// non-success statuses and malformed bodies as errors; callers decide how to
/// degrade.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Ask the assistant a question with the full history and itinerary
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// List saved trip summaries
    async fn list_trips(&self) -> Result<Vec<TripSummary>>;

    /// Fetch one saved trip
    async fn get_trip(&self, id: &str) -> Result<Trip>;

    /// Persist a new trip
    async fn save_trip(&self, trip: &NewTrip) -> Result<SavedTrip>;

    /// Summarize an itinerary in a few lines
    async fn summarize(&self, itinerary: &str) -> Result<String>;

    /// Hourly forecast for a coordinate
    async fn forecast(&self, lat: f64, lon: f64) -> Result<Forecast>;
}
