//! Wire types exchanged with the concierge backend

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque key-value metadata attached to a saved trip
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Message roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message, as rendered locally and as sent in `history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Image URLs returned alongside an assistant answer
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images: vec![],
        }
    }

    /// Create an assistant message without images
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::assistant_with_images(content, vec![])
    }

    /// Create an assistant message carrying image URLs
    pub fn assistant_with_images(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            images,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    /// Full conversation log including the message carrying `question`
    pub history: Vec<Message>,
    pub itinerary_content: String,
}

/// Response of `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    /// Place names the backend detected in the answer
    #[serde(default, deserialize_with = "null_as_default")]
    pub places: Vec<String>,
}

/// Entry of `GET /api/trips`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

impl TripSummary {
    /// Name to show in lists; unnamed trips get a placeholder
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Untitled Trip",
        }
    }
}

/// Response of `GET /api/trips`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trips: Vec<TripSummary>,
    /// Present when the backend failed to query its store
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /api/trips/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub itinerary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

/// Body of `POST /api/trips`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrip {
    pub name: String,
    pub itinerary: String,
    pub metadata: Metadata,
}

impl NewTrip {
    /// A trip with empty metadata, the shape the client always sends
    pub fn new(name: impl Into<String>, itinerary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            itinerary: itinerary.into(),
            metadata: Metadata::new(),
        }
    }
}

/// Response of `POST /api/trips`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedTrip {
    #[serde(default)]
    pub id: Option<String>,
}

/// Body of `POST /api/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub itinerary: String,
}

/// Response of `POST /api/summary`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Hourly series of a forecast
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlyForecast {
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weathercode: Vec<Option<i64>>,
}

/// Units of the hourly series
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlyUnits {
    #[serde(default)]
    pub temperature_2m: Option<String>,
}

/// Response of `GET /api/weather`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub hourly: Option<HourlyForecast>,
    #[serde(default)]
    pub hourly_units: Option<HourlyUnits>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One hour of a forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastHour {
    pub time: String,
    pub temperature: Option<f64>,
    pub weathercode: Option<i64>,
}

impl Forecast {
    /// Hours in forecast order, zipped across the parallel series
    pub fn hours(&self) -> Vec<ForecastHour> {
        let Some(hourly) = &self.hourly else {
            return vec![];
        };
        hourly
            .time
            .iter()
            .enumerate()
            .map(|(i, time)| ForecastHour {
                time: time.clone(),
                temperature: hourly.temperature_2m.get(i).copied().flatten(),
                weathercode: hourly.weathercode.get(i).copied().flatten(),
            })
            .collect()
    }

    /// Temperature unit, `°C` unless the backend says otherwise
    pub fn temperature_unit(&self) -> &str {
        self.hourly_units
            .as_ref()
            .and_then(|u| u.temperature_2m.as_deref())
            .unwrap_or("°C")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serializes_wire_shape() {
        let msg = Message::user("Plan my day");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "content": "Plan my day", "images": []})
        );
    }

    #[test]
    fn test_message_without_images_deserializes() {
        let msg: Message =
            serde_json::from_value(json!({"role": "assistant", "content": "hi"})).unwrap();
        assert_eq!(msg, Message::assistant("hi"));

        let msg: Message =
            serde_json::from_value(json!({"role": "assistant", "content": "hi", "images": null}))
                .unwrap();
        assert!(msg.images.is_empty());
    }

    #[test]
    fn test_chat_response_defaults_missing_fields() {
        let resp: ChatResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(resp.answer, None);
        assert!(resp.images.is_empty());
        assert!(resp.places.is_empty());

        let resp: ChatResponse =
            serde_json::from_value(json!({"answer": "X", "images": ["a", "b"], "places": null}))
                .unwrap();
        assert_eq!(resp.answer.as_deref(), Some("X"));
        assert_eq!(resp.images, vec!["a", "b"]);
        assert!(resp.places.is_empty());
    }

    #[test]
    fn test_trip_list_tolerates_null_name_and_metadata() {
        let list: TripList = serde_json::from_value(json!({
            "trips": [
                {"id": "a1", "name": "Dubai", "metadata": {"days": 5}},
                {"id": "b2", "name": null, "metadata": null}
            ]
        }))
        .unwrap();
        assert_eq!(list.trips.len(), 2);
        assert_eq!(list.trips[0].display_name(), "Dubai");
        assert_eq!(list.trips[0].metadata["days"], json!(5));
        assert_eq!(list.trips[1].display_name(), "Untitled Trip");
        assert!(list.trips[1].metadata.is_empty());
        assert!(list.error.is_none());
    }

    #[test]
    fn test_trip_accepts_mongo_id_field() {
        let trip: Trip = serde_json::from_value(json!({
            "_id": "665f",
            "name": "Lisbon",
            "itinerary": "Day 1: Alfama",
            "metadata": {}
        }))
        .unwrap();
        assert_eq!(trip.id.as_deref(), Some("665f"));
        assert_eq!(trip.itinerary, "Day 1: Alfama");

        let trip: Trip = serde_json::from_value(json!({"name": "Empty"})).unwrap();
        assert_eq!(trip.itinerary, "");
    }

    #[test]
    fn test_new_trip_sends_empty_metadata_object() {
        let trip = NewTrip::new("Weekend", "Day 1");
        assert_eq!(
            serde_json::to_value(&trip).unwrap(),
            json!({"name": "Weekend", "itinerary": "Day 1", "metadata": {}})
        );
    }

    #[test]
    fn test_forecast_hours_zip_series() {
        let forecast: Forecast = serde_json::from_value(json!({
            "timezone": "Asia/Dubai",
            "hourly_units": {"temperature_2m": "°F"},
            "hourly": {
                "time": ["2026-01-01T00:00", "2026-01-01T01:00", "2026-01-01T02:00"],
                "temperature_2m": [21.5, null],
                "weathercode": [0, 1, 2]
            }
        }))
        .unwrap();

        let hours = forecast.hours();
        assert_eq!(hours.len(), 3);
        assert_eq!(hours[0].temperature, Some(21.5));
        assert_eq!(hours[1].temperature, None);
        assert_eq!(hours[2].temperature, None);
        assert_eq!(hours[2].weathercode, Some(2));
        assert_eq!(forecast.temperature_unit(), "°F");
    }

    #[test]
    fn test_forecast_without_hourly_is_empty() {
        let forecast: Forecast = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert!(forecast.hours().is_empty());
        assert_eq!(forecast.temperature_unit(), "°C");
    }
}
