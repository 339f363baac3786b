//! reqwest implementation of the backend contract

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Backend, ChatRequest, ChatResponse, Forecast, NewTrip, SavedTrip, SummaryRequest,
    SummaryResponse, Trip, TripList, TripSummary,
    error::{Error, Result},
};

/// Backend used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Chat endpoint path relative to the base URL
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`HttpBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Path of the chat endpoint, e.g. `/api/chat`
    pub chat_path: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Strip surrounding whitespace, trailing slashes and an accidental
/// `/api/chat` suffix so endpoint paths can be appended safely.
pub fn normalize_base_url(raw: &str) -> String {
    let mut url = raw.trim().trim_end_matches('/');
    if let Some(stripped) = url.strip_suffix(DEFAULT_CHAT_PATH) {
        url = stripped.trim_end_matches('/');
    }
    url.to_string()
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// HTTP client for the concierge backend
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
    chat_path: Vec<String>,
}

impl HttpBackend {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(HttpBackendConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Create a client from explicit settings
    pub fn with_config(config: HttpBackendConfig) -> Result<Self> {
        let normalized = normalize_base_url(&config.base_url);
        if normalized.is_empty() {
            return Err(Error::InvalidConfig("backend URL is empty".to_string()));
        }

        let base = Url::parse(&normalized).map_err(|e| {
            Error::InvalidConfig(format!("invalid backend URL '{}': {}", normalized, e))
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "backend URL must be http(s): '{}'",
                normalized
            )));
        }

        let chat_path = split_path(&config.chat_path);
        if chat_path.is_empty() {
            return Err(Error::InvalidConfig("chat path is empty".to_string()));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base,
            chat_path,
        })
    }

    /// The normalized base URL
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Build an endpoint URL by appending percent-encoded path segments
    fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.base.clone();
        // Infallible: cannot-be-a-base URLs are rejected at construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        read_json(response).await
    }
}

/// Check the status, then decode the body as JSON
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("backend returned {}: {}", status, body);
        return Err(Error::status(status.as_u16(), body));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(self.chat_path.as_slice());
        self.post_json(url, request).await
    }

    async fn list_trips(&self) -> Result<Vec<TripSummary>> {
        let list: TripList = self.get_json(self.endpoint(&["api", "trips"])).await?;
        if let Some(error) = list.error {
            return Err(Error::Backend(error));
        }
        Ok(list.trips)
    }

    async fn get_trip(&self, id: &str) -> Result<Trip> {
        self.get_json(self.endpoint(&["api", "trips", id])).await
    }

    async fn save_trip(&self, trip: &NewTrip) -> Result<SavedTrip> {
        self.post_json(self.endpoint(&["api", "trips"]), trip).await
    }

    async fn summarize(&self, itinerary: &str) -> Result<String> {
        let request = SummaryRequest {
            itinerary: itinerary.to_string(),
        };
        let response: SummaryResponse = self
            .post_json(self.endpoint(&["api", "summary"]), &request)
            .await?;
        if let Some(error) = response.error {
            return Err(Error::Backend(error));
        }
        Ok(response.summary.unwrap_or_default())
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Forecast> {
        let mut url = self.endpoint(&["api", "weather"]);
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string());

        let forecast: Forecast = self.get_json(url).await?;
        if let Some(error) = forecast.error {
            return Err(Error::Backend(error));
        }
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use std::collections::HashMap;

    /// Serve `app` on an ephemeral port and return its base URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn echo_chat_app() -> Router {
        Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                let history = body["history"].as_array().cloned().unwrap_or_default();
                let last = history
                    .last()
                    .and_then(|m| m["content"].as_str())
                    .unwrap_or("")
                    .to_string();
                Json(json!({
                    "answer": format!(
                        "{}|{}|{}|{}",
                        body["question"].as_str().unwrap_or(""),
                        history.len(),
                        last,
                        body["itinerary_content"].as_str().unwrap_or("")
                    ),
                    "images": ["https://img.example/1.jpg"],
                    "places": ["Dubai Marina"]
                }))
            }),
        )
    }

    // --- normalize_base_url ---

    #[test]
    fn test_normalize_strips_trailing_slash_and_chat_path() {
        assert_eq!(normalize_base_url("http://h:8000/"), "http://h:8000");
        assert_eq!(normalize_base_url(" http://h:8000/api/chat "), "http://h:8000");
        assert_eq!(normalize_base_url("http://h/api/chat/"), "http://h");
        assert_eq!(normalize_base_url("https://h/prefix"), "https://h/prefix");
    }

    #[test]
    fn test_invalid_base_urls_rejected() {
        assert!(matches!(HttpBackend::new(""), Err(Error::InvalidConfig(_))));
        assert!(matches!(HttpBackend::new("not a url"), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            HttpBackend::new("mailto:someone@example.com"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_endpoint_keeps_base_prefix_and_encodes_ids() {
        let backend = HttpBackend::new("http://h:8000/prefix/").unwrap();
        assert_eq!(
            backend.endpoint(&["api", "trips", "a b/c"]).as_str(),
            "http://h:8000/prefix/api/trips/a%20b%2Fc"
        );
        assert_eq!(
            backend.endpoint(backend.chat_path.as_slice()).as_str(),
            "http://h:8000/prefix/api/chat"
        );
    }

    // --- chat ---

    #[tokio::test]
    async fn test_chat_sends_question_history_and_itinerary() {
        let base = serve(echo_chat_app()).await;
        let backend = HttpBackend::new(&base).unwrap();

        let request = ChatRequest {
            question: "Plan my day".into(),
            history: vec![Message::user("Hi"), Message::assistant("Hello"), Message::user("Plan my day")],
            itinerary_content: "Day 1: Marina".into(),
        };
        let response = backend.chat(&request).await.unwrap();

        assert_eq!(
            response.answer.as_deref(),
            Some("Plan my day|3|Plan my day|Day 1: Marina")
        );
        assert_eq!(response.images, vec!["https://img.example/1.jpg"]);
        assert_eq!(response.places, vec!["Dubai Marina"]);
    }

    #[tokio::test]
    async fn test_chat_uses_configured_path() {
        let app = Router::new().route(
            "/v2/ask",
            post(|| async { Json(json!({"answer": "custom"})) }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::with_config(HttpBackendConfig {
            base_url: base,
            chat_path: "v2/ask".into(),
            ..Default::default()
        })
        .unwrap();

        let request = ChatRequest {
            question: "q".into(),
            history: vec![Message::user("q")],
            itinerary_content: String::new(),
        };
        let response = backend.chat(&request).await.unwrap();
        assert_eq!(response.answer.as_deref(), Some("custom"));
        assert!(response.images.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let app = Router::new().route("/api/chat", post(|| async { "<html>oops</html>" }));
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let request = ChatRequest {
            question: "q".into(),
            history: vec![],
            itinerary_content: String::new(),
        };
        let err = backend.chat(&request).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)), "got: {:?}", err);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "Missing question"})),
                )
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let request = ChatRequest {
            question: String::new(),
            history: vec![],
            itinerary_content: String::new(),
        };
        let err = backend.chat(&request).await.unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert!(err.to_string().contains("Missing question"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{}", addr)).unwrap();
        let err = backend.list_trips().await.unwrap_err();
        assert!(err.is_transport(), "got: {:?}", err);
    }

    // --- trips ---

    #[tokio::test]
    async fn test_list_trips() {
        let app = Router::new().route(
            "/api/trips",
            get(|| async {
                Json(json!({"trips": [
                    {"id": "1", "name": "Dubai", "metadata": {}},
                    {"id": "2", "name": "Oman"}
                ]}))
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let trips = backend.list_trips().await.unwrap();
        let names: Vec<_> = trips.iter().map(|t| t.display_name()).collect();
        assert_eq!(names, vec!["Dubai", "Oman"]);
    }

    #[tokio::test]
    async fn test_list_trips_error_payload_is_an_error() {
        let app = Router::new().route(
            "/api/trips",
            get(|| async { Json(json!({"trips": [], "error": "db down"})) }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let err = backend.list_trips().await.unwrap_err();
        assert!(matches!(err, Error::Backend(ref m) if m == "db down"));
    }

    #[tokio::test]
    async fn test_get_trip_decodes_path_id() {
        let app = Router::new().route(
            "/api/trips/:id",
            get(|Path(id): Path<String>| async move {
                Json(json!({"_id": id, "name": "Trip", "itinerary": "Day 1"}))
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let trip = backend.get_trip("665f 01").await.unwrap();
        assert_eq!(trip.id.as_deref(), Some("665f 01"));
        assert_eq!(trip.itinerary, "Day 1");
    }

    #[tokio::test]
    async fn test_get_missing_trip_is_status_error() {
        let app = Router::new().route(
            "/api/trips/:id",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Trip not found"})),
                )
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let err = backend.get_trip("nope").await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_save_trip_posts_body() {
        let app = Router::new().route(
            "/api/trips",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["metadata"], json!({}));
                Json(json!({"id": format!("{}:{}", body["name"].as_str().unwrap_or(""), body["itinerary"].as_str().unwrap_or(""))}))
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let saved = backend
            .save_trip(&NewTrip::new("Weekend", "Day 1: beach"))
            .await
            .unwrap();
        assert_eq!(saved.id.as_deref(), Some("Weekend:Day 1: beach"));
    }

    // --- summary & weather ---

    #[tokio::test]
    async fn test_summarize() {
        let app = Router::new().route(
            "/api/summary",
            post(|Json(body): Json<Value>| async move {
                let itinerary = body["itinerary"].as_str().unwrap_or("").to_string();
                if itinerary.is_empty() {
                    Json(json!({"error": "nothing to summarize"}))
                } else {
                    Json(json!({"summary": format!("{} lines", itinerary.lines().count())}))
                }
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        assert_eq!(backend.summarize("a\nb\nc").await.unwrap(), "3 lines");
        assert!(matches!(
            backend.summarize("").await.unwrap_err(),
            Error::Backend(_)
        ));
    }

    #[tokio::test]
    async fn test_forecast_sends_coordinates() {
        let app = Router::new().route(
            "/api/weather",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "timezone": format!("{},{}", params["lat"], params["lon"]),
                    "hourly": {"time": ["t0"], "temperature_2m": [30.5], "weathercode": [0]}
                }))
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(&base).unwrap();

        let forecast = backend.forecast(25.2, 55.27).await.unwrap();
        assert_eq!(forecast.timezone.as_deref(), Some("25.2,55.27"));
        assert_eq!(forecast.hours()[0].temperature, Some(30.5));
    }
}
