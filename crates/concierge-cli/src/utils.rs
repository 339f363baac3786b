//! Shared utilities

use concierge_api::{Forecast, TripSummary};
use concierge_core::ConciergeEvent;
use std::io;
use std::process::{Command, Stdio};

/// Hours of forecast shown in a notice
const FORECAST_HOURS: usize = 6;

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Drop the trailing newline `read_line` leaves; everything else is kept
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Open a URL in the system browser without waiting for it
pub fn open_in_browser(url: &str) -> io::Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a web link: {}", truncate_chars(url, 60)),
        ));
    }

    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

/// One line per trip: `id  name`
pub fn format_trips(trips: &[TripSummary]) -> String {
    if trips.is_empty() {
        return "No saved trips.".to_string();
    }
    trips
        .iter()
        .map(|t| format!("  {}  {}", t.id, t.display_name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The first hours of a forecast as text
pub fn format_forecast(lat: f64, lon: f64, forecast: &Forecast) -> String {
    let hours = forecast.hours();
    if hours.is_empty() {
        return format!("No forecast data for {:.2}, {:.2}.", lat, lon);
    }

    let unit = forecast.temperature_unit();
    let mut lines = vec![match &forecast.timezone {
        Some(tz) => format!("Forecast for {:.2}, {:.2} ({})", lat, lon, tz),
        None => format!("Forecast for {:.2}, {:.2}", lat, lon),
    }];
    for hour in hours.iter().take(FORECAST_HOURS) {
        let temperature = hour
            .temperature
            .map(|t| format!("{:.1}{}", t, unit))
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!("  {}  {}", hour.time.replace('T', " "), temperature));
    }
    lines.join("\n")
}

/// A user-facing line for events that are reported outside the message log
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Describe a concierge event for the user, if it deserves a notice
pub fn event_notice(event: &ConciergeEvent) -> Option<Notice> {
    Some(match event {
        ConciergeEvent::TripLoaded { id, name } => {
            Notice::info(format!("Loaded trip {}.", name.as_deref().unwrap_or(id)))
        }
        ConciergeEvent::TripLoadFailed { .. } => Notice::error("Failed to load trip."),
        ConciergeEvent::TripSaved { name, .. } => Notice::info(format!("Trip \"{}\" saved!", name)),
        ConciergeEvent::TripSaveFailed { .. } => Notice::error("Failed to save trip."),
        ConciergeEvent::Summary { summary } => Notice::info(format!("Summary:\n{}", summary)),
        ConciergeEvent::SummaryFailed { error } => {
            Notice::error(format!("Summary failed: {}", error))
        }
        ConciergeEvent::Forecast { lat, lon, forecast } => {
            Notice::info(format_forecast(*lat, *lon, forecast))
        }
        ConciergeEvent::ForecastFailed { error } => {
            Notice::error(format!("Weather failed: {}", error))
        }
        ConciergeEvent::QueuedTurnDropped { text } => Notice::error(format!(
            "Queue full, dropped: {}",
            truncate_chars(text, 40)
        )),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_api::{HourlyForecast, Metadata};

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_strip_line_ending_keeps_surrounding_spaces() {
        assert_eq!(strip_line_ending("  hi  \n"), "  hi  ");
        assert_eq!(strip_line_ending("Day 1\r\n"), "Day 1");
        assert_eq!(strip_line_ending("."), ".");
    }

    #[test]
    fn test_open_rejects_non_web_links() {
        let err = open_in_browser("javascript:alert(1)").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_format_trips() {
        assert_eq!(format_trips(&[]), "No saved trips.");
        let trips = vec![TripSummary {
            id: "a1".into(),
            name: None,
            metadata: Metadata::new(),
        }];
        assert_eq!(format_trips(&trips), "  a1  Untitled Trip");
    }

    #[test]
    fn test_format_forecast_limits_hours() {
        let forecast = Forecast {
            timezone: Some("GMT".into()),
            hourly: Some(HourlyForecast {
                time: (0..10).map(|h| format!("2026-01-01T{:02}:00", h)).collect(),
                temperature_2m: vec![Some(20.0), None],
                weathercode: vec![],
            }),
            ..Default::default()
        };
        let text = format_forecast(25.2, 55.27, &forecast);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Forecast for 25.20, 55.27 (GMT)");
        assert_eq!(lines[1], "  2026-01-01 00:00  20.0°C");
        assert_eq!(lines[2], "  2026-01-01 01:00  n/a");
        assert_eq!(lines.len(), 1 + FORECAST_HOURS);
    }

    #[test]
    fn test_event_notices() {
        let notice = event_notice(&ConciergeEvent::TripLoadFailed {
            id: "x".into(),
            error: "404".into(),
        });
        assert_eq!(notice, Some(Notice::error("Failed to load trip.")));
        assert!(event_notice(&ConciergeEvent::TripsRefreshed { count: 2 }).is_none());
    }
}
