//! Lookup over the cached trip list

use concierge_api::TripSummary;

/// Resolve a user-supplied id or name against cached trips.
///
/// Tries an exact id first, then a case-insensitive name, then a unique
/// case-insensitive name prefix.
pub fn find_trip<'a>(trips: &'a [TripSummary], query: &str) -> Option<&'a TripSummary> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if let Some(trip) = trips.iter().find(|t| t.id == query) {
        return Some(trip);
    }

    let lowered = query.to_lowercase();
    if let Some(trip) = trips
        .iter()
        .find(|t| t.display_name().to_lowercase() == lowered)
    {
        return Some(trip);
    }

    let mut prefixed = trips
        .iter()
        .filter(|t| t.display_name().to_lowercase().starts_with(&lowered));
    match (prefixed.next(), prefixed.next()) {
        (Some(trip), None) => Some(trip),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_api::Metadata;

    fn trip(id: &str, name: Option<&str>) -> TripSummary {
        TripSummary {
            id: id.into(),
            name: name.map(String::from),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_find_by_id_then_name() {
        let trips = vec![trip("a1", Some("Dubai")), trip("b2", Some("a1 tour"))];
        assert_eq!(find_trip(&trips, "a1").map(|t| t.id.as_str()), Some("a1"));
        assert_eq!(find_trip(&trips, "dubai").map(|t| t.id.as_str()), Some("a1"));
        assert_eq!(find_trip(&trips, "A1 TOUR").map(|t| t.id.as_str()), Some("b2"));
    }

    #[test]
    fn test_prefix_must_be_unique() {
        let trips = vec![trip("1", Some("Paris")), trip("2", Some("Parma")), trip("3", Some("Rome"))];
        assert_eq!(find_trip(&trips, "ro").map(|t| t.id.as_str()), Some("3"));
        assert!(find_trip(&trips, "par").is_none());
        assert!(find_trip(&trips, "  ").is_none());
    }

    #[test]
    fn test_untitled_trips_match_placeholder() {
        let trips = vec![trip("x", None)];
        assert_eq!(find_trip(&trips, "untitled").map(|t| t.id.as_str()), Some("x"));
    }
}
