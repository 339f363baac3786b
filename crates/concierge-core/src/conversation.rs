//! Conversation state: message log, input buffer, itinerary buffer, in-flight turn.

use std::fmt;

use concierge_api::{Message, TripSummary};

/// Tag carried by each dispatched chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable conversation state. Only `Concierge` mutates it.
#[derive(Debug, Default)]
pub struct Conversation {
    /// Append-only message log, in render and transmission order
    messages: Vec<Message>,
    /// Pending-input buffer
    input: String,
    /// Itinerary sent as context with every chat request
    itinerary: String,
    /// Turn whose response is awaited; `Some` exactly while pending
    in_flight: Option<TurnId>,
}

impl Conversation {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn itinerary(&self) -> &str {
        &self.itinerary
    }

    /// Whether a chat request is outstanding
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<TurnId> {
        self.in_flight
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
    }

    pub(crate) fn clear_input(&mut self) {
        self.input.clear();
    }

    pub(crate) fn set_itinerary(&mut self, itinerary: String) {
        self.itinerary = itinerary;
    }

    pub(crate) fn begin_turn(&mut self, turn: TurnId) {
        self.in_flight = Some(turn);
    }

    /// Resolve `turn`; returns false if it is not the in-flight turn
    pub(crate) fn finish_turn(&mut self, turn: TurnId) -> bool {
        if self.in_flight == Some(turn) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

/// Read-only copy of the state handed to renderers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub input: String,
    pub itinerary: String,
    pub pending: bool,
    pub in_flight: Option<TurnId>,
    /// Submissions waiting for the in-flight turn to resolve
    pub queued: Vec<String>,
    /// Cached trip summaries
    pub trips: Vec<TripSummary>,
}

impl ConversationSnapshot {
    /// Images of the most recent assistant message that has any
    pub fn latest_images(&self) -> &[String] {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_assistant() && !m.images.is_empty())
            .map(|m| m.images.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_turn_only_matches_in_flight() {
        let mut conv = Conversation::default();
        assert!(!conv.is_pending());

        conv.begin_turn(TurnId(1));
        assert!(conv.is_pending());
        assert!(!conv.finish_turn(TurnId(0)));
        assert!(conv.is_pending());
        assert!(conv.finish_turn(TurnId(1)));
        assert!(!conv.is_pending());
        assert!(!conv.finish_turn(TurnId(1)));
    }

    #[test]
    fn test_latest_images_skips_imageless_messages() {
        let snapshot = ConversationSnapshot {
            messages: vec![
                Message::assistant_with_images("a", vec!["one".into()]),
                Message::user("more"),
                Message::assistant("no pictures"),
            ],
            ..Default::default()
        };
        assert_eq!(snapshot.latest_images(), ["one".to_string()]);
        assert!(ConversationSnapshot::default().latest_images().is_empty());
    }

    #[test]
    fn test_turn_id_display() {
        assert_eq!(TurnId(7).to_string(), "#7");
    }
}
