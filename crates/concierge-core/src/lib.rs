//! concierge-core: Conversation state and trip store client
//!
//! This crate owns the chat log, the input and itinerary buffers and the
//! cached trip list, and turns user actions into backend requests.

pub mod concierge;
pub mod conversation;
pub mod events;
pub mod quick;
pub mod request;
pub mod trips;

pub use concierge::{Concierge, ConciergeConfig, FALLBACK_ANSWER, SERVER_ERROR_TEXT, Submission};
pub use conversation::{Conversation, ConversationSnapshot, TurnId};
pub use events::ConciergeEvent;
pub use quick::QuickPrompt;
pub use request::{Outcome, Request};
pub use trips::find_trip;
