//! concierge-tui: Terminal UI components
//!
//! Widgets and terminal plumbing for the Trip Concierge chat client, built on
//! ratatui and crossterm. Message content is always rendered as plain text.

pub mod app;
pub mod input;
pub mod plain_text;
pub mod theme;
pub mod widgets;

pub use app::TerminalSession;
pub use theme::Theme;
