//! Custom widgets for the TUI

pub mod input_box;
pub mod message_list;
pub mod prompt;
pub mod selector;
pub mod spinner;
pub mod text_area;

pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageList, Speaker};
pub use prompt::{Prompt, PromptResult};
pub use selector::{Selector, SelectorItem, SelectorState};
pub use spinner::Spinner;
pub use text_area::TextArea;
