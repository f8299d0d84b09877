// parley: the conversation state engine behind a two-pane terminal
// messaging console.

pub mod composer;
pub mod config;
pub mod convo;
pub mod media;
pub mod models;
pub mod utils;

// Re-export the main types for convenience
pub use composer::{MessageComposer, Outgoing};
pub use convo::{ConversationEvent, ConversationStore, StatusDelays, TypingIndicatorTimer};
pub use media::{InMemoryPreviews, MediaCaptureController, SimulatedMicrophone};
pub use models::*;
