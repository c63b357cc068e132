//! Convenience layer between views and the API client.

pub mod inbox;
pub mod messages;

pub use inbox::{InboxState, MessageActions, SendState};
pub use messages::DownloadedCard;
