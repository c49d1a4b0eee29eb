//! Activity feed adapters
//!
//! Publishers push "last user input" readings into a [`SignalInbox`]; the
//! timer session drains it through the `ActivityFeed` port.

mod inbox;
mod message;

pub use inbox::{spawn_forwarder, SignalInbox};
pub use message::FeedMessage;
