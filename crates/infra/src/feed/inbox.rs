//! Single-slot inbox for activity signals

use std::sync::Arc;

use chrono::{DateTime, Utc};
use idletally_core::ActivityFeed;
use idletally_domain::Result as DomainResult;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::message::FeedMessage;

/// Holds the newest unread reading; older ones are overwritten.
///
/// Cloning shares the slot, so a publisher and the session can each hold
/// a handle.
#[derive(Debug, Clone, Default)]
pub struct SignalInbox {
    slot: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl SignalInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading; an older pending one is dropped
    pub fn push(&self, signal: DateTime<Utc>) {
        let mut slot = self.slot.lock();
        match *slot {
            Some(pending) if pending > signal => {
                debug!(%signal, %pending, "ignoring stale activity signal");
            }
            _ => *slot = Some(signal),
        }
    }

    /// Decode and record a JSON feed message
    pub fn push_message(&self, raw: &str) -> DomainResult<()> {
        let message = FeedMessage::decode(raw)?;
        self.push(message.last_user_activity);
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Drain readings from `rx` until every sender is dropped
    pub async fn forward(&self, mut rx: mpsc::Receiver<DateTime<Utc>>) {
        while let Some(signal) = rx.recv().await {
            self.push(signal);
        }
        debug!("activity signal channel closed");
    }
}

impl ActivityFeed for SignalInbox {
    fn latest_activity_signal(&self) -> Option<DateTime<Utc>> {
        self.slot.lock().take()
    }
}

/// Spawn a task forwarding raw JSON feed messages into `inbox`
///
/// Malformed messages are logged and skipped.
pub fn spawn_forwarder(inbox: SignalInbox, mut rx: mpsc::Receiver<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(raw) = rx.recv().await {
            if let Err(e) = inbox.push_message(&raw) {
                warn!(error = %e, "dropping activity feed message");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 1, 9, minute, 0).unwrap()
    }

    #[test]
    fn newest_reading_wins() {
        let inbox = SignalInbox::new();
        inbox.push(at(5));
        inbox.push(at(3));
        inbox.push(at(7));

        assert_eq!(inbox.latest_activity_signal(), Some(at(7)));
        assert_eq!(inbox.latest_activity_signal(), None);
    }

    #[test]
    fn clones_share_the_slot() {
        let inbox = SignalInbox::new();
        let publisher = inbox.clone();

        publisher.push(at(1));

        assert!(inbox.has_pending());
        assert_eq!(inbox.latest_activity_signal(), Some(at(1)));
        assert!(!publisher.has_pending());
    }

    #[tokio::test]
    async fn forward_drains_channel() {
        let inbox = SignalInbox::new();
        let (tx, rx) = mpsc::channel(4);
        tx.send(at(1)).await.unwrap();
        tx.send(at(2)).await.unwrap();
        drop(tx);

        inbox.forward(rx).await;

        assert_eq!(inbox.latest_activity_signal(), Some(at(2)));
    }
}
