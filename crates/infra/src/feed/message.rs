//! Wire form of an activity-feed reading

use chrono::{DateTime, Utc};
use idletally_domain::constants::ACTIVITY_SIGNAL_TOPIC;
use idletally_domain::{IdleTallyError, Result as DomainResult};
use serde::{Deserialize, Serialize};

/// A published "last user input" reading
///
/// ```json
/// {"topic":"activity-signal","last_user_activity":"2017-03-01T09:00:00Z"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMessage {
    pub topic: String,
    pub last_user_activity: DateTime<Utc>,
}

impl FeedMessage {
    pub fn new(last_user_activity: DateTime<Utc>) -> Self {
        Self { topic: ACTIVITY_SIGNAL_TOPIC.to_string(), last_user_activity }
    }

    /// Decode a JSON message, rejecting other topics
    pub fn decode(raw: &str) -> DomainResult<Self> {
        let message: Self = serde_json::from_str(raw)
            .map_err(|e| IdleTallyError::InvalidInput(format!("malformed feed message: {e}")))?;
        if message.topic != ACTIVITY_SIGNAL_TOPIC {
            return Err(IdleTallyError::InvalidInput(format!(
                "unexpected feed topic '{}'",
                message.topic
            )));
        }
        Ok(message)
    }

    pub fn encode(&self) -> DomainResult<String> {
        serde_json::to_string(self).map_err(|e| IdleTallyError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn decodes_activity_signal() {
        let raw = r#"{"topic":"activity-signal","last_user_activity":"2017-03-01T09:00:00Z"}"#;

        let message = FeedMessage::decode(raw).unwrap();

        assert_eq!(
            message.last_user_activity,
            Utc.with_ymd_and_hms(2017, 3, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_other_topics() {
        let raw = r#"{"topic":"heartbeat","last_user_activity":"2017-03-01T09:00:00Z"}"#;

        let err = FeedMessage::decode(raw).unwrap_err();

        assert!(matches!(err, IdleTallyError::InvalidInput(msg) if msg.contains("heartbeat")));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(FeedMessage::decode("{"), Err(IdleTallyError::InvalidInput(_))));
    }

    #[test]
    fn encode_decodes_back() {
        let message = FeedMessage::new(Utc.with_ymd_and_hms(2017, 3, 1, 9, 0, 0).unwrap());
        assert_eq!(FeedMessage::decode(&message.encode().unwrap()).unwrap(), message);
    }
}
