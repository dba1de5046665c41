// # Analytics Sink Trait
//
// Fire-and-forget tracking of successful submit gestures.

use serde::{Deserialize, Serialize};

/// Event name pushed for every valid submission
pub const NEWSLETTER_SUBSCRIPTION_EVENT: &str = "newsletterSubscription";

/// Analytics payload: `{event, id?, data: {name, email, phone}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub data: SubscriptionData,
}

/// Contact data carried by the analytics event (custom fields excluded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionData {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

impl AnalyticsEvent {
    /// Build a `newsletterSubscription` event
    pub fn newsletter_subscription(id: Option<String>, data: SubscriptionData) -> Self {
        Self {
            event: NEWSLETTER_SUBSCRIPTION_EVENT.to_string(),
            id,
            data,
        }
    }
}

/// Trait for analytics sinks
///
/// `emit` is synchronous and infallible from the caller's point of view.
/// Sinks that forward events somewhere fallible must swallow (and log)
/// their own errors.
pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: AnalyticsEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_without_missing_id() {
        let event = AnalyticsEvent::newsletter_subscription(
            None,
            SubscriptionData {
                name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
                phone: None,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "newsletterSubscription");
        assert!(json.get("id").is_none());
        assert_eq!(json["data"]["email"], "ada@example.com");
        assert_eq!(json["data"]["phone"], serde_json::Value::Null);
    }
}
