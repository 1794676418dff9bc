use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::signature::WebhookError;

/// Stripe subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    Paused,
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    /// Only active and trialing subscriptions carry premium access
    pub fn grants_entitlement(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// A checkout session, as delivered in webhooks and returned by session lookups
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// The application user recorded in `metadata.user_id`
    pub fn user_id(&self) -> Option<Uuid> {
        self.metadata
            .get("user_id")
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    pub status: SubscriptionStatus,
}

/// Billing events the reconciler understands
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    CheckoutCompleted(CheckoutSession),
    SubscriptionUpdated(SubscriptionObject),
    SubscriptionDeleted(SubscriptionObject),
    /// Any other event type; acknowledged and ignored
    Other(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

/// A decoded webhook delivery
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: String,
    pub event: BillingEvent,
}

impl WebhookEvent {
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        let envelope: Envelope =
            serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        let object = envelope.data.object;
        let event = match envelope.event_type.as_str() {
            "checkout.session.completed" => BillingEvent::CheckoutCompleted(decode(object)?),
            "customer.subscription.updated" => BillingEvent::SubscriptionUpdated(decode(object)?),
            "customer.subscription.deleted" => BillingEvent::SubscriptionDeleted(decode(object)?),
            _ => BillingEvent::Other(envelope.event_type),
        };

        Ok(Self {
            id: envelope.id,
            event,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(object: serde_json::Value) -> Result<T, WebhookError> {
    serde_json::from_value(object).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(event_type: &str, object: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_123",
            "type": event_type,
            "data": { "object": object }
        }))
        .unwrap()
    }

    #[test]
    fn test_checkout_completed_decodes_metadata() {
        let user_id = Uuid::new_v4();
        let raw = body(
            "checkout.session.completed",
            json!({
                "id": "cs_1",
                "customer": "cus_1",
                "subscription": "sub_1",
                "payment_status": "paid",
                "metadata": { "user_id": user_id.to_string() }
            }),
        );

        let event = WebhookEvent::from_slice(&raw).unwrap();
        assert_eq!(event.id, "evt_123");
        match event.event {
            BillingEvent::CheckoutCompleted(session) => {
                assert_eq!(session.user_id(), Some(user_id));
                assert_eq!(session.customer.as_deref(), Some("cus_1"));
                assert!(session.is_paid());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_checkout_without_metadata_has_no_user() {
        let raw = body("checkout.session.completed", json!({ "id": "cs_2" }));
        match WebhookEvent::from_slice(&raw).unwrap().event {
            BillingEvent::CheckoutCompleted(session) => assert_eq!(session.user_id(), None),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let raw = body(
            "customer.subscription.updated",
            json!({ "id": "sub_1", "customer": "cus_1", "status": "something_new" }),
        );
        match WebhookEvent::from_slice(&raw).unwrap().event {
            BillingEvent::SubscriptionUpdated(sub) => {
                assert_eq!(sub.status, SubscriptionStatus::Unknown);
                assert!(!sub.status.grants_entitlement());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_entitlement_statuses() {
        assert!(SubscriptionStatus::Active.grants_entitlement());
        assert!(SubscriptionStatus::Trialing.grants_entitlement());
        assert!(!SubscriptionStatus::PastDue.grants_entitlement());
        assert!(!SubscriptionStatus::Canceled.grants_entitlement());
    }

    #[test]
    fn test_other_event_types_pass_through() {
        let raw = body("invoice.paid", json!({ "id": "in_1" }));
        assert_eq!(
            WebhookEvent::from_slice(&raw).unwrap().event,
            BillingEvent::Other("invoice.paid".to_string())
        );
    }

    #[test]
    fn test_garbage_payload_rejected() {
        assert!(matches!(
            WebhookEvent::from_slice(b"not json"),
            Err(WebhookError::InvalidPayload(_))
        ));
        let raw = body("customer.subscription.deleted", json!({ "customer": "cus_1" }));
        assert!(WebhookEvent::from_slice(&raw).is_err());
    }
}
