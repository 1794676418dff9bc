//! Subscription billing: checkout sessions, signed webhooks and entitlement reconciliation.

pub mod events;
pub mod reconciler;
pub mod signature;
pub mod stripe;

pub use events::{BillingEvent, CheckoutSession, SubscriptionObject, SubscriptionStatus, WebhookEvent};
pub use reconciler::{ReconcileOutcome, SubscriptionReconciler};
pub use signature::{WebhookError, WebhookSignatureValidator};
pub use stripe::{BillingProvider, StripeClient};
