use anyhow::Result;
use uuid::Uuid;

use super::events::{BillingEvent, CheckoutSession, SubscriptionObject};
use crate::db::repositories::{PremiumGrant, UserRepository};
use crate::db::DbPool;

/// What applying a billing event did to the user table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Granted(Uuid),
    Updated { user_id: Uuid, is_premium: bool },
    Revoked(Uuid),
    /// The event could not be tied to a user and was discarded
    Dropped,
    Ignored,
}

/// Applies billing events to user entitlements.
///
/// Every transition is a last-write-wins update, so replays of the same event
/// land in the same state.
pub struct SubscriptionReconciler {
    users: UserRepository,
}

impl SubscriptionReconciler {
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    pub fn apply(&self, event: &BillingEvent) -> Result<ReconcileOutcome> {
        match event {
            BillingEvent::CheckoutCompleted(session) => self.checkout_completed(session, None),
            BillingEvent::SubscriptionUpdated(subscription) => self.subscription_updated(subscription),
            BillingEvent::SubscriptionDeleted(subscription) => self.subscription_deleted(subscription),
            BillingEvent::Other(event_type) => {
                tracing::debug!("Ignoring billing event type {}", event_type);
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }

    /// Grant premium for a completed checkout.
    ///
    /// The session's `metadata.user_id` wins; `fallback_user` is used by the
    /// on-demand status check, where the caller is known.
    pub fn checkout_completed(
        &self,
        session: &CheckoutSession,
        fallback_user: Option<&Uuid>,
    ) -> Result<ReconcileOutcome> {
        let Some(user_id) = session.user_id().or_else(|| fallback_user.copied()) else {
            tracing::warn!("Dropping checkout {}: no user_id in metadata", session.id);
            return Ok(ReconcileOutcome::Dropped);
        };

        let grant = self.users.mark_premium(
            &user_id,
            session.customer.as_deref(),
            session.subscription.as_deref(),
        )?;

        match grant {
            PremiumGrant::Granted => {
                tracing::info!("User {} is now premium (checkout {})", user_id, session.id);
                Ok(ReconcileOutcome::Granted(user_id))
            }
            PremiumGrant::UnknownUser => {
                tracing::warn!("Dropping checkout {}: user {} not found", session.id, user_id);
                Ok(ReconcileOutcome::Dropped)
            }
            PremiumGrant::CustomerTaken => {
                tracing::warn!(
                    "Dropping checkout {}: customer {:?} is linked to another account",
                    session.id,
                    session.customer
                );
                Ok(ReconcileOutcome::Dropped)
            }
        }
    }

    fn subscription_updated(&self, subscription: &SubscriptionObject) -> Result<ReconcileOutcome> {
        let Some(customer_id) = subscription.customer.as_deref() else {
            tracing::warn!("Dropping update of subscription {}: no customer", subscription.id);
            return Ok(ReconcileOutcome::Dropped);
        };

        let is_premium = subscription.status.grants_entitlement();
        match self
            .users
            .set_premium_by_customer(customer_id, is_premium, Some(&subscription.id))?
        {
            Some(user_id) => {
                tracing::info!(
                    "Subscription {} is {:?}; user {} premium={}",
                    subscription.id,
                    subscription.status,
                    user_id,
                    is_premium
                );
                Ok(ReconcileOutcome::Updated { user_id, is_premium })
            }
            None => {
                tracing::warn!("Dropping update of subscription {}: unknown customer {}", subscription.id, customer_id);
                Ok(ReconcileOutcome::Dropped)
            }
        }
    }

    fn subscription_deleted(&self, subscription: &SubscriptionObject) -> Result<ReconcileOutcome> {
        let Some(customer_id) = subscription.customer.as_deref() else {
            tracing::warn!("Dropping cancellation of subscription {}: no customer", subscription.id);
            return Ok(ReconcileOutcome::Dropped);
        };

        match self.users.cancel_by_customer(customer_id)? {
            Some(user_id) => {
                tracing::info!("Subscription {} canceled; user {} lost premium", subscription.id, user_id);
                Ok(ReconcileOutcome::Revoked(user_id))
            }
            None => {
                tracing::warn!("Dropping cancellation of subscription {}: unknown customer {}", subscription.id, customer_id);
                Ok(ReconcileOutcome::Dropped)
            }
        }
    }
}
