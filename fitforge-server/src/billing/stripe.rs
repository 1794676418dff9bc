use async_trait::async_trait;

use fitforge_types::{CheckoutSessionResponse, User};

use super::events::CheckoutSession;
use crate::config::Billing;
use crate::upstream::{check_status, http_client, UpstreamError};

/// Outbound billing operations
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Start a subscription checkout for `user`
    async fn create_checkout_session(&self, user: &User) -> Result<CheckoutSessionResponse, UpstreamError>;

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, UpstreamError>;
}

/// Stripe REST client (form-encoded requests, secret key as basic auth)
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
    price_id: String,
    frontend_url: String,
}

impl StripeClient {
    pub fn new(settings: &Billing) -> Self {
        Self {
            client: http_client(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            secret_key: settings.secret_key.clone().filter(|k| !k.is_empty()),
            price_id: settings.price_id.clone(),
            frontend_url: settings.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    fn secret_key(&self) -> Result<&str, UpstreamError> {
        self.secret_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("Stripe secret key"))
    }

    fn checkout_form(&self, user: &User) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "subscription".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price]", self.price_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("customer_email", user.email.clone()),
            ("client_reference_id", user.id.to_string()),
            ("metadata[user_id]", user.id.to_string()),
            (
                "success_url",
                format!("{}/membership-success?session_id={{CHECKOUT_SESSION_ID}}", self.frontend_url),
            ),
            ("cancel_url", format!("{}/membership-cancel", self.frontend_url)),
        ]
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_checkout_session(&self, user: &User) -> Result<CheckoutSessionResponse, UpstreamError> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(self.secret_key()?, None::<&str>)
            .form(&self.checkout_form(user))
            .send()
            .await?;

        let session: CheckoutSession = check_status(response).await?.json().await?;
        let url = session
            .url
            .ok_or_else(|| UpstreamError::Malformed("checkout session without url".to_string()))?;

        tracing::info!("Created checkout session {} for user {}", session.id, user.id);
        Ok(CheckoutSessionResponse {
            url,
            session_id: session.id,
        })
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, UpstreamError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_base,
                urlencoding::encode(session_id)
            ))
            .basic_auth(self.secret_key()?, None::<&str>)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn settings() -> Billing {
        Billing {
            api_base: "https://api.stripe.com/".to_string(),
            secret_key: None,
            webhook_secret: None,
            price_id: "price_123".to_string(),
            frontend_url: "http://localhost:5173/".to_string(),
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "payer".to_string(),
            email: "payer@example.com".to_string(),
            fitness_goal: Default::default(),
            experience_level: Default::default(),
            is_premium: false,
            premium_since: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            join_date: Utc::now(),
        }
    }

    #[test]
    fn test_checkout_form_carries_user_and_price() {
        let client = StripeClient::new(&settings());
        let user = user();
        let form = client.checkout_form(&user);

        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("line_items[0][price]"), "price_123");
        assert_eq!(get("metadata[user_id]"), user.id.to_string());
        assert_eq!(get("customer_email"), "payer@example.com");
        assert_eq!(
            get("success_url"),
            "http://localhost:5173/membership-success?session_id={CHECKOUT_SESSION_ID}"
        );
    }

    #[tokio::test]
    async fn test_missing_secret_key_is_reported() {
        let client = StripeClient::new(&settings());
        let result = client.retrieve_checkout_session("cs_1").await;
        assert!(matches!(result, Err(UpstreamError::NotConfigured(_))));
    }
}
