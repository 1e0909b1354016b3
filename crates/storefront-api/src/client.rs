//! Storefront Backend Client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use storefront_core::{BusinessVertical, Subscription, UserProfile};
use storefront_payments::{
    BackendApi, CreateOrderRequest, CreateOrderResponse, PaymentConfirmation, PaymentError, Plan,
    Result, VerifyOutcome,
};

/// Client configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Backend base URL, no trailing slash
    pub base_url: String,

    /// Bearer token for authenticated tenant calls
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());
        let auth_token = std::env::var("STOREFRONT_API_TOKEN").ok();

        Self {
            base_url,
            auth_token,
            ..Default::default()
        }
    }
}

/// HTTP client for the Storefront backend
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create from configuration
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Config(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(ApiConfig::from_env())
    }

    /// Point at a base URL with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(ApiConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| PaymentError::Backend(format!("invalid response body: {e}")));
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .error
            .unwrap_or_else(|| format!("request failed with status {status}"));
        if status == StatusCode::NOT_FOUND {
            Err(PaymentError::BackendNotFound(message))
        } else {
            Err(PaymentError::Backend(message))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    razorpay_order_id: &'a str,
    razorpay_payment_id: &'a str,
    razorpay_signature: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateRequest<'a> {
    order_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct StorefrontResponse {
    subscription: Option<Subscription>,
}

#[async_trait]
impl BackendApi for ApiClient {
    async fn fetch_plans(&self, vertical: BusinessVertical) -> Result<Vec<Plan>> {
        let response = self
            .authorize(self.http.get(self.url("/api/plans")))
            .query(&[("vertical", vertical.label())])
            .send()
            .await
            .map_err(|e| PaymentError::Backend(e.to_string()))?;
        Self::decode(response).await
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreateOrderResponse> {
        tracing::debug!(plan = %request.plan, cycle = %request.cycle, "creating payment order");
        let response = self
            .authorize(self.http.post(self.url("/api/payment/order")))
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::Backend(e.to_string()))?;
        Self::decode(response).await
    }

    async fn verify_payment(&self, confirmation: &PaymentConfirmation) -> Result<VerifyOutcome> {
        let body = VerifyRequest {
            razorpay_order_id: &confirmation.order_id,
            razorpay_payment_id: &confirmation.payment_id,
            razorpay_signature: &confirmation.signature,
        };
        let response = self
            .authorize(self.http.post(self.url("/api/payment/verify")))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Backend(e.to_string()))?;
        Self::decode(response).await
    }

    async fn simulate_test_payment(&self, order_id: &str) -> Result<VerifyOutcome> {
        let response = self
            .authorize(self.http.post(self.url("/api/payment/simulate")))
            .json(&SimulateRequest { order_id })
            .send()
            .await
            .map_err(|e| PaymentError::Backend(e.to_string()))?;
        Self::decode(response).await
    }

    async fn fetch_subscription(&self) -> Result<Option<Subscription>> {
        let response = self
            .authorize(self.http.get(self.url("/api/storefront")))
            .send()
            .await
            .map_err(|e| PaymentError::Backend(e.to_string()))?;
        let storefront: StorefrontResponse = Self::decode(response).await?;
        Ok(storefront.subscription)
    }

    async fn current_user(&self) -> Result<UserProfile> {
        let response = self
            .authorize(self.http.get(self.url("/api/user")))
            .send()
            .await
            .map_err(|e| PaymentError::Backend(e.to_string()))?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.url("/api/plans"), "http://localhost:3000/api/plans");
    }

    #[test]
    fn test_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.auth_token.is_none());
    }
}
