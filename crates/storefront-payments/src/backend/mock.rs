//! Mock Backend
//!
//! Scriptable [`BackendApi`] double for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use storefront_core::{BusinessVertical, Subscription, UserProfile, UserRole};

use super::{BackendApi, CreateOrderRequest, CreateOrderResponse, OrderInfo, VerifyOutcome};
use crate::error::{PaymentError, Result};
use crate::gateway::PaymentConfirmation;
use crate::plan::{Plan, PlanResolver};

enum SubscriptionScript {
    Record(Option<Subscription>),
    TenantNotFound,
    Error,
}

/// Scriptable backend double
pub struct MockBackend {
    plans: Vec<Plan>,
    plans_fail: bool,
    test_mode: bool,
    order_error: Option<String>,
    verify: Mutex<Option<VerifyOutcome>>,
    simulate: Mutex<Option<VerifyOutcome>>,
    subscription: SubscriptionScript,
    user_role: UserRole,
    orders: Mutex<Vec<CreateOrderRequest>>,
    verifications: Mutex<Vec<PaymentConfirmation>>,
}

impl MockBackend {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self {
            plans,
            plans_fail: false,
            test_mode: false,
            order_error: None,
            verify: Mutex::new(None),
            simulate: Mutex::new(None),
            subscription: SubscriptionScript::Record(None),
            user_role: UserRole::Owner,
            orders: Mutex::new(Vec::new()),
            verifications: Mutex::new(Vec::new()),
        }
    }

    /// Fail plan fetches with a network-style error
    pub fn failing_plans(mut self) -> Self {
        self.plans_fail = true;
        self
    }

    /// Orders come back flagged test-mode
    pub fn in_test_mode(mut self) -> Self {
        self.test_mode = true;
        self
    }

    /// Reject order creation with `message`
    pub fn rejecting_orders(mut self, message: impl Into<String>) -> Self {
        self.order_error = Some(message.into());
        self
    }

    /// Script the next `verify_payment` verdict
    pub fn verifying_with(self, outcome: VerifyOutcome) -> Self {
        *self.verify.lock().unwrap() = Some(outcome);
        self
    }

    /// Script the next `simulate_test_payment` verdict
    pub fn simulating_with(self, outcome: VerifyOutcome) -> Self {
        *self.simulate.lock().unwrap() = Some(outcome);
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = SubscriptionScript::Record(Some(subscription));
        self
    }

    /// Tenant record missing entirely (404)
    pub fn tenant_not_found(mut self) -> Self {
        self.subscription = SubscriptionScript::TenantNotFound;
        self
    }

    /// Subscription fetch fails with a non-404 error
    pub fn failing_subscription(mut self) -> Self {
        self.subscription = SubscriptionScript::Error;
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.user_role = role;
        self
    }

    /// Order-creation requests received so far
    pub fn created_orders(&self) -> Vec<CreateOrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    /// Confirmations submitted for verification so far
    pub fn verified_confirmations(&self) -> Vec<PaymentConfirmation> {
        self.verifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn fetch_plans(&self, vertical: BusinessVertical) -> Result<Vec<Plan>> {
        if self.plans_fail {
            return Err(PaymentError::Backend("connection refused".into()));
        }
        Ok(self
            .plans
            .iter()
            .filter(|p| p.vertical.offers_to(vertical))
            .cloned()
            .collect())
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreateOrderResponse> {
        self.orders.lock().unwrap().push(request.clone());
        if let Some(message) = &self.order_error {
            return Err(PaymentError::Backend(message.clone()));
        }
        let purchasable = PlanResolver::purchasable(&self.plans, request.vertical);
        let plan = PlanResolver::select(&purchasable, &request.plan)
            .ok_or_else(|| PaymentError::Backend("no plan".into()))?;
        let amount = plan.amount_for(request.cycle);
        let amount_minor = (amount * Decimal::from(100))
            .to_i64()
            .ok_or_else(|| PaymentError::Backend("amount overflow".into()))?;
        Ok(CreateOrderResponse {
            order: OrderInfo {
                id: format!("order_{}", uuid::Uuid::new_v4().simple()),
                amount_minor,
                currency: "INR".into(),
            },
            key_id: "key_mock".into(),
            test_mode: self.test_mode,
        })
    }

    async fn verify_payment(&self, confirmation: &PaymentConfirmation) -> Result<VerifyOutcome> {
        self.verifications.lock().unwrap().push(confirmation.clone());
        Ok(self.verify.lock().unwrap().take().unwrap_or(VerifyOutcome {
            success: true,
            paid_amount: None,
            subscription_end: None,
            message: None,
        }))
    }

    async fn simulate_test_payment(&self, _order_id: &str) -> Result<VerifyOutcome> {
        Ok(self
            .simulate
            .lock()
            .unwrap()
            .take()
            .unwrap_or(VerifyOutcome {
                success: true,
                paid_amount: None,
                subscription_end: None,
                message: None,
            }))
    }

    async fn fetch_subscription(&self) -> Result<Option<Subscription>> {
        match &self.subscription {
            SubscriptionScript::Record(record) => Ok(record.clone()),
            SubscriptionScript::TenantNotFound => {
                Err(PaymentError::BackendNotFound("tenant".into()))
            }
            SubscriptionScript::Error => Err(PaymentError::Backend("service unavailable".into())),
        }
    }

    async fn current_user(&self) -> Result<UserProfile> {
        Ok(UserProfile {
            id: "user_1".into(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            role: self.user_role,
        })
    }
}
