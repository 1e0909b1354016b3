//! End-to-end checkout against a live dev server.
//!
//! Spins the axum router on an ephemeral port and drives the full flow
//! through the HTTP client: plan load, order creation, gateway completion,
//! server-side verification, subscription activation.

use std::sync::Arc;

use rust_decimal_macros::dec;

use storefront_api::ApiClient;
use storefront_core::{BusinessVertical, ContactDetails, UserRole};
use storefront_payments::{
    BillingCycle, CheckoutFlow, CheckoutRequest, DraftStore, GateDecision, MemoryDraftStore,
    MockGateway, Navigation, SubscriptionGate,
};
use storefront_server::{router, AppState, ServerConfig};

const SECRET: &str = "whsec_integration";

async fn spawn_server(test_mode: bool) -> String {
    let state = AppState::new(ServerConfig {
        key_id: "key_integration".into(),
        key_secret: SECRET.into(),
        test_mode,
    });
    spawn_with_state(state).await
}

async fn spawn_with_state(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });
    format!("http://{addr}")
}

fn request(cycle: BillingCycle) -> CheckoutRequest {
    CheckoutRequest {
        plan_name: "Pro".into(),
        vertical: BusinessVertical::Restaurant,
        cycle,
        contact: ContactDetails {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "98765 43210".into(),
        },
        autopay: true,
        coupon_code: None,
        gstin: None,
        billing_address: None,
        company_legal_name: None,
    }
}

#[tokio::test]
async fn test_full_checkout_activates_subscription() {
    let base = spawn_server(false).await;
    let backend = Arc::new(ApiClient::new(&base).expect("client"));
    let gateway = Arc::new(MockGateway::new().completing_with_secret(SECRET));
    let drafts = Arc::new(MemoryDraftStore::new());
    let flow = CheckoutFlow::new(backend.clone(), gateway.clone(), drafts.clone());

    let plans = flow.load_plans(BusinessVertical::Restaurant).await;
    // Free and the retail-only plan are excluded; cheapest first
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0].name, "Basic");

    let quote = flow
        .quote(&plans, "Pro", BillingCycle::Yearly, None)
        .expect("quote");
    assert_eq!(quote.amount, dec!(10789));
    assert_eq!(quote.button_label, "Pay ₹10,789");

    let nav = flow
        .confirm_and_pay(&plans, request(BillingCycle::Yearly))
        .await
        .expect("checkout");
    assert_eq!(nav, Navigation::Success);
    assert_eq!(nav.route(), "/checkout/success");

    // Terminal draft is in place and the anchor is gone
    let succeeded = drafts.take_succeeded().expect("read").expect("succeeded");
    assert_eq!(succeeded.plan, "Pro");
    assert_eq!(succeeded.amount, dec!(10789));
    assert!(succeeded.order_id.starts_with("order_"));
    assert!(succeeded.subscription_end.is_some());
    assert!(drafts.peek_opened().expect("read").is_none());

    // The server now reports an active yearly subscription and the gate opens
    let sub = storefront_payments::BackendApi::fetch_subscription(backend.as_ref())
        .await
        .expect("fetch")
        .expect("subscription");
    assert_eq!(sub.plan_name, "Pro");
    assert!(sub.autopay);
    assert!(sub.days_remaining() > 300);

    let gate = SubscriptionGate::new(backend);
    assert_eq!(gate.evaluate().await, GateDecision::Allow);
}

#[tokio::test]
async fn test_forged_signature_is_rejected_server_side() {
    let base = spawn_server(false).await;
    let backend = Arc::new(ApiClient::new(&base).expect("client"));
    // The widget reports success, but its confirmation is signed with the
    // wrong secret; the server must refuse to settle.
    let gateway = Arc::new(MockGateway::new().completing_with_secret("whsec_wrong"));
    let drafts = Arc::new(MemoryDraftStore::new());
    let flow = CheckoutFlow::new(backend.clone(), gateway, drafts.clone());

    let plans = flow.load_plans(BusinessVertical::Restaurant).await;
    let nav = flow
        .confirm_and_pay(&plans, request(BillingCycle::Monthly))
        .await
        .expect("checkout");
    let Navigation::Failure { reason } = nav else {
        panic!("forged confirmation settled");
    };
    assert_eq!(reason, "Invalid payment signature");

    let failed = drafts.take_failed().expect("read").expect("failed draft");
    assert_eq!(failed.plan.as_deref(), Some("Pro"));
    assert!(drafts.take_succeeded().expect("read").is_none());

    // No subscription was activated
    let sub = storefront_payments::BackendApi::fetch_subscription(backend.as_ref())
        .await
        .expect("fetch");
    assert!(sub.is_none());
}

#[tokio::test]
async fn test_test_mode_settles_without_gateway() {
    let base = spawn_server(true).await;
    let backend = Arc::new(ApiClient::new(&base).expect("client"));
    // No scripted outcome: launching would fail, proving the widget is bypassed
    let gateway = Arc::new(MockGateway::new());
    let drafts = Arc::new(MemoryDraftStore::new());
    let flow = CheckoutFlow::new(backend.clone(), gateway.clone(), drafts.clone());

    let plans = flow.load_plans(BusinessVertical::Restaurant).await;
    let nav = flow
        .confirm_and_pay(&plans, request(BillingCycle::Monthly))
        .await
        .expect("checkout");
    assert_eq!(nav, Navigation::Success);
    assert!(gateway.launched_orders().is_empty());

    let succeeded = drafts.take_succeeded().expect("read").expect("succeeded");
    assert_eq!(succeeded.amount, dec!(999));

    let sub = storefront_payments::BackendApi::fetch_subscription(backend.as_ref())
        .await
        .expect("fetch")
        .expect("subscription");
    let days = sub.days_remaining();
    assert!(days > 25 && days <= 30);
}

#[tokio::test]
async fn test_admin_bypasses_gate_with_no_tenant() {
    let state = AppState::new(ServerConfig {
        key_id: "key_integration".into(),
        key_secret: SECRET.into(),
        test_mode: false,
    })
    .with_user(storefront_core::UserProfile {
        id: "user_admin".into(),
        name: "Platform Admin".into(),
        email: "admin@example.com".into(),
        role: UserRole::Admin,
    });
    let base = spawn_with_state(state).await;
    let backend = Arc::new(ApiClient::new(&base).expect("client"));

    let gate = SubscriptionGate::new(backend);
    assert_eq!(gate.evaluate().await, GateDecision::Bypass);
}
