//! # storefront-payments
//!
//! Checkout and subscription-state orchestration for the Storefront platform.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       CheckoutFlow                            │
//! │  ┌──────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │
//! │  │   Plan   │  │  Gateway   │  │Settlement │  │   Draft   │  │
//! │  │ Resolver │──│  Session   │──│  Engine   │──│   Store   │  │
//! │  └──────────┘  └────────────┘  └───────────┘  └───────────┘  │
//! │        │              │              │                        │
//! │        └──────────────┴──── BackendApi (trait) ───────────────│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flow drives a single checkout attempt through
//! `Idle → CreatingOrder → AwaitingGateway → Settling → Done | Failed`.
//! Transitions that must survive a process restart are persisted as checkout
//! drafts with strict read-once-then-delete consumption, which is also how an
//! interrupted gateway session is detected and settled as a failure on the
//! next load.
//!
//! The [`SubscriptionGate`] is independent of checkout: it inspects the
//! tenant's subscription record and decides whether to block, warn, or allow
//! entry to the protected dashboard area.

pub mod backend;
pub mod checkout;
pub mod coupon;
pub mod draft;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod plan;
pub mod results;
pub mod settlement;

pub use backend::{BackendApi, CreateOrderRequest, CreateOrderResponse, OrderInfo, VerifyOutcome};
pub use checkout::{CheckoutFlow, CheckoutQuote, CheckoutRequest, CheckoutState, Navigation};
pub use coupon::{Coupon, lookup_coupon};
pub use draft::{DraftStore, FailedDraft, FileDraftStore, MemoryDraftStore, OpenedDraft, SucceededDraft};
pub use error::{PaymentError, Result};
pub use gate::{BlockReason, GateDecision, SubscriptionGate};
pub use gateway::{
    GATEWAY_LOAD_TIMEOUT, GatewayEvent, GatewayOrder, GatewayPrefill, MockGateway,
    PaymentConfirmation, PaymentGateway, PaymentSession, ensure_ready, sign_confirmation,
    verify_signature,
};
pub use plan::{BillingCycle, CustomPricing, Plan, PlanFeatures, PlanResolver};
pub use results::{FailureView, ResultPage, SuccessView, load_failure, load_success};
pub use settlement::SettlementEngine;
