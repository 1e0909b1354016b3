//! # storefront-core
//!
//! Shared domain types for the Storefront platform: business verticals,
//! tenant subscriptions, contact details, and currency formatting.
//!
//! Everything here is read-side domain vocabulary; the checkout flow and
//! subscription gate in `storefront-payments` build on these types, and the
//! dev backend in `storefront-server` serves them over the wire.

pub mod contact;
pub mod currency;
pub mod error;
pub mod subscription;
pub mod user;
pub mod vertical;

pub use contact::{ContactDetails, GatewayContact};
pub use currency::format_inr;
pub use error::{CoreError, Result};
pub use subscription::{Subscription, SubscriptionStatus};
pub use user::{UserProfile, UserRole};
pub use vertical::BusinessVertical;
