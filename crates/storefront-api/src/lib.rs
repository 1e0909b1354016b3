//! # storefront-api
//!
//! `reqwest`-based implementation of the
//! [`BackendApi`](storefront_payments::BackendApi) seam against the
//! Storefront REST backend.

mod client;

pub use client::{ApiClient, ApiConfig};
