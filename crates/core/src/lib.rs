//! Marketplace Core - Shared types library.
//!
//! This crate provides the normalized commerce model used by the gateway:
//! products, carts, orders, payment sessions, and store configuration. Every
//! platform adapter projects its backend's native shapes into these types.
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation logic - no I/O, no
//! HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Normalized commerce types, store configuration, and
//!   checkout-readiness validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
