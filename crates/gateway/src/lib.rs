//! Marketplace Gateway library.
//!
//! This crate provides the gateway functionality as a library,
//! allowing it to be tested and embedded.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod platform;
pub mod protocol;
pub mod rpc;
pub mod state;
pub mod stores;
pub mod tools;
