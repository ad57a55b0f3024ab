//! Core use-case services.
//!
//! # Responsibility
//! - Authenticate users, issue and check session tokens, gate requests.
//! - Keep credential handling out of the transport layer.
//!
//! # Invariants
//! - Services hold no mutable state of their own; shared state lives in
//!   the repositories.

pub mod access;
pub mod auth_service;
pub mod password;
pub mod token;
