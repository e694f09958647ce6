//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories over Diesel
//! - **memory**: in-process catalogue store
//! - **auth**: configured accounts with issued API tokens
//! - **throttle**: GCRA rate limiting via governor
//! - **markup**: HTML escaping sanitizer

pub mod auth;
pub mod markup;
pub mod memory;
pub mod persistence;
pub mod throttle;
