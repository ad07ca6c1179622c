//! Core business logic for StayHub.
//!
//! Services own the marketplace rules: who may approve, delete and list what,
//! how deletions cascade, and which notifications each workflow sends.

pub mod services;

pub use services::*;
