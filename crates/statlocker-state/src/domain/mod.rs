//! Domain stores: each owns exactly one aggregate
//!
//! Stores mutate in memory first and persist write-through; persistence
//! failures never reach the caller (see crate docs for the contract).

pub mod demo;
pub mod gamification;
pub mod progress;
pub mod session;
