//! Shared value types used across the state engine

pub mod athlete;

pub use athlete::AthleteSnapshot;
