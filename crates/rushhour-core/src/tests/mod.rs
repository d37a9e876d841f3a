//! Crate-level scenario, determinism and integration tests.
//!
//! # Test Structure
//!
//! - `scenarios.rs`: Behavioural properties of movement, navigation and contacts
//! - `determinism.rs`: Same seed and inputs give identical runs
//! - `integration.rs`: End-to-end runs over a populated city
//! - `helpers.rs`: Map builders, scripted randomness and spawn utilities

pub mod helpers;
