//! Common test utilities for integration tests
//!
//! Provides:
//! - A deterministic xorshift RNG so every test is reproducible from a seed
//! - Synthetic labeled IMU recordings with per-activity signal signatures
//! - Hidden-state path simulation for decode-recovery properties
//!
//! Everything here is seed-driven; no test depends on ambient randomness.

#![allow(dead_code)]

pub mod generators;
