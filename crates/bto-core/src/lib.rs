//! Core rules engine for build-to-order (BTO) flat allocation.
//!
//! The `allocation` module carries the object model and invariants: who may
//! apply for which flat category, how unit inventories move, how applications
//! progress from submission to booking, and how officers are attached to
//! projects. The surrounding modules are the service plumbing: environment
//! configuration, tracing setup, CSV catalog seeds, and the HTTP error type
//! shared with the API binary.

pub mod allocation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
