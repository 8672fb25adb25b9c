//! Shared types and configuration for Tallybook.
//!
//! This crate provides the common vocabulary used across the engine:
//! - Typed IDs for type-safe entity references
//! - Engine configuration

pub mod config;
pub mod types;

pub use config::{AuditConfig, EngineConfig};
