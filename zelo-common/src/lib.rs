//! # Zelo Common Library
//!
//! Shared code for the Zelo asset-maintenance services including:
//! - Database initialization and schema
//! - Shared models (timeline events, recurrence records, alerts)
//! - Event types (ZeloEvent enum) and the in-process event bus
//! - Configuration loading and root folder resolution

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
