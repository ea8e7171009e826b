//! AlongTrack Core - Domain models, ports, and configuration
//!
//! This crate contains the domain types, port definitions and layered
//! configuration shared by the AlongTrack pipeline, API and CLI.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod ports;
pub mod presets;

pub use error::{AlongTrackError, Result};
