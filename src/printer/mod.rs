//! # Printer Module
//!
//! This module provides printer-specific configurations and utilities.
//!
//! ## Modules
//!
//! - [`config`]: Printer link profiles

pub mod config;

pub use config::PrinterConfig;
