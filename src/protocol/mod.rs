//! # Printer Protocol
//!
//! This module implements the small ESC/POS command subset understood by
//! generic Bluetooth receipt printers.
//!
//! ## Modules
//!
//! - [`commands`]: Control-byte constants and print-frame builders

pub mod commands;

pub use commands::{TextStyle, text_frame};
