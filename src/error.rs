//! # Error Types
//!
//! This module defines error types used throughout the recibo library.

use thiserror::Error;

/// Main error type for recibo operations
#[derive(Debug, Error)]
pub enum ReciboError {
    /// Transport-level errors (connection, I/O)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Bluetooth stack errors (adapter, D-Bus, enumeration)
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),

    /// Malformed Bluetooth hardware address
    #[error("Invalid Bluetooth address: {0}")]
    InvalidAddress(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
