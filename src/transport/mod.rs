//! # Printer Transport Layer
//!
//! This module provides communication backends for sending data to printers.
//!
//! ## Available Transports
//!
//! - [`bluetooth`]: Bluetooth RFCOMM for wireless printing (Linux)
//!
//! The [`Transport`] and [`Connect`] traits are the seam between the print
//! dispatcher and the platform Bluetooth stack; tests substitute a mock
//! transport that records written bytes.

pub mod bluetooth;

pub use bluetooth::{BluetoothConnector, BluetoothTransport};

use crate::error::ReciboError;

/// An open byte-stream link to a printer.
pub trait Transport: Send {
    /// Write all of `data` to the printer.
    fn write_all(&mut self, data: &[u8]) -> Result<(), ReciboError>;

    /// Flush buffered output to the link.
    fn flush(&mut self) -> Result<(), ReciboError>;

    /// Release the link. Idempotent; the link is unusable afterwards.
    fn close(&mut self) -> Result<(), ReciboError>;
}

/// Opens a [`Transport`] to a printer by hardware address.
pub trait Connect: Send + Sync {
    fn connect(&self, address: &str) -> Result<Box<dyn Transport>, ReciboError>;
}
