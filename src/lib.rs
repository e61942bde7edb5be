//! # Recibo - Bluetooth Receipt Printer Service
//!
//! Recibo is a Rust library for printing text on Bluetooth receipt
//! printers that speak the Serial Port Profile. It provides:
//!
//! - **Device enumeration**: list devices already paired with the host
//!   radio (BlueZ) and report them to observers
//! - **Print dispatch**: fire-and-forget text printing over RFCOMM with
//!   ESC/POS style control bytes
//! - **Transport**: RFCOMM link management with a mockable seam
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use recibo::{
//!     enumerator::{BluezSource, DeviceEnumerator},
//!     printer::PrinterConfig,
//!     service::PrinterService,
//! };
//!
//! let service = PrinterService::new(PrinterConfig::GENERIC_SPP);
//!
//! // Discover paired devices into the service's registry
//! let enumerator = DeviceEnumerator::new(BluezSource::new()?, service.registry());
//! enumerator.refresh();
//!
//! for device in service.device_list() {
//!     println!("{device}");
//! }
//!
//! // Print; the caller is not blocked, the handle is optional
//! if let Some(job) = service.print("HELLO", "00:11:62:AA:BB:CC") {
//!     job.wait()?;
//! }
//! # Ok::<(), recibo::ReciboError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS control bytes and print-frame builder |
//! | [`device`] | Device value type and address validation |
//! | [`registry`] | Observable registry of discovered devices |
//! | [`enumerator`] | Bonded-device enumeration (BlueZ D-Bus) |
//! | [`transport`] | RFCOMM link and the transport seam |
//! | [`printer`] | Link profiles |
//! | [`service`] | The printer service surface |
//! | [`error`] | Error types |

pub mod device;
pub mod enumerator;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod transport;

// Re-exports for convenience
pub use device::BtDevice;
pub use error::ReciboError;
pub use printer::PrinterConfig;
pub use registry::DeviceRegistry;
pub use service::{PrintJob, PrinterService};
pub use transport::BluetoothTransport;
