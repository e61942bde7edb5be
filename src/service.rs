//! # Printer Service
//!
//! The service surface consumed by UI code: fire-and-forget printing plus
//! the shared device registry.
//!
//! ## Dispatch Model
//!
//! Each print call spawns one detached worker thread and returns
//! immediately; the post-write settle delay blocks the worker, never the
//! caller. There is no queue and no serialization across calls: concurrent
//! prints may race on the Bluetooth radio, which is an accepted
//! limitation of this design.
//!
//! ## Failure Semantics
//!
//! Connect and write failures are caught and logged on the worker; the
//! transport is released either way. The returned [`PrintJob`] handle
//! additionally surfaces the outcome to callers who want it; dropping
//! the handle keeps the classic fire-and-forget behavior.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::device::BtDevice;
use crate::error::ReciboError;
use crate::printer::PrinterConfig;
use crate::protocol::{TextStyle, text_frame};
use crate::registry::DeviceRegistry;
use crate::transport::{BluetoothConnector, Connect, Transport};

/// Handle to an in-flight print job.
///
/// The job runs regardless of whether the handle is kept.
pub struct PrintJob {
    handle: JoinHandle<Result<(), ReciboError>>,
}

impl PrintJob {
    /// Block until the worker finishes and return its outcome.
    pub fn wait(self) -> Result<(), ReciboError> {
        self.handle
            .join()
            .map_err(|_| ReciboError::Transport("Print worker panicked".to_string()))?
    }

    /// Whether the worker has finished (without blocking).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Bluetooth receipt-printer service.
pub struct PrinterService {
    config: PrinterConfig,
    connector: Arc<dyn Connect>,
    registry: Arc<DeviceRegistry>,
}

impl PrinterService {
    /// Service over the real Bluetooth stack with the given link profile.
    pub fn new(config: PrinterConfig) -> Self {
        Self::with_connector(
            config,
            Arc::new(BluetoothConnector::new(config)),
            Arc::new(DeviceRegistry::new()),
        )
    }

    /// Service over an arbitrary connector and registry.
    ///
    /// This is the seam used by tests (mock transport) and by embedders
    /// that share one registry between the service and an enumerator.
    pub fn with_connector(
        config: PrinterConfig,
        connector: Arc<dyn Connect>,
        registry: Arc<DeviceRegistry>,
    ) -> Self {
        Self {
            config,
            connector,
            registry,
        }
    }

    /// The shared device registry fed by a
    /// [`DeviceEnumerator`](crate::enumerator::DeviceEnumerator).
    pub fn registry(&self) -> Arc<DeviceRegistry> {
        self.registry.clone()
    }

    /// Snapshot of the devices discovered so far.
    pub fn device_list(&self) -> Vec<BtDevice> {
        self.registry.devices()
    }

    /// Print `message` to the device at `address` with the profile's
    /// default settle delay.
    pub fn print(&self, message: &str, address: &str) -> Option<PrintJob> {
        self.print_with_delay(message, address, self.config.settle_delay())
    }

    /// Print with an explicit post-write settle delay.
    pub fn print_with_delay(
        &self,
        message: &str,
        address: &str,
        settle: Duration,
    ) -> Option<PrintJob> {
        self.print_styled(message, address, TextStyle::Normal, settle)
    }

    /// Print with an explicit text style and settle delay.
    ///
    /// Empty message or empty address is a no-op: no worker is spawned and
    /// no connection is attempted. Returns the job handle otherwise.
    pub fn print_styled(
        &self,
        message: &str,
        address: &str,
        style: TextStyle,
        settle: Duration,
    ) -> Option<PrintJob> {
        if message.is_empty() {
            log::error!("Invalid message: message was empty");
            return None;
        }
        if address.is_empty() {
            log::error!("Invalid address: address was empty");
            return None;
        }

        let connector = self.connector.clone();
        let message = message.to_string();
        let address = address.to_string();

        let handle = thread::spawn(move || {
            log::debug!("Printing {} bytes to {}", message.len(), address);
            let result = run_print_job(connector.as_ref(), &message, &address, style, settle);
            match &result {
                Ok(()) => log::debug!("Done printing to {}", address),
                Err(e) => log::error!("Error printing to {}: {}", address, e),
            }
            result
        });

        Some(PrintJob { handle })
    }
}

impl Default for PrinterService {
    fn default() -> Self {
        Self::new(PrinterConfig::GENERIC_SPP)
    }
}

/// One print job, start to finish, on the worker thread.
///
/// The transport is closed whether or not the write succeeded; a close
/// failure only surfaces when the write itself was fine.
fn run_print_job(
    connector: &dyn Connect,
    message: &str,
    address: &str,
    style: TextStyle,
    settle: Duration,
) -> Result<(), ReciboError> {
    let mut transport = connector.connect(address)?;
    let wrote = write_and_settle(transport.as_mut(), &text_frame(message, style), settle);
    let closed = transport.close();
    wrote.and(closed)
}

fn write_and_settle(
    transport: &mut dyn Transport,
    frame: &[u8],
    settle: Duration,
) -> Result<(), ReciboError> {
    transport.write_all(frame)?;
    transport.flush()?;
    // Give slow printer hardware time to consume the buffer before the
    // link is torn down.
    thread::sleep(settle);
    Ok(())
}
