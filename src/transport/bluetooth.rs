//! # Bluetooth RFCOMM Transport
//!
//! This module talks to receipt printers over the Bluetooth Serial Port
//! Profile (SPP) via RFCOMM.
//!
//! ## Address Resolution
//!
//! The dispatcher hands over a hardware address
//! (`XX:XX:XX:XX:XX:XX`); the transport resolves it to an RFCOMM TTY:
//!
//! 1. If `/proc/net/rfcomm` (or `rfcomm -a`) already lists a binding for
//!    that address, the existing `/dev/rfcommN` device is reused.
//! 2. Otherwise any in-progress discovery scan is stopped (discovery and
//!    connection cannot run concurrently on the radio), the device is
//!    connected via `bluetoothctl`, reachability is verified with
//!    `l2ping`, and a fresh binding is created with `rfcomm bind`
//!    (requires root).
//!
//! ## Bluetooth Setup (Linux)
//!
//! The printer must be paired before it can be printed to:
//!
//! ```bash
//! $ bluetoothctl
//! [bluetooth]# scan on
//! # Note the printer's address, e.g. 00:11:62:XX:XX:XX
//! [bluetooth]# pair 00:11:62:XX:XX:XX
//! ```
//!
//! ## TTY Configuration
//!
//! The RFCOMM device is opened in raw mode so binary control bytes pass
//! through unmodified: no input processing, no output post-processing
//! (OPOST would translate the line-feed suffix), 8-bit characters, no
//! echo, non-canonical mode.
//!
//! ## Chunked Writes
//!
//! Large writes are split into chunks with a small delay between them to
//! avoid overrunning the Bluetooth buffer. Receipt text is far below the
//! chunk size in practice; the chunking matters for long jobs.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::device::is_valid_mac;
use crate::error::ReciboError;
use crate::printer::PrinterConfig;
use crate::transport::{Connect, Transport};

/// # Bluetooth Printer Transport
///
/// An open RFCOMM link to a printer, driven through its TTY device.
///
/// ## Example
///
/// ```no_run
/// use recibo::printer::PrinterConfig;
/// use recibo::protocol::{TextStyle, text_frame};
/// use recibo::transport::{BluetoothTransport, Transport};
///
/// let mut transport =
///     BluetoothTransport::connect("00:11:62:AA:BB:CC", &PrinterConfig::GENERIC_SPP)?;
/// transport.write_all(&text_frame("HELLO", TextStyle::Normal))?;
/// transport.flush()?;
/// transport.close()?;
/// # Ok::<(), recibo::ReciboError>(())
/// ```
pub struct BluetoothTransport {
    file: Option<File>,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl BluetoothTransport {
    /// Open a link to the printer at `address`.
    ///
    /// Resolves the address to an RFCOMM TTY (binding one if necessary,
    /// see the module docs) and configures it for raw binary output.
    ///
    /// ## Errors
    ///
    /// Returns an error if the address is malformed, the device is not
    /// reachable, binding fails (needs root), or the TTY cannot be
    /// configured.
    pub fn connect(address: &str, config: &PrinterConfig) -> Result<Self, ReciboError> {
        if !is_valid_mac(address) {
            return Err(ReciboError::InvalidAddress(address.to_string()));
        }

        let device_path = match find_rfcomm_for_mac(address)? {
            Some(path) => {
                log::debug!("Reusing RFCOMM binding {path} for {address}");
                path
            }
            None => setup_rfcomm(address, config.rfcomm_channel)?,
        };

        let mut transport = Self::open(&device_path)?;
        transport.chunk_size = config.chunk_size;
        transport.chunk_delay = config.chunk_delay();
        Ok(transport)
    }

    /// Open an already-bound RFCOMM device directly (e.g. "/dev/rfcomm0").
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, ReciboError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            ReciboError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(file.as_raw_fd())?;

        let defaults = PrinterConfig::GENERIC_SPP;
        Ok(Self {
            file: Some(file),
            chunk_size: defaults.chunk_size,
            chunk_delay: defaults.chunk_delay(),
        })
    }

    fn file(&mut self) -> Result<&mut File, ReciboError> {
        self.file
            .as_mut()
            .ok_or_else(|| ReciboError::Transport("Link already closed".to_string()))
    }
}

impl Transport for BluetoothTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), ReciboError> {
        let chunk_size = self.chunk_size;
        let chunk_delay = self.chunk_delay;
        let file = self.file()?;

        if data.len() <= chunk_size {
            file.write_all(data)
                .map_err(|e| ReciboError::Transport(format!("Write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(chunk_size) {
                file.write_all(chunk)
                    .map_err(|e| ReciboError::Transport(format!("Write failed: {}", e)))?;

                if !chunk_delay.is_zero() {
                    thread::sleep(chunk_delay);
                }
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReciboError> {
        self.file()?
            .flush()
            .map_err(|e| ReciboError::Transport(format!("Flush failed: {}", e)))
    }

    fn close(&mut self) -> Result<(), ReciboError> {
        // Dropping the File releases the TTY; repeated close is a no-op.
        if let Some(mut file) = self.file.take() {
            file.flush()
                .map_err(|e| ReciboError::Transport(format!("Flush on close failed: {}", e)))?;
        }
        Ok(())
    }
}

/// Default connector used by the print dispatcher.
///
/// Opens a [`BluetoothTransport`] per print job with the link tuning of a
/// [`PrinterConfig`].
pub struct BluetoothConnector {
    config: PrinterConfig,
}

impl BluetoothConnector {
    pub fn new(config: PrinterConfig) -> Self {
        Self { config }
    }
}

impl Default for BluetoothConnector {
    fn default() -> Self {
        Self::new(PrinterConfig::GENERIC_SPP)
    }
}

impl Connect for BluetoothConnector {
    fn connect(&self, address: &str) -> Result<Box<dyn Transport>, ReciboError> {
        Ok(Box::new(BluetoothTransport::connect(address, &self.config)?))
    }
}

/// Find an existing RFCOMM device bound to the given MAC address.
///
/// Checks `/proc/net/rfcomm` and falls back to the `rfcomm -a` command.
/// Returns the device path (e.g., "/dev/rfcomm0") if found.
#[cfg(unix)]
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>, ReciboError> {
    let mac_upper = mac.to_uppercase();

    // Try /proc/net/rfcomm first (format: "rfcomm0: XX:XX:XX:XX:XX:XX channel N ...")
    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
        if let Some(path) = scan_rfcomm_listing(&contents, &mac_upper) {
            return Ok(Some(path));
        }
    }

    // Fallback: rfcomm -a command
    let output = Command::new("rfcomm")
        .arg("-a")
        .output()
        .map_err(|e| ReciboError::Transport(format!("Failed to run 'rfcomm -a': {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(scan_rfcomm_listing(&stdout, &mac_upper))
}

#[cfg(not(unix))]
pub fn find_rfcomm_for_mac(_mac: &str) -> Result<Option<String>, ReciboError> {
    Ok(None)
}

/// Scan `rfcomm`-style listing text for a line mentioning `mac_upper`,
/// returning the existing device path for it.
fn scan_rfcomm_listing(listing: &str, mac_upper: &str) -> Option<String> {
    for line in listing.lines() {
        if !line.to_uppercase().contains(mac_upper) {
            continue;
        }
        if let Some(dev_name) = line.split(':').next() {
            let device_path = format!("/dev/{}", dev_name.trim());
            if Path::new(&device_path).exists() {
                return Some(device_path);
            }
        }
    }
    None
}

/// Set up an RFCOMM device for a Bluetooth MAC address.
///
/// Runs:
/// 1. `bluetoothctl scan off` - stop any in-progress discovery scan
/// 2. `bluetoothctl connect <MAC>` - connect to the device
/// 3. `l2ping -c 1 <MAC>` - verify connectivity
/// 4. `rfcomm bind <channel> <MAC> 1` - create /dev/rfcommN
///
/// Returns the device path on success (e.g., "/dev/rfcomm0").
///
/// **Requires root privileges** for `rfcomm bind`.
#[cfg(unix)]
pub fn setup_rfcomm(mac: &str, channel: u8) -> Result<String, ReciboError> {
    let mac_upper = mac.to_uppercase();
    let device_path = format!("/dev/rfcomm{}", channel);

    // Step 1: Stop discovery. Discovery and a connect attempt cannot share
    // the radio; a failure here just means no scan was running.
    let _ = Command::new("bluetoothctl").args(["scan", "off"]).output();

    // Step 2: Connect via bluetoothctl (may fail if already connected, that's ok)
    log::info!("Connecting to {}...", mac_upper);
    let output = Command::new("bluetoothctl")
        .arg("connect")
        .arg(&mac_upper)
        .output()
        .map_err(|e| ReciboError::Transport(format!("Failed to run bluetoothctl: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.contains("Connection successful") || stdout.contains("already connected") {
        log::info!("Connected to {}", mac_upper);
    } else {
        log::debug!("bluetoothctl returned: {}", stdout.trim());
        // Continue anyway - l2ping will verify
    }

    // Small delay for connection to stabilize
    thread::sleep(Duration::from_millis(500));

    // Step 3: Verify connectivity with l2ping
    let output = Command::new("l2ping")
        .arg("-c")
        .arg("1")
        .arg(&mac_upper)
        .output()
        .map_err(|e| ReciboError::Transport(format!("Failed to run l2ping: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReciboError::Transport(format!(
            "Device {} not reachable: {}",
            mac_upper,
            stderr.trim()
        )));
    }

    // Step 4: Bind RFCOMM
    log::info!("Binding rfcomm{}...", channel);
    let output = Command::new("rfcomm")
        .arg("bind")
        .arg(channel.to_string())
        .arg(&mac_upper)
        .arg("1") // RFCOMM channel 1 (standard for SPP)
        .output()
        .map_err(|e| ReciboError::Transport(format!("Failed to run rfcomm bind: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReciboError::Transport(format!(
            "rfcomm bind failed: {}",
            stderr.trim()
        )));
    }

    // Wait for device to appear
    thread::sleep(Duration::from_millis(500));

    if !Path::new(&device_path).exists() {
        return Err(ReciboError::Transport(format!(
            "Device {} was not created",
            device_path
        )));
    }

    log::info!("Created {}", device_path);
    Ok(device_path)
}

#[cfg(not(unix))]
pub fn setup_rfcomm(_mac: &str, _channel: u8) -> Result<String, ReciboError> {
    Err(ReciboError::Transport(
        "RFCOMM setup not supported on this platform".to_string(),
    ))
}

/// Configure a file descriptor for raw TTY mode.
///
/// Disables all input/output processing so binary data passes through
/// unmodified. OPOST in particular would rewrite the 0x0A line-feed
/// suffix; IXON/IXOFF are disabled because 0x11/0x13 could appear in
/// message bytes.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), ReciboError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(ReciboError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    // Input flags: disable all processing and software flow control
    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    // Output flags: disable post-processing
    termios.c_oflag &= !libc::OPOST;

    // Local flags: disable echo, canonical mode, signals
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // Control flags: 8-bit characters, no parity
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(ReciboError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32) -> Result<(), ReciboError> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_malformed_address() {
        let err = BluetoothTransport::connect("not-a-mac", &PrinterConfig::GENERIC_SPP)
            .err()
            .unwrap();
        assert!(matches!(err, ReciboError::InvalidAddress(_)));
    }

    #[test]
    fn test_scan_rfcomm_listing_match() {
        // /dev/null always exists, so point the listing at it.
        let listing = "null: AA:BB:CC:DD:EE:FF channel 1 clean\n";
        assert_eq!(
            scan_rfcomm_listing(listing, "AA:BB:CC:DD:EE:FF"),
            Some("/dev/null".to_string())
        );
    }

    #[test]
    fn test_scan_rfcomm_listing_case_insensitive() {
        let listing = "null: aa:bb:cc:dd:ee:ff channel 1 clean\n";
        assert_eq!(
            scan_rfcomm_listing(listing, "AA:BB:CC:DD:EE:FF"),
            Some("/dev/null".to_string())
        );
    }

    #[test]
    fn test_scan_rfcomm_listing_no_match() {
        let listing = "rfcomm0: 11:22:33:44:55:66 channel 1 clean\n";
        assert_eq!(scan_rfcomm_listing(listing, "AA:BB:CC:DD:EE:FF"), None);
    }

    #[test]
    fn test_scan_rfcomm_listing_missing_device_node() {
        // Matching line, but /dev/rfcomm99 does not exist.
        let listing = "rfcomm99: AA:BB:CC:DD:EE:FF channel 1 clean\n";
        assert_eq!(scan_rfcomm_listing(listing, "AA:BB:CC:DD:EE:FF"), None);
    }

    // Note: connect/write tests require actual hardware.
    // The dispatcher's behavior is covered with a mock transport in
    // tests/service_tests.rs.
}
