//! # Bonded Device Enumeration
//!
//! Enumerates Bluetooth devices already paired with the host radio and
//! reports each one to the [`DeviceRegistry`](crate::registry::DeviceRegistry).
//!
//! The production source reads the BlueZ D-Bus object tree: adapter power
//! state from `org.bluez.Adapter1`, bonded devices from `org.bluez.Device1`
//! objects with `Paired = true`. No scan is started; enumeration only lists
//! what the radio already remembers.
//!
//! ## Failure Semantics
//!
//! Enumeration never surfaces an error to the caller. A disabled radio,
//! missing adapter, or D-Bus failure is logged and reports nothing: the
//! caller is expected to get the radio enabled out-of-band and call
//! [`DeviceEnumerator::refresh`] again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dbus::blocking::Connection;

use crate::device::BtDevice;
use crate::error::ReciboError;
use crate::registry::DeviceRegistry;

const BLUEZ_SERVICE: &str = "org.bluez";
const DBUS_TIMEOUT: Duration = Duration::from_secs(5);

type ManagedObjects = HashMap<
    dbus::Path<'static>,
    HashMap<String, HashMap<String, dbus::arg::Variant<Box<dyn dbus::arg::RefArg>>>>,
>;

/// Where bonded devices come from.
///
/// Abstracts the platform Bluetooth stack so the enumerator can be tested
/// without a radio.
pub trait DeviceSource: Send {
    /// Whether the radio is powered on.
    fn radio_enabled(&self) -> Result<bool, ReciboError>;

    /// The set of devices bonded with the host radio, in no particular
    /// order.
    fn bonded_devices(&self) -> Result<Vec<BtDevice>, ReciboError>;
}

/// Enumerates bonded devices from a [`DeviceSource`] into a shared
/// [`DeviceRegistry`].
pub struct DeviceEnumerator {
    source: Box<dyn DeviceSource>,
    registry: Arc<DeviceRegistry>,
}

impl DeviceEnumerator {
    pub fn new(source: impl DeviceSource + 'static, registry: Arc<DeviceRegistry>) -> Self {
        Self {
            source: Box::new(source),
            registry,
        }
    }

    /// Enumerate bonded devices into the registry.
    ///
    /// Clears the registry first, so each call reflects the current bonded
    /// set exactly. Returns the number of devices reported. All failures
    /// are logged and swallowed; on failure the registry is left empty.
    pub fn refresh(&self) -> usize {
        match self.source.radio_enabled() {
            Ok(true) => {}
            Ok(false) => {
                log::warn!("Bluetooth radio not enabled; skipping device enumeration");
                return 0;
            }
            Err(e) => {
                log::error!("Could not query Bluetooth radio state: {e}");
                return 0;
            }
        }

        let devices = match self.source.bonded_devices() {
            Ok(devices) => devices,
            Err(e) => {
                log::error!("Bonded device enumeration failed: {e}");
                return 0;
            }
        };

        self.registry.clear();
        if devices.is_empty() {
            log::info!("No paired devices found");
            return 0;
        }

        let mut reported = 0;
        for device in devices {
            log::debug!("Paired device found: {device}");
            if self.registry.add(device) {
                reported += 1;
            }
        }
        reported
    }
}

/// Bonded-device source backed by the BlueZ system D-Bus service.
pub struct BluezSource {
    conn: Connection,
}

impl BluezSource {
    /// Connect to the system bus.
    pub fn new() -> Result<Self, ReciboError> {
        let conn = Connection::new_system()
            .map_err(|e| ReciboError::Bluetooth(format!("System bus connection failed: {e}")))?;
        Ok(Self { conn })
    }

    fn managed_objects(&self) -> Result<ManagedObjects, ReciboError> {
        use dbus::blocking::stdintf::org_freedesktop_dbus::ObjectManager;
        let proxy = self.conn.with_proxy(BLUEZ_SERVICE, "/", DBUS_TIMEOUT);
        proxy
            .get_managed_objects()
            .map_err(|e| ReciboError::Bluetooth(format!("GetManagedObjects failed: {e}")))
    }
}

impl DeviceSource for BluezSource {
    fn radio_enabled(&self) -> Result<bool, ReciboError> {
        let objects = self.managed_objects()?;
        let mut saw_adapter = false;
        for interfaces in objects.values() {
            if let Some(props) = interfaces.get("org.bluez.Adapter1") {
                saw_adapter = true;
                let powered = props
                    .get("Powered")
                    .and_then(|v| v.0.as_i64())
                    .unwrap_or(0);
                if powered != 0 {
                    return Ok(true);
                }
            }
        }
        if !saw_adapter {
            log::warn!("No Bluetooth adapter present on {BLUEZ_SERVICE}");
        }
        Ok(false)
    }

    fn bonded_devices(&self) -> Result<Vec<BtDevice>, ReciboError> {
        let objects = self.managed_objects()?;
        let mut devices = Vec::new();

        for (path, interfaces) in &objects {
            // Device objects live under /org/bluez/hciN/dev_XX_XX_...
            let path_str = path.to_string();
            if !path_str.starts_with("/org/bluez/hci") || !path_str.contains("/dev_") {
                continue;
            }

            let props = match interfaces.get("org.bluez.Device1") {
                Some(p) => p,
                None => continue,
            };

            let paired = props
                .get("Paired")
                .and_then(|v| v.0.as_i64())
                .unwrap_or(0);
            if paired == 0 {
                continue;
            }

            let address = match props.get("Address").and_then(|v| v.0.as_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };

            let name = props
                .get("Name")
                .or_else(|| props.get("Alias"))
                .and_then(|v| v.0.as_str().map(String::from))
                .unwrap_or_default();

            devices.push(BtDevice::new(name, address));
        }

        Ok(devices)
    }
}
