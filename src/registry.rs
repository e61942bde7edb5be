//! # Device Registry
//!
//! Thread-safe registry of discovered devices with an observer seam.
//!
//! The registry replaces the global mutable device list of typical
//! platform bindings with an explicit object: created at service start,
//! cleared at service stop (or before a re-enumeration). UI layers own
//! the mapping from [`DeviceListener`] callbacks to their own observable
//! containers; the registry never depends on any toolkit type.

use std::sync::Mutex;

use crate::device::BtDevice;

/// Observer for device discovery.
///
/// Listeners are notified once per discovered device, one device at a
/// time, on whatever thread runs the enumeration.
pub trait DeviceListener: Send {
    fn device_added(&self, device: &BtDevice);
}

// Plain closures work as listeners.
impl<F> DeviceListener for F
where
    F: Fn(&BtDevice) + Send,
{
    fn device_added(&self, device: &BtDevice) {
        self(device)
    }
}

/// Registry of devices reported by the enumerator.
///
/// Appending a device with an address already present is a no-op: one
/// enumeration session reports the bonded set exactly, without
/// duplicates.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Mutex<Vec<BtDevice>>,
    listeners: Mutex<Vec<Box<dyn DeviceListener>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for subsequently added devices.
    pub fn subscribe(&self, listener: impl DeviceListener + 'static) {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Add a device and notify listeners.
    ///
    /// Returns `false` if a device with the same address was already
    /// present (listeners are not notified in that case).
    pub fn add(&self, device: BtDevice) -> bool {
        {
            let mut devices = self.devices.lock().unwrap();
            if devices.iter().any(|d| d.address == device.address) {
                return false;
            }
            devices.push(device.clone());
        }
        // Notify outside the device lock so listeners may read the registry.
        for listener in self.listeners.lock().unwrap().iter() {
            listener.device_added(&device);
        }
        true
    }

    /// Snapshot of the devices reported so far.
    pub fn devices(&self) -> Vec<BtDevice> {
        self.devices.lock().unwrap().clone()
    }

    /// Remove all devices (listeners stay registered).
    pub fn clear(&self) {
        self.devices.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.devices.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_add_and_snapshot() {
        let registry = DeviceRegistry::new();
        assert!(registry.add(BtDevice::new("Printer", "AA:BB:CC:DD:EE:FF")));
        assert!(registry.add(BtDevice::new("Scale", "11:22:33:44:55:66")));

        let devices = registry.devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "Printer");
        assert_eq!(devices[1].address, "11:22:33:44:55:66");
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let registry = DeviceRegistry::new();
        assert!(registry.add(BtDevice::new("Printer", "AA:BB:CC:DD:EE:FF")));
        assert!(!registry.add(BtDevice::new("Renamed", "AA:BB:CC:DD:EE:FF")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.devices()[0].name, "Printer");
    }

    #[test]
    fn test_listener_notified_once_per_device() {
        let registry = DeviceRegistry::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        registry.subscribe(move |_: &BtDevice| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.add(BtDevice::new("a", "AA:BB:CC:DD:EE:01"));
        registry.add(BtDevice::new("b", "AA:BB:CC:DD:EE:02"));
        registry.add(BtDevice::new("dup", "AA:BB:CC:DD:EE:01"));

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear_keeps_listeners() {
        let registry = DeviceRegistry::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        registry.subscribe(move |_: &BtDevice| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.add(BtDevice::new("a", "AA:BB:CC:DD:EE:01"));
        registry.clear();
        assert!(registry.is_empty());

        // Same address can be reported again after a clear.
        registry.add(BtDevice::new("a", "AA:BB:CC:DD:EE:01"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
