//! # Bluetooth Devices
//!
//! The [`BtDevice`] value type and hardware-address validation.

use std::fmt;

/// A Bluetooth device known to the host radio.
///
/// Immutable snapshot of a bonded device: display name plus hardware
/// address. The address is the unique identifier; two devices with the
/// same address are the same device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtDevice {
    /// Human-readable device name (may be empty if the device never
    /// advertised one)
    pub name: String,

    /// Hardware address, `XX:XX:XX:XX:XX:XX`
    pub address: String,
}

impl BtDevice {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for BtDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} ({})", self.name, self.address)
        }
    }
}

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mac_addresses() {
        assert!(is_valid_mac("00:11:22:33:44:55"));
        assert!(is_valid_mac("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(is_valid_mac("00:00:00:00:00:00"));
    }

    #[test]
    fn test_invalid_mac_addresses() {
        assert!(!is_valid_mac("00:11:22:33:44")); // too short
        assert!(!is_valid_mac("00:11:22:33:44:55:66")); // too long
        assert!(!is_valid_mac("00-11-22-33-44-55")); // wrong separator
        assert!(!is_valid_mac("GG:HH:II:JJ:KK:LL")); // invalid hex
        assert!(!is_valid_mac("")); // empty
        assert!(!is_valid_mac("not-a-mac")); // garbage
    }

    #[test]
    fn test_display_with_and_without_name() {
        let named = BtDevice::new("TSP650II", "AA:BB:CC:DD:EE:FF");
        assert_eq!(named.to_string(), "TSP650II (AA:BB:CC:DD:EE:FF)");

        let anonymous = BtDevice::new("", "AA:BB:CC:DD:EE:FF");
        assert_eq!(anonymous.to_string(), "AA:BB:CC:DD:EE:FF");
    }
}
