//! # Printer Configuration
//!
//! This module defines link profiles for Bluetooth receipt printers.
//!
//! ## Usage
//!
//! ```
//! use recibo::printer::PrinterConfig;
//!
//! let config = PrinterConfig::GENERIC_SPP;
//! println!("RFCOMM channel: {}", config.rfcomm_channel);
//! ```

use std::time::Duration;

/// # Printer Configuration
///
/// Defines how the RFCOMM link to a printer is driven.
///
/// ## Link Tuning
///
/// - **rfcomm_channel**: RFCOMM channel for the Serial Port Profile
/// - **chunk_size** / **chunk_delay_ms**: large writes are split into
///   chunks with a small pause so the Bluetooth buffer is not overrun
/// - **settle_delay_ms**: default pause after flushing a print job, giving
///   slow printer hardware time to consume the buffer before the link is
///   torn down
#[derive(Debug, Clone, Copy)]
pub struct PrinterConfig {
    /// Profile name
    pub name: &'static str,

    /// RFCOMM channel (1 is standard for SPP)
    pub rfcomm_channel: u8,

    /// Maximum bytes per write chunk
    pub chunk_size: usize,

    /// Delay between chunks (milliseconds)
    pub chunk_delay_ms: u64,

    /// Default post-write settle delay (milliseconds)
    pub settle_delay_ms: u64,
}

impl PrinterConfig {
    /// # Generic Serial Port Profile Printer
    ///
    /// Works with the common run of Bluetooth receipt printers that expose
    /// the well-known SPP service UUID
    /// (`00001101-0000-1000-8000-00805F9B34FB`) on RFCOMM channel 1.
    ///
    /// | Property | Value |
    /// |----------|-------|
    /// | RFCOMM channel | 1 |
    /// | Chunk size | 4096 bytes |
    /// | Chunk delay | 2 ms |
    /// | Settle delay | 500 ms |
    pub const GENERIC_SPP: Self = Self {
        name: "Generic SPP",
        rfcomm_channel: 1,
        chunk_size: 4096,
        chunk_delay_ms: 2,
        settle_delay_ms: 500,
    };

    /// Delay between write chunks.
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    /// Default post-write settle delay.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::GENERIC_SPP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_spp_profile() {
        let config = PrinterConfig::GENERIC_SPP;
        assert_eq!(config.rfcomm_channel, 1);
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.chunk_delay(), Duration::from_millis(2));
    }
}
