//! # Recibo CLI
//!
//! Command-line interface for Bluetooth receipt printing.
//!
//! ## Usage
//!
//! ```bash
//! # List devices paired with the host radio
//! recibo devices
//!
//! # Print a message (address from `recibo devices`)
//! recibo print "HELLO" --address 00:11:62:AA:BB:CC
//!
//! # Give a slow printer a full second before closing the link
//! recibo print "HELLO" --address 00:11:62:AA:BB:CC --delay-ms 1000
//!
//! # Emphasized text
//! recibo print "TOTAL 12.50" --address 00:11:62:AA:BB:CC --style bold
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use recibo::{
    PrinterConfig, PrinterService, ReciboError,
    enumerator::{BluezSource, DeviceEnumerator},
    protocol::TextStyle,
};

/// Recibo - Bluetooth receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List Bluetooth devices paired with this host
    Devices,

    /// Print a message to a paired printer
    Print {
        /// Text to print
        message: String,

        /// Printer hardware address (XX:XX:XX:XX:XX:XX)
        #[arg(long)]
        address: String,

        /// Pause after writing before the link is closed, in milliseconds
        #[arg(long, default_value_t = PrinterConfig::GENERIC_SPP.settle_delay_ms)]
        delay_ms: u64,

        /// Text style
        #[arg(long, value_enum, default_value_t = StyleArg::Normal)]
        style: StyleArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StyleArg {
    Normal,
    Bold,
    BoldMedium,
    BoldLarge,
}

impl From<StyleArg> for TextStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Normal => TextStyle::Normal,
            StyleArg::Bold => TextStyle::Bold,
            StyleArg::BoldMedium => TextStyle::BoldMedium,
            StyleArg::BoldLarge => TextStyle::BoldLarge,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ReciboError> {
    let cli = Cli::parse();
    let service = PrinterService::new(PrinterConfig::GENERIC_SPP);

    match cli.command {
        Commands::Devices => {
            let enumerator = DeviceEnumerator::new(BluezSource::new()?, service.registry());
            let count = enumerator.refresh();

            if count == 0 {
                println!("No paired devices found.");
                println!("Pair the printer first (bluetoothctl: scan on / pair <ADDR>).");
                return Ok(());
            }

            println!("Paired devices:");
            for device in service.device_list() {
                println!("  {}", device);
            }
        }

        Commands::Print {
            message,
            address,
            delay_ms,
            style,
        } => {
            let job = service
                .print_styled(
                    &message,
                    &address,
                    style.into(),
                    Duration::from_millis(delay_ms),
                )
                .ok_or_else(|| {
                    ReciboError::Transport("Nothing to print: empty message or address".to_string())
                })?;

            println!("Printing to {}...", address);
            job.wait()?;
            println!("Printed successfully!");
        }
    }

    Ok(())
}
