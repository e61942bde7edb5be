//! # Service Tests
//!
//! End-to-end tests for the print dispatcher and device enumeration,
//! driven through the transport seam with a mock that records every
//! byte and fault-injects write failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;

use recibo::device::BtDevice;
use recibo::enumerator::{DeviceEnumerator, DeviceSource};
use recibo::error::ReciboError;
use recibo::printer::PrinterConfig;
use recibo::protocol::TextStyle;
use recibo::registry::DeviceRegistry;
use recibo::service::PrinterService;
use recibo::transport::{Connect, Transport};

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

#[derive(Default)]
struct MockState {
    written: Vec<u8>,
    flushes: usize,
    closed: bool,
    fail_write: bool,
}

struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Transport for MockTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), ReciboError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_write {
            return Err(ReciboError::Transport("injected write failure".to_string()));
        }
        state.written.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReciboError> {
        self.state.lock().unwrap().flushes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ReciboError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

struct MockConnector {
    state: Arc<Mutex<MockState>>,
    connects: Arc<AtomicUsize>,
}

impl MockConnector {
    fn new(fail_write: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                fail_write,
                ..Default::default()
            })),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn connect_attempts(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connect for MockConnector {
    fn connect(&self, _address: &str) -> Result<Box<dyn Transport>, ReciboError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockTransport {
            state: self.state.clone(),
        }))
    }
}

fn service_with(connector: Arc<MockConnector>) -> PrinterService {
    PrinterService::with_connector(
        PrinterConfig::GENERIC_SPP,
        connector,
        Arc::new(DeviceRegistry::new()),
    )
}

// ============================================================================
// PRINT DISPATCH
// ============================================================================

#[test]
fn hello_produces_exact_wire_bytes() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector.clone());

    let job = service
        .print_with_delay("HELLO", "AA:BB:CC:DD:EE:FF", Duration::from_millis(0))
        .expect("job should be dispatched");
    job.wait().unwrap();

    let state = connector.state.lock().unwrap();
    // prefix(3) ++ utf8("HELLO") ++ suffix(2)
    assert_eq!(
        state.written,
        vec![0x1B, 0x21, 0x00, 0x48, 0x45, 0x4C, 0x4C, 0x4F, 0x0A, 0x0A]
    );
    assert_eq!(state.flushes, 1);
    assert!(state.closed);
}

#[test]
fn utf8_message_is_sent_verbatim() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector.clone());

    let job = service
        .print_with_delay("café ¥100", "AA:BB:CC:DD:EE:FF", Duration::from_millis(0))
        .unwrap();
    job.wait().unwrap();

    let state = connector.state.lock().unwrap();
    let mut expected = vec![0x1B, 0x21, 0x00];
    expected.extend_from_slice("café ¥100".as_bytes());
    expected.extend_from_slice(&[0x0A, 0x0A]);
    assert_eq!(state.written, expected);
}

#[test]
fn styled_print_uses_style_prefix() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector.clone());

    let job = service
        .print_styled(
            "BOLD",
            "AA:BB:CC:DD:EE:FF",
            TextStyle::Bold,
            Duration::from_millis(0),
        )
        .unwrap();
    job.wait().unwrap();

    let state = connector.state.lock().unwrap();
    assert_eq!(&state.written[..3], &[0x1B, 0x21, 0x08]);
}

#[test]
fn empty_message_makes_no_connection_attempt() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector.clone());

    assert!(service.print("", "AA:BB:CC:DD:EE:FF").is_none());

    assert_eq!(connector.connect_attempts(), 0);
    assert!(connector.state.lock().unwrap().written.is_empty());
}

#[test]
fn empty_address_makes_no_connection_attempt() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector.clone());

    assert!(service.print("HELLO", "").is_none());

    assert_eq!(connector.connect_attempts(), 0);
}

#[test]
fn transport_is_closed_when_write_fails() {
    let connector = Arc::new(MockConnector::new(true));
    let service = service_with(connector.clone());

    let job = service
        .print_with_delay("HELLO", "AA:BB:CC:DD:EE:FF", Duration::from_millis(0))
        .unwrap();

    // The failure surfaces through the handle...
    assert!(job.wait().is_err());

    // ...and the transport was still released.
    let state = connector.state.lock().unwrap();
    assert!(state.closed);
    assert!(state.written.is_empty());
}

#[test]
fn caller_is_not_blocked_by_settle_delay() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector.clone());

    let started = std::time::Instant::now();
    let job = service
        .print_with_delay("HELLO", "AA:BB:CC:DD:EE:FF", Duration::from_millis(300))
        .unwrap();

    // Dispatch returns well before the worker's settle delay elapses.
    assert!(started.elapsed() < Duration::from_millis(100));
    assert!(!job.is_finished());

    job.wait().unwrap();
    assert!(connector.state.lock().unwrap().closed);
}

#[test]
fn concurrent_prints_each_get_their_own_transport() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector.clone());

    let a = service
        .print_with_delay("ONE", "AA:BB:CC:DD:EE:01", Duration::from_millis(10))
        .unwrap();
    let b = service
        .print_with_delay("TWO", "AA:BB:CC:DD:EE:02", Duration::from_millis(10))
        .unwrap();

    a.wait().unwrap();
    b.wait().unwrap();

    assert_eq!(connector.connect_attempts(), 2);
}

// ============================================================================
// DEVICE ENUMERATION
// ============================================================================

struct FakeSource {
    enabled: bool,
    devices: Vec<BtDevice>,
}

impl DeviceSource for FakeSource {
    fn radio_enabled(&self) -> Result<bool, ReciboError> {
        Ok(self.enabled)
    }

    fn bonded_devices(&self) -> Result<Vec<BtDevice>, ReciboError> {
        Ok(self.devices.clone())
    }
}

#[test]
fn enumeration_feeds_the_service_device_list() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector);

    let enumerator = DeviceEnumerator::new(
        FakeSource {
            enabled: true,
            devices: vec![
                BtDevice::new("Printer", "AA:BB:CC:DD:EE:FF"),
                BtDevice::new("Scale", "11:22:33:44:55:66"),
            ],
        },
        service.registry(),
    );

    assert_eq!(enumerator.refresh(), 2);

    let mut addresses: Vec<String> = service
        .device_list()
        .into_iter()
        .map(|d| d.address)
        .collect();
    addresses.sort();
    assert_eq!(
        addresses,
        vec!["11:22:33:44:55:66".to_string(), "AA:BB:CC:DD:EE:FF".to_string()]
    );
}

#[test]
fn disabled_radio_leaves_device_list_empty() {
    let connector = Arc::new(MockConnector::new(false));
    let service = service_with(connector);

    let enumerator = DeviceEnumerator::new(
        FakeSource {
            enabled: false,
            devices: vec![BtDevice::new("Printer", "AA:BB:CC:DD:EE:FF")],
        },
        service.registry(),
    );

    assert_eq!(enumerator.refresh(), 0);
    assert!(service.device_list().is_empty());
}

#[test]
fn listeners_see_each_device_once() {
    let registry = Arc::new(DeviceRegistry::new());
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    registry.subscribe(move |device: &BtDevice| {
        sink.lock().unwrap().push(device.address.clone());
    });

    let enumerator = DeviceEnumerator::new(
        FakeSource {
            enabled: true,
            devices: vec![
                BtDevice::new("a", "AA:BB:CC:DD:EE:01"),
                BtDevice::new("b", "AA:BB:CC:DD:EE:02"),
            ],
        },
        registry,
    );
    enumerator.refresh();

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["AA:BB:CC:DD:EE:01", "AA:BB:CC:DD:EE:02"]);
}
