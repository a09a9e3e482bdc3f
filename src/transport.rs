//! Serial ports: radio output, reader input and reader discovery.

use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

/// Baud rate of the radio module's UART.
pub const RADIO_BAUD_RATE: u32 = 57_600;

/// Baud rate SPORTident stations use in extended protocol mode.
pub const READER_BAUD_RATE: u32 = 38_400;

/// USB identifiers of the SPORTident BSM/BSF stations (Silicon Labs bridge).
pub const SPORTIDENT_VID: u16 = 0x10c4;
pub const SPORTIDENT_PID: u16 = 0x800a;

/// Line settings for a port. Always 8N1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub timeout: Duration,
}

/// Config keys reported when a [`SerialSettings`] value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsFields {
    pub port: &'static str,
    pub baud_rate: &'static str,
}

impl SettingsFields {
    pub const OUTPUT: SettingsFields = SettingsFields {
        port: "output_port",
        baud_rate: "baud_rate",
    };
    pub const READER: SettingsFields = SettingsFields {
        port: "reader_port",
        baud_rate: "reader_baud_rate",
    };
}

impl SerialSettings {
    pub fn new<S: Into<String>>(port: S, baud_rate: u32) -> Result<Self> {
        Self::validated(port, baud_rate, SettingsFields::OUTPUT)
    }

    /// Like [`SerialSettings::new`], naming `fields` in any error.
    pub fn validated<S: Into<String>>(
        port: S,
        baud_rate: u32,
        fields: SettingsFields,
    ) -> Result<Self> {
        let port = port.into();
        if port.trim().is_empty() {
            return Err(BridgeError::invalid_config(
                fields.port,
                "port name must not be empty",
            ));
        }
        if baud_rate == 0 {
            return Err(BridgeError::invalid_config(
                fields.baud_rate,
                "baud rate must be positive",
            ));
        }
        Ok(Self {
            port,
            baud_rate,
            timeout: Duration::from_secs(1),
        })
    }

    pub fn open(&self) -> Result<Box<dyn SerialPort>> {
        let port = serialport::new(&self.port, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(self.timeout)
            .open()
            .map_err(|source| BridgeError::PortOpen {
                port: self.port.clone(),
                source,
            })?;
        info!(port = %self.port, baud = self.baud_rate, "opened serial port (8N1)");
        Ok(port)
    }
}

/// A serial port as seen during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub description: String,
    pub reader_candidate: bool,
}

/// Enumerate serial ports, flagging SPORTident stations.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(BridgeError::Discovery)?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let (description, reader_candidate) = match &port.port_type {
                SerialPortType::UsbPort(usb) => (
                    format!(
                        "USB {:04x}:{:04x} {}",
                        usb.vid,
                        usb.pid,
                        usb.product.as_deref().unwrap_or("")
                    )
                    .trim_end()
                    .to_string(),
                    is_reader(usb.vid, usb.pid),
                ),
                SerialPortType::BluetoothPort => ("Bluetooth".to_string(), false),
                SerialPortType::PciPort => ("PCI".to_string(), false),
                SerialPortType::Unknown => ("unknown".to_string(), false),
            };
            PortInfo {
                name: port.port_name,
                description,
                reader_candidate,
            }
        })
        .collect())
}

/// First port that looks like a card reader.
///
/// Only the USB identity is checked. The port still has to carry the
/// gateway's JSON-lines feed; a station speaking its native protocol yields
/// per-line read failures.
pub fn discover_reader_port() -> Result<String> {
    select_reader(list_ports()?)
}

fn select_reader(ports: Vec<PortInfo>) -> Result<String> {
    for port in ports {
        debug!(port = %port.name, candidate = port.reader_candidate, "inspected port");
        if port.reader_candidate {
            info!(port = %port.name, "found card reader");
            return Ok(port.name);
        }
    }
    Err(BridgeError::NoReaderFound)
}

fn is_reader(vid: u16, pid: u16) -> bool {
    vid == SPORTIDENT_VID && pid == SPORTIDENT_PID
}
