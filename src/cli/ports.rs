//! Serial port listing (`punchrelay ports`).

use anyhow::{Context, Result};
use punchrelay::list_ports;

pub fn handle() -> Result<()> {
    let ports = list_ports().context("failed to list serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }
    for port in ports {
        let marker = if port.reader_candidate { "*" } else { " " };
        println!("{marker} {:<20} {}", port.name, port.description);
    }
    Ok(())
}
