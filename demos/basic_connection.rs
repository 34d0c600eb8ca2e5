// Basic device discovery and connection example
//
// Lists USB serial ports, connects to a potentiostat and toggles the cell.

use ecipot_rs::{PotentiostatConnector, ProtocolConfig};
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Potentiostat Discovery Example");
    println!("==============================\n");

    println!("1. Discovering USB serial ports...");
    let devices = PotentiostatConnector::get_available_devices()?;

    if devices.is_empty() {
        println!("No USB serial ports found. Please connect a potentiostat and try again.");
        return Ok(());
    }

    println!("Found {} port(s):", devices.len());
    for (i, device) in devices.iter().enumerate() {
        println!("  {}. {} at {}", i + 1, device.name, device.port);
    }
    println!();

    println!("2. Connecting to the first port that answers...");
    let mut pot = PotentiostatConnector::connect(None, ProtocolConfig::default())?;
    let session = pot.session();
    println!(
        "Connected: cell={} control mode={} current range={}",
        session.cell(),
        session.control_mode(),
        session.current_range()
    );

    println!("\n3. Switching the cell on and off...");
    pot.cell_on()?;
    thread::sleep(Duration::from_millis(500));
    if let Some(line) = pot.drain_to_latest()? {
        println!("Latest device line: {}", line);
    }
    println!("Cell enabled: {}", pot.session().cell_enabled());

    pot.cell_off()?;
    thread::sleep(Duration::from_millis(500));
    pot.drain_to_latest()?;
    println!("Cell enabled: {}", pot.session().cell_enabled());

    pot.close()?;
    println!("\n4. Connection test completed successfully!");

    Ok(())
}
