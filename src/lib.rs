//! # ecipot-rs
//!
//! A Rust library for driving an ECi electrochemical potentiostat over its
//! serial line protocol.
//!
//! The device speaks newline-terminated ASCII at 115200-8N1. After a startup
//! handshake it accepts `CELL`, `step` and `ramp` commands, broadcasts status
//! lines (`CELL`, `CMODE`, `IE`) and streams tab-separated sample rows framed
//! by sentinel lines (`INI`, `Start`, `change to`, `Done`).
//!
//! ## Features
//!
//! - **Handshake and session tracking**: cell state, control mode and current
//!   range as reported by the device
//! - **Step and ramp protocols**: sentinel-driven state machines with
//!   configurable wall-clock deadlines
//! - **Segmented acquisition**: one sample set per ramp segment, joined by
//!   their boundary rows
//! - **DataFrame output**: uses `polars` so analysis code can pick up the data
//!   directly
//!
//! ## Examples
//!
//! ### Running a ramp
//!
//! ```rust,no_run
//! use ecipot_rs::{Potentiostat, ProtocolConfig, RampCommand};
//!
//! let mut pot = Potentiostat::connect("/dev/ttyACM0", ProtocolConfig::default())?;
//! pot.cell_on()?;
//!
//! // -0.2 V start, vertices at 0.2 V and -0.2 V, 100 mV/s, 3 sweeps
//! let acquisition = pot.ramp(RampCommand::new(-0.2, 0.2, -0.2, 0.1, 3))?;
//! for (i, segment) in acquisition.segments.iter().enumerate() {
//!     println!("segment {}: {} samples", i, segment.len());
//! }
//!
//! pot.cell_off()?;
//! pot.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Potential steps
//!
//! ```rust,no_run
//! use ecipot_rs::{PotentiostatConnector, ProtocolConfig, StepCommand};
//!
//! // First USB serial port that completes the handshake
//! let mut pot = PotentiostatConnector::connect(None, ProtocolConfig::default())?;
//! pot.step(StepCommand::new(1.0, 0.1).then(2.0, 0.2))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Encoding commands
//!
//! ```rust
//! use ecipot_rs::{Command, StepCommand};
//!
//! let command: Command = StepCommand::new(1.0, 0.1).then(2.0, 0.2).into();
//! assert_eq!(command.encode().into_string(), "step 1 0.1 2 0.2\n");
//! assert_eq!("step 1 0.1 2 0.2".parse::<Command>().unwrap(), command);
//! ```

pub mod command;
pub mod config;
pub mod connector;
pub mod error;
pub mod line_reader;
pub mod potentiostat;
pub mod sample_buffer;
pub mod status;
pub mod transport;

#[cfg(test)]
mod mock_transport;

// Re-export the main types for convenience
pub use command::{Command, CommandParseError, RampCommand, StepCommand, StepPoint};

pub use config::{ParsePolicy, ProtocolConfig, SentinelPolicy};

pub use connector::{ConnectorError, PotentiostatConnector, PotentiostatDevice};

pub use error::PotentiostatError;

pub use potentiostat::{Potentiostat, RampAcquisition};

pub use sample_buffer::{Sample, SampleBuffer, SampleError, SampleSet};

pub use status::{LineKind, SessionState, StatusError, StatusField};

pub use transport::{SerialTransport, Transport, TransportError};
