use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

/// Baud rate of the potentiostat's USB serial bridge.
pub const BAUD_RATE: u32 = 115_200;

/// How long a single `read_line` may wait for a complete line by default.
pub const DEFAULT_LINE_TIMEOUT: Duration = Duration::from_secs(1);

// Short port-level timeout; the per-line wait is enforced on top of it.
const PORT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport used after it was closed")]
    Closed,
}

/// A line-oriented, bidirectional byte stream to the device.
///
/// `read_line` returns the raw bytes of one line including its terminator, or
/// `None` if no complete line arrived within the transport's per-line wait.
pub trait Transport {
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize, TransportError>;

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;
}

/// Splits a byte stream into `\n`-terminated lines. A partial line stays
/// buffered until the rest of it arrives.
#[derive(Debug, Default)]
struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
        }
    }

    /// Bytes received but not yet handed out as a line.
    fn buffered(&self) -> usize {
        self.pending.len()
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    /// Split off the first complete line, if any.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let rest = self.pending.split_off(end + 1);
        Some(std::mem::replace(&mut self.pending, rest))
    }

    /// Read from `source` until a complete line is framed or `line_timeout`
    /// passes. Read timeouts of the source count as "no data yet".
    fn read_line<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        line_timeout: Duration,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(line) = self.take_line() {
            return Ok(Some(line));
        }

        let start = Instant::now();
        let mut chunk = [0u8; 64];

        loop {
            let read = match source.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => 0,
                Err(e) => return Err(e.into()),
            };

            if read > 0 {
                self.pending.extend_from_slice(&chunk[..read]);
                if let Some(line) = self.take_line() {
                    return Ok(Some(line));
                }
            }

            // Partial bytes stay in `pending` for the next call.
            if start.elapsed() >= line_timeout {
                return Ok(None);
            }
        }
    }
}

/// [`Transport`] over a real serial port, configured 115200-8N1.
#[derive(Debug)]
pub struct SerialTransport {
    serial: Option<Box<dyn SerialPort>>,
    line_timeout: Duration,
    framer: LineFramer,
}

impl SerialTransport {
    /// Open `port` at 115200 baud, 8 data bits, no parity, one stop bit.
    pub fn open(port: &str, line_timeout: Duration) -> Result<Self, TransportError> {
        let serial = serialport::new(port, BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(PORT_POLL_TIMEOUT)
            .open()?;
        log::debug!("Opened {} at {} baud", port, BAUD_RATE);

        Ok(Self::from_port(serial, line_timeout))
    }

    /// Wrap an already opened port.
    pub fn from_port(serial: Box<dyn SerialPort>, line_timeout: Duration) -> Self {
        Self {
            serial: Some(serial),
            line_timeout,
            framer: LineFramer::with_capacity(128),
        }
    }

    pub fn line_timeout(&self) -> Duration {
        self.line_timeout
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, TransportError> {
        self.serial.as_mut().ok_or(TransportError::Closed)
    }
}

impl Transport for SerialTransport {
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let serial = self.serial.as_mut().ok_or(TransportError::Closed)?;
        self.framer.read_line(serial, self.line_timeout)
    }

    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        let waiting = self.port()?.bytes_to_read()? as usize;
        Ok(self.framer.buffered() + waiting)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let port = self.port()?;
        port.write_all(data)?;
        port.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        match self.serial.take() {
            Some(serial) => {
                log::debug!("Closing serial port {:?}", serial.name());
                drop(serial);
                self.framer.clear();
                Ok(())
            }
            None => Err(TransportError::Closed),
        }
    }
}

/// Decode raw line bytes and strip trailing whitespace (`\r\n` included).
pub fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim_end().to_string()
}
