//! Scripted in-memory transport for unit tests.

use crate::transport::{Transport, TransportError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Replays scripted lines and records everything written to it.
///
/// Once the script runs dry every `read_line` behaves like a per-line timeout.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    lines: VecDeque<Vec<u8>>,
    written: Rc<RefCell<Vec<u8>>>,
    closed: bool,
}

impl ScriptedTransport {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| format!("{}\r\n", l.as_ref()).into_bytes())
                .collect(),
            ..Self::default()
        }
    }

    /// Shared handle to the written bytes, usable after the transport moved.
    pub fn written(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.written)
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl Transport for ScriptedTransport {
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(self.lines.pop_front())
    }

    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(self.lines.front().map_or(0, Vec::len))
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.written.borrow_mut().extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.closed = true;
        Ok(())
    }
}
