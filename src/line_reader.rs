use crate::config::ParsePolicy;
use crate::error::Result;
use crate::status::SessionState;
use crate::transport::{decode_line, Transport};

/// Decoded, right-trimmed text lines on top of a [`Transport`].
#[derive(Debug)]
pub struct LineReader<T: Transport> {
    transport: T,
    parse_policy: ParsePolicy,
}

impl<T: Transport> LineReader<T> {
    pub fn new(transport: T, parse_policy: ParsePolicy) -> Self {
        Self {
            transport,
            parse_policy,
        }
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Read one line if bytes are already waiting, routing it through the
    /// status parser. Returns `None` when nothing is buffered.
    pub fn poll_line(&mut self, session: &mut SessionState) -> Result<Option<String>> {
        if self.transport.bytes_available()? == 0 {
            return Ok(None);
        }
        let Some(line) = self.blocking_read_line()? else {
            return Ok(None);
        };

        if let Err(e) = session.observe(&line) {
            match self.parse_policy {
                ParsePolicy::Strict => return Err(e.into()),
                ParsePolicy::Lenient => log::warn!("Ignoring status line: {}", e),
            }
        }
        Ok(Some(line))
    }

    /// Read one line, waiting up to the transport's per-line timeout.
    /// The line is not routed through the status parser.
    pub fn blocking_read_line(&mut self) -> Result<Option<String>> {
        let line = self.transport.read_line()?.map(|raw| decode_line(&raw));
        if let Some(line) = &line {
            log::trace!("<< {:?}", line);
        }
        Ok(line)
    }

    /// Poll up to `limit` times and return the last non-empty line seen.
    pub fn drain_to_latest(
        &mut self,
        session: &mut SessionState,
        limit: usize,
    ) -> Result<Option<String>> {
        let mut latest = None;
        for _ in 0..limit {
            match self.poll_line(session)? {
                Some(line) if !line.is_empty() => latest = Some(line),
                Some(_) => {}
                None => break,
            }
        }
        Ok(latest)
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.transport.write_all(data)?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.transport.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PotentiostatError;
    use crate::mock_transport::ScriptedTransport;

    fn reader(lines: &[&str]) -> LineReader<ScriptedTransport> {
        LineReader::new(ScriptedTransport::new(lines), ParsePolicy::Lenient)
    }

    #[test]
    fn test_poll_line_without_data() {
        let mut reader = reader(&[]);
        let mut session = SessionState::new();
        assert_eq!(reader.poll_line(&mut session).unwrap(), None);
    }

    #[test]
    fn test_poll_line_updates_session() {
        let mut reader = reader(&["CELL 1", "IE 05"]);
        let mut session = SessionState::new();

        assert_eq!(
            reader.poll_line(&mut session).unwrap().as_deref(),
            Some("CELL 1")
        );
        assert_eq!(session.cell(), 1);
        reader.poll_line(&mut session).unwrap();
        assert_eq!(session.current_range(), 5);
    }

    #[test]
    fn test_blocking_read_does_not_touch_session() {
        let mut reader = reader(&["CMODE 3"]);
        assert_eq!(
            reader.blocking_read_line().unwrap().as_deref(),
            Some("CMODE 3")
        );
        assert_eq!(reader.blocking_read_line().unwrap(), None);
    }

    #[test]
    fn test_malformed_status_by_policy() {
        let mut session = SessionState::new();
        let mut lenient = reader(&["CELL ??"]);
        assert_eq!(
            lenient.poll_line(&mut session).unwrap().as_deref(),
            Some("CELL ??")
        );

        let mut strict = LineReader::new(ScriptedTransport::new(["CELL ??"]), ParsePolicy::Strict);
        assert!(matches!(
            strict.poll_line(&mut session),
            Err(PotentiostatError::MalformedStatus(_))
        ));
    }

    #[test]
    fn test_drain_to_latest() {
        let mut reader = reader(&["a", "CELL 1", "", "b", ""]);
        let mut session = SessionState::new();
        assert_eq!(
            reader.drain_to_latest(&mut session, 1000).unwrap().as_deref(),
            Some("b")
        );
        assert_eq!(session.cell(), 1);
        assert_eq!(reader.drain_to_latest(&mut session, 1000).unwrap(), None);
    }

    #[test]
    fn test_drain_to_latest_respects_limit() {
        let mut reader = reader(&["a", "b", "c"]);
        let mut session = SessionState::new();
        assert_eq!(
            reader.drain_to_latest(&mut session, 2).unwrap().as_deref(),
            Some("b")
        );
        assert_eq!(reader.transport_mut().remaining(), 1);
    }

    #[test]
    fn test_use_after_close() {
        let mut reader = reader(&["a"]);
        reader.close().unwrap();
        assert!(matches!(
            reader.blocking_read_line(),
            Err(PotentiostatError::Connection(_))
        ));
    }
}
