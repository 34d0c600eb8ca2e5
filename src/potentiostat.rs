use crate::command::{Command, RampCommand, StepCommand};
use crate::config::{ParsePolicy, ProtocolConfig, SentinelPolicy};
use crate::error::{PotentiostatError, Result};
use crate::line_reader::LineReader;
use crate::sample_buffer::{
    SampleBuffer, SampleSet, CHANNEL_A_COLUMN_NAME, CHANNEL_B_COLUMN_NAME, TIME_COLUMN_NAME,
};
use crate::status::{LineKind, SessionState};
use crate::transport::{SerialTransport, Transport};
use polars::prelude::*;
use std::time::{Duration, Instant};

pub const SEGMENT_COLUMN_NAME: &str = "segment";

/// Lines discarded after `Ini Done` before the device accepts commands.
const PREAMBLE_LINES: usize = 2;

/// Upper bound on the segment slots reserved before any data arrives.
const MAX_SEGMENT_RESERVATION: usize = 64;

/// Sentinels that end a sampling phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Start,
    ChangeTo,
    Done,
}

/// Everything a `ramp` command streamed back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RampAcquisition {
    /// Rows sent between the acknowledgment and `Start`.
    pub initialization: SampleSet,
    /// One set per voltage segment, in order.
    pub segments: Vec<SampleSet>,
    /// The device reported `Done`.
    pub completed: bool,
    /// A sentinel was missed under [`SentinelPolicy::BestEffort`] or rows were
    /// dropped; the data is usable but incomplete.
    pub truncated: bool,
}

impl RampAcquisition {
    pub fn total_samples(&self) -> usize {
        self.segments.iter().map(SampleSet::len).sum()
    }

    /// Lazy view of [`Self::to_dataframe`] for query pipelines.
    pub fn to_lazy_frame(&self) -> std::result::Result<LazyFrame, PolarsError> {
        Ok(self.to_dataframe()?.lazy())
    }

    /// All segments stacked into one frame with a `segment` index column.
    pub fn to_dataframe(&self) -> std::result::Result<DataFrame, PolarsError> {
        let rows = self.total_samples();
        let mut segment = Vec::with_capacity(rows);
        let mut time = Vec::with_capacity(rows);
        let mut channel_a = Vec::with_capacity(rows);
        let mut channel_b = Vec::with_capacity(rows);

        for (index, set) in self.segments.iter().enumerate() {
            for sample in &set.samples {
                segment.push(index as u32);
                time.push(sample.time);
                channel_a.push(sample.channel_a);
                channel_b.push(sample.channel_b);
            }
        }

        DataFrame::new(vec![
            Series::new(SEGMENT_COLUMN_NAME.into(), segment).into(),
            Series::new(TIME_COLUMN_NAME.into(), time).into(),
            Series::new(CHANNEL_A_COLUMN_NAME.into(), channel_a).into(),
            Series::new(CHANNEL_B_COLUMN_NAME.into(), channel_b).into(),
        ])
    }
}

/// A connected, initialized potentiostat.
///
/// The controller owns its transport; dropping it releases the port on
/// every path, and [`Potentiostat::close`] consumes it.
#[derive(Debug)]
pub struct Potentiostat<T: Transport = SerialTransport> {
    reader: LineReader<T>,
    session: SessionState,
    config: ProtocolConfig,
}

impl Potentiostat<SerialTransport> {
    /// Open `port` at 115200-8N1 and run the startup handshake.
    pub fn connect(port: &str, config: ProtocolConfig) -> Result<Self> {
        log::debug!("Connecting to potentiostat on port {}", port);
        #[cfg(feature = "cpu-profiling")]
        let _ = tracy_client::Client::start();
        let transport = SerialTransport::open(port, config.line_timeout)?;
        Self::handshake(transport, config)
    }
}

impl<T: Transport> Potentiostat<T> {
    /// Run the startup handshake over an already open transport.
    ///
    /// Waits for `Ini start`, then feeds the status report through the
    /// session until `Ini Done`, then skips the device preamble.
    #[tracing::instrument(skip_all)]
    pub fn handshake(transport: T, config: ProtocolConfig) -> Result<Self> {
        let mut pot = Self {
            reader: LineReader::new(transport, config.parse_policy),
            session: SessionState::new(),
            config,
        };

        let limit = pot.config.handshake_start;
        pot.await_sentinel("Ini start", limit, false, |kind| {
            matches!(kind, LineKind::IniStart)
        })?;

        let limit = pot.config.handshake_done;
        pot.await_sentinel("Ini Done", limit, true, |kind| {
            matches!(kind, LineKind::IniDone)
        })?;
        pot.session.mark_initialized();

        for _ in 0..PREAMBLE_LINES {
            if let Some(line) = pot.reader.blocking_read_line()? {
                log::trace!("Skipping preamble {:?}", line);
            }
        }

        log::debug!(
            "Potentiostat ready: cell={} cmode={} ie={}",
            pot.session.cell(),
            pot.session.control_mode(),
            pot.session.current_range()
        );
        Ok(pot)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Release the port.
    pub fn close(mut self) -> Result<()> {
        log::debug!("Closing potentiostat");
        self.reader.close()
    }

    /// Non-blocking read of one line, applying any status it carries.
    pub fn poll_line(&mut self) -> Result<Option<String>> {
        self.reader.poll_line(&mut self.session)
    }

    /// Flush buffered output and return the newest non-empty line.
    pub fn drain_to_latest(&mut self) -> Result<Option<String>> {
        let limit = self.config.drain_limit;
        self.reader.drain_to_latest(&mut self.session, limit)
    }

    fn send(&mut self, command: &Command) -> Result<()> {
        let encoded = command.encode();
        log::debug!(">> {:?}", encoded);
        self.reader.write_all(encoded.as_bytes())
    }

    /// Switch the cell on or off. The device does not acknowledge this; the
    /// new state shows up in a later `CELL` status line.
    pub fn set_cell(&mut self, on: bool) -> Result<()> {
        self.send(&Command::Cell(on))
    }

    pub fn cell_on(&mut self) -> Result<()> {
        self.set_cell(true)
    }

    pub fn cell_off(&mut self) -> Result<()> {
        self.set_cell(false)
    }

    /// Send a potential step sequence and wait for the device to acknowledge.
    ///
    /// Returns `false` when no acknowledgment arrived and the sentinel policy
    /// is [`SentinelPolicy::BestEffort`].
    #[tracing::instrument(skip(self))]
    pub fn step(&mut self, step: StepCommand) -> Result<bool> {
        self.send(&Command::Step(step))?;
        let limit = self.config.step_ack;
        self.await_sentinel("INI", limit, false, |kind| matches!(kind, LineKind::Ack))
    }

    /// Run a cyclic ramp and collect its data, one sample set per segment.
    ///
    /// The acquisition runs `segments + 2` segments unless the device
    /// reports `Done` earlier. Each segment starts with the last row of the
    /// previous one so consecutive segments join up.
    #[tracing::instrument(skip(self))]
    pub fn ramp(&mut self, ramp: RampCommand) -> Result<RampAcquisition> {
        #[cfg(feature = "cpu-profiling")]
        let _zone = tracy_client::span!("ramp");

        self.send(&Command::Ramp(ramp))?;

        let limit = self.config.ramp_ack;
        let acknowledged =
            self.await_sentinel("INI", limit, false, |kind| matches!(kind, LineKind::Ack))?;
        let mut truncated = !acknowledged;

        let mut initialization = self.new_buffer();
        let limit = self.config.pre_sampling;
        let started = self.collect_until(&mut initialization, "Start", limit, |kind| {
            matches!(kind, LineKind::Start).then_some(Boundary::Start)
        })?;
        truncated |= started.is_none();
        log::debug!("Initialization rows: {}", initialization.len());

        let mut handoff = initialization.last_raw_line().map(str::to_owned);
        let initialization = initialization.finalize();

        let expected = ramp.expected_segments();
        // the device may report Done long before `expected`
        let mut segments = Vec::with_capacity(expected.min(MAX_SEGMENT_RESERVATION));
        let mut completed = false;

        for index in 0..expected {
            let _span = tracing::debug_span!("segment", index).entered();

            let mut buffer = self.new_buffer();
            if let Some(seed) = handoff.as_deref() {
                self.ingest(&mut buffer, seed)?;
            }

            let limit = self.config.segment;
            let end = self.collect_until(&mut buffer, "change to or Done", limit, |kind| {
                match kind {
                    LineKind::ChangeTo => Some(Boundary::ChangeTo),
                    LineKind::Done => Some(Boundary::Done),
                    _ => None,
                }
            })?;

            handoff = buffer.last_raw_line().map(str::to_owned);
            log::debug!("Segment {} ended with {} rows", index, buffer.len());
            segments.push(buffer.finalize());

            match end {
                Some(Boundary::Done) => {
                    completed = true;
                    break;
                }
                Some(_) => {}
                None => {
                    truncated = true;
                    break;
                }
            }
        }

        truncated |= initialization.is_lossy() || segments.iter().any(SampleSet::is_lossy);
        if truncated {
            log::warn!("Ramp acquisition is incomplete");
        }

        Ok(RampAcquisition {
            initialization,
            segments,
            completed,
            truncated,
        })
    }

    fn new_buffer(&self) -> SampleBuffer {
        SampleBuffer::with_capacity(self.config.buffer_capacity)
    }

    /// Append one line, dropping it instead of failing under the lenient
    /// parse policy.
    fn ingest(&self, buffer: &mut SampleBuffer, line: &str) -> Result<()> {
        if let Err(e) = buffer.append(line) {
            match self.config.parse_policy {
                ParsePolicy::Strict => return Err(e.into()),
                ParsePolicy::Lenient => {
                    log::warn!("Dropping data row: {}", e);
                    buffer.note_skipped(&e);
                }
            }
        }
        Ok(())
    }

    /// Called when a deadline ran out. `Ok(())` means carry on.
    fn sentinel_missed(&self, waiting_for: &'static str, elapsed: Duration) -> Result<()> {
        match self.config.sentinel_policy {
            SentinelPolicy::Strict => Err(PotentiostatError::Timeout {
                waiting_for,
                elapsed,
            }),
            SentinelPolicy::BestEffort => {
                log::warn!(
                    "No {:?} line after {:?}, continuing anyway",
                    waiting_for,
                    elapsed
                );
                Ok(())
            }
        }
    }

    /// Blocking-read lines until `is_match` accepts one or `limit` runs out.
    /// Other lines are discarded, after a status update if `route_status`.
    fn await_sentinel(
        &mut self,
        waiting_for: &'static str,
        limit: Duration,
        route_status: bool,
        is_match: impl Fn(&LineKind<'_>) -> bool,
    ) -> Result<bool> {
        let start = Instant::now();
        loop {
            let elapsed = start.elapsed();
            if elapsed >= limit {
                self.sentinel_missed(waiting_for, elapsed)?;
                return Ok(false);
            }

            let Some(line) = self.reader.blocking_read_line()? else {
                continue;
            };
            let kind = LineKind::classify(&line);

            if route_status {
                if let Err(e) = self.session.apply(&kind) {
                    match self.config.parse_policy {
                        ParsePolicy::Strict => return Err(e.into()),
                        ParsePolicy::Lenient => log::warn!("Ignoring status line: {}", e),
                    }
                }
            }
            if is_match(&kind) {
                return Ok(true);
            }
        }
    }

    /// Blocking-read lines into `buffer` until `boundary` recognizes one.
    /// The boundary line itself is not appended. `None` means the deadline
    /// ran out under the best-effort policy.
    fn collect_until(
        &mut self,
        buffer: &mut SampleBuffer,
        waiting_for: &'static str,
        limit: Duration,
        boundary: impl Fn(&LineKind<'_>) -> Option<Boundary>,
    ) -> Result<Option<Boundary>> {
        let start = Instant::now();
        loop {
            let elapsed = start.elapsed();
            if elapsed >= limit {
                self.sentinel_missed(waiting_for, elapsed)?;
                return Ok(None);
            }

            let Some(line) = self.reader.blocking_read_line()? else {
                continue;
            };
            if let Some(end) = boundary(&LineKind::classify(&line)) {
                log::debug!("{:?}", line);
                return Ok(Some(end));
            }
            self.ingest(buffer, &line)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_transport::ScriptedTransport;
    use crate::sample_buffer::Sample;
    use std::cell::RefCell;
    use std::rc::Rc;

    const HANDSHAKE: [&str; 8] = [
        "boot noise",
        "Ini start",
        "CELL 0",
        "CMODE 1",
        "IE004",
        "Ini Done",
        "preamble 1",
        "preamble 2",
    ];

    fn test_config() -> ProtocolConfig {
        ProtocolConfig::default().with_all_timeouts(Duration::from_millis(50))
    }

    fn connect_with(
        replies: &[&str],
        config: ProtocolConfig,
    ) -> (Potentiostat<ScriptedTransport>, Rc<RefCell<Vec<u8>>>) {
        let script: Vec<&str> = HANDSHAKE.iter().chain(replies).copied().collect();
        let transport = ScriptedTransport::new(script);
        let written = transport.written();
        let pot = Potentiostat::handshake(transport, config).unwrap();
        (pot, written)
    }

    fn connect(replies: &[&str]) -> (Potentiostat<ScriptedTransport>, Rc<RefCell<Vec<u8>>>) {
        connect_with(replies, test_config())
    }

    fn written_text(written: &Rc<RefCell<Vec<u8>>>) -> String {
        String::from_utf8(written.borrow().clone()).unwrap()
    }

    fn data(t: f64) -> String {
        format!("\t{t}\t{}\t{}", t * 2.0, t * 3.0)
    }

    #[test]
    fn test_handshake_updates_session() {
        let (pot, written) = connect(&[]);
        let session = pot.session();
        assert!(session.initialized());
        assert_eq!(session.cell(), 0);
        assert_eq!(session.control_mode(), 1);
        assert_eq!(session.current_range(), 4);
        assert!(written.borrow().is_empty());
    }

    #[test]
    fn test_handshake_skips_preamble() {
        let (mut pot, _) = connect(&["CELL 1"]);
        assert_eq!(pot.poll_line().unwrap().as_deref(), Some("CELL 1"));
        assert!(pot.session().cell_enabled());
    }

    #[test]
    fn test_handshake_timeout_is_an_error() {
        let transport = ScriptedTransport::new(["boot noise", "more noise"]);
        let err = Potentiostat::handshake(transport, test_config()).unwrap_err();
        assert!(matches!(
            err,
            PotentiostatError::Timeout {
                waiting_for: "Ini start",
                ..
            }
        ));
    }

    #[test]
    fn test_handshake_best_effort_proceeds() {
        let transport = ScriptedTransport::new(["CELL 1"]);
        let config = test_config().with_sentinel_policy(SentinelPolicy::BestEffort);
        let pot = Potentiostat::handshake(transport, config).unwrap();
        assert!(pot.session().initialized());
        // the CELL line was consumed while waiting for Ini start, unparsed
        assert_eq!(pot.session().cell(), 0);
    }

    #[test]
    fn test_set_cell_is_fire_and_forget() {
        let (mut pot, written) = connect(&[]);
        pot.set_cell(true).unwrap();
        pot.cell_off().unwrap();
        assert_eq!(written_text(&written), "CELL 1\nCELL 0\n");
    }

    #[test]
    fn test_step_waits_for_ack() {
        let (mut pot, written) = connect(&["step echo", "noise", "INI step", "after"]);
        assert!(pot.step(StepCommand::new(1.0, 0.1).then(2.0, 0.2)).unwrap());
        assert_eq!(written_text(&written), "step 1 0.1 2 0.2\n");
        assert_eq!(pot.poll_line().unwrap().as_deref(), Some("after"));
    }

    #[test]
    fn test_step_without_ack() {
        let (mut pot, _) = connect(&["noise"]);
        let err = pot.step(StepCommand::new(1.0, 0.1)).unwrap_err();
        assert!(err.is_timeout());

        let config = test_config().with_sentinel_policy(SentinelPolicy::BestEffort);
        let (mut pot, _) = connect_with(&["noise"], config);
        assert!(!pot.step(StepCommand::new(1.0, 0.1)).unwrap());
    }

    fn ramp_script(segment_ends: &[&str]) -> Vec<String> {
        let mut script = vec![
            "INI ramp".to_string(),
            data(-1.0),
            "init status".to_string(),
            data(0.0),
            "Start".to_string(),
        ];
        let mut t = 1.0;
        for (i, end) in segment_ends.iter().enumerate() {
            for _ in 0..3 {
                script.push(data(t));
                t += 1.0;
            }
            if i == 0 {
                script.push("CELL 1".to_string());
            }
            script.push((*end).to_string());
        }
        script
    }

    #[test]
    fn test_ramp_runs_requested_segments_plus_two() {
        let ends = ["change to 1", "change to 2", "change to 3", "change to 4", "change to 5"];
        let script = ramp_script(&ends);
        let replies: Vec<&str> = script.iter().map(String::as_str).collect();
        let (mut pot, written) = connect(&replies);

        let acquisition = pot.ramp(RampCommand::new(-0.2, 0.2, -0.2, 0.1, 3)).unwrap();

        assert_eq!(written_text(&written), "ramp -0.2 0.2 -0.2 0.1 3\n");
        assert_eq!(acquisition.segments.len(), 5);
        assert!(!acquisition.completed);
        assert!(!acquisition.truncated);
        assert_eq!(acquisition.initialization.len(), 2);
        // seed row + 3 own rows
        assert!(acquisition.segments.iter().all(|s| s.len() == 4));
    }

    #[test]
    fn test_ramp_stops_early_on_done() {
        let script = ramp_script(&["change to 1", "Done", "change to 3"]);
        let replies: Vec<&str> = script.iter().map(String::as_str).collect();
        let (mut pot, _) = connect(&replies);

        let acquisition = pot.ramp(RampCommand::new(-0.2, 0.2, -0.2, 0.1, 3)).unwrap();

        assert_eq!(acquisition.segments.len(), 2);
        assert!(acquisition.completed);
        assert!(!acquisition.truncated);
        assert_eq!(pot.poll_line().unwrap().as_deref(), Some(data(7.0).as_str()));
    }

    #[test]
    fn test_ramp_segments_join_up() {
        let script = ramp_script(&["change to 1", "change to 2", "Done"]);
        let replies: Vec<&str> = script.iter().map(String::as_str).collect();
        let (mut pot, _) = connect(&replies);

        let acquisition = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 5)).unwrap();

        let first = acquisition.segments[0].first().copied();
        assert_eq!(first, acquisition.initialization.last().copied());
        assert_eq!(
            first,
            Some(Sample {
                time: 0.0,
                channel_a: 0.0,
                channel_b: 0.0
            })
        );
        for pair in acquisition.segments.windows(2) {
            assert_eq!(pair[1].first(), pair[0].last());
        }
        assert_eq!(acquisition.total_samples(), 12);
    }

    #[test]
    fn test_ramp_does_not_parse_status_lines() {
        let script = ramp_script(&["Done"]);
        let replies: Vec<&str> = script.iter().map(String::as_str).collect();
        let (mut pot, _) = connect(&replies);
        pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 1)).unwrap();
        assert_eq!(pot.session().cell(), 0);
    }

    #[test]
    fn test_ramp_drops_malformed_rows_when_lenient() {
        let replies = ["INI", "Start", "\t1\t2\t3", "\tbad\t2\t3", "\t2\t3\t4", "Done"];
        let (mut pot, _) = connect(&replies);

        let acquisition = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 1)).unwrap();

        assert_eq!(acquisition.segments.len(), 1);
        assert_eq!(acquisition.segments[0].len(), 2);
        assert_eq!(acquisition.segments[0].dropped_rows, 1);
        assert!(acquisition.completed);
        assert!(acquisition.truncated);
    }

    #[test]
    fn test_ramp_strict_parsing_fails() {
        let replies = ["INI", "Start", "\t1\t2", "Done"];
        let config = test_config().with_parse_policy(ParsePolicy::Strict);
        let (mut pot, _) = connect_with(&replies, config);

        let err = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 1)).unwrap_err();
        assert!(matches!(err, PotentiostatError::MalformedData(_)));
    }

    #[test]
    fn test_ramp_capacity_is_configurable() {
        let replies = ["INI", "Start", "\t1\t1\t1", "\t2\t2\t2", "\t3\t3\t3", "Done"];

        let config = test_config().with_buffer_capacity(2);
        let (mut pot, _) = connect_with(&replies, config.clone());
        let acquisition = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 1)).unwrap();
        assert_eq!(acquisition.segments[0].len(), 2);
        assert_eq!(acquisition.segments[0].rejected_rows, 1);
        assert!(acquisition.truncated);

        let config = config.with_parse_policy(ParsePolicy::Strict);
        let (mut pot, _) = connect_with(&replies, config);
        let err = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 1)).unwrap_err();
        assert!(matches!(err, PotentiostatError::CapacityExceeded(_)));
    }

    #[test]
    fn test_ramp_segment_timeout() {
        let replies = ["INI", "Start", "\t1\t1\t1", "change to 1", "\t2\t2\t2"];
        let (mut pot, _) = connect(&replies);
        let err = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 1)).unwrap_err();
        assert!(matches!(
            err,
            PotentiostatError::Timeout {
                waiting_for: "change to or Done",
                ..
            }
        ));

        let config = test_config().with_sentinel_policy(SentinelPolicy::BestEffort);
        let (mut pot, _) = connect_with(&replies, config);
        let acquisition = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 1)).unwrap();
        assert_eq!(acquisition.segments.len(), 2);
        assert_eq!(acquisition.segments[1].len(), 2);
        assert!(acquisition.truncated);
        assert!(!acquisition.completed);
    }

    #[test]
    fn test_ramp_to_dataframe() {
        let script = ramp_script(&["change to 1", "Done"]);
        let replies: Vec<&str> = script.iter().map(String::as_str).collect();
        let (mut pot, _) = connect(&replies);
        let acquisition = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 0)).unwrap();

        let df = acquisition.to_dataframe().unwrap();
        assert_eq!(df.height(), acquisition.total_samples());
        let segments: Vec<u32> = df
            .column(SEGMENT_COLUMN_NAME)
            .unwrap()
            .u32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(segments, vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_ramp_lazy_frame_filters_by_segment() {
        let script = ramp_script(&["change to 1", "Done"]);
        let replies: Vec<&str> = script.iter().map(String::as_str).collect();
        let (mut pot, _) = connect(&replies);
        let acquisition = pot.ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, 0)).unwrap();

        let second = acquisition
            .to_lazy_frame()
            .unwrap()
            .filter(col(SEGMENT_COLUMN_NAME).eq(lit(1u32)))
            .select([col(TIME_COLUMN_NAME)])
            .collect()
            .unwrap();
        let times: Vec<f64> = second
            .column(TIME_COLUMN_NAME)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        // seed row from segment 0, then its own rows
        assert_eq!(times, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_ramp_with_huge_segment_count_ends_on_done() {
        let replies = ["INI ramp", "Start", "\t1\t1\t1", "Done"];
        let (mut pot, _) = connect(&replies);
        let acquisition = pot
            .ramp(RampCommand::new(0.0, 1.0, -1.0, 0.5, u32::MAX))
            .unwrap();

        assert!(acquisition.completed);
        assert!(!acquisition.truncated);
        assert_eq!(acquisition.segments.len(), 1);
        assert_eq!(acquisition.total_samples(), 1);
    }

    #[test]
    fn test_close_consumes_controller() {
        let (pot, _) = connect(&[]);
        pot.close().unwrap();
    }
}
