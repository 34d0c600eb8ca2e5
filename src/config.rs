use crate::sample_buffer::DEFAULT_CAPACITY;
use crate::transport::DEFAULT_LINE_TIMEOUT;
use std::time::Duration;

/// What to do when an awaited sentinel line never shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentinelPolicy {
    /// Fail the call with a timeout error.
    #[default]
    Strict,
    /// Log a warning and carry on as if the sentinel had arrived.
    BestEffort,
}

/// What to do with a single line that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Log the line, count it as dropped and keep going.
    #[default]
    Lenient,
    /// Abort the running command with the parse error.
    Strict,
}

/// Timing and buffering knobs for one potentiostat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Per-line wait of a blocking read.
    pub line_timeout: Duration,
    /// Deadline for `Ini start` after opening the port.
    pub handshake_start: Duration,
    /// Deadline for `Ini Done` after `Ini start`.
    pub handshake_done: Duration,
    /// Deadline for the acknowledgment of a `step` command.
    pub step_ack: Duration,
    /// Deadline for the acknowledgment of a `ramp` command.
    pub ramp_ack: Duration,
    /// Deadline for `Start` while collecting initialization rows.
    pub pre_sampling: Duration,
    /// Deadline for each ramp segment to end with `change to` or `Done`.
    pub segment: Duration,
    /// Rows per sample buffer.
    pub buffer_capacity: usize,
    /// Polls done by `drain_to_latest`.
    pub drain_limit: usize,
    pub sentinel_policy: SentinelPolicy,
    pub parse_policy: ParsePolicy,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            line_timeout: DEFAULT_LINE_TIMEOUT,
            handshake_start: Duration::from_secs(20),
            handshake_done: Duration::from_secs(20),
            step_ack: Duration::from_secs(50),
            ramp_ack: Duration::from_secs(1000),
            pre_sampling: Duration::from_secs(1000),
            segment: Duration::from_secs(2000),
            buffer_capacity: DEFAULT_CAPACITY,
            drain_limit: 1000,
            sentinel_policy: SentinelPolicy::default(),
            parse_policy: ParsePolicy::default(),
        }
    }
}

impl ProtocolConfig {
    pub fn with_line_timeout(mut self, timeout: Duration) -> Self {
        self.line_timeout = timeout;
        self
    }

    /// Both handshake deadlines at once.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_start = timeout;
        self.handshake_done = timeout;
        self
    }

    pub fn with_step_ack_timeout(mut self, timeout: Duration) -> Self {
        self.step_ack = timeout;
        self
    }

    pub fn with_ramp_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ramp_ack = timeout;
        self
    }

    pub fn with_pre_sampling_timeout(mut self, timeout: Duration) -> Self {
        self.pre_sampling = timeout;
        self
    }

    pub fn with_segment_timeout(mut self, timeout: Duration) -> Self {
        self.segment = timeout;
        self
    }

    /// Every sentinel deadline at once.
    pub fn with_all_timeouts(self, timeout: Duration) -> Self {
        self.with_handshake_timeout(timeout)
            .with_step_ack_timeout(timeout)
            .with_ramp_ack_timeout(timeout)
            .with_pre_sampling_timeout(timeout)
            .with_segment_timeout(timeout)
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_drain_limit(mut self, limit: usize) -> Self {
        self.drain_limit = limit;
        self
    }

    pub fn with_sentinel_policy(mut self, policy: SentinelPolicy) -> Self {
        self.sentinel_policy = policy;
        self
    }

    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }
}
