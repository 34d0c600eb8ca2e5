use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Unknown command {0:?}")]
    UnknownCommand(String),

    #[error("Wrong number of arguments for {command}: got {got}")]
    ArgumentCount { command: &'static str, got: usize },

    #[error("Invalid argument {value:?} for {command}")]
    InvalidArgument { command: &'static str, value: String },
}

/// One wire command, ready to be sent with a trailing newline.
pub struct EncodedCommand {
    text: String,
}

impl EncodedCommand {
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Debug for EncodedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.text)
    }
}

/// A potential step: hold `potential` volts for `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPoint {
    pub duration: f64,
    pub potential: f64,
}

impl StepPoint {
    pub fn new(duration: f64, potential: f64) -> Self {
        Self {
            duration,
            potential,
        }
    }
}

/// `step <t0> <v0> [<t1> <v1>] [<t2> <v2>]`
#[derive(Debug, Clone, PartialEq)]
pub struct StepCommand {
    first: StepPoint,
    rest: Vec<StepPoint>,
}

impl StepCommand {
    /// Maximum number of points a single step command carries.
    pub const MAX_POINTS: usize = 3;

    pub fn new(duration: f64, potential: f64) -> Self {
        Self {
            first: StepPoint::new(duration, potential),
            rest: Vec::with_capacity(Self::MAX_POINTS - 1),
        }
    }

    /// Build from optional trailing pairs. A pair is kept only when both its
    /// time and its potential are present; order is preserved.
    pub fn from_parts(
        t0: f64,
        v0: f64,
        t1: Option<f64>,
        v1: Option<f64>,
        t2: Option<f64>,
        v2: Option<f64>,
    ) -> Self {
        let mut command = Self::new(t0, v0);
        for pair in [(t1, v1), (t2, v2)] {
            if let (Some(t), Some(v)) = pair {
                command.rest.push(StepPoint::new(t, v));
            }
        }
        command
    }

    /// Append another step. Points beyond [`Self::MAX_POINTS`] are ignored.
    pub fn then(mut self, duration: f64, potential: f64) -> Self {
        if self.rest.len() < Self::MAX_POINTS - 1 {
            self.rest.push(StepPoint::new(duration, potential));
        } else {
            log::warn!(
                "step command already holds {} points, ignoring {} {}",
                Self::MAX_POINTS,
                duration,
                potential
            );
        }
        self
    }

    pub fn points(&self) -> impl Iterator<Item = &StepPoint> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }
}

/// `ramp <start> <v1> <v2> <rate> <segments>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampCommand {
    pub start: f64,
    pub vertex1: f64,
    pub vertex2: f64,
    /// Scan rate in V/s.
    pub rate: f64,
    pub segments: u32,
}

impl RampCommand {
    pub fn new(start: f64, vertex1: f64, vertex2: f64, rate: f64, segments: u32) -> Self {
        Self {
            start,
            vertex1,
            vertex2,
            rate,
            segments,
        }
    }

    /// Segments the device streams for this command: the requested sweeps
    /// plus the leading and trailing partial sweeps.
    pub fn expected_segments(&self) -> usize {
        self.segments as usize + 2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Cell(bool),
    Step(StepCommand),
    Ramp(RampCommand),
}

impl Command {
    /// Wire form, newline terminated.
    pub fn encode(&self) -> EncodedCommand {
        EncodedCommand {
            text: format!("{self}\n"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Cell(on) => write!(f, "CELL {}", u8::from(*on)),
            Command::Step(step) => {
                f.write_str("step")?;
                for point in step.points() {
                    write!(f, " {} {}", point.duration, point.potential)?;
                }
                Ok(())
            }
            Command::Ramp(ramp) => write!(
                f,
                "ramp {} {} {} {} {}",
                ramp.start, ramp.vertex1, ramp.vertex2, ramp.rate, ramp.segments
            ),
        }
    }
}

impl From<StepCommand> for Command {
    fn from(step: StepCommand) -> Self {
        Self::Step(step)
    }
}

impl From<RampCommand> for Command {
    fn from(ramp: RampCommand) -> Self {
        Self::Ramp(ramp)
    }
}

fn parse_arg<T: FromStr>(command: &'static str, value: &str) -> Result<T, CommandParseError> {
    value.parse().map_err(|_| CommandParseError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// Parse the wire form back, with or without the trailing newline.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.strip_suffix('\n').unwrap_or(s);
        let mut words = line.split(' ');
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        match name {
            "CELL" => match args.as_slice() {
                ["1"] => Ok(Command::Cell(true)),
                ["0"] => Ok(Command::Cell(false)),
                [other] => Err(CommandParseError::InvalidArgument {
                    command: "CELL",
                    value: (*other).to_string(),
                }),
                _ => Err(CommandParseError::ArgumentCount {
                    command: "CELL",
                    got: args.len(),
                }),
            },
            "step" => {
                if args.len() % 2 != 0 || args.is_empty() || args.len() > 2 * StepCommand::MAX_POINTS {
                    return Err(CommandParseError::ArgumentCount {
                        command: "step",
                        got: args.len(),
                    });
                }
                let mut step = StepCommand::new(parse_arg("step", args[0])?, parse_arg("step", args[1])?);
                for pair in args[2..].chunks_exact(2) {
                    step = step.then(parse_arg("step", pair[0])?, parse_arg("step", pair[1])?);
                }
                Ok(Command::Step(step))
            }
            "ramp" => match args.as_slice() {
                [start, v1, v2, rate, segments] => Ok(Command::Ramp(RampCommand::new(
                    parse_arg("ramp", start)?,
                    parse_arg("ramp", v1)?,
                    parse_arg("ramp", v2)?,
                    parse_arg("ramp", rate)?,
                    parse_arg("ramp", segments)?,
                ))),
                _ => Err(CommandParseError::ArgumentCount {
                    command: "ramp",
                    got: args.len(),
                }),
            },
            other => Err(CommandParseError::UnknownCommand(other.to_string())),
        }
    }
}
