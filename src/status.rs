//! Line classification and device status tracking.
//!
//! Every decoded line from the potentiostat falls into exactly one
//! [`LineKind`]. Status broadcasts (`CELL`, `CMODE`, `IE`) update the
//! [`SessionState`]; sentinels drive the command state machines in
//! [`crate::potentiostat`]; tab-leading lines carry samples.

use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Malformed {field} status line {line:?}: value {value:?} is not an integer")]
    Malformed {
        field: StatusField,
        value: String,
        line: String,
    },
}

/// Which session field a status line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Cell,
    ControlMode,
    CurrentRange,
}

impl StatusField {
    /// Tag prefix, value offset and value width on the wire.
    fn layout(self) -> (&'static str, usize, usize) {
        match self {
            StatusField::Cell => ("CELL", 4, 2),
            StatusField::ControlMode => ("CMODE", 5, 2),
            StatusField::CurrentRange => ("IE", 2, 3),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.layout().0
    }
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of line categories the device can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A status broadcast; `value` is the raw fixed-width field.
    Status {
        field: StatusField,
        value: String,
        line: &'a str,
    },
    /// Exactly `Ini start`: the device began its startup report.
    IniStart,
    /// Exactly `Ini Done`: the startup report is complete.
    IniDone,
    /// `INI...`: command acknowledgment.
    Ack,
    /// `Start...`: sampling begins.
    Start,
    /// `change to...`: ramp segment boundary.
    ChangeTo,
    /// `Done...`: the running command finished.
    Done,
    /// Tab-leading sample row.
    Data(&'a str),
    Unrecognized,
}

impl<'a> LineKind<'a> {
    /// Classify one decoded, right-trimmed line.
    pub fn classify(line: &'a str) -> Self {
        if line.starts_with('\t') {
            return LineKind::Data(line);
        }
        match line {
            "Ini start" => return LineKind::IniStart,
            "Ini Done" => return LineKind::IniDone,
            _ => {}
        }
        if line.starts_with("INI") {
            return LineKind::Ack;
        }

        for field in [
            StatusField::Cell,
            StatusField::ControlMode,
            StatusField::CurrentRange,
        ] {
            let (prefix, offset, width) = field.layout();
            if line.starts_with(prefix) {
                let value = line.chars().skip(offset).take(width).collect();
                return LineKind::Status { field, value, line };
            }
        }

        if line.starts_with("Start") {
            LineKind::Start
        } else if line.starts_with("change to") {
            LineKind::ChangeTo
        } else if line.starts_with("Done") {
            LineKind::Done
        } else {
            LineKind::Unrecognized
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            LineKind::IniStart
                | LineKind::IniDone
                | LineKind::Ack
                | LineKind::Start
                | LineKind::ChangeTo
                | LineKind::Done
        )
    }
}

/// A status value that was applied to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub field: StatusField,
    pub value: i32,
}

/// Device configuration as last reported by the device itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    cell: i32,
    current_range: i32,
    control_mode: i32,
    initialized: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `CELL` value as last reported.
    pub fn cell(&self) -> i32 {
        self.cell
    }

    pub fn cell_enabled(&self) -> bool {
        self.cell != 0
    }

    /// Current range index from the last `IE` status.
    pub fn current_range(&self) -> i32 {
        self.current_range
    }

    pub fn control_mode(&self) -> i32 {
        self.control_mode
    }

    /// Whether the startup handshake has completed.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Apply a classified line. Returns the update for status lines and
    /// `None` for every other kind of line.
    pub fn apply(&mut self, kind: &LineKind<'_>) -> Result<Option<StatusUpdate>, StatusError> {
        let LineKind::Status { field, value, line } = kind else {
            return Ok(None);
        };

        let parsed: i32 = value.trim().parse().map_err(|_| StatusError::Malformed {
            field: *field,
            value: value.clone(),
            line: (*line).to_string(),
        })?;

        match field {
            StatusField::Cell => self.cell = parsed,
            StatusField::ControlMode => self.control_mode = parsed,
            StatusField::CurrentRange => self.current_range = parsed,
        }
        log::debug!("{} {}", field, parsed);

        Ok(Some(StatusUpdate {
            field: *field,
            value: parsed,
        }))
    }

    /// Classify `line` and apply it.
    pub fn observe(&mut self, line: &str) -> Result<Option<StatusUpdate>, StatusError> {
        self.apply(&LineKind::classify(line))
    }
}
