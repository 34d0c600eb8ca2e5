use polars::prelude::*;

/// Rows a buffer holds unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 1000;

pub const TIME_COLUMN_NAME: &str = "time";
pub const CHANNEL_A_COLUMN_NAME: &str = "channel_a";
pub const CHANNEL_B_COLUMN_NAME: &str = "channel_b";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("Malformed data line {line:?}: {reason}")]
    Malformed { line: String, reason: String },

    #[error("Sample buffer full ({capacity} rows), rejected {line:?}")]
    CapacityExceeded { capacity: usize, line: String },
}

/// One measurement row: time, channel A, channel B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub channel_a: f64,
    pub channel_b: f64,
}

impl Sample {
    /// Parse a tab-leading data line: `<label>\t<time>\t<a>\t<b>`.
    ///
    /// Field 0 (the label, normally empty) is not consumed; fields beyond the
    /// fourth are ignored.
    pub fn parse(line: &str) -> Result<Self, SampleError> {
        let malformed = |reason: String| SampleError::Malformed {
            line: line.to_string(),
            reason,
        };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            return Err(malformed(format!(
                "expected 4 tab-separated fields, got {}",
                fields.len()
            )));
        }

        let mut values = [0.0f64; 3];
        for (value, field) in values.iter_mut().zip(&fields[1..4]) {
            *value = field
                .trim()
                .parse()
                .map_err(|_| malformed(format!("{field:?} is not a number")))?;
        }

        Ok(Self {
            time: values[0],
            channel_a: values[1],
            channel_b: values[2],
        })
    }
}

/// Fixed-capacity collector for the sample rows of one acquisition segment.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    capacity: usize,
    last_raw_line: Option<String>,
    dropped_rows: usize,
    rejected_rows: usize,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SampleBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            last_raw_line: None,
            dropped_rows: 0,
            rejected_rows: 0,
        }
    }

    /// Offer a raw line to the buffer.
    ///
    /// Lines that do not start with a tab are interleaved status or
    /// diagnostic output and are skipped with `Ok(false)`. Accepted rows
    /// return `Ok(true)` and become the buffer's `last_raw_line`.
    pub fn append(&mut self, raw_line: &str) -> Result<bool, SampleError> {
        if !raw_line.starts_with('\t') {
            return Ok(false);
        }
        if self.samples.len() >= self.capacity {
            return Err(SampleError::CapacityExceeded {
                capacity: self.capacity,
                line: raw_line.to_string(),
            });
        }

        let sample = Sample::parse(raw_line)?;
        self.samples.push(sample);
        self.last_raw_line = Some(raw_line.to_string());
        Ok(true)
    }

    /// Record that a data row was discarded instead of failing the acquisition.
    pub(crate) fn note_skipped(&mut self, error: &SampleError) {
        match error {
            SampleError::Malformed { .. } => self.dropped_rows += 1,
            SampleError::CapacityExceeded { .. } => self.rejected_rows += 1,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last_raw_line(&self) -> Option<&str> {
        self.last_raw_line.as_deref()
    }

    /// Close the buffer and hand out exactly the filled rows.
    pub fn finalize(self) -> SampleSet {
        SampleSet {
            samples: self.samples,
            dropped_rows: self.dropped_rows,
            rejected_rows: self.rejected_rows,
        }
    }
}

/// The rows of a finalized [`SampleBuffer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    pub samples: Vec<Sample>,
    /// Data rows discarded because they failed to parse.
    pub dropped_rows: usize,
    /// Data rows refused because the buffer was full.
    pub rejected_rows: usize,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether any incoming data row is missing from `samples`.
    pub fn is_lossy(&self) -> bool {
        self.dropped_rows > 0 || self.rejected_rows > 0
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Columnar view with `time`, `channel_a` and `channel_b` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let time: Vec<f64> = self.samples.iter().map(|s| s.time).collect();
        let channel_a: Vec<f64> = self.samples.iter().map(|s| s.channel_a).collect();
        let channel_b: Vec<f64> = self.samples.iter().map(|s| s.channel_b).collect();

        DataFrame::new(vec![
            Series::new(TIME_COLUMN_NAME.into(), time).into(),
            Series::new(CHANNEL_A_COLUMN_NAME.into(), channel_a).into(),
            Series::new(CHANNEL_B_COLUMN_NAME.into(), channel_b).into(),
        ])
    }
}
