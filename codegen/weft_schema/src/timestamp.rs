use std::fmt;

/// Wire representation of a timestamp value.
///
/// Exactly one of these is selected for every timestamp leaf; the
/// resolution precedence lives in the generator, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampFormat {
    /// Whole seconds since the Unix epoch, as a wire number.
    EpochSeconds,
    /// ISO-8601 / RFC-3339 date-time string.
    DateTime,
    /// RFC-5322-style HTTP date string.
    HttpDate,
}

impl TimestampFormat {
    /// The token spelled into generated `time.put` / `time.take`
    /// instructions.
    pub fn token(self) -> &'static str {
        match self {
            Self::EpochSeconds => "epoch-seconds",
            Self::DateTime => "date-time",
            Self::HttpDate => "http-date",
        }
    }

    /// Inverse of [`token`](Self::token), used by the runtime parser.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "epoch-seconds" => Some(Self::EpochSeconds),
            "date-time" => Some(Self::DateTime),
            "http-date" => Some(Self::HttpDate),
            _ => None,
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
