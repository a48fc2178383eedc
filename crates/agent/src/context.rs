//! Context providers that feed dynamic lines into the system prompt.

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use atomchat_core::error::ContextError;
use atomchat_core::prompt::ContextProvider;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local};

/// Default strftime pattern for the date line.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<DateTime<FixedOffset>, ContextError>;
}

/// The host clock, in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<FixedOffset>, ContextError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ContextError::Clock(format!("clock reads before the Unix epoch: {e}")))?;
        Ok(Local::now().fixed_offset())
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> Result<DateTime<FixedOffset>, ContextError> {
        Ok(self.0)
    }
}

/// Renders the current date and time as `Date: <formatted>`.
pub struct DateTimeContextProvider {
    title: String,
    format: String,
    clock: Box<dyn Clock>,
}

impl DateTimeContextProvider {
    /// Create a provider reading the system clock with the default format.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            format: DEFAULT_DATE_FORMAT.into(),
            clock: Box::new(SystemClock),
        }
    }

    /// Use a custom strftime pattern.
    ///
    /// Patterns chrono cannot parse are rejected here rather than at render time.
    pub fn with_format(mut self, format: impl Into<String>) -> Result<Self, ContextError> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ContextError::InvalidFormat(format));
        }
        self.format = format;
        Ok(self)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
}

impl ContextProvider for DateTimeContextProvider {
    fn title(&self) -> &str {
        &self.title
    }

    fn info(&self) -> Result<String, ContextError> {
        let now = self.clock.now()?;
        let mut line = String::from("Date: ");
        write!(line, "{}", now.format(&self.format))
            .map_err(|_| ContextError::InvalidFormat(self.format.clone()))?;
        Ok(line)
    }
}
