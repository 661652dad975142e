use tally_types::CallError;

/// Accepted range of proposal durations, in seconds.
///
/// The core rule only requires a positive duration. Deployments that want
/// the voting window bounded (the front end offers 1 to 365 days) configure
/// `min_secs` and `max_secs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationPolicy {
    min_secs: Option<u64>,
    max_secs: Option<u64>,
}

impl DurationPolicy {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min_secs: None,
            max_secs: None,
        }
    }

    #[must_use]
    pub const fn new(min_secs: Option<u64>, max_secs: Option<u64>) -> Self {
        Self { min_secs, max_secs }
    }

    #[must_use]
    pub const fn min_secs(&self) -> Option<u64> {
        self.min_secs
    }

    #[must_use]
    pub const fn max_secs(&self) -> Option<u64> {
        self.max_secs
    }

    /// Validate a requested duration and return it unsigned.
    pub fn check(&self, seconds: i64) -> Result<u64, CallError> {
        let rejected = CallError::InvalidDuration { seconds };
        let secs = match u64::try_from(seconds) {
            Ok(secs) if secs > 0 => secs,
            _ => return Err(rejected),
        };
        if self.min_secs.is_some_and(|min| secs < min) {
            return Err(rejected);
        }
        if self.max_secs.is_some_and(|max| secs > max) {
            return Err(rejected);
        }
        Ok(secs)
    }
}
