use chrono::{SecondsFormat, Utc};

/// Source of the timestamps carried by lifecycle notifications.
pub trait Clock {
    /// Returns the current time, already formatted for the wire.
    fn now(&self) -> String;
}

/// Wall clock formatting UTC instants as RFC 3339 with millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    #[test]
    fn system_clock_formats_rfc3339_utc() {
        let now = SystemClock.now();

        assert!(now.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
