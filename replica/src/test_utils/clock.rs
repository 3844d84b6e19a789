use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::notifier::Clock;

#[derive(Debug, Default)]
struct Inner {
    times: VecDeque<String>,
    last: String,
}

/// Clock returning a scripted sequence of timestamps.
///
/// Once the sequence is exhausted the last timestamp is returned forever.
#[derive(Debug, Clone)]
pub struct ScriptedClock {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedClock {
    pub fn new<I, S>(times: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let clock = Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        };
        clock.set_times(times);

        clock
    }

    /// Replaces the remaining timestamps.
    pub fn set_times<I, S>(&self, times: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.times = times.into_iter().map(Into::into).collect();
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> String {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(time) = inner.times.pop_front() {
            inner.last = time;
        }

        inner.last.clone()
    }
}
