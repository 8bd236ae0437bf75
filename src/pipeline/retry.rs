// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bounded retries with exponential backoff for storage operations.

use std::{io, num::NonZeroU32, thread, time::Duration};

use log::warn;

/// How to retry a storage operation that failed for a transient reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The total number of attempts, including the first.
    pub max_attempts: NonZeroU32,

    /// The wait before the first retry. Each subsequent wait doubles.
    pub base_delay: Duration,

    /// Waits never exceed this.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Try exactly once.
    pub fn none() -> RetryPolicy {
        RetryPolicy {
            max_attempts: NonZeroU32::MIN,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(self, max_attempts: NonZeroU32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            ..self
        }
    }

    /// The wait after `attempt` (zero indexed) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts are used up.
    pub fn run<T, F>(&self, mut op: F) -> io::Result<T>
    where
        F: FnMut() -> io::Result<T>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(t) => return Ok(t),
                Err(e) if is_transient(&e) && attempt + 1 < self.max_attempts.get() => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Transient storage error ({e}); retrying in {}ms",
                        delay.as_millis()
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Errors that might go away by themselves. Anything caused by bad input
/// (e.g. a missing file, bad permissions) is not transient.
pub(crate) fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
