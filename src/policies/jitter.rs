//! # Jitter for polling delays.
//!
//! Many revisions submitted at once would otherwise poll the pending-count
//! endpoint in lock step.
//!
//! - [`Jitter::None`]: exact delay
//! - [`Jitter::Full`]: random delay in `[0, delay]`
//! - [`Jitter::Equal`]: `delay/2 + random[0, delay/2]`

use rand::Rng;
use std::time::Duration;

/// Randomization applied to a computed delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Exact delay (predictable; used by tests).
    #[default]
    None,
    /// Random delay in `[0, delay]`.
    Full,
    /// `delay/2 + random[0, delay/2]`; keeps about 75% of the delay on average.
    Equal,
}

impl Jitter {
    /// Applies the jitter to `delay`.
    pub fn apply(self, delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if ms == 0 {
            return delay;
        }
        let mut rng = rand::rng();
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(rng.random_range(0..=ms)),
            Jitter::Equal => {
                let half = ms / 2;
                let extra = if half == 0 { 0 } else { rng.random_range(0..=half) };
                Duration::from_millis(half + extra)
            }
        }
    }
}
