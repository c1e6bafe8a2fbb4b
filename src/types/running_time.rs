// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ramp time for channel changes.

use std::fmt;
use std::time::Duration;

/// Time a channel takes to reach its new level.
///
/// The bus carries this as a minutes byte and a seconds byte, so the
/// longest representable value is 255 minutes 59 seconds. Longer values
/// are clamped.
///
/// # Examples
///
/// ```
/// use buspro_lib::types::RunningTime;
///
/// let rt = RunningTime::from_secs(125);
/// assert_eq!(rt.minutes(), 2);
/// assert_eq!(rt.seconds(), 5);
///
/// assert_eq!(RunningTime::IMMEDIATE.as_secs(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunningTime {
    minutes: u8,
    seconds: u8,
}

impl RunningTime {
    /// Change the level without ramping.
    pub const IMMEDIATE: Self = Self {
        minutes: 0,
        seconds: 0,
    };

    /// Longest representable ramp.
    pub const MAX: Self = Self {
        minutes: u8::MAX,
        seconds: 59,
    };

    /// Creates a running time from a number of seconds.
    #[must_use]
    pub const fn from_secs(secs: u32) -> Self {
        let minutes = secs / 60;
        if minutes > u8::MAX as u32 {
            return Self::MAX;
        }
        // Both values fit in u8 after the check above.
        #[allow(clippy::cast_possible_truncation)]
        let (minutes, seconds) = (minutes as u8, (secs % 60) as u8);
        Self { minutes, seconds }
    }

    /// Creates a running time from its wire bytes.
    ///
    /// Seconds above 59 are carried into the minutes.
    #[must_use]
    pub const fn from_parts(minutes: u8, seconds: u8) -> Self {
        Self::from_secs(minutes as u32 * 60 + seconds as u32)
    }

    /// Returns the whole minutes.
    #[must_use]
    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    /// Returns the remaining seconds (0-59).
    #[must_use]
    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Returns the total number of seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u32 {
        self.minutes as u32 * 60 + self.seconds as u32
    }
}

impl From<Duration> for RunningTime {
    fn from(duration: Duration) -> Self {
        Self::from_secs(u32::try_from(duration.as_secs()).unwrap_or(u32::MAX))
    }
}

impl From<RunningTime> for Duration {
    fn from(rt: RunningTime) -> Self {
        Duration::from_secs(u64::from(rt.as_secs()))
    }
}

impl fmt::Display for RunningTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m{:02}s", self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_minutes_and_seconds() {
        let rt = RunningTime::from_secs(61);
        assert_eq!((rt.minutes(), rt.seconds()), (1, 1));
        assert_eq!(rt.as_secs(), 61);
    }

    #[test]
    fn clamps_long_durations() {
        assert_eq!(RunningTime::from_secs(u32::MAX), RunningTime::MAX);
        assert_eq!(
            RunningTime::from(Duration::from_secs(1_000_000)),
            RunningTime::MAX
        );
    }

    #[test]
    fn from_parts_carries_seconds() {
        assert_eq!(RunningTime::from_parts(1, 75), RunningTime::from_secs(135));
    }

    #[test]
    fn display() {
        assert_eq!(RunningTime::from_secs(125).to_string(), "2m05s");
    }
}
