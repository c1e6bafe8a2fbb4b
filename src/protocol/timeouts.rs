// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deadlines of every bounded operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout budget shared by the transport, network interface and devices.
///
/// The layers nest: a raw datagram send is bounded by [`send`](Self::send),
/// the network interface bounds gate acquisition plus that send by
/// [`telegram`](Self::telegram), and a device waits
/// [`confirmation`](Self::confirmation) for the module to report the effect of
/// a command. Worst-case command latency is therefore `telegram +
/// confirmation`.
///
/// Durations are serialized as integer milliseconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use buspro_lib::protocol::TimeoutBudget;
///
/// let budget = TimeoutBudget::default();
/// assert_eq!(budget.send, Duration::from_millis(500));
/// assert!(budget.send < budget.telegram);
/// assert!(budget.telegram < budget.confirmation);
///
/// let json = r#"{"send": 200, "telegram": 400, "confirmation": 800, "startup": 1000}"#;
/// let custom: TimeoutBudget = serde_json::from_str(json).unwrap();
/// assert_eq!(custom.confirmation, Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutBudget {
    /// Bound on a single datagram send.
    #[serde(with = "millis")]
    pub send: Duration,
    /// Bound on a network interface send, including waiting for the gate.
    #[serde(with = "millis")]
    pub telegram: Duration,
    /// How long a device waits to observe the effect of a command.
    #[serde(with = "millis")]
    pub confirmation: Duration,
    /// How long `start` may wait for the receive endpoint.
    #[serde(with = "millis")]
    pub startup: Duration,
}

impl TimeoutBudget {
    /// Default single send bound.
    pub const DEFAULT_SEND: Duration = Duration::from_millis(500);
    /// Default network interface send bound.
    pub const DEFAULT_TELEGRAM: Duration = Duration::from_millis(1000);
    /// Default confirmation wait.
    pub const DEFAULT_CONFIRMATION: Duration = Duration::from_millis(1500);
    /// Default endpoint startup grace period.
    pub const DEFAULT_STARTUP: Duration = Duration::from_secs(3);

    /// Sets the single send bound.
    #[must_use]
    pub const fn with_send(mut self, timeout: Duration) -> Self {
        self.send = timeout;
        self
    }

    /// Sets the network interface send bound.
    #[must_use]
    pub const fn with_telegram(mut self, timeout: Duration) -> Self {
        self.telegram = timeout;
        self
    }

    /// Sets the confirmation wait.
    #[must_use]
    pub const fn with_confirmation(mut self, timeout: Duration) -> Self {
        self.confirmation = timeout;
        self
    }

    /// Sets the startup grace period.
    #[must_use]
    pub const fn with_startup(mut self, timeout: Duration) -> Self {
        self.startup = timeout;
        self
    }
}

impl Default for TimeoutBudget {
    fn default() -> Self {
        Self {
            send: Self::DEFAULT_SEND,
            telegram: Self::DEFAULT_TELEGRAM,
            confirmation: Self::DEFAULT_CONFIRMATION,
            startup: Self::DEFAULT_STARTUP,
        }
    }
}

/// Converts a duration to whole milliseconds for errors and logs.
pub(crate) fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(super::as_millis(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_nest() {
        let budget = TimeoutBudget::default();
        assert!(budget.send < budget.telegram);
        assert!(budget.telegram < budget.confirmation);
        assert_eq!(budget.startup, Duration::from_secs(3));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let budget: TimeoutBudget = serde_json::from_str(r#"{"send": 250}"#).unwrap();
        assert_eq!(budget.send, Duration::from_millis(250));
        assert_eq!(budget.telegram, TimeoutBudget::DEFAULT_TELEGRAM);
    }

    #[test]
    fn serializes_as_millis() {
        let json = serde_json::to_value(TimeoutBudget::default()).unwrap();
        assert_eq!(json["send"], 500);
        assert_eq!(json["startup"], 3000);
    }

    #[test]
    fn builders() {
        let budget = TimeoutBudget::default()
            .with_send(Duration::from_millis(10))
            .with_telegram(Duration::from_millis(20))
            .with_confirmation(Duration::from_millis(30))
            .with_startup(Duration::from_millis(40));
        assert_eq!(budget.send, Duration::from_millis(10));
        assert_eq!(budget.telegram, Duration::from_millis(20));
        assert_eq!(budget.confirmation, Duration::from_millis(30));
        assert_eq!(budget.startup, Duration::from_millis(40));
    }
}
