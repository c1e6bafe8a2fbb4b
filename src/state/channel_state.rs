// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Two-state machine tracking a single cached value.

use serde::{Deserialize, Serialize};

/// Where a cached value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOrigin {
    /// Assumed locally when a command was issued, pending confirmation.
    Optimistic,
    /// Reported by the module in a telegram observed on the bus.
    Authoritative,
}

impl UpdateOrigin {
    /// Returns `true` for values observed on the bus.
    #[must_use]
    pub const fn is_authoritative(self) -> bool {
        matches!(self, Self::Authoritative)
    }
}

impl std::fmt::Display for UpdateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimistic => write!(f, "optimistic"),
            Self::Authoritative => write!(f, "authoritative"),
        }
    }
}

/// Cached state of a device channel.
///
/// Starts as [`ChannelState::Unknown`]. Both transitions lead to
/// [`ChannelState::Known`]; a failed command never rolls the value back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ChannelState<V> {
    /// No value has been assumed or observed yet.
    Unknown,
    /// A value is cached.
    Known {
        /// The cached value.
        value: V,
        /// How the value was obtained.
        origin: UpdateOrigin,
    },
}

impl<V> Default for ChannelState<V> {
    fn default() -> Self {
        Self::Unknown
    }
}

impl<V: Copy> ChannelState<V> {
    /// Returns the cached value, if any.
    #[must_use]
    pub fn value(&self) -> Option<V> {
        match self {
            Self::Unknown => None,
            Self::Known { value, .. } => Some(*value),
        }
    }

    /// Returns the origin of the cached value, if any.
    #[must_use]
    pub fn origin(&self) -> Option<UpdateOrigin> {
        match self {
            Self::Unknown => None,
            Self::Known { origin, .. } => Some(*origin),
        }
    }

    /// Returns `true` once a value has been assumed or observed.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }

    /// Records a value with the given origin.
    ///
    /// Devices pass [`UpdateOrigin::Optimistic`] when a command is issued
    /// and [`UpdateOrigin::Authoritative`] for values seen on the bus.
    pub fn update(&mut self, value: V, origin: UpdateOrigin) {
        *self = Self::Known { value, origin };
    }
}
