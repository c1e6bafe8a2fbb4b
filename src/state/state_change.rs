// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change notification.

use serde::{Deserialize, Serialize};

use super::{DeviceState, UpdateOrigin};
use crate::types::ChannelAddress;

/// A state mutation delivered to device observers.
///
/// Emitted once per mutation, optimistic or authoritative. An authoritative
/// report is emitted even when it repeats the cached value.
///
/// # Examples
///
/// ```
/// use buspro_lib::state::{DeviceState, StateChange, UpdateOrigin};
/// use buspro_lib::types::{ChannelAddress, Level};
///
/// let change = StateChange::new(
///     ChannelAddress::new(1, 72, 3),
///     DeviceState::Light { brightness: Level::FULL },
///     UpdateOrigin::Optimistic,
/// );
/// assert!(!change.is_authoritative());
/// assert_eq!(change.state().brightness(), Some(Level::FULL));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    address: ChannelAddress,
    state: DeviceState,
    origin: UpdateOrigin,
}

impl StateChange {
    /// Creates a state change.
    #[must_use]
    pub const fn new(address: ChannelAddress, state: DeviceState, origin: UpdateOrigin) -> Self {
        Self {
            address,
            state,
            origin,
        }
    }

    /// Returns the address of the device that changed.
    #[must_use]
    pub const fn address(&self) -> ChannelAddress {
        self.address
    }

    /// Returns the new state.
    #[must_use]
    pub const fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns how the new state was obtained.
    #[must_use]
    pub const fn origin(&self) -> UpdateOrigin {
        self.origin
    }

    /// Returns `true` if the state was reported by the module.
    #[must_use]
    pub const fn is_authoritative(&self) -> bool {
        self.origin.is_authoritative()
    }
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state {
            DeviceState::Light { brightness } => {
                write!(f, "{} brightness {brightness} ({})", self.address, self.origin)
            }
            DeviceState::Cover(cover) => match cover.position() {
                Some(position) => write!(
                    f,
                    "{} {} at {position} ({})",
                    self.address,
                    cover.motion(),
                    self.origin
                ),
                None => write!(f, "{} {} ({})", self.address, cover.motion(), self.origin),
            },
        }
    }
}
