// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshots of device state published to observers.

use serde::{Deserialize, Serialize};

use crate::types::{CurtainMotion, Level};

/// State of a curtain channel.
///
/// Curtain modules report motion and position in separate telegrams, so
/// either part may be the last one observed.
///
/// # Examples
///
/// ```
/// use buspro_lib::state::CoverState;
/// use buspro_lib::types::{CurtainMotion, Level};
///
/// let state = CoverState::default().with_position(Level::OFF);
/// assert_eq!(state.motion(), CurtainMotion::Stopped);
/// assert_eq!(state.is_closed(), Some(true));
/// assert_eq!(CoverState::default().is_closed(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoverState {
    motion: CurtainMotion,
    position: Option<Level>,
}

impl CoverState {
    /// Creates a cover state.
    #[must_use]
    pub const fn new(motion: CurtainMotion, position: Option<Level>) -> Self {
        Self { motion, position }
    }

    /// Returns the current motion.
    #[must_use]
    pub const fn motion(&self) -> CurtainMotion {
        self.motion
    }

    /// Returns the position as a percentage open, if reported.
    #[must_use]
    pub const fn position(&self) -> Option<Level> {
        self.position
    }

    /// Returns whether the curtain is fully closed, if the position is known.
    #[must_use]
    pub fn is_closed(&self) -> Option<bool> {
        self.position.map(|position| !position.is_on())
    }

    /// Returns a copy with the given motion.
    #[must_use]
    pub const fn with_motion(mut self, motion: CurtainMotion) -> Self {
        self.motion = motion;
        self
    }

    /// Returns a copy with the given position.
    #[must_use]
    pub const fn with_position(mut self, position: Level) -> Self {
        self.position = Some(position);
        self
    }
}

/// Published state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceState {
    /// A dimmer or relay channel.
    Light {
        /// Output level, 0 for off.
        brightness: Level,
    },
    /// A curtain channel.
    Cover(CoverState),
}

impl DeviceState {
    /// Returns the brightness of a light.
    #[must_use]
    pub const fn brightness(&self) -> Option<Level> {
        match self {
            Self::Light { brightness } => Some(*brightness),
            Self::Cover(_) => None,
        }
    }

    /// Returns the state of a cover.
    #[must_use]
    pub const fn cover(&self) -> Option<CoverState> {
        match self {
            Self::Light { .. } => None,
            Self::Cover(state) => Some(*state),
        }
    }
}
