// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curtain motor state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a curtain motor is doing.
///
/// # Examples
///
/// ```
/// use buspro_lib::types::CurtainMotion;
///
/// assert_eq!(CurtainMotion::from_u8(1), Some(CurtainMotion::Opening));
/// assert_eq!(CurtainMotion::Closing.to_u8(), 2);
/// assert_eq!(CurtainMotion::from_u8(9), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurtainMotion {
    /// The motor is stopped.
    #[default]
    Stopped,
    /// The curtain is opening.
    Opening,
    /// The curtain is closing.
    Closing,
}

impl CurtainMotion {
    /// Decodes the status byte of a curtain telegram.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Stopped),
            1 => Some(Self::Opening),
            2 => Some(Self::Closing),
            _ => None,
        }
    }

    /// Returns the status byte.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::Opening => 1,
            Self::Closing => 2,
        }
    }
}

impl fmt::Display for CurtainMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Opening => "opening",
            Self::Closing => "closing",
        })
    }
}
