// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curtain module responses.

use crate::command::POSITION_OFFSET;
use crate::telegram::Telegram;
use crate::types::{CurtainMotion, Level, OperateCode};

/// What a curtain module reported about one curtain.
///
/// Curtain numbers above 16 carry a position percentage; lower numbers
/// carry a motion status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurtainReport {
    /// The motor state of a curtain.
    Motion {
        /// Curtain number.
        curtain: u8,
        /// Reported motor state.
        motion: CurtainMotion,
    },
    /// The position of a curtain.
    Position {
        /// Curtain number.
        curtain: u8,
        /// Reported position (0 closed, 100 open).
        position: Level,
    },
}

impl CurtainReport {
    /// Reads a curtain control response or curtain status response.
    #[must_use]
    pub fn parse(telegram: &Telegram) -> Option<Self> {
        if !matches!(
            telegram.operate_code(),
            OperateCode::CurtainSwitchControlResponse
                | OperateCode::ReadStatusOfCurtainSwitchResponse
        ) {
            return None;
        }
        let [number, value, ..] = telegram.payload() else {
            return None;
        };
        if *number > POSITION_OFFSET {
            Some(Self::Position {
                curtain: number - POSITION_OFFSET,
                position: Level::clamped(*value),
            })
        } else {
            CurtainMotion::from_u8(*value).map(|motion| Self::Motion {
                curtain: *number,
                motion,
            })
        }
    }

    /// Returns the curtain number the report is about.
    #[must_use]
    pub const fn curtain(&self) -> u8 {
        match self {
            Self::Motion { curtain, .. } | Self::Position { curtain, .. } => *curtain,
        }
    }
}
