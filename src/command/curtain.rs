// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curtain module commands.
//!
//! Curtain modules address their motors by curtain number. Motion commands
//! use the number directly; position commands use the number offset by 16
//! and carry a percentage instead of a status byte.

use crate::command::Command;
use crate::types::{ChannelAddress, CurtainMotion, DeviceAddress, Level, OperateCode};

/// Offset added to the curtain number in position telegrams.
pub(crate) const POSITION_OFFSET: u8 = 16;

/// Command to open, close or stop a curtain.
///
/// # Examples
///
/// ```
/// use buspro_lib::command::{Command, CurtainSwitchControl};
/// use buspro_lib::types::{ChannelAddress, CurtainMotion};
///
/// let cmd = CurtainSwitchControl::new(ChannelAddress::new(1, 40, 2), CurtainMotion::Closing);
/// assert_eq!(cmd.payload(), vec![2, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurtainSwitchControl {
    address: ChannelAddress,
    motion: CurtainMotion,
}

impl CurtainSwitchControl {
    /// Creates a motion command for the curtain at `address`.
    #[must_use]
    pub const fn new(address: ChannelAddress, motion: CurtainMotion) -> Self {
        Self { address, motion }
    }
}

impl Command for CurtainSwitchControl {
    fn operate_code(&self) -> OperateCode {
        OperateCode::CurtainSwitchControl
    }

    fn target(&self) -> DeviceAddress {
        self.address.module()
    }

    fn payload(&self) -> Vec<u8> {
        vec![self.address.channel(), self.motion.to_u8()]
    }
}

/// Command to drive a curtain to a position (0 closed, 100 open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurtainPositionControl {
    address: ChannelAddress,
    position: Level,
}

impl CurtainPositionControl {
    /// Creates a position command for the curtain at `address`.
    #[must_use]
    pub const fn new(address: ChannelAddress, position: Level) -> Self {
        Self { address, position }
    }
}

impl Command for CurtainPositionControl {
    fn operate_code(&self) -> OperateCode {
        OperateCode::CurtainSwitchControl
    }

    fn target(&self) -> DeviceAddress {
        self.address.module()
    }

    fn payload(&self) -> Vec<u8> {
        vec![
            self.address.channel().saturating_add(POSITION_OFFSET),
            self.position.value(),
        ]
    }
}

/// Command asking a curtain module for the status of one curtain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStatusOfCurtainSwitch {
    address: ChannelAddress,
}

impl ReadStatusOfCurtainSwitch {
    /// Creates a status query for the curtain at `address`.
    #[must_use]
    pub const fn new(address: ChannelAddress) -> Self {
        Self { address }
    }
}

impl Command for ReadStatusOfCurtainSwitch {
    fn operate_code(&self) -> OperateCode {
        OperateCode::ReadStatusOfCurtainSwitch
    }

    fn target(&self) -> DeviceAddress {
        self.address.module()
    }

    fn payload(&self) -> Vec<u8> {
        vec![self.address.channel()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_payloads() {
        let addr = ChannelAddress::new(1, 40, 1);
        assert_eq!(
            CurtainSwitchControl::new(addr, CurtainMotion::Stopped).payload(),
            vec![1, 0]
        );
        assert_eq!(
            CurtainSwitchControl::new(addr, CurtainMotion::Opening).payload(),
            vec![1, 1]
        );
    }

    #[test]
    fn position_payload_offsets_curtain_number() {
        let cmd =
            CurtainPositionControl::new(ChannelAddress::new(1, 40, 2), Level::new(35).unwrap());
        assert_eq!(cmd.operate_code(), OperateCode::CurtainSwitchControl);
        assert_eq!(cmd.payload(), vec![18, 35]);
    }
}
