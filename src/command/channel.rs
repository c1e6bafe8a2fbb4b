// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel level commands for relay and dimmer modules.

use crate::command::Command;
use crate::types::{ChannelAddress, DeviceAddress, Level, OperateCode, RunningTime};

/// Command to set one channel to a level.
///
/// # Examples
///
/// ```
/// use buspro_lib::command::{Command, SingleChannelControl};
/// use buspro_lib::types::{ChannelAddress, Level, RunningTime};
///
/// let off = SingleChannelControl::new(
///     ChannelAddress::new(1, 72, 1),
///     Level::OFF,
///     RunningTime::IMMEDIATE,
/// );
/// assert_eq!(off.payload(), vec![1, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleChannelControl {
    address: ChannelAddress,
    level: Level,
    running_time: RunningTime,
}

impl SingleChannelControl {
    /// Creates a command for `address` with the given level and ramp time.
    #[must_use]
    pub const fn new(address: ChannelAddress, level: Level, running_time: RunningTime) -> Self {
        Self {
            address,
            level,
            running_time,
        }
    }

    /// Returns the requested level.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Returns the ramp time.
    #[must_use]
    pub const fn running_time(&self) -> RunningTime {
        self.running_time
    }
}

impl Command for SingleChannelControl {
    fn operate_code(&self) -> OperateCode {
        OperateCode::SingleChannelControl
    }

    fn target(&self) -> DeviceAddress {
        self.address.module()
    }

    fn payload(&self) -> Vec<u8> {
        vec![
            self.address.channel(),
            self.level.value(),
            self.running_time.minutes(),
            self.running_time.seconds(),
        ]
    }
}

/// Command asking a module to report the level of all its channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStatusOfChannels {
    target: DeviceAddress,
}

impl ReadStatusOfChannels {
    /// Creates a status query for a module.
    #[must_use]
    pub const fn new(target: DeviceAddress) -> Self {
        Self { target }
    }
}

impl Command for ReadStatusOfChannels {
    fn operate_code(&self) -> OperateCode {
        OperateCode::ReadStatusOfChannels
    }

    fn target(&self) -> DeviceAddress {
        self.target
    }

    fn payload(&self) -> Vec<u8> {
        Vec::new()
    }
}
