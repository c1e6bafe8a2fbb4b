// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Buspro command definitions.
//!
//! This module provides typed representations of the requests this library
//! sends on the bus. Each command knows its operate code, target module and
//! payload layout, and turns into a [`Telegram`] for the network interface.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Payload |
//! |-------------|---------|---------|
//! | [`SingleChannelControl`] | Set a channel level | channel, level, minutes, seconds |
//! | [`ReadStatusOfChannels`] | Query every channel level | (empty) |
//! | [`CurtainSwitchControl`] | Open, close or stop a curtain | curtain, status |
//! | [`CurtainPositionControl`] | Drive a curtain to a position | curtain + 16, percent |
//! | [`ReadStatusOfCurtainSwitch`] | Query one curtain | curtain |
//!
//! # Examples
//!
//! ```
//! use buspro_lib::command::{Command, SingleChannelControl};
//! use buspro_lib::types::{ChannelAddress, Level, OperateCode, RunningTime};
//!
//! let cmd = SingleChannelControl::new(
//!     ChannelAddress::new(1, 72, 3),
//!     Level::new(80).unwrap(),
//!     RunningTime::from_secs(90),
//! );
//!
//! assert_eq!(cmd.operate_code(), OperateCode::SingleChannelControl);
//! assert_eq!(cmd.payload(), vec![3, 80, 1, 30]);
//! ```

mod channel;
mod curtain;

pub use channel::{ReadStatusOfChannels, SingleChannelControl};
pub use curtain::{CurtainPositionControl, CurtainSwitchControl, ReadStatusOfCurtainSwitch};
pub(crate) use curtain::POSITION_OFFSET;

use crate::telegram::Telegram;
use crate::types::{DeviceAddress, OperateCode};

/// A request that can be sent to a bus module.
pub trait Command {
    /// Returns the operate code of the request.
    fn operate_code(&self) -> OperateCode;

    /// Returns the module the request is addressed to.
    fn target(&self) -> DeviceAddress;

    /// Returns the payload bytes.
    fn payload(&self) -> Vec<u8>;

    /// Builds the telegram sent on behalf of `source`.
    fn to_telegram(&self, source: DeviceAddress) -> Telegram {
        Telegram::from_parts(source, self.target(), self.operate_code(), self.payload())
    }
}
