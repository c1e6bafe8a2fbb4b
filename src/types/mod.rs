// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the Buspro protocol.
//!
//! These types enforce the protocol's constraints at construction time, so
//! an out-of-range level or an unparsable address is rejected before it can
//! reach the wire.

mod address;
mod curtain;
mod level;
mod operate_code;
mod running_time;

pub use address::{ChannelAddress, DeviceAddress};
pub use curtain::CurtainMotion;
pub use level::Level;
pub use operate_code::{DeviceType, OperateCode};
pub use running_time::RunningTime;
