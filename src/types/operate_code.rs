// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operate codes and device types.
//!
//! The operate code selects the meaning and payload layout of a telegram.
//! Only the codes this library acts on are named; every other code is
//! carried through as [`OperateCode::Other`].

use std::fmt;

/// Semantic kind of a telegram.
///
/// # Examples
///
/// ```
/// use buspro_lib::types::OperateCode;
///
/// let code = OperateCode::from_u16(0x0031);
/// assert_eq!(code, OperateCode::SingleChannelControl);
/// assert_eq!(code.to_u16(), 0x0031);
///
/// // Unknown codes are preserved
/// assert_eq!(OperateCode::from_u16(0x1234), OperateCode::Other(0x1234));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperateCode {
    /// Recall a scene on an area.
    SceneControl,
    /// A module reports that a scene was recalled.
    SceneControlResponse,
    /// Set one channel to a level with a ramp time.
    SingleChannelControl,
    /// A module reports the new level of one channel.
    SingleChannelControlResponse,
    /// Ask a module for the level of all its channels.
    ReadStatusOfChannels,
    /// A module reports the level of all its channels.
    ReadStatusOfChannelsResponse,
    /// Open, close or stop a curtain, or drive it to a position.
    CurtainSwitchControl,
    /// A curtain module reports a new status.
    CurtainSwitchControlResponse,
    /// Ask a curtain module for the status of one curtain.
    ReadStatusOfCurtainSwitch,
    /// A curtain module reports the status of one curtain.
    ReadStatusOfCurtainSwitchResponse,
    /// Any operate code without a dedicated variant.
    Other(u16),
}

impl OperateCode {
    /// Decodes the two wire bytes of an operate code.
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        match value {
            0x0002 => Self::SceneControl,
            0x0003 => Self::SceneControlResponse,
            0x0031 => Self::SingleChannelControl,
            0x0032 => Self::SingleChannelControlResponse,
            0x0033 => Self::ReadStatusOfChannels,
            0x0034 => Self::ReadStatusOfChannelsResponse,
            0xE3E0 => Self::CurtainSwitchControl,
            0xE3E1 => Self::CurtainSwitchControlResponse,
            0xE3E2 => Self::ReadStatusOfCurtainSwitch,
            0xE3E3 => Self::ReadStatusOfCurtainSwitchResponse,
            other => Self::Other(other),
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::SceneControl => 0x0002,
            Self::SceneControlResponse => 0x0003,
            Self::SingleChannelControl => 0x0031,
            Self::SingleChannelControlResponse => 0x0032,
            Self::ReadStatusOfChannels => 0x0033,
            Self::ReadStatusOfChannelsResponse => 0x0034,
            Self::CurtainSwitchControl => 0xE3E0,
            Self::CurtainSwitchControlResponse => 0xE3E1,
            Self::ReadStatusOfCurtainSwitch => 0xE3E2,
            Self::ReadStatusOfCurtainSwitchResponse => 0xE3E3,
            Self::Other(value) => value,
        }
    }

    /// Maps an [`Other`](Self::Other) holding a named value to that name.
    ///
    /// ```
    /// use buspro_lib::types::OperateCode;
    ///
    /// assert_eq!(
    ///     OperateCode::Other(0x0031).normalized(),
    ///     OperateCode::SingleChannelControl
    /// );
    /// assert_eq!(OperateCode::Other(0x1234).normalized(), OperateCode::Other(0x1234));
    /// ```
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self::from_u16(self.to_u16())
    }

    /// Minimum payload length a frame with this code must carry.
    ///
    /// - single channel control: channel, level, minutes, seconds
    /// - single channel control response: channel, result flag, level
    /// - read status response: channel count
    /// - curtain control and responses: curtain number, status
    #[must_use]
    pub const fn min_payload_len(self) -> usize {
        match self {
            Self::SingleChannelControl => 4,
            Self::SingleChannelControlResponse => 3,
            Self::SceneControl
            | Self::SceneControlResponse
            | Self::CurtainSwitchControl
            | Self::CurtainSwitchControlResponse
            | Self::ReadStatusOfCurtainSwitchResponse => 2,
            Self::ReadStatusOfChannelsResponse | Self::ReadStatusOfCurtainSwitch => 1,
            Self::ReadStatusOfChannels | Self::Other(_) => 0,
        }
    }
}

impl From<u16> for OperateCode {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl From<OperateCode> for u16 {
    fn from(code: OperateCode) -> Self {
        code.to_u16()
    }
}

impl fmt::Display for OperateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(value) => write!(f, "Other({value:#06X})"),
            named => write!(f, "{named:?}"),
        }
    }
}

/// Two-byte model identifier a module puts in every frame it sends.
///
/// Only used to label outbound frames; inbound values are kept for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceType(u16);

impl DeviceType {
    /// Identifier used by PC control software, which this library acts as.
    pub const CONTROLLER: Self = Self(0xFFFE);

    /// Creates a device type from its wire value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl Default for DeviceType {
    fn default() -> Self {
        Self::CONTROLLER
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip_through_u16() {
        let codes = [
            OperateCode::SceneControl,
            OperateCode::SceneControlResponse,
            OperateCode::SingleChannelControl,
            OperateCode::SingleChannelControlResponse,
            OperateCode::ReadStatusOfChannels,
            OperateCode::ReadStatusOfChannelsResponse,
            OperateCode::CurtainSwitchControl,
            OperateCode::CurtainSwitchControlResponse,
            OperateCode::ReadStatusOfCurtainSwitch,
            OperateCode::ReadStatusOfCurtainSwitchResponse,
        ];
        for code in codes {
            assert_eq!(OperateCode::from_u16(code.to_u16()), code);
        }
    }

    #[test]
    fn other_code_display() {
        assert_eq!(OperateCode::Other(0xABCD).to_string(), "Other(0xABCD)");
        assert_eq!(
            OperateCode::SingleChannelControl.to_string(),
            "SingleChannelControl"
        );
    }

    #[test]
    fn device_type_display() {
        assert_eq!(DeviceType::CONTROLLER.to_string(), "0xFFFE");
    }
}
