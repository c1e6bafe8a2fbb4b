// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus addressing.
//!
//! A Buspro module is identified by a subnet id and a device id. Modules
//! expose numbered channels (a relay, a dimmer output, a curtain motor).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Address of a physical bus module.
///
/// `0xFF` in either position addresses every module.
///
/// # Examples
///
/// ```
/// use buspro_lib::types::DeviceAddress;
///
/// let addr = DeviceAddress::new(1, 72);
/// assert_eq!(addr.to_string(), "1.72");
/// assert!(!addr.is_broadcast());
/// assert!(DeviceAddress::BROADCAST.is_broadcast());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress {
    subnet: u8,
    device: u8,
}

impl DeviceAddress {
    /// Every module on every subnet.
    pub const BROADCAST: Self = Self::new(0xFF, 0xFF);

    /// Creates a module address.
    #[must_use]
    pub const fn new(subnet: u8, device: u8) -> Self {
        Self { subnet, device }
    }

    /// Returns the subnet id.
    #[must_use]
    pub const fn subnet(&self) -> u8 {
        self.subnet
    }

    /// Returns the device id within the subnet.
    #[must_use]
    pub const fn device(&self) -> u8 {
        self.device
    }

    /// Returns `true` if either part is the broadcast id.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        self.subnet == 0xFF || self.device == 0xFF
    }

    /// Returns the channel `channel` of this module.
    #[must_use]
    pub const fn channel(self, channel: u8) -> ChannelAddress {
        ChannelAddress::from_parts(self, channel)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.subnet, self.device)
    }
}

impl From<(u8, u8)> for DeviceAddress {
    fn from((subnet, device): (u8, u8)) -> Self {
        Self::new(subnet, device)
    }
}

impl FromStr for DeviceAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [subnet, device] = parse_parts::<2>(s)?;
        Ok(Self::new(subnet, device))
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceAddress> for String {
    fn from(value: DeviceAddress) -> Self {
        value.to_string()
    }
}

/// Address of one channel on a bus module.
///
/// Written as `subnet.device.channel`, the form used in configuration files.
///
/// # Examples
///
/// ```
/// use buspro_lib::types::ChannelAddress;
///
/// let addr: ChannelAddress = "1.72.3".parse().unwrap();
/// assert_eq!(addr.module().subnet(), 1);
/// assert_eq!(addr.module().device(), 72);
/// assert_eq!(addr.channel(), 3);
///
/// assert!("1.72".parse::<ChannelAddress>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelAddress {
    module: DeviceAddress,
    channel: u8,
}

impl ChannelAddress {
    /// Creates a channel address from its three parts.
    #[must_use]
    pub const fn new(subnet: u8, device: u8, channel: u8) -> Self {
        Self::from_parts(DeviceAddress::new(subnet, device), channel)
    }

    /// Creates a channel address on an existing module address.
    #[must_use]
    pub const fn from_parts(module: DeviceAddress, channel: u8) -> Self {
        Self { module, channel }
    }

    /// Returns the module address.
    #[must_use]
    pub const fn module(&self) -> DeviceAddress {
        self.module
    }

    /// Returns the channel number.
    #[must_use]
    pub const fn channel(&self) -> u8 {
        self.channel
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.channel)
    }
}

impl FromStr for ChannelAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [subnet, device, channel] = parse_parts::<3>(s)?;
        Ok(Self::new(subnet, device, channel))
    }
}

impl TryFrom<String> for ChannelAddress {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelAddress> for String {
    fn from(value: ChannelAddress) -> Self {
        value.to_string()
    }
}

/// Splits a dotted address into exactly `N` bytes.
fn parse_parts<const N: usize>(s: &str) -> Result<[u8; N], ValueError> {
    let mut parts = [0u8; N];
    let mut fields = s.trim().split('.');

    for part in &mut parts {
        let field = fields
            .next()
            .ok_or_else(|| ValueError::InvalidAddress(s.to_string()))?;
        *part = field
            .trim()
            .parse()
            .map_err(|_| ValueError::InvalidAddress(s.to_string()))?;
    }

    if fields.next().is_some() {
        return Err(ValueError::InvalidAddress(s.to_string()));
    }
    Ok(parts)
}
