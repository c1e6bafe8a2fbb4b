// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway configuration types.

use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::TimeoutBudget;
use crate::types::{ChannelAddress, DeviceAddress, RunningTime};

/// Configuration of a gateway connection.
///
/// # Examples
///
/// ```
/// use buspro_lib::{DeviceConfig, GatewayConfig};
/// use buspro_lib::types::ChannelAddress;
///
/// let config = GatewayConfig::new("192.168.1.15:6000".parse().unwrap())
///     .with_device(DeviceConfig::light(ChannelAddress::new(1, 72, 3), "Kitchen"));
/// assert_eq!(config.receive_address.port(), 6000);
///
/// let json = r#"{
///     "send_address": "192.168.1.15:6000",
///     "devices": [
///         {"kind": "light", "address": "1.72.3", "name": "Kitchen", "running_time": 2},
///         {"kind": "cover", "address": "1.40.1", "name": "Curtain"}
///     ]
/// }"#;
/// let config = GatewayConfig::from_json(json).unwrap();
/// assert_eq!(config.devices.len(), 2);
/// assert_eq!(config.source_address.to_string(), "200.200");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway address frames are sent to.
    pub send_address: SocketAddr,
    /// Local address to listen on.
    #[serde(default = "default_receive_address")]
    pub receive_address: SocketAddr,
    /// Bus address this library sends from.
    #[serde(default = "default_source_address")]
    pub source_address: DeviceAddress,
    /// IPv4 address written in the frame header.
    #[serde(default = "default_local_ip")]
    pub local_ip: Ipv4Addr,
    /// Deadlines of every bounded operation.
    #[serde(default)]
    pub timeouts: TimeoutBudget,
    /// Devices to register.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl GatewayConfig {
    /// Default bus port.
    pub const DEFAULT_PORT: u16 = 6000;

    /// Default bus address of this library.
    pub const DEFAULT_SOURCE: DeviceAddress = DeviceAddress::new(200, 200);

    /// Creates a configuration with default settings and no devices.
    #[must_use]
    pub fn new(send_address: SocketAddr) -> Self {
        Self {
            send_address,
            receive_address: default_receive_address(),
            source_address: Self::DEFAULT_SOURCE,
            local_ip: default_local_ip(),
            timeouts: TimeoutBudget::default(),
            devices: Vec::new(),
        }
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document is not a valid
    /// configuration, or a validation error from [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks addresses that parse but cannot work on the bus.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSource` for a broadcast source address
    /// and `ConfigError::InvalidDevice` for a device on a broadcast module or
    /// on channel 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_address.is_broadcast() {
            return Err(ConfigError::InvalidSource(self.source_address));
        }
        self.devices.iter().try_for_each(DeviceConfig::validate)
    }

    /// Sets the local listen address.
    #[must_use]
    pub fn with_receive_address(mut self, address: SocketAddr) -> Self {
        self.receive_address = address;
        self
    }

    /// Sets the bus address this library sends from.
    #[must_use]
    pub fn with_source_address(mut self, address: DeviceAddress) -> Self {
        self.source_address = address;
        self
    }

    /// Sets the IPv4 address written in the frame header.
    #[must_use]
    pub fn with_local_ip(mut self, ip: Ipv4Addr) -> Self {
        self.local_ip = ip;
        self
    }

    /// Sets the timeout budget.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: TimeoutBudget) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Adds a device.
    #[must_use]
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.devices.push(device);
        self
    }
}

fn default_receive_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, GatewayConfig::DEFAULT_PORT))
}

fn default_source_address() -> DeviceAddress {
    GatewayConfig::DEFAULT_SOURCE
}

fn default_local_ip() -> Ipv4Addr {
    Ipv4Addr::UNSPECIFIED
}

fn default_true() -> bool {
    true
}

/// Kind of a configured device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// A dimmer or relay channel.
    Light,
    /// A curtain channel.
    Cover,
}

/// Configuration of one device channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Kind of device.
    pub kind: DeviceKind,
    /// Channel address, written `subnet.device.channel`.
    pub address: ChannelAddress,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Default running time in seconds (lights only).
    #[serde(default)]
    pub running_time: u32,
    /// Whether intermediate levels are supported (lights only).
    #[serde(default = "default_true")]
    pub dimmable: bool,
    /// Whether the motor accepts position commands (covers only).
    #[serde(default = "default_true")]
    pub adjustable: bool,
}

impl DeviceConfig {
    /// Creates a light configuration.
    #[must_use]
    pub fn light(address: ChannelAddress, name: impl Into<String>) -> Self {
        Self {
            kind: DeviceKind::Light,
            address,
            name: name.into(),
            running_time: 0,
            dimmable: true,
            adjustable: true,
        }
    }

    /// Creates a cover configuration.
    #[must_use]
    pub fn cover(address: ChannelAddress, name: impl Into<String>) -> Self {
        Self {
            kind: DeviceKind::Cover,
            ..Self::light(address, name)
        }
    }

    /// Sets the default running time.
    #[must_use]
    pub fn with_running_time(mut self, running_time: RunningTime) -> Self {
        self.running_time = running_time.as_secs();
        self
    }

    /// Sets whether the light supports intermediate levels.
    #[must_use]
    pub fn with_dimmable(mut self, dimmable: bool) -> Self {
        self.dimmable = dimmable;
        self
    }

    /// Sets whether the cover accepts position commands.
    #[must_use]
    pub fn with_adjustable(mut self, adjustable: bool) -> Self {
        self.adjustable = adjustable;
        self
    }

    /// Returns the default running time.
    #[must_use]
    pub fn running_time(&self) -> RunningTime {
        RunningTime::from_secs(self.running_time)
    }

    /// Returns the name, or the address when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.address.to_string()
        } else {
            self.name.clone()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidDevice {
            name: self.display_name(),
            message: message.to_string(),
        };

        if self.address.module().is_broadcast() {
            return Err(invalid("broadcast module address"));
        }
        if self.address.channel() == 0 {
            return Err(invalid("channels are numbered from 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn minimal_json_uses_defaults() {
        let config = GatewayConfig::from_json(r#"{"send_address": "10.0.0.5:6000"}"#).unwrap();

        assert_eq!(config.receive_address, "0.0.0.0:6000".parse().unwrap());
        assert_eq!(config.source_address, DeviceAddress::new(200, 200));
        assert_eq!(config.local_ip, Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.timeouts, TimeoutBudget::default());
        assert!(config.devices.is_empty());
    }

    #[test]
    fn full_json() {
        let json = r#"{
            "send_address": "192.168.1.255:6000",
            "receive_address": "0.0.0.0:6001",
            "source_address": "1.250",
            "local_ip": "192.168.1.20",
            "timeouts": {"send": 300},
            "devices": [
                {"kind": "light", "address": "1.72.3", "name": "Kitchen", "running_time": 90, "dimmable": false}
            ]
        }"#;
        let config = GatewayConfig::from_json(json).unwrap();

        assert_eq!(config.receive_address.port(), 6001);
        assert_eq!(config.source_address, DeviceAddress::new(1, 250));
        assert_eq!(config.local_ip, Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(config.timeouts.send, Duration::from_millis(300));

        let light = &config.devices[0];
        assert_eq!(light.kind, DeviceKind::Light);
        assert_eq!(light.address, ChannelAddress::new(1, 72, 3));
        assert_eq!(light.running_time(), RunningTime::from_parts(1, 30));
        assert!(!light.dimmable);
    }

    #[test]
    fn cover_adjustable_defaults_to_true() {
        let json = r#"{
            "send_address": "10.0.0.5:6000",
            "devices": [
                {"kind": "cover", "address": "1.40.1"},
                {"kind": "cover", "address": "1.40.2", "adjustable": false}
            ]
        }"#;
        let config = GatewayConfig::from_json(json).unwrap();
        assert!(config.devices[0].adjustable);
        assert!(!config.devices[1].adjustable);
    }

    #[test]
    fn bad_address_is_json_error() {
        let json = r#"{"send_address": "10.0.0.5:6000", "devices": [{"kind": "light", "address": "1.72"}]}"#;
        assert!(matches!(
            GatewayConfig::from_json(json),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn channel_zero_is_rejected() {
        let json = r#"{"send_address": "10.0.0.5:6000", "devices": [{"kind": "cover", "address": "1.40.0"}]}"#;
        let err = GatewayConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDevice { ref name, .. } if name == "1.40.0"));
    }

    #[test]
    fn broadcast_source_is_rejected() {
        let config = GatewayConfig::new("10.0.0.5:6000".parse().unwrap())
            .with_source_address(DeviceAddress::BROADCAST);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSource(_))
        ));
    }

    #[test]
    fn builders_and_round_trip() {
        let config = GatewayConfig::new("10.0.0.5:6000".parse().unwrap())
            .with_receive_address("0.0.0.0:6001".parse().unwrap())
            .with_local_ip(Ipv4Addr::new(10, 0, 0, 2))
            .with_timeouts(TimeoutBudget::default().with_send(Duration::from_millis(100)))
            .with_device(
                DeviceConfig::light(ChannelAddress::new(1, 72, 1), "Hall")
                    .with_dimmable(false)
                    .with_running_time(RunningTime::from_secs(5)),
            )
            .with_device(
                DeviceConfig::cover(ChannelAddress::new(1, 40, 1), "").with_adjustable(false),
            );

        let json = serde_json::to_string(&config).unwrap();
        let back = GatewayConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.devices[1].display_name(), "1.40.1");
    }
}
