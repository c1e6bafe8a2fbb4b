// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway connection context.
//!
//! A [`Gateway`] owns the single [`NetworkInterface`] of a connection and an
//! index of the devices registered on it. It is the surface an
//! entity or automation layer talks to: register observers, read the
//! current state, issue actions and check the connection.
//!
//! # Examples
//!
//! ```no_run
//! use buspro_lib::{Action, Gateway, GatewayConfig};
//! use buspro_lib::types::{ChannelAddress, Level};
//!
//! # async fn example() -> buspro_lib::Result<()> {
//! let config = GatewayConfig::from_json(r#"{
//!     "send_address": "192.168.1.15:6000",
//!     "devices": [{"kind": "light", "address": "1.72.3", "name": "Kitchen"}]
//! }"#)?;
//! let gateway = Gateway::from_config(&config)?;
//! gateway.start().await?;
//!
//! let kitchen = ChannelAddress::new(1, 72, 3);
//! gateway.register_observer(kitchen, |change| println!("{change}"))?;
//! gateway
//!     .issue_command(kitchen, Action::SetLevel { level: Level::new(60)?, running_time: None })
//!     .await;
//!
//! println!("{:?}", gateway.current_state(kitchen)?);
//! gateway.stop().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod index;

pub use config::{DeviceConfig, DeviceKind, GatewayConfig};

use std::sync::{Arc, Weak};

use index::{DeviceHandle, DeviceIndex};

use crate::device::{Cover, Light};
use crate::error::{DeviceError, Error, Result};
use crate::protocol::{NetworkInterface, Transport, UdpTransport};
use crate::state::{DeviceState, StateChange};
use crate::subscription::SubscriptionId;
use crate::telegram::TelegramCodec;
use crate::types::{ChannelAddress, Level, RunningTime};

/// An operation on a device.
///
/// A `running_time` of `None` uses the light's configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Switch a light on, restoring its previous brightness.
    TurnOn {
        /// Fade time.
        running_time: Option<RunningTime>,
    },
    /// Switch a light off.
    TurnOff {
        /// Fade time.
        running_time: Option<RunningTime>,
    },
    /// Set the level of a light.
    SetLevel {
        /// Target level.
        level: Level,
        /// Fade time.
        running_time: Option<RunningTime>,
    },
    /// Open a cover.
    Open,
    /// Close a cover.
    Close,
    /// Stop a cover.
    Stop,
    /// Move a cover to a position.
    SetPosition(Level),
    /// Read the device state from its module.
    ReadStatus,
}

impl Action {
    /// Returns the action name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TurnOn { .. } => "turn_on",
            Self::TurnOff { .. } => "turn_off",
            Self::SetLevel { .. } => "set_level",
            Self::Open => "open",
            Self::Close => "close",
            Self::Stop => "stop",
            Self::SetPosition(_) => "set_position",
            Self::ReadStatus => "read_status",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A connection to one Buspro gateway and its devices.
pub struct Gateway<T: Transport = UdpTransport> {
    network: Arc<NetworkInterface<T>>,
    devices: Arc<DeviceIndex<T>>,
    dispatch: SubscriptionId,
}

impl Gateway<UdpTransport> {
    /// Creates a gateway over UDP and registers the configured devices.
    ///
    /// Nothing is opened until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid configuration and
    /// `Error::DuplicateDevice` if two devices share a channel.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = UdpTransport::new(
            config.send_address,
            config.receive_address,
            config.timeouts,
        );
        let gateway = Self::with_transport(transport, config);
        for device in &config.devices {
            gateway.add_device(device)?;
        }
        Ok(gateway)
    }
}

impl<T: Transport> Gateway<T> {
    /// Creates a gateway over any transport.
    ///
    /// Uses the addressing and timeouts of `config` but does not register
    /// its devices.
    #[must_use]
    pub fn with_transport(transport: T, config: &GatewayConfig) -> Self {
        let network = Arc::new(NetworkInterface::new(
            transport,
            TelegramCodec::new(config.local_ip),
            config.source_address,
            config.timeouts,
        ));
        let devices = Arc::new(DeviceIndex::new());

        let index: Weak<DeviceIndex<T>> = Arc::downgrade(&devices);
        let dispatch = network.register_callback(move |telegram| {
            if let Some(devices) = index.upgrade() {
                devices.dispatch(telegram);
            }
        });

        Self {
            network,
            devices,
            dispatch,
        }
    }

    /// Returns the network interface.
    #[must_use]
    pub fn network(&self) -> &Arc<NetworkInterface<T>> {
        &self.network
    }

    /// Registers a dimmable light.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateDevice` if the channel is taken.
    pub fn add_light(
        &self,
        address: ChannelAddress,
        name: impl Into<String>,
    ) -> Result<Arc<Light<T>>> {
        self.insert_light(Light::new(Arc::clone(&self.network), address, name))
    }

    /// Registers a cover.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateDevice` if the channel is taken.
    pub fn add_cover(
        &self,
        address: ChannelAddress,
        name: impl Into<String>,
    ) -> Result<Arc<Cover<T>>> {
        self.insert_cover(Cover::new(Arc::clone(&self.network), address, name))
    }

    /// Registers a device from its configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateDevice` if the channel is taken.
    pub fn add_device(&self, config: &DeviceConfig) -> Result<()> {
        match config.kind {
            DeviceKind::Light => {
                let light = Light::new(
                    Arc::clone(&self.network),
                    config.address,
                    config.display_name(),
                )
                .with_dimmable(config.dimmable)
                .with_running_time(config.running_time());
                self.insert_light(light).map(|_| ())
            }
            DeviceKind::Cover => {
                let cover = Cover::new(
                    Arc::clone(&self.network),
                    config.address,
                    config.display_name(),
                )
                .with_adjustable(config.adjustable);
                self.insert_cover(cover).map(|_| ())
            }
        }
    }

    fn insert_light(&self, light: Light<T>) -> Result<Arc<Light<T>>> {
        let light = Arc::new(light);
        self.devices.insert(DeviceHandle::Light(Arc::clone(&light)))?;
        Ok(light)
    }

    fn insert_cover(&self, cover: Cover<T>) -> Result<Arc<Cover<T>>> {
        let cover = Arc::new(cover);
        self.devices.insert(DeviceHandle::Cover(Arc::clone(&cover)))?;
        Ok(cover)
    }

    /// Returns the light registered at `address`.
    #[must_use]
    pub fn light(&self, address: ChannelAddress) -> Option<Arc<Light<T>>> {
        match self.devices.get(address)? {
            DeviceHandle::Light(light) => Some(light),
            DeviceHandle::Cover(_) => None,
        }
    }

    /// Returns the cover registered at `address`.
    #[must_use]
    pub fn cover(&self, address: ChannelAddress) -> Option<Arc<Cover<T>>> {
        match self.devices.get(address)? {
            DeviceHandle::Cover(cover) => Some(cover),
            DeviceHandle::Light(_) => None,
        }
    }

    /// Returns the addresses of every registered device, sorted.
    #[must_use]
    pub fn device_addresses(&self) -> Vec<ChannelAddress> {
        let mut addresses: Vec<_> = self
            .devices
            .all()
            .iter()
            .map(DeviceHandle::address)
            .collect();
        addresses.sort_unstable();
        addresses
    }

    /// Returns the number of registered devices.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Opens the transport, then reads the status of every device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the endpoints cannot be opened. Status
    /// reads that go unanswered are logged, not returned.
    pub async fn start(&self) -> Result<()> {
        self.network.start().await?;
        let answered = self.refresh_all().await;
        tracing::info!(
            devices = self.device_count(),
            answered,
            "Gateway started"
        );
        Ok(())
    }

    /// Stops the transport. Idempotent.
    pub async fn stop(&self) {
        self.network.stop().await;
    }

    /// Reads the status of every device concurrently.
    ///
    /// Lights of one module share a single read. Returns the number of
    /// reads that were answered.
    pub async fn refresh_all(&self) -> usize {
        let mut reads = tokio::task::JoinSet::new();
        for device in self.devices.status_readers() {
            reads.spawn(async move { device.read_status().await });
        }

        let mut answered = 0;
        while let Some(result) = reads.join_next().await {
            match result {
                Ok(true) => answered += 1,
                Ok(false) => {}
                Err(error) => tracing::warn!(error = %error, "Status read task failed"),
            }
        }
        answered
    }

    /// Returns `true` while the transport is started.
    #[must_use]
    pub fn connection_healthy(&self) -> bool {
        self.network.is_running()
    }

    /// Registers an observer for state changes of a device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device is registered at `address`.
    pub fn register_observer<F>(
        &self,
        address: ChannelAddress,
        callback: F,
    ) -> Result<SubscriptionId>
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        Ok(self.device(address)?.on_state_changed(callback))
    }

    /// Removes an observer of a device.
    ///
    /// Returns `true` if the observer was registered.
    pub fn unsubscribe(&self, address: ChannelAddress, id: SubscriptionId) -> bool {
        self.devices
            .get(address)
            .is_some_and(|device| device.unsubscribe(id))
    }

    /// Returns the cached state of a device, `None` while unknown.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device is registered at `address`.
    pub fn current_state(&self, address: ChannelAddress) -> Result<Option<DeviceState>> {
        Ok(self.device(address)?.current_state())
    }

    /// Applies an action to a device.
    ///
    /// Returns `false` if the device is unknown, the action does not apply to
    /// it, or the command could not be sent. For [`Action::ReadStatus`],
    /// returns whether the module answered.
    pub async fn issue_command(&self, address: ChannelAddress, action: Action) -> bool {
        let Some(device) = self.devices.get(address) else {
            tracing::warn!(device = %address, action = %action, "Action for unknown device");
            return false;
        };

        match (device, action) {
            (DeviceHandle::Light(light), Action::TurnOn { running_time }) => {
                light
                    .turn_on(running_time.unwrap_or(light.running_time()))
                    .await
            }
            (DeviceHandle::Light(light), Action::TurnOff { running_time }) => {
                light
                    .set_off(running_time.unwrap_or(light.running_time()))
                    .await
            }
            (DeviceHandle::Light(light), Action::SetLevel { level, running_time }) => {
                light
                    .set_level(level, running_time.unwrap_or(light.running_time()))
                    .await
            }
            (DeviceHandle::Cover(cover), Action::Open) => cover.open().await,
            (DeviceHandle::Cover(cover), Action::Close) => cover.close().await,
            (DeviceHandle::Cover(cover), Action::Stop) => cover.stop().await,
            (DeviceHandle::Cover(cover), Action::SetPosition(position)) => {
                cover.set_position(position).await
            }
            (device, Action::ReadStatus) => device.read_status().await,
            (_, action) => {
                let error = DeviceError::UnsupportedAction {
                    address,
                    action: action.name(),
                };
                tracing::warn!(error = %error, "Action rejected");
                false
            }
        }
    }

    fn device(&self, address: ChannelAddress) -> Result<DeviceHandle<T>> {
        self.devices
            .get(address)
            .ok_or(Error::DeviceNotFound(address))
    }
}

impl<T: Transport> Drop for Gateway<T> {
    fn drop(&mut self) {
        self.network.unsubscribe(self.dispatch);
    }
}

impl<T: Transport> std::fmt::Debug for Gateway<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("network", &self.network)
            .field("devices", &self.device_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::protocol::mock::MockTransport;
    use crate::state::UpdateOrigin;
    use crate::telegram::Telegram;
    use crate::types::{CurtainMotion, DeviceAddress, OperateCode};
    use std::net::SocketAddr;
    use std::time::Duration;

    fn peer() -> SocketAddr {
        "192.168.1.15:6000".parse().unwrap()
    }

    fn gateway() -> Gateway<MockTransport> {
        Gateway::with_transport(MockTransport::new(), &GatewayConfig::new(peer()))
    }

    fn deliver(
        gateway: &Gateway<MockTransport>,
        source: DeviceAddress,
        code: OperateCode,
        payload: Vec<u8>,
    ) {
        let telegram = Telegram::new(source, DeviceAddress::new(200, 200), code, payload).unwrap();
        let frame = gateway.network().codec().encode(&telegram);
        gateway.network().transport().inject(&frame, peer());
    }

    fn sent_codes(gateway: &Gateway<MockTransport>) -> Vec<OperateCode> {
        let network = gateway.network();
        network
            .transport()
            .sent()
            .iter()
            .map(|frame| network.codec().decode(frame, peer()).unwrap().operate_code())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn level_command_scenario() {
        let gateway = gateway();
        let address = ChannelAddress::new(1, 72, 1);
        gateway.add_light(address, "Desk").unwrap();
        gateway.network().start().await.unwrap();

        let notified = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&notified);
        gateway
            .register_observer(address, move |change| sink.lock().push(change.origin()))
            .unwrap();

        let level = Level::new(80).unwrap();
        assert!(
            gateway
                .issue_command(
                    address,
                    Action::SetLevel {
                        level,
                        running_time: Some(RunningTime::IMMEDIATE),
                    },
                )
                .await
        );
        assert_eq!(
            gateway.current_state(address).unwrap(),
            Some(DeviceState::Light { brightness: level })
        );
        assert_eq!(*notified.lock(), vec![UpdateOrigin::Optimistic]);

        deliver(
            &gateway,
            DeviceAddress::new(1, 72),
            OperateCode::SingleChannelControlResponse,
            vec![1, 0xF8, 80],
        );

        assert_eq!(
            gateway.current_state(address).unwrap(),
            Some(DeviceState::Light { brightness: level })
        );
        assert_eq!(
            *notified.lock(),
            vec![UpdateOrigin::Optimistic, UpdateOrigin::Authoritative]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn telegram_for_one_device_leaves_others_alone() {
        let gateway = gateway();
        let a = gateway.add_light(ChannelAddress::new(1, 72, 1), "A").unwrap();
        let b = gateway.add_light(ChannelAddress::new(1, 72, 2), "B").unwrap();
        let c = gateway.add_light(ChannelAddress::new(1, 73, 1), "C").unwrap();
        gateway.network().start().await.unwrap();

        deliver(
            &gateway,
            DeviceAddress::new(1, 72),
            OperateCode::SingleChannelControlResponse,
            vec![1, 0xF8, 42],
        );

        assert_eq!(a.current_brightness(), Some(Level::clamped(42)));
        assert_eq!(b.current_brightness(), None);
        assert_eq!(c.current_brightness(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn module_report_updates_every_channel() {
        let gateway = gateway();
        let a = gateway.add_light(ChannelAddress::new(1, 72, 1), "A").unwrap();
        let b = gateway.add_light(ChannelAddress::new(1, 72, 3), "B").unwrap();
        gateway.network().start().await.unwrap();

        deliver(
            &gateway,
            DeviceAddress::new(1, 72),
            OperateCode::ReadStatusOfChannelsResponse,
            vec![3, 10, 20, 30],
        );

        assert_eq!(a.current_brightness(), Some(Level::clamped(10)));
        assert_eq!(b.current_brightness(), Some(Level::clamped(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn start_reads_every_device() {
        let gateway = gateway();
        gateway.add_light(ChannelAddress::new(1, 72, 1), "A").unwrap();
        gateway.add_cover(ChannelAddress::new(1, 40, 1), "B").unwrap();

        gateway.start().await.unwrap();
        assert!(gateway.connection_healthy());

        let mut codes = sent_codes(&gateway);
        codes.sort_by_key(|code| code.to_u16());
        assert_eq!(
            codes,
            vec![
                OperateCode::ReadStatusOfChannels,
                OperateCode::ReadStatusOfCurtainSwitch
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn scene_response_reads_module_once() {
        let gateway = gateway();
        let lights: Vec<_> = (1..=8)
            .map(|channel| {
                gateway
                    .add_light(ChannelAddress::new(1, 72, channel), "Dimmer")
                    .unwrap()
            })
            .collect();
        gateway.network().start().await.unwrap();

        deliver(
            &gateway,
            DeviceAddress::new(1, 72),
            OperateCode::SceneControlResponse,
            vec![1, 4],
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sent_codes(&gateway), vec![OperateCode::ReadStatusOfChannels]);

        // The single report reaches every channel of the module.
        deliver(
            &gateway,
            DeviceAddress::new(1, 72),
            OperateCode::ReadStatusOfChannelsResponse,
            vec![8, 0, 10, 20, 30, 40, 50, 60, 70],
        );
        for (light, expected) in lights.iter().zip([0, 10, 20, 30, 40, 50, 60, 70]) {
            assert_eq!(light.current_brightness(), Some(Level::clamped(expected)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scene_response_reads_each_curtain() {
        let gateway = gateway();
        gateway.add_light(ChannelAddress::new(1, 50, 1), "Light A").unwrap();
        gateway.add_light(ChannelAddress::new(1, 50, 2), "Light B").unwrap();
        gateway.add_cover(ChannelAddress::new(1, 50, 3), "Curtain A").unwrap();
        gateway.add_cover(ChannelAddress::new(1, 50, 4), "Curtain B").unwrap();
        gateway.network().start().await.unwrap();

        deliver(
            &gateway,
            DeviceAddress::new(1, 50),
            OperateCode::SceneControlResponse,
            vec![1, 4],
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut codes = sent_codes(&gateway);
        codes.sort_by_key(|code| code.to_u16());
        assert_eq!(
            codes,
            vec![
                OperateCode::ReadStatusOfChannels,
                OperateCode::ReadStatusOfCurtainSwitch,
                OperateCode::ReadStatusOfCurtainSwitch
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_all_reads_each_module_once() {
        let gateway = gateway();
        for channel in 1..=4 {
            gateway
                .add_light(ChannelAddress::new(1, 72, channel), "Dimmer")
                .unwrap();
        }
        gateway.add_light(ChannelAddress::new(1, 73, 1), "Relay").unwrap();
        gateway.network().start().await.unwrap();

        assert_eq!(gateway.refresh_all().await, 0);

        let network = gateway.network();
        let mut targets: Vec<DeviceAddress> = network
            .transport()
            .sent()
            .iter()
            .map(|frame| network.codec().decode(frame, peer()).unwrap().target())
            .collect();
        targets.sort_unstable();
        assert_eq!(
            targets,
            vec![DeviceAddress::new(1, 72), DeviceAddress::new(1, 73)]
        );
    }

    #[tokio::test]
    async fn start_failure_is_reported() {
        let gateway = gateway();
        gateway.network().transport().fail_start();

        let err = gateway.start().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Unavailable { .. })
        ));
        assert!(!gateway.connection_healthy());
    }

    #[tokio::test]
    async fn stop_twice() {
        let gateway = gateway();
        gateway.start().await.unwrap();
        gateway.stop().await;
        gateway.stop().await;
        assert!(!gateway.connection_healthy());
    }

    #[tokio::test(start_paused = true)]
    async fn cover_actions() {
        let gateway = gateway();
        let address = ChannelAddress::new(1, 40, 2);
        let cover = gateway.add_cover(address, "Curtain").unwrap();
        gateway.network().start().await.unwrap();

        assert!(gateway.issue_command(address, Action::Close).await);
        assert!(cover.is_closing());

        assert!(
            gateway
                .issue_command(address, Action::SetPosition(Level::clamped(25)))
                .await
        );
        assert_eq!(cover.position(), Some(Level::clamped(25)));
        assert_eq!(
            cover.status().map(|state| state.motion()),
            Some(CurtainMotion::Closing)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn position_on_fixed_cover_is_rejected() {
        let gateway = gateway();
        let address = ChannelAddress::new(1, 40, 3);
        gateway
            .add_device(&DeviceConfig::cover(address, "Blind").with_adjustable(false))
            .unwrap();
        gateway.network().start().await.unwrap();

        assert!(
            !gateway
                .issue_command(address, Action::SetPosition(Level::clamped(50)))
                .await
        );
        assert_eq!(gateway.network().transport().sent_count(), 0);
        assert!(gateway.issue_command(address, Action::Open).await);
        assert!(!gateway.cover(address).unwrap().adjustable());
    }

    #[tokio::test]
    async fn mismatched_and_unknown_targets_are_rejected() {
        let gateway = gateway();
        let light = ChannelAddress::new(1, 72, 1);
        gateway.add_light(light, "Light").unwrap();
        gateway.network().start().await.unwrap();

        assert!(!gateway.issue_command(light, Action::Open).await);
        assert!(
            !gateway
                .issue_command(ChannelAddress::new(9, 9, 9), Action::ReadStatus)
                .await
        );
        assert_eq!(gateway.network().transport().sent_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn turn_on_uses_configured_running_time() {
        let gateway = gateway();
        let address = ChannelAddress::new(1, 72, 1);
        gateway
            .add_device(
                &DeviceConfig::light(address, "Fade").with_running_time(RunningTime::from_secs(65)),
            )
            .unwrap();
        gateway.network().start().await.unwrap();

        gateway
            .issue_command(address, Action::TurnOn { running_time: None })
            .await;

        let frame = &gateway.network().transport().sent()[0];
        let command = gateway.network().codec().decode(frame, peer()).unwrap();
        assert_eq!(command.payload(), &[1, 100, 1, 5]);
    }

    #[test]
    fn duplicate_and_lookup() {
        let gateway = gateway();
        let address = ChannelAddress::new(1, 72, 1);
        gateway.add_light(address, "A").unwrap();

        assert!(matches!(
            gateway.add_cover(address, "B"),
            Err(Error::DuplicateDevice(a)) if a == address
        ));
        assert!(gateway.light(address).is_some());
        assert!(gateway.cover(address).is_none());
        assert_eq!(gateway.device_count(), 1);
        assert_eq!(gateway.device_addresses(), vec![address]);
    }

    #[test]
    fn observers_on_unknown_device() {
        let gateway = gateway();
        let missing = ChannelAddress::new(1, 1, 1);

        assert!(matches!(
            gateway.register_observer(missing, |_| {}),
            Err(Error::DeviceNotFound(_))
        ));
        assert!(matches!(
            gateway.current_state(missing),
            Err(Error::DeviceNotFound(_))
        ));
        assert!(!gateway.unsubscribe(missing, SubscriptionId::new(1)));
    }

    #[test]
    fn unsubscribe_observer() {
        let gateway = gateway();
        let address = ChannelAddress::new(1, 72, 1);
        gateway.add_light(address, "A").unwrap();

        let id = gateway.register_observer(address, |_| {}).unwrap();
        assert!(gateway.unsubscribe(address, id));
        assert!(!gateway.unsubscribe(address, id));
    }

    #[test]
    fn from_config_registers_devices() {
        let config = GatewayConfig::new(peer())
            .with_device(
                DeviceConfig::light(ChannelAddress::new(1, 72, 1), "A").with_dimmable(false),
            )
            .with_device(DeviceConfig::cover(ChannelAddress::new(1, 40, 1), "B"));

        let gateway = Gateway::from_config(&config).unwrap();
        assert_eq!(gateway.device_count(), 2);
        assert!(!gateway.light(ChannelAddress::new(1, 72, 1)).unwrap().dimmable());
        assert!(!gateway.connection_healthy());
    }

    #[test]
    fn from_config_rejects_duplicates() {
        let address = ChannelAddress::new(1, 72, 1);
        let config = GatewayConfig::new(peer())
            .with_device(DeviceConfig::light(address, "A"))
            .with_device(DeviceConfig::cover(address, "B"));

        assert!(matches!(
            Gateway::from_config(&config),
            Err(Error::DuplicateDevice(_))
        ));
    }

    #[test]
    fn drop_releases_dispatch_subscription() {
        let gateway = gateway();
        let network = Arc::clone(gateway.network());
        assert_eq!(network.subscriber_count(), 1);

        drop(gateway);
        assert_eq!(network.subscriber_count(), 0);
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::Open.to_string(), "open");
        assert_eq!(
            Action::SetLevel {
                level: Level::FULL,
                running_time: None
            }
            .name(),
            "set_level"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_commands_are_serialized_on_the_wire() {
        let gateway = Arc::new(gateway());
        for device in 1..=6 {
            gateway.add_light(ChannelAddress::new(1, device, 1), "L").unwrap();
        }
        gateway.network().start().await.unwrap();
        gateway
            .network()
            .transport()
            .set_behaviour(crate::protocol::mock::SendBehaviour::Delay(Duration::from_millis(20)));

        let mut tasks = tokio::task::JoinSet::new();
        for device in 1..=6 {
            let gateway = Arc::clone(&gateway);
            tasks.spawn(async move {
                gateway
                    .issue_command(
                        ChannelAddress::new(1, device, 1),
                        Action::TurnOff { running_time: None },
                    )
                    .await
            });
        }
        while let Some(sent) = tasks.join_next().await {
            assert!(sent.unwrap());
        }
        assert_eq!(gateway.network().transport().max_in_flight(), 1);
    }
}
