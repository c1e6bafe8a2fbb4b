// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curtain channels.

use std::sync::Arc;

use parking_lot::RwLock;

use super::DeviceCore;
use crate::command::{CurtainPositionControl, CurtainSwitchControl, ReadStatusOfCurtainSwitch};
use crate::error::DeviceError;
use crate::protocol::{NetworkInterface, Transport};
use crate::response::CurtainReport;
use crate::state::{ChannelState, CoverState, DeviceState, StateChange, UpdateOrigin};
use crate::subscription::SubscriptionId;
use crate::telegram::Telegram;
use crate::types::{ChannelAddress, CurtainMotion, Level, OperateCode};

/// A curtain motor channel.
///
/// Motion and position are reported separately by the module; each update
/// keeps the other part of the cached [`CoverState`].
///
/// # Examples
///
/// ```no_run
/// use buspro_lib::{Gateway, GatewayConfig};
/// use buspro_lib::types::{ChannelAddress, Level};
///
/// # async fn example() -> buspro_lib::Result<()> {
/// let gateway = Gateway::from_config(&GatewayConfig::new("192.168.1.15:6000".parse().unwrap()))?;
/// let cover = gateway.add_cover(ChannelAddress::new(1, 40, 1), "Living room")?;
/// gateway.start().await?;
///
/// cover.set_position(Level::new(50)?).await;
/// cover.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct Cover<T: Transport> {
    core: Arc<DeviceCore<T>>,
    state: RwLock<ChannelState<CoverState>>,
    adjustable: bool,
}

impl<T: Transport> Cover<T> {
    /// Creates a cover on a curtain channel.
    #[must_use]
    pub fn new(
        network: Arc<NetworkInterface<T>>,
        address: ChannelAddress,
        name: impl Into<String>,
    ) -> Self {
        let query = ReadStatusOfCurtainSwitch::new(address);
        Self {
            core: Arc::new(DeviceCore::new(network, address, name.into(), &query)),
            state: RwLock::new(ChannelState::Unknown),
            adjustable: true,
        }
    }

    /// Sets whether the motor can be driven to a position.
    #[must_use]
    pub fn with_adjustable(mut self, adjustable: bool) -> Self {
        self.adjustable = adjustable;
        self
    }

    /// Returns `true` if the motor accepts position commands.
    #[must_use]
    pub fn adjustable(&self) -> bool {
        self.adjustable
    }

    /// Returns the channel address.
    #[must_use]
    pub fn address(&self) -> ChannelAddress {
        self.core.address()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Returns a stable identifier, `subnet.device.channel`.
    #[must_use]
    pub fn device_identifier(&self) -> String {
        self.address().to_string()
    }

    /// Returns the cached state and how it was obtained.
    #[must_use]
    pub fn state(&self) -> ChannelState<CoverState> {
        *self.state.read()
    }

    /// Returns the cached state, if known.
    #[must_use]
    pub fn status(&self) -> Option<CoverState> {
        self.state().value()
    }

    /// Returns the cached position, if reported.
    #[must_use]
    pub fn position(&self) -> Option<Level> {
        self.status().and_then(|state| state.position())
    }

    /// Returns whether the curtain is fully closed, if the position is known.
    #[must_use]
    pub fn is_closed(&self) -> Option<bool> {
        self.status().and_then(|state| state.is_closed())
    }

    /// Returns `true` while the curtain is opening.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.motion() == Some(CurtainMotion::Opening)
    }

    /// Returns `true` while the curtain is closing.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.motion() == Some(CurtainMotion::Closing)
    }

    /// Returns the published state, if known.
    #[must_use]
    pub fn current_state(&self) -> Option<DeviceState> {
        self.status().map(DeviceState::Cover)
    }

    /// Starts opening the curtain.
    pub async fn open(&self) -> bool {
        self.switch(CurtainMotion::Opening).await
    }

    /// Starts closing the curtain.
    pub async fn close(&self) -> bool {
        self.switch(CurtainMotion::Closing).await
    }

    /// Stops the curtain motor.
    pub async fn stop(&self) -> bool {
        self.switch(CurtainMotion::Stopped).await
    }

    /// Moves the curtain to a position (0 closed, 100 open).
    ///
    /// A cover that is not adjustable sends nothing and returns `false`.
    pub async fn set_position(&self, position: Level) -> bool {
        if !self.adjustable {
            let error = DeviceError::UnsupportedAction {
                address: self.address(),
                action: "set_position",
            };
            tracing::warn!(error = %error, "Position command rejected");
            return false;
        }
        let command = CurtainPositionControl::new(self.address(), position);
        self.core
            .send_command(&command, || {
                self.record(|state| state.with_position(position), UpdateOrigin::Optimistic);
            })
            .await
    }

    /// Asks the module for the curtain status.
    ///
    /// Returns `true` if a report arrived within the confirmation budget.
    pub async fn read_status(&self) -> bool {
        self.core.read_status().await
    }

    /// Returns the status query this device sends.
    pub(crate) fn status_query(&self) -> &Telegram {
        self.core.status_query()
    }

    /// Issues a status read in the background.
    pub(crate) fn schedule_refresh(&self) {
        self.core.schedule_refresh();
    }

    /// Registers an observer for state changes of this cover.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.core.observers().on_state_changed(callback)
    }

    /// Removes an observer.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.observers().unsubscribe(id)
    }

    /// Updates the cover from a telegram sent by its module.
    pub fn handle_telegram(&self, telegram: &Telegram) {
        let address = self.address();
        if telegram.source() != address.module() {
            return;
        }

        if telegram.operate_code() == OperateCode::SceneControlResponse {
            self.core.schedule_refresh();
            return;
        }

        match CurtainReport::parse(telegram) {
            Some(report) if report.curtain() == address.channel() => match report {
                CurtainReport::Motion { motion, .. } => {
                    self.record(|state| state.with_motion(motion), UpdateOrigin::Authoritative);
                }
                CurtainReport::Position { position, .. } => {
                    self.record(
                        |state| state.with_position(position),
                        UpdateOrigin::Authoritative,
                    );
                }
            },
            _ => {}
        }
    }

    fn motion(&self) -> Option<CurtainMotion> {
        self.status().map(|state| state.motion())
    }

    async fn switch(&self, motion: CurtainMotion) -> bool {
        let command = CurtainSwitchControl::new(self.address(), motion);
        self.core
            .send_command(&command, || {
                self.record(|state| state.with_motion(motion), UpdateOrigin::Optimistic);
            })
            .await
    }

    fn record(&self, apply: impl FnOnce(CoverState) -> CoverState, origin: UpdateOrigin) {
        let next = {
            let mut state = self.state.write();
            let next = apply(state.value().unwrap_or_default());
            state.update(next, origin);
            next
        };

        let change = StateChange::new(self.address(), DeviceState::Cover(next), origin);
        self.core.publish(&change);
    }
}

impl<T: Transport> std::fmt::Debug for Cover<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cover")
            .field("address", &self.address())
            .field("name", &self.name())
            .field("adjustable", &self.adjustable)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TimeoutBudget;
    use crate::protocol::mock::MockTransport;
    use crate::telegram::TelegramCodec;
    use crate::types::DeviceAddress;
    use std::net::SocketAddr;
    use std::time::Duration;

    const MODULE: DeviceAddress = DeviceAddress::new(1, 40);

    fn peer() -> SocketAddr {
        "192.168.1.15:6000".parse().unwrap()
    }

    fn setup(channel: u8) -> (Arc<NetworkInterface<MockTransport>>, Arc<Cover<MockTransport>>) {
        let network = Arc::new(NetworkInterface::new(
            MockTransport::new(),
            TelegramCodec::default(),
            DeviceAddress::new(200, 200),
            TimeoutBudget::default(),
        ));
        let cover = Arc::new(Cover::new(Arc::clone(&network), MODULE.channel(channel), "Curtain"));
        let handle = Arc::clone(&cover);
        network.register_callback(move |telegram| handle.handle_telegram(telegram));
        (network, cover)
    }

    fn deliver(network: &NetworkInterface<MockTransport>, code: OperateCode, payload: Vec<u8>) {
        let telegram = Telegram::new(MODULE, DeviceAddress::new(200, 200), code, payload).unwrap();
        network.transport().inject(&network.codec().encode(&telegram), peer());
    }

    #[tokio::test(start_paused = true)]
    async fn open_is_optimistic_then_confirmed() {
        let (network, cover) = setup(1);
        network.start().await.unwrap();

        assert!(cover.open().await);
        assert!(cover.is_opening());
        assert_eq!(cover.state().origin(), Some(UpdateOrigin::Optimistic));

        let sent = network.transport().sent();
        let command = network.codec().decode(&sent[0], peer()).unwrap();
        assert_eq!(command.operate_code(), OperateCode::CurtainSwitchControl);
        assert_eq!(command.payload(), &[1, 1]);

        deliver(&network, OperateCode::CurtainSwitchControlResponse, vec![1, 1]);
        assert!(cover.is_opening());
        assert_eq!(cover.state().origin(), Some(UpdateOrigin::Authoritative));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(network.transport().sent_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn position_report_keeps_motion() {
        let (network, cover) = setup(2);
        network.start().await.unwrap();

        deliver(&network, OperateCode::ReadStatusOfCurtainSwitchResponse, vec![2, 2]);
        deliver(&network, OperateCode::ReadStatusOfCurtainSwitchResponse, vec![18, 0]);

        assert!(cover.is_closing());
        assert_eq!(cover.position(), Some(Level::OFF));
        assert_eq!(cover.is_closed(), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn set_position_sends_offset_curtain_number() {
        let (network, cover) = setup(1);
        network.start().await.unwrap();

        assert!(cover.set_position(Level::clamped(60)).await);
        assert_eq!(cover.position(), Some(Level::clamped(60)));
        assert_eq!(cover.is_closed(), Some(false));

        let sent = network.transport().sent();
        let command = network.codec().decode(&sent[0], peer()).unwrap();
        assert_eq!(command.payload(), &[17, 60]);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_cover_rejects_position() {
        let network = Arc::new(NetworkInterface::new(
            MockTransport::new(),
            TelegramCodec::default(),
            DeviceAddress::new(200, 200),
            TimeoutBudget::default(),
        ));
        network.start().await.unwrap();
        let cover =
            Cover::new(Arc::clone(&network), MODULE.channel(1), "Blind").with_adjustable(false);
        assert!(!cover.adjustable());

        assert!(!cover.set_position(Level::clamped(40)).await);
        assert_eq!(cover.status(), None);
        assert_eq!(network.transport().sent_count(), 0);

        // Open, close and stop still work.
        assert!(cover.open().await);
        assert_eq!(network.transport().sent_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn other_curtain_is_ignored() {
        let (network, cover) = setup(1);
        network.start().await.unwrap();

        deliver(&network, OperateCode::CurtainSwitchControlResponse, vec![2, 1]);
        deliver(&network, OperateCode::ReadStatusOfCurtainSwitchResponse, vec![18, 50]);

        assert_eq!(cover.status(), None);
        assert_eq!(cover.is_closed(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_stop_reads_curtain_status() {
        let (network, cover) = setup(3);
        network.start().await.unwrap();

        cover.stop().await;
        tokio::time::sleep(Duration::from_millis(1600)).await;

        let sent = network.transport().sent();
        assert_eq!(sent.len(), 2);
        let query = network.codec().decode(&sent[1], peer()).unwrap();
        assert_eq!(query.operate_code(), OperateCode::ReadStatusOfCurtainSwitch);
        assert_eq!(query.payload(), &[3]);
    }

    #[tokio::test(start_paused = true)]
    async fn observers_receive_cover_state() {
        let (network, cover) = setup(1);
        network.start().await.unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cover.on_state_changed(move |change| sink.lock().push(*change.state()));

        cover.close().await;
        deliver(&network, OperateCode::CurtainSwitchControlResponse, vec![1, 0]);

        let expected = vec![
            DeviceState::Cover(CoverState::new(CurtainMotion::Closing, None)),
            DeviceState::Cover(CoverState::new(CurtainMotion::Stopped, None)),
        ];
        assert_eq!(*seen.lock(), expected);
    }
}
