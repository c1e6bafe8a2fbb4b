// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimmer and relay channels.

use std::sync::Arc;

use parking_lot::RwLock;

use super::DeviceCore;
use crate::command::{ReadStatusOfChannels, SingleChannelControl};
use crate::protocol::{NetworkInterface, Transport};
use crate::response::{ChannelResponse, ChannelStatusReport};
use crate::state::{ChannelState, DeviceState, StateChange, UpdateOrigin};
use crate::subscription::SubscriptionId;
use crate::telegram::Telegram;
use crate::types::{ChannelAddress, Level, OperateCode, RunningTime};

#[derive(Debug, Default)]
struct LightState {
    brightness: ChannelState<Level>,
    previous: Option<Level>,
}

/// A dimmer or relay channel.
///
/// Brightness is a [`Level`]; 0 is off. A relay is a light that is not
/// dimmable, for which every non-zero level is sent as 100.
///
/// # Examples
///
/// ```no_run
/// use buspro_lib::{Gateway, GatewayConfig};
/// use buspro_lib::types::{ChannelAddress, RunningTime};
///
/// # async fn example() -> buspro_lib::Result<()> {
/// let gateway = Gateway::from_config(&GatewayConfig::new("192.168.1.15:6000".parse().unwrap()))?;
/// let light = gateway.add_light(ChannelAddress::new(1, 72, 3), "Hallway")?;
/// gateway.start().await?;
///
/// light.set_off(RunningTime::IMMEDIATE).await;
/// // Back to the brightness it had before switching off
/// light.turn_on(RunningTime::from_secs(1)).await;
/// # Ok(())
/// # }
/// ```
pub struct Light<T: Transport> {
    core: Arc<DeviceCore<T>>,
    state: RwLock<LightState>,
    dimmable: bool,
    running_time: RunningTime,
}

impl<T: Transport> Light<T> {
    /// Creates a dimmable light on a channel.
    #[must_use]
    pub fn new(
        network: Arc<NetworkInterface<T>>,
        address: ChannelAddress,
        name: impl Into<String>,
    ) -> Self {
        let query = ReadStatusOfChannels::new(address.module());
        Self {
            core: Arc::new(DeviceCore::new(network, address, name.into(), &query)),
            state: RwLock::new(LightState::default()),
            dimmable: true,
            running_time: RunningTime::IMMEDIATE,
        }
    }

    /// Sets whether the channel supports intermediate levels.
    #[must_use]
    pub fn with_dimmable(mut self, dimmable: bool) -> Self {
        self.dimmable = dimmable;
        self
    }

    /// Sets the default running time used when an action does not give one.
    #[must_use]
    pub fn with_running_time(mut self, running_time: RunningTime) -> Self {
        self.running_time = running_time;
        self
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

    /// Returns `true` if the channel supports intermediate levels.
    #[must_use]
    pub fn dimmable(&self) -> bool {
        self.dimmable
    }

    /// Returns the default running time.
    #[must_use]
    pub fn running_time(&self) -> RunningTime {
        self.running_time
    }

    /// Returns the cached brightness and how it was obtained.
    #[must_use]
    pub fn state(&self) -> ChannelState<Level> {
        self.state.read().brightness
    }

    /// Returns the cached brightness, if known.
    #[must_use]
    pub fn current_brightness(&self) -> Option<Level> {
        self.state().value()
    }

    /// Returns the last non-zero brightness.
    #[must_use]
    pub fn previous_brightness(&self) -> Option<Level> {
        self.state.read().previous
    }

    /// Returns `true` if the cached brightness is above zero.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.current_brightness().is_some_and(|level| level.is_on())
    }

    /// Returns the published state, if known.
    #[must_use]
    pub fn current_state(&self) -> Option<DeviceState> {
        self.current_brightness()
            .map(|brightness| DeviceState::Light { brightness })
    }

    /// Switches the channel fully on.
    pub async fn set_on(&self, running_time: RunningTime) -> bool {
        self.set(Level::FULL, running_time).await
    }

    /// Switches the channel off.
    pub async fn set_off(&self, running_time: RunningTime) -> bool {
        self.set(Level::OFF, running_time).await
    }

    /// Sets the channel level.
    ///
    /// Returns `true` once the command is on the wire. The cached
    /// brightness reports `level` immediately.
    pub async fn set_level(&self, level: Level, running_time: RunningTime) -> bool {
        self.set(level, running_time).await
    }

    /// Switches the channel on, restoring the previous brightness when off.
    pub async fn turn_on(&self, running_time: RunningTime) -> bool {
        let level = match self.previous_brightness() {
            Some(previous) if !self.is_on() => previous,
            _ => Level::FULL,
        };
        self.set(level, running_time).await
    }

    /// Asks the module for the level of its channels.
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

    /// Registers an observer for state changes of this light.
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

    /// Updates the light from a telegram sent by its module.
    ///
    /// Telegrams from other modules, about other channels, or with
    /// unrelated operate codes are ignored.
    pub fn handle_telegram(&self, telegram: &Telegram) {
        let address = self.address();
        if telegram.source() != address.module() {
            return;
        }

        match telegram.operate_code() {
            OperateCode::SingleChannelControlResponse => {
                if let Some(response) = ChannelResponse::parse(telegram)
                    && response.channel() == address.channel()
                {
                    self.record(response.level(), UpdateOrigin::Authoritative);
                }
            }
            OperateCode::ReadStatusOfChannelsResponse => {
                match ChannelStatusReport::parse(telegram)
                    .and_then(|report| report.level(address.channel()))
                {
                    Some(level) => self.record(level, UpdateOrigin::Authoritative),
                    None => tracing::debug!(device = %address, "Channel not in status report"),
                }
            }
            OperateCode::SceneControlResponse => self.core.schedule_refresh(),
            _ => {}
        }
    }

    async fn set(&self, level: Level, running_time: RunningTime) -> bool {
        let level = if !self.dimmable && level.is_on() {
            Level::FULL
        } else {
            level
        };
        let command = SingleChannelControl::new(self.address(), level, running_time);
        self.core
            .send_command(&command, || self.record(level, UpdateOrigin::Optimistic))
            .await
    }

    fn record(&self, level: Level, origin: UpdateOrigin) {
        {
            let mut state = self.state.write();
            state.brightness.update(level, origin);
            if level.is_on() {
                state.previous = Some(level);
            }
        }

        let change = StateChange::new(
            self.address(),
            DeviceState::Light { brightness: level },
            origin,
        );
        self.core.publish(&change);
    }
}

impl<T: Transport> std::fmt::Debug for Light<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Light")
            .field("address", &self.address())
            .field("name", &self.name())
            .field("dimmable", &self.dimmable)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
